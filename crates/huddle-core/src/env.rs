//! Environment abstraction for deterministic testing.
//!
//! Decouples relay logic from system randomness. Production uses OS
//! entropy; tests use a seeded source so code and identity generation are
//! reproducible.

/// Abstract environment providing randomness to the relay core.
///
/// The relay needs entropy for exactly two things: room codes and
/// participant identity tokens. Keeping the source behind this trait is
/// what makes [`crate::RelayDriver`] deterministic under test.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same seed, a test environment produces the same sequence
    /// - Production implementations use cryptographically secure entropy
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    ///
    /// Convenience for identity token generation.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
