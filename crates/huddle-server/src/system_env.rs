//! Production environment backed by the OS RNG.

use huddle_core::Environment;

/// Environment using OS cryptographic randomness.
///
/// Room codes and identity tokens both come from this source, so they are
/// unguessable in production while staying seedable in tests through the
/// [`Environment`] trait.
///
/// # Panics
///
/// Panics if the OS RNG fails. A relay that cannot mint unguessable
/// identity tokens should not keep accepting connections; RNG failure
/// indicates OS-level trouble and is effectively unrecoverable.
#[derive(Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable for the relay");
    }
}
