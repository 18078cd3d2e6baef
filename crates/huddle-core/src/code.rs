//! Room code generation.
//!
//! A pure draw from the environment's entropy onto the confusable-free
//! alphabet defined by [`RoomCode`]. Collision avoidance is deliberately
//! not handled here: the [`crate::RoomDirectory`] owns uniqueness, this
//! module only owns uniformity.

use huddle_proto::RoomCode;

use crate::env::Environment;

/// Generate a fresh room code from environment entropy.
///
/// Uniform over the full code space; no failure mode.
pub fn generate<E: Environment>(env: &E) -> RoomCode {
    let mut entropy = [0u8; RoomCode::LEN];
    env.random_bytes(&mut entropy);
    RoomCode::from_entropy(entropy)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[derive(Clone)]
    struct SeededEnv(Arc<Mutex<ChaCha8Rng>>);

    impl SeededEnv {
        fn new(seed: u64) -> Self {
            Self(Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))))
        }
    }

    impl Environment for SeededEnv {
        fn random_bytes(&self, buffer: &mut [u8]) {
            self.0.lock().unwrap().fill_bytes(buffer);
        }
    }

    #[test]
    fn generated_codes_stay_in_alphabet() {
        let env = SeededEnv::new(7);
        for _ in 0..1000 {
            let code = generate(&env);
            for symbol in code.as_str().bytes() {
                assert!(RoomCode::ALPHABET.contains(&symbol));
            }
        }
    }

    #[test]
    fn same_seed_generates_same_sequence() {
        let a = SeededEnv::new(42);
        let b = SeededEnv::new(42);
        for _ in 0..20 {
            assert_eq!(generate(&a), generate(&b));
        }
    }

    #[test]
    fn different_draws_rarely_collide() {
        let env = SeededEnv::new(99);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(generate(&env));
        }
        // 1000 draws from a 32^6 space should essentially never collide.
        assert!(seen.len() >= 999);
    }
}
