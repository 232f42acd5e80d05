use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::rngs::StdRng;
use rand::RngCore;
use rand::SeedableRng;

/// Source of cryptographically strong random bytes.
///
/// A single instance is shared by the code generator and the token issuer so
/// that entropy behavior can be swapped out as a whole (e.g. in tests).
pub trait SecureRandom: Send + Sync + 'static {
    /// Fill `dest` entirely with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Operating system entropy source.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Deterministic ChaCha-based source seeded from a fixed value.
///
/// Two instances built from the same seed produce the same byte stream.
/// Intended for tests; never wire this into a running service.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SecureRandom for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.fill_bytes(dest);
    }
}
