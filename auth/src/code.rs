use std::sync::Arc;

use crate::random::SecureRandom;

/// Largest multiple of 10 representable in a byte; bytes at or above it are
/// rejected so every digit is equally likely.
const DIGIT_REJECTION_BOUND: u8 = 250;

/// Generator for fixed-length numeric one-time codes.
///
/// Codes are not guaranteed to be distinct from one another; collisions are
/// the store's concern.
#[derive(Clone)]
pub struct CodeGenerator {
    random: Arc<dyn SecureRandom>,
}

impl CodeGenerator {
    /// Create a generator drawing from the given random source.
    pub fn new(random: Arc<dyn SecureRandom>) -> Self {
        Self { random }
    }

    /// Generate a code of exactly `length` ASCII digits.
    ///
    /// # Arguments
    /// * `length` - Number of digits
    ///
    /// # Returns
    /// String over the charset `0-9`
    pub fn generate(&self, length: usize) -> String {
        let mut code = String::with_capacity(length);
        let mut buffer = [0u8; 16];

        while code.len() < length {
            self.random.fill_bytes(&mut buffer);
            for byte in buffer {
                if code.len() == length {
                    break;
                }
                if byte < DIGIT_REJECTION_BOUND {
                    code.push(char::from(b'0' + byte % 10));
                }
            }
        }

        code
    }
}
