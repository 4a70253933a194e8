//! Opaque session token generation.

use rand::RngCore;
use rand::rngs::OsRng;

/// Generates hex-encoded random bearer tokens from the OS CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator {
    /// Random bytes per token.
    bytes: usize,
}

impl TokenGenerator {
    /// Creates a generator producing `bytes` random bytes per token.
    pub fn new(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Generates a new token of `2 * bytes` lowercase hex characters.
    pub fn generate(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        OsRng.fill_bytes(&mut buf);
        hex::encode(buf)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(32)
    }
}
