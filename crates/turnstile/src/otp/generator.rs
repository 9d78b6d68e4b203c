//! Numeric code generation.

use rand::Rng;

/// Fixed-length numeric code generator.
///
/// Each digit is drawn independently from the thread-local CSPRNG, so
/// leading zeros are as likely as anything else.
pub struct OtpGenerator {
    length: usize,
}

impl OtpGenerator {
    /// Create a generator for codes of `length` decimal digits.
    ///
    /// A zero length is a configuration bug, not a runtime condition.
    pub fn new(length: usize) -> Self {
        assert!(length > 0, "code length must be at least one digit");
        Self { length }
    }

    /// Generate one code.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect()
    }

    pub fn length(&self) -> usize {
        self.length
    }
}
