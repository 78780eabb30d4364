//! Coder configuration shared by the encoder and the decoder.
use crate::error::LzwError;
use crate::{DEFAULT_CODESIZE, MAX_CODESIZE, MIN_CODESIZE};

/// The dictionary limit of a coding pass.
///
/// The `LZW1` header does not record this value, both sides of a stream must be constructed with
/// the same configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    max_code_size: u8,
}

impl Config {
    /// Limit the dictionary to `1 << max_code_size` entries.
    ///
    /// The size must lie in `9..=24`.
    pub fn new(max_code_size: u8) -> Result<Self, LzwError> {
        if !(MIN_CODESIZE..=MAX_CODESIZE).contains(&max_code_size) {
            return Err(LzwError::InvalidCodeSize(max_code_size));
        }

        Ok(Config { max_code_size })
    }

    /// The widest code this configuration produces, in bits.
    pub fn max_code_size(&self) -> u8 {
        self.max_code_size
    }

    /// The capacity of the dictionary, seeds included.
    pub fn max_entries(&self) -> usize {
        1 << self.max_code_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_code_size: DEFAULT_CODESIZE,
        }
    }
}
