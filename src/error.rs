use crate::Code;
use thiserror::Error;

/// Errors of the LZW coder and its container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LzwError {
    /// The input does not fit the 32-bit length field of the header.
    #[error("input of {len} bytes exceeds the 32-bit length field")]
    InputTooLarge { len: usize },
    /// A code size outside of the supported range was requested.
    #[error("unsupported code size of {0} bits")]
    InvalidCodeSize(u8),
    /// A code was handed to the packer that can not be represented in its width.
    #[error("code {code} does not fit into {width} bits")]
    CodeTooWide { code: Code, width: u8 },
    /// The stream does not start with the `LZW1` marker.
    #[error("not an LZW1 stream (found marker {found:02x?})")]
    FormatMismatch { found: [u8; 4] },
    /// A code that is neither in the table nor the next one to be assigned.
    #[error("invalid code {code}, next code to be assigned is {next}")]
    InvalidCode { code: Code, next: Code },
    /// The code stream ended before the announced amount of data was produced.
    #[error("code stream ended early, produced {produced} of {expected}")]
    UnexpectedEnd { expected: usize, produced: usize },
    /// The last code expanded past the announced length.
    #[error("decoded data exceeds the announced length of {expected} bytes")]
    LengthOverrun { expected: usize },
    /// Whole bytes follow the final code.
    #[error("{extra} bytes of trailing data after the code stream")]
    TrailingData { extra: usize },
}

/// Coarse classification of an [`LzwError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed arguments the coder can not work with.
    InvalidInput,
    /// The stream is not an `LZW1` stream at all.
    FormatMismatch,
    /// The stream has the right header but its code stream is damaged.
    DecodeCorruption,
}

impl LzwError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LzwError::InputTooLarge { .. }
            | LzwError::InvalidCodeSize(_)
            | LzwError::CodeTooWide { .. } => ErrorKind::InvalidInput,
            LzwError::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            LzwError::InvalidCode { .. }
            | LzwError::UnexpectedEnd { .. }
            | LzwError::LengthOverrun { .. }
            | LzwError::TrailingData { .. } => ErrorKind::DecodeCorruption,
        }
    }
}

impl From<LzwError> for std::io::Error {
    fn from(err: LzwError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, LzwError};

    #[test]
    fn kinds() {
        assert_eq!(LzwError::InputTooLarge { len: 0 }.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            LzwError::FormatMismatch { found: *b"LZW2" }.kind(),
            ErrorKind::FormatMismatch
        );
        assert_eq!(
            LzwError::InvalidCode { code: 300, next: 258 }.kind(),
            ErrorKind::DecodeCorruption
        );
    }

    #[test]
    fn messages_name_the_values() {
        let err = LzwError::UnexpectedEnd { expected: 10, produced: 4 };
        assert_eq!(err.to_string(), "code stream ended early, produced 4 of 10");
        let err = LzwError::CodeTooWide { code: 512, width: 9 };
        assert_eq!(err.to_string(), "code 512 does not fit into 9 bits");
    }
}
