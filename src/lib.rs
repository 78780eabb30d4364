//! # LZW compression with a length header
//!
//! This crate provides an [`Encoder`] and a [`Decoder`] for the `LZW1` format: a four byte
//! marker, the big endian length of the uncompressed data, and the LZW code stream packed most
//! significant bit first.
//!
//! The dictionary starts with one code for each byte value and learns one new sequence for each
//! emitted code. Codes are written with 9 bits at first and grow by one bit whenever the
//! dictionary passes a power of two. Once the dictionary holds `1 << max_code_size` entries it is
//! frozen and coding continues with the entries it has. The default limit is 20 bits.
//!
//! Both coders work on whole buffers held in memory.
//!
//! Exemplary use of the encoder:
//!
//! ```
//! use lzwpack::{Decoder, Encoder};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let compressed = Encoder::new().compress(data).unwrap();
//! assert_eq!(&compressed[..4], b"LZW1");
//!
//! let decompressed = Decoder::new().decompress(&compressed).unwrap();
//! assert_eq!(decompressed, data);
//! ```
//!
//! The individual stages are available as well:
//!
//! ```
//! use lzwpack::{bits, BitOrder, CodeWidth, Config, Decoder, Encoder};
//! let config = Config::new(12).unwrap();
//! let codes = Encoder::with_config(config).encode(b"abababab");
//! let width = CodeWidth::variable(&config);
//! let packed = bits::pack(&codes, width, BitOrder::Msb).unwrap();
//! let unpacked = bits::unpack(&packed, width, BitOrder::Msb, codes.len()).unwrap();
//! assert_eq!(Decoder::with_config(config).decode(&unpacked).unwrap(), b"abababab");
//! ```
#![forbid(unsafe_code)]

/// The narrowest code of a variable width stream, and the smallest dictionary limit.
pub const MIN_CODESIZE: u8 = 9;
/// The widest supported code.
pub const MAX_CODESIZE: u8 = 24;
/// The dictionary limit used by `Encoder::new` and `Decoder::new`.
pub const DEFAULT_CODESIZE: u8 = 20;

/// Alias for a LZW code point
pub type Code = u32;

pub mod bits;
pub mod config;
pub mod container;
pub mod decode;
pub mod dictionary;
pub mod encode;
mod error;

pub use crate::bits::{BitOrder, CodeWidth};
pub use crate::config::Config;
pub use crate::decode::Decoder;
pub use crate::dictionary::Dictionary;
pub use crate::encode::Encoder;
pub use crate::error::{ErrorKind, LzwError};

/// Compress `data` with the default configuration.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, LzwError> {
    Encoder::new().compress(data)
}

/// Decompress an `LZW1` stream written with the default configuration.
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>, LzwError> {
    Decoder::new().decompress(stream)
}

#[cfg(test)]
mod tests {
    use super::{bits, compress, decompress, BitOrder, CodeWidth, Config, Encoder};

    #[test]
    fn container_is_header_and_packed_codes() {
        let data = b"It was the best of times, it was the worst of times";
        let config = Config::default();
        let codes = Encoder::new().encode(data);
        let packed = bits::pack(&codes, CodeWidth::variable(&config), BitOrder::Msb).unwrap();

        let stream = compress(data).unwrap();
        assert_eq!(&stream[..4], b"LZW1");
        assert_eq!(&stream[4..8], &(data.len() as u32).to_be_bytes()[..]);
        assert_eq!(&stream[8..], &packed[..]);
        assert_eq!(decompress(&stream).unwrap(), &data[..]);
    }

    #[test]
    fn coders_are_send() {
        fn assert_send<T: Send + Sync>() {}
        assert_send::<super::Encoder>();
        assert_send::<super::Decoder>();
    }
}
