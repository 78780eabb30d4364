//! The `LZW1` container.
//!
//! ```text
//! 0      4              8
//! +------+--------------+----------------------------------+
//! | LZW1 | length (u32) | MSB-first variable width codes   |
//! +------+--------------+----------------------------------+
//! ```
//!
//! The length is the size of the uncompressed data, big endian. The decoder stops once it has
//! produced that many bytes.
use crate::error::LzwError;

/// The marker at the start of every stream.
pub const MAGIC: [u8; 4] = *b"LZW1";
/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 8;

/// The parsed fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The length of the uncompressed data.
    pub length: u32,
}

impl Header {
    /// The header for `data`, if its length can be represented.
    pub fn for_data(data: &[u8]) -> Result<Self, LzwError> {
        let length = u32::try_from(data.len())
            .map_err(|_| LzwError::InputTooLarge { len: data.len() })?;
        Ok(Header { length })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.length.to_be_bytes());
    }

    /// Split a stream into its header and its code stream.
    pub fn read(stream: &[u8]) -> Result<(Self, &[u8]), LzwError> {
        let mut found = [0; 4];
        let marker = stream.len().min(MAGIC.len());
        found[..marker].copy_from_slice(&stream[..marker]);

        if stream.len() < HEADER_LEN || found != MAGIC {
            return Err(LzwError::FormatMismatch { found });
        }

        let mut length = [0; 4];
        length.copy_from_slice(&stream[4..HEADER_LEN]);
        let header = Header {
            length: u32::from_be_bytes(length),
        };

        Ok((header, &stream[HEADER_LEN..]))
    }
}
