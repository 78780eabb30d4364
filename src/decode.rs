//! A module for all decoding needs.
use crate::bits::{CodeReader, CodeWidth, MsbReader};
use crate::config::Config;
use crate::container::Header;
use crate::dictionary::Dictionary;
use crate::error::LzwError;
use crate::Code;

use std::io::{self, Read, Write};

/// The LZW decoder, inverse of [`Encoder`].
///
/// Must be constructed with the same [`Config`] as the encoder of the stream.
///
/// [`Encoder`]: ../encode/struct.Encoder.html
/// [`Config`]: ../config/struct.Config.html
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: Config,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    decoder: &'d Decoder,
    writer: W,
}

/// An async decoding sink.
///
/// See [`Decoder::into_async`] on how to create this type and more information.
///
/// [`Decoder::into_async`]: struct.Decoder.html#method.into_async
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    decoder: &'d Decoder,
    writer: W,
}

/// The result of coding a whole reader into a writer.
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The possible error that occurred.
    ///
    /// Coding errors are reported with `io::ErrorKind::InvalidData` and wrap an `LzwError`.
    pub status: io::Result<()>,
}

/// The state of one decoding pass.
pub(crate) struct DecodeState {
    /// The table of decoded codes.
    dict: Dictionary,
    /// The previously decoded code.
    last: Option<Code>,
}

impl Decoder {
    /// A decoder with the default 20-bit dictionary limit.
    pub fn new() -> Self {
        Decoder::default()
    }

    pub fn with_config(config: Config) -> Self {
        Decoder { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Turn a code sequence back into the data it was encoded from.
    pub fn decode(&self, codes: &[Code]) -> Result<Vec<u8>, LzwError> {
        let mut state = DecodeState::new(self.config);
        let mut out = Vec::new();
        for &code in codes {
            state.push_code(code, &mut out)?;
        }
        Ok(out)
    }

    /// Decompress a complete `LZW1` stream.
    ///
    /// Nothing is returned unless the whole stream is valid.
    pub fn decompress(&self, stream: &[u8]) -> Result<Vec<u8>, LzwError> {
        let result = self.decompress_stream(stream);
        if let Err(err) = &result {
            tracing::debug!(%err, input = stream.len(), "decompression failed");
        }
        result
    }

    /// Construct a decoder into a writer.
    pub fn into_stream<W: Write>(&self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Construct a decoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite + Unpin>(&self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            decoder: self,
            writer,
        }
    }

    fn decompress_stream(&self, stream: &[u8]) -> Result<Vec<u8>, LzwError> {
        let (header, body) = Header::read(stream)?;
        let expected = header.length as usize;
        let width = CodeWidth::variable(&self.config);

        let mut reader = MsbReader::new(body);
        let mut state = DecodeState::new(self.config);
        // The length is untrusted, only reserve what the body could plausibly expand to.
        let mut out = Vec::with_capacity(expected.min(body.len().saturating_mul(16)));
        let mut count = 0;

        while out.len() < expected {
            let code = reader
                .read_code(width.at(count))
                .ok_or(LzwError::UnexpectedEnd {
                    expected,
                    produced: out.len(),
                })?;
            state.push_code(code, &mut out)?;
            count += 1;
        }

        if out.len() > expected {
            return Err(LzwError::LengthOverrun { expected });
        }

        let extra = reader.trailing_bytes();
        if extra > 0 {
            return Err(LzwError::TrailingData { extra });
        }

        tracing::debug!(input = stream.len(), output = out.len(), codes = count, "decompressed");
        Ok(out)
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decompress one `LZW1` stream read from a reader.
    ///
    /// The reader is drained into memory first and nothing is written if the stream is invalid.
    pub fn decode_all(self, mut read: impl Read) -> AllResult {
        let IntoStream {
            decoder,
            mut writer,
        } = self;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let mut data = Vec::new();
        let status = (|| -> io::Result<()> {
            bytes_read = read.read_to_end(&mut data)?;
            let decoded = decoder.decompress(&data)?;
            writer.write_all(&decoded)?;
            writer.flush()?;
            bytes_written = decoded.len();
            Ok(())
        })();

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

#[cfg(feature = "async")]
impl<W: futures::io::AsyncWrite + Unpin> IntoAsync<'_, W> {
    /// Decompress one `LZW1` stream read from an async reader.
    pub async fn decode_all(self, mut read: impl futures::io::AsyncRead + Unpin) -> AllResult {
        use futures::io::{AsyncReadExt, AsyncWriteExt};

        let IntoAsync {
            decoder,
            mut writer,
        } = self;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let mut data = Vec::new();
        let status = async {
            bytes_read = read.read_to_end(&mut data).await?;
            let decoded = decoder.decompress(&data)?;
            writer.write_all(&decoded).await?;
            writer.flush().await?;
            bytes_written = decoded.len();
            Ok::<_, io::Error>(())
        }
        .await;

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl DecodeState {
    pub(crate) fn new(config: Config) -> Self {
        DecodeState {
            dict: Dictionary::new(config),
            last: None,
        }
    }

    /// Decode one code and append its bytes to `out`.
    ///
    /// Each code after the first defines the entry the encoder created right after emitting the
    /// previous code: that previous sequence extended by the first byte of this one.
    pub(crate) fn push_code(&mut self, code: Code, out: &mut Vec<u8>) -> Result<(), LzwError> {
        let next = self.dict.size() as Code;
        let invalid = LzwError::InvalidCode { code, next };
        let start = out.len();

        let first = if self.dict.write_sequence(code, out).is_some() {
            out[start]
        } else {
            // Only the code which is being defined by this very step may be unknown. Its
            // sequence is the previous one extended by its own first byte.
            match self.last {
                Some(last) if code == next && !self.dict.is_full() => {
                    self.dict.write_sequence(last, out);
                    let first = out[start];
                    out.push(first);
                    first
                }
                _ => return Err(invalid),
            }
        };

        if let Some(last) = self.last {
            if !self.dict.is_full() {
                if self.dict.successor(last, first).is_some() {
                    out.truncate(start);
                    return Err(invalid);
                }
                let _ = self.dict.append(last, first);
            }
        }

        self.last = Some(code);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn dictionary(&self) -> &Dictionary {
        &self.dict
    }
}
