//! A module for all encoding needs.
use crate::bits::{CodeWidth, CodeWriter, MsbWriter};
use crate::config::Config;
use crate::container::Header;
use crate::decode::AllResult;
use crate::dictionary::Dictionary;
use crate::error::LzwError;
use crate::Code;

use std::io::{self, Read, Write};

/// The LZW encoder.
///
/// Each call builds a fresh dictionary, an encoder can be reused for any number of inputs.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: Config,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type and more information.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    encoder: &'d Encoder,
    writer: W,
}

/// An async encoding sink.
///
/// See [`Encoder::into_async`] on how to create this type and more information.
///
/// [`Encoder::into_async`]: struct.Encoder.html#method.into_async
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    encoder: &'d Encoder,
    writer: W,
}

/// The state of one encoding pass.
pub(crate) struct EncodeState {
    /// The current encoding symbol tree.
    dict: Dictionary,
}

impl Encoder {
    /// An encoder with the default 20-bit dictionary limit.
    pub fn new() -> Self {
        Encoder::default()
    }

    pub fn with_config(config: Config) -> Self {
        Encoder { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Turn `data` into the sequence of dictionary codes.
    pub fn encode(&self, data: &[u8]) -> Vec<Code> {
        let mut codes = Vec::new();
        EncodeState::new(self.config).advance(data, |code, _| codes.push(code));
        codes
    }

    /// Compress `data` into an `LZW1` stream.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        let header = Header::for_data(data)?;
        let width = CodeWidth::variable(&self.config);

        let mut writer = MsbWriter::default();
        let mut count = 0;
        EncodeState::new(self.config).advance(data, |code, _| {
            writer.write_code(code, width.at(count));
            count += 1;
        });

        let body = writer.finish();
        let mut out = Vec::with_capacity(crate::container::HEADER_LEN + body.len());
        header.write(&mut out);
        out.extend_from_slice(&body);

        tracing::debug!(input = data.len(), output = out.len(), codes = count, "compressed");
        Ok(out)
    }

    /// Construct an encoder into a writer.
    pub fn into_stream<W: Write>(&self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Construct an encoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite + Unpin>(&self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            encoder: self,
            writer,
        }
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Compress all data of a reader into one `LZW1` stream.
    ///
    /// The reader is drained into memory first.
    pub fn encode_all(self, mut read: impl Read) -> AllResult {
        let IntoStream {
            encoder,
            mut writer,
        } = self;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let mut data = Vec::new();
        let status = (|| -> io::Result<()> {
            bytes_read = read.read_to_end(&mut data)?;
            let packed = encoder.compress(&data)?;
            writer.write_all(&packed)?;
            writer.flush()?;
            bytes_written = packed.len();
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
    /// Compress all data of an async reader into one `LZW1` stream.
    pub async fn encode_all(self, mut read: impl futures::io::AsyncRead + Unpin) -> AllResult {
        use futures::io::{AsyncReadExt, AsyncWriteExt};

        let IntoAsync {
            encoder,
            mut writer,
        } = self;

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let mut data = Vec::new();
        let status = async {
            bytes_read = read.read_to_end(&mut data).await?;
            let packed = encoder.compress(&data)?;
            writer.write_all(&packed).await?;
            writer.flush().await?;
            bytes_written = packed.len();
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

impl EncodeState {
    pub(crate) fn new(config: Config) -> Self {
        EncodeState {
            dict: Dictionary::new(config),
        }
    }

    /// Encode all of `inp`, handing each code to `emit` together with the table it was read from.
    pub(crate) fn advance(&mut self, inp: &[u8], mut emit: impl FnMut(Code, &Dictionary)) {
        let mut bytes = inp.iter();
        let mut current_code = match bytes.next() {
            Some(&byte) => Code::from(byte),
            None => return,
        };

        for &byte in bytes {
            match self.dict.successor(current_code, byte) {
                Some(code) => current_code = code,
                None => {
                    emit(current_code, &self.dict);
                    // Ignored once the table is frozen.
                    let _ = self.dict.append(current_code, byte);
                    current_code = Code::from(byte);
                }
            }
        }

        emit(current_code, &self.dict);
    }

    #[cfg(test)]
    pub(crate) fn dictionary(&self) -> &Dictionary {
        &self.dict
    }
}
