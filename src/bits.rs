//! Packing of codes into bit streams.
//!
//! Codes are concatenated without any padding between them. After the last code the stream is
//! padded with zero bits to a whole byte.
use crate::dictionary::SEEDS;
use crate::error::LzwError;
use crate::{config::Config, Code, MAX_CODESIZE, MIN_CODESIZE};

/// The order of bits in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    /// The most significant bit is processed first.
    Msb,
    /// The least significant bit is processed first.
    Lsb,
}

/// The number of bits each code of a stream occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeWidth {
    /// Every code has the same width.
    Fixed(u8),
    /// The width follows the size of the dictionary at the time the code is emitted.
    ///
    /// Starts at 9 bits and grows by one each time the dictionary passes a power of two, up to
    /// `max_code_size` bits.
    Variable { max_code_size: u8 },
}

/// Sink for codes of varying width.
pub trait CodeWriter {
    /// Append a code of `width` bits. The code must fit.
    fn write_code(&mut self, code: Code, width: u8);
    /// Pad to a whole byte and return all written bytes.
    fn finish(self) -> Vec<u8>;
}

/// Source of codes of varying width.
pub trait CodeReader {
    /// Read the next code of `width` bits, or `None` if fewer bits remain.
    fn read_code(&mut self, width: u8) -> Option<Code>;
    /// The number of whole bytes that have not been touched by any read code.
    fn trailing_bytes(&self) -> usize;
}

#[derive(Default)]
pub struct MsbWriter {
    out: Vec<u8>,
    /// The buffer bits.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
}

#[derive(Default)]
pub struct LsbWriter {
    out: Vec<u8>,
    /// The buffer bits.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
}

pub struct MsbReader<'a> {
    inp: &'a [u8],
    bit_buffer: u64,
    bits: u8,
}

pub struct LsbReader<'a> {
    inp: &'a [u8],
    bit_buffer: u64,
    bits: u8,
}

impl CodeWidth {
    /// The growing width of the `LZW1` container for a configuration.
    pub fn variable(config: &Config) -> Self {
        CodeWidth::Variable {
            max_code_size: config.max_code_size(),
        }
    }

    /// The width of the code at position `index` of a stream.
    pub fn at(&self, index: usize) -> u8 {
        match *self {
            CodeWidth::Fixed(width) => width,
            CodeWidth::Variable { max_code_size } => {
                // The encoder holds exactly this many entries when emitting the code.
                let max_entries = 1u64 << max_code_size;
                let entries = (SEEDS as u64).saturating_add(index as u64).min(max_entries);
                let bits = (64 - (entries - 1).leading_zeros()) as u8;
                bits.max(MIN_CODESIZE)
            }
        }
    }

    fn validate(&self) -> Result<(), LzwError> {
        match *self {
            CodeWidth::Fixed(width) if width == 0 || width > MAX_CODESIZE => {
                Err(LzwError::InvalidCodeSize(width))
            }
            CodeWidth::Variable { max_code_size } => {
                Config::new(max_code_size).map(|_| ())
            }
            CodeWidth::Fixed(_) => Ok(()),
        }
    }
}

/// Serialize `codes` with the given width schedule.
///
/// Fails with `CodeTooWide` if a code does not fit the width of its position.
pub fn pack(codes: &[Code], width: CodeWidth, order: BitOrder) -> Result<Vec<u8>, LzwError> {
    width.validate()?;
    match order {
        BitOrder::Msb => pack_with(MsbWriter::default(), codes, width),
        BitOrder::Lsb => pack_with(LsbWriter::default(), codes, width),
    }
}

/// Read `count` codes that were packed with the same width schedule and order.
///
/// Pad bits after the last code are ignored.
pub fn unpack(
    bytes: &[u8],
    width: CodeWidth,
    order: BitOrder,
    count: usize,
) -> Result<Vec<Code>, LzwError> {
    width.validate()?;
    match order {
        BitOrder::Msb => unpack_with(MsbReader::new(bytes), width, count),
        BitOrder::Lsb => unpack_with(LsbReader::new(bytes), width, count),
    }
}

fn pack_with(
    mut writer: impl CodeWriter,
    codes: &[Code],
    width: CodeWidth,
) -> Result<Vec<u8>, LzwError> {
    for (index, &code) in codes.iter().enumerate() {
        let bits = width.at(index);
        if code >> bits != 0 {
            return Err(LzwError::CodeTooWide { code, width: bits });
        }
        writer.write_code(code, bits);
    }

    Ok(writer.finish())
}

fn unpack_with(
    mut reader: impl CodeReader,
    width: CodeWidth,
    count: usize,
) -> Result<Vec<Code>, LzwError> {
    let mut codes = Vec::with_capacity(count);
    for index in 0..count {
        match reader.read_code(width.at(index)) {
            Some(code) => codes.push(code),
            None => {
                return Err(LzwError::UnexpectedEnd {
                    expected: count,
                    produced: index,
                })
            }
        }
    }

    Ok(codes)
}

impl MsbWriter {
    /// Push all full bytes if the next code may not fit anymore.
    fn push_out(&mut self) {
        if self.bits_in_buffer + MAX_CODESIZE <= 64 {
            return;
        }

        self.flush_out();
    }

    fn flush_out(&mut self) {
        while self.bits_in_buffer >= 8 {
            self.out.push(((self.buffer & 0xff00_0000_0000_0000) >> 56) as u8);
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }
    }

    fn buffer_code(&mut self, code: Code, width: u8) {
        let shift = 64 - self.bits_in_buffer - width;
        self.buffer |= u64::from(code) << shift;
        self.bits_in_buffer += width;
    }

    fn buffer_pad(&mut self) {
        let to_byte = self.bits_in_buffer.wrapping_neg() & 0x7;
        self.bits_in_buffer += to_byte;
    }
}

impl CodeWriter for MsbWriter {
    fn write_code(&mut self, code: Code, width: u8) {
        self.push_out();
        self.buffer_code(code, width);
    }

    fn finish(mut self) -> Vec<u8> {
        self.buffer_pad();
        self.flush_out();
        self.out
    }
}

impl LsbWriter {
    fn push_out(&mut self) {
        if self.bits_in_buffer + MAX_CODESIZE <= 64 {
            return;
        }

        self.flush_out();
    }

    fn flush_out(&mut self) {
        while self.bits_in_buffer >= 8 {
            self.out.push((self.buffer & 0x0000_0000_0000_00ff) as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
    }

    fn buffer_code(&mut self, code: Code, width: u8) {
        self.buffer |= u64::from(code) << self.bits_in_buffer;
        self.bits_in_buffer += width;
    }

    fn buffer_pad(&mut self) {
        let to_byte = self.bits_in_buffer.wrapping_neg() & 0x7;
        self.bits_in_buffer += to_byte;
    }
}

impl CodeWriter for LsbWriter {
    fn write_code(&mut self, code: Code, width: u8) {
        self.push_out();
        self.buffer_code(code, width);
    }

    fn finish(mut self) -> Vec<u8> {
        self.buffer_pad();
        self.flush_out();
        self.out
    }
}

impl<'a> MsbReader<'a> {
    pub fn new(inp: &'a [u8]) -> Self {
        MsbReader {
            inp,
            bit_buffer: 0,
            bits: 0,
        }
    }

    fn refill_bits(&mut self) {
        let wish_count = usize::from((64 - self.bits) / 8);
        let mut buffer = [0u8; 8];
        let new_bits = match self.inp.get(..wish_count) {
            Some(bytes) => {
                buffer[..wish_count].copy_from_slice(bytes);
                self.inp = &self.inp[wish_count..];
                wish_count * 8
            }
            None => {
                let new_bits = self.inp.len() * 8;
                buffer[..self.inp.len()].copy_from_slice(self.inp);
                self.inp = &[];
                new_bits
            }
        };
        self.bit_buffer |= u64::from_be_bytes(buffer) >> self.bits;
        self.bits += new_bits as u8;
    }

    fn get_bits(&mut self, width: u8) -> Option<Code> {
        if self.bits < width {
            return None;
        }

        let mask = (1 << width) - 1;
        let rotbuf = self.bit_buffer.rotate_left(width.into());
        self.bit_buffer = rotbuf & !mask;
        self.bits -= width;
        Some((rotbuf & mask) as Code)
    }
}

impl CodeReader for MsbReader<'_> {
    fn read_code(&mut self, width: u8) -> Option<Code> {
        if self.bits < width {
            self.refill_bits();
        }

        self.get_bits(width)
    }

    fn trailing_bytes(&self) -> usize {
        self.inp.len() + usize::from(self.bits / 8)
    }
}

impl<'a> LsbReader<'a> {
    pub fn new(inp: &'a [u8]) -> Self {
        LsbReader {
            inp,
            bit_buffer: 0,
            bits: 0,
        }
    }

    fn refill_bits(&mut self) {
        let wish_count = usize::from((64 - self.bits) / 8);
        let mut buffer = [0u8; 8];
        let new_bits = match self.inp.get(..wish_count) {
            Some(bytes) => {
                buffer[..wish_count].copy_from_slice(bytes);
                self.inp = &self.inp[wish_count..];
                wish_count * 8
            }
            None => {
                let new_bits = self.inp.len() * 8;
                buffer[..self.inp.len()].copy_from_slice(self.inp);
                self.inp = &[];
                new_bits
            }
        };
        self.bit_buffer |= u64::from_le_bytes(buffer) << self.bits;
        self.bits += new_bits as u8;
    }

    fn get_bits(&mut self, width: u8) -> Option<Code> {
        if self.bits < width {
            return None;
        }

        let mask = (1 << width) - 1;
        let code = self.bit_buffer & mask;
        self.bit_buffer >>= width;
        self.bits -= width;
        Some(code as Code)
    }
}

impl CodeReader for LsbReader<'_> {
    fn read_code(&mut self, width: u8) -> Option<Code> {
        if self.bits < width {
            self.refill_bits();
        }

        self.get_bits(width)
    }

    fn trailing_bytes(&self) -> usize {
        self.inp.len() + usize::from(self.bits / 8)
    }
}

#[cfg(test)]
mod tests {
    use super::{pack, unpack, BitOrder, CodeReader, CodeWidth, MsbReader};
    use crate::error::LzwError;

    #[test]
    fn msb_nine_bits() {
        let packed = pack(&[0x41, 0x42], CodeWidth::Fixed(9), BitOrder::Msb).unwrap();
        assert_eq!(packed, [0x20, 0x90, 0x80]);
        let codes = unpack(&packed, CodeWidth::Fixed(9), BitOrder::Msb, 2).unwrap();
        assert_eq!(codes, [0x41, 0x42]);
    }

    #[test]
    fn lsb_nine_bits() {
        let packed = pack(&[0x41, 0x42], CodeWidth::Fixed(9), BitOrder::Lsb).unwrap();
        assert_eq!(packed, [0x41, 0x84, 0x00]);
        let codes = unpack(&packed, CodeWidth::Fixed(9), BitOrder::Lsb, 2).unwrap();
        assert_eq!(codes, [0x41, 0x42]);
    }

    #[test]
    fn empty_packs_to_nothing() {
        let packed = pack(&[], CodeWidth::Fixed(12), BitOrder::Msb).unwrap();
        assert!(packed.is_empty());
    }

    #[test]
    fn variable_width_schedule() {
        let width = CodeWidth::Variable { max_code_size: 12 };
        assert_eq!(width.at(0), 9);
        assert_eq!(width.at(256), 9);
        assert_eq!(width.at(257), 10);
        assert_eq!(width.at(768), 10);
        assert_eq!(width.at(769), 11);
        assert_eq!(width.at(1 << 20), 12);

        let small = CodeWidth::Variable { max_code_size: 9 };
        assert_eq!(small.at(10_000), 9);
    }

    #[test]
    fn long_variable_stream() {
        // Codes crossing several width boundaries, each as large as its width allows.
        let width = CodeWidth::Variable { max_code_size: 16 };
        let codes: Vec<u32> = (0..5000)
            .map(|index| (1u32 << width.at(index)) - 1 - (index as u32 % 7))
            .collect();
        for &order in &[BitOrder::Msb, BitOrder::Lsb] {
            let packed = pack(&codes, width, order).unwrap();
            let back = unpack(&packed, width, order, codes.len()).unwrap();
            assert_eq!(back, codes, "{:?}", order);
        }
    }

    #[test]
    fn code_must_fit() {
        let err = pack(&[255, 512], CodeWidth::Fixed(9), BitOrder::Msb).unwrap_err();
        assert_eq!(err, LzwError::CodeTooWide { code: 512, width: 9 });
        let err = pack(&[256], CodeWidth::Variable { max_code_size: 9 }, BitOrder::Msb);
        assert!(err.is_ok());
    }

    #[test]
    fn invalid_widths() {
        assert_eq!(
            pack(&[], CodeWidth::Fixed(0), BitOrder::Msb),
            Err(LzwError::InvalidCodeSize(0))
        );
        assert_eq!(
            unpack(&[], CodeWidth::Variable { max_code_size: 30 }, BitOrder::Msb, 0),
            Err(LzwError::InvalidCodeSize(30))
        );
    }

    #[test]
    fn truncated_input() {
        let err = unpack(&[0xff], CodeWidth::Fixed(9), BitOrder::Msb, 1).unwrap_err();
        assert_eq!(err, LzwError::UnexpectedEnd { expected: 1, produced: 0 });
    }

    #[test]
    fn trailing_bytes_count_whole_bytes_only() {
        let mut reader = MsbReader::new(&[0xff, 0x80, 0x00, 0x00]);
        assert_eq!(reader.read_code(9), Some(0x1ff));
        // Seven pad bits of the second byte and two untouched bytes.
        assert_eq!(reader.trailing_bytes(), 2);
    }
}
