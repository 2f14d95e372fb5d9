use crate::{byte_reader::ByteReader, error::SerdeErr, serde::Serde, stream_writer::ByteWrite};

const SEGMENT_BITS: u32 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// A 32-bit signed integer written 7 bits per byte, least significant group
/// first, with the high bit of each byte set while more bytes follow.
///
/// Negative values are encoded through their two's complement bit pattern and
/// therefore always take the full 5 bytes.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VarInt(pub i32);

impl VarInt {
    pub const MAX_BYTES: usize = 5;

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn byte_length(self) -> usize {
        let mut value = self.0 as u32;
        let mut length = 1;
        while value & !SEGMENT_BITS != 0 {
            value >>= 7;
            length += 1;
        }
        length
    }

    /// Decode a non-negative length prefix
    pub fn de_length(reader: &mut ByteReader) -> Result<usize, SerdeErr> {
        let length = Self::de(reader)?.0;
        if length < 0 {
            return Err(SerdeErr::NegativeLength { length });
        }
        Ok(length as usize)
    }

    /// Encode a buffer length as a length prefix
    pub fn from_length(length: usize) -> Result<Self, SerdeErr> {
        let Ok(length) = i32::try_from(length) else {
            return Err(SerdeErr::StringTooLong {
                length,
                max: i32::MAX as usize,
            });
        };
        Ok(Self(length))
    }
}

impl From<i32> for VarInt {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Serde for VarInt {
    fn ser(&self, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        let mut value = self.0 as u32;
        loop {
            if value & !SEGMENT_BITS == 0 {
                writer.write_byte(value as u8);
                return Ok(());
            }
            writer.write_byte((value & SEGMENT_BITS) as u8 | CONTINUE_BIT);
            value >>= 7;
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let mut decoder = VarIntDecoder::new();
        loop {
            if let Some(value) = decoder.push(reader.read_byte()?)? {
                return Ok(value);
            }
        }
    }

    fn byte_length(&self) -> usize {
        VarInt::byte_length(*self)
    }
}

/// Incremental VarInt decoder for sources that deliver one byte at a time,
/// such as an async socket.
#[derive(Debug, Default, Clone)]
pub struct VarIntDecoder {
    value: u32,
    read: usize,
}

impl VarIntDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next byte. Returns the value once the final byte arrives.
    pub fn push(&mut self, byte: u8) -> Result<Option<VarInt>, SerdeErr> {
        if self.read >= VarInt::MAX_BYTES {
            return Err(SerdeErr::VarIntTooLong {
                max_bytes: VarInt::MAX_BYTES,
            });
        }
        self.value |= (u32::from(byte) & SEGMENT_BITS) << (7 * self.read as u32);
        self.read += 1;

        if byte & CONTINUE_BIT == 0 {
            let value = VarInt(self.value as i32);
            *self = Self::default();
            return Ok(Some(value));
        }
        if self.read == VarInt::MAX_BYTES {
            return Err(SerdeErr::VarIntTooLong {
                max_bytes: VarInt::MAX_BYTES,
            });
        }
        Ok(None)
    }
}
