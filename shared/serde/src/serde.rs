use crate::{byte_reader::ByteReader, error::SerdeErr, stream_writer::ByteWrite, var_int::VarInt};

/// Longest string, in UTF-16 code units, the protocol accepts in a packet.
pub const MAX_STRING_LENGTH: usize = 32767;

/// A type that can be written to and read back from the wire.
///
/// Multi-byte integers and floats are big-endian, strings are UTF-8 with a
/// VarInt byte-length prefix.
pub trait Serde: Sized {
    fn ser(&self, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr>;
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
    fn byte_length(&self) -> usize;
}

macro_rules! impl_serde_for_number {
    ($type:ty) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
                writer.write_bytes(&self.to_be_bytes());
                Ok(())
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(<$type>::from_be_bytes(reader.read_array()?))
            }

            fn byte_length(&self) -> usize {
                std::mem::size_of::<$type>()
            }
        }
    };
}

impl_serde_for_number!(u8);
impl_serde_for_number!(i8);
impl_serde_for_number!(u16);
impl_serde_for_number!(i16);
impl_serde_for_number!(i32);
impl_serde_for_number!(i64);
impl_serde_for_number!(u128);
impl_serde_for_number!(f32);
impl_serde_for_number!(f64);

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        writer.write_byte(u8::from(*self));
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(reader.read_byte()? != 0)
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        let length = self.encode_utf16().count();
        if length > MAX_STRING_LENGTH {
            return Err(SerdeErr::StringTooLong {
                length,
                max: MAX_STRING_LENGTH,
            });
        }
        VarInt(self.len() as i32).ser(writer)?;
        writer.write_bytes(self.as_bytes());
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = VarInt::de_length(reader)?;
        // a UTF-16 code unit takes at most 3 UTF-8 bytes
        if length > MAX_STRING_LENGTH * 3 {
            return Err(SerdeErr::StringTooLong {
                length,
                max: MAX_STRING_LENGTH * 3,
            });
        }
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidUtf8)
    }

    fn byte_length(&self) -> usize {
        VarInt(self.len() as i32).byte_length() + self.len()
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        match self {
            Some(value) => {
                true.ser(writer)?;
                value.ser(writer)
            }
            None => false.ser(writer),
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn byte_length(&self) -> usize {
        1 + self.as_ref().map_or(0, Serde::byte_length)
    }
}
