//! Fixed-width integer and float encoding in the buffer's configured byte order.

use crate::core::buffer::{ByteBuffer, Endian};
use crate::error::Result;

macro_rules! fixed_width {
    ($($write:ident, $read:ident, $ty:ty;)*) => {
        impl ByteBuffer {
            $(
                #[doc = concat!("Write a `", stringify!($ty), "` at the cursor.")]
                pub fn $write(&mut self, value: $ty) {
                    let bytes = match self.endian() {
                        Endian::Big => value.to_be_bytes(),
                        Endian::Little => value.to_le_bytes(),
                    };
                    self.write(&bytes);
                }

                #[doc = concat!("Read a `", stringify!($ty), "` at the cursor.")]
                ///
                /// # Errors
                /// Returns `ProtocolError::BufferUnderrun` if too few bytes remain
                pub fn $read(&mut self) -> Result<$ty> {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    self.read(&mut bytes)?;
                    Ok(match self.endian() {
                        Endian::Big => <$ty>::from_be_bytes(bytes),
                        Endian::Little => <$ty>::from_le_bytes(bytes),
                    })
                }
            )*
        }
    };
}

fixed_width! {
    write_i8, read_i8, i8;
    write_u8, read_u8, u8;
    write_i16, read_i16, i16;
    write_u16, read_u16, u16;
    write_i32, read_i32, i32;
    write_u32, read_u32, u32;
    write_i64, read_i64, i64;
    write_u64, read_u64, u64;
    write_f32, read_f32, f32;
    write_f64, read_f64, f64;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;
    use crate::error::ProtocolError;

    #[test]
    fn test_fixed_roundtrip_and_cursor() {
        let mut buf = ByteBuffer::new(3);
        buf.write_i8(-5);
        buf.write_u8(250);
        buf.write_i16(i16::MIN);
        buf.write_u16(0xBEEF);
        buf.write_i32(-123_456);
        buf.write_u32(u32::MAX);
        buf.write_i64(i64::MIN);
        buf.write_u64(0x0102_0304_0506_0708);
        buf.write_f32(3.5);
        buf.write_f64(-0.125);
        assert_eq!(buf.position(), 1 + 1 + 2 + 2 + 4 + 4 + 8 + 8 + 4 + 8);

        buf.set_position(0).unwrap();
        assert_eq!(buf.read_i8().unwrap(), -5);
        assert_eq!(buf.read_u8().unwrap(), 250);
        assert_eq!(buf.read_i16().unwrap(), i16::MIN);
        assert_eq!(buf.read_u16().unwrap(), 0xBEEF);
        assert_eq!(buf.read_i32().unwrap(), -123_456);
        assert_eq!(buf.read_u32().unwrap(), u32::MAX);
        assert_eq!(buf.read_i64().unwrap(), i64::MIN);
        assert_eq!(buf.read_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(buf.read_f32().unwrap(), 3.5);
        assert_eq!(buf.read_f64().unwrap(), -0.125);
        assert_eq!(buf.readable(), 0);
    }

    #[test]
    fn test_big_endian_is_default() {
        let mut buf = ByteBuffer::new(8);
        buf.write_u32(0x0A0B_0C0D);
        buf.set_position(0).unwrap();
        assert_eq!(buf.to_vec(), vec![0x0A, 0x0B, 0x0C, 0x0D]);
    }

    #[test]
    fn test_little_endian() {
        let mut buf = ByteBuffer::new(8);
        buf.set_endian(Endian::Little);
        assert!(buf.is_little_endian());
        buf.write_u16(0x0102);
        buf.write_f32(1.0);
        buf.set_position(0).unwrap();
        assert_eq!(buf.to_vec(), vec![0x02, 0x01, 0x00, 0x00, 0x80, 0x3F]);
        assert_eq!(buf.read_u16().unwrap(), 0x0102);
        assert_eq!(buf.read_f32().unwrap(), 1.0);
    }

    #[test]
    fn test_short_read_fails_without_moving() {
        let mut buf = ByteBuffer::from_slice(4, &[1, 2, 3]);
        let err = buf.read_u64().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::BufferUnderrun {
                requested: 8,
                available: 3
            }
        ));
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.read_u16().unwrap(), 0x0102);
    }
}
