use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Reader half of an ABC tag byte stream.
///
/// The cursor only ever advances; the pool codec never seeks.
pub struct TagReader<R> {
    read: R,
}

impl<R: Read> TagReader<R> {
    pub fn new(read: R) -> TagReader<R> {
        TagReader { read }
    }

    pub fn into_inner(self) -> R {
        self.read
    }

    #[inline]
    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.read.read_u8()
    }

    /// Reads a variable-length unsigned integer: 7 payload bits per byte,
    /// low bits first, high bit as the continuation flag, up to 30 bits
    /// of payload in at most 5 bytes.
    pub fn read_u30(&mut self) -> io::Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let b = self.read_u8()?;
            value |= ((b & 0x7f) as u32) << shift;
            shift += 7;
            if b & 0x80 == 0 || shift >= 32 {
                return Ok(value);
            }
        }
    }

    /// Reads a variable-length signed integer: the same encoding as
    /// [TagReader::read_u30], with bit 6 of the final byte extended over
    /// the remaining high bits.
    pub fn read_s30(&mut self) -> io::Result<i32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let b = self.read_u8()?;
            value |= ((b & 0x7f) as u32) << shift;
            shift += 7;
            if b & 0x80 == 0 {
                if shift < 32 && b & 0x40 != 0 {
                    value |= u32::MAX << shift;
                }
                return Ok(value as i32);
            }
            if shift >= 32 {
                return Ok(value as i32);
            }
        }
    }

    /// Reads an IEEE-754 double as 8 raw little-endian bytes.
    #[inline]
    pub fn read_d64(&mut self) -> io::Result<f64> {
        self.read.read_f64::<LittleEndian>()
    }

    pub fn read_block(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut bytes = vec![0; len];
        self.read.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

/// Writer half of an ABC tag byte stream.
pub struct TagWriter<W> {
    write: W,
}

impl<W: Write> TagWriter<W> {
    pub fn new(write: W) -> TagWriter<W> {
        TagWriter { write }
    }

    pub fn into_inner(self) -> W {
        self.write
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write.write_u8(value)
    }

    pub fn write_u30(&mut self, mut value: u32) -> io::Result<()> {
        loop {
            let b = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                return self.write_u8(b);
            }
            self.write_u8(b | 0x80)?;
        }
    }

    pub fn write_s30(&mut self, mut value: i32) -> io::Result<()> {
        loop {
            let b = (value & 0x7f) as u8;
            value >>= 7;
            // done once the remaining bits match the sign bit just written
            if (value == 0 && b & 0x40 == 0) || (value == -1 && b & 0x40 != 0) {
                return self.write_u8(b);
            }
            self.write_u8(b | 0x80)?;
        }
    }

    #[inline]
    pub fn write_d64(&mut self, value: f64) -> io::Result<()> {
        self.write.write_f64::<LittleEndian>(value)
    }

    pub fn write_block(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write.write_all(bytes)
    }

    /// Writes the length as u30 followed by the raw bytes, no terminator.
    pub fn write_u30_string(&mut self, value: &str) -> io::Result<()> {
        self.write_u30(value.len() as u32)?;
        self.write_block(value.as_bytes())
    }
}
