//! Little-endian helpers for the save-state stream.
//!
//! The stream has no header or framing; every field is written in a fixed
//! order and read back with `read_exact`, so a short stream surfaces as
//! `Error::Io` (`UnexpectedEof`).

use std::io::{self, Read, Write};

use crate::{Error, Result};

/// Error for a field that was read in full but holds a value no running
/// machine can produce.
pub(crate) fn invalid_data(msg: String) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, msg))
}

pub(crate) trait StateWrite: Write {
    fn put_u8(&mut self, value: u8) -> Result<()> {
        self.write_all(&[value])?;
        Ok(())
    }

    fn put_bool(&mut self, value: bool) -> Result<()> {
        self.put_u8(u8::from(value))
    }

    fn put_u16(&mut self, value: u16) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn put_u32(&mut self, value: u32) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn put_i32(&mut self, value: i32) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> StateWrite for W {}

pub(crate) trait StateRead: Read {
    fn get_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn get_bool(&mut self) -> Result<bool> {
        Ok(self.get_u8()? != 0)
    }

    fn get_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn get_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn get_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Fill `dst` completely from the stream.
    fn get_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.read_exact(dst)?;
        Ok(())
    }
}

impl<R: Read + ?Sized> StateRead for R {}
