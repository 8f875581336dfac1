//! Memory backends
//!
//! [`MemoryStream`] serves a byte buffer through the same `Read` / `Write` /
//! `Seek` surface as a file. The buffer never grows: writes stop at its end,
//! so a write that would overflow is only partially accepted.

use std::io::{self, Read, Seek, SeekFrom, Write};

pub struct MemoryStream {
    data: Vec<u8>,
    /// Cursor, always within `0..=data.len()`.
    pos: usize,
    writable: bool,
}

impl MemoryStream {
    /// A fixed-size, writable stream over `data`.
    pub fn new(data: Vec<u8>) -> Self {
        MemoryStream {
            data,
            pos: 0,
            writable: true,
        }
    }

    /// A read-only stream over a copy of `data`.
    pub fn read_only(data: impl Into<Vec<u8>>) -> Self {
        MemoryStream {
            data: data.into(),
            pos: 0,
            writable: false,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }

    fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.remaining().len().min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot write to a read-only memory stream",
            ));
        }
        let n = self.remaining().len().min(buf.len());
        self.data[self.pos..self.pos + n].copy_from_slice(&buf[..n]);
        self.pos += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStream {
    /// Seeking past the end clamps the cursor to the end of the buffer;
    /// seeking before the start is an error.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(offset) => (0i128, offset as i128),
            SeekFrom::Current(offset) => (self.pos as i128, offset as i128),
            SeekFrom::End(offset) => (self.data.len() as i128, offset as i128),
        };
        let target = base + offset;
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative position",
            ));
        }
        self.pos = target.min(self.data.len() as i128) as usize;
        Ok(self.pos as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_stops_at_end_of_buffer() {
        let mut mem = MemoryStream::new(vec![0; 4]);
        mem.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(mem.write(b"xyz").unwrap(), 2);
        assert_eq!(mem.write(b"z").unwrap(), 0);
        assert_eq!(mem.as_slice(), &[0, 0, b'x', b'y']);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut mem = MemoryStream::read_only(&b"frozen"[..]);
        assert!(!mem.is_writable());
        let err = mem.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(mem.into_inner(), b"frozen");
    }

    #[test]
    fn test_seek_clamps_and_rejects_negative() {
        let mut mem = MemoryStream::read_only(&b"0123456789"[..]);
        assert_eq!(mem.seek(SeekFrom::End(-3)).unwrap(), 7);
        assert_eq!(mem.seek(SeekFrom::Current(100)).unwrap(), 10);
        assert!(mem.seek(SeekFrom::Current(-11)).is_err());
        // A failed seek leaves the cursor alone.
        assert_eq!(mem.seek(SeekFrom::Current(0)).unwrap(), 10);
    }

    #[test]
    fn test_short_read_at_end() {
        let mut mem = MemoryStream::read_only(&b"abc"[..]);
        mem.seek(SeekFrom::Start(1)).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(mem.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"bc");
        assert_eq!(mem.read(&mut buf).unwrap(), 0);
    }
}
