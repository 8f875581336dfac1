pub mod backend;
pub mod error;
pub mod file;
pub mod mem;

use backend::{Backend, CustomStream};
use error::{Error, Result};
use file::FileStream;
use log::{debug, trace, warn};
use mem::MemoryStream;
use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write},
};

/// Seek relative to the start of the stream.
pub const SEEK_SET: i32 = 0;
/// Seek relative to the current cursor.
pub const SEEK_CUR: i32 = 1;
/// Seek relative to the end of the stream.
pub const SEEK_END: i32 = 2;

/// Origin of a [`StreamHandle::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            SEEK_SET => Ok(Whence::Set),
            SEEK_CUR => Ok(Whence::Cur),
            SEEK_END => Ok(Whence::End),
            _ => Err(Error::InvalidArgument(format!(
                "invalid whence value {}",
                value
            ))),
        }
    }
}

impl From<Whence> for i32 {
    fn from(whence: Whence) -> i32 {
        match whence {
            Whence::Set => SEEK_SET,
            Whence::Cur => SEEK_CUR,
            Whence::End => SEEK_END,
        }
    }
}

/// Whether closing a handle releases its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Borrowed,
}

enum Slot<'a> {
    Owned(Backend),
    Borrowed(&'a mut Backend),
}

/// Uniform positional byte stream over a [`Backend`].
///
/// An `Owned` handle releases its backend exactly once, on [`close`],
/// [`free`] or drop, whichever comes first. A `Borrowed` handle only
/// detaches; the backend stays usable by its owner.
///
/// After teardown every I/O operation fails with [`Error::InvalidHandle`].
///
/// [`close`]: StreamHandle::close
/// [`free`]: StreamHandle::free
pub struct StreamHandle<'a> {
    slot: Option<Slot<'a>>,
    ownership: Ownership,
}

impl StreamHandle<'static> {
    /// Opens `path` with a `fopen`-style `mode` (`"r"`, `"wb"`, `"a+"`, ...).
    ///
    /// ```no_run
    /// # use rwstream::{StreamHandle, Whence};
    /// # fn main() -> Result<(), rwstream::error::Error> {
    /// let mut stream = StreamHandle::open("test.bin", "rb")?;
    /// let size = stream.size()?;
    /// stream.seek(0, Whence::Set)?;
    /// let head = stream.read(16)?;
    /// stream.close()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: &str, mode: &str) -> Result<Self> {
        let file = FileStream::open(path, mode)?;
        Ok(Self::from_backend(Backend::File(file)))
    }

    /// Takes ownership of an already built backend.
    pub fn from_backend(backend: Backend) -> Self {
        trace!("Wrapping owned {} backend", backend.kind());
        StreamHandle {
            slot: Some(Slot::Owned(backend)),
            ownership: Ownership::Owned,
        }
    }

    pub fn from_file(file: File) -> Self {
        Self::from_backend(Backend::File(FileStream::from_file(file)))
    }

    /// Fixed-size writable stream over `data`.
    pub fn from_mem(data: Vec<u8>) -> Self {
        Self::from_backend(Backend::Memory(MemoryStream::new(data)))
    }

    /// Read-only stream over `data`.
    pub fn from_const_mem(data: impl Into<Vec<u8>>) -> Self {
        Self::from_backend(Backend::Memory(MemoryStream::read_only(data)))
    }

    pub fn from_custom(stream: impl CustomStream + 'static) -> Self {
        Self::from_backend(Backend::Custom(Box::new(stream)))
    }
}

impl<'a> StreamHandle<'a> {
    /// Uses `backend` without taking ownership of it.
    pub fn borrowed(backend: &'a mut Backend) -> Self {
        trace!("Wrapping borrowed {} backend", backend.kind());
        StreamHandle {
            slot: Some(Slot::Borrowed(backend)),
            ownership: Ownership::Borrowed,
        }
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    fn backend(&mut self) -> Result<&mut Backend> {
        match self.slot.as_mut() {
            Some(Slot::Owned(backend)) => Ok(backend),
            Some(Slot::Borrowed(backend)) => Ok(&mut **backend),
            None => Err(Error::InvalidHandle),
        }
    }

    /// Total length of the stream in bytes.
    ///
    /// `-1` is a valid answer meaning the backend does not know its size.
    pub fn size(&mut self) -> Result<i64> {
        let size = self
            .backend()?
            .size()
            .map_err(|e| Error::io("cannot determine stream size", e))?;
        if size < -1 {
            return Err(Error::io(
                "cannot determine stream size",
                io::Error::other(format!("backend reported size {}", size)),
            ));
        }
        Ok(size)
    }

    /// Moves the cursor and returns its new absolute position.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<i64> {
        let pos = match whence {
            Whence::Set => match u64::try_from(offset) {
                Ok(offset) => SeekFrom::Start(offset),
                Err(_) => {
                    return Err(Error::io(
                        "seek failed",
                        io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("negative absolute offset {}", offset),
                        ),
                    ))
                }
            },
            Whence::Cur => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };
        let new_pos = self
            .backend()?
            .seek(pos)
            .map_err(|e| Error::io("seek failed", e))?;
        trace!("Seek {:?} -> {}", pos, new_pos);
        i64::try_from(new_pos).map_err(|e| Error::io("seek failed", io::Error::other(e)))
    }

    pub fn tell(&mut self) -> Result<i64> {
        self.seek(0, Whence::Cur)
    }

    /// Reads up to `max_bytes` from the cursor.
    ///
    /// The buffer grows as data arrives, so it is shorter than requested
    /// when the end of the stream comes first.
    pub fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let backend = self.backend()?;
        let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
        let mut buffer = Vec::new();
        let filled = Read::take(backend, limit)
            .read_to_end(&mut buffer)
            .map_err(|e| Error::io("read failed", e))?;
        trace!("Read {} of {} requested bytes", filled, max_bytes);
        Ok(buffer)
    }

    /// Writes all of `data` at the cursor.
    ///
    /// A backend that stops accepting bytes before the end of `data` makes
    /// this fail with an [`io::ErrorKind::WriteZero`] error; the bytes it
    /// did accept stay written.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let backend = self.backend()?;
        let mut written = 0;
        while written < data.len() {
            match backend.write(&data[written..]) {
                Ok(0) => {
                    return Err(Error::io(
                        "short write",
                        io::Error::new(
                            io::ErrorKind::WriteZero,
                            format!("wrote {} of {} bytes", written, data.len()),
                        ),
                    ))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io("write failed", e)),
            }
        }
        trace!("Wrote {} bytes", written);
        Ok(())
    }

    /// Writes the textual representation of `value`.
    pub fn write_display(&mut self, value: &impl std::fmt::Display) -> Result<()> {
        self.write(value.to_string().as_bytes())
    }

    /// Flushes and releases an owned backend, or detaches a borrowed one.
    ///
    /// The handle is closed afterwards even when the release fails. Closing
    /// a closed handle does nothing.
    pub fn close(&mut self) -> Result<()> {
        match self.slot.take() {
            None => Ok(()),
            Some(Slot::Borrowed(backend)) => {
                debug!("Detaching from borrowed {} backend", backend.kind());
                Ok(())
            }
            Some(Slot::Owned(backend)) => {
                debug!("Releasing {} backend", backend.kind());
                backend
                    .release()
                    .map_err(|e| Error::io("cannot release stream", e))
            }
        }
    }

    /// Same teardown as [`close`](StreamHandle::close) with the error logged
    /// instead of returned.
    pub fn free(&mut self) {
        if let Err(err) = self.close() {
            warn!("Error while freeing stream: {}", err);
        }
    }
}

impl Drop for StreamHandle<'_> {
    fn drop(&mut self) {
        self.free();
    }
}

/// Whether `path` can be opened for reading. The probe handle is closed
/// before returning.
pub fn file_exists(path: &str) -> bool {
    match StreamHandle::open(path, "r") {
        Ok(mut probe) => {
            probe.free();
            true
        }
        Err(err) => {
            debug!("'{}' does not exist or is unreadable: {}", path, err);
            false
        }
    }
}
