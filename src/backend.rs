use crate::{file::FileStream, mem::MemoryStream};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// A user supplied stream backend.
///
/// Anything that can read, write and seek can back a
/// [`crate::StreamHandle`]. Backends that cannot answer [`size`] should
/// return `Ok(-1)`; backends with nothing to tear down can keep the default
/// [`release`].
///
/// [`size`]: CustomStream::size
/// [`release`]: CustomStream::release
pub trait CustomStream: Read + Write + Seek + Send {
    /// Total length in bytes, `-1` when unknown.
    fn size(&mut self) -> io::Result<i64> {
        let here = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(here))?;
        i64::try_from(end).map_err(io::Error::other)
    }

    /// Called exactly once when an owning handle tears the backend down.
    fn release(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

/// The concrete resource behind a stream handle.
pub enum Backend {
    File(FileStream),
    Memory(MemoryStream),
    Custom(Box<dyn CustomStream>),
}

impl Backend {
    pub fn kind(&self) -> &'static str {
        match self {
            Backend::File(_) => "file",
            Backend::Memory(mem) if mem.is_writable() => "memory",
            Backend::Memory(_) => "const-memory",
            Backend::Custom(_) => "custom",
        }
    }

    pub fn size(&mut self) -> io::Result<i64> {
        match self {
            Backend::File(file) => file.size(),
            Backend::Memory(mem) => Ok(mem.size()),
            Backend::Custom(custom) => custom.size(),
        }
    }

    /// Flushes and tears down the resource.
    pub fn release(self) -> io::Result<()> {
        match self {
            Backend::File(file) => file.release(),
            Backend::Memory(_) => Ok(()),
            Backend::Custom(mut custom) => {
                custom.flush()?;
                custom.release()
            }
        }
    }
}

impl Read for Backend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Backend::File(file) => file.read(buf),
            Backend::Memory(mem) => mem.read(buf),
            Backend::Custom(custom) => custom.read(buf),
        }
    }
}

impl Write for Backend {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Backend::File(file) => file.write(buf),
            Backend::Memory(mem) => mem.write(buf),
            Backend::Custom(custom) => custom.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Backend::File(file) => file.flush(),
            Backend::Memory(mem) => mem.flush(),
            Backend::Custom(custom) => custom.flush(),
        }
    }
}

impl Seek for Backend {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Backend::File(file) => file.seek(pos),
            Backend::Memory(mem) => mem.seek(pos),
            Backend::Custom(custom) => custom.seek(pos),
        }
    }
}
