//! File backend
//!
//! This module provides [`FileStream`], a thin wrapper around [`std::fs::File`]
//! that implements [`std::io::Read`], [`std::io::Write`] and [`std::io::Seek`],
//! and [`OpenMode`], the parsed form of a C-style `fopen` mode string.

use crate::error::{Error, Result};
use log::debug;
use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Access semantics encoded by a mode string such as `"rb"`, `"w+"` or `"a"`.
///
/// The grammar follows `fopen`: one of `r`, `w`, `a`, optionally followed by
/// `+` and by a `b`/`t` marker in any order. The marker is accepted and
/// ignored, there is no newline translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub truncate: bool,
    pub append: bool,
}

impl OpenMode {
    fn options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write && !self.append)
            .append(self.append)
            .create(self.create)
            .truncate(self.truncate);
        options
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("invalid open mode '{}'", mode));

        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            Some('r') => OpenMode {
                read: true,
                write: false,
                create: false,
                truncate: false,
                append: false,
            },
            Some('w') => OpenMode {
                read: false,
                write: true,
                create: true,
                truncate: true,
                append: false,
            },
            Some('a') => OpenMode {
                read: false,
                write: true,
                create: true,
                truncate: false,
                append: true,
            },
            _ => return Err(invalid()),
        };

        let mut plus = false;
        let mut marker = false;
        for c in chars {
            match c {
                '+' if !plus => {
                    plus = true;
                    parsed.read = true;
                    parsed.write = true;
                }
                'b' | 't' if !marker => marker = true,
                _ => return Err(invalid()),
            }
        }
        Ok(parsed)
    }
}

/// An open file used as a stream backend.
pub struct FileStream {
    file: File,
    /// Where the file was opened from, when known.
    path: Option<PathBuf>,
    /// Whether release should sync pending writes to disk.
    writable: bool,
}

impl FileStream {
    /// Opens the file at `file_path` with the semantics of `mode`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty path or a malformed mode, and
    /// [`Error::Io`] with the platform message when the open itself fails.
    pub fn open(file_path: &str, mode: &str) -> Result<FileStream> {
        if file_path.is_empty() {
            return Err(Error::InvalidArgument("empty path".into()));
        }
        if mode.is_empty() {
            return Err(Error::InvalidArgument("empty open mode".into()));
        }
        let open_mode: OpenMode = mode.parse()?;

        let path = Path::new(file_path);
        let file = open_mode
            .options()
            .open(path)
            .map_err(|e| Error::io(format!("cannot open '{}'", file_path), e))?;
        debug!("Opened '{}' with mode '{}'", file_path, mode);

        Ok(FileStream {
            file,
            path: Some(path.to_path_buf()),
            writable: open_mode.write,
        })
    }

    /// Wraps an already open [`File`]. Its access mode is unknown, so it is
    /// synced on release like a writable file.
    pub fn from_file(file: File) -> FileStream {
        FileStream {
            file,
            path: None,
            writable: true,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Total length of the file in bytes, as reported by its metadata.
    pub fn size(&self) -> io::Result<i64> {
        let len = self.file.metadata()?.len();
        i64::try_from(len).map_err(io::Error::other)
    }

    /// Syncs pending writes to disk and closes the file.
    ///
    /// Deferred write errors surface from the sync. The OS close that
    /// follows when the [`File`] drops cannot report failure through `std`.
    pub fn release(mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.writable {
            self.file.sync_all()?;
        }
        if let Some(path) = &self.path {
            debug!("Closing '{}'", path.display());
        }
        Ok(())
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}
