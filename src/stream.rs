use std::fs::{self, File};
use std::io::{Cursor, ErrorKind, Read, Result};
use std::path::{Path, PathBuf};

use crate::LOG_PREFIX;

/// Readable view over a handle's payload.
#[derive(Debug)]
pub enum DataStream {
    File(FileStream),
    Memory(Cursor<Vec<u8>>),
}

impl DataStream {
    pub fn is_file(&self) -> bool {
        matches!(self, DataStream::File(_))
    }

    /// Release the stream. A self-deleting file stream removes its file.
    pub fn close(self) {
        if let DataStream::File(mut stream) = self {
            stream.close();
        }
    }
}

impl Read for DataStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            DataStream::File(stream) => stream.read(buf),
            DataStream::Memory(cursor) => cursor.read(buf),
        }
    }
}

/// Reads a file directly from disk; when it owns the file, the file is
/// removed on close or drop.
#[derive(Debug)]
pub struct FileStream {
    file: Option<File>,
    path: PathBuf,
    delete_on_close: bool,
}

impl FileStream {
    pub fn open(path: impl Into<PathBuf>, delete_on_close: bool) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        Ok(Self {
            file: Some(file),
            path,
            delete_on_close,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn deletes_on_close(&self) -> bool {
        self.delete_on_close
    }

    /// Idempotent
    pub fn close(&mut self) {
        if self.file.take().is_none() {
            return;
        }
        if self.delete_on_close {
            match fs::remove_file(&self.path) {
                Ok(()) => log::debug!(
                    "{} stream removed {}",
                    LOG_PREFIX,
                    self.path.display()
                ),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::warn!(
                    "{} Failed to delete {} because of error: {}",
                    LOG_PREFIX,
                    self.path.display(),
                    e
                ),
            }
        }
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        self.close();
    }
}
