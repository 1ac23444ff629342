use std::borrow::Cow;
use std::fmt;
use std::fs::{self, File};
use std::io::{Cursor, ErrorKind, Read, Write};
use std::path::Path;

use crate::config::DataConfig;
use crate::encoding;
use crate::payload::{Payload, Source};
use crate::stream::{DataStream, FileStream};
use crate::tmp;
use crate::{DataError, Result, LOG_PREFIX};

/// Owner of one payload of unknown origin: a file on disk, bytes, characters,
/// a string, or nothing at all.
///
/// By default the handle is responsible for a backing file and removes it
/// when the payload is replaced, when [`DataHandle::dispose`] is called, or
/// when the handle is dropped. Clear the delete flag to keep the file.
///
/// The handle is not synchronized. Share it behind a lock or hand it from
/// one owner to the next.
pub struct DataHandle {
    payload: Payload,
    encoding: String,
    owns_file: bool,
    config: DataConfig,
}

impl DataHandle {
    /// Empty handle with the default config
    pub fn new() -> Self {
        Self::with_config(DataConfig::default())
    }

    pub fn with_config(config: DataConfig) -> Self {
        Self {
            payload: Payload::Empty,
            encoding: config.encoding.clone(),
            owns_file: true,
            config,
        }
    }

    pub fn from_source<'a>(
        source: impl Into<Source<'a>>,
        owns_file: bool,
    ) -> Self {
        let mut handle = Self::new();
        handle.reset(source, owns_file);
        handle
    }

    /// Handle that owns whatever file `source` refers to
    pub fn with_source<'a>(source: impl Into<Source<'a>>) -> Self {
        Self::from_source(source, true)
    }

    /// Move the payload, encoding and delete flag out of `other`; the new
    /// handle starts from a copy of `other`'s config.
    /// `other` is left empty, so only the new handle can remove the file.
    pub fn take_from(other: &mut DataHandle) -> Self {
        let mut handle = Self::with_config(other.config.clone());
        handle.reset(other, true);
        handle
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Replace the payload, disposing of the previous one first.
    ///
    /// When `source` is another handle, its delete flag wins over `owns_file`.
    pub fn reset<'a>(
        &mut self,
        source: impl Into<Source<'a>>,
        owns_file: bool,
    ) -> &mut Self {
        self.dispose();
        let owns_file = match source.into() {
            Source::Payload(payload) => {
                self.payload = payload;
                owns_file
            }
            Source::Handle(mut other) => self.move_from(&mut other),
            Source::Take(other) => self.move_from(other),
        };
        self.owns_file = owns_file;
        log::trace!(
            "{} reset to {} payload (delete flag {})",
            LOG_PREFIX,
            self.payload.kind(),
            self.owns_file
        );
        self
    }

    pub fn reset_default<'a>(
        &mut self,
        source: impl Into<Source<'a>>,
    ) -> &mut Self {
        self.reset(source, true)
    }

    fn move_from(&mut self, other: &mut DataHandle) -> bool {
        self.payload = std::mem::take(&mut other.payload);
        self.encoding = other.encoding.clone();
        log::trace!(
            "{} moved {} payload between handles",
            LOG_PREFIX,
            self.payload.kind()
        );
        other.owns_file
    }

    /// Release the payload, removing an owned file. Never fails and can be
    /// called any number of times.
    pub fn dispose(&mut self) {
        if let Payload::File(path) = &self.payload {
            if self.owns_file {
                match fs::remove_file(path) {
                    Ok(()) => {
                        log::debug!("{} removed {}", LOG_PREFIX, path.display())
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => log::warn!(
                        "{} Failed to delete {} because of error: {}",
                        LOG_PREFIX,
                        path.display(),
                        e
                    ),
                }
            }
        }
        self.payload = Payload::Empty;
        self.encoding.clone_from(&self.config.encoding);
        self.owns_file = true;
    }

    pub fn has_content(&self) -> bool {
        !self.payload.is_empty()
    }

    /// The stored value, unconverted
    pub fn content(&self) -> &Payload {
        &self.payload
    }

    /// Hand the payload to the caller without disposing of it. An owned file
    /// stays on disk and becomes the caller's responsibility.
    pub fn into_content(mut self) -> Payload {
        std::mem::take(&mut self.payload)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.payload, Payload::File(_))
    }

    pub fn file_ref(&self) -> Option<&Path> {
        self.payload.as_file()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) -> &mut Self {
        self.encoding = encoding.into();
        self
    }

    pub fn is_delete_flag(&self) -> bool {
        self.owns_file
    }

    pub fn set_delete_flag(&mut self, delete: bool) -> &mut Self {
        self.owns_file = delete;
        self
    }

    /// Payload as bytes, reading at most the configured `max_size` from a file
    pub fn bytes(&mut self) -> Result<Option<Cow<'_, [u8]>>> {
        let max_size = self.config.max_size;
        self.bytes_with_limit(max_size)
    }

    /// Payload as bytes.
    ///
    /// Files larger than `max_size` are rejected before anything is read.
    /// Characters are encoded once and the payload becomes those bytes.
    /// An empty handle yields `None`.
    pub fn bytes_with_limit(
        &mut self,
        max_size: u64,
    ) -> Result<Option<Cow<'_, [u8]>>> {
        self.materialize()?;
        match &self.payload {
            Payload::Empty => Ok(None),
            Payload::File(path) => {
                Ok(Some(Cow::Owned(read_file(path, max_size)?)))
            }
            Payload::Text(text) => {
                Ok(Some(encoding::encode(text, &self.encoding)?))
            }
            Payload::Bytes(bytes) => Ok(Some(Cow::Borrowed(bytes))),
            // chars never survive materialize()
            Payload::Chars(_) | Payload::Other(_) => {
                Err(DataError::Unsupported("byte extraction"))
            }
        }
    }

    /// Length of the payload in bytes.
    ///
    /// Text that cannot be encoded counts as 0 bytes unless the config asks
    /// for strict sizing.
    pub fn size(&mut self) -> Result<u64> {
        self.materialize()?;
        match &self.payload {
            Payload::Empty => Ok(0),
            Payload::File(path) => Ok(fs::metadata(path)?.len()),
            Payload::Bytes(bytes) => Ok(bytes.len() as u64),
            Payload::Text(text) => {
                match encoding::encode(text, &self.encoding) {
                    Ok(bytes) => Ok(bytes.len() as u64),
                    Err(e) if self.config.strict_size => Err(e),
                    Err(e) => {
                        log::debug!(
                            "{} text size reported as 0: {}",
                            LOG_PREFIX,
                            e
                        );
                        Ok(0)
                    }
                }
            }
            Payload::Chars(_) | Payload::Other(_) => {
                Err(DataError::Unsupported("size"))
            }
        }
    }

    /// Payload decoded as text, `None` for an empty handle
    pub fn text(&mut self) -> Result<Option<String>> {
        match &self.payload {
            Payload::Empty => Ok(None),
            Payload::Text(text) => Ok(Some(text.clone())),
            _ => {
                let label = self.encoding.clone();
                match self.bytes()? {
                    Some(bytes) => Ok(Some(encoding::decode(&bytes, &label)?)),
                    None => Ok(None),
                }
            }
        }
    }

    /// Readable stream over the payload, `None` for an empty handle.
    ///
    /// A file is streamed from disk. If the handle owns the file, the stream
    /// takes that over: the file goes away when the stream is closed and the
    /// handle's delete flag is cleared.
    pub fn stream(&mut self) -> Result<Option<DataStream>> {
        match &self.payload {
            Payload::Empty => Ok(None),
            Payload::File(path) => {
                let stream = FileStream::open(path.clone(), self.owns_file)?;
                if self.owns_file {
                    log::debug!(
                        "{} stream now owns {}",
                        LOG_PREFIX,
                        path.display()
                    );
                    self.owns_file = false;
                }
                Ok(Some(DataStream::File(stream)))
            }
            _ => {
                let bytes = self
                    .bytes()?
                    .map(Cow::into_owned)
                    .unwrap_or_default();
                Ok(Some(DataStream::Memory(Cursor::new(bytes))))
            }
        }
    }

    /// Move an in-memory payload into a new file inside `dir`, owned by the
    /// handle. A file payload is left where it is.
    pub fn spill(&mut self, dir: impl AsRef<Path>) -> Result<&Path> {
        if !self.is_file() {
            let bytes = match self.bytes()? {
                Some(bytes) => bytes.into_owned(),
                None => return Err(DataError::Unsupported("spilling")),
            };
            let (mut file, path) = tmp::create_in(dir)?;
            if let Err(e) = file.write_all(&bytes).and_then(|_| file.sync_data())
            {
                let _ = fs::remove_file(&path);
                return Err(e.into());
            }
            log::debug!(
                "{} spilled {} bytes to {}",
                LOG_PREFIX,
                bytes.len(),
                path.display()
            );
            let encoding = std::mem::take(&mut self.encoding);
            self.reset(path, true).set_encoding(encoding);
        }
        self.payload
            .as_file()
            .ok_or(DataError::Unsupported("spilling"))
    }

    /// Replace a character payload by its encoded bytes
    fn materialize(&mut self) -> Result<()> {
        if let Payload::Chars(chars) = &self.payload {
            let bytes = encoding::encode_chars(chars, &self.encoding)?;
            log::debug!(
                "{} materialized {} chars into {} bytes",
                LOG_PREFIX,
                chars.len(),
                bytes.len()
            );
            self.payload = Payload::Bytes(bytes);
        }
        Ok(())
    }
}

fn read_file(path: &Path, max_size: u64) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    if size > max_size {
        return Err(DataError::FileTooLarge {
            size,
            limit: max_size,
        });
    }
    let mut buf = Vec::with_capacity(size as usize);
    // the file may grow after the size check
    file.take(max_size.saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() as u64 > max_size {
        return Err(DataError::FileTooLarge {
            size: buf.len() as u64,
            limit: max_size,
        });
    }
    Ok(buf)
}

impl Default for DataHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataHandle")
            .field("payload", &self.payload)
            .field("encoding", &self.encoding)
            .field("delete", &self.owns_file)
            .finish()
    }
}

impl Drop for DataHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
