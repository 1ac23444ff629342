use std::any::Any;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::DataHandle;

/// The single value a [`DataHandle`] carries.
#[derive(Default)]
pub enum Payload {
    #[default]
    Empty,
    File(PathBuf),
    Bytes(Vec<u8>),
    Chars(Vec<char>),
    Text(String),
    /// Anything else; stored and returned untouched but never converted
    Other(Box<dyn Any + Send>),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Short variant name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::File(_) => "file",
            Payload::Bytes(_) => "bytes",
            Payload::Chars(_) => "chars",
            Payload::Text(_) => "text",
            Payload::Other(_) => "other",
        }
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Payload::File(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Payload::Other(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Empty => f.write_str("Empty"),
            Payload::File(path) => f.debug_tuple("File").field(path).finish(),
            Payload::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Payload::Chars(chars) => write!(f, "Chars({} chars)", chars.len()),
            Payload::Text(text) => write!(f, "Text({} bytes)", text.len()),
            Payload::Other(_) => f.write_str("Other(..)"),
        }
    }
}

/// Everything [`DataHandle::reset`] accepts.
///
/// The `From` conversions normalize the input: writer buffers are unwrapped,
/// only the first path of a path list is kept, and handles are moved.
pub enum Source<'a> {
    Payload(Payload),
    /// Move out of an owned handle
    Handle(DataHandle),
    /// Move out of a borrowed handle, leaving it empty
    Take(&'a mut DataHandle),
}

impl Source<'_> {
    pub fn other<T: Any + Send>(value: T) -> Self {
        Source::Payload(Payload::Other(Box::new(value)))
    }

    fn first_path<P: AsRef<Path>>(paths: &[P]) -> Self {
        match paths.first() {
            Some(path) => Source::Payload(Payload::File(path.as_ref().into())),
            None => Source::Payload(Payload::Empty),
        }
    }
}

impl From<Payload> for Source<'_> {
    fn from(payload: Payload) -> Self {
        Source::Payload(payload)
    }
}

impl From<String> for Source<'_> {
    fn from(text: String) -> Self {
        Source::Payload(Payload::Text(text))
    }
}

impl From<&str> for Source<'_> {
    fn from(text: &str) -> Self {
        Source::Payload(Payload::Text(text.to_owned()))
    }
}

impl From<Vec<u8>> for Source<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Payload(Payload::Bytes(bytes))
    }
}

impl From<&[u8]> for Source<'_> {
    fn from(bytes: &[u8]) -> Self {
        Source::Payload(Payload::Bytes(bytes.to_vec()))
    }
}

impl<const N: usize> From<&[u8; N]> for Source<'_> {
    fn from(bytes: &[u8; N]) -> Self {
        Source::Payload(Payload::Bytes(bytes.to_vec()))
    }
}

/// Bytes accumulated by a writer
impl From<Cursor<Vec<u8>>> for Source<'_> {
    fn from(writer: Cursor<Vec<u8>>) -> Self {
        Source::Payload(Payload::Bytes(writer.into_inner()))
    }
}

impl From<Vec<char>> for Source<'_> {
    fn from(chars: Vec<char>) -> Self {
        Source::Payload(Payload::Chars(chars))
    }
}

impl From<&[char]> for Source<'_> {
    fn from(chars: &[char]) -> Self {
        Source::Payload(Payload::Chars(chars.to_vec()))
    }
}

impl From<PathBuf> for Source<'_> {
    fn from(path: PathBuf) -> Self {
        Source::Payload(Payload::File(path))
    }
}

impl From<&Path> for Source<'_> {
    fn from(path: &Path) -> Self {
        Source::Payload(Payload::File(path.to_path_buf()))
    }
}

impl From<Vec<PathBuf>> for Source<'_> {
    fn from(paths: Vec<PathBuf>) -> Self {
        Source::first_path(&paths)
    }
}

impl From<&[PathBuf]> for Source<'_> {
    fn from(paths: &[PathBuf]) -> Self {
        Source::first_path(paths)
    }
}

/// `None` resets to an empty payload
impl<'a, T: Into<Source<'a>>> From<Option<T>> for Source<'a> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Source::Payload(Payload::Empty),
        }
    }
}

impl From<DataHandle> for Source<'_> {
    fn from(handle: DataHandle) -> Self {
        Source::Handle(handle)
    }
}

impl<'a> From<&'a mut DataHandle> for Source<'a> {
    fn from(handle: &'a mut DataHandle) -> Self {
        Source::Take(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(source: Source<'_>) -> Payload {
        match source {
            Source::Payload(payload) => payload,
            _ => panic!("expected a plain payload"),
        }
    }

    #[test]
    fn writer_buffer_is_unwrapped() {
        let mut writer = Cursor::new(Vec::new());
        std::io::Write::write_all(&mut writer, b"written").unwrap();
        let p = payload(writer.into());
        assert_eq!(p.as_bytes(), Some(&b"written"[..]));
    }

    #[test]
    fn only_first_path_is_kept() {
        let paths = vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")];
        let p = payload(paths.into());
        assert_eq!(p.as_file(), Some(Path::new("/tmp/a")));

        let p = payload(Vec::<PathBuf>::new().into());
        assert!(p.is_empty());
    }

    #[test]
    fn other_values_are_stored_as_is() {
        let p = payload(Source::other(42u32));
        assert_eq!(p.kind(), "other");
        assert_eq!(p.downcast_ref::<u32>(), Some(&42));
        assert_eq!(p.downcast_ref::<String>(), None);
    }

    #[test]
    fn text_and_chars_keep_their_variant() {
        assert_eq!(payload("hi".into()).as_text(), Some("hi"));
        let chars: &[char] = &['h', 'i'];
        assert_eq!(payload(chars.into()).kind(), "chars");
    }

    #[test]
    fn optional_values_unwrap_or_empty() {
        assert!(payload(None::<String>.into()).is_empty());
        assert_eq!(payload(Some("set").into()).as_text(), Some("set"));

        let mut handle = DataHandle::with_source("previous");
        handle.reset(None::<Vec<u8>>, true);
        assert!(!handle.has_content());
    }

    #[test]
    fn debug_hides_content() {
        let p = Payload::Bytes(vec![1, 2, 3]);
        assert_eq!(format!("{:?}", p), "Bytes(3 bytes)");
        assert_eq!(format!("{:?}", Payload::Empty), "Empty");
    }
}
