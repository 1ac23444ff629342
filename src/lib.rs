//! Transient holder for a payload of unknown origin.
//!
//! A [`DataHandle`] carries one value at a time: a file on disk, a byte
//! buffer, a character buffer, a string, or nothing. Callers read it through
//! uniform byte, size, text and stream views without caring which one it is.
//!
//! ```no_run
//! use data_handle::DataHandle;
//!
//! let mut handle = DataHandle::with_source("hello");
//! assert_eq!(handle.size()?, 5);
//! assert_eq!(handle.text()?.as_deref(), Some("hello"));
//! # Ok::<(), data_handle::DataError>(())
//! ```

pub mod config;
pub mod encoding;
mod errors;
pub mod handle;
pub mod payload;
pub mod stream;
pub mod tmp;

pub use config::DataConfig;
pub use errors::{DataError, Result};
pub use handle::DataHandle;
pub use payload::{Payload, Source};
pub use stream::{DataStream, FileStream};

const LOG_PREFIX: &str = "[data-handle]";

pub const DEFAULT_ENCODING: &str = "utf-8";

const KILOBYTE: u64 = 1024;
const MEGABYTE: u64 = 1024 * KILOBYTE;

/// Largest file read into memory unless a bigger limit is asked for
pub const DEFAULT_MAX_SIZE: u64 = 10 * MEGABYTE;
