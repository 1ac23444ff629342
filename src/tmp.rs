use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Result};
use std::path::{Path, PathBuf};

const NAME_LENGTH: usize = 10;
const MAX_ATTEMPTS: usize = 16;

/// Random alphanumeric file name
pub fn random_name() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(NAME_LENGTH)
        .collect()
}

/// Create a fresh file with a random name inside `dir`.
///
/// The file is created exclusively, so an existing file is never reused.
/// Removing the file is up to the caller.
pub fn create_in(dir: impl AsRef<Path>) -> Result<(File, PathBuf)> {
    let mut attempt = 0;
    loop {
        let path = dir.as_ref().join(random_name());
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => return Ok((file, path)),
            Err(err)
                if err.kind() == ErrorKind::AlreadyExists
                    && attempt < MAX_ATTEMPTS =>
            {
                attempt += 1;
                continue;
            }
            Err(err) => return Err(err),
        }
    }
}
