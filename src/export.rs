//! Public key export

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::model::Key;

/// Write the public material of `key` to `<dir>/<FINGERPRINT>.pub`.
///
/// An existing file of the same name is overwritten.
pub fn write_public_key(key: &Key, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = dir.as_ref().join(key.fingerprint.export_file_name());
    fs::write(&path, &key.public_key)?;
    info!(fingerprint = %key.fingerprint, path = %path.display(), "Public key exported");
    Ok(path)
}
