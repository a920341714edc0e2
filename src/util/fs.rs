//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Copy `src` to `dst` unless `dst` already holds identical bytes.
///
/// Parent directories of `dst` are created. Returns whether a copy happened.
pub fn copy_if_changed(src: &Path, dst: &Path) -> io::Result<bool> {
    let source = fs::read(src)?;
    match fs::read(dst) {
        Ok(existing) if existing == source => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::write(dst, source)?;
    Ok(true)
}

/// `path` relative to `base`, climbing with `..` when it lies outside.
///
/// Falls back to `path` unchanged when no relative form exists (for
/// example a relative `path` against an absolute `base`).
pub fn relative_to(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
