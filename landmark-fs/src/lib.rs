//! Capability-based access to the artefacts a verifier deployment reads at
//! startup: the landmark registry file and the classifier model.
//!
//! Paths are resolved against ambient authority once, then every read goes
//! through a `cap-std` directory handle scoped to the artefact's parent.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open the directory containing `path` and return it with the file name.
///
/// A bare file name resolves against the current directory.
///
/// # Errors
/// Fails when `path` has no file name component or the parent directory
/// cannot be opened.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("artefact path {path} has no file name")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether `path` exists and is a regular file.
///
/// # Errors
/// Propagates I/O failures, including `NotFound` when the parent directory
/// or the file itself is absent.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Read a UTF-8 artefact such as a JSON registry into memory.
///
/// # Errors
/// Fails when the file cannot be opened or is not valid UTF-8.
pub fn read_artefact_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent_dir(path)?;
    dir.read_to_string(name.as_str())
}
