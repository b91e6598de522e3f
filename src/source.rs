//! Source abstraction: raw bytes plus a display name.
//!
//! The parser calls `content()` exactly once per parse; any error there is
//! an unrecoverable read failure for that unit. `MemorySource` backs the
//! unit tests so no scenario needs to touch the filesystem.

use std::io;
use std::path::{Path, PathBuf};

pub trait Source {
    fn content(&self) -> io::Result<Vec<u8>>;
    fn filename(&self) -> &str;
}

pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.to_string_lossy().into_owned();
        Self { path, display }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn content(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn filename(&self) -> &str {
        &self.display
    }
}

/// In-memory source, primarily for tests.
pub struct MemorySource {
    name: String,
    text: String,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

impl Source for MemorySource {
    fn content(&self) -> io::Result<Vec<u8>> {
        Ok(self.text.clone().into_bytes())
    }

    fn filename(&self) -> &str {
        &self.name
    }
}
