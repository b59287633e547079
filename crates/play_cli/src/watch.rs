use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Detects edits to the story file by polling its modification time.
#[derive(Debug)]
pub struct FileWatcher {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl FileWatcher {
    /// Reads the file once and remembers its modification time.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<(Self, String)> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        let modified = fs::metadata(&path)?.modified().ok();
        Ok((Self { path, modified }, content))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the new content when the modification time moved.
    pub fn poll(&mut self) -> io::Result<Option<String>> {
        let modified = fs::metadata(&self.path)?.modified().ok();
        if modified == self.modified {
            return Ok(None);
        }

        self.modified = modified;
        fs::read_to_string(&self.path).map(Some)
    }
}
