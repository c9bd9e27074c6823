//! Providers of raw mapping payloads.
//!
//! Obtaining the payloads (downloading, caching, verifying) belongs to the
//! caller; the composition only needs something it can open and read once.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::PathBuf;

/// A payload the composition can open.
pub trait MappingSource {
    /// Name used in diagnostics.
    fn name(&self) -> String;

    /// Opens the payload for reading.
    ///
    /// # Errors
    ///
    /// Returns the provider's I/O error when the payload cannot be obtained.
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>>;
}

/// A payload stored in a file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MappingSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }
}

/// A payload already held in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    text: String,
}

impl StaticSource {
    /// Creates a source serving `text`.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl MappingSource for StaticSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(Cursor::new(self.text.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_to_open() {
        let source = FileSource::new("/nonexistent/client.txt");
        assert_eq!(source.name(), "/nonexistent/client.txt");
        assert!(source.open().is_err());
    }

    #[test]
    fn static_source_serves_its_text() {
        let source = StaticSource::new("client", "Foo -> a:\n");
        let mut line = String::new();
        source.open().unwrap().read_line(&mut line).unwrap();
        assert_eq!(line, "Foo -> a:\n");
    }
}
