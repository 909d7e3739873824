//! File sink implementation

use crate::core::{LoggerError, RenderedLine, Result, Sink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one line per event to a file
///
/// Writes are buffered; lines reach the disk on [`Sink::flush`]
/// (`Logger::flush`) or when the sink is dropped.
///
/// ```no_run
/// use echo_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .name("app")
///     .sink(FileSink::new("/var/log/app.log")?)
///     .build();
/// # Ok::<(), echo_logger::LoggerError>(())
/// ```
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("Failed to open {}", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn accept(&mut self, line: &RenderedLine) -> Result<()> {
        self.writer.write_all(line.text.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;

    #[test]
    fn test_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        {
            let mut sink = FileSink::new(&path).unwrap();
            sink.accept(&RenderedLine::new(Level::Info, "first")).unwrap();
            sink.accept(&RenderedLine::new(Level::Error, "second")).unwrap();
            sink.flush().unwrap();
        }
        {
            let mut sink = FileSink::new(&path).unwrap();
            sink.accept(&RenderedLine::new(Level::Warn, "third")).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\nthird\n");
    }

    #[test]
    fn test_lines_are_buffered_until_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buffered.log");

        let mut sink = FileSink::new(&path).unwrap();
        assert_eq!(sink.path(), path.as_path());
        sink.accept(&RenderedLine::new(Level::Debug, "pending")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        sink.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "pending\n");
    }

    #[test]
    fn test_open_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");

        let err = FileSink::new(&path).err().unwrap();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("app.log"));
    }
}
