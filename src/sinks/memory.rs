//! In-memory sink

use crate::core::{RenderedLine, Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects rendered lines in a shared buffer
///
/// Clones share the same buffer: hand one clone to the logger and read
/// through another.
///
/// ```
/// use echo_logger::prelude::*;
///
/// let memory = MemorySink::new();
/// let logger = Logger::new("test", memory.clone());
/// logger.set_format(Format::message_only());
///
/// logger.info(|| "one");
/// logger.info(|| "two");
/// assert_eq!(memory.contents(), "one\ntwo\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<RenderedLine>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts of all lines received so far, in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(|l| l.text.clone()).collect()
    }

    /// Lines with their levels
    pub fn entries(&self) -> Vec<RenderedLine> {
        self.lines.lock().clone()
    }

    /// Every line followed by a newline
    pub fn contents(&self) -> String {
        self.lines.lock().iter().fold(String::new(), |mut out, l| {
            out.push_str(&l.text);
            out.push('\n');
            out
        })
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Remove and return everything received so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
            .into_iter()
            .map(|l| l.text)
            .collect()
    }
}

impl Sink for MemorySink {
    fn accept(&mut self, line: &RenderedLine) -> Result<()> {
        self.lines.lock().push(line.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
