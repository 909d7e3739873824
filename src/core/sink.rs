//! Sink trait for rendered log lines

use super::{error::Result, level::Level};

/// A rendered line on its way to a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub level: Level,
    pub text: String,
}

impl RenderedLine {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Final destination of rendered lines
///
/// `accept` is called once per emitted event, in the order the owning logger
/// accepted them. Errors and panics are contained by the dispatch queue and
/// never reach the code that logged.
pub trait Sink: Send {
    fn accept(&mut self, line: &RenderedLine) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn accept(&mut self, line: &RenderedLine) -> Result<()> {
        (**self).accept(line)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
