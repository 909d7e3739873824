//! Closure adapter sink

use crate::core::{RenderedLine, Result, Sink};

/// Wraps a closure as a sink
///
/// ```
/// use echo_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .format(Format::message_only())
///     .sink(FnSink::new("stdout", |line: &RenderedLine| {
///         println!("{}", line.text);
///         Ok(())
///     }))
///     .build();
/// logger.info(|| "through a closure");
/// ```
pub struct FnSink<F> {
    name: String,
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(&RenderedLine) -> Result<()> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Sink for FnSink<F>
where
    F: FnMut(&RenderedLine) -> Result<()> + Send,
{
    fn accept(&mut self, line: &RenderedLine) -> Result<()> {
        (self.f)(line)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, LoggerError};
    use std::sync::mpsc;

    #[test]
    fn test_closure_receives_lines() {
        let (tx, rx) = mpsc::channel();
        let mut sink = FnSink::new("channel", move |line: &RenderedLine| {
            tx.send(line.text.clone())
                .map_err(|e| LoggerError::sink("channel", e.to_string()))
        });

        sink.accept(&RenderedLine::new(Level::Info, "x")).unwrap();
        assert_eq!(rx.recv().unwrap(), "x");
        assert_eq!(sink.name(), "channel");
    }
}
