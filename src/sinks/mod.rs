//! Sink implementations

pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod function;
pub mod memory;
#[cfg(feature = "notification")]
pub mod notification;

pub use console::{ConsoleSink, ConsoleTarget};
#[cfg(feature = "file")]
pub use file::FileSink;
pub use function::FnSink;
pub use memory::MemorySink;
#[cfg(feature = "notification")]
pub use notification::NotificationSink;

pub use crate::core::{RenderedLine, Sink};
