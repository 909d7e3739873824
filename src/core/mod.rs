//! Core logger types and traits

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod format;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod sink;
pub mod timestamp;
pub mod token;

pub use config::{FormatConfig, LoggerConfig};
pub use dispatch::{Dispatcher, Ticket, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::{LoggerError, Result};
pub use event::{CallSite, LogEvent};
pub use format::Format;
pub use level::Level;
pub use logger::{Logger, LoggerBuilder, LoggerGroup, Propagator};
pub use metrics::LoggerMetrics;
pub use sink::{RenderedLine, Sink};
pub use timestamp::{TimestampFormat, DEFAULT_DATE_PATTERN};
pub use token::{FormatToken, LevelFlags};
