//! # muxlog-core
//! Core utilities for muxlog - line formatting, the sink trait and its variants.

mod config;
mod error;
mod level;
mod log_sink;
mod utils;
mod window;

pub use config::{MUXLOG_CONFIG, MuxLogConfig};
pub use error::LogError;
pub use level::LogLevel;
pub use log_sink::{ChannelSink, ConsoleSink, ConsoleTarget, FileSink, Sink};
pub use utils::{format_failure, format_line, format_line_at, parse_level, report_failure};
pub use window::{Window, WindowSink};
