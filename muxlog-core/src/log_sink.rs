use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::{config::MUXLOG_CONFIG, error::LogError, level::LogLevel, utils::format_line};

/// A destination receiving every formatted log line.
///
/// Sinks are constructed by the host and handed over to a registry, which
/// becomes their sole owner and calls [`Sink::shutdown`] exactly once.
pub trait Sink: Send {
    /// Stable key identifying the sink variant.
    fn name(&self) -> &str;

    fn format(&self, message: &str, level: LogLevel) -> String {
        format_line(message, level)
    }

    /// Writes an already formatted line. May acquire resources on first use.
    fn emit(&mut self, line: &str) -> Result<(), LogError>;

    /// Releases resources. Must tolerate resources that were never acquired.
    fn shutdown(&mut self) -> Result<(), LogError> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn format(&self, message: &str, level: LogLevel) -> String {
        (**self).format(message, level)
    }
    fn emit(&mut self, line: &str) -> Result<(), LogError> {
        (**self).emit(line)
    }
    fn shutdown(&mut self) -> Result<(), LogError> {
        (**self).shutdown()
    }
}

/// Appends lines to a file. The file is opened, written, flushed and closed
/// on every emit so no handle outlives a call.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = File::options().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        file.flush()
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(&MUXLOG_CONFIG.LOG_FILE)
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        "FileSink"
    }

    fn emit(&mut self, line: &str) -> Result<(), LogError> {
        self.append(line).map_err(|e| {
            LogError::unavailable(self.name(), format!("{}: {e}", self.path.display()))
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Default)]
pub struct ConsoleSink {
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn new(target: ConsoleTarget) -> Self {
        Self { target }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "ConsoleSink"
    }

    fn emit(&mut self, line: &str) -> Result<(), LogError> {
        let written = match self.target {
            ConsoleTarget::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{line}").and_then(|_| out.flush())
            }
            ConsoleTarget::Stderr => {
                let mut out = io::stderr().lock();
                writeln!(out, "{line}").and_then(|_| out.flush())
            }
        };
        written.map_err(|e| LogError::unavailable(self.name(), e))
    }
}

/// Forwards formatted lines to a consumer thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<String>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    pub fn from_sender(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl Sink for ChannelSink {
    fn name(&self) -> &str {
        "ChannelSink"
    }

    fn emit(&mut self, line: &str) -> Result<(), LogError> {
        self.sender
            .send(line.to_owned())
            .map_err(|_| LogError::unavailable(self.name(), "receiver disconnected"))
    }
}

#[test]
fn test_file_sink_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    std::fs::write(&path, "existing\n").unwrap();
    let mut sink = FileSink::new(&path);
    sink.emit("- [Info] {Tue 05 2024 09:07:02} first").unwrap();
    sink.emit("second").unwrap();
    sink.shutdown().unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "existing\n- [Info] {Tue 05 2024 09:07:02} first\nsecond\n"
    );
}

#[test]
fn test_file_sink_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.log");
    let mut sink = FileSink::new(&path);
    sink.emit("hello").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
}

#[test]
fn test_file_sink_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path().join("missing").join("app.log"));
    match sink.emit("lost") {
        Err(LogError::SinkUnavailable { sink, .. }) => assert_eq!(sink, "FileSink"),
        other => panic!("expected SinkUnavailable, got {other:?}"),
    }
}

#[test]
fn test_console_sink() {
    let mut stdout = ConsoleSink::default();
    assert_eq!(stdout.target, ConsoleTarget::Stdout);
    assert_eq!(stdout.name(), "ConsoleSink");
    stdout.emit("- [Info] {Tue 05 2024 09:07:02} to stdout").unwrap();

    let mut stderr = ConsoleSink::new(ConsoleTarget::Stderr);
    let line = stderr.format("to stderr", LogLevel::Error);
    stderr.emit(&line).unwrap();
    stderr.shutdown().unwrap();
}

#[test]
fn test_channel_sink() {
    let (mut sink, receiver) = ChannelSink::new();
    sink.emit("one").unwrap();
    assert_eq!(receiver.recv().unwrap(), "one");
    drop(receiver);
    assert!(matches!(
        sink.emit("two"),
        Err(LogError::SinkUnavailable { .. })
    ));
}

#[test]
fn test_boxed_sink_delegates() {
    let (sink, receiver) = ChannelSink::new();
    let mut boxed: Box<dyn Sink> = Box::new(sink);
    assert_eq!(boxed.name(), "ChannelSink");
    let line = boxed.format("hi", LogLevel::Debug);
    boxed.emit(&line).unwrap();
    assert_eq!(receiver.recv().unwrap(), line);
}
