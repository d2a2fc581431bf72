//! # muxlog
//! Multiplexing logger: every message is formatted and emitted by each registered sink.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! muxlog = "0.1.0"
//! ```
//!
//! ```rust
//! use muxlog::{ChannelSink, registry_config};
//!
//! let (sink, lines) = ChannelSink::new();
//! let _guard = registry_config()
//!     .with_sink("ui", sink)
//!     .init_global()
//!     .expect("Unable to register sinks");
//! muxlog::info("Hello, world!");
//! assert!(lines.recv().unwrap().ends_with("} Hello, world!"));
//! // guard shuts every sink down when dropped
//! ```
//!
//! ## Owned registries
//! A [`Registry`] can also be built and passed around explicitly.
//!
//! ```rust
//! use muxlog::{ChannelSink, LogLevel, registry_config};
//!
//! let (sink, lines) = ChannelSink::new();
//! let registry = registry_config()
//!     .with_sink("ui", sink)
//!     .build()
//!     .unwrap();
//! registry.log("disk almost full", LogLevel::Error);
//! assert!(lines.recv().unwrap().starts_with("- [ERROR] {"));
//! assert!(registry.unregister("ui").unwrap());
//! assert!(!registry.unregister("ui").unwrap());
//! ```
//!
//! ## Logging to files and the `log` facade
//! Each line is appended to the file, which is created if it does not exist.
//!
//! ```rust
//! use muxlog::registry_config;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("app.log");
//! let guard = registry_config()
//!     .with_log_file(&path)
//!     .with_log_facade(true)
//!     .init_global()
//!     .unwrap();
//! log::warn!("Hello, world!");
//! drop(guard);
//! let written = std::fs::read_to_string(&path).unwrap();
//! assert!(written.starts_with("- [ERROR] {"));
//! assert!(written.ends_with("} Hello, world!\n"));
//! ```

mod registry;

use std::{
    path::Path,
    sync::{
        Once,
        atomic::{AtomicU64, Ordering},
    },
};

use ::log::{LevelFilter, Log, Metadata, Record};
pub use muxlog_core::{
    ChannelSink, ConsoleSink, ConsoleTarget, FileSink, LogError, LogLevel, MUXLOG_CONFIG, Sink,
    Window, WindowSink, format_line, format_line_at, parse_level, report_failure,
};
pub use registry::Registry;
use registry::validate_key;

/// Process-wide registry, populated through [`ConfigBuilder::init_global`].
static GLOBAL_REGISTRY: Registry = Registry::new();

/// Bumped by every successful `init_global`; only the latest guard tears down.
static GLOBAL_GENERATION: AtomicU64 = AtomicU64::new(0);

/// Returns the process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL_REGISTRY
}

pub fn log(message: &str, level: LogLevel) {
    GLOBAL_REGISTRY.log(message, level);
}

pub fn error(message: &str) {
    GLOBAL_REGISTRY.error(message);
}

pub fn info(message: &str) {
    GLOBAL_REGISTRY.info(message);
}

pub fn debug(message: &str) {
    GLOBAL_REGISTRY.debug(message);
}

/// Bridge from the `log` facade to the global registry.
/// Records a sink emits while being dispatched to are reported and dropped.
struct MuxLogger;

impl Log for MuxLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        GLOBAL_REGISTRY.log(&record.args().to_string(), record.level().into());
    }

    fn flush(&self) {}
}

fn install_log_facade() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| match ::log::set_boxed_logger(Box::new(MuxLogger)) {
        Ok(()) => ::log::set_max_level(LevelFilter::Trace),
        Err(err) => report_failure("installing the log facade", &err),
    });
}

/// Guard that shuts down the global registry when dropped.
/// Hold this guard for the lifetime of your logging session.
///
/// A later `init_global` replaces the global sinks and supersedes this guard:
/// dropping a superseded guard leaves the registry untouched.
pub struct RegistryGuard {
    generation: u64,
}

impl RegistryGuard {
    pub fn registry(&self) -> &'static Registry {
        &GLOBAL_REGISTRY
    }
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        if GLOBAL_GENERATION.load(Ordering::SeqCst) == self.generation {
            GLOBAL_REGISTRY.shutdown_all();
        }
    }
}

/// Builder collecting the sinks to register.
#[derive(Default)]
pub struct ConfigBuilder {
    sinks: Vec<(String, Box<dyn Sink>)>,
    log_facade: bool,
}

impl ConfigBuilder {
    /// Adds a sink under `key`. Later sinks replace earlier ones with the same key.
    pub fn with_sink<S: Sink + 'static>(mut self, key: &str, sink: S) -> Self {
        self.sinks.push((key.into(), Box::new(sink)));
        self
    }
    /// Adds a window sink, keyed `WindowSink`.
    pub fn with_window<W: Window + 'static>(self, window: W) -> Self {
        self.with_sink("WindowSink", WindowSink::new(window))
    }
    /// Adds a file sink, keyed `FileSink`.
    pub fn with_log_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.with_sink("FileSink", FileSink::new(path))
    }
    /// Adds a stdout sink, keyed `ConsoleSink`.
    pub fn with_console(self) -> Self {
        self.with_sink("ConsoleSink", ConsoleSink::default())
    }
    /// Route records from the `log` macros to the global registry.
    /// Only applies to [`ConfigBuilder::init_global`].
    pub fn with_log_facade(self, yes: bool) -> Self {
        Self {
            log_facade: yes,
            ..self
        }
    }

    fn register_into(self, registry: &Registry) -> Result<(), LogError> {
        for (key, _) in &self.sinks {
            validate_key(key)?;
        }
        for (key, sink) in self.sinks {
            registry.register(&key, sink)?;
        }
        Ok(())
    }

    /// Builds an owned registry holding the configured sinks.
    pub fn build(self) -> Result<Registry, LogError> {
        let registry = Registry::new();
        self.register_into(&registry)?;
        Ok(registry)
    }

    /// Replaces the sinks of the global registry with the configured ones.
    /// Returns a guard that will shut every sink down when dropped.
    #[must_use = "RegistryGuard must be kept alive to keep the sinks registered. Do \"let _guard = registry_config().init_global()?;\""]
    pub fn init_global(self) -> Result<RegistryGuard, LogError> {
        for (key, _) in &self.sinks {
            validate_key(key)?;
        }
        let log_facade = self.log_facade;
        let generation = GLOBAL_GENERATION.fetch_add(1, Ordering::SeqCst) + 1;
        GLOBAL_REGISTRY.shutdown_all();
        self.register_into(&GLOBAL_REGISTRY)?;
        if log_facade {
            install_log_facade();
        }
        Ok(RegistryGuard { generation })
    }
}

/// Returns a default ConfigBuilder for configuring the registry.
pub fn registry_config() -> ConfigBuilder {
    ConfigBuilder::default()
}

#[test]
fn test_builder_named_sinks() {
    struct Headless;

    impl Window for Headless {
        fn is_open(&self) -> bool {
            true
        }
        fn create(&mut self) -> std::io::Result<()> {
            Ok(())
        }
        fn write(&mut self, _: &str) -> std::io::Result<()> {
            Ok(())
        }
        fn destroy(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let registry = registry_config()
        .with_console()
        .with_window(Headless)
        .with_log_file(dir.path().join("app.log"))
        .build()
        .unwrap();
    assert_eq!(registry.keys(), vec!["ConsoleSink", "FileSink", "WindowSink"]);
    registry.info("to console, window and file");
    assert!(registry.unregister("ConsoleSink").unwrap());
    assert!(
        std::fs::read_to_string(dir.path().join("app.log"))
            .unwrap()
            .ends_with("} to console, window and file\n")
    );
}
