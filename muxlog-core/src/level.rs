use std::{fmt, str::FromStr};

/// Tag embedded in every formatted line. Levels are never used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Token as it appears between the brackets of a formatted line.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ERROR" => Ok(LogLevel::Error),
            "Info" => Ok(LogLevel::Info),
            "Debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level token {other:?}")),
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error | log::Level::Warn => LogLevel::Error,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

#[test]
fn test_level_tokens() {
    for level in [LogLevel::Error, LogLevel::Info, LogLevel::Debug] {
        assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
    }
    assert_eq!(LogLevel::default().as_str(), "Info");
    assert!("INFO".parse::<LogLevel>().is_err());
}

#[test]
fn test_from_log_level() {
    assert_eq!(LogLevel::from(log::Level::Warn), LogLevel::Error);
    assert_eq!(LogLevel::from(log::Level::Info), LogLevel::Info);
    assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Debug);
}
