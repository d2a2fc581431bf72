use std::fmt::Display;

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::{config::MUXLOG_CONFIG, level::LogLevel};

const TIME_FORMAT: &str = "%a %d %Y %H:%M:%S";

/// Formats a line as `- [<level>] {<timestamp>} <message>` using the current local time.
pub fn format_line(message: &str, level: LogLevel) -> String {
    format_line_at(message, level, &Local::now())
}

pub fn format_line_at(message: &str, level: LogLevel, time: &DateTime<Local>) -> String {
    let time = time.format(TIME_FORMAT);
    format!("- [{level}] {{{time}}} {message}")
}

/// Extracts the level token back out of a formatted line.
pub fn parse_level(line: &str) -> Option<LogLevel> {
    let (token, _) = line.strip_prefix("- [")?.split_once(']')?;
    token.parse().ok()
}

/// Fallback channel for failures that must not reach the caller of `log`.
/// Writes to stderr and never goes back through a registry.
pub fn report_failure(context: &str, err: &dyn Display) {
    eprintln!("{}", format_failure(context, err));
}

/// Line written by [`report_failure`], colored unless `MUXLOG_FALLBACK_COLOR=false`.
pub fn format_failure(context: &str, err: &dyn Display) -> String {
    if MUXLOG_CONFIG.FALLBACK_COLOR {
        format!("{} {context}: {err}", "[muxlog]".red().bold())
    } else {
        format!("[muxlog] {context}: {err}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 2).unwrap()
    }

    #[test]
    fn test_format_line_at() {
        assert_eq!(
            format_line_at("boot", LogLevel::Info, &fixed_time()),
            "- [Info] {Tue 05 2024 09:07:02} boot"
        );
        assert_eq!(
            format_line_at("disk full", LogLevel::Error, &fixed_time()),
            "- [ERROR] {Tue 05 2024 09:07:02} disk full"
        );
    }

    #[test]
    fn test_level_round_trip() {
        for level in [LogLevel::Error, LogLevel::Info, LogLevel::Debug] {
            let line = format_line("a ] tricky [ message", level);
            assert_eq!(parse_level(&line), Some(level));
        }
        assert_eq!(parse_level("no brackets here"), None);
        assert_eq!(parse_level("- [Warn] {x} y"), None);
    }

    #[test]
    fn test_format_failure() {
        let err = crate::error::LogError::unavailable("FileSink", "disk full");
        let line = format_failure("emit on sink \"file\"", &err);
        assert!(line.contains("[muxlog]"));
        assert!(line.ends_with("emit on sink \"file\": sink FileSink unavailable: disk full"));
        report_failure("emit on sink \"file\"", &err);
    }

    #[test]
    fn test_format_line_shape() {
        let line = format_line("hello", LogLevel::Debug);
        let rest = line.strip_prefix("- [Debug] {").unwrap();
        let (time, message) = rest.split_once("} ").unwrap();
        assert_eq!(message, "hello");
        assert_eq!(time.split(' ').count(), 4);
    }
}
