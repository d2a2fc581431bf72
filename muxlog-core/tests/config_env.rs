use muxlog_core::{FileSink, LogError, MUXLOG_CONFIG, Sink, format_failure};

// MUXLOG_CONFIG is read once per process, so every env-driven check lives in this test.
#[test]
fn test_config_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("from_env.log");
    unsafe {
        std::env::set_var("MUXLOG_LOG_FILE", &path);
        std::env::set_var("MUXLOG_FALLBACK_COLOR", "false");
    }

    assert_eq!(MUXLOG_CONFIG.LOG_FILE, path.to_str().unwrap());
    assert!(!MUXLOG_CONFIG.FALLBACK_COLOR);

    let mut sink = FileSink::default();
    assert_eq!(sink.path(), path);
    sink.emit("- [Info] {Tue 05 2024 09:07:02} configured").unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "- [Info] {Tue 05 2024 09:07:02} configured\n"
    );

    let err = LogError::UnknownSink("ghost".into());
    assert_eq!(
        format_failure("unregister", &err),
        "[muxlog] unregister: no sink registered under key \"ghost\""
    );
}
