use std::{thread, time::Duration};

use crossbeam_channel::{Sender, bounded};
use muxlog::{LogError, Sink, registry_config};

/// Sink whose emit goes back through the `log` macros, like a window
/// library tracing its own calls.
struct Chatty {
    lines: Sender<String>,
}

impl Sink for Chatty {
    fn name(&self) -> &str {
        "Chatty"
    }

    fn emit(&mut self, line: &str) -> Result<(), LogError> {
        log::info!("writing {} bytes", line.len());
        self.lines
            .send(line.to_owned())
            .map_err(|_| LogError::unavailable("Chatty", "receiver disconnected"))
    }
}

#[test]
fn test_sink_logging_from_emit_does_not_hang() {
    let (sender, lines) = crossbeam_channel::unbounded();
    let guard = registry_config()
        .with_sink("chatty", Chatty { lines: sender })
        .with_log_facade(true)
        .init_global()
        .unwrap();

    let (done_tx, done_rx) = bounded(1);
    thread::spawn(move || {
        muxlog::info("hello");
        log::debug!("via facade");
        done_tx.send(()).ok();
    });
    done_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let received: Vec<_> = lines.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert!(received[0].ends_with("} hello"));
    assert!(received[1].ends_with("} via facade"));

    // Teardown takes the slot lock again.
    let (dropped_tx, dropped_rx) = bounded(1);
    thread::spawn(move || {
        drop(guard);
        dropped_tx.send(()).ok();
    });
    dropped_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(muxlog::global().is_empty());
}
