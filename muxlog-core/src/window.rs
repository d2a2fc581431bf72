use std::io;

use crate::{error::LogError, log_sink::Sink};

/// Display surface supplied by the host application.
pub trait Window: Send {
    fn is_open(&self) -> bool;
    fn create(&mut self) -> io::Result<()>;
    fn write(&mut self, text: &str) -> io::Result<()>;
    fn destroy(&mut self) -> io::Result<()>;
}

/// Logs to a window. The window is only created once a line is written.
pub struct WindowSink {
    window: Option<Box<dyn Window>>,
}

impl WindowSink {
    pub fn new<W: Window + 'static>(window: W) -> Self {
        Self {
            window: Some(Box::new(window)),
        }
    }

    /// Whether the backing window is currently open.
    pub fn is_active(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_open())
    }
}

impl Sink for WindowSink {
    fn name(&self) -> &str {
        "WindowSink"
    }

    fn emit(&mut self, line: &str) -> Result<(), LogError> {
        let Some(window) = self.window.as_mut() else {
            return Err(LogError::unavailable("WindowSink", "window already destroyed"));
        };
        if !window.is_open() {
            window
                .create()
                .map_err(|e| LogError::unavailable("WindowSink", format!("create failed: {e}")))?;
        }
        window
            .write(line)
            .map_err(|e| LogError::unavailable("WindowSink", format!("write failed: {e}")))
    }

    fn shutdown(&mut self) -> Result<(), LogError> {
        match self.window.take() {
            Some(mut window) => window
                .destroy()
                .map_err(|e| LogError::unavailable("WindowSink", format!("destroy failed: {e}"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::level::LogLevel;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create,
        Write(String),
        Destroy,
    }

    /// Window double recording every call it receives.
    #[derive(Clone, Default)]
    struct FakeWindow {
        calls: Arc<Mutex<Vec<Call>>>,
        open: bool,
        fail_create: bool,
    }

    impl Window for FakeWindow {
        fn is_open(&self) -> bool {
            self.open
        }
        fn create(&mut self) -> io::Result<()> {
            if self.fail_create {
                return Err(io::Error::other("no display"));
            }
            self.open = true;
            self.calls.lock().unwrap().push(Call::Create);
            Ok(())
        }
        fn write(&mut self, text: &str) -> io::Result<()> {
            self.calls.lock().unwrap().push(Call::Write(text.into()));
            Ok(())
        }
        fn destroy(&mut self) -> io::Result<()> {
            self.open = false;
            self.calls.lock().unwrap().push(Call::Destroy);
            Ok(())
        }
    }

    #[test]
    fn test_creates_window_lazily() {
        let window = FakeWindow::default();
        let calls = window.calls.clone();
        let mut sink = WindowSink::new(window);
        assert!(!sink.is_active());
        assert!(calls.lock().unwrap().is_empty());

        let line = sink.format("boot", LogLevel::Info);
        sink.emit(&line).unwrap();
        sink.emit("again").unwrap();
        assert!(sink.is_active());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Create, Call::Write(line), Call::Write("again".into())]
        );
    }

    #[test]
    fn test_open_window_is_not_recreated() {
        let window = FakeWindow {
            open: true,
            ..Default::default()
        };
        let calls = window.calls.clone();
        let mut sink = WindowSink::new(window);
        sink.emit("x").unwrap();
        assert_eq!(*calls.lock().unwrap(), vec![Call::Write("x".into())]);
    }

    #[test]
    fn test_create_failure() {
        let window = FakeWindow {
            fail_create: true,
            ..Default::default()
        };
        let calls = window.calls.clone();
        let mut sink = WindowSink::new(window);
        assert!(matches!(
            sink.emit("x"),
            Err(LogError::SinkUnavailable { .. })
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_shutdown_without_logging() {
        let window = FakeWindow::default();
        let calls = window.calls.clone();
        let mut sink = WindowSink::new(window);
        sink.shutdown().unwrap();
        sink.shutdown().unwrap();
        assert_eq!(*calls.lock().unwrap(), vec![Call::Destroy]);
        assert!(matches!(
            sink.emit("late"),
            Err(LogError::SinkUnavailable { .. })
        ));
    }
}
