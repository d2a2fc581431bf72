use std::io::{self, Write};

use muxlog::{Window, registry_config};

/// Stands in for a GUI window by printing a framed panel on stdout.
#[derive(Default)]
struct TerminalWindow {
    open: bool,
}

impl Window for TerminalWindow {
    fn is_open(&self) -> bool {
        self.open
    }
    fn create(&mut self) -> io::Result<()> {
        self.open = true;
        writeln!(io::stdout(), "+---------- log window ----------+")
    }
    fn write(&mut self, text: &str) -> io::Result<()> {
        writeln!(io::stdout(), "| {text}")
    }
    fn destroy(&mut self) -> io::Result<()> {
        self.open = false;
        writeln!(io::stdout(), "+--------------------------------+")
    }
}

fn main() {
    let path = std::env::temp_dir().join("muxlog_example.log");
    let _ = std::fs::remove_file(&path);

    let guard = registry_config()
        .with_window(TerminalWindow::default())
        .with_log_file(&path)
        .with_log_facade(true)
        .init_global()
        .expect("Unable to register sinks");

    let handles: Vec<_> = (0..3)
        .map(|i| std::thread::spawn(move || log::info!("Hello from thread {i}")))
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    muxlog::debug("all threads joined");
    log::error!("simulated failure");
    drop(guard);

    println!("{}:", path.display());
    print!("{}", std::fs::read_to_string(&path).unwrap());
}
