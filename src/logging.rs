/// File logger behind the `log` facade.
///
/// The terminal is in raw mode on the alternate screen while the game runs,
/// so log records go to the file named in `config.toml` instead of stderr.
/// Without a configured file no logger is installed and records are dropped.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

use crate::config::LogConfig;

struct FileLogger<W: Write + Send> {
    level: LevelFilter,
    out: Mutex<W>,
    /// Set once the first write failure has been reported.
    warned: AtomicBool,
}

impl<W: Write + Send> FileLogger<W> {
    fn new(level: LevelFilter, out: W) -> Self {
        FileLogger { level, out: Mutex::new(out), warned: AtomicBool::new(false) }
    }

    /// Report a write failure on stderr, only the first time.
    /// Returns true if this call printed the warning.
    fn report(&self, result: io::Result<()>) -> bool {
        let Err(e) = result else { return false };
        if self.warned.swap(true, Ordering::Relaxed) { return false; }
        eprintln!("Warning: log write failed, further errors are not reported: {e}");
        true
    }
}

impl<W: Write + Send> Log for FileLogger<W> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) { return; }
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        if let Ok(mut out) = self.out.lock() {
            let result = writeln!(
                out,
                "{secs:.3} {:<5} {}: {}",
                record.level(), record.target(), record.args()
            );
            self.report(result);
        }
    }

    fn flush(&self) {
        if let Ok(mut out) = self.out.lock() {
            let result = out.flush();
            self.report(result);
        }
    }
}

/// Install the file logger if one is configured.
pub fn init(config: &LogConfig) -> io::Result<()> {
    let Some(path) = &config.file else { return Ok(()) };

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    // Fails here, before raw mode, if the file opened but cannot take writes.
    writeln!(file, "-- riverwalk log opened --")?;
    let logger = FileLogger::new(config.level, file);

    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    log::set_max_level(config.level);
    Ok(())
}
