//! Logging setup
//!
//! Either plain `env_logger` on stderr, or a session logger that appends
//! each record to `<dir>/<session>-<component>.log`, where the component is
//! the name of the emitting thread (the main thread logs as `coordinator`).
//! Session records are echoed to stderr.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Component of the main thread, where the coordinator runs.
const MAIN_COMPONENT: &str = "coordinator";

/// Install the global logger described by `config`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    match config.directory() {
        None => {
            env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(config.level.as_str()),
            )
            .init();
            Ok(())
        }
        Some(dir) => {
            let level = LevelFilter::from_str(&config.level)
                .map_err(|_| Error::Config(format!("unknown log level '{}'", config.level)))?;
            let logger = SessionLogger::new(dir, session_id(), level)?;
            log::set_boxed_logger(Box::new(logger))
                .map_err(|e| Error::Other(format!("Logger already set: {}", e)))?;
            log::set_max_level(level);
            Ok(())
        }
    }
}

/// Session id: UNIX start time in seconds.
fn session_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Per-component append-only log files for one session.
pub struct SessionLogger {
    dir: PathBuf,
    session: String,
    level: LevelFilter,
    echo: bool,
    files: Mutex<HashMap<String, File>>,
}

impl SessionLogger {
    pub fn new(dir: &Path, session: impl Into<String>, level: LevelFilter) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            session: session.into(),
            level,
            echo: true,
            files: Mutex::new(HashMap::new()),
        })
    }

    /// Stop echoing records to stderr.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Log file of `component` in this session.
    pub fn path_for(&self, component: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}.log", self.session, component))
    }

    fn write_line(&self, component: &str, line: &str) -> std::io::Result<()> {
        let mut files = self.files.lock();
        if !files.contains_key(component) {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(component))?;
            files.insert(component.to_string(), file);
        }
        match files.get_mut(component) {
            Some(file) => writeln!(file, "{}", line),
            None => Ok(()),
        }
    }
}

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let thread = std::thread::current();
        let component = match thread.name() {
            Some("main") | None => MAIN_COMPONENT,
            Some(name) => name,
        };
        let line = format!(
            "{:.3} {:<5} {}: {}",
            maidan::core::clock::now(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Err(e) = self.write_line(component, &line) {
            eprintln!("session log write failed for {}: {}", component, e);
        }
        if self.echo {
            eprintln!("[{}] {}", component, line);
        }
    }

    fn flush(&self) {
        for file in self.files.lock().values_mut() {
            let _ = file.flush();
        }
    }
}
