//! Logger installation for the binary.
//!
//! Only records from the `jobboard_*` crates are kept; hyper and reqwest
//! chatter is filtered out. The file destination appends to `./jobboard.log`
//! so earlier sessions stay readable.

use std::fs::{File, OpenOptions};
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./jobboard.log";
const OWN_CRATES: &str = "jobboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    /// Append to ./jobboard.log; keeps the prompt clean.
    #[default]
    File,
    /// Write to stderr.
    Terminal,
    Both,
}

impl LogDestination {
    fn wants_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }

    fn wants_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }
}

/// Installs the global logger. A second call is ignored. When the log file
/// cannot be opened, logging falls back to the terminal.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if destination.wants_file() {
        match open_log_file(Path::new(LOG_FILE)) {
            Ok(file) => loggers.push(WriteLogger::new(level, config.clone(), file)),
            Err(err) => eprintln!("Warning: Could not open log file {LOG_FILE}: {err}"),
        }
    }
    if destination.wants_terminal() || loggers.is_empty() {
        loggers.push(TermLogger::new(
            level,
            config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str(OWN_CRATES)
        .build()
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn destinations_select_sinks() {
        assert!(LogDestination::File.wants_file());
        assert!(!LogDestination::File.wants_terminal());
        assert!(LogDestination::Terminal.wants_terminal());
        assert!(LogDestination::Both.wants_file() && LogDestination::Both.wants_terminal());
    }

    #[test]
    fn log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobboard.log");
        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
