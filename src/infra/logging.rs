use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_ENV: &str = "CAMWALL_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogTarget {
    Stderr,
    /// Used while the terminal UI owns the screen.
    File(PathBuf),
}

#[derive(Debug, Error)]
pub enum InitLoggingError {
    #[error("failed to open log file: {0}")]
    Open(#[from] io::Error),

    #[error("logger already installed: {0}")]
    Install(#[from] log::SetLoggerError),
}

pub fn log_file_path(home: &Path) -> PathBuf {
    home.join("camwall.log")
}

pub fn init_logging(target: LogTarget) -> Result<(), InitLoggingError> {
    let default_filter = match target {
        LogTarget::Stderr => "warn",
        LogTarget::File(_) => "info",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, default_filter));

    if let LogTarget::File(path) = target {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    Ok(())
}
