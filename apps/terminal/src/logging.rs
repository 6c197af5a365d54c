//! Diagnostics output. The chat owns the terminal and erases placeholder lines
//! by moving the cursor, so log lines must never land on the same screen.

use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// An explicit log file wins. Otherwise stderr is used only when it is
    /// redirected away from the terminal.
    pub fn choose(log_file: Option<PathBuf>, stderr_is_terminal: bool) -> Self {
        match log_file {
            Some(path) => Self::File(path),
            None if stderr_is_terminal => Self::File(default_log_path()),
            None => Self::Stderr,
        }
    }

    pub fn detect(log_file: Option<PathBuf>) -> Self {
        Self::choose(log_file, std::io::stderr().is_terminal())
    }
}

pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("leafchat").join("terminal.log")
}

pub fn subscriber(filter: EnvFilter, target: &LogTarget) -> Result<impl Subscriber + Send + Sync> {
    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogTarget::File(path) => (BoxMakeWriter::new(file_appender(path)?), false),
    };
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .finish())
}

fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("log file {} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
