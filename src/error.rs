use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError
{
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("invalid {name}: {reason}")]
    InvalidConfig
    {
        name: &'static str,
        reason: String,
    },

    #[error("unknown game '{0}'. Run with --help.")]
    UnknownGame(String),

    #[error("failed to open log file {}: {source}", path.display())]
    LogFile
    {
        path: PathBuf,
        source: io::Error,
    },

    #[error("logger already initialized")]
    LoggerInstalled,
}
