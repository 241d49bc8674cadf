use abmeta::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid metadata configuration: {0}")]
    Config(String),

    #[error("Cannot read metadata config '{path}': {source}", path = path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cannot create log file '{path}': {source}", path = path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid interface pair: {0}")]
    InterfacePair(String),

    #[error("Cannot start the extraction run: {0}")]
    Startup(String),
}
