use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::SideTableError;
use crate::core::io::export::ExportError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Side-table error: {source}")]
    SideTable {
        #[from]
        source: SideTableError,
    },

    #[error("Geometry error in plugin '{plugin}': {source}")]
    Geometry {
        plugin: &'static str,
        source: GeometryError,
    },

    #[error("External tool '{tool}' failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Failed to list structures under '{path}': {source}")]
    Discovery {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write output: {source}")]
    Export {
        #[from]
        source: ExportError,
    },
}
