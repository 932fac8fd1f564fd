use std::path::PathBuf;

use crate::compress::Method;

/// A specialized `Result` type for resource compilation.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that aborts a resource compilation run.
///
/// Every variant is fatal: nothing is written unless the whole run succeeds.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    Argument(String),
    #[error("input '{}' not found", .path.display())]
    InputNotFound { path: PathBuf },
    #[error("'{first}' and '{second}' both map to identifier '{identifier}'")]
    NameCollision {
        identifier: String,
        first: String,
        second: String,
    },
    #[error("failed to read '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Publishing failed and a previous output could not be put back.
    #[error("failed to restore '{}' after: {failed}", .path.display())]
    Restore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        failed: Box<Error>,
    },
    #[error("{method} compression failed")]
    Compress {
        method: Method,
        #[source]
        source: std::io::Error,
    },
    #[error("Environment variable '{0}' not set by Cargo")]
    Var(&'static str),
    #[error("compressed payload of '{name}' does not decompress to the original bytes")]
    RoundTrip { name: String },
}

impl Error {
    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }
}
