//! Fatal-only error kinds (§7): everything recoverable (a single file's
//! parse failure, an unresolved call site) is logged and absorbed inside
//! the pipeline instead of surfacing here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("project root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("storage initialization failed: {0}")]
    StorageInit(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
