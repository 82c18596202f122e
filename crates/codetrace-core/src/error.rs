use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the typed node model, tree builder, and module registry.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("project root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("unsupported language for extension {0:?}")]
    UnsupportedLanguage(String),

    #[error("tree-sitter failed to parse {0}")]
    ParserError(PathBuf),

    #[error("tree-sitter language could not be loaded: {0}")]
    LanguageError(#[from] tree_sitter::LanguageError),

    #[error("node with id {0} not found in arena")]
    NodeNotFound(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;
