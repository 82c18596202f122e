use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown function fqn: {0}")]
    UnknownFunction(String),

    #[error("call matcher pattern {0:?} contains an unsupported middle wildcard")]
    MiddleWildcardUnsupported(String),

    #[error("call matcher pattern list is empty")]
    EmptyPatterns,
}

pub type Result<T> = std::result::Result<T, GraphError>;
