use thiserror::Error;

/// Errors emitted by value generation and descriptor traversal. All of
/// these abort the run; the only recoverable condition (pattern synthesis
/// exhaustion) is logged and counted instead of raised.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Schema(#[from] yangsmith_core::Error),
    #[error("unknown identity base '{0}'")]
    UnknownIdentity(String),
    #[error("unknown typedef '{0}'")]
    UnknownTypedef(String),
    #[error("unhandled datatype '{kind}' at {path}")]
    UnsupportedType { kind: String, path: String },
    #[error("invalid datatype at {path}: {message}")]
    InvalidDatatype { path: String, message: String },
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("{directive} is only valid for {expected} nodes, found {kind} at {path}")]
    DirectiveMisuse {
        directive: &'static str,
        expected: &'static str,
        kind: &'static str,
        path: String,
    },
    #[error("descriptor member '{member}' not found under {path}")]
    UnknownMember { member: String, path: String },
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("{kind} node at {path} cannot drive a traversal")]
    InvalidRoot { kind: &'static str, path: String },
}
