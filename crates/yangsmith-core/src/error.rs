use thiserror::Error;

/// Core error type shared across yangsmith crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The compiled schema document is malformed.
    #[error("invalid schema document: {0}")]
    SchemaLoad(String),
    /// A leafref or lookup path could not be walked to a node.
    #[error("failed to resolve '{path}': segment '{segment}' not found under {at}")]
    PathResolution {
        path: String,
        segment: String,
        at: String,
    },
    /// A `/module:name/...` address does not exist in the tree.
    #[error("path '{0}' not found")]
    PathNotFound(String),
}

/// Convenience alias for results returned by yangsmith crates.
pub type Result<T> = std::result::Result<T, Error>;
