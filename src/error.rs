use thiserror::Error;

/// Main error type for sixdeg
#[derive(Error, Debug)]
pub enum SixdegError {
    /// Referenced character does not exist in the graph
    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    /// A character was loaded twice with conflicting role/allegiance
    #[error("Duplicate character with conflicting attributes: {0}")]
    DuplicateCharacter(String),

    /// Edge strength outside the valid (0, 1] range
    #[error("Invalid edge strength {strength} for {a} -- {b}: must be in (0, 1]")]
    InvalidWeight { a: String, b: String, strength: f64 },

    /// An edge from a character to itself
    #[error("Self edge not permitted: {0}")]
    SelfEdge(String),

    /// Both characters exist but no chain of connections links them.
    /// Callers treat this as a normal negative result, not a failure.
    /// The endpoint fields are payload, not a wrapped cause; naming one
    /// of them `source` would make thiserror treat it as `source()`.
    #[error("No path found between {from} and {to}")]
    NoPathFound { from: String, to: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dataset parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken internal invariant (a bug, not a caller error)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenient Result type using SixdegError
pub type Result<T> = std::result::Result<T, SixdegError>;
