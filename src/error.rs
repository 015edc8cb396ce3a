use thiserror::Error;

/// Errors surfaced by the counting engine.
///
/// All three fatal conditions are returned to the caller; nothing is logged
/// or swallowed internally. A fault inside a worker unit is a contract
/// violation, not an error value, and aborts the process.
#[derive(Debug, Error)]
pub enum UwcError {
    /// Bad capacity, worker count or strategy name. Detected before any
    /// round runs; no partial work is performed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A full read buffer contained no separator byte, so no safe chunk
    /// boundary exists. The run is abandoned; the caller must retry with a
    /// larger buffer.
    #[error("no separator in {buffered} buffered bytes; input buffer too small")]
    BoundaryOverflow { buffered: usize },

    /// Compaction was asked to keep at least as many bytes as are valid,
    /// which would discard nothing.
    #[error("cannot keep {keep} of {valid} valid bytes across a refill")]
    CompactOverflow { keep: usize, valid: usize },

    /// Read failure from the input source, propagated unchanged.
    #[error(transparent)]
    Source(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UwcError>;
