//! Error handling for the demultiplexer
//!
//! Only recoverable failures are surfaced as errors. Caller contract
//! violations (duplicate registrations, sinks dropped while registered,
//! teardown with live registrations) are debug-build assertions instead,
//! since they indicate bugs that must be fixed rather than handled.

use thiserror::Error;

use crate::stream_id::MAX_STREAM_ID_LEN;

/// Result type alias for demultiplexer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the demultiplexer and its value types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Candidate RSID text does not satisfy the stream-id grammar
    #[error("Illegal stream id {name:?}: must be 1-{MAX_STREAM_ID_LEN} ASCII alphanumeric characters")]
    IllegalStreamId {
        /// The rejected text
        name: String,
    },
}

impl Error {
    /// Create a new illegal stream id error
    pub fn illegal_stream_id(name: impl Into<String>) -> Self {
        Self::IllegalStreamId { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::illegal_stream_id("bad rsid!");
        let display = format!("{}", err);
        assert!(display.contains("bad rsid!"));
        assert!(display.contains("alphanumeric"));
    }
}
