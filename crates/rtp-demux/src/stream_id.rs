//! RTP stream identifiers (RSID)
//!
//! An RSID is a short application-level name carried as packet metadata to
//! identify a stream before its SSRC is known, for example while simulcast
//! layers are being negotiated. Legal names are non-empty, at most
//! [`MAX_STREAM_ID_LEN`] bytes, and ASCII alphanumeric.

use std::fmt;

use crate::error::Error;
use crate::Result;

/// Maximum length, in bytes, of a legal stream id
pub const MAX_STREAM_ID_LEN: usize = 16;

/// A validated RTP stream id
///
/// Construction goes through [`StreamId::new`], so every value of this type
/// satisfies the stream-id grammar. Usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(String);

impl StreamId {
    /// Create a stream id from candidate text
    ///
    /// Returns [`Error::IllegalStreamId`] if the text does not satisfy the
    /// grammar checked by [`StreamId::is_legal_name`].
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !Self::is_legal_name(&name) {
            return Err(Error::IllegalStreamId { name });
        }
        Ok(Self(name))
    }

    /// Check whether `name` satisfies the stream-id grammar
    ///
    /// Pure predicate, usable by callers that validate wire input before
    /// constructing a [`StreamId`].
    pub fn is_legal_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= MAX_STREAM_ID_LEN
            && name.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// The stream id text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StreamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_names() {
        assert!(StreamId::is_legal_name("a"));
        assert!(StreamId::is_legal_name("stream1"));
        assert!(StreamId::is_legal_name("ABCdef123"));
        assert!(StreamId::is_legal_name("0123456789abcdef")); // 16 bytes
    }

    #[test]
    fn test_illegal_names() {
        assert!(!StreamId::is_legal_name(""));
        assert!(!StreamId::is_legal_name("0123456789abcdefg")); // 17 bytes
        assert!(!StreamId::is_legal_name("has space"));
        assert!(!StreamId::is_legal_name("dash-ed"));
        assert!(!StreamId::is_legal_name("under_score"));
        assert!(!StreamId::is_legal_name("non\u{e9}ascii"));
    }

    #[test]
    fn test_new_validates() {
        let id = StreamId::new("video0").unwrap();
        assert_eq!(id.as_str(), "video0");

        let err = StreamId::new("too!bad").unwrap_err();
        assert_eq!(
            err,
            Error::IllegalStreamId {
                name: "too!bad".to_string()
            }
        );
    }

    #[test]
    fn test_display() {
        let id = StreamId::new("cam1").unwrap();
        assert_eq!(format!("{}", id), "cam1");
    }
}
