//! Error types for the quire PDF reader.

use thiserror::Error;

/// Primary error type for PDF reading operations.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("invalid token at position {pos}: {msg}")]
    TokenError { pos: usize, msg: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{filter}: {msg}")]
    DecodeError { filter: &'static str, msg: String },

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("invalid page {page}, document has {count} pages")]
    InvalidPage { page: usize, count: usize },

    #[error("unsupported feature: {0}")]
    Unsupported(String),

    #[error("encrypted document: {0}")]
    Encrypted(String),
}

/// Coarse classification of every [`PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedDocument,
    InvalidPage,
    UnsupportedFeature,
    /// Refinement of `UnsupportedFeature`: no usable key or algorithm.
    EncryptedDocument,
}

impl PdfError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn encrypted(msg: impl Into<String>) -> Self {
        Self::Encrypted(msg.into())
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPage { .. } => ErrorKind::InvalidPage,
            Self::Unsupported(_) => ErrorKind::UnsupportedFeature,
            Self::Encrypted(_) => ErrorKind::EncryptedDocument,
            Self::TokenError { .. }
            | Self::UnexpectedEof
            | Self::TypeError { .. }
            | Self::KeyError(_)
            | Self::Io(_)
            | Self::DecodeError { .. }
            | Self::Malformed(_) => ErrorKind::MalformedDocument,
        }
    }

    pub const fn is_malformed(&self) -> bool {
        matches!(self.kind(), ErrorKind::MalformedDocument)
    }

    /// True for unsupported features, including missing decryption support.
    pub const fn is_unsupported(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnsupportedFeature | ErrorKind::EncryptedDocument
        )
    }
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_level_errors_classify_as_malformed() {
        assert!(PdfError::UnexpectedEof.is_malformed());
        let err = PdfError::DecodeError {
            filter: "LZWDecode",
            msg: "invalid code".into(),
        };
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
        assert_eq!(err.to_string(), "LZWDecode: invalid code");
    }

    #[test]
    fn encrypted_is_a_kind_of_unsupported() {
        let err = PdfError::encrypted("wrong password");
        assert_eq!(err.kind(), ErrorKind::EncryptedDocument);
        assert!(err.is_unsupported());
        assert!(!err.is_malformed());
    }

    #[test]
    fn invalid_page_message() {
        let err = PdfError::InvalidPage { page: 4, count: 3 };
        assert_eq!(err.to_string(), "invalid page 4, document has 3 pages");
    }
}
