//! Error types for parse operations

use std::fmt;

/// Result type alias for parse operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Classification of a parse failure, queryable from a state after a
/// failed parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No error recorded
    None,
    /// Document does not start with the required root token
    Format,
    /// An expected delimiter character is absent
    Unmatch,
    /// Malformed escape sequence or hex digits
    Unknown,
    /// Grammar or number-format violation
    Unexpected,
    /// Reserved for future extensions
    Unsupported,
    /// Allocator exhaustion or recursion budget exceeded
    Memory,
    /// Invariant violation inside the engine
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::None => "none",
            ErrorKind::Format => "format",
            ErrorKind::Unmatch => "unmatch",
            ErrorKind::Unknown => "unknown",
            ErrorKind::Unexpected => "unexpected",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Memory => "memory",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Error produced by a failed parse, carrying the failure kind, the
/// source position where it was raised and a formatted message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    /// Failure classification
    pub kind: ErrorKind,
    /// 1-based source line (0 when the failure has no position)
    pub line: u32,
    /// 1-based source column (0 when the failure has no position)
    pub column: u32,
    message: String,
}

impl ParseError {
    /// Create an error without position information
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    /// Attach a source position
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Formatted error message without the position suffix
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create an `Unexpected` error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create an `Unmatch` error
    pub fn unmatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unmatch, message)
    }

    /// Create an `Unknown` error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Create a `Memory` error
    pub fn memory(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Memory, message)
    }

    /// Create an `Internal` error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a `Format` error
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_position() {
        let err = ParseError::unmatch("expected '}'").at(3, 14);
        assert_eq!(err.to_string(), "expected '}' at line 3, column 14");
    }

    #[test]
    fn test_constructor_kinds() {
        assert_eq!(ParseError::unexpected("x").kind, ErrorKind::Unexpected);
        assert_eq!(ParseError::unmatch("x").kind, ErrorKind::Unmatch);
        assert_eq!(ParseError::unknown("x").kind, ErrorKind::Unknown);
        assert_eq!(ParseError::memory("x").kind, ErrorKind::Memory);
        assert_eq!(ParseError::internal("x").kind, ErrorKind::Internal);
        assert_eq!(ParseError::format("x").kind, ErrorKind::Format);
    }

    #[test]
    fn test_kind_display_names() {
        assert_eq!(ErrorKind::None.to_string(), "none");
        assert_eq!(ErrorKind::Unsupported.to_string(), "unsupported");
        assert_eq!(ErrorKind::Memory.to_string(), "memory");
    }

    #[test]
    fn test_position_defaults_to_zero() {
        let err = ParseError::memory("out of memory");
        assert_eq!(err.line, 0);
        assert_eq!(err.column, 0);
    }
}
