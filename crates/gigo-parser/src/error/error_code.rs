//! Error codes for syntax errors.
//!
//! The parser only raises `E1xx` codes. Template errors raised by the `gigo`
//! crate use `E2xx`.

use std::fmt;

/// Error codes for categorizing syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a block or a declaration was complete, most
    /// often because an opening delimiter has no matching close.
    E101,

    /// Invalid identifier.
    ///
    /// Identifiers must start with a letter.
    E102,

    /// Not an assignment.
    ///
    /// An `if` statement has an init clause that is not a short variable
    /// declaration.
    E103,

    /// Infinite loop detected.
    ///
    /// The parser read too many tokens without making progress. This points
    /// at a parser defect rather than at the input.
    E104,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "invalid identifier",
            ErrorCode::E103 => "not an assignment",
            ErrorCode::E104 => "infinite loop detected",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E104.to_string(), "E104");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E101.description(), "incomplete input");
        assert_eq!(ErrorCode::E103.description(), "not an assignment");
    }
}
