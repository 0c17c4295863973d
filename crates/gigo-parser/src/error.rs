//! Syntax errors raised by the parser.
//!
//! A [`SyntaxError`] records why a grammar rule failed, the token found
//! instead, the token kinds that would have been accepted and where in the
//! source it happened. The parse entry point attaches the origin and the
//! source text, which lets [`SyntaxError::render_context`] print the failing
//! line with a caret under the failing column.
//!
//! # Example
//!
//! ```
//! # use gigo_parser::parse_str;
//! let err = parse_str("type tomate struct qsdqd{}").unwrap_err();
//! assert!(err.render_context().contains("↑"));
//! ```

mod error_code;
mod syntax_error;

pub use error_code::ErrorCode;
pub use syntax_error::SyntaxError;

/// A type alias for `Result<T, SyntaxError>`.
pub type Result<T> = std::result::Result<T, SyntaxError>;
