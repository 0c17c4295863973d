//! Lexer and parser for gigo sources.
//!
//! The pipeline has three stages:
//!
//! 1. [`lexer`]: a longest-match lexer turning text into [`Token`]s that keep
//!    their exact source text;
//! 2. [`cursor`]: a rewindable window over the token stream with a loop
//!    guard;
//! 3. the parser: a backtracking recursive-descent reader building a
//!    format-preserving [`Tree`], tracking declared variables in a
//!    [`scope::Scope`].
//!
//! The entry points are [`parse`], [`parse_str`] and
//! [`parse_str_with_package`].
//!
//! ```
//! # use gigo_parser::parse_str_with_package;
//! let source = "package main\n\ntype Todo struct {\n  Name string\n}\n";
//! let tree = parse_str_with_package(source).unwrap();
//! assert_eq!(tree.text(tree.root()), source);
//! assert_eq!(tree.find_structs().len(), 1);
//! ```
//!
//! [`Token`]: gigo_core::Token

pub mod cursor;
pub mod error;
pub mod lexer;
mod parser;
pub mod scope;

#[cfg(test)]
mod parser_tests;

use gigo_core::{Origin, Tree};
use log::{debug, info};

pub use error::{ErrorCode, Result, SyntaxError};
pub use parser::ParseConfig;

/// Parse `source` into a tree.
///
/// # Errors
///
/// Returns the first [`SyntaxError`] met, carrying `origin` and the source
/// text for reporting.
pub fn parse(source: &str, origin: Origin, config: &ParseConfig) -> Result<Tree> {
    info!(origin:% = origin, bytes = source.len(); "Parsing source");
    let result = parser::Parser::new(source, origin.clone(), config.loop_guard).run(config.require_package);
    match result {
        Ok(tree) => {
            debug!(nodes = tree.len(), declarations = tree.declarations().len(); "Parsed tree");
            Ok(tree)
        }
        Err(err) => Err(err.with_origin(origin, source)),
    }
}

/// Parse a snippet that may lack a package clause.
pub fn parse_str(content: &str) -> Result<Tree> {
    parse(content, Origin::Str, &ParseConfig::snippet())
}

/// Parse a string that must start with a package clause.
pub fn parse_str_with_package(content: &str) -> Result<Tree> {
    parse(content, Origin::Str, &ParseConfig::default())
}
