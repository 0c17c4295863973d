//! Error types for gigo operations.
//!
//! [`GigoError`] wraps everything that can go wrong while parsing and
//! expanding sources. Syntax errors keep the offending source so callers
//! can render a report with the failing line.

use std::io;

use thiserror::Error;

use gigo_core::TreeError;
use gigo_parser::SyntaxError;

use crate::template::TemplateError;

/// The main error type for gigo operations.
#[derive(Debug, Error)]
pub enum GigoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Mutation(#[from] MutationError),
}

/// Failures of the mutation engine that are not syntax or template errors.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum MutationError {
    /// Mutators, helpers and placeholders nested deeper than allowed.
    #[error("recursion limit of {limit} nested evaluations reached in `{name}`")]
    RecursionLimit { name: String, limit: usize },

    /// A templated method whose receiver names no template.
    #[error("template method `{method}` has no template named `{receiver}`")]
    OrphanTemplateMethod { method: String, receiver: String },

    /// A generated source that holds no struct declaration.
    #[error("mutator `{mutator}` generated no struct")]
    MissingStruct { mutator: String },

    /// A `GetResult` call naming no recorded placeholder.
    #[error("unknown placeholder `{0}`")]
    UnknownPlaceholder(String),

    /// A structural edit on a node that is not where it was expected.
    #[error("tree edit failed: {0}")]
    Tree(#[from] TreeError),
}

impl From<TreeError> for GigoError {
    fn from(err: TreeError) -> Self {
        Self::Mutation(err.into())
    }
}
