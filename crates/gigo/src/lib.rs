//! Gigo - a source-to-source macro expansion compiler for a Go-like language.
//!
//! Sources are parsed into format-preserving trees, then template
//! constructs are expanded into plain declarations:
//!
//! - `template Name<:...> struct {...}` declares a type mutator, with its
//!   templated methods;
//! - `type T implements<:Mutator .Origin ...> {...}` embeds the types the
//!   mutators generate;
//! - `poireau<:...>` inside a struct embeds a generated type in place.
//!
//! Templates use `<: ... :>` actions, see [`template`].

pub mod config;
pub mod registry;
pub mod template;

mod error;
mod mutate;

pub use gigo_core::{NodeId, NodeKind, Origin, Position, Token, TokenKind, Tree};
pub use gigo_parser::{ErrorCode, SyntaxError};

pub use error::{GigoError, MutationError};

use std::{fs, path::Path};

use log::{debug, info};

use config::AppConfig;

/// Builder for parsing and expanding gigo sources.
///
/// # Examples
///
/// ```rust
/// use gigo::{Gigo, config::AppConfig};
///
/// let source = "package main\n\ntype Todo struct {\n  Name string\n}\n";
///
/// let gigo = Gigo::new(AppConfig::default());
/// let tree = gigo.parse_source(source).expect("Failed to parse");
/// let mutated = gigo.mutate(tree).expect("Failed to mutate");
/// assert_eq!(mutated.text(mutated.root()), source);
/// ```
#[derive(Debug, Default)]
pub struct Gigo {
    config: AppConfig,
}

impl Gigo {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Parser and mutation settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read and parse a source file.
    ///
    /// # Errors
    ///
    /// Returns [`GigoError::Io`] when the file can not be read and
    /// [`GigoError::Syntax`] when it does not parse.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Tree, GigoError> {
        let path = path.as_ref();
        info!(path:? = path; "Reading source file");
        let source = fs::read_to_string(path)?;
        let tree = gigo_parser::parse(
            &source,
            Origin::File(path.to_path_buf()),
            &self.config.parser().for_file(),
        )?;
        debug!(declarations = tree.declarations().len(); "File parsed");
        Ok(tree)
    }

    /// Parse a complete source, package clause included when the parser
    /// configuration requires one.
    pub fn parse_source(&self, source: &str) -> Result<Tree, GigoError> {
        Ok(gigo_parser::parse(source, Origin::Str, &self.config.parser().for_file())?)
    }

    /// Parse a snippet that may lack a package clause.
    pub fn parse_string(&self, content: &str) -> Result<Tree, GigoError> {
        Ok(gigo_parser::parse(content, Origin::Str, &self.config.parser().for_snippet())?)
    }

    /// Expand every template construct of `tree` into a fresh tree.
    ///
    /// # Errors
    ///
    /// Returns [`GigoError::Template`] for template failures,
    /// [`GigoError::Syntax`] when generated code does not parse, and
    /// [`GigoError::Mutation`] for orphan template methods, runaway
    /// recursion and mutators that generate no struct.
    pub fn mutate(&self, tree: Tree) -> Result<Tree, GigoError> {
        mutate::mutate(tree, &self.config)
    }

    /// Parse and expand a source file, returning the generated source.
    pub fn generate_file(&self, path: impl AsRef<Path>) -> Result<String, GigoError> {
        let tree = self.mutate(self.parse_file(path)?)?;
        Ok(tree.text(tree.root()))
    }
}

/// Parse a source file with the default configuration.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Tree, GigoError> {
    Gigo::default().parse_file(path)
}

/// Parse a snippet with the default configuration.
pub fn parse_string(content: &str) -> Result<Tree, GigoError> {
    Gigo::default().parse_string(content)
}

/// Expand `tree` with the default configuration.
pub fn mutate(tree: Tree) -> Result<Tree, GigoError> {
    Gigo::default().mutate(tree)
}
