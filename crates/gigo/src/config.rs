//! Configuration types for the gigo compiler.
//!
//! Every type implements [`serde::Deserialize`] with every field defaulted,
//! so a partial configuration file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining parser and mutation settings.
//! - [`ParserConfig`] - Settings handed to the parser.
//! - [`MutationConfig`] - Limits of the mutation engine.
//!
//! # Example
//!
//! ```
//! # use gigo::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.parser().loop_guard(), 10_000);
//! assert_eq!(config.mutation().max_depth(), 32);
//! ```

use serde::Deserialize;

use gigo_parser::ParseConfig;

const DEFAULT_LOOP_GUARD: usize = 10_000;
const DEFAULT_MAX_DEPTH: usize = 32;

/// Top-level configuration combining parser and mutation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Parser configuration section.
    #[serde(default)]
    parser: ParserConfig,

    /// Mutation configuration section.
    #[serde(default)]
    mutation: MutationConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(parser: ParserConfig, mutation: MutationConfig) -> Self {
        Self { parser, mutation }
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }

    /// Returns the mutation configuration.
    pub fn mutation(&self) -> &MutationConfig {
        &self.mutation
    }
}

/// Settings handed to the parser for every file or string.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Reads allowed without progress before the infinite-loop abort.
    #[serde(default = "default_loop_guard")]
    loop_guard: usize,

    /// Files must start with a package clause.
    #[serde(default = "default_require_package")]
    require_package: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            loop_guard: DEFAULT_LOOP_GUARD,
            require_package: true,
        }
    }
}

impl ParserConfig {
    /// Creates a new [`ParserConfig`].
    ///
    /// # Arguments
    ///
    /// * `loop_guard` - Unflushed token reads allowed before aborting.
    /// * `require_package` - Whether files must start with a package clause.
    pub fn new(loop_guard: usize, require_package: bool) -> Self {
        Self {
            loop_guard,
            require_package,
        }
    }

    pub fn loop_guard(&self) -> usize {
        self.loop_guard
    }

    pub fn require_package(&self) -> bool {
        self.require_package
    }

    /// Parser settings for a complete file.
    pub fn for_file(&self) -> ParseConfig {
        ParseConfig {
            require_package: self.require_package,
            loop_guard: self.loop_guard,
        }
    }

    /// Parser settings for a snippet, which never requires a package.
    pub fn for_snippet(&self) -> ParseConfig {
        ParseConfig {
            require_package: false,
            loop_guard: self.loop_guard,
        }
    }
}

/// Limits of the mutation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationConfig {
    /// Nested mutator, helper and placeholder evaluations allowed.
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MutationConfig {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns the maximum nesting of evaluations.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

fn default_loop_guard() -> usize {
    DEFAULT_LOOP_GUARD
}

fn default_require_package() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
