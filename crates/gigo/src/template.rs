//! Text templates with `<: ... :>` actions.
//!
//! The language is a compact text/template dialect:
//!
//! - `<:.Name:>`, `<:$.Name:>`, `<:$m.Name:>`: fields of dot, of the root
//!   value and of variables, possibly chained (`.A.B`);
//! - `<:func arg...:>` and `<:.Method arg...:>`: calls, with parenthesized
//!   sub-pipelines as arguments;
//! - `<:a | b "x":>`: pipelines, the previous result is passed as the last
//!   argument;
//! - `<:$x := pipeline:>` and `<:$x = pipeline:>`;
//! - `<:if:>`, `<:else if:>`, `<:else:>`, `<:range:>` (with one or two
//!   variables), `<:with:>`, all closed by `<:end:>`;
//! - `<:/* comment */:>` and the `<:- ` / ` -:>` trim markers.
//!
//! ```
//! # use gigo::template::{Template, Value, builtins};
//! let template = Template::parse("greet", "<:range $w := .:><:$w:> <:end:>").unwrap();
//! let out = template.execute(Value::from(vec!["a", "b"]), &builtins()).unwrap();
//! assert_eq!(out, "a b ");
//! ```

mod builtins;
mod error;
mod eval;
mod lexer;
mod parse;
mod value;

pub use builtins::builtins;
pub use error::{TemplateError, TemplateErrorKind};
pub use value::{Func, FuncError, Funcs, Object, Value, expect_args};

use log::debug;

use crate::error::GigoError;

/// Opening and closing action delimiters.
pub const DELIMITERS: (&str, &str) = (lexer::OPEN, lexer::CLOSE);

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    text: String,
    nodes: Vec<parse::Node>,
}

impl Template {
    /// Parse `text` as a template called `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateErrorKind::Parse`] error for unclosed actions,
    /// unexpected characters and unbalanced control structures.
    pub fn parse(name: impl Into<String>, text: impl Into<String>) -> Result<Self, TemplateError> {
        let name = name.into();
        let text = text.into();
        let failure = match lexer::lex(&text) {
            Ok(segments) => match parse::parse(segments) {
                Ok(nodes) => {
                    debug!(template = name.as_str(), nodes = nodes.len(); "Parsed template");
                    return Ok(Self { name, text, nodes });
                }
                Err(failure) => failure,
            },
            Err(err) => (err.line, err.reason),
        };
        let (line, reason) = failure;
        Err(TemplateError::at(TemplateErrorKind::Parse, &name, &text, line, reason))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Execute the template with `data` as dot.
    ///
    /// # Errors
    ///
    /// Execution failures are [`GigoError::Template`] errors. Errors that
    /// functions raise as [`FuncError::Fatal`] are returned unchanged.
    pub fn execute(&self, data: Value, funcs: &Funcs) -> Result<String, GigoError> {
        eval::Exec::new(self, funcs, data).run()
    }
}
