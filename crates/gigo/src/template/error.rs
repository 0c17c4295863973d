use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Lines shown around the failing line by [`TemplateError::render_context`].
const LINES_AROUND: usize = 3;

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"template: [^:\n]*:(\d+):").expect("template location pattern is valid")
});

/// What failed in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateErrorKind {
    /// E200: the template text is malformed.
    Parse,
    /// E201: an action failed while executing.
    Exec,
}

impl TemplateErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            TemplateErrorKind::Parse => "E200",
            TemplateErrorKind::Exec => "E201",
        }
    }
}

/// A template failure, carrying the template's name and full text.
///
/// Messages follow the `template: NAME:LINE: reason` layout, and the line
/// is recovered from the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TemplateError {
    kind: TemplateErrorKind,
    name: String,
    text: String,
    message: String,
    line: Option<usize>,
}

impl TemplateError {
    /// Create an error from an evaluator message.
    pub fn new(
        kind: TemplateErrorKind,
        name: impl Into<String>,
        text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let line = LOCATION
            .captures(&message)
            .and_then(|captures| captures.get(1))
            .and_then(|line| line.as_str().parse().ok());
        Self {
            kind,
            name: name.into(),
            text: text.into(),
            message,
            line,
        }
    }

    /// Create an error located at `line` of template `name`.
    pub fn at(
        kind: TemplateErrorKind,
        name: &str,
        text: &str,
        line: usize,
        reason: impl AsRef<str>,
    ) -> Self {
        let message = format!("template: {name}:{line}: {}", reason.as_ref());
        Self::new(kind, name, text, message)
    }

    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full text of the failing template.
    pub fn template_text(&self) -> &str {
        &self.text
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Line of the failure, when the message names one.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// The message followed by the template lines around the failing one.
    pub fn render_context(&self) -> String {
        let mut out = format!("[{}] {}\n", self.kind.code(), self.message);
        let Some(line) = self.line else {
            return out;
        };
        let lines: Vec<&str> = self.text.split('\n').collect();
        let line = line.clamp(1, lines.len().max(1));
        let first = line.saturating_sub(LINES_AROUND).max(1);
        let last = (line + LINES_AROUND).min(lines.len());

        out.push_str("...\n");
        for number in first..=last {
            let marker = if number == line { ">" } else { " " };
            let text = lines.get(number - 1).copied().unwrap_or_default();
            out.push_str(&format!("{marker}{number}  {text}\n"));
        }
        out.push_str("...\n");
        out
    }
}
