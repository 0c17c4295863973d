use std::fmt;

use gigo_core::{Origin, Position, Span, Token, TokenKind};

use crate::error::ErrorCode;

/// Lines shown before the failing line by [`SyntaxError::render_context`].
const LINES_BEFORE: usize = 6;
/// Lines shown after the failing line by [`SyntaxError::render_context`].
const LINES_AFTER: usize = 7;

/// A positioned syntax error.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    code: ErrorCode,
    reason: String,
    found: Option<Token>,
    position: Position,
    span: Span,
    wanted: Vec<TokenKind>,
    origin: Origin,
    source: Option<String>,
}

impl SyntaxError {
    /// Create an error. `found` is the offending token, `None` at the end of
    /// the input; `anchor` is the token the error is positioned on.
    pub fn new(
        code: ErrorCode,
        reason: impl Into<String>,
        found: Option<Token>,
        anchor: Option<Token>,
        wanted: Vec<TokenKind>,
    ) -> Self {
        let (position, span) = match (&found, anchor) {
            (Some(token), _) => (token.pos, token.span()),
            (None, Some(last)) => {
                let end = last.offset + last.value.len();
                (end_position(&last), Span::new(end..end))
            }
            (None, None) => (Position::default(), Span::default()),
        };
        Self {
            code,
            reason: reason.into(),
            found,
            position,
            span,
            wanted,
            origin: Origin::Str,
            source: None,
        }
    }

    /// Attach the origin and the full source text of the parse.
    pub fn with_origin(mut self, origin: Origin, source: &str) -> Self {
        self.origin = origin;
        self.source = Some(source.to_string());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The offending token, `None` when the input ended.
    pub fn found(&self) -> Option<&Token> {
        self.found.as_ref()
    }

    pub fn wanted(&self) -> &[TokenKind] {
        &self.wanted
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Byte span of the offending token.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn source_text(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Display name of the offending token.
    pub fn found_text(&self) -> String {
        match &self.found {
            Some(token) if token.value.trim().is_empty() => token.kind.name().to_string(),
            Some(token) => format!("{} `{}`", token.kind.name(), token.value),
            None => TokenKind::Eof.name().to_string(),
        }
    }

    /// Accepted token kinds, comma separated.
    pub fn wanted_text(&self) -> String {
        self.wanted
            .iter()
            .map(|kind| format!("`{}`", kind.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Multi-line report: reason, location, found/wanted and a window of the
    /// source with a caret under the failing column.
    pub fn render_context(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.reason);
        out.push('\n');
        out.push_str(&format!(
            "In file={} At={}:{}\n",
            self.origin, self.position.line, self.position.col
        ));
        out.push_str(&format!(
            "Found={} wanted=[{}]\n",
            self.found_text(),
            self.wanted_text()
        ));
        let Some(source) = &self.source else {
            return out;
        };

        let lines: Vec<&str> = source.split('\n').collect();
        let line = self.position.line.clamp(1, lines.len().max(1));
        let first = line.saturating_sub(LINES_BEFORE).max(1);
        let last = (line + LINES_AFTER).min(lines.len());

        out.push('\n');
        out.push_str("...\n");
        for number in first..=last {
            let text = lines.get(number - 1).copied().unwrap_or_default();
            out.push_str(&format!("{number}  {text}\n"));
            if number == line {
                out.push_str(&format!("   --{}↑\n", "-".repeat(self.position.col)));
            }
        }
        out.push_str("...\n");
        out
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}, found {}",
            self.origin,
            self.position,
            self.reason,
            self.found_text()
        )?;
        if !self.wanted.is_empty() {
            write!(f, ", wanted {}", self.wanted_text())?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}

/// Position right after the last character of `token`.
fn end_position(token: &Token) -> Position {
    let mut pos = token.pos;
    for c in token.value.chars() {
        if c == '\n' {
            pos.line += 1;
            pos.col = 0;
        } else {
            pos.col += 1;
        }
    }
    pos
}
