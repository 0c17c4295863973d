//! Error adapter for converting GigoError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! Syntax errors carry their source text and the byte span of the offending
//! token, so they render with a labeled snippet. Template errors render the
//! failing template with its failing line labeled when the message names
//! one.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use gigo::{GigoError, template::TemplateError};
use gigo_parser::SyntaxError;

/// Adapter for a positioned syntax error.
pub struct DiagnosticAdapter<'a> {
    err: &'a SyntaxError,
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(err: &'a SyntaxError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.err.origin(),
            self.err.position(),
            self.err.reason()
        )
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.err.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.err.wanted().is_empty() {
            return None;
        }
        Some(Box::new(format!("expected one of {}", self.err.wanted_text())))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.err.span();
        let label = LabeledSpan::new_primary_with_span(
            Some(format!("found {}", self.err.found_text())),
            SourceSpan::new(span.start().into(), span.len()),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for non-syntax [`GigoError`] variants.
///
/// Template errors keep the failing template text so the failing line can
/// be labeled.
pub struct ErrorAdapter<'a> {
    err: &'a GigoError,
    template_src: Option<&'a str>,
}

impl<'a> ErrorAdapter<'a> {
    pub fn new(err: &'a GigoError) -> Self {
        let template_src = match err {
            GigoError::Template(template) => Some(template.template_text()),
            _ => None,
        };
        Self { err, template_src }
    }

    fn template(&self) -> Option<&'a TemplateError> {
        match self.err {
            GigoError::Template(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.err, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.err.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err {
            GigoError::Io(_) => "gigo::io",
            GigoError::Syntax(err) => err.code().as_str(),
            GigoError::Template(err) => err.kind().code(),
            GigoError::Mutation(_) => "gigo::mutation",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let err = self.template()?;
        Some(Box::new(format!("in template `{}`", err.name())))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.template()?.line()?;
        self.template_src
            .as_ref()
            .map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let err = self.template()?;
        let span = line_span(self.template_src?, err.line()?)?;
        let label = LabeledSpan::new_primary_with_span(Some("here".to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A syntax error with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte span of the 1-based `line` of `text`, without its newline.
fn line_span(text: &str, line: usize) -> Option<SourceSpan> {
    let mut start = 0;
    for (number, content) in text.split('\n').enumerate() {
        if number + 1 == line {
            return Some(SourceSpan::new(start.into(), content.len()));
        }
        start += content.len() + 1;
    }
    None
}

/// Convert a [`GigoError`] into a list of reportable errors.
///
/// Syntax errors that kept their source become a [`Reportable::Diagnostic`];
/// every other error becomes a single [`Reportable::Error`].
pub fn to_reportables(err: &GigoError) -> Vec<Reportable<'_>> {
    match err {
        GigoError::Syntax(syntax) => match syntax.source_text() {
            Some(src) => vec![Reportable::Diagnostic(DiagnosticAdapter::new(syntax, src))],
            None => vec![Reportable::Error(ErrorAdapter::new(err))],
        },
        _ => vec![Reportable::Error(ErrorAdapter::new(err))],
    }
}

#[cfg(test)]
mod tests {
    use gigo::{MutationError, template::TemplateErrorKind};
    use gigo_parser::ErrorCode;

    use super::*;

    #[test]
    fn test_syntax_error_is_a_diagnostic() {
        let err = gigo::parse_string("type tomate struct qsdqd{}\n").unwrap_err();

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert!(d.source_code().is_some());
                let labels: Vec<_> = d.labels().unwrap().collect();
                assert_eq!(labels.len(), 1);
                assert!(labels[0].primary());
                assert_eq!(labels[0].label(), Some("found word `qsdqd`"));
                assert_eq!(labels[0].offset(), 19);
                assert_eq!(labels[0].len(), 5);
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_syntax_error_code() {
        let err = gigo::parse_string("type 5x struct {}").unwrap_err();
        let reportables = to_reportables(&err);
        let code = reportables[0].code().unwrap().to_string();
        assert_eq!(code, ErrorCode::E102.as_str());
    }

    #[test]
    fn test_mutation_error() {
        let err = GigoError::from(MutationError::UnknownPlaceholder("nope".to_string()));

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "unknown placeholder `nope`");
                assert_eq!(e.code().unwrap().to_string(), "gigo::mutation");
                assert!(e.labels().is_none());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_template_error_labels_failing_line() {
        let text = "one\ntwo\nthree";
        let err = GigoError::from(TemplateError::at(
            TemplateErrorKind::Exec,
            "Slice",
            text,
            2,
            "boom",
        ));

        let reportables = to_reportables(&err);
        let reportable = &reportables[0];
        assert_eq!(reportable.code().unwrap().to_string(), "E201");
        assert_eq!(
            reportable.help().unwrap().to_string(),
            "in template `Slice`"
        );

        assert!(reportable.source_code().is_some());

        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 4);
        assert_eq!(labels[0].len(), 3);
    }

    #[test]
    fn test_template_error_renders_source_line() {
        let err = GigoError::from(TemplateError::at(
            TemplateErrorKind::Exec,
            "Slice",
            "one\ntwo\nthree",
            2,
            "boom",
        ));

        let reporter = miette::GraphicalReportHandler::new();
        let mut writer = String::new();
        for reportable in to_reportables(&err) {
            reporter.render_report(&mut writer, &reportable).unwrap();
        }
        assert!(writer.contains("two"), "{writer}");
        assert!(writer.contains("here"), "{writer}");
    }

    #[test]
    fn test_template_error_without_line_has_no_source() {
        let err = GigoError::from(TemplateError::new(
            TemplateErrorKind::Exec,
            "Slice",
            "one",
            "boom",
        ));

        let reportables = to_reportables(&err);
        assert!(reportables[0].source_code().is_none());
        assert!(reportables[0].labels().is_none());
    }

    #[test]
    fn test_rendering_does_not_fail() {
        let err = gigo::parse_string("type tomate struct qsdqd{}\n").unwrap_err();
        let reporter = miette::GraphicalReportHandler::new();
        for reportable in to_reportables(&err) {
            let mut writer = String::new();
            reporter.render_report(&mut writer, &reportable).unwrap();
            assert!(writer.contains("unexpected token"), "{writer}");
            assert!(writer.contains("found word `qsdqd`"), "{writer}");
        }
    }

    #[test]
    fn test_line_span() {
        assert_eq!(line_span("a\nbc\n", 2), Some(SourceSpan::new(2.into(), 2)));
        assert_eq!(line_span("a", 3), None);
    }
}
