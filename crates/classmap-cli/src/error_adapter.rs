//! miette reports for [`ClassmapError`].
//!
//! A parse failure becomes one [`Report`] per parser diagnostic, each showing
//! the snippet from the file that failed and, when the file is known, its
//! path. Every other failure becomes a single report without source.

use std::{fmt, path::Path, sync::Arc};

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, NamedSource, SourceCode,
    SourceSpan,
};

use classmap::ClassmapError;
use classmap_parser::{Span, error::Diagnostic};

/// Source text a parse report points into.
#[derive(Debug, Clone)]
enum Snippet {
    /// Text read from a file; miette prints the path above the snippet.
    File(NamedSource<Arc<str>>),
    /// Text handed to the parser directly.
    Text(Arc<str>),
}

impl Snippet {
    fn new(src: &str, path: Option<&Path>) -> Self {
        let text: Arc<str> = Arc::from(src);
        match path {
            Some(path) => Snippet::File(
                NamedSource::new(path.display().to_string(), text).with_language("java"),
            ),
            None => Snippet::Text(text),
        }
    }

    fn source_code(&self) -> &dyn SourceCode {
        match self {
            Snippet::File(named) => named,
            Snippet::Text(text) => text,
        }
    }
}

/// One renderable failure.
#[derive(Debug, Clone)]
pub struct Report {
    message: String,
    code: String,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
    snippet: Option<Snippet>,
}

impl Report {
    fn from_diagnostic(diag: &Diagnostic, snippet: Snippet) -> Self {
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let text = Some(label.message().to_string());
                let span = source_span(label.span());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(text, span)
                } else {
                    LabeledSpan::new_with_span(text, span)
                }
            })
            .collect();

        Self {
            message: diag.message().to_string(),
            code: diag
                .code()
                .map_or_else(|| "classmap::parse".to_string(), |code| code.to_string()),
            help: diag.help().map(str::to_string),
            labels,
            snippet: Some(snippet),
        }
    }

    fn from_failure(err: &ClassmapError) -> Self {
        let (code, help) = match err {
            ClassmapError::Io(_) => ("classmap::io", None),
            ClassmapError::Index(_) => (
                "classmap::index",
                Some("package and type names must be non-empty dotted identifiers"),
            ),
            ClassmapError::Export(_) => ("classmap::export", None),
            ClassmapError::Parse { .. } => ("classmap::parse", None),
        };

        Self {
            message: err.to_string(),
            code: code.to_string(),
            help: help.map(str::to_string),
            labels: Vec::new(),
            snippet: None,
        }
    }

    /// Returns the code shown in brackets, e.g. `E100` or `classmap::io`.
    pub fn code_str(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Report {}

impl MietteDiagnostic for Report {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.snippet.as_ref().map(Snippet::source_code)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().cloned()))
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Splits `err` into the reports to show.
///
/// A [`ClassmapError::Parse`] yields one report per diagnostic, all sharing
/// one copy of the source text.
pub fn reports(err: &ClassmapError) -> Vec<Report> {
    match err {
        ClassmapError::Parse { err, src, path } => {
            let snippet = Snippet::new(src, path.as_deref());
            err.diagnostics()
                .iter()
                .map(|diag| Report::from_diagnostic(diag, snippet.clone()))
                .collect()
        }
        other => vec![Report::from_failure(other)],
    }
}

/// Renders every report of `err` with miette's graphical handler.
pub fn render_reports(err: &ClassmapError) -> Vec<String> {
    render_with(&GraphicalReportHandler::new(), err)
}

fn render_with(handler: &GraphicalReportHandler, err: &ClassmapError) -> Vec<String> {
    reports(err)
        .iter()
        .map(|report| {
            let mut out = String::new();
            if handler.render_report(&mut out, report).is_err() {
                out = format!("{}: {report}", report.code_str());
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use classmap::{DiagramBuilder, index::IndexError};
    use classmap_parser::error::{ErrorCode, ParseError};
    use miette::GraphicalTheme;

    use super::*;

    fn plain_render(err: &ClassmapError) -> Vec<String> {
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        render_with(&handler, err)
    }

    fn truncated_file_error() -> ClassmapError {
        DiagramBuilder::default()
            .parse("package shop;\n\nclass Order {\n    void total() {\n")
            .unwrap_err()
            .with_path("src/main/java/shop/Order.java")
    }

    #[test]
    fn test_parse_report_names_the_file() {
        let err = truncated_file_error();

        let rendered = plain_render(&err);

        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("src/main/java/shop/Order.java"), "{}", rendered[0]);
        assert!(rendered[0].contains("E101"));
        assert!(rendered[0].contains("this block is never closed"));
    }

    #[test]
    fn test_parse_report_without_path_still_shows_source() {
        let err = DiagramBuilder::default()
            .parse("class A extends { }")
            .unwrap_err();

        let reports = reports(&err);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].code_str(), "E100");
        assert!(reports[0].source_code().is_some());

        let rendered = plain_render(&err);
        assert!(rendered[0].contains("class A extends { }"));
    }

    #[test]
    fn test_every_lexer_diagnostic_gets_a_report() {
        let err = DiagramBuilder::default()
            .parse("class # A ` {}")
            .unwrap_err()
            .with_path("A.java");

        let reports = reports(&err);

        assert!(reports.len() >= 2);
        for report in &reports {
            assert!(report.code_str().starts_with('E'));
            assert!(report.source_code().is_some());
        }
    }

    #[test]
    fn test_labels_keep_primary_and_secondary() {
        let err = truncated_file_error();

        let reports = reports(&err);
        let labels: Vec<LabeledSpan> = reports[0].labels().unwrap().collect();

        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("this block is never closed"));
    }

    #[test]
    fn test_diagnostic_without_code_uses_parse_code() {
        let parse_err = ParseError::from(
            Diagnostic::error("empty type name").with_label(Span::new(0..1), "here"),
        );
        let err = ClassmapError::new_parse_error(parse_err, "x");

        assert_eq!(reports(&err)[0].code_str(), "classmap::parse");

        let coded = ClassmapError::new_parse_error(
            ParseError::from(Diagnostic::error("bad").with_code(ErrorCode::E002)),
            "#",
        );
        assert_eq!(reports(&coded)[0].code_str(), "E002");
    }

    #[test]
    fn test_index_failure_report() {
        let err = ClassmapError::Index(IndexError::InvalidPackage {
            package: "a..b".to_string(),
        });

        let reports = reports(&err);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].code_str(), "classmap::index");
        assert_eq!(
            reports[0].to_string(),
            "Index error: package name `a..b` has an empty segment"
        );
        assert!(reports[0].source_code().is_none());
        assert!(reports[0].help().is_some());
    }

    #[test]
    fn test_render_reports_mentions_message() {
        let err = ClassmapError::Export("broken pipe".to_string());
        let rendered = render_reports(&err);

        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("broken pipe"));
    }
}
