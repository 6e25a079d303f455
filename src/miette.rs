//! `miette` integration.
//!
//! This module is feature-gated behind the `miette` feature.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};

use crate::{Error, Location};

/// Convert a composition [`Error`] into a `miette::Report`.
///
/// This function takes the YAML `source` and a display `file` name/path.
///
/// # Example
///
/// ```rust,no_run
/// let yaml = "a: 1\n---\nb: 2\n";
///
/// let err = saphyr_composer::compose_str(yaml).expect_err("two documents");
/// let report = saphyr_composer::miette::to_miette_report(&err, yaml, "config.yaml");
///
/// // `Debug` formatting uses miette's graphical reporter.
/// eprintln!("{report:?}");
/// ```
///
/// If the error has no known location, the report will not include labels.
pub fn to_miette_report(err: &Error, source: &str, file: &str) -> miette::Report {
    let src = Arc::new(NamedSource::new(file, source.to_owned()));
    let mut labels = Vec::new();
    if let Some(location) = err.location() {
        labels.push(label(source, location, label_text(err)));
    }
    if let (Error::Structural { context: Some((what, _)), .. }, Some(location)) =
        (err, err.context_location())
    {
        labels.push(label(source, location, what.clone()));
    }
    miette::Report::new(ErrorDiagnostic {
        message: err.to_string(),
        code: code(err),
        help: help(err),
        src,
        labels,
    })
}

#[derive(Clone, Debug)]
struct ErrorDiagnostic {
    message: String,
    code: &'static str,
    help: Option<&'static str>,
    src: Arc<NamedSource<String>>,
    labels: Vec<LabeledSpan>,
}

impl fmt::Display for ErrorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ErrorDiagnostic {}

impl Diagnostic for ErrorDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help.map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.clone().into_iter()))
        }
    }
}

fn code(err: &Error) -> &'static str {
    match err {
        Error::Structural { .. } => "saphyr_composer::structural",
        Error::Unexpected { .. } => "saphyr_composer::unexpected_event",
        Error::Eof { .. } => "saphyr_composer::eof",
        Error::UndefinedAlias { .. } => "saphyr_composer::undefined_alias",
        Error::Limit { .. } => "saphyr_composer::limit",
        Error::Scan { .. } => "saphyr_composer::scan",
        _ => "saphyr_composer::internal",
    }
}

fn help(err: &Error) -> Option<&'static str> {
    match err {
        Error::Structural { .. } => Some("use `compose_all_str` to read a multi-document stream"),
        Error::UndefinedAlias { .. } => {
            Some("an anchor must be defined earlier in the same document")
        }
        Error::Limit { .. } => Some("raise the limit in `Options::limits` if the input is trusted"),
        _ => None,
    }
}

fn label_text(err: &Error) -> String {
    match err {
        Error::Structural { .. } => "another document starts here".to_owned(),
        Error::UndefinedAlias { anchor, .. } => format!("`*{anchor}` is not defined"),
        Error::Limit { .. } => "limit exceeded here".to_owned(),
        _ => "here".to_owned(),
    }
}

fn label(source: &str, location: Location, text: String) -> LabeledSpan {
    let offset = byte_offset(source, location.index() as usize);
    LabeledSpan::new_with_span(Some(text), SourceSpan::new(offset.into(), 1))
}

/// Byte offset of the character at `char_index`, clamped to the end of `source`.
fn byte_offset(source: &str, char_index: usize) -> usize {
    source
        .char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(source.len())
}
