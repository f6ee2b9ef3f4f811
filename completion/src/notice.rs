use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use serde::Serialize;

use crate::error::{FetchError, FetchErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A user-facing message produced by a completion request that still
/// completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Byte span of the annotation line the notice is about.
    pub span: Option<Range<usize>>,
    pub notes: Vec<String>,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    /// Notice for a failed fetch: parse failures are errors, the rest warnings.
    pub fn from_fetch_error(err: &FetchError, span: Option<Range<usize>>) -> Self {
        let notice = match err.kind {
            FetchErrorKind::ParseFailed => Notice::error(format!(
                "values of chart `{}` could not be parsed",
                err.chart_ref
            )),
            _ => Notice::warning(format!(
                "values of chart `{}` are unavailable ({})",
                err.chart_ref, err.kind
            )),
        };
        notice.with_span(span).with_note(err.message.clone())
    }

    pub fn with_span(mut self, span: Option<Range<usize>>) -> Self {
        self.span = span;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.level == NoticeLevel::Warning
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let severity = match self.level {
            NoticeLevel::Warning => Severity::Warning,
            NoticeLevel::Error => Severity::Error,
        };
        let labels = self
            .span
            .iter()
            .map(|span| Label::primary(file_id, span.clone()).with_message("chart annotation"))
            .collect();
        Diagnostic::new(severity)
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(self.notes.clone())
    }
}
