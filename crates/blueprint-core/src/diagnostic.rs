//! Diagnostics produced while validating plugin configuration.
//!
//! Diagnostics are findings reported back to a document author. They are not
//! failures of the validator itself, which are reported through [`crate::Error`].

use blueprint_source_map::{Position, SourceMeta};
use serde::{Deserialize, Serialize};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// A problem that must be fixed before the blueprint can be deployed
    Error,
    /// A problem that does not block deployment
    Warning,
    /// Informational finding
    Info,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        };
        f.write_str(name)
    }
}

/// Source range a diagnostic applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRange {
    pub start: SourceMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<SourceMeta>,
}

impl DiagnosticRange {
    /// The range used when a finding has no location in a source document.
    ///
    /// Plugin configuration is a flattened key map, so its diagnostics all
    /// point at line 1, column 1.
    pub fn general() -> Self {
        Self {
            start: SourceMeta::new(Position::start()),
            end: Some(SourceMeta::new(Position::start())),
        }
    }
}

/// A structured finding with an optional source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DiagnosticRange>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message: message.into(),
            range: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
            range: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message: message.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: DiagnosticRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}
