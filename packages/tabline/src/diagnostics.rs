//! Diagnostics reported while compiling or linting a tab.
//!
//! Compilation is best-effort and never aborts, so everything worth telling the
//! caller travels through here instead of through `Result`.

use serde::Serialize;

use crate::playback::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Note length tag that is not one of the known lengths (played as a quarter)
    UnknownNoteLength,
    /// Progression entry naming a section that does not exist
    UnresolvedSection,
    /// Preview address that does not point at an existing unit
    UnresolvedLocation,
    /// Expansion stopped at the configured playable unit cap
    Truncated,
    UnknownStrum,
    /// Chord names and strums of a chord sequence differ in count
    ChordCountMismatch,
    InvalidBpm,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

impl DiagnosticKind {
    /// Same name as the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UnknownNoteLength => "unknown-note-length",
            DiagnosticKind::UnresolvedSection => "unresolved-section",
            DiagnosticKind::UnresolvedLocation => "unresolved-location",
            DiagnosticKind::Truncated => "truncated",
            DiagnosticKind::UnknownStrum => "unknown-strum",
            DiagnosticKind::ChordCountMismatch => "chord-count-mismatch",
            DiagnosticKind::InvalidBpm => "invalid-bpm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(kind, message)
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn unknown_note_length(tag: &str) -> Self {
        Self::warning(
            DiagnosticKind::UnknownNoteLength,
            format!("Unknown note length {:?}, playing it as a quarter note", tag),
        )
    }

    pub fn unresolved_section(section_id: &str) -> Self {
        Self::warning(
            DiagnosticKind::UnresolvedSection,
            format!("Section progression references missing section {:?}", section_id),
        )
    }

    /// Sends the diagnostic to the `tracing` subscriber, if any.
    pub fn log(&self) {
        match self.severity {
            Severity::Warning => {
                tracing::warn!(kind = ?self.kind, location = ?self.location, "{}", self.message)
            }
            Severity::Info => {
                tracing::debug!(kind = ?self.kind, location = ?self.location, "{}", self.message)
            }
        }
    }
}

/// Appends a diagnostic unless an identical one was already reported.
///
/// Repeated units report the same problem once per pass; callers only care about
/// it once.
pub(crate) fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    if !diagnostics.contains(&diagnostic) {
        diagnostics.push(diagnostic);
    }
}
