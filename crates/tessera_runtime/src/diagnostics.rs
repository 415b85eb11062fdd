use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration-shape problems the core tolerates but reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    MalformedPath,
    PaneIdMismatch,
    MissingPanelSurface,
    PanelIndexOutOfRange,
    MissingHandler,
    TemplateError,
    InvalidPayload,
    InvalidOptions,
    UnknownClass,
    UnknownTarget,
    UnknownFunction,
    LifecycleViolation,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &str {
        match self {
            DiagnosticKind::MalformedPath => "malformed-path",
            DiagnosticKind::PaneIdMismatch => "pane-id-mismatch",
            DiagnosticKind::MissingPanelSurface => "missing-panel-surface",
            DiagnosticKind::PanelIndexOutOfRange => "panel-index-out-of-range",
            DiagnosticKind::MissingHandler => "missing-handler",
            DiagnosticKind::TemplateError => "template-error",
            DiagnosticKind::InvalidPayload => "invalid-payload",
            DiagnosticKind::InvalidOptions => "invalid-options",
            DiagnosticKind::UnknownClass => "unknown-class",
            DiagnosticKind::UnknownTarget => "unknown-target",
            DiagnosticKind::UnknownFunction => "unknown-function",
            DiagnosticKind::LifecycleViolation => "lifecycle-violation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub widget_id: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.widget_id, self.message)
    }
}
