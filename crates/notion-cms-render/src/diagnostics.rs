//! # Diagnostics
//!
//! The renderer never fails on unexpected input. Instead it reports what it
//! skipped to a [`DiagnosticSink`] handed to it at construction, so operators
//! can notice when the upstream API starts sending shapes this crate does not
//! know about.
//!
//! - **`LogSink`**: forwards to the `log` facade under the `renderer` target
//! - **`CollectingSink`**: keeps diagnostics in memory for tests and tooling
//! - **`NullSink`**: drops everything

use std::fmt;
use std::sync::Mutex;

/// Log target and category of every diagnostic emitted by this crate.
pub const CATEGORY: &str = "renderer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnknownModifier,
    UnknownBlock,
    /// A recognized block lacks a field it cannot be drawn without.
    MissingField { field: &'static str },
}

/// One skipped piece of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: &'static str,
    pub level: log::Level,
    pub kind: DiagnosticKind,
    /// The offending modifier tag or block discriminant.
    pub tag: String,
    /// Textual dump of the offending value.
    pub payload: String,
}

impl Diagnostic {
    fn warning(kind: DiagnosticKind, tag: &str, payload: String) -> Self {
        Self {
            category: CATEGORY,
            level: log::Level::Warn,
            kind,
            tag: tag.to_string(),
            payload,
        }
    }

    pub fn unknown_modifier(tag: &str, payload: String) -> Self {
        Self::warning(DiagnosticKind::UnknownModifier, tag, payload)
    }

    pub fn unknown_block(tag: &str, payload: String) -> Self {
        Self::warning(DiagnosticKind::UnknownBlock, tag, payload)
    }

    pub fn missing_field(tag: &str, field: &'static str, payload: String) -> Self {
        Self::warning(DiagnosticKind::MissingField { field }, tag, payload)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnknownModifier => {
                write!(f, "Ignoring unknown text modifier \"{}\": {}", self.tag, self.payload)
            }
            DiagnosticKind::UnknownBlock => {
                write!(f, "Ignoring unknown block type \"{}\": {}", self.tag, self.payload)
            }
            DiagnosticKind::MissingField { field } => write!(
                f,
                "Skipping \"{}\" block without {}: {}",
                self.tag, field, self.payload
            ),
        }
    }
}

/// Receives diagnostics from the renderer.
///
/// Implementations must be safe to share between threads rendering
/// different trees; ordering across trees is not guaranteed.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::log!(target: CATEGORY, diagnostic.level, "{diagnostic}");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        // Recover from a poisoned lock; the vector itself is always consistent
        self.diagnostics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(diagnostic);
    }
}
