//! Error types and the diagnostics collector.
//!
//! Only violated preconditions surface as [`SynthesisError`]. Unresolved
//! references and inconsistent route data are recorded in [`Diagnostics`]
//! and logged; the walk carries on without the affected object.

use std::fmt;

use thiserror::Error;

/// Fatal problems that stop a synthesis session before or during a pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    /// Turn smoothing needs at least two samples per block.
    #[error("turn smoothing requires at least 2 subdivisions, got {0}")]
    InvalidSubdivisions(usize),

    /// The block table holds no blocks to walk.
    #[error("block table is empty")]
    EmptyBlockTable,

    /// Block interval must be a positive finite length.
    #[error("invalid block interval: {0}")]
    InvalidBlockInterval(f64),

    /// The first used block lies past the end of the block table.
    #[error("first used block {first} is outside a table of {len} blocks")]
    FirstBlockOutOfRange {
        /// Requested first block.
        first: usize,
        /// Number of blocks in the table.
        len: usize,
    },

    /// Route settings could not be parsed.
    #[error("invalid route settings: {0}")]
    Config(String),
}

pub type SynthesisResult<T> = Result<T, SynthesisError>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Accumulates non-fatal findings of a session and forwards them to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_split_by_severity() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("station has no stops");
        diagnostics.error("wall structure 4 is not registered");
        diagnostics.warn("change ends without successor");

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.warnings().count(), 2);
        assert_eq!(diagnostics.errors().count(), 1);
    }

    #[test]
    fn diagnostic_display_prefixes_severity() {
        let d = Diagnostic {
            severity: Severity::Error,
            message: "missing rail".into(),
        };
        assert_eq!(d.to_string(), "error: missing rail");
    }

    #[test]
    fn error_messages_name_the_offending_value() {
        assert_eq!(
            SynthesisError::InvalidSubdivisions(1).to_string(),
            "turn smoothing requires at least 2 subdivisions, got 1"
        );
        assert_eq!(
            SynthesisError::FirstBlockOutOfRange { first: 9, len: 4 }.to_string(),
            "first used block 9 is outside a table of 4 blocks"
        );
    }
}
