//! Posted diagnostics.
//!
//! Readers and writers never print directly. They post a [`Diagnostic`] into
//! their [`Diagnostics`] sink, which records it (so callers can inspect or
//! count problems) and forwards it to the `log` facade.

use std::fmt;

use strum_macros::{Display, EnumString};

use crate::error::ReadError;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Severity {
    /// Malformed input; the read that posted it fails.
    #[strum(serialize = "read error")]
    ReadError,
    /// Tolerated problem; processing continues.
    #[strum(serialize = "warning")]
    Warning,
    /// Informational note.
    #[strum(serialize = "info")]
    Info,
}

/// One posted problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the problem.
    pub severity: Severity,
    /// Subsystem that posted it, e.g. `"SFBool"` or `"FieldData"`.
    pub component: String,
    /// Message text.
    pub message: String,
    /// Input line, when the diagnostic refers to a text stream position.
    pub line: Option<usize>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coin {} ({}): {}", self.severity, self.component, self.message)?;
        if let Some(line) = self.line {
            write!(f, "\n    Occurred at line {line}")?;
        }
        Ok(())
    }
}

/// Collects the diagnostics posted against one stream.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a diagnostic and forward it to the logger.
    pub fn post(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::ReadError | Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Info => log::debug!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    /// Post a read error and return the matching [`ReadError`] for propagation.
    pub fn read_error(&mut self, component: &str, line: usize, message: impl Into<String>) -> ReadError {
        let message = message.into();
        self.post(Diagnostic {
            severity: Severity::ReadError,
            component: component.to_string(),
            message: message.clone(),
            line: Some(line),
        });
        ReadError::Invalid { line, message }
    }

    /// Post a warning.
    pub fn warning(&mut self, component: &str, line: Option<usize>, message: impl Into<String>) {
        self.post(Diagnostic {
            severity: Severity::Warning,
            component: component.to_string(),
            message: message.into(),
            line,
        });
    }

    /// Post an informational note.
    pub fn info(&mut self, component: &str, message: impl Into<String>) {
        self.post(Diagnostic {
            severity: Severity::Info,
            component: component.to_string(),
            message: message.into(),
            line: None,
        });
    }

    /// Number of posted diagnostics of any severity.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been posted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of posted diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    /// Iterate over the posted diagnostics in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// The most recently posted diagnostic.
    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.last()
    }

    /// Remove and return everything posted so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    /// Drop everything posted so far.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_posts_and_returns() {
        let mut sink = Diagnostics::new();
        let err = sink.read_error("SoSFBool", 3, "Premature end of file");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.count(Severity::ReadError), 1);
        assert_eq!(err.line(), Some(3));
        assert_eq!(sink.last().unwrap().message, "Premature end of file");
    }

    #[test]
    fn test_display_includes_line() {
        let d = Diagnostic {
            severity: Severity::ReadError,
            component: "Input".to_string(),
            message: "Expected '['".to_string(),
            line: Some(7),
        };
        let text = d.to_string();
        assert!(text.starts_with("Coin read error (Input): Expected '['"));
        assert!(text.ends_with("Occurred at line 7"));
    }

    #[test]
    fn test_take_empties_sink() {
        let mut sink = Diagnostics::new();
        sink.warning("Test", None, "first");
        sink.info("Test", "second");
        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.is_empty());
    }
}
