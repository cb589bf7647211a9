//! User-friendly diagnostic messages.
//!
//! Every user-facing failure names the root cause and, where one exists, the
//! command that fixes it.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;

use crate::compose::{ComposeError, DiscoverError};
use crate::core::graph::GraphError;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str = "help: Run `bspkit init` to create a library manifest";

    /// Suggestion when a target is not found.
    pub const TARGET_NOT_FOUND: &str = "help: Run `bspkit tree` to see available targets";

    /// Suggestion when the configure stamp is missing.
    pub const NOT_CONFIGURED: &str = "help: Run `bspkit configure` first";

    /// Suggestion when a source set went stale.
    pub const STALE_SOURCES: &str =
        "help: Run `bspkit configure` to pick up added or removed headers";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Turn an error chain into an error diagnostic.
    ///
    /// The message is the whole chain; `help` texts of the typed errors
    /// found along it become suggestions.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut diag = Self::error(format!("{:#}", err));
        for cause in err.chain() {
            if let Some(help) = miette_help(cause) {
                let help = format!("help: {}", help);
                if !diag.suggestions.contains(&help) {
                    diag.suggestions.push(help);
                }
            }
        }
        diag
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a new note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        for suggestion in &self.suggestions {
            output.push_str(&format!("  {}\n", suggestion));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

fn miette_help(cause: &(dyn StdError + 'static)) -> Option<String> {
    let diag: &dyn MietteDiagnostic = if let Some(e) = cause.downcast_ref::<ComposeError>() {
        e
    } else if let Some(e) = cause.downcast_ref::<DiscoverError>() {
        e
    } else if let Some(e) = cause.downcast_ref::<GraphError>() {
        e
    } else {
        return None;
    };
    diag.help().map(|h| h.to_string())
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::warning("source set of `_peripherals` changed since last configure")
            .with_location("peripherals/Bspkit.toml")
            .with_context("added: gpio/port.h")
            .with_suggestion(suggestions::STALE_SOURCES);

        let output = diag.format(false);
        assert!(output.starts_with("warning: source set of `_peripherals`"));
        assert!(output.contains("--> peripherals/Bspkit.toml"));
        assert!(output.contains("= added: gpio/port.h"));
        assert!(output.contains("help: Run `bspkit configure`"));
    }

    #[test]
    fn test_from_error_carries_help() {
        let err = anyhow::Error::new(ComposeError::BackendUnavailable {
            name: "zephyr".to_string(),
        })
        .context("failed to configure");

        let output = Diagnostic::from_error(&err).format(false);
        assert!(output.starts_with("error: failed to configure: BSP backend `zephyr`"));
        assert!(output.contains("help: the only built-in backend is `default`"));
    }

    #[test]
    fn test_from_plain_error_has_no_help() {
        let diag = Diagnostic::from_error(&anyhow::anyhow!("boom"));
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.suggestions.is_empty());
    }

    #[test]
    fn test_colored_severity() {
        let output = Diagnostic::error("boom").format(true);
        assert!(output.contains("\x1b[1;31merror"));
    }
}
