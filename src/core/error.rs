//! Error handling for solution templatization
//!
//! Two layers, mirroring how the rest of the crate reports failures:
//! - [`TemplatizeError`] - strongly-typed failures raised by the core and the loaders
//! - [`ErrorContext`] - a wrapper adding details and a suggestion for CLI users
//!
//! The core is built to fall through on malformed-but-JSON-shaped input (absent
//! urls, empty id lists, `null` leaves, strings that only look like JSON). The
//! variants below are the few cases where a conversion genuinely has to stop.
//!
//! # Examples
//!
//! ```rust,no_run
//! use solution_templatize::core::{TemplatizeError, user_friendly_error};
//!
//! let error = TemplatizeError::InvalidPattern {
//!     pattern: "(unclosed".to_string(),
//!     reason: "unclosed group".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Failures raised while templatizing or resolving a document.
///
/// The enum is `Clone` so that [`user_friendly_error`] can lift it out of an
/// [`anyhow::Error`] chain without consuming the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplatizeError {
    /// A url, web map layer id or item id could not be compiled into a pattern.
    ///
    /// Only reachable in raw pattern mode, where catalog values are used as
    /// regular expressions verbatim.
    #[error("Invalid match pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source after translation to regex syntax
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// A placeholder had no value in the settings dictionary (strict mode only).
    #[error("Unresolved placeholder '{{{{{path}}}}}'")]
    UnresolvedPlaceholder {
        /// Dotted path inside the placeholder
        path: String,
        /// Known paths that are close to `path`
        suggestions: Vec<String>,
    },

    /// A JSON document or embedded JSON string could not be (de)serialized.
    #[error("JSON serialization failed: {message}")]
    Serialization {
        /// Message from `serde_json`
        message: String,
    },

    /// The datasource catalog file does not describe a list of datasources.
    #[error("Invalid datasource catalog: {reason}")]
    InvalidCatalog {
        /// What was wrong with it
        reason: String,
    },

    /// An input or output file could not be read or written.
    #[error("File operation failed: {message}")]
    FileError {
        /// Full error chain text
        message: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Underlying error message
        message: String,
    },

    /// Anything else, carrying the full error chain text.
    #[error("{message}")]
    Other {
        message: String,
    },
}

impl From<serde_json::Error> for TemplatizeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

/// Convenience alias used throughout the core.
pub type Result<T, E = TemplatizeError> = std::result::Result<T, E>;

/// A [`TemplatizeError`] decorated with user-facing hints.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: TemplatizeError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Extra background on why it happened
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: TemplatizeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

fn create_error_context(error: TemplatizeError) -> ErrorContext {
    let details = match &error {
        TemplatizeError::InvalidPattern {
            ..
        } => Some(
            "In raw pattern mode urls and web map layer ids are treated as regular expressions",
        ),
        TemplatizeError::UnresolvedPlaceholder {
            ..
        } => Some("Strict resolution requires every placeholder to have a value"),
        _ => None,
    };

    let suggestion = match &error {
        TemplatizeError::InvalidPattern {
            ..
        } => Some("Re-run with --pattern-mode escaped to match catalog values literally".to_string()),
        TemplatizeError::UnresolvedPlaceholder {
            suggestions,
            ..
        } => {
            if suggestions.is_empty() {
                Some("Add the missing path to the settings file or drop --strict".to_string())
            } else {
                Some(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        TemplatizeError::Serialization {
            ..
        } => Some("Check that the input file contains valid JSON".to_string()),
        TemplatizeError::InvalidCatalog {
            ..
        } => Some(
            "The catalog must be a JSON array of datasource records with at least a basePath"
                .to_string(),
        ),
        TemplatizeError::FileError {
            ..
        } => Some("Check that the file exists and the path is correct".to_string()),
        TemplatizeError::ConfigError {
            ..
        } => Some("Fix the TOML syntax or pass a different file with --config".to_string()),
        TemplatizeError::Other {
            ..
        } => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    ctx
}

/// Convert any error into an [`ErrorContext`] suitable for terminal output.
///
/// Walks the `anyhow` chain looking for a [`TemplatizeError`]. I/O, JSON and
/// TOML errors get generic hints; anything else is reported with its full
/// chain text.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(templatize_error) = cause.downcast_ref::<TemplatizeError>() {
            return create_error_context(templatize_error.clone());
        }
    }

    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            let ctx = ErrorContext::new(TemplatizeError::FileError {
                message: format!("{error:#}"),
            });
            return match io_error.kind() {
                std::io::ErrorKind::NotFound => ctx
                    .with_suggestion("Check that the file exists and the path is correct"),
                std::io::ErrorKind::PermissionDenied => {
                    ctx.with_suggestion("Check the file permissions")
                }
                _ => ctx,
            };
        }

        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return create_error_context(TemplatizeError::Serialization {
                message: format!("{error:#}"),
            });
        }

        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return create_error_context(TemplatizeError::ConfigError {
                message: format!("{error:#}"),
            });
        }
    }

    create_error_context(TemplatizeError::Other {
        message: format!("{error:#}"),
    })
}
