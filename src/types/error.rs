//! Unified Error Type System
//!
//! Centralized error types for the whole crate.
//!
//! ## Error Kinds
//!
//! - **NotFound**: the settings document (or a file it embeds) does not exist
//! - **ParseError**: the document is not a well-formed literal settings file
//! - **Invalid**: the document parsed but the typed configuration rejected it
//! - **Io**: any other filesystem failure
//!
//! Loading never recovers from an error: the caller reports it and exits.

use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Error Kinds
// =============================================================================

/// Coarse classification used by the CLI and by tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Document or embedded file missing
    NotFound,
    /// Document not syntactically valid
    ParseError,
    /// Typed configuration rejected a value
    Invalid,
    /// Other I/O or serialization failure
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Io => write!(f, "IO"),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Structured validation error with context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// What validation failed
    pub kind: ValidationErrorKind,
    /// Setting that failed validation
    pub field: Option<String>,
    /// Detailed message
    pub message: String,
    /// Expected value or format
    pub expected: Option<String>,
    /// Actual value received
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "Invalid setting '{}': {}", field, self.message)?,
            None => write!(f, "Invalid configuration: {}", self.message)?,
        }
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (expected {}, got {})", expected, actual)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Add field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add expected/actual values
    pub fn with_comparison(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(
            ValidationErrorKind::MissingField,
            "required setting is missing or empty",
        )
        .with_field(field)
    }
}

/// Validation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Required setting missing
    MissingField,
    /// Invalid format (URL, template, pair shape)
    Format,
    /// Two settings disagree with each other
    Consistency,
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfError {
    // -------------------------------------------------------------------------
    // Load Errors
    // -------------------------------------------------------------------------
    #[error("Settings file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Parse error in {}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    // -------------------------------------------------------------------------
    // Typed Configuration Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Validation(ValidationError),

    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<ValidationError> for ConfError {
    fn from(err: ValidationError) -> Self {
        ConfError::Validation(err)
    }
}

impl From<figment::Error> for ConfError {
    fn from(err: figment::Error) -> Self {
        ConfError::Config(format!("Configuration error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ConfError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ConfError {
    /// Create a parse error at a 1-based line/column
    pub fn parse(
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Map an I/O error on `path` to `NotFound` when the file is absent
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Parse { .. } => ErrorKind::ParseError,
            Self::Validation(_) | Self::Config(_) => ErrorKind::Invalid,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Toml(_) => ErrorKind::Io,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorKind::ParseError.to_string(), "PARSE_ERROR");
    }

    #[test]
    fn test_from_io_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ConfError::from_io(Path::new("pelicanconf.py"), io);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Settings file not found: pelicanconf.py");
    }

    #[test]
    fn test_from_io_other() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = ConfError::from_io(Path::new("x.py"), io);
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ConfError::parse("conf.py", 3, 7, "unterminated string");
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert_eq!(
            err.to_string(),
            "Parse error in conf.py:3:7: unterminated string"
        );
    }

    #[test]
    fn test_validation_display() {
        let err = ValidationError::new(ValidationErrorKind::Format, "bad scheme")
            .with_field("SITEURL")
            .with_comparison("http(s)", "ftp");
        assert_eq!(
            err.to_string(),
            "Invalid setting 'SITEURL': bad scheme (expected http(s), got ftp)"
        );
        assert_eq!(ConfError::from(err).kind(), ErrorKind::Invalid);
    }
}
