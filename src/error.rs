//! Error types for intern-config.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for resolution operations.
///
/// Each variant maps to a specific process exit code.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Arguments (from the command line or `INTERN_ARGS`) could not be parsed.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// A config file does not exist.
    ///
    /// The resolver recovers from this only when the missing file is the
    /// default `intern.json`.
    #[error("config file '{}' not found", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// Any other failure loading a config file or selecting a child config.
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// A file pattern could not be compiled or evaluated.
    #[error("invalid file pattern: {0}")]
    Pattern(String),

    /// A source map reference could not be decoded.
    #[error("failed to read source map: {0}")]
    SourceMap(String),
}

impl ResolveError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::InvalidArgs(_) => exit_codes::USER_ERROR,
            ResolveError::ConfigNotFound { .. } => exit_codes::CONFIG_FAILURE,
            ResolveError::ConfigLoad(_) => exit_codes::CONFIG_FAILURE,
            ResolveError::Pattern(_) => exit_codes::PATTERN_FAILURE,
            ResolveError::SourceMap(_) => exit_codes::SOURCE_MAP_FAILURE,
        }
    }

    /// Whether this error reports a config file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::ConfigNotFound { .. })
    }
}

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_args_has_correct_exit_code() {
        let err = ResolveError::InvalidArgs("missing closing quote".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn config_errors_have_correct_exit_code() {
        let err = ResolveError::ConfigNotFound {
            path: PathBuf::from("/work/intern.json"),
        };
        assert_eq!(err.exit_code(), exit_codes::CONFIG_FAILURE);

        let err = ResolveError::ConfigLoad("Unknown child config \"ci\"".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_FAILURE);
    }

    #[test]
    fn pattern_error_has_correct_exit_code() {
        let err = ResolveError::Pattern("unclosed character class".to_string());
        assert_eq!(err.exit_code(), exit_codes::PATTERN_FAILURE);
    }

    #[test]
    fn source_map_error_has_correct_exit_code() {
        let err = ResolveError::SourceMap("invalid base64".to_string());
        assert_eq!(err.exit_code(), exit_codes::SOURCE_MAP_FAILURE);
    }

    #[test]
    fn only_not_found_is_not_found() {
        let err = ResolveError::ConfigNotFound {
            path: PathBuf::from("intern.json"),
        };
        assert!(err.is_not_found());
        assert!(!ResolveError::ConfigLoad("bad json".to_string()).is_not_found());
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = ResolveError::ConfigNotFound {
            path: PathBuf::from("/work/missing.json"),
        };
        assert_eq!(err.to_string(), "config file '/work/missing.json' not found");

        let err = ResolveError::Pattern("'[' not closed".to_string());
        assert_eq!(err.to_string(), "invalid file pattern: '[' not closed");
    }
}
