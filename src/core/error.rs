//=========================================================================
// Errors
//=========================================================================
//
// Recoverable error taxonomy surfaced to callers.
//
// Task failures are NOT part of this taxonomy: they are observed by the
// scheduler's liveness sweep and escalated through the failure hook
// (see `core::scheduler`).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use thiserror::Error;

//=== Result Alias ========================================================

pub type Result<T> = std::result::Result<T, StageError>;

//=== ConfigError =========================================================

/// Rejected construction or option-bearing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or more option keys are not recognized. Every offending key is
    /// listed, sorted.
    #[error("unknown option(s): {}", .keys.join(", "))]
    UnknownOptions { keys: Vec<String> },

    #[error("option `{key}` expects {expected}")]
    InvalidValue { key: String, expected: &'static str },
}

//=== StageError ==========================================================

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The asset name resolved to no existing file.
    #[error("asset `{name}` not found")]
    AssetNotFound { name: String },

    /// The file exists but the collaborator could not load it.
    #[error("failed to load asset from {}", .path.display())]
    AssetLoad { path: PathBuf },
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_options_lists_every_key() {
        let err = ConfigError::UnknownOptions {
            keys: vec!["colour".to_string(), "speed".to_string()],
        };
        assert_eq!(err.to_string(), "unknown option(s): colour, speed");
    }

    #[test]
    fn config_error_converts_into_stage_error() {
        let err: StageError = ConfigError::InvalidValue {
            key: "x".to_string(),
            expected: "a number",
        }
        .into();
        assert!(matches!(err, StageError::Config(_)));
        assert_eq!(err.to_string(), "option `x` expects a number");
    }
}
