//! Error types with error codes and helpful messages.
//!
//! # Error Codes
//!
//! - C001: `InvalidDimensions` (grid smaller than 2×2)
//! - C002: `InvalidWordLengths` (word-length bounds out of range or inverted)
//! - C003: `InvalidDensity` (blocks density outside `[0, 1]`)
//! - C004: `InvalidIslandSize` (max block island size below 1)
//! - D001: `Io` (dictionary file could not be read)
//! - D002: `Json` (JSON dictionary could not be parsed)
//! - D003: `UnsupportedShape` (JSON dictionary has an unrecognized layout)
//! - F001: `EmptyDomain` (a cell's character domain emptied during word fill)
//!
//! Structural contradictions found while propagating or searching are *not*
//! errors: `Grid::solve` and `Grid::collapse` report them as `false` and the
//! search recovers via snapshot/restore (see `grid`).

use std::io;

/// Configuration rejected by [`crate::config::GridConfig::validate`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least 2x2, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("word lengths must satisfy 1 <= min <= max and max >= 2, got min={min}, max={max}")]
    InvalidWordLengths { min: usize, max: usize },

    #[error("blocks density must be within [0, 1], got {density}")]
    InvalidDensity { density: f64 },

    #[error("max block island size must be at least 1, got {size}")]
    InvalidIslandSize { size: usize },
}

impl ConfigError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidDimensions { .. } => "C001",
            ConfigError::InvalidWordLengths { .. } => "C002",
            ConfigError::InvalidDensity { .. } => "C003",
            ConfigError::InvalidIslandSize { .. } => "C004",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ConfigError::InvalidDimensions { .. } => {
                Some("Use --width and --height of at least 2")
            }
            ConfigError::InvalidWordLengths { .. } => {
                Some("Example: --min-word-length 2 --max-word-length 12")
            }
            ConfigError::InvalidDensity { .. } => {
                Some("Pass a fraction, e.g. --blocks-density 0.3")
            }
            ConfigError::InvalidIslandSize { .. } => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Failure while loading or parsing a dictionary.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse JSON dictionary: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON parsed but was neither a length-keyed map of word lists nor
    /// a length-keyed map of word-keyed objects.
    #[error("unsupported JSON dictionary shape: {context}")]
    UnsupportedShape { context: String },
}

impl DictionaryError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DictionaryError::Io(_) => "D001",
            DictionaryError::Json(_) => "D002",
            DictionaryError::UnsupportedShape { .. } => "D003",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            DictionaryError::Io(_) => Some("Check that the dictionary path exists and is readable"),
            DictionaryError::Json(_) => None,
            DictionaryError::UnsupportedShape { .. } => Some(
                "Expected {\"3\": [\"cat\", ...]} or {\"3\": {\"cat\": ...}}, keyed by word length",
            ),
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Contradiction raised by the word filler.
///
/// Distinct from the structural contradictions the propagation loop reports
/// as boolean failure: an empty character domain aborts the whole word-fill
/// attempt without retrying alternate structural grids.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FillError {
    #[error("no candidate letters remain at ({x}, {y})")]
    EmptyDomain { x: usize, y: usize },
}

impl FillError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            FillError::EmptyDomain { .. } => "F001",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            FillError::EmptyDomain { .. } => {
                Some("Use a larger dictionary or regenerate the grid structure")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Shared formatter: `[CODE] message` plus an optional `help:` line.
#[must_use]
pub fn format_error_with_code_and_help(
    message: &str,
    code: &str,
    help: Option<&str>,
) -> String {
    match help {
        Some(help) => format!("[{code}] {message}\n  help: {help}"),
        None => format!("[{code}] {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_codes_are_stable() {
        let e = ConfigError::InvalidDimensions {
            width: 1,
            height: 1,
        };
        assert_eq!(e.code(), "C001");
        assert!(e.display_detailed().starts_with("[C001]"));
    }

    #[test]
    fn fill_error_reports_coordinates() {
        let e = FillError::EmptyDomain { x: 3, y: 1 };
        assert_eq!(e.code(), "F001");
        assert!(e.to_string().contains("(3, 1)"));
        assert!(e.display_detailed().contains("help:"));
    }

    #[test]
    fn format_without_help_is_single_line() {
        let s = format_error_with_code_and_help("boom", "X001", None);
        assert_eq!(s, "[X001] boom");
    }
}
