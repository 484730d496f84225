//! # Error Types
//!
//! Compilation itself never fails: unresolved references and unknown tags are
//! reported as [`Diagnostic`](crate::Diagnostic)s. The errors here only come out of
//! *loading*, when a persisted tab document or an options file cannot be read.
//!
//! ## Error Types
//! - `ParseError` - Malformed JSON/YAML document, with line and column
//! - `OptionsError` - Compile options that could not be deserialized
//!
//! ## Usage
//! ```rust
//! use tabline::{parse, TablineError};
//!
//! match parse("{ \"sections\": 7 }") {
//!     Ok(_) => unreachable!(),
//!     Err(TablineError::ParseError { line, column, .. }) => {
//!         assert_eq!(line, 1);
//!         assert!(column > 0);
//!     }
//!     Err(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TablineError {
    /// A tab document that could not be deserialized.
    ///
    /// Line and column are 1-indexed. YAML errors without a known location report
    /// line 0, column 0.
    ///
    /// # Example
    /// ```
    /// # use tabline::TablineError;
    /// let err = TablineError::ParseError {
    ///     line: 3,
    ///     column: 14,
    ///     message: "invalid type: string \"x\", expected u32".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Parse error at line 3, column 14: invalid type: string \"x\", expected u32"
    /// );
    /// ```
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Invalid compile options.
    ///
    /// # Example
    /// ```
    /// # use tabline::TablineError;
    /// let err = TablineError::OptionsError("defaultBpm must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid compile options: defaultBpm must be positive");
    /// ```
    #[error("Invalid compile options: {0}")]
    OptionsError(String),
}

impl From<serde_json::Error> for TablineError {
    fn from(e: serde_json::Error) -> Self {
        TablineError::ParseError {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for TablineError {
    fn from(e: serde_yaml::Error) -> Self {
        let (line, column) = e
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((0, 0));
        TablineError::ParseError {
            line,
            column,
            message: e.to_string(),
        }
    }
}
