// SPDX-License-Identifier: MIT

//! Typed error handling for kinetic-el
//!
//! Compiling an expression fails in exactly two ways: the scanner meets a
//! malformed token, or the parser meets a token the grammar does not allow.
//! Binding a compiled tree and loading configuration add their own variants.

use thiserror::Error;

/// Top-level error type for kinetic-el
#[derive(Debug, Error)]
pub enum ElError {
    /// Malformed token
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Token in a place the grammar does not permit
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Function or variable binding failed
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Configuration errors (invalid capacity, unknown feature, bad env var)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Lexical error raised by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexical error at position {position}: {message} (at '{fragment}')")]
pub struct ScanError {
    /// Character offset where the offending token starts
    pub position: usize,
    /// What went wrong
    pub message: String,
    /// The offending source fragment
    pub fragment: String,
}

/// Structural error raised by the parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at position {position}, encountered {encountered}, expected {expected}")]
pub struct ParseError {
    /// Character offset of the encountered token
    pub position: usize,
    /// Quoted image of the encountered token, or `<EOF>`
    pub encountered: String,
    /// Quoted symbol(s) that would have been accepted
    pub expected: String,
}

/// Errors raised while binding a tree to functions and variables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// No function mapper, or the mapper does not know the function
    #[error("Could not resolve function '{0}'")]
    UnknownFunction(String),

    /// The call site passes the wrong number of arguments
    #[error("Function '{name}' expects {expected} parameters, got {actual}")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl ElError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Character offset of a scan or parse error
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Scan(e) => Some(e.position),
            Self::Parse(e) => Some(e.position),
            _ => None,
        }
    }
}

impl ScanError {
    pub fn new(position: usize, message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            fragment: fragment.into(),
        }
    }
}

impl ParseError {
    pub fn new(position: usize, encountered: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            position,
            encountered: encountered.into(),
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(9, "'}'", "':'");
        assert_eq!(
            err.to_string(),
            "syntax error at position 9, encountered '}', expected ':'"
        );
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::new(2, "invalid character", "&");
        assert_eq!(
            err.to_string(),
            "lexical error at position 2: invalid character (at '&')"
        );
    }

    #[test]
    fn test_el_error_position() {
        let err: ElError = ParseError::new(4, "'${'", "'#{'").into();
        assert_eq!(err.position(), Some(4));

        let err = ElError::config("capacity must be positive");
        assert_eq!(err.position(), None);
        assert_eq!(
            err.to_string(),
            "Configuration error: capacity must be positive"
        );
    }

    #[test]
    fn test_bind_error_display() {
        let err = BindError::ArgumentCount {
            name: "fn:len".to_string(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Function 'fn:len' expects 1 parameters, got 2"
        );
    }
}
