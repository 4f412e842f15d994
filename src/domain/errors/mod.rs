// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Tool output did not match any recognized tokenization pattern
    ParseAmbiguity(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::ParseAmbiguity(msg) => write!(f, "Unrecognized tool output: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
