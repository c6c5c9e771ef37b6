//! Caller-facing error taxonomy.
//!
//! Every failure of `Engine::execute` is one of four kinds. Store failures are
//! sorted into a kind by their SQLSTATE so callers can branch on the kind
//! instead of on backend codes.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::dsl_parser::ast::SourcePosition;
use crate::dsl_parser::ParseError;
use crate::statement_compiler::SemanticError;
use crate::store::errors::{SqlStateClass, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Parse,
    Semantic,
    Execution,
    Connection,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse => write!(f, "ParseError"),
            ErrorKind::Semantic => write!(f, "SemanticError"),
            ErrorKind::Execution => write!(f, "ExecutionError"),
            ErrorKind::Connection => write!(f, "ConnectionError"),
        }
    }
}

/// Which statement of the script failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementLocation {
    /// Zero-based index of the statement in the script.
    pub index: usize,
    pub position: SourcePosition,
}

impl fmt::Display for StatementLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "statement {} (line {}, column {})",
            self.index + 1,
            self.position.line,
            self.position.column
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ComplexError {
    #[error("{0}")]
    Parse(ParseError),

    #[error("{location}: {source}")]
    Semantic {
        source: SemanticError,
        location: StatementLocation,
    },

    #[error("{}{message}", .location.map(|l| format!("{}: ", l)).unwrap_or_default())]
    Execution {
        message: String,
        code: Option<String>,
        location: Option<StatementLocation>,
    },

    #[error("{message}")]
    Connection {
        message: String,
        code: Option<String>,
    },
}

impl ComplexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComplexError::Parse(_) => ErrorKind::Parse,
            ComplexError::Semantic { .. } => ErrorKind::Semantic,
            ComplexError::Execution { .. } => ErrorKind::Execution,
            ComplexError::Connection { .. } => ErrorKind::Connection,
        }
    }

    /// Source position of the failing statement, when the failure belongs
    /// to one.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            ComplexError::Parse(err) => Some(err.position()),
            ComplexError::Semantic { location, .. } => Some(location.position),
            ComplexError::Execution { location, .. } => location.map(|l| l.position),
            ComplexError::Connection { .. } => None,
        }
    }

    /// Store error code (SQLSTATE) behind the failure, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ComplexError::Semantic {
                source: SemanticError::Store { code, .. },
                ..
            } => code.as_deref(),
            ComplexError::Execution { code, .. } | ComplexError::Connection { code, .. } => {
                code.as_deref()
            }
            _ => None,
        }
    }

    pub fn semantic(source: SemanticError, location: StatementLocation) -> Self {
        ComplexError::Semantic { source, location }
    }

    /// Failure to reach the store or to open/commit a transaction.
    pub fn connection(err: StoreError) -> Self {
        ComplexError::Connection {
            code: err.code().map(str::to_string),
            message: err.to_string(),
        }
    }

    /// Classifies a failure reported while running a statement's queries.
    pub fn from_store(err: StoreError, location: StatementLocation) -> Self {
        let code = err.code().map(str::to_string);
        let message = match &err {
            StoreError::Connection { message, .. } | StoreError::Query { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        };
        match err.class() {
            SqlStateClass::Connection => ComplexError::Connection { message, code },
            SqlStateClass::Syntax => ComplexError::Parse(ParseError {
                line: location.position.line,
                column: location.position.column,
                token: String::new(),
                message,
            }),
            SqlStateClass::Semantic => ComplexError::Semantic {
                source: SemanticError::Store { message, code },
                location,
            },
            SqlStateClass::Execution => ComplexError::Execution {
                message,
                code,
                location: Some(location),
            },
        }
    }
}

impl From<ParseError> for ComplexError {
    fn from(err: ParseError) -> Self {
        ComplexError::Parse(err)
    }
}
