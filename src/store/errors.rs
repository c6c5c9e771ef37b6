use thiserror::Error;

/// Failure reported by a graph store backend. `code` carries the backend's
/// SQLSTATE when one is available.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Connection failure: {message}")]
    Connection {
        message: String,
        code: Option<String>,
    },
    #[error("Store rejected query{}: {message}", .code.as_ref().map(|c| format!(" [{}]", c)).unwrap_or_default())]
    Query {
        message: String,
        code: Option<String>,
    },
    #[error("Transaction is no longer active")]
    TransactionClosed,
    #[error("Could not decode store result: {0}")]
    Decode(String),
}

/// Error class a SQLSTATE falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlStateClass {
    Connection,
    Execution,
    Syntax,
    Semantic,
}

/// Maps a SQLSTATE onto the error class reported to callers. Unknown codes
/// are execution failures.
pub fn classify_sqlstate(code: &str) -> SqlStateClass {
    match code {
        "42601" => SqlStateClass::Syntax,
        "42000" | "42701" | "42702" | "42703" | "42P01" | "42P02" => SqlStateClass::Semantic,
        "3D000" => SqlStateClass::Execution,
        _ if code.starts_with("08") => SqlStateClass::Connection,
        _ if code.starts_with("22") || code.starts_with("23") => SqlStateClass::Execution,
        _ => SqlStateClass::Execution,
    }
}

impl StoreError {
    pub fn query(message: impl Into<String>) -> Self {
        StoreError::Query {
            message: message.into(),
            code: None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Connection { code, .. } | StoreError::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn class(&self) -> SqlStateClass {
        match self {
            StoreError::Connection { .. } => SqlStateClass::Connection,
            StoreError::Query { code: Some(code), .. } => classify_sqlstate(code),
            StoreError::Query { code: None, .. }
            | StoreError::TransactionClosed
            | StoreError::Decode(_) => SqlStateClass::Execution,
        }
    }
}
