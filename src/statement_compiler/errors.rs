//! Semantic errors raised while compiling a statement against the schema
//! and the script's alias environment, or while checking references at run
//! time.

use thiserror::Error;

use crate::graph_catalog::errors::GraphSchemaError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SemanticError {
    #[error(transparent)]
    Schema(#[from] GraphSchemaError),

    #[error("Alias `{alias}` is not defined in this script")]
    UnknownAlias { alias: String },

    #[error("Alias `{alias}` is already bound in this script")]
    DuplicateAlias { alias: String },

    #[error("`{owner}` has no field `{field}`")]
    UnknownField { owner: String, field: String },

    #[error("Field `{field}` is assigned more than once")]
    DuplicateAssignment { field: String },

    #[error("Field `{field}` of `{owner}` expects {expected}, found {found}")]
    TypeMismatch {
        owner: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("Invalid {expected} value for field `{field}`: {reason}")]
    InvalidValue {
        field: String,
        expected: String,
        reason: String,
    },

    #[error("The {role} of `{relationship}` must be a `{expected}`, found `{found}`")]
    EndpointMismatch {
        relationship: String,
        role: &'static str,
        expected: String,
        found: String,
    },

    #[error("Variable `{name}` does not appear in the pattern")]
    UnboundVariable { name: String },

    #[error("Property `{property}` must be qualified with a variable when the pattern has several elements")]
    AmbiguousProperty { property: String },

    #[error("Variable `{name}` is used for more than one kind of element")]
    VariableConflict { name: String },

    #[error("No vertex with id {id}")]
    UnresolvedId { id: i64 },

    #[error("Cannot create `{label}` edge: vertex {source_id} or {target_id} does not exist")]
    MissingEndpoint {
        label: String,
        source_id: i64,
        target_id: i64,
    },

    #[error("Store rejected the statement{}: {message}", .code.as_ref().map(|c| format!(" [{}]", c)).unwrap_or_default())]
    Store {
        message: String,
        code: Option<String>,
    },
}
