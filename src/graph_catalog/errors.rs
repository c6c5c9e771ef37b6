//! # Schema Registry Error Types
//!
//! Failures raised while registering entity and relationship types, or while
//! resolving names and inheritance chains against the registry.
//!
//! All of these surface to callers as semantic errors: the statement was
//! grammatically valid but contradicts the schema model.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphSchemaError {
    #[error("Entity type `{name}` is already defined")]
    DuplicateEntity { name: String },
    #[error("Relationship type `{name}` is already defined")]
    DuplicateRelationship { name: String },
    #[error("Field `{field}` is declared more than once in `{owner}`")]
    DuplicateField { owner: String, field: String },
    #[error("Field name `{field}` in `{owner}` is reserved")]
    ReservedField { owner: String, field: String },
    #[error("Unknown entity type `{name}`")]
    UnknownEntity { name: String },
    #[error("Field `{field}` of `{owner}` refers to unknown entity type `{type_name}`")]
    UnknownFieldType {
        owner: String,
        field: String,
        type_name: String,
    },
    #[error("Unknown relationship type `{name}`")]
    UnknownRelationship { name: String },
    #[error("Entity `{entity}` extends unknown entity type `{parent}`")]
    UnknownParent { entity: String, parent: String },
    #[error("Inheritance cycle: {chain}")]
    CyclicInheritance { chain: String },
}
