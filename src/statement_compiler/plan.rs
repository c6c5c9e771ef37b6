//! Compiled form of one statement.
//!
//! A plan is a list of steps the engine runs in order inside the script's
//! transaction, plus the outcome describing how the steps' results become the
//! statement's result. Element ids that only exist once an earlier step has
//! run (the vertex created by an INSERT, the matches of a pattern) are
//! referred to symbolically.

use super::errors::SemanticError;
use crate::cypher_generator::{ElementRef, GraphQuery, MatchQuery, Properties};
use crate::store::value::{ElementId, Row, Value};

/// Column carrying matched element ids in selection queries.
pub const SELECTED_ID_COLUMN: &str = "id";

#[derive(Debug, Clone, PartialEq)]
pub struct StatementPlan {
    pub steps: Vec<PlanStep>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    /// Catalog maintenance; result rows are ignored.
    Ensure(GraphQuery),
    /// Checks that a numeric id names a vertex of the expected type.
    Verify(Verification),
    /// Creates the statement's vertex; its id is what `Endpoint::Created`
    /// refers to.
    Create(GraphQuery),
    Link(Link),
    Mutate {
        selection: Selection,
        mutation: Mutation,
    },
    /// Pattern query whose rows form the statement result.
    Query(MatchQuery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Created,
    Known(ElementId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: Endpoint,
    pub target: Endpoint,
    pub label: String,
    pub properties: Properties,
}

/// Elements an UPDATE or DELETE applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Element(ElementRef),
    /// A numeric id whose kind is unknown: tried as a vertex first, then as
    /// an edge.
    AnyElement(ElementId),
    Vertices(MatchQuery),
    Edges(MatchQuery),
}

/// Replacement of an edge-mapped reference field on each selected vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceUpdate {
    pub label: String,
    pub targets: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Set {
        properties: Properties,
        references: Vec<ReferenceUpdate>,
    },
    Delete,
}

impl Mutation {
    /// Store operation applying this mutation's property part to `element`.
    pub fn query_for(&self, element: ElementRef) -> GraphQuery {
        match self {
            Mutation::Set { properties, .. } => GraphQuery::SetProperties {
                element,
                properties: properties.clone(),
            },
            Mutation::Delete => GraphQuery::DeleteElement { element },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyRole {
    Field { owner: String, field: String },
    Endpoint {
        relationship: String,
        role: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub id: ElementId,
    pub expected_type: String,
    pub role: VerifyRole,
}

impl Verification {
    /// Judges the `LookupVertex` result for `id`.
    pub fn check(&self, row: Option<&Row>) -> Result<(), SemanticError> {
        let row = row.ok_or(SemanticError::UnresolvedId { id: self.id })?;
        let label = row.get("label").and_then(Value::as_str).unwrap_or_default();
        let matches = match row.get("types").and_then(Value::as_list) {
            Some(types) => types
                .iter()
                .any(|t| t.as_str() == Some(self.expected_type.as_str())),
            None => label == self.expected_type,
        };
        if matches {
            return Ok(());
        }
        Err(match &self.role {
            VerifyRole::Field { owner, field } => SemanticError::TypeMismatch {
                owner: owner.clone(),
                field: field.clone(),
                expected: self.expected_type.clone(),
                found: format!("vertex {} of type `{}`", self.id, label),
            },
            VerifyRole::Endpoint { relationship, role } => SemanticError::EndpointMismatch {
                relationship: relationship.clone(),
                role: *role,
                expected: self.expected_type.clone(),
                found: label.to_string(),
            },
        })
    }
}

/// How the results of a plan's steps become the statement result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Acknowledged,
    /// The created vertex, bound to `alias` when one was given.
    Inserted {
        alias: Option<String>,
        entity_type: String,
    },
    /// Number of elements touched by the plan's mutation.
    Affected,
    /// Rows of the plan's query, labelled by `columns`.
    Rows { columns: Vec<String> },
}
