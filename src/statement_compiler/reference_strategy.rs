//! Persistence of entity-reference fields.
//!
//! The compiler never branches on the configured reference mode; it asks the
//! strategy selected once by the engine how a resolved reference is written.

use super::errors::SemanticError;
use crate::config::ReferenceMode;
use crate::cypher_generator::GraphQuery;
use crate::graph_catalog::{EntityType, FieldSchema, SchemaView};
use crate::store::value::{ElementId, Value};

/// How one reference assignment is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceWrite {
    /// Stored on the vertex itself under the field name.
    Property(Value),
    /// One edge from the owning vertex to each target.
    Edges {
        label: String,
        targets: Vec<ElementId>,
    },
}

pub trait ReferenceStrategy: Send + Sync {
    fn mode(&self) -> ReferenceMode;

    /// Store operations that prepare the store for instances of `entity`.
    fn schema_queries(&self, entity: &EntityType) -> Vec<GraphQuery>;

    /// Persistence of `field` on an `owner` instance pointing at `targets`.
    /// An empty target list clears the reference.
    fn write(
        &self,
        schema: &dyn SchemaView,
        owner: &str,
        field: &FieldSchema,
        targets: Vec<ElementId>,
    ) -> Result<ReferenceWrite, SemanticError>;
}

/// References become edges labelled with the field name.
#[derive(Debug, Default)]
pub struct EdgeMappedStrategy;

impl ReferenceStrategy for EdgeMappedStrategy {
    fn mode(&self) -> ReferenceMode {
        ReferenceMode::EdgeMapped
    }

    fn schema_queries(&self, entity: &EntityType) -> Vec<GraphQuery> {
        entity
            .fields
            .iter()
            .filter(|field| field.field_type.referenced_entity().is_some())
            .map(|field| GraphQuery::EnsureEdgeLabel {
                label: field.name.clone(),
            })
            .collect()
    }

    fn write(
        &self,
        schema: &dyn SchemaView,
        owner: &str,
        field: &FieldSchema,
        targets: Vec<ElementId>,
    ) -> Result<ReferenceWrite, SemanticError> {
        // A relationship named after the field constrains both ends.
        if let (Some(relationship), Some(referenced)) =
            (schema.relationship(&field.name), field.field_type.referenced_entity())
        {
            if !schema.is_a(owner, &relationship.source) {
                return Err(SemanticError::EndpointMismatch {
                    relationship: relationship.name.clone(),
                    role: "source",
                    expected: relationship.source.clone(),
                    found: owner.to_string(),
                });
            }
            if !schema.is_a(referenced, &relationship.target) {
                return Err(SemanticError::EndpointMismatch {
                    relationship: relationship.name.clone(),
                    role: "target",
                    expected: relationship.target.clone(),
                    found: referenced.to_string(),
                });
            }
        }
        Ok(ReferenceWrite::Edges {
            label: field.name.clone(),
            targets,
        })
    }
}

/// References are stored as the target's id, or a list of ids for array
/// fields.
#[derive(Debug, Default)]
pub struct ScalarIdStrategy;

impl ReferenceStrategy for ScalarIdStrategy {
    fn mode(&self) -> ReferenceMode {
        ReferenceMode::ScalarId
    }

    fn schema_queries(&self, _entity: &EntityType) -> Vec<GraphQuery> {
        Vec::new()
    }

    fn write(
        &self,
        _schema: &dyn SchemaView,
        _owner: &str,
        field: &FieldSchema,
        targets: Vec<ElementId>,
    ) -> Result<ReferenceWrite, SemanticError> {
        let value = if field.field_type.is_array() {
            Value::List(targets.into_iter().map(Value::Int).collect())
        } else {
            targets.first().copied().map(Value::Int).unwrap_or(Value::Null)
        };
        Ok(ReferenceWrite::Property(value))
    }
}

pub fn strategy_for(mode: ReferenceMode) -> Box<dyn ReferenceStrategy> {
    match mode {
        ReferenceMode::EdgeMapped => Box::new(EdgeMappedStrategy),
        ReferenceMode::ScalarId => Box::new(ScalarIdStrategy),
    }
}
