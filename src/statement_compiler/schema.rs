//! ENTITY and RELATIONSHIP definitions.
//!
//! Definitions are staged in the script's schema overlay; the only store
//! work they cause is label creation.

use super::errors::SemanticError;
use super::plan::{Outcome, PlanStep, StatementPlan};
use super::reference_strategy::ReferenceStrategy;
use crate::cypher_generator::GraphQuery;
use crate::dsl_parser::ast::{EntityDef, RelationshipDef};
use crate::graph_catalog::{EntityType, RelationshipType, SchemaOverlay};

pub(crate) fn compile_entity_def(
    schema: &mut SchemaOverlay<'_>,
    strategy: &dyn ReferenceStrategy,
    def: &EntityDef<'_>,
) -> Result<StatementPlan, SemanticError> {
    let entity = EntityType::from_def(def)?;
    let mut steps = vec![PlanStep::Ensure(GraphQuery::EnsureVertexLabel {
        label: entity.name.clone(),
    })];
    steps.extend(
        strategy
            .schema_queries(&entity)
            .into_iter()
            .map(PlanStep::Ensure),
    );
    schema.define_entity(entity)?;
    Ok(StatementPlan {
        steps,
        outcome: Outcome::Acknowledged,
    })
}

pub(crate) fn compile_relationship_def(
    schema: &mut SchemaOverlay<'_>,
    def: &RelationshipDef<'_>,
) -> Result<StatementPlan, SemanticError> {
    let relationship = RelationshipType::from_def(def)?;
    let steps = vec![PlanStep::Ensure(GraphQuery::EnsureEdgeLabel {
        label: relationship.name.clone(),
    })];
    schema.define_relationship(relationship)?;
    Ok(StatementPlan {
        steps,
        outcome: Outcome::Acknowledged,
    })
}
