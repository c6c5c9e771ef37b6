//! INSERT statements.

use super::alias_env::AliasEnvironment;
use super::assignments::entity_assignments;
use super::errors::SemanticError;
use super::plan::{Endpoint, Link, Outcome, PlanStep, StatementPlan};
use super::reference_strategy::ReferenceStrategy;
use crate::cypher_generator::GraphQuery;
use crate::dsl_parser::ast::InsertEntity;
use crate::graph_catalog::{GraphSchemaError, SchemaView, TYPES_PROPERTY};
use crate::store::value::Value;

pub(crate) fn compile_insert(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    strategy: &dyn ReferenceStrategy,
    insert: &InsertEntity<'_>,
) -> Result<StatementPlan, SemanticError> {
    let entity_name = schema.resolve_entity(insert.type_name)?.name.clone();
    let family = schema.ancestors(&entity_name)?;

    // Every reference field of the type must name a known entity before the
    // first instance exists, assigned or not.
    for field in schema.effective_fields(&entity_name)? {
        if let Some(referenced) = field.field_type.referenced_entity() {
            if schema.entity(referenced).is_none() {
                return Err(GraphSchemaError::UnknownFieldType {
                    owner: entity_name.clone(),
                    field: field.name.clone(),
                    type_name: referenced.to_string(),
                }
                .into());
            }
        }
    }

    if let Some(alias) = insert.alias {
        if aliases.contains(alias) {
            return Err(SemanticError::DuplicateAlias {
                alias: alias.to_string(),
            });
        }
    }

    let compiled = entity_assignments(schema, aliases, strategy, &entity_name, &insert.assignments)?;

    let mut properties: Vec<(String, Value)> = compiled
        .properties
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .collect();
    properties.push((
        TYPES_PROPERTY.to_string(),
        Value::List(family.into_iter().map(Value::String).collect()),
    ));

    let mut steps: Vec<PlanStep> = compiled
        .verifications
        .into_iter()
        .map(PlanStep::Verify)
        .collect();
    steps.push(PlanStep::Create(GraphQuery::CreateVertex {
        label: entity_name.clone(),
        properties,
    }));
    for reference in compiled.references {
        for target in reference.targets {
            steps.push(PlanStep::Link(Link {
                source: Endpoint::Created,
                target: Endpoint::Known(target),
                label: reference.label.clone(),
                properties: Vec::new(),
            }));
        }
    }

    Ok(StatementPlan {
        steps,
        outcome: Outcome::Inserted {
            alias: insert.alias.map(str::to_string),
            entity_type: entity_name,
        },
    })
}
