//! UPDATE and DELETE statements.

use super::alias_env::AliasEnvironment;
use super::assignments::{entity_assignments, relationship_assignments, untyped_assignments};
use super::condition::compile_condition;
use super::errors::SemanticError;
use super::plan::{Mutation, Outcome, PlanStep, Selection, StatementPlan, SELECTED_ID_COLUMN};
use super::query::node_label;
use super::reference_strategy::ReferenceStrategy;
use crate::cypher_generator::{EdgeMatch, ElementRef, Filter, MatchQuery, NodeMatch, Projection};
use crate::dsl_parser::ast::{
    AliasOrId, Condition, DeleteStmt, Direction, PropertyPath, TargetRef, UpdateStmt,
};
use crate::graph_catalog::{GraphSchemaError, SchemaView};

const TARGET_VARIABLE: &str = "target";

/// What an UPDATE/DELETE target resolved to.
enum TargetType {
    Entity(String),
    Relationship(String),
    Unknown,
}

struct ResolvedTarget {
    selection: Selection,
    target_type: TargetType,
}

fn target_filter(condition: &Condition<'_>) -> Result<Filter, SemanticError> {
    compile_condition(condition, |path: &PropertyPath<'_>| match path.alias {
        None => Ok(TARGET_VARIABLE.to_string()),
        Some(alias) => Err(SemanticError::UnboundVariable {
            name: alias.to_string(),
        }),
    })
}

fn resolve_target(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    target: &TargetRef<'_>,
) -> Result<ResolvedTarget, SemanticError> {
    match target {
        TargetRef::Element(AliasOrId::Alias(alias)) => {
            let binding = aliases.resolve(alias)?;
            Ok(ResolvedTarget {
                selection: Selection::Element(ElementRef::Vertex(binding.id)),
                target_type: TargetType::Entity(binding.entity_type.clone()),
            })
        }
        TargetRef::Element(AliasOrId::Id(id)) => Ok(ResolvedTarget {
            selection: Selection::AnyElement(*id),
            target_type: TargetType::Unknown,
        }),
        TargetRef::Pattern {
            type_name,
            condition,
        } => {
            let projections = vec![Projection::Id {
                variable: TARGET_VARIABLE.to_string(),
                label: SELECTED_ID_COLUMN.to_string(),
            }];
            let filter = Some(target_filter(condition)?);

            if schema.entity(type_name).is_some() {
                let query = MatchQuery {
                    start: NodeMatch {
                        variable: TARGET_VARIABLE.to_string(),
                        label: Some(node_label(schema, type_name)?),
                    },
                    hops: Vec::new(),
                    filter,
                    projections,
                };
                return Ok(ResolvedTarget {
                    selection: Selection::Vertices(query),
                    target_type: TargetType::Entity(type_name.to_string()),
                });
            }

            if let Some(relationship) = schema.relationship(type_name) {
                let query = MatchQuery {
                    start: NodeMatch {
                        variable: "source".to_string(),
                        label: None,
                    },
                    hops: vec![(
                        EdgeMatch {
                            variable: TARGET_VARIABLE.to_string(),
                            label: Some(relationship.name.clone()),
                            direction: Direction::Outgoing,
                        },
                        NodeMatch {
                            variable: "destination".to_string(),
                            label: None,
                        },
                    )],
                    filter,
                    projections,
                };
                return Ok(ResolvedTarget {
                    selection: Selection::Edges(query),
                    target_type: TargetType::Relationship(relationship.name.clone()),
                });
            }

            Err(GraphSchemaError::UnknownEntity {
                name: type_name.to_string(),
            }
            .into())
        }
    }
}

pub(crate) fn compile_update(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    strategy: &dyn ReferenceStrategy,
    update: &UpdateStmt<'_>,
) -> Result<StatementPlan, SemanticError> {
    let target = resolve_target(schema, aliases, &update.target)?;
    let mut steps = Vec::new();

    let mutation = match &target.target_type {
        TargetType::Entity(entity_type) => {
            let compiled =
                entity_assignments(schema, aliases, strategy, entity_type, &update.assignments)?;
            steps.extend(compiled.verifications.into_iter().map(PlanStep::Verify));
            Mutation::Set {
                properties: compiled.properties,
                references: compiled.references,
            }
        }
        TargetType::Relationship(name) => {
            let relationship = schema.resolve_relationship(name)?;
            let compiled =
                relationship_assignments(schema, aliases, relationship, &update.assignments)?;
            steps.extend(compiled.verifications.into_iter().map(PlanStep::Verify));
            Mutation::Set {
                properties: compiled.properties,
                references: Vec::new(),
            }
        }
        TargetType::Unknown => Mutation::Set {
            properties: untyped_assignments(&update.assignments)?,
            references: Vec::new(),
        },
    };

    steps.push(PlanStep::Mutate {
        selection: target.selection,
        mutation,
    });
    Ok(StatementPlan {
        steps,
        outcome: Outcome::Affected,
    })
}

pub(crate) fn compile_delete(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    delete: &DeleteStmt<'_>,
) -> Result<StatementPlan, SemanticError> {
    let target = resolve_target(schema, aliases, &delete.target)?;
    Ok(StatementPlan {
        steps: vec![PlanStep::Mutate {
            selection: target.selection,
            mutation: Mutation::Delete,
        }],
        outcome: Outcome::Affected,
    })
}
