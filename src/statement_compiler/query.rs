//! MATCH statements.

use std::collections::HashMap;

use super::condition::compile_condition;
use super::errors::SemanticError;
use super::plan::{Outcome, PlanStep, StatementPlan};
use crate::cypher_generator::{EdgeMatch, Filter, LabelMatch, MatchQuery, NodeMatch, Projection};
use crate::dsl_parser::ast::{Condition, PropertyPath, QueryStmt};
use crate::graph_catalog::{GraphSchemaError, SchemaView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariableKind {
    Node,
    Edge,
}

/// Variables declared by the user in one pattern, plus generated names for
/// anonymous elements that cannot collide with them.
struct PatternScope<'a> {
    declared: HashMap<&'a str, VariableKind>,
    generated: usize,
}

impl<'a> PatternScope<'a> {
    fn new() -> Self {
        PatternScope {
            declared: HashMap::new(),
            generated: 0,
        }
    }

    fn declare(&mut self, name: &'a str, kind: VariableKind) -> Result<(), SemanticError> {
        match self.declared.insert(name, kind) {
            None => Ok(()),
            // A node variable may repeat to close a cycle; an edge may not.
            Some(VariableKind::Node) if kind == VariableKind::Node => Ok(()),
            Some(_) => Err(SemanticError::VariableConflict {
                name: name.to_string(),
            }),
        }
    }

    fn fresh(&mut self, prefix: &str) -> String {
        loop {
            let name = format!("_{}{}", prefix, self.generated);
            self.generated += 1;
            if !self.declared.contains_key(name.as_str()) {
                return name;
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<String, SemanticError> {
        if self.declared.contains_key(name) {
            Ok(name.to_string())
        } else {
            Err(SemanticError::UnboundVariable {
                name: name.to_string(),
            })
        }
    }
}

/// Label constraint for an entity type: exact when nothing inherits from it,
/// otherwise a type-family test so subtype instances match too.
pub(crate) fn node_label(schema: &dyn SchemaView, type_name: &str) -> Result<LabelMatch, SemanticError> {
    let entity = schema.resolve_entity(type_name)?;
    Ok(if schema.has_subtypes(&entity.name) {
        LabelMatch::Family(entity.name.clone())
    } else {
        LabelMatch::Exact(entity.name.clone())
    })
}

/// Edge labels are relationship types or reference field names.
fn edge_label(schema: &dyn SchemaView, label: &str) -> Result<String, SemanticError> {
    if schema.relationship(label).is_some() || schema.is_reference_field(label) {
        Ok(label.to_string())
    } else {
        Err(GraphSchemaError::UnknownRelationship {
            name: label.to_string(),
        }
        .into())
    }
}

fn inline_filter(
    scope: &PatternScope<'_>,
    variable: &str,
    condition: Option<&Condition<'_>>,
) -> Result<Option<Filter>, SemanticError> {
    condition
        .map(|condition| {
            compile_condition(condition, |path: &PropertyPath<'_>| match path.alias {
                None => Ok(variable.to_string()),
                Some(alias) => scope.lookup(alias),
            })
        })
        .transpose()
}

pub(crate) fn compile_query(
    schema: &dyn SchemaView,
    query: &QueryStmt<'_>,
) -> Result<StatementPlan, SemanticError> {
    let pattern = &query.pattern;
    let mut scope = PatternScope::new();

    if let Some(name) = pattern.start.name {
        scope.declare(name, VariableKind::Node)?;
    }
    for (edge, node) in &pattern.hops {
        if let Some(name) = edge.name {
            scope.declare(name, VariableKind::Edge)?;
        }
        if let Some(name) = node.name {
            scope.declare(name, VariableKind::Node)?;
        }
    }

    let start = NodeMatch {
        variable: match pattern.start.name {
            Some(name) => name.to_string(),
            None => scope.fresh("n"),
        },
        label: pattern
            .start
            .label
            .map(|label| node_label(schema, label))
            .transpose()?,
    };
    let mut filters: Vec<Filter> = Vec::new();
    filters.extend(inline_filter(
        &scope,
        &start.variable,
        pattern.start.properties.as_ref(),
    )?);

    let mut hops = Vec::with_capacity(pattern.hops.len());
    for (edge, node) in &pattern.hops {
        let edge_match = EdgeMatch {
            variable: match edge.name {
                Some(name) => name.to_string(),
                None => scope.fresh("r"),
            },
            label: edge
                .label
                .map(|label| edge_label(schema, label))
                .transpose()?,
            direction: edge.direction,
        };
        filters.extend(inline_filter(
            &scope,
            &edge_match.variable,
            edge.properties.as_ref(),
        )?);

        let node_match = NodeMatch {
            variable: match node.name {
                Some(name) => name.to_string(),
                None => scope.fresh("n"),
            },
            label: node
                .label
                .map(|label| node_label(schema, label))
                .transpose()?,
        };
        filters.extend(inline_filter(
            &scope,
            &node_match.variable,
            node.properties.as_ref(),
        )?);
        hops.push((edge_match, node_match));
    }

    if let Some(condition) = &query.where_clause {
        let single_element = hops.is_empty().then(|| start.variable.clone());
        filters.push(compile_condition(condition, |path: &PropertyPath<'_>| {
            match (path.alias, &single_element) {
                (Some(alias), _) => scope.lookup(alias),
                (None, Some(variable)) => Ok(variable.clone()),
                (None, None) => Err(SemanticError::AmbiguousProperty {
                    property: path.property.to_string(),
                }),
            }
        })?);
    }

    let mut projections = Vec::with_capacity(query.return_items.len());
    for item in &query.return_items {
        let variable = scope.lookup(item.alias)?;
        projections.push(match item.property {
            Some(property) => Projection::Property {
                variable,
                property: property.to_string(),
                label: item.label(),
            },
            None => Projection::Element {
                variable,
                label: item.label(),
            },
        });
    }

    let outcome = if projections.is_empty() {
        Outcome::Acknowledged
    } else {
        Outcome::Rows {
            columns: projections.iter().map(|p| p.label().to_string()).collect(),
        }
    };

    Ok(StatementPlan {
        steps: vec![PlanStep::Query(MatchQuery {
            start,
            hops,
            filter: Filter::all(filters),
            projections,
        })],
        outcome,
    })
}
