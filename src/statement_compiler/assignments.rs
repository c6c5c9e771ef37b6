//! Assignment lists shared by INSERT, CONNECT and UPDATE.

use std::collections::HashSet;

use super::alias_env::AliasEnvironment;
use super::errors::SemanticError;
use super::plan::{ReferenceUpdate, Verification, VerifyRole};
use super::reference_strategy::{ReferenceStrategy, ReferenceWrite};
use super::value_typing::{describe, typed_value, untyped_value};
use crate::cypher_generator::Properties;
use crate::dsl_parser::ast::{AssignValue, Assignment, Literal};
use crate::graph_catalog::{
    FieldSchema, GraphSchemaError, RelationshipType, SchemaView, TYPES_PROPERTY,
};
use crate::store::value::{ElementId, Value};

/// Result of compiling an assignment list.
#[derive(Debug, Default)]
pub(crate) struct CompiledAssignments {
    pub properties: Properties,
    /// Edge-mapped reference fields, in assignment order.
    pub references: Vec<ReferenceUpdate>,
    /// Numeric ids that must be checked against their expected type before
    /// anything is written.
    pub verifications: Vec<Verification>,
}

/// Tracks assigned field names and rejects reserved or repeated ones.
struct FieldGuard<'a> {
    owner: &'a str,
    seen: HashSet<&'a str>,
}

impl<'a> FieldGuard<'a> {
    fn new(owner: &'a str) -> Self {
        FieldGuard {
            owner,
            seen: HashSet::new(),
        }
    }

    fn admit(&mut self, field: &'a str) -> Result<(), SemanticError> {
        if field == TYPES_PROPERTY {
            return Err(GraphSchemaError::ReservedField {
                owner: self.owner.to_string(),
                field: field.to_string(),
            }
            .into());
        }
        if !self.seen.insert(field) {
            return Err(SemanticError::DuplicateAssignment {
                field: field.to_string(),
            });
        }
        Ok(())
    }
}

/// Typed assignments to an instance of `entity_type`, checked against its
/// effective fields.
pub(crate) fn entity_assignments(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    strategy: &dyn ReferenceStrategy,
    entity_type: &str,
    assignments: &[Assignment<'_>],
) -> Result<CompiledAssignments, SemanticError> {
    let fields = schema.effective_fields(entity_type)?;
    let mut guard = FieldGuard::new(entity_type);
    let mut compiled = CompiledAssignments::default();

    for assignment in assignments {
        guard.admit(assignment.field)?;
        let field = fields
            .iter()
            .find(|field| field.name == assignment.field)
            .ok_or_else(|| SemanticError::UnknownField {
                owner: entity_type.to_string(),
                field: assignment.field.to_string(),
            })?;

        let Some(referenced) = field.field_type.referenced_entity() else {
            let value = typed_value(entity_type, field, &assignment.value)?;
            compiled.properties.push((field.name.clone(), value));
            continue;
        };

        let targets = reference_targets(
            schema,
            aliases,
            entity_type,
            field,
            referenced,
            &assignment.value,
            &mut compiled.verifications,
        )?;
        match strategy.write(schema, entity_type, field, targets)? {
            ReferenceWrite::Property(value) => compiled.properties.push((field.name.clone(), value)),
            ReferenceWrite::Edges { label, targets } => {
                compiled.references.push(ReferenceUpdate { label, targets })
            }
        }
    }
    Ok(compiled)
}

/// Edge properties for `relationship`. Reference-typed relationship fields
/// are stored as ids whatever the reference strategy is.
pub(crate) fn relationship_assignments(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    relationship: &RelationshipType,
    assignments: &[Assignment<'_>],
) -> Result<CompiledAssignments, SemanticError> {
    let mut guard = FieldGuard::new(&relationship.name);
    let mut compiled = CompiledAssignments::default();

    for assignment in assignments {
        guard.admit(assignment.field)?;
        let field = relationship
            .field(assignment.field)
            .ok_or_else(|| SemanticError::UnknownField {
                owner: relationship.name.clone(),
                field: assignment.field.to_string(),
            })?;

        let value = match field.field_type.referenced_entity() {
            None => typed_value(&relationship.name, field, &assignment.value)?,
            Some(referenced) => {
                let targets = reference_targets(
                    schema,
                    aliases,
                    &relationship.name,
                    field,
                    referenced,
                    &assignment.value,
                    &mut compiled.verifications,
                )?;
                if field.field_type.is_array() {
                    Value::List(targets.into_iter().map(Value::Int).collect())
                } else {
                    targets.first().copied().map(Value::Int).unwrap_or(Value::Null)
                }
            }
        };
        compiled.properties.push((field.name.clone(), value));
    }
    Ok(compiled)
}

/// Assignments to an element whose type is not known at compile time.
pub(crate) fn untyped_assignments(
    assignments: &[Assignment<'_>],
) -> Result<Properties, SemanticError> {
    let mut guard = FieldGuard::new("element");
    let mut properties = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        guard.admit(assignment.field)?;
        properties.push((
            assignment.field.to_string(),
            untyped_value(assignment.field, &assignment.value)?,
        ));
    }
    Ok(properties)
}

fn reference_targets(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    owner: &str,
    field: &FieldSchema,
    referenced: &str,
    value: &AssignValue<'_>,
    verifications: &mut Vec<Verification>,
) -> Result<Vec<ElementId>, SemanticError> {
    if schema.entity(referenced).is_none() {
        return Err(GraphSchemaError::UnknownFieldType {
            owner: owner.to_string(),
            field: field.name.clone(),
            type_name: referenced.to_string(),
        }
        .into());
    }

    let target = ReferenceTarget {
        schema,
        aliases,
        owner,
        field,
        referenced,
    };
    match value {
        AssignValue::Literal(Literal::Null) => Ok(Vec::new()),
        AssignValue::Array(items) if field.field_type.is_array() => items
            .iter()
            .map(|item| target.resolve(item, verifications))
            .collect(),
        _ if field.field_type.is_array() => Err(target.mismatch(value)),
        AssignValue::Array(_) => Err(target.mismatch(value)),
        _ => Ok(vec![target.resolve(value, verifications)?]),
    }
}

/// Resolution of single reference values for one field.
struct ReferenceTarget<'s> {
    schema: &'s dyn SchemaView,
    aliases: &'s AliasEnvironment,
    owner: &'s str,
    field: &'s FieldSchema,
    referenced: &'s str,
}

impl ReferenceTarget<'_> {
    fn mismatch(&self, value: &AssignValue<'_>) -> SemanticError {
        SemanticError::TypeMismatch {
            owner: self.owner.to_string(),
            field: self.field.name.clone(),
            expected: self.field.field_type.to_string(),
            found: describe(value),
        }
    }

    fn resolve(
        &self,
        value: &AssignValue<'_>,
        verifications: &mut Vec<Verification>,
    ) -> Result<ElementId, SemanticError> {
        match value {
            AssignValue::Reference(alias) => {
                let binding = self.aliases.resolve(alias)?;
                if !self.schema.is_a(&binding.entity_type, self.referenced) {
                    return Err(SemanticError::TypeMismatch {
                        owner: self.owner.to_string(),
                        field: self.field.name.clone(),
                        expected: self.referenced.to_string(),
                        found: format!("alias `{}` of type `{}`", alias, binding.entity_type),
                    });
                }
                Ok(binding.id)
            }
            // Numeric ids are checked once the store can be asked.
            AssignValue::Literal(Literal::Integer(id)) => {
                verifications.push(Verification {
                    id: *id,
                    expected_type: self.referenced.to_string(),
                    role: VerifyRole::Field {
                        owner: self.owner.to_string(),
                        field: self.field.name.clone(),
                    },
                });
                Ok(*id)
            }
            other => Err(self.mismatch(other)),
        }
    }
}
