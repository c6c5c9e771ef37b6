//! CONNECT statements.

use super::alias_env::AliasEnvironment;
use super::assignments::relationship_assignments;
use super::errors::SemanticError;
use super::plan::{Endpoint, Link, Outcome, PlanStep, StatementPlan, Verification, VerifyRole};
use crate::dsl_parser::ast::{AliasOrId, ConnectRel};
use crate::graph_catalog::SchemaView;
use crate::store::value::ElementId;

fn endpoint(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    relationship: &str,
    role: &'static str,
    expected: &str,
    reference: AliasOrId<'_>,
    verifications: &mut Vec<Verification>,
) -> Result<ElementId, SemanticError> {
    match reference {
        AliasOrId::Alias(alias) => {
            let binding = aliases.resolve(alias)?;
            if !schema.is_a(&binding.entity_type, expected) {
                return Err(SemanticError::EndpointMismatch {
                    relationship: relationship.to_string(),
                    role,
                    expected: expected.to_string(),
                    found: binding.entity_type.clone(),
                });
            }
            Ok(binding.id)
        }
        AliasOrId::Id(id) => {
            verifications.push(Verification {
                id,
                expected_type: expected.to_string(),
                role: VerifyRole::Endpoint {
                    relationship: relationship.to_string(),
                    role,
                },
            });
            Ok(id)
        }
    }
}

pub(crate) fn compile_connect(
    schema: &dyn SchemaView,
    aliases: &AliasEnvironment,
    connect: &ConnectRel<'_>,
) -> Result<StatementPlan, SemanticError> {
    let relationship = schema.resolve_relationship(connect.relationship)?;
    // Endpoint types are only required to exist once the relationship is used.
    let source_type = schema.resolve_entity(&relationship.source)?.name.clone();
    let target_type = schema.resolve_entity(&relationship.target)?.name.clone();

    let mut verifications = Vec::new();
    let source = endpoint(
        schema,
        aliases,
        &relationship.name,
        "source",
        &source_type,
        connect.source,
        &mut verifications,
    )?;
    let target = endpoint(
        schema,
        aliases,
        &relationship.name,
        "target",
        &target_type,
        connect.target,
        &mut verifications,
    )?;

    let compiled = relationship_assignments(schema, aliases, relationship, &connect.properties)?;
    verifications.extend(compiled.verifications);

    let mut steps: Vec<PlanStep> = verifications.into_iter().map(PlanStep::Verify).collect();
    steps.push(PlanStep::Link(Link {
        source: Endpoint::Known(source),
        target: Endpoint::Known(target),
        label: relationship.name.clone(),
        properties: compiled
            .properties
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect(),
    }));

    Ok(StatementPlan {
        steps,
        outcome: Outcome::Acknowledged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl_parser::ast::Statement;
    use crate::dsl_parser::parse_program;
    use crate::graph_catalog::{EntityType, GraphSchemaError, RelationshipType, SchemaRegistry};
    use crate::statement_compiler::alias_env::AliasBinding;
    use crate::store::value::Value;

    fn schema() -> SchemaRegistry {
        let program = parse_program(
            "ENTITY Document { title: STRING };
             ENTITY Epic { name: STRING };
             RELATIONSHIP IN_DOCUMENT (Epic 1 -> Document *) { page_number: INT };
             RELATIONSHIP DANGLING (Epic -> Nowhere);",
        )
        .unwrap();
        let mut registry = SchemaRegistry::new();
        for statement in &program.statements {
            match statement {
                Statement::EntityDef(def) => registry
                    .define_entity(EntityType::from_def(def).unwrap())
                    .unwrap(),
                Statement::RelationshipDef(def) => registry
                    .define_relationship(RelationshipType::from_def(def).unwrap())
                    .unwrap(),
                _ => {}
            }
        }
        registry
    }

    fn compile(source: &str) -> Result<StatementPlan, SemanticError> {
        let mut aliases = AliasEnvironment::new();
        for (alias, id, entity_type) in [("epic", 1, "Epic"), ("doc", 2, "Document")] {
            aliases
                .bind(
                    alias,
                    AliasBinding {
                        id,
                        entity_type: entity_type.to_string(),
                    },
                )
                .unwrap();
        }
        let program = parse_program(source).unwrap();
        match &program.statements[0] {
            Statement::ConnectRel(connect) => compile_connect(&schema(), &aliases, connect),
            other => panic!("expected connect, got {:?}", other),
        }
    }

    #[test]
    fn test_connect_with_edge_property() {
        let plan = compile("CONNECT epic - IN_DOCUMENT -> doc { page_number = 42 };").unwrap();
        assert_eq!(
            plan.steps,
            vec![PlanStep::Link(Link {
                source: Endpoint::Known(1),
                target: Endpoint::Known(2),
                label: "IN_DOCUMENT".to_string(),
                properties: vec![("page_number".to_string(), Value::Int(42))],
            })]
        );
        assert_eq!(plan.outcome, Outcome::Acknowledged);
    }

    #[test]
    fn test_numeric_endpoints_are_verified() {
        let plan = compile("CONNECT 10 - IN_DOCUMENT -> doc;").unwrap();
        assert!(matches!(
            &plan.steps[0],
            PlanStep::Verify(Verification { id: 10, .. })
        ));
    }

    #[test]
    fn test_connect_failures() {
        assert!(matches!(
            compile("CONNECT doc - IN_DOCUMENT -> epic;"),
            Err(SemanticError::EndpointMismatch { role: "source", .. })
        ));
        assert!(matches!(
            compile("CONNECT epic - CITES -> doc;"),
            Err(SemanticError::Schema(GraphSchemaError::UnknownRelationship { .. }))
        ));
        assert!(matches!(
            compile("CONNECT epic - DANGLING -> doc;"),
            Err(SemanticError::Schema(GraphSchemaError::UnknownEntity { .. }))
        ));
        assert!(matches!(
            compile(r#"CONNECT epic - IN_DOCUMENT -> doc { page_number = "x" };"#),
            Err(SemanticError::TypeMismatch { .. })
        ));
    }
}
