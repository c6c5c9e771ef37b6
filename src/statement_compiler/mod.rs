//! Translation of parsed statements into store plans.
//!
//! Each statement kind has its own translator. All of them read the script's
//! schema overlay and alias environment; only schema definitions write to the
//! overlay, and aliases are bound by the engine once an INSERT has run.

use log::debug;

use crate::dsl_parser::ast::Statement;
use crate::graph_catalog::SchemaOverlay;

pub mod alias_env;
mod assignments;
mod condition;
mod connect;
pub mod errors;
mod insert;
mod mutate;
pub mod plan;
mod query;
pub mod reference_strategy;
mod schema;
pub mod value_typing;

pub use alias_env::{AliasBinding, AliasEnvironment};
pub use errors::SemanticError;
pub use plan::{Outcome, PlanStep, StatementPlan};
pub use reference_strategy::{strategy_for, ReferenceStrategy};

/// Everything a statement is compiled against.
pub struct CompileContext<'c, 'r> {
    pub schema: &'c mut SchemaOverlay<'r>,
    pub aliases: &'c AliasEnvironment,
    pub strategy: &'c dyn ReferenceStrategy,
}

pub fn compile_statement(
    ctx: &mut CompileContext<'_, '_>,
    statement: &Statement<'_>,
) -> Result<StatementPlan, SemanticError> {
    let plan = match statement {
        Statement::EntityDef(def) => schema::compile_entity_def(ctx.schema, ctx.strategy, def)?,
        Statement::RelationshipDef(def) => schema::compile_relationship_def(ctx.schema, def)?,
        Statement::InsertEntity(insert) => {
            insert::compile_insert(&*ctx.schema, ctx.aliases, ctx.strategy, insert)?
        }
        Statement::ConnectRel(connect) => {
            connect::compile_connect(&*ctx.schema, ctx.aliases, connect)?
        }
        Statement::Update(update) => {
            mutate::compile_update(&*ctx.schema, ctx.aliases, ctx.strategy, update)?
        }
        Statement::Delete(delete) => mutate::compile_delete(&*ctx.schema, ctx.aliases, delete)?,
        Statement::Query(query) => query::compile_query(&*ctx.schema, query)?,
    };
    debug!(
        "Compiled {} into {} step(s)",
        statement.kind_name(),
        plan.steps.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceMode;
    use crate::cypher_generator::GraphQuery;
    use crate::dsl_parser::parse_program;
    use crate::graph_catalog::{GraphSchemaError, SchemaRegistry, SchemaView};

    #[test]
    fn test_definitions_are_staged_in_overlay() {
        let registry = SchemaRegistry::new();
        let mut overlay = SchemaOverlay::new(&registry);
        let aliases = AliasEnvironment::new();
        let strategy = strategy_for(ReferenceMode::EdgeMapped);
        let mut ctx = CompileContext {
            schema: &mut overlay,
            aliases: &aliases,
            strategy: strategy.as_ref(),
        };

        let program = parse_program(
            "ENTITY Employee { name: STRING, manager: Employee };
             ENTITY Manager { level: INT } EXTENDS Employee;
             ENTITY Employee { x: INT };",
        )
        .unwrap();
        let plan = compile_statement(&mut ctx, &program.statements[0]).unwrap();
        assert_eq!(
            plan.steps,
            vec![
                PlanStep::Ensure(GraphQuery::EnsureVertexLabel {
                    label: "Employee".to_string()
                }),
                PlanStep::Ensure(GraphQuery::EnsureEdgeLabel {
                    label: "manager".to_string()
                }),
            ]
        );
        compile_statement(&mut ctx, &program.statements[1]).unwrap();
        assert!(matches!(
            compile_statement(&mut ctx, &program.statements[2]),
            Err(SemanticError::Schema(GraphSchemaError::DuplicateEntity { .. }))
        ));

        assert!(overlay.is_a("Manager", "Employee"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scalar_strategy_adds_no_edge_labels() {
        let registry = SchemaRegistry::new();
        let mut overlay = SchemaOverlay::new(&registry);
        let aliases = AliasEnvironment::new();
        let strategy = strategy_for(ReferenceMode::ScalarId);
        let mut ctx = CompileContext {
            schema: &mut overlay,
            aliases: &aliases,
            strategy: strategy.as_ref(),
        };
        let program = parse_program("ENTITY Employee { manager: Employee };").unwrap();
        let plan = compile_statement(&mut ctx, &program.statements[0]).unwrap();
        assert_eq!(plan.steps.len(), 1);
    }
}
