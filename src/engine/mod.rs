//! Script execution.
//!
//! `Engine::execute` runs a whole script in one store transaction. Schema
//! definitions made by the script go to an overlay over a snapshot of the
//! shared registry and are merged only after the transaction commits, so a
//! failed script leaves neither store nor schema changes behind.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::RwLock;

use crate::config::{EngineConfig, ReferenceMode};
use crate::dsl_parser::ast::Statement;
use crate::dsl_parser::parse_program;
use crate::graph_catalog::{SchemaOverlay, SchemaRegistry};
use crate::statement_compiler::plan::{Outcome, StatementPlan};
use crate::statement_compiler::{
    compile_statement, strategy_for, AliasBinding, AliasEnvironment, CompileContext,
    ReferenceStrategy, SemanticError,
};
use crate::store::{GraphStore, GraphTransaction};

pub mod errors;
mod executor;
pub mod results;

pub use errors::{ComplexError, ErrorKind, StatementLocation};
pub use results::{RowSet, StatementResult};

use executor::{PlanExecutor, PlanOutput, StepError};

pub struct Engine {
    store: Arc<dyn GraphStore>,
    registry: RwLock<SchemaRegistry>,
    strategy: Box<dyn ReferenceStrategy>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(store: Arc<dyn GraphStore>, config: EngineConfig) -> Self {
        info!(
            "Engine on {} store, graph `{}`, {:?} references",
            store.backend_name(),
            config.graph_name,
            config.reference_mode
        );
        Engine {
            store,
            registry: RwLock::new(SchemaRegistry::new()),
            strategy: strategy_for(config.reference_mode),
            config,
        }
    }

    pub fn reference_mode(&self) -> ReferenceMode {
        self.strategy.mode()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the committed schema.
    pub async fn schema(&self) -> SchemaRegistry {
        self.registry.read().await.clone()
    }

    /// Parses and runs `script`, returning one result per statement. Either
    /// every statement takes effect or none does.
    pub async fn execute(&self, script: &str) -> Result<Vec<StatementResult>, ComplexError> {
        let program = parse_program(script)?;
        if program.statements.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.registry.read().await.clone();
        let mut overlay = SchemaOverlay::new(&snapshot);
        let mut aliases = AliasEnvironment::new();
        let mut tx = self.store.begin().await.map_err(ComplexError::connection)?;

        let mut results = Vec::with_capacity(program.statements.len());
        for (index, (statement, position)) in program
            .statements
            .iter()
            .zip(program.positions.iter())
            .enumerate()
        {
            let location = StatementLocation {
                index,
                position: *position,
            };
            match self
                .run_statement(tx.as_mut(), &mut overlay, &mut aliases, statement, location)
                .await
            {
                Ok(result) => results.push(result),
                Err(err) => {
                    warn!("Statement {} failed, rolling back script: {}", index + 1, err);
                    rollback(tx).await;
                    return Err(err);
                }
            }
        }

        let pending = overlay.into_pending();
        let mut registry = self.registry.write().await;
        if let Err(err) = registry.check_merge(&pending) {
            warn!("Schema changed concurrently, rolling back script: {}", err);
            rollback(tx).await;
            let location = StatementLocation {
                index: 0,
                position: program.positions.first().copied().unwrap_or_default(),
            };
            return Err(ComplexError::semantic(err.into(), location));
        }
        tx.commit().await.map_err(ComplexError::connection)?;
        registry
            .merge(pending)
            .map_err(|err| ComplexError::Execution {
                message: err.to_string(),
                code: None,
                location: None,
            })?;

        info!(
            "Committed script: {} statement(s), {} alias(es)",
            results.len(),
            aliases.len()
        );
        Ok(results)
    }

    async fn run_statement(
        &self,
        tx: &mut dyn GraphTransaction,
        overlay: &mut SchemaOverlay<'_>,
        aliases: &mut AliasEnvironment,
        statement: &Statement<'_>,
        location: StatementLocation,
    ) -> Result<StatementResult, ComplexError> {
        let plan: StatementPlan = {
            let mut ctx = CompileContext {
                schema: &mut *overlay,
                aliases: &*aliases,
                strategy: self.strategy.as_ref(),
            };
            compile_statement(&mut ctx, statement)
                .map_err(|err| ComplexError::semantic(err, location))?
        };

        let output = PlanExecutor::new(tx)
            .execute(&plan)
            .await
            .map_err(|err| match err {
                StepError::Semantic(source) => ComplexError::semantic(source, location),
                StepError::Store(source) => ComplexError::from_store(source, location),
            })?;

        shape_result(plan.outcome, output, aliases)
            .map_err(|err| ComplexError::semantic(err, location))
    }
}

fn shape_result(
    outcome: Outcome,
    output: PlanOutput,
    aliases: &mut AliasEnvironment,
) -> Result<StatementResult, SemanticError> {
    Ok(match outcome {
        Outcome::Acknowledged => StatementResult::Acknowledged,
        Outcome::Affected => StatementResult::Affected {
            count: output.affected,
        },
        Outcome::Rows { columns } => StatementResult::Rows(RowSet {
            columns,
            rows: output.rows,
        }),
        Outcome::Inserted { alias, entity_type } => {
            let id = output.created.unwrap_or_default();
            if let Some(alias) = &alias {
                debug!("Bound alias {} to {} {}", alias, entity_type, id);
                aliases.bind(alias, AliasBinding { id, entity_type })?;
            }
            StatementResult::Inserted { alias, id }
        }
    })
}

async fn rollback(tx: Box<dyn GraphTransaction>) {
    if let Err(err) = tx.rollback().await {
        warn!("Rollback failed: {}", err);
    }
}
