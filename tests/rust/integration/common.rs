use std::sync::Arc;

use complexgraph::config::{EngineConfig, ReferenceMode};
use complexgraph::engine::{Engine, StatementResult};
use complexgraph::store::{MemoryGraphStore, Value};

pub const COMPANY_SCHEMA: &str = r#"
    ENTITY Employee { name: STRING, department: STRING, manager: Employee, reports: Employee[] };
    ENTITY Document { title: STRING, sections: STRING[] };
    ENTITY Epic { name: STRING, parent: Epic[], specification: Document };
"#;

/// Engine over a fresh in-memory graph; the store handle stays usable for
/// assertions on raw element counts.
pub fn engine_with(mode: ReferenceMode) -> (Engine, MemoryGraphStore) {
    let store = MemoryGraphStore::new();
    let config = EngineConfig {
        reference_mode: mode,
        ..EngineConfig::default()
    };
    let engine = Engine::new(Arc::new(store.clone()), config);
    (engine, store)
}

pub fn engine() -> (Engine, MemoryGraphStore) {
    engine_with(ReferenceMode::EdgeMapped)
}

/// Runs a script that must succeed.
pub async fn run(engine: &Engine, script: &str) -> Vec<StatementResult> {
    match engine.execute(script).await {
        Ok(results) => results,
        Err(e) => panic!("script failed: {}\n{}", e, script),
    }
}

/// Runs a single query and returns the string values of `column`.
pub async fn strings(engine: &Engine, query: &str, column: &str) -> Vec<String> {
    let results = run(engine, query).await;
    let rows = results
        .last()
        .and_then(StatementResult::rows)
        .expect("query returns rows");
    rows.column(column)
        .into_iter()
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => panic!("expected a string in {}, got {:?}", column, other),
        })
        .collect()
}

pub fn inserted_id(result: &StatementResult) -> i64 {
    match result {
        StatementResult::Inserted { id, .. } => *id,
        other => panic!("expected an insert result, got {:?}", other),
    }
}
