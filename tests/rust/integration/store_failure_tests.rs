//! Store-side failures surface with the right error kind and leave neither
//! graph data nor schema behind.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use complexgraph::config::EngineConfig;
use complexgraph::cypher_generator::GraphQuery;
use complexgraph::engine::{ComplexError, Engine, ErrorKind};
use complexgraph::graph_catalog::SchemaView;
use complexgraph::store::{GraphStore, GraphTransaction, MemoryGraphStore, Row, StoreError};

use super::common::{run, COMPANY_SCHEMA};

/// Failures to inject into transactions opened by `FaultyStore`.
#[derive(Clone, Default)]
struct Faults {
    /// SQLSTATE reported when a vertex is created.
    create_vertex: Option<&'static str>,
    /// SQLSTATE reported on commit.
    commit: Option<&'static str>,
}

/// Memory store whose transactions fail on demand and count rollbacks.
/// Faults are read when a transaction begins.
#[derive(Clone)]
struct FaultyStore {
    inner: MemoryGraphStore,
    faults: Arc<Mutex<Faults>>,
    rollbacks: Arc<AtomicUsize>,
}

impl FaultyStore {
    fn arm(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

struct FaultyTransaction {
    inner: Box<dyn GraphTransaction>,
    faults: Faults,
    rollbacks: Arc<AtomicUsize>,
}

#[async_trait]
impl GraphStore for FaultyStore {
    async fn begin(&self) -> Result<Box<dyn GraphTransaction>, StoreError> {
        Ok(Box::new(FaultyTransaction {
            inner: self.inner.begin().await?,
            faults: self.faults.lock().unwrap().clone(),
            rollbacks: self.rollbacks.clone(),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "faulty-memory"
    }
}

#[async_trait]
impl GraphTransaction for FaultyTransaction {
    async fn run(&mut self, query: &GraphQuery) -> Result<Vec<Row>, StoreError> {
        if let (GraphQuery::CreateVertex { .. }, Some(code)) = (query, self.faults.create_vertex) {
            return Err(StoreError::Query {
                message: "division by zero".to_string(),
                code: Some(code.to_string()),
            });
        }
        self.inner.run(query).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        if let Some(code) = self.faults.commit {
            return Err(StoreError::Connection {
                message: "server closed the connection unexpectedly".to_string(),
                code: Some(code.to_string()),
            });
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback().await
    }
}

/// Engine over a faulty store that already holds the company schema. The
/// returned store has no faults armed yet.
async fn faulty_engine() -> (Engine, FaultyStore) {
    let store = FaultyStore {
        inner: MemoryGraphStore::new(),
        faults: Arc::new(Mutex::new(Faults::default())),
        rollbacks: Arc::new(AtomicUsize::new(0)),
    };
    let engine = Engine::new(Arc::new(store.clone()), EngineConfig::default());
    run(&engine, COMPANY_SCHEMA).await;
    (engine, store)
}

const SCRIPT: &str = r#"
    ENTITY Temp { value: INT };
    INSERT Employee { name = "Ana" } AS ana;
"#;

#[tokio::test]
async fn test_query_failure_is_execution_error_and_rolls_back() {
    let (engine, store) = faulty_engine().await;
    let before = store.inner.stats().await;
    store.arm(Faults {
        create_vertex: Some("22012"),
        ..Faults::default()
    });

    let err = engine.execute(SCRIPT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    match &err {
        ComplexError::Execution {
            code, location, ..
        } => {
            assert_eq!(code.as_deref(), Some("22012"));
            let location = location.expect("execution errors carry a location");
            assert_eq!(location.index, 1);
            assert_eq!(location.position.line, 3);
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert_eq!(store.rollbacks(), 1);
    assert_eq!(store.inner.stats().await, before);
    assert!(engine.schema().await.entity("Temp").is_none());
    assert!(engine.schema().await.entity("Employee").is_some());
}

#[tokio::test]
async fn test_commit_failure_is_connection_error_and_schema_is_not_merged() {
    let (engine, store) = faulty_engine().await;
    let before = store.inner.stats().await;
    store.arm(Faults {
        commit: Some("08006"),
        ..Faults::default()
    });

    let err = engine.execute(SCRIPT).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    match &err {
        ComplexError::Connection { code, .. } => assert_eq!(code.as_deref(), Some("08006")),
        other => panic!("unexpected error {:?}", other),
    }

    assert_eq!(store.rollbacks(), 0);
    assert_eq!(store.inner.stats().await, before);
    assert!(engine.schema().await.entity("Temp").is_none());
}

#[tokio::test]
async fn test_engine_recovers_after_store_failure() {
    let (engine, store) = faulty_engine().await;
    store.arm(Faults {
        create_vertex: Some("22012"),
        ..Faults::default()
    });
    assert!(engine.execute(SCRIPT).await.is_err());

    store.arm(Faults::default());
    let results = run(&engine, SCRIPT).await;
    assert_eq!(results.len(), 2);
    assert!(engine.schema().await.entity("Temp").is_some());
    assert_eq!(store.rollbacks(), 1);
}
