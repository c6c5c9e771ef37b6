//! Graph store backends.
//!
//! The engine talks to a store only through `GraphStore` and
//! `GraphTransaction`. A transaction that is dropped without `commit`
//! leaves the store unchanged.

use async_trait::async_trait;

use crate::cypher_generator::GraphQuery;

#[cfg(feature = "age")]
pub mod age_client;
pub mod agtype;
pub mod errors;
pub mod memory_store;
pub mod value;

pub use errors::{classify_sqlstate, SqlStateClass, StoreError};
pub use memory_store::MemoryGraphStore;
pub use value::{EdgeValue, ElementId, NodeValue, Row, Value};

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Opens a transaction; every statement of a script runs inside one.
    async fn begin(&self) -> Result<Box<dyn GraphTransaction>, StoreError>;

    /// Short backend name for log lines.
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
pub trait GraphTransaction: Send {
    /// Executes one operation and returns its rows, labelled per the
    /// operation's documented columns.
    async fn run(&mut self, query: &GraphQuery) -> Result<Vec<Row>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
