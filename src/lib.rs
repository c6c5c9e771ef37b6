//! ComplexGraph - schema and data DSL over Apache AGE
//!
//! This crate compiles scripts of entity/relationship definitions, data
//! mutations and pattern queries into graph store operations through:
//! - A nom-based DSL parser
//! - An inheritance-aware schema registry
//! - A statement compiler with pluggable reference strategies
//! - A transactional execution engine over AGE or an in-memory graph

pub mod config;
pub mod cypher_generator;
pub mod dsl_parser;
pub mod engine;
pub mod graph_catalog;
pub mod repl;
pub mod statement_compiler;
pub mod store;
