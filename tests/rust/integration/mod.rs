//! Integration tests - full scripts run through the engine
//!
//! Every test drives `Engine::execute` against the in-memory graph store, so
//! the parser, schema registry, statement compiler and executor work together
//! exactly as they do behind the command-line front-end.

mod common;
mod reference_strategy_tests;
mod repl_tests;
mod scenario_tests;
mod store_failure_tests;
mod transaction_tests;
