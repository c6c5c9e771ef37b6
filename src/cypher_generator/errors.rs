use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CypherGeneratorError {
    #[error("`{0}` is not a valid Cypher identifier")]
    InvalidIdentifier(String),
    #[error("Float value {0} has no Cypher literal form")]
    NonFiniteFloat(f64),
    #[error("Graph elements cannot be written as property values")]
    ElementAsLiteral,
    #[error("Label maintenance is not a Cypher operation (handled by the backend catalog)")]
    NotACypherOperation,
}
