pub mod errors;
pub mod graph_query;
pub mod to_cypher;

pub use errors::CypherGeneratorError;
pub use graph_query::{
    EdgeMatch, ElementRef, Filter, GraphQuery, LabelMatch, MatchQuery, NodeMatch, Projection,
    Properties,
};
pub use to_cypher::{CypherQuery, ToCypher};
