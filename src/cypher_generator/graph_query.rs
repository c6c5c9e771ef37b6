//! Backend-neutral graph operations produced by the statement compiler.
//!
//! Every store backend executes `GraphQuery` values: the AGE backend renders
//! them to Cypher, the in-memory backend interprets them directly.

use crate::dsl_parser::ast::{Direction, LogicalOperator};
use crate::store::value::{ElementId, Value};

/// Ordered property assignments.
pub type Properties = Vec<(String, Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef {
    Vertex(ElementId),
    Edge(ElementId),
}

impl ElementRef {
    pub fn id(&self) -> ElementId {
        match self {
            ElementRef::Vertex(id) | ElementRef::Edge(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphQuery {
    /// Makes sure the vertex label exists in the store's catalog.
    EnsureVertexLabel { label: String },
    EnsureEdgeLabel { label: String },
    /// Yields one row with column `id`.
    CreateVertex { label: String, properties: Properties },
    /// Yields one row with column `id`, or no rows when either endpoint does
    /// not exist.
    CreateEdge {
        source: ElementId,
        target: ElementId,
        label: String,
        properties: Properties,
    },
    /// Yields `label` and `types` for an existing vertex, nothing otherwise.
    LookupVertex { id: ElementId },
    /// Yields one `id` row per updated element.
    SetProperties {
        element: ElementRef,
        properties: Properties,
    },
    /// Yields one `id` row per deleted element. Deleting a vertex also
    /// removes its incident edges.
    DeleteElement { element: ElementRef },
    /// Removes all outgoing edges with `label` from `source`; yields one
    /// `id` row per removed edge.
    DeleteOutgoing { source: ElementId, label: String },
    Match(MatchQuery),
}

/// Label constraint on a node pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMatch {
    /// Vertex label equals the type; used when the type has no subtypes.
    Exact(String),
    /// The vertex's type list contains the type; matches subtypes as well.
    Family(String),
}

impl LabelMatch {
    pub fn type_name(&self) -> &str {
        match self {
            LabelMatch::Exact(name) | LabelMatch::Family(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMatch {
    pub variable: String,
    pub label: Option<LabelMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMatch {
    pub variable: String,
    pub label: Option<String>,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals {
        variable: String,
        property: String,
        value: Value,
    },
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn equals(variable: impl Into<String>, property: impl Into<String>, value: Value) -> Self {
        Filter::Equals {
            variable: variable.into(),
            property: property.into(),
            value,
        }
    }

    pub fn combine(self, operator: LogicalOperator, other: Filter) -> Filter {
        match operator {
            LogicalOperator::And => Filter::And(Box::new(self), Box::new(other)),
            LogicalOperator::Or => Filter::Or(Box::new(self), Box::new(other)),
        }
    }

    /// Conjunction of all filters, or `None` if there are none.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        filters
            .into_iter()
            .reduce(|acc, next| acc.combine(LogicalOperator::And, next))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Element { variable: String, label: String },
    Property {
        variable: String,
        property: String,
        label: String,
    },
    Id { variable: String, label: String },
}

impl Projection {
    pub fn label(&self) -> &str {
        match self {
            Projection::Element { label, .. }
            | Projection::Property { label, .. }
            | Projection::Id { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub start: NodeMatch,
    pub hops: Vec<(EdgeMatch, NodeMatch)>,
    pub filter: Option<Filter>,
    pub projections: Vec<Projection>,
}

impl MatchQuery {
    pub fn nodes(&self) -> impl Iterator<Item = &NodeMatch> {
        std::iter::once(&self.start).chain(self.hops.iter().map(|(_, node)| node))
    }
}
