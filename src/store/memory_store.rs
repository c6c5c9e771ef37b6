//! In-process graph store.
//!
//! Holds vertices and edges in ordered maps behind a single async mutex. A
//! transaction owns the lock for its whole lifetime and works on a private
//! copy of the graph, which replaces the shared state on commit. Dropping or
//! rolling back the transaction discards the copy.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::errors::StoreError;
use super::value::{EdgeValue, ElementId, NodeValue, Row, Value};
use super::{GraphStore, GraphTransaction};
use crate::cypher_generator::{
    EdgeMatch, ElementRef, Filter, GraphQuery, LabelMatch, MatchQuery, NodeMatch, Projection,
    Properties,
};
use crate::dsl_parser::ast::Direction;
use crate::graph_catalog::TYPES_PROPERTY;

#[derive(Debug, Clone)]
struct StoredVertex {
    label: String,
    properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
struct StoredEdge {
    label: String,
    source: ElementId,
    target: ElementId,
    properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default)]
struct GraphData {
    vertices: BTreeMap<ElementId, StoredVertex>,
    edges: BTreeMap<ElementId, StoredEdge>,
    vertex_labels: BTreeSet<String>,
    edge_labels: BTreeSet<String>,
    last_id: ElementId,
}

/// Element counts, mainly for assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphStats {
    pub vertices: usize,
    pub edges: usize,
    pub vertex_labels: usize,
    pub edge_labels: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryGraphStore {
    data: Arc<Mutex<GraphData>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stats(&self) -> GraphStats {
        let data = self.data.lock().await;
        GraphStats {
            vertices: data.vertices.len(),
            edges: data.edges.len(),
            vertex_labels: data.vertex_labels.len(),
            edge_labels: data.edge_labels.len(),
        }
    }

    /// Number of edges carrying `label`.
    pub async fn count_edges(&self, label: &str) -> usize {
        let data = self.data.lock().await;
        data.edges.values().filter(|edge| edge.label == label).count()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn begin(&self) -> Result<Box<dyn GraphTransaction>, StoreError> {
        let guard = self.data.clone().lock_owned().await;
        let working = guard.clone();
        debug!("memory store: transaction started");
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<GraphData>,
    working: GraphData,
}

#[async_trait]
impl GraphTransaction for MemoryTransaction {
    async fn run(&mut self, query: &GraphQuery) -> Result<Vec<Row>, StoreError> {
        self.working.apply(query)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        debug!("memory store: transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        debug!("memory store: transaction rolled back");
        Ok(())
    }
}

fn id_row(id: ElementId) -> Row {
    Row::new(vec![("id".to_string(), Value::Int(id))])
}

fn apply_properties(target: &mut BTreeMap<String, Value>, properties: &Properties) {
    for (key, value) in properties {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn property_map(properties: &Properties) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    apply_properties(&mut map, properties);
    map
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    Vertex(ElementId),
    Edge(ElementId),
}

#[derive(Debug, Clone, Default)]
struct Binding {
    variables: HashMap<String, Bound>,
    used_edges: Vec<ElementId>,
}

impl GraphData {
    fn next_id(&mut self) -> ElementId {
        self.last_id += 1;
        self.last_id
    }

    fn apply(&mut self, query: &GraphQuery) -> Result<Vec<Row>, StoreError> {
        match query {
            GraphQuery::EnsureVertexLabel { label } => {
                self.vertex_labels.insert(label.clone());
                Ok(Vec::new())
            }
            GraphQuery::EnsureEdgeLabel { label } => {
                self.edge_labels.insert(label.clone());
                Ok(Vec::new())
            }
            GraphQuery::CreateVertex { label, properties } => {
                let id = self.next_id();
                self.vertex_labels.insert(label.clone());
                self.vertices.insert(
                    id,
                    StoredVertex {
                        label: label.clone(),
                        properties: property_map(properties),
                    },
                );
                Ok(vec![id_row(id)])
            }
            GraphQuery::CreateEdge {
                source,
                target,
                label,
                properties,
            } => {
                if !self.vertices.contains_key(source) || !self.vertices.contains_key(target) {
                    return Ok(Vec::new());
                }
                let id = self.next_id();
                self.edge_labels.insert(label.clone());
                self.edges.insert(
                    id,
                    StoredEdge {
                        label: label.clone(),
                        source: *source,
                        target: *target,
                        properties: property_map(properties),
                    },
                );
                Ok(vec![id_row(id)])
            }
            GraphQuery::LookupVertex { id } => Ok(self
                .vertices
                .get(id)
                .map(|vertex| {
                    vec![Row::new(vec![
                        ("label".to_string(), Value::String(vertex.label.clone())),
                        (
                            "types".to_string(),
                            vertex
                                .properties
                                .get(TYPES_PROPERTY)
                                .cloned()
                                .unwrap_or(Value::Null),
                        ),
                    ])]
                })
                .unwrap_or_default()),
            GraphQuery::SetProperties {
                element,
                properties,
            } => {
                let target = match element {
                    ElementRef::Vertex(id) => {
                        self.vertices.get_mut(id).map(|vertex| &mut vertex.properties)
                    }
                    ElementRef::Edge(id) => self.edges.get_mut(id).map(|edge| &mut edge.properties),
                };
                match target {
                    Some(target) => {
                        apply_properties(target, properties);
                        Ok(vec![id_row(element.id())])
                    }
                    None => Ok(Vec::new()),
                }
            }
            GraphQuery::DeleteElement { element } => match element {
                ElementRef::Vertex(id) => {
                    if self.vertices.remove(id).is_none() {
                        return Ok(Vec::new());
                    }
                    self.edges
                        .retain(|_, edge| edge.source != *id && edge.target != *id);
                    Ok(vec![id_row(*id)])
                }
                ElementRef::Edge(id) => Ok(self
                    .edges
                    .remove(id)
                    .map(|_| vec![id_row(*id)])
                    .unwrap_or_default()),
            },
            GraphQuery::DeleteOutgoing { source, label } => {
                let doomed: Vec<ElementId> = self
                    .edges
                    .iter()
                    .filter(|(_, edge)| edge.source == *source && &edge.label == label)
                    .map(|(id, _)| *id)
                    .collect();
                for id in &doomed {
                    self.edges.remove(id);
                }
                Ok(doomed.into_iter().map(id_row).collect())
            }
            GraphQuery::Match(query) => self.run_match(query),
        }
    }

    fn vertex_matches(&self, id: ElementId, node: &NodeMatch) -> bool {
        let Some(vertex) = self.vertices.get(&id) else {
            return false;
        };
        match &node.label {
            None => true,
            Some(LabelMatch::Exact(label)) => &vertex.label == label,
            Some(LabelMatch::Family(type_name)) => vertex
                .properties
                .get(TYPES_PROPERTY)
                .and_then(Value::as_list)
                .is_some_and(|types| types.iter().any(|t| t.as_str() == Some(type_name.as_str()))),
        }
    }

    fn bind_node(&self, binding: &Binding, node: &NodeMatch, id: ElementId) -> Option<Binding> {
        if !self.vertex_matches(id, node) {
            return None;
        }
        match binding.variables.get(&node.variable) {
            Some(Bound::Vertex(existing)) if *existing == id => Some(binding.clone()),
            Some(_) => None,
            None => {
                let mut extended = binding.clone();
                extended
                    .variables
                    .insert(node.variable.clone(), Bound::Vertex(id));
                Some(extended)
            }
        }
    }

    /// Candidate (edge, next vertex) pairs leaving `from` along `edge`.
    fn expand(&self, from: ElementId, edge: &EdgeMatch) -> Vec<(ElementId, ElementId)> {
        self.edges
            .iter()
            .filter(|(_, stored)| edge.label.as_ref().is_none_or(|label| &stored.label == label))
            .flat_map(|(id, stored)| {
                let mut steps = Vec::with_capacity(2);
                let outgoing = stored.source == from;
                let incoming = stored.target == from;
                match edge.direction {
                    Direction::Outgoing if outgoing => steps.push((*id, stored.target)),
                    Direction::Incoming if incoming => steps.push((*id, stored.source)),
                    Direction::Either => {
                        if outgoing {
                            steps.push((*id, stored.target));
                        }
                        if incoming && stored.source != stored.target {
                            steps.push((*id, stored.source));
                        }
                    }
                    _ => {}
                }
                steps
            })
            .collect()
    }

    fn run_match(&self, query: &MatchQuery) -> Result<Vec<Row>, StoreError> {
        let mut bindings: Vec<(Binding, ElementId)> = self
            .vertices
            .keys()
            .filter_map(|id| {
                self.bind_node(&Binding::default(), &query.start, *id)
                    .map(|binding| (binding, *id))
            })
            .collect();

        for (edge, node) in &query.hops {
            let mut next = Vec::new();
            for (binding, current) in &bindings {
                for (edge_id, vertex_id) in self.expand(*current, edge) {
                    if binding.used_edges.contains(&edge_id) {
                        continue;
                    }
                    let mut with_edge = binding.clone();
                    match with_edge.variables.get(&edge.variable) {
                        Some(Bound::Edge(existing)) if *existing == edge_id => {}
                        Some(_) => continue,
                        None => {
                            with_edge
                                .variables
                                .insert(edge.variable.clone(), Bound::Edge(edge_id));
                        }
                    }
                    with_edge.used_edges.push(edge_id);
                    if let Some(extended) = self.bind_node(&with_edge, node, vertex_id) {
                        next.push((extended, vertex_id));
                    }
                }
            }
            bindings = next;
        }

        let mut rows = Vec::new();
        for (binding, _) in bindings {
            if let Some(filter) = &query.filter {
                if !self.eval_filter(filter, &binding) {
                    continue;
                }
            }
            rows.push(self.project(&query.projections, &binding)?);
        }
        Ok(rows)
    }

    fn property_of(&self, bound: Bound, property: &str) -> Value {
        let properties = match bound {
            Bound::Vertex(id) => self.vertices.get(&id).map(|v| &v.properties),
            Bound::Edge(id) => self.edges.get(&id).map(|e| &e.properties),
        };
        properties
            .and_then(|props| props.get(property))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn eval_filter(&self, filter: &Filter, binding: &Binding) -> bool {
        match filter {
            Filter::Equals {
                variable,
                property,
                value,
            } => {
                let Some(bound) = binding.variables.get(variable) else {
                    return false;
                };
                let actual = self.property_of(*bound, property);
                actual.equals(value)
            }
            Filter::And(left, right) => {
                self.eval_filter(left, binding) && self.eval_filter(right, binding)
            }
            Filter::Or(left, right) => {
                self.eval_filter(left, binding) || self.eval_filter(right, binding)
            }
        }
    }

    fn element_value(&self, bound: Bound) -> Result<Value, StoreError> {
        match bound {
            Bound::Vertex(id) => {
                let vertex = self
                    .vertices
                    .get(&id)
                    .ok_or_else(|| StoreError::Decode(format!("vertex {} vanished", id)))?;
                Ok(Value::Node(NodeValue {
                    id,
                    label: vertex.label.clone(),
                    properties: vertex.properties.clone(),
                }))
            }
            Bound::Edge(id) => {
                let edge = self
                    .edges
                    .get(&id)
                    .ok_or_else(|| StoreError::Decode(format!("edge {} vanished", id)))?;
                Ok(Value::Edge(EdgeValue {
                    id,
                    label: edge.label.clone(),
                    start_id: edge.source,
                    end_id: edge.target,
                    properties: edge.properties.clone(),
                }))
            }
        }
    }

    fn project(&self, projections: &[Projection], binding: &Binding) -> Result<Row, StoreError> {
        let mut columns = Vec::with_capacity(projections.len());
        for projection in projections {
            let lookup = |variable: &str| {
                binding.variables.get(variable).copied().ok_or_else(|| {
                    StoreError::query(format!("variable `{}` is not defined", variable))
                })
            };
            let value = match projection {
                Projection::Element { variable, .. } => self.element_value(lookup(variable)?)?,
                Projection::Property {
                    variable, property, ..
                } => self.property_of(lookup(variable)?, property),
                Projection::Id { variable, .. } => match lookup(variable)? {
                    Bound::Vertex(id) | Bound::Edge(id) => Value::Int(id),
                },
            };
            columns.push((projection.label().to_string(), value));
        }
        Ok(Row::new(columns))
    }
}
