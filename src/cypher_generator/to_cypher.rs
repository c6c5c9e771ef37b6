use super::errors::CypherGeneratorError;
use super::graph_query::{
    EdgeMatch, ElementRef, Filter, GraphQuery, LabelMatch, MatchQuery, NodeMatch, Projection,
    Properties,
};
use crate::dsl_parser::ast::Direction;
use crate::graph_catalog::TYPES_PROPERTY;
use crate::store::value::Value;

/// Cypher text plus the names of the columns it returns, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    pub text: String,
    pub columns: Vec<String>,
}

/// Convert a graph operation or one of its parts to Cypher text.
pub trait ToCypher {
    fn to_cypher(&self) -> Result<String, CypherGeneratorError>;
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn identifier(name: &str) -> Result<&str, CypherGeneratorError> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(CypherGeneratorError::InvalidIdentifier(name.to_string()))
    }
}

fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

impl ToCypher for Value {
    fn to_cypher(&self) -> Result<String, CypherGeneratorError> {
        match self {
            Value::Null => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) if !f.is_finite() => Err(CypherGeneratorError::NonFiniteFloat(*f)),
            Value::Float(f) if f.fract() == 0.0 => Ok(format!("{:.1}", f)),
            Value::Float(f) => Ok(f.to_string()),
            Value::String(s) => Ok(quote_string(s)),
            Value::List(items) => {
                let rendered = items
                    .iter()
                    .map(ToCypher::to_cypher)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", rendered.join(", ")))
            }
            Value::Map(entries) => {
                let rendered = entries
                    .iter()
                    .map(|(key, value)| Ok(format!("{}: {}", identifier(key)?, value.to_cypher()?)))
                    .collect::<Result<Vec<_>, CypherGeneratorError>>()?;
                Ok(format!("{{{}}}", rendered.join(", ")))
            }
            Value::Node(_) | Value::Edge(_) => Err(CypherGeneratorError::ElementAsLiteral),
        }
    }
}

fn property_map(properties: &Properties) -> Result<String, CypherGeneratorError> {
    if properties.is_empty() {
        return Ok(String::new());
    }
    let rendered = properties
        .iter()
        .map(|(key, value)| Ok(format!("{}: {}", identifier(key)?, value.to_cypher()?)))
        .collect::<Result<Vec<_>, CypherGeneratorError>>()?;
    Ok(format!(" {{{}}}", rendered.join(", ")))
}

fn set_clause(variable: &str, properties: &Properties) -> Result<String, CypherGeneratorError> {
    let rendered = properties
        .iter()
        .map(|(key, value)| {
            Ok(format!(
                "{}.{} = {}",
                variable,
                identifier(key)?,
                value.to_cypher()?
            ))
        })
        .collect::<Result<Vec<_>, CypherGeneratorError>>()?;
    Ok(rendered.join(", "))
}

fn element_match(element: &ElementRef) -> String {
    match element {
        ElementRef::Vertex(id) => format!("MATCH (n) WHERE id(n) = {}", id),
        ElementRef::Edge(id) => format!("MATCH ()-[n]->() WHERE id(n) = {}", id),
    }
}

impl ToCypher for NodeMatch {
    fn to_cypher(&self) -> Result<String, CypherGeneratorError> {
        let variable = identifier(&self.variable)?;
        match &self.label {
            Some(LabelMatch::Exact(label)) => Ok(format!("({}:{})", variable, identifier(label)?)),
            _ => Ok(format!("({})", variable)),
        }
    }
}

impl ToCypher for EdgeMatch {
    fn to_cypher(&self) -> Result<String, CypherGeneratorError> {
        let body = match &self.label {
            Some(label) => format!("{}:{}", identifier(&self.variable)?, identifier(label)?),
            None => identifier(&self.variable)?.to_string(),
        };
        Ok(match self.direction {
            Direction::Outgoing => format!("-[{}]->", body),
            Direction::Incoming => format!("<-[{}]-", body),
            Direction::Either => format!("-[{}]-", body),
        })
    }
}

impl ToCypher for Filter {
    fn to_cypher(&self) -> Result<String, CypherGeneratorError> {
        match self {
            Filter::Equals {
                variable,
                property,
                value,
            } => Ok(format!(
                "{}.{} = {}",
                identifier(variable)?,
                identifier(property)?,
                value.to_cypher()?
            )),
            Filter::And(left, right) => {
                Ok(format!("({} AND {})", left.to_cypher()?, right.to_cypher()?))
            }
            Filter::Or(left, right) => {
                Ok(format!("({} OR {})", left.to_cypher()?, right.to_cypher()?))
            }
        }
    }
}

impl ToCypher for Projection {
    fn to_cypher(&self) -> Result<String, CypherGeneratorError> {
        match self {
            Projection::Element { variable, .. } => Ok(identifier(variable)?.to_string()),
            Projection::Property {
                variable, property, ..
            } => Ok(format!("{}.{}", identifier(variable)?, identifier(property)?)),
            Projection::Id { variable, .. } => Ok(format!("id({})", identifier(variable)?)),
        }
    }
}

impl MatchQuery {
    fn render(&self) -> Result<CypherQuery, CypherGeneratorError> {
        let mut pattern = self.start.to_cypher()?;
        for (edge, node) in &self.hops {
            pattern.push_str(&edge.to_cypher()?);
            pattern.push_str(&node.to_cypher()?);
        }

        let mut conditions = Vec::new();
        for node in self.nodes() {
            if let Some(LabelMatch::Family(type_name)) = &node.label {
                conditions.push(format!(
                    "{} IN {}.{}",
                    quote_string(type_name),
                    identifier(&node.variable)?,
                    TYPES_PROPERTY
                ));
            }
        }
        if let Some(filter) = &self.filter {
            conditions.push(filter.to_cypher()?);
        }

        let mut text = format!("MATCH {}", pattern);
        if !conditions.is_empty() {
            text.push_str(" WHERE ");
            text.push_str(&conditions.join(" AND "));
        }

        if self.projections.is_empty() {
            text.push_str(" RETURN 1");
            return Ok(CypherQuery {
                text,
                columns: vec!["matched".to_string()],
            });
        }
        let items = self
            .projections
            .iter()
            .map(ToCypher::to_cypher)
            .collect::<Result<Vec<_>, _>>()?;
        text.push_str(" RETURN ");
        text.push_str(&items.join(", "));
        Ok(CypherQuery {
            text,
            columns: self
                .projections
                .iter()
                .map(|projection| projection.label().to_string())
                .collect(),
        })
    }
}

impl GraphQuery {
    /// Renders this operation as a single Cypher statement. Label
    /// maintenance has no Cypher form and is rejected.
    pub fn to_cypher_query(&self) -> Result<CypherQuery, CypherGeneratorError> {
        let id_column = || vec!["id".to_string()];
        match self {
            GraphQuery::EnsureVertexLabel { .. } | GraphQuery::EnsureEdgeLabel { .. } => {
                Err(CypherGeneratorError::NotACypherOperation)
            }
            GraphQuery::CreateVertex { label, properties } => Ok(CypherQuery {
                text: format!(
                    "CREATE (n:{}{}) RETURN id(n)",
                    identifier(label)?,
                    property_map(properties)?
                ),
                columns: id_column(),
            }),
            GraphQuery::CreateEdge {
                source,
                target,
                label,
                properties,
            } => Ok(CypherQuery {
                text: format!(
                    "MATCH (a), (b) WHERE id(a) = {} AND id(b) = {} CREATE (a)-[r:{}{}]->(b) RETURN id(r)",
                    source,
                    target,
                    identifier(label)?,
                    property_map(properties)?
                ),
                columns: id_column(),
            }),
            GraphQuery::LookupVertex { id } => Ok(CypherQuery {
                text: format!(
                    "MATCH (n) WHERE id(n) = {} RETURN label(n), n.{}",
                    id, TYPES_PROPERTY
                ),
                columns: vec!["label".to_string(), "types".to_string()],
            }),
            GraphQuery::SetProperties {
                element,
                properties,
            } => {
                if properties.is_empty() {
                    return Ok(CypherQuery {
                        text: format!("{} RETURN id(n)", element_match(element)),
                        columns: id_column(),
                    });
                }
                Ok(CypherQuery {
                    text: format!(
                        "{} SET {} RETURN id(n)",
                        element_match(element),
                        set_clause("n", properties)?
                    ),
                    columns: id_column(),
                })
            }
            GraphQuery::DeleteElement { element } => {
                let delete = match element {
                    ElementRef::Vertex(_) => "DETACH DELETE n",
                    ElementRef::Edge(_) => "DELETE n",
                };
                Ok(CypherQuery {
                    text: format!(
                        "{} WITH n, id(n) AS deleted_id {} RETURN deleted_id",
                        element_match(element),
                        delete
                    ),
                    columns: id_column(),
                })
            }
            GraphQuery::DeleteOutgoing { source, label } => Ok(CypherQuery {
                text: format!(
                    "MATCH (s)-[r:{}]->() WHERE id(s) = {} WITH r, id(r) AS deleted_id DELETE r RETURN deleted_id",
                    identifier(label)?,
                    source
                ),
                columns: id_column(),
            }),
            GraphQuery::Match(query) => query.render(),
        }
    }
}
