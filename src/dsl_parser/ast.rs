//! Borrowed syntax tree produced by the DSL parser.
//!
//! Every node borrows identifiers and string bodies from the source text, so a
//! `Program` lives no longer than the script it was parsed from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program<'a> {
    pub statements: Vec<Statement<'a>>,
    /// Position of the first token of each statement, index-aligned with
    /// `statements`.
    pub positions: Vec<SourcePosition>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement<'a> {
    EntityDef(EntityDef<'a>),
    RelationshipDef(RelationshipDef<'a>),
    InsertEntity(InsertEntity<'a>),
    ConnectRel(ConnectRel<'a>),
    Update(UpdateStmt<'a>),
    Delete(DeleteStmt<'a>),
    Query(QueryStmt<'a>),
}

impl Statement<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::EntityDef(_) => "ENTITY",
            Statement::RelationshipDef(_) => "RELATIONSHIP",
            Statement::InsertEntity(_) => "INSERT",
            Statement::ConnectRel(_) => "CONNECT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::Query(_) => "MATCH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    String,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    Blob,
    Uuid,
    Json,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 9] = [
        PrimitiveType::String,
        PrimitiveType::Int,
        PrimitiveType::Float,
        PrimitiveType::Bool,
        PrimitiveType::Date,
        PrimitiveType::DateTime,
        PrimitiveType::Blob,
        PrimitiveType::Uuid,
        PrimitiveType::Json,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveType::String => "STRING",
            PrimitiveType::Int => "INT",
            PrimitiveType::Float => "FLOAT",
            PrimitiveType::Bool => "BOOL",
            PrimitiveType::Date => "DATE",
            PrimitiveType::DateTime => "DATETIME",
            PrimitiveType::Blob => "BLOB",
            PrimitiveType::Uuid => "UUID",
            PrimitiveType::Json => "JSON",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        PrimitiveType::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(word))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum DataType<'a> {
    Primitive(PrimitiveType),
    PrimitiveArray(PrimitiveType),
    EntityRef(&'a str),
    EntityRefArray(&'a str),
}

#[derive(Debug, PartialEq, Clone)]
pub struct FieldDecl<'a> {
    pub name: &'a str,
    pub data_type: DataType<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct EntityDef<'a> {
    pub name: &'a str,
    pub fields: Vec<FieldDecl<'a>>,
    pub extends: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Multiplicity {
    #[default]
    One,
    Many,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RelationshipDef<'a> {
    pub name: &'a str,
    pub source: &'a str,
    pub source_multiplicity: Multiplicity,
    pub target: &'a str,
    pub target_multiplicity: Multiplicity,
    pub fields: Vec<FieldDecl<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal<'a> {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Body between the quotes, escapes still in place.
    String(&'a str),
    Null,
}

#[derive(Debug, PartialEq, Clone)]
pub enum AssignValue<'a> {
    Literal(Literal<'a>),
    Reference(&'a str),
    Array(Vec<AssignValue<'a>>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Assignment<'a> {
    pub field: &'a str,
    pub value: AssignValue<'a>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InsertEntity<'a> {
    pub type_name: &'a str,
    pub assignments: Vec<Assignment<'a>>,
    pub alias: Option<&'a str>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AliasOrId<'a> {
    Alias(&'a str),
    Id(i64),
}

#[derive(Debug, PartialEq, Clone)]
pub struct ConnectRel<'a> {
    pub source: AliasOrId<'a>,
    pub relationship: &'a str,
    pub target: AliasOrId<'a>,
    pub properties: Vec<Assignment<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum TargetRef<'a> {
    Element(AliasOrId<'a>),
    Pattern {
        type_name: &'a str,
        condition: Condition<'a>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct UpdateStmt<'a> {
    pub target: TargetRef<'a>,
    pub assignments: Vec<Assignment<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DeleteStmt<'a> {
    pub target: TargetRef<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PropertyPath<'a> {
    pub alias: Option<&'a str>,
    pub property: &'a str,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PropertyEquals<'a> {
    pub path: PropertyPath<'a>,
    pub value: Literal<'a>,
}

/// Equality predicates chained by AND/OR, folded strictly left to right
/// without precedence.
#[derive(Debug, PartialEq, Clone)]
pub struct Condition<'a> {
    pub first: PropertyEquals<'a>,
    pub rest: Vec<(LogicalOperator, PropertyEquals<'a>)>,
}

impl<'a> Condition<'a> {
    pub fn predicates(&self) -> impl Iterator<Item = &PropertyEquals<'a>> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, p)| p))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Incoming,
    Outgoing,
    Either,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NodePattern<'a> {
    pub name: Option<&'a str>,
    pub label: Option<&'a str>,
    pub properties: Option<Condition<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RelationshipPattern<'a> {
    pub name: Option<&'a str>,
    pub label: Option<&'a str>,
    pub properties: Option<Condition<'a>>,
    pub direction: Direction,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PathPattern<'a> {
    pub start: NodePattern<'a>,
    pub hops: Vec<(RelationshipPattern<'a>, NodePattern<'a>)>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnItem<'a> {
    pub alias: &'a str,
    pub property: Option<&'a str>,
}

impl ReturnItem<'_> {
    /// Column label used in result rows: `alias` or `alias.property`.
    pub fn label(&self) -> String {
        match self.property {
            Some(property) => format!("{}.{}", self.alias, property),
            None => self.alias.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct QueryStmt<'a> {
    pub pattern: PathPattern<'a>,
    pub where_clause: Option<Condition<'a>>,
    /// Empty when the query has no RETURN clause.
    pub return_items: Vec<ReturnItem<'a>>,
}
