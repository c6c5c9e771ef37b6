use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::GraphSchemaError;
use crate::dsl_parser::ast::{
    DataType, EntityDef, FieldDecl, Multiplicity, PrimitiveType, RelationshipDef,
};

/// Vertex property holding the entity's own type name followed by all of
/// its ancestors. Used for inheritance-aware matching.
pub const TYPES_PROPERTY: &str = "_types";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Primitive(PrimitiveType),
    PrimitiveArray(PrimitiveType),
    EntityRef(String),
    EntityRefArray(String),
}

impl FieldType {
    pub fn from_ast(data_type: &DataType<'_>) -> Self {
        match data_type {
            DataType::Primitive(kind) => FieldType::Primitive(*kind),
            DataType::PrimitiveArray(kind) => FieldType::PrimitiveArray(*kind),
            DataType::EntityRef(name) => FieldType::EntityRef(name.to_string()),
            DataType::EntityRefArray(name) => FieldType::EntityRefArray(name.to_string()),
        }
    }

    /// Entity type referenced by this field, if it is a reference.
    pub fn referenced_entity(&self) -> Option<&str> {
        match self {
            FieldType::EntityRef(name) | FieldType::EntityRefArray(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            FieldType::PrimitiveArray(_) | FieldType::EntityRefArray(_)
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Primitive(kind) => f.write_str(kind.keyword()),
            FieldType::PrimitiveArray(kind) => write!(f, "{}[]", kind.keyword()),
            FieldType::EntityRef(name) => f.write_str(name),
            FieldType::EntityRefArray(name) => write!(f, "{}[]", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    /// Own fields in declaration order; inherited fields are not included.
    pub fields: Vec<FieldSchema>,
    pub parent: Option<String>,
}

impl EntityType {
    pub fn from_def(def: &EntityDef<'_>) -> Result<Self, GraphSchemaError> {
        Ok(EntityType {
            name: def.name.to_string(),
            fields: build_fields(def.name, &def.fields)?,
            parent: def.extends.map(str::to_string),
        })
    }

    pub fn own_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipType {
    pub name: String,
    pub source: String,
    pub source_multiplicity: Multiplicity,
    pub target: String,
    pub target_multiplicity: Multiplicity,
    pub fields: Vec<FieldSchema>,
}

impl RelationshipType {
    pub fn from_def(def: &RelationshipDef<'_>) -> Result<Self, GraphSchemaError> {
        Ok(RelationshipType {
            name: def.name.to_string(),
            source: def.source.to_string(),
            source_multiplicity: def.source_multiplicity,
            target: def.target.to_string(),
            target_multiplicity: def.target_multiplicity,
            fields: build_fields(def.name, &def.fields)?,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

fn build_fields(owner: &str, decls: &[FieldDecl<'_>]) -> Result<Vec<FieldSchema>, GraphSchemaError> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(decls.len());
    for decl in decls {
        if decl.name == TYPES_PROPERTY {
            return Err(GraphSchemaError::ReservedField {
                owner: owner.to_string(),
                field: decl.name.to_string(),
            });
        }
        if !seen.insert(decl.name) {
            return Err(GraphSchemaError::DuplicateField {
                owner: owner.to_string(),
                field: decl.name.to_string(),
            });
        }
        fields.push(FieldSchema {
            name: decl.name.to_string(),
            field_type: FieldType::from_ast(&decl.data_type),
        });
    }
    Ok(fields)
}
