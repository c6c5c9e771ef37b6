//! Entity and relationship type registry.
//!
//! `SchemaRegistry` is the committed catalog. A script works against a
//! `SchemaOverlay`, which layers the definitions made so far in the script on
//! top of a snapshot of the registry; the overlay's pending definitions are
//! merged only once the script's transaction has committed.
//!
//! Name resolution, inheritance and effective-field computation are provided
//! for both through the `SchemaView` trait.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::Serialize;

use super::errors::GraphSchemaError;
use super::schema_types::{EntityType, FieldSchema, RelationshipType};

/// Read access to a set of registered types.
pub trait SchemaView {
    fn entity(&self, name: &str) -> Option<&EntityType>;

    fn relationship(&self, name: &str) -> Option<&RelationshipType>;

    /// Names of all visible entity types, in no particular order.
    fn entity_names(&self) -> Vec<&str>;

    fn resolve_entity(&self, name: &str) -> Result<&EntityType, GraphSchemaError> {
        self.entity(name)
            .ok_or_else(|| GraphSchemaError::UnknownEntity {
                name: name.to_string(),
            })
    }

    fn resolve_relationship(&self, name: &str) -> Result<&RelationshipType, GraphSchemaError> {
        self.relationship(name)
            .ok_or_else(|| GraphSchemaError::UnknownRelationship {
                name: name.to_string(),
            })
    }

    /// The entity followed by its ancestors, nearest first.
    fn ancestors(&self, name: &str) -> Result<Vec<String>, GraphSchemaError> {
        let mut chain = vec![self.resolve_entity(name)?.name.clone()];
        let mut seen: HashSet<String> = chain.iter().cloned().collect();
        let mut current = self.resolve_entity(name)?;
        while let Some(parent_name) = &current.parent {
            if !seen.insert(parent_name.clone()) {
                chain.push(parent_name.clone());
                return Err(GraphSchemaError::CyclicInheritance {
                    chain: chain.join(" -> "),
                });
            }
            let parent = self
                .entity(parent_name)
                .ok_or_else(|| GraphSchemaError::UnknownParent {
                    entity: current.name.clone(),
                    parent: parent_name.clone(),
                })?;
            chain.push(parent.name.clone());
            current = parent;
        }
        Ok(chain)
    }

    /// Inherited fields first (root ancestor downward), with a child's
    /// redeclaration replacing the inherited field in place.
    fn effective_fields(&self, name: &str) -> Result<Vec<FieldSchema>, GraphSchemaError> {
        let chain = self.ancestors(name)?;
        let mut fields: Vec<FieldSchema> = Vec::new();
        for type_name in chain.iter().rev() {
            let entity = self.resolve_entity(type_name)?;
            for field in &entity.fields {
                match fields.iter_mut().find(|existing| existing.name == field.name) {
                    Some(existing) => *existing = field.clone(),
                    None => fields.push(field.clone()),
                }
            }
        }
        Ok(fields)
    }

    fn effective_field(&self, entity: &str, field: &str) -> Result<Option<FieldSchema>, GraphSchemaError> {
        Ok(self
            .effective_fields(entity)?
            .into_iter()
            .find(|candidate| candidate.name == field))
    }

    /// True when `name` is `ancestor` or inherits from it.
    fn is_a(&self, name: &str, ancestor: &str) -> bool {
        self.ancestors(name)
            .map(|chain| chain.iter().any(|entry| entry == ancestor))
            .unwrap_or(false)
    }

    fn has_subtypes(&self, name: &str) -> bool {
        self.entity_names().into_iter().any(|candidate| {
            self.entity(candidate)
                .and_then(|entity| entity.parent.as_deref())
                == Some(name)
        })
    }

    /// True when `name` is used as a reference field on any entity, which
    /// makes it a valid edge label under edge-mapped references.
    fn is_reference_field(&self, name: &str) -> bool {
        self.entity_names().into_iter().any(|candidate| {
            self.entity(candidate)
                .and_then(|entity| entity.own_field(name))
                .is_some_and(|field| field.field_type.referenced_entity().is_some())
        })
    }

    /// Checks that `entity` can be added to this view: unique name, resolvable
    /// parent and no inheritance cycle.
    fn check_new_entity(&self, entity: &EntityType) -> Result<(), GraphSchemaError> {
        if self.entity(&entity.name).is_some() {
            return Err(GraphSchemaError::DuplicateEntity {
                name: entity.name.clone(),
            });
        }
        if let Some(parent) = &entity.parent {
            if parent == &entity.name {
                return Err(GraphSchemaError::CyclicInheritance {
                    chain: format!("{} -> {}", entity.name, parent),
                });
            }
            if self.entity(parent).is_none() {
                return Err(GraphSchemaError::UnknownParent {
                    entity: entity.name.clone(),
                    parent: parent.clone(),
                });
            }
            let mut chain = self.ancestors(parent)?;
            if chain.iter().any(|name| name == &entity.name) {
                chain.insert(0, entity.name.clone());
                return Err(GraphSchemaError::CyclicInheritance {
                    chain: chain.join(" -> "),
                });
            }
        }
        Ok(())
    }

    fn check_new_relationship(&self, relationship: &RelationshipType) -> Result<(), GraphSchemaError> {
        if self.relationship(&relationship.name).is_some() {
            return Err(GraphSchemaError::DuplicateRelationship {
                name: relationship.name.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaRegistry {
    entities: HashMap<String, EntityType>,
    relationships: HashMap<String, RelationshipType>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_entity(&mut self, entity: EntityType) -> Result<(), GraphSchemaError> {
        self.check_new_entity(&entity)?;
        debug!("Registered entity type {}", entity.name);
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    pub fn define_relationship(&mut self, relationship: RelationshipType) -> Result<(), GraphSchemaError> {
        self.check_new_relationship(&relationship)?;
        debug!("Registered relationship type {}", relationship.name);
        self.relationships
            .insert(relationship.name.clone(), relationship);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipType> {
        self.relationships.values()
    }

    /// Fails if any pending definition collides with a name already
    /// registered here.
    pub fn check_merge(&self, pending: &SchemaRegistry) -> Result<(), GraphSchemaError> {
        if let Some(name) = pending.entities.keys().find(|name| self.entities.contains_key(*name)) {
            return Err(GraphSchemaError::DuplicateEntity { name: name.clone() });
        }
        if let Some(name) = pending
            .relationships
            .keys()
            .find(|name| self.relationships.contains_key(*name))
        {
            return Err(GraphSchemaError::DuplicateRelationship { name: name.clone() });
        }
        Ok(())
    }

    /// Moves every pending definition into this registry.
    pub fn merge(&mut self, pending: SchemaRegistry) -> Result<(), GraphSchemaError> {
        self.check_merge(&pending)?;
        self.entities.extend(pending.entities);
        self.relationships.extend(pending.relationships);
        Ok(())
    }
}

impl SchemaView for SchemaRegistry {
    fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.get(name)
    }

    fn relationship(&self, name: &str) -> Option<&RelationshipType> {
        self.relationships.get(name)
    }

    fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(String::as_str).collect()
    }
}

/// Script-local view: committed snapshot plus definitions made earlier in
/// the same script.
#[derive(Debug)]
pub struct SchemaOverlay<'r> {
    base: &'r SchemaRegistry,
    pending: SchemaRegistry,
}

impl<'r> SchemaOverlay<'r> {
    pub fn new(base: &'r SchemaRegistry) -> Self {
        SchemaOverlay {
            base,
            pending: SchemaRegistry::new(),
        }
    }

    pub fn define_entity(&mut self, entity: EntityType) -> Result<(), GraphSchemaError> {
        self.check_new_entity(&entity)?;
        debug!("Staged entity type {}", entity.name);
        self.pending.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    pub fn define_relationship(&mut self, relationship: RelationshipType) -> Result<(), GraphSchemaError> {
        self.check_new_relationship(&relationship)?;
        debug!("Staged relationship type {}", relationship.name);
        self.pending
            .relationships
            .insert(relationship.name.clone(), relationship);
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn into_pending(self) -> SchemaRegistry {
        self.pending
    }
}

impl SchemaView for SchemaOverlay<'_> {
    fn entity(&self, name: &str) -> Option<&EntityType> {
        self.pending.entity(name).or_else(|| self.base.entity(name))
    }

    fn relationship(&self, name: &str) -> Option<&RelationshipType> {
        self.pending
            .relationship(name)
            .or_else(|| self.base.relationship(name))
    }

    fn entity_names(&self) -> Vec<&str> {
        let mut names = self.base.entity_names();
        names.extend(self.pending.entity_names());
        names
    }
}
