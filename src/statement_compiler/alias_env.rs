use std::collections::HashMap;

use super::errors::SemanticError;
use crate::store::value::ElementId;

/// What an `AS alias` clause bound: the new vertex and its entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasBinding {
    pub id: ElementId,
    pub entity_type: String,
}

/// Aliases bound so far in one script. Created empty for every script and
/// dropped with it.
#[derive(Debug, Default)]
pub struct AliasEnvironment {
    bindings: HashMap<String, AliasBinding>,
}

impl AliasEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.bindings.contains_key(alias)
    }

    pub fn resolve(&self, alias: &str) -> Result<&AliasBinding, SemanticError> {
        self.bindings
            .get(alias)
            .ok_or_else(|| SemanticError::UnknownAlias {
                alias: alias.to_string(),
            })
    }

    pub fn bind(&mut self, alias: &str, binding: AliasBinding) -> Result<(), SemanticError> {
        if self.contains(alias) {
            return Err(SemanticError::DuplicateAlias {
                alias: alias.to_string(),
            });
        }
        self.bindings.insert(alias.to_string(), binding);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
