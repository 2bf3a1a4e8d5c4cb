//! Identity-keyed registry of generated declarations.
//!
//! Entries are written once during setup. A composite entry is only removed when generating
//! its fields failed.

use std::collections::HashMap;

use crate::error::GenerateError;
use crate::schema::{EnumMembers, NodeId, Schema};
use crate::types::{Category, TypeHandle, UnionHandle};

#[derive(Debug, Default)]
struct CategoryTable {
    types: HashMap<NodeId, TypeHandle>,
    replacements: HashMap<NodeId, Schema>,
}

/// Declarations generated so far, keyed by source node identity.
#[derive(Debug, Default)]
pub struct Registry {
    objects: CategoryTable,
    inputs: CategoryTable,
    enums: HashMap<NodeId, EnumMembers>,
    unions: HashMap<NodeId, UnionHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, category: Category) -> Result<&CategoryTable, GenerateError> {
        match category {
            Category::Object => Ok(&self.objects),
            Category::Input => Ok(&self.inputs),
            _ => Err(GenerateError::UnsupportedCategory { category }),
        }
    }

    fn table_mut(&mut self, category: Category) -> Result<&mut CategoryTable, GenerateError> {
        match category {
            Category::Object => Ok(&mut self.objects),
            Category::Input => Ok(&mut self.inputs),
            _ => Err(GenerateError::UnsupportedCategory { category }),
        }
    }

    /// Declaration generated for `node` in `category`, if any.
    pub fn composite(
        &self,
        category: Category,
        node: &Schema,
    ) -> Result<Option<&TypeHandle>, GenerateError> {
        Ok(self.table(category)?.types.get(&node.id()))
    }

    /// Record the declaration for `node`. The first declaration wins; the stored one is returned.
    pub fn insert_composite(
        &mut self,
        category: Category,
        node: &Schema,
        handle: TypeHandle,
    ) -> Result<TypeHandle, GenerateError> {
        let table = self.table_mut(category)?;
        Ok(table.types.entry(node.id()).or_insert(handle).clone())
    }

    /// Forget the declaration for `node`, returning it if one was recorded.
    pub(crate) fn remove_composite(
        &mut self,
        category: Category,
        node: &Schema,
    ) -> Result<Option<TypeHandle>, GenerateError> {
        Ok(self.table_mut(category)?.types.remove(&node.id()))
    }

    /// Replacement installed for `node` in `category`, if any.
    pub fn replacement(&self, category: Category, node: &Schema) -> Option<&Schema> {
        self.table(category)
            .ok()
            .and_then(|t| t.replacements.get(&node.id()))
    }

    /// Install a replacement. Last write wins.
    pub fn set_replacement(
        &mut self,
        category: Category,
        origin: &Schema,
        replacement: Schema,
    ) -> Result<(), GenerateError> {
        self.table_mut(category)?
            .replacements
            .insert(origin.id(), replacement);
        Ok(())
    }

    /// Cached member mapping of an enum node.
    pub fn enum_members(&self, node: &Schema) -> Option<&EnumMembers> {
        self.enums.get(&node.id())
    }

    /// Cache `members` for `node` unless a mapping is already cached. Returns the cached mapping.
    pub fn insert_enum(&mut self, node: &Schema, members: EnumMembers) -> EnumMembers {
        self.enums.entry(node.id()).or_insert(members).clone()
    }

    /// Union declaration generated for `node`, if any.
    pub fn union(&self, node: &Schema) -> Option<&UnionHandle> {
        self.unions.get(&node.id())
    }

    pub fn insert_union(&mut self, node: &Schema, handle: UnionHandle) -> UnionHandle {
        self.unions.entry(node.id()).or_insert(handle).clone()
    }

    /// Number of composite declarations in `category`.
    pub fn composite_count(&self, category: Category) -> usize {
        self.table(category).map(|t| t.types.len()).unwrap_or(0)
    }
}
