//! Enum registration.

use crate::builder::SchemaBuilder;
use crate::error::GenerateError;
use crate::generator::TypeFactory;
use crate::schema::{EnumMembers, Schema};
use crate::types::EnumMetadata;

impl<B: SchemaBuilder> TypeFactory<B> {
    /// Register an enum node and return its cached member mapping.
    ///
    /// The mapping is read from the node once and cached by identity; the same `Rc` is handed to
    /// the builder and to every field that later classifies the node. A second registration of
    /// the same node returns the cached mapping and declares nothing, even if `metadata` differs.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::NotAnEnum` if `node` is not an enum.
    pub fn register_enum_type(
        &mut self,
        node: &Schema,
        metadata: EnumMetadata,
    ) -> Result<EnumMembers, GenerateError> {
        if let Some(cached) = self.registry.enum_members(node) {
            tracing::trace!(name = %metadata.name, "enum already registered");
            return Ok(cached.clone());
        }

        let members = node.enum_members().ok_or_else(|| GenerateError::NotAnEnum {
            name: metadata.name.clone(),
        })?;
        let members = self.registry.insert_enum(node, members);
        self.builder.declare_enum(&members, &metadata);

        tracing::debug!(name = %metadata.name, members = members.len(), "registered enum");
        Ok(members)
    }
}
