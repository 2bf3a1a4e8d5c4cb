//! Union registration and default variant resolution.

use std::rc::Rc;

use serde_json::Value;

use crate::builder::SchemaBuilder;
use crate::error::GenerateError;
use crate::generator::TypeFactory;
use crate::schema::{Schema, SchemaKind};
use crate::types::{Category, TypeHandle, TypeMetadata, UnionHandle, VariantResolver};

impl<B: SchemaBuilder> TypeFactory<B> {
    /// Register a union whose branches are already registered object types.
    ///
    /// Every branch is checked before anything is declared, so a failed registration leaves no
    /// trace. Unions only exist in the Object category. Without `resolve_variant`, values are
    /// matched to branches by [`default_variant_resolver`].
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::NotAUnion` if `node` is not a union,
    /// `GenerateError::NonCompositeUnionBranch` if a branch is not an object, or
    /// `GenerateError::UnregisteredUnionBranch` if a branch has no object declaration.
    pub fn register_union_type(
        &mut self,
        node: &Schema,
        metadata: TypeMetadata,
        resolve_variant: Option<VariantResolver>,
    ) -> Result<UnionHandle, GenerateError> {
        if let Some(existing) = self.registry.union(node) {
            tracing::trace!(name = existing.name(), "union already registered");
            return Ok(existing.clone());
        }

        let options = node.union_options().ok_or_else(|| GenerateError::NotAUnion {
            name: metadata.name.clone(),
        })?;

        let mut branches = Vec::with_capacity(options.len());
        for (index, option) in options.iter().enumerate() {
            if !option.is_object() {
                return Err(GenerateError::NonCompositeUnionBranch { index });
            }
            let handle = self
                .registry
                .composite(Category::Object, option)?
                .ok_or(GenerateError::UnregisteredUnionBranch { index })?;
            branches.push(handle.clone());
        }

        let resolve_variant =
            resolve_variant.unwrap_or_else(|| default_variant_resolver(node, &branches));
        let handle = self
            .registry
            .insert_union(node, UnionHandle::new(&metadata, branches, resolve_variant));
        self.builder.declare_union(&handle);

        tracing::debug!(
            name = handle.name(),
            branches = handle.branches().len(),
            "registered union"
        );
        Ok(handle)
    }
}

/// Resolver matching a value to a branch by membership.
///
/// Discriminated unions compare the discriminator member against each branch's literal for that
/// member. Plain unions take the first branch that declares every key of the value and whose
/// required members are all present.
pub fn default_variant_resolver(node: &Schema, branches: &[TypeHandle]) -> VariantResolver {
    let options: Vec<Schema> = node.union_options().map(<[Schema]>::to_vec).unwrap_or_default();
    let pairs: Vec<(Schema, TypeHandle)> = options.into_iter().zip(branches.iter().cloned()).collect();

    match node.kind() {
        SchemaKind::DiscriminatedUnion { discriminator, .. } => {
            let discriminator = discriminator.clone();
            Rc::new(move |value: &Value| {
                let tag = value.get(&discriminator)?;
                pairs
                    .iter()
                    .find(|(schema, _)| {
                        discriminator_literal(schema, &discriminator)
                            .is_some_and(|literal| &literal == tag)
                    })
                    .map(|(_, handle)| handle.clone())
            })
        }
        _ => Rc::new(move |value: &Value| {
            let object = value.as_object()?;
            pairs
                .iter()
                .find(|(schema, _)| {
                    let Some(shape) = schema.shape() else {
                        return false;
                    };
                    object.keys().all(|k| shape.contains_key(k))
                        && shape
                            .iter()
                            .filter(|(_, member)| !member.is_optional())
                            .all(|(k, _)| object.contains_key(k))
                })
                .map(|(_, handle)| handle.clone())
        }),
    }
}

/// Literal value a branch declares for the discriminator member.
fn discriminator_literal(branch: &Schema, discriminator: &str) -> Option<Value> {
    let mut member = branch.shape()?.get(discriminator)?;
    while let Some(inner) = member.inner() {
        member = inner;
    }
    match member.kind() {
        SchemaKind::Literal(literal) => Some(literal.to_json()),
        _ => None,
    }
}
