//! Type generation - the registration entry points.

use crate::builder::SchemaBuilder;
use crate::error::GenerateError;
use crate::registry::Registry;
use crate::schema::Schema;
use crate::shape::parse_shape;
use crate::types::{Category, RegistrationOptions, TypeHandle, TypeMetadata};

/// Owns the registry and the host builder for one setup phase.
///
/// Registration is single-threaded and runs to completion within each call. Enums and union
/// branches must be registered before the types that reference them.
///
/// # Example
///
/// ```
/// use gql_shape::{Schema, SdlBuilder, TypeFactory, TypeMetadata, RegistrationOptions};
///
/// let item = Schema::object([
///     ("id", Schema::string().uuid()),
///     ("tags", Schema::string().array().optional()),
/// ]);
///
/// let mut factory = TypeFactory::new(SdlBuilder::new());
/// factory
///     .register_object_type(&item, TypeMetadata::new("Item"), RegistrationOptions::new())
///     .unwrap();
///
/// let sdl = factory.builder().render().unwrap();
/// assert!(sdl.contains("type Item {"));
/// assert!(sdl.contains("  id: UUID!"));
/// assert!(sdl.contains("  tags: [String!]"));
/// ```
pub struct TypeFactory<B> {
    pub(crate) registry: Registry,
    pub(crate) builder: B,
}

impl<B: SchemaBuilder> TypeFactory<B> {
    pub fn new(builder: B) -> Self {
        Self {
            registry: Registry::new(),
            builder,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn into_builder(self) -> B {
        self.builder
    }

    /// Register `node` as an object type, with its nested objects.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError` if any member cannot be classified.
    pub fn register_object_type(
        &mut self,
        node: &Schema,
        metadata: TypeMetadata,
        options: RegistrationOptions,
    ) -> Result<TypeHandle, GenerateError> {
        self.register_composite(node, metadata, Category::Object, options)
    }

    /// Register `node` as an input type, with its nested objects.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError` if any member cannot be classified.
    pub fn register_input_type(
        &mut self,
        node: &Schema,
        metadata: TypeMetadata,
        options: RegistrationOptions,
    ) -> Result<TypeHandle, GenerateError> {
        self.register_composite(node, metadata, Category::Input, options)
    }

    /// Declare members that are `origin` with the shape of `replacement` in `category`.
    ///
    /// Only types generated afterwards see the replacement.
    pub fn register_field_replacement(
        &mut self,
        category: Category,
        origin: &Schema,
        replacement: Schema,
    ) -> Result<(), GenerateError> {
        tracing::debug!(%category, origin = ?origin.id(), "installed field replacement");
        self.registry.set_replacement(category, origin, replacement)
    }

    fn register_composite(
        &mut self,
        node: &Schema,
        metadata: TypeMetadata,
        category: Category,
        options: RegistrationOptions,
    ) -> Result<TypeHandle, GenerateError> {
        if !category.is_supported() {
            return Err(GenerateError::UnsupportedCategory { category });
        }

        let RegistrationOptions {
            additional,
            replacements,
            name_generator,
        } = options;

        for r in replacements {
            self.register_field_replacement(category, &r.origin, r.replacement)?;
        }

        for extra in &additional {
            self.preregister(
                &extra.schema,
                category,
                &extra.metadata.name,
                name_generator.as_deref(),
            )?;
            self.generate(&extra.schema, &extra.metadata, category)?;
        }

        self.preregister(node, category, &metadata.name, name_generator.as_deref())?;
        self.generate(node, &metadata, category)
    }

    /// Generate the declaration of `node` in `category`.
    ///
    /// Idempotent per `(category, node)`: a second call returns the first handle without
    /// declaring anything. The handle is registered before its fields are parsed, so members
    /// may refer back to the type being generated. Nested objects must already be registered.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::UnsupportedCategory` for categories other than Object and Input,
    /// or the first classification error of a member. On a member error the type is withdrawn
    /// from the registry and the builder, so a later call generates it afresh.
    pub fn generate(
        &mut self,
        node: &Schema,
        metadata: &TypeMetadata,
        category: Category,
    ) -> Result<TypeHandle, GenerateError> {
        if !category.is_supported() {
            return Err(GenerateError::UnsupportedCategory { category });
        }

        if let Some(existing) = self.registry.composite(category, node)? {
            tracing::trace!(name = existing.name(), %category, "type already generated");
            return Ok(existing.clone());
        }

        let handle = self.registry.insert_composite(
            category,
            node,
            TypeHandle::new(metadata, category),
        )?;
        self.builder.declare_type(&handle);

        let fields = match parse_shape(&self.registry, node, category) {
            Ok(fields) => fields,
            Err(err) => {
                self.registry.remove_composite(category, node)?;
                self.builder.discard_type(&handle);
                tracing::debug!(
                    name = handle.name(),
                    %category,
                    "discarded type after failed member"
                );
                return Err(err);
            }
        };
        for field in &fields {
            self.builder.declare_field(&handle, field);
        }

        tracing::debug!(
            name = handle.name(),
            %category,
            fields = fields.len(),
            "generated type"
        );
        Ok(handle)
    }
}
