//! gql-shape
//!
//! Derives GraphQL type declarations from validation-schema nodes.
//!
//! A [`Schema`] describes the shape of data the way a runtime validator would: objects, arrays,
//! optional and nullable wrappers, enums, unions. A [`TypeFactory`] walks those nodes and declares
//! the matching Object, Input, Enum and Union types on a [`SchemaBuilder`]. Nested objects get
//! derived names, and every node is declared at most once per category.
//!
//! # Example
//!
//! ```
//! use gql_shape::{EnumMetadata, RegistrationOptions, Schema, SdlBuilder, TypeFactory, TypeMetadata};
//!
//! let role = Schema::enumeration(["ADMIN", "USER"]);
//! let user = Schema::object([
//!     ("id", Schema::string().uuid()),
//!     ("role", role.clone()),
//!     ("profile", Schema::object([("bio", Schema::string().optional())])),
//! ]);
//!
//! let mut factory = TypeFactory::new(SdlBuilder::new());
//! factory.register_enum_type(&role, EnumMetadata::new("Role")).unwrap();
//! factory
//!     .register_object_type(&user, TypeMetadata::new("User"), RegistrationOptions::new())
//!     .unwrap();
//!
//! let sdl = factory.builder().render().unwrap();
//! assert!(sdl.contains("type UserProfile {"));
//! assert!(sdl.contains("  profile: UserProfile!"));
//! assert!(sdl.contains("  role: Role!"));
//! ```
//!
//! # Nullability
//!
//! | Node | Field |
//! |------|-------|
//! | `T` | `T!` |
//! | `T.optional()` or `T.nullable()` | `T` |
//! | `T.array()` | `[T!]!` |
//! | `T.nullable().array()` | `[T]!` |
//! | `T.nullable().array().optional()` | `[T]` |
//!
//! # Manifests
//!
//! [`load_manifest`] reads a JSON document of node definitions and registrations, which the
//! `gql-shape` binary renders to SDL.

mod builder;
mod classify;
mod enums;
mod error;
mod generator;
mod loader;
mod manifest;
mod preregister;
mod registry;
mod schema;
mod sdl;
mod shape;
mod types;
mod unions;
mod validator;

pub use builder::SchemaBuilder;
pub use classify::classify;
pub use error::{GenerateError, ManifestError, ManifestIssue, RenderError};
pub use generator::TypeFactory;
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use manifest::{
    load_manifest, load_manifest_str, Manifest, NodeSpec, Registered, RegistrationKind,
    RegistrationSpec,
};
pub use preregister::{default_name_generator, input_type_name, object_type_name, to_pascal_case};
pub use registry::Registry;
pub use schema::{
    DefaultFn, EnumMapping, EnumMembers, EnumValue, Literal, NodeId, NumberCheck, Schema,
    SchemaKind, StringCheck,
};
pub use sdl::{EnumSummary, FieldSummary, SdlBuilder, Summary, TypeSummary, UnionSummary};
pub use shape::{default_value, determine_nullability, parse_shape};
pub use types::{
    enum_mapping, AdditionalRegistration, Category, EnumMetadata, EnumValueOptions,
    EnumValuesMap, FieldDescriptor, NameGenerator, Nullability, RegistrationOptions, Replacement,
    Scalar, TargetType, TypeDescriptor, TypeHandle, TypeMetadata, UnionHandle, VariantResolver,
};
pub use unions::default_variant_resolver;
pub use validator::{validate_document, MANIFEST_SCHEMA};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
