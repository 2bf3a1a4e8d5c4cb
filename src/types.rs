//! Core types shared by the derivation engine and its builders.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::schema::{EnumMapping, EnumMembers, Schema};

/// Declaration space of a generated composite type.
///
/// Only `Object` and `Input` can be generated; the host framework also knows argument and
/// interface classes, which are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Object,
    Input,
    Args,
    Interface,
}

impl Category {
    /// Whether composite declarations can be generated for this category.
    pub fn is_supported(&self) -> bool {
        matches!(self, Category::Object | Category::Input)
    }

    /// Name of the category as the host framework spells it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Category::Object => "ObjectType",
            Category::Input => "InputType",
            Category::Args => "ArgsType",
            Category::Interface => "InterfaceType",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Name and description of a generated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    pub name: String,
    pub description: Option<String>,
}

impl TypeMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Metadata for an enum declaration.
#[derive(Debug, Clone, Default)]
pub struct EnumMetadata {
    pub name: String,
    pub description: Option<String>,
    /// Per-member descriptions and deprecation reasons.
    pub values_map: Option<EnumValuesMap>,
}

/// Per-member options keyed by member name.
pub type EnumValuesMap = indexmap::IndexMap<String, EnumValueOptions>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueOptions {
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl EnumMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn values_map(mut self, values_map: EnumValuesMap) -> Self {
        self.values_map = Some(values_map);
        self
    }
}

/// Built-in and custom scalars a leaf node maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scalar {
    Boolean,
    String,
    Uuid,
    Float,
    Int,
    DateTime,
    Json,
    JsonObject,
    BigInt,
}

impl Scalar {
    /// GraphQL name of the scalar.
    pub fn graphql_name(&self) -> &'static str {
        match self {
            Scalar::Boolean => "Boolean",
            Scalar::String => "String",
            Scalar::Uuid => "UUID",
            Scalar::Float => "Float",
            Scalar::Int => "Int",
            Scalar::DateTime => "DateTime",
            Scalar::Json => "JSON",
            Scalar::JsonObject => "JSONObject",
            Scalar::BigInt => "BigInt",
        }
    }

    /// True for scalars that are not part of the GraphQL specification.
    pub fn is_custom(&self) -> bool {
        !matches!(
            self,
            Scalar::Boolean | Scalar::String | Scalar::Float | Scalar::Int
        )
    }
}

#[derive(Debug)]
struct TypeDecl {
    name: String,
    description: Option<String>,
    category: Category,
}

/// Handle of a generated Object or Input declaration. Compares by identity.
#[derive(Debug, Clone)]
pub struct TypeHandle(Rc<TypeDecl>);

impl TypeHandle {
    pub(crate) fn new(metadata: &TypeMetadata, category: Category) -> Self {
        TypeHandle(Rc::new(TypeDecl {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            category,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    pub fn category(&self) -> Category {
        self.0.category
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeHandle {}

/// Picks the branch declaration a runtime value belongs to.
pub type VariantResolver = Rc<dyn Fn(&Value) -> Option<TypeHandle>>;

struct UnionDecl {
    name: String,
    description: Option<String>,
    branches: Vec<TypeHandle>,
    resolve_variant: VariantResolver,
}

/// Handle of a generated union declaration. Compares by identity.
#[derive(Clone)]
pub struct UnionHandle(Rc<UnionDecl>);

impl fmt::Debug for UnionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionHandle")
            .field("name", &self.0.name)
            .field("branches", &self.0.branches)
            .finish()
    }
}

impl UnionHandle {
    pub(crate) fn new(
        metadata: &TypeMetadata,
        branches: Vec<TypeHandle>,
        resolve_variant: VariantResolver,
    ) -> Self {
        UnionHandle(Rc::new(UnionDecl {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            branches,
            resolve_variant,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    /// Branch declarations in declared order.
    pub fn branches(&self) -> &[TypeHandle] {
        &self.0.branches
    }

    /// Resolve the branch a runtime value belongs to.
    pub fn resolve(&self, value: &Value) -> Option<TypeHandle> {
        (self.0.resolve_variant)(value)
    }
}

impl PartialEq for UnionHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for UnionHandle {}

/// Type a field is declared with.
#[derive(Debug, Clone)]
pub enum TargetType {
    Scalar(Scalar),
    Composite(TypeHandle),
    Enum(EnumMembers),
    Union(UnionHandle),
    List(Box<TargetType>),
}

impl TargetType {
    pub fn list(item: TargetType) -> Self {
        TargetType::List(Box::new(item))
    }

    /// Innermost non-list type.
    pub fn named(&self) -> &TargetType {
        match self {
            TargetType::List(item) => item.named(),
            other => other,
        }
    }
}

impl PartialEq for TargetType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TargetType::Scalar(a), TargetType::Scalar(b)) => a == b,
            (TargetType::Composite(a), TargetType::Composite(b)) => a == b,
            (TargetType::Enum(a), TargetType::Enum(b)) => Rc::ptr_eq(a, b),
            (TargetType::Union(a), TargetType::Union(b)) => a == b,
            (TargetType::List(a), TargetType::List(b)) => a == b,
            _ => false,
        }
    }
}

/// Which positions of a field may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullability {
    NonNull,
    Nullable,
    /// List required, elements may be null.
    Items,
    /// Both list and elements may be null.
    ItemsAndList,
}

impl From<bool> for Nullability {
    fn from(nullable: bool) -> Self {
        if nullable {
            Nullability::Nullable
        } else {
            Nullability::NonNull
        }
    }
}

impl Serialize for Nullability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullability::NonNull => serializer.serialize_bool(false),
            Nullability::Nullable => serializer.serialize_bool(true),
            Nullability::Items => serializer.serialize_str("items"),
            Nullability::ItemsAndList => serializer.serialize_str("itemsAndList"),
        }
    }
}

/// Normalized classification of one schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub target: TargetType,
    pub is_optional: bool,
    pub is_nullable: bool,
    pub is_enum: bool,
    pub is_composite: bool,
    pub is_array: bool,
    pub item_is_optional: bool,
    pub item_is_nullable: bool,
    pub description: Option<String>,
}

impl TypeDescriptor {
    /// Descriptor of a plain leaf: flags come from the node's own queries.
    pub(crate) fn leaf(target: TargetType, node: &Schema) -> Self {
        Self {
            target,
            is_optional: node.is_optional(),
            is_nullable: node.is_nullable(),
            is_enum: false,
            is_composite: false,
            is_array: false,
            item_is_optional: false,
            item_is_nullable: false,
            description: node.description().map(String::from),
        }
    }
}

/// One declared field of a generated composite type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub key: String,
    pub target: TargetType,
    pub nullable: Nullability,
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

/// Synthesizes the name of a nested type from its parent's name and the member key.
pub type NameGenerator = dyn Fn(&str, &str) -> String;

/// A type registered ahead of the root in the same call.
#[derive(Debug, Clone)]
pub struct AdditionalRegistration {
    pub schema: Schema,
    pub metadata: TypeMetadata,
}

/// Field replacement installed before parsing: `origin` members are declared as `replacement`.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub origin: Schema,
    pub replacement: Schema,
}

/// Extras accepted by the object and input registration entry points.
#[derive(Default)]
pub struct RegistrationOptions {
    pub additional: Vec<AdditionalRegistration>,
    pub replacements: Vec<Replacement>,
    pub name_generator: Option<Box<NameGenerator>>,
}

impl RegistrationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under `metadata` before the root type.
    pub fn register_first(mut self, schema: Schema, metadata: TypeMetadata) -> Self {
        self.additional
            .push(AdditionalRegistration { schema, metadata });
        self
    }

    /// Declare members that are `origin` with the shape of `replacement`.
    pub fn replace(mut self, origin: Schema, replacement: Schema) -> Self {
        self.replacements.push(Replacement {
            origin,
            replacement,
        });
        self
    }

    pub fn name_generator(mut self, generator: impl Fn(&str, &str) -> String + 'static) -> Self {
        self.name_generator = Some(Box::new(generator));
        self
    }
}

/// Build an enum mapping from `(name, value)` pairs.
pub fn enum_mapping<K, I>(members: I) -> EnumMapping
where
    K: Into<String>,
    I: IntoIterator<Item = (K, crate::schema::EnumValue)>,
{
    members.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
