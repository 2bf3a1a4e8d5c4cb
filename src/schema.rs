//! Validation-schema node model.
//!
//! A [`Schema`] is a cheap-clone handle to an immutable node. Every node gets a [`NodeId`] when it
//! is constructed; clones share that identity, while any combinator (`optional`, `describe`, ...)
//! builds a new node with a fresh one. Registries key on the id, never on structure, so two
//! structurally identical schemas built separately are distinct.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a schema node, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Value of an enumeration member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Number(i64),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::String(s) => write!(f, "{}", s),
            EnumValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Ordered member-name to value mapping of an enumeration.
pub type EnumMapping = IndexMap<String, EnumValue>;

/// Shared enum mapping. Identity (not equality) is what declarations are matched by.
pub type EnumMembers = Rc<EnumMapping>;

/// Zero-argument producer of a default value.
pub type DefaultFn = Rc<dyn Fn() -> Value>;

/// Constraint attached to a string node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringCheck {
    Uuid,
    Email,
    Url,
}

/// Constraint attached to a number node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberCheck {
    Int,
    Min(f64),
    Max(f64),
}

/// Runtime value of a literal node.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    BigInt(i128),
    Number(f64),
    String(String),
    Null,
}

impl Literal {
    /// JSON rendering of the literal, used for discriminator matching.
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::BigInt(n) => Value::String(n.to_string()),
            Literal::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Null => Value::Null,
        }
    }
}

/// The closed set of node variants.
#[derive(Clone)]
pub enum SchemaKind {
    Object(IndexMap<String, Schema>),
    Array(Schema),
    Optional(Schema),
    Nullable(Schema),
    Default { inner: Schema, value: DefaultFn },
    Transform(Schema),
    String(Vec<StringCheck>),
    Number(Vec<NumberCheck>),
    Boolean,
    Date,
    BigInt,
    Any,
    Unknown,
    Record(Schema),
    Literal(Literal),
    /// Name-only enumeration; its mapping is derived on every access.
    Enum(Vec<String>),
    /// Enumeration with a value domain fixed at definition time.
    NativeEnum(EnumMembers),
    Union(Vec<Schema>),
    DiscriminatedUnion {
        discriminator: String,
        options: Vec<Schema>,
    },
    Tuple(Vec<Schema>),
    Null,
    Never,
}

impl SchemaKind {
    /// Short variant name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
            SchemaKind::Optional(_) => "optional",
            SchemaKind::Nullable(_) => "nullable",
            SchemaKind::Default { .. } => "default",
            SchemaKind::Transform(_) => "transform",
            SchemaKind::String(_) => "string",
            SchemaKind::Number(_) => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Date => "date",
            SchemaKind::BigInt => "bigint",
            SchemaKind::Any => "any",
            SchemaKind::Unknown => "unknown",
            SchemaKind::Record(_) => "record",
            SchemaKind::Literal(_) => "literal",
            SchemaKind::Enum(_) => "enum",
            SchemaKind::NativeEnum(_) => "nativeEnum",
            SchemaKind::Union(_) => "union",
            SchemaKind::DiscriminatedUnion { .. } => "discriminatedUnion",
            SchemaKind::Tuple(_) => "tuple",
            SchemaKind::Null => "null",
            SchemaKind::Never => "never",
        }
    }
}

struct Node {
    id: NodeId,
    kind: SchemaKind,
    description: Option<String>,
}

/// Handle to a schema node.
#[derive(Clone)]
pub struct Schema(Rc<Node>);

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.0.id)
            .field("kind", &self.0.kind.name())
            .field("description", &self.0.description)
            .finish()
    }
}

impl Schema {
    /// Build a node of the given kind with no description.
    pub fn new(kind: SchemaKind) -> Self {
        Self::with_description(kind, None)
    }

    fn with_description(kind: SchemaKind, description: Option<String>) -> Self {
        Schema(Rc::new(Node {
            id: NodeId::next(),
            kind,
            description,
        }))
    }

    /// Wrap `self` in a new node, carrying the description over.
    fn wrap(&self, kind: SchemaKind) -> Self {
        Self::with_description(kind, self.0.description.clone())
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.0.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    /// True when both handles point at the same node.
    pub fn same_node(&self, other: &Schema) -> bool {
        self.0.id == other.0.id
    }

    // --- leaf constructors ---

    pub fn string() -> Self {
        Self::new(SchemaKind::String(Vec::new()))
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number(Vec::new()))
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn date() -> Self {
        Self::new(SchemaKind::Date)
    }

    pub fn bigint() -> Self {
        Self::new(SchemaKind::BigInt)
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    pub fn unknown() -> Self {
        Self::new(SchemaKind::Unknown)
    }

    pub fn null() -> Self {
        Self::new(SchemaKind::Null)
    }

    pub fn never() -> Self {
        Self::new(SchemaKind::Never)
    }

    pub fn literal(value: Literal) -> Self {
        Self::new(SchemaKind::Literal(value))
    }

    pub fn record(values: Schema) -> Self {
        Self::new(SchemaKind::Record(values))
    }

    pub fn tuple(items: Vec<Schema>) -> Self {
        Self::new(SchemaKind::Tuple(items))
    }

    // --- composite constructors ---

    /// Object shape; member order is preserved.
    pub fn object<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        let shape = members.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(SchemaKind::Object(shape))
    }

    pub fn enumeration<S, I>(names: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self::new(SchemaKind::Enum(names.into_iter().map(Into::into).collect()))
    }

    pub fn native_enum(members: EnumMapping) -> Self {
        Self::new(SchemaKind::NativeEnum(Rc::new(members)))
    }

    pub fn union(options: Vec<Schema>) -> Self {
        Self::new(SchemaKind::Union(options))
    }

    pub fn discriminated_union(discriminator: impl Into<String>, options: Vec<Schema>) -> Self {
        Self::new(SchemaKind::DiscriminatedUnion {
            discriminator: discriminator.into(),
            options,
        })
    }

    // --- combinators ---

    pub fn array(&self) -> Self {
        Self::new(SchemaKind::Array(self.clone()))
    }

    pub fn optional(&self) -> Self {
        self.wrap(SchemaKind::Optional(self.clone()))
    }

    pub fn nullable(&self) -> Self {
        self.wrap(SchemaKind::Nullable(self.clone()))
    }

    pub fn transform(&self) -> Self {
        self.wrap(SchemaKind::Transform(self.clone()))
    }

    /// Default wrapper producing a clone of `value`.
    pub fn default_value(&self, value: Value) -> Self {
        self.default_with(move || value.clone())
    }

    /// Default wrapper with a custom producer.
    pub fn default_with(&self, producer: impl Fn() -> Value + 'static) -> Self {
        self.wrap(SchemaKind::Default {
            inner: self.clone(),
            value: Rc::new(producer),
        })
    }

    /// Copy of this node with a description attached. The copy is a new node.
    pub fn describe(&self, description: impl Into<String>) -> Self {
        Self::with_description(self.0.kind.clone(), Some(description.into()))
    }

    /// Add a string constraint. Non-string nodes are returned unchanged.
    pub fn check_string(&self, check: StringCheck) -> Self {
        match &self.0.kind {
            SchemaKind::String(checks) => {
                let mut checks = checks.clone();
                checks.push(check);
                self.wrap(SchemaKind::String(checks))
            }
            _ => self.clone(),
        }
    }

    /// Add a number constraint. Non-number nodes are returned unchanged.
    pub fn check_number(&self, check: NumberCheck) -> Self {
        match &self.0.kind {
            SchemaKind::Number(checks) => {
                let mut checks = checks.clone();
                checks.push(check);
                self.wrap(SchemaKind::Number(checks))
            }
            _ => self.clone(),
        }
    }

    pub fn uuid(&self) -> Self {
        self.check_string(StringCheck::Uuid)
    }

    pub fn int(&self) -> Self {
        self.check_number(NumberCheck::Int)
    }

    // --- introspection ---

    /// Member shape when this is an object node.
    pub fn shape(&self) -> Option<&IndexMap<String, Schema>> {
        match &self.0.kind {
            SchemaKind::Object(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.0.kind, SchemaKind::Object(_))
    }

    /// Node wrapped by an optional/nullable/default/transform node.
    pub fn inner(&self) -> Option<&Schema> {
        match &self.0.kind {
            SchemaKind::Optional(inner)
            | SchemaKind::Nullable(inner)
            | SchemaKind::Transform(inner)
            | SchemaKind::Default { inner, .. } => Some(inner),
            _ => None,
        }
    }

    /// Whether the node accepts an absent value.
    pub fn is_optional(&self) -> bool {
        match &self.0.kind {
            SchemaKind::Optional(_) | SchemaKind::Default { .. } => true,
            SchemaKind::Any | SchemaKind::Unknown => true,
            SchemaKind::Nullable(inner) | SchemaKind::Transform(inner) => inner.is_optional(),
            SchemaKind::Union(options) | SchemaKind::DiscriminatedUnion { options, .. } => {
                options.iter().any(Schema::is_optional)
            }
            _ => false,
        }
    }

    /// Whether the node accepts `null`.
    pub fn is_nullable(&self) -> bool {
        match &self.0.kind {
            SchemaKind::Nullable(_) | SchemaKind::Null => true,
            SchemaKind::Any | SchemaKind::Unknown => true,
            SchemaKind::Literal(Literal::Null) => true,
            SchemaKind::Optional(inner)
            | SchemaKind::Transform(inner)
            | SchemaKind::Default { inner, .. } => inner.is_nullable(),
            SchemaKind::Union(options) | SchemaKind::DiscriminatedUnion { options, .. } => {
                options.iter().any(Schema::is_nullable)
            }
            _ => false,
        }
    }

    /// Member mapping of an enum node.
    ///
    /// A name-only enum builds a new mapping on every call, so two calls return equal but
    /// distinct mappings. A native enum returns its stored mapping.
    pub fn enum_members(&self) -> Option<EnumMembers> {
        match &self.0.kind {
            SchemaKind::Enum(names) => Some(Rc::new(
                names
                    .iter()
                    .map(|n| (n.clone(), EnumValue::String(n.clone())))
                    .collect(),
            )),
            SchemaKind::NativeEnum(members) => Some(Rc::clone(members)),
            _ => None,
        }
    }

    /// Branches of a union node.
    pub fn union_options(&self) -> Option<&[Schema]> {
        match &self.0.kind {
            SchemaKind::Union(options) | SchemaKind::DiscriminatedUnion { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_identity() {
        let a = Schema::string();
        let b = a.clone();
        assert!(a.same_node(&b));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn structurally_equal_nodes_are_distinct() {
        let a = Schema::string();
        let b = Schema::string();
        assert!(!a.same_node(&b));
    }

    #[test]
    fn combinators_create_new_nodes() {
        let base = Schema::string();
        let opt = base.optional();
        assert!(!opt.same_node(&base));
        assert!(opt.inner().unwrap().same_node(&base));
    }

    #[test]
    fn wrappers_carry_description() {
        let base = Schema::string().describe("a name");
        assert_eq!(base.optional().description(), Some("a name"));
        assert_eq!(base.nullable().description(), Some("a name"));
        assert_eq!(base.array().description(), None);
    }

    #[test]
    fn optional_and_nullable_queries() {
        let s = Schema::string();
        assert!(!s.is_optional());
        assert!(!s.is_nullable());
        assert!(s.optional().is_optional());
        assert!(!s.optional().is_nullable());
        assert!(s.nullable().is_nullable());
        assert!(s.nullable().optional().is_nullable());
        assert!(s.optional().nullable().is_optional());
        assert!(s.default_value(json!("x")).is_optional());
        assert!(Schema::any().is_optional() && Schema::any().is_nullable());
    }

    #[test]
    fn string_checks_only_apply_to_strings() {
        let uuid = Schema::string().uuid();
        assert!(matches!(uuid.kind(), SchemaKind::String(c) if c == &[StringCheck::Uuid]));

        let num = Schema::number();
        assert!(num.uuid().same_node(&num));
    }

    #[test]
    fn name_only_enum_rebuilds_mapping() {
        let e = Schema::enumeration(["A", "B"]);
        let first = e.enum_members().unwrap();
        let second = e.enum_members().unwrap();
        assert_eq!(first, second);
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn native_enum_keeps_mapping() {
        let mut mapping = EnumMapping::new();
        mapping.insert("On".into(), EnumValue::Number(1));
        let e = Schema::native_enum(mapping);
        assert!(Rc::ptr_eq(
            &e.enum_members().unwrap(),
            &e.enum_members().unwrap()
        ));
    }

    #[test]
    fn object_preserves_member_order() {
        let obj = Schema::object([
            ("z", Schema::string()),
            ("a", Schema::number()),
            ("m", Schema::boolean()),
        ]);
        let keys: Vec<_> = obj.shape().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
