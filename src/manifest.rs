//! Declarative manifests describing schema nodes and the registrations to run on them.
//!
//! A manifest has named `definitions` and an ordered list of `registrations`. A `{"$ref": name}`
//! node resolves to the definition's node, and every reference to the same name shares one node,
//! so a definition registered as an object is recognised wherever it is nested.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::SchemaBuilder;
use crate::error::ManifestError;
use crate::generator::TypeFactory;
use crate::loader::{load_document_auto, load_document_str};
use crate::schema::{EnumMapping, Literal, NumberCheck, Schema, StringCheck};
use crate::sdl::SdlBuilder;
use crate::types::{EnumMetadata, EnumValuesMap, RegistrationOptions, TypeMetadata};
use crate::validator::validate_document;

/// Parsed manifest document.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub definitions: IndexMap<String, NodeSpec>,
    pub registrations: Vec<RegistrationSpec>,
}

/// One registration, run in manifest order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RegistrationSpec {
    Object(CompositeSpec),
    Input(CompositeSpec),
    Enum(EnumSpec),
    Union(UnionSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSpec {
    pub name: String,
    pub description: Option<String>,
    pub schema: NodeSpec,
    #[serde(default)]
    pub replacements: Vec<ReplacementSpec>,
    #[serde(default)]
    pub register_first: Vec<AdditionalSpec>,
}

/// Member of the registered object whose shape is taken from `with`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplacementSpec {
    pub field: String,
    pub with: NodeSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdditionalSpec {
    pub name: String,
    pub description: Option<String>,
    pub schema: NodeSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumSpec {
    pub name: String,
    pub description: Option<String>,
    pub schema: NodeSpec,
    pub values_map: Option<EnumValuesMap>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnionSpec {
    pub name: String,
    pub description: Option<String>,
    pub schema: NodeSpec,
}

/// Node variant named by a node's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    String,
    Number,
    Boolean,
    Date,
    #[serde(rename = "bigint")]
    BigInt,
    Any,
    Unknown,
    Record,
    Literal,
    Enum,
    NativeEnum,
    Union,
    DiscriminatedUnion,
    Object,
    Array,
    Tuple,
    Null,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    Uuid,
    Email,
    Url,
}

impl From<StringFormat> for StringCheck {
    fn from(format: StringFormat) -> Self {
        match format {
            StringFormat::Uuid => StringCheck::Uuid,
            StringFormat::Email => StringCheck::Email,
            StringFormat::Url => StringCheck::Url,
        }
    }
}

/// Description of one schema node.
///
/// Modifiers wrap the node in a fixed order: `transform`, then `nullable`, then `optional`, then
/// `default`, so a default is always the outermost wrapper. A `description` applies to the node
/// before wrapping, and the wrappers keep it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<NodeType>,
    pub description: Option<String>,
    pub format: Option<StringFormat>,
    #[serde(default)]
    pub int: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub properties: Option<IndexMap<String, NodeSpec>>,
    pub items: Option<Box<NodeSpec>>,
    #[serde(default)]
    pub values: Vec<String>,
    pub members: Option<EnumMapping>,
    #[serde(default)]
    pub options: Vec<NodeSpec>,
    #[serde(default)]
    pub elements: Vec<NodeSpec>,
    pub discriminator: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub transform: bool,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only an absent key is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Kind of a completed registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationKind {
    Object,
    Input,
    Enum,
    Union,
}

/// Record of a registration that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    pub kind: RegistrationKind,
    pub name: String,
}

impl Manifest {
    /// Validate a parsed document and deserialize it.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Invalid` if the document breaks the manifest schema.
    pub fn from_document(document: Value) -> Result<Self, ManifestError> {
        validate_document(&document)?;
        serde_json::from_value(document).map_err(|source| ManifestError::InvalidJson { source })
    }

    /// Run every registration against `factory`, in order.
    ///
    /// Stops at the first failure; registrations that already ran stay in the factory.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` for bad references or nodes, unknown replacement fields, and
    /// registration failures (wrapped with the registration's name).
    pub fn apply<B: SchemaBuilder>(
        &self,
        factory: &mut TypeFactory<B>,
    ) -> Result<Vec<Registered>, ManifestError> {
        let mut resolver = NodeResolver::new(&self.definitions);
        let mut done = Vec::with_capacity(self.registrations.len());

        for (index, registration) in self.registrations.iter().enumerate() {
            let path = format!("/registrations/{index}");
            let registered = match registration {
                RegistrationSpec::Object(spec) => {
                    apply_composite(&mut resolver, factory, spec, &path, RegistrationKind::Object)?
                }
                RegistrationSpec::Input(spec) => {
                    apply_composite(&mut resolver, factory, spec, &path, RegistrationKind::Input)?
                }
                RegistrationSpec::Enum(spec) => {
                    let node = resolver.build(&spec.schema, &format!("{path}/schema"))?;
                    let mut metadata = EnumMetadata::new(&spec.name);
                    metadata.description = spec.description.clone();
                    metadata.values_map = spec.values_map.clone();
                    factory
                        .register_enum_type(&node, metadata)
                        .map_err(|source| ManifestError::Generate {
                            name: spec.name.clone(),
                            source,
                        })?;
                    Registered {
                        kind: RegistrationKind::Enum,
                        name: spec.name.clone(),
                    }
                }
                RegistrationSpec::Union(spec) => {
                    let node = resolver.build(&spec.schema, &format!("{path}/schema"))?;
                    factory
                        .register_union_type(
                            &node,
                            type_metadata(&spec.name, spec.description.as_deref()),
                            None,
                        )
                        .map_err(|source| ManifestError::Generate {
                            name: spec.name.clone(),
                            source,
                        })?;
                    Registered {
                        kind: RegistrationKind::Union,
                        name: spec.name.clone(),
                    }
                }
            };
            tracing::debug!(kind = ?registered.kind, name = %registered.name, "applied registration");
            done.push(registered);
        }

        Ok(done)
    }

    /// Apply the manifest to a fresh [`SdlBuilder`].
    ///
    /// # Errors
    ///
    /// Same as [`Manifest::apply`].
    pub fn to_sdl_builder(&self) -> Result<SdlBuilder, ManifestError> {
        let mut factory = TypeFactory::new(SdlBuilder::new());
        self.apply(&mut factory)?;
        Ok(factory.into_builder())
    }
}

/// Load, validate and parse a manifest from a file path or URL.
///
/// # Errors
///
/// Returns IO, network, JSON or validation errors.
pub fn load_manifest(source: &str) -> Result<Manifest, ManifestError> {
    Manifest::from_document(load_document_auto(source)?)
}

/// Load, validate and parse a manifest from a JSON string.
///
/// # Errors
///
/// Returns JSON or validation errors.
pub fn load_manifest_str(content: &str) -> Result<Manifest, ManifestError> {
    Manifest::from_document(load_document_str(content)?)
}

fn type_metadata(name: &str, description: Option<&str>) -> TypeMetadata {
    let metadata = TypeMetadata::new(name);
    match description {
        Some(description) => metadata.description(description),
        None => metadata,
    }
}

fn apply_composite<B: SchemaBuilder>(
    resolver: &mut NodeResolver<'_>,
    factory: &mut TypeFactory<B>,
    spec: &CompositeSpec,
    path: &str,
    kind: RegistrationKind,
) -> Result<Registered, ManifestError> {
    let root = resolver.build(&spec.schema, &format!("{path}/schema"))?;
    let mut options = RegistrationOptions::new();

    for (i, extra) in spec.register_first.iter().enumerate() {
        let schema = resolver.build(&extra.schema, &format!("{path}/registerFirst/{i}/schema"))?;
        let description = extra.description.as_deref().or(schema.description());
        let metadata = type_metadata(&extra.name, description);
        options = options.register_first(schema, metadata);
    }

    for (i, replacement) in spec.replacements.iter().enumerate() {
        let origin = root
            .shape()
            .and_then(|shape| shape.get(&replacement.field))
            .cloned()
            .ok_or_else(|| ManifestError::UnknownField {
                owner: spec.name.clone(),
                field: replacement.field.clone(),
            })?;
        let with = resolver.build(&replacement.with, &format!("{path}/replacements/{i}/with"))?;
        options = options.replace(origin, with);
    }

    // Without an explicit description the root node's own description is used.
    let description = spec.description.as_deref().or(root.description());
    let metadata = type_metadata(&spec.name, description);
    let result = match kind {
        RegistrationKind::Input => factory.register_input_type(&root, metadata, options),
        _ => factory.register_object_type(&root, metadata, options),
    };
    result.map_err(|source| ManifestError::Generate {
        name: spec.name.clone(),
        source,
    })?;

    Ok(Registered {
        kind,
        name: spec.name.clone(),
    })
}

/// Builds schema nodes from specs, memoizing definitions by name.
struct NodeResolver<'a> {
    definitions: &'a IndexMap<String, NodeSpec>,
    resolved: HashMap<String, Schema>,
    resolving: HashSet<String>,
}

impl<'a> NodeResolver<'a> {
    fn new(definitions: &'a IndexMap<String, NodeSpec>) -> Self {
        Self {
            definitions,
            resolved: HashMap::new(),
            resolving: HashSet::new(),
        }
    }

    fn resolve(&mut self, name: &str, path: &str) -> Result<Schema, ManifestError> {
        if let Some(node) = self.resolved.get(name) {
            return Ok(node.clone());
        }

        let definitions = self.definitions;
        let spec = definitions
            .get(name)
            .ok_or_else(|| ManifestError::UnknownReference {
                name: name.to_string(),
                path: path.to_string(),
            })?;

        if !self.resolving.insert(name.to_string()) {
            return Err(ManifestError::CyclicReference {
                name: name.to_string(),
            });
        }
        let built = self.build(spec, &format!("/definitions/{name}"));
        self.resolving.remove(name);

        let node = built?;
        self.resolved.insert(name.to_string(), node.clone());
        Ok(node)
    }

    fn build(&mut self, spec: &NodeSpec, path: &str) -> Result<Schema, ManifestError> {
        let base = match (&spec.reference, spec.kind) {
            (Some(_), Some(_)) => {
                return Err(invalid(path, "\"$ref\" cannot be combined with \"type\""))
            }
            (Some(name), None) => self.resolve(name, path)?,
            (None, Some(kind)) => self.build_kind(kind, spec, path)?,
            (None, None) => return Err(invalid(path, "node needs \"type\" or \"$ref\"")),
        };

        let mut node = match &spec.description {
            Some(description) => base.describe(description.clone()),
            None => base,
        };
        if spec.transform {
            node = node.transform();
        }
        if spec.nullable {
            node = node.nullable();
        }
        if spec.optional {
            node = node.optional();
        }
        if let Some(value) = &spec.default {
            node = node.default_value(value.clone());
        }
        Ok(node)
    }

    fn build_all(&mut self, specs: &[NodeSpec], path: &str) -> Result<Vec<Schema>, ManifestError> {
        specs
            .iter()
            .enumerate()
            .map(|(i, spec)| self.build(spec, &format!("{path}/{i}")))
            .collect()
    }

    fn build_kind(
        &mut self,
        kind: NodeType,
        spec: &NodeSpec,
        path: &str,
    ) -> Result<Schema, ManifestError> {
        let node = match kind {
            NodeType::String => match spec.format {
                Some(format) => Schema::string().check_string(format.into()),
                None => Schema::string(),
            },
            NodeType::Number => {
                let mut node = Schema::number();
                if spec.int {
                    node = node.int();
                }
                if let Some(min) = spec.minimum {
                    node = node.check_number(NumberCheck::Min(min));
                }
                if let Some(max) = spec.maximum {
                    node = node.check_number(NumberCheck::Max(max));
                }
                node
            }
            NodeType::Boolean => Schema::boolean(),
            NodeType::Date => Schema::date(),
            NodeType::BigInt => Schema::bigint(),
            NodeType::Any => Schema::any(),
            NodeType::Unknown => Schema::unknown(),
            NodeType::Null => Schema::null(),
            NodeType::Never => Schema::never(),
            NodeType::Record => {
                let values = match &spec.items {
                    Some(items) => self.build(items, &format!("{path}/items"))?,
                    None => Schema::any(),
                };
                Schema::record(values)
            }
            NodeType::Literal => Schema::literal(literal(spec.value.as_ref(), path)?),
            NodeType::Enum => {
                if spec.values.is_empty() {
                    return Err(invalid(path, "enum needs at least one entry in \"values\""));
                }
                Schema::enumeration(spec.values.iter().cloned())
            }
            NodeType::NativeEnum => match &spec.members {
                Some(members) if !members.is_empty() => Schema::native_enum(members.clone()),
                _ => return Err(invalid(path, "nativeEnum needs \"members\"")),
            },
            NodeType::Union => {
                if spec.options.is_empty() {
                    return Err(invalid(path, "union needs at least one entry in \"options\""));
                }
                Schema::union(self.build_all(&spec.options, &format!("{path}/options"))?)
            }
            NodeType::DiscriminatedUnion => {
                let discriminator = spec
                    .discriminator
                    .clone()
                    .ok_or_else(|| invalid(path, "discriminatedUnion needs \"discriminator\""))?;
                if spec.options.is_empty() {
                    return Err(invalid(path, "discriminatedUnion needs \"options\""));
                }
                let options = self.build_all(&spec.options, &format!("{path}/options"))?;
                Schema::discriminated_union(discriminator, options)
            }
            NodeType::Object => {
                let properties = spec
                    .properties
                    .as_ref()
                    .ok_or_else(|| invalid(path, "object needs \"properties\""))?;
                let mut members = Vec::with_capacity(properties.len());
                for (key, member) in properties {
                    let member = self.build(member, &format!("{path}/properties/{key}"))?;
                    members.push((key.clone(), member));
                }
                Schema::object(members)
            }
            NodeType::Array => {
                let items = spec
                    .items
                    .as_ref()
                    .ok_or_else(|| invalid(path, "array needs \"items\""))?;
                self.build(items, &format!("{path}/items"))?.array()
            }
            NodeType::Tuple => {
                Schema::tuple(self.build_all(&spec.elements, &format!("{path}/elements"))?)
            }
        };
        Ok(node)
    }
}

fn invalid(path: &str, message: &str) -> ManifestError {
    ManifestError::InvalidNode {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn literal(value: Option<&Value>, path: &str) -> Result<Literal, ManifestError> {
    match value {
        Some(Value::Bool(b)) => Ok(Literal::Bool(*b)),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Literal::Number)
            .ok_or_else(|| invalid(path, "literal number is out of range")),
        Some(Value::String(s)) => Ok(Literal::String(s.clone())),
        Some(Value::Null) => Ok(Literal::Null),
        Some(_) => Err(invalid(path, "literal must be a boolean, number, string or null")),
        None => Err(invalid(path, "literal needs \"value\"")),
    }
}
