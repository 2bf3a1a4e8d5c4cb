//! SDL builder - records declarations and renders them as GraphQL SDL.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::builder::SchemaBuilder;
use crate::error::RenderError;
use crate::schema::{EnumMapping, EnumMembers, EnumValue};
use crate::types::{
    Category, EnumMetadata, FieldDescriptor, Nullability, Scalar, TargetType, TypeHandle,
    UnionHandle,
};

/// SDL name of fields generated from a non-object root (their key is empty).
pub const UNNAMED_FIELD: &str = "value";

#[derive(Debug)]
enum Declaration {
    Type(TypeHandle),
    Enum(EnumMembers, EnumMetadata),
    Union(UnionHandle),
}

/// Records declarations in the order they are made.
#[derive(Debug, Default)]
pub struct SdlBuilder {
    declarations: Vec<Declaration>,
    fields: Vec<(TypeHandle, FieldDescriptor)>,
}

impl SchemaBuilder for SdlBuilder {
    fn declare_type(&mut self, handle: &TypeHandle) {
        self.declarations.push(Declaration::Type(handle.clone()));
    }

    fn discard_type(&mut self, handle: &TypeHandle) {
        self.declarations
            .retain(|d| !matches!(d, Declaration::Type(h) if h == handle));
        self.fields.retain(|(owner, _)| owner != handle);
    }

    fn declare_field(&mut self, owner: &TypeHandle, field: &FieldDescriptor) {
        self.fields.push((owner.clone(), field.clone()));
    }

    fn declare_enum(&mut self, members: &EnumMembers, metadata: &EnumMetadata) {
        self.declarations
            .push(Declaration::Enum(Rc::clone(members), metadata.clone()));
    }

    fn declare_union(&mut self, union: &UnionHandle) {
        self.declarations.push(Declaration::Union(union.clone()));
    }
}

impl SdlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared Object and Input types in declaration order.
    pub fn types(&self) -> Vec<TypeHandle> {
        self.declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Type(h) => Some(h.clone()),
                _ => None,
            })
            .collect()
    }

    /// Declared enums with their metadata.
    pub fn enums(&self) -> Vec<(&EnumMembers, &EnumMetadata)> {
        self.declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Enum(m, meta) => Some((m, meta)),
                _ => None,
            })
            .collect()
    }

    pub fn unions(&self) -> Vec<&UnionHandle> {
        self.declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Union(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    /// Every declared field with its owner.
    pub fn fields(&self) -> &[(TypeHandle, FieldDescriptor)] {
        &self.fields
    }

    pub fn fields_of(&self, owner: &TypeHandle) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|(h, _)| h == owner)
            .map(|(_, f)| f)
            .collect()
    }

    /// Render every declaration as SDL.
    ///
    /// Custom scalars used by any field are declared first, then types, enums and unions in
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if two declarations share a name, a type has no fields, a field
    /// references an enum, type or union that was never declared, or an enum default matches
    /// none of the enum's values.
    pub fn render(&self) -> Result<String, RenderError> {
        self.check_declarations()?;

        let mut out = String::new();
        let scalars: BTreeSet<&'static str> = self
            .fields
            .iter()
            .filter_map(|(_, f)| match f.target.named() {
                TargetType::Scalar(s) if s.is_custom() => Some(s.graphql_name()),
                _ => None,
            })
            .collect();
        for scalar in &scalars {
            let _ = writeln!(out, "scalar {}\n", scalar);
        }

        for declaration in &self.declarations {
            match declaration {
                Declaration::Type(handle) => self.render_type(&mut out, handle)?,
                Declaration::Enum(members, metadata) => render_enum(&mut out, members, metadata),
                Declaration::Union(union) => self.render_union(&mut out, union)?,
            }
            out.push('\n');
        }

        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
        Ok(out)
    }

    /// Serializable summary of every declaration.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` under the same conditions as [`SdlBuilder::render`].
    pub fn summary(&self) -> Result<Summary, RenderError> {
        self.check_declarations()?;

        let mut summary = Summary::default();
        for declaration in &self.declarations {
            match declaration {
                Declaration::Type(handle) => {
                    let fields = self
                        .fields_of(handle)
                        .into_iter()
                        .map(|f| {
                            Ok(FieldSummary {
                                name: field_name(f).to_string(),
                                type_ref: self.type_expr(handle, f)?,
                                nullable: f.nullable,
                                default_value: f.default_value.clone(),
                                description: f.description.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>, RenderError>>()?;
                    summary.types.push(TypeSummary {
                        name: handle.name().to_string(),
                        category: handle.category(),
                        description: handle.description().map(String::from),
                        fields,
                    });
                }
                Declaration::Enum(members, metadata) => summary.enums.push(EnumSummary {
                    name: metadata.name.clone(),
                    description: metadata.description.clone(),
                    members: (**members).clone(),
                }),
                Declaration::Union(union) => summary.unions.push(UnionSummary {
                    name: union.name().to_string(),
                    description: union.description().map(String::from),
                    branches: union.branches().iter().map(|b| b.name().to_string()).collect(),
                }),
            }
        }
        Ok(summary)
    }

    fn check_declarations(&self) -> Result<(), RenderError> {
        let mut seen = HashSet::new();
        for declaration in &self.declarations {
            let name = match declaration {
                Declaration::Type(h) => h.name(),
                Declaration::Enum(_, meta) => meta.name.as_str(),
                Declaration::Union(u) => u.name(),
            };
            if !seen.insert(name) {
                return Err(RenderError::DuplicateTypeName {
                    name: name.to_string(),
                });
            }
        }
        // GraphQL requires at least one field per Object and Input type.
        for handle in self.types() {
            if !self.fields.iter().any(|(owner, _)| *owner == handle) {
                return Err(RenderError::EmptyType {
                    name: handle.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn render_type(&self, out: &mut String, handle: &TypeHandle) -> Result<(), RenderError> {
        write_description(out, handle.description(), "");
        let keyword = match handle.category() {
            Category::Input => "input",
            _ => "type",
        };
        let _ = writeln!(out, "{} {} {{", keyword, handle.name());

        for field in self.fields_of(handle) {
            write_description(out, field.description.as_deref(), "  ");
            let _ = write!(out, "  {}: {}", field_name(field), self.type_expr(handle, field)?);
            if handle.category() == Category::Input {
                if let Some(default) = &field.default_value {
                    let literal = value_literal(default, &field.target).ok_or_else(|| {
                        RenderError::UnknownEnumDefault {
                            owner: handle.name().to_string(),
                            field: field.key.clone(),
                        }
                    })?;
                    let _ = write!(out, " = {}", literal);
                }
            }
            out.push('\n');
        }

        out.push_str("}\n");
        Ok(())
    }

    fn render_union(&self, out: &mut String, union: &UnionHandle) -> Result<(), RenderError> {
        write_description(out, union.description(), "");
        let branches: Vec<&str> = union.branches().iter().map(TypeHandle::name).collect();
        let _ = writeln!(out, "union {} = {}", union.name(), branches.join(" | "));
        Ok(())
    }

    fn type_expr(&self, owner: &TypeHandle, field: &FieldDescriptor) -> Result<String, RenderError> {
        let (list_nullable, item_nullable) = match field.nullable {
            Nullability::NonNull => (false, false),
            Nullability::Nullable => (true, false),
            Nullability::Items => (false, true),
            Nullability::ItemsAndList => (true, true),
        };
        self.wrap_type(owner, field, &field.target, list_nullable, item_nullable)
    }

    fn wrap_type(
        &self,
        owner: &TypeHandle,
        field: &FieldDescriptor,
        target: &TargetType,
        nullable: bool,
        item_nullable: bool,
    ) -> Result<String, RenderError> {
        let bang = if nullable { "" } else { "!" };
        let inner = match target {
            TargetType::List(item) => format!(
                "[{}]",
                self.wrap_type(owner, field, item, item_nullable, item_nullable)?
            ),
            other => self.type_name(owner, field, other)?,
        };
        Ok(format!("{}{}", inner, bang))
    }

    fn type_name(
        &self,
        owner: &TypeHandle,
        field: &FieldDescriptor,
        target: &TargetType,
    ) -> Result<String, RenderError> {
        let undeclared = || RenderError::UndeclaredType {
            owner: owner.name().to_string(),
            field: field.key.clone(),
        };

        match target {
            TargetType::Scalar(s) => Ok(s.graphql_name().to_string()),
            TargetType::Composite(h) => self
                .declarations
                .iter()
                .any(|d| matches!(d, Declaration::Type(t) if t == h))
                .then(|| h.name().to_string())
                .ok_or_else(undeclared),
            TargetType::Union(u) => self
                .declarations
                .iter()
                .any(|d| matches!(d, Declaration::Union(x) if x == u))
                .then(|| u.name().to_string())
                .ok_or_else(undeclared),
            // The framework matches enums by the identity of their member mapping.
            TargetType::Enum(members) => self
                .enums()
                .into_iter()
                .find(|(m, _)| Rc::ptr_eq(m, members))
                .map(|(_, meta)| meta.name.clone())
                .ok_or_else(|| RenderError::UnregisteredEnum {
                    owner: owner.name().to_string(),
                    field: field.key.clone(),
                }),
            TargetType::List(item) => self.type_name(owner, field, item),
        }
    }
}

fn field_name(field: &FieldDescriptor) -> &str {
    if field.key.is_empty() {
        UNNAMED_FIELD
    } else {
        &field.key
    }
}

fn render_enum(out: &mut String, members: &EnumMapping, metadata: &EnumMetadata) {
    write_description(out, metadata.description.as_deref(), "");
    let _ = writeln!(out, "enum {} {{", metadata.name);
    for name in members.keys() {
        let options = metadata.values_map.as_ref().and_then(|m| m.get(name));
        write_description(
            out,
            options.and_then(|o| o.description.as_deref()),
            "  ",
        );
        let _ = write!(out, "  {}", name);
        if let Some(reason) = options.and_then(|o| o.deprecation_reason.as_deref()) {
            let _ = write!(out, " @deprecated(reason: {})", Value::from(reason));
        }
        out.push('\n');
    }
    out.push_str("}\n");
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) {
    if let Some(text) = description {
        let _ = writeln!(
            out,
            "{}\"\"\"{}\"\"\"",
            indent,
            text.replace("\"\"\"", "\\\"\"\"")
        );
    }
}

/// GraphQL literal for a default value. Values on enum fields become the name of the member
/// holding them; `None` if no member does.
fn value_literal(value: &Value, target: &TargetType) -> Option<String> {
    match (value, target.named()) {
        (Value::Array(items), _) => {
            let item_target = match target {
                TargetType::List(item) => item.as_ref(),
                other => other,
            };
            let items = items
                .iter()
                .map(|v| value_literal(v, item_target))
                .collect::<Option<Vec<_>>>()?;
            Some(format!("[{}]", items.join(", ")))
        }
        (_, TargetType::Enum(members)) => enum_member_name(members, value).map(String::from),
        (Value::Object(map), _) => {
            let entries = map
                .iter()
                .map(|(k, v)| {
                    value_literal(v, &TargetType::Scalar(Scalar::Json))
                        .map(|literal| format!("{}: {}", k, literal))
                })
                .collect::<Option<Vec<_>>>()?;
            Some(format!("{{{}}}", entries.join(", ")))
        }
        (other, _) => Some(other.to_string()),
    }
}

fn enum_member_name<'a>(members: &'a EnumMapping, value: &Value) -> Option<&'a str> {
    members
        .iter()
        .find(|(_, v)| match (v, value) {
            (EnumValue::String(s), Value::String(given)) => s == given,
            (EnumValue::Number(n), Value::Number(given)) => given.as_i64() == Some(*n),
            _ => false,
        })
        .map(|(name, _)| name.as_str())
}

/// Serializable view of recorded declarations.
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub types: Vec<TypeSummary>,
    pub enums: Vec<EnumSummary>,
    pub unions: Vec<UnionSummary>,
}

#[derive(Debug, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: String,
    pub nullable: Nullability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnumSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: EnumMapping,
}

#[derive(Debug, Serialize)]
pub struct UnionSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub branches: Vec<String>,
}
