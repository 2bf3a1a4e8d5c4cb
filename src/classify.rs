//! Node classification - maps one schema node to a [`TypeDescriptor`].
//!
//! Classification only reads the registry. Nested objects, name-only enums and unions must be
//! registered before a node referencing them is classified.

use std::rc::Rc;

use crate::error::GenerateError;
use crate::registry::Registry;
use crate::schema::{Literal, NumberCheck, Schema, SchemaKind, StringCheck};
use crate::types::{Category, Scalar, TargetType, TypeDescriptor};

/// Classify `node`, the member assigned to `key`, for the given category.
///
/// Wrapper nodes are unwrapped recursively:
///
/// | Node | Result |
/// |------|--------|
/// | array | element's target wrapped in a list; element flags become item flags |
/// | optional | inner result with `is_optional` forced |
/// | nullable | inner result with `is_nullable` forced |
/// | default / transform | inner result unchanged |
///
/// # Errors
///
/// Returns `GenerateError` when the node (or a node it wraps) cannot be classified or references
/// a declaration that has not been registered.
pub fn classify(
    registry: &Registry,
    key: &str,
    node: &Schema,
    category: Category,
) -> Result<TypeDescriptor, GenerateError> {
    let description = node.description().map(String::from);

    let descriptor = match node.kind() {
        SchemaKind::Array(element) => {
            let item = classify(registry, key, element, category)?;
            TypeDescriptor {
                target: TargetType::list(item.target),
                is_optional: node.is_optional(),
                is_nullable: node.is_nullable(),
                is_enum: item.is_enum,
                is_composite: false,
                is_array: true,
                item_is_optional: item.is_optional,
                item_is_nullable: item.is_nullable,
                description,
            }
        }

        SchemaKind::Boolean => TypeDescriptor::leaf(TargetType::Scalar(Scalar::Boolean), node),

        SchemaKind::String(checks) => {
            let scalar = if checks.contains(&StringCheck::Uuid) {
                Scalar::Uuid
            } else {
                Scalar::String
            };
            TypeDescriptor::leaf(TargetType::Scalar(scalar), node)
        }

        SchemaKind::Number(checks) => {
            let scalar = if checks.iter().any(|c| matches!(c, NumberCheck::Int)) {
                Scalar::Int
            } else {
                Scalar::Float
            };
            TypeDescriptor::leaf(TargetType::Scalar(scalar), node)
        }

        SchemaKind::Date => TypeDescriptor::leaf(TargetType::Scalar(Scalar::DateTime), node),

        SchemaKind::BigInt => TypeDescriptor::leaf(TargetType::Scalar(Scalar::BigInt), node),

        SchemaKind::Any | SchemaKind::Unknown => {
            TypeDescriptor::leaf(TargetType::Scalar(Scalar::Json), node)
        }

        SchemaKind::Record(_) => {
            TypeDescriptor::leaf(TargetType::Scalar(Scalar::JsonObject), node)
        }

        SchemaKind::Optional(inner) => {
            let inner = classify(registry, key, inner, category)?;
            TypeDescriptor {
                is_optional: true,
                is_nullable: node.is_nullable(),
                description,
                ..inner
            }
        }

        SchemaKind::Nullable(inner) => {
            let inner = classify(registry, key, inner, category)?;
            TypeDescriptor {
                is_nullable: true,
                description,
                ..inner
            }
        }

        SchemaKind::Default { inner, .. } | SchemaKind::Transform(inner) => {
            classify(registry, key, inner, category)?
        }

        SchemaKind::Object(_) => {
            let handle = registry
                .composite(category, node)?
                .ok_or_else(|| GenerateError::UnregisteredComposite {
                    key: key.to_string(),
                })?;
            TypeDescriptor {
                is_composite: true,
                ..TypeDescriptor::leaf(TargetType::Composite(handle.clone()), node)
            }
        }

        SchemaKind::NativeEnum(members) => TypeDescriptor {
            is_enum: true,
            ..TypeDescriptor::leaf(TargetType::Enum(Rc::clone(members)), node)
        },

        SchemaKind::Enum(_) => {
            let members = registry
                .enum_members(node)
                .ok_or_else(|| GenerateError::UnregisteredEnum {
                    key: key.to_string(),
                })?;
            TypeDescriptor {
                is_enum: true,
                ..TypeDescriptor::leaf(TargetType::Enum(Rc::clone(members)), node)
            }
        }

        SchemaKind::Literal(value) => {
            let scalar = literal_scalar(value).ok_or_else(|| GenerateError::UnclassifiableNode {
                key: key.to_string(),
                kind: "null literal",
            })?;
            TypeDescriptor::leaf(TargetType::Scalar(scalar), node)
        }

        SchemaKind::Union(_) | SchemaKind::DiscriminatedUnion { .. } => {
            let handle = registry
                .union(node)
                .ok_or_else(|| GenerateError::UnregisteredUnion {
                    key: key.to_string(),
                })?;
            TypeDescriptor::leaf(TargetType::Union(handle.clone()), node)
        }

        SchemaKind::Tuple(_) | SchemaKind::Null | SchemaKind::Never => {
            return Err(GenerateError::UnclassifiableNode {
                key: key.to_string(),
                kind: node.kind().name(),
            });
        }
    };

    tracing::trace!(key, kind = node.kind().name(), %category, "classified node");
    Ok(descriptor)
}

/// GraphQL has no literal types; literals widen to the nearest scalar.
fn literal_scalar(value: &Literal) -> Option<Scalar> {
    match value {
        Literal::Bool(_) => Some(Scalar::Boolean),
        Literal::BigInt(_) => Some(Scalar::BigInt),
        Literal::Number(_) => Some(Scalar::Float),
        Literal::String(_) => Some(Scalar::String),
        Literal::Null => None,
    }
}
