//! Shape parsing - one field descriptor per object member.

use serde_json::Value;

use crate::classify::classify;
use crate::error::GenerateError;
use crate::registry::Registry;
use crate::schema::{Schema, SchemaKind};
use crate::types::{Category, FieldDescriptor, Nullability, TypeDescriptor};

/// Parse the fields of `node`.
///
/// Object nodes yield one field per member in member order. Any other node yields a single field
/// with an empty key.
///
/// # Errors
///
/// Returns the first classification error encountered.
pub fn parse_shape(
    registry: &Registry,
    node: &Schema,
    category: Category,
) -> Result<Vec<FieldDescriptor>, GenerateError> {
    match node.shape() {
        Some(shape) => shape
            .iter()
            .map(|(key, member)| parse_field(registry, key, member, category))
            .collect(),
        None => Ok(vec![parse_field(registry, "", node, category)?]),
    }
}

/// Resolve the nullability mode of a classified field.
///
/// Base nullability is `is_nullable || is_optional`. Arrays whose items may be absent upgrade to
/// `Items` (list required) or `ItemsAndList`.
pub fn determine_nullability(descriptor: &TypeDescriptor) -> Nullability {
    let nullable = descriptor.is_nullable || descriptor.is_optional;

    if descriptor.is_array && (descriptor.item_is_nullable || descriptor.item_is_optional) {
        if nullable {
            Nullability::ItemsAndList
        } else {
            Nullability::Items
        }
    } else {
        Nullability::from(nullable)
    }
}

/// Default value captured by a default wrapper at the top of `node`.
pub fn default_value(node: &Schema) -> Option<Value> {
    match node.kind() {
        SchemaKind::Default { value, .. } => Some(value()),
        _ => None,
    }
}

fn parse_field(
    registry: &Registry,
    key: &str,
    member: &Schema,
    category: Category,
) -> Result<FieldDescriptor, GenerateError> {
    // A replacement changes the declared type only; the default still comes from the original.
    let declared = registry.replacement(category, member).unwrap_or(member);
    let descriptor = classify(registry, key, declared, category)?;

    let nullable = determine_nullability(&descriptor);
    let default_value = if descriptor.is_composite || nullable == Nullability::Items {
        None
    } else {
        default_value(member)
    };

    Ok(FieldDescriptor {
        key: key.to_string(),
        target: descriptor.target,
        nullable,
        default_value,
        description: descriptor.description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Scalar, TargetType};
    use serde_json::json;

    fn parse(node: &Schema) -> Vec<FieldDescriptor> {
        parse_shape(&Registry::new(), node, Category::Object).unwrap()
    }

    #[test]
    fn fields_follow_member_order() {
        let node = Schema::object([
            ("b", Schema::string()),
            ("a", Schema::boolean()),
            ("c", Schema::number()),
        ]);
        let keys: Vec<_> = parse(&node).into_iter().map(|f| f.key).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn non_object_root_yields_single_unnamed_field() {
        let fields = parse(&Schema::string().uuid());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "");
        assert_eq!(fields[0].target, TargetType::Scalar(Scalar::Uuid));
    }

    #[test]
    fn optional_only_is_plain_nullable() {
        let fields = parse(&Schema::object([("name", Schema::string().optional())]));
        assert_eq!(fields[0].nullable, Nullability::Nullable);
    }

    #[test]
    fn required_list_of_optional_items() {
        let node = Schema::object([(
            "tags",
            Schema::string()
                .optional()
                .array()
                .default_value(json!(["a"])),
        )]);
        let fields = parse(&node);
        assert_eq!(fields[0].nullable, Nullability::Items);
        assert_eq!(fields[0].default_value, None);
    }

    #[test]
    fn optional_list_of_nullable_items() {
        let node = Schema::object([("tags", Schema::string().nullable().array().optional())]);
        assert_eq!(parse(&node)[0].nullable, Nullability::ItemsAndList);
    }

    #[test]
    fn defaults_are_captured() {
        let node = Schema::object([
            ("count", Schema::number().int().default_value(json!(10))),
            ("name", Schema::string()),
        ]);
        let fields = parse(&node);
        assert_eq!(fields[0].default_value, Some(json!(10)));
        assert_eq!(fields[1].default_value, None);
    }

    #[test]
    fn default_producer_runs_per_parse() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let node = Schema::object([(
            "n",
            Schema::number().default_with(move || {
                counter.set(counter.get() + 1);
                json!(counter.get())
            }),
        )]);

        assert_eq!(parse(&node)[0].default_value, Some(json!(1)));
        assert_eq!(parse(&node)[0].default_value, Some(json!(2)));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn optional_wrapper_hides_default() {
        let node = Schema::object([(
            "n",
            Schema::number().default_value(json!(1)).optional(),
        )]);
        assert_eq!(parse(&node)[0].default_value, None);
    }

    #[test]
    fn replacement_changes_type_but_keeps_default() {
        let original = Schema::string().default_value(json!("guest"));
        let node = Schema::object([("name", original.clone())]);

        let mut registry = Registry::new();
        registry
            .set_replacement(
                Category::Object,
                &original,
                Schema::any().default_value(json!("other")),
            )
            .unwrap();

        let fields = parse_shape(&registry, &node, Category::Object).unwrap();
        assert_eq!(fields[0].target, TargetType::Scalar(Scalar::Json));
        assert_eq!(fields[0].default_value, Some(json!("guest")));
    }

    #[test]
    fn replacement_is_per_category() {
        let original = Schema::string();
        let node = Schema::object([("name", original.clone())]);

        let mut registry = Registry::new();
        registry
            .set_replacement(Category::Input, &original, Schema::boolean())
            .unwrap();

        let object = parse_shape(&registry, &node, Category::Object).unwrap();
        let input = parse_shape(&registry, &node, Category::Input).unwrap();
        assert_eq!(object[0].target, TargetType::Scalar(Scalar::String));
        assert_eq!(input[0].target, TargetType::Scalar(Scalar::Boolean));
    }

    #[test]
    fn classification_error_propagates() {
        let node = Schema::object([
            ("ok", Schema::string()),
            ("bad", Schema::tuple(vec![])),
        ]);
        let err = parse_shape(&Registry::new(), &node, Category::Object).unwrap_err();
        assert!(matches!(err, GenerateError::UnclassifiableNode { key, .. } if key == "bad"));
    }

    #[test]
    fn nullability_table() {
        let base = TypeDescriptor::leaf(TargetType::Scalar(Scalar::String), &Schema::string());
        assert_eq!(determine_nullability(&base), Nullability::NonNull);

        let nullable = TypeDescriptor {
            is_nullable: true,
            ..base.clone()
        };
        assert_eq!(determine_nullability(&nullable), Nullability::Nullable);

        // Item flags only matter for arrays.
        let not_array = TypeDescriptor {
            item_is_nullable: true,
            ..base.clone()
        };
        assert_eq!(determine_nullability(&not_array), Nullability::NonNull);

        let items = TypeDescriptor {
            is_array: true,
            item_is_nullable: true,
            ..base.clone()
        };
        assert_eq!(determine_nullability(&items), Nullability::Items);

        let both = TypeDescriptor {
            is_optional: true,
            ..items
        };
        assert_eq!(determine_nullability(&both), Nullability::ItemsAndList);
    }
}
