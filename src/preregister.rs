//! Nested-type preregistration.
//!
//! Before a root object is generated, every object reachable through its members is generated
//! first, children before parents, under a name derived from the path to it.

use crate::builder::SchemaBuilder;
use crate::error::GenerateError;
use crate::generator::TypeFactory;
use crate::schema::{Schema, SchemaKind};
use crate::types::{Category, NameGenerator, TypeMetadata};

/// Object type names concatenate parent and key: `user` + `address` is `UserAddress`.
pub fn object_type_name(parent: &str, key: &str) -> String {
    to_pascal_case(parent) + &to_pascal_case(key)
}

/// Input type names keep a single trailing `Input`: `UserInput` + `address` is
/// `UserAddressInput`.
pub fn input_type_name(parent: &str, key: &str) -> String {
    let parent = to_pascal_case(parent);
    let parent = parent.strip_suffix("Input").unwrap_or(&parent);
    format!("{}{}Input", parent, to_pascal_case(key))
}

/// Default name generator for nested types of `category`.
///
/// # Errors
///
/// Returns `GenerateError::UnsupportedCategory` for categories other than Object and Input.
pub fn default_name_generator(
    category: Category,
) -> Result<fn(&str, &str) -> String, GenerateError> {
    match category {
        Category::Object => Ok(object_type_name),
        Category::Input => Ok(input_type_name),
        _ => Err(GenerateError::UnsupportedCategory { category }),
    }
}

/// Convert `snake_case`, `kebab-case`, `camelCase` or space separated words to `PascalCase`.
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for ch in s.chars() {
        if !ch.is_alphanumeric() {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Innermost object behind array/optional/nullable/default/transform layers, in any order.
fn extract_wrapped_object(node: &Schema) -> Option<&Schema> {
    match node.kind() {
        SchemaKind::Object(_) => Some(node),
        SchemaKind::Array(element) => extract_wrapped_object(element),
        SchemaKind::Optional(inner)
        | SchemaKind::Nullable(inner)
        | SchemaKind::Default { inner, .. }
        | SchemaKind::Transform(inner) => extract_wrapped_object(inner),
        _ => None,
    }
}

impl<B: SchemaBuilder> TypeFactory<B> {
    /// Generate every object nested in `node`'s members, depth first.
    ///
    /// Objects already registered for `category` are skipped along with everything below them,
    /// so a shape reachable through several parents is generated once, under the first name.
    /// `name_generator` overrides the category's default naming.
    ///
    /// # Errors
    ///
    /// Returns the first `GenerateError` raised while generating a nested type.
    pub fn preregister(
        &mut self,
        node: &Schema,
        category: Category,
        parent_name: &str,
        name_generator: Option<&NameGenerator>,
    ) -> Result<(), GenerateError> {
        let default_generator = default_name_generator(category)?;
        let name_generator = name_generator.unwrap_or(&default_generator);

        let Some(shape) = node.shape() else {
            return Ok(());
        };

        for (key, member) in shape {
            let Some(nested) = extract_wrapped_object(member) else {
                continue;
            };

            if self.registry().composite(category, nested)?.is_some() {
                continue;
            }

            let name = name_generator(parent_name, key.as_str());
            tracing::debug!(parent = parent_name, key = key.as_str(), %name, "preregistering nested type");

            self.preregister(nested, category, &name, Some(name_generator))?;

            let mut metadata = TypeMetadata::new(name);
            metadata.description = nested.description().map(String::from);
            self.generate(nested, &metadata, category)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdl::SdlBuilder;
    use crate::types::{RegistrationOptions, TargetType};

    fn factory() -> TypeFactory<SdlBuilder> {
        TypeFactory::new(SdlBuilder::new())
    }

    fn names(f: &TypeFactory<SdlBuilder>) -> Vec<String> {
        f.builder()
            .types()
            .iter()
            .map(|h| h.name().to_string())
            .collect()
    }

    #[test]
    fn pascal_case_conversion() {
        assert_eq!(to_pascal_case("address"), "Address");
        assert_eq!(to_pascal_case("billing_address"), "BillingAddress");
        assert_eq!(to_pascal_case("shipping-info"), "ShippingInfo");
        assert_eq!(to_pascal_case("homeAddress"), "HomeAddress");
        assert_eq!(to_pascal_case("UserInput"), "UserInput");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn object_names_concatenate() {
        assert_eq!(object_type_name("User", "address"), "UserAddress");
        assert_eq!(object_type_name("user", "home_address"), "UserHomeAddress");
    }

    #[test]
    fn input_names_strip_and_append_suffix_once() {
        assert_eq!(input_type_name("UserInput", "address"), "UserAddressInput");
        assert_eq!(input_type_name("User", "address"), "UserAddressInput");
        assert_eq!(
            input_type_name("UserAddressInput", "geo"),
            "UserAddressGeoInput"
        );
    }

    #[test]
    fn default_generator_only_for_object_and_input() {
        let object = default_name_generator(Category::Object).unwrap();
        let input = default_name_generator(Category::Input).unwrap();
        assert_eq!(object("User", "address"), "UserAddress");
        assert_eq!(input("User", "address"), "UserAddressInput");

        for category in [Category::Args, Category::Interface] {
            assert!(matches!(
                default_name_generator(category),
                Err(GenerateError::UnsupportedCategory { category: c }) if c == category
            ));
        }
    }

    #[test]
    fn children_are_registered_before_parents() {
        let mut f = factory();
        let geo = Schema::object([("lat", Schema::number())]);
        let address = Schema::object([("geo", geo.clone())]);
        let user = Schema::object([("address", address.clone())]);

        f.preregister(&user, Category::Object, "User", None).unwrap();

        assert_eq!(names(&f), ["UserAddressGeo", "UserAddress"]);
        assert!(f.registry().composite(Category::Object, &user).unwrap().is_none());
    }

    #[test]
    fn unwraps_arrays_and_wrappers_in_any_order() {
        let mut f = factory();
        let a = Schema::object([("x", Schema::string())]);
        let b = Schema::object([("y", Schema::string())]);
        let c = Schema::object([("z", Schema::string())]);
        let root = Schema::object([
            ("many", a.optional().array()),
            ("maybe", b.array().optional().nullable()),
            ("fallback", c.default_value(serde_json::json!({}))),
            ("plain", Schema::string().array()),
        ]);

        f.preregister(&root, Category::Input, "RootInput", None)
            .unwrap();
        assert_eq!(
            names(&f),
            ["RootManyInput", "RootMaybeInput", "RootFallbackInput"]
        );
    }

    #[test]
    fn shared_shape_is_generated_once() {
        let mut f = factory();
        let money = Schema::object([("amount", Schema::number())]);
        let root = Schema::object([("price", money.clone()), ("tax", money.clone())]);

        f.register_object_type(&root, TypeMetadata::new("Order"), RegistrationOptions::new())
            .unwrap();

        assert_eq!(names(&f), ["OrderPrice", "Order"]);
        let order = f.builder().types()[1].clone();
        let fields = f.builder().fields_of(&order);
        assert_eq!(fields[0].target, fields[1].target);
    }

    #[test]
    fn nested_description_is_carried() {
        let mut f = factory();
        let profile = Schema::object([("bio", Schema::string())]).describe("Public profile");
        let root = Schema::object([("profile", profile)]);

        f.preregister(&root, Category::Object, "User", None).unwrap();
        assert_eq!(
            f.builder().types()[0].description(),
            Some("Public profile")
        );
    }

    #[test]
    fn custom_name_generator_is_used_throughout() {
        let mut f = factory();
        let inner = Schema::object([("v", Schema::string())]);
        let outer = Schema::object([("inner", inner)]);
        let root = Schema::object([("outer", outer)]);

        let options =
            RegistrationOptions::new().name_generator(|parent, key| format!("{}_{}", parent, key));
        f.register_object_type(&root, TypeMetadata::new("Root"), options)
            .unwrap();
        assert_eq!(names(&f), ["Root_outer_inner", "Root_outer", "Root"]);
    }

    #[test]
    fn nested_input_scenario() {
        let mut f = factory();
        let profile = Schema::object([("bio", Schema::string())]);
        let user = Schema::object([("profile", profile.clone())]);

        let handle = f
            .register_input_type(&user, TypeMetadata::new("User"), RegistrationOptions::new())
            .unwrap();

        let nested = f
            .registry()
            .composite(Category::Input, &profile)
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(nested.name(), "UserProfileInput");
        assert_eq!(
            f.builder().fields_of(&handle)[0].target,
            TargetType::Composite(nested)
        );
    }

    #[test]
    fn unsupported_category_errors() {
        let mut f = factory();
        let root = Schema::object([("a", Schema::string())]);
        assert!(matches!(
            f.preregister(&root, Category::Interface, "Root", None),
            Err(GenerateError::UnsupportedCategory { .. })
        ));
    }
}
