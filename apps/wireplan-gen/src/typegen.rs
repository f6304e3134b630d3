//! Rust type declarations generated from a sealed registry.
//!
//! - Object types become structs holding their effective properties.
//! - Closed enums become Rust enums with `as_str`; open enums gain an
//!   `Unknown(String)` variant.
//! - Discriminated hierarchy roots become enums over their concrete variants.
//!   A concrete root keeps its own fields in a `{Root}Base` struct.

use std::collections::BTreeSet;
use std::fmt::Write;

use anyhow::Result;
use heck::{ToPascalCase, ToSnakeCase};
use wireplan_model::{
    Classification, EnumType, PrimitiveKind, Property, TypeId, TypeKind, TypeRef, TypeRegistry,
    classify,
};

/// Header comment placed at the top of the generated file.
const FILE_HEADER: &str = "//! Auto-generated by wireplan-gen. DO NOT EDIT.";

/// Generate `types.rs` for every enum and object type of `registry`.
pub fn generate_types(registry: &TypeRegistry) -> Result<String> {
    let generator = TypeGen::new(registry);

    let mut body = String::with_capacity(16 * 1024);
    for id in registry.enum_ids() {
        if let Some(TypeKind::Enum(e)) = registry.get(id).map(|entity| &entity.kind) {
            write_enum(&mut body, &to_pascal_case(registry.name_of(id)), e)?;
        }
    }
    for id in registry.object_ids() {
        generator.write_object(&mut body, id)?;
    }

    let mut out = String::with_capacity(body.len() + 128);
    writeln!(out, "{FILE_HEADER}")?;
    writeln!(out)?;
    if body.contains("BTreeMap<") {
        writeln!(out, "use std::collections::BTreeMap;")?;
        writeln!(out)?;
    }
    out.push_str(&body);
    Ok(out)
}

struct TypeGen<'a> {
    registry: &'a TypeRegistry,
    roots: BTreeSet<TypeId>,
}

impl<'a> TypeGen<'a> {
    fn new(registry: &'a TypeRegistry) -> Self {
        let roots = registry
            .polymorphism()
            .hierarchies()
            .iter()
            .map(|h| h.root)
            .collect();
        Self { registry, roots }
    }

    fn write_object(&self, out: &mut String, id: TypeId) -> Result<()> {
        let Some(object) = self.registry.object(id) else {
            return Ok(());
        };
        let name = to_pascal_case(self.registry.name_of(id));

        if self.roots.contains(&id) {
            self.write_root_enum(out, id, &name)?;
            if !object.is_abstract {
                self.write_struct(out, id, &format!("{name}Base"))?;
            }
        } else if !object.is_abstract {
            self.write_struct(out, id, &name)?;
        }
        Ok(())
    }

    fn write_root_enum(&self, out: &mut String, id: TypeId, name: &str) -> Result<()> {
        let polymorphism = self.registry.polymorphism();
        let property = polymorphism.discriminator_property(id).unwrap_or_default();

        writeln!(out, "/// {name} variants, selected by `{property}`.")?;
        writeln!(out, "#[derive(Debug, Clone, PartialEq)]")?;
        writeln!(out, "pub enum {name} {{")?;
        for (value, variant) in polymorphism.variants_for(self.registry, id) {
            let variant_name = to_pascal_case(self.registry.name_of(variant));
            let payload = if variant == id {
                format!("{name}Base")
            } else {
                variant_name.clone()
            };
            writeln!(out, "    /// `{property}` = `{value}`.")?;
            writeln!(out, "    {variant_name}({payload}),")?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;
        Ok(())
    }

    fn write_struct(&self, out: &mut String, id: TypeId, name: &str) -> Result<()> {
        writeln!(out, "/// {}.", self.registry.name_of(id))?;
        writeln!(out, "#[derive(Debug, Clone, PartialEq)]")?;
        writeln!(out, "pub struct {name} {{")?;
        for property in self.registry.effective_properties(id) {
            writeln!(out, "    /// Wire name `{}`.", property.wire_name)?;
            writeln!(
                out,
                "    pub {}: {},",
                to_snake_case(&property.name),
                self.field_type(property)
            )?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;
        Ok(())
    }

    /// Required non-null fields are bare. Optional or nullable adds one
    /// `Option`; optional and nullable adds two.
    fn field_type(&self, property: &Property) -> String {
        let inner = self.value_type(&property.value_type, false);
        match (property.required, property.nullable) {
            (true, false) => inner,
            (true, true) | (false, false) => format!("Option<{inner}>"),
            (false, true) => format!("Option<Option<{inner}>>"),
        }
    }

    fn value_type(&self, type_ref: &TypeRef, in_collection: bool) -> String {
        match classify(type_ref) {
            Classification::Scalar(id) => self.named_type(id, in_collection),
            Classification::Sequence(desc) => {
                format!("Vec<{}>", self.element_type(&desc.element_type, desc.elements_nullable))
            }
            Classification::Mapping(desc) => format!(
                "BTreeMap<String, {}>",
                self.element_type(&desc.element_type, desc.elements_nullable)
            ),
        }
    }

    fn element_type(&self, type_ref: &TypeRef, nullable: bool) -> String {
        let inner = self.value_type(type_ref, true);
        if nullable {
            format!("Option<{inner}>")
        } else {
            inner
        }
    }

    fn named_type(&self, id: TypeId, in_collection: bool) -> String {
        let Some(entity) = self.registry.get(id) else {
            return "()".to_owned();
        };
        match &entity.kind {
            TypeKind::Primitive(kind) => primitive_type(*kind).to_owned(),
            TypeKind::Enum(_) => to_pascal_case(&entity.name),
            TypeKind::Object(object) => {
                // Abstract members of a hierarchy have no struct; refer to the root enum.
                let target = match self.registry.polymorphism().hierarchy_of(id) {
                    Some(h) if object.is_abstract || self.roots.contains(&id) => h.root,
                    _ => id,
                };
                let name = to_pascal_case(self.registry.name_of(target));
                if in_collection {
                    name
                } else {
                    format!("Box<{name}>")
                }
            }
        }
    }
}

fn primitive_type(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "String",
        PrimitiveKind::Boolean => "bool",
        PrimitiveKind::Integer => "i32",
        PrimitiveKind::Long => "i64",
        PrimitiveKind::Float => "f32",
        PrimitiveKind::Double => "f64",
        PrimitiveKind::Timestamp => "chrono::DateTime<chrono::Utc>",
        PrimitiveKind::Blob => "bytes::Bytes",
    }
}

fn write_enum(out: &mut String, name: &str, e: &EnumType) -> Result<()> {
    let open = e.config.is_open();

    writeln!(out, "/// {name} enum.")?;
    writeln!(out, "#[derive(Debug, Clone, PartialEq, Eq, Hash)]")?;
    writeln!(out, "pub enum {name} {{")?;
    for member in &e.members {
        writeln!(out, "    /// `{}`", member.wire_value)?;
        writeln!(out, "    {},", to_pascal_case(&member.name))?;
    }
    if open {
        writeln!(out, "    /// A wire value outside the known members.")?;
        writeln!(out, "    Unknown(String),")?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "impl {name} {{")?;
    writeln!(out, "    /// Returns the wire value.")?;
    writeln!(out, "    #[must_use]")?;
    if open {
        writeln!(out, "    pub fn as_str(&self) -> &str {{")?;
    } else {
        writeln!(out, "    pub fn as_str(&self) -> &'static str {{")?;
    }
    writeln!(out, "        match self {{")?;
    for member in &e.members {
        writeln!(
            out,
            "            Self::{} => \"{}\",",
            to_pascal_case(&member.name),
            member.wire_value.escape_default()
        )?;
    }
    if open {
        writeln!(out, "            Self::Unknown(raw) => raw,")?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "impl std::fmt::Display for {name} {{")?;
    writeln!(
        out,
        "    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {{"
    )?;
    writeln!(out, "        f.write_str(self.as_str())")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

/// Convert a member name to a Rust field name.
fn to_snake_case(name: &str) -> String {
    let snake = name.to_snake_case();
    match snake.as_str() {
        "type" | "match" | "return" | "use" | "ref" | "mod" | "fn" | "struct" | "enum"
        | "impl" | "self" | "crate" => format!("r#{snake}"),
        _ => snake,
    }
}

fn to_pascal_case(name: &str) -> String {
    name.to_pascal_case()
}
