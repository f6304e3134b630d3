//! Plan-driven decoder.
//!
//! Objects are decoded into a scratch map and only turned into an
//! [`ObjectValue`] once every key has been consumed and every required field
//! checked, so a failed decode never yields a partially populated value.

use std::collections::BTreeMap;

use tracing::{debug, trace};
use wireplan_model::{ContainerStyle, EnumValue, ObjectValue, TypeId, Value};
use wireplan_planner::{PlanSet, TypePlan, ValueShape};

use crate::error::DecodeError;
use crate::reader::FormatReader;
use crate::scalar::{RawScalar, to_value};
use crate::writer::ContainerKind;

/// Deepest object or container nesting [`decode`] accepts, root included.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Read a document root declared as `declared` from `reader`.
///
/// The result's `type_id` is the concrete type selected by the discriminator
/// when `declared` roots or belongs to a discriminated hierarchy.
pub fn decode<R: FormatReader>(
    plans: &PlanSet,
    declared: TypeId,
    reader: &mut R,
) -> Result<ObjectValue, DecodeError> {
    Decoder { plans }.read_object(reader, declared, 1)
}

struct Decoder<'p> {
    plans: &'p PlanSet,
}

impl Decoder<'_> {
    fn read_object<R: FormatReader>(
        &self,
        reader: &mut R,
        declared: TypeId,
        depth: usize,
    ) -> Result<ObjectValue, DecodeError> {
        let declared_plan = self.type_plan(declared)?;
        reader.begin_object()?;
        let plan = self.resolve_concrete(reader, declared_plan)?;

        let mut fields: BTreeMap<String, Value> = BTreeMap::new();
        let mut extra: BTreeMap<String, Value> = BTreeMap::new();

        while let Some(key) = reader.next_key()? {
            // A name only binds when it arrives in the planned placement.
            let action = plan
                .read
                .dispatch
                .get(&key.name)
                .filter(|action| action.placement == key.placement);
            if let Some(action) = action {
                let value = self.read_nullable(
                    reader,
                    &action.shape,
                    action.nullable,
                    &key.name,
                    depth,
                )?;
                let pending = match (fields.get_mut(&action.property), value) {
                    // Flattened sequences arrive one sibling at a time.
                    (Some(Value::List(existing)), Value::List(more))
                        if is_flattened(&action.shape) =>
                    {
                        existing.extend(more);
                        None
                    }
                    (_, value) => Some(value),
                };
                if let Some(value) = pending {
                    fields.insert(action.property.clone(), value);
                }
            } else if let Some(carrier) = &plan.read.additional_properties {
                let value = self.read_nullable(
                    reader,
                    &carrier.value,
                    carrier.values_nullable,
                    &key.name,
                    depth,
                )?;
                extra.insert(key.name, value);
            } else {
                debug!(type_name = %plan.type_name, field = %key.name, "discarding unknown field");
                reader.skip_value()?;
            }
        }

        if let Some(carrier) = &plan.read.additional_properties {
            if !extra.is_empty() {
                fields.insert(carrier.property.clone(), Value::Map(extra));
            }
        }

        for required in &plan.read.required {
            if !fields.contains_key(&required.property) {
                return Err(DecodeError::MissingRequiredField {
                    type_name: plan.type_name.clone(),
                    field: required.wire_name.clone(),
                });
            }
        }

        let mut object = ObjectValue::new(plan.type_id);
        for property in &plan.read.construction_order {
            if let Some(value) = fields.remove(property) {
                object.fields.insert(property.clone(), value);
            }
        }
        Ok(object)
    }

    /// Look the discriminator up ahead of the field scan.
    ///
    /// A missing discriminator keeps the declared type; the required-field
    /// check then reports it after the scan.
    fn resolve_concrete<'a, R: FormatReader>(
        &'a self,
        reader: &mut R,
        declared: &'a TypePlan,
    ) -> Result<&'a TypePlan, DecodeError> {
        let Some(dispatch) = &declared.read.discriminator else {
            return Ok(declared);
        };
        let Some(raw) = reader.peek_field(&dispatch.wire_name, dispatch.placement)? else {
            return Ok(declared);
        };

        let concrete = dispatch.variants.get(&raw).copied().ok_or_else(|| {
            DecodeError::UnknownDiscriminator {
                type_name: declared.type_name.clone(),
                value: raw.clone(),
            }
        })?;
        trace!(declared = %declared.type_name, value = %raw, "resolved discriminator");
        self.type_plan(concrete)
    }

    fn read_nullable<R: FormatReader>(
        &self,
        reader: &mut R,
        shape: &ValueShape,
        nullable: bool,
        field: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        if reader.is_null()? {
            if nullable {
                return Ok(Value::Null);
            }
            return Err(DecodeError::UnexpectedNull {
                field: field.to_owned(),
            });
        }
        self.read_value(reader, shape, field, depth)
    }

    fn read_value<R: FormatReader>(
        &self,
        reader: &mut R,
        shape: &ValueShape,
        field: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        match shape {
            ValueShape::Primitive { kind } => to_value(*kind, reader.read_scalar()?, field),
            ValueShape::Enum { type_id } => self.read_enum(reader, *type_id, field),
            ValueShape::Object { type_id } => {
                let nested = deeper(depth, field)?;
                self.read_object(reader, *type_id, nested).map(Value::Object)
            }
            ValueShape::Sequence {
                element,
                elements_nullable,
                container,
            } => {
                let kind = match container {
                    ContainerStyle::Wrapped { item_name } => ContainerKind::Sequence {
                        item_name: item_name.as_str(),
                        flattened: false,
                    },
                    ContainerStyle::Flattened => ContainerKind::Sequence {
                        item_name: field,
                        flattened: true,
                    },
                };
                let nested = deeper(depth, field)?;
                reader.begin_container(kind)?;
                let mut items = Vec::new();
                while reader.next_element()? {
                    let item =
                        self.read_nullable(reader, element, *elements_nullable, field, nested)?;
                    items.push(item);
                }
                Ok(Value::List(items))
            }
            ValueShape::Mapping {
                value,
                values_nullable,
            } => {
                let nested = deeper(depth, field)?;
                reader.begin_container(ContainerKind::Mapping)?;
                let mut entries = BTreeMap::new();
                while let Some(key) = reader.next_entry()? {
                    let entry =
                        self.read_nullable(reader, value, *values_nullable, &key, nested)?;
                    entries.insert(key, entry);
                }
                Ok(Value::Map(entries))
            }
        }
    }

    fn read_enum<R: FormatReader>(
        &self,
        reader: &mut R,
        type_id: TypeId,
        field: &str,
    ) -> Result<Value, DecodeError> {
        let plan = self
            .plans
            .enum_plan(type_id)
            .ok_or(DecodeError::MissingPlan {
                type_id: type_id.raw(),
            })?;
        let raw = match reader.read_scalar()? {
            RawScalar::Text(s) => s,
            other => {
                return Err(DecodeError::TypeMismatch {
                    field: field.to_owned(),
                    expected: plan.type_name.clone(),
                    found: other.kind_name().to_owned(),
                });
            }
        };

        match plan.match_wire_value(&raw) {
            Some(member) => Ok(Value::Enum(EnumValue::Known(member.name.clone()))),
            None if plan.open => {
                debug!(enum_name = %plan.type_name, value = %raw, "preserving unknown enum value");
                Ok(Value::Enum(EnumValue::Unknown(raw)))
            }
            None => Err(DecodeError::UnknownEnumValue {
                enum_name: plan.type_name.clone(),
                value: raw,
            }),
        }
    }

    fn type_plan(&self, id: TypeId) -> Result<&TypePlan, DecodeError> {
        self.plans
            .type_plan(id)
            .ok_or(DecodeError::MissingPlan { type_id: id.raw() })
    }
}

fn deeper(depth: usize, field: &str) -> Result<usize, DecodeError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(DecodeError::NestingTooDeep {
            field: field.to_owned(),
            limit: MAX_NESTING_DEPTH,
        });
    }
    Ok(depth + 1)
}

fn is_flattened(shape: &ValueShape) -> bool {
    matches!(
        shape,
        ValueShape::Sequence {
            container: ContainerStyle::Flattened,
            ..
        }
    )
}
