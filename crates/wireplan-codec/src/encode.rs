//! Plan-driven encoder.

use std::borrow::Cow;

use tracing::debug;
use wireplan_model::{ContainerStyle, EnumValue, ObjectValue, TypeId, Value};
use wireplan_planner::{Emission, PlanSet, TypePlan, ValueShape, WriteStep};

use crate::error::EncodeError;
use crate::scalar::{Scalar, to_scalar};
use crate::writer::{ContainerKind, FormatWriter, Slot};

/// Write `value` as a document root through `writer`.
pub fn encode<W: FormatWriter>(
    plans: &PlanSet,
    value: &ObjectValue,
    writer: &mut W,
) -> Result<(), EncodeError> {
    let plan = type_plan(plans, value.type_id)?;
    let slot = Slot::Root {
        name: &plan.write.root_name,
        namespace: plan.write.namespace.as_deref(),
    };
    Encoder { plans }.write_object(writer, slot, value, None)
}

struct Encoder<'p> {
    plans: &'p PlanSet,
}

impl Encoder<'_> {
    fn write_object<W: FormatWriter>(
        &self,
        writer: &mut W,
        slot: Slot<'_>,
        object: &ObjectValue,
        declared: Option<TypeId>,
    ) -> Result<(), EncodeError> {
        let plan = type_plan(self.plans, object.type_id)?;
        if let Some(declared) = declared {
            if !self.plans.is_subtype(object.type_id, declared) {
                return Err(EncodeError::TypeMismatch {
                    field: slot.describe().to_owned(),
                    expected: type_plan(self.plans, declared)?.type_name.clone(),
                    found: plan.type_name.clone(),
                });
            }
        }
        if plan.is_abstract {
            return Err(EncodeError::AbstractInstance {
                type_name: plan.type_name.clone(),
            });
        }

        writer.begin_object(slot)?;
        for step in &plan.write.steps {
            self.write_step(writer, plan, step, object)?;
        }
        writer.end_object()
    }

    fn write_step<W: FormatWriter>(
        &self,
        writer: &mut W,
        plan: &TypePlan,
        step: &WriteStep,
        object: &ObjectValue,
    ) -> Result<(), EncodeError> {
        let slot = Slot::Field {
            name: &step.wire_name,
            placement: step.placement,
        };

        match &step.emission {
            Emission::Discriminator { value } => {
                let value = value.as_deref().ok_or_else(|| EncodeError::AbstractInstance {
                    type_name: plan.type_name.clone(),
                })?;
                writer.write_scalar(slot, Scalar::Text(Cow::Borrowed(value)))
            }
            Emission::AdditionalProperties {
                value,
                values_nullable,
            } => match object.get(&step.property) {
                None | Some(Value::Null) => Ok(()),
                Some(Value::Map(entries)) => {
                    for (key, entry) in entries {
                        if plan.read.dispatch.contains_key(key) {
                            debug!(
                                type_name = %plan.type_name,
                                key = %key,
                                "skipping additional property that shadows a declared field"
                            );
                            continue;
                        }
                        self.write_nullable(
                            writer,
                            Slot::field(key),
                            entry,
                            value,
                            *values_nullable,
                        )?;
                    }
                    Ok(())
                }
                Some(other) => Err(EncodeError::TypeMismatch {
                    field: step.property.clone(),
                    expected: "map".to_owned(),
                    found: other.kind_name().to_owned(),
                }),
            },
            Emission::Value { shape } => match object.get(&step.property) {
                None if step.required => Err(EncodeError::MissingRequiredField {
                    type_name: plan.type_name.clone(),
                    field: step.property.clone(),
                }),
                None => Ok(()),
                Some(value) => self.write_nullable(writer, slot, value, shape, step.nullable),
            },
        }
    }

    fn write_nullable<W: FormatWriter>(
        &self,
        writer: &mut W,
        slot: Slot<'_>,
        value: &Value,
        shape: &ValueShape,
        nullable: bool,
    ) -> Result<(), EncodeError> {
        if value.is_null() {
            if !nullable {
                return Err(EncodeError::UnexpectedNull {
                    field: slot.describe().to_owned(),
                });
            }
            return writer.write_null(slot);
        }
        self.write_value(writer, slot, value, shape)
    }

    fn write_value<W: FormatWriter>(
        &self,
        writer: &mut W,
        slot: Slot<'_>,
        value: &Value,
        shape: &ValueShape,
    ) -> Result<(), EncodeError> {
        match (shape, value) {
            (ValueShape::Primitive { kind }, value) => {
                let scalar = to_scalar(*kind, value, slot.describe())?;
                writer.write_scalar(slot, scalar)
            }
            (ValueShape::Enum { type_id }, Value::Enum(e)) => {
                let wire = self.enum_wire_value(*type_id, e)?;
                writer.write_scalar(slot, Scalar::Text(Cow::Borrowed(wire)))
            }
            (ValueShape::Object { type_id }, Value::Object(object)) => {
                self.write_object(writer, slot, object, Some(*type_id))
            }
            (
                ValueShape::Sequence {
                    element,
                    elements_nullable,
                    container,
                },
                Value::List(items),
            ) => {
                let kind = match container {
                    ContainerStyle::Wrapped { item_name } => ContainerKind::Sequence {
                        item_name: item_name.as_str(),
                        flattened: false,
                    },
                    ContainerStyle::Flattened => ContainerKind::Sequence {
                        item_name: slot.describe(),
                        flattened: true,
                    },
                };
                writer.begin_container(slot, kind)?;
                for item in items {
                    self.write_nullable(writer, Slot::Item, item, element, *elements_nullable)?;
                }
                writer.end_container()
            }
            (
                ValueShape::Mapping {
                    value: value_shape,
                    values_nullable,
                },
                Value::Map(entries),
            ) => {
                writer.begin_container(slot, ContainerKind::Mapping)?;
                for (key, entry) in entries {
                    self.write_nullable(
                        writer,
                        Slot::Entry { key: key.as_str() },
                        entry,
                        value_shape,
                        *values_nullable,
                    )?;
                }
                writer.end_container()
            }
            (shape, value) => Err(EncodeError::TypeMismatch {
                field: slot.describe().to_owned(),
                expected: shape_name(shape).to_owned(),
                found: value.kind_name().to_owned(),
            }),
        }
    }

    fn enum_wire_value<'v>(
        &'v self,
        type_id: TypeId,
        value: &'v EnumValue,
    ) -> Result<&'v str, EncodeError> {
        let plan = self
            .plans
            .enum_plan(type_id)
            .ok_or(EncodeError::MissingPlan {
                type_id: type_id.raw(),
            })?;
        match value {
            EnumValue::Known(member) => plan
                .member(member)
                .map(|m| m.wire_value.as_str())
                .ok_or_else(|| EncodeError::UnknownEnumMember {
                    enum_name: plan.type_name.clone(),
                    member: member.clone(),
                }),
            EnumValue::Unknown(raw) if plan.open => Ok(raw.as_str()),
            EnumValue::Unknown(raw) => Err(EncodeError::UnknownEnumValue {
                enum_name: plan.type_name.clone(),
                value: raw.clone(),
            }),
        }
    }
}

fn type_plan(plans: &PlanSet, id: TypeId) -> Result<&TypePlan, EncodeError> {
    plans
        .type_plan(id)
        .ok_or(EncodeError::MissingPlan { type_id: id.raw() })
}

fn shape_name(shape: &ValueShape) -> &'static str {
    match shape {
        ValueShape::Primitive { .. } => "primitive",
        ValueShape::Enum { .. } => "enum",
        ValueShape::Object { .. } => "object",
        ValueShape::Sequence { .. } => "list",
        ValueShape::Mapping { .. } => "map",
    }
}
