//! Plan construction.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};
use wireplan_core::{CancellationToken, WireFormat};
use wireplan_model::{
    Classification, ContainerStyle, EntityType, Property, TypeId, TypeKind, TypeRef,
    TypeRegistry, XmlPlacement, classify,
};

use crate::error::PlanError;
use crate::plan::{
    AssignmentTarget, CarrierTarget, DiscriminatorDispatch, Emission, EnumPlan, PlanSet,
    ReadAction, ReadPlan, RequiredField, TypePlan, ValueShape, WritePlan, WriteStep,
};

/// Builds plans from a sealed registry.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> Planner<'a> {
    /// Create a planner over a sealed registry.
    pub fn new(registry: &'a TypeRegistry) -> Result<Self, PlanError> {
        if !registry.is_sealed() {
            return Err(PlanError::RegistryNotSealed);
        }
        Ok(Self { registry })
    }

    /// Plan every object and enum type for one format.
    ///
    /// The token is polled before each object type; a tripped token turns the
    /// whole run into [`PlanError::Cancelled`] with no partial output.
    pub fn plan_all(
        &self,
        format: WireFormat,
        cancel: &CancellationToken,
        parallel: bool,
    ) -> Result<PlanSet, PlanError> {
        let objects = self.registry.object_ids();
        let plan_one = |id: &TypeId| -> Result<TypePlan, PlanError> {
            if cancel.is_cancelled() {
                debug!(%format, type_id = id.raw(), "planning cancelled");
                return Err(PlanError::Cancelled);
            }
            self.plan_type(*id, format)
        };

        let plans: Vec<TypePlan> = if parallel {
            objects.par_iter().map(&plan_one).collect::<Result<_, _>>()?
        } else {
            objects.iter().map(&plan_one).collect::<Result<_, _>>()?
        };

        let enums = self
            .registry
            .enum_ids()
            .into_iter()
            .map(|id| self.plan_enum(id).map(|p| (id, p)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        info!(
            %format,
            types = plans.len(),
            enums = enums.len(),
            parallel,
            "planned format"
        );
        Ok(PlanSet {
            format,
            types: plans.into_iter().map(|p| (p.type_id, p)).collect(),
            enums,
        })
    }

    /// Plan several formats, in order.
    pub fn plan_formats(
        &self,
        formats: &[WireFormat],
        cancel: &CancellationToken,
        parallel: bool,
    ) -> Result<Vec<PlanSet>, PlanError> {
        formats
            .iter()
            .map(|format| self.plan_all(*format, cancel, parallel))
            .collect()
    }

    /// Plan a single object type.
    pub fn plan_type(&self, id: TypeId, format: WireFormat) -> Result<TypePlan, PlanError> {
        let entity = self.registry.resolve(id)?;
        let Some(object) = entity.as_object() else {
            return Err(PlanError::UnknownType {
                name: entity.name.clone(),
            });
        };

        let polymorphism = self.registry.polymorphism();
        let discriminator = polymorphism.discriminator_property(id);
        let carrier = self
            .registry
            .additional_properties_carrier(id)
            .map(|p| p.name.as_str());

        let mut steps = Vec::new();
        let mut dispatch = BTreeMap::new();
        let mut required = Vec::new();
        let mut constructor_assigned = Vec::new();
        let mut setter_assigned = Vec::new();
        let mut additional_properties = None;

        for property in self.registry.effective_properties(id) {
            if property.additional_properties {
                // A base carrier shadowed by a more derived one is not planned.
                if carrier != Some(property.name.as_str()) {
                    continue;
                }
                let (value, values_nullable) = self.carrier_shape(entity, property)?;
                steps.push(WriteStep {
                    property: property.name.clone(),
                    wire_name: wire_name(property, format).to_owned(),
                    emission: Emission::AdditionalProperties {
                        value: value.clone(),
                        values_nullable,
                    },
                    placement: XmlPlacement::Element,
                    required: false,
                    nullable: property.nullable,
                });
                additional_properties = Some(CarrierTarget {
                    property: property.name.clone(),
                    value,
                    values_nullable,
                });
                setter_assigned.push(property.name.clone());
                continue;
            }

            let wire = wire_name(property, format).to_owned();
            let placement = match format {
                WireFormat::Json => XmlPlacement::Element,
                WireFormat::Xml => property.xml.placement,
            };
            let shape = self.shape_of(&property.value_type, &container_of(property, format))?;
            if format == WireFormat::Xml {
                check_xml_config(entity, property, &shape)?;
            }

            let emission = if discriminator == Some(property.name.as_str()) {
                Emission::Discriminator {
                    value: object.discriminator_value.clone(),
                }
            } else {
                Emission::Value {
                    shape: shape.clone(),
                }
            };
            steps.push(WriteStep {
                property: property.name.clone(),
                wire_name: wire.clone(),
                emission,
                placement,
                required: property.required,
                nullable: property.nullable,
            });

            let target = if property.settable_after_construction {
                setter_assigned.push(property.name.clone());
                AssignmentTarget::Setter
            } else {
                constructor_assigned.push(property.name.clone());
                AssignmentTarget::Constructor
            };
            if property.required {
                required.push(RequiredField {
                    property: property.name.clone(),
                    wire_name: wire.clone(),
                });
            }
            dispatch.insert(
                wire,
                ReadAction {
                    property: property.name.clone(),
                    shape,
                    target,
                    nullable: property.nullable,
                    placement,
                },
            );
        }

        if format == WireFormat::Xml {
            // Attributes must be written before any child content.
            steps.sort_by_key(|s| s.placement != XmlPlacement::Attribute);
        }

        let discriminator = discriminator
            .map(|name| (name, polymorphism.variants_for(self.registry, id)))
            .filter(|(_, variants)| !variants.is_empty())
            .and_then(|(name, variants)| {
                dispatch
                    .iter()
                    .find(|(_, action)| action.property == name)
                    .map(|(wire_name, action)| DiscriminatorDispatch {
                        property: name.to_owned(),
                        wire_name: wire_name.clone(),
                        placement: action.placement,
                        variants,
                    })
            });

        constructor_assigned.extend(setter_assigned);
        let plan = TypePlan {
            type_id: id,
            type_name: entity.name.clone(),
            lineage: self.registry.lineage(id),
            is_abstract: object.is_abstract,
            write: WritePlan {
                root_name: object
                    .xml
                    .root_name
                    .clone()
                    .unwrap_or_else(|| entity.name.clone()),
                namespace: object.xml.namespace.clone(),
                steps,
            },
            read: ReadPlan {
                dispatch,
                discriminator,
                additional_properties,
                required,
                construction_order: constructor_assigned,
            },
        };

        debug!(
            type_name = %plan.type_name,
            %format,
            steps = plan.write.steps.len(),
            polymorphic = plan.read.discriminator.is_some(),
            "planned type"
        );
        Ok(plan)
    }

    /// Plan a single enum type.
    pub fn plan_enum(&self, id: TypeId) -> Result<EnumPlan, PlanError> {
        let entity = self.registry.resolve(id)?;
        let Some(e) = entity.as_enum() else {
            return Err(PlanError::UnknownType {
                name: entity.name.clone(),
            });
        };
        Ok(EnumPlan {
            type_id: id,
            type_name: entity.name.clone(),
            members: e.members.clone(),
            case_sensitive: e.config.is_case_sensitive(),
            open: e.config.is_open(),
        })
    }

    fn shape_of(
        &self,
        type_ref: &TypeRef,
        container: &ContainerStyle,
    ) -> Result<ValueShape, PlanError> {
        Ok(match classify(type_ref) {
            Classification::Scalar(id) => match &self.registry.resolve(id)?.kind {
                TypeKind::Primitive(kind) => ValueShape::Primitive { kind: *kind },
                TypeKind::Enum(_) => ValueShape::Enum { type_id: id },
                TypeKind::Object(_) => ValueShape::Object { type_id: id },
            },
            Classification::Sequence(desc) => ValueShape::Sequence {
                element: Box::new(self.shape_of(&desc.element_type, &ContainerStyle::default())?),
                elements_nullable: desc.elements_nullable,
                container: container.clone(),
            },
            Classification::Mapping(desc) => ValueShape::Mapping {
                value: Box::new(self.shape_of(&desc.element_type, &ContainerStyle::default())?),
                values_nullable: desc.elements_nullable,
            },
        })
    }

    fn carrier_shape(
        &self,
        owner: &EntityType,
        property: &Property,
    ) -> Result<(ValueShape, bool), PlanError> {
        match classify(&property.value_type) {
            Classification::Mapping(desc) => Ok((
                self.shape_of(&desc.element_type, &ContainerStyle::default())?,
                desc.elements_nullable,
            )),
            _ => Err(PlanError::InvalidFormatConfig {
                type_name: owner.name.clone(),
                field: property.name.clone(),
                reason: "additional-properties carrier must be a mapping".to_owned(),
            }),
        }
    }
}

fn wire_name<'p>(property: &'p Property, format: WireFormat) -> &'p str {
    match format {
        WireFormat::Json => &property.wire_name,
        WireFormat::Xml => property.xml_wire_name(),
    }
}

fn container_of(property: &Property, format: WireFormat) -> ContainerStyle {
    match format {
        WireFormat::Json => ContainerStyle::default(),
        WireFormat::Xml => property.xml.container.clone(),
    }
}

fn check_xml_config(
    owner: &EntityType,
    property: &Property,
    shape: &ValueShape,
) -> Result<(), PlanError> {
    let invalid = |reason: &str| PlanError::InvalidFormatConfig {
        type_name: owner.name.clone(),
        field: property.name.clone(),
        reason: reason.to_owned(),
    };
    if property.xml.placement == XmlPlacement::Attribute && !shape.is_scalar() {
        return Err(invalid("attribute placement requires a primitive or enum value"));
    }
    if property.xml.container == ContainerStyle::Flattened
        && !matches!(shape, ValueShape::Sequence { .. })
    {
        return Err(invalid("only sequences can be flattened"));
    }
    Ok(())
}
