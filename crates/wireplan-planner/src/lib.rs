//! Serialization planner.
//!
//! Turns a sealed [`TypeRegistry`](wireplan_model::TypeRegistry) into one
//! [`PlanSet`] per wire format. A plan set holds, for every object type, an
//! ordered write plan and a read dispatch table, and for every enum its
//! matching policy. Runtime codecs walk nothing but these plans.

mod error;
pub mod plan;
mod planner;

pub use error::PlanError;
pub use plan::{
    AssignmentTarget, CarrierTarget, DiscriminatorDispatch, Emission, EnumPlan, PlanSet,
    ReadAction, ReadPlan, RequiredField, TypePlan, ValueShape, WritePlan, WriteStep,
};
pub use planner::Planner;
