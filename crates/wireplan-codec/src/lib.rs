//! Format-neutral runtime codec.
//!
//! A format backend implements [`FormatWriter`] and [`FormatReader`]; the
//! [`encode`] and [`decode`] functions then walk a
//! [`PlanSet`](wireplan_planner::PlanSet) against those primitives. Nothing
//! here consults the type registry: plans are the only input.

mod decode;
mod encode;
mod error;
mod reader;
pub mod scalar;
mod writer;

use wireplan_core::WireFormat;
use wireplan_model::{ObjectValue, TypeId};

pub use decode::{MAX_NESTING_DEPTH, decode};
pub use encode::encode;
pub use error::{DecodeError, EncodeError};
pub use reader::{FieldKey, FormatReader};
pub use scalar::{RawScalar, Scalar};
pub use writer::{ContainerKind, FormatWriter, Slot};

/// `serialize` / `deserialize` over one wire format.
pub trait WireCodec {
    /// The format this codec reads and writes.
    fn format(&self) -> WireFormat;

    /// Serialize an object as a document root.
    fn serialize(&self, value: &ObjectValue) -> Result<Vec<u8>, EncodeError>;

    /// Deserialize a document whose root is declared as `declared`.
    fn deserialize(&self, bytes: &[u8], declared: TypeId) -> Result<ObjectValue, DecodeError>;
}
