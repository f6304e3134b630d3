//! JSON backend for wireplan.
//!
//! - Objects are JSON objects keyed by wire name, in write-plan order.
//! - The null marker is the `null` token; absent fields are omitted.
//! - Sequences are arrays; mappings are objects.
//! - Booleans and numbers use native JSON tokens; timestamps and blobs are
//!   strings (ISO 8601 and base64).

mod reader;
mod writer;

use tracing::debug;
use wireplan_codec::{DecodeError, EncodeError, FormatWriter, WireCodec};
use wireplan_core::WireFormat;
use wireplan_model::{ObjectValue, TypeId};
use wireplan_planner::PlanSet;

pub use reader::JsonReader;
pub use writer::JsonWriter;

/// `serialize` / `deserialize` driven by a JSON [`PlanSet`].
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec<'a> {
    plans: &'a PlanSet,
}

impl<'a> JsonCodec<'a> {
    /// Create a codec over a plan set.
    #[must_use]
    pub fn new(plans: &'a PlanSet) -> Self {
        Self { plans }
    }
}

impl WireCodec for JsonCodec<'_> {
    fn format(&self) -> WireFormat {
        WireFormat::Json
    }

    fn serialize(&self, value: &ObjectValue) -> Result<Vec<u8>, EncodeError> {
        if self.plans.format != WireFormat::Json {
            return Err(EncodeError::FormatMismatch {
                expected: WireFormat::Json,
                found: self.plans.format,
            });
        }
        let mut writer = JsonWriter::new();
        wireplan_codec::encode(self.plans, value, &mut writer)?;
        let bytes = writer.finish()?;
        debug!(type_id = %value.type_id, len = bytes.len(), "serialized json document");
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8], declared: TypeId) -> Result<ObjectValue, DecodeError> {
        if self.plans.format != WireFormat::Json {
            return Err(DecodeError::FormatMismatch {
                expected: WireFormat::Json,
                found: self.plans.format,
            });
        }
        let mut reader = JsonReader::new(bytes)?;
        wireplan_codec::decode(self.plans, declared, &mut reader)
    }
}
