//! XML backend for wireplan.
//!
//! Document conventions:
//!
//! - Declaration: `<?xml version="1.0" encoding="UTF-8"?>`
//! - Root element named by the type's XML root name, with optional `xmlns`
//! - Attribute-placed fields are written on the owning element's start tag
//! - Wrapped sequences: one wrapping element, one item element per value
//! - Flattened sequences: repeated sibling elements named after the field
//! - Maps: `<entry><key>..</key><value>..</value></entry>` per entry
//! - Null cannot be expressed for fields or sequence items and is written as
//!   omission, so an explicit null reads back as absent. A null map value is
//!   written as an entry without `<value>`.

mod error;
mod reader;
mod writer;

use tracing::debug;
use wireplan_codec::{DecodeError, EncodeError, FormatWriter, WireCodec};
use wireplan_core::WireFormat;
use wireplan_model::{ObjectValue, TypeId};
use wireplan_planner::PlanSet;

pub use error::XmlError;
pub use reader::XmlReader;
pub use writer::XmlWriter;

/// `serialize` / `deserialize` driven by an XML [`PlanSet`].
#[derive(Debug, Clone, Copy)]
pub struct XmlCodec<'a> {
    plans: &'a PlanSet,
}

impl<'a> XmlCodec<'a> {
    /// Create a codec over a plan set.
    #[must_use]
    pub fn new(plans: &'a PlanSet) -> Self {
        Self { plans }
    }

    fn check_format(&self) -> Option<WireFormat> {
        (self.plans.format != WireFormat::Xml).then_some(self.plans.format)
    }
}

impl WireCodec for XmlCodec<'_> {
    fn format(&self) -> WireFormat {
        WireFormat::Xml
    }

    fn serialize(&self, value: &ObjectValue) -> Result<Vec<u8>, EncodeError> {
        if let Some(found) = self.check_format() {
            return Err(EncodeError::FormatMismatch {
                expected: WireFormat::Xml,
                found,
            });
        }
        let mut writer = XmlWriter::new();
        wireplan_codec::encode(self.plans, value, &mut writer)?;
        let bytes = writer.finish()?;
        debug!(type_id = %value.type_id, len = bytes.len(), "serialized xml document");
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8], declared: TypeId) -> Result<ObjectValue, DecodeError> {
        if let Some(found) = self.check_format() {
            return Err(DecodeError::FormatMismatch {
                expected: WireFormat::Xml,
                found,
            });
        }
        let mut reader = XmlReader::new(bytes)?;
        wireplan_codec::decode(self.plans, declared, &mut reader)
    }
}
