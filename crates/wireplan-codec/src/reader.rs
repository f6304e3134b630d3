//! Read-side primitives a format backend exposes to the decoder.
//!
//! Readers are cursor based. Navigation calls (`next_key`, `next_element`,
//! `next_entry`) position the cursor on a value; exactly one value call
//! (`is_null` returning true, `read_scalar`, `begin_object`,
//! `begin_container` or `skip_value`) then consumes it. A navigation call
//! that reports the end of its structure also leaves that structure.

use wireplan_model::XmlPlacement;

use crate::error::DecodeError;
use crate::scalar::RawScalar;
use crate::writer::ContainerKind;

/// A field key yielded by [`FormatReader::next_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    /// Wire key or tag.
    pub name: String,
    /// Where the field was found.
    pub placement: XmlPlacement,
}

impl FieldKey {
    /// A key found as an element or tree-format key.
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            placement: XmlPlacement::Element,
        }
    }

    /// A key found as an attribute.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            placement: XmlPlacement::Attribute,
        }
    }
}

/// Event source for one serialized document.
pub trait FormatReader {
    /// Enter the object at the cursor.
    fn begin_object(&mut self) -> Result<(), DecodeError>;

    /// Advance to the next field of the current object, or leave it.
    fn next_key(&mut self) -> Result<Option<FieldKey>, DecodeError>;

    /// Find a scalar field of the current object without consuming anything.
    fn peek_field(
        &mut self,
        name: &str,
        placement: XmlPlacement,
    ) -> Result<Option<String>, DecodeError>;

    /// Consume the value at the cursor if it is the null marker.
    fn is_null(&mut self) -> Result<bool, DecodeError>;

    /// Consume the scalar at the cursor.
    fn read_scalar(&mut self) -> Result<RawScalar, DecodeError>;

    /// Enter the container at the cursor.
    fn begin_container(&mut self, kind: ContainerKind<'_>) -> Result<(), DecodeError>;

    /// Advance to the next element of the current sequence, or leave it.
    fn next_element(&mut self) -> Result<bool, DecodeError>;

    /// Advance to the next entry value of the current mapping, or leave it.
    fn next_entry(&mut self) -> Result<Option<String>, DecodeError>;

    /// Consume and discard the value at the cursor.
    fn skip_value(&mut self) -> Result<(), DecodeError>;
}
