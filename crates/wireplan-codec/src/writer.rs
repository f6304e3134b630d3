//! Write-side primitives a format backend exposes to the encoder.

use wireplan_model::XmlPlacement;

use crate::error::EncodeError;
use crate::scalar::Scalar;

/// Where the next value lands relative to the enclosing structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// The document root.
    Root {
        /// Root element name for tagged formats.
        name: &'a str,
        /// Root namespace for tagged formats.
        namespace: Option<&'a str>,
    },
    /// A property of the enclosing object.
    Field {
        /// Wire key or tag.
        name: &'a str,
        /// Attribute or element.
        placement: XmlPlacement,
    },
    /// The next element of the enclosing sequence.
    Item,
    /// The value of a mapping entry.
    Entry {
        /// Entry key.
        key: &'a str,
    },
}

impl<'a> Slot<'a> {
    /// A property placed as an element.
    #[must_use]
    pub fn field(name: &'a str) -> Self {
        Self::Field {
            name,
            placement: XmlPlacement::Element,
        }
    }

    /// Human-readable location used in errors.
    #[must_use]
    pub fn describe(&self) -> &'a str {
        match self {
            Self::Root { name, .. } | Self::Field { name, .. } => name,
            Self::Item => "[item]",
            Self::Entry { key } => key,
        }
    }
}

/// Container layout requested from a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind<'a> {
    /// An ordered sequence.
    Sequence {
        /// Item tag for wrapped layouts.
        item_name: &'a str,
        /// Items are repeated siblings named after the field.
        flattened: bool,
    },
    /// A string-keyed mapping.
    Mapping,
}

/// Event sink for one serialized document.
pub trait FormatWriter {
    /// Open an object in `slot`.
    fn begin_object(&mut self, slot: Slot<'_>) -> Result<(), EncodeError>;

    /// Close the innermost object.
    fn end_object(&mut self) -> Result<(), EncodeError>;

    /// Open a sequence or mapping in `slot`.
    fn begin_container(&mut self, slot: Slot<'_>, kind: ContainerKind<'_>)
    -> Result<(), EncodeError>;

    /// Close the innermost container.
    fn end_container(&mut self) -> Result<(), EncodeError>;

    /// Write one scalar in `slot`.
    fn write_scalar(&mut self, slot: Slot<'_>, value: Scalar<'_>) -> Result<(), EncodeError>;

    /// Write the format's null marker in `slot`.
    fn write_null(&mut self, slot: Slot<'_>) -> Result<(), EncodeError>;

    /// Finish the document and return its bytes.
    fn finish(self) -> Result<Vec<u8>, EncodeError>
    where
        Self: Sized;
}
