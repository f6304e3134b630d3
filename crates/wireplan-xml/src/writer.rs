//! XML writer.
//!
//! Start tags are held back until the first child or text is written, so
//! attribute-placed fields can still be attached and childless elements are
//! written as `<tag/>`.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::trace;
use wireplan_codec::{ContainerKind, EncodeError, FormatWriter, Scalar, Slot};
use wireplan_core::WireFormat;
use wireplan_model::XmlPlacement;

use crate::error::XmlError;

const ENTRY_TAG: &str = "entry";
const KEY_TAG: &str = "key";
const VALUE_TAG: &str = "value";

/// Element and attribute names follow the XML `Name` production.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || matches!(first, '_' | ':'))
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':' | '\u{b7}'))
}

fn check_name(name: &str) -> Result<(), EncodeError> {
    if is_xml_name(name) {
        Ok(())
    } else {
        Err(EncodeError::InvalidName {
            name: name.to_owned(),
            format: WireFormat::Xml,
        })
    }
}

#[derive(Debug)]
enum Frame {
    Element {
        name: String,
        closes_entry: bool,
    },
    Sequence {
        item_name: String,
        /// `None` for flattened sequences, which have no wrapping element.
        wrapper: Option<String>,
        closes_entry: bool,
    },
    Mapping {
        name: String,
        closes_entry: bool,
    },
}

/// [`FormatWriter`] producing an XML document.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    frames: Vec<Frame>,
}

impl std::fmt::Debug for XmlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlWriter")
            .field("pending", &self.pending)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::with_capacity(512)),
            pending: None,
            frames: Vec::new(),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), EncodeError> {
        self.writer.write_event(event).map_err(XmlError::from)?;
        Ok(())
    }

    /// Write out a held-back start tag.
    fn flush(&mut self) -> Result<(), EncodeError> {
        if let Some(start) = self.pending.take() {
            self.emit(Event::Start(start))?;
        }
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<(), EncodeError> {
        check_name(name)?;
        self.flush()?;
        self.pending = Some(BytesStart::new(name.to_owned()));
        Ok(())
    }

    fn close(&mut self, name: &str, closes_entry: bool) -> Result<(), EncodeError> {
        match self.pending.take() {
            Some(start) => self.emit(Event::Empty(start))?,
            None => self.emit(Event::End(BytesEnd::new(name)))?,
        }
        if closes_entry {
            self.emit(Event::End(BytesEnd::new(ENTRY_TAG)))?;
        }
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), EncodeError> {
        self.open(name)?;
        self.flush()?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.close(name, false)
    }

    fn item_name(&self) -> Result<String, EncodeError> {
        match self.frames.last() {
            Some(Frame::Sequence { item_name, .. }) => Ok(item_name.clone()),
            _ => Err(EncodeError::WriterState(
                "sequence item written outside a sequence".to_owned(),
            )),
        }
    }

    /// Open the element for `slot`, returning its name and whether an
    /// enclosing `<entry>` has to be closed with it.
    fn open_slot(&mut self, slot: Slot<'_>) -> Result<(String, bool), EncodeError> {
        match slot {
            Slot::Root { name, namespace } => {
                check_name(name)?;
                self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
                self.open(name)?;
                if let (Some(ns), Some(start)) = (namespace, self.pending.as_mut()) {
                    start.push_attribute(("xmlns", ns));
                }
                Ok((name.to_owned(), false))
            }
            Slot::Field {
                name,
                placement: XmlPlacement::Element,
            } => {
                self.open(name)?;
                Ok((name.to_owned(), false))
            }
            Slot::Field {
                name,
                placement: XmlPlacement::Attribute,
            } => Err(EncodeError::WriterState(format!(
                "attribute `{name}` cannot hold a structured value"
            ))),
            Slot::Item => {
                let name = self.item_name()?;
                self.open(&name)?;
                Ok((name, false))
            }
            Slot::Entry { key } => {
                self.flush()?;
                self.emit(Event::Start(BytesStart::new(ENTRY_TAG)))?;
                self.text_element(KEY_TAG, key)?;
                self.open(VALUE_TAG)?;
                Ok((VALUE_TAG.to_owned(), true))
            }
        }
    }
}

impl FormatWriter for XmlWriter {
    fn begin_object(&mut self, slot: Slot<'_>) -> Result<(), EncodeError> {
        let (name, closes_entry) = self.open_slot(slot)?;
        self.frames.push(Frame::Element { name, closes_entry });
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), EncodeError> {
        match self.frames.pop() {
            Some(Frame::Element { name, closes_entry }) => self.close(&name, closes_entry),
            _ => Err(EncodeError::WriterState("no open object".to_owned())),
        }
    }

    fn begin_container(
        &mut self,
        slot: Slot<'_>,
        kind: ContainerKind<'_>,
    ) -> Result<(), EncodeError> {
        let frame = match (kind, slot) {
            (
                ContainerKind::Sequence {
                    item_name,
                    flattened: true,
                },
                Slot::Field { .. },
            ) => Frame::Sequence {
                item_name: item_name.to_owned(),
                wrapper: None,
                closes_entry: false,
            },
            (ContainerKind::Sequence { item_name, .. }, slot) => {
                let (name, closes_entry) = self.open_slot(slot)?;
                Frame::Sequence {
                    item_name: item_name.to_owned(),
                    wrapper: Some(name),
                    closes_entry,
                }
            }
            (ContainerKind::Mapping, slot) => {
                let (name, closes_entry) = self.open_slot(slot)?;
                Frame::Mapping { name, closes_entry }
            }
        };
        self.frames.push(frame);
        Ok(())
    }

    fn end_container(&mut self) -> Result<(), EncodeError> {
        match self.frames.pop() {
            Some(Frame::Sequence { wrapper: None, .. }) => Ok(()),
            Some(Frame::Sequence {
                wrapper: Some(name),
                closes_entry,
                ..
            }
            | Frame::Mapping { name, closes_entry }) => self.close(&name, closes_entry),
            _ => Err(EncodeError::WriterState("no open container".to_owned())),
        }
    }

    fn write_scalar(&mut self, slot: Slot<'_>, value: Scalar<'_>) -> Result<(), EncodeError> {
        let text = value.to_text();
        if let Slot::Field {
            name,
            placement: XmlPlacement::Attribute,
        } = slot
        {
            check_name(name)?;
            let start = self
                .pending
                .as_mut()
                .ok_or_else(|| EncodeError::AttributeAfterContent {
                    name: name.to_owned(),
                })?;
            start.push_attribute((name, &*text));
            return Ok(());
        }

        let (name, closes_entry) = self.open_slot(slot)?;
        self.flush()?;
        self.emit(Event::Text(BytesText::new(&text)))?;
        self.close(&name, closes_entry)
    }

    fn write_null(&mut self, slot: Slot<'_>) -> Result<(), EncodeError> {
        match slot {
            // The key has to survive; the missing <value> marks the null.
            Slot::Entry { key } => {
                self.flush()?;
                self.emit(Event::Start(BytesStart::new(ENTRY_TAG)))?;
                self.text_element(KEY_TAG, key)?;
                self.emit(Event::End(BytesEnd::new(ENTRY_TAG)))
            }
            other => {
                trace!(slot = other.describe(), "omitting null value");
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<Vec<u8>, EncodeError> {
        if !self.frames.is_empty() || self.pending.is_some() {
            return Err(EncodeError::WriterState(
                "document finished with open elements".to_owned(),
            ));
        }
        Ok(self.writer.into_inner())
    }
}
