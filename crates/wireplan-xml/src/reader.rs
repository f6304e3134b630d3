//! XML reader.
//!
//! A pull reader over `quick_xml::Reader`. The cursor holds the start tag of
//! the value about to be consumed, already split into its local name and
//! attributes; element content is pulled lazily when the value is consumed.

use std::collections::VecDeque;

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use tracing::trace;
use wireplan_codec::{ContainerKind, DecodeError, FieldKey, FormatReader, RawScalar};
use wireplan_model::XmlPlacement;

use crate::error::XmlError;

#[derive(Debug)]
struct ElementHead {
    name: String,
    attrs: Vec<(String, String)>,
    /// Written as `<tag/>`; there is no content or end tag to consume.
    empty: bool,
}

impl ElementHead {
    fn parse(start: &BytesStart<'_>, empty: bool) -> Result<Self, XmlError> {
        let name = utf8(start.local_name().as_ref())?.to_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let qualified = utf8(attr.key.as_ref())?;
            if qualified == "xmlns" || qualified.starts_with("xmlns:") {
                continue;
            }
            let key = utf8(attr.key.local_name().as_ref())?.to_owned();
            let raw = utf8(&attr.value)?;
            let value = unescape(raw)
                .map_err(|e| XmlError::InvalidText(e.to_string()))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Self { name, attrs, empty })
    }
}

#[derive(Debug)]
enum Cursor {
    Vacant,
    Null,
    Attr(String),
    Element(ElementHead),
}

#[derive(Debug)]
enum Frame {
    Object {
        attrs: VecDeque<(String, String)>,
        empty: bool,
    },
    Wrapped {
        empty: bool,
    },
    Flattened {
        yielded: bool,
    },
    Mapping {
        empty: bool,
    },
    /// Inside `<entry>` after its `<value>` was handed out.
    EntryTail,
}

/// [`FormatReader`] over an XML document.
pub struct XmlReader<'a> {
    reader: Reader<&'a [u8]>,
    cursor: Cursor,
    stack: Vec<Frame>,
}

impl std::fmt::Debug for XmlReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlReader")
            .field("cursor", &self.cursor)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

impl<'a> XmlReader<'a> {
    /// Skip the prolog and place the cursor on the root element.
    pub fn new(xml: &'a [u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::from_reader(xml);
        let root = loop {
            match reader.read_event().map_err(XmlError::from)? {
                Event::Start(e) => break ElementHead::parse(&e, false)?,
                Event::Empty(e) => break ElementHead::parse(&e, true)?,
                Event::Eof => {
                    return Err(XmlError::MissingRoot.into());
                }
                // Declaration, comments, processing instructions, whitespace.
                _ => {}
            }
        };
        Ok(Self {
            reader,
            cursor: Cursor::Element(root),
            stack: Vec::new(),
        })
    }

    fn take_element(&mut self, expected: &str) -> Result<ElementHead, DecodeError> {
        match std::mem::replace(&mut self.cursor, Cursor::Vacant) {
            Cursor::Element(head) => Ok(head),
            Cursor::Attr(_) => Err(DecodeError::TypeMismatch {
                field: String::from("<xml>"),
                expected: expected.to_owned(),
                found: "attribute".to_owned(),
            }),
            Cursor::Null | Cursor::Vacant => {
                Err(DecodeError::Syntax(format!("expected {expected} element")))
            }
        }
    }

    /// Drop an unconsumed cursor value, skipping its content.
    fn discard_cursor(&mut self) -> Result<(), XmlError> {
        if let Cursor::Element(head) = std::mem::replace(&mut self.cursor, Cursor::Vacant) {
            if !head.empty {
                skip_element(&mut self.reader)?;
            }
        }
        Ok(())
    }

    /// Finish the `<entry>` whose value was handed out.
    fn close_entry(&mut self) -> Result<(), XmlError> {
        while let Some(head) = next_child(&mut self.reader)? {
            if !head.empty {
                skip_element(&mut self.reader)?;
            }
        }
        Ok(())
    }

    fn read_entry(&mut self) -> Result<String, DecodeError> {
        let mut key = None;
        loop {
            match next_child(&mut self.reader)? {
                Some(head) if head.name == "key" => {
                    key = Some(if head.empty {
                        String::new()
                    } else {
                        read_text(&mut self.reader)?
                    });
                }
                Some(head) if head.name == "value" => {
                    let key = key.ok_or_else(|| {
                        DecodeError::Syntax("map entry value before its key".to_owned())
                    })?;
                    self.cursor = Cursor::Element(head);
                    self.stack.push(Frame::EntryTail);
                    return Ok(key);
                }
                Some(head) => {
                    trace!(element = %head.name, "skipping unknown map entry child");
                    if !head.empty {
                        skip_element(&mut self.reader)?;
                    }
                }
                None => {
                    // No <value>: the entry holds a null.
                    let key = key
                        .ok_or_else(|| DecodeError::Syntax("map entry without a key".to_owned()))?;
                    self.cursor = Cursor::Null;
                    return Ok(key);
                }
            }
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|e| XmlError::InvalidText(e.to_string()))
}

/// Advance to the next child start tag of the current element, or consume
/// its end tag and return `None`.
fn next_child(reader: &mut Reader<&[u8]>) -> Result<Option<ElementHead>, XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => return Ok(Some(ElementHead::parse(&e, false)?)),
            Event::Empty(e) => return Ok(Some(ElementHead::parse(&e, true)?)),
            Event::End(_) => return Ok(None),
            Event::Eof => {
                return Err(XmlError::Truncated("inside element"));
            }
            _ => {}
        }
    }
}

/// Read the text content of the current element and consume its end tag.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::InvalidText(err.to_string()))?;
                let unescaped =
                    unescape(&decoded).map_err(|err| XmlError::InvalidText(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::InvalidText(err.to_string()))?;
                text.push_str(&decoded);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref()? {
                    text.push(ch);
                } else {
                    let name = e
                        .decode()
                        .map_err(|err| XmlError::InvalidText(err.to_string()))?;
                    let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
                        XmlError::InvalidText(format!("unknown entity reference &{name};"))
                    })?;
                    text.push_str(resolved);
                }
            }
            Event::End(_) => return Ok(text),
            Event::Start(e) | Event::Empty(e) => {
                return Err(XmlError::NestedElement(
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ));
            }
            Event::Eof => {
                return Err(XmlError::Truncated("while reading text content"));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::Truncated("while skipping an element"));
            }
            _ => {}
        }
    }
}

impl FormatReader for XmlReader<'_> {
    fn begin_object(&mut self) -> Result<(), DecodeError> {
        let head = self.take_element("object")?;
        self.stack.push(Frame::Object {
            attrs: head.attrs.into(),
            empty: head.empty,
        });
        Ok(())
    }

    fn next_key(&mut self) -> Result<Option<FieldKey>, DecodeError> {
        self.discard_cursor()?;
        let empty = match self.stack.last_mut() {
            Some(Frame::Object { attrs, empty }) => {
                if let Some((name, value)) = attrs.pop_front() {
                    self.cursor = Cursor::Attr(value);
                    return Ok(Some(FieldKey::attribute(name)));
                }
                *empty
            }
            _ => return Err(DecodeError::Syntax("not inside an object".to_owned())),
        };
        if empty {
            self.stack.pop();
            return Ok(None);
        }
        match next_child(&mut self.reader)? {
            Some(head) => {
                let key = FieldKey::element(head.name.clone());
                self.cursor = Cursor::Element(head);
                Ok(Some(key))
            }
            None => {
                self.stack.pop();
                Ok(None)
            }
        }
    }

    fn peek_field(
        &mut self,
        name: &str,
        placement: XmlPlacement,
    ) -> Result<Option<String>, DecodeError> {
        let Some(Frame::Object { attrs, empty }) = self.stack.last() else {
            return Ok(None);
        };
        if placement == XmlPlacement::Attribute {
            return Ok(attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()));
        }
        if *empty {
            return Ok(None);
        }

        let mut lookahead = self.reader.clone();
        while let Some(head) = next_child(&mut lookahead)? {
            if head.name == name {
                if head.empty {
                    return Ok(Some(String::new()));
                }
                return Ok(Some(read_text(&mut lookahead)?));
            }
            if !head.empty {
                skip_element(&mut lookahead)?;
            }
        }
        Ok(None)
    }

    fn is_null(&mut self) -> Result<bool, DecodeError> {
        if matches!(self.cursor, Cursor::Null) {
            self.cursor = Cursor::Vacant;
            return Ok(true);
        }
        Ok(false)
    }

    fn read_scalar(&mut self) -> Result<RawScalar, DecodeError> {
        match std::mem::replace(&mut self.cursor, Cursor::Vacant) {
            Cursor::Attr(value) => Ok(RawScalar::Text(value)),
            Cursor::Element(head) if head.empty => Ok(RawScalar::Text(String::new())),
            Cursor::Element(_) => Ok(RawScalar::Text(read_text(&mut self.reader)?)),
            Cursor::Null | Cursor::Vacant => {
                Err(DecodeError::Syntax("no scalar at cursor".to_owned()))
            }
        }
    }

    fn begin_container(&mut self, kind: ContainerKind<'_>) -> Result<(), DecodeError> {
        let frame = match kind {
            // The element at the cursor is the first item itself.
            ContainerKind::Sequence {
                flattened: true, ..
            } => {
                if !matches!(self.cursor, Cursor::Element(_)) {
                    return Err(DecodeError::Syntax("expected sequence item".to_owned()));
                }
                Frame::Flattened { yielded: false }
            }
            ContainerKind::Sequence { .. } => Frame::Wrapped {
                empty: self.take_element("sequence")?.empty,
            },
            ContainerKind::Mapping => Frame::Mapping {
                empty: self.take_element("map")?.empty,
            },
        };
        self.stack.push(frame);
        Ok(())
    }

    fn next_element(&mut self) -> Result<bool, DecodeError> {
        let (flattened, done) = match self.stack.last_mut() {
            Some(Frame::Flattened { yielded }) => (true, std::mem::replace(yielded, true)),
            Some(Frame::Wrapped { empty }) => (false, *empty),
            _ => return Err(DecodeError::Syntax("not inside a sequence".to_owned())),
        };
        if flattened && !done {
            return Ok(true);
        }
        self.discard_cursor()?;
        if done {
            self.stack.pop();
            return Ok(false);
        }
        match next_child(&mut self.reader)? {
            Some(head) => {
                self.cursor = Cursor::Element(head);
                Ok(true)
            }
            None => {
                self.stack.pop();
                Ok(false)
            }
        }
    }

    fn next_entry(&mut self) -> Result<Option<String>, DecodeError> {
        self.discard_cursor()?;
        if matches!(self.stack.last(), Some(Frame::EntryTail)) {
            self.stack.pop();
            self.close_entry()?;
        }
        let empty = match self.stack.last() {
            Some(Frame::Mapping { empty }) => *empty,
            _ => return Err(DecodeError::Syntax("not inside a map".to_owned())),
        };
        if empty {
            self.stack.pop();
            return Ok(None);
        }
        match next_child(&mut self.reader)? {
            Some(head) if head.empty => {
                Err(DecodeError::Syntax(format!("empty map entry <{}/>", head.name)))
            }
            Some(_) => self.read_entry().map(Some),
            None => {
                self.stack.pop();
                Ok(None)
            }
        }
    }

    fn skip_value(&mut self) -> Result<(), DecodeError> {
        self.discard_cursor()?;
        self.cursor = Cursor::Vacant;
        Ok(())
    }
}
