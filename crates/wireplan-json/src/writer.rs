//! JSON writer.
//!
//! Builds a `serde_json::Value` tree and serializes it on `finish`. The null
//! marker is the `null` token; absent fields are simply never inserted.

use serde_json::{Map, Number, Value as JsonValue};
use wireplan_codec::{ContainerKind, EncodeError, FormatWriter, Scalar, Slot};

#[derive(Debug)]
enum Frame {
    Object(Map<String, JsonValue>, Option<String>),
    Array(Vec<JsonValue>, Option<String>),
}

/// [`FormatWriter`] producing a JSON document.
#[derive(Debug, Default)]
pub struct JsonWriter {
    stack: Vec<Frame>,
    root: Option<JsonValue>,
}

impl JsonWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn place(&mut self, key: Option<String>, value: JsonValue) -> Result<(), EncodeError> {
        match self.stack.last_mut() {
            Some(Frame::Object(map, _)) => {
                let key = key.ok_or_else(|| {
                    EncodeError::WriterState("object member written without a key".to_owned())
                })?;
                map.insert(key, value);
            }
            Some(Frame::Array(items, _)) => items.push(value),
            None => {
                if self.root.is_some() {
                    return Err(EncodeError::WriterState(
                        "document already has a root value".to_owned(),
                    ));
                }
                self.root = Some(value);
            }
        }
        Ok(())
    }
}

fn key_of(slot: Slot<'_>) -> Option<String> {
    match slot {
        Slot::Field { name, .. } => Some(name.to_owned()),
        Slot::Entry { key } => Some(key.to_owned()),
        Slot::Root { .. } | Slot::Item => None,
    }
}

impl FormatWriter for JsonWriter {
    fn begin_object(&mut self, slot: Slot<'_>) -> Result<(), EncodeError> {
        self.stack.push(Frame::Object(Map::new(), key_of(slot)));
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(Frame::Object(map, key)) => self.place(key, JsonValue::Object(map)),
            _ => Err(EncodeError::WriterState("no open object".to_owned())),
        }
    }

    fn begin_container(
        &mut self,
        slot: Slot<'_>,
        kind: ContainerKind<'_>,
    ) -> Result<(), EncodeError> {
        let frame = match kind {
            ContainerKind::Sequence { .. } => Frame::Array(Vec::new(), key_of(slot)),
            ContainerKind::Mapping => Frame::Object(Map::new(), key_of(slot)),
        };
        self.stack.push(frame);
        Ok(())
    }

    fn end_container(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(Frame::Array(items, key)) => self.place(key, JsonValue::Array(items)),
            Some(Frame::Object(map, key)) => self.place(key, JsonValue::Object(map)),
            None => Err(EncodeError::WriterState("no open container".to_owned())),
        }
    }

    fn write_scalar(&mut self, slot: Slot<'_>, value: Scalar<'_>) -> Result<(), EncodeError> {
        let json = match value {
            Scalar::Bool(b) => JsonValue::Bool(b),
            Scalar::Integer(i) => JsonValue::Number(i.into()),
            Scalar::Float(f) => Number::from_f64(f).map(JsonValue::Number).ok_or_else(|| {
                EncodeError::NonFiniteFloat {
                    field: slot.describe().to_owned(),
                }
            })?,
            Scalar::Text(s) => JsonValue::String(s.into_owned()),
        };
        self.place(key_of(slot), json)
    }

    fn write_null(&mut self, slot: Slot<'_>) -> Result<(), EncodeError> {
        self.place(key_of(slot), JsonValue::Null)
    }

    fn finish(self) -> Result<Vec<u8>, EncodeError> {
        if !self.stack.is_empty() {
            return Err(EncodeError::WriterState(
                "document finished with open structures".to_owned(),
            ));
        }
        let root = self
            .root
            .ok_or_else(|| EncodeError::WriterState("empty document".to_owned()))?;
        serde_json::to_vec(&root).map_err(|e| EncodeError::Io(e.to_string()))
    }
}
