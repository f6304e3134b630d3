//! JSON reader.
//!
//! Parses the whole payload into a `serde_json::Value` tree up front and walks
//! it with a cursor. Object frames keep their remaining members in a deque so
//! the discriminator can be found ahead of the field scan.

use std::collections::VecDeque;
use std::vec;

use serde_json::Value as JsonValue;
use wireplan_codec::{ContainerKind, DecodeError, FieldKey, FormatReader, RawScalar};
use wireplan_model::XmlPlacement;

#[derive(Debug)]
enum Frame {
    Object(VecDeque<(String, JsonValue)>),
    Array(vec::IntoIter<JsonValue>),
}

/// [`FormatReader`] over a JSON document.
#[derive(Debug)]
pub struct JsonReader {
    cursor: Option<JsonValue>,
    stack: Vec<Frame>,
}

impl JsonReader {
    /// Parse `bytes` and place the cursor on the document root.
    pub fn new(bytes: &[u8]) -> Result<Self, DecodeError> {
        let root: JsonValue =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Syntax(e.to_string()))?;
        Ok(Self {
            cursor: Some(root),
            stack: Vec::new(),
        })
    }

    fn take(&mut self) -> Result<JsonValue, DecodeError> {
        self.cursor
            .take()
            .ok_or_else(|| DecodeError::Syntax("no value at cursor".to_owned()))
    }

    fn enter_object(&mut self, expected: &str) -> Result<(), DecodeError> {
        match self.take()? {
            JsonValue::Object(map) => {
                self.stack.push(Frame::Object(map.into_iter().collect()));
                Ok(())
            }
            other => Err(mismatch(expected, &other)),
        }
    }
}

fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn mismatch(expected: &str, found: &JsonValue) -> DecodeError {
    DecodeError::TypeMismatch {
        field: String::from("<json>"),
        expected: expected.to_owned(),
        found: kind_name(found).to_owned(),
    }
}

impl FormatReader for JsonReader {
    fn begin_object(&mut self) -> Result<(), DecodeError> {
        self.enter_object("object")
    }

    fn next_key(&mut self) -> Result<Option<FieldKey>, DecodeError> {
        let Some(Frame::Object(members)) = self.stack.last_mut() else {
            return Err(DecodeError::Syntax("not inside an object".to_owned()));
        };
        match members.pop_front() {
            Some((key, value)) => {
                self.cursor = Some(value);
                Ok(Some(FieldKey::element(key)))
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
        _placement: XmlPlacement,
    ) -> Result<Option<String>, DecodeError> {
        let Some(Frame::Object(members)) = self.stack.last() else {
            return Ok(None);
        };
        Ok(members.iter().find_map(|(key, value)| match value {
            JsonValue::String(s) if key == name => Some(s.clone()),
            _ => None,
        }))
    }

    fn is_null(&mut self) -> Result<bool, DecodeError> {
        if matches!(self.cursor, Some(JsonValue::Null)) {
            self.cursor = None;
            return Ok(true);
        }
        Ok(false)
    }

    fn read_scalar(&mut self) -> Result<RawScalar, DecodeError> {
        match self.take()? {
            JsonValue::Bool(b) => Ok(RawScalar::Bool(b)),
            JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(RawScalar::Integer(i)),
                (None, Some(f)) => Ok(RawScalar::Float(f)),
                (None, None) => Err(DecodeError::Syntax(format!("unrepresentable number {n}"))),
            },
            JsonValue::String(s) => Ok(RawScalar::Text(s)),
            other => Err(mismatch("scalar", &other)),
        }
    }

    fn begin_container(&mut self, kind: ContainerKind<'_>) -> Result<(), DecodeError> {
        match kind {
            ContainerKind::Sequence { .. } => match self.take()? {
                JsonValue::Array(items) => {
                    self.stack.push(Frame::Array(items.into_iter()));
                    Ok(())
                }
                other => Err(mismatch("array", &other)),
            },
            ContainerKind::Mapping => self.enter_object("map"),
        }
    }

    fn next_element(&mut self) -> Result<bool, DecodeError> {
        let Some(Frame::Array(items)) = self.stack.last_mut() else {
            return Err(DecodeError::Syntax("not inside an array".to_owned()));
        };
        match items.next() {
            Some(value) => {
                self.cursor = Some(value);
                Ok(true)
            }
            None => {
                self.stack.pop();
                Ok(false)
            }
        }
    }

    fn next_entry(&mut self) -> Result<Option<String>, DecodeError> {
        Ok(self.next_key()?.map(|key| key.name))
    }

    fn skip_value(&mut self) -> Result<(), DecodeError> {
        self.cursor = None;
        Ok(())
    }
}
