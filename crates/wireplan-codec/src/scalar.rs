//! Scalar text conventions shared by every backend.
//!
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 with `Z` (`2006-02-03T16:45:09.000Z`); at least
//!   milliseconds, widened to micro- or nanoseconds when the instant needs them
//! - Blobs: standard base64 with padding
//! - Floats: shortest round-trip decimal; NaN and infinities are rejected

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use wireplan_model::{PrimitiveKind, Value};

use crate::error::{DecodeError, EncodeError};

/// A scalar handed to a [`FormatWriter`](crate::FormatWriter).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    /// Boolean token.
    Bool(bool),
    /// Integer token.
    Integer(i64),
    /// Finite float token.
    Float(f64),
    /// Text token.
    Text(Cow<'a, str>),
}

impl Scalar<'_> {
    /// Text rendering for formats without typed scalar tokens.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Integer(i) => Cow::Owned(i.to_string()),
            Self::Float(f) => Cow::Owned(f.to_string()),
            Self::Text(s) => Cow::Borrowed(s.as_ref()),
        }
    }
}

/// A scalar token produced by a [`FormatReader`](crate::FormatReader).
#[derive(Debug, Clone, PartialEq)]
pub enum RawScalar {
    /// Boolean token.
    Bool(bool),
    /// Integral number token.
    Integer(i64),
    /// Non-integral number token.
    Float(f64),
    /// Text token.
    Text(String),
}

impl RawScalar {
    /// Short name used in type-mismatch errors.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

/// Format a `DateTime<Utc>` as ISO 8601 with a `Z` suffix.
///
/// The fraction keeps three digits unless dropping the rest would lose
/// precision.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    let nanos = dt.timestamp_subsec_nanos();
    let pattern = if nanos % 1_000_000 == 0 {
        "%Y-%m-%dT%H:%M:%S%.3fZ"
    } else if nanos % 1_000 == 0 {
        "%Y-%m-%dT%H:%M:%S%.6fZ"
    } else {
        "%Y-%m-%dT%H:%M:%S%.9fZ"
    };
    dt.format(pattern).to_string()
}

/// Parse an ISO 8601 timestamp, accepting offsets and a bare `Z` form.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ").map(|n| n.and_utc())
        })
        .ok()
}

/// Encode binary data as standard base64.
#[must_use]
pub fn encode_blob(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard base64.
pub fn decode_blob(s: &str) -> Option<Bytes> {
    STANDARD.decode(s.trim()).ok().map(Bytes::from)
}

/// Convert a runtime value into the scalar token for `kind`.
pub fn to_scalar<'v>(
    kind: PrimitiveKind,
    value: &'v Value,
    field: &str,
) -> Result<Scalar<'v>, EncodeError> {
    let mismatch = || EncodeError::TypeMismatch {
        field: field.to_owned(),
        expected: kind.to_string(),
        found: value.kind_name().to_owned(),
    };
    Ok(match (kind, value) {
        (PrimitiveKind::String, Value::String(s)) => Scalar::Text(Cow::Borrowed(s)),
        (PrimitiveKind::Boolean, Value::Bool(b)) => Scalar::Bool(*b),
        (PrimitiveKind::Integer, Value::Integer(i)) => {
            i32::try_from(*i).map_err(|_| mismatch())?;
            Scalar::Integer(*i)
        }
        (PrimitiveKind::Long, Value::Integer(i)) => Scalar::Integer(*i),
        (PrimitiveKind::Float | PrimitiveKind::Double, Value::Float(f)) => {
            if !f.is_finite() {
                return Err(EncodeError::NonFiniteFloat {
                    field: field.to_owned(),
                });
            }
            Scalar::Float(*f)
        }
        (PrimitiveKind::Timestamp, Value::Timestamp(ts)) => {
            Scalar::Text(Cow::Owned(format_timestamp(ts)))
        }
        (PrimitiveKind::Blob, Value::Blob(b)) => Scalar::Text(Cow::Owned(encode_blob(b))),
        _ => return Err(mismatch()),
    })
}

/// Convert a wire token into the runtime value for `kind`.
///
/// Text tokens are parsed for every kind, so text-only formats work through
/// the same path as formats with typed tokens.
#[allow(clippy::cast_precision_loss)]
pub fn to_value(kind: PrimitiveKind, raw: RawScalar, field: &str) -> Result<Value, DecodeError> {
    let invalid = |text: &str| DecodeError::InvalidScalar {
        field: field.to_owned(),
        kind: kind.to_string(),
        value: text.to_owned(),
    };
    let mismatch = |raw: &RawScalar| DecodeError::TypeMismatch {
        field: field.to_owned(),
        expected: kind.to_string(),
        found: raw.kind_name().to_owned(),
    };

    match (kind, raw) {
        (PrimitiveKind::String, RawScalar::Text(s)) => Ok(Value::String(s)),
        (PrimitiveKind::Boolean, RawScalar::Bool(b)) => Ok(Value::Bool(b)),
        (PrimitiveKind::Boolean, RawScalar::Text(s)) => match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid(&s)),
        },
        (PrimitiveKind::Integer, RawScalar::Integer(i)) => i32::try_from(i)
            .map(|_| Value::Integer(i))
            .map_err(|_| invalid(&i.to_string())),
        (PrimitiveKind::Integer, RawScalar::Text(s)) => s
            .trim()
            .parse::<i32>()
            .map(|i| Value::Integer(i64::from(i)))
            .map_err(|_| invalid(&s)),
        (PrimitiveKind::Long, RawScalar::Integer(i)) => Ok(Value::Integer(i)),
        (PrimitiveKind::Long, RawScalar::Text(s)) => {
            s.trim().parse::<i64>().map(Value::Integer).map_err(|_| invalid(&s))
        }
        (PrimitiveKind::Float | PrimitiveKind::Double, RawScalar::Float(f)) => Ok(Value::Float(f)),
        (PrimitiveKind::Float | PrimitiveKind::Double, RawScalar::Integer(i)) => {
            Ok(Value::Float(i as f64))
        }
        (PrimitiveKind::Float | PrimitiveKind::Double, RawScalar::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(|| invalid(&s)),
        (PrimitiveKind::Timestamp, RawScalar::Text(s)) => parse_timestamp(s.trim())
            .map(Value::Timestamp)
            .ok_or_else(|| invalid(&s)),
        (PrimitiveKind::Blob, RawScalar::Text(s)) => {
            decode_blob(&s).map(Value::Blob).ok_or_else(|| invalid(&s))
        }
        (_, raw) => Err(mismatch(&raw)),
    }
}
