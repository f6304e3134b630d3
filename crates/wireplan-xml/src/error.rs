//! XML backend error type.
//!
//! Backend failures never leak to callers as-is: writing failures surface as
//! [`EncodeError::Io`], reading failures as [`DecodeError::Syntax`].

use std::io;

use wireplan_codec::{DecodeError, EncodeError};

/// Errors raised while reading or writing XML markup.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The markup is not well-formed.
    #[error("malformed markup: {0}")]
    Markup(#[from] quick_xml::Error),

    /// An attribute could not be parsed.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document has no root element.
    #[error("document has no root element")]
    MissingRoot,

    /// The document ended before the open element was closed.
    #[error("document ended {0}")]
    Truncated(&'static str),

    /// A child element appeared where only text is allowed.
    #[error("element <{0}> inside scalar content")]
    NestedElement(String),

    /// Text or an attribute value could not be decoded.
    #[error("invalid text: {0}")]
    InvalidText(String),
}

impl From<XmlError> for EncodeError {
    fn from(err: XmlError) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<XmlError> for DecodeError {
    fn from(err: XmlError) -> Self {
        Self::Syntax(err.to_string())
    }
}
