//! Collection classification.
//!
//! Decides, from a property's declared value type alone, whether a value is
//! written as one atomic value or iterated as an ordered sequence or a keyed
//! mapping. A string is never a collection, even though it is made of
//! characters; only explicit collection descriptors are.

use crate::types::{CollectionDescriptor, CollectionShape, TypeId, TypeRef};

/// The result of classifying a [`TypeRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// A named type written atomically (primitive, enum or object).
    Scalar(TypeId),
    /// An ordered sequence.
    Sequence(&'a CollectionDescriptor),
    /// A string-keyed mapping.
    Mapping(&'a CollectionDescriptor),
}

/// Classify a declared value type.
#[must_use]
pub fn classify(type_ref: &TypeRef) -> Classification<'_> {
    match type_ref {
        TypeRef::Named(id) => Classification::Scalar(*id),
        TypeRef::Collection(desc) => match desc.shape {
            CollectionShape::Sequence => Classification::Sequence(desc),
            CollectionShape::Mapping => Classification::Mapping(desc),
        },
    }
}
