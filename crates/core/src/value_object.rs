//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. Two
/// `Page { limit: 5, offset: 0 }` values are interchangeable; two tenders with
/// the same name are not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
