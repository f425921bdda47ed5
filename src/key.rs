//! Type identity used for conformance checks.

use std::any::TypeId;
use std::fmt;

/// Name and `TypeId` of a stored payload type.
///
/// Conformance ("is this value an instance of the declared type") is decided
/// by comparing `TypeId`s; the name only serves diagnostics. Interfaces are
/// stored as `Arc<dyn Trait>` payloads, so their `TypeInfo` is the one of
/// `Arc<dyn Trait>`.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::TypeInfo;
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {}
///
/// let string = TypeInfo::of::<String>();
/// assert_eq!(string.type_name, "alloc::string::String");
/// assert!(string.conforms_to(&TypeInfo::of::<String>()));
/// assert!(!string.conforms_to(&TypeInfo::of::<u32>()));
///
/// let logger = TypeInfo::interface::<dyn Logger>();
/// assert_eq!(logger, TypeInfo::of::<Arc<dyn Logger>>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// `std::any::type_name` of the payload
    pub type_name: &'static str,
    /// `TypeId` of the payload
    pub type_id: TypeId,
}

impl TypeInfo {
    /// `TypeInfo` of a sized payload type.
    #[inline(always)]
    pub fn of<T: 'static>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// `TypeInfo` of the `Arc<I>` payload an interface is stored as.
    #[inline(always)]
    pub fn interface<I: ?Sized + 'static>() -> TypeInfo {
        TypeInfo::of::<std::sync::Arc<I>>()
    }

    /// Whether a value of this type is an instance of `declared`.
    #[inline(always)]
    pub fn conforms_to(&self, declared: &TypeInfo) -> bool {
        self.type_id == declared.type_id
    }
}

// TypeId alone decides identity, the name is diagnostic only
impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_name() {
        let a = TypeInfo::of::<u64>();
        let b = TypeInfo {
            type_name: "renamed",
            type_id: TypeId::of::<u64>(),
        };
        assert_eq!(a, b);
        assert_ne!(a, TypeInfo::of::<u32>());
    }

    #[test]
    fn interface_uses_arc_payload() {
        trait Marker: Send + Sync {}
        let info = TypeInfo::interface::<dyn Marker>();
        assert!(info.type_name.starts_with("alloc::sync::Arc<"));
        assert_eq!(info.to_string(), info.type_name);
    }
}
