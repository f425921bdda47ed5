//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::{ResolutionStack, StackGuard};

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;

#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;
