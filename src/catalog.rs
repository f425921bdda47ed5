//! Type catalog: per-identifier constructor metadata.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::container::Container;
use crate::descriptors::TypeDescriptor;
use crate::error::{ContainerError, ContainerResult};
use crate::internal::Map;
use crate::key::TypeInfo;
use crate::traits::Injectable;

/// Declared types keyed by identifier.
///
/// A descriptor is inserted once and never replaced, so the parameter
/// metadata of a type is computed a single time per container.
#[derive(Default)]
pub(crate) struct TypeCatalog {
    by_id: Map<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub(crate) fn get(&self, id: &str) -> Option<Arc<TypeDescriptor>> {
        self.by_id.get(id).cloned()
    }

    /// Declares `descriptor` under its identifier.
    ///
    /// Redeclaring the same type is a no-op; a different type under a taken
    /// identifier is rejected.
    pub(crate) fn declare(&mut self, descriptor: TypeDescriptor) -> ContainerResult<()> {
        if let Some(existing) = self.by_id.get(descriptor.id()) {
            if existing.type_info() == descriptor.type_info() {
                return Ok(());
            }
            return Err(ContainerError::DuplicateIdentifier {
                id: descriptor.id().to_string(),
                existing: existing.type_info().type_name,
                requested: descriptor.type_info().type_name,
            });
        }
        debug!(
            id = descriptor.id(),
            ty = descriptor.type_info().type_name,
            params = descriptor.parameters().len(),
            "declared type"
        );
        self.by_id.insert(descriptor.id().to_string(), Arc::new(descriptor));
        Ok(())
    }

    pub(crate) fn is_constructible(&self, id: &str) -> bool {
        self.by_id.get(id).is_some_and(|d| d.is_constructible())
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}

impl Container {
    /// Declares an [`Injectable`] type under `T::id()`.
    ///
    /// Typed resolution and service parameters declare their types on first
    /// use, so explicit declaration is only needed to make a type visible to
    /// [`Container::has`] or string lookups before anything else touched it.
    pub fn declare<T: Injectable>(&mut self) -> ContainerResult<()> {
        if let Some(existing) = self.catalog.get(T::id()) {
            // Compare types without rebuilding the metadata
            if existing.type_info() == TypeInfo::of::<T>() {
                return Ok(());
            }
            return Err(ContainerError::DuplicateIdentifier {
                id: T::id().to_string(),
                existing: existing.type_info().type_name,
                requested: std::any::type_name::<T>(),
            });
        }
        self.catalog.declare(TypeDescriptor::of::<T>())
    }

    /// Declares a type built through [`Default`] under `id`.
    pub fn declare_default<T: Default + Send + Sync + 'static>(
        &mut self,
        id: impl Into<String>,
    ) -> ContainerResult<()> {
        self.catalog.declare(TypeDescriptor::default_of::<T>(id))
    }

    /// Declares an interface under `id`. Interfaces are never constructible;
    /// they are backed by a factory, a supplied instance or an alias.
    pub fn declare_interface<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        id: impl Into<String>,
    ) -> ContainerResult<()> {
        self.catalog.declare(TypeDescriptor::interface::<I>(id))
    }

    /// Whether `id` names a constructible type.
    ///
    /// Only the catalog is consulted: factories, overrides and cached
    /// instances do not change the answer. An alias cycle answers `false`;
    /// [`Container::get`] reports it.
    ///
    /// ```rust
    /// use ferrous_autowire::Container;
    ///
    /// #[derive(Default)]
    /// struct Clock;
    ///
    /// let mut container = Container::new();
    /// assert!(!container.has("Clock"));
    /// container.declare_default::<Clock>("Clock").unwrap();
    /// container.set_alias("Time", "Clock").unwrap();
    /// assert!(container.has("Time"));
    /// ```
    pub fn has(&self, id: &str) -> bool {
        match self.aliases.canonical(id) {
            Ok(canonical) => self.catalog.is_constructible(&canonical),
            Err(err) => {
                warn!(id, error = %err, "has() on a broken alias chain");
                false
            }
        }
    }

    /// Catalog entry of the canonical identifier of `id`, if declared.
    pub fn descriptor(&self, id: &str) -> ContainerResult<Option<Arc<TypeDescriptor>>> {
        let canonical = self.aliases.canonical(id)?;
        Ok(self.catalog.get(&canonical))
    }
}
