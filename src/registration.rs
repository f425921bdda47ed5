//! Registration store: per canonical identifier configuration and the
//! instance cache.

use std::sync::Arc;

use tracing::debug;

use crate::arguments::Overrides;
use crate::container::Container;
use crate::descriptors::{Decorator, Factory};
use crate::error::{ContainerError, ContainerResult};
use crate::instance::Instance;
use crate::internal::Map;

/// Everything registered for one canonical identifier.
#[derive(Clone, Default)]
pub(crate) struct Registration {
    pub(crate) factory: Option<Arc<Factory>>,
    pub(crate) overrides: Option<Arc<Overrides>>,
    pub(crate) decorators: Vec<Arc<Decorator>>,
}

impl Registration {
    /// Takes over the configuration of an aliased identifier: its factory and
    /// overrides replace ours, its decorators run after ours.
    pub(crate) fn absorb(&mut self, other: Registration) {
        if other.factory.is_some() {
            self.factory = other.factory;
        }
        if other.overrides.is_some() {
            self.overrides = other.overrides;
        }
        self.decorators.extend(other.decorators);
    }
}

/// Registrations keyed by canonical identifier
#[derive(Default)]
pub(crate) struct Registry {
    entries: Map<String, Registration>,
}

impl Registry {
    pub(crate) fn get(&self, id: &str) -> Option<&Registration> {
        self.entries.get(id)
    }

    pub(crate) fn entry(&mut self, id: &str) -> &mut Registration {
        self.entries.entry(id.to_string()).or_default()
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Registration> {
        self.entries.remove(id)
    }

    pub(crate) fn has_factory(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|r| r.factory.is_some())
    }
}

/// Where a cached instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOrigin {
    /// Built by the container
    Built,
    /// Handed in through `set_instance`
    Supplied,
}

struct CachedInstance {
    instance: Instance,
    origin: CacheOrigin,
}

/// Most recent instance per canonical identifier.
#[derive(Default)]
pub(crate) struct InstanceCache {
    entries: Map<String, CachedInstance>,
}

impl InstanceCache {
    pub(crate) fn get(&self, id: &str) -> Option<&Instance> {
        self.entries.get(id).map(|cached| &cached.instance)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn origin(&self, id: &str) -> Option<CacheOrigin> {
        self.entries.get(id).map(|cached| cached.origin)
    }

    pub(crate) fn supplied(&self, id: &str) -> Option<&Instance> {
        self.entries
            .get(id)
            .filter(|cached| cached.origin == CacheOrigin::Supplied)
            .map(|cached| &cached.instance)
    }

    pub(crate) fn insert_built(&mut self, id: &str, instance: Instance) {
        self.insert(id, instance, CacheOrigin::Built);
    }

    pub(crate) fn insert_supplied(&mut self, id: &str, instance: Instance) {
        self.insert(id, instance, CacheOrigin::Supplied);
    }

    fn insert(&mut self, id: &str, instance: Instance, origin: CacheOrigin) {
        self.entries.insert(id.to_string(), CachedInstance { instance, origin });
    }

    pub(crate) fn take_supplied(&mut self, id: &str) -> Option<Instance> {
        if self.origin(id) != Some(CacheOrigin::Supplied) {
            return None;
        }
        self.entries.remove(id).map(|cached| cached.instance)
    }

    /// Drops the entry whatever its origin. Returns whether one existed.
    pub(crate) fn evict(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drops the entry only if the container built it.
    pub(crate) fn evict_built(&mut self, id: &str) -> bool {
        if self.origin(id) != Some(CacheOrigin::Built) {
            return false;
        }
        self.entries.remove(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Container {
    /// Uses `factory` instead of the constructor to build `id`.
    ///
    /// The factory replaces any previous one. Its output must conform to the
    /// declared type of `id`, which is checked when it runs.
    ///
    /// ```rust
    /// use ferrous_autowire::{Container, Signature};
    ///
    /// let mut container = Container::new();
    /// container
    ///     .set_factory("greeting", Signature::new("greet").factory(|_| Ok("hi".to_string())))
    ///     .unwrap();
    /// assert_eq!(*container.get_as::<String>("greeting").unwrap(), "hi");
    /// ```
    pub fn set_factory(&mut self, id: &str, factory: Factory) -> ContainerResult<()> {
        let canonical = self.aliases.canonical(id)?;
        debug!(id = canonical.as_str(), factory = factory.name(), "factory set");
        self.registry.entry(&canonical).factory = Some(Arc::new(factory));
        self.cache.evict(&canonical);
        Ok(())
    }

    /// Replaces the argument overrides used when constructing `id`.
    pub fn set_argument_overrides(
        &mut self,
        id: &str,
        overrides: Overrides,
    ) -> ContainerResult<()> {
        let canonical = self.aliases.canonical(id)?;
        debug!(id = canonical.as_str(), count = overrides.len(), "argument overrides set");
        self.registry.entry(&canonical).overrides = Some(Arc::new(overrides));
        self.cache.evict(&canonical);
        Ok(())
    }

    /// Layers `overrides` on top of the current ones; the new values win per
    /// parameter name.
    pub fn merge_argument_overrides(
        &mut self,
        id: &str,
        overrides: Overrides,
    ) -> ContainerResult<()> {
        let canonical = self.aliases.canonical(id)?;
        debug!(id = canonical.as_str(), count = overrides.len(), "argument overrides merged");
        let entry = self.registry.entry(&canonical);
        let mut merged = entry.overrides.as_deref().cloned().unwrap_or_default();
        merged.merge(overrides);
        entry.overrides = Some(Arc::new(merged));
        self.cache.evict(&canonical);
        Ok(())
    }

    /// Appends a decorator; decorators run in registration order.
    pub fn add_decorator(&mut self, id: &str, decorator: Decorator) -> ContainerResult<()> {
        let canonical = self.aliases.canonical(id)?;
        debug!(id = canonical.as_str(), decorator = decorator.name(), "decorator added");
        self.registry.entry(&canonical).decorators.push(Arc::new(decorator));
        self.cache.evict(&canonical);
        Ok(())
    }

    /// Stores a ready-made instance for `id`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::TypeMismatch`] when `id` is declared and `instance`
    /// does not conform to its type.
    pub fn set_instance(&mut self, id: &str, instance: Instance) -> ContainerResult<()> {
        let canonical = self.aliases.canonical(id)?;
        if let Some(declared) = self.catalog.get(&canonical) {
            if !instance.conforms_to(&declared.type_info()) {
                return Err(ContainerError::TypeMismatch {
                    subject: format!("instance supplied for `{canonical}`"),
                    expected: declared.type_info().type_name,
                    actual: instance.type_name(),
                });
            }
        }
        debug!(id = canonical.as_str(), ty = instance.type_name(), "instance supplied");
        self.cache.insert_supplied(&canonical, instance);
        Ok(())
    }

    /// Typed form of [`Container::set_instance`].
    pub fn set_instance_of<S: Send + Sync + 'static>(
        &mut self,
        id: &str,
        value: S,
    ) -> ContainerResult<()> {
        self.set_instance(id, Instance::new(value))
    }

    /// Whether an instance for `id` is currently cached.
    pub fn is_cached(&self, id: &str) -> ContainerResult<bool> {
        let canonical = self.aliases.canonical(id)?;
        Ok(self.cache.contains(&canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Signature;

    #[test]
    fn absorb_replaces_factory_and_appends_decorators() {
        let mut target = Registration::default();
        target.factory = Some(Arc::new(Signature::new("old").factory(|_| Ok(1u8))));
        let first = Signature::new("first").decorator::<u8, _>(|_, _| Ok(None));
        target.decorators.push(Arc::new(first));

        let mut moved = Registration::default();
        moved.factory = Some(Arc::new(Signature::new("new").factory(|_| Ok(2u8))));
        let second = Signature::new("second").decorator::<u8, _>(|_, _| Ok(None));
        moved.decorators.push(Arc::new(second));

        target.absorb(moved);
        assert_eq!(target.factory.unwrap().name(), "new");
        let names: Vec<_> = target.decorators.iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn absorb_keeps_own_overrides_when_none_move() {
        let mut target = Registration::default();
        target.overrides = Some(Arc::new(Overrides::new().with("n", 1u8)));
        target.absorb(Registration::default());
        assert!(target.overrides.unwrap().contains("n"));
    }

    #[test]
    fn cache_eviction_respects_origin() {
        let mut cache = InstanceCache::default();
        cache.insert_built("built", Instance::new(1u8));
        cache.insert_supplied("supplied", Instance::new(2u8));

        assert!(!cache.evict_built("supplied"));
        assert!(cache.evict_built("built"));
        assert!(cache.take_supplied("built").is_none());
        assert!(cache.take_supplied("supplied").is_some());
        assert_eq!(cache.len(), 0);
    }
}
