//! The container: resolution pipeline and typed surface.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::alias::AliasMap;
use crate::catalog::TypeCatalog;
use crate::descriptors::Factory;
use crate::error::{ContainerError, ContainerResult};
use crate::instance::Instance;
use crate::internal::circular::MAX_DEPTH;
use crate::internal::{ResolutionStack, StackGuard};
use crate::observer::{Observers, ResolutionObserver};
use crate::registration::{InstanceCache, Registry};
use crate::traits::Injectable;

mod shared;

pub use shared::SharedContainer;

/// Tunables of a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Maximum number of nested builds in one resolution, 128 by default.
    ///
    /// Each nested build takes several stack frames; raise this only when
    /// resolving on a thread with a larger stack.
    pub max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        ContainerOptions { max_depth: MAX_DEPTH }
    }
}

/// Service container.
///
/// Resolves identifiers to instances: follows aliases to the canonical
/// identifier, returns the cached instance when there is one, and otherwise
/// builds it with the registered factory or the declared constructor,
/// autowiring arguments recursively, runs the decorators and caches the
/// result.
///
/// All operations take `&mut self`; share a container between threads with
/// [`SharedContainer`].
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Constructor, Container, Injectable, Overrides, Parameter, Signature};
/// use std::sync::Arc;
///
/// struct Logger;
/// impl Injectable for Logger {
///     fn id() -> &'static str { "Logger" }
///     fn constructor() -> Constructor<Self> { Constructor::new(|_| Ok(Logger)) }
/// }
///
/// struct Service { log: Arc<Logger>, name: String }
/// impl Injectable for Service {
///     fn id() -> &'static str { "Service" }
///     fn constructor() -> Constructor<Self> {
///         Signature::new("Service::new")
///             .param(Parameter::service::<Logger>("log"))
///             .param(Parameter::value::<String>("name").default("svc".to_string()))
///             .constructor(|args| {
///                 Ok(Service { log: args.service("log")?, name: args.value("name")? })
///             })
///     }
/// }
///
/// let mut container = Container::new();
/// let service = container.get_type::<Service>().unwrap();
/// assert_eq!(service.name, "svc");
///
/// container
///     .set_argument_overrides("Service", Overrides::new().with("name", "custom".to_string()))
///     .unwrap();
/// let custom = container.get_type::<Service>().unwrap();
/// assert_eq!(custom.name, "custom");
/// assert!(Arc::ptr_eq(&service.log, &custom.log));
/// ```
pub struct Container {
    pub(crate) catalog: TypeCatalog,
    pub(crate) aliases: AliasMap,
    pub(crate) registry: Registry,
    pub(crate) cache: InstanceCache,
    pub(crate) resolving: ResolutionStack,
    pub(crate) observers: Observers,
    options: ContainerOptions,
}

impl Container {
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Container {
            catalog: TypeCatalog::default(),
            aliases: AliasMap::default(),
            registry: Registry::default(),
            cache: InstanceCache::default(),
            resolving: ResolutionStack::new(options.max_depth),
            observers: Observers::default(),
            options,
        }
    }

    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    /// Registers an observer notified around every build.
    pub fn add_observer(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.add(observer);
    }

    /// Instance for `id`, built on first request and cached afterwards.
    ///
    /// # Errors
    ///
    /// [`ContainerError::AliasCycle`] for a broken alias chain,
    /// [`ContainerError::NotFound`] when the canonical identifier has neither
    /// a factory nor a constructible declaration, plus any error raised while
    /// building it or its dependencies. A failed call leaves the cache as it
    /// was.
    pub fn get(&mut self, id: &str) -> ContainerResult<Instance> {
        self.resolve(id, false)
    }

    /// Builds a new instance for `id` even when one is cached, and caches the
    /// new one in its place.
    ///
    /// Dependencies are still taken from the cache.
    pub fn get_fresh(&mut self, id: &str) -> ContainerResult<Instance> {
        self.resolve(id, true)
    }

    /// Typed resolution of an [`Injectable`], declaring it on first use.
    pub fn get_type<T: Injectable>(&mut self) -> ContainerResult<Arc<T>> {
        self.declare::<T>()?;
        self.get_as::<T>(T::id())
    }

    /// Typed form of [`Container::get_fresh`].
    pub fn get_fresh_type<T: Injectable>(&mut self) -> ContainerResult<Arc<T>> {
        self.declare::<T>()?;
        let instance = self.get_fresh(T::id())?;
        instance.downcast_for::<T>(|| format!("`{}`", T::id()))
    }

    /// Resolves `id` and downcasts the instance to payload type `S`.
    pub fn get_as<S: Send + Sync + 'static>(&mut self, id: &str) -> ContainerResult<Arc<S>> {
        let instance = self.get(id)?;
        instance.downcast_for::<S>(|| format!("`{id}`"))
    }

    /// Resolves an interface stored as `Arc<I>` under `id`.
    ///
    /// ```rust
    /// use ferrous_autowire::{Container, Instance};
    /// use std::sync::Arc;
    ///
    /// trait Store: Send + Sync { fn name(&self) -> &str; }
    /// struct Memory;
    /// impl Store for Memory { fn name(&self) -> &str { "memory" } }
    ///
    /// let mut container = Container::new();
    /// container.declare_interface::<dyn Store>("Store").unwrap();
    /// container
    ///     .set_instance("Store", Instance::interface::<dyn Store>(Arc::new(Memory)))
    ///     .unwrap();
    /// assert_eq!(container.get_interface::<dyn Store>("Store").unwrap().name(), "memory");
    /// ```
    pub fn get_interface<I: ?Sized + Send + Sync + 'static>(
        &mut self,
        id: &str,
    ) -> ContainerResult<Arc<I>> {
        self.get_as::<Arc<I>>(id).map(|outer| (*outer).clone())
    }

    /// Calls `callable` with autowired arguments without registering it.
    pub fn invoke(&mut self, callable: &Factory) -> ContainerResult<Instance> {
        let args = self.resolve_arguments(callable.signature(), None)?;
        callable.call(&args)
    }

    /// Whether `id` can currently be produced: it has a factory, a cached or
    /// supplied instance, or a constructible declaration.
    pub(crate) fn is_resolvable(&self, id: &str) -> ContainerResult<bool> {
        let canonical = self.aliases.canonical(id)?;
        Ok(self.cache.contains(&canonical)
            || self.registry.has_factory(&canonical)
            || self.catalog.is_constructible(&canonical))
    }

    pub(crate) fn resolve(&mut self, id: &str, fresh: bool) -> ContainerResult<Instance> {
        let canonical = self.aliases.canonical(id)?;

        if !fresh {
            if let Some(hit) = self.cache.get(&canonical) {
                trace!(id = canonical.as_str(), "cache hit");
                return Ok(hit.clone());
            }
        }

        let observe = self.observers.has_observers();
        let start = observe.then(Instant::now);
        if observe {
            self.observers.resolving(&canonical);
        }

        let result = StackGuard::enter(self, &canonical)
            .and_then(|mut guard| guard.build(&canonical));

        match result {
            Ok(instance) => {
                self.cache.insert_built(&canonical, instance.clone());
                debug!(
                    id = canonical.as_str(),
                    ty = instance.type_name(),
                    depth = self.resolving.depth(),
                    fresh,
                    "resolved"
                );
                if let Some(start) = start {
                    self.observers.resolved(&canonical, start.elapsed());
                }
                Ok(instance)
            }
            Err(err) => {
                if observe {
                    self.observers.failed(&canonical, &err);
                }
                Err(err)
            }
        }
    }

    /// Raw construction, conformance check and decoration of `canonical`.
    fn build(&mut self, canonical: &str) -> ContainerResult<Instance> {
        let registration = self.registry.get(canonical).cloned().unwrap_or_default();
        let declared = self.catalog.get(canonical);

        let mut instance = if let Some(factory) = &registration.factory {
            trace!(id = canonical, factory = factory.name(), "building with factory");
            let args = self.resolve_arguments(factory.signature(), None)?;
            let output = factory.call(&args)?;
            if let Some(declared) = &declared {
                if !output.conforms_to(&declared.type_info()) {
                    return Err(ContainerError::TypeMismatch {
                        subject: format!(
                            "output of factory `{}` for `{canonical}`",
                            factory.name()
                        ),
                        expected: declared.type_info().type_name,
                        actual: output.type_name(),
                    });
                }
            }
            output
        } else if let Some(constructor) = declared.as_ref().and_then(|d| d.constructor()) {
            trace!(
                id = canonical,
                constructor = constructor.signature().name(),
                "building with constructor"
            );
            let overrides = registration.overrides.as_deref();
            let args = self.resolve_arguments(constructor.signature(), overrides)?;
            constructor
                .call(&args, None)?
                .ok_or_else(|| ContainerError::NotFound { id: canonical.to_string() })?
        } else {
            return Err(ContainerError::NotFound { id: canonical.to_string() });
        };

        for decorator in &registration.decorators {
            let args = self.resolve_arguments_with(decorator.signature(), None, Some(&instance))?;
            if let Some(replacement) = decorator.call(&instance, &args)? {
                let expected = declared
                    .as_ref()
                    .map(|d| d.type_info())
                    .unwrap_or_else(|| instance.type_info());
                if !replacement.conforms_to(&expected) {
                    return Err(ContainerError::TypeMismatch {
                        subject: format!(
                            "output of decorator `{}` for `{canonical}`",
                            decorator.name()
                        ),
                        expected: expected.type_name,
                        actual: replacement.type_name(),
                    });
                }
                trace!(id = canonical, decorator = decorator.name(), "decorated");
                instance = replacement;
            }
        }

        Ok(instance)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("types", &self.catalog.len())
            .field("aliases", &self.aliases.snapshot())
            .field("cached", &self.cache.len())
            .field("observers", &self.observers.len())
            .field("options", &self.options)
            .finish()
    }
}
