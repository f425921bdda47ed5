//! Thread-safe handle over a [`Container`].

use std::sync::Arc;

#[cfg(feature = "parking-lot")]
use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
use std::sync::{Mutex, MutexGuard};

use crate::arguments::Overrides;
use crate::descriptors::{Decorator, Factory};
use crate::error::ContainerResult;
use crate::instance::Instance;
use crate::traits::Injectable;

use super::Container;

/// Cloneable, thread-safe container handle.
///
/// Each call takes the lock once and runs the whole resolution, including
/// recursive dependency builds, inside it. Concurrent first requests for the
/// same identifier therefore build it exactly once.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, SharedContainer};
/// use std::thread;
///
/// #[derive(Default)]
/// struct Pool;
///
/// let mut container = Container::new();
/// container.declare_default::<Pool>("Pool").unwrap();
/// let shared = SharedContainer::new(container);
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let shared = shared.clone();
///         thread::spawn(move || shared.get("Pool").unwrap())
///     })
///     .collect();
/// let pools: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
/// assert!(pools.windows(2).all(|w| w[0].ptr_eq(&w[1])));
/// ```
#[derive(Clone)]
pub struct SharedContainer {
    inner: Arc<Mutex<Container>>,
}

impl SharedContainer {
    pub fn new(container: Container) -> Self {
        SharedContainer {
            inner: Arc::new(Mutex::new(container)),
        }
    }

    #[cfg(feature = "parking-lot")]
    fn lock(&self) -> MutexGuard<'_, Container> {
        self.inner.lock()
    }

    // A panic inside a user callable poisons the lock, the container itself
    // stays usable
    #[cfg(not(feature = "parking-lot"))]
    fn lock(&self) -> MutexGuard<'_, Container> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the container.
    pub fn with<R>(&self, f: impl FnOnce(&mut Container) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    pub fn has(&self, id: &str) -> bool {
        self.lock().has(id)
    }

    pub fn get(&self, id: &str) -> ContainerResult<Instance> {
        self.lock().get(id)
    }

    pub fn get_fresh(&self, id: &str) -> ContainerResult<Instance> {
        self.lock().get_fresh(id)
    }

    pub fn get_type<T: Injectable>(&self) -> ContainerResult<Arc<T>> {
        self.lock().get_type::<T>()
    }

    pub fn get_as<S: Send + Sync + 'static>(&self, id: &str) -> ContainerResult<Arc<S>> {
        self.lock().get_as::<S>(id)
    }

    pub fn get_interface<I: ?Sized + Send + Sync + 'static>(
        &self,
        id: &str,
    ) -> ContainerResult<Arc<I>> {
        self.lock().get_interface::<I>(id)
    }

    pub fn set_alias(&self, from: impl Into<String>, to: impl Into<String>) -> ContainerResult<()> {
        self.lock().set_alias(from, to)
    }

    pub fn set_factory(&self, id: &str, factory: Factory) -> ContainerResult<()> {
        self.lock().set_factory(id, factory)
    }

    pub fn set_argument_overrides(&self, id: &str, overrides: Overrides) -> ContainerResult<()> {
        self.lock().set_argument_overrides(id, overrides)
    }

    pub fn add_decorator(&self, id: &str, decorator: Decorator) -> ContainerResult<()> {
        self.lock().add_decorator(id, decorator)
    }

    pub fn set_instance(&self, id: &str, instance: Instance) -> ContainerResult<()> {
        self.lock().set_instance(id, instance)
    }
}

impl From<Container> for SharedContainer {
    fn from(container: Container) -> Self {
        SharedContainer::new(container)
    }
}
