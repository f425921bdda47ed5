//! Type-erased service instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{ContainerError, ContainerResult};
use crate::key::TypeInfo;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// A resolved value together with the type it was created as.
///
/// Cloning an `Instance` shares the underlying value, so two clones are the
/// same instance in the singleton sense; [`Instance::ptr_eq`] checks that.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::Instance;
/// use std::sync::Arc;
///
/// let port = Instance::new(8080u16);
/// assert_eq!(*port.downcast::<u16>().unwrap(), 8080);
/// assert!(port.downcast::<u32>().is_err());
///
/// let same = port.clone();
/// assert!(port.ptr_eq(&same));
///
/// trait Greeter: Send + Sync { fn hi(&self) -> &'static str; }
/// struct English;
/// impl Greeter for English { fn hi(&self) -> &'static str { "hello" } }
///
/// let greeter = Instance::interface::<dyn Greeter>(Arc::new(English));
/// assert_eq!(greeter.as_interface::<dyn Greeter>().unwrap().hi(), "hello");
/// ```
#[derive(Clone)]
pub struct Instance {
    info: TypeInfo,
    value: AnyArc,
}

impl Instance {
    /// Wraps an owned value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value without re-allocating.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            value,
        }
    }

    /// Wraps a trait object; the payload type is `Arc<I>`.
    pub fn interface<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> Self {
        Self::new(value)
    }

    /// Type the value was created as.
    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    /// Name of the payload type.
    pub fn type_name(&self) -> &'static str {
        self.info.type_name
    }

    /// Whether this value is an instance of `declared`.
    pub fn conforms_to(&self, declared: &TypeInfo) -> bool {
        self.info.conforms_to(declared)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// Typed access to the shared value, returns the actual type name on failure.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, &'static str> {
        Arc::downcast::<T>(self.value.clone()).map_err(|_| self.info.type_name)
    }

    /// Typed access to an interface payload.
    pub fn as_interface<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, &'static str> {
        self.downcast::<Arc<I>>().map(|outer| (*outer).clone())
    }

    /// Like [`Instance::downcast`] but reporting a [`ContainerError::TypeMismatch`]
    /// that names `subject`.
    pub(crate) fn downcast_for<T: Send + Sync + 'static>(
        &self,
        subject: impl FnOnce() -> String,
    ) -> ContainerResult<Arc<T>> {
        self.downcast::<T>().map_err(|actual| ContainerError::TypeMismatch {
            subject: subject(),
            expected: std::any::type_name::<T>(),
            actual,
        })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.info.type_name)
            .field("ptr", &Arc::as_ptr(&self.value))
            .finish()
    }
}
