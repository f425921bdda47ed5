//! Static callable metadata: parameters, signatures and the callables built from them.
//!
//! Rust has no constructor reflection, so every constructible type describes
//! its constructor once through [`Injectable::constructor`](crate::Injectable::constructor)
//! and the container caches the resulting [`TypeDescriptor`]. Factories and
//! decorators are described the same way, which lets one argument resolver
//! serve all three.

use std::fmt;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::{ContainerError, ContainerResult};
use crate::instance::Instance;
use crate::key::TypeInfo;
use crate::traits::Injectable;

type Invoke =
    Arc<dyn Fn(&Arguments, Option<&Instance>) -> ContainerResult<Option<Instance>> + Send + Sync>;

/// How a parameter gets its value when no override names it.
#[derive(Clone)]
pub(crate) enum ParameterKind {
    /// Object or interface dependency, resolved through the container
    Service {
        target: String,
        discover: Option<Discovery>,
    },
    /// Scalar or configuration value, only ever filled from overrides or defaults
    Value,
}

/// Lets a service parameter declare its `Injectable` type on first use.
#[derive(Clone, Copy)]
pub(crate) struct Discovery {
    pub(crate) id: &'static str,
    pub(crate) describe: fn() -> TypeDescriptor,
}

/// A formal parameter of a constructor, factory or decorator.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Injectable, Parameter, Signature, Constructor};
///
/// struct Clock;
/// impl Injectable for Clock {
///     fn id() -> &'static str { "Clock" }
///     fn constructor() -> Constructor<Self> { Constructor::new(|_| Ok(Clock)) }
/// }
///
/// let clock = Parameter::service::<Clock>("clock");
/// assert!(clock.is_service());
/// assert_eq!(clock.target_id(), Some("Clock"));
///
/// let retries = Parameter::value::<u32>("retries").default(3u32);
/// assert!(!retries.is_service());
/// assert!(retries.has_default());
///
/// let label = Parameter::value::<String>("label").optional();
/// assert!(label.is_optional());
/// ```
#[derive(Clone)]
pub struct Parameter {
    name: String,
    info: TypeInfo,
    kind: ParameterKind,
    default: Option<Instance>,
    optional: bool,
}

impl Parameter {
    /// Dependency on an [`Injectable`] type, resolved under `T::id()`.
    ///
    /// The type is declared in the container's catalog the first time the
    /// parameter is resolved.
    pub fn service<T: Injectable>(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            info: TypeInfo::of::<T>(),
            kind: ParameterKind::Service {
                target: T::id().to_string(),
                discover: Some(Discovery {
                    id: T::id(),
                    describe: TypeDescriptor::of::<T>,
                }),
            },
            default: None,
            optional: false,
        }
    }

    /// Dependency on any payload type `S`, resolved under `id`.
    ///
    /// Used for types the container only knows through factories, supplied
    /// instances or [`Container::declare_default`](crate::Container::declare_default).
    pub fn service_of<S: Send + Sync + 'static>(
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Parameter {
            name: name.into(),
            info: TypeInfo::of::<S>(),
            kind: ParameterKind::Service {
                target: id.into(),
                discover: None,
            },
            default: None,
            optional: false,
        }
    }

    /// Dependency on an interface, stored as `Arc<I>` and resolved under `id`.
    pub fn interface<I: ?Sized + Send + Sync + 'static>(
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Parameter {
            name: name.into(),
            info: TypeInfo::interface::<I>(),
            kind: ParameterKind::Service {
                target: id.into(),
                discover: None,
            },
            default: None,
            optional: false,
        }
    }

    /// Scalar/configuration parameter. Never resolved through the container.
    pub fn value<V: Send + Sync + 'static>(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            info: TypeInfo::of::<V>(),
            kind: ParameterKind::Value,
            default: None,
            optional: false,
        }
    }

    /// Resolve a service parameter under a different identifier.
    ///
    /// No effect on value parameters.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        if let ParameterKind::Service { target, .. } = &mut self.kind {
            *target = id.into();
        }
        self
    }

    /// Declared default value.
    pub fn default<V: Send + Sync + 'static>(mut self, value: V) -> Self {
        self.default = Some(Instance::new(value));
        self
    }

    /// Marks the parameter optional: it becomes empty when nothing else applies.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_service(&self) -> bool {
        matches!(self.kind, ParameterKind::Service { .. })
    }

    /// Identifier a service parameter resolves, `None` for value parameters.
    pub fn target_id(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Service { target, .. } => Some(target),
            ParameterKind::Value => None,
        }
    }

    pub(crate) fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    pub(crate) fn default_value(&self) -> Option<&Instance> {
        self.default.as_ref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type", &self.info.type_name)
            .field("target", &self.target_id())
            .field("default", &self.default.is_some())
            .field("optional", &self.optional)
            .finish()
    }
}

/// Name and ordered parameter list of a callable.
///
/// A signature is the starting point for every callable the container
/// invokes: finish it with [`Signature::constructor`], [`Signature::factory`],
/// [`Signature::decorator`] or [`Signature::interface_decorator`].
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Parameter, Signature};
///
/// let factory = Signature::new("make_banner")
///     .param(Parameter::value::<String>("text").default("hello".to_string()))
///     .factory(|args| Ok(format!("*** {} ***", args.value::<String>("text")?)));
///
/// let mut container = Container::new();
/// let banner = container.invoke(&factory).unwrap();
/// assert_eq!(*banner.downcast::<String>().unwrap(), "*** hello ***");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Signature {
    name: String,
    params: Vec<Parameter>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter; declaration order is argument order.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Finishes a constructor for `T`.
    pub fn constructor<T, F>(self, build: F) -> Constructor<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Constructor {
            signature: self,
            build: Arc::new(build),
        }
    }

    /// Finishes a factory producing payload type `S`.
    pub fn factory<S, F>(self, build: F) -> Factory
    where
        S: Send + Sync + 'static,
        F: Fn(&Arguments) -> ContainerResult<S> + Send + Sync + 'static,
    {
        let invoke: Invoke = Arc::new(move |args: &Arguments, _: Option<&Instance>| {
            build(args).map(|value| Some(Instance::new(value)))
        });
        Factory {
            callable: Callable {
                signature: self,
                invoke,
            },
            output: TypeInfo::of::<S>(),
        }
    }

    /// Finishes a decorator over payload type `S`.
    ///
    /// The closure receives the current instance and the resolved arguments;
    /// returning `None` keeps the current instance.
    pub fn decorator<S, F>(self, decorate: F) -> Decorator
    where
        S: Send + Sync + 'static,
        F: Fn(Arc<S>, &Arguments) -> ContainerResult<Option<S>> + Send + Sync + 'static,
    {
        let name = self.name.clone();
        let invoke: Invoke = Arc::new(move |args: &Arguments, subject: Option<&Instance>| {
            let Some(subject) = subject else {
                return Ok(None);
            };
            let current = subject.downcast_for::<S>(|| format!("subject of `{name}`"))?;
            Ok(decorate(current, args)?.map(Instance::new))
        });
        Decorator {
            callable: Callable {
                signature: self,
                invoke,
            },
            subject: TypeInfo::of::<S>(),
        }
    }

    /// Finishes a decorator over an interface stored as `Arc<I>`.
    pub fn interface_decorator<I, F>(self, decorate: F) -> Decorator
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<I>, &Arguments) -> ContainerResult<Option<Arc<I>>> + Send + Sync + 'static,
    {
        self.decorator::<Arc<I>, _>(move |current, args| decorate((*current).clone(), args))
    }
}

/// Type-erased callable shared by factories, decorators and constructors.
#[derive(Clone)]
pub(crate) struct Callable {
    signature: Signature,
    invoke: Invoke,
}

impl Callable {
    pub(crate) fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn call(
        &self,
        args: &Arguments,
        subject: Option<&Instance>,
    ) -> ContainerResult<Option<Instance>> {
        (self.invoke)(args, subject)
    }
}

/// Constructor metadata for a type, produced by [`Injectable::constructor`].
pub struct Constructor<T> {
    signature: Signature,
    build: Arc<dyn Fn(&Arguments) -> ContainerResult<T> + Send + Sync>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Constructor without parameters.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&Arguments) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Signature::default().constructor(build)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    fn into_callable(self, owner: &str) -> Callable {
        let Constructor { mut signature, build } = self;
        if signature.name.is_empty() {
            signature.name = format!("{owner}::new");
        }
        let invoke: Invoke = Arc::new(move |args: &Arguments, _: Option<&Instance>| {
            build(args).map(|value| Some(Instance::new(value)))
        });
        Callable { signature, invoke }
    }
}

/// A registered replacement for reflective construction.
#[derive(Clone)]
pub struct Factory {
    callable: Callable,
    output: TypeInfo,
}

impl Factory {
    pub fn name(&self) -> &str {
        self.callable.signature.name()
    }

    pub fn signature(&self) -> &Signature {
        self.callable.signature()
    }

    /// Payload type this factory produces.
    pub fn output(&self) -> TypeInfo {
        self.output
    }

    pub(crate) fn call(&self, args: &Arguments) -> ContainerResult<Instance> {
        self.callable.call(args, None)?.ok_or_else(|| ContainerError::TypeMismatch {
            subject: format!("output of `{}`", self.name()),
            expected: self.output.type_name,
            actual: "nothing",
        })
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("signature", self.signature())
            .field("output", &self.output.type_name)
            .finish()
    }
}

/// A post-processing step applied to freshly built instances.
#[derive(Clone)]
pub struct Decorator {
    callable: Callable,
    subject: TypeInfo,
}

impl Decorator {
    pub fn name(&self) -> &str {
        self.callable.signature.name()
    }

    pub fn signature(&self) -> &Signature {
        self.callable.signature()
    }

    /// Payload type the decorator accepts and returns.
    pub fn subject(&self) -> TypeInfo {
        self.subject
    }

    pub(crate) fn call(
        &self,
        current: &Instance,
        args: &Arguments,
    ) -> ContainerResult<Option<Instance>> {
        self.callable.call(args, Some(current))
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("signature", self.signature())
            .field("subject", &self.subject.type_name)
            .finish()
    }
}

/// Catalog entry: what an identifier denotes and how to construct it.
///
/// Descriptors are computed once per type and cached by the container.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Constructor, Injectable, Parameter, Signature, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Engine;
/// impl Injectable for Engine {
///     fn id() -> &'static str { "Engine" }
///     fn constructor() -> Constructor<Self> { Constructor::new(|_| Ok(Engine)) }
/// }
///
/// struct Car { engine: Arc<Engine> }
/// impl Injectable for Car {
///     fn id() -> &'static str { "Car" }
///     fn constructor() -> Constructor<Self> {
///         Signature::new("Car::new")
///             .param(Parameter::service::<Engine>("engine"))
///             .constructor(|args| Ok(Car { engine: args.service("engine")? }))
///     }
/// }
///
/// let car = TypeDescriptor::of::<Car>();
/// assert_eq!(car.id(), "Car");
/// assert!(car.is_constructible());
/// assert_eq!(car.parameters().len(), 1);
/// assert_eq!(car.parameters()[0].name(), "engine");
///
/// trait Wheel: Send + Sync {}
/// let wheel = TypeDescriptor::interface::<dyn Wheel>("Wheel");
/// assert!(!wheel.is_constructible());
/// ```
#[derive(Clone)]
pub struct TypeDescriptor {
    id: String,
    info: TypeInfo,
    constructor: Option<Callable>,
}

impl TypeDescriptor {
    /// Descriptor of an [`Injectable`] type.
    pub fn of<T: Injectable>() -> Self {
        let id = T::id();
        TypeDescriptor {
            id: id.to_string(),
            info: TypeInfo::of::<T>(),
            constructor: Some(T::constructor().into_callable(id)),
        }
    }

    /// Descriptor of a type constructed through `Default`.
    pub fn default_of<T: Default + Send + Sync + 'static>(id: impl Into<String>) -> Self {
        let id = id.into();
        let constructor = Constructor::<T>::new(|_| Ok(T::default())).into_callable(&id);
        TypeDescriptor {
            id,
            info: TypeInfo::of::<T>(),
            constructor: Some(constructor),
        }
    }

    /// Descriptor of an interface: known type, not constructible.
    pub fn interface<I: ?Sized + Send + Sync + 'static>(id: impl Into<String>) -> Self {
        TypeDescriptor {
            id: id.into(),
            info: TypeInfo::interface::<I>(),
            constructor: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Constructor parameters, empty for interfaces.
    pub fn parameters(&self) -> &[Parameter] {
        self.constructor
            .as_ref()
            .map(|ctor| ctor.signature().params())
            .unwrap_or(&[])
    }

    pub(crate) fn constructor(&self) -> Option<&Callable> {
        self.constructor.as_ref()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("type", &self.info.type_name)
            .field("parameters", &self.parameters())
            .finish()
    }
}
