//! Argument resolution: turning a signature into concrete, ordered arguments.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::container::Container;
use crate::descriptors::{Parameter, ParameterKind, Signature};
use crate::error::{ContainerError, ContainerResult};
use crate::instance::Instance;
use crate::internal::Map;

/// Explicit argument values keyed by parameter name.
///
/// Overrides short-circuit autowiring: a parameter named here never receives a
/// container-resolved value, even when its type is registered.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::Overrides;
///
/// let overrides = Overrides::new()
///     .with("name", "custom".to_string())
///     .with("retries", 5u32);
///
/// assert_eq!(overrides.len(), 2);
/// assert!(overrides.contains("name"));
/// assert_eq!(*overrides.get("retries").unwrap().downcast::<u32>().unwrap(), 5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    values: Map<String, Instance>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the value for `name`.
    pub fn with<V: Send + Sync + 'static>(self, name: impl Into<String>, value: V) -> Self {
        self.with_instance(name, Instance::new(value))
    }

    /// Adds an already shared value, e.g. a specific service instance.
    pub fn with_shared<V: Send + Sync + 'static>(
        self,
        name: impl Into<String>,
        value: Arc<V>,
    ) -> Self {
        self.with_instance(name, Instance::from_arc(value))
    }

    pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Instance) -> Option<Instance> {
        self.values.insert(name.into(), value)
    }

    /// Layers `other` on top of `self`; values from `other` win per name.
    pub fn merge(&mut self, other: Overrides) {
        self.values.extend(other.values);
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Resolved arguments of one call, in declaration order.
///
/// Accessors look arguments up by parameter name and fail with a
/// [`ContainerError`] rather than panicking when an argument is missing or has
/// an unexpected type.
#[derive(Clone, Debug)]
pub struct Arguments {
    callable: String,
    values: Vec<(String, Option<Instance>)>,
}

impl Arguments {
    pub(crate) fn empty(callable: impl Into<String>) -> Self {
        Arguments {
            callable: callable.into(),
            values: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: Option<Instance>) {
        self.values.push((name.into(), value));
    }

    /// Name of the callable these arguments were resolved for.
    pub fn callable(&self) -> &str {
        &self.callable
    }

    /// Raw argument; `Some(None)` is an optional parameter left empty.
    pub fn get(&self, name: &str) -> Option<Option<&Instance>> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.as_ref())
    }

    /// Arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Instance>)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Required shared dependency of payload type `T`.
    pub fn service<T: Send + Sync + 'static>(&self, name: &str) -> ContainerResult<Arc<T>> {
        self.optional_service(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn optional_service<T: Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> ContainerResult<Option<Arc<T>>> {
        match self.lookup(name)? {
            Some(instance) => instance.downcast_for::<T>(|| self.subject(name)).map(Some),
            None => Ok(None),
        }
    }

    /// Required interface dependency stored as `Arc<I>`.
    pub fn interface<I: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> ContainerResult<Arc<I>> {
        self.service::<Arc<I>>(name).map(|outer| (*outer).clone())
    }

    pub fn optional_interface<I: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> ContainerResult<Option<Arc<I>>> {
        Ok(self.optional_service::<Arc<I>>(name)?.map(|outer| (*outer).clone()))
    }

    /// Required value, cloned out of the shared argument.
    pub fn value<V: Clone + Send + Sync + 'static>(&self, name: &str) -> ContainerResult<V> {
        self.optional_value(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn optional_value<V: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> ContainerResult<Option<V>> {
        Ok(self.optional_service::<V>(name)?.map(|shared| (*shared).clone()))
    }

    fn lookup(&self, name: &str) -> ContainerResult<Option<&Instance>> {
        self.get(name).ok_or_else(|| self.missing(name))
    }

    fn missing(&self, name: &str) -> ContainerError {
        ContainerError::UnresolvableParameter {
            parameter: name.to_string(),
            callable: self.callable.clone(),
        }
    }

    fn subject(&self, name: &str) -> String {
        format!("parameter `{}` of `{}`", name, self.callable)
    }
}

impl Container {
    /// Produces the ordered arguments for `signature`.
    ///
    /// For each parameter the first applicable source wins:
    /// 1. the override keyed by the parameter name,
    /// 2. for service parameters, the container-resolved target when it is
    ///    resolvable and conforms to the declared type,
    /// 3. the declared default,
    /// 4. nothing, when the parameter is optional,
    ///
    /// otherwise the call fails with [`ContainerError::UnresolvableParameter`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_autowire::{Container, Overrides, Parameter, Signature};
    ///
    /// let signature = Signature::new("connect")
    ///     .param(Parameter::value::<String>("host").default("localhost".to_string()))
    ///     .param(Parameter::value::<u16>("port"))
    ///     .param(Parameter::value::<String>("user").optional());
    ///
    /// let mut container = Container::new();
    /// let overrides = Overrides::new().with("port", 5432u16);
    /// let args = container.resolve_arguments(&signature, Some(&overrides)).unwrap();
    ///
    /// assert_eq!(args.value::<String>("host").unwrap(), "localhost");
    /// assert_eq!(args.value::<u16>("port").unwrap(), 5432);
    /// assert_eq!(args.optional_value::<String>("user").unwrap(), None);
    ///
    /// assert!(container.resolve_arguments(&signature, None).is_err());
    /// ```
    pub fn resolve_arguments(
        &mut self,
        signature: &Signature,
        overrides: Option<&Overrides>,
    ) -> ContainerResult<Arguments> {
        self.resolve_arguments_with(signature, overrides, None)
    }

    /// Like [`Container::resolve_arguments`], offering `subject` to every service
    /// parameter whose declared type it conforms to.
    pub(crate) fn resolve_arguments_with(
        &mut self,
        signature: &Signature,
        overrides: Option<&Overrides>,
        subject: Option<&Instance>,
    ) -> ContainerResult<Arguments> {
        let mut args = Arguments::empty(signature.name());
        for param in signature.params() {
            let value = self.resolve_parameter(param, signature.name(), overrides, subject)?;
            args.push(param.name(), value);
        }
        Ok(args)
    }

    fn resolve_parameter(
        &mut self,
        param: &Parameter,
        callable: &str,
        overrides: Option<&Overrides>,
        subject: Option<&Instance>,
    ) -> ContainerResult<Option<Instance>> {
        let declared = param.type_info();

        if let Some(value) = overrides.and_then(|o| o.get(param.name())) {
            let value = coerce_override(value, param);
            ensure_conforms(&value, param, callable, "override")?;
            trace!(parameter = param.name(), callable, "using override");
            return Ok(Some(value));
        }

        if let ParameterKind::Service { target, discover } = param.kind() {
            if let Some(current) = subject.filter(|s| s.conforms_to(&declared)) {
                return Ok(Some(current.clone()));
            }
            if let Some(discovery) = discover {
                if !self.catalog.contains(discovery.id) {
                    self.catalog.declare((discovery.describe)())?;
                }
            }
            if self.is_resolvable(target)? {
                let candidate = self.resolve(target, false)?;
                if candidate.conforms_to(&declared) {
                    return Ok(Some(candidate));
                }
                warn!(
                    parameter = param.name(),
                    callable,
                    service = target.as_str(),
                    expected = declared.type_name,
                    actual = candidate.type_name(),
                    "rejecting nonconforming service"
                );
            }
        }

        if let Some(default) = param.default_value() {
            ensure_conforms(default, param, callable, "default")?;
            return Ok(Some(default.clone()));
        }

        if param.is_optional() {
            return Ok(None);
        }

        Err(ContainerError::UnresolvableParameter {
            parameter: param.name().to_string(),
            callable: callable.to_string(),
        })
    }
}

fn ensure_conforms(
    value: &Instance,
    param: &Parameter,
    callable: &str,
    source: &str,
) -> ContainerResult<()> {
    if value.conforms_to(&param.type_info()) {
        return Ok(());
    }
    Err(ContainerError::TypeMismatch {
        subject: format!("{} for parameter `{}` of `{}`", source, param.name(), callable),
        expected: param.type_info().type_name,
        actual: value.type_name(),
    })
}

#[cfg(feature = "config")]
fn coerce_override(value: &Instance, param: &Parameter) -> Instance {
    crate::config::coerce(value, &param.type_info()).unwrap_or_else(|| value.clone())
}

#[cfg(not(feature = "config"))]
fn coerce_override(value: &Instance, _param: &Parameter) -> Instance {
    value.clone()
}
