//! Constructor metadata for container-built types.

use crate::descriptors::Constructor;

/// A type the container can build by itself.
///
/// Implementors name the identifier they are registered under and describe
/// their constructor: its parameters in order and how to assemble the value
/// from the resolved [`Arguments`](crate::Arguments). The container reads this
/// metadata once per type and caches it in its catalog.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Constructor, Container, Injectable, Parameter, Signature};
/// use std::sync::Arc;
///
/// struct Config { url: String }
///
/// impl Injectable for Config {
///     fn id() -> &'static str { "Config" }
///     fn constructor() -> Constructor<Self> {
///         Signature::new("Config::new")
///             .param(Parameter::value::<String>("url").default("sqlite::memory:".to_string()))
///             .constructor(|args| Ok(Config { url: args.value("url")? }))
///     }
/// }
///
/// struct Repository { config: Arc<Config> }
///
/// impl Injectable for Repository {
///     fn id() -> &'static str { "Repository" }
///     fn constructor() -> Constructor<Self> {
///         Signature::new("Repository::new")
///             .param(Parameter::service::<Config>("config"))
///             .constructor(|args| Ok(Repository { config: args.service("config")? }))
///     }
/// }
///
/// let mut container = Container::new();
/// let repo = container.get_type::<Repository>().unwrap();
/// assert_eq!(repo.config.url, "sqlite::memory:");
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Identifier the type is declared under. Defaults to its type name.
    fn id() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Constructor description.
    fn constructor() -> Constructor<Self>;
}
