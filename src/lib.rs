//! # ferrous-autowire
//!
//! An autowiring service container: ask for an identifier, get an instance of
//! the type it denotes, with every constructor dependency resolved for you.
//!
//! ## Features
//!
//! - **Autowiring**: constructor parameters are described once as static
//!   metadata ([`Injectable`]) and resolved recursively
//! - **Singletons by default**: every identifier is built once and cached;
//!   [`Container::get_fresh`] forces a rebuild
//! - **Aliases**: identifiers can point at other identifiers, transitively,
//!   with cycle detection
//! - **Factories, overrides and decorators** registered per identifier, each
//!   invalidating the cached instance
//! - **Cycle detection**: construction cycles fail with the full path instead
//!   of overflowing the stack
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_autowire::{Constructor, Container, Injectable, Parameter, Signature};
//! use std::sync::Arc;
//!
//! struct Logger {
//!     sink: String,
//! }
//!
//! impl Injectable for Logger {
//!     fn id() -> &'static str { "Logger" }
//!     fn constructor() -> Constructor<Self> {
//!         Constructor::new(|_| Ok(Logger { sink: "stdout".to_string() }))
//!     }
//! }
//!
//! struct Service {
//!     log: Arc<Logger>,
//!     name: String,
//! }
//!
//! impl Injectable for Service {
//!     fn id() -> &'static str { "Service" }
//!     fn constructor() -> Constructor<Self> {
//!         Signature::new("Service::new")
//!             .param(Parameter::service::<Logger>("log"))
//!             .param(Parameter::value::<String>("name").default("svc".to_string()))
//!             .constructor(|args| {
//!                 Ok(Service { log: args.service("log")?, name: args.value("name")? })
//!             })
//!     }
//! }
//!
//! let mut container = Container::new();
//! let service = container.get_type::<Service>().unwrap();
//! assert_eq!(service.name, "svc");
//! assert_eq!(service.log.sink, "stdout");
//!
//! // Logger was declared on first use and is shared
//! let logger = container.get_type::<Logger>().unwrap();
//! assert!(Arc::ptr_eq(&logger, &service.log));
//! ```
//!
//! ## Factories and aliases
//!
//! ```rust
//! use ferrous_autowire::{Container, Signature};
//! use std::sync::Arc;
//!
//! trait Cache: Send + Sync {
//!     fn backend(&self) -> &'static str;
//! }
//!
//! struct Memory;
//! impl Cache for Memory {
//!     fn backend(&self) -> &'static str { "memory" }
//! }
//!
//! let mut container = Container::new();
//! container.declare_interface::<dyn Cache>("Cache").unwrap();
//! container
//!     .set_factory(
//!         "Cache",
//!         Signature::new("memory_cache").factory(|_| Ok(Arc::new(Memory) as Arc<dyn Cache>)),
//!     )
//!     .unwrap();
//! container.set_alias("SessionCache", "Cache").unwrap();
//!
//! let cache = container.get_interface::<dyn Cache>("SessionCache").unwrap();
//! assert_eq!(cache.backend(), "memory");
//! ```
//!
//! ## Decorators
//!
//! ```rust
//! use ferrous_autowire::{Container, Signature};
//!
//! let mut container = Container::new();
//! container
//!     .set_factory("banner", Signature::new("banner").factory(|_| Ok("hi".to_string())))
//!     .unwrap();
//! container
//!     .add_decorator(
//!         "banner",
//!         Signature::new("shout").decorator::<String, _>(|s, _| Ok(Some(s.to_uppercase()))),
//!     )
//!     .unwrap();
//! assert_eq!(*container.get_as::<String>("banner").unwrap(), "HI");
//! ```

pub mod arguments;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod instance;
pub mod key;
pub mod observer;
pub mod traits;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod alias;
mod catalog;
mod internal;
mod registration;

// Re-export core types
pub use arguments::{Arguments, Overrides};
pub use container::{Container, ContainerOptions, SharedContainer};
pub use descriptors::{Constructor, Decorator, Factory, Parameter, Signature, TypeDescriptor};
pub use error::{ContainerError, ContainerResult, DynError};
pub use instance::Instance;
pub use key::TypeInfo;
pub use observer::{ResolutionObserver, TracingObserver};
pub use traits::Injectable;

#[cfg(feature = "config")]
pub use config::ContainerConfig;
