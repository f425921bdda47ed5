//! Error types for the service container.

use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by user callables.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Container errors
///
/// Every failure of a registration or resolution call is reported through this
/// type. The container performs no local recovery: a failed `get` leaves the
/// instance cache exactly as it was before the call.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, ContainerError};
///
/// let mut container = Container::new();
/// match container.get("Missing") {
///     Err(ContainerError::NotFound { id }) => assert_eq!(id, "Missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_autowire::ContainerError;
///
/// let cycle = ContainerError::AliasCycle {
///     path: vec!["A".to_string(), "B".to_string(), "A".to_string()],
/// };
/// assert_eq!(cycle.to_string(), "Alias cycle: A -> B -> A");
/// assert!(cycle.is_cycle());
/// ```
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    /// Identifier is neither a constructible type nor backed by a factory
    #[error("`{id}` is not a constructible type and has no factory")]
    NotFound {
        /// Canonical identifier that was requested
        id: String,
    },
    /// Following the alias chain revisited an identifier
    #[error("Alias cycle: {}", .path.join(" -> "))]
    AliasCycle {
        /// The chain as it was followed, ending with the repeated identifier
        path: Vec<String>,
    },
    /// Building an identifier required building itself
    #[error("Circular dependency: {}", .path.join(" -> "))]
    CircularDependency {
        /// Identifiers under construction, ending with the repeated one
        path: Vec<String>,
    },
    /// A value does not conform to the type it was declared or requested as
    #[error("Type mismatch for {subject}: expected `{expected}`, found `{actual}`")]
    TypeMismatch {
        /// What was being checked (an identifier, a parameter, ...)
        subject: String,
        /// Declared type name
        expected: &'static str,
        /// Type name of the offending value
        actual: &'static str,
    },
    /// No override, resolvable service, default or optionality for a parameter
    #[error("Unable to resolve a value for parameter `{parameter}` of `{callable}`")]
    UnresolvableParameter {
        /// Parameter name
        parameter: String,
        /// Name of the declaring callable
        callable: String,
    },
    /// Two different types were declared under one identifier
    #[error("Identifier `{id}` already names `{existing}`, cannot declare `{requested}`")]
    DuplicateIdentifier {
        /// The contested identifier
        id: String,
        /// Type already declared
        existing: &'static str,
        /// Type that attempted the declaration
        requested: &'static str,
    },
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A constructor, factory or decorator returned an error
    #[error("`{callable}` failed: {source}")]
    Callable {
        /// Name of the failing callable
        callable: String,
        /// The error it produced
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
    /// Configuration could not be loaded or applied
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ContainerError {
    /// Wraps an error produced by a user callable.
    ///
    /// ```rust
    /// use ferrous_autowire::ContainerError;
    ///
    /// let err = ContainerError::callable("Database::new", "connection refused");
    /// assert_eq!(err.to_string(), "`Database::new` failed: connection refused");
    /// ```
    pub fn callable(callable: impl Into<String>, error: impl Into<DynError>) -> Self {
        ContainerError::Callable {
            callable: callable.into(),
            source: Arc::from(error.into()),
        }
    }

    /// True for [`ContainerError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::NotFound { .. })
    }

    /// True for alias cycles and construction cycles.
    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            ContainerError::AliasCycle { .. } | ContainerError::CircularDependency { .. }
        )
    }
}

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;
