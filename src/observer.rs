//! Resolution observers.
//!
//! Observers are notified around every build the container performs (cache
//! hits are not reported). They are meant for diagnostics: tracing, timing,
//! counting builds in tests.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ContainerError;

/// Hooks around instance construction.
///
/// All methods default to doing nothing.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, ResolutionObserver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl ResolutionObserver for Recorder {
///     fn resolved(&self, id: &str, _duration: Duration) {
///         self.0.lock().unwrap().push(id.to_string());
///     }
/// }
///
/// #[derive(Default)]
/// struct Clock;
///
/// let recorder = Arc::new(Recorder::default());
/// let mut container = Container::new();
/// container.add_observer(recorder.clone());
/// container.declare_default::<Clock>("Clock").unwrap();
///
/// container.get("Clock").unwrap();
/// container.get("Clock").unwrap();
/// assert_eq!(*recorder.0.lock().unwrap(), ["Clock"]);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// A build of canonical identifier `id` is starting.
    fn resolving(&self, _id: &str) {}

    /// The build of `id` finished and was cached.
    fn resolved(&self, _id: &str, _duration: Duration) {}

    /// The build of `id` failed; the cache was left untouched.
    fn failed(&self, _id: &str, _error: &ContainerError) {}
}

#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, id: &str) {
        for observer in &self.observers {
            observer.resolving(id);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, id: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(id, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, id: &str, error: &ContainerError) {
        for observer in &self.observers {
            observer.failed(id, error);
        }
    }
}

/// Observer emitting a `tracing` event per build.
///
/// Successful builds are logged at debug level, failures at warn level. The
/// `label` field lets several containers share one subscriber.
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self {
            label: "ferrous-autowire".to_string(),
        }
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for TracingObserver {
    fn resolving(&self, id: &str) {
        debug!(label = self.label.as_str(), id, "resolving");
    }

    fn resolved(&self, id: &str, duration: Duration) {
        debug!(
            label = self.label.as_str(),
            id,
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn failed(&self, id: &str, error: &ContainerError) {
        warn!(label = self.label.as_str(), id, %error, "resolution failed");
    }
}
