//! Identifier indirection.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::container::Container;
use crate::error::{ContainerError, ContainerResult};
use crate::internal::Map;

/// Source identifier to target identifier.
#[derive(Default, Debug)]
pub(crate) struct AliasMap {
    targets: Map<String, String>,
}

impl AliasMap {
    /// Records `from -> to`, returning the previous target of `from`.
    pub(crate) fn insert(&mut self, from: &str, to: &str) -> Option<String> {
        self.targets.insert(from.to_string(), to.to_string())
    }

    /// Puts back the state that existed before an `insert`.
    pub(crate) fn restore(&mut self, from: &str, previous: Option<String>) {
        match previous {
            Some(target) => self.targets.insert(from.to_string(), target),
            None => self.targets.remove(from),
        };
    }

    /// End of the alias chain starting at `id`.
    ///
    /// Every identifier visited is tracked; reaching one twice is an
    /// [`ContainerError::AliasCycle`] whose path ends with the repeated id.
    pub(crate) fn canonical(&self, id: &str) -> ContainerResult<String> {
        let mut current = id;
        let mut path: Vec<&str> = vec![id];
        while let Some(next) = self.targets.get(current) {
            trace!(from = current, to = next.as_str(), "alias hop");
            if path.contains(&next.as_str()) {
                let mut cycle: Vec<String> = path.iter().map(|s| s.to_string()).collect();
                cycle.push(next.clone());
                return Err(ContainerError::AliasCycle { path: cycle });
            }
            path.push(next);
            current = next.as_str();
        }
        Ok(current.to_string())
    }

    pub(crate) fn snapshot(&self) -> BTreeMap<String, String> {
        self.targets
            .iter()
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect()
    }
}

impl Container {
    /// Canonical identifier `id` resolves to through the alias chain.
    ///
    /// ```rust
    /// use ferrous_autowire::{Container, ContainerError};
    ///
    /// let mut container = Container::new();
    /// container.set_alias("A", "B").unwrap();
    /// container.set_alias("B", "C").unwrap();
    /// assert_eq!(container.canonical_id("A").unwrap(), "C");
    /// assert_eq!(container.canonical_id("C").unwrap(), "C");
    ///
    /// container.set_alias("C", "A").unwrap();
    /// assert!(matches!(container.canonical_id("A"), Err(ContainerError::AliasCycle { .. })));
    /// ```
    pub fn canonical_id(&self, id: &str) -> ContainerResult<String> {
        self.aliases.canonical(id)
    }

    /// Makes `from` resolve as `to`.
    ///
    /// Any instance the container built for `from` is dropped from the cache.
    /// Configuration registered under `from` moves to the canonical target of
    /// `to`: its factory and argument overrides replace the target's, its
    /// decorators run after the target's, and a supplied instance moves along
    /// when it conforms to the target's declared type.
    ///
    /// An alias that closes a cycle is still recorded (re-aliasing `from`
    /// breaks it); nothing migrates and later lookups through the chain fail
    /// with [`ContainerError::AliasCycle`].
    ///
    /// # Errors
    ///
    /// [`ContainerError::TypeMismatch`] when the supplied instance of `from`
    /// does not conform to the target's type. The alias is not recorded and
    /// nothing moves.
    pub fn set_alias(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> ContainerResult<()> {
        let from = from.into();
        let to = to.into();

        let previous = self.aliases.insert(&from, &to);
        self.cache.evict_built(&from);
        debug!(from = from.as_str(), to = to.as_str(), "alias set");

        let target = match self.aliases.canonical(&from) {
            Ok(target) => target,
            Err(err) => {
                warn!(
                    from = from.as_str(),
                    to = to.as_str(),
                    error = %err,
                    "alias closes a cycle, nothing migrated"
                );
                return Ok(());
            }
        };

        if let Some(supplied) = self.cache.supplied(&from) {
            if let Some(declared) = self.catalog.get(&target) {
                if !supplied.conforms_to(&declared.type_info()) {
                    let err = ContainerError::TypeMismatch {
                        subject: format!("instance of `{from}` moved to `{target}`"),
                        expected: declared.type_info().type_name,
                        actual: supplied.type_name(),
                    };
                    self.aliases.restore(&from, previous);
                    return Err(err);
                }
            }
        }

        let mut migrated = false;
        if let Some(registration) = self.registry.remove(&from) {
            debug!(
                from = from.as_str(),
                canonical = target.as_str(),
                factory = registration.factory.is_some(),
                overrides = registration.overrides.is_some(),
                decorators = registration.decorators.len(),
                "migrating registration"
            );
            self.registry.entry(&target).absorb(registration);
            migrated = true;
        }
        if let Some(instance) = self.cache.take_supplied(&from) {
            debug!(
                from = from.as_str(),
                canonical = target.as_str(),
                "migrating supplied instance"
            );
            self.cache.evict(&target);
            self.cache.insert_supplied(&target, instance);
            migrated = true;
        } else if migrated {
            self.cache.evict_built(&target);
        }
        Ok(())
    }

    /// Current alias map, sorted by source identifier.
    pub fn aliases(&self) -> BTreeMap<String, String> {
        self.aliases.snapshot()
    }
}
