//! Construction cycle detection.

use std::ops::{Deref, DerefMut};

use crate::container::Container;
use crate::error::{ContainerError, ContainerResult};

/// Default limit on nested constructions.
///
/// Every nested build costs several stack frames, so the limit has to trip
/// well before a default 2 MiB thread stack runs out.
pub(crate) const MAX_DEPTH: usize = 128;

/// Identifiers currently being built, outermost first.
///
/// The container pushes a canonical identifier before building it and a
/// [`StackGuard`] pops it once the build returns, fails or unwinds. Seeing an
/// identifier that is already on the stack means the build needs itself.
#[derive(Debug)]
pub(crate) struct ResolutionStack {
    stack: Vec<String>,
    max_depth: usize,
}

impl ResolutionStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        ResolutionStack {
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Pushes `id`, failing on a cycle or when the depth limit is reached.
    pub(crate) fn enter(&mut self, id: &str) -> ContainerResult<()> {
        // Cycle check before pushing
        if let Some(start) = self.stack.iter().position(|open| open == id) {
            let mut path = self.stack[start..].to_vec();
            path.push(id.to_string());
            return Err(ContainerError::CircularDependency { path });
        }
        if self.stack.len() >= self.max_depth {
            return Err(ContainerError::DepthExceeded(self.max_depth));
        }
        self.stack.push(id.to_string());
        Ok(())
    }

    /// Drops every entry above `depth`.
    pub(crate) fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth);
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.stack.iter().any(|open| open == id)
    }
}

impl Default for ResolutionStack {
    fn default() -> Self {
        ResolutionStack::new(MAX_DEPTH)
    }
}

/// Exclusive access to a container while one identifier is being built.
///
/// Dropping the guard restores the resolution stack to the depth it had before
/// the identifier was pushed, including when a user callable panics.
pub(crate) struct StackGuard<'a> {
    container: &'a mut Container,
    depth: usize,
}

impl<'a> StackGuard<'a> {
    pub(crate) fn enter(container: &'a mut Container, id: &str) -> ContainerResult<Self> {
        let depth = container.resolving.depth();
        container.resolving.enter(id)?;
        Ok(StackGuard { container, depth })
    }
}

impl Deref for StackGuard<'_> {
    type Target = Container;

    fn deref(&self) -> &Container {
        self.container
    }
}

impl DerefMut for StackGuard<'_> {
    fn deref_mut(&mut self) -> &mut Container {
        self.container
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.container.resolving.truncate(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_id_reports_the_cycle_only() {
        let mut stack = ResolutionStack::default();
        stack.enter("Root").unwrap();
        stack.enter("A").unwrap();
        stack.enter("B").unwrap();

        let err = stack.enter("A").unwrap_err();
        match err {
            ContainerError::CircularDependency { path } => assert_eq!(path, ["A", "B", "A"]),
            other => panic!("unexpected error: {other}"),
        }
        // failed enter leaves the stack untouched
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn depth_limit() {
        let mut stack = ResolutionStack::new(2);
        stack.enter("a").unwrap();
        stack.enter("b").unwrap();
        assert!(matches!(stack.enter("c"), Err(ContainerError::DepthExceeded(2))));
    }

    #[test]
    fn truncate_pops_inner_ids() {
        let mut stack = ResolutionStack::default();
        stack.enter("X").unwrap();
        stack.enter("Y").unwrap();
        stack.enter("Z").unwrap();
        stack.truncate(1);
        assert!(stack.contains("X"));
        assert!(!stack.contains("Y"));
        stack.enter("Y").unwrap();
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn guard_restores_depth_on_drop() {
        let mut container = Container::new();
        container.resolving.enter("Outer").unwrap();
        {
            let mut guard = StackGuard::enter(&mut container, "Inner").unwrap();
            assert_eq!(guard.resolving.depth(), 2);
            assert!(matches!(
                StackGuard::enter(&mut guard, "Outer"),
                Err(ContainerError::CircularDependency { .. })
            ));
        }
        assert_eq!(container.resolving.depth(), 1);
        assert!(!container.resolving.contains("Inner"));
    }

    #[test]
    fn guard_restores_depth_when_unwinding() {
        let mut container = Container::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = StackGuard::enter(&mut container, "Boom").unwrap();
            panic!("callable failed");
        }));
        assert!(result.is_err());
        assert_eq!(container.resolving.depth(), 0);
    }
}
