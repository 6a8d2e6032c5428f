//! Render-cache dependency records.
//!
//! While a cache is open, every tracked read of an element stack stores a
//! match-info copy of the value read. The cache stays valid while each
//! stored copy still matches the corresponding stack top.

use crate::lazy::LazyMask;
use crate::registry::StackIndex;
use crate::stack::{AnyStack, Snapshot};
use crate::state::State;

#[derive(Debug)]
struct Dependency {
    index: StackIndex,
    snapshot: Box<dyn Snapshot>,
}

/// Dependencies captured between [`State::open_cache`] and
/// [`State::close_cache`].
#[derive(Debug, Default)]
pub struct Cache {
    dependencies: Vec<Dependency>,
    did_set: LazyMask,
    didnt_set: LazyMask,
    invalidated: bool,
}

impl Cache {
    pub(crate) fn record(&mut self, index: StackIndex, stack: &dyn AnyStack) {
        if self.dependencies.iter().any(|dep| dep.index == index) {
            return;
        }
        self.dependencies.push(Dependency {
            index,
            snapshot: stack.snapshot(),
        });
    }

    pub(crate) const fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub(crate) fn add_did_set(&mut self, mask: LazyMask) {
        self.did_set |= mask;
    }

    pub(crate) fn add_didnt_set(&mut self, mask: LazyMask) {
        self.didnt_set |= mask;
    }

    /// True if nothing this cache read has changed in `state`.
    pub fn is_valid(&self, state: &State) -> bool {
        if self.invalidated {
            return false;
        }
        self.dependencies.iter().all(|dep| {
            state.registry().contains(dep.index)
                && state
                    .stack_dyn(dep.index)
                    .is_some_and(|stack| dep.snapshot.still_matches(stack))
        })
    }

    /// True if [`State::invalidate_open_caches`] hit this cache.
    pub const fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Number of stacks read.
    pub fn num_dependencies(&self) -> usize {
        self.dependencies.len()
    }

    /// True if the stack in `index` was read.
    pub fn depends_on(&self, index: StackIndex) -> bool {
        self.dependencies.iter().any(|dep| dep.index == index)
    }

    /// Names of the element types read, in first-read order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dependencies.iter().map(|dep| dep.snapshot.name())
    }

    /// Lazy state changed while the cache was open.
    pub const fn lazy_did_set(&self) -> LazyMask {
        self.did_set
    }

    /// Lazy state set to an unchanged value while the cache was open.
    pub const fn lazy_didnt_set(&self) -> LazyMask {
        self.didnt_set
    }
}
