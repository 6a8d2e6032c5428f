//! Traversal state: one element stack per registered type.

use std::sync::Arc;

use coin_common::StateConfig;

use crate::cache::Cache;
use crate::element::Element;
use crate::lazy::LazyMask;
use crate::registry::{ElementRegistry, StackIndex};
use crate::stack::{AnyStack, Stack};

/// The state of one scene traversal.
///
/// `push` and `pop` bracket a traversal level. Element values are only
/// copied when written at a level deeper than the one that created the
/// current top, so a level that writes nothing costs nothing.
#[derive(Debug)]
pub struct State {
    registry: Arc<ElementRegistry>,
    config: StateConfig,
    stacks: Vec<Box<dyn AnyStack>>,
    depth: usize,
    caches: Vec<Cache>,
}

impl State {
    /// Fresh state with every element at its default.
    pub fn new(registry: Arc<ElementRegistry>, config: StateConfig) -> Self {
        let stacks = registry.create_stacks(&config);
        Self {
            registry,
            config,
            stacks,
            depth: 0,
            caches: Vec::new(),
        }
    }

    /// The registry this state was built from.
    pub fn registry(&self) -> &Arc<ElementRegistry> {
        &self.registry
    }

    /// The configuration this state was built with.
    pub const fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Current traversal depth.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a traversal level.
    pub fn push(&mut self) {
        self.depth += 1;
    }

    /// Leave a traversal level, discarding every element written in it.
    ///
    /// Popping at depth 0 is a contract violation; release builds ignore it.
    pub fn pop(&mut self) {
        debug_assert!(self.depth > 0, "State::pop called at depth 0");
        if self.depth == 0 {
            log::warn!("State::pop called at depth 0");
            return;
        }
        for stack in &mut self.stacks {
            stack.pop_depth(self.depth);
        }
        self.depth -= 1;
    }

    /// True if `E` is registered.
    pub fn is_enabled<E: Element>(&self) -> bool {
        self.registry.try_stack_index::<E>().is_some()
    }

    fn index_of<E: Element>(&self) -> StackIndex {
        self.registry.stack_index::<E>()
    }

    fn stack<E: Element>(&self, index: StackIndex) -> &Stack<E> {
        match self.stacks[index.get()].as_any().downcast_ref::<Stack<E>>() {
            Some(stack) => stack,
            None => panic!("stack {index} holds {}, not {}", self.stacks[index.get()].name(), E::NAME),
        }
    }

    fn stack_mut<E: Element>(&mut self, index: StackIndex) -> &mut Stack<E> {
        let name = self.stacks[index.get()].name();
        match self.stacks[index.get()].as_any_mut().downcast_mut::<Stack<E>>() {
            Some(stack) => stack,
            None => panic!("stack {index} holds {name}, not {}", E::NAME),
        }
    }

    /// Current value of `E`, recorded as a dependency of every open cache.
    pub fn get<E: Element>(&mut self) -> &E {
        let index = self.index_of::<E>();
        if E::TRACKED && !self.caches.is_empty() {
            let stack = &*self.stacks[index.get()];
            for cache in &mut self.caches {
                cache.record(index, stack);
            }
        }
        self.stack::<E>(index).top()
    }

    /// Current value of `E`, not recorded by caches.
    pub fn peek<E: Element>(&self) -> &E {
        self.stack::<E>(self.index_of::<E>()).top()
    }

    /// Writable value of `E` at the current depth.
    pub fn get_mut<E: Element>(&mut self) -> &mut E {
        let index = self.index_of::<E>();
        let depth = self.depth;
        self.stack_mut::<E>(index).top_mut(depth)
    }

    pub(crate) fn stack_dyn(&self, index: StackIndex) -> Option<&dyn AnyStack> {
        self.stacks.get(index.get()).map(|stack| &**stack)
    }

    // ========== Caches ==========

    /// Start recording dependencies into a new cache. Caches nest.
    pub fn open_cache(&mut self) {
        self.caches.push(Cache::default());
    }

    /// Stop recording into the innermost cache and return it.
    pub fn close_cache(&mut self) -> Option<Cache> {
        self.caches.pop()
    }

    /// True while at least one cache is open.
    pub fn is_cache_open(&self) -> bool {
        !self.caches.is_empty()
    }

    /// Mark every open cache invalid.
    pub fn invalidate_open_caches(&mut self) {
        for cache in &mut self.caches {
            cache.invalidate();
        }
    }

    /// Report lazy state a setter changed.
    pub fn lazy_did_set(&mut self, mask: LazyMask) {
        for cache in &mut self.caches {
            cache.add_did_set(mask);
        }
    }

    /// Report lazy state a setter found unchanged.
    pub fn lazy_didnt_set(&mut self, mask: LazyMask) {
        for cache in &mut self.caches {
            cache.add_didnt_set(mask);
        }
    }
}
