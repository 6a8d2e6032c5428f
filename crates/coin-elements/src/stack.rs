//! Per-type element stacks with copy-on-write tops.

use std::any::Any;
use std::fmt;

use coin_common::StateConfig;

use crate::element::Element;

#[derive(Debug)]
struct Entry<E> {
    element: E,
    depth: usize,
}

/// Stack of one element type. The bottom entry always exists; `pushed`
/// holds the entries created by writes at deeper traversal levels, with
/// strictly increasing depths.
#[derive(Debug)]
pub(crate) struct Stack<E: Element> {
    bottom: E,
    pushed: Vec<Entry<E>>,
}

impl<E: Element> Stack<E> {
    pub(crate) fn new(config: &StateConfig) -> Self {
        Self {
            bottom: E::init(config),
            pushed: Vec::new(),
        }
    }

    pub(crate) fn top(&self) -> &E {
        self.pushed.last().map_or(&self.bottom, |entry| &entry.element)
    }

    fn top_entry_mut(&mut self) -> &mut E {
        match self.pushed.last_mut() {
            Some(entry) => &mut entry.element,
            None => &mut self.bottom,
        }
    }

    /// Writable top at `depth`, pushing a copy first when the current top
    /// belongs to a shallower level.
    pub(crate) fn top_mut(&mut self, depth: usize) -> &mut E {
        let needs_push = self.pushed.last().map_or(depth > 0, |entry| entry.depth < depth);
        if needs_push {
            let element = E::push(self.top());
            self.pushed.push(Entry { element, depth });
        }
        self.top_entry_mut()
    }

    /// Number of entries, including the bottom one.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pushed.len() + 1
    }
}

/// Type-erased view of a [`Stack`], stored by the state.
pub(crate) trait AnyStack: fmt::Debug + Send {
    fn name(&self) -> &'static str;
    /// Discard every entry created at `depth` or deeper.
    fn pop_depth(&mut self, depth: usize);
    fn snapshot(&self) -> Box<dyn Snapshot>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Element> AnyStack for Stack<E> {
    fn name(&self) -> &'static str {
        E::NAME
    }

    fn pop_depth(&mut self, depth: usize) {
        while self.pushed.last().is_some_and(|entry| entry.depth >= depth) {
            if let Some(discarded) = self.pushed.pop() {
                self.top_entry_mut().pop(&discarded.element);
            }
        }
    }

    fn snapshot(&self) -> Box<dyn Snapshot> {
        Box::new(TopSnapshot(self.top().copy_match_info()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Captured match info of one stack top.
pub(crate) trait Snapshot: fmt::Debug + Send {
    fn name(&self) -> &'static str;
    /// True if the stack's current top still matches the capture.
    fn still_matches(&self, stack: &dyn AnyStack) -> bool;
}

#[derive(Debug)]
struct TopSnapshot<E>(E);

impl<E: Element> Snapshot for TopSnapshot<E> {
    fn name(&self) -> &'static str {
        E::NAME
    }

    fn still_matches(&self, stack: &dyn AnyStack) -> bool {
        stack
            .as_any()
            .downcast_ref::<Stack<E>>()
            .is_some_and(|stack| stack.top().matches(&self.0))
    }
}
