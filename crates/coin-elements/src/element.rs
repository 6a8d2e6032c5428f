//! The element trait: a typed payload plus the hooks its stack calls.

use std::fmt;

use coin_common::StateConfig;

/// Identity of the scene node that set a value. Zero means "no node" or
/// "the type default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The id of defaults.
    pub const NONE: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One kind of traversal state.
///
/// A [`State`](crate::State) keeps one stack per registered element type.
/// The bottom entry comes from [`init`](Self::init); a write at a deeper
/// traversal level first creates a new top with [`push`](Self::push).
pub trait Element: Clone + fmt::Debug + Send + 'static {
    /// Name used in diagnostics and panics.
    const NAME: &'static str;

    /// Whether reads through [`State::get`](crate::State::get) are recorded
    /// by open caches.
    const TRACKED: bool = true;

    /// The type default, created once per state.
    fn init(config: &StateConfig) -> Self;

    /// New top entry derived from the previous top.
    fn push(prev: &Self) -> Self {
        prev.clone()
    }

    /// Called on the restored top with the entry being discarded.
    fn pop(&mut self, _discarded: &Self) {}

    /// True if both payloads would render the same.
    fn matches(&self, other: &Self) -> bool;

    /// Minimal copy carrying what [`matches`](Self::matches) compares.
    fn copy_match_info(&self) -> Self {
        self.clone()
    }
}
