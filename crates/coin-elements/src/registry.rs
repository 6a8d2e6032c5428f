//! Element type registry.
//!
//! Every element type a [`State`](crate::State) can hold is registered once
//! up front. The finished registry is immutable and shared by `Arc`; each
//! type's position in it is its [`StackIndex`].

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use coin_common::StateConfig;

use crate::accumulated::{ClipPlaneElement, ProfileElement};
use crate::element::Element;
use crate::lazy::LazyElement;
use crate::matrix::ModelMatrixElement;
use crate::override_element::OverrideElement;
use crate::scalar::{
    ComplexityElement, ComplexityTypeElement, CreaseAngleElement, DrawStyleElement, FocalDistanceElement,
    FontNameElement, FontSizeElement, LinePatternElement, LineWidthElement, MaterialBindingElement,
    NormalBindingElement, PickStyleElement, PointSizeElement, SwitchElement, UnitsElement,
};
use crate::stack::{AnyStack, Stack};

/// Slot of an element type in every [`State`](crate::State) built from the
/// same registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackIndex(usize);

impl StackIndex {
    /// Position in the registry.
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for StackIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type StackFactory = fn(&StateConfig) -> Box<dyn AnyStack>;

fn create_stack<E: Element>(config: &StateConfig) -> Box<dyn AnyStack> {
    Box::new(Stack::<E>::new(config))
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    type_id: TypeId,
    name: &'static str,
    create: StackFactory,
}

/// Builder for [`ElementRegistry`].
#[derive(Debug, Default)]
pub struct ElementRegistryBuilder {
    entries: Vec<RegistryEntry>,
    index: HashMap<TypeId, StackIndex>,
}

impl ElementRegistryBuilder {
    /// Register `E` and return its slot. Registering a type again returns
    /// the slot it already has.
    pub fn add<E: Element>(&mut self) -> StackIndex {
        let type_id = TypeId::of::<E>();
        if let Some(&index) = self.index.get(&type_id) {
            return index;
        }
        let index = StackIndex(self.entries.len());
        self.entries.push(RegistryEntry {
            type_id,
            name: E::NAME,
            create: create_stack::<E>,
        });
        let _ = self.index.insert(type_id, index);
        index
    }

    /// Register `E`, chaining.
    #[must_use]
    pub fn register<E: Element>(mut self) -> Self {
        let _ = self.add::<E>();
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> Arc<ElementRegistry> {
        log::debug!("element registry built with {} types", self.entries.len());
        Arc::new(ElementRegistry {
            entries: self.entries,
            index: self.index,
        })
    }
}

/// Immutable map from element type to [`StackIndex`].
#[derive(Debug)]
pub struct ElementRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<TypeId, StackIndex>,
}

impl ElementRegistry {
    /// Start an empty registry.
    pub fn builder() -> ElementRegistryBuilder {
        ElementRegistryBuilder::default()
    }

    /// Registry holding every element type in this crate.
    pub fn standard() -> Arc<Self> {
        Self::builder()
            .register::<OverrideElement>()
            .register::<LazyElement>()
            .register::<ModelMatrixElement>()
            .register::<ClipPlaneElement>()
            .register::<ProfileElement>()
            .register::<ComplexityElement>()
            .register::<ComplexityTypeElement>()
            .register::<CreaseAngleElement>()
            .register::<LineWidthElement>()
            .register::<PointSizeElement>()
            .register::<FontSizeElement>()
            .register::<FontNameElement>()
            .register::<DrawStyleElement>()
            .register::<LinePatternElement>()
            .register::<PickStyleElement>()
            .register::<MaterialBindingElement>()
            .register::<NormalBindingElement>()
            .register::<SwitchElement>()
            .register::<UnitsElement>()
            .register::<FocalDistanceElement>()
            .build()
    }

    /// Slot of `E`, if registered.
    pub fn try_stack_index<E: Element>(&self) -> Option<StackIndex> {
        self.index.get(&TypeId::of::<E>()).copied()
    }

    /// Slot of `E`.
    ///
    /// # Panics
    ///
    /// If `E` was not registered.
    pub fn stack_index<E: Element>(&self) -> StackIndex {
        match self.try_stack_index::<E>() {
            Some(index) => index,
            None => panic!("element {} is not registered", E::NAME),
        }
    }

    /// Name of the element type in `index`.
    pub fn name_of(&self, index: StackIndex) -> Option<&'static str> {
        self.entries.get(index.0).map(|entry| entry.name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn create_stacks(&self, config: &StateConfig) -> Vec<Box<dyn AnyStack>> {
        self.entries.iter().map(|entry| (entry.create)(config)).collect()
    }

    pub(crate) fn contains(&self, index: StackIndex) -> bool {
        self.entries
            .get(index.0)
            .is_some_and(|entry| self.index.get(&entry.type_id) == Some(&index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_registration_keeps_slot() {
        let mut builder = ElementRegistry::builder();
        let first = builder.add::<ComplexityElement>();
        let _ = builder.add::<LineWidthElement>();
        assert_eq!(builder.add::<ComplexityElement>(), first);
        let registry = builder.build();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name_of(first), Some("ComplexityElement"));
    }

    #[test]
    fn test_standard_registry_has_every_element() {
        let registry = ElementRegistry::standard();
        assert!(registry.try_stack_index::<LazyElement>().is_some());
        assert!(registry.try_stack_index::<UnitsElement>().is_some());
        assert!(registry.contains(registry.stack_index::<ModelMatrixElement>()));
    }

    #[test]
    #[should_panic(expected = "element LineWidthElement is not registered")]
    fn test_unregistered_lookup_panics() {
        let registry = ElementRegistry::builder().register::<ComplexityElement>().build();
        let _ = registry.stack_index::<LineWidthElement>();
    }
}
