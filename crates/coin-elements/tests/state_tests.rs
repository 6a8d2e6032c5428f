//! Tests for traversal state: push/pop, overrides, lazy masks and caches.

use coin_common::StateConfig;
use coin_elements::{
    ClipPlaneElement, ComplexityElement, DiffuseColorElement, DrawStyle, DrawStyleElement, ElementRegistry,
    LazyElement, LazyMask, LineWidthElement, ModelMatrixElement, NodeId, OverrideElement, State, SwitchElement,
    TransparencyElement,
};
use coin_fields::{Color, Plane};
use glam::Vec3;

fn state() -> State {
    State::new(ElementRegistry::standard(), StateConfig::default())
}

fn state_with(config: StateConfig) -> State {
    State::new(ElementRegistry::standard(), config)
}

// ========== Push / pop ==========

#[test]
fn test_pop_restores_every_element() {
    let mut state = state();
    state.push();
    assert!(ComplexityElement::set(&mut state, NodeId(1), 0.9));
    assert!(SwitchElement::set(&mut state, NodeId(1), 2));
    ModelMatrixElement::translate_by(&mut state, NodeId(1), Vec3::X);
    ClipPlaneElement::add(&mut state, NodeId(1), Plane::new(Vec3::Y, 0.0));
    LazyElement::set_shininess(&mut state, 0.8);
    state.pop();

    assert_eq!(ComplexityElement::get(&mut state), 0.5);
    assert_eq!(SwitchElement::get(&mut state), -1);
    assert!(ModelMatrixElement::get_with_identity(&mut state).1);
    assert_eq!(state.peek::<ClipPlaneElement>().num(), 0);
    assert_eq!(state.peek::<LazyElement>().shininess(), 0.2);
}

#[test]
fn test_nested_levels_see_ancestor_values() {
    let mut state = state();
    assert!(LineWidthElement::set(&mut state, NodeId(1), 2.0));
    for depth in 1..=4 {
        state.push();
        assert_eq!(state.depth(), depth);
        assert_eq!(LineWidthElement::get(&mut state), 2.0);
    }
    assert!(LineWidthElement::set(&mut state, NodeId(2), 4.0));
    state.pop();
    assert_eq!(LineWidthElement::get(&mut state), 2.0);
    for _ in 0..3 {
        state.pop();
    }
    assert_eq!(state.depth(), 0);
}

#[test]
fn test_custom_registry_only_holds_registered_types() {
    let registry = ElementRegistry::builder().register::<SwitchElement>().build();
    let state = State::new(registry, StateConfig::default());
    assert!(state.is_enabled::<SwitchElement>());
    assert!(!state.is_enabled::<LazyElement>());
    assert_eq!(state.registry().len(), 1);
}

// ========== Overrides ==========

#[test]
fn test_coupled_diffuse_and_transparency_override() {
    let mut state = state();
    assert!(DiffuseColorElement::set(&mut state, NodeId(1), &[Color::new(1.0, 0.0, 0.0)]));
    OverrideElement::set_diffuse_color_override(&mut state, NodeId(1), true);
    state.push();
    assert!(!DiffuseColorElement::set(&mut state, NodeId(2), &[Color::new(0.0, 1.0, 0.0)]));
    assert!(!TransparencyElement::set(&mut state, NodeId(2), &[0.5]));
    assert_eq!(DiffuseColorElement::get(&mut state, 0), Color::new(1.0, 0.0, 0.0));
    assert_eq!(TransparencyElement::get(&mut state, 0), 0.0);
}

#[test]
fn test_separate_override_leaves_transparency_open() {
    let mut state = state_with(StateConfig::with_separate_override(true));
    OverrideElement::set_diffuse_color_override(&mut state, NodeId(1), true);
    state.push();
    assert!(!DiffuseColorElement::set(&mut state, NodeId(2), &[Color::new(0.0, 1.0, 0.0)]));
    assert!(TransparencyElement::set(&mut state, NodeId(2), &[0.5]));
    assert_eq!(TransparencyElement::get(&mut state, 0), 0.5);
    assert_eq!(TransparencyElement::num(&mut state), 1);
}

#[test]
fn test_override_ends_with_its_level() {
    let mut state = state();
    state.push();
    OverrideElement::set_draw_style_override(&mut state, NodeId(1), true);
    assert!(!DrawStyleElement::set(&mut state, NodeId(2), DrawStyle::Lines));
    state.pop();
    assert!(DrawStyleElement::set(&mut state, NodeId(2), DrawStyle::Lines));
    assert_eq!(DrawStyleElement::get(&mut state), DrawStyle::Lines);
}

// ========== Lazy masks ==========

#[test]
fn test_lazy_masks_reach_every_open_cache() {
    let mut state = state();
    state.open_cache();
    LazyElement::set_backface_culling(&mut state, true);
    state.open_cache();
    LazyElement::set_backface_culling(&mut state, true);
    LazyElement::set_twoside_lighting(&mut state, true);
    let inner = state.close_cache().unwrap();
    let outer = state.close_cache().unwrap();

    assert_eq!(inner.lazy_did_set(), LazyMask::TWOSIDE);
    assert_eq!(inner.lazy_didnt_set(), LazyMask::CULLING);
    assert_eq!(outer.lazy_did_set(), LazyMask::CULLING | LazyMask::TWOSIDE);
    assert_eq!(outer.lazy_didnt_set(), LazyMask::CULLING);
}

#[test]
fn test_lazy_reads_are_not_dependencies() {
    let mut state = state();
    state.open_cache();
    let _ = DiffuseColorElement::num(&mut state);
    let _ = state.get::<LazyElement>();
    let cache = state.close_cache().unwrap();
    assert_eq!(cache.num_dependencies(), 0);
}

#[test]
fn test_no_masks_without_open_cache() {
    let mut state = state();
    LazyElement::set_alpha_test(&mut state, 2, 0.3);
    state.open_cache();
    let cache = state.close_cache().unwrap();
    assert!(cache.lazy_did_set().is_empty());
    assert_eq!(state.peek::<LazyElement>().alpha_test(), (2, 0.3));
}

// ========== Caches ==========

#[test]
fn test_cache_tracks_read_elements() {
    let mut state = state();
    state.push();
    state.open_cache();
    let _ = LineWidthElement::get(&mut state);
    let _ = ComplexityElement::get(&mut state);
    let _ = LineWidthElement::get(&mut state);
    let cache = state.close_cache().unwrap();

    assert_eq!(cache.num_dependencies(), 2);
    assert_eq!(
        cache.dependency_names().collect::<Vec<_>>(),
        vec!["LineWidthElement", "ComplexityElement"]
    );
    let index = state.registry().stack_index::<ComplexityElement>();
    assert!(cache.depends_on(index));
    assert!(cache.is_valid(&state));

    assert!(LineWidthElement::set(&mut state, NodeId(3), 1.5));
    assert!(!cache.is_valid(&state));
    state.pop();
    assert!(cache.is_valid(&state));
}

#[test]
fn test_unread_elements_do_not_invalidate() {
    let mut state = state();
    state.open_cache();
    let _ = LineWidthElement::get(&mut state);
    let cache = state.close_cache().unwrap();
    assert!(SwitchElement::set(&mut state, NodeId(1), 0));
    assert!(cache.is_valid(&state));
}

#[test]
fn test_invalidate_open_caches() {
    let mut state = state();
    state.open_cache();
    state.invalidate_open_caches();
    let cache = state.close_cache().unwrap();
    assert!(cache.is_invalidated());
    assert!(!cache.is_valid(&state));
    assert!(state.close_cache().is_none());
    assert!(!state.is_cache_open());
}
