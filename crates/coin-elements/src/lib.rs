//! Scene traversal state.
//!
//! A [`State`] keeps one stack per registered [`Element`] type. Nodes write
//! elements while the traversal visits them; `push`/`pop` around a group
//! make sure a child's writes never leak to its siblings.
//!
//! # Element families
//!
//! - [`OverrideElement`] - flags that lock elements against descendants
//! - [`LazyElement`] - material and lighting, applied lazily by renderers,
//!   with single-part views such as [`DiffuseColorElement`]
//! - [`ModelMatrixElement`] - the object-to-world transform
//! - [`ClipPlaneElement`], [`ProfileElement`] - accumulated lists
//! - [`ScalarElement`] instances such as [`LineWidthElement`]
//!
//! Reads through [`State::get`] are recorded by open caches; a [`Cache`]
//! stays valid while every recorded element still matches.
//!
//! # Example
//!
//! ```
//! use coin_common::StateConfig;
//! use coin_elements::{ElementRegistry, LineWidthElement, NodeId, State};
//!
//! let mut state = State::new(ElementRegistry::standard(), StateConfig::default());
//! state.push();
//! assert!(LineWidthElement::set(&mut state, NodeId(1), 3.0));
//! assert_eq!(LineWidthElement::get(&mut state), 3.0);
//! state.pop();
//! assert_eq!(LineWidthElement::get(&mut state), 0.0);
//! ```

/// Clip planes and profiles.
pub mod accumulated;
/// Render-cache dependency records.
pub mod cache;
/// The [`Element`] trait and node ids.
pub mod element;
/// Material and lighting state.
pub mod lazy;
/// The model matrix.
pub mod matrix;
/// Override flags.
pub mod override_element;
/// Element type registration.
pub mod registry;
/// Single-value elements.
pub mod scalar;
mod stack;
/// The traversal state.
pub mod state;

pub use accumulated::{ClipPlaneElement, NodeIds, ProfileElement, ProfileEntry, ProfileLinkage};
pub use cache::Cache;
pub use element::{Element, NodeId};
pub use lazy::{
    AmbientColorElement, Blending, DiffuseColorElement, EmissiveColorElement, LazyElement, LazyMask, LightModel,
    LightModelElement, Materials, SHININESS_THRESHOLD, ShininessElement, SpecularColorElement, TransparencyElement,
    VertexOrdering,
};
pub use matrix::{MatrixFlags, ModelMatrixElement};
pub use override_element::{OverrideElement, OverrideFlags};
pub use registry::{ElementRegistry, ElementRegistryBuilder, StackIndex};
pub use scalar::{
    Binding, ComplexityElement, ComplexityType, ComplexityTypeElement, CreaseAngleElement, DrawStyle,
    DrawStyleElement, FocalDistanceElement, FontNameElement, FontSizeElement, LinePatternElement, LineWidthElement,
    MaterialBindingElement, NormalBindingElement, PickStyle, PickStyleElement, PointSizeElement, ScalarElement,
    ScalarKind, SwitchElement, Units, UnitsElement,
};
pub use state::State;
