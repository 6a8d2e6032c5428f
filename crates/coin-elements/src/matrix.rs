//! The model matrix element.
//!
//! Transforms compose in local space: `translate_by` followed by
//! `scale_by` scales the geometry first. The product of the optional cull
//! matrix and the model matrix is computed on first request and kept until
//! either matrix changes.

use std::cell::Cell;

use bitflags::bitflags;
use coin_common::StateConfig;
use glam::{Mat4, Quat, Vec3};

use crate::accumulated::NodeIds;
use crate::element::{Element, NodeId};
use crate::state::State;

bitflags! {
    /// What is known about a [`ModelMatrixElement`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatrixFlags: u8 {
        /// The model matrix is the identity.
        const IDENTITY = 0x1;
        /// A cull matrix is set.
        const CULLMATRIX = 0x2;
        /// The combined matrix is up to date.
        const COMBINED = 0x4;
    }
}

/// Object-to-world transform of the current traversal level.
#[derive(Debug, Clone)]
pub struct ModelMatrixElement {
    model: Mat4,
    cull: Mat4,
    flags: MatrixFlags,
    combined: Cell<Option<Mat4>>,
    node_ids: NodeIds,
}

impl Element for ModelMatrixElement {
    const NAME: &'static str = "ModelMatrixElement";

    fn init(_config: &StateConfig) -> Self {
        Self {
            model: Mat4::IDENTITY,
            cull: Mat4::IDENTITY,
            flags: MatrixFlags::IDENTITY,
            combined: Cell::new(None),
            node_ids: NodeIds::default(),
        }
    }

    // Anonymous changes appear as `NodeId::NONE` entries.
    fn matches(&self, other: &Self) -> bool {
        self.node_ids == other.node_ids
    }
}

impl ModelMatrixElement {
    /// The model matrix.
    pub const fn matrix(&self) -> Mat4 {
        self.model
    }

    /// Current flags; `COMBINED` is set once the product has been computed.
    pub fn flags(&self) -> MatrixFlags {
        let mut flags = self.flags;
        flags.set(MatrixFlags::COMBINED, self.combined.get().is_some());
        flags
    }

    /// Nodes that contributed to the matrix.
    pub fn node_ids(&self) -> &[NodeId] {
        self.node_ids.as_slice()
    }

    fn compose(&mut self, node: NodeId, local: Mat4) {
        self.model *= local;
        self.flags.remove(MatrixFlags::IDENTITY);
        self.combined.set(None);
        self.node_ids.add(node);
    }

    fn combined_matrix(&self) -> Mat4 {
        if let Some(combined) = self.combined.get() {
            return combined;
        }
        let combined = if self.flags.contains(MatrixFlags::CULLMATRIX) {
            self.cull * self.model
        } else {
            self.model
        };
        self.combined.set(Some(combined));
        combined
    }

    /// Reset the matrix to the identity.
    pub fn make_identity(state: &mut State, node: NodeId) {
        let elem = state.get_mut::<Self>();
        elem.model = Mat4::IDENTITY;
        elem.flags = MatrixFlags::IDENTITY;
        elem.combined.set(None);
        elem.node_ids.set(node);
    }

    /// Replace the matrix.
    pub fn set(state: &mut State, node: NodeId, matrix: Mat4) {
        let elem = state.get_mut::<Self>();
        elem.model = matrix;
        elem.flags.remove(MatrixFlags::IDENTITY);
        elem.combined.set(None);
        elem.node_ids.set(node);
    }

    /// Compose `matrix` as a local transform.
    pub fn mult(state: &mut State, node: NodeId, matrix: Mat4) {
        state.get_mut::<Self>().compose(node, matrix);
    }

    /// Compose a translation.
    pub fn translate_by(state: &mut State, node: NodeId, translation: Vec3) {
        state.get_mut::<Self>().compose(node, Mat4::from_translation(translation));
    }

    /// Compose a rotation.
    pub fn rotate_by(state: &mut State, node: NodeId, rotation: Quat) {
        state.get_mut::<Self>().compose(node, Mat4::from_quat(rotation));
    }

    /// Compose a scale.
    pub fn scale_by(state: &mut State, node: NodeId, scale: Vec3) {
        state.get_mut::<Self>().compose(node, Mat4::from_scale(scale));
    }

    /// Set the view-volume cull matrix.
    pub fn set_cull_matrix(state: &mut State, matrix: Mat4) {
        let elem = state.get_mut::<Self>();
        elem.cull = matrix;
        elem.flags.insert(MatrixFlags::CULLMATRIX);
        elem.combined.set(None);
    }

    /// Cull matrix times model matrix, or the model matrix alone when no
    /// cull matrix is set.
    pub fn combined_cull_matrix(state: &mut State) -> Mat4 {
        state.get::<Self>().combined_matrix()
    }

    /// Current model matrix.
    pub fn get(state: &mut State) -> Mat4 {
        state.get::<Self>().model
    }

    /// Current model matrix and whether it is known to be the identity.
    pub fn get_with_identity(state: &mut State) -> (Mat4, bool) {
        let elem = state.get::<Self>();
        (elem.model, elem.flags.contains(MatrixFlags::IDENTITY))
    }

    /// Save the matrix for [`pop_matrix`](Self::pop_matrix). Not recorded
    /// by caches.
    pub fn push_matrix(state: &State) -> Mat4 {
        state.peek::<Self>().model
    }

    /// Restore a matrix saved with [`push_matrix`](Self::push_matrix).
    pub fn pop_matrix(state: &mut State, matrix: Mat4) {
        let elem = state.get_mut::<Self>();
        elem.model = matrix;
        elem.combined.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::registry::ElementRegistry;

    fn state() -> State {
        State::new(ElementRegistry::standard(), StateConfig::default())
    }

    #[test]
    fn test_local_composition_order() {
        let mut state = state();
        ModelMatrixElement::translate_by(&mut state, NodeId(1), Vec3::new(10.0, 0.0, 0.0));
        ModelMatrixElement::scale_by(&mut state, NodeId(2), Vec3::splat(2.0));
        let m = ModelMatrixElement::get(&mut state);
        assert_eq!(m.transform_point3(Vec3::X), Vec3::new(12.0, 0.0, 0.0));
        assert_eq!(state.peek::<ModelMatrixElement>().node_ids(), &[NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_identity_flag() {
        let mut state = state();
        assert!(ModelMatrixElement::get_with_identity(&mut state).1);
        ModelMatrixElement::rotate_by(&mut state, NodeId(1), Quat::from_rotation_z(1.0));
        assert!(!ModelMatrixElement::get_with_identity(&mut state).1);
        ModelMatrixElement::make_identity(&mut state, NodeId(3));
        let elem = state.peek::<ModelMatrixElement>();
        assert_eq!(elem.flags(), MatrixFlags::IDENTITY);
        assert_eq!(elem.node_ids(), &[NodeId(3)]);
    }

    #[test]
    fn test_combined_matrix_is_cached_until_change() {
        let mut state = state();
        ModelMatrixElement::set_cull_matrix(&mut state, Mat4::from_scale(Vec3::splat(3.0)));
        ModelMatrixElement::translate_by(&mut state, NodeId(1), Vec3::Y);
        assert!(!state.peek::<ModelMatrixElement>().flags().contains(MatrixFlags::COMBINED));
        let combined = ModelMatrixElement::combined_cull_matrix(&mut state);
        assert_eq!(combined.transform_point3(Vec3::ZERO), Vec3::new(0.0, 3.0, 0.0));
        assert!(state.peek::<ModelMatrixElement>().flags().contains(MatrixFlags::COMBINED));
        ModelMatrixElement::translate_by(&mut state, NodeId(2), Vec3::Y);
        assert!(!state.peek::<ModelMatrixElement>().flags().contains(MatrixFlags::COMBINED));
    }

    #[test]
    fn test_push_pop_matrix_without_state_push() {
        let mut state = state();
        let saved = ModelMatrixElement::push_matrix(&state);
        ModelMatrixElement::translate_by(&mut state, NodeId(1), Vec3::Z);
        ModelMatrixElement::pop_matrix(&mut state, saved);
        assert_eq!(ModelMatrixElement::get(&mut state), Mat4::IDENTITY);
    }

    #[test]
    fn test_anonymous_multiply_is_recorded() {
        let mut state = state();
        let before = state.peek::<ModelMatrixElement>().clone();
        ModelMatrixElement::mult(&mut state, NodeId::NONE, Mat4::from_translation(Vec3::X));
        let after = state.peek::<ModelMatrixElement>();
        assert_eq!(after.node_ids(), &[NodeId::NONE]);
        assert!(!after.matches(&before));
    }

    #[test]
    fn test_matches_compares_node_ids() {
        let mut state = state();
        state.open_cache();
        let _ = ModelMatrixElement::get(&mut state);
        let cache = state.close_cache().unwrap();
        state.push();
        ModelMatrixElement::translate_by(&mut state, NodeId(5), Vec3::X);
        assert!(!cache.is_valid(&state));
        state.pop();
        assert!(cache.is_valid(&state));
    }
}
