//! Elements whose value grows as traversal descends.
//!
//! A child level sees everything its ancestors added and appends its own
//! entries; popping discards them. Cache matching compares the list of
//! contributing nodes rather than the entries themselves.

use coin_common::StateConfig;
use coin_fields::Plane;
use glam::Mat4;
use strum_macros::{Display, EnumString, FromRepr};

use crate::element::{Element, NodeId};
use crate::matrix::ModelMatrixElement;
use crate::state::State;

/// Ordered list of nodes that contributed to an element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeIds(Vec<NodeId>);

impl NodeIds {
    /// Forget every node.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the list with `node`.
    pub fn set(&mut self, node: NodeId) {
        self.0.clear();
        self.0.push(node);
    }

    /// Append `node`.
    pub fn add(&mut self, node: NodeId) {
        self.0.push(node);
    }

    /// The nodes, oldest first.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }
}

// ========== Clip planes ==========

#[derive(Debug, Clone, PartialEq)]
struct ClipPlane {
    plane: Plane,
    model: Mat4,
    world: Plane,
}

/// Active clipping planes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClipPlaneElement {
    planes: Vec<ClipPlane>,
    start_index: usize,
    node_ids: NodeIds,
}

impl Element for ClipPlaneElement {
    const NAME: &'static str = "ClipPlaneElement";

    fn init(_config: &StateConfig) -> Self {
        Self::default()
    }

    fn push(prev: &Self) -> Self {
        let mut elem = prev.clone();
        elem.start_index = elem.planes.len();
        elem
    }

    fn matches(&self, other: &Self) -> bool {
        self.node_ids == other.node_ids
    }
}

impl ClipPlaneElement {
    /// Add `plane`, given in the current object space.
    pub fn add(state: &mut State, node: NodeId, plane: Plane) {
        let model = ModelMatrixElement::get(state);
        let elem = state.get_mut::<Self>();
        elem.planes.push(ClipPlane {
            plane,
            model,
            world: plane.transform(&model),
        });
        elem.node_ids.add(node);
    }

    /// Number of planes, inherited ones included.
    pub fn num(&self) -> usize {
        self.planes.len()
    }

    /// Index of the first plane added at this level.
    pub const fn start_index(&self) -> usize {
        self.start_index
    }

    /// Plane `index`, in world space or as given.
    pub fn get(&self, index: usize, world_space: bool) -> Option<Plane> {
        self.planes
            .get(index)
            .map(|entry| if world_space { entry.world } else { entry.plane })
    }

    /// Model matrix in effect when plane `index` was added.
    pub fn model_matrix(&self, index: usize) -> Option<Mat4> {
        self.planes.get(index).map(|entry| entry.model)
    }

    /// Nodes that added planes.
    pub fn node_ids(&self) -> &[NodeId] {
        self.node_ids.as_slice()
    }
}

// ========== Profiles ==========

/// How a profile joins the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum ProfileLinkage {
    /// Discard earlier profiles and start the first curve.
    StartFirst = 0,
    /// Start a new curve.
    StartNew = 1,
    /// Extend the current curve.
    AddToCurrent = 2,
}

/// One profile curve contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// Profile node.
    pub node: NodeId,
    /// Join mode.
    pub linkage: ProfileLinkage,
    /// Coordinate indices of the curve.
    pub indices: Vec<i32>,
}

/// Profile curves for extruded shapes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileElement {
    entries: Vec<ProfileEntry>,
    start_index: usize,
    node_ids: NodeIds,
}

impl Element for ProfileElement {
    const NAME: &'static str = "ProfileElement";

    fn init(_config: &StateConfig) -> Self {
        Self::default()
    }

    fn push(prev: &Self) -> Self {
        let mut elem = prev.clone();
        elem.start_index = elem.entries.len();
        elem
    }

    fn matches(&self, other: &Self) -> bool {
        self.node_ids == other.node_ids
    }
}

impl ProfileElement {
    /// Add a profile. `StartFirst` drops every earlier profile.
    pub fn add(state: &mut State, node: NodeId, linkage: ProfileLinkage, indices: &[i32]) {
        let elem = state.get_mut::<Self>();
        if linkage == ProfileLinkage::StartFirst {
            elem.entries.clear();
            elem.node_ids.clear();
            elem.start_index = 0;
        }
        elem.entries.push(ProfileEntry {
            node,
            linkage,
            indices: indices.to_vec(),
        });
        elem.node_ids.add(node);
    }

    /// Profiles in effect, oldest first.
    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    /// Number of profiles.
    pub fn num(&self) -> usize {
        self.entries.len()
    }

    /// Index of the first profile added at this level.
    pub const fn start_index(&self) -> usize {
        self.start_index
    }

    /// Nodes that added profiles.
    pub fn node_ids(&self) -> &[NodeId] {
        self.node_ids.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use glam::Vec3;

    use crate::registry::ElementRegistry;

    fn state() -> State {
        State::new(ElementRegistry::standard(), StateConfig::default())
    }

    #[test]
    fn test_clip_planes_accumulate_per_level() {
        let mut state = state();
        ClipPlaneElement::add(&mut state, NodeId(1), Plane::new(Vec3::X, 0.0));
        state.push();
        ClipPlaneElement::add(&mut state, NodeId(2), Plane::new(Vec3::Y, 1.0));
        let elem = state.peek::<ClipPlaneElement>();
        assert_eq!(elem.num(), 2);
        assert_eq!(elem.start_index(), 1);
        assert_eq!(elem.node_ids(), &[NodeId(1), NodeId(2)]);
        state.pop();
        let elem = state.peek::<ClipPlaneElement>();
        assert_eq!(elem.num(), 1);
        assert_eq!(elem.start_index(), 0);
    }

    #[test]
    fn test_clip_plane_world_space() {
        let mut state = state();
        ModelMatrixElement::translate_by(&mut state, NodeId(1), Vec3::new(0.0, 0.0, 2.0));
        ClipPlaneElement::add(&mut state, NodeId(2), Plane::new(Vec3::Z, 1.0));
        let elem = state.peek::<ClipPlaneElement>();
        assert_eq!(elem.get(0, false).map(|p| p.distance), Some(1.0));
        assert_eq!(elem.get(0, true).map(|p| p.distance), Some(3.0));
        assert!(elem.get(1, true).is_none());
    }

    #[test]
    fn test_start_first_resets_profiles() {
        let mut state = state();
        ProfileElement::add(&mut state, NodeId(1), ProfileLinkage::StartFirst, &[0, 1]);
        ProfileElement::add(&mut state, NodeId(2), ProfileLinkage::AddToCurrent, &[1, 2]);
        state.push();
        ProfileElement::add(&mut state, NodeId(3), ProfileLinkage::StartFirst, &[4]);
        let elem = state.peek::<ProfileElement>();
        assert_eq!(elem.num(), 1);
        assert_eq!(elem.node_ids(), &[NodeId(3)]);
        state.pop();
        assert_eq!(state.peek::<ProfileElement>().num(), 2);
    }
}
