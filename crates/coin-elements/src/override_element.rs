//! Override flags.
//!
//! A node that overrides an element sets the element's value and then its
//! flag. From then on, until the traversal leaves that level, `set` calls
//! from descendants are rejected. Pushing copies the flags verbatim.
//!
//! The diffuse-color and transparency flags are coupled: setting one also
//! sets the other, unless
//! [`StateConfig::separate_diffuse_transparency_override`] is on.
//!
//! [`StateConfig::separate_diffuse_transparency_override`]: coin_common::StateConfig::separate_diffuse_transparency_override

use bitflags::bitflags;
use coin_common::StateConfig;

use crate::element::{Element, NodeId};
use crate::state::State;

bitflags! {
    /// One bit per overridable element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OverrideFlags: u32 {
        /// Ambient color.
        const AMBIENT_COLOR = 0x1;
        /// Color index.
        const COLOR_INDEX = 0x2;
        /// Complexity value.
        const COMPLEXITY = 0x4;
        /// Complexity type.
        const COMPLEXITY_TYPE = 0x8;
        /// Crease angle.
        const CREASE_ANGLE = 0x10;
        /// Diffuse color.
        const DIFFUSE_COLOR = 0x20;
        /// Draw style.
        const DRAW_STYLE = 0x40;
        /// Emissive color.
        const EMISSIVE_COLOR = 0x80;
        /// Font name.
        const FONT_NAME = 0x100;
        /// Font size.
        const FONT_SIZE = 0x200;
        /// Light model.
        const LIGHT_MODEL = 0x400;
        /// Line pattern.
        const LINE_PATTERN = 0x800;
        /// Line width.
        const LINE_WIDTH = 0x1000;
        /// Material binding.
        const MATERIAL_BINDING = 0x2000;
        /// Point size.
        const POINT_SIZE = 0x4000;
        /// Pick style.
        const PICK_STYLE = 0x8000;
        /// Shape hints.
        const SHAPE_HINTS = 0x10000;
        /// Shininess.
        const SHININESS = 0x20000;
        /// Specular color.
        const SPECULAR_COLOR = 0x40000;
        /// Polygon offset.
        const POLYGON_OFFSET = 0x80000;
        /// Transparency.
        const TRANSPARENCY = 0x100000;
        /// Transparency type.
        const TRANSPARENCY_TYPE = 0x200000;
        /// Normal vectors.
        const NORMAL_VECTOR = 0x400000;
        /// Normal binding.
        const NORMAL_BINDING = 0x800000;
    }
}

/// The override flags of a traversal level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverrideElement {
    flags: OverrideFlags,
    node: NodeId,
}

impl Element for OverrideElement {
    const NAME: &'static str = "OverrideElement";

    fn init(_config: &StateConfig) -> Self {
        Self::default()
    }

    fn matches(&self, other: &Self) -> bool {
        self.flags == other.flags
    }
}

macro_rules! override_accessors {
    ($($flag:ident => $get:ident, $set:ident;)*) => {
        $(
            #[doc = concat!("True if `", stringify!($flag), "` is overridden.")]
            pub fn $get(state: &mut State) -> bool {
                Self::get(state, OverrideFlags::$flag)
            }

            #[doc = concat!("Set or clear the `", stringify!($flag), "` override.")]
            pub fn $set(state: &mut State, node: NodeId, on: bool) {
                Self::set(state, node, OverrideFlags::$flag, on);
            }
        )*
    };
}

impl OverrideElement {
    /// All flags of the current level.
    pub const fn flags(&self) -> OverrideFlags {
        self.flags
    }

    /// Node that last changed the flags.
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// True if every bit of `flag` is set. Recorded by open caches.
    pub fn get(state: &mut State, flag: OverrideFlags) -> bool {
        state.get::<Self>().flags.contains(flag)
    }

    /// Set or clear `flag` without coupling.
    pub fn set(state: &mut State, node: NodeId, flag: OverrideFlags, on: bool) {
        let elem = state.get_mut::<Self>();
        elem.flags.set(flag, on);
        elem.node = node;
    }

    fn set_coupled(state: &mut State, node: NodeId, flag: OverrideFlags, partner: OverrideFlags, on: bool) {
        let coupled = !state.config().separate_diffuse_transparency_override;
        let mut flags = flag;
        if coupled {
            flags |= partner;
        }
        Self::set(state, node, flags, on);
    }

    /// True if the diffuse color is overridden.
    pub fn get_diffuse_color_override(state: &mut State) -> bool {
        Self::get(state, OverrideFlags::DIFFUSE_COLOR)
    }

    /// Set or clear the diffuse color override, and the transparency
    /// override with it unless the two are configured separately.
    pub fn set_diffuse_color_override(state: &mut State, node: NodeId, on: bool) {
        Self::set_coupled(state, node, OverrideFlags::DIFFUSE_COLOR, OverrideFlags::TRANSPARENCY, on);
    }

    /// True if transparency is overridden.
    pub fn get_transparency_override(state: &mut State) -> bool {
        Self::get(state, OverrideFlags::TRANSPARENCY)
    }

    /// Set or clear the transparency override, and the diffuse color
    /// override with it unless the two are configured separately.
    pub fn set_transparency_override(state: &mut State, node: NodeId, on: bool) {
        Self::set_coupled(state, node, OverrideFlags::TRANSPARENCY, OverrideFlags::DIFFUSE_COLOR, on);
    }

    override_accessors! {
        AMBIENT_COLOR => get_ambient_color_override, set_ambient_color_override;
        COLOR_INDEX => get_color_index_override, set_color_index_override;
        COMPLEXITY => get_complexity_override, set_complexity_override;
        COMPLEXITY_TYPE => get_complexity_type_override, set_complexity_type_override;
        CREASE_ANGLE => get_crease_angle_override, set_crease_angle_override;
        DRAW_STYLE => get_draw_style_override, set_draw_style_override;
        EMISSIVE_COLOR => get_emissive_color_override, set_emissive_color_override;
        FONT_NAME => get_font_name_override, set_font_name_override;
        FONT_SIZE => get_font_size_override, set_font_size_override;
        LIGHT_MODEL => get_light_model_override, set_light_model_override;
        LINE_PATTERN => get_line_pattern_override, set_line_pattern_override;
        LINE_WIDTH => get_line_width_override, set_line_width_override;
        MATERIAL_BINDING => get_material_binding_override, set_material_binding_override;
        POINT_SIZE => get_point_size_override, set_point_size_override;
        PICK_STYLE => get_pick_style_override, set_pick_style_override;
        SHAPE_HINTS => get_shape_hints_override, set_shape_hints_override;
        SHININESS => get_shininess_override, set_shininess_override;
        SPECULAR_COLOR => get_specular_color_override, set_specular_color_override;
        POLYGON_OFFSET => get_polygon_offset_override, set_polygon_offset_override;
        TRANSPARENCY_TYPE => get_transparency_type_override, set_transparency_type_override;
        NORMAL_VECTOR => get_normal_vector_override, set_normal_vector_override;
        NORMAL_BINDING => get_normal_binding_override, set_normal_binding_override;
    }
}
