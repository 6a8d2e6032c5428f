//! The bundled material and lighting element.
//!
//! Renderers apply material state lazily: a setter only takes a writable
//! copy when the new value actually differs from the current one, and an
//! open render cache learns which parts were touched through [`LazyMask`]
//! bits. Reads of this element are never recorded as cache dependencies;
//! caches consult the did-set / didn't-set masks instead.
//!
//! Diffuse colors and transparencies are compared by node id, not by value.
//! The single default diffuse color and the single zero transparency carry
//! node id 0, so resetting them to the default is a no-op.

use bitflags::bitflags;
use coin_common::{StateConfig, warn_once};
use coin_fields::Color;
use strum_macros::{Display, EnumString, FromRepr};

use crate::element::{Element, NodeId};
use crate::override_element::{OverrideElement, OverrideFlags};
use crate::state::State;

/// Shininess changes at or below this are ignored.
pub const SHININESS_THRESHOLD: f32 = 0.005;

/// Transparency type used until a render action sets one (blend).
pub const DEFAULT_TRANSPARENCY_TYPE: i32 = 4;

const DEFAULT_DIFFUSE: Color = Color::new(0.8, 0.8, 0.8);
const DEFAULT_PACKED: u32 = 0xcccc_ccff;

bitflags! {
    /// Parts of the lazy element reported to open caches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LazyMask: u32 {
        /// Light model.
        const LIGHT_MODEL = 0x1;
        /// Color material.
        const COLOR_MATERIAL = 0x2;
        /// Diffuse colors.
        const DIFFUSE = 0x4;
        /// Ambient color.
        const AMBIENT = 0x8;
        /// Emissive color.
        const EMISSIVE = 0x10;
        /// Specular color.
        const SPECULAR = 0x20;
        /// Shininess.
        const SHININESS = 0x40;
        /// Transparencies.
        const TRANSPARENCY = 0x80;
        /// Blending.
        const BLENDING = 0x100;
        /// Vertex ordering.
        const VERTEX_ORDERING = 0x200;
        /// Two-sided lighting.
        const TWOSIDE = 0x400;
        /// Back-face culling.
        const CULLING = 0x800;
        /// Shade model.
        const SHADE_MODEL = 0x1000;
        /// Alpha test.
        const ALPHATEST = 0x2000;
    }
}

/// How shapes are lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum LightModel {
    /// Diffuse color only, no lighting.
    BaseColor = 0,
    /// Phong lighting.
    Phong = 1,
}

/// Winding of front faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum VertexOrdering {
    /// Clockwise.
    Cw = 0,
    /// Counterclockwise.
    Ccw = 1,
}

/// Blend state. The factors are renderer-defined constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blending {
    /// Whether blending is on.
    pub enabled: bool,
    /// Source color factor.
    pub src: i32,
    /// Destination color factor.
    pub dst: i32,
    /// Source alpha factor.
    pub alpha_src: i32,
    /// Destination alpha factor.
    pub alpha_dst: i32,
}

/// Material values applied together by [`LazyElement::set_materials`].
#[derive(Debug, Clone, Copy)]
pub struct Materials<'a> {
    /// Diffuse colors.
    pub diffuse: &'a [Color],
    /// Transparencies.
    pub transparency: &'a [f32],
    /// Ambient color.
    pub ambient: Color,
    /// Emissive color.
    pub emissive: Color,
    /// Specular color.
    pub specular: Color,
    /// Shininess.
    pub shininess: f32,
    /// Whether any transparency is above zero.
    pub is_transparent: bool,
}

fn diffuse_node_id(node: NodeId, colors: &[Color]) -> NodeId {
    if colors.len() == 1 && colors[0] == DEFAULT_DIFFUSE {
        NodeId::NONE
    } else {
        node
    }
}

fn transparency_node_id(node: NodeId, values: &[f32]) -> NodeId {
    if values.len() == 1 && values[0] == 0.0 {
        NodeId::NONE
    } else {
        node
    }
}

fn stipple_number(transparency: f32) -> i32 {
    ((transparency * 64.0) as i32).clamp(0, 64)
}

/// Material and lighting state bundled into one element.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyElement {
    ambient: Color,
    specular: Color,
    emissive: Color,
    shininess: f32,
    blending: Blending,
    light_model: LightModel,
    diffuse: Vec<Color>,
    packed: Vec<u32>,
    is_packed: bool,
    color_indices: Vec<i32>,
    transparency: Vec<f32>,
    is_transparent: bool,
    transparency_type: i32,
    diffuse_node: NodeId,
    transparency_node: NodeId,
    stipple: i32,
    vertex_ordering: VertexOrdering,
    twoside: bool,
    culling: bool,
    flat_shading: bool,
    alpha_func: i32,
    alpha_value: f32,
}

impl Default for LazyElement {
    fn default() -> Self {
        Self {
            ambient: Color::new(0.2, 0.2, 0.2),
            specular: Color::default(),
            emissive: Color::default(),
            shininess: 0.2,
            blending: Blending::default(),
            light_model: LightModel::Phong,
            diffuse: vec![DEFAULT_DIFFUSE],
            packed: vec![DEFAULT_PACKED],
            is_packed: false,
            color_indices: Vec::new(),
            transparency: vec![0.0],
            is_transparent: false,
            transparency_type: DEFAULT_TRANSPARENCY_TYPE,
            diffuse_node: NodeId::NONE,
            transparency_node: NodeId::NONE,
            stipple: 0,
            vertex_ordering: VertexOrdering::Ccw,
            twoside: false,
            culling: false,
            flat_shading: false,
            alpha_func: 0,
            alpha_value: 0.5,
        }
    }
}

impl Element for LazyElement {
    const NAME: &'static str = "LazyElement";
    const TRACKED: bool = false;

    fn init(_config: &StateConfig) -> Self {
        Self::default()
    }

    fn matches(&self, _other: &Self) -> bool {
        if cfg!(debug_assertions) {
            panic!("LazyElement::matches called; lazy state is tracked through masks");
        }
        false
    }

    fn copy_match_info(&self) -> Self {
        if cfg!(debug_assertions) {
            panic!("LazyElement::copy_match_info called; lazy state is tracked through masks");
        }
        self.clone()
    }
}

impl LazyElement {
    // ========== Accessors ==========

    /// Ambient color.
    pub const fn ambient(&self) -> Color {
        self.ambient
    }

    /// Specular color.
    pub const fn specular(&self) -> Color {
        self.specular
    }

    /// Emissive color.
    pub const fn emissive(&self) -> Color {
        self.emissive
    }

    /// Shininess in `[0, 1]`.
    pub const fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Blend state.
    pub const fn blending(&self) -> Blending {
        self.blending
    }

    /// Light model.
    pub const fn light_model(&self) -> LightModel {
        self.light_model
    }

    /// Diffuse color `index`, unpacked if colors are packed. The index is
    /// clamped to the last color.
    pub fn diffuse(&self, index: usize) -> Color {
        if self.is_packed {
            let packed = self.packed[index.min(self.packed.len().saturating_sub(1))];
            return Color::from_packed(packed).0;
        }
        self.diffuse[index.min(self.diffuse.len().saturating_sub(1))]
    }

    /// Transparency `index`, clamped to the last value. Packed colors carry
    /// their transparency in the alpha channel.
    pub fn transparency(&self, index: usize) -> f32 {
        if self.is_packed {
            let packed = self.packed[index.min(self.packed.len().saturating_sub(1))];
            return 1.0 - Color::from_packed(packed).1;
        }
        self.transparency[index.min(self.transparency.len().saturating_sub(1))]
    }

    /// Packed `0xRRGGBBAA` colors.
    pub fn packed_colors(&self) -> &[u32] {
        &self.packed
    }

    /// Color indices.
    pub fn color_indices(&self) -> &[i32] {
        &self.color_indices
    }

    /// Number of diffuse colors.
    pub fn num_diffuse(&self) -> usize {
        if self.is_packed { self.packed.len() } else { self.diffuse.len() }
    }

    /// Number of transparencies; equal to the diffuse count when packed.
    pub fn num_transparencies(&self) -> usize {
        if self.is_packed { self.packed.len() } else { self.transparency.len() }
    }

    /// Number of color indices.
    pub fn num_color_indices(&self) -> usize {
        self.color_indices.len()
    }

    /// True if the diffuse colors are packed.
    pub const fn is_packed(&self) -> bool {
        self.is_packed
    }

    /// True if any transparency is above zero.
    pub const fn is_transparent(&self) -> bool {
        self.is_transparent
    }

    /// Transparency type of the render action.
    pub const fn transparency_type(&self) -> i32 {
        self.transparency_type
    }

    /// Node that set the diffuse colors, 0 for the default.
    pub const fn diffuse_node(&self) -> NodeId {
        self.diffuse_node
    }

    /// Node that set the transparencies, 0 for the default.
    pub const fn transparency_node(&self) -> NodeId {
        self.transparency_node
    }

    /// Screen-door stipple pattern number in `[0, 64]`.
    pub const fn stipple_number(&self) -> i32 {
        self.stipple
    }

    /// Front-face winding.
    pub const fn vertex_ordering(&self) -> VertexOrdering {
        self.vertex_ordering
    }

    /// Two-sided lighting.
    pub const fn twoside_lighting(&self) -> bool {
        self.twoside
    }

    /// Back-face culling.
    pub const fn backface_culling(&self) -> bool {
        self.culling
    }

    /// Flat shading.
    pub const fn flat_shading(&self) -> bool {
        self.flat_shading
    }

    /// Alpha test function and reference value.
    pub const fn alpha_test(&self) -> (i32, f32) {
        (self.alpha_func, self.alpha_value)
    }

    // ========== Setters ==========

    fn report(state: &mut State, changed: LazyMask, requested: LazyMask) {
        if !state.is_cache_open() {
            return;
        }
        if !changed.is_empty() {
            state.lazy_did_set(changed);
        }
        let unchanged = requested.difference(changed);
        if !unchanged.is_empty() {
            state.lazy_didnt_set(unchanged);
        }
    }

    fn apply(state: &mut State, mask: LazyMask, differs: bool, write: impl FnOnce(&mut Self)) {
        if differs {
            write(state.get_mut::<Self>());
            Self::report(state, mask, mask);
        } else {
            Self::report(state, LazyMask::empty(), mask);
        }
    }

    /// Reset every part to its default at the current level.
    pub fn set_to_default(state: &mut State) {
        *state.get_mut::<Self>() = Self::default();
    }

    /// Set the diffuse colors. Ignored when `colors` is empty or the node id
    /// is unchanged.
    pub fn set_diffuse(state: &mut State, node: NodeId, colors: &[Color]) {
        let id = diffuse_node_id(node, colors);
        let differs = !colors.is_empty() && state.peek::<Self>().diffuse_node != id;
        Self::apply(state, LazyMask::DIFFUSE, differs, |elem| {
            elem.diffuse_node = id;
            elem.diffuse = colors.to_vec();
            elem.is_packed = false;
        });
    }

    /// Set the transparencies. Ignored when `values` is empty or the node id
    /// is unchanged.
    pub fn set_transparency(state: &mut State, node: NodeId, values: &[f32]) {
        let id = transparency_node_id(node, values);
        let differs = !values.is_empty() && state.peek::<Self>().transparency_node != id;
        Self::apply(state, LazyMask::TRANSPARENCY, differs, |elem| {
            elem.transparency_node = id;
            elem.transparency = values.to_vec();
            elem.stipple = stipple_number(values[0]);
            elem.is_transparent = values.iter().any(|&t| t > 0.0);
        });
    }

    /// Set packed `0xRRGGBBAA` colors, replacing both diffuse colors and
    /// transparencies.
    pub fn set_packed(state: &mut State, node: NodeId, colors: &[u32], is_transparent: bool) {
        let differs = !colors.is_empty() && state.peek::<Self>().diffuse_node != node;
        Self::apply(state, LazyMask::DIFFUSE | LazyMask::TRANSPARENCY, differs, |elem| {
            elem.diffuse_node = node;
            elem.transparency_node = node;
            elem.packed = colors.to_vec();
            elem.is_packed = true;
            elem.is_transparent = is_transparent;
            let alpha = colors[0] & 0xff;
            elem.stipple = stipple_number((255 - alpha) as f32 / 255.0);
        });
    }

    /// Set color indices.
    pub fn set_color_indices(state: &mut State, node: NodeId, indices: &[i32]) {
        let differs = !indices.is_empty() && state.peek::<Self>().diffuse_node != node;
        Self::apply(state, LazyMask::DIFFUSE, differs, |elem| {
            elem.color_indices = indices.to_vec();
            elem.is_packed = false;
        });
    }

    /// Set the ambient color.
    pub fn set_ambient(state: &mut State, color: Color) {
        let differs = state.peek::<Self>().ambient != color;
        Self::apply(state, LazyMask::AMBIENT, differs, |elem| elem.ambient = color);
    }

    /// Set the emissive color.
    pub fn set_emissive(state: &mut State, color: Color) {
        let differs = state.peek::<Self>().emissive != color;
        Self::apply(state, LazyMask::EMISSIVE, differs, |elem| elem.emissive = color);
    }

    /// Set the specular color.
    pub fn set_specular(state: &mut State, color: Color) {
        let differs = state.peek::<Self>().specular != color;
        Self::apply(state, LazyMask::SPECULAR, differs, |elem| elem.specular = color);
    }

    /// Set the shininess. Changes within [`SHININESS_THRESHOLD`] are ignored.
    pub fn set_shininess(state: &mut State, value: f32) {
        let differs = (state.peek::<Self>().shininess - value).abs() > SHININESS_THRESHOLD;
        Self::apply(state, LazyMask::SHININESS, differs, |elem| elem.shininess = value);
    }

    /// Enable blending with the same factors for color and alpha.
    pub fn enable_blending(state: &mut State, src: i32, dst: i32) {
        Self::enable_separate_blending(state, src, dst, 0, 0);
    }

    /// Enable blending with separate alpha factors.
    pub fn enable_separate_blending(state: &mut State, src: i32, dst: i32, alpha_src: i32, alpha_dst: i32) {
        let wanted = Blending {
            enabled: true,
            src,
            dst,
            alpha_src,
            alpha_dst,
        };
        let differs = state.peek::<Self>().blending != wanted;
        Self::apply(state, LazyMask::BLENDING, differs, |elem| elem.blending = wanted);
    }

    /// Disable blending, keeping the last factors.
    pub fn disable_blending(state: &mut State) {
        let differs = state.peek::<Self>().blending.enabled;
        Self::apply(state, LazyMask::BLENDING, differs, |elem| elem.blending.enabled = false);
    }

    /// Set the light model.
    pub fn set_light_model(state: &mut State, model: LightModel) {
        let differs = state.peek::<Self>().light_model != model;
        Self::apply(state, LazyMask::LIGHT_MODEL, differs, |elem| elem.light_model = model);
    }

    /// Set the front-face winding.
    pub fn set_vertex_ordering(state: &mut State, ordering: VertexOrdering) {
        let differs = state.peek::<Self>().vertex_ordering != ordering;
        Self::apply(state, LazyMask::VERTEX_ORDERING, differs, |elem| {
            elem.vertex_ordering = ordering;
        });
    }

    /// Turn back-face culling on or off.
    pub fn set_backface_culling(state: &mut State, on: bool) {
        let differs = state.peek::<Self>().culling != on;
        Self::apply(state, LazyMask::CULLING, differs, |elem| elem.culling = on);
    }

    /// Turn two-sided lighting on or off.
    pub fn set_twoside_lighting(state: &mut State, on: bool) {
        let differs = state.peek::<Self>().twoside != on;
        Self::apply(state, LazyMask::TWOSIDE, differs, |elem| elem.twoside = on);
    }

    /// Select flat (`true`) or smooth shading.
    pub fn set_shade_model(state: &mut State, flat: bool) {
        let differs = state.peek::<Self>().flat_shading != flat;
        Self::apply(state, LazyMask::SHADE_MODEL, differs, |elem| elem.flat_shading = flat);
    }

    /// Set the alpha test function and reference value.
    pub fn set_alpha_test(state: &mut State, func: i32, value: f32) {
        let differs = state.peek::<Self>().alpha_test() != (func, value);
        Self::apply(state, LazyMask::ALPHATEST, differs, |elem| {
            elem.alpha_func = func;
            elem.alpha_value = value;
        });
    }

    /// Set the transparency type. Not reported to caches.
    pub fn set_transparency_type(state: &mut State, kind: i32) {
        if state.peek::<Self>().transparency_type != kind {
            state.get_mut::<Self>().transparency_type = kind;
        }
    }

    /// Apply the parts of `materials` selected by `mask` that differ from
    /// the current state.
    pub fn set_materials(state: &mut State, node: NodeId, mask: LazyMask, materials: &Materials<'_>) {
        let current = state.peek::<Self>();
        let diffuse_id = diffuse_node_id(node, materials.diffuse);
        let transparency_id = transparency_node_id(node, materials.transparency);

        let mut changed = LazyMask::empty();
        changed.set(LazyMask::DIFFUSE, current.diffuse_node != diffuse_id);
        changed.set(LazyMask::TRANSPARENCY, current.transparency_node != transparency_id);
        changed.set(LazyMask::AMBIENT, current.ambient != materials.ambient);
        changed.set(LazyMask::EMISSIVE, current.emissive != materials.emissive);
        changed.set(LazyMask::SPECULAR, current.specular != materials.specular);
        changed.set(
            LazyMask::SHININESS,
            (current.shininess - materials.shininess).abs() > SHININESS_THRESHOLD,
        );
        if materials.diffuse.is_empty() {
            changed.remove(LazyMask::DIFFUSE);
        }
        if materials.transparency.is_empty() {
            changed.remove(LazyMask::TRANSPARENCY);
        }
        changed &= mask;

        if !changed.is_empty() {
            let elem = state.get_mut::<Self>();
            if changed.contains(LazyMask::DIFFUSE) {
                elem.diffuse_node = diffuse_id;
                elem.diffuse = materials.diffuse.to_vec();
                elem.is_packed = false;
            }
            if changed.contains(LazyMask::TRANSPARENCY) {
                elem.transparency_node = transparency_id;
                elem.transparency = materials.transparency.to_vec();
                elem.stipple = stipple_number(materials.transparency[0]);
                elem.is_transparent = transparency_id != NodeId::NONE && materials.is_transparent;
            }
            if changed.contains(LazyMask::AMBIENT) {
                elem.ambient = materials.ambient;
            }
            if changed.contains(LazyMask::EMISSIVE) {
                elem.emissive = materials.emissive;
            }
            if changed.contains(LazyMask::SPECULAR) {
                elem.specular = materials.specular;
            }
            if changed.contains(LazyMask::SHININESS) {
                elem.shininess = materials.shininess;
            }
        }
        Self::report(state, changed, mask);
    }
}

// ========== Single-part views ==========

fn first_or_warn<T: Copy>(element: &str, values: &[T]) -> Option<T> {
    if values.len() > 1 {
        warn_once("Elements", &format!("{element} only supports one value"));
    }
    values.first().copied()
}

macro_rules! single_color_element {
    ($(#[$doc:meta])* $name:ident, $flag:ident, $setter:ident, $getter:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl $name {
            /// Set the color unless overridden. Extra values are dropped
            /// with a warning. Returns `false` when rejected.
            pub fn set(state: &mut State, colors: &[Color]) -> bool {
                if OverrideElement::get(state, OverrideFlags::$flag) {
                    return false;
                }
                match first_or_warn(stringify!($name), colors) {
                    Some(color) => {
                        LazyElement::$setter(state, color);
                        true
                    }
                    None => false,
                }
            }

            /// Current color.
            pub fn get(state: &mut State) -> Color {
                state.get::<LazyElement>().$getter()
            }

            /// Always one.
            pub const fn num() -> usize {
                1
            }
        }
    };
}

single_color_element!(
    /// Ambient color view of [`LazyElement`].
    AmbientColorElement, AMBIENT_COLOR, set_ambient, ambient
);
single_color_element!(
    /// Emissive color view of [`LazyElement`].
    EmissiveColorElement, EMISSIVE_COLOR, set_emissive, emissive
);
single_color_element!(
    /// Specular color view of [`LazyElement`].
    SpecularColorElement, SPECULAR_COLOR, set_specular, specular
);

/// Shininess view of [`LazyElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShininessElement;

impl ShininessElement {
    /// Set the shininess unless overridden. Extra values are dropped with a
    /// warning. Returns `false` when rejected.
    pub fn set(state: &mut State, values: &[f32]) -> bool {
        if OverrideElement::get_shininess_override(state) {
            return false;
        }
        match first_or_warn("ShininessElement", values) {
            Some(value) => {
                LazyElement::set_shininess(state, value);
                true
            }
            None => false,
        }
    }

    /// Current shininess.
    pub fn get(state: &mut State) -> f32 {
        state.get::<LazyElement>().shininess()
    }

    /// Always one.
    pub const fn num() -> usize {
        1
    }
}

/// Light model view of [`LazyElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightModelElement;

impl LightModelElement {
    /// Set the light model unless overridden.
    pub fn set(state: &mut State, model: LightModel) -> bool {
        if OverrideElement::get_light_model_override(state) {
            return false;
        }
        LazyElement::set_light_model(state, model);
        true
    }

    /// Current light model.
    pub fn get(state: &mut State) -> LightModel {
        state.get::<LazyElement>().light_model()
    }

    /// The type default.
    pub const fn default_value() -> LightModel {
        LightModel::Phong
    }
}

/// Diffuse color view of [`LazyElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffuseColorElement;

impl DiffuseColorElement {
    /// Set diffuse colors unless overridden.
    pub fn set(state: &mut State, node: NodeId, colors: &[Color]) -> bool {
        if OverrideElement::get_diffuse_color_override(state) {
            return false;
        }
        LazyElement::set_diffuse(state, node, colors);
        true
    }

    /// Set packed colors unless overridden.
    pub fn set_packed(state: &mut State, node: NodeId, colors: &[u32], is_transparent: bool) -> bool {
        if OverrideElement::get_diffuse_color_override(state) {
            return false;
        }
        LazyElement::set_packed(state, node, colors, is_transparent);
        true
    }

    /// Diffuse color `index`.
    pub fn get(state: &mut State, index: usize) -> Color {
        state.get::<LazyElement>().diffuse(index)
    }

    /// Number of diffuse colors.
    pub fn num(state: &mut State) -> usize {
        state.get::<LazyElement>().num_diffuse()
    }
}

/// Transparency view of [`LazyElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransparencyElement;

impl TransparencyElement {
    /// Set transparencies unless overridden.
    pub fn set(state: &mut State, node: NodeId, values: &[f32]) -> bool {
        if OverrideElement::get_transparency_override(state) {
            return false;
        }
        LazyElement::set_transparency(state, node, values);
        true
    }

    /// Transparency `index`.
    pub fn get(state: &mut State, index: usize) -> f32 {
        state.get::<LazyElement>().transparency(index)
    }

    /// Number of transparencies.
    pub fn num(state: &mut State) -> usize {
        state.get::<LazyElement>().num_transparencies()
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
    fn test_defaults() {
        let state = state();
        let lazy = state.peek::<LazyElement>();
        assert_eq!(lazy.ambient(), Color::new(0.2, 0.2, 0.2));
        assert_eq!(lazy.diffuse(0), DEFAULT_DIFFUSE);
        assert_eq!(lazy.transparency(0), 0.0);
        assert_eq!(lazy.light_model(), LightModel::Phong);
        assert_eq!(lazy.vertex_ordering(), VertexOrdering::Ccw);
        assert_eq!(lazy.transparency_type(), DEFAULT_TRANSPARENCY_TYPE);
        assert_eq!(lazy.alpha_test(), (0, 0.5));
    }

    #[test]
    fn test_default_diffuse_is_not_a_change() {
        let mut state = state();
        state.open_cache();
        LazyElement::set_diffuse(&mut state, NodeId(7), &[DEFAULT_DIFFUSE]);
        let cache = state.close_cache().unwrap();
        assert_eq!(cache.lazy_didnt_set(), LazyMask::DIFFUSE);
        assert!(cache.lazy_did_set().is_empty());
    }

    #[test]
    fn test_transparency_sets_stipple_and_flag() {
        let mut state = state();
        LazyElement::set_transparency(&mut state, NodeId(2), &[0.5, 0.0]);
        let lazy = state.peek::<LazyElement>();
        assert!(lazy.is_transparent());
        assert_eq!(lazy.stipple_number(), 32);
        assert_eq!(lazy.transparency(5), 0.0);
        assert_eq!(lazy.transparency_node(), NodeId(2));
    }

    #[test]
    fn test_packed_colors_replace_transparency() {
        let mut state = state();
        LazyElement::set_packed(&mut state, NodeId(4), &[0xff00_0000, 0x00ff_00ff], true);
        let lazy = state.peek::<LazyElement>();
        assert!(lazy.is_packed());
        assert_eq!(lazy.num_transparencies(), 2);
        assert_eq!(lazy.diffuse(0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(lazy.transparency(0), 1.0);
        assert_eq!(lazy.stipple_number(), 64);
        assert_eq!(lazy.transparency_node(), NodeId(4));
    }

    #[test]
    fn test_shininess_threshold() {
        let mut state = state();
        state.open_cache();
        LazyElement::set_shininess(&mut state, 0.204);
        LazyElement::set_shininess(&mut state, 0.5);
        let cache = state.close_cache().unwrap();
        assert_eq!(cache.lazy_didnt_set(), LazyMask::SHININESS);
        assert_eq!(cache.lazy_did_set(), LazyMask::SHININESS);
        assert_eq!(state.peek::<LazyElement>().shininess(), 0.5);
    }

    #[test]
    fn test_set_materials_reports_only_changed_parts() {
        let mut state = state();
        let materials = Materials {
            diffuse: &[Color::new(1.0, 0.0, 0.0)],
            transparency: &[0.0],
            ambient: Color::new(0.2, 0.2, 0.2),
            emissive: Color::default(),
            specular: Color::new(1.0, 1.0, 1.0),
            shininess: 0.2,
            is_transparent: false,
        };
        state.open_cache();
        LazyElement::set_materials(&mut state, NodeId(9), LazyMask::all(), &materials);
        let cache = state.close_cache().unwrap();
        assert_eq!(cache.lazy_did_set(), LazyMask::DIFFUSE | LazyMask::SPECULAR);
        assert!(cache.lazy_didnt_set().contains(LazyMask::AMBIENT | LazyMask::TRANSPARENCY));
        assert_eq!(state.peek::<LazyElement>().diffuse_node(), NodeId(9));
    }

    #[test]
    fn test_blending_round_trip() {
        let mut state = state();
        LazyElement::enable_blending(&mut state, 770, 771);
        assert!(state.peek::<LazyElement>().blending().enabled);
        state.push();
        LazyElement::disable_blending(&mut state);
        assert!(!state.peek::<LazyElement>().blending().enabled);
        state.pop();
        assert_eq!(state.peek::<LazyElement>().blending().src, 770);
    }

    #[test_log::test]
    fn test_single_value_view_keeps_first() {
        let mut state = state();
        assert!(AmbientColorElement::set(
            &mut state,
            &[Color::new(1.0, 0.0, 0.0), Color::new(0.0, 1.0, 0.0)]
        ));
        assert_eq!(AmbientColorElement::get(&mut state), Color::new(1.0, 0.0, 0.0));
        assert_eq!(AmbientColorElement::num(), 1);
        assert!(coin_common::warning::was_warned(
            "Elements",
            "AmbientColorElement only supports one value"
        ));
    }

    #[test]
    fn test_override_rejects_view_set() {
        let mut state = state();
        assert!(ShininessElement::set(&mut state, &[0.9]));
        OverrideElement::set_shininess_override(&mut state, NodeId(1), true);
        state.push();
        assert!(!ShininessElement::set(&mut state, &[0.1]));
        assert_eq!(ShininessElement::get(&mut state), 0.9);
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(LightModel::BaseColor.to_string(), "BASE_COLOR");
        assert_eq!("CCW".parse::<VertexOrdering>(), Ok(VertexOrdering::Ccw));
        assert_eq!(LightModel::from_repr(1), Some(LightModel::Phong));
    }
}
