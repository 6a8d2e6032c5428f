//! Applying scene containers to a traversal [`State`].
//!
//! Each container type that maps onto elements writes them the way the
//! corresponding node would during a render traversal. `Separator` pushes
//! and pops a level around its children; other groups share their parent's
//! level. A container whose `DEF` name starts with `OVERRIDE` also turns on
//! the override flags of the elements it wrote.

use coin_common::StateConfig;
use coin_elements::{
    ClipPlaneElement, ComplexityElement, ComplexityType, ComplexityTypeElement, CreaseAngleElement, DrawStyle,
    DrawStyleElement, ElementRegistry, LazyElement, LazyMask, LightModel, LightModelElement, LinePatternElement,
    LineWidthElement, Materials, ModelMatrixElement, NodeId, OverrideElement, PickStyle, PickStyleElement,
    PointSizeElement, ProfileElement, ProfileLinkage, State, VertexOrdering,
};
use coin_fields::{
    Color, Field, FieldContainer, MFColor, MFFloat, MFInt32, Plane, Rotation, SFBool, SFEnum, SFFloat, SFPlane,
    SFRotation, SFUShort, SFVec3f,
};
use glam::{Mat4, Vec3};
use serde::Serialize;

const OVERRIDE_PREFIX: &str = "OVERRIDE";

/// What the state looked like when a leaf container was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Nesting depth of the container in the scene.
    pub depth: usize,
    /// Container type name.
    pub type_name: String,
    /// `DEF` name, if any.
    pub def_name: Option<String>,
    /// Traversal state depth.
    pub state_depth: usize,
    /// Model matrix translation.
    pub translation: [f32; 3],
    /// Current draw style.
    pub draw_style: String,
    /// Current line width.
    pub line_width: f32,
    /// Current complexity.
    pub complexity: f32,
    /// First diffuse color.
    pub diffuse: [f32; 3],
    /// First transparency.
    pub transparency: f32,
    /// Current light model.
    pub light_model: String,
    /// Active clip planes.
    pub clip_planes: usize,
    /// Profile entries.
    pub profiles: usize,
}

/// Walks container trees and keeps the traversal state between them.
pub struct SceneWalker {
    state: State,
    next_node: u32,
    snapshots: Vec<Snapshot>,
}

fn enum_value(container: &FieldContainer, name: &str) -> Option<i32> {
    container
        .field_as::<SFEnum>(name)
        .filter(|field| !field.is_ignored())
        .map(SFEnum::value)
}

fn float_value(container: &FieldContainer, name: &str) -> Option<f32> {
    container
        .field_as::<SFFloat>(name)
        .filter(|field| !field.is_ignored())
        .map(|field| *field.value())
}

fn vec3_value(container: &FieldContainer, name: &str) -> Vec3 {
    container.field_as::<SFVec3f>(name).map_or(Vec3::ZERO, |field| *field.value())
}

fn rotation_value(container: &FieldContainer, name: &str) -> Rotation {
    container
        .field_as::<SFRotation>(name)
        .map_or_else(Rotation::default, |field| *field.value())
}

fn colors<'a>(container: &'a FieldContainer, name: &str) -> Option<&'a [Color]> {
    container
        .field_as::<MFColor>(name)
        .filter(|field| !field.is_ignored())
        .map(MFColor::values)
}

fn floats<'a>(container: &'a FieldContainer, name: &str) -> Option<&'a [f32]> {
    container
        .field_as::<MFFloat>(name)
        .filter(|field| !field.is_ignored())
        .map(MFFloat::values)
}

/// Matrix of a `Transform` container: translate, rotate about the center,
/// then scale along the scale orientation.
fn transform_matrix(container: &FieldContainer) -> Mat4 {
    let translation = vec3_value(container, "translation");
    let center = vec3_value(container, "center");
    let rotation = rotation_value(container, "rotation").0;
    let scale_orientation = rotation_value(container, "scaleOrientation").0;
    let scale = container
        .field_as::<SFVec3f>("scaleFactor")
        .map_or(Vec3::ONE, |field| *field.value());

    Mat4::from_translation(translation + center)
        * Mat4::from_quat(rotation)
        * Mat4::from_quat(scale_orientation)
        * Mat4::from_scale(scale)
        * Mat4::from_quat(scale_orientation.inverse())
        * Mat4::from_translation(-center)
}

impl SceneWalker {
    /// Walker over a fresh state with every standard element.
    pub fn new(config: StateConfig) -> Self {
        Self {
            state: State::new(ElementRegistry::standard(), config),
            next_node: 1,
            snapshots: Vec::new(),
        }
    }

    /// The traversal state.
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Snapshots taken at leaves so far.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Apply every root in order.
    pub fn walk_all(&mut self, roots: &[FieldContainer]) {
        for root in roots {
            self.walk(root, 0);
        }
    }

    /// Apply `container` and its children.
    pub fn walk(&mut self, container: &FieldContainer, depth: usize) {
        let node = NodeId(self.next_node);
        self.next_node += 1;
        log::trace!("{}visit {} as node {node}", "  ".repeat(depth), container.type_name());

        let overriding = container.def_name().is_some_and(|name| name.starts_with(OVERRIDE_PREFIX));
        match container.type_name() {
            "Separator" => {
                self.state.push();
                self.walk_children(container, depth);
                self.state.pop();
                return;
            }
            "Transform" => ModelMatrixElement::mult(&mut self.state, node, transform_matrix(container)),
            "DrawStyle" => self.apply_draw_style(container, node, overriding),
            "Complexity" => self.apply_complexity(container, node, overriding),
            "Material" => self.apply_material(container, node, overriding),
            "ClipPlane" => self.apply_clip_plane(container, node),
            "PickStyle" => {
                if let Some(style) = enum_value(container, "style").and_then(PickStyle::from_repr) {
                    let _ = PickStyleElement::set(&mut self.state, node, style);
                }
                if overriding {
                    OverrideElement::set_pick_style_override(&mut self.state, node, true);
                }
            }
            "LightModel" => {
                if let Some(model) = enum_value(container, "model").and_then(LightModel::from_repr) {
                    let _ = LightModelElement::set(&mut self.state, model);
                }
                if overriding {
                    OverrideElement::set_light_model_override(&mut self.state, node, true);
                }
            }
            "ShapeHints" => self.apply_shape_hints(container, node, overriding),
            "LinearProfile" => self.apply_profile(container, node),
            _ => {}
        }

        if container.is_group() {
            self.walk_children(container, depth);
        } else {
            self.snapshot(container, depth);
        }
    }

    fn walk_children(&mut self, container: &FieldContainer, depth: usize) {
        for child in container.children() {
            self.walk(child, depth + 1);
        }
    }

    fn apply_draw_style(&mut self, container: &FieldContainer, node: NodeId, overriding: bool) {
        let state = &mut self.state;
        if let Some(style) = enum_value(container, "style").and_then(DrawStyle::from_repr) {
            let _ = DrawStyleElement::set(state, node, style);
        }
        if let Some(width) = float_value(container, "lineWidth") {
            let _ = LineWidthElement::set(state, node, width);
        }
        if let Some(size) = float_value(container, "pointSize") {
            let _ = PointSizeElement::set(state, node, size);
        }
        if let Some(pattern) = container.field_as::<SFUShort>("linePattern").filter(|f| !f.is_ignored()) {
            let _ = LinePatternElement::set(state, node, *pattern.value());
        }
        if overriding {
            OverrideElement::set_draw_style_override(state, node, true);
            OverrideElement::set_line_width_override(state, node, true);
            OverrideElement::set_point_size_override(state, node, true);
            OverrideElement::set_line_pattern_override(state, node, true);
        }
    }

    fn apply_complexity(&mut self, container: &FieldContainer, node: NodeId, overriding: bool) {
        let state = &mut self.state;
        if let Some(kind) = enum_value(container, "type").and_then(ComplexityType::from_repr) {
            let _ = ComplexityTypeElement::set(state, node, kind);
        }
        if let Some(value) = float_value(container, "value") {
            let _ = ComplexityElement::set(state, node, value);
        }
        if overriding {
            OverrideElement::set_complexity_type_override(state, node, true);
            OverrideElement::set_complexity_override(state, node, true);
        }
    }

    fn apply_material(&mut self, container: &FieldContainer, node: NodeId, overriding: bool) {
        let state = &mut self.state;
        let mut mask = LazyMask::empty();
        let parts = [
            (LazyMask::DIFFUSE, "diffuseColor", OverrideElement::get_diffuse_color_override(state)),
            (LazyMask::AMBIENT, "ambientColor", OverrideElement::get_ambient_color_override(state)),
            (LazyMask::EMISSIVE, "emissiveColor", OverrideElement::get_emissive_color_override(state)),
            (LazyMask::SPECULAR, "specularColor", OverrideElement::get_specular_color_override(state)),
            (LazyMask::SHININESS, "shininess", OverrideElement::get_shininess_override(state)),
            (LazyMask::TRANSPARENCY, "transparency", OverrideElement::get_transparency_override(state)),
        ];
        for (part, field, overridden) in parts {
            let present = container.field(field).is_some_and(|f| !f.is_ignored());
            mask.set(part, present && !overridden);
        }

        let first_color = |name: &str| colors(container, name).and_then(<[Color]>::first).copied().unwrap_or_default();
        let transparency = floats(container, "transparency").unwrap_or_default();
        let materials = Materials {
            diffuse: colors(container, "diffuseColor").unwrap_or_default(),
            transparency,
            ambient: first_color("ambientColor"),
            emissive: first_color("emissiveColor"),
            specular: first_color("specularColor"),
            shininess: floats(container, "shininess").and_then(<[f32]>::first).copied().unwrap_or(0.2),
            is_transparent: transparency.iter().any(|&t| t > 0.0),
        };
        LazyElement::set_materials(state, node, mask, &materials);

        if overriding {
            OverrideElement::set_diffuse_color_override(state, node, true);
            OverrideElement::set_ambient_color_override(state, node, true);
            OverrideElement::set_emissive_color_override(state, node, true);
            OverrideElement::set_specular_color_override(state, node, true);
            OverrideElement::set_shininess_override(state, node, true);
            OverrideElement::set_transparency_override(state, node, true);
        }
    }

    fn apply_clip_plane(&mut self, container: &FieldContainer, node: NodeId) {
        let on = container.field_as::<SFBool>("on").is_none_or(|field| *field.value());
        if !on {
            return;
        }
        let plane = container
            .field_as::<SFPlane>("plane")
            .map_or_else(|| Plane::new(Vec3::X, 0.0), |field| *field.value());
        ClipPlaneElement::add(&mut self.state, node, plane);
    }

    fn apply_shape_hints(&mut self, container: &FieldContainer, node: NodeId, overriding: bool) {
        let state = &mut self.state;
        let ordering = match enum_value(container, "vertexOrdering") {
            Some(1) => Some(VertexOrdering::Cw),
            Some(2) => Some(VertexOrdering::Ccw),
            _ => None,
        };
        let solid = enum_value(container, "shapeType") == Some(1);
        if let Some(ordering) = ordering {
            LazyElement::set_vertex_ordering(state, ordering);
        }
        LazyElement::set_backface_culling(state, solid && ordering.is_some());
        LazyElement::set_twoside_lighting(state, !solid && ordering.is_some());
        if let Some(angle) = float_value(container, "creaseAngle") {
            let _ = CreaseAngleElement::set(state, node, angle);
        }
        if overriding {
            OverrideElement::set_shape_hints_override(state, node, true);
            OverrideElement::set_crease_angle_override(state, node, true);
        }
    }

    fn apply_profile(&mut self, container: &FieldContainer, node: NodeId) {
        let linkage = enum_value(container, "linkage")
            .and_then(ProfileLinkage::from_repr)
            .unwrap_or(ProfileLinkage::StartNew);
        let indices = container.field_as::<MFInt32>("index").map_or(&[][..], MFInt32::values);
        ProfileElement::add(&mut self.state, node, linkage, indices);
    }

    fn snapshot(&mut self, container: &FieldContainer, depth: usize) {
        let state = &mut self.state;
        let translation = ModelMatrixElement::get(state).w_axis.truncate().to_array();
        let diffuse = state.peek::<LazyElement>().diffuse(0).0.to_array();
        let transparency = state.peek::<LazyElement>().transparency(0);
        let snapshot = Snapshot {
            depth,
            type_name: container.type_name().to_string(),
            def_name: container.def_name().map(str::to_string),
            state_depth: state.depth(),
            translation,
            draw_style: DrawStyleElement::get(state).to_string(),
            line_width: LineWidthElement::get(state),
            complexity: ComplexityElement::get(state),
            diffuse,
            transparency,
            light_model: LightModelElement::get(state).to_string(),
            clip_planes: state.get::<ClipPlaneElement>().num(),
            profiles: state.get::<ProfileElement>().num(),
        };
        self.snapshots.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use coin_fields::{FieldCatalog, Input, read_scene};

    fn walk(text: &str, config: StateConfig) -> SceneWalker {
        let roots = read_scene(&mut Input::from_text(text), &FieldCatalog::with_builtins()).unwrap();
        let mut walker = SceneWalker::new(config);
        walker.walk_all(&roots);
        walker
    }

    #[test]
    fn test_separator_scopes_state() {
        let walker = walk(
            "Group { Separator { DrawStyle { style LINES lineWidth 3 } Info { } } Info { } }",
            StateConfig::default(),
        );
        let snaps = walker.snapshots();
        assert_eq!(snaps.len(), 3);
        assert_eq!(snaps[1].draw_style, "LINES");
        assert_eq!(snaps[1].line_width, 3.0);
        assert_eq!(snaps[1].state_depth, 1);
        assert_eq!(snaps[2].draw_style, "FILLED");
        assert_eq!(snaps[2].line_width, 0.0);
        assert_eq!(walker.state().depth(), 0);
    }

    #[test]
    fn test_transforms_accumulate() {
        let walker = walk(
            "Separator { Transform { translation 1 0 0 } Transform { translation 0 2 0 } Info { } }",
            StateConfig::default(),
        );
        assert_eq!(walker.snapshots()[2].translation, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_override_def_locks_descendants() {
        let walker = walk(
            "Separator { DEF OVERRIDE_STYLE DrawStyle { lineWidth 5 } \
             Separator { DrawStyle { lineWidth 1 } Info { } } }",
            StateConfig::default(),
        );
        let leaf = walker.snapshots().last().unwrap();
        assert_eq!(leaf.line_width, 5.0);
    }

    #[test]
    fn test_material_override_couples_transparency() {
        let scene = "Separator { DEF OVERRIDE_MAT Material { diffuseColor 1 0 0 } \
                     Material { diffuseColor 0 1 0 transparency 0.5 } Info { } }";
        let coupled = walk(scene, StateConfig::default());
        let leaf = coupled.snapshots().last().unwrap();
        assert_eq!(leaf.diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(leaf.transparency, 0.0);
    }

    #[test]
    fn test_clip_planes_and_profiles() {
        let walker = walk(
            "Separator { ClipPlane { } ClipPlane { on FALSE } \
             LinearProfile { index [ 0, 1 ] linkage START_FIRST } \
             LinearProfile { index 2 linkage ADD_TO_CURRENT } Info { } }",
            StateConfig::default(),
        );
        let leaf = walker.snapshots().last().unwrap();
        assert_eq!(leaf.clip_planes, 1);
        assert_eq!(leaf.profiles, 2);
    }

    #[test]
    fn test_light_model_and_shape_hints() {
        let walker = walk(
            "Separator { LightModel { model BASE_COLOR } \
             ShapeHints { vertexOrdering COUNTERCLOCKWISE shapeType SOLID } Info { } }",
            StateConfig::default(),
        );
        assert_eq!(walker.snapshots().last().unwrap().light_model, "BASE_COLOR");
    }
}
