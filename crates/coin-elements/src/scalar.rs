//! Single-value elements.
//!
//! Each element holds one value and the node that set it. Those with an
//! override flag reject `set` while the flag is on.

use std::fmt;
use std::marker::PhantomData;

use coin_common::StateConfig;
use strum_macros::{Display, EnumString, FromRepr};

use crate::element::{Element, NodeId};
use crate::override_element::{OverrideElement, OverrideFlags};
use crate::state::State;

/// The value type, default and override flag of one scalar element.
pub trait ScalarKind: Send + 'static {
    /// Stored value.
    type Value: Clone + PartialEq + fmt::Debug + Send + 'static;
    /// Element name.
    const NAME: &'static str;
    /// Flag that locks the value, if any.
    const OVERRIDE: Option<OverrideFlags>;
    /// The type default.
    fn default_value() -> Self::Value;
}

/// Element holding one `K::Value`.
pub struct ScalarElement<K: ScalarKind> {
    value: K::Value,
    node: NodeId,
    kind: PhantomData<fn() -> K>,
}

impl<K: ScalarKind> Clone for ScalarElement<K> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            node: self.node,
            kind: PhantomData,
        }
    }
}

impl<K: ScalarKind> fmt::Debug for ScalarElement<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("value", &self.value)
            .field("node", &self.node)
            .finish()
    }
}

impl<K: ScalarKind> Element for ScalarElement<K> {
    const NAME: &'static str = K::NAME;

    fn init(_config: &StateConfig) -> Self {
        Self {
            value: K::default_value(),
            node: NodeId::NONE,
            kind: PhantomData,
        }
    }

    fn matches(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K: ScalarKind> ScalarElement<K> {
    /// Set the value unless its override flag is on. Returns `false` when
    /// rejected.
    pub fn set(state: &mut State, node: NodeId, value: K::Value) -> bool {
        if let Some(flag) = K::OVERRIDE {
            if OverrideElement::get(state, flag) {
                log::trace!("{} set by {node} ignored: overridden", K::NAME);
                return false;
            }
        }
        let elem = state.get_mut::<Self>();
        elem.value = value;
        elem.node = node;
        true
    }

    /// Current value, recorded by open caches.
    pub fn get(state: &mut State) -> K::Value {
        state.get::<Self>().value.clone()
    }

    /// The type default.
    pub fn default_value() -> K::Value {
        K::default_value()
    }

    /// Stored value.
    pub const fn value(&self) -> &K::Value {
        &self.value
    }

    /// Node that set the value.
    pub const fn node(&self) -> NodeId {
        self.node
    }
}

// ========== Enumerations ==========

/// How complexity is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum ComplexityType {
    /// Fixed tessellation in object space.
    ObjectSpace = 0,
    /// Tessellation from projected size.
    ScreenSpace = 1,
    /// Draw bounding boxes only.
    BoundingBox = 2,
}

/// How shapes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum DrawStyle {
    /// Filled polygons.
    Filled = 0,
    /// Outlines.
    Lines = 1,
    /// Vertices.
    Points = 2,
    /// Nothing.
    Invisible = 3,
}

/// How shapes are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum PickStyle {
    /// Exact geometry.
    Shape = 0,
    /// Bounding box.
    BoundingBox = 1,
    /// Not pickable.
    Unpickable = 2,
}

/// How materials or normals map onto geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Binding {
    /// One value for the whole shape.
    Overall = 2,
    /// One per part.
    PerPart = 3,
    /// One per part, indexed.
    PerPartIndexed = 4,
    /// One per face.
    PerFace = 5,
    /// One per face, indexed.
    PerFaceIndexed = 6,
    /// One per vertex.
    PerVertex = 7,
    /// One per vertex, indexed.
    PerVertexIndexed = 8,
}

/// Length unit of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Units {
    /// Meters.
    Meters = 0,
    /// Centimeters.
    Centimeters,
    /// Millimeters.
    Millimeters,
    /// Micrometers.
    Micrometers,
    /// Microns.
    Microns,
    /// Nanometers.
    Nanometers,
    /// Angstroms.
    Angstroms,
    /// Kilometers.
    Kilometers,
    /// Feet.
    Feet,
    /// Inches.
    Inches,
    /// Points.
    Points,
    /// Yards.
    Yards,
    /// Miles.
    Miles,
    /// Nautical miles.
    NauticalMiles,
}

impl Units {
    /// Length of one unit in meters.
    pub const fn meters(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Centimeters => 0.01,
            Self::Millimeters => 0.001,
            Self::Micrometers | Self::Microns => 1.0e-6,
            Self::Nanometers => 1.0e-9,
            Self::Angstroms => 1.0e-10,
            Self::Kilometers => 1000.0,
            Self::Feet => 0.3048,
            Self::Inches => 0.0254,
            Self::Points => 0.0254 / 72.0,
            Self::Yards => 0.9144,
            Self::Miles => 1609.344,
            Self::NauticalMiles => 1852.0,
        }
    }
}

// ========== Instances ==========

macro_rules! scalar_elements {
    ($($(#[$doc:meta])* $alias:ident, $kind:ident: $value:ty = $default:expr, $flag:expr;)*) => {
        $(
            #[doc = concat!("Value kind of [`", stringify!($alias), "`].")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            pub struct $kind;

            impl ScalarKind for $kind {
                type Value = $value;
                const NAME: &'static str = stringify!($alias);
                const OVERRIDE: Option<OverrideFlags> = $flag;

                fn default_value() -> $value {
                    $default
                }
            }

            $(#[$doc])*
            pub type $alias = ScalarElement<$kind>;
        )*
    };
}

scalar_elements! {
    /// Tessellation detail in `[0, 1]`.
    ComplexityElement, ComplexityKind: f32 = 0.5, Some(OverrideFlags::COMPLEXITY);
    /// Interpretation of complexity.
    ComplexityTypeElement, ComplexityTypeKind: ComplexityType = ComplexityType::ObjectSpace,
        Some(OverrideFlags::COMPLEXITY_TYPE);
    /// Angle in radians below which normals are smoothed.
    CreaseAngleElement, CreaseAngleKind: f32 = 0.0, Some(OverrideFlags::CREASE_ANGLE);
    /// Line width in pixels; 0 means the renderer default.
    LineWidthElement, LineWidthKind: f32 = 0.0, Some(OverrideFlags::LINE_WIDTH);
    /// Point size in pixels; 0 means the renderer default.
    PointSizeElement, PointSizeKind: f32 = 0.0, Some(OverrideFlags::POINT_SIZE);
    /// Font size in points.
    FontSizeElement, FontSizeKind: f32 = 10.0, Some(OverrideFlags::FONT_SIZE);
    /// Font name.
    FontNameElement, FontNameKind: String = String::from("defaultFont"), Some(OverrideFlags::FONT_NAME);
    /// Draw style.
    DrawStyleElement, DrawStyleKind: DrawStyle = DrawStyle::Filled, Some(OverrideFlags::DRAW_STYLE);
    /// 16-bit line stipple pattern.
    LinePatternElement, LinePatternKind: u16 = 0xffff, Some(OverrideFlags::LINE_PATTERN);
    /// Pick style.
    PickStyleElement, PickStyleKind: PickStyle = PickStyle::Shape, Some(OverrideFlags::PICK_STYLE);
    /// Material binding.
    MaterialBindingElement, MaterialBindingKind: Binding = Binding::Overall,
        Some(OverrideFlags::MATERIAL_BINDING);
    /// Normal binding.
    NormalBindingElement, NormalBindingKind: Binding = Binding::PerVertexIndexed,
        Some(OverrideFlags::NORMAL_BINDING);
    /// Active child of a switch; -1 for none.
    SwitchElement, SwitchKind: i32 = -1, None;
    /// Length unit.
    UnitsElement, UnitsKind: Units = Units::Meters, None;
    /// Focal distance of the active camera.
    FocalDistanceElement, FocalDistanceKind: f32 = 5.0, None;
}
