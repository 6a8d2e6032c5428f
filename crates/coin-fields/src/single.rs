//! Single-value fields.

use std::any::Any;

use coin_common::ReadError;
use glam::{DVec3, Mat4, Vec2, Vec3, Vec4};

use crate::field::{Field, FieldState};
use crate::image::Image;
use crate::input::Input;
use crate::output::Output;
use crate::value::{Color, FieldValue, Name, Plane, Rotation, Time};

/// A field holding exactly one value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SField<T: FieldValue> {
    value: T,
    state: FieldState,
}

impl<T: FieldValue> SField<T> {
    /// Field holding the type's default value, flagged as default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field whose default value is `value`.
    pub fn with_default(value: T) -> Self {
        Self {
            value,
            state: FieldState::default(),
        }
    }

    /// Current value.
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Replace the value; the field is no longer at its default.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
        self.set_default(false);
    }
}

impl<T: FieldValue> Field for SField<T> {
    fn type_name(&self) -> String {
        format!("SF{}", T::TYPE_NAME)
    }

    fn state(&self) -> &FieldState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn read_value(&mut self, input: &mut Input) -> Result<(), ReadError> {
        self.value = T::read(input)?;
        Ok(())
    }

    fn write_value(&self, out: &mut Output) {
        self.value.write(out);
    }

    fn is_same(&self, other: &dyn Field) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| other.value == self.value)
    }

    fn copy_from(&mut self, other: &dyn Field) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => {
                self.value = other.value.clone();
                self.set_default(other.is_default());
                true
            }
            None => false,
        }
    }

    fn box_clone(&self) -> Box<dyn Field> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// `SFBool`.
pub type SFBool = SField<bool>;
/// `SFInt32`.
pub type SFInt32 = SField<i32>;
/// `SFUInt32`.
pub type SFUInt32 = SField<u32>;
/// `SFShort`.
pub type SFShort = SField<i16>;
/// `SFUShort`.
pub type SFUShort = SField<u16>;
/// `SFFloat`.
pub type SFFloat = SField<f32>;
/// `SFDouble`.
pub type SFDouble = SField<f64>;
/// `SFTime`.
pub type SFTime = SField<Time>;
/// `SFString`.
pub type SFString = SField<String>;
/// `SFName`.
pub type SFName = SField<Name>;
/// `SFVec2f`.
pub type SFVec2f = SField<Vec2>;
/// `SFVec3f`.
pub type SFVec3f = SField<Vec3>;
/// `SFVec4f`.
pub type SFVec4f = SField<Vec4>;
/// `SFVec3d`.
pub type SFVec3d = SField<DVec3>;
/// `SFColor`.
pub type SFColor = SField<Color>;
/// `SFRotation`.
pub type SFRotation = SField<Rotation>;
/// `SFPlane`.
pub type SFPlane = SField<Plane>;
/// `SFMatrix`.
pub type SFMatrix = SField<Mat4>;
/// `SFImage`.
pub type SFImage = SField<Image>;
