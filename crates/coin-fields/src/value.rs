//! Element types stored in single- and multi-value fields.
//!
//! [`FieldValue`] describes how one value is read and written. The generic
//! [`SField`](crate::SField) and [`MField`](crate::MField) wrappers build the
//! concrete field types from it.

use std::fmt::Debug;

use coin_common::ReadError;
use glam::{DVec3, Mat4, Quat, Vec2, Vec3, Vec4};

use crate::input::Input;
use crate::output::Output;

/// One value of a field.
pub trait FieldValue: Clone + PartialEq + Debug + Default + Send + Sync + 'static {
    /// Type name without the `SF`/`MF` prefix, e.g. `"Vec3f"`.
    const TYPE_NAME: &'static str;

    /// How many values a multi-value field writes per line.
    const VALUES_PER_LINE: usize = 1;

    /// Read one value. Posts exactly one diagnostic on failure.
    fn read(input: &mut Input) -> Result<Self, ReadError>;

    /// Write one value.
    fn write(&self, out: &mut Output);
}

/// Read `N` floats, posting one diagnostic if any of them is missing.
fn read_floats<const N: usize>(input: &mut Input, component: &str) -> Result<[f32; N], ReadError> {
    let mut values = [0.0; N];
    for v in &mut values {
        let value = input.read_f32();
        *v = input.require(value, component, "floating point value")?;
    }
    Ok(values)
}

// ========== Scalars ==========

impl FieldValue for bool {
    const TYPE_NAME: &'static str = "Bool";
    const VALUES_PER_LINE: usize = 8;

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        const COMPONENT: &str = "SFBool";

        if let Some(value) = input.read_i32() {
            return match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(input.post_error(
                    COMPONENT,
                    format!("Illegal value for field: {other} (must be 0 or 1)"),
                )),
            };
        }

        if input.is_binary() {
            return Err(input.premature_eof(COMPONENT));
        }

        let Some(name) = input.read_name(true) else {
            return Err(input.post_error(COMPONENT, "Couldn't read field value"));
        };
        match name.as_str() {
            "TRUE" => Ok(true),
            "FALSE" => Ok(false),
            other => Err(input.post_error(
                COMPONENT,
                format!("Invalid value \"{other}\" for field (must be TRUE or FALSE)"),
            )),
        }
    }

    fn write(&self, out: &mut Output) {
        if out.is_binary() {
            out.write_u32(u32::from(*self));
        } else {
            out.write_raw(if *self { "TRUE" } else { "FALSE" });
        }
    }
}

macro_rules! integer_value {
    ($ty:ty, $name:literal, $per_line:literal, $read:ident, $write:ident, $what:literal) => {
        impl FieldValue for $ty {
            const TYPE_NAME: &'static str = $name;
            const VALUES_PER_LINE: usize = $per_line;

            fn read(input: &mut Input) -> Result<Self, ReadError> {
                let value = input.$read();
                input.require(value, concat!("SF", $name), $what)
            }

            fn write(&self, out: &mut Output) {
                out.$write(*self);
            }
        }
    };
}

integer_value!(i32, "Int32", 8, read_i32, write_i32, "integer value");
integer_value!(u32, "UInt32", 8, read_u32, write_u32, "unsigned integer value");
integer_value!(i16, "Short", 8, read_i16, write_i16, "short integer value");
integer_value!(u16, "UShort", 8, read_u16, write_u16, "unsigned short integer value");

impl FieldValue for f32 {
    const TYPE_NAME: &'static str = "Float";
    const VALUES_PER_LINE: usize = 4;

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        let value = input.read_f32();
        input.require(value, "SFFloat", "floating point value")
    }

    fn write(&self, out: &mut Output) {
        out.write_f32(*self);
    }
}

impl FieldValue for f64 {
    const TYPE_NAME: &'static str = "Double";
    const VALUES_PER_LINE: usize = 4;

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        let value = input.read_f64();
        input.require(value, "SFDouble", "floating point value")
    }

    fn write(&self, out: &mut Output) {
        out.write_f64(*self);
    }
}

/// Seconds, stored as a double.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl FieldValue for Time {
    const TYPE_NAME: &'static str = "Time";
    const VALUES_PER_LINE: usize = 4;

    /// Non-finite values are replaced by zero with a warning.
    fn read(input: &mut Input) -> Result<Self, ReadError> {
        const COMPONENT: &str = "SFTime";
        let Some(seconds) = input.read_f64() else {
            return Err(input.post_error(COMPONENT, "unable to read floating point value"));
        };
        if seconds.is_finite() {
            Ok(Self(seconds))
        } else {
            input.post_warning(COMPONENT, "Detected non-valid floating point number, replacing with 0.0f");
            Ok(Self(0.0))
        }
    }

    fn write(&self, out: &mut Output) {
        out.write_f64(self.0);
    }
}

// ========== Strings ==========

impl FieldValue for String {
    const TYPE_NAME: &'static str = "String";

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        let value = input.read_string();
        input.require(value, "SFString", "string")
    }

    fn write(&self, out: &mut Output) {
        out.write_string(self);
    }
}

/// An identifier-like string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Name(pub String);

impl FieldValue for Name {
    const TYPE_NAME: &'static str = "Name";

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        let value = input.read_name_value();
        input.require(value, "SFName", "name").map(Self)
    }

    fn write(&self, out: &mut Output) {
        out.write_string(&self.0);
    }
}

// ========== Vectors ==========

impl FieldValue for Vec2 {
    const TYPE_NAME: &'static str = "Vec2f";
    const VALUES_PER_LINE: usize = 3;

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        read_floats::<2>(input, "SFVec2f").map(Self::from_array)
    }

    fn write(&self, out: &mut Output) {
        out.write_f32_slice(&self.to_array());
    }
}

impl FieldValue for Vec3 {
    const TYPE_NAME: &'static str = "Vec3f";
    const VALUES_PER_LINE: usize = 2;

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        read_floats::<3>(input, "SFVec3f").map(Self::from_array)
    }

    fn write(&self, out: &mut Output) {
        out.write_f32_slice(&self.to_array());
    }
}

impl FieldValue for Vec4 {
    const TYPE_NAME: &'static str = "Vec4f";

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        read_floats::<4>(input, "SFVec4f").map(Self::from_array)
    }

    fn write(&self, out: &mut Output) {
        out.write_f32_slice(&self.to_array());
    }
}

impl FieldValue for DVec3 {
    const TYPE_NAME: &'static str = "Vec3d";
    const VALUES_PER_LINE: usize = 2;

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        const COMPONENT: &str = "SFVec3d";
        let mut xyz = [0.0; 3];
        for v in &mut xyz {
            let value = input.read_f64();
            *v = input.require(value, COMPONENT, "floating point value")?;
        }
        Ok(Self::from_array(xyz))
    }

    fn write(&self, out: &mut Output) {
        for (i, v) in self.to_array().into_iter().enumerate() {
            if i > 0 && !out.is_binary() {
                out.write_char(' ');
            }
            out.write_f64(v);
        }
    }
}

/// RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color(pub Vec3);

impl Color {
    /// Color from its red, green and blue components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self(Vec3::new(r, g, b))
    }

    /// Pack with an alpha channel as `0xRRGGBBAA`.
    pub fn to_packed(self, alpha: f32) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.0.x) << 24) | (channel(self.0.y) << 16) | (channel(self.0.z) << 8) | channel(alpha)
    }

    /// Unpack `0xRRGGBBAA`, returning the color and its alpha.
    pub fn from_packed(packed: u32) -> (Self, f32) {
        let channel = |shift: u32| ((packed >> shift) & 0xff) as f32 / 255.0;
        (Self::new(channel(24), channel(16), channel(8)), channel(0))
    }
}

impl FieldValue for Color {
    const TYPE_NAME: &'static str = "Color";
    const VALUES_PER_LINE: usize = 2;

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        read_floats::<3>(input, "SFColor").map(|rgb| Self(Vec3::from_array(rgb)))
    }

    fn write(&self, out: &mut Output) {
        out.write_f32_slice(&self.0.to_array());
    }
}

// ========== Rotation, plane, matrix ==========

/// Orientation stored as a unit quaternion, written as axis and angle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation(pub Quat);

impl Rotation {
    /// Rotation of `radians` around `axis`. A zero axis yields the identity.
    pub fn from_axis_angle(axis: Vec3, radians: f32) -> Self {
        if axis.length_squared() == 0.0 {
            return Self(Quat::IDENTITY);
        }
        Self(Quat::from_axis_angle(axis.normalize(), radians))
    }

    /// Axis and angle; the identity reports the z axis.
    pub fn axis_angle(self) -> (Vec3, f32) {
        let q = self.0;
        let v = Vec3::new(q.x, q.y, q.z);
        let length = v.length();
        if length < 1.0e-8 {
            return (Vec3::Z, 0.0);
        }
        (v / length, 2.0 * length.atan2(q.w))
    }
}

impl FieldValue for Rotation {
    const TYPE_NAME: &'static str = "Rotation";

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        const COMPONENT: &str = "SFRotation";
        let [x, y, z, angle] = read_floats::<4>(input, COMPONENT)?;
        let axis = Vec3::new(x, y, z);
        if axis.length_squared() == 0.0 && angle != 0.0 {
            input.post_warning(COMPONENT, "rotation axis has zero length, using the identity");
        }
        Ok(Self::from_axis_angle(axis, angle))
    }

    fn write(&self, out: &mut Output) {
        let (axis, angle) = self.axis_angle();
        out.write_f32_slice(&axis.to_array());
        if !out.is_binary() {
            out.write_raw("  ");
        }
        out.write_f32(angle);
    }
}

/// Oriented plane `normal . p = distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Signed distance from the origin along the normal.
    pub distance: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Z,
            distance: 0.0,
        }
    }
}

impl Plane {
    /// Plane from a normal (normalized here) and a distance.
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.try_normalize().unwrap_or(normal),
            distance,
        }
    }

    /// The plane after transforming space by `matrix`.
    pub fn transform(self, matrix: &Mat4) -> Self {
        let point = matrix.transform_point3(self.normal * self.distance);
        let normal = matrix.inverse().transpose().transform_vector3(self.normal);
        let normal = normal.try_normalize().unwrap_or(self.normal);
        Self {
            normal,
            distance: normal.dot(point),
        }
    }
}

impl FieldValue for Plane {
    const TYPE_NAME: &'static str = "Plane";

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        let [x, y, z, d] = read_floats::<4>(input, "SFPlane")?;
        Ok(Self::new(Vec3::new(x, y, z), d))
    }

    fn write(&self, out: &mut Output) {
        out.write_f32_slice(&self.normal.to_array());
        if !out.is_binary() {
            out.write_raw("  ");
        }
        out.write_f32(self.distance);
    }
}

impl FieldValue for Mat4 {
    const TYPE_NAME: &'static str = "Matrix";

    fn read(input: &mut Input) -> Result<Self, ReadError> {
        read_floats::<16>(input, "SFMatrix").map(|m| Self::from_cols_array(&m))
    }

    /// Text form: the first row, then the remaining rows on indented lines.
    fn write(&self, out: &mut Output) {
        let values = self.to_cols_array();
        if out.is_binary() {
            out.write_f32_slice(&values);
            return;
        }
        for (row, chunk) in values.chunks(4).enumerate() {
            if row > 0 {
                out.write_char('\n');
                out.indent();
                out.write_raw("  ");
            }
            out.write_f32_slice(chunk);
        }
    }
}
