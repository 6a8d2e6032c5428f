//! Multi-value fields.
//!
//! Text form is either a single bare value or a bracketed list with optional
//! commas, `[ a, b, c ]`. Binary form is a count followed by the values.

use std::any::Any;

use coin_common::ReadError;
use glam::{DVec3, Mat4, Vec2, Vec3, Vec4};

use crate::field::{Field, FieldState};
use crate::input::Input;
use crate::output::Output;
use crate::value::{Color, FieldValue, Name, Plane, Rotation, Time};

/// Read a multi-value body into `values`.
///
/// `values` is cleared first and keeps whatever was read before a failure.
pub(crate) fn read_values<V>(
    input: &mut Input,
    component: &str,
    values: &mut Vec<V>,
    mut read_one: impl FnMut(&mut Input) -> Result<V, ReadError>,
) -> Result<(), ReadError> {
    values.clear();

    if input.is_binary() {
        let count = input.read_i32();
        let count = input.require(count, component, "number of values")?;
        if count < 0 {
            return Err(input.post_error(component, format!("invalid number of values in field: {count}")));
        }
        for _ in 0..count {
            values.push(read_one(input)?);
        }
        return Ok(());
    }

    let mark = input.mark();
    if input.read_char() != Some('[') {
        input.rewind(mark);
        values.push(read_one(input)?);
        return Ok(());
    }

    let mark = input.mark();
    if input.expect_char(component)? == ']' {
        return Ok(());
    }
    input.rewind(mark);

    loop {
        values.push(read_one(input)?);

        let mut mark = input.mark();
        let mut c = input.expect_char(component)?;
        if c == ',' {
            mark = input.mark();
            c = input.expect_char(component)?;
        }
        match c {
            ']' => return Ok(()),
            '}' => {
                return Err(input.post_error(component, format!("Premature end of array, got '{c}'")));
            }
            _ => input.rewind(mark),
        }
    }
}

/// Write a multi-value body.
pub(crate) fn write_values<V>(
    out: &mut Output,
    values: &[V],
    values_per_line: usize,
    mut write_one: impl FnMut(&V, &mut Output),
) {
    if out.is_binary() {
        out.write_i32(values.len() as i32);
        for value in values {
            write_one(value, out);
        }
        return;
    }

    let bracketed = values.len() != 1;
    if bracketed {
        out.write_raw("[ ");
    }
    out.increment_indent();
    for (i, value) in values.iter().enumerate() {
        write_one(value, out);
        if i + 1 == values.len() {
            break;
        }
        if values_per_line > 0 && (i + 1) % values_per_line == 0 {
            out.write_raw(",\n");
            out.indent();
            out.write_raw("  ");
        } else {
            out.write_raw(", ");
        }
    }
    if bracketed {
        out.write_raw(" ]");
    }
    out.decrement_indent();
}

/// Validate a `[start, start + num)` deletion range against `len`.
pub(crate) fn deletion_range(start: usize, num: Option<usize>, len: usize) -> Option<std::ops::Range<usize>> {
    let end = num.map_or(len, |num| start.saturating_add(num));
    if start > end || end > len {
        log::warn!(
            "invalid indices [{start}, {}] for array of size {len}",
            end.saturating_sub(1)
        );
        return None;
    }
    Some(start..end)
}

/// A field holding an ordered list of values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MField<T: FieldValue> {
    values: Vec<T>,
    state: FieldState,
}

impl<T: FieldValue> MField<T> {
    /// Empty field, flagged as default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field whose default is the given list.
    pub fn with_default(values: Vec<T>) -> Self {
        Self {
            values,
            state: FieldState::default(),
        }
    }

    /// All values.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Index of the first value equal to `value`.
    pub fn find(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    /// Replace everything with one value.
    pub fn set_value(&mut self, value: T) {
        self.values.clear();
        self.values.push(value);
        self.set_default(false);
    }

    /// Overwrite values starting at `start`, growing the list as needed.
    pub fn set_values(&mut self, start: usize, values: &[T]) {
        let end = start + values.len();
        if self.values.len() < end {
            self.values.resize(end, T::default());
        }
        self.values[start..end].clone_from_slice(values);
        self.set_default(false);
    }

    /// Set one value, growing the list as needed.
    pub fn set1_value(&mut self, index: usize, value: T) {
        if self.values.len() <= index {
            self.values.resize(index + 1, T::default());
        }
        self.values[index] = value;
        self.set_default(false);
    }

    /// Truncate or extend with default values to exactly `num` values.
    pub fn set_num(&mut self, num: usize) {
        self.values.resize(num, T::default());
        self.set_default(false);
    }

    /// Remove `num` values at `start`, or everything from `start` with
    /// `None`. An out-of-range request is logged and ignored.
    pub fn delete_values(&mut self, start: usize, num: Option<usize>) {
        if let Some(range) = deletion_range(start, num, self.values.len()) {
            let _ = self.values.drain(range);
            self.set_default(false);
        }
    }

    /// Insert `num` default values before `start`.
    pub fn insert_space(&mut self, start: usize, num: usize) {
        let start = start.min(self.values.len());
        let _ = self.values.splice(start..start, std::iter::repeat_n(T::default(), num));
        self.set_default(false);
    }
}

impl MField<String> {
    /// Delete text from `(from_line, from_char)` through `(to_line, to_char)`
    /// inclusive, joining the remainder of the first and last lines.
    pub fn delete_text(&mut self, from_line: usize, from_char: usize, to_line: usize, to_char: usize) {
        let valid = from_line <= to_line
            && to_line < self.values.len()
            && from_char <= self.values[from_line].chars().count()
            && to_char < self.values[to_line].chars().count();
        if !valid {
            log::warn!("invalid text range ({from_line}, {from_char}) to ({to_line}, {to_char})");
            return;
        }

        let head: String = self.values[from_line].chars().take(from_char).collect();
        let tail: String = self.values[to_line].chars().skip(to_char + 1).collect();
        self.values[from_line] = head + &tail;
        let _ = self.values.drain(from_line + 1..=to_line);
        self.set_default(false);
    }
}

impl<T: FieldValue> Field for MField<T> {
    fn type_name(&self) -> String {
        format!("MF{}", T::TYPE_NAME)
    }

    fn state(&self) -> &FieldState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn read_value(&mut self, input: &mut Input) -> Result<(), ReadError> {
        let component = self.type_name();
        read_values(input, &component, &mut self.values, T::read)
    }

    fn write_value(&self, out: &mut Output) {
        write_values(out, &self.values, T::VALUES_PER_LINE, T::write);
    }

    fn is_same(&self, other: &dyn Field) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| other.values == self.values)
    }

    fn copy_from(&mut self, other: &dyn Field) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => {
                self.values.clone_from(&other.values);
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

/// `MFBool`.
pub type MFBool = MField<bool>;
/// `MFInt32`.
pub type MFInt32 = MField<i32>;
/// `MFUInt32`.
pub type MFUInt32 = MField<u32>;
/// `MFShort`.
pub type MFShort = MField<i16>;
/// `MFUShort`.
pub type MFUShort = MField<u16>;
/// `MFFloat`.
pub type MFFloat = MField<f32>;
/// `MFDouble`.
pub type MFDouble = MField<f64>;
/// `MFTime`.
pub type MFTime = MField<Time>;
/// `MFString`.
pub type MFString = MField<String>;
/// `MFName`.
pub type MFName = MField<Name>;
/// `MFVec2f`.
pub type MFVec2f = MField<Vec2>;
/// `MFVec3f`.
pub type MFVec3f = MField<Vec3>;
/// `MFVec4f`.
pub type MFVec4f = MField<Vec4>;
/// `MFVec3d`.
pub type MFVec3d = MField<DVec3>;
/// `MFColor`.
pub type MFColor = MField<Color>;
/// `MFRotation`.
pub type MFRotation = MField<Rotation>;
/// `MFPlane`.
pub type MFPlane = MField<Plane>;
/// `MFMatrix`.
pub type MFMatrix = MField<Mat4>;
