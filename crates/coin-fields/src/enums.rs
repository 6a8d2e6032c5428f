//! Enumerated and bit mask fields.
//!
//! Both store plain integers and carry an [`EnumSet`] that maps names to
//! values. Text files use the names; binary files use the integers.

use std::any::Any;

use coin_common::ReadError;

use crate::field::{Field, FieldState};
use crate::input::Input;
use crate::multi::{deletion_range, read_values, write_values};
use crate::output::Output;

const VALUES_PER_LINE: usize = 4;

/// Name to value table of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumSet {
    entries: Vec<(String, i32)>,
    legal_values_set: bool,
}

impl EnumSet {
    /// Table with a fixed set of legal values.
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = (S, i32)>) -> Self {
        Self {
            entries: entries.into_iter().map(|(name, value)| (name.into(), value)).collect(),
            legal_values_set: true,
        }
    }

    /// True once a fixed set of legal values has been installed.
    pub const fn has_legal_values(&self) -> bool {
        self.legal_values_set
    }

    /// Value of `name`.
    pub fn find_value(&self, name: &str) -> Option<i32> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// First name mapped to `value`.
    pub fn find_name(&self, value: i32) -> Option<&str> {
        self.entries.iter().find(|(_, v)| *v == value).map(|(n, _)| n.as_str())
    }

    /// Add a legal name.
    pub fn insert(&mut self, name: &str, value: i32) {
        self.entries.push((name.to_string(), value));
        self.legal_values_set = true;
    }

    /// Register a name found in a file, giving it the next free index.
    pub fn register(&mut self, name: &str) -> i32 {
        let value = self.entries.len() as i32;
        self.entries.push((name.to_string(), value));
        value
    }

    /// Register a bit mask name found in a file, giving it the lowest bit
    /// no known name uses. Returns `None` once all 32 bits are taken.
    pub fn register_bit(&mut self, name: &str) -> Option<i32> {
        let used = self.entries.iter().fold(0_i32, |acc, (_, v)| acc | v);
        let bit = (0..32).map(|shift| 1_i32 << shift).find(|bit| used & bit == 0)?;
        self.entries.push((name.to_string(), bit));
        Some(bit)
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no names are known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

// ========== Value codecs ==========

fn read_enum(input: &mut Input, enums: &mut EnumSet, component: &str) -> Result<i32, ReadError> {
    if input.is_binary() {
        let value = input.read_i32();
        return input.require(value, component, "enumeration value");
    }

    let Some(name) = input.read_name(true) else {
        if let Some(value) = input.read_i32() {
            return Ok(value);
        }
        return Err(input.post_error(component, "Couldn't read enumeration name"));
    };

    if let Some(value) = enums.find_value(&name) {
        return Ok(value);
    }
    if !enums.has_legal_values() && input.options().lenient_enums {
        return Ok(enums.register(&name));
    }
    Err(input.post_error(component, format!("Unknown {component} enumeration value \"{name}\"")))
}

fn write_enum(value: i32, enums: &EnumSet, out: &mut Output, component: &str) {
    if out.is_binary() {
        out.write_i32(value);
        return;
    }
    if let Some(name) = enums.find_name(value) {
        out.write_raw(name);
    } else {
        out.post_warning(component, format!("Illegal enumeration value {value}"));
        out.write_i32(value);
    }
}

fn read_bitmask(input: &mut Input, enums: &mut EnumSet, component: &str) -> Result<i32, ReadError> {
    if input.is_binary() {
        let value = input.read_i32();
        return input.require(value, component, "bit mask value");
    }

    let mut lookup = |input: &mut Input, name: &str| -> Result<i32, ReadError> {
        if let Some(value) = enums.find_value(name) {
            return Ok(value);
        }
        let lenient = !enums.has_legal_values() && input.options().lenient_enums;
        if let Some(bit) = lenient.then(|| enums.register_bit(name)).flatten() {
            return Ok(bit);
        }
        Err(input.post_error(component, format!("Unknown {component} bit mask value \"{name}\"")))
    };

    let mark = input.mark();
    if input.read_char() != Some('(') {
        input.rewind(mark);
        return match input.read_name(true) {
            Some(name) => lookup(input, &name),
            None => input
                .read_i32()
                .ok_or_else(|| input.post_error(component, "Couldn't read bit mask value")),
        };
    }

    let mut value = 0;
    loop {
        let mark = input.mark();
        if input.expect_char(component)? == ')' {
            return Ok(value);
        }
        input.rewind(mark);

        let Some(name) = input.read_name(true) else {
            return Err(input.post_error(component, "Couldn't read bit mask name"));
        };
        value |= lookup(input, &name)?;

        match input.expect_char(component)? {
            '|' => {}
            ')' => return Ok(value),
            c => return Err(input.post_error(component, format!("Expected '|' or ')', got '{c}'"))),
        }
    }
}

fn write_bitmask(value: i32, enums: &EnumSet, out: &mut Output, component: &str) {
    if out.is_binary() {
        out.write_i32(value);
        return;
    }

    let mut remaining = value;
    let mut names = Vec::new();
    for (name, bits) in enums.iter() {
        if bits != 0 && remaining & bits == bits {
            names.push(name);
            remaining &= !bits;
        }
    }
    if names.is_empty() {
        if let Some(name) = enums.find_name(value) {
            names.push(name);
        }
    }
    if remaining != 0 {
        out.post_warning(component, format!("unable to write some bits (0x{remaining:x})"));
    }

    match names.as_slice() {
        [single] => out.write_raw(single),
        _ => out.write_raw(&format!("({})", names.join(" | "))),
    }
}

// ========== Fields ==========

macro_rules! enum_field_common {
    () => {
        /// Name table.
        pub const fn enums(&self) -> &EnumSet {
            &self.enums
        }

        /// Install a fixed set of legal values.
        pub fn set_enums<S: Into<String>>(&mut self, entries: impl IntoIterator<Item = (S, i32)>) {
            self.enums = EnumSet::new(entries);
        }
    };
}

macro_rules! field_boilerplate {
    () => {
        fn state(&self) -> &FieldState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut FieldState {
            &mut self.state
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
    };
}

/// Single enumerated value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SFEnum {
    value: i32,
    enums: EnumSet,
    state: FieldState,
}

impl SFEnum {
    /// Field with the given legal values and default.
    pub fn with_enums(enums: EnumSet, default: i32) -> Self {
        Self {
            value: default,
            enums,
            state: FieldState::default(),
        }
    }

    enum_field_common!();

    /// Current value.
    pub const fn value(&self) -> i32 {
        self.value
    }

    /// Set the value.
    pub fn set_value(&mut self, value: i32) {
        self.value = value;
        self.set_default(false);
    }

    /// Set the value by name. Returns false for an unknown name.
    pub fn set_value_by_name(&mut self, name: &str) -> bool {
        match self.enums.find_value(name) {
            Some(value) => {
                self.set_value(value);
                true
            }
            None => false,
        }
    }
}

impl Field for SFEnum {
    fn type_name(&self) -> String {
        "SFEnum".to_string()
    }

    fn read_value(&mut self, input: &mut Input) -> Result<(), ReadError> {
        self.value = read_enum(input, &mut self.enums, "SFEnum")?;
        Ok(())
    }

    fn write_value(&self, out: &mut Output) {
        write_enum(self.value, &self.enums, out, "SFEnum");
    }

    fn is_same(&self, other: &dyn Field) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| o.value == self.value)
    }

    fn copy_from(&mut self, other: &dyn Field) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => {
                self.value = other.value;
                self.enums.clone_from(&other.enums);
                self.set_default(other.is_default());
                true
            }
            None => false,
        }
    }

    field_boilerplate!();
}

/// List of enumerated values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MFEnum {
    values: Vec<i32>,
    enums: EnumSet,
    state: FieldState,
}

impl MFEnum {
    /// Empty field with the given legal values.
    pub fn with_enums(enums: EnumSet) -> Self {
        Self {
            values: Vec::new(),
            enums,
            state: FieldState::default(),
        }
    }

    enum_field_common!();

    /// All values.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Replace the values.
    pub fn set_values(&mut self, values: &[i32]) {
        self.values = values.to_vec();
        self.set_default(false);
    }

    /// Remove `num` values at `start`, or everything from `start` with `None`.
    pub fn delete_values(&mut self, start: usize, num: Option<usize>) {
        if let Some(range) = deletion_range(start, num, self.values.len()) {
            let _ = self.values.drain(range);
            self.set_default(false);
        }
    }
}

impl Field for MFEnum {
    fn type_name(&self) -> String {
        "MFEnum".to_string()
    }

    fn read_value(&mut self, input: &mut Input) -> Result<(), ReadError> {
        let enums = &mut self.enums;
        read_values(input, "MFEnum", &mut self.values, |input| read_enum(input, enums, "MFEnum"))
    }

    fn write_value(&self, out: &mut Output) {
        write_values(out, &self.values, VALUES_PER_LINE, |v, out| {
            write_enum(*v, &self.enums, out, "MFEnum");
        });
    }

    fn is_same(&self, other: &dyn Field) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| o.values == self.values)
    }

    fn copy_from(&mut self, other: &dyn Field) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => {
                self.values.clone_from(&other.values);
                self.enums.clone_from(&other.enums);
                self.set_default(other.is_default());
                true
            }
            None => false,
        }
    }

    field_boilerplate!();
}

/// Single bit mask value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SFBitMask {
    value: i32,
    enums: EnumSet,
    state: FieldState,
}

impl SFBitMask {
    /// Field with the given bit names and default.
    pub fn with_enums(enums: EnumSet, default: i32) -> Self {
        Self {
            value: default,
            enums,
            state: FieldState::default(),
        }
    }

    enum_field_common!();

    /// Current mask.
    pub const fn value(&self) -> i32 {
        self.value
    }

    /// Set the mask.
    pub fn set_value(&mut self, value: i32) {
        self.value = value;
        self.set_default(false);
    }
}

impl Field for SFBitMask {
    fn type_name(&self) -> String {
        "SFBitMask".to_string()
    }

    fn read_value(&mut self, input: &mut Input) -> Result<(), ReadError> {
        self.value = read_bitmask(input, &mut self.enums, "SFBitMask")?;
        Ok(())
    }

    fn write_value(&self, out: &mut Output) {
        write_bitmask(self.value, &self.enums, out, "SFBitMask");
    }

    fn is_same(&self, other: &dyn Field) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| o.value == self.value)
    }

    fn copy_from(&mut self, other: &dyn Field) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => {
                self.value = other.value;
                self.enums.clone_from(&other.enums);
                self.set_default(other.is_default());
                true
            }
            None => false,
        }
    }

    field_boilerplate!();
}

/// List of bit mask values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MFBitMask {
    values: Vec<i32>,
    enums: EnumSet,
    state: FieldState,
}

impl MFBitMask {
    /// Empty field with the given bit names.
    pub fn with_enums(enums: EnumSet) -> Self {
        Self {
            values: Vec::new(),
            enums,
            state: FieldState::default(),
        }
    }

    enum_field_common!();

    /// All values.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Replace the values.
    pub fn set_values(&mut self, values: &[i32]) {
        self.values = values.to_vec();
        self.set_default(false);
    }
}

impl Field for MFBitMask {
    fn type_name(&self) -> String {
        "MFBitMask".to_string()
    }

    fn read_value(&mut self, input: &mut Input) -> Result<(), ReadError> {
        let enums = &mut self.enums;
        read_values(input, "MFBitMask", &mut self.values, |input| read_bitmask(input, enums, "MFBitMask"))
    }

    fn write_value(&self, out: &mut Output) {
        write_values(out, &self.values, VALUES_PER_LINE, |v, out| {
            write_bitmask(*v, &self.enums, out, "MFBitMask");
        });
    }

    fn is_same(&self, other: &dyn Field) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| o.values == self.values)
    }

    fn copy_from(&mut self, other: &dyn Field) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => {
                self.values.clone_from(&other.values);
                self.enums.clone_from(&other.enums);
                self.set_default(other.is_default());
                true
            }
            None => false,
        }
    }

    field_boilerplate!();
}
