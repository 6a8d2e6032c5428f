//! The [`Field`] trait and the bookkeeping every field carries.
//!
//! A field is a typed value plus flags. Reading and writing the value is
//! type specific; everything around it (the ignore marker `~`, connections
//! introduced by `=`, `IS` references, the binary flag word) is shared and
//! lives in the provided methods of [`Field`].

use std::any::Any;
use std::fmt;

use bitflags::bitflags;
use coin_common::ReadError;

use crate::input::Input;
use crate::output::Output;

const COMPONENT: &str = "Field";

bitflags! {
    /// Per-field flags, also the layout of the binary flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u32 {
        /// The value should be ignored by consumers.
        const IGNORED = 0x01;
        /// The field is connected to another field.
        const CONNECTED = 0x02;
        /// The value equals the default.
        const DEFAULT = 0x04;
    }
}

/// Interface role of a field declared in a `fields [...]` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Ordinary field.
    #[default]
    Field,
    /// Input-only event; never has a value in the file.
    EventIn,
    /// Output-only event; never has a value in the file.
    EventOut,
    /// Field that is also an event source and sink.
    ExposedField,
}

impl FieldKind {
    /// Keyword prefix recognized in field descriptions.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "field" => Some(Self::Field),
            "eventIn" => Some(Self::EventIn),
            "eventOut" => Some(Self::EventOut),
            "exposedField" => Some(Self::ExposedField),
            _ => None,
        }
    }

    /// Keyword written in front of the type name in field descriptions.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::EventIn => "eventIn",
            Self::EventOut => "eventOut",
            Self::ExposedField => "exposedField",
        }
    }

    /// True if fields of this kind carry a value in the file.
    pub const fn has_value(self) -> bool {
        matches!(self, Self::Field | Self::ExposedField)
    }
}

/// `= container.field` connection recorded while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConnection {
    /// Name of the container holding the master field.
    pub container: String,
    /// Name of the master field.
    pub field: String,
}

impl fmt::Display for FieldConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.container, self.field)
    }
}

/// Bookkeeping shared by every field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    /// Flag set.
    pub flags: FieldFlags,
    /// Connection to a master field, if any.
    pub connection: Option<FieldConnection>,
    /// Interface name this field is bound to with `IS`.
    pub is_reference: Option<String>,
    /// Interface role.
    pub kind: FieldKind,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            flags: FieldFlags::DEFAULT,
            connection: None,
            is_reference: None,
            kind: FieldKind::Field,
        }
    }
}

/// A typed, serializable value with flags.
///
/// The trait is object safe: containers store `Box<dyn Field>` and reach the
/// concrete type through [`Field::as_any`].
pub trait Field: fmt::Debug + Send + Sync {
    /// File format type name, e.g. `"SFFloat"` or `"MFVec3f"`.
    fn type_name(&self) -> String;

    /// Flags and connection state.
    fn state(&self) -> &FieldState;

    /// Mutable flags and connection state.
    fn state_mut(&mut self) -> &mut FieldState;

    /// Read the value only. Posts exactly one diagnostic on failure.
    fn read_value(&mut self, input: &mut Input) -> Result<(), ReadError>;

    /// Write the value only.
    fn write_value(&self, out: &mut Output);

    /// True if `other` has the same type and an equal value.
    fn is_same(&self, other: &dyn Field) -> bool;

    /// Copy the value from a field of the same type. Returns false if the
    /// types differ.
    fn copy_from(&mut self, other: &dyn Field) -> bool;

    /// Clone into a new box.
    fn box_clone(&self) -> Box<dyn Field>;

    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcasting support.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// True if the value equals the default.
    fn is_default(&self) -> bool {
        self.state().flags.contains(FieldFlags::DEFAULT)
    }

    /// Set or clear the default flag.
    fn set_default(&mut self, default: bool) {
        self.state_mut().flags.set(FieldFlags::DEFAULT, default);
    }

    /// True if the value should be ignored.
    fn is_ignored(&self) -> bool {
        self.state().flags.contains(FieldFlags::IGNORED)
    }

    /// Set or clear the ignore flag.
    fn set_ignored(&mut self, ignored: bool) {
        self.state_mut().flags.set(FieldFlags::IGNORED, ignored);
    }

    /// True if the field has a connection.
    fn is_connected(&self) -> bool {
        self.state().connection.is_some()
    }

    /// Connect to `container.field`, or disconnect with `None`.
    fn set_connection(&mut self, connection: Option<FieldConnection>) {
        let state = self.state_mut();
        state.flags.set(FieldFlags::CONNECTED, connection.is_some());
        state.connection = connection;
    }

    /// True if a writer has something to say about this field.
    fn should_write(&self) -> bool {
        !self.is_default() || self.is_ignored() || self.is_connected()
    }

    /// Read the field body that follows its name.
    ///
    /// Text streams accept `IS name`, an optional value, an optional `~` and
    /// an optional `= container.field` connection. Binary streams store the
    /// value, a flag word, then the connection when flagged.
    fn read(&mut self, input: &mut Input, name: &str) -> Result<(), ReadError> {
        if let Some(interface) = input.check_is_reference() {
            self.state_mut().is_reference = Some(interface);
            return Ok(());
        }

        self.set_default(false);

        if input.is_binary() {
            self.read_value(input)?;
            let word = input.read_u32();
            let word = input.require(word, COMPONENT, "field flags")?;
            let flags = FieldFlags::from_bits_truncate(word);
            if word & !FieldFlags::all().bits() != 0 {
                input.post_warning(COMPONENT, format!("Unknown field flags 0x{word:02x} for \"{name}\""));
            }
            self.set_ignored(flags.contains(FieldFlags::IGNORED));
            if flags.contains(FieldFlags::CONNECTED) {
                self.read_connection(input)?;
            }
            if flags.contains(FieldFlags::DEFAULT) {
                self.set_default(true);
            }
            return Ok(());
        }

        let mark = input.mark();
        match input.expect_char(COMPONENT)? {
            '~' => self.set_ignored(true),
            '=' => return self.read_connection(input),
            _ => {
                input.rewind(mark);
                if let Err(err) = self.read_value(input) {
                    log::debug!("Couldn't read value for field \"{name}\"");
                    return Err(err);
                }
                let mark = input.mark();
                if input.read_char() == Some('~') {
                    self.set_ignored(true);
                } else {
                    input.rewind(mark);
                }
            }
        }

        let mark = input.mark();
        if input.read_char() == Some('=') {
            self.read_connection(input)?;
        } else {
            input.rewind(mark);
        }
        Ok(())
    }

    /// Read `container.field` after the `=` marker.
    fn read_connection(&mut self, input: &mut Input) -> Result<(), ReadError> {
        let container = input.read_name(false);
        let mut container = input.require(container, COMPONENT, "name of connected container")?;
        if container == "USE" && !input.is_binary() {
            let referenced = input.read_name(false);
            container = input.require(referenced, COMPONENT, "name of connected container")?;
        }

        if !input.is_binary() {
            let c = input.expect_char(COMPONENT)?;
            if c != '.' {
                return Err(input.post_error(
                    COMPONENT,
                    format!("expected field connection token '.', but got '{c}'"),
                ));
            }
        }

        let field = input.read_name(true);
        let field = input.require(field, COMPONENT, "name of master field")?;
        self.set_connection(Some(FieldConnection { container, field }));
        Ok(())
    }

    /// Write the connection suffix.
    fn write_connection(&self, out: &mut Output) {
        let Some(connection) = &self.state().connection else {
            return;
        };
        if out.is_binary() {
            out.write_name(&connection.container);
            out.write_name(&connection.field);
        } else {
            out.write_raw(&format!(" = USE {connection}"));
        }
    }

    /// Write the field as `name value` with its markers.
    fn write(&self, out: &mut Output, name: &str) {
        if out.is_binary() {
            out.write_name(name);
            self.write_value(out);
            out.write_u32(self.state().flags.bits());
            self.write_connection(out);
            return;
        }

        out.indent();
        out.write_raw(name);
        if !self.is_default() {
            out.write_char(' ');
            self.write_value(out);
        }
        if self.is_ignored() {
            out.write_raw(" ~");
        }
        self.write_connection(out);
        out.write_char('\n');
    }

    /// Parse a text value into this field.
    fn set_from_str(&mut self, text: &str) -> Result<(), ReadError> {
        let mut input = Input::from_text(text);
        self.read_value(&mut input)?;
        self.set_default(false);
        Ok(())
    }

    /// Text form of the value.
    fn value_string(&self) -> String {
        let mut out = Output::text();
        self.write_value(&mut out);
        out.to_text()
    }
}

impl Clone for Box<dyn Field> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
