//! Field containers: an instance of a container type with its field values.
//!
//! The field-list grammar lives here:
//!
//! - Text: a sequence of `name value` pairs closed by anything that is not a
//!   known field name. A leading `fields [ SFType name, ... ]` block declares
//!   extension fields of containers that are not built in.
//! - Binary: a control word `(flags << 8) | count`, the declarations when
//!   [`NOT_BUILTIN`] is set, then `count` named fields.

use std::sync::Arc;

use coin_common::ReadError;

use crate::factory::create_field;
use crate::field::{Field, FieldKind};
use crate::field_data::{FieldData, NOT_BUILTIN};
use crate::input::Input;
use crate::output::Output;

const COMPONENT: &str = "FieldData";

/// `ROUTE from.field TO to.field` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Source container name.
    pub from_container: String,
    /// Source field name.
    pub from_field: String,
    /// Destination container name.
    pub to_container: String,
    /// Destination field name.
    pub to_field: String,
}

/// An instance of a container type.
#[derive(Debug, Clone)]
pub struct FieldContainer {
    type_name: String,
    def_name: Option<String>,
    field_data: Arc<FieldData>,
    fields: Vec<Box<dyn Field>>,
    built_in: bool,
    is_group: bool,
    children: Vec<FieldContainer>,
    routes: Vec<Route>,
}

impl FieldContainer {
    /// Container built from a template and its default-valued fields.
    ///
    /// `fields` must hold one field per entry of `field_data`, in order.
    pub fn new(type_name: &str, field_data: Arc<FieldData>, fields: Vec<Box<dyn Field>>, is_group: bool) -> Self {
        debug_assert_eq!(field_data.num_fields(), fields.len());
        Self {
            type_name: type_name.to_string(),
            def_name: None,
            field_data,
            fields,
            built_in: true,
            is_group,
            children: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Container of a type the catalog does not know. Its fields come from
    /// the file's `fields [...]` block and it may hold children.
    pub fn unknown(type_name: &str) -> Self {
        Self {
            built_in: false,
            ..Self::new(type_name, Arc::new(FieldData::new()), Vec::new(), true)
        }
    }

    /// Type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// `DEF` name.
    pub fn def_name(&self) -> Option<&str> {
        self.def_name.as_deref()
    }

    /// Set or clear the `DEF` name.
    pub fn set_def_name(&mut self, name: Option<String>) {
        self.def_name = name;
    }

    /// Field template.
    pub fn field_data(&self) -> &Arc<FieldData> {
        &self.field_data
    }

    /// True if every field comes from the type's built-in template.
    pub const fn is_built_in(&self) -> bool {
        self.built_in
    }

    /// True if the container nests child containers.
    pub const fn is_group(&self) -> bool {
        self.is_group
    }

    /// Number of fields.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(name, field)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &dyn Field)> {
        self.field_data
            .iter()
            .zip(&self.fields)
            .map(|(entry, field)| (entry.name.as_str(), &**field))
    }

    /// The field called `name`.
    pub fn field(&self, name: &str) -> Option<&dyn Field> {
        let index = self.field_data.index_of(name)?;
        self.fields.get(index).map(|field| &**field)
    }

    /// Mutable access to the field called `name`.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut (dyn Field + 'static)> {
        let index = self.field_data.index_of(name)?;
        self.fields.get_mut(index).map(|field| &mut **field)
    }

    /// The field called `name` as its concrete type.
    pub fn field_as<F: Field + 'static>(&self, name: &str) -> Option<&F> {
        self.field(name)?.as_any().downcast_ref::<F>()
    }

    /// The field called `name` as its concrete type, mutably.
    pub fn field_mut_as<F: Field + 'static>(&mut self, name: &str) -> Option<&mut F> {
        self.field_mut(name)?.as_any_mut().downcast_mut::<F>()
    }

    /// Add an extension field. The template is copied first if it is shared.
    /// Returns the field's index; an existing name keeps its field.
    pub fn add_field(&mut self, name: &str, field: Box<dyn Field>) -> usize {
        if let Some(index) = self.field_data.index_of(name) {
            return index;
        }
        let type_name = field.type_name();
        let index = Arc::make_mut(&mut self.field_data).add_field(name, &type_name);
        self.fields.push(field);
        self.built_in = false;
        index
    }

    /// Parse `text` into the field called `name`.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), ReadError> {
        if let Some(field) = self.field_mut(name) {
            return field.set_from_str(text);
        }
        Err(ReadError::Invalid {
            line: 0,
            message: format!("Unknown field \"{name}\" in \"{}\"", self.type_name),
        })
    }

    /// Text form of the field called `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.field(name).map(|field| field.value_string())
    }

    /// True if both containers have the same type and equal field values.
    pub fn is_same(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| a.is_same(&**b))
    }

    /// Copy the values of every field `other` shares with this container.
    pub fn copy_field_values(&mut self, other: &Self) {
        for (name, field) in other.fields() {
            if let Some(own) = self.field_mut(name) {
                let _ = own.copy_from(field);
            }
        }
    }

    /// Child containers.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Mutable child containers.
    pub fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    /// Append a child.
    pub fn add_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Routes declared inside this container.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    // ========== Reading ==========

    /// Read the field list of this container.
    ///
    /// With `error_on_unknown` an unknown field name is an error. Without it
    /// the name is put back and the read stops, so a caller reading nested
    /// containers can take it as a child type name.
    pub fn read_fields(&mut self, input: &mut Input, error_on_unknown: bool) -> Result<(), ReadError> {
        if input.is_binary() {
            return self.read_binary_fields(input);
        }

        let mut first = true;
        loop {
            let mark = input.mark();
            let Some(name) = input.read_name(true) else {
                return Ok(());
            };

            if input.is_vrml2() {
                match name.as_str() {
                    "ROUTE" => {
                        let route = read_route(input)?;
                        self.routes.push(route);
                        continue;
                    }
                    "PROTO" | "EXTERNPROTO" => {
                        return Err(input.post_error(COMPONENT, format!("{name} definitions are not supported")));
                    }
                    _ => {}
                }
            }

            if let Some(index) = self.field_data.index_of(&name) {
                self.fields[index].read(input, &name)?;
            } else if first && name == "fields" {
                self.built_in = false;
                self.read_field_descriptions(input, 0)?;
            } else if first && name == "inputs" {
                return Err(input.post_error(COMPONENT, "\"inputs\" declarations are not supported"));
            } else if error_on_unknown {
                return Err(input.post_error(
                    COMPONENT,
                    format!("Unknown field \"{name}\" in \"{}\"", self.type_name),
                ));
            } else {
                input.rewind(mark);
                return Ok(());
            }
            first = false;
        }
    }

    fn read_binary_fields(&mut self, input: &mut Input) -> Result<(), ReadError> {
        let word = input.read_u32();
        let word = input.require(word, COMPONENT, "field control word")?;
        let count = (word & 0xff) as usize;
        let flags = word >> 8;

        if flags & NOT_BUILTIN != 0 {
            self.built_in = false;
            self.read_field_descriptions(input, count)?;
        }
        if flags & !NOT_BUILTIN != 0 {
            input.post_warning(COMPONENT, format!("Unknown flags in control word: 0x{flags:02x}"));
        }
        if count > self.fields.len() {
            input.post_warning(
                COMPONENT,
                format!(
                    "{count} fields announced but \"{}\" only has {}",
                    self.type_name,
                    self.fields.len()
                ),
            );
        }

        for i in 0..count {
            let Some(name) = input.read_name(true) else {
                return Err(input.post_error(COMPONENT, format!("Couldn't read the name of field number {i}")));
            };
            let Some(index) = self.field_data.index_of(&name) else {
                return Err(input.post_error(
                    COMPONENT,
                    format!("Unknown field \"{name}\" in \"{}\"", self.type_name),
                ));
            };
            self.fields[index].read(input, &name)?;
        }
        Ok(())
    }

    /// Read field declarations, adding every field not already present.
    ///
    /// Text streams read a bracketed list whose entries may carry a role
    /// keyword and, for `field` and `exposedField`, a value. Binary streams
    /// read `count` pairs of type name and field name.
    pub fn read_field_descriptions(&mut self, input: &mut Input, count: usize) -> Result<(), ReadError> {
        let binary = input.is_binary();
        if !binary {
            let c = input.expect_char(COMPONENT)?;
            if c != '[' {
                return Err(input.post_error(COMPONENT, format!("Expected '[', got '{c}'")));
            }
        }

        let mut read = 0;
        loop {
            if binary {
                if read == count {
                    return Ok(());
                }
            } else {
                let mark = input.mark();
                if input.expect_char(COMPONENT)? == ']' {
                    return Ok(());
                }
                input.rewind(mark);
            }
            read += 1;

            let Some(mut type_name) = input.read_name(true) else {
                return Err(input.post_error(COMPONENT, "Couldn't read field type"));
            };
            let mut kind = FieldKind::Field;
            let mut has_value = false;
            if !binary {
                if let Some(explicit) = FieldKind::from_keyword(&type_name) {
                    kind = explicit;
                    has_value = explicit.has_value();
                    let Some(actual) = input.read_name(true) else {
                        return Err(input.post_error(COMPONENT, "Couldn't read field type"));
                    };
                    type_name = actual;
                }
            }

            let Some(field) = create_field(&type_name) else {
                return Err(input.post_error(COMPONENT, format!("Unknown field type '{type_name}'")));
            };
            let Some(name) = input.read_name(true) else {
                return Err(input.post_error(COMPONENT, "Couldn't read field name"));
            };

            let index = self.add_field(&name, field);
            self.fields[index].state_mut().kind = kind;

            if !binary {
                if has_value {
                    if let Err(err) = self.fields[index].read(input, &name) {
                        log::debug!("Unable to read value for field '{name}'");
                        return Err(err);
                    }
                } else if let Some(interface) = input.check_is_reference() {
                    self.fields[index].state_mut().is_reference = Some(interface);
                }

                let mark = input.mark();
                if input.read_char() != Some(',') {
                    input.rewind(mark);
                }
            }
        }
    }

    // ========== Writing ==========

    /// Write the field list of this container.
    ///
    /// Binary streams describe only the fields whose values follow, so the
    /// control word counts both. Event-only declarations are text only.
    pub fn write_fields(&self, out: &mut Output) {
        let binary = out.is_binary();
        let write_all = binary && !self.built_in;
        let writable: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.state().kind.has_value() && (write_all || f.should_write()))
            .map(|(i, _)| i)
            .collect();

        if binary {
            let count = writable.len().min(0xff);
            if count < writable.len() {
                out.post_warning(COMPONENT, format!("only the first {count} fields of \"{}\" fit", self.type_name));
            }
            let written = &writable[..count];
            let flags = if self.built_in { 0 } else { NOT_BUILTIN };
            out.write_u32((flags << 8) | count as u32);
            if !self.built_in {
                for entry in written.iter().filter_map(|&index| self.field_data.field(index)) {
                    out.write_name(&entry.type_name);
                    out.write_name(&entry.name);
                }
            }
            for &index in written {
                if let Some(name) = self.field_data.field_name(index) {
                    self.fields[index].write(out, name);
                }
            }
            return;
        }

        if !self.built_in {
            self.write_field_descriptions(out);
        }
        for (index, (name, field)) in self.fields().enumerate() {
            if let Some(interface) = &field.state().is_reference {
                out.indent();
                out.write_raw(&format!("{name} IS {interface}\n"));
            } else if writable.contains(&index) && !self.is_described_with_value(index) {
                field.write(out, name);
            }
        }
    }

    // exposedField declarations carry their value inline.
    fn is_described_with_value(&self, index: usize) -> bool {
        !self.built_in && self.fields[index].state().kind == FieldKind::ExposedField
    }

    /// Write the `fields [ ... ]` declaration block of a text stream.
    ///
    /// Plain fields are written as `SFType name`. Other roles get their
    /// keyword in front, and `exposedField` entries their value after.
    fn write_field_descriptions(&self, out: &mut Output) {
        out.indent();
        out.write_raw("fields [ ");
        for (index, entry) in self.field_data.iter().enumerate() {
            if index > 0 {
                out.write_raw(", ");
            }
            let field = &self.fields[index];
            let kind = field.state().kind;
            if kind != FieldKind::Field {
                out.write_raw(kind.keyword());
                out.write_char(' ');
            }
            out.write_raw(&entry.type_name);
            out.write_char(' ');
            out.write_raw(&entry.name);
            if self.is_described_with_value(index) {
                out.write_char(' ');
                field.write_value(out);
            }
        }
        out.write_raw(" ]\n");
    }

    /// Write `ROUTE` statements. Text streams only.
    pub fn write_routes(&self, out: &mut Output) {
        for route in &self.routes {
            out.indent();
            out.write_raw(&format!(
                "ROUTE {}.{} TO {}.{}\n",
                route.from_container, route.from_field, route.to_container, route.to_field
            ));
        }
    }
}

fn read_field_reference(input: &mut Input) -> Result<(String, String), ReadError> {
    let container = input.read_name(false);
    let container = input.require(container, COMPONENT, "route container name")?;
    let c = input.expect_char(COMPONENT)?;
    if c != '.' {
        return Err(input.post_error(COMPONENT, format!("Expected '.', got '{c}'")));
    }
    let field = input.read_name(true);
    let field = input.require(field, COMPONENT, "route field name")?;
    Ok((container, field))
}

fn read_route(input: &mut Input) -> Result<Route, ReadError> {
    let (from_container, from_field) = read_field_reference(input)?;
    match input.read_name(true) {
        Some(keyword) if keyword == "TO" => {}
        other => {
            let got = other.unwrap_or_default();
            return Err(input.post_error(COMPONENT, format!("Expected \"TO\", got \"{got}\"")));
        }
    }
    let (to_container, to_field) = read_field_reference(input)?;
    Ok(Route {
        from_container,
        from_field,
        to_container,
        to_field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::single::{SFFloat, SFInt32};

    fn sample() -> FieldContainer {
        let mut data = FieldData::new();
        let _ = data.add_field("width", "SFFloat");
        let _ = data.add_field("count", "SFInt32");
        let fields: Vec<Box<dyn Field>> = vec![Box::new(SFFloat::with_default(1.0)), Box::new(SFInt32::new())];
        FieldContainer::new("Sample", Arc::new(data), fields, false)
    }

    #[test]
    fn test_read_known_fields_until_brace() {
        let mut container = sample();
        let mut input = Input::from_text("count 3 width 2.5 }");
        container.read_fields(&mut input, true).unwrap();
        assert_eq!(container.field_as::<SFInt32>("count").unwrap().value(), &3);
        assert_eq!(container.get("width").as_deref(), Some("2.5"));
        assert_eq!(input.read_char(), Some('}'));
    }

    #[test]
    fn test_unknown_field_in_leaf_is_error() {
        let mut container = sample();
        let mut input = Input::from_text("height 3 }");
        assert!(container.read_fields(&mut input, true).is_err());
        assert_eq!(
            input.diagnostics().last().unwrap().message,
            "Unknown field \"height\" in \"Sample\""
        );
    }

    #[test]
    fn test_unknown_name_in_group_is_put_back() {
        let mut group = FieldContainer::unknown("Thing");
        let mut input = Input::from_text("Child { }");
        group.read_fields(&mut input, false).unwrap();
        assert_eq!(input.read_name(true).as_deref(), Some("Child"));
    }

    #[test]
    fn test_field_descriptions_extend_a_copy_of_the_template() {
        let template = sample();
        let mut extended = template.clone();
        let mut input = Input::from_text("fields [ SFFloat width, MFString labels ] labels [ \"a\", \"b\" ] }");
        extended.read_fields(&mut input, true).unwrap();

        assert!(!extended.is_built_in());
        assert_eq!(extended.num_fields(), 3);
        assert_eq!(template.num_fields(), 2);
        assert_eq!(template.field_data().num_fields(), 2);
        assert_eq!(extended.get("labels").as_deref(), Some("[ \"a\", \"b\" ]"));
    }

    #[test]
    fn test_description_with_roles_and_values() {
        let mut container = FieldContainer::unknown("Proto");
        let mut input = Input::from_text("fields [ exposedField SFFloat size 2, eventIn SFBool trigger ] }");
        container.read_fields(&mut input, true).unwrap();
        assert_eq!(container.get("size").as_deref(), Some("2"));
        assert_eq!(container.field("trigger").unwrap().state().kind, FieldKind::EventIn);
    }

    #[test]
    fn test_unknown_field_type() {
        let mut container = FieldContainer::unknown("Proto");
        let mut input = Input::from_text("fields [ SFWidget w ] }");
        assert!(container.read_fields(&mut input, true).is_err());
        assert_eq!(input.diagnostics().last().unwrap().message, "Unknown field type 'SFWidget'");
    }

    #[test]
    fn test_text_write_skips_defaults() {
        let mut container = sample();
        container.set("count", "4").unwrap();
        let mut out = Output::text();
        container.write_fields(&mut out);
        assert_eq!(out.to_text(), "count 4\n");
    }

    #[test]
    fn test_binary_control_word() {
        let mut container = sample();
        container.set("width", "3").unwrap();
        let mut out = Output::binary();
        container.write_fields(&mut out);
        assert_eq!(&out.as_bytes()[..4], &[0, 0, 0, 1]);

        let mut extended = FieldContainer::unknown("Ext");
        let _ = extended.add_field("a", Box::new(SFFloat::new()));
        let mut out = Output::binary();
        extended.write_fields(&mut out);
        assert_eq!(&out.as_bytes()[..4], &[0, 0, 0x40, 1]);

        let mut copy = FieldContainer::unknown("Ext");
        copy.read_fields(&mut Input::from_binary(out.into_bytes()), true).unwrap();
        assert!(copy.is_same(&extended));
    }

    #[test]
    fn test_is_reference_written_back() {
        let mut container = sample();
        let mut input = Input::from_text("width IS outerWidth }");
        container.read_fields(&mut input, true).unwrap();
        let mut out = Output::text();
        container.write_fields(&mut out);
        assert_eq!(out.to_text(), "width IS outerWidth\n");
    }

    #[test]
    fn test_routes_in_vrml2() {
        let mut group = FieldContainer::unknown("Group");
        let mut input = Input::from_bytes(b"#VRML V2.0 utf8\nROUTE a.value_changed TO b.set_value }".to_vec());
        group.read_fields(&mut input, false).unwrap();
        assert_eq!(group.routes().len(), 1);
        assert_eq!(group.routes()[0].to_field, "set_value");
    }
}
