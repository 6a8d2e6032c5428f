//! Per-type field templates.
//!
//! A [`FieldData`] lists the field names and type names of one container
//! type, plus the enumeration tables its enum fields use. It is shared by
//! every instance of the type through an `Arc`; an instance that grows an
//! extension field gets its own copy via `Arc::make_mut`.

use crate::enums::EnumSet;

/// Control word flag: the container is not built in and its field
/// descriptions follow.
pub const NOT_BUILTIN: u32 = 0x40;

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    /// Field name.
    pub name: String,
    /// Type name, e.g. `"SFFloat"`.
    pub type_name: String,
}

/// Named enumeration table used by one or more enum fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    /// Enumeration type name, e.g. `"Style"`.
    pub type_name: String,
    /// Legal names and values.
    pub values: EnumSet,
}

/// Field template of a container type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldData {
    fields: Vec<FieldEntry>,
    enums: Vec<EnumEntry>,
}

impl FieldData {
    /// Empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field and return its index. Declaring an existing name
    /// returns the existing index.
    pub fn add_field(&mut self, name: &str, type_name: &str) -> usize {
        if let Some(index) = self.index_of(name) {
            return index;
        }
        self.fields.push(FieldEntry {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
        self.fields.len() - 1
    }

    /// Number of declared fields.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Index of the field called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Declared field at `index`.
    pub fn field(&self, index: usize) -> Option<&FieldEntry> {
        self.fields.get(index)
    }

    /// Name of the field at `index`.
    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|f| f.name.as_str())
    }

    /// Iterate over the declared fields in order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.iter()
    }

    /// Add one name to an enumeration table, creating the table if needed.
    pub fn add_enum_value(&mut self, enum_type: &str, name: &str, value: i32) {
        if let Some(entry) = self.enums.iter_mut().find(|e| e.type_name == enum_type) {
            entry.values.insert(name, value);
        } else {
            self.enums.push(EnumEntry {
                type_name: enum_type.to_string(),
                values: EnumSet::new([(name, value)]),
            });
        }
    }

    /// True if a field called `name` is declared.
    pub fn has_field(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// True if `enum_type` has a name mapped to `value`.
    pub fn has_enum_value(&self, enum_type: &str, value: i32) -> bool {
        self.enum_data(enum_type).is_some_and(|set| set.find_name(value).is_some())
    }

    /// The enumeration table called `enum_type`.
    pub fn enum_data(&self, enum_type: &str) -> Option<&EnumSet> {
        self.enums.iter().find(|e| e.type_name == enum_type).map(|e| &e.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_field_is_idempotent() {
        let mut data = FieldData::new();
        assert_eq!(data.add_field("width", "SFFloat"), 0);
        assert_eq!(data.add_field("height", "SFFloat"), 1);
        assert_eq!(data.add_field("width", "SFInt32"), 0);
        assert_eq!(data.num_fields(), 2);
        assert_eq!(data.field(0).unwrap().type_name, "SFFloat");
    }

    #[test]
    fn test_enum_tables() {
        let mut data = FieldData::new();
        data.add_enum_value("Style", "FILLED", 0);
        data.add_enum_value("Style", "LINES", 1);
        let style = data.enum_data("Style").unwrap();
        assert_eq!(style.find_value("LINES"), Some(1));
        assert!(style.has_legal_values());
        assert!(data.has_enum_value("Style", 0));
        assert!(!data.has_enum_value("Style", 5));
        assert!(data.enum_data("Missing").is_none());
    }
}
