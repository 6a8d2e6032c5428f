//! Typed scene fields and the containers that hold them.
//!
//! A field is one named, typed value slot of a container: a single value
//! (`SF*`) or an ordered list (`MF*`). Fields carry an ignore flag, a default
//! flag and an optional connection to another field, and they read and
//! write themselves in the text and binary scene formats.
//!
//! # Layers
//!
//! - [`Input`] / [`Output`] - tokenized scene streams with posted diagnostics
//! - [`FieldValue`] - per-value-type codecs (`bool`, `f32`, [`Color`], ...)
//! - [`Field`] - the object-safe field interface, implemented by
//!   [`SField`], [`MField`] and the enum and bit mask fields
//! - [`FieldData`] / [`FieldContainer`] - per-type templates and instances
//! - [`FieldCatalog`] - container types by name
//! - [`read_scene`] / [`write_scene`] - whole scene files
//!
//! # Example
//!
//! ```
//! use coin_fields::{FieldCatalog, Input, read_scene};
//!
//! let catalog = FieldCatalog::with_builtins();
//! let mut input = Input::from_text("Separator { DrawStyle { style LINES } }");
//! let roots = read_scene(&mut input, &catalog).unwrap();
//! assert_eq!(roots[0].children()[0].get("style").as_deref(), Some("LINES"));
//! ```

/// Container type templates and the catalog that names them.
pub mod catalog;
/// Container instances and their field-list grammar.
pub mod container;
/// Enumeration and bit mask fields.
pub mod enums;
/// Field construction by type name.
pub mod factory;
/// The object-safe [`Field`] trait and per-field state.
pub mod field;
/// Per-type field templates.
pub mod field_data;
/// Image values.
pub mod image;
/// Scene stream reader.
pub mod input;
/// Multiple-value fields.
pub mod multi;
/// Scene stream writer.
pub mod output;
/// Whole scene files.
pub mod scene;
/// Single-value fields.
pub mod single;
/// Value codecs.
pub mod value;

pub use catalog::{ContainerType, ContainerTypeBuilder, FieldCatalog};
pub use container::{FieldContainer, Route};
pub use enums::{EnumSet, MFBitMask, MFEnum, SFBitMask, SFEnum};
pub use factory::{FIELD_TYPE_NAMES, create_field};
pub use field::{Field, FieldConnection, FieldFlags, FieldKind, FieldState};
pub use field_data::{EnumEntry, FieldData, FieldEntry};
pub use image::Image;
pub use input::{Input, Mark, ReadOptions};
pub use multi::{
    MFBool, MFColor, MFDouble, MFFloat, MFInt32, MFMatrix, MFName, MFPlane, MFRotation, MFShort, MFString, MFTime,
    MFUInt32, MFUShort, MFVec2f, MFVec3d, MFVec3f, MFVec4f, MField,
};
pub use output::Output;
pub use scene::{read_container, read_scene, write_scene};
pub use single::{
    SFBool, SFColor, SFDouble, SFFloat, SFImage, SFInt32, SFMatrix, SFName, SFPlane, SFRotation, SFShort, SFString,
    SFTime, SFUInt32, SFUShort, SFVec2f, SFVec3d, SFVec3f, SFVec4f, SField,
};
pub use value::{Color, FieldValue, Name, Plane, Rotation, Time};
