//! A small XML document model.
//!
//! Documents are arenas of elements addressed by [`ElementId`]. Text lives in
//! child elements of type [`CDATA_TYPE`], so an element such as
//! `<size>42</size>` has one cdata child and reads back through the typed
//! accessors:
//!
//! ```
//! use coin_xml::{XmlDocument, XmlPath};
//!
//! let doc = XmlDocument::read_buffer("<config><size>42</size></config>").unwrap();
//! let path: XmlPath = "size".parse().unwrap();
//! let size = doc.find_element(&path).unwrap();
//! assert_eq!(doc.get_integer(size), Some(42));
//! ```

/// The element arena and tree operations.
pub mod document;
/// Parse and tree-edit errors.
pub mod error;
/// Parsing from text and files.
pub mod parser;
/// Element paths.
pub mod path;
/// Serialization.
pub mod writer;

pub use document::{
    Ancestors, CDATA_TYPE, Descendants, ElementId, FilterChoice, FilterStage, ParseFilter, XmlAttribute, XmlDocument,
};
pub use error::XmlError;
pub use path::{PathStep, XmlPath};
