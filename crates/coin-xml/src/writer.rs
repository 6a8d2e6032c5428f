//! Serializing documents.

use std::fmt::Write as _;
use std::path::Path;

use quick_xml::escape::escape;

use crate::document::{ElementId, XmlDocument};
use crate::error::XmlError;

const HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const INDENT: usize = 2;

impl XmlDocument {
    /// Serialize the document. An element with only a text child is written
    /// on one line; children are indented two spaces per level.
    pub fn write_to_buffer(&self) -> String {
        let mut out = String::from(HEADER);
        if let Some(root) = self.root() {
            self.write_element(&mut out, root, 0);
        }
        out
    }

    /// Serialize into `path` and remember it as the document's file name.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), XmlError> {
        let path = path.as_ref();
        std::fs::write(path, self.write_to_buffer()).map_err(|source| XmlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.set_filename(path);
        Ok(())
    }

    fn write_element(&self, out: &mut String, id: ElementId, depth: usize) {
        let pad = " ".repeat(depth * INDENT);
        if self.is_cdata(id) {
            let _ = writeln!(out, "{pad}{}", escape(self.cdata(id).unwrap_or_default()));
            return;
        }

        let name = self.element_type(id);
        let _ = write!(out, "{pad}<{name}");
        for attr in self.attributes(id) {
            let _ = write!(out, " {}=\"{}\"", attr.name, escape(attr.value.as_str()));
        }

        match self.children(id) {
            [] => out.push_str("/>\n"),
            [only] if self.is_cdata(*only) => {
                let text = self.cdata(*only).unwrap_or_default();
                let _ = writeln!(out, ">{}</{name}>", escape(text));
            }
            children => {
                out.push_str(">\n");
                for &child in children {
                    self.write_element(out, child, depth + 1);
                }
                let _ = writeln!(out, "{pad}</{name}>");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let mut doc = XmlDocument::new();
        let root = doc.new_element_with_attributes("scene", &[("version", "2")]);
        doc.set_root(Some(root));
        let empty = doc.new_element("empty");
        doc.add_child(root, empty).unwrap();
        let name = doc.new_element("name");
        doc.set_cdata(name, "a < b");
        doc.add_child(root, name).unwrap();

        assert_eq!(
            doc.write_to_buffer(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <scene version=\"2\">\n  <empty/>\n  <name>a &lt; b</name>\n</scene>\n"
        );
    }

    #[test]
    fn test_empty_document_has_header_only() {
        assert_eq!(XmlDocument::new().write_to_buffer(), HEADER);
    }
}
