//! Building documents from XML text.
//!
//! Parsing is event driven: each start tag opens an element under the
//! innermost open one, text between tags is gathered into a single cdata
//! child, and an end tag closes the element after the document's filter
//! has had its say.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{CDATA_TYPE, ElementId, FilterChoice, FilterStage, XmlDocument};
use crate::error::XmlError;

fn line_at(text: &str, position: u64) -> usize {
    let end = usize::try_from(position).map_or(text.len(), |p| p.min(text.len()));
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

struct TreeBuilder<'d> {
    document: &'d mut XmlDocument,
    open: Vec<ElementId>,
    text: String,
    seen_root: bool,
}

impl TreeBuilder<'_> {
    fn flush_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        let Some(&parent) = self.open.last() else {
            return;
        };
        if text.trim_matches([' ', '\t', '\r', '\n']).is_empty() {
            return;
        }
        let node = self.document.new_element(CDATA_TYPE);
        self.document.set_cdata(node, &text);
        if let Err(err) = self.document.add_child(parent, node) {
            log::error!("dropping character data: {err}");
        }
    }

    fn open(&mut self, start: &BytesStart<'_>, line: usize) -> Result<ElementId, XmlError> {
        self.flush_text();
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let id = self.document.new_element(&name);
        for attr in start.attributes() {
            let attr = attr.map_err(|err| XmlError::Syntax {
                line,
                source: err.into(),
            })?;
            let value = attr
                .unescape_value()
                .map_err(|source| XmlError::Syntax { line, source })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            self.document.set_attribute(id, &key, &value);
        }

        match self.open.last() {
            Some(&parent) => {
                if let Err(err) = self.document.add_child(parent, id) {
                    log::error!("cannot attach <{name}>: {err}");
                }
            }
            None if self.seen_root => return Err(XmlError::MultipleRoots { line }),
            None => {
                self.seen_root = true;
                self.document.set_root(Some(id));
            }
        }
        self.open.push(id);
        let _ = self.run_filter(id, FilterStage::Start);
        Ok(id)
    }

    fn close(&mut self, name: &str, line: usize) -> Result<(), XmlError> {
        self.flush_text();
        let Some(id) = self.open.pop() else {
            return Err(XmlError::UnexpectedEnd {
                line,
                name: name.to_string(),
            });
        };
        let expected = self.document.element_type(id);
        if expected != name {
            return Err(XmlError::MismatchedEnd {
                line,
                expected: expected.to_string(),
                found: name.to_string(),
            });
        }
        if self.run_filter(id, FilterStage::End) == FilterChoice::Discard {
            log::debug!("filter discarded <{name}> at line {line}");
            self.document.remove(id);
        }
        Ok(())
    }

    fn run_filter(&mut self, id: ElementId, stage: FilterStage) -> FilterChoice {
        let Some(mut filter) = self.document.filter.take() else {
            return FilterChoice::Keep;
        };
        let choice = filter(self.document, id, stage);
        self.document.filter = Some(filter);
        choice
    }
}

impl XmlDocument {
    /// Parse `text` into a new document. No filter is applied.
    pub fn read_buffer(text: &str) -> Result<Self, XmlError> {
        let mut document = Self::new();
        document.parse_buffer(text)?;
        Ok(document)
    }

    /// Read and parse a file into a new document.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, XmlError> {
        let mut document = Self::new();
        document.parse_file(path)?;
        Ok(document)
    }

    /// Parse `text` into this document, replacing the root. The installed
    /// filter, if any, sees every element.
    pub fn parse_buffer(&mut self, text: &str) -> Result<(), XmlError> {
        self.set_root(None);
        let mut reader = Reader::from_str(text);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.trim_text(false);

        let mut builder = TreeBuilder {
            document: self,
            open: Vec::new(),
            text: String::new(),
            seen_root: false,
        };

        loop {
            let event = reader.read_event().map_err(|source| XmlError::Syntax {
                line: line_at(text, reader.error_position()),
                source,
            })?;
            let line = line_at(text, reader.buffer_position());
            match event {
                Event::Start(start) => {
                    let _ = builder.open(&start, line)?;
                }
                Event::Empty(start) => {
                    let id = builder.open(&start, line)?;
                    let name = builder.document.element_type(id).to_string();
                    builder.close(&name, line)?;
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    builder.close(&name, line)?;
                }
                Event::Text(content) => {
                    let content = content
                        .unescape()
                        .map_err(|source| XmlError::Syntax { line, source })?;
                    builder.text.push_str(&content);
                }
                Event::CData(content) => {
                    builder.text.push_str(&String::from_utf8_lossy(&content));
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if let Some(&unclosed) = builder.open.last() {
            return Err(XmlError::Unclosed(builder.document.element_type(unclosed).to_string()));
        }
        if !builder.seen_root {
            return Err(XmlError::NoElement);
        }
        log::trace!("parsed {} elements", self.len());
        Ok(())
    }

    /// Read `path` and parse it into this document. The file name is
    /// remembered.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<(), XmlError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| XmlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_buffer(&text)?;
        self.set_filename(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_at() {
        let text = "a\nb\nc";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 2), 2);
        assert_eq!(line_at(text, 99), 3);
    }

    #[test]
    fn test_adjacent_text_merges() {
        let doc = XmlDocument::read_buffer("<a>x &amp; <![CDATA[<y>]]> z</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.num_children(root), 1);
        assert_eq!(doc.cdata(root), Some("x & <y> z"));
    }
}
