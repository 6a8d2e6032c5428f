use std::path::PathBuf;

use thiserror::Error;

use crate::document::ElementId;

/// Failure of a parse, a file operation or a tree edit.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The tokenizer rejected the input.
    #[error("XML parse error, line {line}: {source}")]
    Syntax {
        /// 1-based line of the error.
        line: usize,
        /// Tokenizer error.
        #[source]
        source: quick_xml::Error,
    },

    /// A closing tag does not match the open element.
    #[error("XML parse error, line {line}: closing tag </{found}> does not match <{expected}>")]
    MismatchedEnd {
        /// 1-based line of the closing tag.
        line: usize,
        /// Type of the open element.
        expected: String,
        /// Type named by the closing tag.
        found: String,
    },

    /// A closing tag with no open element.
    #[error("XML parse error, line {line}: closing tag </{name}> without an open element")]
    UnexpectedEnd {
        /// 1-based line of the closing tag.
        line: usize,
        /// Type named by the closing tag.
        name: String,
    },

    /// The input ended inside an element.
    #[error("XML parse error: element <{0}> is not closed")]
    Unclosed(String),

    /// A second top-level element.
    #[error("XML parse error, line {line}: more than one root element")]
    MultipleRoots {
        /// 1-based line of the second root.
        line: usize,
    },

    /// The input holds no element at all.
    #[error("XML parse error: no element found")]
    NoElement,

    /// A malformed path string.
    #[error("invalid XML path \"{0}\"")]
    InvalidPath(String),

    /// The element is already attached somewhere.
    #[error("element {0} already has a parent")]
    AlreadyAttached(ElementId),

    /// The element is not a child of the given parent.
    #[error("element {child} is not a child of {parent}")]
    NotAChild {
        /// Expected parent.
        parent: ElementId,
        /// Element looked for.
        child: ElementId,
    },

    /// An insertion index past the end of the child list.
    #[error("child index {index} out of range for {len} children")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of children.
        len: usize,
    },

    /// Reading or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
