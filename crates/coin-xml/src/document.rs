//! The element arena.
//!
//! Every element of a document lives in one vector and is addressed by its
//! [`ElementId`]. Character data is stored in child elements of type
//! [`CDATA_TYPE`]; an element whose only child is such a node is treated
//! as a leaf with text content by the typed accessors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::XmlError;
use crate::path::XmlPath;

/// Element type of character data nodes.
pub const CDATA_TYPE: &str = "cdata";

/// Index of an element in its [`XmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One `name="value"` pair. Attribute order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute name.
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

#[derive(Debug, Clone)]
struct XmlElement {
    element_type: String,
    attributes: Vec<XmlAttribute>,
    cdata: Option<String>,
    data: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl XmlElement {
    fn new(element_type: &str) -> Self {
        Self {
            element_type: element_type.to_string(),
            attributes: Vec::new(),
            cdata: None,
            data: None,
            parent: None,
            children: Vec::new(),
        }
    }

    fn is_cdata(&self) -> bool {
        self.element_type == CDATA_TYPE
    }
}

/// Whether the parse filter keeps an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChoice {
    /// Keep the element in the tree.
    Keep,
    /// Remove the element and its subtree.
    Discard,
}

/// When the parse filter is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    /// The element was just opened. The returned choice is ignored.
    Start,
    /// The element is complete.
    End,
}

/// Callback consulted for every element while parsing.
pub type ParseFilter = Box<dyn FnMut(&XmlDocument, ElementId, FilterStage) -> FilterChoice + Send>;

/// An XML document: the element arena plus document-level state.
#[derive(Default)]
pub struct XmlDocument {
    elements: Vec<Option<XmlElement>>,
    root: Option<ElementId>,
    current: Option<ElementId>,
    filename: Option<PathBuf>,
    pub(crate) filter: Option<ParseFilter>,
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("elements", &self.elements.iter().flatten().count())
            .field("root", &self.root)
            .field("filename", &self.filename)
            .field("filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

fn trimmed(text: &str) -> Option<String> {
    let data = text.trim_matches([' ', '\t', '\r', '\n']);
    (!data.is_empty()).then(|| data.to_string())
}

impl XmlDocument {
    /// Empty document without a root.
    pub fn new() -> Self {
        Self::default()
    }

    fn element(&self, id: ElementId) -> &XmlElement {
        match self.elements.get(id.0).and_then(Option::as_ref) {
            Some(element) => element,
            None => panic!("element {id} does not exist in this document"),
        }
    }

    fn element_mut(&mut self, id: ElementId) -> &mut XmlElement {
        match self.elements.get_mut(id.0).and_then(Option::as_mut) {
            Some(element) => element,
            None => panic!("element {id} does not exist in this document"),
        }
    }

    /// True if `id` names a live element.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.get(id.0).is_some_and(Option::is_some)
    }

    /// Number of live elements, detached ones included.
    pub fn len(&self) -> usize {
        self.elements.iter().flatten().count()
    }

    /// True if the document holds no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========== Document state ==========

    /// Root element.
    pub const fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Replace the root. The previous root stays in the arena.
    pub fn set_root(&mut self, root: Option<ElementId>) {
        self.root = root;
    }

    /// File the document was read from or last written to.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Set the document's file name.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    /// Application-defined cursor element.
    pub const fn current(&self) -> Option<ElementId> {
        self.current
    }

    /// Move the cursor.
    pub fn set_current(&mut self, element: Option<ElementId>) {
        self.current = element;
    }

    /// Install the callback consulted while parsing into this document.
    pub fn set_filter(
        &mut self,
        filter: impl FnMut(&Self, ElementId, FilterStage) -> FilterChoice + Send + 'static,
    ) {
        self.filter = Some(Box::new(filter));
    }

    /// Remove the parse callback.
    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    // ========== Creation ==========

    /// New detached element of `element_type`.
    pub fn new_element(&mut self, element_type: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Some(XmlElement::new(element_type)));
        id
    }

    /// New detached element with attributes.
    pub fn new_element_with_attributes(&mut self, element_type: &str, attributes: &[(&str, &str)]) -> ElementId {
        let id = self.new_element(element_type);
        for (name, value) in attributes {
            self.set_attribute(id, name, value);
        }
        id
    }

    /// Deep copy of `id` as a new detached subtree.
    pub fn clone_subtree(&mut self, id: ElementId) -> ElementId {
        let mut copy = self.element(id).clone();
        copy.parent = None;
        let children = std::mem::take(&mut copy.children);
        let new_id = ElementId(self.elements.len());
        self.elements.push(Some(copy));
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.element_mut(child_copy).parent = Some(new_id);
            self.element_mut(new_id).children.push(child_copy);
        }
        new_id
    }

    /// Detach `id` and free it with its subtree. Clears the root and the
    /// cursor if they pointed into it.
    pub fn remove(&mut self, id: ElementId) {
        if let Some(parent) = self.element(id).parent {
            self.element_mut(parent).children.retain(|&child| child != id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(element) = self.elements.get_mut(next.0).and_then(Option::take) {
                pending.extend(element.children);
            }
            if self.root == Some(next) {
                self.root = None;
            }
            if self.current == Some(next) {
                self.current = None;
            }
        }
    }

    // ========== Type and character data ==========

    /// Element type.
    pub fn element_type(&self, id: ElementId) -> &str {
        &self.element(id).element_type
    }

    /// Change the element type.
    pub fn set_type(&mut self, id: ElementId, element_type: &str) {
        element_type.clone_into(&mut self.element_mut(id).element_type);
    }

    /// True if `id` is a character data node.
    pub fn is_cdata(&self, id: ElementId) -> bool {
        self.element(id).is_cdata()
    }

    /// The node holding `id`'s text: `id` itself, or its only child when
    /// that child is character data.
    fn text_node(&self, id: ElementId) -> ElementId {
        let element = self.element(id);
        if !element.is_cdata() {
            if let [only] = element.children.as_slice() {
                if self.element(*only).is_cdata() {
                    return *only;
                }
            }
        }
        id
    }

    /// Set character data. A non-cdata element without children gets a new
    /// cdata child; one whose only child is cdata has that child updated.
    pub fn set_cdata(&mut self, id: ElementId, text: &str) {
        let target = if !self.element(id).is_cdata() && self.element(id).children.is_empty() {
            let child = self.new_element(CDATA_TYPE);
            self.attach(id, child, None);
            child
        } else {
            self.text_node(id)
        };
        let element = self.element_mut(target);
        element.cdata = Some(text.to_string());
        element.data = trimmed(text);
    }

    /// Raw character data.
    pub fn cdata(&self, id: ElementId) -> Option<&str> {
        self.element(self.text_node(id)).cdata.as_deref()
    }

    /// Character data with surrounding whitespace removed; `None` when
    /// nothing is left.
    pub fn data(&self, id: ElementId) -> Option<&str> {
        self.element(self.text_node(id)).data.as_deref()
    }

    /// Trim character data below `id` and drop cdata nodes that hold only
    /// whitespace.
    pub fn strip_whitespace(&mut self, id: ElementId) {
        if self.is_cdata(id) {
            let element = self.element_mut(id);
            element.cdata.clone_from(&element.data);
            return;
        }
        let children = self.element(id).children.clone();
        for child in children {
            if self.is_cdata(child) && self.element(child).data.is_none() {
                self.remove(child);
            } else {
                self.strip_whitespace(child);
            }
        }
    }

    // ========== Attributes ==========

    /// Set or replace an attribute.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        let attributes = &mut self.element_mut(id).attributes;
        match attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => value.clone_into(&mut attr.value),
            None => attributes.push(XmlAttribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Attribute value by name.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id)
            .attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self, id: ElementId) -> &[XmlAttribute] {
        &self.element(id).attributes
    }

    /// Number of attributes.
    pub fn num_attributes(&self, id: ElementId) -> usize {
        self.element(id).attributes.len()
    }

    /// Drop every attribute.
    pub fn remove_all_attributes(&mut self, id: ElementId) {
        self.element_mut(id).attributes.clear();
    }

    // ========== Structure ==========

    /// Parent element.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).parent
    }

    /// Children in document order.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.element(id).children
    }

    /// Number of children, cdata included.
    pub fn num_children(&self, id: ElementId) -> usize {
        self.element(id).children.len()
    }

    /// Number of children of `element_type`.
    pub fn num_children_of_type(&self, id: ElementId, element_type: &str) -> usize {
        self.children(id)
            .iter()
            .filter(|&&child| self.element_type(child) == element_type)
            .count()
    }

    /// Child at `index`.
    pub fn child(&self, id: ElementId, index: usize) -> Option<ElementId> {
        self.children(id).get(index).copied()
    }

    /// Position of `child` among `id`'s children.
    pub fn child_index(&self, id: ElementId, child: ElementId) -> Option<usize> {
        self.children(id).iter().position(|&c| c == child)
    }

    /// Position of `child` among the children of the same type.
    pub fn child_type_index(&self, id: ElementId, child: ElementId) -> Option<usize> {
        let element_type = self.element_type(child);
        self.children(id)
            .iter()
            .filter(|&&c| self.element_type(c) == element_type)
            .position(|&c| c == child)
    }

    /// The `index`-th child of `element_type`.
    pub fn child_of_type(&self, id: ElementId, element_type: &str, index: usize) -> Option<ElementId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element_type(c) == element_type)
            .nth(index)
    }

    /// The `index`-th child of `element_type`, appending empty children of
    /// that type until it exists.
    pub fn child_of_type_or_create(&mut self, id: ElementId, element_type: &str, index: usize) -> ElementId {
        if let Some(child) = self.child_of_type(id, element_type, index) {
            return child;
        }
        let existing = self.num_children_of_type(id, element_type);
        let mut created = None;
        for _ in existing..=index {
            let child = self.new_element(element_type);
            self.attach(id, child, None);
            created = Some(child);
        }
        match created {
            Some(child) => child,
            None => unreachable!("child_of_type found nothing but {existing} > {index}"),
        }
    }

    /// Path from the root down to `id`. The root itself is not a step.
    pub fn path(&self, id: ElementId) -> XmlPath {
        let mut path = XmlPath::new();
        let mut here = id;
        while let Some(parent) = self.parent(here) {
            path.prepend(self.element_type(here), self.child_type_index(parent, here));
            here = parent;
        }
        path
    }

    fn attach(&mut self, parent: ElementId, child: ElementId, index: Option<usize>) {
        let children = &mut self.element_mut(parent).children;
        match index {
            Some(index) => children.insert(index, child),
            None => children.push(child),
        }
        self.element_mut(child).parent = Some(parent);
    }

    /// Append `child` to `id`.
    pub fn add_child(&mut self, id: ElementId, child: ElementId) -> Result<(), XmlError> {
        if self.parent(child).is_some() {
            return Err(XmlError::AlreadyAttached(child));
        }
        self.attach(id, child, None);
        Ok(())
    }

    /// Insert `child` at `index` among `id`'s children.
    pub fn insert_child(&mut self, id: ElementId, child: ElementId, index: usize) -> Result<(), XmlError> {
        if self.parent(child).is_some() {
            return Err(XmlError::AlreadyAttached(child));
        }
        let len = self.num_children(id);
        if index > len {
            return Err(XmlError::IndexOutOfRange { index, len });
        }
        self.attach(id, child, Some(index));
        Ok(())
    }

    /// Detach `child` from `id` without freeing it.
    pub fn remove_child(&mut self, id: ElementId, child: ElementId) -> Result<(), XmlError> {
        let index = self
            .child_index(id, child)
            .ok_or(XmlError::NotAChild { parent: id, child })?;
        let _ = self.element_mut(id).children.remove(index);
        self.element_mut(child).parent = None;
        Ok(())
    }

    /// Put `new_child` where `old_child` was. `old_child` is detached.
    pub fn replace_child(&mut self, id: ElementId, old_child: ElementId, new_child: ElementId) -> Result<(), XmlError> {
        if self.parent(new_child).is_some() {
            return Err(XmlError::AlreadyAttached(new_child));
        }
        let index = self.child_index(id, old_child).ok_or(XmlError::NotAChild {
            parent: id,
            child: old_child,
        })?;
        self.remove_child(id, old_child)?;
        self.attach(id, new_child, Some(index));
        Ok(())
    }

    /// Iterate over the ancestors of `id`, parent first.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            current: self.parent(id),
        }
    }

    // ========== Typed values ==========

    fn parse_data<T: FromStr>(&self, id: ElementId) -> Option<T> {
        self.data(id).and_then(|data| data.parse().ok())
    }

    /// `true`/`on`/`t` or `false`/`off`/`f`, any case.
    pub fn get_boolean(&self, id: ElementId) -> Option<bool> {
        let data = self.data(id)?;
        if ["true", "on", "t"].iter().any(|word| data.eq_ignore_ascii_case(word)) {
            Some(true)
        } else if ["false", "off", "f"].iter().any(|word| data.eq_ignore_ascii_case(word)) {
            Some(false)
        } else {
            None
        }
    }

    /// Character data as an `i32`.
    pub fn get_integer(&self, id: ElementId) -> Option<i32> {
        self.parse_data(id)
    }

    /// Character data as an `i32`.
    pub fn get_int32(&self, id: ElementId) -> Option<i32> {
        self.parse_data(id)
    }

    /// Character data as a `u32`.
    pub fn get_uint32(&self, id: ElementId) -> Option<u32> {
        self.parse_data(id)
    }

    /// Character data as an `i64`.
    pub fn get_int64(&self, id: ElementId) -> Option<i64> {
        self.parse_data(id)
    }

    /// Character data as a `u64`.
    pub fn get_uint64(&self, id: ElementId) -> Option<u64> {
        self.parse_data(id)
    }

    /// Character data as an `f32`.
    pub fn get_float(&self, id: ElementId) -> Option<f32> {
        self.parse_data(id)
    }

    /// Character data as an `f64`.
    pub fn get_double(&self, id: ElementId) -> Option<f64> {
        self.parse_data(id)
    }

    /// Store `true` or `false`.
    pub fn set_boolean(&mut self, id: ElementId, value: bool) {
        self.set_cdata(id, if value { "true" } else { "false" });
    }

    /// Store an `i32`.
    pub fn set_integer(&mut self, id: ElementId, value: i32) {
        self.set_cdata(id, &value.to_string());
    }

    /// Store an `i32`.
    pub fn set_int32(&mut self, id: ElementId, value: i32) {
        self.set_cdata(id, &value.to_string());
    }

    /// Store a `u32`.
    pub fn set_uint32(&mut self, id: ElementId, value: u32) {
        self.set_cdata(id, &value.to_string());
    }

    /// Store an `i64`.
    pub fn set_int64(&mut self, id: ElementId, value: i64) {
        self.set_cdata(id, &value.to_string());
    }

    /// Store a `u64`.
    pub fn set_uint64(&mut self, id: ElementId, value: u64) {
        self.set_cdata(id, &value.to_string());
    }

    /// Store an `f32`.
    pub fn set_float(&mut self, id: ElementId, value: f32) {
        self.set_cdata(id, &value.to_string());
    }

    /// Store an `f64`.
    pub fn set_double(&mut self, id: ElementId, value: f64) {
        self.set_cdata(id, &value.to_string());
    }

    // ========== Traversal and paths ==========

    /// Next element after `here` in a depth-first walk of `root`'s subtree,
    /// skipping cdata nodes.
    pub fn traversal_next(&self, root: ElementId, here: ElementId) -> Option<ElementId> {
        if let Some(&child) = self.children(here).iter().find(|&&c| !self.is_cdata(c)) {
            return Some(child);
        }
        let mut here = here;
        loop {
            if here == root {
                return None;
            }
            let parent = self.parent(here)?;
            let siblings = self.children(parent);
            let index = self.child_index(parent, here)?;
            if let Some(&next) = siblings[index + 1..].iter().find(|&&c| !self.is_cdata(c)) {
                return Some(next);
            }
            here = parent;
        }
    }

    /// Depth-first iterator over `root` and its non-cdata descendants.
    pub fn descendants(&self, root: ElementId) -> Descendants<'_> {
        Descendants {
            document: self,
            root,
            next: Some(root),
        }
    }

    /// True if `id` and its ancestors match `path`, last step first.
    pub fn matches_path(&self, id: ElementId, path: &XmlPath) -> bool {
        let mut here = Some(id);
        for step in path.steps().iter().rev() {
            let Some(element) = here else {
                return false;
            };
            if self.element_type(element) != step.element_type {
                return false;
            }
            if let Some(wanted) = step.index {
                let index = self
                    .parent(element)
                    .map_or(Some(0), |parent| self.child_type_index(parent, element));
                if index != Some(wanted) {
                    return false;
                }
            }
            here = self.parent(element);
        }
        true
    }

    /// First element in `root`'s subtree, `root` included, matching `path`.
    pub fn find(&self, root: ElementId, path: &XmlPath) -> Option<ElementId> {
        self.descendants(root).find(|&id| self.matches_path(id, path))
    }

    /// Next element after `from` in `root`'s subtree matching `path`.
    pub fn find_next(&self, root: ElementId, from: ElementId, path: &XmlPath) -> Option<ElementId> {
        let mut here = from;
        loop {
            here = self.traversal_next(root, here)?;
            if self.matches_path(here, path) {
                return Some(here);
            }
        }
    }

    /// Follow `path` down from `from`, creating missing elements. A step
    /// without an index enters the first child of its type.
    pub fn create(&mut self, from: ElementId, path: &XmlPath) -> ElementId {
        let mut current = from;
        for step in path.steps() {
            current = self.child_of_type_or_create(current, &step.element_type, step.index.unwrap_or(0));
        }
        current
    }

    /// [`find`](Self::find) from the root.
    pub fn find_element(&self, path: &XmlPath) -> Option<ElementId> {
        self.root.and_then(|root| self.find(root, path))
    }

    /// [`create`](Self::create) from the root, creating a root of the first
    /// step's type when the document has none.
    pub fn create_element(&mut self, path: &XmlPath) -> Option<ElementId> {
        match self.root {
            Some(root) => Some(self.create(root, path)),
            None => {
                let (first, rest) = path.steps().split_first()?;
                let root = self.new_element(&first.element_type);
                self.root = Some(root);
                let mut rest_path = XmlPath::new();
                for step in rest {
                    rest_path.push(&step.element_type, step.index);
                }
                Some(self.create(root, &rest_path))
            }
        }
    }
}

/// Iterator over the ancestors of an element.
pub struct Ancestors<'a> {
    document: &'a XmlDocument,
    current: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.document.parent(id);
        Some(id)
    }
}

/// Depth-first iterator over a subtree, cdata skipped.
pub struct Descendants<'a> {
    document: &'a XmlDocument,
    root: ElementId,
    next: Option<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.document.traversal_next(self.root, id);
        Some(id)
    }
}
