//! Tests for the XML document: parsing, writing, paths, filters and tree edits.

use std::sync::{Arc, Mutex};

use coin_xml::{CDATA_TYPE, FilterChoice, FilterStage, XmlDocument, XmlError, XmlPath};

const SCENE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<scene name="demo">
  <node type="Separator">
    <node type="Cube">
      <width>2.5</width>
    </node>
  </node>
  <node type="Sphere">
    <radius>1</radius>
    <visible>on</visible>
  </node>
</scene>
"#;

fn path(text: &str) -> XmlPath {
    text.parse().unwrap()
}

// ========== Parsing ==========

#[test]
fn test_parse_structure() {
    let doc = XmlDocument::read_buffer(SCENE).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(doc.element_type(root), "scene");
    assert_eq!(doc.attribute(root, "name"), Some("demo"));
    assert_eq!(doc.num_children(root), 2);
    assert_eq!(doc.num_children_of_type(root, "node"), 2);

    let sphere = doc.child_of_type(root, "node", 1).unwrap();
    assert_eq!(doc.attribute(sphere, "type"), Some("Sphere"));
    let radius = doc.child_of_type(sphere, "radius", 0).unwrap();
    assert_eq!(doc.get_float(radius), Some(1.0));
}

#[test]
fn test_whitespace_only_text_is_dropped() {
    let doc = XmlDocument::read_buffer("<a>\n  <b/>\n  \t</a>").unwrap();
    let root = doc.root().unwrap();
    assert_eq!(doc.num_children(root), 1);
    assert!(!doc.is_cdata(doc.children(root)[0]));
}

#[test]
fn test_text_keeps_raw_cdata() {
    let doc = XmlDocument::read_buffer("<a>  12  </a>").unwrap();
    let root = doc.root().unwrap();
    assert_eq!(doc.cdata(root), Some("  12  "));
    assert_eq!(doc.data(root), Some("12"));
    assert_eq!(doc.element_type(doc.children(root)[0]), CDATA_TYPE);
}

#[test]
fn test_attribute_entities_unescaped() {
    let doc = XmlDocument::read_buffer(r#"<a title="x &amp; &quot;y&quot;"/>"#).unwrap();
    assert_eq!(doc.attribute(doc.root().unwrap(), "title"), Some("x & \"y\""));
}

#[test_log::test]
fn test_parse_errors() {
    assert!(matches!(
        XmlDocument::read_buffer("<a>\n<b></c>\n</a>"),
        Err(XmlError::MismatchedEnd { line: 2, .. })
    ));
    assert!(matches!(
        XmlDocument::read_buffer("<a/><b/>"),
        Err(XmlError::MultipleRoots { .. })
    ));
    assert!(matches!(XmlDocument::read_buffer("<a><b>"), Err(XmlError::Unclosed(name)) if name == "b"));
    assert!(matches!(XmlDocument::read_buffer("<!-- nothing -->"), Err(XmlError::NoElement)));
    assert!(matches!(
        XmlDocument::read_buffer("</a>"),
        Err(XmlError::UnexpectedEnd { .. })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = XmlDocument::read_file("/nonexistent/scene.xml").unwrap_err();
    assert!(matches!(err, XmlError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/scene.xml"));
}

// ========== Filters ==========

#[test_log::test]
fn test_filter_discards_on_end() {
    let mut doc = XmlDocument::new();
    doc.set_filter(|doc, id, stage| {
        if stage == FilterStage::End && doc.attribute(id, "type") == Some("Cube") {
            FilterChoice::Discard
        } else {
            FilterChoice::Keep
        }
    });
    doc.parse_buffer(SCENE).unwrap();
    let root = doc.root().unwrap();
    let separator = doc.child(root, 0).unwrap();
    assert_eq!(doc.num_children(separator), 0);
    assert!(doc.find_element(&path("width")).is_none());
}

#[test]
fn test_filter_sees_start_and_end() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let mut doc = XmlDocument::new();
    doc.set_filter(move |doc, id, stage| {
        record.lock().unwrap().push((doc.element_type(id).to_string(), stage));
        FilterChoice::Keep
    });
    doc.parse_buffer("<a><b/></a>").unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("a".to_string(), FilterStage::Start),
            ("b".to_string(), FilterStage::Start),
            ("b".to_string(), FilterStage::End),
            ("a".to_string(), FilterStage::End),
        ]
    );
}

#[test]
fn test_discarding_root_leaves_empty_document() {
    let mut doc = XmlDocument::new();
    doc.set_filter(|_, _, _| FilterChoice::Discard);
    doc.parse_buffer("<a><b/></a>").unwrap();
    assert_eq!(doc.root(), None);
}

// ========== Writing ==========

#[test]
fn test_write_then_read_keeps_content() {
    let doc = XmlDocument::read_buffer(SCENE).unwrap();
    let text = doc.write_to_buffer();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<scene name=\"demo\">\n"));
    assert!(text.contains("      <width>2.5</width>\n"));

    let again = XmlDocument::read_buffer(&text).unwrap();
    assert_eq!(again.write_to_buffer(), text);
    let visible = again.find_element(&path("node/visible")).unwrap();
    assert_eq!(again.get_boolean(visible), Some(true));
}

#[test]
fn test_write_to_file_sets_filename() {
    let file = std::env::temp_dir().join(format!("coin-xml-{}.xml", std::process::id()));
    let mut doc = XmlDocument::read_buffer("<a><b>1</b></a>").unwrap();
    doc.write_to_file(&file).unwrap();
    assert_eq!(doc.filename(), Some(file.as_path()));
    let back = XmlDocument::read_file(&file).unwrap();
    assert_eq!(back.filename(), Some(file.as_path()));
    assert_eq!(back.write_to_buffer(), doc.write_to_buffer());
    std::fs::remove_file(&file).unwrap();
}

// ========== Paths ==========

#[test]
fn test_find_and_find_next() {
    let doc = XmlDocument::read_buffer(SCENE).unwrap();
    let root = doc.root().unwrap();
    let first = doc.find(root, &path("node")).unwrap();
    assert_eq!(doc.attribute(first, "type"), Some("Separator"));
    let second = doc.find_next(root, first, &path("node")).unwrap();
    assert_eq!(doc.attribute(second, "type"), Some("Cube"));
    let third = doc.find_next(root, second, &path("node")).unwrap();
    assert_eq!(doc.attribute(third, "type"), Some("Sphere"));
    assert_eq!(doc.find_next(root, third, &path("node")), None);
}

#[test]
fn test_indexed_path_lookup() {
    let doc = XmlDocument::read_buffer(SCENE).unwrap();
    let sphere = doc.find_element(&path("scene/node[1]")).unwrap();
    assert_eq!(doc.attribute(sphere, "type"), Some("Sphere"));
    let cube = doc.find_element(&path("node[0]/node")).unwrap();
    assert_eq!(doc.attribute(cube, "type"), Some("Cube"));
    assert_eq!(doc.path(cube).to_string(), "node[0]/node[0]");
}

#[test]
fn test_create_builds_missing_steps() {
    let mut doc = XmlDocument::new();
    let leaf = doc.create_element(&path("config/window/size[1]")).unwrap();
    doc.set_integer(leaf, 640);

    let root = doc.root().unwrap();
    assert_eq!(doc.element_type(root), "config");
    let window = doc.child(root, 0).unwrap();
    assert_eq!(doc.num_children_of_type(window, "size"), 2);
    assert_eq!(doc.get_integer(leaf), Some(640));
    assert_eq!(doc.create(root, &path("window/size[1]")), leaf);
}

// ========== Tree edits ==========

#[test]
fn test_remove_child_detaches_without_freeing() {
    let mut doc = XmlDocument::read_buffer("<a><b/><c/><d/></a>").unwrap();
    let root = doc.root().unwrap();
    let c = doc.child(root, 1).unwrap();
    doc.remove_child(root, c).unwrap();
    assert_eq!(doc.num_children(root), 2);
    assert_eq!(doc.parent(c), None);
    assert!(doc.contains(c));

    doc.insert_child(root, c, 0).unwrap();
    let order: Vec<&str> = doc.children(root).iter().map(|&id| doc.element_type(id)).collect();
    assert_eq!(order, vec!["c", "b", "d"]);
}

#[test]
fn test_remove_frees_subtree_and_clears_cursor() {
    let mut doc = XmlDocument::read_buffer("<a><b><c/></b></a>").unwrap();
    let root = doc.root().unwrap();
    let b = doc.child(root, 0).unwrap();
    let c = doc.child(b, 0).unwrap();
    doc.set_current(Some(c));
    doc.remove(b);
    assert!(!doc.contains(c));
    assert_eq!(doc.current(), None);
    assert_eq!(doc.num_children(root), 0);
}

#[test]
fn test_ancestors_walk_to_root() {
    let doc = XmlDocument::read_buffer(SCENE).unwrap();
    let width = doc.find_element(&path("width")).unwrap();
    let types: Vec<&str> = doc.ancestors(width).map(|id| doc.element_type(id)).collect();
    assert_eq!(types, vec!["node", "node", "scene"]);
}

#[test]
fn test_attribute_replace_and_clear() {
    let mut doc = XmlDocument::new();
    let e = doc.new_element_with_attributes("e", &[("a", "1"), ("b", "2")]);
    doc.set_attribute(e, "a", "3");
    assert_eq!(doc.num_attributes(e), 2);
    assert_eq!(doc.attributes(e)[0].value, "3");
    doc.remove_all_attributes(e);
    assert_eq!(doc.attribute(e, "b"), None);
}
