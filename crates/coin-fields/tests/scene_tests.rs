//! Tests for reading and writing whole scene files.

use coin_common::Severity;
use coin_fields::{
    ContainerTypeBuilder, FieldCatalog, FieldKind, Input, MFColor, Output, SFBitMask, SFFloat, SFVec3f, read_scene,
    write_scene,
};
use glam::Vec3;

const SCENE: &str = "#Inventor V2.1 ascii

# a comment
Separator {
  renderCaching OFF
  DEF base Material {
    diffuseColor [ 1 0 0, 0 1 0 ]
    shininess 0.5
  }
  Transform { translation 0 1 0 }
  Cylinder { parts (SIDES | TOP) height 4 }
  Separator { USE base }
}
";

fn read(text: &str) -> Vec<coin_fields::FieldContainer> {
    let mut input = Input::from_bytes(text.as_bytes().to_vec());
    read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap()
}

// ========== Reading ==========

#[test_log::test]
fn test_reads_header_and_tree() {
    let mut input = Input::from_bytes(SCENE.as_bytes().to_vec());
    assert!(!input.is_binary());
    let roots = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap();
    assert_eq!(input.diagnostics().count(Severity::ReadError), 0);

    let root = &roots[0];
    assert_eq!(root.get("renderCaching").as_deref(), Some("OFF"));
    assert_eq!(root.children().len(), 4);

    let material = &root.children()[0];
    let diffuse = material.field_as::<MFColor>("diffuseColor").unwrap();
    assert_eq!(diffuse.len(), 2);
    assert_eq!(diffuse.values()[1].0, Vec3::Y);
    assert!(material.field("ambientColor").unwrap().is_default());

    let transform = &root.children()[1];
    assert_eq!(*transform.field_as::<SFVec3f>("translation").unwrap().value(), Vec3::Y);

    let cylinder = &root.children()[2];
    assert_eq!(cylinder.field_as::<SFBitMask>("parts").unwrap().value(), 3);
    assert_eq!(*cylinder.field_as::<SFFloat>("height").unwrap().value(), 4.0);

    let shared = &root.children()[3].children()[0];
    assert!(shared.is_same(material));
}

#[test_log::test]
fn test_headerless_stream_is_text() {
    let mut input = Input::from_bytes(b"Info { string \"hello\" }".to_vec());
    let roots = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap();
    assert_eq!(roots[0].get("string").as_deref(), Some("\"hello\""));
    assert_eq!(input.diagnostics().count(Severity::Info), 1);
}

#[test_log::test]
fn test_unknown_type_with_declared_fields() {
    let roots = read("Widget { fields [ SFFloat size ] size 3 Info { } }");
    let widget = &roots[0];
    assert!(!widget.is_built_in());
    assert_eq!(*widget.field_as::<SFFloat>("size").unwrap().value(), 3.0);
    assert_eq!(widget.children()[0].type_name(), "Info");
}

#[test_log::test]
fn test_error_reports_line() {
    let mut input = Input::from_text("Group {\n  DrawStyle {\n    style SPARKLES\n  }\n}\n");
    let err = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap_err();
    assert_eq!(err.line(), Some(3));
}

#[test_log::test]
fn test_premature_end() {
    let mut input = Input::from_text("Group { Info {");
    let err = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap_err();
    assert!(matches!(err, coin_common::ReadError::PrematureEof { .. }));
}

// ========== Custom types ==========

#[test]
fn test_registered_type_is_used() {
    let catalog = FieldCatalog::with_builtins();
    let _ = catalog.register(
        ContainerTypeBuilder::new("Light")
            .define_enum("Kind", &[("POINT", 0), ("SPOT", 1)])
            .enum_field("kind", "Kind", 0)
            .field("intensity", SFFloat::with_default(1.0))
            .build(),
    );
    let mut input = Input::from_text("Light { kind SPOT intensity 0.25 }");
    let roots = read_scene(&mut input, &catalog).unwrap();
    assert!(roots[0].is_built_in());
    assert_eq!(roots[0].get("kind").as_deref(), Some("SPOT"));
    assert_eq!(roots[0].get("intensity").as_deref(), Some("0.25"));
}

// ========== Writing ==========

#[test]
fn test_text_round_trip() {
    let roots = read(SCENE);
    let mut out = Output::text();
    write_scene(&roots, &mut out);
    let again = read(&out.to_text());

    assert_eq!(again.len(), 1);
    let (a, b) = (&roots[0], &again[0]);
    assert!(a.is_same(b));
    for (x, y) in a.children().iter().zip(b.children()) {
        assert!(x.is_same(y), "{} differs", x.type_name());
    }
}

#[test]
fn test_binary_round_trip() {
    let roots = read(SCENE);
    let mut out = Output::binary();
    write_scene(&roots, &mut out);
    let bytes = out.into_bytes();
    assert!(bytes.starts_with(b"#Inventor V2.1 binary"));

    let mut input = Input::from_bytes(bytes);
    let again = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap();
    let material = &again[0].children()[0];
    assert_eq!(material.def_name(), Some("base"));
    assert!(material.is_same(&roots[0].children()[0]));
    assert!(again[0].children()[3].children()[0].is_same(material));
}

#[test_log::test]
fn test_binary_round_trip_of_declared_fields() {
    let roots = read("Ext { fields [ eventIn SFBool t, field SFFloat a 1, SFFloat b ] a 2.5 }");
    let mut out = Output::binary();
    write_scene(&roots, &mut out);

    let mut input = Input::from_bytes(out.into_bytes());
    let again = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap();
    let ext = &again[0];
    assert!(!ext.is_built_in());
    assert_eq!(ext.get("a").as_deref(), Some("2.5"));
    assert!(ext.field("b").is_some());
    assert!(ext.field("t").is_none());
    assert!(input.at_end());
}

#[test_log::test]
fn test_vrml2_text_round_trip_keeps_roles() {
    let text = "#VRML V2.0 utf8\n\
                Ext { fields [ eventIn SFBool t, exposedField SFFloat e 3, field SFFloat a 1 ] a 2.5 }";
    let mut input = Input::from_bytes(text.as_bytes().to_vec());
    let roots = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap();

    let mut out = Output::text().with_vrml2(input.is_vrml2());
    write_scene(&roots, &mut out);
    let written = out.to_text();
    assert!(written.starts_with("#VRML V2.0 utf8\n"));
    assert!(written.contains("fields [ eventIn SFBool t, exposedField SFFloat e 3, SFFloat a ]"));

    let mut input = Input::from_bytes(written.into_bytes());
    let again = read_scene(&mut input, &FieldCatalog::with_builtins()).unwrap();
    let ext = &again[0];
    let kind = |name: &str| ext.field(name).map(|f| f.state().kind);
    assert_eq!(kind("t"), Some(FieldKind::EventIn));
    assert_eq!(kind("e"), Some(FieldKind::ExposedField));
    assert_eq!(kind("a"), Some(FieldKind::Field));
    assert_eq!(*ext.field_as::<SFFloat>("e").unwrap().value(), 3.0);
    assert_eq!(*ext.field_as::<SFFloat>("a").unwrap().value(), 2.5);
}
