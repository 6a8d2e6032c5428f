//! Tests for field reading, writing and the diagnostics they post.

use coin_common::{ReadError, Severity};
use coin_fields::{
    Color, EnumSet, Field, FieldContainer, FieldData, Input, MFBitMask, MFColor, MFFloat, MFInt32, MFName, MFString,
    Name, Output, ReadOptions, Rotation, SFBitMask, SFBool, SFEnum, SFFloat, SFImage, SFRotation, SFString, SFVec3f,
    create_field,
};
use glam::Vec3;

fn read_field(field: &mut dyn Field, text: &str) -> (Result<(), ReadError>, Input) {
    let mut input = Input::from_text(text);
    let result = field.read(&mut input, "value");
    (result, input)
}

fn text_of(field: &dyn Field) -> String {
    let mut out = Output::text();
    field.write(&mut out, "value");
    out.to_text()
}

// ========== Single-value fields ==========

#[test_log::test]
fn test_bool_accepts_names_and_digits() {
    let mut field = SFBool::new();
    assert!(read_field(&mut field, "TRUE").0.is_ok());
    assert!(*field.value());
    assert!(read_field(&mut field, "0").0.is_ok());
    assert!(!*field.value());
    assert!(!field.is_default());
}

#[test_log::test]
fn test_bool_rejects_other_integers() {
    let mut field = SFBool::new();
    let (result, input) = read_field(&mut field, "2");
    assert!(result.is_err());
    let last = input.diagnostics().last().unwrap();
    assert_eq!(last.severity, Severity::ReadError);
    assert_eq!(last.component, "SFBool");
    assert_eq!(last.message, "Illegal value for field: 2 (must be 0 or 1)");
}

#[test_log::test]
fn test_bool_rejects_other_names() {
    let mut field = SFBool::new();
    let (result, input) = read_field(&mut field, "maybe");
    assert!(result.is_err());
    assert_eq!(
        input.diagnostics().last().unwrap().message,
        "Invalid value \"maybe\" for field (must be TRUE or FALSE)"
    );
}

#[test_log::test]
fn test_vector_at_eof_is_premature() {
    let mut field = SFVec3f::new();
    let (result, input) = read_field(&mut field, "1 2");
    assert!(matches!(result, Err(ReadError::PrematureEof { .. })));
    assert_eq!(input.diagnostics().count(Severity::ReadError), 1);
}

#[test]
fn test_default_field_writes_name_only() {
    let field = SFFloat::with_default(0.5);
    assert_eq!(text_of(&field), "value\n");
}

#[test]
fn test_ignored_field_with_value() {
    let mut field = SFFloat::new();
    assert!(read_field(&mut field, "3.5 ~").0.is_ok());
    assert!(field.is_ignored());
    assert_eq!(text_of(&field), "value 3.5 ~\n");
}

#[test]
fn test_ignored_only() {
    let mut field = SFFloat::with_default(1.0);
    assert!(read_field(&mut field, "~").0.is_ok());
    assert!(field.is_ignored());
    assert_eq!(*field.value(), 1.0);
}

#[test]
fn test_connection_is_kept() {
    let mut field = SFFloat::new();
    assert!(read_field(&mut field, "= USE other.size").0.is_ok());
    assert!(field.is_connected());
    assert_eq!(field.state().connection.as_ref().unwrap().to_string(), "other.size");
}

#[test]
fn test_string_quoting() {
    let mut field = SFString::new();
    assert!(read_field(&mut field, r#""say \"hi\"""#).0.is_ok());
    assert_eq!(field.value(), "say \"hi\"");
    assert_eq!(text_of(&field), "value \"say \\\"hi\\\"\"\n");
}

#[test]
fn test_rotation_from_axis_angle() {
    let mut field = SFRotation::new();
    assert!(read_field(&mut field, "0 1 0 1.5").0.is_ok());
    let (axis, angle) = field.value().axis_angle();
    assert!((axis - Vec3::Y).length() < 1e-5);
    assert!((angle - 1.5).abs() < 1e-5);
}

#[test]
fn test_rotation_zero_axis_is_identity() {
    let rotation = Rotation::from_axis_angle(Vec3::ZERO, 1.0);
    assert_eq!(rotation, Rotation::default());
}

#[test_log::test]
fn test_image_validation() {
    let mut field = SFImage::new();
    let (result, input) = read_field(&mut field, "2 2 5");
    assert!(result.is_err());
    assert_eq!(input.diagnostics().last().unwrap().message, "Invalid image specification 2x2x5");
}

#[test_log::test]
fn test_image_size_overflow_is_rejected() {
    let mut field = SFImage::new();
    let (result, input) = read_field(&mut field, "2147483647 2147483647 4 0x0");
    assert!(result.is_err());
    assert_eq!(
        input.diagnostics().last().unwrap().message,
        "Invalid image specification 2147483647x2147483647x4"
    );
}

#[test_log::test]
fn test_image_header_larger_than_data() {
    let mut field = SFImage::new();
    let (result, input) = read_field(&mut field, "4096 4096 4 0xff 0xff");
    assert!(result.is_err());
    assert_eq!(input.diagnostics().count(Severity::ReadError), 1);
    assert_eq!(input.diagnostics().last().unwrap().message, "Premature end of file");
}

#[test]
fn test_image_pixels() {
    let mut field = SFImage::new();
    assert!(read_field(&mut field, "2 1 3 0xff0000 0x00ff00").0.is_ok());
    let image = field.value();
    assert_eq!((image.width(), image.height(), image.components()), (2, 1, 3));
    assert_eq!(image.pixels(), &[0xff, 0, 0, 0, 0xff, 0]);
}

// ========== Multiple-value fields ==========

#[test]
fn test_bracketed_list_with_trailing_comma() {
    let mut field = MFFloat::new();
    assert!(read_field(&mut field, "[ 1, 2, 3, ]").0.is_ok());
    assert_eq!(field.values(), &[1.0, 2.0, 3.0]);
}

#[test]
fn test_single_bare_value() {
    let mut field = MFInt32::new();
    assert!(read_field(&mut field, "7").0.is_ok());
    assert_eq!(field.values(), &[7]);
    assert_eq!(text_of(&field), "value 7\n");
}

#[test]
fn test_empty_list() {
    let mut field = MFColor::with_default(vec![Color::new(1.0, 0.0, 0.0)]);
    assert!(read_field(&mut field, "[]").0.is_ok());
    assert!(field.is_empty());
    assert_eq!(text_of(&field), "value [  ]\n");
}

#[test_log::test]
fn test_list_closed_by_brace() {
    let mut field = MFFloat::new();
    let (result, input) = read_field(&mut field, "[ 1, 2 }");
    assert!(result.is_err());
    assert_eq!(input.diagnostics().last().unwrap().message, "Premature end of array, got '}'");
}

#[test]
fn test_edit_operations() {
    let mut field = MFInt32::new();
    field.set_values(0, &[1, 2, 3, 4]);
    field.insert_space(1, 2);
    assert_eq!(field.values(), &[1, 0, 0, 2, 3, 4]);
    field.delete_values(1, Some(2));
    assert_eq!(field.values(), &[1, 2, 3, 4]);
    field.set1_value(6, 9);
    assert_eq!(field.len(), 7);
    field.delete_values(2, None);
    assert_eq!(field.values(), &[1, 2]);
    field.set_num(1);
    assert_eq!(field.values(), &[1]);
}

#[test]
fn test_invalid_delete_is_ignored() {
    let mut field = MFInt32::with_default(vec![1, 2]);
    field.delete_values(1, Some(5));
    assert_eq!(field.values(), &[1, 2]);
}

#[test]
fn test_string_list_reads_unquoted_words() {
    let mut field = MFString::new();
    assert!(read_field(&mut field, "[ \"a b\", c ]").0.is_ok());
    assert_eq!(field.values(), &["a b".to_string(), "c".to_string()]);
}

#[test]
fn test_bare_names_in_a_list() {
    let mut field = MFName::new();
    assert!(read_field(&mut field, "[a,b,\"c d\"]").0.is_ok());
    let names: Vec<&str> = field.values().iter().map(|Name(n)| n.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c d"]);
}

// ========== Enums and bit masks ==========

fn styles() -> EnumSet {
    EnumSet::new([("FILLED", 0), ("LINES", 1), ("POINTS", 2)])
}

#[test]
fn test_enum_by_name_and_number() {
    let mut field = SFEnum::with_enums(styles(), 0);
    assert!(read_field(&mut field, "POINTS").0.is_ok());
    assert_eq!(field.value(), 2);
    assert!(read_field(&mut field, "1").0.is_ok());
    assert_eq!(text_of(&field), "value LINES\n");
}

#[test_log::test]
fn test_unknown_enum_name_is_an_error() {
    let mut field = SFEnum::with_enums(styles(), 0);
    let (result, input) = read_field(&mut field, "DOTTED");
    assert!(result.is_err());
    assert_eq!(
        input.diagnostics().last().unwrap().message,
        "Unknown SFEnum enumeration value \"DOTTED\""
    );
}

#[test]
fn test_enum_without_table_registers_names() {
    let mut field = SFEnum::default();
    let mut input = Input::from_text("FIRST").with_options(ReadOptions { lenient_enums: true });
    assert!(field.read(&mut input, "value").is_ok());
    assert_eq!(field.enums().find_value("FIRST"), Some(field.value()));
}

#[test]
fn test_bitmask_expression() {
    let parts = EnumSet::new([("SIDES", 1), ("TOP", 2), ("BOTTOM", 4), ("ALL", 7)]);
    let mut field = SFBitMask::with_enums(parts, 0);
    assert!(read_field(&mut field, "( SIDES | BOTTOM )").0.is_ok());
    assert_eq!(field.value(), 5);
    assert!(read_field(&mut field, "TOP").0.is_ok());
    assert_eq!(field.value(), 2);
}

#[test_log::test]
fn test_bitmask_without_table_registers_bits() {
    let mut field = SFBitMask::default();
    assert!(read_field(&mut field, "FOO").0.is_ok());
    assert_eq!(field.value(), 1);
    assert!(read_field(&mut field, "( FOO | BAR )").0.is_ok());
    assert_eq!(field.value(), 3);
    assert_eq!(text_of(&field), "value (FOO | BAR)\n");
}

#[test_log::test]
fn test_mf_bitmask_without_table_registers_bits() {
    let mut field = MFBitMask::default();
    assert!(read_field(&mut field, "[ A, ( B | C ), A ]").0.is_ok());
    assert_eq!(field.values(), &[1, 6, 1]);
    assert_eq!(field.enums().find_value("C"), Some(4));
}

#[test_log::test]
fn test_strict_bitmask_rejects_unknown_names() {
    let mut field = SFBitMask::default();
    let mut input = Input::from_text("FOO").with_options(ReadOptions { lenient_enums: false });
    assert!(field.read(&mut input, "value").is_err());
    assert_eq!(
        input.diagnostics().last().unwrap().message,
        "Unknown SFBitMask bit mask value \"FOO\""
    );
}

// ========== Dynamic fields ==========

#[test]
fn test_set_and_get_by_text() {
    let mut container = FieldContainer::unknown("Thing");
    let _ = container.add_field("size", create_field("SFFloat").unwrap());
    container.set("size", "2.5").unwrap();
    assert_eq!(container.get("size").as_deref(), Some("2.5"));
    assert!(!container.is_built_in());
}

#[test]
fn test_extension_fields_are_declared_on_write() {
    let mut input = Input::from_text("fields [ SFFloat size, MFString tags ] size 2 tags [ \"a\", \"b\" ]");
    let mut container = FieldContainer::unknown("Thing");
    container.read_fields(&mut input, true).unwrap();
    assert_eq!(container.num_fields(), 2);

    let mut out = Output::text();
    container.write_fields(&mut out);
    assert_eq!(
        out.to_text(),
        "fields [ SFFloat size, MFString tags ]\nsize 2\ntags [ \"a\",\n    \"b\" ]\n"
    );
}

#[test]
fn test_field_data_templates_are_shared() {
    let mut data = FieldData::new();
    let _ = data.add_field("size", "SFFloat");
    let data = std::sync::Arc::new(data);
    let a = FieldContainer::new("Thing", data.clone(), vec![create_field("SFFloat").unwrap()], false);
    let mut b = a.clone();
    assert!(std::sync::Arc::ptr_eq(a.field_data(), b.field_data()));

    let _ = b.add_field("extra", create_field("SFInt32").unwrap());
    assert!(!std::sync::Arc::ptr_eq(a.field_data(), b.field_data()));
    assert_eq!(a.num_fields(), 1);
    assert_eq!(b.num_fields(), 2);
}
