//! Tests for diagnostics collection and the state configuration.

use coin_common::{Diagnostics, ReadError, Severity, StateConfig};

// ========== Diagnostics ==========

#[test_log::test]
fn test_counts_by_severity() {
    let mut sink = Diagnostics::new();
    let _ = sink.read_error("Input", 1, "Premature end of file");
    sink.warning("Input", Some(2), "Detected non-valid floating point number, replacing with 0.0f");
    sink.info("Input", "header parsed");

    assert_eq!(sink.len(), 3);
    assert_eq!(sink.count(Severity::ReadError), 1);
    assert_eq!(sink.count(Severity::Warning), 1);
    assert_eq!(sink.count(Severity::Info), 1);
}

#[test_log::test]
fn test_read_error_message_matches_diagnostic() {
    let mut sink = Diagnostics::new();
    let err = sink.read_error("SFBool", 4, "Illegal value for field: 2 (must be 0 or 1)");
    match err {
        ReadError::Invalid { line, message } => {
            assert_eq!(line, 4);
            assert_eq!(message, sink.last().unwrap().message);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_severity_names() {
    assert_eq!(Severity::ReadError.to_string(), "read error");
    assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
}

// ========== StateConfig ==========

#[test]
fn test_explicit_separate_override() {
    let config = StateConfig::with_separate_override(true);
    assert!(config.separate_diffuse_transparency_override);
    assert_eq!(StateConfig::default(), StateConfig::with_separate_override(false));
}
