mod common;
use common::{clif_err, compile_should_fail_with};

use rill::diagnostics::CompileError;

// ============================================================
// Error kinds surfaced by the library
// ============================================================

#[test]
fn unbound_name_reports_the_name() {
    let err = clif_err("print y;");
    assert!(matches!(err, CompileError::UnboundName { ref name, .. } if name == "y"));
}

#[test]
fn unbound_name_inside_expression() {
    let err = clif_err("let x: i32 = 1;\nprint x + missing;");
    assert!(matches!(err, CompileError::UnboundName { ref name, .. } if name == "missing"));
}

#[test]
fn unknown_type_reports_the_tag() {
    let err = clif_err("let x: int = 1;");
    assert!(matches!(err, CompileError::UnknownType { ref name, .. } if name == "int"));
}

#[test]
fn unknown_type_is_not_pre_resolved_by_value() {
    // The initializer lowers fine; the declaration's tag is what fails.
    let err = clif_err("let ok: i32 = 1;\nlet x: i128 = ok;");
    assert!(matches!(err, CompileError::UnknownType { ref name, .. } if name == "i128"));
}

#[test]
fn mismatched_widths_are_rejected() {
    let err = clif_err("let a: i32 = 1;\nlet b: u8 = 2;\nprint a + b;");
    assert!(matches!(err, CompileError::TypeMismatch { .. }));
}

#[test]
fn mismatched_signs_are_rejected_at_equal_width() {
    let err = clif_err("let a: i32 = 1;\nlet b: u32 = 2;\nprint a + b;");
    assert!(matches!(err, CompileError::TypeMismatch { .. }));
}

#[test]
fn comparison_result_does_not_mix_with_integers() {
    let err = clif_err("let a: i32 = 1;\nprint (a == a) + a;");
    assert!(matches!(err, CompileError::TypeMismatch { .. }));
}

#[test]
fn missing_semicolon_is_a_syntax_error() {
    let err = clif_err("print 1");
    assert!(matches!(err, CompileError::Syntax { .. }));
}

#[test]
fn missing_type_annotation_is_a_syntax_error() {
    let err = clif_err("let x = 1;");
    assert!(matches!(err, CompileError::Syntax { ref msg, .. } if msg.contains("expected :")));
}

#[test]
fn stray_character_is_a_syntax_error() {
    let err = clif_err("let x: i32 = @;");
    assert!(matches!(err, CompileError::Syntax { ref msg, .. } if msg.contains("unexpected character")));
}

#[test]
fn bare_let_cannot_be_an_if_arm() {
    let err = clif_err("let x: i32 = 1;\nif x < 2 let y: i32 = 3;");
    assert!(matches!(err, CompileError::Syntax { .. }));
}

#[test]
fn errors_carry_the_offending_span() {
    let source = "print missing;";
    match clif_err(source) {
        CompileError::UnboundName { span, .. } => {
            assert_eq!(&source[span.start..span.end], "missing");
        }
        other => panic!("expected unbound name, got {other}"),
    }
}

#[test]
fn let_span_covers_the_type_tag() {
    let source = "let x: nope = 1;";
    match clif_err(source) {
        CompileError::UnknownType { span, .. } => {
            assert_eq!(&source[span.start..span.end], "nope");
        }
        other => panic!("expected unknown type, got {other}"),
    }
}

// ============================================================
// CLI rendering — kinds and labels reach stderr, nothing is emitted
// ============================================================

#[test]
fn cli_reports_unbound_names() {
    compile_should_fail_with("print ghost;", "is not defined in this scope");
}

#[test]
fn cli_reports_unknown_types() {
    compile_should_fail_with("let x: float = 1;", "is not a sized integer type");
}

#[test]
fn cli_reports_type_mismatches() {
    compile_should_fail_with(
        "let a: i16 = 1;\nlet b: i64 = 2;\nprint a + b;",
        "mismatched types i16 and i64",
    );
}

#[test]
fn cli_reports_syntax_errors() {
    compile_should_fail_with("let x: i32 3;", "syntax error");
}

#[test]
fn failed_compiles_produce_no_artifacts() {
    // compile_should_fail_with asserts the output path does not exist; an
    // unbound name late in the program must not leave partial output.
    compile_should_fail_with(
        "let a: i32 = 1;\nprint a;\nprint zzz;",
        "is not defined in this scope",
    );
}
