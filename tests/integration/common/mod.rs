use std::process::Command;

use rill::diagnostics::CompileError;

pub fn rillc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rillc"))
}

/// Lower source on the host ISA and return the entry procedure's CLIF text.
pub fn clif(source: &str) -> String {
    rill::compile_to_clif(source, None)
        .unwrap_or_else(|e| panic!("lowering failed: {e}\nsource:\n{source}"))
}

/// Lowering must fail; returns the error so callers can assert on its kind.
pub fn clif_err(source: &str) -> CompileError {
    match rill::compile_to_clif(source, None) {
        Ok(ir) => panic!("lowering should have failed, got:\n{ir}"),
        Err(e) => e,
    }
}

pub fn compile_and_run_stdout(source: &str) -> String {
    let dir = tempfile::tempdir().unwrap();
    let src_path = dir.path().join("test.rill");
    let bin_path = dir.path().join("test_bin");

    std::fs::write(&src_path, source).unwrap();

    let compile_output = rillc()
        .arg("compile")
        .arg(&src_path)
        .arg("-o")
        .arg(&bin_path)
        .output()
        .unwrap();

    assert!(
        compile_output.status.success(),
        "Compilation failed: {}",
        String::from_utf8_lossy(&compile_output.stderr)
    );

    assert!(bin_path.exists(), "Binary was not created");

    let run_output = Command::new(&bin_path).output().unwrap();
    assert!(run_output.status.success(), "Binary exited with non-zero status");
    String::from_utf8_lossy(&run_output.stdout).to_string()
}

pub fn compile_should_fail_with(source: &str, expected_msg: &str) {
    let dir = tempfile::tempdir().unwrap();
    let src_path = dir.path().join("test.rill");
    let bin_path = dir.path().join("test_bin");

    std::fs::write(&src_path, source).unwrap();

    let output = rillc()
        .arg("compile")
        .arg(&src_path)
        .arg("-o")
        .arg(&bin_path)
        .output()
        .unwrap();

    assert!(!output.status.success(), "Compilation should have failed");
    assert!(!bin_path.exists(), "No binary should be produced on failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(expected_msg),
        "Expected error containing '{}', got: {}",
        expected_msg,
        stderr
    );
}
