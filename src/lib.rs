pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod types;
pub mod codegen;

use diagnostics::CompileError;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Compile a source string to object bytes (lex → parse → lower → emit).
/// No file I/O or linking. Useful for compile-fail tests that only need to
/// check errors.
pub fn compile_to_object(source: &str, target: Option<&str>) -> Result<Vec<u8>, CompileError> {
    let tokens = lexer::lex(source)?;
    let mut parser = parser::Parser::new(&tokens, source);
    let program = parser.parse_program()?;
    codegen::codegen(&program, target)
}

/// Lower a source string and render the entry procedure's IR as text.
/// Nothing is defined or emitted.
pub fn compile_to_clif(source: &str, target: Option<&str>) -> Result<String, CompileError> {
    let tokens = lexer::lex(source)?;
    let mut parser = parser::Parser::new(&tokens, source);
    let program = parser.parse_program()?;
    codegen::emit_clif(&program, target)
}

/// Compile a source string to a linked executable.
pub fn compile(source: &str, output_path: &Path, target: Option<&str>) -> Result<(), CompileError> {
    let object_bytes = compile_to_object(source, target)?;

    let obj_path = output_path.with_extension("o");
    std::fs::write(&obj_path, &object_bytes)
        .map_err(|e| CompileError::backend(format!("failed to write object file: {e}")))?;

    // The intermediate object never outlives the link attempt.
    let linked = link(&obj_path, output_path);
    let _ = std::fs::remove_file(&obj_path);
    linked
}

/// Compile builtins.c once per process and cache the resulting .o path.
fn cached_runtime_object() -> Result<&'static Path, CompileError> {
    static CACHE: OnceLock<Result<PathBuf, String>> = OnceLock::new();
    let result = CACHE.get_or_init(|| {
        (|| -> Result<PathBuf, CompileError> {
            let runtime_src = include_str!("../runtime/builtins.c");
            let dir = std::env::temp_dir().join(format!("rill_runtime_{}", std::process::id()));
            std::fs::create_dir_all(&dir)
                .map_err(|e| CompileError::link(format!("failed to create runtime cache dir: {e}")))?;
            let runtime_c = dir.join("builtins.c");
            let runtime_o = dir.join("builtins.o");
            std::fs::write(&runtime_c, runtime_src)
                .map_err(|e| CompileError::link(format!("failed to write runtime source: {e}")))?;
            let status = std::process::Command::new("cc")
                .arg("-c")
                .arg(&runtime_c)
                .arg("-o")
                .arg(&runtime_o)
                .status()
                .map_err(|e| CompileError::link(format!("failed to compile runtime: {e}")))?;
            let _ = std::fs::remove_file(&runtime_c);
            if !status.success() {
                return Err(CompileError::link("failed to compile runtime"));
            }
            Ok(runtime_o)
        })()
        .map_err(|e| e.to_string())
    });
    match result {
        Ok(path) => Ok(path.as_path()),
        Err(msg) => Err(CompileError::link(msg.clone())),
    }
}

fn link(obj_path: &Path, output_path: &Path) -> Result<(), CompileError> {
    let runtime_o = cached_runtime_object()?;

    let status = std::process::Command::new("cc")
        .arg(obj_path)
        .arg(runtime_o)
        .arg("-o")
        .arg(output_path)
        .status()
        .map_err(|e| CompileError::link(format!("failed to invoke linker: {e}")))?;

    if !status.success() {
        return Err(CompileError::link("linker failed"));
    }

    Ok(())
}
