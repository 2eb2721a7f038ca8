pub mod env;
pub mod lower;

use cranelift_codegen::ir::{types, AbiParam};
use cranelift_codegen::isa::OwnedTargetIsa;
use cranelift_codegen::settings::{self, Configurable};
use cranelift_codegen::Context;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_module::{FuncId, Linkage, Module};
use cranelift_object::{ObjectBuilder, ObjectModule};

use crate::diagnostics::CompileError;
use crate::parser::ast::Program;
use crate::types::TypeRegistry;
use lower::lower_entry;

fn build_isa(target: Option<&str>) -> Result<OwnedTargetIsa, CompileError> {
    let mut flag_builder = settings::builder();
    flag_builder.set("is_pic", "true").unwrap();

    let isa_builder = match target {
        Some(triple) => cranelift_codegen::isa::lookup_by_name(triple)
            .map_err(|e| CompileError::backend(format!("unsupported target '{triple}': {e}")))?,
        None => cranelift_native::builder()
            .map_err(|e| CompileError::backend(format!("host target not supported: {e}")))?,
    };

    isa_builder
        .finish(settings::Flags::new(flag_builder))
        .map_err(|e| CompileError::backend(format!("ISA error: {e}")))
}

fn object_module(target: Option<&str>) -> Result<ObjectModule, CompileError> {
    let isa = build_isa(target)?;
    let obj_builder = ObjectBuilder::new(
        isa,
        "rill_module",
        cranelift_module::default_libcall_names(),
    )
    .map_err(|e| CompileError::backend(format!("object builder error: {e}")))?;
    Ok(ObjectModule::new(obj_builder))
}

// __rill_print_int(long long value), provided by the runtime (builtins.c)
fn declare_print_int(module: &mut ObjectModule) -> Result<FuncId, CompileError> {
    let mut sig = module.make_signature();
    sig.params.push(AbiParam::new(types::I64));
    module
        .declare_function("__rill_print_int", Linkage::Import, &sig)
        .map_err(|e| CompileError::backend(format!("declare print_int error: {e}")))
}

/// Compile a lowered program to a relocatable object. The whole program
/// becomes one exported entry procedure, `__rill_main`, with no parameters
/// and no return value; the runtime's `main` calls it.
pub fn codegen(program: &Program, target: Option<&str>) -> Result<Vec<u8>, CompileError> {
    let mut module = object_module(target)?;
    let registry = TypeRegistry::default();
    let print_int = declare_print_int(&mut module)?;

    let sig = module.make_signature();
    let entry_id = module
        .declare_function("__rill_main", Linkage::Export, &sig)
        .map_err(|e| CompileError::backend(format!("declare entry error: {e}")))?;

    let mut fn_ctx = Context::new();
    fn_ctx.func.signature = sig;

    let mut builder_ctx = FunctionBuilderContext::new();
    let builder = FunctionBuilder::new(&mut fn_ctx.func, &mut builder_ctx);
    lower_entry(program, builder, &mut module, &registry, print_int)?;

    module
        .define_function(entry_id, &mut fn_ctx)
        .map_err(|e| CompileError::backend(format!("define entry error: {e}")))?;

    let product = module.finish();
    product
        .emit()
        .map_err(|e| CompileError::backend(format!("emit error: {e}")))
}

/// Lower a program and pretty-print the entry procedure's IR without
/// defining or emitting anything.
pub fn emit_clif(program: &Program, target: Option<&str>) -> Result<String, CompileError> {
    let mut module = object_module(target)?;
    let registry = TypeRegistry::default();
    let print_int = declare_print_int(&mut module)?;

    let mut fn_ctx = Context::new();
    fn_ctx.func.signature = module.make_signature();

    let mut builder_ctx = FunctionBuilderContext::new();
    let builder = FunctionBuilder::new(&mut fn_ctx.func, &mut builder_ctx);
    lower_entry(program, builder, &mut module, &registry, print_int)?;

    Ok(fn_ctx.func.display().to_string())
}
