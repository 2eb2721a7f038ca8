use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::{types, InstBuilder, Value};
use cranelift_frontend::FunctionBuilder;
use cranelift_module::{FuncId, Module};

use crate::diagnostics::CompileError;
use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use crate::types::{IntTy, TypeRegistry};

use super::env::Environment;

/// How a lowered SSA value may combine with other operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperandTy {
    /// Bare integer literal, carried at 64 bits until a sized operand
    /// fixes its width.
    Literal,
    /// Comparison result (8-bit, 0 or 1). Combines only with other
    /// comparison results.
    Bool,
    /// Value cast to a declared sized integer type.
    Sized(IntTy),
}

/// An SSA value paired with the operand type lowering tracks for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoweredValue {
    pub value: Value,
    pub ty: OperandTy,
}

struct LowerContext<'a> {
    builder: FunctionBuilder<'a>,
    module: &'a mut dyn Module,
    registry: &'a TypeRegistry,
    print_int: FuncId,
}

/// Lower the whole program into the implicit entry procedure. The caller
/// supplies a builder positioned on a fresh function with an empty
/// signature; this fills it and finalizes the builder.
pub fn lower_entry(
    program: &Program,
    mut builder: FunctionBuilder<'_>,
    module: &mut dyn Module,
    registry: &TypeRegistry,
    print_int: FuncId,
) -> Result<(), CompileError> {
    let entry_block = builder.create_block();
    builder.append_block_params_for_function_params(entry_block);
    builder.switch_to_block(entry_block);
    builder.seal_block(entry_block);

    let mut ctx = LowerContext { builder, module, registry, print_int };
    let mut globals = Environment::new();

    for stmt in &program.stmts {
        ctx.lower_stmt(stmt, &mut globals)?;
    }

    ctx.builder.ins().return_(&[]);
    ctx.finalize();

    Ok(())
}

impl<'a> LowerContext<'a> {
    fn finalize(self) {
        self.builder.finalize();
    }

    fn lower_stmt(&mut self, stmt: &Spanned<Stmt>, env: &mut Environment) -> Result<(), CompileError> {
        match &stmt.node {
            Stmt::Expr(expr) => {
                // Evaluated for side effects; the value is dropped.
                self.lower_expr(expr, env)?;
            }
            Stmt::Print(expr) => {
                let operand = self.lower_expr(expr, env)?;
                let widened = self.widen_to_i64(operand);
                let func_ref = self.module.declare_func_in_func(self.print_int, self.builder.func);
                self.builder.ins().call(func_ref, &[widened]);
            }
            Stmt::Let { name, ty, value } => {
                let operand = self.lower_expr(value, env)?;
                let int_ty = self.registry.resolve(&ty.node).ok_or_else(|| {
                    CompileError::unknown_type(&ty.node, ty.span)
                })?;
                let cast = self.cast_to(operand, int_ty);
                env.define(name.node.clone(), LoweredValue { value: cast, ty: OperandTy::Sized(int_ty) });
            }
            Stmt::Block(stmts) => {
                let mut inner = Environment::nested(&*env);
                for s in stmts {
                    self.lower_stmt(s, &mut inner)?;
                }
            }
            Stmt::If { condition, then_branch, else_branch } => {
                let cond = self.lower_expr(condition, env)?;

                let then_bb = self.builder.create_block();
                let merge_bb = self.builder.create_block();

                if let Some(else_stmt) = else_branch {
                    let else_bb = self.builder.create_block();
                    self.builder.ins().brif(cond.value, then_bb, &[], else_bb, &[]);

                    self.builder.switch_to_block(then_bb);
                    self.builder.seal_block(then_bb);
                    self.lower_stmt(then_branch, env)?;
                    self.builder.ins().jump(merge_bb, &[]);

                    self.builder.switch_to_block(else_bb);
                    self.builder.seal_block(else_bb);
                    self.lower_stmt(else_stmt, env)?;
                    self.builder.ins().jump(merge_bb, &[]);
                } else {
                    // No else body: the false edge goes straight to merge.
                    self.builder.ins().brif(cond.value, then_bb, &[], merge_bb, &[]);

                    self.builder.switch_to_block(then_bb);
                    self.builder.seal_block(then_bb);
                    self.lower_stmt(then_branch, env)?;
                    self.builder.ins().jump(merge_bb, &[]);
                }

                self.builder.switch_to_block(merge_bb);
                self.builder.seal_block(merge_bb);
            }
        }

        Ok(())
    }

    fn lower_expr(&mut self, expr: &Spanned<Expr>, env: &Environment) -> Result<LoweredValue, CompileError> {
        match &expr.node {
            Expr::IntLit(v) => {
                let value = self.builder.ins().iconst(types::I64, *v);
                Ok(LoweredValue { value, ty: OperandTy::Literal })
            }
            Expr::Ident(name) => env
                .get(name)
                .ok_or_else(|| CompileError::unbound_name(name, expr.span)),
            Expr::BinOp { op, lhs, rhs } => {
                // Left strictly before right.
                let l = self.lower_expr(lhs, env)?;
                let r = self.lower_expr(rhs, env)?;
                let (l_val, r_val, operand_ty) = self.unify_operands(*op, l, r, expr.span)?;

                let (value, ty) = match op {
                    BinOp::Add => (self.builder.ins().iadd(l_val, r_val), operand_ty),
                    BinOp::Sub => (self.builder.ins().isub(l_val, r_val), operand_ty),
                    BinOp::Mul => (self.builder.ins().imul(l_val, r_val), operand_ty),
                    BinOp::Div => (self.builder.ins().sdiv(l_val, r_val), operand_ty),
                    BinOp::Eq => (self.builder.ins().icmp(IntCC::Equal, l_val, r_val), OperandTy::Bool),
                    BinOp::Neq => (self.builder.ins().icmp(IntCC::NotEqual, l_val, r_val), OperandTy::Bool),
                    BinOp::Lt => (self.builder.ins().icmp(IntCC::SignedLessThan, l_val, r_val), OperandTy::Bool),
                    BinOp::LtEq => (self.builder.ins().icmp(IntCC::SignedLessThanOrEqual, l_val, r_val), OperandTy::Bool),
                    BinOp::Gt => (self.builder.ins().icmp(IntCC::SignedGreaterThan, l_val, r_val), OperandTy::Bool),
                    BinOp::GtEq => (self.builder.ins().icmp(IntCC::SignedGreaterThanOrEqual, l_val, r_val), OperandTy::Bool),
                };

                Ok(LoweredValue { value, ty })
            }
        }
    }

    /// Bring two operands to a common width and sign, or reject the pair.
    /// Literals adapt to a sized operand; two sized operands must agree
    /// exactly; comparison results never mix with integers.
    fn unify_operands(
        &mut self,
        op: BinOp,
        l: LoweredValue,
        r: LoweredValue,
        span: Span,
    ) -> Result<(Value, Value, OperandTy), CompileError> {
        match (l.ty, r.ty) {
            (OperandTy::Literal, OperandTy::Literal) => Ok((l.value, r.value, OperandTy::Literal)),
            (OperandTy::Sized(ty), OperandTy::Literal) => {
                let r_cast = self.cast_to(r, ty);
                Ok((l.value, r_cast, OperandTy::Sized(ty)))
            }
            (OperandTy::Literal, OperandTy::Sized(ty)) => {
                let l_cast = self.cast_to(l, ty);
                Ok((l_cast, r.value, OperandTy::Sized(ty)))
            }
            (OperandTy::Sized(lt), OperandTy::Sized(rt)) => {
                if lt == rt {
                    Ok((l.value, r.value, OperandTy::Sized(lt)))
                } else {
                    Err(CompileError::type_mismatch(
                        format!("operands of '{op}' have mismatched types {lt} and {rt}"),
                        span,
                    ))
                }
            }
            (OperandTy::Bool, OperandTy::Bool) => Ok((l.value, r.value, OperandTy::Bool)),
            (OperandTy::Bool, _) | (_, OperandTy::Bool) => Err(CompileError::type_mismatch(
                format!("operands of '{op}' mix a comparison result with an integer"),
                span,
            )),
        }
    }

    /// Width/sign cast for `let` bindings and literal adaptation. Same
    /// width is a no-op (signedness lives in the operations, not the
    /// value); narrowing truncates; widening extends by source sign.
    fn cast_to(&mut self, operand: LoweredValue, target: IntTy) -> Value {
        let (from_bits, from_signed) = match operand.ty {
            OperandTy::Literal => (64, true),
            OperandTy::Bool => (8, false),
            OperandTy::Sized(ty) => (ty.bits(), ty.is_signed()),
        };

        let target_ty = int_ty_to_clif(target);
        if from_bits == target.bits() {
            operand.value
        } else if from_bits > target.bits() {
            self.builder.ins().ireduce(target_ty, operand.value)
        } else if from_signed {
            self.builder.ins().sextend(target_ty, operand.value)
        } else {
            self.builder.ins().uextend(target_ty, operand.value)
        }
    }

    /// The display primitive takes a single I64 whatever the operand's
    /// declared width.
    fn widen_to_i64(&mut self, operand: LoweredValue) -> Value {
        match operand.ty {
            OperandTy::Literal => operand.value,
            OperandTy::Bool => self.builder.ins().uextend(types::I64, operand.value),
            OperandTy::Sized(ty) if ty.bits() == 64 => operand.value,
            OperandTy::Sized(ty) if ty.is_signed() => self.builder.ins().sextend(types::I64, operand.value),
            OperandTy::Sized(_) => self.builder.ins().uextend(types::I64, operand.value),
        }
    }
}

pub fn int_ty_to_clif(ty: IntTy) -> types::Type {
    match ty {
        IntTy::I8 | IntTy::U8 => types::I8,
        IntTy::I16 | IntTy::U16 => types::I16,
        IntTy::I32 | IntTy::U32 => types::I32,
        IntTy::I64 | IntTy::U64 => types::I64,
    }
}
