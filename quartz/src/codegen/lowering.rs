//! AST to IR lowering
//!
//! Every variable lives in a stack slot: writes are stores, reads are loads.
//! `if` and `for` are expanded into explicit blocks and branches.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{Diagnostic, DiagnosticKind, LoweringOptions, MissingReturnPolicy, UndeclaredPolicy};
use crate::ir::builder::{FunctionBuilder, ModuleBuilder};
use crate::ir::verify::verify_function;
use crate::ir::*;
use crate::CompileError;
use mica::parser::ast::{BinaryOp as AstBinaryOp, Expr, FunctionDef};

/// Lower a mica AST to quartz IR.
///
/// One `Lowering` drives one compilation at a time; the symbol table is reset
/// at the start of every function.
pub struct Lowering {
    options: LoweringOptions,
    /// Variable name to storage slot, for the function being generated.
    symbols: HashMap<String, SlotId>,
    function_name: String,
    diagnostics: Vec<Diagnostic>,
}

impl Lowering {
    /// Create a new lowering context.
    pub fn new(options: LoweringOptions) -> Self {
        Self {
            options,
            symbols: HashMap::new(),
            function_name: String::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Notes recorded so far (undeclared reads, implicit returns).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the lowering and hand back its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Lower a parsed function into a single-function module.
    pub fn lower_program(
        &mut self,
        ast: &FunctionDef,
        module_name: &str,
    ) -> Result<Module, CompileError> {
        let mut module = ModuleBuilder::new(module_name);
        module.add_function(self.lower_function(ast)?);
        Ok(module.build())
    }

    /// Lower one function definition and verify the result.
    pub fn lower_function(&mut self, ast: &FunctionDef) -> Result<Function, CompileError> {
        let name = &ast.proto.name;
        self.symbols.clear();
        self.function_name = name.clone();

        let mut builder = FunctionBuilder::new(name.clone(), ast.proto.params.clone());
        let entry = builder.create_block("entry");
        builder.switch_to_block(entry);

        // Duplicate parameter names resolve to the same slot; the later
        // argument wins.
        for (index, param) in ast.proto.params.iter().enumerate() {
            let slot = self.slot_for(&mut builder, param)?;
            builder.add_instruction(Instruction::Store {
                slot,
                value: Value::Param(index),
            })?;
        }

        let mut result = None;
        for stmt in &ast.body {
            result = self.lower_expr(&mut builder, stmt)?;
        }

        let ret = match result {
            Some(value) => value,
            None => match self.options.missing_return {
                MissingReturnPolicy::Reject => {
                    return Err(CompileError::MissingReturnValue(name.clone()))
                }
                MissingReturnPolicy::ReturnZero => {
                    self.note(DiagnosticKind::ImplicitReturn);
                    Value::Const(0)
                }
            },
        };
        builder.set_terminator(Terminator::Return(ret))?;

        let function = builder.build();
        verify_function(&function)?;
        debug!(
            function = %function.name,
            blocks = function.blocks.len(),
            slots = function.slots.len(),
            "lowered function"
        );
        Ok(function)
    }

    /// Lower an expression or statement. `None` means the node yields no
    /// usable value (`if`).
    fn lower_expr(
        &mut self,
        builder: &mut FunctionBuilder,
        expr: &Expr,
    ) -> Result<Option<Value>, CompileError> {
        match expr {
            Expr::Number(value) => Ok(Some(Value::Const(*value))),
            Expr::Variable(name) => self.read_variable(builder, name).map(Some),
            Expr::Binary { op, lhs, rhs } => match op {
                AstBinaryOp::Assign => self.lower_assign(builder, lhs, rhs).map(Some),
                AstBinaryOp::Add => self.lower_arith(builder, BinOp::Add, lhs, rhs).map(Some),
                AstBinaryOp::Sub => self.lower_arith(builder, BinOp::Sub, lhs, rhs).map(Some),
            },
            Expr::If {
                cond,
                then_body,
                else_body,
            } => {
                self.lower_if(builder, cond, then_body, else_body)?;
                Ok(None)
            }
            Expr::For {
                init,
                cond,
                step,
                body,
            } => {
                self.lower_for(builder, init, cond, step.as_deref(), body)?;
                Ok(Some(Value::Const(0)))
            }
        }
    }

    /// The stored value doubles as the value of the assignment itself.
    fn lower_assign(
        &mut self,
        builder: &mut FunctionBuilder,
        target: &Expr,
        value: &Expr,
    ) -> Result<Value, CompileError> {
        let Expr::Variable(name) = target else {
            return Err(CompileError::InvalidAssignmentTarget);
        };
        let value = self.lower_value(builder, value)?;
        let slot = self.slot_for(builder, name)?;
        builder.add_instruction(Instruction::Store { slot, value })?;
        Ok(value)
    }

    /// Operands are evaluated left before right.
    fn lower_arith(
        &mut self,
        builder: &mut FunctionBuilder,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<Value, CompileError> {
        let lhs = self.lower_value(builder, lhs)?;
        let rhs = self.lower_value(builder, rhs)?;
        let dest = builder.next_value();
        builder.add_instruction(Instruction::Binary { dest, op, lhs, rhs })?;
        Ok(Value::Temp(dest))
    }

    fn lower_value(
        &mut self,
        builder: &mut FunctionBuilder,
        expr: &Expr,
    ) -> Result<Value, CompileError> {
        self.lower_expr(builder, expr)?
            .ok_or(CompileError::ExpectedValue("an if statement"))
    }

    fn lower_if(
        &mut self,
        builder: &mut FunctionBuilder,
        cond: &Expr,
        then_body: &[Expr],
        else_body: &[Expr],
    ) -> Result<(), CompileError> {
        let cond = self.lower_truthiness(builder, cond)?;

        let then_block = builder.create_block("then");
        let else_block = builder.create_block("else");
        let merge_block = builder.create_block("ifcont");
        builder.set_terminator(Terminator::CondBranch {
            cond,
            then_block,
            else_block,
        })?;

        builder.switch_to_block(then_block);
        for stmt in then_body {
            self.lower_expr(builder, stmt)?;
        }
        builder.set_terminator(Terminator::Branch(merge_block))?;

        builder.switch_to_block(else_block);
        for stmt in else_body {
            self.lower_expr(builder, stmt)?;
        }
        builder.set_terminator(Terminator::Branch(merge_block))?;

        builder.switch_to_block(merge_block);
        Ok(())
    }

    /// The condition is tested after the body and step, so the body always
    /// runs at least once.
    fn lower_for(
        &mut self,
        builder: &mut FunctionBuilder,
        init: &Expr,
        cond: &Expr,
        step: Option<&Expr>,
        body: &[Expr],
    ) -> Result<(), CompileError> {
        self.lower_expr(builder, init)?;

        let loop_block = builder.create_block("loop");
        let after_block = builder.create_block("afterloop");
        builder.set_terminator(Terminator::Branch(loop_block))?;

        builder.switch_to_block(loop_block);
        for stmt in body {
            self.lower_expr(builder, stmt)?;
        }
        if let Some(step) = step {
            self.lower_expr(builder, step)?;
        }

        let cond = self.lower_truthiness(builder, cond)?;
        builder.set_terminator(Terminator::CondBranch {
            cond,
            then_block: loop_block,
            else_block: after_block,
        })?;

        builder.switch_to_block(after_block);
        Ok(())
    }

    /// Evaluate `cond` and compare it against zero.
    fn lower_truthiness(
        &mut self,
        builder: &mut FunctionBuilder,
        cond: &Expr,
    ) -> Result<Value, CompileError> {
        let value = self.lower_value(builder, cond)?;
        let dest = builder.next_value();
        builder.add_instruction(Instruction::CmpNe {
            dest,
            lhs: value,
            rhs: Value::Const(0),
        })?;
        Ok(Value::Temp(dest))
    }

    fn read_variable(
        &mut self,
        builder: &mut FunctionBuilder,
        name: &str,
    ) -> Result<Value, CompileError> {
        let slot = match self.symbols.get(name) {
            Some(slot) => *slot,
            None => {
                if self.options.undeclared == UndeclaredPolicy::Strict {
                    return Err(CompileError::UndeclaredVariable(name.to_string()));
                }
                self.note(DiagnosticKind::UndeclaredRead(name.to_string()));
                self.slot_for(builder, name)?
            }
        };

        let dest = builder.next_value();
        builder.add_instruction(Instruction::Load { dest, slot })?;
        Ok(Value::Temp(dest))
    }

    /// Look up the slot for `name`, creating it on first use.
    fn slot_for(&mut self, builder: &mut FunctionBuilder, name: &str) -> Result<SlotId, CompileError> {
        if let Some(slot) = self.symbols.get(name) {
            return Ok(*slot);
        }
        let slot = builder.create_slot(name)?;
        self.symbols.insert(name.to_string(), slot);
        Ok(slot)
    }

    fn note(&mut self, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            function: self.function_name.clone(),
            kind,
        };
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

impl Default for Lowering {
    fn default() -> Self {
        Self::new(LoweringOptions::default())
    }
}
