//! Textual IR dump in an LLVM-flavoured syntax.

use super::*;
use std::fmt;

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "define i32 @{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "i32 %{}", param)?;
        }
        writeln!(f, ") {{")?;

        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;
            for inst in &block.instructions {
                writeln!(f, "  {}", format_instruction(self, inst))?;
            }
            match &block.terminator {
                Some(term) => writeln!(f, "  {}", format_terminator(self, term))?,
                None => writeln!(f, "  ; <unterminated>")?,
            }
        }

        writeln!(f, "}}")
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => f.write_str("add"),
            BinOp::Sub => f.write_str("sub"),
        }
    }
}

/// Render an operand as it appears inside `func`.
pub fn format_value(func: &Function, value: Value) -> String {
    match value {
        Value::Const(v) => v.to_string(),
        Value::Param(index) => match func.params.get(index) {
            Some(name) => format!("%{}", name),
            None => format!("%arg{}", index),
        },
        Value::Temp(id) => format!("%{}", id.0),
    }
}

fn format_slot(func: &Function, slot: SlotId) -> String {
    match func.slots.get(slot.0) {
        Some(s) => format!("%{}.addr", s.name),
        None => format!("%slot{}", slot.0),
    }
}

fn format_label(func: &Function, block: BlockId) -> String {
    match func.blocks.get(block.0) {
        Some(b) => format!("%{}", b.label),
        None => format!("%bb{}", block.0),
    }
}

/// Render one instruction without indentation.
pub fn format_instruction(func: &Function, inst: &Instruction) -> String {
    match inst {
        Instruction::Alloca { slot } => format!("{} = alloca i32", format_slot(func, *slot)),
        Instruction::Store { slot, value } => format!(
            "store i32 {}, ptr {}",
            format_value(func, *value),
            format_slot(func, *slot)
        ),
        Instruction::Load { dest, slot } => format!(
            "%{} = load i32, ptr {}",
            dest.0,
            format_slot(func, *slot)
        ),
        Instruction::Binary { dest, op, lhs, rhs } => format!(
            "%{} = {} i32 {}, {}",
            dest.0,
            op,
            format_value(func, *lhs),
            format_value(func, *rhs)
        ),
        Instruction::CmpNe { dest, lhs, rhs } => format!(
            "%{} = icmp ne i32 {}, {}",
            dest.0,
            format_value(func, *lhs),
            format_value(func, *rhs)
        ),
    }
}

/// Render a block terminator without indentation.
pub fn format_terminator(func: &Function, term: &Terminator) -> String {
    match term {
        Terminator::Return(value) => format!("ret i32 {}", format_value(func, *value)),
        Terminator::Branch(target) => format!("br label {}", format_label(func, *target)),
        Terminator::CondBranch {
            cond,
            then_block,
            else_block,
        } => format!(
            "br i1 {}, label {}, label {}",
            format_value(func, *cond),
            format_label(func, *then_block),
            format_label(func, *else_block)
        ),
    }
}

/// Print IR to stdout
pub fn print_ir(module: &Module) {
    print!("{}", module);
}
