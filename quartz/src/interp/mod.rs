//! Reference interpreter for quartz IR.
//!
//! Executes a [`Function`] directly, block by block. Arithmetic wraps at 32
//! bits, comparisons produce 0 or 1, and a conditional branch is taken when
//! its condition is nonzero. A fuel budget stops programs that never return.

use thiserror::Error;
use tracing::trace;

use crate::ir::{BinOp, Function, Instruction, Terminator, Value};

/// Default instruction budget for [`Interpreter::run`].
pub const DEFAULT_FUEL: u64 = 1_000_000;

/// Runtime failures of the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// Wrong number of arguments
    #[error("function '{name}' expects {expected} argument(s), got {given}")]
    Arity {
        /// Function name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        given: usize,
    },
    /// Load from a slot no store has reached yet
    #[error("variable '{0}' is read before it is assigned")]
    UninitializedSlot(String),
    /// The program did not return within the budget
    #[error("execution did not finish within {0} steps")]
    FuelExhausted(u64),
    /// Control reached a block without a terminator
    #[error("block '{0}' has no terminator")]
    Unterminated(String),
    /// Branch to a block that does not exist
    #[error("branch to unknown block #{0}")]
    UnknownBlock(usize),
    /// Use of a temporary that has not been computed
    #[error("temporary %{0} has no value")]
    UndefinedValue(usize),
    /// Reference to a parameter index past the argument list
    #[error("parameter #{0} out of range")]
    UnknownParam(usize),
    /// Reference to a slot that does not exist
    #[error("unknown slot #{0}")]
    UnknownSlot(usize),
}

/// Executes quartz functions.
#[derive(Debug, Clone)]
pub struct Interpreter {
    fuel: u64,
}

struct Frame<'a> {
    args: &'a [i32],
    slots: Vec<Option<i32>>,
    temps: Vec<Option<i32>>,
}

impl Interpreter {
    /// Create an interpreter with [`DEFAULT_FUEL`].
    pub fn new() -> Self {
        Self { fuel: DEFAULT_FUEL }
    }

    /// Set the maximum number of instructions and terminators executed.
    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = fuel;
        self
    }

    /// Call `func` with `args` and return its result.
    pub fn run(&self, func: &Function, args: &[i32]) -> Result<i32, ExecError> {
        if args.len() != func.params.len() {
            return Err(ExecError::Arity {
                name: func.name.clone(),
                expected: func.params.len(),
                given: args.len(),
            });
        }

        let mut frame = Frame {
            args,
            slots: vec![None; func.slots.len()],
            temps: vec![None; func.value_count],
        };
        let mut remaining = self.fuel;
        let mut current = Function::ENTRY;

        loop {
            let block = func
                .blocks
                .get(current.0)
                .ok_or(ExecError::UnknownBlock(current.0))?;
            trace!(block = %block.label, "enter block");

            for inst in &block.instructions {
                spend(&mut remaining, self.fuel)?;
                frame.execute(func, inst)?;
            }

            spend(&mut remaining, self.fuel)?;
            let term = block
                .terminator
                .as_ref()
                .ok_or_else(|| ExecError::Unterminated(block.label.clone()))?;
            current = match term {
                Terminator::Return(value) => return frame.operand(*value),
                Terminator::Branch(target) => *target,
                Terminator::CondBranch {
                    cond,
                    then_block,
                    else_block,
                } => {
                    if frame.operand(*cond)? != 0 {
                        *then_block
                    } else {
                        *else_block
                    }
                }
            };
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn spend(remaining: &mut u64, budget: u64) -> Result<(), ExecError> {
    if *remaining == 0 {
        return Err(ExecError::FuelExhausted(budget));
    }
    *remaining -= 1;
    Ok(())
}

impl Frame<'_> {
    fn execute(&mut self, func: &Function, inst: &Instruction) -> Result<(), ExecError> {
        match inst {
            Instruction::Alloca { slot } => {
                self.slot_mut(slot.0)?;
            }
            Instruction::Store { slot, value } => {
                let value = self.operand(*value)?;
                *self.slot_mut(slot.0)? = Some(value);
            }
            Instruction::Load { dest, slot } => {
                let value = (*self.slot_mut(slot.0)?)
                    .ok_or_else(|| ExecError::UninitializedSlot(func.slot(*slot).name.clone()))?;
                self.define(dest.0, value)?;
            }
            Instruction::Binary { dest, op, lhs, rhs } => {
                let lhs = self.operand(*lhs)?;
                let rhs = self.operand(*rhs)?;
                let value = match op {
                    BinOp::Add => lhs.wrapping_add(rhs),
                    BinOp::Sub => lhs.wrapping_sub(rhs),
                };
                self.define(dest.0, value)?;
            }
            Instruction::CmpNe { dest, lhs, rhs } => {
                let value = i32::from(self.operand(*lhs)? != self.operand(*rhs)?);
                self.define(dest.0, value)?;
            }
        }
        Ok(())
    }

    fn operand(&self, value: Value) -> Result<i32, ExecError> {
        match value {
            Value::Const(v) => Ok(v),
            Value::Param(index) => self
                .args
                .get(index)
                .copied()
                .ok_or(ExecError::UnknownParam(index)),
            Value::Temp(id) => self
                .temps
                .get(id.0)
                .copied()
                .flatten()
                .ok_or(ExecError::UndefinedValue(id.0)),
        }
    }

    fn define(&mut self, index: usize, value: i32) -> Result<(), ExecError> {
        let temp = self
            .temps
            .get_mut(index)
            .ok_or(ExecError::UndefinedValue(index))?;
        *temp = Some(value);
        Ok(())
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Option<i32>, ExecError> {
        self.slots.get_mut(index).ok_or(ExecError::UnknownSlot(index))
    }
}

/// Convenience wrapper around [`Interpreter::run`] with the default budget.
pub fn run(func: &Function, args: &[i32]) -> Result<i32, ExecError> {
    Interpreter::new().run(func, args)
}

