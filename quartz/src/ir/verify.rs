//! Structural well-formedness checks for generated functions.

use thiserror::Error;

use super::*;

/// A structural defect in a generated function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The function has no blocks at all
    #[error("function '{0}' has no blocks")]
    NoBlocks(String),
    /// A block is missing its terminator
    #[error("block '{0}' has no terminator")]
    Unterminated(String),
    /// A terminator targets a block outside the arena
    #[error("block '{block}' branches to unknown block #{target}")]
    UnknownBlock {
        /// Label of the branching block
        block: String,
        /// Out-of-range target index
        target: usize,
    },
    /// An instruction names a slot outside the arena
    #[error("block '{block}' references unknown slot #{slot}")]
    UnknownSlot {
        /// Label of the offending block
        block: String,
        /// Out-of-range slot index
        slot: usize,
    },
    /// A slot is used without an `alloca` in the entry block
    #[error("slot '{0}' is used but never allocated in the entry block")]
    MissingAlloca(String),
    /// An `alloca` appears outside the entry block
    #[error("block '{block}' allocates slot '{slot}' outside the entry block")]
    MisplacedAlloca {
        /// Label of the offending block
        block: String,
        /// Name of the slot
        slot: String,
    },
    /// A `Param` operand indexes past the parameter list
    #[error("block '{block}' reads parameter #{index} of a {arity}-parameter function")]
    UnknownParam {
        /// Label of the offending block
        block: String,
        /// Parameter index used
        index: usize,
        /// Number of declared parameters
        arity: usize,
    },
    /// Two instructions define the same temporary
    #[error("temporary %{0} is defined more than once")]
    Redefined(usize),
    /// A temporary is used but no instruction defines it
    #[error("temporary %{0} is used but never defined")]
    Undefined(usize),
}

/// Check that `func` is complete: every block terminated, every handle in
/// range, every slot allocated once in the entry block, every temporary
/// defined exactly once.
pub fn verify_function(func: &Function) -> Result<(), VerifyError> {
    if func.blocks.is_empty() {
        return Err(VerifyError::NoBlocks(func.name.clone()));
    }

    let mut allocated = vec![false; func.slots.len()];
    let mut defined = vec![false; func.value_count];

    for (index, block) in func.blocks.iter().enumerate() {
        for inst in &block.instructions {
            if let Some(slot) = inst.slot() {
                if slot.0 >= func.slots.len() {
                    return Err(VerifyError::UnknownSlot {
                        block: block.label.clone(),
                        slot: slot.0,
                    });
                }
                if let Instruction::Alloca { .. } = inst {
                    if index != Function::ENTRY.0 {
                        return Err(VerifyError::MisplacedAlloca {
                            block: block.label.clone(),
                            slot: func.slots[slot.0].name.clone(),
                        });
                    }
                    allocated[slot.0] = true;
                }
            }

            if let Some(dest) = inst.dest() {
                match defined.get_mut(dest.0) {
                    Some(seen) if *seen => return Err(VerifyError::Redefined(dest.0)),
                    Some(seen) => *seen = true,
                    None => return Err(VerifyError::Undefined(dest.0)),
                }
            }
        }

        match &block.terminator {
            None => return Err(VerifyError::Unterminated(block.label.clone())),
            Some(term) => {
                for target in term.successors() {
                    if target.0 >= func.blocks.len() {
                        return Err(VerifyError::UnknownBlock {
                            block: block.label.clone(),
                            target: target.0,
                        });
                    }
                }
            }
        }
    }

    for block in &func.blocks {
        for inst in &block.instructions {
            if let Some(slot) = inst.slot() {
                if !allocated[slot.0] {
                    return Err(VerifyError::MissingAlloca(func.slots[slot.0].name.clone()));
                }
            }
            for operand in inst.operands() {
                check_operand(func, block, &defined, operand)?;
            }
        }
        if let Some(term) = &block.terminator {
            let operand = match term {
                Terminator::Return(value) => Some(*value),
                Terminator::CondBranch { cond, .. } => Some(*cond),
                Terminator::Branch(_) => None,
            };
            if let Some(operand) = operand {
                check_operand(func, block, &defined, operand)?;
            }
        }
    }

    Ok(())
}

fn check_operand(
    func: &Function,
    block: &BasicBlock,
    defined: &[bool],
    value: Value,
) -> Result<(), VerifyError> {
    match value {
        Value::Const(_) => Ok(()),
        Value::Param(index) if index < func.params.len() => Ok(()),
        Value::Param(index) => Err(VerifyError::UnknownParam {
            block: block.label.clone(),
            index,
            arity: func.params.len(),
        }),
        Value::Temp(id) if defined.get(id.0).copied().unwrap_or(false) => Ok(()),
        Value::Temp(id) => Err(VerifyError::Undefined(id.0)),
    }
}
