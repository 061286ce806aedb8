//! IR builder utilities
//!
//! Helpers for constructing IR programmatically

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::trace;

use super::*;

/// Misuse of the builder's insertion cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No block was selected with `switch_to_block`
    #[error("no insertion block selected")]
    NoInsertionBlock,
    /// A slot was requested before the entry block existed
    #[error("function has no entry block")]
    NoEntryBlock,
    /// The insertion block is already closed
    #[error("block '{0}' already has a terminator")]
    AlreadyTerminated(String),
}

/// IR builder for constructing modules
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    /// Create a new module builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            module: Module::new(name),
        }
    }

    /// Add a function to the module
    pub fn add_function(&mut self, func: Function) {
        self.module.functions.push(func);
    }

    /// Finish building and return the module
    pub fn build(self) -> Module {
        self.module
    }
}

/// IR builder for constructing functions
pub struct FunctionBuilder {
    function: Function,
    current_block: Option<BlockId>,
    label_counts: HashMap<String, usize>,
    /// Names already taken in the `%` namespace: parameters and labels.
    taken: HashSet<String>,
}

impl FunctionBuilder {
    /// Create a new function builder
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        let taken = params.iter().cloned().collect();
        Self {
            function: Function::new(name, params),
            current_block: None,
            label_counts: HashMap::new(),
            taken,
        }
    }

    /// Create a new basic block at the end of the layout.
    ///
    /// Repeated labels get a numeric suffix: `then`, `then1`, `then2`. A
    /// label never reuses a parameter name, since both print as `%name`.
    pub fn create_block(&mut self, label: &str) -> BlockId {
        let count = self.label_counts.entry(label.to_string()).or_insert(0);
        let unique = loop {
            let candidate = if *count == 0 {
                label.to_string()
            } else {
                format!("{}{}", label, count)
            };
            *count += 1;
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };
        self.taken.insert(unique.clone());

        trace!(label = %unique, "create block");
        self.function.blocks.push(BasicBlock::new(unique));
        BlockId(self.function.blocks.len() - 1)
    }

    /// Switch to a block
    pub fn switch_to_block(&mut self, block: BlockId) {
        self.current_block = Some(block);
    }

    /// Block that receives new instructions
    pub fn current_block(&self) -> Option<BlockId> {
        self.current_block
    }

    /// Whether `block` already has a terminator
    pub fn is_terminated(&self, block: BlockId) -> bool {
        self.function.blocks[block.0].is_terminated()
    }

    /// Add an instruction to the current block
    pub fn add_instruction(&mut self, inst: Instruction) -> Result<(), BuildError> {
        let block = self.open_block()?;
        self.function.blocks[block.0].instructions.push(inst);
        Ok(())
    }

    /// Set the terminator for the current block
    pub fn set_terminator(&mut self, term: Terminator) -> Result<(), BuildError> {
        let block = self.open_block()?;
        self.function.blocks[block.0].terminator = Some(term);
        Ok(())
    }

    /// Allocate a fresh temporary.
    pub fn next_value(&mut self) -> ValueId {
        let id = ValueId(self.function.value_count);
        self.function.value_count += 1;
        id
    }

    /// Declare a new storage slot.
    ///
    /// The `alloca` is placed in the entry block after any earlier ones, so
    /// every slot exists before the first instruction that could use it.
    pub fn create_slot(&mut self, name: &str) -> Result<SlotId, BuildError> {
        if self.function.blocks.is_empty() {
            return Err(BuildError::NoEntryBlock);
        }

        let slot = SlotId(self.function.slots.len());
        self.function.slots.push(Slot {
            name: name.to_string(),
        });
        self.function.blocks[Function::ENTRY.0]
            .instructions
            .insert(slot.0, Instruction::Alloca { slot });
        Ok(slot)
    }

    /// Finish building and return the function
    pub fn build(self) -> Function {
        self.function
    }

    fn open_block(&self) -> Result<BlockId, BuildError> {
        let block = self.current_block.ok_or(BuildError::NoInsertionBlock)?;
        let data = &self.function.blocks[block.0];
        if data.is_terminated() {
            return Err(BuildError::AlreadyTerminated(data.label.clone()));
        }
        Ok(block)
    }
}
