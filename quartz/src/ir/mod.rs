//! Control-flow-graph intermediate representation.
//!
//! A [`Function`] owns an arena of [`BasicBlock`]s and an arena of storage
//! [`Slot`]s. Terminators refer to blocks by [`BlockId`], so a block can be
//! targeted before it has been filled in.

pub mod builder;
pub mod cfg;
pub mod printer;
pub mod verify;

/// A compiled module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Module name
    pub name: String,
    /// Functions defined in this module
    pub functions: Vec<Function>,
}

/// A function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Parameter names, in declaration order
    pub params: Vec<String>,
    /// Storage slots, indexed by [`SlotId`]
    pub slots: Vec<Slot>,
    /// Basic blocks, indexed by [`BlockId`]. The first block is the entry.
    pub blocks: Vec<BasicBlock>,
    /// Number of SSA temporaries defined by instructions
    pub value_count: usize,
}

/// Handle to a block in its function's block arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// Handle to an addressable per-variable storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// Handle to a temporary produced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

/// Storage for one named variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Source variable name
    pub name: String,
}

/// A basic block (straight-line code with no branches except at the end)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Block label, unique within the function
    pub label: String,
    /// Instructions in this block
    pub instructions: Vec<Instruction>,
    /// Block terminator. Only `None` while the block is under construction.
    pub terminator: Option<Terminator>,
}

/// IR instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Reserve a 32-bit storage slot
    Alloca {
        /// Slot being declared
        slot: SlotId,
    },
    /// Write a value into a slot
    Store {
        /// Destination slot
        slot: SlotId,
        /// Value written
        value: Value,
    },
    /// Read a slot into a fresh temporary
    Load {
        /// Temporary receiving the value
        dest: ValueId,
        /// Slot read from
        slot: SlotId,
    },
    /// Wrapping 32-bit arithmetic
    Binary {
        /// Temporary receiving the result
        dest: ValueId,
        /// Operation
        op: BinOp,
        /// Left operand
        lhs: Value,
        /// Right operand
        rhs: Value,
    },
    /// 1 if the operands differ, 0 otherwise
    CmpNe {
        /// Temporary receiving the 0/1 result
        dest: ValueId,
        /// Left operand
        lhs: Value,
        /// Right operand
        rhs: Value,
    },
}

/// Block terminator (control flow)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// Return from function
    Return(Value),
    /// Unconditional branch
    Branch(BlockId),
    /// Conditional branch, taken to `then_block` when `cond` is nonzero
    CondBranch {
        /// Branch condition
        cond: Value,
        /// Target when `cond` is nonzero
        then_block: BlockId,
        /// Target when `cond` is zero
        else_block: BlockId,
    },
}

/// Binary operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Wrapping addition
    Add,
    /// Wrapping subtraction
    Sub,
}

/// IR operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// 32-bit integer constant
    Const(i32),
    /// Incoming function argument, by position
    Param(usize),
    /// Result of an earlier instruction
    Temp(ValueId),
}

impl Module {
    /// Create a new empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl Function {
    /// Create a new function with no blocks
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
            slots: Vec::new(),
            blocks: Vec::new(),
            value_count: 0,
        }
    }

    /// The entry block is always the first one created.
    pub const ENTRY: BlockId = BlockId(0);

    /// Block data for `id`. Panics if `id` is out of range.
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    /// Slot data for `id`. Panics if `id` is out of range.
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.0]
    }

    /// All block handles in layout order
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len()).map(BlockId)
    }

    /// Find a block by its (unique) label
    pub fn block_by_label(&self, label: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|b| b.label == label)
            .map(BlockId)
    }

    /// Find the slot backing a variable
    pub fn slot_by_name(&self, name: &str) -> Option<SlotId> {
        self.slots.iter().position(|s| s.name == name).map(SlotId)
    }

    /// Every instruction of every block, in layout order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

impl BasicBlock {
    /// Create a new, unterminated basic block
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
            terminator: None,
        }
    }

    /// Whether the block already ends in a terminator
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

impl Instruction {
    /// The temporary defined by this instruction, if any.
    pub fn dest(&self) -> Option<ValueId> {
        match self {
            Instruction::Load { dest, .. }
            | Instruction::Binary { dest, .. }
            | Instruction::CmpNe { dest, .. } => Some(*dest),
            Instruction::Alloca { .. } | Instruction::Store { .. } => None,
        }
    }

    /// Operands read by this instruction.
    pub fn operands(&self) -> Vec<Value> {
        match self {
            Instruction::Store { value, .. } => vec![*value],
            Instruction::Binary { lhs, rhs, .. } | Instruction::CmpNe { lhs, rhs, .. } => {
                vec![*lhs, *rhs]
            }
            Instruction::Alloca { .. } | Instruction::Load { .. } => Vec::new(),
        }
    }

    /// The slot this instruction touches, if any.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            Instruction::Alloca { slot }
            | Instruction::Store { slot, .. }
            | Instruction::Load { slot, .. } => Some(*slot),
            Instruction::Binary { .. } | Instruction::CmpNe { .. } => None,
        }
    }
}

impl Terminator {
    /// Target blocks in branch order.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Return(_) => Vec::new(),
            Terminator::Branch(target) => vec![*target],
            Terminator::CondBranch {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
        }
    }
}
