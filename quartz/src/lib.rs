//! Quartz - control-flow-graph backend for mica
//!
//! Quartz lowers a parsed mica function into a small LLVM-flavoured IR made
//! of basic blocks, explicit terminators and stack slots for every variable.
//! The IR can be printed, exported as a Graphviz CFG, or executed by the
//! reference interpreter in [`interp`].

#![warn(missing_docs)]

pub mod codegen;
pub mod interp;
pub mod ir;

use mica::parser::ast::FunctionDef;
use mica::parser::ParseError;
use thiserror::Error;

use codegen::{Compilation, LoweringOptions, MissingReturnPolicy, UndeclaredPolicy};

/// Quartz compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main compiler interface
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    /// Options forwarded to the code generator
    pub options: LoweringOptions,
}

impl Compiler {
    /// Create a new compiler with default (permissive) settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject reads of variables that were never assigned, and bodies with
    /// no return value, instead of papering over them.
    pub fn strict(mut self, strict: bool) -> Self {
        if strict {
            self.options.undeclared = UndeclaredPolicy::Strict;
            self.options.missing_return = MissingReturnPolicy::Reject;
        } else {
            self.options.undeclared = UndeclaredPolicy::Permissive;
            self.options.missing_return = MissingReturnPolicy::ReturnZero;
        }
        self
    }

    /// Compile mica source text into a verified IR module.
    pub fn compile_source(&self, source: &str, module_name: &str) -> Result<ir::Module, CompileError> {
        let function = mica::parse(source)?;
        self.compile_function(&function, module_name)
    }

    /// Compile a parsed function into a verified IR module.
    pub fn compile_function(
        &self,
        function: &FunctionDef,
        module_name: &str,
    ) -> Result<ir::Module, CompileError> {
        let generator = codegen::CodeGenerator::new(self.options.clone());
        generator.compile(function, module_name)
    }

    /// Like [`Compiler::compile_source`], but also returns the diagnostics
    /// raised in permissive mode.
    pub fn compile_with_diagnostics(
        &self,
        source: &str,
        module_name: &str,
    ) -> Result<Compilation, CompileError> {
        let function = mica::parse(source)?;
        codegen::CodeGenerator::new(self.options.clone()).generate(&function, module_name)
    }
}

/// Compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Lexing or parsing failed
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The left-hand side of an assignment is not a plain variable
    #[error("left-hand side of assignment must be a variable")]
    InvalidAssignmentTarget,
    /// A variable was read before any assignment, in strict mode
    #[error("use of undeclared variable '{0}'")]
    UndeclaredVariable(String),
    /// A node that yields no value was used where one is required
    #[error("{0} does not produce a value")]
    ExpectedValue(&'static str),
    /// The function body produced no return value, in strict mode
    #[error("function '{0}' has no return value")]
    MissingReturnValue(String),
    /// Internal misuse of the IR builder
    #[error("IR builder error: {0}")]
    Builder(#[from] ir::builder::BuildError),
    /// IR validation failed
    #[error("invalid IR: {0}")]
    InvalidIr(#[from] ir::verify::VerifyError),
}
