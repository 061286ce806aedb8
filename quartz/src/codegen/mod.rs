//! Code generation orchestration
//!
//! AST -> IR lowering plus the knobs that control how forgiving it is.

pub mod lowering;

use std::fmt;

use crate::ir::Module;
use crate::CompileError;
use mica::parser::ast::FunctionDef;

/// What to do when a variable is read before anything was stored to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndeclaredPolicy {
    /// Create the slot on the fly, load from it, and record a diagnostic.
    #[default]
    Permissive,
    /// Fail generation with [`CompileError::UndeclaredVariable`].
    Strict,
}

/// What to do when a function body ends without producing a value.
///
/// The parser always ends a body with the `return` expression, so this only
/// matters for hand-built trees whose last node is an `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingReturnPolicy {
    /// Emit `ret i32 0` and record a diagnostic.
    #[default]
    ReturnZero,
    /// Fail generation with [`CompileError::MissingReturnValue`].
    Reject,
}

/// Settings for [`lowering::Lowering`].
#[derive(Debug, Clone, Default)]
pub struct LoweringOptions {
    /// Handling of reads of never-assigned variables
    pub undeclared: UndeclaredPolicy,
    /// Handling of a body with no return value
    pub missing_return: MissingReturnPolicy,
}

/// Generated module together with the notes recorded while lowering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    /// The verified module
    pub module: Module,
    /// Non-fatal diagnostics, in the order they were raised
    pub diagnostics: Vec<Diagnostic>,
}

/// A non-fatal note produced while lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Function being generated when the note was recorded
    pub function: String,
    /// What happened
    pub kind: DiagnosticKind,
}

/// Kinds of [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A variable was read before it was ever assigned
    UndeclaredRead(String),
    /// The body produced no value, so `ret i32 0` was emitted
    ImplicitReturn,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UndeclaredRead(name) => write!(
                f,
                "in '{}': variable '{}' is read before it is assigned",
                self.function, name
            ),
            DiagnosticKind::ImplicitReturn => write!(
                f,
                "in '{}': body has no return value, returning 0",
                self.function
            ),
        }
    }
}

/// Main codegen entry point.
pub struct CodeGenerator {
    /// Options forwarded to each lowering run.
    pub options: LoweringOptions,
}

impl CodeGenerator {
    /// Create a new code generator.
    pub fn new(options: LoweringOptions) -> Self {
        Self { options }
    }

    /// Compile AST to IR.
    pub fn compile(&self, ast: &FunctionDef, module_name: &str) -> Result<Module, CompileError> {
        self.generate(ast, module_name)
            .map(|compilation| compilation.module)
    }

    /// Compile AST to IR and keep the diagnostics recorded along the way.
    pub fn generate(
        &self,
        ast: &FunctionDef,
        module_name: &str,
    ) -> Result<Compilation, CompileError> {
        let mut lowering = lowering::Lowering::new(self.options.clone());
        let module = lowering.lower_program(ast, module_name)?;
        Ok(Compilation {
            module,
            diagnostics: lowering.into_diagnostics(),
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(LoweringOptions::default())
    }
}
