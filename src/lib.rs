pub mod errors;
pub mod lexer;
pub mod parser;

use parser::ast::FunctionDef;
use parser::{ParseError, Parser};

/// Parse a complete single-function program.
pub fn parse(source: &str) -> Result<FunctionDef, ParseError> {
    Parser::new(source).parse_program()
}
