pub mod ast;
mod expr;

use thiserror::Error;
use tracing::debug;

use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;
use ast::{Expr, FunctionDef, Prototype};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unrecognized character '{0}'")]
    UnrecognizedCharacter(char),
    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: String },
}

impl ParseError {
    fn new(expected: impl Into<String>, token: &Token) -> Self {
        let expected = expected.into();
        let kind = match token.kind {
            TokenKind::Eof => ParseErrorKind::UnexpectedEof { expected },
            TokenKind::Error => ParseErrorKind::UnrecognizedCharacter(
                token
                    .text
                    .as_deref()
                    .and_then(|text| text.chars().next())
                    .unwrap_or('\0'),
            ),
            _ => ParseErrorKind::UnexpectedToken {
                expected,
                found: token.to_string(),
            },
        };
        Self {
            kind,
            line: token.line,
            column: token.column,
        }
    }
}

/// Recursive-descent parser holding exactly one token of lookahead.
pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self { lexer, current }
    }

    /// program := Identifier '(' params ')' '{' body Eof
    pub fn parse_program(&mut self) -> Result<FunctionDef, ParseError> {
        let name = self.consume_identifier("function name")?;
        self.consume(TokenKind::LParen, "'(' after function name")?;
        let params = self.parameters()?;
        self.consume(TokenKind::RParen, "')' after parameter list")?;
        self.consume(TokenKind::LBrace, "'{' before function body")?;
        let body = self.function_body()?;
        self.consume(TokenKind::Eof, "end of input after function body")?;

        debug!(function = %name, params = params.len(), statements = body.len(), "parsed function");
        Ok(FunctionDef {
            proto: Prototype { name, params },
            body,
        })
    }

    /// params := [ Identifier (',' Identifier)* ]
    fn parameters(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            params.push(self.consume_identifier("parameter name")?);
            if !self.matches(TokenKind::Comma) {
                return Ok(params);
            }
        }
    }

    /// body := stmt* 'return' expr '}'
    fn function_body(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut body = Vec::new();
        while !self.check(TokenKind::Return) {
            body.push(self.statement()?);
        }
        self.advance();
        body.push(self.expression()?);
        self.consume(TokenKind::RBrace, "'}' after return expression")?;
        Ok(body)
    }

    /// stmt := assign | if_stmt | for_stmt
    fn statement(&mut self) -> Result<Expr, ParseError> {
        match self.current.kind {
            TokenKind::Identifier => self.assignment(),
            TokenKind::If => self.if_statement(),
            TokenKind::For => self.for_statement(),
            _ => Err(self.error("assignment, 'if', 'for' or 'return'")),
        }
    }

    /// if_stmt := 'if' '(' expr ')' '{' assign* '}' 'else' '{' assign* '}'
    fn if_statement(&mut self) -> Result<Expr, ParseError> {
        self.consume(TokenKind::If, "'if'")?;
        self.consume(TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RParen, "')' after if condition")?;
        let then_body = self.assignment_block()?;
        self.consume(TokenKind::Else, "'else' after if body")?;
        let else_body = self.assignment_block()?;

        Ok(Expr::If {
            cond: Box::new(cond),
            then_body,
            else_body,
        })
    }

    /// for_stmt := 'for' '(' assign ',' expr ',' assign ')' '{' assign* '}'
    fn for_statement(&mut self) -> Result<Expr, ParseError> {
        self.consume(TokenKind::For, "'for'")?;
        self.consume(TokenKind::LParen, "'(' after 'for'")?;
        let init = self.assignment()?;
        self.consume(TokenKind::Comma, "',' after loop initializer")?;
        let cond = self.expression()?;
        self.consume(TokenKind::Comma, "',' after loop condition")?;
        let step = self.assignment()?;
        self.consume(TokenKind::RParen, "')' after loop step")?;
        let body = self.assignment_block()?;

        Ok(Expr::For {
            init: Box::new(init),
            cond: Box::new(cond),
            step: Some(Box::new(step)),
            body,
        })
    }

    /// '{' assign* '}'
    fn assignment_block(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.consume(TokenKind::LBrace, "'{'")?;
        let mut body = Vec::new();
        while !self.check(TokenKind::RBrace) {
            body.push(self.assignment()?);
        }
        self.advance();
        Ok(body)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    pub(crate) fn consume_identifier(&mut self, expected: &str) -> Result<String, ParseError> {
        let token = self.consume(TokenKind::Identifier, expected)?;
        Ok(token.text.unwrap_or_default())
    }

    /// Replace the lookahead with the next token and hand back the old one.
    pub(crate) fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    pub(crate) fn current(&self) -> &Token {
        &self.current
    }

    pub(crate) fn error(&self, expected: &str) -> ParseError {
        ParseError::new(expected, &self.current)
    }
}
