use crate::lexer::token::TokenKind;

use super::ast::{BinaryOp, Expr};
use super::{ParseError, Parser};

impl Parser {
    /// assign := Identifier '=' expr
    pub(crate) fn assignment(&mut self) -> Result<Expr, ParseError> {
        let name = self.consume_identifier("assignment target")?;
        self.consume(TokenKind::Assign, "'=' in assignment")?;
        let value = self.expression()?;
        Ok(Expr::assign(name, value))
    }

    /// expr := primary (('+'|'-') primary)*
    ///
    /// Folded left to right, so `a - b - c` parses as `(a - b) - c`.
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        loop {
            let op = if self.matches(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.matches(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };

            let rhs = self.primary()?;
            expr = Expr::binary(op, expr, rhs);
        }

        Ok(expr)
    }

    /// primary := Identifier | Number
    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind {
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expr::Variable(token.text.unwrap_or_default()))
            }
            TokenKind::Number => {
                let token = self.advance();
                Ok(Expr::Number(token.number.unwrap_or_default()))
            }
            _ => Err(self.error("variable or number")),
        }
    }
}
