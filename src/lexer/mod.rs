pub mod token;

use token::{Token, TokenKind};
use tracing::trace;

/// Lex the whole source up front. The returned vector always ends with a
/// single `Eof` token.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.is_eof();
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

/// Pull-based scanner over a source buffer.
///
/// The cursor only moves forward. Once the end of the buffer is reached every
/// further call to [`Lexer::next_token`] yields `Eof` again.
pub struct Lexer {
    chars: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
    token_line: usize,
    token_column: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start_token();

        if self.is_at_end() {
            return self.make(TokenKind::Eof);
        }

        let c = self.advance();
        let token = match c {
            '(' => self.make(TokenKind::LParen),
            ')' => self.make(TokenKind::RParen),
            '{' => self.make(TokenKind::LBrace),
            '}' => self.make(TokenKind::RBrace),
            ',' => self.make(TokenKind::Comma),
            '=' => self.make(TokenKind::Assign),
            '+' => self.make(TokenKind::Plus),
            '-' => self.make(TokenKind::Minus),
            d if d.is_ascii_digit() => self.number(d),
            a if a.is_ascii_alphabetic() => self.identifier(a),
            other => self.make(TokenKind::Error).with_text(other),
        };

        trace!(kind = ?token.kind, line = token.line, column = token.column, "token");
        token
    }

    fn number(&mut self, first: char) -> Token {
        // Values past u32::MAX wrap; the result is reinterpreted as i32.
        let mut value = digit_value(first);
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let d = digit_value(self.advance());
            value = value.wrapping_mul(10).wrapping_add(d);
        }
        self.make(TokenKind::Number).with_number(value as i32)
    }

    fn identifier(&mut self, first: char) -> Token {
        let mut lexeme = String::from(first);
        while let Some(c) = self.peek().filter(char::is_ascii_alphanumeric) {
            lexeme.push(c);
            self.advance();
        }

        let kind = match lexeme.as_str() {
            "if" => TokenKind::If,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "else" => TokenKind::Else,
            _ => TokenKind::Identifier,
        };

        self.make(kind).with_text(lexeme)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.token_line, self.token_column)
    }

    fn start_token(&mut self) {
        self.token_line = self.line;
        self.token_column = self.column;
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.current).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.is_eof();
        Some(token)
    }
}

fn digit_value(c: char) -> u32 {
    c.to_digit(10).unwrap_or(0)
}
