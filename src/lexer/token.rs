use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    If,
    For,
    Return,
    Else,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Assign,
    Plus,
    Minus,
    Eof,
    Error,
}

impl TokenKind {
    /// Human-readable spelling used in parse diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::If => "'if'",
            TokenKind::For => "'for'",
            TokenKind::Return => "'return'",
            TokenKind::Else => "'else'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "unrecognized character",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Spelling of identifiers and keywords, or the offending character of an
    /// `Error` token.
    pub text: Option<String>,
    pub number: Option<i32>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: None,
            number: None,
            line,
            column,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_number(mut self, number: i32) -> Self {
        self.number = Some(number);
        self
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.text, self.number) {
            (TokenKind::Identifier, Some(text), _) => write!(f, "identifier '{}'", text),
            (TokenKind::Number, _, Some(number)) => write!(f, "number {}", number),
            (TokenKind::Error, Some(text), _) => write!(f, "unrecognized character '{}'", text),
            (kind, _, _) => write!(f, "{}", kind),
        }
    }
}
