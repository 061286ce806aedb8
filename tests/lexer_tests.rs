use mica::lexer::token::TokenKind;
use mica::lexer::{lex, Lexer};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_function_header() {
    let tokens = lex("f(a, b) {");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].text.as_deref(), Some("f"));
    assert_eq!(tokens[1].kind, TokenKind::LParen);
    assert_eq!(tokens[2].text.as_deref(), Some("a"));
    assert_eq!(tokens[3].kind, TokenKind::Comma);
    assert_eq!(tokens[4].text.as_deref(), Some("b"));
    assert_eq!(tokens[5].kind, TokenKind::RParen);
    assert_eq!(tokens[6].kind, TokenKind::LBrace);
    assert_eq!(tokens[7].kind, TokenKind::Eof);
}

#[test]
fn recognizes_keywords_case_sensitively() {
    assert_eq!(
        kinds("if for return else If FOR elsewhere"),
        vec![
            TokenKind::If,
            TokenKind::For,
            TokenKind::Return,
            TokenKind::Else,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_numbers_and_operators() {
    let tokens = lex("x=12+3-0");
    assert_eq!(tokens[1].kind, TokenKind::Assign);
    assert_eq!(tokens[2].kind, TokenKind::Number);
    assert_eq!(tokens[2].number, Some(12));
    assert_eq!(tokens[3].kind, TokenKind::Plus);
    assert_eq!(tokens[4].number, Some(3));
    assert_eq!(tokens[5].kind, TokenKind::Minus);
    assert_eq!(tokens[6].number, Some(0));
}

#[test]
fn identifiers_may_contain_digits_but_not_start_with_them() {
    let tokens = lex("x1 2y");
    assert_eq!(tokens[0].text.as_deref(), Some("x1"));
    assert_eq!(tokens[1].kind, TokenKind::Number);
    assert_eq!(tokens[1].number, Some(2));
    assert_eq!(tokens[2].text.as_deref(), Some("y"));
}

#[test]
fn unknown_character_yields_error_and_advances_one() {
    let tokens = lex("a;;b");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier,
            TokenKind::Error,
            TokenKind::Error,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[1].text.as_deref(), Some(";"));
}

#[test]
fn underscore_is_not_an_identifier_character() {
    assert_eq!(
        kinds("a_b"),
        vec![
            TokenKind::Identifier,
            TokenKind::Error,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn tracks_line_and_column() {
    let tokens = lex("f() {\n  return 1\n}");
    let ret = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Return)
        .expect("return token");
    assert_eq!((ret.line, ret.column), (2, 3));
}

#[test]
fn empty_source_is_just_eof() {
    let mut lexer = Lexer::new("   \n\t ");
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}
