//! Unit tests for the lexer: token shapes, mode transitions, encoding
//! handling and recovery behavior.

use crate::diagnostics::diagnostics::{DiagnosticCode, DiagnosticList, Severity};
use crate::encoding::encoding::BINARY;
use crate::lexer::lexer::Lexer;
use crate::lexer::tokens::{Token, TokenKind};

fn lex(source: &[u8]) -> (Vec<Token>, DiagnosticList) {
    let mut lexer = Lexer::new(source);
    let mut diagnostics = DiagnosticList::new();
    let mut tokens = vec![];

    loop {
        let token = lexer.next_token(&mut diagnostics);
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }

    (tokens, diagnostics)
}

fn kinds(source: &[u8]) -> Vec<TokenKind> {
    lex(source).0.iter().map(|token| token.kind).collect()
}

#[test]
fn test_operators_and_punctuation() {
    assert_eq!(
        kinds(b"x = 1 + 2 * 3"),
        vec![
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::Integer,
            TokenKind::Plus,
            TokenKind::Integer,
            TokenKind::Star,
            TokenKind::Integer,
            TokenKind::Eof,
        ]
    );

    assert_eq!(
        kinds(b"a == b != c <= d >= e && f || g ** h"),
        vec![
            TokenKind::Identifier,
            TokenKind::EqualEqual,
            TokenKind::Identifier,
            TokenKind::BangEqual,
            TokenKind::Identifier,
            TokenKind::LessEqual,
            TokenKind::Identifier,
            TokenKind::GreaterEqual,
            TokenKind::Identifier,
            TokenKind::AmpersandAmpersand,
            TokenKind::Identifier,
            TokenKind::PipePipe,
            TokenKind::Identifier,
            TokenKind::StarStar,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keywords_are_reserved() {
    assert_eq!(
        kinds(b"def end if elsif else then while return break nil true false"),
        vec![
            TokenKind::KeywordDef,
            TokenKind::KeywordEnd,
            TokenKind::KeywordIf,
            TokenKind::KeywordElsif,
            TokenKind::KeywordElse,
            TokenKind::KeywordThen,
            TokenKind::KeywordWhile,
            TokenKind::KeywordReturn,
            TokenKind::KeywordBreak,
            TokenKind::KeywordNil,
            TokenKind::KeywordTrue,
            TokenKind::KeywordFalse,
            TokenKind::Eof,
        ]
    );

    // Keyword prefixes stay plain identifiers.
    assert_eq!(
        kinds(b"definition ended"),
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn test_numeric_literals() {
    assert_eq!(
        kinds(b"42 1_000 3.14 1e5 2.5e-3"),
        vec![
            TokenKind::Integer,
            TokenKind::Integer,
            TokenKind::Float,
            TokenKind::Float,
            TokenKind::Float,
            TokenKind::Eof,
        ]
    );

    // A trailing dot is a method call, not a float.
    assert_eq!(
        kinds(b"1.floor"),
        vec![
            TokenKind::Integer,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_newlines_and_comments() {
    let (tokens, diagnostics) = lex(b"a # trailing comment\nb\n");

    assert!(diagnostics.is_empty());
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );

    assert!(tokens[0].line_start);
    assert!(!tokens[1].line_start);
    assert!(tokens[2].line_start);
}

#[test]
fn test_interpolated_string() {
    let (tokens, diagnostics) = lex(b"\"a#{b}c\"");

    assert!(diagnostics.is_empty());
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::StringBegin,
            TokenKind::StringContent,
            TokenKind::EmbexprBegin,
            TokenKind::Identifier,
            TokenKind::EmbexprEnd,
            TokenKind::StringContent,
            TokenKind::StringEnd,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_single_quotes_do_not_interpolate() {
    assert_eq!(
        kinds(b"'a#{b}c'"),
        vec![
            TokenKind::StringBegin,
            TokenKind::StringContent,
            TokenKind::StringEnd,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_braces_nest_inside_interpolation() {
    // The hash braces inside the interpolation must not close it.
    assert_eq!(
        kinds(b"\"#{ {1 => 2} }\""),
        vec![
            TokenKind::StringBegin,
            TokenKind::EmbexprBegin,
            TokenKind::BraceLeft,
            TokenKind::Integer,
            TokenKind::EqualGreater,
            TokenKind::Integer,
            TokenKind::BraceRight,
            TokenKind::EmbexprEnd,
            TokenKind::StringEnd,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_escaped_terminator_stays_in_content() {
    let (tokens, diagnostics) = lex(b"\"a\\\"b\"");

    assert!(diagnostics.is_empty());
    assert_eq!(tokens[1].kind, TokenKind::StringContent);
    assert_eq!(tokens[1].location.len(), 4); // a \ " b
    assert_eq!(tokens[2].kind, TokenKind::StringEnd);
}

#[test]
fn test_regexp_at_expression_start() {
    let (tokens, diagnostics) = lex(b"x = /ab/i");

    assert!(diagnostics.is_empty());
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::RegexpBegin,
            TokenKind::StringContent,
            TokenKind::RegexpEnd,
            TokenKind::Eof,
        ]
    );

    // The closing token swallows the flags.
    assert_eq!(tokens[4].location.len(), 2);
}

#[test]
fn test_slash_after_value_is_division() {
    let (tokens, diagnostics) = lex(b"x / 2");

    assert!(diagnostics.is_empty());
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier,
            TokenKind::Slash,
            TokenKind::Integer,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_ambiguous_slash_warns_and_lexes_regexp() {
    let (tokens, diagnostics) = lex(b"foo /bar/");

    assert_eq!(tokens[1].kind, TokenKind::RegexpBegin);
    assert_eq!(diagnostics.len(), 1);

    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code, DiagnosticCode::AmbiguousSlash);
    assert_eq!(diagnostic.severity, Severity::Warning);
}

#[test]
fn test_heredoc_body_and_terminator() {
    let source = b"x = <<DOC\nhello\nDOC\n";
    let (tokens, diagnostics) = lex(source);

    assert!(diagnostics.is_empty());
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::HeredocBegin,
            TokenKind::StringContent,
            TokenKind::HeredocEnd,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );

    assert_eq!(tokens[3].location.slice(source), b"hello\n");
    assert_eq!(tokens[4].location.slice(source), b"DOC");
}

#[test]
fn test_squiggly_heredoc_accepts_indented_terminator() {
    let source = b"x = <<~DOC\n  hi\n  DOC\n";
    let (tokens, diagnostics) = lex(source);

    assert!(diagnostics.is_empty());
    assert_eq!(tokens[2].kind, TokenKind::HeredocBegin);
    assert_eq!(tokens[3].location.slice(source), b"  hi\n");
    assert_eq!(tokens[4].kind, TokenKind::HeredocEnd);
}

#[test]
fn test_double_less_after_value_is_shift() {
    assert_eq!(
        kinds(b"a << b"),
        vec![
            TokenKind::Identifier,
            TokenKind::LessLess,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_unterminated_string_synthesizes_end() {
    let (tokens, diagnostics) = lex(b"\"abc");

    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::StringBegin,
            TokenKind::StringContent,
            TokenKind::StringEnd,
            TokenKind::Eof,
        ]
    );

    // Exactly one record for the one unterminated literal.
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code, DiagnosticCode::UntermString);
    assert!(tokens[2].location.is_empty());
}

#[test]
fn test_unterminated_heredoc_synthesizes_end() {
    let (tokens, diagnostics) = lex(b"<<DOC\nhi");

    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::HeredocBegin,
            TokenKind::StringContent,
            TokenKind::HeredocEnd,
            TokenKind::Eof,
        ]
    );

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics.iter().next().unwrap().code,
        DiagnosticCode::UntermHeredoc
    );
}

#[test]
fn test_unterminated_interpolation_synthesizes_end() {
    let (tokens, diagnostics) = lex(b"\"a#{b");

    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::StringBegin,
            TokenKind::StringContent,
            TokenKind::EmbexprBegin,
            TokenKind::Identifier,
            TokenKind::EmbexprEnd,
            TokenKind::StringEnd,
            TokenKind::Eof,
        ]
    );

    // One record per unterminated construct, innermost first.
    let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![DiagnosticCode::UntermEmbexpr, DiagnosticCode::UntermString]
    );
}

#[test]
fn test_invalid_byte_is_reported_and_skipped() {
    let (tokens, diagnostics) = lex(b"x = \xFF 1\n");

    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::Integer,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code, DiagnosticCode::InvalidByte);
    assert_eq!(diagnostic.location.start, 4);
    assert_eq!(diagnostic.location.end, 5);
}

#[test]
fn test_magic_comment_switches_encoding() {
    let source = b"# coding: iso-8859-1\nx\xE9 = 1\n";
    let mut lexer = Lexer::new(source);
    let mut diagnostics = DiagnosticList::new();

    let mut tokens = vec![];
    loop {
        let token = lexer.next_token(&mut diagnostics);
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }

    assert!(diagnostics.is_empty());
    assert_eq!(lexer.encoding().name, "iso-8859-1");
    // The accented byte joins the identifier.
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].location.slice(source), b"x\xE9");
}

#[test]
fn test_editor_style_magic_comment() {
    let mut lexer = Lexer::new(b"# -*- coding: US-ASCII -*-\n1\n");
    let mut diagnostics = DiagnosticList::new();

    lexer.next_token(&mut diagnostics);
    assert_eq!(lexer.encoding().name, "ascii");
}

#[test]
fn test_magic_comment_on_second_line() {
    let mut lexer = Lexer::new(b"#!/usr/bin/env sable\n# coding: binary\nx = 1\n");
    let mut diagnostics = DiagnosticList::new();

    loop {
        if lexer.next_token(&mut diagnostics).kind == TokenKind::Eof {
            break;
        }
    }

    assert_eq!(lexer.encoding().name, "binary");
}

#[test]
fn test_magic_comment_after_code_is_ignored() {
    let mut lexer = Lexer::new(b"x = 1 # coding: binary\n");
    let mut diagnostics = DiagnosticList::new();

    loop {
        if lexer.next_token(&mut diagnostics).kind == TokenKind::Eof {
            break;
        }
    }

    assert_eq!(lexer.encoding().name, "utf-8");
}

#[test]
fn test_unknown_encoding_warns_and_keeps_default() {
    let mut lexer = Lexer::new(b"# coding: klingon-1\nx = 1\n");
    let mut diagnostics = DiagnosticList::new();

    loop {
        if lexer.next_token(&mut diagnostics).kind == TokenKind::Eof {
            break;
        }
    }

    assert_eq!(lexer.encoding().name, "utf-8");
    assert_eq!(diagnostics.len(), 1);

    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code, DiagnosticCode::UnknownEncoding);
    assert_eq!(diagnostic.severity, Severity::Warning);
}

#[test]
fn test_encoding_callback_resolves_unknown_names() {
    let mut lexer = Lexer::new(b"# coding: klingon-1\nx = 1\n");
    let mut diagnostics = DiagnosticList::new();

    lexer.register_encoding_callback(Box::new(|name| {
        if name == "klingon-1" {
            Some(BINARY)
        } else {
            None
        }
    }));

    lexer.next_token(&mut diagnostics);

    assert!(diagnostics.is_empty());
    assert_eq!(lexer.encoding().name, "binary");
}

#[test]
fn test_unrecognized_token_is_reported_and_skipped() {
    let (tokens, diagnostics) = lex(b"x ? 1");

    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![TokenKind::Identifier, TokenKind::Integer, TokenKind::Eof]
    );

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics.iter().next().unwrap().code,
        DiagnosticCode::UnrecognizedToken
    );
}

#[test]
fn test_token_name_strings() {
    assert_eq!(TokenKind::KeywordDef.name(), "KEYWORD_DEF");
    assert_eq!(TokenKind::EqualGreater.name(), "EQUAL_GREATER");
    assert_eq!(TokenKind::Missing.name(), "MISSING");
    assert_eq!(format!("{}", TokenKind::StarStar), "STAR_STAR");
}
