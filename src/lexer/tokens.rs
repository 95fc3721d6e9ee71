use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Location;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("def", TokenKind::KeywordDef);
        map.insert("end", TokenKind::KeywordEnd);
        map.insert("if", TokenKind::KeywordIf);
        map.insert("elsif", TokenKind::KeywordElsif);
        map.insert("else", TokenKind::KeywordElse);
        map.insert("then", TokenKind::KeywordThen);
        map.insert("while", TokenKind::KeywordWhile);
        map.insert("return", TokenKind::KeywordReturn);
        map.insert("break", TokenKind::KeywordBreak);
        map.insert("nil", TokenKind::KeywordNil);
        map.insert("true", TokenKind::KeywordTrue);
        map.insert("false", TokenKind::KeywordFalse);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Eof,
    /// Synthesized by the parser when an expected token is absent. Never
    /// produced by scanning.
    Missing,
    Newline,
    Semicolon,

    Identifier,
    Integer,
    Float,

    StringBegin,
    StringContent,
    StringEnd,
    RegexpBegin,
    RegexpEnd,
    HeredocBegin,
    HeredocEnd,
    EmbexprBegin,
    EmbexprEnd,

    ParenLeft,
    ParenRight,
    BracketLeft,
    BracketRight,
    BraceLeft,
    BraceRight,

    Comma,
    Dot,

    Equal,        // =
    EqualEqual,   // ==
    EqualGreater, // =>
    Bang,         // !
    BangEqual,    // !=

    Less,
    LessEqual,
    LessLess,
    Greater,
    GreaterEqual,

    AmpersandAmpersand,
    PipePipe,

    Plus,
    PlusEqual,
    Minus,
    MinusEqual,
    Star,
    StarEqual,
    StarStar,
    Slash,
    SlashEqual,
    Percent,

    // Reserved
    KeywordDef,
    KeywordEnd,
    KeywordIf,
    KeywordElsif,
    KeywordElse,
    KeywordThen,
    KeywordWhile,
    KeywordReturn,
    KeywordBreak,
    KeywordNil,
    KeywordTrue,
    KeywordFalse,
}

impl TokenKind {
    /// Human-readable name for the token type, for tooling and debugging.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Missing => "MISSING",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Integer => "INTEGER",
            TokenKind::Float => "FLOAT",
            TokenKind::StringBegin => "STRING_BEGIN",
            TokenKind::StringContent => "STRING_CONTENT",
            TokenKind::StringEnd => "STRING_END",
            TokenKind::RegexpBegin => "REGEXP_BEGIN",
            TokenKind::RegexpEnd => "REGEXP_END",
            TokenKind::HeredocBegin => "HEREDOC_BEGIN",
            TokenKind::HeredocEnd => "HEREDOC_END",
            TokenKind::EmbexprBegin => "EMBEXPR_BEGIN",
            TokenKind::EmbexprEnd => "EMBEXPR_END",
            TokenKind::ParenLeft => "PAREN_LEFT",
            TokenKind::ParenRight => "PAREN_RIGHT",
            TokenKind::BracketLeft => "BRACKET_LEFT",
            TokenKind::BracketRight => "BRACKET_RIGHT",
            TokenKind::BraceLeft => "BRACE_LEFT",
            TokenKind::BraceRight => "BRACE_RIGHT",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::EqualGreater => "EQUAL_GREATER",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::LessLess => "LESS_LESS",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::AmpersandAmpersand => "AMPERSAND_AMPERSAND",
            TokenKind::PipePipe => "PIPE_PIPE",
            TokenKind::Plus => "PLUS",
            TokenKind::PlusEqual => "PLUS_EQUAL",
            TokenKind::Minus => "MINUS",
            TokenKind::MinusEqual => "MINUS_EQUAL",
            TokenKind::Star => "STAR",
            TokenKind::StarEqual => "STAR_EQUAL",
            TokenKind::StarStar => "STAR_STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::SlashEqual => "SLASH_EQUAL",
            TokenKind::Percent => "PERCENT",
            TokenKind::KeywordDef => "KEYWORD_DEF",
            TokenKind::KeywordEnd => "KEYWORD_END",
            TokenKind::KeywordIf => "KEYWORD_IF",
            TokenKind::KeywordElsif => "KEYWORD_ELSIF",
            TokenKind::KeywordElse => "KEYWORD_ELSE",
            TokenKind::KeywordThen => "KEYWORD_THEN",
            TokenKind::KeywordWhile => "KEYWORD_WHILE",
            TokenKind::KeywordReturn => "KEYWORD_RETURN",
            TokenKind::KeywordBreak => "KEYWORD_BREAK",
            TokenKind::KeywordNil => "KEYWORD_NIL",
            TokenKind::KeywordTrue => "KEYWORD_TRUE",
            TokenKind::KeywordFalse => "KEYWORD_FALSE",
        }
    }

    /// The fixed rule table for context-sensitive scanning: true if a token
    /// of this kind means the *next* lexeme sits in expression-start
    /// position. Drives regexp-vs-division and heredoc disambiguation with
    /// one token of lookback.
    pub fn begins_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Eof
                | TokenKind::Missing
                | TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::ParenLeft
                | TokenKind::BracketLeft
                | TokenKind::BraceLeft
                | TokenKind::Comma
                | TokenKind::EmbexprBegin
                | TokenKind::Equal
                | TokenKind::EqualEqual
                | TokenKind::EqualGreater
                | TokenKind::Bang
                | TokenKind::BangEqual
                | TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::LessLess
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::AmpersandAmpersand
                | TokenKind::PipePipe
                | TokenKind::Plus
                | TokenKind::PlusEqual
                | TokenKind::Minus
                | TokenKind::MinusEqual
                | TokenKind::Star
                | TokenKind::StarEqual
                | TokenKind::StarStar
                | TokenKind::Slash
                | TokenKind::SlashEqual
                | TokenKind::Percent
                | TokenKind::KeywordIf
                | TokenKind::KeywordElsif
                | TokenKind::KeywordThen
                | TokenKind::KeywordWhile
                | TokenKind::KeywordReturn
                | TokenKind::KeywordBreak
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single token: a kind, a byte range into the source buffer, and two
/// context flags. Tokens never carry a copy of the text they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
    /// Whitespace (or a comment) immediately preceded this token.
    pub space_before: bool,
    /// This token is the first on its line.
    pub line_start: bool,
}

impl Token {
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Token {
            kind,
            location,
            space_before: false,
            line_start: false,
        }
    }

    /// A zero-width missing token synthesized at the given offset.
    pub fn missing(offset: u32) -> Self {
        Token::new(TokenKind::Missing, Location::at(offset))
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}, {})",
            self.kind, self.location.start, self.location.end
        )
    }
}
