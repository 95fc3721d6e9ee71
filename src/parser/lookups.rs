use std::collections::HashMap;

use crate::{ast::ast::Node, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*};

/// Precedence levels, loosest first. The derived ordering is the whole
/// point: the expression loop compares levels to decide whether an operator
/// binds.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    None,
    Assignment,
    LogicalOr,
    LogicalAnd,
    Equality,
    Comparison,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Exponent,
    Index,
    Call,
    Primary,
}

impl BindingPower {
    /// The next level up.
    pub fn tighter(self) -> BindingPower {
        match self {
            BindingPower::None => BindingPower::Assignment,
            BindingPower::Assignment => BindingPower::LogicalOr,
            BindingPower::LogicalOr => BindingPower::LogicalAnd,
            BindingPower::LogicalAnd => BindingPower::Equality,
            BindingPower::Equality => BindingPower::Comparison,
            BindingPower::Comparison => BindingPower::Shift,
            BindingPower::Shift => BindingPower::Additive,
            BindingPower::Additive => BindingPower::Multiplicative,
            BindingPower::Multiplicative => BindingPower::Unary,
            BindingPower::Unary => BindingPower::Exponent,
            BindingPower::Exponent => BindingPower::Index,
            BindingPower::Index => BindingPower::Call,
            BindingPower::Call | BindingPower::Primary => BindingPower::Primary,
        }
    }
}

/// An operator's two-sided precedence. `left` decides whether the operator
/// binds to what came before it; `right` is the minimum level its operand
/// parse uses, which is what makes associativity fall out of the loop.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct BindingPowers {
    pub left: BindingPower,
    pub right: BindingPower,
}

/// A left-associative operator: its operand parse refuses operators of the
/// same level, so `a - b - c` groups as `(a - b) - c`.
pub fn left_assoc(level: BindingPower) -> BindingPowers {
    BindingPowers {
        left: level,
        right: level.tighter(),
    }
}

/// A right-associative operator: its operand parse accepts the same level
/// again, so `a = b = c` groups as `a = (b = c)`.
pub fn right_assoc(level: BindingPower) -> BindingPowers {
    BindingPowers {
        left: level,
        right: level,
    }
}

pub type StmtHandler = for<'src> fn(&mut Parser<'src>) -> Node;
pub type NudHandler = for<'src> fn(&mut Parser<'src>) -> Node;
pub type LedHandler = for<'src> fn(&mut Parser<'src>, Node, BindingPowers) -> Node;

// Lookup tables inside the parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NudLookup = HashMap<TokenKind, NudHandler>;
pub type LedLookup = HashMap<TokenKind, LedHandler>;
pub type BpLookup = HashMap<TokenKind, BindingPowers>;

pub fn create_token_lookups(parser: &mut Parser) {
    use BindingPower::*;

    // Assignment operators chain to the right.
    parser.led(TokenKind::Equal, right_assoc(Assignment), parse_assignment_expr);
    parser.led(TokenKind::PlusEqual, right_assoc(Assignment), parse_assignment_expr);
    parser.led(TokenKind::MinusEqual, right_assoc(Assignment), parse_assignment_expr);
    parser.led(TokenKind::StarEqual, right_assoc(Assignment), parse_assignment_expr);
    parser.led(TokenKind::SlashEqual, right_assoc(Assignment), parse_assignment_expr);

    // Logical
    parser.led(TokenKind::PipePipe, left_assoc(LogicalOr), parse_binary_expr);
    parser.led(TokenKind::AmpersandAmpersand, left_assoc(LogicalAnd), parse_binary_expr);

    // Equality and comparison
    parser.led(TokenKind::EqualEqual, left_assoc(Equality), parse_binary_expr);
    parser.led(TokenKind::BangEqual, left_assoc(Equality), parse_binary_expr);
    parser.led(TokenKind::Less, left_assoc(Comparison), parse_binary_expr);
    parser.led(TokenKind::LessEqual, left_assoc(Comparison), parse_binary_expr);
    parser.led(TokenKind::Greater, left_assoc(Comparison), parse_binary_expr);
    parser.led(TokenKind::GreaterEqual, left_assoc(Comparison), parse_binary_expr);
    parser.led(TokenKind::LessLess, left_assoc(Shift), parse_binary_expr);

    // Arithmetic
    parser.led(TokenKind::Plus, left_assoc(Additive), parse_binary_expr);
    parser.led(TokenKind::Minus, left_assoc(Additive), parse_binary_expr);
    parser.led(TokenKind::Star, left_assoc(Multiplicative), parse_binary_expr);
    parser.led(TokenKind::Slash, left_assoc(Multiplicative), parse_binary_expr);
    parser.led(TokenKind::Percent, left_assoc(Multiplicative), parse_binary_expr);
    parser.led(TokenKind::StarStar, right_assoc(Exponent), parse_binary_expr);

    // Postfix structure
    parser.led(TokenKind::ParenLeft, left_assoc(Call), parse_call_expr);
    parser.led(TokenKind::Dot, left_assoc(Call), parse_member_expr);
    parser.led(TokenKind::BracketLeft, left_assoc(Index), parse_index_expr);

    // Literals and symbols
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::Float, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::KeywordNil, parse_primary_expr);
    parser.nud(TokenKind::KeywordTrue, parse_primary_expr);
    parser.nud(TokenKind::KeywordFalse, parse_primary_expr);
    parser.nud(TokenKind::StringBegin, parse_string_expr);
    parser.nud(TokenKind::RegexpBegin, parse_regexp_expr);
    parser.nud(TokenKind::HeredocBegin, parse_heredoc_expr);
    parser.nud(TokenKind::Minus, parse_prefix_expr);
    parser.nud(TokenKind::Bang, parse_prefix_expr);
    parser.nud(TokenKind::ParenLeft, parse_grouping_expr);
    parser.nud(TokenKind::BracketLeft, parse_array_expr);
    parser.nud(TokenKind::BraceLeft, parse_hash_expr);

    // Statements
    parser.stmt(TokenKind::KeywordIf, parse_if_stmt);
    parser.stmt(TokenKind::KeywordWhile, parse_while_stmt);
    parser.stmt(TokenKind::KeywordDef, parse_def_stmt);
    parser.stmt(TokenKind::KeywordReturn, parse_return_stmt);
    parser.stmt(TokenKind::KeywordBreak, parse_break_stmt);
}
