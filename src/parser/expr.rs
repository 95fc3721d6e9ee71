use crate::{
    ast::ast::{Node, NodeKind},
    diagnostics::diagnostics::DiagnosticCode,
    lexer::tokens::TokenKind,
    Location,
};

use super::{
    lookups::{BindingPower, BindingPowers},
    parser::{Context, Parser},
    stmt::parse_statements,
};

/// The Pratt loop. Parses a prefix expression, then folds in every infix
/// operator whose left binding power is at least `minimum`.
pub fn parse_expression(parser: &mut Parser, minimum: BindingPower) -> Node {
    let mut left = match parser.nud_handler(parser.current_token_kind()) {
        Some(handler) => handler(parser),
        None => return recover_missing_expression(parser),
    };

    loop {
        if parser.recovering {
            break;
        }

        let powers = match parser.binding_power(parser.current_token_kind()) {
            Some(powers) if powers.left >= minimum => powers,
            _ => break,
        };
        let handler = match parser.led_handler(parser.current_token_kind()) {
            Some(handler) => handler,
            None => break,
        };

        left = handler(parser, left, powers);
    }

    left
}

/// Called when the current token cannot start an expression. If the token
/// closes an enclosing construct it is left alone and a missing node takes
/// the expression's place; otherwise the unusable run is skipped and wrapped
/// in an error node so the tree still covers it.
fn recover_missing_expression(parser: &mut Parser) -> Node {
    let location = parser.current_token().location;
    parser
        .diagnostics
        .append(DiagnosticCode::ExpectedExpression, location);

    let kind = parser.current_token_kind();
    if parser.context_recoverable(kind)
        || matches!(
            kind,
            TokenKind::Eof | TokenKind::Newline | TokenKind::Semicolon
        )
    {
        parser.recovering = true;
        return Node::missing(location.start);
    }

    let mut end = location;
    while !matches!(
        parser.current_token_kind(),
        TokenKind::Eof | TokenKind::Newline | TokenKind::Semicolon
    ) && !parser.context_recoverable(parser.current_token_kind())
    {
        end = parser.current_token().location;
        parser.advance();
    }

    Node::new(location.join(end), NodeKind::Error)
}

/// Single-token expressions: numbers, identifiers and keyword literals.
pub fn parse_primary_expr(parser: &mut Parser) -> Node {
    let token = parser.advance();
    let kind = match token.kind {
        TokenKind::Integer => NodeKind::IntegerLiteral,
        TokenKind::Float => NodeKind::FloatLiteral,
        TokenKind::Identifier => NodeKind::Identifier,
        TokenKind::KeywordNil => NodeKind::NilLiteral,
        TokenKind::KeywordTrue => NodeKind::TrueLiteral,
        TokenKind::KeywordFalse => NodeKind::FalseLiteral,
        _ => NodeKind::Missing,
    };
    Node::new(token.location, kind)
}

/// Prefix `-` and `!`. The operand binds everything tighter than unary,
/// which puts exponentiation inside the negation: `-2 ** 2` is `-(2 ** 2)`.
pub fn parse_prefix_expr(parser: &mut Parser) -> Node {
    let operator = parser.advance();
    let operand = parse_expression(parser, BindingPower::Unary);

    Node::new(
        operator.location.join(operand.location),
        NodeKind::Unary {
            operator: operator.location,
            operand: Box::new(operand),
        },
    )
}

pub fn parse_binary_expr(parser: &mut Parser, left: Node, powers: BindingPowers) -> Node {
    let operator = parser.advance();
    parser.skip_newlines();
    let right = parse_expression(parser, powers.right);

    Node::new(
        left.location.join(right.location),
        NodeKind::Binary {
            left: Box::new(left),
            operator: operator.location,
            right: Box::new(right),
        },
    )
}

/// Plain and compound assignment. Right-associative, so `a = b = c`
/// assigns `b = c` to `a`.
pub fn parse_assignment_expr(parser: &mut Parser, left: Node, powers: BindingPowers) -> Node {
    let operator = parser.advance();
    let value = parse_expression(parser, powers.right);

    Node::new(
        left.location.join(value.location),
        NodeKind::Assignment {
            target: Box::new(left),
            operator: operator.location,
            value: Box::new(value),
        },
    )
}

/// Parenthesized grouping. The inner expression is returned as-is, widened
/// to cover the parentheses.
pub fn parse_grouping_expr(parser: &mut Parser) -> Node {
    let open = parser.advance();
    parser.push_context(Context::Parens);
    parser.skip_newlines();
    let mut inner = parse_expression(parser, BindingPower::Assignment);
    parser.skip_newlines();
    parser.pop_context();
    let close = parser.expect(TokenKind::ParenRight, DiagnosticCode::ExpectedParenClose);

    inner.location = inner.location.join(open.location).join(close.location);
    inner
}

/// A comma-separated expression list up to (but not consuming) the
/// terminator. Newlines around elements are insignificant here, and the
/// pushed context keeps recovery from skipping past the closing delimiter.
fn parse_arguments(parser: &mut Parser, terminator: TokenKind) -> Vec<Node> {
    let context = match terminator {
        TokenKind::ParenRight => Context::Parens,
        _ => Context::Brackets,
    };
    parser.push_context(context);

    let mut arguments = vec![];
    parser.skip_newlines();
    while parser.current_token_kind() != terminator && parser.current_token_kind() != TokenKind::Eof
    {
        arguments.push(parse_expression(parser, BindingPower::Assignment));
        if parser.recovering {
            break;
        }
        parser.skip_newlines();
        if !parser.accept(TokenKind::Comma) {
            break;
        }
        parser.skip_newlines();
    }

    parser.pop_context();
    arguments
}

pub fn parse_array_expr(parser: &mut Parser) -> Node {
    let open = parser.advance();
    let elements = parse_arguments(parser, TokenKind::BracketRight);
    let close = parser.expect(TokenKind::BracketRight, DiagnosticCode::ExpectedBracketClose);

    Node::new(
        open.location.join(close.location),
        NodeKind::Array { elements },
    )
}

pub fn parse_hash_expr(parser: &mut Parser) -> Node {
    let open = parser.advance();
    parser.push_context(Context::Braces);
    let mut pairs = vec![];

    parser.skip_newlines();
    while !matches!(
        parser.current_token_kind(),
        TokenKind::BraceRight | TokenKind::Eof
    ) {
        let key = parse_expression(parser, BindingPower::Assignment);
        if parser.recovering {
            break;
        }

        parser.expect(TokenKind::EqualGreater, DiagnosticCode::ExpectedHashRocket);
        parser.skip_newlines();
        let value = parse_expression(parser, BindingPower::Assignment);

        let location = key.location.join(value.location);
        pairs.push(Node::new(
            location,
            NodeKind::Assoc {
                key: Box::new(key),
                value: Box::new(value),
            },
        ));

        if parser.recovering {
            break;
        }
        parser.skip_newlines();
        if !parser.accept(TokenKind::Comma) {
            break;
        }
        parser.skip_newlines();
    }

    parser.pop_context();
    let close = parser.expect(TokenKind::BraceRight, DiagnosticCode::ExpectedBraceClose);
    Node::new(open.location.join(close.location), NodeKind::Hash { pairs })
}

/// `left(arguments)`. A bare identifier becomes a receiverless call; any
/// other callee is kept as the receiver with a zero-width message.
pub fn parse_call_expr(parser: &mut Parser, left: Node, _powers: BindingPowers) -> Node {
    parser.advance();
    let arguments = parse_arguments(parser, TokenKind::ParenRight);
    let close = parser.expect(TokenKind::ParenRight, DiagnosticCode::ExpectedParenClose);
    let location = left.location.join(close.location);

    match left.kind {
        NodeKind::Identifier => Node::new(
            location,
            NodeKind::Call {
                receiver: None,
                message: left.location,
                arguments,
            },
        ),
        _ => {
            let message = Location::at(left.location.end);
            Node::new(
                location,
                NodeKind::Call {
                    receiver: Some(Box::new(left)),
                    message,
                    arguments,
                },
            )
        }
    }
}

/// `left.name` or `left.name(arguments)`.
pub fn parse_member_expr(parser: &mut Parser, left: Node, _powers: BindingPowers) -> Node {
    parser.advance();
    let name = parser.expect(TokenKind::Identifier, DiagnosticCode::ExpectedIdentifier);

    let mut arguments = vec![];
    let mut end = name.location;
    if parser.current_token_kind() == TokenKind::ParenLeft {
        parser.advance();
        arguments = parse_arguments(parser, TokenKind::ParenRight);
        let close = parser.expect(TokenKind::ParenRight, DiagnosticCode::ExpectedParenClose);
        end = close.location;
    }

    Node::new(
        left.location.join(end),
        NodeKind::Call {
            receiver: Some(Box::new(left)),
            message: name.location,
            arguments,
        },
    )
}

/// `left[arguments]`.
pub fn parse_index_expr(parser: &mut Parser, left: Node, _powers: BindingPowers) -> Node {
    parser.advance();
    let arguments = parse_arguments(parser, TokenKind::BracketRight);
    let close = parser.expect(TokenKind::BracketRight, DiagnosticCode::ExpectedBracketClose);

    Node::new(
        left.location.join(close.location),
        NodeKind::Index {
            receiver: Box::new(left),
            arguments,
        },
    )
}

/// A quoted string. Content chunks and interpolations alternate until the
/// closing token, which the lexer synthesizes for unterminated literals, so
/// this always finds its end.
pub fn parse_string_expr(parser: &mut Parser) -> Node {
    let begin = parser.advance();
    let single_quoted = parser.text(begin.location).first() == Some(&b'\'');

    let mut parts: Vec<Node> = vec![];
    let mut interpolated = false;

    loop {
        match parser.current_token_kind() {
            TokenKind::StringContent => {
                let token = parser.advance();
                let raw = parser.text(token.location);
                let unescaped = if single_quoted {
                    unescape_single(raw)
                } else {
                    unescape_double(raw)
                };
                parts.push(Node::new(
                    token.location,
                    NodeKind::StringLiteral { unescaped },
                ));
            }
            TokenKind::EmbexprBegin => {
                interpolated = true;
                parts.push(parse_embedded_expression(parser));
            }
            _ => break,
        }
    }

    let end = parser.expect(TokenKind::StringEnd, DiagnosticCode::UnexpectedToken);
    let location = begin.location.join(end.location);

    if interpolated {
        Node::new(location, NodeKind::InterpolatedString { parts })
    } else {
        let unescaped = parts
            .into_iter()
            .map(|part| match part.kind {
                NodeKind::StringLiteral { unescaped } => unescaped,
                _ => String::new(),
            })
            .collect::<String>();
        Node::new(location, NodeKind::StringLiteral { unescaped })
    }
}

fn parse_embedded_expression(parser: &mut Parser) -> Node {
    let open = parser.advance();
    let statements = parse_statements(parser, Context::Embexpr);
    let close = parser.expect(TokenKind::EmbexprEnd, DiagnosticCode::ExpectedEmbexprClose);

    Node::new(
        open.location.join(close.location),
        NodeKind::EmbeddedExpression {
            statements: Box::new(statements),
        },
    )
}

/// A regexp literal. The pattern is kept byte-for-byte; flags stay in the
/// node's source range.
pub fn parse_regexp_expr(parser: &mut Parser) -> Node {
    let begin = parser.advance();

    let mut unescaped = String::new();
    while parser.current_token_kind() == TokenKind::StringContent {
        let token = parser.advance();
        unescaped.push_str(&String::from_utf8_lossy(parser.text(token.location)));
    }

    let end = parser.expect(TokenKind::RegexpEnd, DiagnosticCode::UnexpectedToken);
    Node::new(
        begin.location.join(end.location),
        NodeKind::Regexp { unescaped },
    )
}

/// A heredoc. The body arrives as one content chunk and is never
/// interpolated: `#{` stays literal text, unlike in double-quoted strings.
/// A `<<~` opener strips the common indentation of its lines.
pub fn parse_heredoc_expr(parser: &mut Parser) -> Node {
    let begin = parser.advance();
    let squiggly = parser.text(begin.location).get(2) == Some(&b'~');

    let mut raw: Vec<u8> = vec![];
    while parser.current_token_kind() == TokenKind::StringContent {
        let token = parser.advance();
        raw.extend_from_slice(parser.text(token.location));
    }

    let end = parser.expect(TokenKind::HeredocEnd, DiagnosticCode::UnexpectedToken);

    let mut unescaped = unescape_double(&raw);
    if squiggly {
        unescaped = dedent(&unescaped);
    }

    Node::new(
        begin.location.join(end.location),
        NodeKind::StringLiteral { unescaped },
    )
}

/// Resolves double-quote escape sequences. Unknown escapes keep the escaped
/// character, matching how most shells and dynamic languages treat them.
fn unescape_double(bytes: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];
        if byte != b'\\' || index + 1 >= bytes.len() {
            out.push(byte);
            index += 1;
            continue;
        }

        index += 2;
        match bytes[index - 1] {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b's' => out.push(b' '),
            b'0' => out.push(0x00),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'e' => out.push(0x1B),
            b'f' => out.push(0x0C),
            b'v' => out.push(0x0B),
            b'x' => {
                let mut value: u8 = 0;
                let mut digits = 0;
                while digits < 2 {
                    match bytes.get(index).and_then(|b| (*b as char).to_digit(16)) {
                        Some(digit) => {
                            value = value.wrapping_mul(16).wrapping_add(digit as u8);
                            index += 1;
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    out.push(b'x');
                } else {
                    out.push(value);
                }
            }
            other => out.push(other),
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Single quotes only unescape the backslash and the quote itself.
fn unescape_single(bytes: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'\\' && matches!(bytes.get(index + 1), Some(b'\\') | Some(b'\'')) {
            out.push(bytes[index + 1]);
            index += 2;
        } else {
            out.push(bytes[index]);
            index += 1;
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Strips the smallest indentation shared by all non-blank lines.
fn dedent(text: &str) -> String {
    let leading = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();

    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading)
        .min()
        .unwrap_or(0);

    if indent == 0 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let strip = indent.min(leading(line.trim_end_matches('\n')));
        out.push_str(&line[strip..]);
    }
    out
}
