use crate::{
    ast::ast::{Node, NodeKind},
    diagnostics::diagnostics::DiagnosticCode,
    lexer::tokens::TokenKind,
    Location,
};

use super::{
    expr::parse_expression,
    lookups::BindingPower,
    parser::{Context, Parser},
};

/// Parses statements until a token that closes the given context (or any
/// enclosing one) comes up. Always returns a statements node; recovery
/// happens here, between statements.
pub fn parse_statements(parser: &mut Parser, context: Context) -> Node {
    parser.push_context(context);
    let start = parser.current_token().location.start;
    let mut body: Vec<Node> = vec![];

    loop {
        parser.skip_terminators();

        let kind = parser.current_token_kind();
        if kind == TokenKind::Eof || parser.context_recoverable(kind) {
            break;
        }

        body.push(parse_stmt(parser));

        if parser.recovering {
            if let Some(skipped) = parser.synchronize() {
                body.push(Node::new(skipped, NodeKind::Error));
            }
            continue;
        }

        // A statement ends at a separator or at a token that closes an
        // enclosing construct. Anything else is junk; it gets skipped and
        // covered with an error node so the tree still spans it.
        let kind = parser.current_token_kind();
        if !matches!(
            kind,
            TokenKind::Eof | TokenKind::Newline | TokenKind::Semicolon
        ) && !parser.context_recoverable(kind)
        {
            parser
                .diagnostics
                .append(DiagnosticCode::UnexpectedToken, parser.current_token().location);
            if let Some(skipped) = parser.synchronize() {
                body.push(Node::new(skipped, NodeKind::Error));
            }
        }
    }

    parser.pop_context();

    let location = match (body.first(), body.last()) {
        (Some(first), Some(last)) => first.location.join(last.location),
        _ => Location::at(start),
    };
    Node::new(location, NodeKind::Statements { body })
}

/// Dispatches to the registered statement handler, falling back to an
/// expression statement.
pub fn parse_stmt(parser: &mut Parser) -> Node {
    match parser.stmt_handler(parser.current_token_kind()) {
        Some(handler) => handler(parser),
        None => parse_expression(parser, BindingPower::Assignment),
    }
}

/// `if` with optional `elsif` chain and `else`, closed by a single `end`.
pub fn parse_if_stmt(parser: &mut Parser) -> Node {
    let mut node = parse_conditional(parser);
    let end = parser.expect(TokenKind::KeywordEnd, DiagnosticCode::ExpectedEnd);
    node.location = node.location.join(end.location);
    node
}

/// One `if`/`elsif` link of the chain. Does not consume the shared `end`;
/// only the outermost caller does.
fn parse_conditional(parser: &mut Parser) -> Node {
    let keyword = parser.advance();
    let predicate = parse_expression(parser, BindingPower::Assignment);
    parser.accept(TokenKind::KeywordThen);

    let statements = parse_statements(parser, Context::If);

    let consequent = match parser.current_token_kind() {
        TokenKind::KeywordElsif => Some(Box::new(parse_conditional(parser))),
        TokenKind::KeywordElse => Some(Box::new(parse_else(parser))),
        _ => None,
    };

    let end = consequent
        .as_ref()
        .map(|node| node.location)
        .unwrap_or(statements.location);

    Node::new(
        keyword.location.join(end),
        NodeKind::If {
            predicate: Box::new(predicate),
            statements: Box::new(statements),
            consequent,
        },
    )
}

fn parse_else(parser: &mut Parser) -> Node {
    let keyword = parser.advance();
    let statements = parse_statements(parser, Context::Else);

    Node::new(
        keyword.location.join(statements.location),
        NodeKind::Else {
            statements: Box::new(statements),
        },
    )
}

pub fn parse_while_stmt(parser: &mut Parser) -> Node {
    let keyword = parser.advance();
    let predicate = parse_expression(parser, BindingPower::Assignment);

    let statements = parse_statements(parser, Context::While);
    let end = parser.expect(TokenKind::KeywordEnd, DiagnosticCode::ExpectedEnd);

    Node::new(
        keyword.location.join(end.location),
        NodeKind::While {
            predicate: Box::new(predicate),
            statements: Box::new(statements),
        },
    )
}

/// `def name(params) ... end`. A malformed parameter list gets a missing
/// placeholder so the definition keeps its shape.
pub fn parse_def_stmt(parser: &mut Parser) -> Node {
    let keyword = parser.advance();
    let name = parser.expect(TokenKind::Identifier, DiagnosticCode::ExpectedIdentifier);

    let mut parameters: Vec<Node> = vec![];
    if parser.accept(TokenKind::ParenLeft) {
        parser.skip_newlines();
        if parser.current_token_kind() != TokenKind::ParenRight {
            loop {
                if parser.current_token_kind() == TokenKind::Identifier {
                    let token = parser.advance();
                    parameters.push(Node::new(token.location, NodeKind::Parameter));
                } else {
                    parser.diagnostics.append(
                        DiagnosticCode::ExpectedParameter,
                        parser.current_token().location,
                    );
                    parameters.push(Node::missing(parser.current_token().location.start));
                    break;
                }

                parser.skip_newlines();
                if !parser.accept(TokenKind::Comma) {
                    break;
                }
                parser.skip_newlines();
            }
        }
        parser.expect(TokenKind::ParenRight, DiagnosticCode::ExpectedParenClose);
    }

    let body = parse_statements(parser, Context::Def);
    let end = parser.expect(TokenKind::KeywordEnd, DiagnosticCode::ExpectedEnd);

    Node::new(
        keyword.location.join(end.location),
        NodeKind::Def {
            name: name.location,
            parameters,
            body: Box::new(body),
        },
    )
}

pub fn parse_return_stmt(parser: &mut Parser) -> Node {
    let keyword = parser.advance();
    let value = parse_optional_value(parser);

    let end = value
        .as_ref()
        .map(|node| node.location)
        .unwrap_or(keyword.location);

    Node::new(
        keyword.location.join(end),
        NodeKind::Return { value },
    )
}

pub fn parse_break_stmt(parser: &mut Parser) -> Node {
    let keyword = parser.advance();
    let value = parse_optional_value(parser);

    let end = value
        .as_ref()
        .map(|node| node.location)
        .unwrap_or(keyword.location);

    Node::new(keyword.location.join(end), NodeKind::Break { value })
}

/// The optional argument of `return` and `break`: present exactly when the
/// current token can start an expression.
fn parse_optional_value(parser: &mut Parser) -> Option<Box<Node>> {
    if parser.nud_handler(parser.current_token_kind()).is_some() {
        Some(Box::new(parse_expression(parser, BindingPower::Assignment)))
    } else {
        None
    }
}
