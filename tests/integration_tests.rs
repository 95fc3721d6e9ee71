//! End-to-end tests driving the public API the way an embedder would.

use sable_parser::ast::ast::{Node, NodeKind};
use sable_parser::ast::memsize::{destroy, memsize};
use sable_parser::diagnostics::diagnostics::{DiagnosticCode, Severity};
use sable_parser::lexer::tokens::TokenKind;
use sable_parser::parser::parser::Parser;
use sable_parser::{parse_and_serialize, version};

const SNIPPETS: &[&[u8]] = &[
    b"",
    b"x = 1 + 2 * 3\n",
    b"def add(a, b)\nreturn a + b\nend\n",
    b"if a\n1\nelsif b\n2\nelse\n3\nend\n",
    b"while x < 10\nx += 1\nend\n",
    b"list = [1, 2.5, \"three\", nil, true]\n",
    b"h = {\"k\" => /v+/i}\n",
    b"msg = \"hello #{name}!\"\n",
    b"doc = <<~TEXT\n  indented\n  TEXT\n",
    b"a.b(c)[0] = d\n",
];

fn kind_names(node: &Node, out: &mut Vec<&'static str>) {
    out.push(node.kind.name());
    for child in node.children() {
        kind_names(child, out);
    }
}

fn assert_containment(node: &Node) {
    for child in node.children() {
        assert!(
            node.location.contains(child.location),
            "{} does not cover its {} child",
            node.kind.name(),
            child.kind.name(),
        );
        assert_containment(child);
    }
}

#[test]
fn destroyed_node_count_matches_summary() {
    for source in SNIPPETS {
        let mut parser = Parser::new(source);
        let root = parser.parse();

        let summary = memsize(&root);
        assert!(summary.memsize >= summary.node_count * std::mem::size_of::<Node>());
        assert_eq!(destroy(root), summary.node_count);
    }
}

#[test]
fn parents_always_cover_children() {
    for source in SNIPPETS {
        let mut parser = Parser::new(source);
        let root = parser.parse();
        assert_containment(&root);
    }
}

#[test]
fn serialization_is_deterministic() {
    for source in SNIPPETS {
        let mut first = vec![];
        parse_and_serialize(source, &mut first);
        let mut second = vec![];
        parse_and_serialize(source, &mut second);

        assert_eq!(first, second);
        assert_eq!(&first[..4], b"SBLP");
    }
}

#[test]
fn unterminated_string_reports_exactly_once() {
    let mut parser = Parser::new(b"x = \"abc");
    let root = parser.parse();

    assert_eq!(parser.diagnostics().len(), 1);
    let diagnostic = parser.diagnostics().iter().next().unwrap();
    assert_eq!(diagnostic.code, DiagnosticCode::UntermString);

    // The tree still holds the assignment with the string value.
    match root.kind {
        NodeKind::Statements { ref body } => {
            assert!(matches!(body[0].kind, NodeKind::Assignment { .. }));
        }
        ref other => panic!("expected statements, got {}", other.name()),
    }
    destroy(root);
}

#[test]
fn unknown_encoding_warns_without_changing_shape() {
    let mut unknown = Parser::new(b"# coding: no-such-encoding\nx = 1\n");
    let unknown_root = unknown.parse();

    let mut known = Parser::new(b"# coding: utf-8\nx = 1\n");
    let known_root = known.parse();

    assert_eq!(unknown.diagnostics().warning_count(), 1);
    assert_eq!(unknown.diagnostics().error_count(), 0);
    assert!(known.diagnostics().is_empty());

    let mut unknown_kinds = vec![];
    kind_names(&unknown_root, &mut unknown_kinds);
    let mut known_kinds = vec![];
    kind_names(&known_root, &mut known_kinds);
    assert_eq!(unknown_kinds, known_kinds);
}

#[test]
fn precedence_shapes_the_tree() {
    let source = b"x = 1 + 2 * 3";
    let mut parser = Parser::new(source);
    let root = parser.parse();
    assert!(parser.diagnostics().is_empty());

    let body = match root.kind {
        NodeKind::Statements { body } => body,
        other => panic!("expected statements, got {}", other.name()),
    };
    let value = match &body[0].kind {
        NodeKind::Assignment { value, .. } => value,
        other => panic!("expected an assignment, got {}", other.name()),
    };
    match &value.kind {
        NodeKind::Binary {
            operator, right, ..
        } => {
            assert_eq!(operator.slice(source), b"+");
            assert!(matches!(right.kind, NodeKind::Binary { .. }));
        }
        other => panic!("expected an addition, got {}", other.name()),
    }
}

#[test]
fn broken_definition_recovers_with_placeholder() {
    let mut parser = Parser::new(b"def f( end");
    let root = parser.parse();

    assert!(parser.diagnostics().error_count() >= 1);

    match root.kind {
        NodeKind::Statements { ref body } => match &body[0].kind {
            NodeKind::Def { parameters, .. } => {
                assert!(matches!(parameters[0].kind, NodeKind::Missing));
            }
            other => panic!("expected a definition, got {}", other.name()),
        },
        ref other => panic!("expected statements, got {}", other.name()),
    }
    destroy(root);
}

#[test]
fn standalone_lexing_names_tokens() {
    let mut parser = Parser::new(b"def f\nend\n");
    let mut names = vec![];

    loop {
        let token = parser.next_token();
        names.push(token.kind.name());
        if token.kind == TokenKind::Eof {
            break;
        }
    }

    assert_eq!(
        names,
        vec![
            "KEYWORD_DEF",
            "IDENTIFIER",
            "NEWLINE",
            "KEYWORD_END",
            "NEWLINE",
            "EOF",
        ]
    );
}

#[test]
fn warnings_do_not_count_as_errors() {
    let mut parser = Parser::new(b"foo /bar/\n");
    loop {
        if parser.next_token().kind == TokenKind::Eof {
            break;
        }
    }

    assert_eq!(parser.diagnostics().warning_count(), 1);
    assert_eq!(parser.diagnostics().error_count(), 0);
    assert_eq!(
        parser.diagnostics().iter().next().unwrap().severity,
        Severity::Warning
    );
}

#[test]
fn version_has_three_components() {
    let components: Vec<&str> = version().split('.').collect();
    assert_eq!(components.len(), 3);
    for component in components {
        assert!(component.parse::<u8>().is_ok());
    }
}
