//! Unit tests for tree construction, teardown and memory accounting.

use std::mem::size_of;

use crate::Location;

use super::ast::{Node, NodeKind};
use super::memsize::{destroy, memsize};

fn integer(start: u32, end: u32) -> Node {
    Node::new(Location::new(start, end), NodeKind::IntegerLiteral)
}

/// A small tree for `1 + 2` wrapped in a statements list.
fn sample_tree() -> Node {
    let binary = Node::new(
        Location::new(0, 5),
        NodeKind::Binary {
            left: Box::new(integer(0, 1)),
            operator: Location::new(2, 3),
            right: Box::new(integer(4, 5)),
        },
    );

    Node::new(
        Location::new(0, 5),
        NodeKind::Statements { body: vec![binary] },
    )
}

#[test]
fn test_node_count_matches_destroy_count() {
    let tree = sample_tree();
    let summary = memsize(&tree);

    assert_eq!(summary.node_count, 4);
    assert_eq!(destroy(tree), 4);
}

#[test]
fn test_memsize_covers_heap_allocations() {
    let tree = sample_tree();
    let summary = memsize(&tree);

    // At minimum: the root value, the statements buffer holding the binary
    // node, and the two boxed operands.
    assert!(summary.memsize >= 4 * size_of::<Node>());
}

#[test]
fn test_memsize_counts_string_buffers() {
    let plain = Node::new(
        Location::new(0, 7),
        NodeKind::StringLiteral {
            unescaped: String::from("hello"),
        },
    );

    let summary = memsize(&plain);
    assert_eq!(summary.node_count, 1);
    assert!(summary.memsize >= size_of::<Node>() + 5);

    destroy(plain);
}

#[test]
fn test_destroy_counts_optional_children() {
    let with_value = Node::new(
        Location::new(0, 8),
        NodeKind::Return {
            value: Some(Box::new(integer(7, 8))),
        },
    );
    let without_value = Node::new(Location::new(0, 6), NodeKind::Return { value: None });

    assert_eq!(destroy(with_value), 2);
    assert_eq!(destroy(without_value), 1);
}

#[test]
fn test_destroy_survives_deep_nesting() {
    // Build a right-leaning chain far deeper than the thread stack could
    // handle recursively.
    let mut node = integer(0, 1);
    for _ in 0..100_000 {
        node = Node::new(
            Location::new(0, 1),
            NodeKind::Unary {
                operator: Location::new(0, 0),
                operand: Box::new(node),
            },
        );
    }

    assert_eq!(destroy(node), 100_001);
}

#[test]
fn test_children_are_in_source_order() {
    let tree = sample_tree();
    let body = tree.children();
    assert_eq!(body.len(), 1);

    let operands = body[0].children();
    assert_eq!(operands.len(), 2);
    assert!(operands[0].location.end <= operands[1].location.start);

    destroy(tree);
}

#[test]
fn test_kind_tags_are_unique() {
    // Spot-check the ends and a middle value of the tag space.
    assert_eq!(
        Node::new(Location::at(0), NodeKind::Statements { body: vec![] })
            .kind
            .tag(),
        0
    );
    assert_eq!(NodeKind::Missing.tag(), 26);
    assert_eq!(NodeKind::Error.tag(), 27);
    assert_eq!(NodeKind::Missing.name(), "MISSING");
}
