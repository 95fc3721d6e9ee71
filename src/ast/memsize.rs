//! Tree teardown and memory accounting.
//!
//! Both walks are iterative with an explicit worklist so deeply nested
//! input cannot overflow the stack during teardown.

use std::mem::size_of;

use super::ast::{Node, NodeKind};

/// Aggregate memory statistics for a tree, as reported by [`memsize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySummary {
    /// Total bytes attributable to the tree: the root value itself plus
    /// every heap allocation owned by any node.
    pub memsize: usize,
    /// Number of nodes in the tree, the root included.
    pub node_count: usize,
}

/// Computes the memory footprint of a tree without consuming it.
pub fn memsize(root: &Node) -> MemorySummary {
    let node = size_of::<Node>();
    let mut summary = MemorySummary {
        memsize: node,
        node_count: 0,
    };

    let mut worklist = vec![root];
    while let Some(current) = worklist.pop() {
        summary.node_count += 1;
        summary.memsize += owned_bytes(&current.kind);
        worklist.extend(current.children());
    }

    summary
}

/// Heap bytes owned directly by one node: boxed children, vector buffers
/// and string buffers. Children reached through those allocations are
/// accounted for when the walk visits them.
fn owned_bytes(kind: &NodeKind) -> usize {
    let node = size_of::<Node>();

    match kind {
        NodeKind::Statements { body } => body.capacity() * node,
        NodeKind::IntegerLiteral
        | NodeKind::FloatLiteral
        | NodeKind::Identifier
        | NodeKind::NilLiteral
        | NodeKind::TrueLiteral
        | NodeKind::FalseLiteral
        | NodeKind::Parameter
        | NodeKind::Missing
        | NodeKind::Error => 0,
        NodeKind::StringLiteral { unescaped } | NodeKind::Regexp { unescaped } => {
            unescaped.capacity()
        }
        NodeKind::InterpolatedString { parts } => parts.capacity() * node,
        NodeKind::EmbeddedExpression { .. } => node,
        NodeKind::Array { elements } => elements.capacity() * node,
        NodeKind::Hash { pairs } => pairs.capacity() * node,
        NodeKind::Assoc { .. } => 2 * node,
        NodeKind::Binary { .. } => 2 * node,
        NodeKind::Unary { .. } => node,
        NodeKind::Assignment { .. } => 2 * node,
        NodeKind::Call {
            receiver,
            arguments,
            ..
        } => usize::from(receiver.is_some()) * node + arguments.capacity() * node,
        NodeKind::Index { arguments, .. } => node + arguments.capacity() * node,
        NodeKind::If { consequent, .. } => (2 + usize::from(consequent.is_some())) * node,
        NodeKind::Else { .. } => node,
        NodeKind::While { .. } => 2 * node,
        NodeKind::Def { parameters, .. } => parameters.capacity() * node + node,
        NodeKind::Return { value } | NodeKind::Break { value } => {
            usize::from(value.is_some()) * node
        }
    }
}

/// Tears a tree down iteratively and returns the number of nodes freed.
/// Taking the root by value makes a second teardown of the same tree a
/// compile error rather than a runtime fault.
pub fn destroy(root: Node) -> usize {
    let mut freed = 0;
    let mut worklist = vec![root];

    while let Some(current) = worklist.pop() {
        freed += 1;
        detach_children(current.kind, &mut worklist);
    }

    freed
}

/// Moves a node's children onto the worklist, dropping the node's own
/// scalar payload in the process.
fn detach_children(kind: NodeKind, worklist: &mut Vec<Node>) {
    match kind {
        NodeKind::Statements { body } => worklist.extend(body),
        NodeKind::IntegerLiteral
        | NodeKind::FloatLiteral
        | NodeKind::StringLiteral { .. }
        | NodeKind::Regexp { .. }
        | NodeKind::Identifier
        | NodeKind::NilLiteral
        | NodeKind::TrueLiteral
        | NodeKind::FalseLiteral
        | NodeKind::Parameter
        | NodeKind::Missing
        | NodeKind::Error => {}
        NodeKind::InterpolatedString { parts } => worklist.extend(parts),
        NodeKind::EmbeddedExpression { statements } => worklist.push(*statements),
        NodeKind::Array { elements } => worklist.extend(elements),
        NodeKind::Hash { pairs } => worklist.extend(pairs),
        NodeKind::Assoc { key, value } => {
            worklist.push(*key);
            worklist.push(*value);
        }
        NodeKind::Binary { left, right, .. } => {
            worklist.push(*left);
            worklist.push(*right);
        }
        NodeKind::Unary { operand, .. } => worklist.push(*operand),
        NodeKind::Assignment { target, value, .. } => {
            worklist.push(*target);
            worklist.push(*value);
        }
        NodeKind::Call {
            receiver,
            arguments,
            ..
        } => {
            if let Some(receiver) = receiver {
                worklist.push(*receiver);
            }
            worklist.extend(arguments);
        }
        NodeKind::Index {
            receiver,
            arguments,
        } => {
            worklist.push(*receiver);
            worklist.extend(arguments);
        }
        NodeKind::If {
            predicate,
            statements,
            consequent,
        } => {
            worklist.push(*predicate);
            worklist.push(*statements);
            if let Some(consequent) = consequent {
                worklist.push(*consequent);
            }
        }
        NodeKind::Else { statements } => worklist.push(*statements),
        NodeKind::While {
            predicate,
            statements,
        } => {
            worklist.push(*predicate);
            worklist.push(*statements);
        }
        NodeKind::Def {
            parameters, body, ..
        } => {
            worklist.extend(parameters);
            worklist.push(*body);
        }
        NodeKind::Return { value } | NodeKind::Break { value } => {
            if let Some(value) = value {
                worklist.push(*value);
            }
        }
    }
}
