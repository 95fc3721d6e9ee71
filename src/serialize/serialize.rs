use crate::{
    ast::ast::{Node, NodeKind},
    diagnostics::diagnostics::{DiagnosticList, Severity},
    Location,
};

/// The leading magic bytes of every serialized tree.
pub const MAGIC: &[u8; 4] = b"SBLP";

/// Field payload tags. Every node field is prefixed with one of these.
pub const FIELD_STRING: u8 = 0;
pub const FIELD_NODE: u8 = 1;
pub const FIELD_NODE_LIST: u8 = 2;
pub const FIELD_LOCATION: u8 = 3;

/// Appends the serialized form of a tree to `buffer`:
///
/// - 4 magic bytes
/// - 3 version bytes (major, minor, patch)
/// - the root node in pre-order
/// - the diagnostics trailer
///
/// Each node is its kind tag (u8), start and end offsets (u32), a field
/// count (u8), then that many tagged fields. Optional children are encoded
/// as node lists of zero or one element.
pub fn serialize(root: &Node, diagnostics: &DiagnosticList, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(MAGIC);
    buffer.extend_from_slice(&version_bytes());
    write_node(root, buffer);
    write_diagnostics(diagnostics, buffer);
}

/// The package version as three bytes. Missing or malformed components
/// encode as zero.
fn version_bytes() -> [u8; 3] {
    let mut bytes = [0u8; 3];
    for (slot, part) in bytes.iter_mut().zip(env!("CARGO_PKG_VERSION").split('.')) {
        *slot = part.parse().unwrap_or(0);
    }
    bytes
}

fn write_u32(value: u32, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

fn write_location(location: Location, buffer: &mut Vec<u8>) {
    write_u32(location.start, buffer);
    write_u32(location.end, buffer);
}

fn write_string_field(text: &str, buffer: &mut Vec<u8>) {
    buffer.push(FIELD_STRING);
    write_u32(text.len() as u32, buffer);
    buffer.extend_from_slice(text.as_bytes());
}

fn write_node_field(node: &Node, buffer: &mut Vec<u8>) {
    buffer.push(FIELD_NODE);
    write_node(node, buffer);
}

fn write_list_field(nodes: &[Node], buffer: &mut Vec<u8>) {
    buffer.push(FIELD_NODE_LIST);
    write_u32(nodes.len() as u32, buffer);
    for node in nodes {
        write_node(node, buffer);
    }
}

fn write_option_field(node: &Option<Box<Node>>, buffer: &mut Vec<u8>) {
    buffer.push(FIELD_NODE_LIST);
    match node {
        Some(node) => {
            write_u32(1, buffer);
            write_node(node, buffer);
        }
        None => write_u32(0, buffer),
    }
}

fn write_location_field(location: Location, buffer: &mut Vec<u8>) {
    buffer.push(FIELD_LOCATION);
    write_location(location, buffer);
}

fn write_node(node: &Node, buffer: &mut Vec<u8>) {
    buffer.push(node.kind.tag());
    write_location(node.location, buffer);

    match &node.kind {
        NodeKind::Statements { body } => {
            buffer.push(1);
            write_list_field(body, buffer);
        }
        NodeKind::IntegerLiteral
        | NodeKind::FloatLiteral
        | NodeKind::Identifier
        | NodeKind::NilLiteral
        | NodeKind::TrueLiteral
        | NodeKind::FalseLiteral
        | NodeKind::Parameter
        | NodeKind::Missing
        | NodeKind::Error => buffer.push(0),
        NodeKind::StringLiteral { unescaped } | NodeKind::Regexp { unescaped } => {
            buffer.push(1);
            write_string_field(unescaped, buffer);
        }
        NodeKind::InterpolatedString { parts } => {
            buffer.push(1);
            write_list_field(parts, buffer);
        }
        NodeKind::EmbeddedExpression { statements } => {
            buffer.push(1);
            write_node_field(statements, buffer);
        }
        NodeKind::Array { elements } => {
            buffer.push(1);
            write_list_field(elements, buffer);
        }
        NodeKind::Hash { pairs } => {
            buffer.push(1);
            write_list_field(pairs, buffer);
        }
        NodeKind::Assoc { key, value } => {
            buffer.push(2);
            write_node_field(key, buffer);
            write_node_field(value, buffer);
        }
        NodeKind::Binary {
            left,
            operator,
            right,
        } => {
            buffer.push(3);
            write_node_field(left, buffer);
            write_location_field(*operator, buffer);
            write_node_field(right, buffer);
        }
        NodeKind::Unary { operator, operand } => {
            buffer.push(2);
            write_location_field(*operator, buffer);
            write_node_field(operand, buffer);
        }
        NodeKind::Assignment {
            target,
            operator,
            value,
        } => {
            buffer.push(3);
            write_node_field(target, buffer);
            write_location_field(*operator, buffer);
            write_node_field(value, buffer);
        }
        NodeKind::Call {
            receiver,
            message,
            arguments,
        } => {
            buffer.push(3);
            write_option_field(receiver, buffer);
            write_location_field(*message, buffer);
            write_list_field(arguments, buffer);
        }
        NodeKind::Index {
            receiver,
            arguments,
        } => {
            buffer.push(2);
            write_node_field(receiver, buffer);
            write_list_field(arguments, buffer);
        }
        NodeKind::If {
            predicate,
            statements,
            consequent,
        } => {
            buffer.push(3);
            write_node_field(predicate, buffer);
            write_node_field(statements, buffer);
            write_option_field(consequent, buffer);
        }
        NodeKind::Else { statements } => {
            buffer.push(1);
            write_node_field(statements, buffer);
        }
        NodeKind::While {
            predicate,
            statements,
        } => {
            buffer.push(2);
            write_node_field(predicate, buffer);
            write_node_field(statements, buffer);
        }
        NodeKind::Def {
            name,
            parameters,
            body,
        } => {
            buffer.push(3);
            write_location_field(*name, buffer);
            write_list_field(parameters, buffer);
            write_node_field(body, buffer);
        }
        NodeKind::Return { value } | NodeKind::Break { value } => {
            buffer.push(1);
            write_option_field(value, buffer);
        }
    }
}

/// The trailer: a count, then one fixed-width record per diagnostic in
/// detection order.
fn write_diagnostics(diagnostics: &DiagnosticList, buffer: &mut Vec<u8>) {
    write_u32(diagnostics.len() as u32, buffer);
    for diagnostic in diagnostics.iter() {
        buffer.push(match diagnostic.severity {
            Severity::Error => 0,
            Severity::Warning => 1,
        });
        buffer.push(diagnostic.code.tag());
        write_location(diagnostic.location, buffer);
    }
}
