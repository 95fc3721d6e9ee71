use crate::Location;

/// A syntax tree node: a source range plus a kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub location: Location,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(location: Location, kind: NodeKind) -> Self {
        Node { location, kind }
    }

    /// A placeholder node standing in for an expression the parser expected
    /// but did not find. Zero-width at the given offset.
    pub fn missing(offset: u32) -> Self {
        Node::new(Location::at(offset), NodeKind::Missing)
    }

    /// References to this node's direct children, in source order.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Statements { body } => body.iter().collect(),
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
            | NodeKind::Error => vec![],
            NodeKind::InterpolatedString { parts } => parts.iter().collect(),
            NodeKind::EmbeddedExpression { statements } => vec![statements],
            NodeKind::Array { elements } => elements.iter().collect(),
            NodeKind::Hash { pairs } => pairs.iter().collect(),
            NodeKind::Assoc { key, value } => vec![key, value],
            NodeKind::Binary { left, right, .. } => vec![left, right],
            NodeKind::Unary { operand, .. } => vec![operand],
            NodeKind::Assignment { target, value, .. } => vec![target, value],
            NodeKind::Call {
                receiver,
                arguments,
                ..
            } => {
                let mut children: Vec<&Node> = vec![];
                if let Some(receiver) = receiver {
                    children.push(receiver);
                }
                children.extend(arguments.iter());
                children
            }
            NodeKind::Index {
                receiver,
                arguments,
            } => {
                let mut children: Vec<&Node> = vec![receiver.as_ref()];
                children.extend(arguments.iter());
                children
            }
            NodeKind::If {
                predicate,
                statements,
                consequent,
            } => {
                let mut children: Vec<&Node> = vec![predicate, statements];
                if let Some(consequent) = consequent {
                    children.push(consequent);
                }
                children
            }
            NodeKind::Else { statements } => vec![statements],
            NodeKind::While {
                predicate,
                statements,
            } => vec![predicate, statements],
            NodeKind::Def {
                parameters, body, ..
            } => {
                let mut children: Vec<&Node> = parameters.iter().collect();
                children.push(body);
                children
            }
            NodeKind::Return { value } | NodeKind::Break { value } => {
                value.iter().map(|node| node.as_ref()).collect()
            }
        }
    }
}

/// The closed set of node shapes. Scalar payloads (unescaped text, operator
/// and name ranges) live directly on the variant; child nodes are owned.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// An ordered list of statements. The root of every parse, and the body
    /// of every block construct.
    Statements { body: Vec<Node> },

    IntegerLiteral,
    FloatLiteral,

    /// A string with no interpolation. `unescaped` holds the value with
    /// escape sequences resolved.
    StringLiteral { unescaped: String },
    /// A string with at least one `#{}` part. Parts alternate between
    /// `StringLiteral` chunks and `EmbeddedExpression`s.
    InterpolatedString { parts: Vec<Node> },
    /// One `#{ ... }` inside a string.
    EmbeddedExpression { statements: Box<Node> },
    /// A regular expression literal. The pattern is kept unescaped; flags
    /// stay in the source range.
    Regexp { unescaped: String },

    Identifier,
    NilLiteral,
    TrueLiteral,
    FalseLiteral,

    Array { elements: Vec<Node> },
    /// A hash literal; children are `Assoc` pairs.
    Hash { pairs: Vec<Node> },
    Assoc { key: Box<Node>, value: Box<Node> },

    Binary {
        left: Box<Node>,
        operator: Location,
        right: Box<Node>,
    },
    Unary {
        operator: Location,
        operand: Box<Node>,
    },
    /// Plain and compound assignment; `operator` distinguishes them.
    Assignment {
        target: Box<Node>,
        operator: Location,
        value: Box<Node>,
    },
    /// A method call, with or without a receiver. `message` is the range of
    /// the method name.
    Call {
        receiver: Option<Box<Node>>,
        message: Location,
        arguments: Vec<Node>,
    },
    /// Subscript access, `receiver[arguments]`.
    Index {
        receiver: Box<Node>,
        arguments: Vec<Node>,
    },

    If {
        predicate: Box<Node>,
        statements: Box<Node>,
        /// The attached `elsif` (as a nested `If`) or `Else`, if any.
        consequent: Option<Box<Node>>,
    },
    Else { statements: Box<Node> },
    While {
        predicate: Box<Node>,
        statements: Box<Node>,
    },
    /// A method definition. `name` is the range of the method name token.
    Def {
        name: Location,
        parameters: Vec<Node>,
        body: Box<Node>,
    },
    /// One name in a definition's parameter list.
    Parameter,
    Return { value: Option<Box<Node>> },
    Break { value: Option<Box<Node>> },

    /// Stands in for an expression that was expected but absent.
    Missing,
    /// Wraps a source region the parser skipped while synchronizing.
    Error,
}

impl NodeKind {
    /// Stable numeric tag for the serialized format. New kinds get new
    /// tags; existing tags never change meaning.
    pub fn tag(&self) -> u8 {
        match self {
            NodeKind::Statements { .. } => 0,
            NodeKind::IntegerLiteral => 1,
            NodeKind::FloatLiteral => 2,
            NodeKind::StringLiteral { .. } => 3,
            NodeKind::InterpolatedString { .. } => 4,
            NodeKind::EmbeddedExpression { .. } => 5,
            NodeKind::Regexp { .. } => 6,
            NodeKind::Identifier => 7,
            NodeKind::NilLiteral => 8,
            NodeKind::TrueLiteral => 9,
            NodeKind::FalseLiteral => 10,
            NodeKind::Array { .. } => 11,
            NodeKind::Hash { .. } => 12,
            NodeKind::Assoc { .. } => 13,
            NodeKind::Binary { .. } => 14,
            NodeKind::Unary { .. } => 15,
            NodeKind::Assignment { .. } => 16,
            NodeKind::Call { .. } => 17,
            NodeKind::Index { .. } => 18,
            NodeKind::If { .. } => 19,
            NodeKind::Else { .. } => 20,
            NodeKind::While { .. } => 21,
            NodeKind::Def { .. } => 22,
            NodeKind::Parameter => 23,
            NodeKind::Return { .. } => 24,
            NodeKind::Break { .. } => 25,
            NodeKind::Missing => 26,
            NodeKind::Error => 27,
        }
    }

    /// Human-readable name for the node kind.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Statements { .. } => "STATEMENTS",
            NodeKind::IntegerLiteral => "INTEGER_LITERAL",
            NodeKind::FloatLiteral => "FLOAT_LITERAL",
            NodeKind::StringLiteral { .. } => "STRING_LITERAL",
            NodeKind::InterpolatedString { .. } => "INTERPOLATED_STRING",
            NodeKind::EmbeddedExpression { .. } => "EMBEDDED_EXPRESSION",
            NodeKind::Regexp { .. } => "REGEXP",
            NodeKind::Identifier => "IDENTIFIER",
            NodeKind::NilLiteral => "NIL_LITERAL",
            NodeKind::TrueLiteral => "TRUE_LITERAL",
            NodeKind::FalseLiteral => "FALSE_LITERAL",
            NodeKind::Array { .. } => "ARRAY",
            NodeKind::Hash { .. } => "HASH",
            NodeKind::Assoc { .. } => "ASSOC",
            NodeKind::Binary { .. } => "BINARY",
            NodeKind::Unary { .. } => "UNARY",
            NodeKind::Assignment { .. } => "ASSIGNMENT",
            NodeKind::Call { .. } => "CALL",
            NodeKind::Index { .. } => "INDEX",
            NodeKind::If { .. } => "IF",
            NodeKind::Else { .. } => "ELSE",
            NodeKind::While { .. } => "WHILE",
            NodeKind::Def { .. } => "DEF",
            NodeKind::Parameter => "PARAMETER",
            NodeKind::Return { .. } => "RETURN",
            NodeKind::Break { .. } => "BREAK",
            NodeKind::Missing => "MISSING",
            NodeKind::Error => "ERROR",
        }
    }
}
