//! Recursive-descent parser with Pratt expression parsing.
//!
//! This module contains the main Parser struct and parsing functions.
//! The parser uses a Pratt approach with NUD/LED handlers for expression
//! parsing and specialized functions for statement parsing.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//!
//! Parsing never aborts: unexpected input is reported to the diagnostic
//! collector and represented in the tree with missing or error nodes.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
