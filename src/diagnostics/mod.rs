//! Diagnostic collection for the parser.
//!
//! Lexical and syntax problems are never raised as errors: both the lexer
//! and the parser append records to an append-only list and keep going.
//! Callers receive the full list alongside the tree; an empty list is the
//! only signal of a clean parse.

pub mod diagnostics;
