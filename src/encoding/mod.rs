//! Source encoding resolution.
//!
//! The lexer never assumes UTF-8: identifier scanning goes through a table
//! of character-classification functions selected by the magic encoding
//! comment. Embedders can register a fallback callback to supply tables for
//! encodings the engine does not know about.

pub mod encoding;
