//! Lexical analysis for Sable source.
//!
//! The lexer turns a borrowed byte buffer into a lazy sequence of tokens.
//! It handles:
//!
//! - Encoding-aware identifier scanning via the active encoding table
//! - Magic encoding comments in the first two lines
//! - A mode stack for strings, interpolation, regexps and heredocs
//! - One-token-lookback disambiguation (regexp vs. division)
//! - Diagnostics for invalid bytes and unterminated literals, never aborting

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
