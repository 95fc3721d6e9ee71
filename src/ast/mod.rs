//! The syntax tree.
//!
//! Nodes form a single owned tree: children are held by value, in boxes or
//! vectors, so dropping the root drops everything. Every node carries the
//! byte range of the source it was parsed from, and parents always cover
//! their children.

pub mod ast;
pub mod memsize;

#[cfg(test)]
mod tests;
