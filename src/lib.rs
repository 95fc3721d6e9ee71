#![allow(clippy::module_inception)]

pub mod ast;
pub mod diagnostics;
pub mod encoding;
pub mod lexer;
pub mod parser;
pub mod serialize;

/// A half-open `[start, end)` byte range into the source buffer.
///
/// Every token, AST node and diagnostic carries one of these instead of a
/// copy of the source text. Offsets are `u32` because the serialized format
/// stores them as such; sources larger than 4GiB are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub start: u32,
    pub end: u32,
}

impl Location {
    pub fn new(start: u32, end: u32) -> Self {
        Location { start, end }
    }

    /// A zero-width location at the given offset, used for synthesized
    /// tokens and missing nodes.
    pub fn at(offset: u32) -> Self {
        Location {
            start: offset,
            end: offset,
        }
    }

    /// The smallest location spanning both `self` and `other`.
    pub fn join(self, other: Location) -> Location {
        Location {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns true if `other` lies entirely within `self`.
    pub fn contains(self, other: Location) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn len(self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Slices the source buffer with this location.
    pub fn slice(self, source: &[u8]) -> &[u8] {
        &source[self.start as usize..self.end as usize]
    }
}

/// Returns the engine version, which doubles as the serialization format
/// version. Consumers of the binary format must check the major component
/// before decoding.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Parse the given source and append the serialized tree (including the
/// diagnostics trailer) to `buffer`. Convenience composition of
/// init + parse + serialize + teardown for callers that never inspect the
/// tree in memory.
pub fn parse_and_serialize(source: &[u8], buffer: &mut Vec<u8>) {
    let mut parser = parser::parser::Parser::new(source);
    let root = parser.parse();
    parser.serialize(&root, buffer);
    ast::memsize::destroy(root);
}
