//! Binary serialization of trees and diagnostics.
//!
//! The format is versioned and self-describing enough to walk without a
//! schema: a magic header, the package version, the tree in pre-order with
//! tagged fields, then a diagnostics trailer. All integers are little
//! endian.

pub mod serialize;
