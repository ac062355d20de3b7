//! Small, dependency-free helpers shared across the crate.
//!
//! - [`BitSet`] - Dense bit-vector keyed by variable or block index
//! - [`escape_c`] / [`escape_label`] - Escaping for graphviz output

mod bitset;
mod dot;

pub use bitset::{BitSet, BitSetIter};
pub use dot::{escape_c, escape_label};
