//! Control flow graph intermediate representation.
//!
//! A [`Cfg`] describes one method body as basic blocks of [`Binding`]s. Every binding
//! assigns the result of one [`Instruction`] to a local; every block ends in a
//! [`BlockExit`] that either jumps unconditionally or branches on a boolean local. The
//! graph is built by an external lowering pass through the construction primitives on
//! [`Cfg`] and is then consumed by the analyses in this module.
//!
//! # Architecture
//!
//! - [`graph`] - Arena ownership, block allocation and wiring primitives
//! - [`block`], [`binding`], [`instruction`], [`variable`] - The data model
//! - [`dataflow`] - Per-block reads, writes and dead stores
//! - [`sanity`] - Structural invariant checker
//! - [`render`] - Graphviz export
//!
//! # Invariants
//!
//! - Block 0 is the entry and block 1 is the dead block, whose exit is a self-loop
//! - Block ids are dense and strictly increasing in allocation order
//! - Each non-dead block appears exactly once in the back-edges of each successor
//! - A condition local is present exactly when the two successors differ
//!
//! # Thread Safety
//!
//! A [`Cfg`] is exclusively owned by the task processing its method. It is `Send` and
//! `Sync`, so independent graphs can be analyzed in parallel with
//! [`find_all_reads_and_writes_parallel`].

pub mod binding;
pub mod block;
pub mod dataflow;
pub mod graph;
pub mod instruction;
pub mod render;
pub mod sanity;
pub mod variable;

pub use binding::{Binding, Loc};
pub use block::{BasicBlock, BlockExit, BlockFlags, BlockId};
pub use dataflow::{find_all_reads_and_writes_parallel, ReadsAndWrites};
pub use graph::Cfg;
pub use instruction::{CastKind, Instruction, InstructionKind, Literal};
pub use sanity::SanityConfig;
pub use variable::{LocalInfo, LocalKind, LocalRef};
