//! # flowgraph Prelude
//!
//! Import this module to get the types needed to build a graph, run the
//! reads/writes pass over it and verify it.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all flowgraph operations
pub use crate::Error;

/// The result type used throughout flowgraph
pub use crate::Result;

// ================================================================================================
// Graph Data Model
// ================================================================================================

/// Blocks, bindings, instructions and locals
pub use crate::cfg::{
    BasicBlock, Binding, BlockExit, BlockFlags, BlockId, Cfg, CastKind, Instruction,
    InstructionKind, Literal, LocalInfo, LocalKind, LocalRef, Loc,
};

// ================================================================================================
// Analyses
// ================================================================================================

/// Reads/writes/dead-store facts and the sanity checker configuration
pub use crate::cfg::{find_all_reads_and_writes_parallel, ReadsAndWrites, SanityConfig};

// ================================================================================================
// Symbols and Utilities
// ================================================================================================

/// Method symbols and name resolution
pub use crate::symbols::{MethodNames, MethodRef, SymbolTable};

/// Dense bit-vector used by the analyses
pub use crate::utils::BitSet;
