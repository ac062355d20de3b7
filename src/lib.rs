// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # flowgraph
//!
//! The control-flow-graph layer of a static type-checker for a dynamic language. A
//! [`cfg::Cfg`] is built once per analyzed method by an external builder (which lowers
//! the syntax tree into bindings), is consumed by the reads/writes dataflow pass whose
//! per-block bit-vectors drive type inference, and is guarded by a structural sanity
//! checker that runs after construction and after every rewriting pass.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowgraph::prelude::*;
//!
//! let mut cfg = Cfg::new(MethodRef::new(7));
//! let y = cfg.enter_local("y", LocalKind::Named);
//! let x = cfg.enter_local("x", LocalKind::Named);
//!
//! let body = cfg.fresh_block(0, 0);
//! cfg.unconditional_jump(cfg.entry(), body, Loc::none())?;
//! cfg.push_binding(body, Binding::new(x, Loc::none(), Instruction::Ident { what: y }))?;
//! cfg.jump_to_dead(body, Loc::none())?;
//!
//! cfg.sanity_check(&SanityConfig::default())?;
//!
//! let facts = cfg.find_all_reads_and_writes();
//! assert!(facts.reads(body).contains(y.index()));
//! assert!(facts.dead(body).contains(x.index()));
//! # Ok::<(), flowgraph::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`cfg`] - Data model (blocks, bindings, instructions, locals), construction
//!   primitives, the dataflow pass, the sanity checker and graphviz export
//! - [`symbols`] - The read-only method-name collaborator used for rendering
//! - [`utils`] - Dense bit-vectors and escaping helpers
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Ownership model
//!
//! Blocks live in an append-only arena owned by the [`cfg::Cfg`]. Branch targets and
//! back-edges are [`cfg::BlockId`]s resolved through that arena, so a block id is a
//! stable, dense index for the lifetime of the graph and can be used directly as a
//! bit-vector offset.
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]. The dataflow pass opens `debug` spans named
//! `find_all_reads_and_writes`, `privates1` and `privates2`; no subscriber is installed
//! by the library.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// ```rust
/// use flowgraph::prelude::*;
///
/// let cfg = Cfg::new(MethodRef::new(0));
/// assert_eq!(cfg.block_count(), 2);
/// ```
pub mod prelude;

/// Control flow graph data model, construction, dataflow and verification.
///
/// # Key Types
///
/// - [`cfg::Cfg`] - Owns every basic block and local of one method body
/// - [`cfg::BasicBlock`] - Bindings plus a single jump or two-way branch exit
/// - [`cfg::Binding`] - `destination = instruction` with a source location
/// - [`cfg::Instruction`] - Closed set of operation kinds with their read operands
/// - [`cfg::ReadsAndWrites`] - Output of the reads/writes/dead-store pass
/// - [`cfg::SanityConfig`] - Runtime switches for the invariant checker
pub mod cfg;

/// Method symbols and the name-resolution collaborator.
pub mod symbols;

/// Bit-vectors and text escaping shared by the analyses and the renderer.
pub mod utils;

/// `flowgraph` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `flowgraph` Error type
///
/// Every error in this crate describes an internal-consistency problem in a graph handed
/// to it by a builder or a rewriting pass; none of them are caused by user programs.
///
/// # Examples
///
/// ```rust
/// use flowgraph::{cfg::{Cfg, SanityConfig}, symbols::MethodRef, Error};
///
/// let mut cfg = Cfg::new(MethodRef::new(1));
/// let orphan = cfg.fresh_block(0, 0);
///
/// match cfg.sanity_check(&SanityConfig::default()) {
///     Err(Error::ExitUnset { block, .. }) => assert_eq!(block, cfg.entry()),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// # let _ = orphan;
/// ```
pub use error::Error;
