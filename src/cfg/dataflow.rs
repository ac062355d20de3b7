//! Per-block reads, writes and dead stores.
//!
//! Type inference needs three facts for every block: which locals the block reads, which
//! it writes, and which of its writes are dead stores. This module computes them in two
//! passes over a finished [`Cfg`].
//!
//! # Pass one: local scan
//!
//! Bindings are scanned in program order. For `bind = value`:
//!
//! 1. `bind` is marked written.
//! 2. If `bind` aliases a global and `value` is not the alias introduction itself, `bind`
//!    is also marked read. Type information for aliased globals only crosses block
//!    boundaries through the read channel, so such a write observes the prior value.
//! 3. Every read operand of `value` is marked read.
//! 4. If `bind` has not been read by this or an earlier binding of the block, it is marked
//!    dead.
//!
//! Finally the exit condition, if any, is marked read.
//!
//! The dead bit is only ever set. A later read in the same block does not retract a dead
//! mark left by an earlier write of the same local, so the result is a conservative,
//! block-local over-approximation rather than an exact liveness fixpoint.
//!
//! # Pass two: private locals
//!
//! A local that is read or written in exactly one block of the whole graph never takes
//! part in cross-block propagation. Its write bit is cleared in that block so inference
//! does not merge its type at block joins.
//!
//! # Example
//!
//! ```rust
//! use flowgraph::prelude::*;
//!
//! let mut cfg = Cfg::new(MethodRef::new(0));
//! let y = cfg.enter_local("y", LocalKind::Named);
//! let x = cfg.enter_local("x", LocalKind::Named);
//! let z = cfg.enter_local("z", LocalKind::Named);
//!
//! let body = cfg.fresh_block(0, 0);
//! cfg.push_binding(body, Binding::new(x, Loc::none(), Instruction::Ident { what: y }))?;
//! cfg.push_binding(body, Binding::new(z, Loc::none(), Instruction::Ident { what: x }))?;
//!
//! let facts = cfg.find_all_reads_and_writes();
//! // x was unread when written; the later read does not clear the mark
//! assert!(facts.dead(body).contains(x.index()));
//! assert!(facts.dead(body).contains(z.index()));
//! assert!(facts.reads(body).contains(x.index()));
//! # Ok::<(), flowgraph::Error>(())
//! ```

use rayon::prelude::*;
use tracing::{debug, debug_span, trace};

use crate::{
    cfg::{BlockId, Cfg},
    utils::BitSet,
};

/// Result of [`Cfg::find_all_reads_and_writes`].
///
/// Each vector is indexed by block id; each [`BitSet`] is indexed by local id and is
/// [`Cfg::variable_count`] bits wide.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadsAndWrites {
    /// Locals read in each block.
    pub reads: Vec<BitSet>,
    /// Locals written in each block, with single-block locals cleared.
    pub writes: Vec<BitSet>,
    /// Locals with a dead store in each block.
    pub dead: Vec<BitSet>,
}

impl ReadsAndWrites {
    /// Returns the locals read in `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the analyzed graph.
    #[must_use]
    pub fn reads(&self, block: BlockId) -> &BitSet {
        &self.reads[block.index()]
    }

    /// Returns the locals written in `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the analyzed graph.
    #[must_use]
    pub fn writes(&self, block: BlockId) -> &BitSet {
        &self.writes[block.index()]
    }

    /// Returns the locals with a dead store in `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not part of the analyzed graph.
    #[must_use]
    pub fn dead(&self, block: BlockId) -> &BitSet {
        &self.dead[block.index()]
    }

    /// Returns the number of analyzed blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.reads.len()
    }
}

impl Cfg {
    /// Computes per-block reads, writes and dead stores.
    ///
    /// The graph is not modified, and calling this twice on an unchanged graph yields
    /// identical results.
    ///
    /// # Panics
    ///
    /// Panics if a binding or exit refers to a local outside the local table. Graphs that
    /// pass [`Cfg::sanity_check`] with operand checking enabled never do.
    #[must_use]
    pub fn find_all_reads_and_writes(&self) -> ReadsAndWrites {
        let _span = debug_span!("find_all_reads_and_writes", method = %self.symbol()).entered();

        let block_count = self.block_count();
        let var_count = self.variable_count();

        let mut target = ReadsAndWrites {
            reads: Vec::with_capacity(block_count),
            writes: Vec::with_capacity(block_count),
            dead: Vec::with_capacity(block_count),
        };
        let mut reads_and_writes = Vec::with_capacity(block_count);

        for bb in self.blocks() {
            let mut block_reads = BitSet::new(var_count);
            let mut block_writes = BitSet::new(var_count);
            let mut block_dead = BitSet::new(var_count);
            let mut block_reads_and_writes = BitSet::new(var_count);

            for binding in &bb.exprs {
                let dest = binding.bind.index();
                block_writes.insert(dest);
                block_reads_and_writes.insert(dest);

                if binding.bind.is_alias_for_global(self) && !binding.value.is_alias() {
                    block_reads.insert(dest);
                }

                binding.value.for_each_read(|var| {
                    block_reads.insert(var.index());
                    block_reads_and_writes.insert(var.index());
                });

                if !block_reads.contains(dest) {
                    block_dead.insert(dest);
                }
            }

            if let Some(exit) = &bb.exit {
                if exit.cond.exists() {
                    block_reads.insert(exit.cond.index());
                    block_reads_and_writes.insert(exit.cond.index());
                }
            }

            target.reads.push(block_reads);
            target.writes.push(block_writes);
            target.dead.push(block_dead);
            reads_and_writes.push(block_reads_and_writes);
        }

        // (number of blocks touching the local, first such block)
        let mut usage_counts: Vec<(u32, usize)> = vec![(0, 0); var_count];
        {
            let _span = debug_span!("privates1").entered();
            for (block_idx, touched) in reads_and_writes.iter().enumerate() {
                for var in touched.iter() {
                    let usage = &mut usage_counts[var];
                    if usage.0 == 0 {
                        usage.1 = block_idx;
                    }
                    usage.0 += 1;
                }
            }
        }
        {
            let _span = debug_span!("privates2").entered();
            let mut privates = 0usize;
            for (var, &(count, block_idx)) in usage_counts.iter().enumerate() {
                if count == 1 {
                    target.writes[block_idx].remove(var);
                    privates += 1;
                }
            }
            trace!(privates, "cleared single-block writes");
        }

        debug!(
            blocks = block_count,
            variables = var_count,
            "computed reads and writes"
        );
        target
    }
}

/// Runs [`Cfg::find_all_reads_and_writes`] over many independent graphs on the rayon
/// thread pool.
///
/// Each graph is only read, so no synchronization is needed beyond rayon's own. Results
/// are returned in input order.
///
/// # Examples
///
/// ```rust
/// use flowgraph::prelude::*;
///
/// let cfgs: Vec<Cfg> = (0..8).map(|i| Cfg::new(MethodRef::new(i))).collect();
/// let facts = find_all_reads_and_writes_parallel(&cfgs);
/// assert_eq!(facts.len(), 8);
/// assert_eq!(facts[3].block_count(), 2);
/// ```
#[must_use]
pub fn find_all_reads_and_writes_parallel(cfgs: &[Cfg]) -> Vec<ReadsAndWrites> {
    cfgs.par_iter().map(Cfg::find_all_reads_and_writes).collect()
}
