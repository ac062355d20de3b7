//! Structural invariant checking for control flow graphs.
//!
//! The checker walks every block in id order and verifies the bookkeeping that the
//! wiring primitives maintain:
//!
//! - every block has an exit
//! - outside the dead block, the block appears exactly once in the back-edge list of its
//!   `then` successor and exactly once in that of its `else` successor
//! - a condition variable is present exactly when the two successors differ
//! - optionally, every local referenced by a binding, a block argument or a condition is
//!   part of the local table
//!
//! Which checks run is decided at runtime through [`SanityConfig`], so tests and
//! development tooling can opt in while production pipelines skip the walk.
//!
//! # Example
//!
//! ```rust
//! use flowgraph::prelude::*;
//!
//! let mut cfg = Cfg::new(MethodRef::new(3));
//! let body = cfg.fresh_block(0, 0);
//! cfg.unconditional_jump(cfg.entry(), body, Loc::none())?;
//! cfg.jump_to_dead(body, Loc::none())?;
//!
//! cfg.sanity_check(&SanityConfig::default())?;
//! # Ok::<(), flowgraph::Error>(())
//! ```

use tracing::{debug, error};

use crate::{
    cfg::{BasicBlock, BlockId, Cfg, LocalRef},
    Error::{ExitUnset, UnknownVariable},
    Result,
};

/// Selects which invariants [`Cfg::sanity_check`] verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SanityConfig {
    /// Master switch; when `false` the check returns immediately
    pub enabled: bool,

    /// Every block must have its exit set
    pub check_exits: bool,

    /// Back-edge counts and condition presence must match each exit
    pub check_back_edges: bool,

    /// Every referenced local must exist in the local table
    pub check_operands: bool,

    /// Every recorded back-edge must come from a block whose exit targets the block
    /// (only enabled by [`SanityConfig::strict`])
    pub check_predecessors: bool,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_exits: true,
            check_back_edges: true,
            check_operands: true,
            check_predecessors: false,
        }
    }
}

impl SanityConfig {
    /// Creates a configuration that skips the check entirely
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            check_exits: false,
            check_back_edges: false,
            check_operands: false,
            check_predecessors: false,
        }
    }

    /// Creates a configuration that only verifies that every exit is set
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            enabled: true,
            check_exits: true,
            check_back_edges: false,
            check_operands: false,
            check_predecessors: false,
        }
    }

    /// Creates a configuration with every check enabled
    #[must_use]
    pub fn strict() -> Self {
        Self {
            enabled: true,
            check_exits: true,
            check_back_edges: true,
            check_operands: true,
            check_predecessors: true,
        }
    }
}

impl Cfg {
    /// Verifies the structural invariants selected by `config`.
    ///
    /// Blocks are visited in id order and the first violation is returned.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::ExitUnset`] if a block was never wired
    /// - [`crate::Error::Invariant`] if back-edges or the condition disagree with an exit
    /// - [`crate::Error::UnknownVariable`] if a referenced local is outside the local table
    pub fn sanity_check(&self, config: &SanityConfig) -> Result<()> {
        if !config.enabled {
            debug!(method = %self.symbol(), "sanity check disabled");
            return Ok(());
        }

        let result = self
            .blocks()
            .iter()
            .try_for_each(|bb| self.check_block(bb, config));
        if let Err(err) = &result {
            error!(method = %self.symbol(), %err, "sanity check failed");
        }
        result
    }

    /// Runs [`Cfg::sanity_check`] and aborts on the first violation.
    ///
    /// # Panics
    ///
    /// Panics with the violation, including the rendered offending block.
    pub fn enforce_sanity(&self, config: &SanityConfig) {
        if let Err(err) = self.sanity_check(config) {
            panic!("{err}");
        }
    }

    fn check_block(&self, bb: &BasicBlock, config: &SanityConfig) -> Result<()> {
        let id = bb.id();

        if config.check_operands {
            self.check_operands(bb)?;
        }
        // back-edge lists are checked for every block, the dead block included
        if config.check_predecessors {
            self.check_predecessors(bb)?;
        }

        let Some(exit) = &bb.exit else {
            return if config.check_exits {
                Err(ExitUnset {
                    block: id,
                    rendered: bb.render(self),
                })
            } else {
                Ok(())
            };
        };

        if id == Self::DEAD {
            return Ok(());
        }

        if config.check_back_edges {
            let then_count = self.back_edge_count(exit.then_block, id);
            let else_count = self.back_edge_count(exit.else_block, id);
            if then_count != 1 {
                return Err(invariant_error!(
                    id,
                    bb.render(self),
                    "bb id={}; then has {} back edges",
                    id.id(),
                    then_count
                ));
            }
            if else_count != 1 {
                return Err(invariant_error!(
                    id,
                    bb.render(self),
                    "bb id={}; else has {} back edges",
                    id.id(),
                    else_count
                ));
            }

            let same_target = exit.then_block == exit.else_block;
            if same_target && exit.cond.exists() {
                return Err(invariant_error!(
                    id,
                    bb.render(self),
                    "Unconditional jump carries condition {:?}",
                    exit.cond
                ));
            }
            if !same_target && !exit.cond.exists() {
                return Err(invariant_error!(
                    id,
                    bb.render(self),
                    "Branch to {} / {} has no condition",
                    exit.then_block,
                    exit.else_block
                ));
            }
        }

        Ok(())
    }

    fn check_predecessors(&self, bb: &BasicBlock) -> Result<()> {
        let id = bb.id();
        for &pred in &bb.back_edges {
            let targets_us = self
                .block(pred)
                .and_then(|p| p.exit.as_ref())
                .is_some_and(|e| e.then_block == id || e.else_block == id);
            if !targets_us {
                return Err(invariant_error!(
                    id,
                    bb.render(self),
                    "Back-edge from {} has no matching exit",
                    pred
                ));
            }
        }
        Ok(())
    }

    fn back_edge_count(&self, target: BlockId, from: BlockId) -> usize {
        self.block(target)
            .map_or(0, |t| t.back_edges.iter().filter(|&&b| b == from).count())
    }

    fn check_operands(&self, bb: &BasicBlock) -> Result<()> {
        let var_count = self.variable_count();
        let mut dangling = None;
        let mut check = |var: LocalRef| {
            if dangling.is_none() && var.index() >= var_count {
                dangling = Some(var);
            }
        };

        bb.args.iter().copied().for_each(&mut check);
        for binding in &bb.exprs {
            check(binding.bind);
            binding.value.for_each_read(&mut check);
        }
        if let Some(exit) = &bb.exit {
            check(exit.cond);
        }

        match dangling {
            Some(variable) => Err(UnknownVariable {
                block: bb.id(),
                variable,
                rendered: bb.render(self),
            }),
            None => Ok(()),
        }
    }
}
