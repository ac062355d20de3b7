//! Basic blocks and their exits.
//!
//! A [`BasicBlock`] is a straight-line list of [`Binding`]s followed by exactly one
//! [`BlockExit`]: either an unconditional jump (`then_block == else_block`, no condition)
//! or a two-way branch on a boolean local. Blocks never own each other; successors and
//! predecessors are [`BlockId`]s resolved through the owning [`Cfg`].
//!
//! # Back-edges
//!
//! Each block records the blocks that jump to it in `back_edges`. A predecessor appears
//! exactly once in the list of each distinct successor, which is what the sanity checker
//! verifies.

use std::fmt::{self, Write};

use bitflags::bitflags;

use crate::cfg::{Binding, Cfg, LocalRef, Loc};

/// Stable, dense index of a basic block within one [`Cfg`].
///
/// Ids are handed out in allocation order and never reused, so they double as
/// bit-vector offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    /// Creates a block id from a raw index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as an arena / bit-vector offset.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Builder-provided facts about a block
    pub struct BlockFlags: u8 {
        /// The block is the header of a loop
        const LOOP_HEADER = 0x01;
        /// At least one jump targets this block
        const WAS_JUMP_DESTINATION = 0x02;
    }
}

/// The terminator of a basic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockExit {
    /// Branch condition, or [`LocalRef::NONE`] for an unconditional jump.
    pub cond: LocalRef,
    /// Successor taken when `cond` is truthy (the only successor of a jump).
    pub then_block: BlockId,
    /// Successor taken when `cond` is falsy.
    pub else_block: BlockId,
    /// Source location of the branch.
    pub loc: Loc,
}

impl BlockExit {
    /// Creates an unconditional jump to `target`.
    #[must_use]
    pub const fn jump(target: BlockId, loc: Loc) -> Self {
        Self {
            cond: LocalRef::NONE,
            then_block: target,
            else_block: target,
            loc,
        }
    }

    /// Creates a two-way branch on `cond`.
    #[must_use]
    pub const fn branch(cond: LocalRef, then_block: BlockId, else_block: BlockId, loc: Loc) -> Self {
        Self {
            cond,
            then_block,
            else_block,
            loc,
        }
    }

    /// Returns `true` if the exit branches on a condition variable.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        self.cond.exists()
    }

    /// Returns the distinct successors, `then` first.
    pub fn successors(&self) -> impl Iterator<Item = BlockId> {
        let else_block = (self.else_block != self.then_block).then_some(self.else_block);
        std::iter::once(self.then_block).chain(else_block)
    }
}

/// A basic block: bindings plus a single exit.
///
/// Blocks are created through [`Cfg::fresh_block`] and are owned by the graph for its
/// whole lifetime.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    /// Arena index of this block.
    pub(crate) id: BlockId,
    /// How many loops enclose this block.
    pub(crate) outer_loops: u32,
    /// Lexical closure (block body) this block belongs to; `0` is the method body.
    pub(crate) closure_id: u32,
    /// Builder-provided flags.
    pub flags: BlockFlags,
    /// Locals flowing into this block from its predecessors.
    pub args: Vec<LocalRef>,
    /// Bindings in program order.
    pub exprs: Vec<Binding>,
    /// The terminator, unset until the builder wires the block.
    pub exit: Option<BlockExit>,
    /// Predecessors, one entry per incoming jump.
    pub back_edges: Vec<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId, outer_loops: u32, closure_id: u32) -> Self {
        Self {
            id,
            outer_loops,
            closure_id,
            flags: BlockFlags::empty(),
            args: Vec::new(),
            exprs: Vec::new(),
            exit: None,
            back_edges: Vec::new(),
        }
    }

    /// Returns the block id.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the loop-nesting depth.
    #[must_use]
    pub const fn outer_loops(&self) -> u32 {
        self.outer_loops
    }

    /// Returns the closure id this block belongs to.
    #[must_use]
    pub const fn closure_id(&self) -> u32 {
        self.closure_id
    }

    /// Returns the distinct successors of this block; empty while the exit is unset.
    pub fn successors(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.exit.iter().flat_map(BlockExit::successors)
    }

    /// Renders the block as a multi-line dump.
    #[must_use]
    pub fn render(&self, cfg: &Cfg) -> String {
        let mut buf = format!(
            "block[id={}, closureId={}]({})\n",
            self.id.0,
            self.closure_id,
            self.show_args(cfg)
        );
        if self.outer_loops > 0 {
            let _ = writeln!(buf, "outerLoops: {}", self.outer_loops);
        }
        for binding in &self.exprs {
            let _ = writeln!(buf, "{}", binding.render(cfg));
        }
        self.show_exit(cfg, &mut buf);
        buf
    }

    /// Renders the block with every binding as a structured dump.
    #[must_use]
    pub fn show_raw(&self, cfg: &Cfg) -> String {
        let mut buf = format!("block[id={}]({})\n", self.id.0, self.show_args(cfg));
        if self.outer_loops > 0 {
            let _ = writeln!(buf, "outerLoops: {}", self.outer_loops);
        }
        for binding in &self.exprs {
            let _ = writeln!(buf, "{}", binding.show_raw(cfg));
        }
        self.show_exit(cfg, &mut buf);
        buf
    }

    fn show_args(&self, cfg: &Cfg) -> String {
        self.args
            .iter()
            .map(|arg| arg.show(cfg))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn show_exit(&self, cfg: &Cfg, buf: &mut String) {
        match &self.exit {
            Some(exit) if exit.is_conditional() => buf.push_str(&exit.cond.show(cfg)),
            Some(_) => buf.push_str("<unconditional>"),
            None => buf.push_str("<exit unset>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::{Instruction, LocalKind},
        symbols::MethodRef,
    };

    #[test]
    fn test_exit_successors() {
        let jump = BlockExit::jump(BlockId::new(3), Loc::none());
        assert!(!jump.is_conditional());
        assert_eq!(jump.successors().collect::<Vec<_>>(), vec![BlockId::new(3)]);

        let branch = BlockExit::branch(
            LocalRef::new(5),
            BlockId::new(3),
            BlockId::new(4),
            Loc::none(),
        );
        assert!(branch.is_conditional());
        assert_eq!(
            branch.successors().collect::<Vec<_>>(),
            vec![BlockId::new(3), BlockId::new(4)]
        );
    }

    #[test]
    fn test_unset_exit_has_no_successors() {
        let block = BasicBlock::new(BlockId::new(2), 0, 0);
        assert_eq!(block.successors().count(), 0);
    }

    #[test]
    fn test_flags() {
        let mut flags = BlockFlags::default();
        assert!(flags.is_empty());
        flags |= BlockFlags::LOOP_HEADER;
        assert!(flags.contains(BlockFlags::LOOP_HEADER));
        assert!(!flags.contains(BlockFlags::WAS_JUMP_DESTINATION));
    }

    #[test]
    fn test_render_block() -> crate::Result<()> {
        let mut cfg = Cfg::new(MethodRef::new(0));
        let x = cfg.enter_local("x", LocalKind::Named);
        let y = cfg.enter_local("y", LocalKind::Named);
        let cond = cfg.enter_local("c", LocalKind::Named);
        let body = cfg.fresh_block(2, 1);
        let other = cfg.fresh_block(2, 1);

        cfg.add_block_arg(body, y)?;
        cfg.push_binding(body, Binding::new(x, Loc::none(), Instruction::Ident { what: y }))?;
        cfg.conditional_jump(body, cond, other, cfg.dead_block(), Loc::none())?;

        let block = cfg.block(body).unwrap();
        assert_eq!(
            block.render(&cfg),
            "block[id=2, closureId=1](y)\nouterLoops: 2\nx = y\nc"
        );
        assert!(block.show_raw(&cfg).starts_with("block[id=2](y)\nouterLoops: 2\nBinding {"));
        assert!(cfg
            .block(other)
            .unwrap()
            .render(&cfg)
            .ends_with("<exit unset>"));
        Ok(())
    }
}
