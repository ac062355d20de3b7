//! The per-method control flow graph.
//!
//! [`Cfg`] owns an append-only arena of [`BasicBlock`]s and the method's local table.
//! Block 0 is the entry, block 1 is the permanently unreachable dead block whose exit loops
//! back to itself. Every other block is allocated with [`Cfg::fresh_block`] and receives the
//! next id; ids are never reused and blocks are never removed, so a [`BlockId`] stays a
//! valid index for as long as the graph exists.
//!
//! The wiring primitives ([`Cfg::unconditional_jump`], [`Cfg::conditional_jump`],
//! [`Cfg::jump_to_dead`]) set a block's exit and record the matching back-edges in one
//! step, which is the contract [`Cfg::sanity_check`] verifies.

use crate::{
    cfg::{BasicBlock, Binding, BlockExit, BlockFlags, BlockId, LocalInfo, LocalKind, LocalRef, Loc},
    symbols::MethodRef,
    Error::{GraphError, UnknownBlock},
    Result,
};

/// Control flow graph of one method body.
///
/// # Examples
///
/// ```rust
/// use flowgraph::prelude::*;
///
/// let mut cfg = Cfg::new(MethodRef::new(1));
/// let cond = cfg.enter_local("c", LocalKind::Named);
///
/// let then_block = cfg.fresh_block(0, 0);
/// let else_block = cfg.fresh_block(0, 0);
/// cfg.conditional_jump(cfg.entry(), cond, then_block, else_block, Loc::none())?;
/// cfg.jump_to_dead(then_block, Loc::none())?;
/// cfg.jump_to_dead(else_block, Loc::none())?;
///
/// assert_eq!(cfg.block_count(), 4);
/// cfg.sanity_check(&SanityConfig::strict())?;
/// # Ok::<(), flowgraph::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cfg {
    /// The method this graph was built for.
    symbol: MethodRef,
    /// Arena of blocks, indexed by [`BlockId`].
    basic_blocks: Vec<BasicBlock>,
    /// Local table, indexed by [`LocalRef`].
    locals: Vec<LocalInfo>,
    /// Per local, the smallest loop depth at which it is written.
    min_loops: Vec<Option<u32>>,
    /// Largest closure id seen by [`Cfg::fresh_block`].
    max_closure_id: u32,
}

impl Cfg {
    /// Index of the entry block.
    pub const ENTRY: BlockId = BlockId::new(0);

    /// Index of the dead block.
    pub const DEAD: BlockId = BlockId::new(1);

    /// Creates a graph containing only the entry block and the dead block.
    ///
    /// The dead block jumps to itself without a condition, so passes can always branch
    /// into it when control becomes provably unreachable.
    #[must_use]
    pub fn new(symbol: MethodRef) -> Self {
        let mut cfg = Self {
            symbol,
            basic_blocks: Vec::new(),
            locals: vec![
                LocalInfo::new("<none>", LocalKind::Reserved),
                LocalInfo::new("<self>", LocalKind::SelfRef),
            ],
            min_loops: vec![None, None],
            max_closure_id: 0,
        };
        let entry = cfg.fresh_block(0, 0);
        let dead = cfg.fresh_block(0, 0);
        debug_assert_eq!((entry, dead), (Self::ENTRY, Self::DEAD));
        cfg.basic_blocks[dead.index()].exit = Some(BlockExit::jump(dead, Loc::none()));
        cfg
    }

    /// Allocates the next block.
    ///
    /// # Arguments
    ///
    /// * `outer_loops` - Loop-nesting depth of the new block
    /// * `closure_id` - Lexical closure the block belongs to (`0` for the method body)
    ///
    /// # Returns
    ///
    /// The id of the new block, one greater than the previously allocated id.
    ///
    /// # Panics
    ///
    /// Panics once the block ids are exhausted; ids are never reused.
    pub fn fresh_block(&mut self, outer_loops: u32, closure_id: u32) -> BlockId {
        let id = BlockId::new(self.next_block_id());
        self.basic_blocks
            .push(BasicBlock::new(id, outer_loops, closure_id));
        self.max_closure_id = self.max_closure_id.max(closure_id);
        id
    }

    /// Returns the method symbol this graph belongs to.
    #[must_use]
    pub const fn symbol(&self) -> MethodRef {
        self.symbol
    }

    /// Returns the entry block id.
    #[must_use]
    pub const fn entry(&self) -> BlockId {
        Self::ENTRY
    }

    /// Returns the dead block id.
    #[must_use]
    pub const fn dead_block(&self) -> BlockId {
        Self::DEAD
    }

    /// Returns the id the next [`Cfg::fresh_block`] call will hand out.
    ///
    /// # Panics
    ///
    /// Panics once the block ids are exhausted.
    #[must_use]
    pub fn next_block_id(&self) -> u32 {
        dense_id(self.basic_blocks.len(), "block")
    }

    /// Returns the number of blocks, including entry and dead blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.basic_blocks.len()
    }

    /// Returns all blocks in id order.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.basic_blocks
    }

    /// Returns a block by id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.basic_blocks.get(id.index())
    }

    /// Returns a mutable block by id.
    ///
    /// Direct mutation bypasses the back-edge bookkeeping of the wiring primitives; run
    /// [`Cfg::sanity_check`] afterwards.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.basic_blocks.get_mut(id.index())
    }

    fn checked_block_mut(&mut self, id: BlockId) -> Result<&mut BasicBlock> {
        self.basic_blocks.get_mut(id.index()).ok_or(UnknownBlock(id))
    }

    /// Adds a local to the local table and returns its id.
    ///
    /// # Panics
    ///
    /// Panics once the local ids are exhausted.
    pub fn enter_local(&mut self, name: impl Into<String>, kind: LocalKind) -> LocalRef {
        let id = LocalRef::new(dense_id(self.locals.len(), "local"));
        self.locals.push(LocalInfo::new(name, kind));
        self.min_loops.push(None);
        id
    }

    /// Returns the table entry of a local.
    #[must_use]
    pub fn local(&self, var: LocalRef) -> Option<&LocalInfo> {
        self.locals.get(var.index())
    }

    /// Returns the number of local ids, including the reserved ones.
    ///
    /// Every bit-vector produced by the dataflow pass has this width.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.locals.len()
    }

    /// Returns the smallest loop depth at which `var` is written, if it is written at all.
    #[must_use]
    pub fn min_loops(&self, var: LocalRef) -> Option<u32> {
        self.min_loops.get(var.index()).copied().flatten()
    }

    /// Returns the largest closure id any block was allocated with.
    #[must_use]
    pub const fn max_closure_id(&self) -> u32 {
        self.max_closure_id
    }

    /// Appends a binding to a block.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownBlock`] if `block` was not allocated by this graph.
    pub fn push_binding(&mut self, block: BlockId, binding: Binding) -> Result<()> {
        let bb = self.checked_block_mut(block)?;
        let depth = bb.outer_loops;
        let var = binding.bind;
        bb.exprs.push(binding);

        if let Some(slot) = self.min_loops.get_mut(var.index()) {
            *slot = Some(slot.map_or(depth, |current| current.min(depth)));
        }
        Ok(())
    }

    /// Declares `var` as an argument flowing into `block`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownBlock`] if `block` was not allocated by this graph.
    pub fn add_block_arg(&mut self, block: BlockId, var: LocalRef) -> Result<()> {
        self.checked_block_mut(block)?.args.push(var);
        Ok(())
    }

    /// Ends `from` with an unconditional jump to `to`.
    ///
    /// Jumps out of the dead block are ignored so that builders can keep lowering code
    /// after control became unreachable.
    ///
    /// # Errors
    ///
    /// Returns an error if either block is unknown, or if `from` already has an exit.
    pub fn unconditional_jump(&mut self, from: BlockId, to: BlockId, loc: Loc) -> Result<()> {
        if from == Self::DEAD {
            return Ok(());
        }
        self.set_exit(from, BlockExit::jump(to, loc))
    }

    /// Ends `from` with a branch on `cond` to `then_block` / `else_block`.
    ///
    /// A branch whose targets coincide is recorded as an unconditional jump, keeping the
    /// "condition exists iff targets differ" invariant.
    ///
    /// # Errors
    ///
    /// Returns an error if a block is unknown, `from` already has an exit, or `cond` is
    /// the "no variable" sentinel while the targets differ.
    pub fn conditional_jump(
        &mut self,
        from: BlockId,
        cond: LocalRef,
        then_block: BlockId,
        else_block: BlockId,
        loc: Loc,
    ) -> Result<()> {
        if from == Self::DEAD {
            return Ok(());
        }
        if then_block == else_block {
            return self.set_exit(from, BlockExit::jump(then_block, loc));
        }
        if !cond.exists() {
            return Err(GraphError(format!(
                "Branch out of {from} to {then_block}/{else_block} needs a condition variable"
            )));
        }
        self.set_exit(from, BlockExit::branch(cond, then_block, else_block, loc))
    }

    /// Ends `from` with a jump into the dead block.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is unknown or already has an exit.
    pub fn jump_to_dead(&mut self, from: BlockId, loc: Loc) -> Result<()> {
        self.unconditional_jump(from, Self::DEAD, loc)
    }

    fn set_exit(&mut self, from: BlockId, exit: BlockExit) -> Result<()> {
        for target in exit.successors() {
            if self.block(target).is_none() {
                return Err(UnknownBlock(target));
            }
        }
        let bb = self.checked_block_mut(from)?;
        if bb.exit.is_some() {
            return Err(GraphError(format!("Exit of {from} is already set")));
        }
        bb.exit = Some(exit);

        for target in exit.successors() {
            let succ = &mut self.basic_blocks[target.index()];
            succ.back_edges.push(from);
            succ.flags |= BlockFlags::WAS_JUMP_DESTINATION;
        }
        Ok(())
    }

    /// Orders the blocks reachable from the entry so that every block comes before its
    /// successors, ignoring back-edges of loops.
    ///
    /// This is the reverse postorder of a depth-first walk from the entry, the iteration
    /// order used by forward analyses such as type inference. Blocks with an unset exit
    /// are treated as having no successors.
    #[must_use]
    pub fn forwards_topo_sort(&self) -> Vec<BlockId> {
        #[derive(Clone, Copy)]
        enum State {
            Enter,
            Exit,
        }

        let mut visited = vec![false; self.block_count()];
        let mut order = Vec::with_capacity(self.block_count());
        let mut stack = vec![(Self::ENTRY, State::Enter)];

        while let Some((block, state)) = stack.pop() {
            match state {
                State::Enter => {
                    if visited[block.index()] {
                        continue;
                    }
                    visited[block.index()] = true;
                    stack.push((block, State::Exit));

                    let successors: Vec<BlockId> = self.basic_blocks[block.index()]
                        .successors()
                        .collect();
                    for &succ in successors.iter().rev() {
                        if !visited[succ.index()] {
                            stack.push((succ, State::Enter));
                        }
                    }
                }
                State::Exit => order.push(block),
            }
        }

        order.reverse();
        order
    }
}

/// Maps an arena length to the next dense id.
fn dense_id(len: usize, arena: &str) -> u32 {
    match u32::try_from(len) {
        Ok(id) => id,
        Err(_) => panic!("{arena} ids exhausted after {len} entries"),
    }
}
