//! Control flow graph integration tests.
//!
//! These tests drive the public API the way a lowering pass and the type checker do:
//! 1. Allocate blocks and locals on a fresh `Cfg`
//! 2. Append bindings and wire exits through the construction primitives
//! 3. Verify the graph with the sanity checker
//! 4. Run the reads/writes pass and inspect the per-block bit-vectors
//! 5. Export to graphviz

use flowgraph::prelude::*;

/// Builds `x := y` style copies.
fn copy(dest: LocalRef, src: LocalRef) -> Binding {
    Binding::new(dest, Loc::none(), Instruction::Ident { what: src })
}

fn named(cfg: &mut Cfg, name: &str) -> LocalRef {
    cfg.enter_local(name, LocalKind::Named)
}

/// `entry -> a -> b -> dead`, returning `(a, b)`.
fn two_block_chain(cfg: &mut Cfg) -> Result<(BlockId, BlockId)> {
    let a = cfg.fresh_block(0, 0);
    let b = cfg.fresh_block(0, 0);
    cfg.unconditional_jump(cfg.entry(), a, Loc::none())?;
    cfg.unconditional_jump(a, b, Loc::none())?;
    cfg.jump_to_dead(b, Loc::none())?;
    Ok((a, b))
}

#[test]
fn new_graph_has_entry_and_dead_block() {
    let cfg = Cfg::new(MethodRef::new(11));
    assert_eq!(cfg.block_count(), 2);
    assert_eq!(cfg.entry(), BlockId::new(0));
    assert_eq!(cfg.dead_block(), BlockId::new(1));

    let dead = cfg.block(cfg.dead_block()).unwrap();
    let exit = dead.exit.expect("dead block is wired at construction");
    assert_eq!(exit.then_block, cfg.dead_block());
    assert_eq!(exit.else_block, cfg.dead_block());
    assert!(!exit.cond.exists());
}

#[test]
fn fresh_block_ids_are_dense_and_never_reused() {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let first: Vec<_> = (0..3).map(|_| cfg.fresh_block(0, 0)).collect();
    let second: Vec<_> = (0..3).map(|_| cfg.fresh_block(1, 2)).collect();

    let ids: Vec<u32> = first.iter().chain(&second).map(|b| b.id()).collect();
    assert_eq!(ids, vec![2, 3, 4, 5, 6, 7]);
    assert_eq!(cfg.block_count(), 8);
    for (index, bb) in cfg.blocks().iter().enumerate() {
        assert_eq!(bb.id().index(), index);
    }
}

#[test]
fn condition_exists_iff_targets_differ() -> Result<()> {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let c = named(&mut cfg, "c");
    let a = cfg.fresh_block(0, 0);
    let b = cfg.fresh_block(0, 0);
    cfg.conditional_jump(cfg.entry(), c, a, b, Loc::none())?;
    cfg.conditional_jump(a, c, b, b, Loc::none())?;
    cfg.jump_to_dead(b, Loc::none())?;

    for bb in cfg.blocks() {
        if bb.id() == cfg.dead_block() {
            continue;
        }
        let exit = bb.exit.unwrap();
        assert_eq!(exit.cond.exists(), exit.then_block != exit.else_block);
    }
    cfg.sanity_check(&SanityConfig::strict())
}

#[test]
fn sanity_rejects_missing_back_edge() -> Result<()> {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let (a, b) = two_block_chain(&mut cfg)?;
    cfg.sanity_check(&SanityConfig::default())?;

    // a claims to jump to b but b no longer lists a
    cfg.block_mut(b).unwrap().back_edges.retain(|&pred| pred != a);
    match cfg.sanity_check(&SanityConfig::default()) {
        Err(Error::Invariant { block, message, .. }) => {
            assert_eq!(block, a);
            assert!(message.contains("then has 0 back edges"), "{message}");
        }
        other => panic!("expected an invariant violation, got {other:?}"),
    }
    Ok(())
}

#[test]
#[should_panic(expected = "then has 2 back edges")]
fn enforce_sanity_panics_on_duplicate_back_edge() {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let (a, b) = two_block_chain(&mut cfg).unwrap();
    cfg.block_mut(b).unwrap().back_edges.push(a);
    cfg.enforce_sanity(&SanityConfig::default());
}

#[test]
fn single_copy_reads_source_and_marks_destination_dead() -> Result<()> {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let y = named(&mut cfg, "y");
    let x = named(&mut cfg, "x");
    let sink = named(&mut cfg, "sink");
    let (a, b) = two_block_chain(&mut cfg)?;
    cfg.push_binding(a, copy(x, y))?;
    // keep x live across blocks so its write survives private suppression
    cfg.push_binding(b, copy(sink, x))?;

    let rw = cfg.find_all_reads_and_writes();
    assert_eq!(rw.reads(a).iter().collect::<Vec<_>>(), vec![y.index()]);
    assert_eq!(rw.writes(a).iter().collect::<Vec<_>>(), vec![x.index()]);
    assert!(rw.dead(a).contains(x.index()));
    Ok(())
}

#[test]
fn later_read_does_not_clear_dead_mark() -> Result<()> {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let y = named(&mut cfg, "y");
    let x = named(&mut cfg, "x");
    let z = named(&mut cfg, "z");
    let (a, _) = two_block_chain(&mut cfg)?;
    cfg.push_binding(a, copy(x, y))?;
    cfg.push_binding(a, copy(z, x))?;

    let rw = cfg.find_all_reads_and_writes();
    // x was unread when written; the dead bit is never cleared within the block
    assert!(rw.dead(a).contains(x.index()));
    assert!(rw.dead(a).contains(z.index()));
    assert!(rw.reads(a).contains(x.index()));
    Ok(())
}

#[test]
fn private_locals_lose_their_write_bit() -> Result<()> {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let v = named(&mut cfg, "v");
    let w = named(&mut cfg, "w");
    let seed = named(&mut cfg, "seed");
    let (a, b) = two_block_chain(&mut cfg)?;

    // v lives entirely in b; w crosses from a into b
    cfg.push_binding(a, copy(w, seed))?;
    cfg.push_binding(b, copy(v, seed))?;
    cfg.push_binding(b, copy(v, v))?;
    cfg.push_binding(b, copy(seed, w))?;

    let rw = cfg.find_all_reads_and_writes();
    assert!(!rw.writes(b).contains(v.index()));
    assert!(rw.reads(b).contains(v.index()));
    assert!(rw.writes(a).contains(w.index()));
    assert!(rw.reads(b).contains(w.index()));
    Ok(())
}

#[test]
fn branch_condition_counts_as_a_read() -> Result<()> {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let c = named(&mut cfg, "c");
    let a = cfg.fresh_block(0, 0);
    cfg.push_binding(
        cfg.entry(),
        Binding::new(c, Loc::none(), Instruction::Literal { value: Literal::Bool(true) }),
    )?;
    cfg.conditional_jump(cfg.entry(), c, a, cfg.dead_block(), Loc::none())?;
    cfg.jump_to_dead(a, Loc::none())?;

    let rw = cfg.find_all_reads_and_writes();
    assert!(rw.reads(cfg.entry()).contains(c.index()));
    assert!(rw.dead(cfg.entry()).contains(c.index()));
    Ok(())
}

#[test]
fn reads_and_writes_is_idempotent() -> Result<()> {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let y = named(&mut cfg, "y");
    let x = named(&mut cfg, "x");
    let (a, b) = two_block_chain(&mut cfg)?;
    cfg.push_binding(a, copy(x, y))?;
    cfg.push_binding(b, copy(y, x))?;

    let first = cfg.find_all_reads_and_writes();
    let second = cfg.find_all_reads_and_writes();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn dot_export_has_one_node_and_edge_per_block() -> Result<()> {
    let names = MethodNames::new();
    names.insert(MethodRef::new(5), "Widget#render");

    let mut cfg = Cfg::new(MethodRef::new(5));
    let c = named(&mut cfg, "c");
    let then_block = cfg.fresh_block(0, 0);
    let else_block = cfg.fresh_block(0, 0);
    let join = cfg.fresh_block(0, 0);
    cfg.conditional_jump(cfg.entry(), c, then_block, else_block, Loc::none())?;
    cfg.unconditional_jump(then_block, join, Loc::none())?;
    cfg.unconditional_jump(else_block, join, Loc::none())?;
    cfg.jump_to_dead(join, Loc::none())?;

    let dot = cfg.to_dot(&names);
    assert!(dot.starts_with("subgraph \"cluster_Widget#render\" {"));
    assert!(dot.ends_with('}'));
    assert_eq!(dot.matches("        label = ").count(), cfg.block_count());
    assert_eq!(dot.matches("[style=\"bold\"]").count(), cfg.block_count());
    assert_eq!(dot.matches("[style=\"tapered\"]").count(), 1);
    Ok(())
}

#[test]
fn parallel_pass_matches_sequential_pass() -> Result<()> {
    let mut cfgs = Vec::new();
    for method in 0..12 {
        let mut cfg = Cfg::new(MethodRef::new(method));
        let y = named(&mut cfg, "y");
        let x = named(&mut cfg, "x");
        let (a, b) = two_block_chain(&mut cfg)?;
        cfg.push_binding(a, copy(x, y))?;
        if method % 2 == 0 {
            cfg.push_binding(b, copy(y, x))?;
        }
        cfgs.push(cfg);
    }

    let parallel = find_all_reads_and_writes_parallel(&cfgs);
    for (cfg, facts) in cfgs.iter().zip(&parallel) {
        assert_eq!(&cfg.find_all_reads_and_writes(), facts);
    }
    Ok(())
}
