#![no_main]

use flowgraph::prelude::*;
use libfuzzer_sys::fuzz_target;

// Every byte pair describes one block: the low bits of the first byte pick the number of
// copies and whether the block branches, the second byte picks the targets.
fuzz_target!(|data: &[u8]| {
    let mut cfg = Cfg::new(MethodRef::new(0));
    let locals: Vec<LocalRef> = (0..8)
        .map(|i| cfg.enter_local(format!("v{i}"), LocalKind::Named))
        .collect();

    let recipes: Vec<(u8, u8)> = data.chunks_exact(2).map(|c| (c[0], c[1])).take(64).collect();
    let depth = u32::try_from(data.len() % 3).unwrap_or(0);
    let mut wired = vec![cfg.entry()];
    for _ in 1..recipes.len().max(1) {
        wired.push(cfg.fresh_block(depth, 0));
    }
    let count = u32::try_from(cfg.block_count()).unwrap();

    for (i, &block) in wired.iter().enumerate() {
        let (shape, targets) = recipes.get(i).copied().unwrap_or((0, 0));
        for n in 0..(shape & 0x07) {
            let dest = locals[usize::from((shape >> 3).wrapping_add(n)) % locals.len()];
            let src = locals[usize::from(targets.wrapping_add(n)) % locals.len()];
            let binding = Binding::new(dest, Loc::none(), Instruction::Ident { what: src });
            cfg.push_binding(block, binding).unwrap();
        }

        let then_block = BlockId::new(u32::from(targets & 0x0f) % count);
        let else_block = BlockId::new(u32::from(targets >> 4) % count);
        if shape & 0x80 != 0 {
            let cond = locals[usize::from(shape) % locals.len()];
            cfg.conditional_jump(block, cond, then_block, else_block, Loc::none())
                .unwrap();
        } else {
            cfg.unconditional_jump(block, then_block, Loc::none()).unwrap();
        }
    }

    cfg.enforce_sanity(&SanityConfig::strict());
    assert_eq!(cfg.find_all_reads_and_writes(), cfg.find_all_reads_and_writes());
    let _ = cfg.to_dot(&MethodNames::new());
});
