//! Shared helpers for the lowering integration tests.

use syc_core::ir::{BlockId, Function, InstKind, Module};

pub fn lower(source: &str) -> Module {
    syc_core::compile(source, "test").expect("program should compile")
}

pub fn main_func(module: &Module) -> &Function {
    module.function_by_name("main").expect("module should define main")
}

/// Blocks whose terminator transfers control to `target`.
pub fn preds(func: &Function, target: BlockId) -> Vec<BlockId> {
    func.block_ids()
        .filter(|&b| {
            func.terminator(b).is_some_and(|t| match &func.inst(t).kind {
                InstKind::Br { dest } => *dest == target,
                InstKind::CondBr { then_dest, else_dest, .. } => {
                    *then_dest == target || *else_dest == target
                }
                _ => false,
            })
        })
        .collect()
}

/// Every block of every defined function is non-empty and carries exactly
/// one terminator, in last position.
pub fn assert_well_formed(module: &Module) {
    for func in module.functions.iter().filter(|f| !f.is_declaration()) {
        for id in func.block_ids() {
            let block = func.block(id);
            assert!(
                !block.insts.is_empty(),
                "block '{}' of '{}' is empty",
                block.name,
                func.name
            );
            let terminators: Vec<usize> = block
                .insts
                .iter()
                .enumerate()
                .filter(|&(_, &inst)| func.inst(inst).is_terminator())
                .map(|(pos, _)| pos)
                .collect();
            assert_eq!(
                terminators,
                vec![block.insts.len() - 1],
                "block '{}' of '{}' must end in its only terminator",
                block.name,
                func.name
            );
        }
    }
}

/// Number of blocks named exactly `name`.
pub fn blocks_named(func: &Function, name: &str) -> usize {
    func.blocks.iter().filter(|b| b.name == name).count()
}
