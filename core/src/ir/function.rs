//! file: core/src/ir/function.rs
//! description: IR functions: an instruction arena plus ordered basic blocks.
//!
use super::block::BasicBlock;
use super::instr::Inst;
use super::types::Type;
use super::value::{BlockId, InstId};

/// A function of the module. An empty block list makes it a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    /// Always a `Type::Function`.
    pub ty: Type,
    /// Parameter names, in order, matching the type's parameter list.
    pub params: Vec<String>,
    pub blocks: Vec<BasicBlock>,
    insts: Vec<Inst>,
}

impl Function {
    pub fn new(name: String, ty: Type, params: Vec<String>) -> Self {
        Function { name, ty, params, blocks: Vec::new(), insts: Vec::new() }
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn ret_type(&self) -> &Type {
        static VOID: Type = Type::Void;
        self.ty.ret().unwrap_or(&VOID)
    }

    pub fn param_type(&self, index: usize) -> Option<&Type> {
        self.ty.params().and_then(|p| p.get(index))
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id.0 as usize]
    }

    pub fn insts(&self) -> impl Iterator<Item = (InstId, &Inst)> {
        self.insts.iter().enumerate().map(|(i, inst)| (InstId(i as u32), inst))
    }

    /// Append to the arena only; block membership is the builder's job.
    pub(crate) fn push_inst(&mut self, inst: Inst) -> InstId {
        let id = InstId(self.insts.len() as u32);
        self.insts.push(inst);
        id
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0 as usize]
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0 as usize]
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len() as u32).map(BlockId)
    }

    /// Find a block by name; handy in tests and the printer.
    pub fn block_by_name(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|b| b.name == name)
            .map(|i| BlockId(i as u32))
    }

    /// The block's terminator, if its last instruction is one.
    pub fn terminator(&self, id: BlockId) -> Option<InstId> {
        let last = *self.block(id).insts.last()?;
        if self.inst(last).is_terminator() { Some(last) } else { None }
    }

    pub fn is_terminated(&self, id: BlockId) -> bool {
        self.terminator(id).is_some()
    }
}
