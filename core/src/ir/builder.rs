//! file: core/src/ir/builder.rs
//! description: cursor-plus-factory for emitting instructions.
//!
//! The builder owns the function under construction and an insertion point.
//! Every `create_*` call appends to the current block. Result names come
//! from a per-function monotone counter; block name hints are deduplicated
//! with a numeric suffix so a nested `while` still yields distinct
//! `while.cond`, `while.cond1`, ... labels.
//!
use super::function::Function;
use super::instr::{BinaryOp, CastOp, CmpPredicate, Inst, InstKind};
use super::types::Type;
use super::value::{BlockId, FuncId, Value};

pub struct IrBuilder {
    func: Function,
    block: BlockId,
    next_tmp: u32,
}

impl IrBuilder {
    /// Take ownership of `func`, create its entry block, and point the
    /// cursor at it.
    pub fn new(func: Function, entry: &str) -> Self {
        let mut builder = IrBuilder { func, block: BlockId(0), next_tmp: 0 };
        let entry = builder.add_block(entry);
        builder.block = entry;
        builder
    }

    /// Hand the finished function back.
    pub fn finish(self) -> Function {
        self.func
    }

    pub fn func(&self) -> &Function {
        &self.func
    }

    // ------- Cursor -------

    pub fn add_block(&mut self, hint: &str) -> BlockId {
        let mut name = hint.to_string();
        let mut n = 1;
        while self.func.blocks.iter().any(|b| b.name == name) {
            name = format!("{}{}", hint, n);
            n += 1;
        }
        let id = BlockId(self.func.blocks.len() as u32);
        self.func.blocks.push(super::block::BasicBlock::new(name));
        id
    }

    pub fn set_insert_point(&mut self, block: BlockId) {
        self.block = block;
    }

    pub fn insert_block(&self) -> BlockId {
        self.block
    }

    pub fn current_terminated(&self) -> bool {
        self.func.is_terminated(self.block)
    }

    // ------- Constants -------

    pub fn int32(&self, value: i32) -> Value {
        Value::ConstInt(value)
    }

    pub fn float32(&self, value: f32) -> Value {
        Value::ConstFloat(value)
    }

    pub fn bool_true(&self) -> Value {
        Value::ConstBool(true)
    }

    pub fn bool_false(&self) -> Value {
        Value::ConstBool(false)
    }

    // ------- Instruction Factories -------

    fn push(&mut self, name: String, ty: Type, kind: InstKind) -> Value {
        let id = self.func.push_inst(Inst { name, ty, kind });
        self.func.block_mut(self.block).insts.push(id);
        Value::Inst(id)
    }

    fn fresh_name(&mut self) -> String {
        let name = format!("t{}", self.next_tmp);
        self.next_tmp += 1;
        name
    }

    pub fn create_alloca(&mut self, allocated: Type, name: &str) -> Value {
        let ty = allocated.clone().pointer_to();
        self.push(name.to_string(), ty, InstKind::Alloca { allocated })
    }

    /// `pointee` is the loaded type; the caller knows it from the symbol or
    /// the pointer it computed.
    pub fn create_load(&mut self, ptr: Value, pointee: Type) -> Value {
        let name = self.fresh_name();
        self.push(name, pointee, InstKind::Load { ptr })
    }

    pub fn create_store(&mut self, value: Value, ptr: Value) {
        self.push(String::new(), Type::Void, InstKind::Store { value, ptr });
    }

    /// The first index steps over the pointer itself; each further index
    /// peels one array dimension off `base`. The result points at whatever
    /// type remains.
    pub fn create_gep(&mut self, base: Type, ptr: Value, indices: Vec<Value>) -> Value {
        let mut ty = base.clone();
        for _ in 1..indices.len() {
            ty = match ty.element() {
                Some(inner) => inner.clone(),
                None => break,
            };
        }
        let name = self.fresh_name();
        self.push(name, ty.pointer_to(), InstKind::GetElementPtr { base, ptr, indices })
    }

    /// Operands must already share `ty`; the result has the same type.
    pub fn create_binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value, ty: Type) -> Value {
        let name = self.fresh_name();
        self.push(name, ty, InstKind::Binary { op, lhs, rhs })
    }

    pub fn create_cmp(&mut self, pred: CmpPredicate, lhs: Value, rhs: Value) -> Value {
        let name = self.fresh_name();
        self.push(name, Type::Int1, InstKind::Cmp { pred, lhs, rhs })
    }

    pub fn create_cast(&mut self, op: CastOp, value: Value, to: Type) -> Value {
        let name = self.fresh_name();
        self.push(name, to, InstKind::Cast { op, value })
    }

    pub fn create_call(&mut self, callee: FuncId, args: Vec<Value>, ret: Type) -> Value {
        let name = if ret.is_void() { String::new() } else { self.fresh_name() };
        self.push(name, ret, InstKind::Call { callee, args })
    }

    pub fn create_br(&mut self, dest: BlockId) {
        self.push(String::new(), Type::Void, InstKind::Br { dest });
    }

    pub fn create_cond_br(&mut self, cond: Value, then_dest: BlockId, else_dest: BlockId) {
        self.push(String::new(), Type::Void, InstKind::CondBr { cond, then_dest, else_dest });
    }

    pub fn create_ret(&mut self, value: Option<Value>) {
        self.push(String::new(), Type::Void, InstKind::Ret { value });
    }

    pub fn create_phi(&mut self, ty: Type, incoming: Vec<(Value, BlockId)>) -> Value {
        let name = self.fresh_name();
        self.push(name, ty, InstKind::Phi { incoming })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> IrBuilder {
        let func = Function::new(
            "f".to_string(),
            Type::Function { ret: Box::new(Type::Int32), params: vec![] },
            vec![],
        );
        IrBuilder::new(func, "entry")
    }

    #[test]
    fn block_hints_deduplicate() {
        let mut b = scratch();
        let c0 = b.add_block("while.cond");
        let c1 = b.add_block("while.cond");
        assert_eq!(b.func().block(c0).name, "while.cond");
        assert_eq!(b.func().block(c1).name, "while.cond1");
    }

    #[test]
    fn gep_peels_array_dimensions() {
        let mut b = scratch();
        let base = Type::array_of(&[2, 3], Type::Int32);
        let slot = b.create_alloca(base.clone(), "a");
        let ptr = b.create_gep(
            base,
            slot,
            vec![Value::ConstInt(0), Value::ConstInt(1), Value::ConstInt(2)],
        );
        if let Value::Inst(id) = ptr {
            assert_eq!(b.func().inst(id).ty, Type::Int32.pointer_to());
        } else {
            panic!("gep did not produce an instruction");
        }
    }

    #[test]
    fn temporaries_use_a_monotone_counter() {
        let mut b = scratch();
        let x = b.create_load(Value::ConstInt(0), Type::Int32);
        let y = b.create_load(Value::ConstInt(0), Type::Int32);
        let (Value::Inst(x), Value::Inst(y)) = (x, y) else {
            panic!("loads did not produce instructions");
        };
        assert_eq!(b.func().inst(x).name, "t0");
        assert_eq!(b.func().inst(y).name, "t1");
    }
}
