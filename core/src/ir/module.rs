//! file: core/src/ir/module.rs
//! description: top-level IR container: globals and functions.
//!
use super::function::Function;
use super::types::Type;
use super::value::{Constant, FuncId, GlobalId, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVariable {
    pub name: String,
    /// Type of the stored value; the global's address has pointer type.
    pub ty: Type,
    pub linkage: Linkage,
    pub is_const: bool,
    pub init: Option<Constant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Module { name: name.to_string(), globals: Vec::new(), functions: Vec::new() }
    }

    pub fn add_global(&mut self, global: GlobalVariable) -> GlobalId {
        let id = GlobalId(self.globals.len() as u32);
        self.globals.push(global);
        id
    }

    pub fn global(&self, id: GlobalId) -> &GlobalVariable {
        &self.globals[id.0 as usize]
    }

    /// Register a function header. The entry starts as a declaration;
    /// `define_function` fills in the body later so calls (including
    /// recursive ones) can reference a stable id beforehand.
    pub fn declare_function(&mut self, name: &str, ty: Type, params: Vec<String>) -> FuncId {
        let id = FuncId(self.functions.len() as u32);
        self.functions.push(Function::new(name.to_string(), ty, params));
        id
    }

    pub fn define_function(&mut self, id: FuncId, func: Function) {
        self.functions[id.0 as usize] = func;
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0 as usize]
    }

    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Type of an operand as seen from inside `func`.
    pub fn value_type(&self, func: &Function, value: &Value) -> Type {
        match value {
            Value::ConstInt(_) => Type::Int32,
            Value::ConstFloat(_) => Type::Float,
            Value::ConstBool(_) => Type::Int1,
            Value::Inst(id) => func.inst(*id).ty.clone(),
            Value::Param(i) => func
                .param_type(*i as usize)
                .cloned()
                .unwrap_or(Type::Void),
            Value::Global(id) => self.global(*id).ty.clone().pointer_to(),
        }
    }
}
