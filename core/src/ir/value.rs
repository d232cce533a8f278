use super::types::Type;

/// Index of an instruction in its function's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstId(pub u32);

/// Index of a basic block in its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// Index of a function in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

/// Index of a global variable in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId(pub u32);

/// An operand. Values reference other IR entities by index, so the module
/// owns everything and operands never dangle.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    ConstInt(i32),
    ConstFloat(f32),
    ConstBool(bool),
    /// Result of an instruction in the enclosing function.
    Inst(InstId),
    /// Incoming parameter of the enclosing function.
    Param(u32),
    /// Address of a module global.
    Global(GlobalId),
}

impl Value {
    pub fn is_const(&self) -> bool {
        matches!(self, Value::ConstInt(_) | Value::ConstFloat(_) | Value::ConstBool(_))
    }
}

/// Constant initializer of a global variable.
///
/// Array initializers hold the row-major flattening of the nested source
/// initializer; `Zero` stands for an all-zero aggregate of the given type.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Float(f32),
    Zero(Type),
    Array { elem: Type, elems: Vec<Constant> },
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int(_) => Type::Int32,
            Constant::Float(_) => Type::Float,
            Constant::Zero(ty) => ty.clone(),
            Constant::Array { elem, elems } => Type::Array(elems.len(), Box::new(elem.clone())),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Constant::Int(v) => *v == 0,
            Constant::Float(v) => *v == 0.0,
            Constant::Zero(_) => true,
            Constant::Array { elems, .. } => elems.iter().all(Constant::is_zero),
        }
    }
}
