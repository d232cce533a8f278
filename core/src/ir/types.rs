//! file: core/src/ir/types.rs
//! description: IR type system.
//!
use std::fmt;

use crate::symtab::DataType;

/// Types carried by IR values. The set is closed and small: scalar machine
/// types, pointers, fixed-shape arrays, and function signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Void,
    Int1,
    Int32,
    Float,
    Pointer(Box<Type>),
    Array(usize, Box<Type>),
    Function { ret: Box<Type>, params: Vec<Type> },
}

impl Type {
    /// Map a source data type onto its IR type. `char` is carried as i32.
    pub fn from_data(dt: DataType) -> Type {
        match dt {
            DataType::Int | DataType::Char => Type::Int32,
            DataType::Float => Type::Float,
            DataType::Bool => Type::Int1,
            DataType::Void => Type::Void,
        }
    }

    pub fn pointer_to(self) -> Type {
        Type::Pointer(Box::new(self))
    }

    /// Build the array type for a row-major shape over `elem`.
    pub fn array_of(shape: &[usize], elem: Type) -> Type {
        let mut ty = elem;
        for &n in shape.iter().rev() {
            ty = Type::Array(n, Box::new(ty));
        }
        ty
    }

    pub fn is_void(&self) -> bool {
        *self == Type::Void
    }

    pub fn is_int1(&self) -> bool {
        *self == Type::Int1
    }

    pub fn is_int32(&self) -> bool {
        *self == Type::Int32
    }

    pub fn is_float(&self) -> bool {
        *self == Type::Float
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int32 | Type::Float)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Element type of an array, one dimension peeled.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(_, inner) => Some(inner),
            _ => None,
        }
    }

    /// Return type of a function type.
    pub fn ret(&self) -> Option<&Type> {
        match self {
            Type::Function { ret, .. } => Some(ret),
            _ => None,
        }
    }

    pub fn params(&self) -> Option<&[Type]> {
        match self {
            Type::Function { params, .. } => Some(params),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int1 => write!(f, "i1"),
            Type::Int32 => write!(f, "i32"),
            Type::Float => write!(f, "float"),
            Type::Pointer(inner) => write!(f, "{}*", inner),
            Type::Array(n, inner) => write!(f, "[{} x {}]", n, inner),
            Type::Function { ret, params } => {
                write!(f, "{} (", ret)?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
        }
    }
}
