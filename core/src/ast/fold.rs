//! file: core/src/ast/fold.rs
//! description: compile-time evaluation of constant expressions.
//!
//! Array extents, const scalar initializers, and global initializers must
//! reduce to constants. The folder handles literals, references to const
//! scalars whose value is already recorded, and the arithmetic, comparison
//! and unary operators over them. Anything else yields `None`.
//!
use super::kind::{AstNodeKind, BinaryOperator, UnaryOperator};
use super::node::AstNode;
use crate::symtab::{ConstValue, SymbolTable};

pub fn const_eval(node: &AstNode, symbols: &SymbolTable) -> Option<ConstValue> {
    match &node.kind {
        AstNodeKind::IntConst { value } => Some(ConstValue::Int(*value)),
        AstNodeKind::FloatConst { value } => Some(ConstValue::Float(*value)),
        AstNodeKind::VarRef { symbol } => symbols.get(*symbol)?.value,
        AstNodeKind::UnaryOp { op, expr } => {
            let v = const_eval(expr, symbols)?;
            match (op, v) {
                (UnaryOperator::Plus, v) => Some(v),
                (UnaryOperator::Minus, ConstValue::Int(i)) => {
                    Some(ConstValue::Int(i.wrapping_neg()))
                }
                (UnaryOperator::Minus, ConstValue::Float(x)) => Some(ConstValue::Float(-x)),
                (UnaryOperator::Not, v) => Some(ConstValue::Int(if v.is_zero() { 1 } else { 0 })),
            }
        }
        AstNodeKind::BinaryOp { op, left, right } => {
            let l = const_eval(left, symbols)?;
            let r = const_eval(right, symbols)?;
            fold_binary(*op, l, r)
        }
        _ => None,
    }
}

fn fold_binary(op: BinaryOperator, l: ConstValue, r: ConstValue) -> Option<ConstValue> {
    use ConstValue::{Float, Int};

    if op.is_logical() {
        let l = !l.is_zero();
        let r = !r.is_zero();
        let v = match op {
            BinaryOperator::And => l && r,
            _ => l || r,
        };
        return Some(Int(v as i32));
    }

    // Mixed operands promote to float, as the lowered code would.
    if matches!(l, Float(_)) || matches!(r, Float(_)) {
        let (l, r) = (l.as_float(), r.as_float());
        return match op {
            BinaryOperator::Add => Some(Float(l + r)),
            BinaryOperator::Sub => Some(Float(l - r)),
            BinaryOperator::Mul => Some(Float(l * r)),
            BinaryOperator::Div => {
                if r == 0.0 {
                    None
                } else {
                    Some(Float(l / r))
                }
            }
            BinaryOperator::Rem => None,
            BinaryOperator::Lt => Some(Int((l < r) as i32)),
            BinaryOperator::Le => Some(Int((l <= r) as i32)),
            BinaryOperator::Gt => Some(Int((l > r) as i32)),
            BinaryOperator::Ge => Some(Int((l >= r) as i32)),
            BinaryOperator::Eq => Some(Int((l == r) as i32)),
            BinaryOperator::Ne => Some(Int((l != r) as i32)),
            _ => None,
        };
    }

    let (l, r) = (l.as_int(), r.as_int());
    match op {
        BinaryOperator::Add => Some(Int(l.wrapping_add(r))),
        BinaryOperator::Sub => Some(Int(l.wrapping_sub(r))),
        BinaryOperator::Mul => Some(Int(l.wrapping_mul(r))),
        BinaryOperator::Div => {
            if r == 0 {
                None
            } else {
                Some(Int(l.wrapping_div(r)))
            }
        }
        BinaryOperator::Rem => {
            if r == 0 {
                None
            } else {
                Some(Int(l.wrapping_rem(r)))
            }
        }
        BinaryOperator::Lt => Some(Int((l < r) as i32)),
        BinaryOperator::Le => Some(Int((l <= r) as i32)),
        BinaryOperator::Gt => Some(Int((l > r) as i32)),
        BinaryOperator::Ge => Some(Int((l >= r) as i32)),
        BinaryOperator::Eq => Some(Int((l == r) as i32)),
        BinaryOperator::Ne => Some(Int((l != r) as i32)),
        _ => None,
    }
}
