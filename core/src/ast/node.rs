//! file: core/src/ast/node.rs
//! description: AST node container and tree dump.
//!
//! An `AstNode` pairs an `AstNodeKind` with the source line it came from.
//! Trees are built by the parser, consumed read-only by the lowerer, and
//! dropped by the caller when lowering returns.
//!
use std::fmt;

use serde::Serialize;

use super::kind::AstNodeKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    pub kind: AstNodeKind,
    /// Source line of the construct's first token.
    pub lineno: usize,
}

impl AstNode {
    pub fn new(kind: AstNodeKind, lineno: usize) -> Self {
        AstNode { kind, lineno }
    }

    fn dump(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for _ in 0..indent {
            write!(f, "  ")?;
        }
        match &self.kind {
            AstNodeKind::IntConst { value } => writeln!(f, "IntConst {}", value)?,
            AstNodeKind::FloatConst { value } => writeln!(f, "FloatConst {}", value)?,
            AstNodeKind::StrConst { value } => writeln!(f, "StrConst {:?}", value)?,
            AstNodeKind::VarRef { symbol }
            | AstNodeKind::ArrayRef { symbol }
            | AstNodeKind::ArrayAccess { symbol, .. }
            | AstNodeKind::Call { symbol, .. }
            | AstNodeKind::VarDef { symbol, .. }
            | AstNodeKind::ConstVarDef { symbol, .. }
            | AstNodeKind::ArrayDef { symbol, .. }
            | AstNodeKind::ConstArrayDef { symbol, .. }
            | AstNodeKind::FuncDef { symbol, .. } => {
                writeln!(f, "{} (symbol {}) @{}", self.kind.tag(), symbol, self.lineno)?
            }
            AstNodeKind::BinaryOp { op, .. } => {
                writeln!(f, "BinaryOp '{}' @{}", op.spelling(), self.lineno)?
            }
            AstNodeKind::UnaryOp { op, .. } => writeln!(
                f,
                "UnaryOp '{}' @{}",
                match op {
                    super::kind::UnaryOperator::Plus => "+",
                    super::kind::UnaryOperator::Minus => "-",
                    super::kind::UnaryOperator::Not => "!",
                },
                self.lineno
            )?,
            _ => writeln!(f, "{} @{}", self.kind.tag(), self.lineno)?,
        }
        for child in self.children() {
            child.dump(f, indent + 1)?;
        }
        Ok(())
    }

    /// Child nodes in source order, for generic traversals and the dump.
    pub fn children(&self) -> Vec<&AstNode> {
        match &self.kind {
            AstNodeKind::Root { items } => items.iter().collect(),
            AstNodeKind::VarDef { init, .. }
            | AstNodeKind::ConstVarDef { init, .. }
            | AstNodeKind::ArrayDef { init, .. }
            | AstNodeKind::ConstArrayDef { init, .. } => {
                init.iter().map(|n| n.as_ref()).collect()
            }
            AstNodeKind::FuncDef { body, .. } => vec![body.as_ref()],
            AstNodeKind::InitList { elements } => elements.iter().collect(),
            AstNodeKind::Block { statements } => statements.iter().collect(),
            AstNodeKind::Assign { target, value } => vec![target.as_ref(), value.as_ref()],
            AstNodeKind::If { condition, then_body } => {
                vec![condition.as_ref(), then_body.as_ref()]
            }
            AstNodeKind::IfElse { condition, then_body, else_body } => {
                vec![condition.as_ref(), then_body.as_ref(), else_body.as_ref()]
            }
            AstNodeKind::While { condition, body } => vec![condition.as_ref(), body.as_ref()],
            AstNodeKind::Return { value } => value.iter().map(|n| n.as_ref()).collect(),
            AstNodeKind::ExprStmt { expr } => vec![expr.as_ref()],
            AstNodeKind::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            AstNodeKind::UnaryOp { expr, .. } => vec![expr.as_ref()],
            AstNodeKind::Call { args, .. } => args.iter().collect(),
            AstNodeKind::ArrayAccess { indices, .. } => indices.iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// Indented tree rendering, used by the debug build of the driver.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f, 0)
    }
}
