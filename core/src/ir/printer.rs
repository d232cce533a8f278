//! file: core/src/ir/printer.rs
//! description: textual rendering of modules.
//!
//! LLVM-flavoured, but a house format: operands print bare (`%t3`, `42`,
//! `@a_1`), result types print once on the left, float arithmetic gets an
//! `f` prefix. Declarations print before definitions.
//!
use std::fmt;

use super::function::Function;
use super::instr::{Inst, InstKind};
use super::module::{GlobalVariable, Linkage, Module};
use super::types::Type;
use super::value::{BlockId, Constant, Value};

fn fmt_value(f: &mut fmt::Formatter<'_>, module: &Module, func: &Function, v: &Value) -> fmt::Result {
    match v {
        Value::ConstInt(n) => write!(f, "{}", n),
        Value::ConstFloat(x) => write!(f, "{:?}", x),
        Value::ConstBool(b) => write!(f, "{}", b),
        Value::Inst(id) => write!(f, "%{}", func.inst(*id).name),
        Value::Param(i) => {
            match func.params.get(*i as usize) {
                Some(name) => write!(f, "%{}", name),
                None => write!(f, "%arg{}", i),
            }
        }
        Value::Global(id) => write!(f, "@{}", module.global(*id).name),
    }
}

fn fmt_label(f: &mut fmt::Formatter<'_>, func: &Function, b: BlockId) -> fmt::Result {
    write!(f, "label %{}", func.block(b).name)
}

fn fmt_constant(f: &mut fmt::Formatter<'_>, c: &Constant) -> fmt::Result {
    match c {
        Constant::Int(n) => write!(f, "{}", n),
        Constant::Float(x) => write!(f, "{:?}", x),
        Constant::Zero(_) => write!(f, "zeroinitializer"),
        Constant::Array { elems, .. } => {
            write!(f, "[")?;
            for (i, e) in elems.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_constant(f, e)?;
            }
            write!(f, "]")
        }
    }
}

fn fmt_inst(f: &mut fmt::Formatter<'_>, module: &Module, func: &Function, inst: &Inst) -> fmt::Result {
    write!(f, "  ")?;
    if !inst.name.is_empty() {
        write!(f, "%{} = ", inst.name)?;
    }
    match &inst.kind {
        InstKind::Alloca { allocated } => write!(f, "alloca {}", allocated),
        InstKind::Load { ptr } => {
            write!(f, "load {}, ", inst.ty)?;
            fmt_value(f, module, func, ptr)
        }
        InstKind::Store { value, ptr } => {
            let ty = module.value_type(func, value);
            write!(f, "store {} ", ty)?;
            fmt_value(f, module, func, value)?;
            write!(f, ", ")?;
            fmt_value(f, module, func, ptr)
        }
        InstKind::GetElementPtr { base, ptr, indices } => {
            write!(f, "getelementptr {}, ", base)?;
            fmt_value(f, module, func, ptr)?;
            for idx in indices {
                write!(f, ", ")?;
                fmt_value(f, module, func, idx)?;
            }
            Ok(())
        }
        InstKind::Binary { op, lhs, rhs } => {
            let prefix = if inst.ty.is_float() { "f" } else { "" };
            write!(f, "{}{} {} ", prefix, op.mnemonic(), inst.ty)?;
            fmt_value(f, module, func, lhs)?;
            write!(f, ", ")?;
            fmt_value(f, module, func, rhs)
        }
        InstKind::Cmp { pred, lhs, rhs } => {
            let ty = module.value_type(func, lhs);
            write!(f, "cmp {} {} ", pred.mnemonic(), ty)?;
            fmt_value(f, module, func, lhs)?;
            write!(f, ", ")?;
            fmt_value(f, module, func, rhs)
        }
        InstKind::Cast { op, value } => {
            write!(f, "{} ", op.mnemonic())?;
            fmt_value(f, module, func, value)?;
            write!(f, " to {}", inst.ty)
        }
        InstKind::Call { callee, args } => {
            let target = module.function(*callee);
            write!(f, "call {} @{}(", target.ret_type(), target.name)?;
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_value(f, module, func, a)?;
            }
            write!(f, ")")
        }
        InstKind::Br { dest } => {
            write!(f, "br ")?;
            fmt_label(f, func, *dest)
        }
        InstKind::CondBr { cond, then_dest, else_dest } => {
            write!(f, "br i1 ")?;
            fmt_value(f, module, func, cond)?;
            write!(f, ", ")?;
            fmt_label(f, func, *then_dest)?;
            write!(f, ", ")?;
            fmt_label(f, func, *else_dest)
        }
        InstKind::Ret { value } => match value {
            Some(v) => {
                let ty = module.value_type(func, v);
                write!(f, "ret {} ", ty)?;
                fmt_value(f, module, func, v)
            }
            None => write!(f, "ret void"),
        },
        InstKind::Phi { incoming } => {
            write!(f, "phi {} ", inst.ty)?;
            for (i, (v, b)) in incoming.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "[ ")?;
                fmt_value(f, module, func, v)?;
                write!(f, ", %{} ]", func.block(*b).name)?;
            }
            Ok(())
        }
    }
}

fn fmt_global(f: &mut fmt::Formatter<'_>, g: &GlobalVariable) -> fmt::Result {
    let linkage = match g.linkage {
        Linkage::Internal => "internal ",
        Linkage::External => "",
    };
    let object = if g.is_const { "constant" } else { "global" };
    write!(f, "@{} = {}{} {}", g.name, linkage, object, g.ty)?;
    if let Some(init) = &g.init {
        write!(f, " ")?;
        fmt_constant(f, init)?;
    }
    writeln!(f)
}

fn fmt_signature(f: &mut fmt::Formatter<'_>, func: &Function, with_names: bool) -> fmt::Result {
    write!(f, "{} @{}(", func.ret_type(), func.name)?;
    let params: &[Type] = func.ty.params().unwrap_or(&[]);
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", p)?;
        if with_names {
            if let Some(name) = func.params.get(i) {
                write!(f, " %{}", name)?;
            }
        }
    }
    write!(f, ")")
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module '{}'", self.name)?;
        for g in &self.globals {
            fmt_global(f, g)?;
        }
        if !self.globals.is_empty() {
            writeln!(f)?;
        }
        for func in self.functions.iter().filter(|fun| fun.is_declaration()) {
            write!(f, "declare ")?;
            fmt_signature(f, func, false)?;
            writeln!(f)?;
        }
        for func in self.functions.iter().filter(|fun| !fun.is_declaration()) {
            write!(f, "define ")?;
            fmt_signature(f, func, true)?;
            writeln!(f, " {{")?;
            for bb in &func.blocks {
                writeln!(f, "{}:", bb.name)?;
                for &id in &bb.insts {
                    fmt_inst(f, self, func, func.inst(id))?;
                    writeln!(f)?;
                }
            }
            writeln!(f, "}}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}
