//! file: core/src/ir/lower/mod.rs
//! description: AST to IR lowering.
//!
//! The `Lowerer` borrows the symbol registry and owns the module under
//! construction. Module-level state lives here (globals map, function map,
//! interned strings); per-function state travels in a `FnContext`. Lowering
//! never fails: malformed subtrees yield `None` locally and sibling
//! lowering continues.
//!
mod context;
mod expr;
mod init;
mod stmt;

use std::collections::HashMap;

use context::{FnContext, zero_value};

use crate::ast::{AstNode, AstNodeKind, const_eval};
use crate::ir::builder::IrBuilder;
use crate::ir::function::Function;
use crate::ir::instr::CastOp;
use crate::ir::module::{GlobalVariable, Linkage, Module};
use crate::ir::types::Type;
use crate::ir::value::{Constant, FuncId, GlobalId, Value};
use crate::symtab::{DataType, SymbolId, SymbolTable};

/// Build the IR function type and parameter-name list from a function
/// symbol's signature. Array parameters become pointers to the element type
/// or to the array type spanned by dimensions 2..n of their shape; the
/// format-string parameter of the runtime `putf` is a pointer to i32.
pub(crate) fn function_signature(
    symbols: &SymbolTable,
    id: SymbolId,
) -> Option<(Type, Vec<String>)> {
    let sym = symbols.get(id)?;
    let info = sym.func.as_ref()?;

    let mut params = Vec::new();
    let mut names = Vec::new();
    for &pid in &info.params {
        let param = symbols.get(pid)?;
        let ty = if let Some(array) = &param.array {
            let rows = array.shape.get(1..).unwrap_or(&[]);
            Type::array_of(rows, Type::from_data(param.data_type)).pointer_to()
        } else if param.data_type == DataType::Char {
            Type::Int32.pointer_to()
        } else {
            Type::from_data(param.data_type)
        };
        params.push(ty);
        names.push(param.ir_name());
    }
    Some((
        Type::Function { ret: Box::new(Type::from_data(sym.data_type)), params },
        names,
    ))
}

pub struct Lowerer<'a> {
    symbols: &'a mut SymbolTable,
    module: Module,
    /// Symbol id -> module global, for globals and const arrays.
    globals: HashMap<SymbolId, GlobalId>,
    /// Symbol id -> IR function, grown as definitions and runtime
    /// declarations appear.
    functions: HashMap<SymbolId, FuncId>,
    /// Interned format-string literals.
    strings: HashMap<String, GlobalId>,
}

impl<'a> Lowerer<'a> {
    pub fn new(symbols: &'a mut SymbolTable, module_name: &str) -> Self {
        Lowerer {
            symbols,
            module: Module::new(module_name),
            globals: HashMap::new(),
            functions: HashMap::new(),
            strings: HashMap::new(),
        }
    }

    /// Lower a whole compilation unit: globals first, then each function
    /// definition with fresh per-function counters.
    pub fn run(mut self, root: &AstNode) -> Module {
        let AstNodeKind::Root { items } = &root.kind else {
            return self.module;
        };

        for item in items {
            match &item.kind {
                AstNodeKind::VarDef { .. }
                | AstNodeKind::ConstVarDef { .. }
                | AstNodeKind::ArrayDef { .. }
                | AstNodeKind::ConstArrayDef { .. } => self.lower_global(item),
                _ => {}
            }
        }
        for item in items {
            if let AstNodeKind::FuncDef { .. } = &item.kind {
                self.lower_function(item);
            }
        }
        self.module
    }

    // ------- Globals -------

    fn lower_global(&mut self, node: &AstNode) {
        let (symbol, init, is_const) = match &node.kind {
            AstNodeKind::VarDef { symbol, init } => (*symbol, init.as_deref(), false),
            AstNodeKind::ConstVarDef { symbol, init } => (*symbol, init.as_deref(), true),
            AstNodeKind::ArrayDef { symbol, init } => (*symbol, init.as_deref(), false),
            AstNodeKind::ConstArrayDef { symbol, init } => (*symbol, init.as_deref(), true),
            _ => return,
        };
        let (name, data_type, shape) = match self.symbols.get(symbol) {
            Some(sym) => (
                sym.ir_name(),
                sym.data_type,
                sym.array.as_ref().map(|a| a.shape.clone()),
            ),
            None => return,
        };

        let (ty, constant) = match shape {
            Some(shape) => {
                let elem = Type::from_data(data_type);
                let ty = Type::array_of(&shape, elem.clone());
                let constant = match init {
                    Some(list) => {
                        let elems =
                            init::flatten_const_init(list, &shape, data_type, self.symbols);
                        if elems.iter().all(Constant::is_zero) {
                            Constant::Zero(ty.clone())
                        } else {
                            Constant::Array { elem, elems }
                        }
                    }
                    None => Constant::Zero(ty.clone()),
                };
                (ty, constant)
            }
            None => {
                let ty = Type::from_data(data_type);
                let constant = init
                    .and_then(|n| const_eval(n, self.symbols))
                    .map(|v| match data_type {
                        DataType::Float => Constant::Float(v.as_float()),
                        _ => Constant::Int(v.as_int()),
                    })
                    .unwrap_or(match data_type {
                        DataType::Float => Constant::Float(0.0),
                        _ => Constant::Int(0),
                    });
                (ty, constant)
            }
        };

        let gid = self.module.add_global(GlobalVariable {
            name,
            ty,
            linkage: Linkage::External,
            is_const,
            init: Some(constant),
        });
        self.globals.insert(symbol, gid);
    }

    // ------- Functions -------

    fn lower_function(&mut self, node: &AstNode) {
        let AstNodeKind::FuncDef { symbol, body } = &node.kind else {
            return;
        };
        let symbol = *symbol;
        let Some((fn_ty, param_names)) = function_signature(self.symbols, symbol) else {
            return;
        };
        let (name, ret_type, param_ids, local_ids) = match self.symbols.get(symbol) {
            Some(sym) => match sym.func.as_ref() {
                Some(info) => {
                    (sym.name.clone(), sym.data_type, info.params.clone(), info.locals.clone())
                }
                None => return,
            },
            None => return,
        };
        log::debug!("lowering function '{}'", name);

        let fid = self.module.declare_function(&name, fn_ty.clone(), param_names.clone());
        self.functions.insert(symbol, fid);

        let func = Function::new(name, fn_ty, param_names);
        let builder = IrBuilder::new(func, "entry");
        let mut cx = FnContext::new(builder, ret_type);

        // Scalar parameters get a slot so they can be assigned to; array
        // parameters bind the incoming pointer directly.
        for (i, &pid) in param_ids.iter().enumerate() {
            let (is_array, data_type, slot_name) = match self.symbols.get(pid) {
                Some(p) => (p.is_array(), p.data_type, format!("{}.addr", p.ir_name())),
                None => continue,
            };
            if is_array {
                cx.locals.insert(pid, Value::Param(i as u32));
            } else {
                let slot = cx.builder.create_alloca(Type::from_data(data_type), &slot_name);
                cx.builder.create_store(Value::Param(i as u32), slot.clone());
                cx.locals.insert(pid, slot);
            }
        }

        // The prologue pre-allocates every local declared anywhere in the
        // function; definition statements later store into these slots.
        for &lid in &local_ids {
            if cx.locals.contains_key(&lid) {
                continue;
            }
            let (ty, slot_name) = match self.symbols.get(lid) {
                Some(sym) => {
                    let ty = match &sym.array {
                        Some(array) => {
                            Type::array_of(&array.shape, Type::from_data(sym.data_type))
                        }
                        None => Type::from_data(sym.data_type),
                    };
                    (ty, sym.ir_name())
                }
                None => continue,
            };
            let slot = cx.builder.create_alloca(ty, &slot_name);
            cx.locals.insert(lid, slot);
        }

        self.lower_stmt(&mut cx, body);

        // Patch a missing terminator on the exit path.
        let exit = cx.builder.insert_block();
        if !cx.builder.func().is_terminated(exit) && !cx.is_pending(exit) {
            match ret_type {
                DataType::Void => cx.builder.create_ret(None),
                other => {
                    let zero = zero_value(other);
                    cx.builder.create_ret(Some(zero));
                }
            }
        }

        let func = cx.builder.finish();
        self.module.define_function(fid, func);
    }

    // ------- Shared Helpers -------

    /// The IR location of a symbol: local slot or parameter first, then the
    /// globals map.
    pub(crate) fn location_of(&self, cx: &FnContext, id: SymbolId) -> Option<Value> {
        if let Some(v) = cx.locals.get(&id) {
            return Some(v.clone());
        }
        self.globals.get(&id).map(|&g| Value::Global(g))
    }

    pub(crate) fn value_ty(&self, cx: &FnContext, value: &Value) -> Type {
        self.module.value_type(cx.builder.func(), value)
    }

    /// Implicit numeric conversion to `target`. Identity when the types
    /// already match; non-numeric values (pointers) pass through untouched.
    pub(crate) fn coerce(&mut self, cx: &mut FnContext, value: Value, target: DataType) -> Value {
        let to = Type::from_data(target);
        let from = self.value_ty(cx, &value);
        if from == to {
            return value;
        }
        match (from, to) {
            (Type::Float, Type::Int32) => {
                cx.builder.create_cast(CastOp::FpToSi, value, Type::Int32)
            }
            (Type::Int32, Type::Float) => {
                cx.builder.create_cast(CastOp::SiToFp, value, Type::Float)
            }
            (Type::Int32, Type::Int1) => cx.builder.create_cast(CastOp::Trunc, value, Type::Int1),
            (Type::Int1, Type::Int32) => cx.builder.create_cast(CastOp::Sext, value, Type::Int32),
            (Type::Int1, Type::Float) => {
                let widened = cx.builder.create_cast(CastOp::Sext, value, Type::Int32);
                cx.builder.create_cast(CastOp::SiToFp, widened, Type::Float)
            }
            (Type::Float, Type::Int1) => {
                let narrowed = cx.builder.create_cast(CastOp::FpToSi, value, Type::Int32);
                cx.builder.create_cast(CastOp::Trunc, narrowed, Type::Int1)
            }
            _ => value,
        }
    }
}
