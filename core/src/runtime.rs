//! file: core/src/runtime.rs
//! description: runtime-library registrar.
//!
//! Holds the fixed catalog of externally linked I/O and timing functions.
//! `install` pre-populates the symbol registry before user code is parsed;
//! during lowering, the first observed call to a catalog function gets a
//! body-less declaration added to the module. A library function that is
//! never called stays out of the module entirely.
//!
use lazy_static::lazy_static;

use crate::ir::lower::function_signature;
use crate::ir::{FuncId, Module};
use crate::symtab::{ArrayInfo, DataType, SymbolId, SymbolKind, SymbolTable};
use crate::error::CompileError;

struct RuntimeParam {
    name: &'static str,
    data_type: DataType,
    array: bool,
}

impl RuntimeParam {
    const fn scalar(name: &'static str, data_type: DataType) -> Self {
        RuntimeParam { name, data_type, array: false }
    }

    const fn array(name: &'static str, data_type: DataType) -> Self {
        RuntimeParam { name, data_type, array: true }
    }
}

struct RuntimeFn {
    name: &'static str,
    ret: DataType,
    params: Vec<RuntimeParam>,
}

lazy_static! {
    static ref CATALOG: Vec<RuntimeFn> = vec![
        RuntimeFn { name: "getint", ret: DataType::Int, params: vec![] },
        RuntimeFn { name: "getch", ret: DataType::Int, params: vec![] },
        RuntimeFn { name: "getfloat", ret: DataType::Float, params: vec![] },
        RuntimeFn {
            name: "getarray",
            ret: DataType::Int,
            params: vec![RuntimeParam::array("array", DataType::Int)],
        },
        RuntimeFn {
            name: "getfarray",
            ret: DataType::Int,
            params: vec![RuntimeParam::array("array", DataType::Float)],
        },
        RuntimeFn {
            name: "putint",
            ret: DataType::Void,
            params: vec![RuntimeParam::scalar("value", DataType::Int)],
        },
        RuntimeFn {
            name: "putch",
            ret: DataType::Void,
            params: vec![RuntimeParam::scalar("value", DataType::Int)],
        },
        RuntimeFn {
            name: "putfloat",
            ret: DataType::Void,
            params: vec![RuntimeParam::scalar("value", DataType::Float)],
        },
        RuntimeFn {
            name: "putarray",
            ret: DataType::Void,
            params: vec![
                RuntimeParam::scalar("len", DataType::Int),
                RuntimeParam::array("array", DataType::Int),
            ],
        },
        RuntimeFn {
            name: "putfarray",
            ret: DataType::Void,
            params: vec![
                RuntimeParam::scalar("len", DataType::Int),
                RuntimeParam::array("array", DataType::Float),
            ],
        },
        // putf takes a format string and is variadic past its second
        // parameter; extra arguments pass through unconverted.
        RuntimeFn {
            name: "putf",
            ret: DataType::Void,
            params: vec![
                RuntimeParam::scalar("format_string", DataType::Char),
                RuntimeParam::scalar("value", DataType::Int),
            ],
        },
        RuntimeFn { name: "starttime", ret: DataType::Void, params: vec![] },
        RuntimeFn { name: "stoptime", ret: DataType::Void, params: vec![] },
    ];
}

/// Define every catalog function (and its parameter symbols) in the global
/// scope. Array parameters are one-dimensional with an unknown outermost
/// extent.
pub fn install(symbols: &mut SymbolTable) -> Result<(), CompileError> {
    for spec in CATALOG.iter() {
        let fid = symbols.define(spec.name, SymbolKind::Function, spec.ret, 0)?;
        symbols.enter_scope();
        let mut param_ids = Vec::new();
        for param in &spec.params {
            let kind = if param.array { SymbolKind::Array } else { SymbolKind::Var };
            let pid = symbols.define(param.name, kind, param.data_type, 0)?;
            if param.array {
                if let Some(sym) = symbols.get_mut(pid) {
                    sym.array = Some(ArrayInfo::new(vec![0]));
                }
            }
            param_ids.push(pid);
        }
        symbols.exit_scope();
        if let Some(info) = symbols.get_mut(fid).and_then(|s| s.func.as_mut()) {
            info.params = param_ids;
        }
    }
    Ok(())
}

/// True if `name` belongs to the runtime catalog.
pub fn is_runtime_name(name: &str) -> bool {
    CATALOG.iter().any(|f| f.name == name)
}

/// Add a body-less IR declaration for a called runtime function. Returns
/// `None` for symbols that are not catalog functions.
pub(crate) fn declare_runtime_function(
    module: &mut Module,
    symbols: &SymbolTable,
    id: SymbolId,
) -> Option<FuncId> {
    let sym = symbols.get(id)?;
    if !sym.is_function() || !is_runtime_name(&sym.name) || sym.lineno != 0 {
        return None;
    }
    let name = sym.name.clone();
    let (ty, param_names) = function_signature(symbols, id)?;
    log::debug!("declaring runtime function '{}'", name);
    Some(module.declare_function(&name, ty, param_names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_registers_the_whole_catalog() {
        let mut st = SymbolTable::new();
        install(&mut st).unwrap();
        for name in ["getint", "getfloat", "putarray", "starttime", "putf"] {
            let sym = st.lookup(name).unwrap();
            assert!(sym.is_function());
        }
        // parameter symbols live in the registry but not in the global scope
        assert!(st.lookup("array").is_none());
        let putarray = st.lookup("putarray").unwrap();
        assert_eq!(putarray.func.as_ref().unwrap().params.len(), 2);
    }

    #[test]
    fn runtime_array_params_have_unknown_extent() {
        let mut st = SymbolTable::new();
        install(&mut st).unwrap();
        let getarray = st.lookup("getarray").unwrap();
        let param_id = getarray.func.as_ref().unwrap().params[0];
        let param = st.get(param_id).unwrap();
        assert_eq!(param.array.as_ref().unwrap().shape, vec![0]);
    }
}
