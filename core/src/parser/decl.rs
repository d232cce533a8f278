//! file: core/src/parser/decl.rs
//! description: parsing of declarations and function definitions.
//!
//! Declarations are where the symbol table is populated: every definition
//! calls `SymbolTable::define` and fills in the kind-dependent attributes
//! (array shapes from constant expressions, function parameter lists,
//! recorded values of const scalars) before the surrounding construct is
//! parsed further.
//!
use pest::iterators::Pair;

use super::rules::{self, Rule};
use super::{expr, stmt};
use crate::ast::{AstNode, AstNodeKind, const_eval};
use crate::error::CompileError;
use crate::symtab::{ArrayInfo, ConstValue, DataType, SymbolId, SymbolKind, SymbolTable};

fn parse_btype(pair: &Pair<Rule>) -> DataType {
    match pair.as_str() {
        "float" => DataType::Float,
        "void" => DataType::Void,
        _ => DataType::Int,
    }
}

pub(crate) fn parse_declaration_rule(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<Vec<AstNode>, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let decl = rules::fetch_next_pair(&mut inner, line)?;
    match decl.as_rule() {
        Rule::const_decl => parse_const_decl_rule(decl, symbols),
        Rule::var_decl => parse_var_decl_rule(decl, symbols),
        _ => Err(rules::syntax_error(line, "unexpected declaration")),
    }
}

fn parse_const_decl_rule(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<Vec<AstNode>, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let btype = rules::fetch_next_pair(&mut inner, line)?;
    let data_type = parse_btype(&btype);

    let mut defs = Vec::new();
    for def_pair in inner {
        defs.push(parse_def_rule(def_pair, data_type, true, symbols)?);
    }
    Ok(defs)
}

fn parse_var_decl_rule(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<Vec<AstNode>, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let btype = rules::fetch_next_pair(&mut inner, line)?;
    let data_type = parse_btype(&btype);

    let mut defs = Vec::new();
    for def_pair in inner {
        defs.push(parse_def_rule(def_pair, data_type, false, symbols)?);
    }
    Ok(defs)
}

/// One `name[dims] = init` definition out of a declaration.
fn parse_def_rule(
    pair: Pair<Rule>,
    data_type: DataType,
    is_const: bool,
    symbols: &mut SymbolTable,
) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let ident = rules::fetch_next_pair(&mut inner, line)?;
    let name = ident.as_str().to_string();

    let mut shape = None;
    let mut init_pair = None;
    for p in inner {
        match p.as_rule() {
            Rule::array_dims => shape = Some(parse_array_dims_rule(p, symbols)?),
            Rule::init_val => init_pair = Some(p),
            _ => {}
        }
    }

    match shape {
        Some(shape) => {
            let kind = if is_const { SymbolKind::ConstArray } else { SymbolKind::Array };
            let symbol = symbols.define(&name, kind, data_type, line)?;
            if let Some(sym) = symbols.get_mut(symbol) {
                sym.array = Some(ArrayInfo::new(shape));
            }
            let init = match init_pair {
                Some(p) => {
                    let node = parse_init_val_rule(p, symbols)?;
                    if !matches!(node.kind, AstNodeKind::InitList { .. }) {
                        return Err(rules::syntax_error(
                            line,
                            format!("array '{}' requires a braced initializer", name),
                        ));
                    }
                    Some(Box::new(node))
                }
                None => None,
            };
            let kind = if is_const {
                AstNodeKind::ConstArrayDef { symbol, init }
            } else {
                AstNodeKind::ArrayDef { symbol, init }
            };
            Ok(AstNode::new(kind, line))
        }
        None => {
            let kind = if is_const { SymbolKind::ConstVar } else { SymbolKind::Var };
            let symbol = symbols.define(&name, kind, data_type, line)?;
            let init = match init_pair {
                Some(p) => {
                    let node = parse_init_val_rule(p, symbols)?;
                    if matches!(node.kind, AstNodeKind::InitList { .. }) {
                        return Err(rules::syntax_error(
                            line,
                            format!("scalar '{}' cannot take a braced initializer", name),
                        ));
                    }
                    Some(Box::new(node))
                }
                None => None,
            };
            if is_const {
                let value = init
                    .as_deref()
                    .and_then(|node| const_eval(node, symbols))
                    .ok_or_else(|| {
                        rules::syntax_error(
                            line,
                            format!("initializer of constant '{}' must be a constant expression", name),
                        )
                    })?;
                let value = match data_type {
                    DataType::Float => ConstValue::Float(value.as_float()),
                    _ => ConstValue::Int(value.as_int()),
                };
                if let Some(sym) = symbols.get_mut(symbol) {
                    sym.value = Some(value);
                }
            }
            let kind = if is_const {
                AstNodeKind::ConstVarDef { symbol, init }
            } else {
                AstNodeKind::VarDef { symbol, init }
            };
            Ok(AstNode::new(kind, line))
        }
    }
}

/// Evaluate the bracketed extents of an array declarator.
fn parse_array_dims_rule(
    pair: Pair<Rule>,
    symbols: &SymbolTable,
) -> Result<Vec<usize>, CompileError> {
    let line = rules::line_of(&pair);
    let mut shape = Vec::new();
    for dim_pair in pair.into_inner() {
        let node = expr::parse_expression_rule(dim_pair, symbols)?;
        let extent = const_eval(&node, symbols)
            .map(|v| v.as_int())
            .filter(|v| *v >= 0)
            .ok_or_else(|| {
                rules::syntax_error(line, "array size must be a non-negative constant expression")
            })?;
        shape.push(extent as usize);
    }
    Ok(shape)
}

pub(crate) fn parse_init_val_rule(
    pair: Pair<Rule>,
    symbols: &SymbolTable,
) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let first = rules::fetch_next_pair(&mut inner, line)?;
    match first.as_rule() {
        Rule::init_list => {
            let mut elements = Vec::new();
            for el in first.into_inner() {
                elements.push(parse_init_val_rule(el, symbols)?);
            }
            Ok(AstNode::new(AstNodeKind::InitList { elements }, line))
        }
        Rule::expression => expr::parse_expression_rule(first, symbols),
        _ => Err(rules::syntax_error(line, "unexpected initializer")),
    }
}

pub(crate) fn parse_func_def_rule(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let ftype = rules::fetch_next_pair(&mut inner, line)?;
    let data_type = parse_btype(&ftype);
    let ident = rules::fetch_next_pair(&mut inner, line)?;
    let name = ident.as_str().to_string();

    let symbol = symbols.define(&name, SymbolKind::Function, data_type, line)?;
    symbols.enter_function(symbol);
    symbols.enter_scope();

    let mut param_ids = Vec::new();
    let mut body_pair = None;
    for p in inner {
        match p.as_rule() {
            Rule::func_params => {
                for fp in p.into_inner() {
                    param_ids.push(parse_func_param_rule(fp, symbols)?);
                }
            }
            Rule::block => body_pair = Some(p),
            _ => {}
        }
    }
    if let Some(info) = symbols.get_mut(symbol).and_then(|s| s.func.as_mut()) {
        info.params = param_ids;
    }

    // The body block shares the parameter scope, so a local that shadows a
    // parameter is a redeclaration error.
    let body = match body_pair {
        Some(p) => stmt::parse_block_items(p, symbols)?,
        None => AstNode::new(AstNodeKind::Block { statements: Vec::new() }, line),
    };

    symbols.exit_scope();
    symbols.exit_function();
    Ok(AstNode::new(AstNodeKind::FuncDef { symbol, body: Box::new(body) }, line))
}

fn parse_func_param_rule(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<SymbolId, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let btype = rules::fetch_next_pair(&mut inner, line)?;
    let data_type = parse_btype(&btype);
    let ident = rules::fetch_next_pair(&mut inner, line)?;
    let name = ident.as_str().to_string();

    match inner.next() {
        Some(dims_pair) if dims_pair.as_rule() == Rule::param_dims => {
            // The outermost extent is unspecified; remaining extents must be
            // constants.
            let mut shape = vec![0usize];
            for dim_pair in dims_pair.into_inner() {
                let node = expr::parse_expression_rule(dim_pair, symbols)?;
                let extent = const_eval(&node, symbols)
                    .map(|v| v.as_int())
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| {
                        rules::syntax_error(
                            line,
                            "array size must be a non-negative constant expression",
                        )
                    })?;
                shape.push(extent as usize);
            }
            let id = symbols.define(&name, SymbolKind::Array, data_type, line)?;
            if let Some(sym) = symbols.get_mut(id) {
                sym.array = Some(ArrayInfo::new(shape));
            }
            Ok(id)
        }
        _ => symbols.define(&name, SymbolKind::Var, data_type, line),
    }
}
