//! file: core/src/parser/mod.rs
//! description: the parser collaborator.
//!
//! Drives the `pest` grammar over a source string and builds the AST while
//! populating the symbol table: every `define`/`enter_scope`/`exit_scope`/
//! `enter_function`/`exit_function` call happens here, so by the time the
//! lowerer runs the registry is complete (including every function's
//! local-variable list) and every identifier node carries a resolved symbol
//! id.
//!
mod decl;
mod expr;
pub mod rules;
mod stmt;

use pest::Parser;

pub use rules::{Rule, RulesParser};

use crate::ast::{AstNode, AstNodeKind};
use crate::error::CompileError;
use crate::symtab::SymbolTable;

/// Parse a whole compilation unit into a `Root` node.
pub fn parse_source(source: &str, symbols: &mut SymbolTable) -> Result<AstNode, CompileError> {
    let mut pairs =
        RulesParser::parse(Rule::program, source).map_err(rules::from_pest_error)?;
    let program = rules::fetch_next_pair(&mut pairs, 1)?;

    let mut items = Vec::new();
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::declaration => items.extend(decl::parse_declaration_rule(pair, symbols)?),
            Rule::func_def => items.push(decl::parse_func_def_rule(pair, symbols)?),
            Rule::EOI => {}
            _ => {}
        }
    }
    Ok(AstNode::new(AstNodeKind::Root { items }, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::{SymbolKind, SymbolTable};

    #[test]
    fn resolves_identifiers_to_symbol_ids() {
        let mut st = SymbolTable::new();
        let root = parse_source("int g = 1; int main() { return g; }", &mut st).unwrap();
        let AstNodeKind::Root { items } = &root.kind else { panic!("no root") };
        assert_eq!(items.len(), 2);
        let g = st.iter().find(|s| s.name == "g").map(|s| s.id).unwrap();
        // the return expression references g by id
        let AstNodeKind::FuncDef { body, .. } = &items[1].kind else { panic!("no function") };
        let AstNodeKind::Block { statements } = &body.kind else { panic!("no body") };
        let AstNodeKind::Return { value: Some(v) } = &statements[0].kind else {
            panic!("no return")
        };
        assert_eq!(v.kind, AstNodeKind::VarRef { symbol: g });
    }

    #[test]
    fn undefined_names_are_rejected() {
        let mut st = SymbolTable::new();
        let err = parse_source("int main() { return missing; }", &mut st).unwrap_err();
        assert!(err.to_string().contains("Undefined symbol 'missing'"));
    }

    #[test]
    fn array_shapes_come_from_constant_expressions() {
        let mut st = SymbolTable::new();
        parse_source("const int N = 4; int a[N][N - 1]; int main() { return 0; }", &mut st)
            .unwrap();
        let a = st.iter().find(|s| s.name == "a").unwrap();
        assert_eq!(a.kind, SymbolKind::Array);
        assert_eq!(a.array.as_ref().unwrap().shape, vec![4, 3]);
    }

    #[test]
    fn parameter_arrays_have_unknown_outermost_extent() {
        let mut st = SymbolTable::new();
        parse_source("int f(int a[][3]) { return a[0][0]; } int main() { return 0; }", &mut st)
            .unwrap();
        let a = st.iter().find(|s| s.name == "a").unwrap();
        assert_eq!(a.array.as_ref().unwrap().shape, vec![0, 3]);
    }

    #[test]
    fn dangling_else_binds_to_the_nearest_if() {
        let mut st = SymbolTable::new();
        let root = parse_source(
            "int main() { if (1) if (0) return 1; else return 2; return 3; }",
            &mut st,
        )
        .unwrap();
        let AstNodeKind::Root { items } = &root.kind else { panic!("no root") };
        let AstNodeKind::FuncDef { body, .. } = &items[0].kind else { panic!("no function") };
        let AstNodeKind::Block { statements } = &body.kind else { panic!("no body") };
        // outer statement is a plain `if` whose body is the `if`/`else`
        let AstNodeKind::If { then_body, .. } = &statements[0].kind else {
            panic!("outer if gained the else")
        };
        assert!(matches!(then_body.kind, AstNodeKind::IfElse { .. }));
    }
}
