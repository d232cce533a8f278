//! file: core/src/parser/stmt.rs
//! description: statement and block parsing.
//!
use pest::iterators::Pair;

use super::rules::{self, Rule};
use super::{decl, expr};
use crate::ast::{AstNode, AstNodeKind};
use crate::error::CompileError;
use crate::symtab::SymbolTable;

/// Parse a `block` pair inside a fresh lexical scope.
pub(crate) fn parse_block_rule(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<AstNode, CompileError> {
    symbols.enter_scope();
    let node = parse_block_items(pair, symbols);
    symbols.exit_scope();
    node
}

/// Parse a `block` pair's items into a `Block` node without pushing a scope.
/// Function bodies use this so parameters and top-level locals share one
/// scope.
pub(crate) fn parse_block_items(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut statements = Vec::new();
    for item in pair.into_inner() {
        let item_line = rules::line_of(&item);
        let mut inner = item.into_inner();
        let node = rules::fetch_next_pair(&mut inner, item_line)?;
        match node.as_rule() {
            Rule::declaration => statements.extend(decl::parse_declaration_rule(node, symbols)?),
            Rule::statement => statements.push(parse_statement_rule(node, symbols)?),
            _ => {}
        }
    }
    Ok(AstNode::new(AstNodeKind::Block { statements }, line))
}

pub(crate) fn parse_statement_rule(
    pair: Pair<Rule>,
    symbols: &mut SymbolTable,
) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let stmt = rules::fetch_next_pair(&mut inner, line)?;
    match stmt.as_rule() {
        Rule::block => parse_block_rule(stmt, symbols),
        Rule::if_stmt => parse_if_rule(stmt, symbols),
        Rule::while_stmt => parse_while_rule(stmt, symbols),
        Rule::break_stmt => Ok(AstNode::new(AstNodeKind::Break, line)),
        Rule::continue_stmt => Ok(AstNode::new(AstNodeKind::Continue, line)),
        Rule::return_stmt => {
            let value = match stmt.into_inner().next() {
                Some(expr_pair) => Some(Box::new(expr::parse_expression_rule(expr_pair, symbols)?)),
                None => None,
            };
            Ok(AstNode::new(AstNodeKind::Return { value }, line))
        }
        Rule::assign_stmt => {
            let mut parts = stmt.into_inner();
            let target_pair = rules::fetch_next_pair(&mut parts, line)?;
            let target = expr::parse_lval_rule(target_pair, symbols)?;
            let value_pair = rules::fetch_next_pair(&mut parts, line)?;
            let value = expr::parse_expression_rule(value_pair, symbols)?;
            Ok(AstNode::new(
                AstNodeKind::Assign { target: Box::new(target), value: Box::new(value) },
                line,
            ))
        }
        Rule::expr_stmt => {
            let mut parts = stmt.into_inner();
            let expr_pair = rules::fetch_next_pair(&mut parts, line)?;
            let expr = expr::parse_expression_rule(expr_pair, symbols)?;
            Ok(AstNode::new(AstNodeKind::ExprStmt { expr: Box::new(expr) }, line))
        }
        Rule::empty_stmt => Ok(AstNode::new(AstNodeKind::Empty, line)),
        _ => Err(rules::syntax_error(line, "unexpected statement")),
    }
}

fn parse_if_rule(pair: Pair<Rule>, symbols: &mut SymbolTable) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let cond_pair = rules::fetch_next_pair(&mut inner, line)?;
    let condition = Box::new(expr::parse_expression_rule(cond_pair, symbols)?);
    let then_pair = rules::fetch_next_pair(&mut inner, line)?;
    let then_body = Box::new(parse_statement_rule(then_pair, symbols)?);

    match inner.next() {
        Some(else_pair) => {
            let else_body = Box::new(parse_statement_rule(else_pair, symbols)?);
            Ok(AstNode::new(AstNodeKind::IfElse { condition, then_body, else_body }, line))
        }
        None => Ok(AstNode::new(AstNodeKind::If { condition, then_body }, line)),
    }
}

fn parse_while_rule(pair: Pair<Rule>, symbols: &mut SymbolTable) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let cond_pair = rules::fetch_next_pair(&mut inner, line)?;
    let condition = Box::new(expr::parse_expression_rule(cond_pair, symbols)?);
    let body_pair = rules::fetch_next_pair(&mut inner, line)?;
    let body = Box::new(parse_statement_rule(body_pair, symbols)?);
    Ok(AstNode::new(AstNodeKind::While { condition, body }, line))
}
