//! file: core/src/parser/expr.rs
//! description: expression parsing with name resolution.
//!
//! Walks the layered precedence rules of the grammar into `AstNode` trees.
//! Identifier occurrences are resolved against the symbol table here; the
//! lowerer only ever sees symbol ids.
//!
use pest::iterators::Pair;

use super::rules::{self, Rule};
use crate::ast::{AstNode, AstNodeKind, BinaryOperator, UnaryOperator};
use crate::error::CompileError;
use crate::symtab::SymbolTable;

pub(crate) fn parse_expression_rule(
    pair: Pair<Rule>,
    symbols: &SymbolTable,
) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let or_pair = rules::fetch_next_pair(&mut inner, line)?;
    parse_logical_or_rule(or_pair, symbols)
}

fn binary_chain<F>(
    pair: Pair<Rule>,
    symbols: &SymbolTable,
    parse_operand: F,
    op_from: fn(&str) -> Option<BinaryOperator>,
) -> Result<AstNode, CompileError>
where
    F: Fn(Pair<Rule>, &SymbolTable) -> Result<AstNode, CompileError>,
{
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let first = rules::fetch_next_pair(&mut inner, line)?;
    let mut node = parse_operand(first, symbols)?;

    // Zero-or-more (op, operand) repetitions fold left-associatively.
    while let Some(op_pair) = inner.next() {
        let op = op_from(op_pair.as_str())
            .ok_or_else(|| rules::syntax_error(line, "invalid binary operator"))?;
        let right_pair = rules::fetch_next_pair(&mut inner, line)?;
        let right = parse_operand(right_pair, symbols)?;
        node = AstNode::new(
            AstNodeKind::BinaryOp { op, left: Box::new(node), right: Box::new(right) },
            line,
        );
    }
    Ok(node)
}

fn parse_logical_or_rule(pair: Pair<Rule>, symbols: &SymbolTable) -> Result<AstNode, CompileError> {
    binary_chain(pair, symbols, parse_logical_and_rule, |s| match s {
        "||" => Some(BinaryOperator::Or),
        _ => None,
    })
}

fn parse_logical_and_rule(
    pair: Pair<Rule>,
    symbols: &SymbolTable,
) -> Result<AstNode, CompileError> {
    binary_chain(pair, symbols, parse_equality_rule, |s| match s {
        "&&" => Some(BinaryOperator::And),
        _ => None,
    })
}

fn parse_equality_rule(pair: Pair<Rule>, symbols: &SymbolTable) -> Result<AstNode, CompileError> {
    binary_chain(pair, symbols, parse_relational_rule, |s| match s {
        "==" => Some(BinaryOperator::Eq),
        "!=" => Some(BinaryOperator::Ne),
        _ => None,
    })
}

fn parse_relational_rule(pair: Pair<Rule>, symbols: &SymbolTable) -> Result<AstNode, CompileError> {
    binary_chain(pair, symbols, parse_additive_rule, |s| match s {
        "<" => Some(BinaryOperator::Lt),
        "<=" => Some(BinaryOperator::Le),
        ">" => Some(BinaryOperator::Gt),
        ">=" => Some(BinaryOperator::Ge),
        _ => None,
    })
}

fn parse_additive_rule(pair: Pair<Rule>, symbols: &SymbolTable) -> Result<AstNode, CompileError> {
    binary_chain(pair, symbols, parse_multiplicative_rule, |s| match s {
        "+" => Some(BinaryOperator::Add),
        "-" => Some(BinaryOperator::Sub),
        _ => None,
    })
}

fn parse_multiplicative_rule(
    pair: Pair<Rule>,
    symbols: &SymbolTable,
) -> Result<AstNode, CompileError> {
    binary_chain(pair, symbols, parse_unary_rule, |s| match s {
        "*" => Some(BinaryOperator::Mul),
        "/" => Some(BinaryOperator::Div),
        "%" => Some(BinaryOperator::Rem),
        _ => None,
    })
}

fn parse_unary_rule(pair: Pair<Rule>, symbols: &SymbolTable) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let first = rules::fetch_next_pair(&mut inner, line)?;
    match first.as_rule() {
        Rule::unary_op => {
            let op = match first.as_str() {
                "+" => UnaryOperator::Plus,
                "-" => UnaryOperator::Minus,
                _ => UnaryOperator::Not,
            };
            let operand_pair = rules::fetch_next_pair(&mut inner, line)?;
            let operand = parse_unary_rule(operand_pair, symbols)?;
            Ok(AstNode::new(AstNodeKind::UnaryOp { op, expr: Box::new(operand) }, line))
        }
        Rule::primary_expression => parse_primary_rule(first, symbols),
        _ => Err(rules::syntax_error(line, "unexpected token in expression")),
    }
}

fn parse_primary_rule(pair: Pair<Rule>, symbols: &SymbolTable) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let first = rules::fetch_next_pair(&mut inner, line)?;
    match first.as_rule() {
        Rule::expression => parse_expression_rule(first, symbols),
        Rule::func_call => parse_func_call_rule(first, symbols),
        Rule::lval => parse_lval_rule(first, symbols),
        Rule::number => parse_number_rule(first),
        Rule::string_lit => Ok(AstNode::new(
            AstNodeKind::StrConst { value: unescape(first.as_str()) },
            line,
        )),
        _ => Err(rules::syntax_error(line, "unexpected primary expression")),
    }
}

/// Resolve an identifier with optional indices into a reference node.
pub(crate) fn parse_lval_rule(
    pair: Pair<Rule>,
    symbols: &SymbolTable,
) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let ident = rules::fetch_next_pair(&mut inner, line)?;
    let name = ident.as_str();

    let (symbol, is_array) = match symbols.lookup(name) {
        Some(sym) => (sym.id, sym.is_array()),
        None => return Err(CompileError::Undefined { line, name: name.to_string() }),
    };

    let mut indices = Vec::new();
    for idx_pair in inner {
        indices.push(parse_expression_rule(idx_pair, symbols)?);
    }

    let kind = if indices.is_empty() {
        if is_array {
            AstNodeKind::ArrayRef { symbol }
        } else {
            AstNodeKind::VarRef { symbol }
        }
    } else {
        AstNodeKind::ArrayAccess { symbol, indices }
    };
    Ok(AstNode::new(kind, line))
}

fn parse_func_call_rule(pair: Pair<Rule>, symbols: &SymbolTable) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let ident = rules::fetch_next_pair(&mut inner, line)?;
    let name = ident.as_str();

    let symbol = match symbols.lookup(name) {
        Some(sym) if sym.is_function() => sym.id,
        Some(_) => {
            return Err(rules::syntax_error(line, format!("'{}' is not a function", name)));
        }
        None => return Err(CompileError::Undefined { line, name: name.to_string() }),
    };

    let mut args = Vec::new();
    if let Some(arg_list) = inner.next() {
        for arg_pair in arg_list.into_inner() {
            args.push(parse_expression_rule(arg_pair, symbols)?);
        }
    }
    Ok(AstNode::new(AstNodeKind::Call { symbol, args }, line))
}

fn parse_number_rule(pair: Pair<Rule>) -> Result<AstNode, CompileError> {
    let line = rules::line_of(&pair);
    let mut inner = pair.into_inner();
    let lit = rules::fetch_next_pair(&mut inner, line)?;
    match lit.as_rule() {
        Rule::float_const => {
            let value: f32 = lit
                .as_str()
                .parse()
                .map_err(|_| rules::syntax_error(line, "invalid float literal"))?;
            Ok(AstNode::new(AstNodeKind::FloatConst { value }, line))
        }
        Rule::int_const => {
            let value = parse_int_literal(lit.as_str())
                .ok_or_else(|| rules::syntax_error(line, "invalid integer literal"))?;
            Ok(AstNode::new(AstNodeKind::IntConst { value }, line))
        }
        _ => Err(rules::syntax_error(line, "invalid numeric literal")),
    }
}

/// Decode decimal, octal (leading 0) and hexadecimal (0x) literals.
/// Out-of-range literals wrap the way 32-bit two's complement does, so
/// `2147483648` spells the most negative value through unary minus.
fn parse_int_literal(s: &str) -> Option<i32> {
    let (digits, radix) = if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        (rest, 16)
    } else if s.len() > 1 && s.starts_with('0') && s.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    i64::from_str_radix(digits, radix).ok().map(|v| v as i32)
}

fn unescape(quoted: &str) -> String {
    let body = &quoted[1..quoted.len().saturating_sub(1)];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::parse_int_literal;

    #[test]
    fn decodes_all_three_radixes() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("0"), Some(0));
    }

    #[test]
    fn overflowing_decimal_wraps_to_int_min() {
        assert_eq!(parse_int_literal("2147483648"), Some(i32::MIN));
    }
}
