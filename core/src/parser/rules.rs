//! file: core/src/parser/rules.rs
//! description: pest grammar binding and shared pair helpers.
//!
use pest_derive::Parser;

use crate::error::CompileError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RulesParser;

/// Source line of a pair's first token.
pub(crate) fn line_of(pair: &pest::iterators::Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

pub(crate) fn syntax_error(line: usize, message: impl Into<String>) -> CompileError {
    CompileError::Syntax { line, message: message.into() }
}

pub(crate) fn fetch_next_pair<'a>(
    pairs: &mut pest::iterators::Pairs<'a, Rule>,
    line: usize,
) -> Result<pest::iterators::Pair<'a, Rule>, CompileError> {
    pairs
        .next()
        .ok_or_else(|| syntax_error(line, "expected more input"))
}

/// Map a pest parse failure onto the compile error taxonomy, keeping the
/// line the parser stopped at.
pub(crate) fn from_pest_error(err: pest::error::Error<Rule>) -> CompileError {
    let line = match err.line_col {
        pest::error::LineColLocation::Pos((line, _)) => line,
        pest::error::LineColLocation::Span((line, _), _) => line,
    };
    CompileError::Syntax { line, message: err.variant.message().into_owned() }
}
