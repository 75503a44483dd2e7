use evalexpr::EvalexprError;
use thiserror::Error;

use crate::voting::aggregations::AggregationError;
use crate::voting::parser::IndexOrRange;

/// Errors raised while evaluating a voting.
#[derive(Debug, Error)]
pub enum VotingError {
    #[error(transparent)]
    Eval(#[from] EvalexprError),
    #[error(transparent)]
    Agg(#[from] AggregationError),
    #[error("the tuple {0} with length {2} has no value at {1}")]
    TupleGet(String, IndexOrRange, usize),
    #[error("no value to work with was found")]
    NoValue,
    #[error("the host callback failed: {0}")]
    External(String),
}

/// Errors raised while parsing a voting source.
#[derive(Debug, Clone, Error)]
pub enum VotingParseError {
    #[error("the if block is missing an expression")]
    IfExpressionMissing,
    #[error("an if used as expression needs an else block")]
    ElseBlockMissing,
    #[error("no voting found")]
    NoVotingFound,
    #[error("no expression or statement found")]
    NoExpressionOrStatementFound,
    #[error(transparent)]
    EvalExpr(#[from] EvalexprError),
    #[error("an empty index access does not work")]
    EmptyIndexNotAllowed,
    #[error("a to-range (..=) always needs a value after the =")]
    ToRangeAlwaysNeedsValue,
    #[error("no registry provided to resolve '{0}'")]
    NoRegistryProvided(String),
    #[error("no voting named '{0}' is registered")]
    NoVotingInRegistryFound(String),
    #[error("the input was not fully consumed, left: '{0}'")]
    TrailingInput(String),
    #[error("failed to parse the voting: {0}")]
    Syntax(String),
}
