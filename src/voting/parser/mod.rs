pub(crate) mod grammar;

use std::fmt::{Debug, Display, Formatter};
use std::ops::{Range, RangeFrom, RangeInclusive, RangeTo, RangeToInclusive};
use std::sync::Arc;

use evalexpr::{Context, ContextWithMutableVariables, EvalexprError, Node, TupleType, Value};
use itertools::{FoldWhile, Itertools, Position};

use crate::context::LayerableContext;
use crate::variable_names::EPSILON;
use crate::voting::aggregations::Aggregation;
use crate::voting::errors::{VotingError, VotingParseError};
use crate::voting::registry::VotingRegistry;
use crate::voting::{VotingMethod, VotingMethodContext, VotingResult, VotingWithLimit};

/// Anything executable inside a single context frame.
pub(crate) trait VotingExecutable {
    fn execute(&self, context: &mut impl ContextWithMutableVariables) -> VotingResult<Value>;
}

/// Divisions by zero and overflows must not leak ±inf or NaN into the scores;
/// they collapse to the context's EPSILON.
fn zero_guard(value: Value, context: &impl Context) -> Value {
    match value {
        Value::Float(f) if !f.is_finite() => match context.get_value(EPSILON) {
            Some(Value::Float(eps)) => Value::Float(*eps),
            Some(Value::Int(eps)) => Value::Float(*eps as f64),
            _ => Value::Float(f64::EPSILON),
        },
        other => other,
    }
}

/// A parsed voting function: one or more operations, the last one produces
/// the result.
#[derive(Debug)]
pub enum VotingFunction {
    Single(VotingOperation),
    Multi(Vec<VotingOperation>),
}

impl VotingMethod for VotingFunction {
    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        match self {
            VotingFunction::Single(value) => value.execute(global_context, voters),
            VotingFunction::Multi(values) => {
                for (pos, expr) in values.iter().with_position() {
                    match pos {
                        Position::First | Position::Middle => {
                            expr.execute(global_context, voters)?;
                        }
                        Position::Last | Position::Only => {
                            return expr.execute(global_context, voters)
                        }
                    }
                }
                unreachable!()
            }
        }
    }
}

impl Display for VotingFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingFunction::Single(value) => Display::fmt(value, f),
            VotingFunction::Multi(values) => {
                for value in values {
                    writeln!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

/// The scope an operation runs in.
#[derive(Debug)]
pub enum VotingOperation {
    /// `foreach: <list>` — runs the list once per voter.
    IterScope { expr: VotingExecutableList },
    /// `global: <list>` — runs the list once on the global context.
    GlobalScope { expr: VotingExecutableList },
    /// `aggregate(let <name> = <agg>): <list>` — runs per voter, aggregates
    /// the results and binds them in the global context.
    AggregationScope {
        variable_name: String,
        op: Aggregation,
        expr: VotingExecutableList,
    },
}

impl VotingMethod for VotingOperation {
    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        match self {
            VotingOperation::IterScope { expr } => {
                for value in voters.iter_mut() {
                    expr.execute(&mut value.layered_over(&*global_context))?;
                }
                Ok(Value::Empty)
            }
            VotingOperation::AggregationScope {
                variable_name,
                op,
                expr,
            } => {
                let per_voter = voters
                    .iter_mut()
                    .map(|value| {
                        expr.execute(&mut value.layered_over(&*global_context))
                            .and_then(|value| value.as_number().map_err(VotingError::from))
                    })
                    .collect::<VotingResult<Vec<_>>>()?;
                let aggregated = op.calculate_desc(per_voter.into_iter())?;
                global_context.set_value(variable_name.clone(), aggregated.into())?;
                Ok(aggregated.into())
            }
            VotingOperation::GlobalScope { expr } => expr.execute(global_context),
        }
    }
}

impl Display for VotingOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingOperation::IterScope { expr } => write!(f, "foreach: {expr}"),
            VotingOperation::GlobalScope { expr } => write!(f, "global: {expr}"),
            VotingOperation::AggregationScope {
                variable_name,
                op,
                expr,
            } => write!(f, "aggregate(let {variable_name} = {op}): {expr}"),
        }
    }
}

/// One or more expressions/statements; the value of the last one counts.
#[derive(Debug)]
pub enum VotingExecutableList {
    Single(Box<VotingExpressionOrStatement>),
    Multiple(Vec<VotingExpressionOrStatement>),
}

impl VotingExecutableList {
    pub(crate) fn pack_single(expr: VotingExpressionOrStatement) -> Self {
        Self::Single(expr.into())
    }

    pub(crate) fn pack_vec(mut values: Vec<VotingExpressionOrStatement>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => Some(Self::Single(Box::new(values.swap_remove(0)))),
            _ => Some(Self::Multiple(values)),
        }
    }
}

impl VotingExecutable for VotingExecutableList {
    fn execute(&self, context: &mut impl ContextWithMutableVariables) -> VotingResult<Value> {
        match self {
            VotingExecutableList::Single(value) => value.execute(context),
            VotingExecutableList::Multiple(values) => values
                .iter()
                .fold_while(Ok(Value::Empty), |_, value| match value.execute(context) {
                    ok @ Ok(_) => FoldWhile::Continue(ok),
                    err @ Err(_) => FoldWhile::Done(err),
                })
                .into_inner(),
        }
    }
}

impl Display for VotingExecutableList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingExecutableList::Single(value) => Display::fmt(value, f),
            VotingExecutableList::Multiple(values) => {
                writeln!(f, "{{")?;
                for value in values {
                    writeln!(f, "  {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// An if/else usable as an expression.
#[derive(Debug)]
pub(crate) struct InnerIfElse {
    cond: Box<VotingExpression>,
    if_block: VotingExecutableList,
    else_block: VotingExecutableList,
}

impl InnerIfElse {
    #[inline]
    pub(crate) fn new(
        cond: VotingExpression,
        if_block: VotingExecutableList,
        else_block: VotingExecutableList,
    ) -> Self {
        Self {
            cond: cond.into(),
            if_block,
            else_block,
        }
    }

    pub(crate) fn from_expr(
        ((cond, if_block), else_block): ((VotingExpression, VotingExecutableList), VotingExecutableList),
    ) -> Self {
        Self::new(cond, if_block, else_block)
    }
}

impl VotingExecutable for InnerIfElse {
    fn execute(&self, context: &mut impl ContextWithMutableVariables) -> VotingResult<Value> {
        if self.cond.execute(context)?.as_boolean()? {
            self.if_block.execute(context)
        } else {
            self.else_block.execute(context)
        }
    }
}

impl Display for InnerIfElse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "if({}) {} else {}", self.cond, self.if_block, self.else_block)
    }
}

/// Either an expression or a statement.
#[derive(Debug)]
pub enum VotingExpressionOrStatement {
    Expression { expr: VotingExpression },
    Statement { stmt: Box<VotingStatement> },
}

impl VotingExpressionOrStatement {
    pub(crate) fn pack_expr(expr: VotingExpression) -> Self {
        Self::Expression { expr }
    }

    pub(crate) fn pack_stmt(stmt: VotingStatement) -> Self {
        Self::Statement { stmt: stmt.into() }
    }
}

impl VotingExecutable for VotingExpressionOrStatement {
    fn execute(&self, context: &mut impl ContextWithMutableVariables) -> VotingResult<Value> {
        match self {
            VotingExpressionOrStatement::Expression { expr } => expr.execute(context),
            VotingExpressionOrStatement::Statement { stmt } => stmt.execute(context),
        }
    }
}

impl Display for VotingExpressionOrStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingExpressionOrStatement::Expression { expr } => Display::fmt(expr, f),
            VotingExpressionOrStatement::Statement { stmt } => Display::fmt(stmt, f),
        }
    }
}

impl From<VotingExpression> for VotingExpressionOrStatement {
    #[inline]
    fn from(expr: VotingExpression) -> Self {
        Self::Expression { expr }
    }
}

impl From<VotingStatement> for VotingExpressionOrStatement {
    #[inline]
    fn from(stmt: VotingStatement) -> Self {
        Self::Statement { stmt: stmt.into() }
    }
}

/// The statements of the voting language.
#[derive(Debug)]
pub enum VotingStatement {
    If {
        cond: VotingExpression,
        if_block: VotingExecutableList,
    },
    SetVariable {
        variable_name: String,
        expression: VotingExecutableList,
    },
}

impl VotingExecutable for VotingStatement {
    fn execute(&self, context: &mut impl ContextWithMutableVariables) -> VotingResult<Value> {
        match self {
            VotingStatement::If { cond, if_block } => {
                if cond.execute(context)?.as_boolean()? {
                    if_block.execute(context)?;
                }
            }
            VotingStatement::SetVariable {
                variable_name,
                expression,
            } => {
                let result = expression.execute(context)?;
                context.set_value(variable_name.clone(), result)?;
            }
        }
        Ok(Value::Empty)
    }
}

impl Display for VotingStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingStatement::If { cond, if_block } => write!(f, "if ({cond}) {if_block}"),
            VotingStatement::SetVariable {
                variable_name,
                expression,
            } => write!(f, "let {variable_name} = {expression}"),
        }
    }
}

/// An atomic expression: an evalexpr tree, an if/else, or tuple access.
pub enum VotingExpression {
    Expr(Node),
    IfElse(InnerIfElse),
    TupleGet {
        variable_name: String,
        idx: IndexOrRange,
    },
}

impl VotingExpression {
    #[inline(always)]
    pub(crate) fn parse_as_single(s: &str) -> Result<Self, EvalexprError> {
        Ok(VotingExpression::Expr(evalexpr::build_operator_tree(s)?))
    }
}

impl VotingExecutable for VotingExpression {
    #[inline(always)]
    fn execute(&self, context: &mut impl ContextWithMutableVariables) -> VotingResult<Value> {
        match self {
            VotingExpression::Expr(value) => {
                let result = value.eval_with_context_mut(context)?;
                Ok(zero_guard(result, context))
            }
            VotingExpression::IfElse(value) => value.execute(context),
            VotingExpression::TupleGet { idx, variable_name } => {
                let tuple = context
                    .get_value(variable_name.as_str())
                    .ok_or_else(|| EvalexprError::VariableIdentifierNotFound(variable_name.clone()))?;
                match tuple {
                    Value::Tuple(value) => idx.access_value(value).ok_or_else(|| {
                        VotingError::TupleGet(variable_name.clone(), idx.clone(), value.len())
                    }),
                    _ => Err(EvalexprError::expected_tuple(tuple.clone()).into()),
                }
            }
        }
    }
}

impl Display for VotingExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingExpression::Expr(value) => write!(f, "{value}"),
            VotingExpression::IfElse(value) => Display::fmt(value, f),
            VotingExpression::TupleGet { idx, variable_name } => {
                write!(f, "{variable_name}[{idx}]")
            }
        }
    }
}

impl Debug for VotingExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingExpression::Expr(value) => f.write_str(&value.to_string()),
            VotingExpression::IfElse(value) => f.debug_struct("IfElse").field("if_else", value).finish(),
            VotingExpression::TupleGet { idx, variable_name } => f
                .debug_struct("TupleGet")
                .field("idx", idx)
                .field("var_name", variable_name)
                .finish(),
        }
    }
}

/// A single index or a range into a tuple value.
#[derive(Debug, Clone)]
pub enum IndexOrRange {
    Index(usize),
    Range(Range<usize>),
    RangeTo(RangeTo<usize>),
    RangeFrom(RangeFrom<usize>),
    RangeInclusive(RangeInclusive<usize>),
    RangeToInclusive(RangeToInclusive<usize>),
    RangeFull,
}

impl IndexOrRange {
    pub fn access_value(&self, target: &TupleType) -> Option<Value> {
        fn pack(values: &[Value]) -> Value {
            Value::Tuple(values.to_vec())
        }
        match self {
            IndexOrRange::Index(value) => target.get(*value).cloned(),
            IndexOrRange::Range(value) => target.get(value.clone()).map(pack),
            IndexOrRange::RangeTo(value) => target.get(*value).map(pack),
            IndexOrRange::RangeFrom(value) => target.get(value.clone()).map(pack),
            IndexOrRange::RangeInclusive(value) => target.get(value.clone()).map(pack),
            IndexOrRange::RangeToInclusive(value) => target.get(*value).map(pack),
            IndexOrRange::RangeFull => target.get(..).map(pack),
        }
    }
}

impl Display for IndexOrRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexOrRange::Index(value) => write!(f, "{value}"),
            IndexOrRange::Range(value) => write!(f, "{}..{}", value.start, value.end),
            IndexOrRange::RangeTo(value) => write!(f, "..{}", value.end),
            IndexOrRange::RangeFrom(value) => write!(f, "{}..", value.start),
            IndexOrRange::RangeInclusive(value) => write!(f, "{}..={}", value.start(), value.end()),
            IndexOrRange::RangeToInclusive(value) => write!(f, "..={}", value.end),
            IndexOrRange::RangeFull => write!(f, ".."),
        }
    }
}

/// A voting declared for registration: its name plus the parsed function.
#[derive(Debug, Clone)]
pub struct VotingAndName(pub String, pub Arc<VotingFunction>);

/// The result of parsing a voting source.
#[derive(Debug, strum::EnumIs)]
pub enum ParsedVoting {
    BuildIn(crate::voting::BuildInVoting),
    FromRegistry(Arc<VotingFunction>),
    Parsed(VotingFunction),
    ForRegistry(VotingAndName),
    Limited(VotingWithLimit<Box<ParsedVoting>>),
}

impl crate::voting::VotingMethodMarker for ParsedVoting {}

impl VotingMethod for ParsedVoting {
    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        match self {
            ParsedVoting::BuildIn(value) => value.execute(global_context, voters),
            ParsedVoting::FromRegistry(value) => value.execute(global_context, voters),
            ParsedVoting::Parsed(value) => value.execute(global_context, voters),
            ParsedVoting::ForRegistry(value) => value.1.execute(global_context, voters),
            ParsedVoting::Limited(value) => value.execute(global_context, voters),
        }
    }
}

impl From<crate::voting::BuildInVoting> for ParsedVoting {
    fn from(value: crate::voting::BuildInVoting) -> Self {
        Self::BuildIn(value)
    }
}

impl From<VotingFunction> for ParsedVoting {
    fn from(value: VotingFunction) -> Self {
        Self::Parsed(value)
    }
}

/// Parses a voting source. Identifiers that are not built-in votings resolve
/// against `registry`; resolution happens here, at parse time, so a voting can
/// only reference votings registered before it — reference cycles cannot form.
pub fn parse_voting(
    input: &str,
    registry: Option<&VotingRegistry>,
) -> Result<ParsedVoting, VotingParseError> {
    grammar::parse_full(input, registry)
}

#[cfg(test)]
mod test {
    use evalexpr::{Context, ContextWithMutableVariables, HashMapContext, Value};

    use super::parse_voting;
    use crate::voting::registry::VotingRegistry;
    use crate::voting::VotingMethod;

    const COMPLEX: &str = "aggregate(let sss = sumOf): {
            let katze = if (a+b == (c+d)) {
                x = -3 + 4 + c * 2
                z = (true, -1, (3), false)
                let _temp = z[1]
                o = -_temp
                value = 9 - 2 + d * x
                pp
            } else {
                x = 9 + 7 + a
                value = (8 + 7) * b + 1
                pp + 1
            }
            let katze = katze + 1
            katze
        }";

    #[test]
    fn can_parse_and_execute_a_complex_voting() {
        let parsed = parse_voting(COMPLEX, None).unwrap();

        let mut context = HashMapContext::new();
        context.set_value("a".to_string(), 3.into()).unwrap();
        context.set_value("b".to_string(), 2.into()).unwrap();
        context.set_value("c".to_string(), 1.into()).unwrap();
        context.set_value("d".to_string(), 4.into()).unwrap();

        let mut voters = vec![
            HashMapContext::new(),
            HashMapContext::new(),
            HashMapContext::new(),
        ];
        for (i, voter) in voters.iter_mut().enumerate() {
            voter.set_value("pp".to_string(), (i as i64).into()).unwrap();
        }

        // a+b == c+d holds, so every voter yields pp, then pp + 1.
        let result = parsed.execute(&mut context, voters.as_mut_slice()).unwrap();
        assert_eq!(Value::from(1. + 2. + 3.), result);
        assert_eq!(Some(&Value::from(6.)), context.get_value("sss"));
    }

    #[test]
    fn can_recognize_buildin() {
        assert!(parse_voting("CombSumPow2RRPow2", None).unwrap().is_build_in());
    }

    #[test]
    fn can_recognize_parsed() {
        assert!(parse_voting("aggregate(let sss = sumOf): SCORE_CANDIDATE", None)
            .unwrap()
            .is_parsed());
    }

    #[test]
    fn can_recognize_from_registry() {
        let registry = VotingRegistry::new();
        registry
            .register(
                "
            declare call_me {
                aggregate(let sss = avgOf): { SCORE_CANDIDATE + 1 }
                global: sss
            }",
            )
            .unwrap();

        assert!(parse_voting("call_me", Some(&registry)).unwrap().is_from_registry());
    }

    #[test]
    fn unknown_identifiers_fail_at_parse() {
        assert!(parse_voting("who_is_this", None).is_err());
        let registry = VotingRegistry::new();
        assert!(parse_voting("who_is_this", Some(&registry)).is_err());
    }

    #[test]
    fn self_reference_is_rejected_at_first_evaluation() {
        let registry = VotingRegistry::new();
        registry.register("declare myself { global: myself }").unwrap();
        let voting = parse_voting("myself", Some(&registry)).unwrap();
        let mut context = HashMapContext::new();
        // the body's identifier is unbound, so the cycle dies here
        assert!(voting
            .execute(&mut context, &mut Vec::<HashMapContext>::new())
            .is_err());
    }

    #[test]
    fn can_recognize_parsed_multiline() {
        let parsed = parse_voting(
            "{
            aggregate(let sss = sumOf): {SCORE_CANDIDATE}
            global: sss
        }",
            None,
        )
        .unwrap();
        assert!(parsed.is_parsed())
    }

    #[test]
    fn can_recognize_for_registry() {
        let parsed = parse_voting(
            "declare my_vote {
            aggregate(let sss = sumOf): SCORE_CANDIDATE
            global: sss
        }",
            None,
        )
        .unwrap();
        assert!(parsed.is_for_registry())
    }

    #[test]
    fn can_recognize_limited() {
        let parsed = parse_voting("Voters(20)", None).unwrap();
        assert!(parsed.is_limited());
    }

    #[test]
    fn can_recognize_limited_multiline() {
        let parsed = parse_voting(
            "{
            aggregate(let sss = sumOf): {SCORE_CANDIDATE}
            global: sss
        }(20)",
            None,
        )
        .unwrap();
        assert!(parsed.is_limited());
    }

    #[test]
    fn division_by_zero_collapses_to_epsilon() {
        let parsed = parse_voting("global: 1.0 / zero", None).unwrap();
        let mut context = HashMapContext::new();
        context
            .set_value(crate::variable_names::EPSILON.to_string(), 0.25.into())
            .unwrap();
        context.set_value("zero".to_string(), 0.0.into()).unwrap();
        let result = parsed.execute(&mut context, &mut Vec::<HashMapContext>::new()).unwrap();
        assert_eq!(Value::from(0.25), result);
    }
}
