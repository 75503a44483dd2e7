use std::sync::Arc;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alphanumeric1, char, digit1, multispace0, multispace1, one_of, space0, space1};
use nom::combinator::{cut, map, map_res, not, opt, peek, recognize};
use nom::error::{context, ContextError, ErrorKind, FromExternalError, ParseError, VerboseError};
use nom::multi::{many1, many1_count};
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::{AsChar, Finish, IResult, InputTakeAtPosition, Parser};

use crate::voting::aggregations::parse::AggregationParserError;
use crate::voting::buildin::BuildInVoting;
use crate::voting::errors::VotingParseError;
use crate::voting::parser::{
    IndexOrRange, InnerIfElse, ParsedVoting, VotingAndName, VotingExecutableList, VotingExpression,
    VotingExpressionOrStatement, VotingFunction, VotingOperation, VotingStatement,
};
use crate::voting::registry::VotingRegistry;
use crate::voting::VotingWithLimit;

const IMPORTANT_TOKENS: &str = "._+-*/%^=!<>&|,;: \"'";

const KW_ITER: &str = "foreach";
const KW_GLOBAL: &str = "global";
const KW_AGGREGATE: &str = "aggregate";
const KW_LET: &str = "let";
const KW_DECLARE: &str = "declare";

pub(crate) trait ErrorType<T>:
    ParseError<T>
    + ContextError<T>
    + FromExternalError<T, VotingParseError>
    + FromExternalError<T, AggregationParserError>
{
}

impl<C, T> ErrorType<T> for C where
    C: ParseError<T>
        + ContextError<T>
        + FromExternalError<T, VotingParseError>
        + FromExternalError<T, AggregationParserError>
{
}

fn keyword<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    context(
        "keyword",
        preceded(
            multispace0,
            alt((
                tag(KW_ITER),
                tag(KW_GLOBAL),
                tag(KW_AGGREGATE),
                tag(KW_LET),
                tag(KW_DECLARE),
            )),
        ),
    )(input)
}

macro_rules! make_expr {
    ($vis:vis $name: ident, open=$open:literal, close=$close:literal, spacing=$space:ident, on_close_missing=$message: literal) => {
        $vis fn $name<'a, O, E: ErrorType<&'a str>, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
        where
            F: Parser<&'a str, O, E>,
        {
            delimited(
                preceded($space, char($open)),
                preceded($space, inner),
                context($message, cut(preceded($space, char($close)))),
            )
        }
    };
}

make_expr!(
    s_expr,
    open = '(',
    close = ')',
    spacing = multispace0,
    on_close_missing = "closing parentheses for single expr"
);

make_expr!(
    s_expr_no_newline,
    open = '(',
    close = ')',
    spacing = space0,
    on_close_missing = "closing parentheses for single expr (no newline)"
);

make_expr!(
    b_exp,
    open = '{',
    close = '}',
    spacing = multispace0,
    on_close_missing = "closing parentheses for block expr"
);

make_expr!(
    c_expr_no_newline,
    open = '[',
    close = ']',
    spacing = space0,
    on_close_missing = "closing parentheses for tuple access (no newline)"
);

pub(crate) fn variable_name<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    context(
        "variable name",
        delimited(
            context("keyword check", peek(not(keyword))),
            nom::combinator::verify(
                recognize(preceded(
                    peek(not(digit1)),
                    many1(alt((alphanumeric1, tag("_")))),
                )),
                |value: &str| !value.is_empty(),
            ),
            context("not name", peek(not(alt((alphanumeric1, tag("_")))))),
        ),
    )(input)
}

fn voting_expression<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, VotingExpression, E> {
    fn collect_eval_expr<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
        context(
            "single expression",
            recognize(many1_count(alt((
                alphanumeric1,
                s_expr_no_newline(collect_eval_expr),
                recognize(one_of(IMPORTANT_TOKENS)),
            )))),
        )(input)
    }

    context(
        "expression",
        alt((
            voting_get_tuple_expression,
            map(preceded(multispace0, inner_if_else), VotingExpression::IfElse),
            map_res(preceded(multispace0, collect_eval_expr), |value| {
                VotingExpression::parse_as_single(value).map_err(VotingParseError::EvalExpr)
            }),
        )),
    )(input)
}

fn voting_get_tuple_expression<'a, E: ErrorType<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, VotingExpression, E> {
    context(
        "get tuple",
        map(
            tuple((
                preceded(multispace0, variable_name),
                preceded(space0, c_expr_no_newline(parse_index_or_range)),
            )),
            |(name, idx)| VotingExpression::TupleGet {
                idx,
                variable_name: name.to_string(),
            },
        ),
    )(input)
}

fn parse_index_or_range<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, IndexOrRange, E> {
    context(
        "parse index/range",
        map_res(
            tuple((
                opt(digit1),
                opt(tuple((
                    preceded(space0, tag::<&str, &str, E>("..")),
                    opt(tag("=")),
                    opt(preceded(space0, digit1)),
                ))),
            )),
            |(first, dots_and_second)| {
                let first: Option<usize> = first.map(|value: &str| value.parse().unwrap());
                if let Some((_, eq, second)) = dots_and_second {
                    let second: Option<usize> = second.map(|value: &str| value.parse().unwrap());
                    if eq.is_some() {
                        match (first, second) {
                            (_, None) => Err(VotingParseError::ToRangeAlwaysNeedsValue),
                            (Some(first), Some(second)) => {
                                Ok(IndexOrRange::RangeInclusive(first..=second))
                            }
                            (None, Some(second)) => Ok(IndexOrRange::RangeToInclusive(..=second)),
                        }
                    } else {
                        match (first, second) {
                            (Some(first), Some(second)) => Ok(IndexOrRange::Range(first..second)),
                            (None, Some(second)) => Ok(IndexOrRange::RangeTo(..second)),
                            (Some(first), None) => Ok(IndexOrRange::RangeFrom(first..)),
                            (None, None) => Ok(IndexOrRange::RangeFull),
                        }
                    }
                } else if let Some(first) = first {
                    Ok(IndexOrRange::Index(first))
                } else {
                    Err(VotingParseError::EmptyIndexNotAllowed)
                }
            },
        ),
    )(input)
}

fn voting_list<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, VotingExecutableList, E> {
    context(
        "voting list",
        preceded(
            multispace0,
            alt((
                b_exp(map_res(many1(preceded(multispace0, voting_or_statement)), |value| {
                    VotingExecutableList::pack_vec(value)
                        .ok_or(VotingParseError::NoExpressionOrStatementFound)
                })),
                map(voting_or_statement, VotingExecutableList::pack_single),
            )),
        ),
    )(input)
}

fn parse_if<'a, E: ErrorType<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (VotingExpression, VotingExecutableList), E> {
    context(
        "parse if",
        preceded(
            preceded(multispace0, tag("if")),
            tuple((s_expr(voting_expression), voting_list)),
        ),
    )(input)
}

fn inner_if_else<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, InnerIfElse, E> {
    context(
        "parse if else",
        map(
            tuple((parse_if, preceded(preceded(multispace0, tag("else")), voting_list))),
            InnerIfElse::from_expr,
        ),
    )(input)
}

fn voting_statement<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, VotingStatement, E> {
    context(
        "statement",
        alt((
            map(
                delimited(multispace0, parse_if, not(preceded(multispace0, tag("else")))),
                |(cond, if_block)| VotingStatement::If { cond, if_block },
            ),
            map(
                context(
                    "set variable",
                    tuple((
                        delimited(
                            delimited(multispace0, tag(KW_LET), space1),
                            variable_name,
                            preceded(space0, char('=')),
                        ),
                        preceded(space0, voting_list),
                    )),
                ),
                |(name, expression)| VotingStatement::SetVariable {
                    variable_name: name.to_string(),
                    expression,
                },
            ),
        )),
    )(input)
}

fn voting_or_statement<'a, E: ErrorType<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, VotingExpressionOrStatement, E> {
    context(
        "voting or statement",
        alt((
            map(voting_statement, VotingExpressionOrStatement::pack_stmt),
            map(voting_expression, VotingExpressionOrStatement::pack_expr),
        )),
    )(input)
}

fn voting_operation<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, VotingOperation, E> {
    preceded(
        multispace0,
        alt((
            preceded(
                terminated(tag(KW_ITER), preceded(multispace0, tag(":"))),
                preceded(multispace1, map(voting_list, |expr| VotingOperation::IterScope { expr })),
            ),
            preceded(
                terminated(tag(KW_GLOBAL), preceded(multispace0, tag(":"))),
                preceded(multispace1, map(voting_list, |expr| VotingOperation::GlobalScope { expr })),
            ),
            preceded(
                tag(KW_AGGREGATE),
                map(
                    tuple((
                        terminated(
                            s_expr(tuple((
                                delimited(
                                    preceded(multispace0, opt(terminated(tag(KW_LET), space1))),
                                    variable_name,
                                    preceded(multispace0, tag("=")),
                                ),
                                preceded(
                                    multispace0,
                                    crate::voting::aggregations::parse::parse_aggregation,
                                ),
                            ))),
                            preceded(multispace0, tag(":")),
                        ),
                        preceded(multispace0, voting_list),
                    )),
                    |((variable_name, op), expr)| VotingOperation::AggregationScope {
                        variable_name: variable_name.to_string(),
                        op,
                        expr,
                    },
                ),
            ),
        )),
    )(input)
}

pub(crate) fn voting_function<'a, E: ErrorType<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, VotingFunction, E> {
    map_res(many1(preceded(multispace0, voting_operation)), |mut value| match value.len() {
        0 => Err(VotingParseError::NoVotingFound),
        1 => Ok(VotingFunction::Single(value.swap_remove(0))),
        _ => Ok(VotingFunction::Multi(value)),
    })(input)
}

/// `declare <name> { <operations> }`
pub(crate) fn declared_voting<'a, E: ErrorType<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, VotingAndName, E> {
    context(
        "declared voting",
        map(
            preceded(
                preceded(multispace0, terminated(tag(KW_DECLARE), multispace1)),
                tuple((variable_name, b_exp(voting_function))),
            ),
            |(name, function)| VotingAndName(name.to_string(), Arc::new(function)),
        ),
    )(input)
}

struct BuildInVotingParser;

impl<'a, Error: ParseError<&'a str>> Parser<&'a str, BuildInVoting, Error> for BuildInVotingParser {
    fn parse(&mut self, input: &'a str) -> IResult<&'a str, BuildInVoting, Error> {
        let (rest, to_parse) =
            input.split_at_position1_complete(|item| !item.is_alphanum(), ErrorKind::AlphaNumeric)?;
        match to_parse.parse() {
            Ok(value) => Ok((rest, value)),
            Err(_) => Err(nom::Err::Error(Error::from_error_kind(input, ErrorKind::Tag))),
        }
    }
}

pub(crate) fn build_in_voting<'a, E: ErrorType<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, BuildInVoting, E> {
    preceded(multispace0, BuildInVotingParser)(input)
}

enum RawParsed<'a> {
    BuildIn(BuildInVoting),
    Declared(VotingAndName),
    Function(VotingFunction),
    Name(&'a str),
}

fn raw_voting<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, RawParsed<'a>, E> {
    alt((
        map(build_in_voting, RawParsed::BuildIn),
        map(declared_voting, RawParsed::Declared),
        map(b_exp(voting_function), RawParsed::Function),
        map(voting_function, RawParsed::Function),
        map(preceded(multispace0, variable_name), RawParsed::Name),
    ))(input)
}

fn limit_suffix<'a, E: ErrorType<&'a str>>(input: &'a str) -> IResult<&'a str, usize, E> {
    map_res(
        preceded(space0, delimited(char('('), preceded(space0, digit1), preceded(space0, char(')')))),
        |value: &str| {
            value
                .parse::<usize>()
                .map_err(|_| VotingParseError::Syntax(format!("invalid limit '{value}'")))
        },
    )(input)
}

/// The full top-level parse: a voting, optionally decorated with `(n)`, with
/// bare identifiers resolved against the registry.
pub(crate) fn parse_full(
    input: &str,
    registry: Option<&VotingRegistry>,
) -> Result<ParsedVoting, VotingParseError> {
    let (rest, raw) = raw_voting::<VerboseError<&str>>(input)
        .finish()
        .map_err(|err| VotingParseError::Syntax(nom::error::convert_error(input, err)))?;

    let (rest, limit) = opt(limit_suffix::<VerboseError<&str>>)(rest)
        .finish()
        .map_err(|err| VotingParseError::Syntax(nom::error::convert_error(input, err)))?;

    if !rest.trim().is_empty() {
        return Err(VotingParseError::TrailingInput(rest.trim().to_string()));
    }

    let resolved = match raw {
        RawParsed::BuildIn(value) => ParsedVoting::BuildIn(value),
        RawParsed::Declared(value) => ParsedVoting::ForRegistry(value),
        RawParsed::Function(value) => ParsedVoting::Parsed(value),
        RawParsed::Name(name) => match registry {
            None => return Err(VotingParseError::NoRegistryProvided(name.to_string())),
            Some(registry) => match registry.get_registered(name) {
                Some(found) => ParsedVoting::FromRegistry(found),
                None => return Err(VotingParseError::NoVotingInRegistryFound(name.to_string())),
            },
        },
    };

    match limit {
        Some(limit) => {
            let limit = std::num::NonZeroUsize::new(limit)
                .ok_or_else(|| VotingParseError::Syntax("the limit has to be greater than 0".to_string()))?;
            Ok(ParsedVoting::Limited(VotingWithLimit::new(limit, Box::new(resolved))))
        }
        None => Ok(resolved),
    }
}
