use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

use itertools::Itertools;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// An aggregation over voter values, optionally limited to the first 1..n
/// values of the chosen order.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct Aggregation {
    kind: AggregationKind,
    limit: Option<NonZeroUsize>,
}

impl Aggregation {
    pub const fn new(kind: AggregationKind, limit: Option<NonZeroUsize>) -> Self {
        Self { kind, limit }
    }

    pub const fn new_no_limit(kind: AggregationKind) -> Self {
        Self::new(kind, None)
    }

    pub fn new_with_limit(kind: AggregationKind, limit: usize) -> Option<Self> {
        NonZeroUsize::new(limit).map(|limit| Self::new(kind, Some(limit)))
    }

    fn calculate_limited(
        &self,
        limit: NonZeroUsize,
        iterator: impl Iterator<Item = f64>,
        descending: bool,
    ) -> Result<f64, AggregationError> {
        let mut values = iterator.filter(|value| value.is_finite()).collect_vec();
        values.sort_by(|a, b| if descending { b.total_cmp(a) } else { a.total_cmp(b) });
        self.kind.aggregate(values.into_iter().take(limit.get()))
    }

    /// Aggregates, limiting to the smallest values first.
    pub fn calculate_asc(&self, iterator: impl Iterator<Item = f64>) -> Result<f64, AggregationError> {
        match self.limit {
            Some(limit) => self.calculate_limited(limit, iterator, false),
            None => self.kind.aggregate(iterator),
        }
    }

    /// Aggregates, limiting to the largest values first.
    pub fn calculate_desc(&self, iterator: impl Iterator<Item = f64>) -> Result<f64, AggregationError> {
        match self.limit {
            Some(limit) => self.calculate_limited(limit, iterator, true),
            None => self.kind.aggregate(iterator),
        }
    }
}

impl Display for Aggregation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.limit {
            Some(limit) => write!(f, "{}({})", self.kind, limit),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("there is no value to be used")]
    NoValues,
    #[error("there is no max value")]
    NoMaxFound,
    #[error("there is no min value")]
    NoMinFound,
}

/// Kind of aggregation.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
pub enum AggregationKind {
    #[strum(serialize = "sumOf")]
    SumOf,
    #[strum(serialize = "maxOf")]
    MaxOf,
    #[strum(serialize = "minOf")]
    MinOf,
    #[strum(serialize = "avgOf")]
    AvgOf,
    #[strum(serialize = "gAvgOf")]
    GAvgOf,
}

impl AggregationKind {
    pub fn aggregate(&self, iter: impl Iterator<Item = f64>) -> Result<f64, AggregationError> {
        let values = iter.collect_vec();
        if values.is_empty() {
            return Err(AggregationError::NoValues);
        }
        match self {
            AggregationKind::SumOf => Ok(values.into_iter().sum()),
            AggregationKind::MaxOf => values
                .into_iter()
                .filter(|value| !value.is_nan())
                .max_by(|a, b| a.total_cmp(b))
                .ok_or(AggregationError::NoMaxFound),
            AggregationKind::MinOf => values
                .into_iter()
                .filter(|value| !value.is_nan())
                .min_by(|a, b| a.total_cmp(b))
                .ok_or(AggregationError::NoMinFound),
            AggregationKind::AvgOf => {
                let count = values.len() as f64;
                Ok(values.into_iter().sum::<f64>() / count)
            }
            AggregationKind::GAvgOf => {
                let count = values.len() as f64;
                Ok((values.into_iter().map(f64::ln).sum::<f64>() / count).exp())
            }
        }
    }
}

/// Parsing of `sumOf`, `avgOf(3)`, and the legacy `sumOf limit(*)` forms.
pub(crate) mod parse {
    use std::num::{NonZeroUsize, ParseIntError};

    use nom::branch::alt;
    use nom::bytes::complete::tag;
    use nom::character::complete::{alpha1, digit1, multispace0};
    use nom::combinator::{map, map_res, opt, value};
    use nom::error::context;
    use nom::sequence::{delimited, preceded, terminated, tuple};
    use nom::IResult;
    use thiserror::Error;

    use super::{Aggregation, AggregationKind};
    use crate::voting::parser::grammar::ErrorType;

    #[derive(Debug, Clone, Error)]
    pub enum AggregationParserError {
        #[error(transparent)]
        UnknownAggregation(#[from] strum::ParseError),
        #[error(transparent)]
        InvalidNumber(#[from] ParseIntError),
    }

    pub fn parse_aggregation<'a, E: ErrorType<&'a str>>(
        input: &'a str,
    ) -> IResult<&'a str, Aggregation, E> {
        context(
            "aggregation",
            map(
                tuple((
                    map_res(delimited(multispace0, alpha1, multispace0), |value: &str| {
                        AggregationKind::try_from(value)
                            .map_err(AggregationParserError::UnknownAggregation)
                    }),
                    opt(preceded(
                        multispace0,
                        preceded(
                            opt(terminated(tag("limit"), multispace0)),
                            delimited(
                                tag("("),
                                alt((
                                    map_res(digit1, |value: &str| {
                                        value
                                            .parse::<NonZeroUsize>()
                                            .map(Some)
                                            .map_err(AggregationParserError::InvalidNumber)
                                    }),
                                    value(None, tag("*")),
                                )),
                                tag(")"),
                            ),
                        ),
                    )),
                )),
                |(kind, limit)| Aggregation::new(kind, limit.flatten()),
            ),
        )(input)
    }

    #[cfg(test)]
    mod test {
        use nom::error::VerboseError;

        use super::parse_aggregation;
        use crate::voting::aggregations::{Aggregation, AggregationKind};

        #[test]
        fn can_parse_a_simple_expression() {
            assert_eq!(
                Aggregation::new_no_limit(AggregationKind::SumOf),
                parse_aggregation::<VerboseError<_>>("sumOf").unwrap().1
            )
        }

        #[test]
        fn can_parse_a_limited_expression() {
            assert_eq!(
                Aggregation::new_with_limit(AggregationKind::AvgOf, 3).unwrap(),
                parse_aggregation::<VerboseError<_>>("avgOf (3)").unwrap().1
            )
        }

        #[test]
        fn can_parse_the_legacy_star_forms() {
            assert_eq!(
                Aggregation::new_no_limit(AggregationKind::GAvgOf),
                parse_aggregation::<VerboseError<_>>("gAvgOf (*)").unwrap().1
            );
            assert_eq!(
                Aggregation::new_no_limit(AggregationKind::GAvgOf),
                parse_aggregation::<VerboseError<_>>("gAvgOf limit(*)").unwrap().1
            );
            assert_eq!(
                Aggregation::new_with_limit(AggregationKind::GAvgOf, 99).unwrap(),
                parse_aggregation::<VerboseError<_>>("gAvgOf limit (99)").unwrap().1
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Aggregation, AggregationKind};

    macro_rules! define_test {
        ($name: ident: $op: path, $expected: expr, $values: expr) => {
            #[test]
            fn $name() {
                let data: Vec<f64> = $values;
                let op = Aggregation::new_no_limit($op);
                assert_eq!(Ok($expected), op.calculate_asc(data.iter().copied()));
                assert_eq!(Ok($expected), op.calculate_desc(data.into_iter()));
            }
        };
        ($name: ident: $op: path, limit $limit: expr, asc $expected1: expr, desc $expected2: expr, $values: expr) => {
            #[test]
            fn $name() {
                let data: Vec<f64> = $values;
                let op = Aggregation::new_with_limit($op, $limit).unwrap();
                assert_eq!(Ok($expected1), op.calculate_asc(data.iter().copied()));
                assert_eq!(Ok($expected2), op.calculate_desc(data.into_iter()));
            }
        };
    }

    define_test! {
        can_calculate_the_sum:
        AggregationKind::SumOf,
        45.,
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9.]
    }

    define_test! {
        can_calculate_the_max:
        AggregationKind::MaxOf,
        10.,
        vec![1., 2., 10., 3., 4., 5., 6., 7., 8., 9.]
    }

    define_test! {
        can_calculate_the_min:
        AggregationKind::MinOf,
        -10.,
        vec![1., 2., -10., 3., 4., 5., 6., 7., 8., 9.]
    }

    define_test! {
        can_calculate_the_avg:
        AggregationKind::AvgOf,
        5.5,
        vec![1., 2., 10., 3., 4., 5., 6., 7., 8., 9.]
    }

    define_test! {
        can_calculate_the_sum_lim:
        AggregationKind::SumOf,
        limit 3usize,
        asc 6.0,
        desc 24.0,
        vec![4., 5., 1., 2., 3., 6., 7., 8., 9.]
    }

    define_test! {
        can_calculate_the_avg_lim:
        AggregationKind::AvgOf,
        limit 3usize,
        asc 2.0,
        desc 9.0,
        vec![1., 2., 10., 3., 4., 8., 5., 6., 9., 7.]
    }

    #[test]
    fn gavg_is_the_geometric_mean() {
        let op = Aggregation::new_no_limit(AggregationKind::GAvgOf);
        let result = op.calculate_asc(vec![1., 2., 10., 3., 4., 5., 6., 7., 8., 9.].into_iter()).unwrap();
        assert!((4.5287286881..4.5287286882).contains(&result));
    }

    #[test]
    fn empty_input_is_an_error() {
        let op = Aggregation::new_no_limit(AggregationKind::SumOf);
        assert!(op.calculate_asc(std::iter::empty()).is_err());
    }
}
