use evalexpr::{Context, EvalexprError, Value};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantArray};

use crate::variable_names::{
    EPSILON, HAS_TRANSLATION, IMPORTANCE, NUMBER_OF_VOTERS, REAL_RECIPROCAL_RANK, RECIPROCAL_RANK,
    SCORE_CANDIDATE,
};
use crate::voting::aggregations::{Aggregation, AggregationError, AggregationKind};
use crate::voting::{VotingError, VotingMethod, VotingMethodContext, VotingMethodMarker, VotingResult};

/// The closed set of built-in votings.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, EnumString, IntoStaticStr, Display, VariantArray, Serialize, Deserialize,
)]
pub enum BuildInVoting {
    /// The original score of the candidate.
    OriginalScore,
    /// The number of voters used.
    Voters,
    /// `Σ sᵢ`
    CombSum,
    /// The geometric mean of the scores.
    GCombSum,
    /// The sum of the two best scores.
    CombSumTop,
    /// `Σ sᵢ²`
    CombSumPow2,
    /// `max sᵢ`
    CombMax,
    /// `Σ 1/rankᵢ`
    RR,
    /// `Σ (1/rankᵢ)²`
    RRPow2,
    /// `CombSum × RR`
    CombSumRR,
    /// `CombSum × RRPow2`
    CombSumRRPow2,
    /// `CombSumPow2 × RR`
    CombSumPow2RR,
    /// `CombSumPow2 × RRPow2`
    CombSumPow2RRPow2,
    /// `(Σ e^sᵢ) × |voters with a translation|`
    ExpCombMnz,
    /// `Σ importanceᵢ × sᵢ`
    WCombSum,
    /// `Σ realRRᵢ × sᵢ`
    WCombSumG,
    /// `exp((Σ ln sᵢ + ln avg(s)) / (n+1))`
    WGCombSum,
    /// `Σ sᵢ / n + max rrᵢ`, epsilon when there are no voters.
    PCombSum,
}

fn get_global<A: Context>(context: &A, name: &str) -> VotingResult<Value> {
    context
        .get_value(name)
        .cloned()
        .ok_or_else(|| VotingError::Eval(EvalexprError::VariableIdentifierNotFound(name.to_string())))
}

fn collect<B: Context>(voters: &[B], name: &str) -> VotingResult<Vec<f64>> {
    voters
        .iter()
        .map(|voter| {
            voter
                .get_value(name)
                .ok_or_else(|| {
                    VotingError::Eval(EvalexprError::VariableIdentifierNotFound(name.to_string()))
                })
                .and_then(|value| value.as_number().map_err(VotingError::from))
        })
        .collect()
}

fn sum(values: impl Iterator<Item = f64>) -> VotingResult<f64> {
    Ok(AggregationKind::SumOf.aggregate(values)?)
}

impl VotingMethodMarker for BuildInVoting {}

impl VotingMethod for BuildInVoting {
    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        match self {
            BuildInVoting::OriginalScore => get_global(global_context, SCORE_CANDIDATE),
            BuildInVoting::Voters => get_global(global_context, NUMBER_OF_VOTERS),
            BuildInVoting::CombSum => {
                Ok(sum(collect(voters, SCORE_CANDIDATE)?.into_iter())?.into())
            }
            BuildInVoting::GCombSum => Ok(AggregationKind::GAvgOf
                .aggregate(collect(voters, SCORE_CANDIDATE)?.into_iter())?
                .into()),
            BuildInVoting::CombSumTop => Ok(Aggregation::new_with_limit(AggregationKind::SumOf, 2)
                .expect("2 is not zero")
                .calculate_desc(collect(voters, SCORE_CANDIDATE)?.into_iter())?
                .into()),
            BuildInVoting::CombSumPow2 => Ok(sum(
                collect(voters, SCORE_CANDIDATE)?.into_iter().map(|s| s * s),
            )?
            .into()),
            BuildInVoting::CombMax => Ok(collect(voters, SCORE_CANDIDATE)?
                .into_iter()
                .filter(|value| !value.is_nan())
                .max_by(|a, b| a.total_cmp(b))
                .ok_or(AggregationError::NoMaxFound)?
                .into()),
            BuildInVoting::RR => Ok(sum(collect(voters, RECIPROCAL_RANK)?.into_iter())?.into()),
            BuildInVoting::RRPow2 => Ok(sum(
                collect(voters, RECIPROCAL_RANK)?.into_iter().map(|rr| rr * rr),
            )?
            .into()),
            BuildInVoting::CombSumRR => {
                let comb_sum = BuildInVoting::CombSum.execute(global_context, voters)?.as_number()?;
                let rr = BuildInVoting::RR.execute(global_context, voters)?.as_number()?;
                Ok((comb_sum * rr).into())
            }
            BuildInVoting::CombSumRRPow2 => {
                let comb_sum = BuildInVoting::CombSum.execute(global_context, voters)?.as_number()?;
                let rr = BuildInVoting::RRPow2.execute(global_context, voters)?.as_number()?;
                Ok((comb_sum * rr).into())
            }
            BuildInVoting::CombSumPow2RR => {
                let comb_sum = BuildInVoting::CombSumPow2
                    .execute(global_context, voters)?
                    .as_number()?;
                let rr = BuildInVoting::RR.execute(global_context, voters)?.as_number()?;
                Ok((comb_sum * rr).into())
            }
            BuildInVoting::CombSumPow2RRPow2 => {
                let comb_sum = BuildInVoting::CombSumPow2
                    .execute(global_context, voters)?
                    .as_number()?;
                let rr = BuildInVoting::RRPow2.execute(global_context, voters)?.as_number()?;
                Ok((comb_sum * rr).into())
            }
            BuildInVoting::ExpCombMnz => {
                let exp_sum = sum(collect(voters, SCORE_CANDIDATE)?.into_iter().map(f64::exp))?;
                let translated = voters
                    .iter()
                    .filter(|voter| {
                        voter
                            .get_value(HAS_TRANSLATION)
                            .is_some_and(|value| value.as_boolean().unwrap_or(false))
                    })
                    .count();
                Ok((exp_sum * translated as f64).into())
            }
            BuildInVoting::WCombSum => {
                let scores = collect(voters, SCORE_CANDIDATE)?;
                let importances = collect(voters, IMPORTANCE)?;
                Ok(sum(scores
                    .into_iter()
                    .zip(importances)
                    .map(|(score, importance)| score * importance))?
                .into())
            }
            BuildInVoting::WCombSumG => {
                let scores = collect(voters, SCORE_CANDIDATE)?;
                let real_rr = collect(voters, REAL_RECIPROCAL_RANK)?;
                Ok(sum(scores
                    .into_iter()
                    .zip(real_rr)
                    .map(|(score, rr)| score * rr))?
                .into())
            }
            BuildInVoting::WGCombSum => {
                let scores = collect(voters, SCORE_CANDIDATE)?;
                let log_sum = scores.iter().map(|s| s.ln()).sum::<f64>();
                let avg = AggregationKind::AvgOf.aggregate(scores.into_iter())?;
                let n_voters = get_global(global_context, NUMBER_OF_VOTERS)?.as_int()?;
                Ok((((log_sum + avg.ln()) / (n_voters + 1) as f64).exp()).into())
            }
            BuildInVoting::PCombSum => {
                if voters.is_empty() {
                    get_global(global_context, EPSILON)
                } else {
                    let trans = sum(collect(voters, SCORE_CANDIDATE)?.into_iter())?;
                    let max_rr = collect(voters, RECIPROCAL_RANK)?
                        .into_iter()
                        .filter(|value| !value.is_nan())
                        .max_by(|a, b| a.total_cmp(b))
                        .ok_or(AggregationError::NoMaxFound)?;
                    let n_voters = get_global(global_context, NUMBER_OF_VOTERS)?.as_number()?;
                    Ok((trans / n_voters + max_rr).into())
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use evalexpr::{context_map, HashMapContext, Value};

    use super::BuildInVoting;
    use crate::variable_names::{
        EPSILON, HAS_TRANSLATION, IMPORTANCE, NUMBER_OF_VOTERS, REAL_RECIPROCAL_RANK,
        RECIPROCAL_RANK, SCORE_CANDIDATE,
    };
    use crate::voting::VotingMethod;

    fn test_setup() -> (HashMapContext, Vec<HashMapContext>) {
        let global = context_map! {
            EPSILON => 1e-9,
            NUMBER_OF_VOTERS => 3,
            SCORE_CANDIDATE => 0.6,
        }
        .unwrap();
        let voters = [(0.5, 1), (0.3, 2), (0.2, 3)]
            .into_iter()
            .map(|(score, rank)| {
                context_map! {
                    SCORE_CANDIDATE => score,
                    RECIPROCAL_RANK => 1.0 / rank as f64,
                    REAL_RECIPROCAL_RANK => 1.0 / rank as f64,
                    IMPORTANCE => 2.0,
                    HAS_TRANSLATION => true,
                }
                .unwrap()
            })
            .collect();
        (global, voters)
    }

    fn run(voting: BuildInVoting) -> f64 {
        let (mut global, mut voters) = test_setup();
        voting
            .execute(&mut global, voters.as_mut_slice())
            .unwrap()
            .as_number()
            .unwrap()
    }

    #[test]
    fn comb_sum_sums_the_scores() {
        assert!((run(BuildInVoting::CombSum) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn comb_max_takes_the_best_score() {
        assert_eq!(0.5, run(BuildInVoting::CombMax));
    }

    #[test]
    fn comb_sum_top_takes_the_two_best() {
        assert!((run(BuildInVoting::CombSumTop) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn rr_sums_reciprocal_ranks() {
        assert!((run(BuildInVoting::RR) - (1.0 + 0.5 + 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn comb_sum_rr_is_the_product_of_the_aggregates() {
        let expected = run(BuildInVoting::CombSum) * run(BuildInVoting::RR);
        assert!((run(BuildInVoting::CombSumRR) - expected).abs() < 1e-12);
    }

    #[test]
    fn exp_comb_mnz_counts_translated_voters() {
        let expected =
            (0.5f64.exp() + 0.3f64.exp() + 0.2f64.exp()) * 3.0;
        assert!((run(BuildInVoting::ExpCombMnz) - expected).abs() < 1e-12);
    }

    #[test]
    fn weighted_comb_sum_weights_by_importance() {
        assert!((run(BuildInVoting::WCombSum) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn p_comb_sum_falls_back_to_epsilon_without_voters() {
        let (mut global, _) = test_setup();
        let result = BuildInVoting::PCombSum
            .execute(&mut global, &mut Vec::<HashMapContext>::new())
            .unwrap();
        assert_eq!(Value::from(1e-9), result);
    }

    #[test]
    fn original_score_reads_the_global_context() {
        assert_eq!(0.6, run(BuildInVoting::OriginalScore));
    }

    #[test]
    fn all_names_round_trip_through_strings() {
        use strum::VariantArray;
        for voting in BuildInVoting::VARIANTS {
            let name = voting.to_string();
            assert_eq!(*voting, name.parse().unwrap());
        }
    }
}
