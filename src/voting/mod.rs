pub mod aggregations;
pub mod buildin;
pub mod errors;
pub mod parser;
pub mod registry;

use std::collections::HashMap;
use std::num::NonZeroUsize;

use evalexpr::{ContextWithMutableVariables, IterateVariablesContext, Value};

pub use crate::voting::buildin::BuildInVoting;
pub use crate::voting::errors::{VotingError, VotingParseError};
pub use crate::voting::parser::{parse_voting, ParsedVoting, VotingFunction};
pub use crate::voting::registry::VotingRegistry;

use crate::variable_names::{NUMBER_OF_VOTERS, RANK};

/// The result of a voting evaluation.
pub type VotingResult<T> = Result<T, VotingError>;

/// A context a voting can read and write during evaluation. The variable map
/// is what host-callback votings receive.
pub trait VotingMethodContext: ContextWithMutableVariables {
    fn variable_map(&self) -> HashMap<String, Value>;
}

impl<T> VotingMethodContext for T
where
    T: ContextWithMutableVariables + IterateVariablesContext,
{
    fn variable_map(&self) -> HashMap<String, Value> {
        self.iter_variables().collect()
    }
}

/// Anything that can act as a voting: a function `(global_ctx, voters) → value`.
pub trait VotingMethod {
    #[inline]
    fn execute_to_f64<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<f64>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        Ok(self.execute(global_context, voters)?.as_number()?)
    }

    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext;

    /// Like [`execute`](Self::execute), but also reports the voters that were
    /// actually used (a limited voting reports the retained sublist).
    fn execute_with_voters<'a, A, B>(
        &self,
        global_context: &mut A,
        voters: &'a mut [B],
    ) -> VotingResult<(Value, &'a [B])>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        Ok((self.execute(global_context, voters)?, voters))
    }
}

impl<T: VotingMethod + ?Sized> VotingMethod for Box<T> {
    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        self.as_ref().execute(global_context, voters)
    }
}

/// A marker for votings that can be referenced without generics.
pub trait VotingMethodMarker: VotingMethod + Sync + Send {}

impl<T: VotingMethodMarker + ?Sized> VotingMethodMarker for Box<T> {}

/// Allows limiting any voting to the top n voters.
pub trait IntoVotingWithLimit: VotingMethodMarker {
    fn with_limit(self, limit: NonZeroUsize) -> VotingWithLimit<Self>
    where
        Self: Sized;
}

impl<T: Sized + VotingMethodMarker> IntoVotingWithLimit for T {
    fn with_limit(self, limit: NonZeroUsize) -> VotingWithLimit<Self> {
        VotingWithLimit::new(limit, self)
    }
}

/// Decorates a voting: only the `limit` best voters by `RANK` are passed on,
/// and `NUMBER_OF_VOTERS` is updated accordingly.
#[derive(Debug, Clone)]
pub struct VotingWithLimit<T: ?Sized> {
    limit: NonZeroUsize,
    expr: T,
}

impl<T> VotingWithLimit<T> {
    pub fn new(limit: NonZeroUsize, expr: T) -> Self {
        Self { limit, expr }
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn inner(&self) -> &T {
        &self.expr
    }

    fn slice_voters<'a, B>(&self, voters: &'a mut [B]) -> VotingResult<&'a mut [B]>
    where
        B: VotingMethodContext,
    {
        let limit = self.limit.get();
        if limit < voters.len() {
            let mut keyed = Vec::with_capacity(voters.len());
            for voter in voters.iter() {
                let rank = voter
                    .get_value(RANK)
                    .ok_or_else(|| {
                        VotingError::Eval(evalexpr::EvalexprError::VariableIdentifierNotFound(
                            RANK.to_string(),
                        ))
                    })?
                    .as_int()?;
                keyed.push(rank);
            }
            // sort the voters in place by their precomputed rank
            let mut order: Vec<usize> = (0..voters.len()).collect();
            order.sort_by_key(|idx| keyed[*idx]);
            for target in 0..order.len() {
                while order[target] != target {
                    let source = order[target];
                    voters.swap(target, source);
                    order.swap(target, source);
                }
            }
            Ok(&mut voters[..limit])
        } else {
            Ok(voters)
        }
    }
}

impl<T> VotingMethodMarker for VotingWithLimit<T> where T: VotingMethodMarker {}

impl<T> VotingMethod for VotingWithLimit<T>
where
    T: VotingMethod,
{
    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        let voters = self.slice_voters(voters)?;
        global_context.set_value(NUMBER_OF_VOTERS.to_string(), (voters.len() as i64).into())?;
        self.expr.execute(global_context, voters)
    }

    fn execute_with_voters<'a, A, B>(
        &self,
        global_context: &mut A,
        voters: &'a mut [B],
    ) -> VotingResult<(Value, &'a [B])>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        let voters = self.slice_voters(voters)?;
        global_context.set_value(NUMBER_OF_VOTERS.to_string(), (voters.len() as i64).into())?;
        let result = self.expr.execute(global_context, voters)?;
        Ok((result, voters))
    }
}

#[cfg(test)]
mod test {
    use std::num::NonZeroUsize;

    use evalexpr::{context_map, Context, HashMapContext, Value};

    use super::{BuildInVoting, IntoVotingWithLimit, VotingMethod};
    use crate::variable_names::{RANK, SCORE_CANDIDATE};

    fn voter(rank: i64, score: f64) -> HashMapContext {
        context_map! {
            RANK => rank,
            SCORE_CANDIDATE => score,
        }
        .unwrap()
    }

    #[test]
    fn limit_keeps_the_best_ranked_voters() {
        let voting = BuildInVoting::CombSum.with_limit(NonZeroUsize::new(2).unwrap());
        let mut global = HashMapContext::new();
        let mut voters = vec![voter(3, 0.1), voter(1, 0.5), voter(2, 0.3)];
        let result = voting.execute(&mut global, voters.as_mut_slice()).unwrap();
        assert_eq!(Value::from(0.8), result);
        assert_eq!(
            Some(&Value::from(2)),
            global.get_value(crate::variable_names::NUMBER_OF_VOTERS)
        );
    }
}
