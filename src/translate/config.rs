use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::num::NonZeroUsize;
use std::sync::Arc;

use evalexpr::Value;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::voting::errors::{VotingError, VotingParseError};
use crate::voting::registry::VotingRegistry;
use crate::voting::{
    parse_voting, BuildInVoting, ParsedVoting, VotingMethod, VotingMethodContext,
    VotingMethodMarker, VotingResult,
};

/// What to do with the source-language words during translation.
#[derive(
    Debug, Copy, Clone, Ord, PartialOrd, PartialEq, Eq, Hash, Default, AsRefStr, Display, EnumString, Serialize, Deserialize,
)]
pub enum KeepOriginalWord {
    Always,
    IfNoTranslation,
    #[default]
    Never,
}

/// The host-callback form of a voting: it receives the global variable map
/// and one map per voter and returns the aggregated score.
pub type VotingCallback =
    Arc<dyn Fn(&HashMap<String, Value>, &[HashMap<String, Value>]) -> Result<f64, String> + Send + Sync>;

/// The polymorphic voting argument of the engine: a built-in, a parsed
/// expression, a registered name, or a host callback.
#[derive(Clone)]
pub enum Voting {
    BuildIn(BuildInVoting),
    Parsed(Arc<ParsedVoting>),
    Callback(VotingCallback),
}

impl Voting {
    /// Parses a voting source (a built-in name, a registered name, or a full
    /// expression) against an optional registry.
    pub fn parse(source: &str, registry: Option<&VotingRegistry>) -> Result<Self, VotingParseError> {
        Ok(match parse_voting(source, registry)? {
            ParsedVoting::BuildIn(value) => Self::BuildIn(value),
            other => Self::Parsed(Arc::new(other)),
        })
    }

    pub fn callback(
        callback: impl Fn(&HashMap<String, Value>, &[HashMap<String, Value>]) -> Result<f64, String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::Callback(Arc::new(callback))
    }
}

impl Debug for Voting {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Voting::BuildIn(value) => f.debug_tuple("BuildIn").field(value).finish(),
            Voting::Parsed(value) => f.debug_tuple("Parsed").field(value).finish(),
            Voting::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl From<BuildInVoting> for Voting {
    fn from(value: BuildInVoting) -> Self {
        Self::BuildIn(value)
    }
}

impl From<ParsedVoting> for Voting {
    fn from(value: ParsedVoting) -> Self {
        Self::Parsed(Arc::new(value))
    }
}

impl VotingMethodMarker for Voting {}

impl VotingMethod for Voting {
    fn execute<A, B>(&self, global_context: &mut A, voters: &mut [B]) -> VotingResult<Value>
    where
        A: VotingMethodContext,
        B: VotingMethodContext,
    {
        match self {
            Voting::BuildIn(value) => value.execute(global_context, voters),
            Voting::Parsed(value) => value.execute(global_context, voters),
            Voting::Callback(callback) => {
                let global = global_context.variable_map();
                let voter_maps = voters.iter().map(|voter| voter.variable_map()).collect::<Vec<_>>();
                let result = callback(&global, &voter_maps).map_err(VotingError::External)?;
                Ok(result.into())
            }
        }
    }
}

/// The configuration of a translation run.
#[derive(Debug, Clone)]
pub struct TranslateConfig<V: VotingMethodMarker> {
    /// The voting aggregating the voters of a candidate.
    pub voting: V,
    /// The epsilon replacing zero masses; determined heuristically when None.
    pub epsilon: Option<f64>,
    /// Candidate scores below this threshold are zeroed.
    pub threshold: Option<f64>,
    /// What to do with the source words.
    pub keep_original_word: KeepOriginalWord,
    /// Caps the voters of a candidate to the top n by score.
    pub top_candidate_limit: Option<NonZeroUsize>,
}

impl<V: VotingMethodMarker> TranslateConfig<V> {
    pub fn new(
        voting: V,
        epsilon: Option<f64>,
        threshold: Option<f64>,
        keep_original_word: KeepOriginalWord,
        top_candidate_limit: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            voting,
            epsilon,
            threshold,
            keep_original_word,
            top_candidate_limit,
        }
    }

    /// A config with defaults for everything but the voting.
    pub fn with_voting(voting: V) -> Self {
        Self::new(voting, None, None, KeepOriginalWord::Never, None)
    }
}

#[cfg(test)]
mod test {
    use super::{KeepOriginalWord, Voting};

    #[test]
    fn keep_original_word_round_trips_through_strings() {
        for value in [
            KeepOriginalWord::Always,
            KeepOriginalWord::IfNoTranslation,
            KeepOriginalWord::Never,
        ] {
            assert_eq!(value, value.to_string().parse().unwrap());
        }
    }

    #[test]
    fn voting_parse_accepts_buildins_and_expressions() {
        assert!(matches!(Voting::parse("CombSum", None), Ok(Voting::BuildIn(_))));
        assert!(matches!(
            Voting::parse("aggregate(let s = sumOf): SCORE_CANDIDATE", None),
            Ok(Voting::Parsed(_))
        ));
        assert!(Voting::parse("no_such_voting", None).is_err());
    }
}
