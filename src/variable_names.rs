//! The exact string identifiers every voting context exposes.

/// The epsilon of the calculation.
pub const EPSILON: &str = "EPSILON";
/// The size of the vocabulary in language A.
pub const VOCABULARY_SIZE_A: &str = "VOCABULARY_SIZE_A";
/// The size of the vocabulary in language B.
pub const VOCABULARY_SIZE_B: &str = "VOCABULARY_SIZE_B";
/// The max probability of the current topic.
pub const TOPIC_MAX_PROBABILITY: &str = "TOPIC_MAX_PROBABILITY";
/// The min probability of the current topic.
pub const TOPIC_MIN_PROBABILITY: &str = "TOPIC_MIN_PROBABILITY";
/// The avg probability of the current topic.
pub const TOPIC_AVG_PROBABILITY: &str = "TOPIC_AVG_PROBABILITY";
/// The sum of all probabilities of the current topic.
pub const TOPIC_SUM_PROBABILITY: &str = "TOPIC_SUM_PROBABILITY";
/// The number of available voters.
pub const COUNT_OF_VOTERS: &str = "COUNT_OF_VOTERS";
/// The number of used voters.
pub const NUMBER_OF_VOTERS: &str = "NUMBER_OF_VOTERS";
/// True if the voter has translations into language B.
pub const HAS_TRANSLATION: &str = "HAS_TRANSLATION";
/// True if the candidate is a kept original word of language A.
pub const IS_ORIGIN_WORD: &str = "IS_ORIGIN_WORD";
/// The probability mass of the voter in the current topic.
pub const SCORE_CANDIDATE: &str = "SCORE_CANDIDATE";
/// The reciprocal rank of the voter.
pub const RECIPROCAL_RANK: &str = "RECIPROCAL_RANK";
/// The reciprocal rank of the voter among the voters with a translation.
pub const REAL_RECIPROCAL_RANK: &str = "REAL_RECIPROCAL_RANK";
/// The 1-based rank of the voter by descending score.
pub const RANK: &str = "RANK";
/// The provider-supplied importance of the voter (default 1.0).
pub const IMPORTANCE: &str = "IMPORTANCE";
/// The current aggregate of the voter, writable by votings.
pub const SCORE: &str = "SCORE";
/// The word id of the voter.
pub const VOTER_ID: &str = "VOTER_ID";
/// The word id of the candidate.
pub const CANDIDATE_ID: &str = "CANDIDATE_ID";
/// The current topic id.
pub const TOPIC_ID: &str = "TOPIC_ID";
