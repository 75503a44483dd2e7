use thiserror::Error;

use crate::dictionary::metadata::MetadataError;
use crate::provider::ProviderError;
use crate::translate::TranslationError;
use crate::vocabulary::LoadVocabularyError;
use crate::voting::{VotingError, VotingParseError};

/// The single error taxonomy every public operation of this crate reports.
#[derive(Debug, Error)]
pub enum Error {
    /// A shape, type or value violation at the public boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A word, id, topic or registered voting does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A voting expression could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// Evaluating a voting failed (unbound identifier, type error, arity).
    #[error("evaluation error: {0}")]
    Eval(String),
    /// Persistence or streaming failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A broken internal invariant. Reaching this is a bug.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

impl From<VotingParseError> for Error {
    fn from(value: VotingParseError) -> Self {
        Self::Parse(value.to_string())
    }
}

impl From<VotingError> for Error {
    fn from(value: VotingError) -> Self {
        Self::Eval(value.to_string())
    }
}

impl From<ProviderError> for Error {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::OutOfRange { .. } => Self::NotFound(value.to_string()),
            ProviderError::Context(_) => Self::Eval(value.to_string()),
        }
    }
}

impl From<MetadataError> for Error {
    fn from(value: MetadataError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

impl<E: std::fmt::Debug> From<LoadVocabularyError<E>> for Error {
    fn from(value: LoadVocabularyError<E>) -> Self {
        match value {
            LoadVocabularyError::Io(err) => Self::Io(err),
            LoadVocabularyError::Parse(err) => Self::Parse(format!("{err:?}")),
        }
    }
}

impl From<TranslationError> for Error {
    fn from(value: TranslationError) -> Self {
        match value {
            TranslationError::EmptyVocabulary(_)
            | TranslationError::NoOverlap
            | TranslationError::IncompatibleLanguages { .. }
            | TranslationError::BadProbability { .. } => Self::InvalidInput(value.to_string()),
            TranslationError::Voting { .. } => Self::Eval(value.to_string()),
            TranslationError::Provider(err) => err.into(),
        }
    }
}
