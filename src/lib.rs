//! Translates LDA topic models between natural languages.
//!
//! Given a source-language topic model and a bilingual dictionary, the
//! [`translate`] engine derives a topic-specific sub-dictionary and
//! aggregates, per topic and per candidate target word, the probability mass
//! of every source word voting for that candidate through a configurable
//! voting function — a built-in, a parsed expression of the small voting DSL,
//! a registered name, or a host callback. The resulting matrix is
//! re-normalized over the target vocabulary.
//!
//! The independent [`corpus`] pipeline tokenizes aligned multilingual
//! articles with per-language [`tokenize::TokenizerBuilder`] configurations
//! and packages large corpora into a single bulk file.
//!
//! ```
//! use crosstopic::dictionary::Dictionary;
//! use crosstopic::model::TopicModel;
//! use crosstopic::translate::{translate_topic_model, TranslateConfig};
//! use crosstopic::voting::BuildInVoting;
//!
//! let mut dict: Dictionary<String> = Dictionary::default();
//! dict.add_word_pair("cat", "chat");
//!
//! let model = TopicModel::new(
//!     vec![vec![1.0]],
//!     vec!["cat".to_string()].into(),
//!     vec![1],
//!     None,
//!     None,
//! );
//!
//! let config = TranslateConfig::with_voting(BuildInVoting::CombSum);
//! let translated = translate_topic_model(&model, &dict, &config, None).unwrap();
//! assert_eq!(Some(0), translated.word_to_id("chat"));
//! ```

pub mod context;
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod language_hint;
pub mod model;
mod persist;
pub mod provider;
pub mod tokenize;
pub mod translate;
pub mod variable_names;
pub mod vocabulary;
pub mod voting;

pub use crate::error::{Error, Result};
pub use crate::language_hint::LanguageHint;
