mod config;
mod topic_specific;

pub use config::{KeepOriginalWord, TranslateConfig, Voting, VotingCallback};
pub use topic_specific::create_topic_model_specific_dictionary;

use std::hash::Hash;

use evalexpr::{context_map, HashMapContext};
use itertools::Itertools;
use rayon::prelude::*;
use thiserror::Error;

use crate::context::LayerableContext;
use crate::dictionary::direction::A;
use crate::dictionary::{BilingualDictionary, Dictionary};
use crate::language_hint::LanguageHint;
use crate::model::TopicModel;
use crate::provider::{ProviderError, VariableProvider};
use crate::variable_names::*;
use crate::vocabulary::Vocabulary;
use crate::voting::{VotingError, VotingMethod, VotingMethodMarker};

/// Everything that can go wrong while translating a topic model.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("the {0} vocabulary is empty")]
    EmptyVocabulary(&'static str),
    #[error("the dictionary has no edges intersecting the model vocabulary")]
    NoOverlap,
    #[error("the dictionary translates from {lang_a} but the model is in {lang_model}")]
    IncompatibleLanguages {
        lang_a: LanguageHint,
        lang_model: LanguageHint,
    },
    #[error("the probability of word {word_id} in topic {topic_id} is {value}, expected a non-negative finite number")]
    BadProbability {
        topic_id: usize,
        word_id: usize,
        value: f64,
    },
    #[error("the voting failed for topic {topic_id}, candidate {word_id}: {source}")]
    Voting {
        topic_id: usize,
        word_id: usize,
        #[source]
        source: VotingError,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A slot in the output vocabulary: either a proper translation candidate or
/// a kept original word.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum CandidateSlot {
    Target(usize),
    Origin(usize),
}

struct VoterSeed {
    a_id: usize,
    score: f64,
    rank: usize,
}

/// Ranks voters by descending score, ties broken by ascending id. The ranks
/// refer to the full voter list, even when a limit truncates it afterwards.
fn rank_voters(mut voters: Vec<(usize, f64)>) -> Vec<VoterSeed> {
    voters.sort_by(|(id_a, score_a), (id_b, score_b)| {
        score_b.total_cmp(score_a).then(id_a.cmp(id_b))
    });
    voters
        .into_iter()
        .enumerate()
        .map(|(position, (a_id, score))| VoterSeed {
            a_id,
            score,
            rank: position + 1,
        })
        .collect()
}

fn static_context_bug(err: evalexpr::EvalexprError) -> TranslationError {
    TranslationError::Voting {
        topic_id: usize::MAX,
        word_id: usize::MAX,
        source: VotingError::Eval(err),
    }
}

/// Translates `model` into the B language of `dictionary` by voting over the
/// candidate translations of every topic word. The input model is not
/// mutated; document statistics are carried through unchanged.
pub fn translate_topic_model<T, V>(
    model: &TopicModel<T>,
    dictionary: &Dictionary<T>,
    config: &TranslateConfig<V>,
    provider: Option<&VariableProvider>,
) -> Result<TopicModel<T>, TranslationError>
where
    T: Eq + Hash + Clone + Ord + Send + Sync,
    V: VotingMethodMarker,
{
    if model.vocabulary().is_empty() {
        return Err(TranslationError::EmptyVocabulary("model"));
    }
    if dictionary.voc_a().is_empty() || dictionary.voc_b().is_empty() {
        return Err(TranslationError::EmptyVocabulary("dictionary"));
    }
    if let (Some(lang_model), (Some(lang_a), _)) =
        (model.vocabulary().language(), dictionary.language_direction())
    {
        if lang_model != lang_a {
            return Err(TranslationError::IncompatibleLanguages {
                lang_a: lang_a.clone(),
                lang_model: lang_model.clone(),
            });
        }
    }
    for (topic_id, topic) in model.topics().iter().enumerate() {
        for (word_id, value) in topic.iter().enumerate() {
            if !value.is_finite() || *value < 0.0 {
                return Err(TranslationError::BadProbability {
                    topic_id,
                    word_id,
                    value: *value,
                });
            }
        }
    }

    let dictionary = create_topic_model_specific_dictionary(dictionary, model.vocabulary());
    if dictionary.edge_count() == 0 {
        return Err(TranslationError::NoOverlap);
    }
    log::debug!(
        "translating {} topics over {} candidates",
        model.k(),
        dictionary.voc_b().len()
    );

    let context_epsilon = config.epsilon.unwrap_or_else(|| {
        model
            .topics()
            .iter()
            .flat_map(|topic| topic.iter())
            .fold(f64::MAX, |old, value| old.min(*value))
            - f64::EPSILON
    });

    let mut base_context = context_map! {
        EPSILON => context_epsilon,
        VOCABULARY_SIZE_A => dictionary.voc_a().len() as i64,
        VOCABULARY_SIZE_B => dictionary.voc_b().len() as i64,
    }
    .map_err(static_context_bug)?;
    if let Some(provider) = provider {
        provider.provide_global(&mut base_context)?;
    }

    let has_translation: Vec<bool> = dictionary
        .voc_a()
        .ids()
        .map(|a_id| dictionary.can_translate_id::<A>(a_id))
        .collect();

    let origin_ids: Vec<usize> = match config.keep_original_word {
        KeepOriginalWord::Never => Vec::new(),
        KeepOriginalWord::Always => dictionary.voc_a().ids().collect(),
        KeepOriginalWord::IfNoTranslation => dictionary
            .voc_a()
            .ids()
            .filter(|a_id| !has_translation[*a_id])
            .collect(),
    };

    let per_topic: Vec<Vec<(CandidateSlot, f64)>> = model
        .topics()
        .par_iter()
        .enumerate()
        .map(|(topic_id, topic)| {
            translate_topic(
                topic_id,
                topic,
                &dictionary,
                &base_context,
                &has_translation,
                &origin_ids,
                config,
                provider,
                model.stats()[topic_id],
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    assemble_model(model, &dictionary, &origin_ids, per_topic, config.epsilon)
}

#[allow(clippy::too_many_arguments)]
fn translate_topic<T, V>(
    topic_id: usize,
    topic: &[f64],
    dictionary: &Dictionary<T>,
    base_context: &HashMapContext,
    has_translation: &[bool],
    origin_ids: &[usize],
    config: &TranslateConfig<V>,
    provider: Option<&VariableProvider>,
    stats: crate::model::TopicStats,
) -> Result<Vec<(CandidateSlot, f64)>, TranslationError>
where
    T: Eq + Hash + Clone + Ord + Send + Sync,
    V: VotingMethodMarker,
{
    use evalexpr::ContextWithMutableVariables;
    let mut topic_context = base_context.clone();
    topic_context
        .set_value(TOPIC_ID.to_string(), (topic_id as i64).into())
        .map_err(static_context_bug)?;
    topic_context
        .set_value(TOPIC_MAX_PROBABILITY.to_string(), stats.max_value.into())
        .map_err(static_context_bug)?;
    topic_context
        .set_value(TOPIC_MIN_PROBABILITY.to_string(), stats.min_value.into())
        .map_err(static_context_bug)?;
    topic_context
        .set_value(TOPIC_AVG_PROBABILITY.to_string(), stats.average_value.into())
        .map_err(static_context_bug)?;
    topic_context
        .set_value(TOPIC_SUM_PROBABILITY.to_string(), stats.sum_value.into())
        .map_err(static_context_bug)?;
    if let Some(provider) = provider {
        provider.provide_for_topic(topic_id, &mut topic_context)?;
    }

    let mut results = Vec::with_capacity(dictionary.voc_b().len() + origin_ids.len());

    for b_id in dictionary.voc_b().ids() {
        let voters: Vec<(usize, f64)> = dictionary
            .map_b_to_a()
            .get(b_id)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .sorted_unstable()
                    .dedup()
                    .map(|a_id| (a_id, topic[a_id]))
                    .collect()
            })
            .unwrap_or_default();
        if voters.is_empty() {
            continue;
        }

        let mut seeds = rank_voters(voters);
        let count_of_voters = seeds.len();
        if let Some(limit) = config.top_candidate_limit {
            seeds.truncate(limit.get());
        }

        let top_score = seeds.first().map(|seed| seed.score).unwrap_or_default();
        let score = vote_candidate(
            topic_id,
            CandidateSlot::Target(b_id),
            &seeds,
            count_of_voters,
            top_score,
            true,
            false,
            &topic_context,
            config,
            provider,
            has_translation,
        )?;
        results.push((CandidateSlot::Target(b_id), score));
    }

    for a_id in origin_ids.iter().copied() {
        let seeds = vec![VoterSeed {
            a_id,
            score: topic[a_id],
            rank: 1,
        }];
        let score = vote_candidate(
            topic_id,
            CandidateSlot::Origin(a_id),
            &seeds,
            1,
            topic[a_id],
            has_translation[a_id],
            true,
            &topic_context,
            config,
            provider,
            has_translation,
        )?;
        results.push((CandidateSlot::Origin(a_id), score));
    }

    Ok(results)
}

#[allow(clippy::too_many_arguments)]
fn vote_candidate<V>(
    topic_id: usize,
    slot: CandidateSlot,
    seeds: &[VoterSeed],
    count_of_voters: usize,
    top_score: f64,
    candidate_has_translation: bool,
    is_origin: bool,
    topic_context: &HashMapContext,
    config: &TranslateConfig<V>,
    provider: Option<&VariableProvider>,
    has_translation: &[bool],
) -> Result<f64, TranslationError>
where
    V: VotingMethodMarker,
{
    let candidate_id = match slot {
        CandidateSlot::Target(b_id) => b_id,
        CandidateSlot::Origin(a_id) => a_id,
    };
    let with_origin = |source: VotingError| TranslationError::Voting {
        topic_id,
        word_id: candidate_id,
        source,
    };

    let mut candidate_context = context_map! {
        COUNT_OF_VOTERS => count_of_voters as i64,
        NUMBER_OF_VOTERS => seeds.len() as i64,
        HAS_TRANSLATION => candidate_has_translation,
        IS_ORIGIN_WORD => is_origin,
        SCORE_CANDIDATE => top_score,
        CANDIDATE_ID => candidate_id as i64,
    }
    .map_err(static_context_bug)?;
    if let Some(provider) = provider {
        match slot {
            CandidateSlot::Target(b_id) => {
                provider.provide_for_word_b(b_id, &mut candidate_context)?;
                provider.provide_for_word_in_topic_b(topic_id, b_id, &mut candidate_context)?;
            }
            CandidateSlot::Origin(a_id) => {
                provider.provide_for_word_a(a_id, &mut candidate_context)?;
                provider.provide_for_word_in_topic_a(topic_id, a_id, &mut candidate_context)?;
            }
        }
    }

    let mut voters = seeds
        .iter()
        .map(|seed| {
            let voter_has_translation = has_translation.get(seed.a_id).copied().unwrap_or(false);
            let mut context = context_map! {
                VOTER_ID => seed.a_id as i64,
                CANDIDATE_ID => candidate_id as i64,
                HAS_TRANSLATION => voter_has_translation,
                IS_ORIGIN_WORD => is_origin,
                SCORE_CANDIDATE => seed.score,
                RANK => seed.rank as i64,
                RECIPROCAL_RANK => 1.0 / seed.rank as f64,
                REAL_RECIPROCAL_RANK => 1.0 / seed.rank as f64,
                IMPORTANCE => 1.0,
                SCORE => seed.score,
            }
            .map_err(static_context_bug)?;
            if let Some(provider) = provider {
                provider.provide_for_word_a(seed.a_id, &mut context)?;
                provider.provide_for_word_in_topic_a(topic_id, seed.a_id, &mut context)?;
            }
            Ok(context)
        })
        .collect::<Result<Vec<_>, TranslationError>>()?;

    let mut global = candidate_context.layered_over(topic_context);
    let score = config
        .voting
        .execute_to_f64(&mut global, voters.as_mut_slice())
        .map_err(with_origin)?;

    Ok(match config.threshold {
        Some(threshold) if score < threshold => 0.0,
        _ => score,
    })
}

fn assemble_model<T>(
    model: &TopicModel<T>,
    dictionary: &Dictionary<T>,
    origin_ids: &[usize],
    per_topic: Vec<Vec<(CandidateSlot, f64)>>,
    configured_epsilon: Option<f64>,
) -> Result<TopicModel<T>, TranslationError>
where
    T: Eq + Hash + Clone + Ord + Send + Sync,
{
    let mut voc_out: Vocabulary<T> = Vocabulary::empty(dictionary.voc_b().language().cloned());
    for word in dictionary.voc_b().iter() {
        voc_out.add(word.clone());
    }
    for a_id in origin_ids.iter() {
        voc_out.add(dictionary.voc_a().id_to_word(*a_id).unwrap().clone());
    }
    if voc_out.is_empty() {
        return Err(TranslationError::NoOverlap);
    }

    let slot_to_out = |slot: &CandidateSlot| -> usize {
        match slot {
            CandidateSlot::Target(b_id) => *b_id,
            CandidateSlot::Origin(a_id) => voc_out
                .word_to_id(dictionary.voc_a().id_to_word(*a_id).unwrap())
                .expect("origin words were added above"),
        }
    };

    // target frequencies sum the frequencies of every contributing voter
    let mut frequencies = vec![0u64; voc_out.len()];
    for b_id in dictionary.voc_b().ids() {
        frequencies[b_id] = dictionary
            .map_b_to_a()
            .get(b_id)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .sorted_unstable()
                    .dedup()
                    .map(|a_id| model.frequency_of(a_id))
                    .sum()
            })
            .unwrap_or(0);
    }
    for a_id in origin_ids.iter() {
        let out_id = slot_to_out(&CandidateSlot::Origin(*a_id));
        frequencies[out_id] += model.frequency_of(*a_id);
    }

    let mut rows = vec![vec![0.0f64; voc_out.len()]; model.k()];
    for (topic_id, scores) in per_topic.into_iter().enumerate() {
        for (slot, score) in scores {
            if !score.is_finite() || score < 0.0 {
                return Err(TranslationError::BadProbability {
                    topic_id,
                    word_id: slot_to_out(&slot),
                    value: score,
                });
            }
            rows[topic_id][slot_to_out(&slot)] += score;
        }
    }

    // zeros collapse to a small positive epsilon before renormalization
    let fill = configured_epsilon.unwrap_or_else(|| {
        let min_positive = rows
            .iter()
            .flat_map(|row| row.iter())
            .copied()
            .filter(|value| *value > 0.0)
            .fold(f64::MAX, f64::min);
        if min_positive == f64::MAX {
            f64::MIN_POSITIVE
        } else {
            (min_positive - f64::EPSILON).max(f64::MIN_POSITIVE)
        }
    });
    for row in rows.iter_mut() {
        for value in row.iter_mut() {
            if *value == 0.0 {
                *value = fill;
            }
        }
        let sum: f64 = row.iter().sum();
        row.iter_mut().for_each(|value| *value /= sum);
    }

    Ok(TopicModel::new(
        rows,
        voc_out,
        frequencies,
        model.doc_topic_distributions().cloned(),
        model.document_lengths().cloned(),
    ))
}

#[cfg(test)]
mod test {
    use super::{translate_topic_model, KeepOriginalWord, TranslateConfig};
    use crate::dictionary::Dictionary;
    use crate::model::TopicModel;
    use crate::voting::BuildInVoting;
    use crate::dict;

    fn simple_model(vocab: Vec<&str>, topics: Vec<Vec<f64>>) -> TopicModel<String> {
        let voc = vocab.into_iter().map(|w| w.to_string()).collect::<crate::vocabulary::Vocabulary<String>>();
        let frequencies = vec![1; voc.len()];
        TopicModel::new(topics, voc, frequencies, None, None)
    }

    #[test]
    fn trivial_identity_translation() {
        let model = simple_model(vec!["cat"], vec![vec![1.0]]);
        let dict: Dictionary<String> = dict! { "cat": "chat" };
        let config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        let translated = translate_topic_model(&model, &dict, &config, None).unwrap();

        assert_eq!(1, translated.k());
        assert_eq!(
            vec!["chat"],
            translated.vocabulary().iter().map(|w| w.as_str()).collect::<Vec<_>>()
        );
        assert!((translated.topics()[0][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_to_one_merges_the_mass() {
        let model = simple_model(vec!["cat", "kitten"], vec![vec![0.3, 0.7]]);
        let dict: Dictionary<String> = dict! { "cat": "chat", "kitten": "chat" };
        let config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        let translated = translate_topic_model(&model, &dict, &config, None).unwrap();

        let chat = translated.word_to_id("chat").unwrap();
        assert!((translated.topics()[0][chat] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn one_to_two_splits_evenly() {
        let model = simple_model(vec!["big"], vec![vec![1.0]]);
        let dict: Dictionary<String> = dict! { "big": "grand", "big": "gros" };
        let config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        let translated = translate_topic_model(&model, &dict, &config, None).unwrap();

        let grand = translated.word_to_id("grand").unwrap();
        let gros = translated.word_to_id("gros").unwrap();
        assert!((translated.topics()[0][grand] - 0.5).abs() < 1e-12);
        assert!((translated.topics()[0][gros] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn comb_max_and_comb_sum_differ() {
        // "a" and "b" both map to "x"; "c" maps to "y" so the difference in
        // the aggregated mass of "x" is observable after normalization.
        let model = simple_model(vec!["a", "b", "c"], vec![vec![0.3, 0.45, 0.25]]);
        let dict: Dictionary<String> = dict! { "a": "x", "b": "x", "c": "y" };

        let sum = translate_topic_model(
            &model,
            &dict,
            &TranslateConfig::with_voting(BuildInVoting::CombSum),
            None,
        )
        .unwrap();
        let max = translate_topic_model(
            &model,
            &dict,
            &TranslateConfig::with_voting(BuildInVoting::CombMax),
            None,
        )
        .unwrap();

        let x = sum.word_to_id("x").unwrap();
        // CombSum: x = 0.75 / (0.75 + 0.25); CombMax: x = 0.45 / (0.45 + 0.25)
        assert!((sum.topics()[0][x] - 0.75).abs() < 1e-12);
        assert!((max.topics()[0][x] - 0.45 / 0.7).abs() < 1e-12);
    }

    #[test]
    fn keep_if_no_translation_retains_unmatched_words() {
        let model = simple_model(vec!["cat", "xyz"], vec![vec![0.3, 0.7]]);
        let dict: Dictionary<String> = dict! { "cat": "chat" };
        let mut config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        config.keep_original_word = KeepOriginalWord::IfNoTranslation;
        let translated = translate_topic_model(&model, &dict, &config, None).unwrap();

        let chat = translated.word_to_id("chat").unwrap();
        let xyz = translated.word_to_id("xyz").unwrap();
        assert!((translated.topics()[0][chat] - 0.3).abs() < 1e-12);
        assert!((translated.topics()[0][xyz] - 0.7).abs() < 1e-12);
        assert!(translated.word_to_id("cat").is_none());
    }

    #[test]
    fn keep_always_retains_every_source_word() {
        let model = simple_model(vec!["cat", "xyz"], vec![vec![0.3, 0.7]]);
        let dict: Dictionary<String> = dict! { "cat": "chat" };
        let mut config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        config.keep_original_word = KeepOriginalWord::Always;
        let translated = translate_topic_model(&model, &dict, &config, None).unwrap();

        let chat = translated.word_to_id("chat").unwrap();
        let cat = translated.word_to_id("cat").unwrap();
        let xyz = translated.word_to_id("xyz").unwrap();
        // raw masses: chat 0.3, cat 0.3, xyz 0.7, normalized by 1.3
        assert!((translated.topics()[0][chat] - 0.3 / 1.3).abs() < 1e-12);
        assert!((translated.topics()[0][cat] - 0.3 / 1.3).abs() < 1e-12);
        assert!((translated.topics()[0][xyz] - 0.7 / 1.3).abs() < 1e-12);
    }

    #[test]
    fn keep_never_excludes_source_words() {
        let model = simple_model(vec!["cat", "xyz"], vec![vec![0.3, 0.7]]);
        let dict: Dictionary<String> = dict! { "cat": "chat" };
        let config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        let translated = translate_topic_model(&model, &dict, &config, None).unwrap();
        assert!(translated.word_to_id("xyz").is_none());
        assert!(translated.word_to_id("cat").is_none());
    }

    #[test]
    fn rows_stay_stochastic_and_finite() {
        let model = simple_model(
            vec!["plane", "aircraft", "wing"],
            vec![vec![0.5, 0.3, 0.2], vec![0.1, 0.1, 0.8]],
        );
        let dict: Dictionary<String> = dict! {
            "plane": "Flugzeug",
            "plane": "Ebene",
            "aircraft": "Flugzeug",
            "wing": "Tragfläche",
        };
        let config = TranslateConfig::with_voting(BuildInVoting::PCombSum);
        let translated = translate_topic_model(&model, &dict, &config, None).unwrap();

        for row in translated.topics() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(row.iter().all(|value| value.is_finite() && *value >= 0.0));
        }
        assert_eq!(
            translated.doc_topic_distributions(),
            model.doc_topic_distributions()
        );
    }

    #[test]
    fn translation_is_deterministic() {
        let model = simple_model(
            vec!["plane", "aircraft", "wing", "deck"],
            vec![vec![0.4, 0.3, 0.2, 0.1], vec![0.1, 0.2, 0.3, 0.4]],
        );
        let dict: Dictionary<String> = dict! {
            "plane": "Flugzeug",
            "aircraft": "Flugzeug",
            "plane": "Ebene",
            "wing": "Tragfläche",
            "deck": "Tragfläche",
            "deck": "Deck",
        };
        let config = TranslateConfig::with_voting(BuildInVoting::CombSumRR);
        let first = translate_topic_model(&model, &dict, &config, None).unwrap();
        for _ in 0..3 {
            let again = translate_topic_model(&model, &dict, &config, None).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn missing_overlap_is_an_error() {
        let model = simple_model(vec!["cat"], vec![vec![1.0]]);
        let dict: Dictionary<String> = dict! { "dog": "chien" };
        let config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        assert!(translate_topic_model(&model, &dict, &config, None).is_err());
    }

    #[test]
    fn incompatible_languages_are_rejected() {
        let mut voc = crate::vocabulary::Vocabulary::<String>::empty_for("en");
        voc.add("cat");
        let model = TopicModel::new(vec![vec![1.0]], voc, vec![1], None, None);

        let mut dict: Dictionary<String> = Dictionary::new(Some("fr".into()), Some("de".into()));
        dict.add_word_pair("cat", "Katze");
        let config = TranslateConfig::with_voting(BuildInVoting::CombSum);
        assert!(matches!(
            translate_topic_model(&model, &dict, &config, None),
            Err(super::TranslationError::IncompatibleLanguages { .. })
        ));
    }

    #[test]
    fn provider_importance_feeds_weighted_votings() {
        let model = simple_model(vec!["a", "b"], vec![vec![0.4, 0.6]]);
        let dict: Dictionary<String> = dict! { "a": "x", "b": "x", "b": "y" };

        let provider = crate::provider::VariableProvider::new(1, 2, 2);
        provider.add_for_word_a(0, crate::variable_names::IMPORTANCE, 2.0).unwrap();
        provider.add_for_word_a(1, crate::variable_names::IMPORTANCE, 1.0).unwrap();

        let config = TranslateConfig::with_voting(BuildInVoting::WCombSum);
        let translated = translate_topic_model(&model, &dict, &config, Some(&provider)).unwrap();

        let x = translated.word_to_id("x").unwrap();
        let y = translated.word_to_id("y").unwrap();
        // x: 2.0*0.4 + 1.0*0.6 = 1.4, y: 1.0*0.6 = 0.6
        assert!((translated.topics()[0][x] - 1.4 / 2.0).abs() < 1e-12);
        assert!((translated.topics()[0][y] - 0.6 / 2.0).abs() < 1e-12);
    }
}
