mod builder;
mod inference;
mod math;

pub use builder::TopicModelBuilder;
pub use inference::{Alpha, DocProbability, TopicModelInferencer};

use std::borrow::Borrow;
use std::cmp::min;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::io::{self, Write};
use std::path::Path;

use approx::relative_eq;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::language_hint::LanguageHint;
use crate::persist;
use crate::vocabulary::Vocabulary;

pub(crate) const TOPIC_MODEL_MAGIC: [u8; 4] = *b"XTTM";

pub type Probability = f64;
pub type WordFrequency = u64;
pub type StringTopicModel = TopicModel<String>;

/// Cached summary statistics of one topic row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TopicStats {
    pub topic_id: usize,
    pub max_value: f64,
    pub min_value: f64,
    pub average_value: f64,
    pub sum_value: f64,
}

/// An LDA topic model: a k×|V| matrix of per-topic word probabilities, the
/// vocabulary, per-word corpus frequencies and optional per-document stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TopicModelSerde<T>", into = "TopicModelSerde<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de> + Eq + Hash + Clone"
))]
pub struct TopicModel<T> {
    topics: Vec<Vec<Probability>>,
    vocabulary: Vocabulary<T>,
    used_vocab_frequency: Vec<WordFrequency>,
    doc_topic_distributions: Option<Vec<Vec<Probability>>>,
    document_lengths: Option<Vec<u64>>,
    topic_stats: Vec<TopicStats>,
    sorted_word_ids: Vec<Vec<usize>>,
}

#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de> + Eq + Hash + Clone"
))]
struct TopicModelSerde<T> {
    topics: Vec<Vec<Probability>>,
    vocabulary: Vocabulary<T>,
    used_vocab_frequency: Vec<WordFrequency>,
    doc_topic_distributions: Option<Vec<Vec<Probability>>>,
    document_lengths: Option<Vec<u64>>,
}

impl<T: Eq + Hash + Clone> From<TopicModelSerde<T>> for TopicModel<T> {
    fn from(value: TopicModelSerde<T>) -> Self {
        Self::new(
            value.topics,
            value.vocabulary,
            value.used_vocab_frequency,
            value.doc_topic_distributions,
            value.document_lengths,
        )
    }
}

impl<T: Clone> From<TopicModel<T>> for TopicModelSerde<T> {
    fn from(value: TopicModel<T>) -> Self {
        Self {
            topics: value.topics,
            vocabulary: value.vocabulary,
            used_vocab_frequency: value.used_vocab_frequency,
            doc_topic_distributions: value.doc_topic_distributions,
            document_lengths: value.document_lengths,
        }
    }
}

impl<T> TopicModel<T> {
    pub fn new(
        topics: Vec<Vec<Probability>>,
        vocabulary: Vocabulary<T>,
        used_vocab_frequency: Vec<WordFrequency>,
        doc_topic_distributions: Option<Vec<Vec<Probability>>>,
        document_lengths: Option<Vec<u64>>,
    ) -> Self {
        let topic_stats = Self::calculate_topic_stats(&topics);
        let sorted_word_ids = Self::calculate_sorted_word_ids(&topics);
        Self {
            topics,
            vocabulary,
            used_vocab_frequency,
            doc_topic_distributions,
            document_lengths,
            topic_stats,
            sorted_word_ids,
        }
    }

    /// The number of topics in this model.
    pub fn k(&self) -> usize {
        self.topics.len()
    }

    pub fn topic_count(&self) -> usize {
        self.k()
    }

    pub fn topic_ids(&self) -> std::ops::Range<usize> {
        0..self.topics.len()
    }

    pub fn vocabulary(&self) -> &Vocabulary<T> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn topics(&self) -> &Vec<Vec<Probability>> {
        &self.topics
    }

    pub fn stats(&self) -> &[TopicStats] {
        &self.topic_stats
    }

    pub fn get_topic(&self, topic_id: usize) -> Option<&Vec<Probability>> {
        self.topics.get(topic_id)
    }

    pub fn get_probability(&self, topic_id: usize, word_id: usize) -> Option<&Probability> {
        self.topics.get(topic_id)?.get(word_id)
    }

    pub fn used_vocab_frequency(&self) -> &[WordFrequency] {
        &self.used_vocab_frequency
    }

    pub fn frequency_of(&self, word_id: usize) -> WordFrequency {
        self.used_vocab_frequency.get(word_id).copied().unwrap_or(0)
    }

    pub fn doc_topic_distributions(&self) -> Option<&Vec<Vec<Probability>>> {
        self.doc_topic_distributions.as_ref()
    }

    pub fn document_lengths(&self) -> Option<&Vec<u64>> {
        self.document_lengths.as_ref()
    }

    /// The word ids of `topic_id`, most probable first (ties by ascending id).
    pub fn sorted_word_ids(&self, topic_id: usize) -> Option<&Vec<usize>> {
        self.sorted_word_ids.get(topic_id)
    }

    fn calculate_topic_stats(topics: &[Vec<Probability>]) -> Vec<TopicStats> {
        topics
            .iter()
            .enumerate()
            .map(|(topic_id, topic)| {
                let mut max_value = f64::MIN;
                let mut min_value = f64::MAX;
                let mut sum_value = 0.0;
                for &value in topic {
                    max_value = max_value.max(value);
                    min_value = min_value.min(value);
                    sum_value += value;
                }
                TopicStats {
                    topic_id,
                    max_value,
                    min_value,
                    sum_value,
                    average_value: sum_value / (topic.len() as f64),
                }
            })
            .collect()
    }

    fn calculate_sorted_word_ids(topics: &[Vec<Probability>]) -> Vec<Vec<usize>> {
        topics
            .iter()
            .map(|topic| {
                (0..topic.len())
                    .sorted_by(|a, b| topic[*b].total_cmp(&topic[*a]).then(a.cmp(b)))
                    .collect_vec()
            })
            .collect()
    }

    fn recalculate_statistics(&mut self) {
        self.topic_stats = Self::calculate_topic_stats(&self.topics);
        self.sorted_word_ids = Self::calculate_sorted_word_ids(&self.topics);
    }

    /// Normalizes every topic row (and the doc-topic rows, when present) to
    /// sum to one.
    pub fn normalize_in_place(mut self) -> Self {
        for topic in self.topics.iter_mut() {
            let sum: f64 = topic.iter().sum();
            if sum != 0.0 {
                topic.iter_mut().for_each(|value| *value /= sum);
            }
        }
        if let Some(distributions) = self.doc_topic_distributions.as_mut() {
            for probabilities in distributions.iter_mut() {
                let sum: f64 = probabilities.iter().sum();
                if sum != 0.0 {
                    probabilities.iter_mut().for_each(|value| *value /= sum);
                }
            }
        }
        self.recalculate_statistics();
        self
    }
}

impl<T: Clone> TopicModel<T> {
    /// Returns a row-stochastic copy of this model.
    pub fn normalize(&self) -> Self {
        self.clone().normalize_in_place()
    }
}

impl<T: Eq + Hash + Clone> TopicModel<T> {
    pub fn builder(language: Option<LanguageHint>) -> TopicModelBuilder<T> {
        TopicModelBuilder::new(language)
    }

    pub fn word_to_id<Q: ?Sized>(&self, word: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.vocabulary.word_to_id(word)
    }

    pub fn contains<Q: ?Sized>(&self, word: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.vocabulary.contains(word)
    }

    /// Infers the topic distribution of a document against this model,
    /// following the gensim contract. Needs only the topic matrix, not the
    /// optional document statistics.
    pub fn get_doc_probability<I, Q: ?Sized>(
        &self,
        doc: impl IntoIterator<Item = I>,
        alpha: impl Into<Alpha>,
        gamma_threshold: f64,
        minimum_probability: Option<f64>,
        minimum_phi_value: Option<f64>,
        per_word_topics: Option<bool>,
    ) -> DocProbability
    where
        I: std::borrow::Borrow<Q>,
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        TopicModelInferencer::new(self, alpha, gamma_threshold).get_doc_probability(
            doc,
            minimum_probability.unwrap_or(TopicModelInferencer::<T>::DEFAULT_MIN_PROBABILITY),
            minimum_phi_value.unwrap_or(TopicModelInferencer::<T>::DEFAULT_MIN_PHI_VALUE),
            per_word_topics.unwrap_or_default(),
        )
    }

    /// Compares against another model word-by-word, tolerating float error
    /// and a different id assignment.
    pub fn seems_equal_to(&self, other: &TopicModel<T>) -> bool {
        self.k() == other.k()
            && self.vocabulary_size() == other.vocabulary_size()
            && self.vocabulary.iter_entries().all(|(word_id, word)| {
                other.word_to_id(word).is_some_and(|other_id| {
                    self.used_vocab_frequency.get(word_id) == other.used_vocab_frequency.get(other_id)
                })
            })
            && self
                .topics
                .iter()
                .zip_eq(other.topics.iter())
                .all(|(topic, other_topic)| {
                    self.vocabulary.iter_entries().all(|(word_id, word)| {
                        let other_id = other.word_to_id(word).expect("checked above");
                        relative_eq!(topic[word_id], other_topic[other_id])
                    })
                })
    }

    /// Projects this model through a per-topic list of replacement words:
    /// `word_lists[t][w]` receives the mass of source word `w` in topic `t`.
    /// Colliding targets sum. Bypasses the voting engine.
    pub fn translate_by_provided_word_lists<S>(
        &self,
        language: Option<LanguageHint>,
        word_lists: &[Vec<S>],
    ) -> Result<TopicModel<T>>
    where
        S: Clone + Into<T>,
    {
        if word_lists.len() != self.k() {
            return Err(Error::invalid_input(format!(
                "expected {} word lists, found {}",
                self.k(),
                word_lists.len()
            )));
        }
        for (topic_id, list) in word_lists.iter().enumerate() {
            if list.len() != self.vocabulary_size() {
                return Err(Error::invalid_input(format!(
                    "word list {topic_id} has {} entries but the vocabulary has {}",
                    list.len(),
                    self.vocabulary_size()
                )));
            }
        }

        let mut vocabulary: Vocabulary<T> = Vocabulary::empty(language);
        for list in word_lists {
            for word in list {
                vocabulary.add(word.clone().into());
            }
        }

        let mut topics = vec![vec![0.0; vocabulary.len()]; self.k()];
        let mut frequencies = vec![0u64; vocabulary.len()];
        for (topic_id, list) in word_lists.iter().enumerate() {
            for (word_id, target) in list.iter().enumerate() {
                let target_id = vocabulary
                    .word_to_id(&target.clone().into())
                    .expect("just inserted");
                topics[topic_id][target_id] += self.topics[topic_id][word_id];
                frequencies[target_id] = frequencies[target_id].max(self.frequency_of(word_id));
            }
        }

        Ok(TopicModel::new(
            topics,
            vocabulary,
            frequencies,
            self.doc_topic_distributions.clone(),
            self.document_lengths.clone(),
        )
        .normalize_in_place())
    }
}

impl<T: Eq + Hash + Clone + Ord> TopicModel<T> {
    /// The words of a topic, most probable first; ties break lexicographically.
    pub fn get_words_of_topic_sorted(&self, topic_id: usize) -> Option<Vec<(&T, Probability)>> {
        let topic = self.topics.get(topic_id)?;
        Some(
            self.vocabulary
                .iter_entries()
                .map(|(word_id, word)| (word, topic[word_id]))
                .sorted_by(|(word_a, p_a), (word_b, p_b)| {
                    p_b.total_cmp(p_a).then_with(|| word_a.cmp(word_b))
                })
                .collect(),
        )
    }

    /// The full topic as `(id, word, probability)` triples in id order.
    pub fn get_topic_as_words(&self, topic_id: usize) -> Option<Vec<(usize, &T, Probability)>> {
        let topic = self.topics.get(topic_id)?;
        Some(
            self.vocabulary
                .iter_entries()
                .map(|(word_id, word)| (word_id, word, topic[word_id]))
                .collect(),
        )
    }
}

impl<T: Display> TopicModel<T> {
    pub fn show_to(&self, n: usize, out: &mut impl Write) -> io::Result<()> {
        for (topic_id, sorted) in self.sorted_word_ids.iter().enumerate() {
            if topic_id != 0 {
                out.write_all(b"\n")?;
            }
            write!(out, "Topic({topic_id}):")?;
            for word_id in sorted.iter().take(min(n, sorted.len())) {
                write!(
                    out,
                    "\n    {}: {}",
                    self.vocabulary.id_to_word(*word_id).unwrap(),
                    self.topics[topic_id][*word_id]
                )?;
            }
        }
        Ok(())
    }

    /// A human-readable rendering of the `n` most probable words per topic.
    pub fn show_top(&self, n: usize) -> io::Result<String> {
        let mut out = Vec::new();
        self.show_to(n, &mut out)?;
        Ok(String::from_utf8(out).expect("display output is utf8"))
    }

    pub fn show_10(&self) -> io::Result<String> {
        self.show_top(10)
    }
}

impl<T> TopicModel<T>
where
    T: Serialize + DeserializeOwned + Eq + Hash + Clone,
{
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save_json(path, self)
    }

    pub fn save_binary(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save_binary(path, &TOPIC_MODEL_MAGIC, self)
    }

    /// Saves picking the format by the file extension (`.json` vs binary).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save_by_extension(path, &TOPIC_MODEL_MAGIC, self)
    }

    /// Loads either format, sniffing the magic.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        persist::load(path, &TOPIC_MODEL_MAGIC)
    }
}

impl<T: Eq> PartialEq for TopicModel<T> {
    fn eq(&self, other: &Self) -> bool {
        self.topics == other.topics
            && self.vocabulary == other.vocabulary
            && self.used_vocab_frequency == other.used_vocab_frequency
            && self.doc_topic_distributions == other.doc_topic_distributions
            && self.document_lengths == other.document_lengths
    }
}

impl<T: Display> Display for TopicModel<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("TopicModel:")?;
        for (topic_id, topic) in self.topics.iter().enumerate() {
            write!(f, "\n    Topic({topic_id})")?;
            for (word_id, probability) in topic.iter().enumerate() {
                write!(
                    f,
                    "\n        '{}'({}): {}",
                    self.vocabulary.id_to_word(word_id).unwrap(),
                    word_id,
                    probability
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::voc;

    pub(crate) fn create_test_model() -> StringTopicModel {
        let voc = voc![
            "plane".to_string(),
            "aircraft".to_string(),
            "airplane".to_string(),
            "flyer".to_string(),
            "airman".to_string(),
            "airfoil".to_string(),
            "wing".to_string(),
            "deck".to_string(),
            "hydrofoil".to_string(),
            "foil".to_string(),
            "bearing surface".to_string()
        ];

        TopicModel::new(
            vec![
                vec![0.019, 0.018, 0.012, 0.009, 0.008, 0.008, 0.008, 0.008, 0.008, 0.008, 0.008],
                vec![0.02, 0.002, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001],
            ],
            voc,
            vec![10, 5, 8, 1, 2, 3, 1, 1, 1, 1, 2],
            Some(vec![vec![0.7, 0.2], vec![0.8, 0.3]]),
            Some(vec![200, 300]),
        )
    }

    #[test]
    fn normalize_makes_rows_stochastic() {
        let model = create_test_model().normalize();
        for stats in model.stats() {
            assert!((stats.sum_value - 1.0).abs() <= model.k() as f64 * f64::EPSILON);
        }
    }

    #[test]
    fn sorted_words_break_ties_lexicographically() {
        let voc: Vocabulary<String> = voc!["b".to_string(), "a".to_string(), "c".to_string()];
        let model = TopicModel::new(vec![vec![0.5, 0.5, 0.7]], voc, vec![1, 1, 1], None, None);
        let sorted = model.get_words_of_topic_sorted(0).unwrap();
        assert_eq!("c", sorted[0].0);
        assert_eq!("a", sorted[1].0);
        assert_eq!("b", sorted[2].0);
    }

    #[test]
    fn show_top_renders_the_best_words() {
        let model = create_test_model();
        let shown = model.show_top(2).unwrap();
        assert!(shown.contains("Topic(0):"));
        assert!(shown.contains("plane"));
        assert!(!shown.contains("bearing surface"));
    }

    #[test]
    fn save_load_round_trip() {
        let model = create_test_model();
        let dir = std::env::temp_dir();

        let json_path = dir.join("crosstopic_model_test.json");
        model.save(&json_path).unwrap();
        let loaded = StringTopicModel::load(&json_path).unwrap();
        assert_eq!(model, loaded);

        let bin_path = dir.join("crosstopic_model_test.bin");
        model.save(&bin_path).unwrap();
        let loaded = StringTopicModel::load(&bin_path).unwrap();
        assert_eq!(model, loaded);

        std::fs::remove_file(json_path).unwrap();
        std::fs::remove_file(bin_path).unwrap();
    }

    #[test]
    fn word_list_projection_merges_mass() {
        let voc: Vocabulary<String> = voc!["cat".to_string(), "kitten".to_string()];
        let model = TopicModel::new(vec![vec![0.3, 0.7]], voc, vec![2, 3], None, None);
        let translated = model
            .translate_by_provided_word_lists(Some("fr".into()), &[vec!["chat", "chat"]])
            .unwrap();
        assert_eq!(1, translated.vocabulary_size());
        assert!((translated.topics()[0][0] - 1.0).abs() < 1e-12);
    }
}
