use std::hash::Hash;

use itertools::repeat_n;

use crate::error::{Error, Result};
use crate::language_hint::LanguageHint;
use crate::model::{Probability, TopicModel, WordFrequency};
use crate::vocabulary::Vocabulary;

/// Builds a [`TopicModel`] incrementally. Cells never set stay as holes and
/// are filled with the smallest observed probability on `build`.
#[derive(Debug, Clone)]
pub struct TopicModelBuilder<T> {
    voc: Vocabulary<T>,
    topics: Vec<Vec<Probability>>,
    used_vocab_frequency: Vec<WordFrequency>,
    doc_topic_distributions: Option<Vec<Vec<Probability>>>,
    document_lengths: Option<Vec<u64>>,
}

impl<T: Eq + Hash + Clone> TopicModelBuilder<T> {
    pub fn new(language: Option<LanguageHint>) -> Self {
        Self {
            voc: Vocabulary::empty(language),
            topics: Vec::new(),
            used_vocab_frequency: Vec::new(),
            doc_topic_distributions: None,
            document_lengths: None,
        }
    }

    fn set_probability(&mut self, topic_id: usize, word_id: usize, probability: Probability) {
        while self.topics.len() <= topic_id {
            self.topics.push(Vec::new());
        }
        let topic = &mut self.topics[topic_id];
        if topic.len() <= word_id {
            let missing = word_id + 1 - topic.len();
            topic.extend(repeat_n(f64::NAN, missing));
        }
        topic[word_id] = probability;
    }

    fn set_frequency_impl(&mut self, word_id: usize, frequency: WordFrequency) {
        if self.used_vocab_frequency.len() <= word_id {
            let missing = word_id + 1 - self.used_vocab_frequency.len();
            self.used_vocab_frequency.extend(repeat_n(0, missing));
        }
        self.used_vocab_frequency[word_id] += frequency;
    }

    /// Sets the corpus frequency of a word, inserting it if absent.
    pub fn set_frequency(&mut self, word: impl Into<T>, frequency: WordFrequency) -> &mut Self {
        let word_id = self.voc.add(word.into());
        if self.used_vocab_frequency.len() <= word_id {
            let missing = word_id + 1 - self.used_vocab_frequency.len();
            self.used_vocab_frequency.extend(repeat_n(0, missing));
        }
        self.used_vocab_frequency[word_id] = frequency;
        self
    }

    /// Sets the probability of `word` in `topic_id`, inserting the word into
    /// the vocabulary if absent and accumulating the optional frequency.
    pub fn add_word(
        &mut self,
        topic_id: usize,
        word: impl Into<T>,
        probability: Probability,
        frequency: Option<WordFrequency>,
    ) -> Result<&mut Self> {
        if !probability.is_finite() || probability < 0.0 {
            return Err(Error::invalid_input(format!(
                "the probability has to be a non-negative finite number, got {probability}"
            )));
        }
        let word_id = self.voc.add(word.into());
        self.set_probability(topic_id, word_id, probability);
        if let Some(frequency) = frequency {
            self.set_frequency_impl(word_id, frequency);
        }
        Ok(self)
    }

    pub fn set_doc_topic_distributions(
        &mut self,
        doc_topic_distributions: Option<Vec<Vec<Probability>>>,
    ) -> &mut Self {
        self.doc_topic_distributions = doc_topic_distributions;
        self
    }

    pub fn set_document_lengths(&mut self, document_lengths: Option<Vec<u64>>) -> &mut Self {
        self.document_lengths = document_lengths;
        self
    }

    /// Validates the shape, fills holes and produces the model.
    pub fn build(&self) -> Result<TopicModel<T>> {
        let mut topics = self.topics.clone();
        if topics.is_empty() || self.voc.is_empty() {
            return Err(Error::invalid_input(
                "a topic model needs at least one topic and one word",
            ));
        }

        let fill = topics
            .iter()
            .flatten()
            .copied()
            .filter(|value| !value.is_nan())
            .fold(f64::MAX, f64::min);
        if fill == f64::MAX {
            return Err(Error::invalid_input("there has to be some probability given"));
        }

        for topic in topics.iter_mut() {
            for value in topic.iter_mut() {
                if value.is_nan() {
                    *value = fill;
                }
            }
            if topic.len() < self.voc.len() {
                let missing = self.voc.len() - topic.len();
                topic.extend(repeat_n(fill, missing));
            } else if topic.len() > self.voc.len() {
                return Err(Error::InvariantViolation(format!(
                    "a topic row is longer ({}) than the vocabulary ({})",
                    topic.len(),
                    self.voc.len()
                )));
            }
        }

        let mut used_vocab_frequency = self.used_vocab_frequency.clone();
        used_vocab_frequency.resize(self.voc.len(), 0);

        Ok(TopicModel::new(
            topics,
            self.voc.clone(),
            used_vocab_frequency,
            self.doc_topic_distributions.clone(),
            self.document_lengths.clone(),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::TopicModelBuilder;

    #[test]
    fn builds_a_model_with_filled_holes() {
        let mut builder = TopicModelBuilder::<String>::new(None);
        builder.add_word(0, "hello", 1.0, None).unwrap();
        builder.add_word(1, "hello", 2.0, None).unwrap();
        builder.add_word(0, "beer", 2.0, Some(3)).unwrap();
        builder.add_word(1, "cat", 2.0, None).unwrap();
        let model = builder.build().unwrap();

        assert_eq!(2, model.k());
        assert_eq!(3, model.vocabulary_size());
        // "cat" was never set in topic 0, so it gets the smallest probability.
        assert_eq!(1.0, model.topics()[0][model.word_to_id("cat").unwrap()]);
        assert_eq!(3, model.frequency_of(model.word_to_id("beer").unwrap()));
    }

    #[test]
    fn rejects_bad_probabilities() {
        let mut builder = TopicModelBuilder::<String>::new(None);
        assert!(builder.add_word(0, "x", f64::NAN, None).is_err());
        assert!(builder.add_word(0, "x", -1.0, None).is_err());
    }

    #[test]
    fn rejects_an_empty_build() {
        let builder = TopicModelBuilder::<String>::new(None);
        assert!(builder.build().is_err());
    }
}
