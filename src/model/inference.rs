use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use itertools::Itertools;
use rand::prelude::Distribution;
use rand::thread_rng;

use crate::model::math::{dirichlet_expectation_1d, dirichlet_expectation_2d, dot, transpose};
use crate::model::TopicModel;

/// A scalar or per-topic Dirichlet prior.
#[derive(Debug, Clone)]
pub enum Alpha {
    Single(f64),
    PerTopic(Vec<f64>),
}

impl From<f64> for Alpha {
    fn from(value: f64) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<f64>> for Alpha {
    fn from(value: Vec<f64>) -> Self {
        Self::PerTopic(value)
    }
}

/// The inference output: per-topic probabilities and, when requested, the
/// word→topics and word→(topic, phi) mappings.
pub type DocProbability = (
    Vec<(usize, f64)>,
    Option<Vec<(usize, Vec<usize>)>>,
    Option<Vec<(usize, Vec<(usize, f64)>)>>,
);

/// Infers document-topic probabilities against a trained model, following the
/// gensim contract (variational Bayes with a gamma-initialized q).
pub struct TopicModelInferencer<'a, T> {
    topic_model: &'a TopicModel<T>,
    alpha: Alpha,
    gamma_threshold: f64,
}

impl<'a, T> TopicModelInferencer<'a, T> {
    pub const DEFAULT_MIN_PROBABILITY: f64 = 1E-10;
    pub const DEFAULT_MIN_PHI_VALUE: f64 = 1E-10;
    const ITERATIONS: usize = 1000;

    pub fn new(topic_model: &'a TopicModel<T>, alpha: impl Into<Alpha>, gamma_threshold: f64) -> Self {
        Self {
            topic_model,
            alpha: alpha.into(),
            gamma_threshold,
        }
    }
}

impl<'a, T: Eq + Hash + Clone> TopicModelInferencer<'a, T> {
    /// Infers the topic distribution of `doc`. Words unknown to the model's
    /// vocabulary are ignored.
    pub fn get_doc_probability<I, Q: ?Sized>(
        &self,
        doc: impl IntoIterator<Item = I>,
        minimum_probability: f64,
        minimum_phi_value: f64,
        per_word_topics: bool,
    ) -> DocProbability
    where
        I: Borrow<Q>,
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        let minimum_probability = Self::DEFAULT_MIN_PROBABILITY.max(minimum_probability);
        let minimum_phi_value = Self::DEFAULT_MIN_PHI_VALUE.max(minimum_phi_value);

        let bow = self.doc_to_bow(doc);
        let (gamma, phis) = self.inference(
            vec![bow.iter().map(|(id, count)| (*id, *count)).collect_vec()],
            per_word_topics,
        );
        let norm_value: f64 = gamma[0].iter().sum();
        let document_topics = gamma[0]
            .iter()
            .map(|value| value / norm_value)
            .enumerate()
            .filter(|(_, value)| *value > minimum_probability)
            .collect_vec();

        let Some(phis) = phis else {
            return (document_topics, None, None);
        };

        let mut word_topic: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut word_phi: Vec<(usize, Vec<(usize, f64)>)> = Vec::new();
        for (word_id, _) in bow.iter() {
            let mut phi_values: Vec<(f64, usize)> = Vec::new();
            let mut phi_topic: Vec<(usize, f64)> = Vec::new();
            for topic_id in self.topic_model.topic_ids() {
                let v = phis[topic_id][*word_id];
                if v > minimum_phi_value {
                    phi_values.push((v, topic_id));
                    phi_topic.push((topic_id, v));
                }
            }
            word_phi.push((*word_id, phi_topic));
            phi_values.sort_by(|a, b| b.0.total_cmp(&a.0));
            word_topic.push((*word_id, phi_values.into_iter().map(|(_, topic)| topic).collect()));
        }
        (document_topics, Some(word_topic), Some(word_phi))
    }

    pub fn get_doc_probability_default<I, Q: ?Sized>(
        &self,
        doc: impl IntoIterator<Item = I>,
        per_word_topics: bool,
    ) -> DocProbability
    where
        I: Borrow<Q>,
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.get_doc_probability(
            doc,
            Self::DEFAULT_MIN_PROBABILITY,
            Self::DEFAULT_MIN_PHI_VALUE,
            per_word_topics,
        )
    }

    fn doc_to_bow<I, Q: ?Sized>(&self, doc: impl IntoIterator<Item = I>) -> HashMap<usize, usize>
    where
        I: Borrow<Q>,
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for word in doc {
            if let Some(word_id) = self.topic_model.word_to_id(word.borrow()) {
                match counts.entry(word_id) {
                    Entry::Occupied(entry) => *entry.into_mut() += 1,
                    Entry::Vacant(vacant) => {
                        vacant.insert(1);
                    }
                }
            }
        }
        counts
    }

    fn gamma_for(&self, alpha: &Alpha, dot: f64, theta: f64, topic_id: usize) -> f64 {
        match alpha {
            Alpha::Single(alpha) => dot * theta + alpha,
            Alpha::PerTopic(values) => dot * theta + values.get(topic_id).copied().unwrap_or(0.0),
        }
    }

    fn inference(
        &self,
        chunk: Vec<Vec<(usize, usize)>>,
        collect_stats: bool,
    ) -> (Vec<Vec<f64>>, Option<Vec<Vec<f64>>>) {
        let k = self.topic_model.k();

        let gamma_init = rand_distr::Gamma::new(100., 1. / 100.)
            .expect("valid gamma parameters")
            .sample_iter(&mut thread_rng())
            .take(k * chunk.len())
            .chunks(k)
            .into_iter()
            .map(|value| value.collect_vec())
            .collect_vec();

        let exp_e_log_theta = dirichlet_expectation_2d(&gamma_init)
            .into_iter()
            .map(|values| values.into_iter().map(f64::exp).collect_vec())
            .collect_vec();

        let mut stats = collect_stats
            .then(|| vec![vec![0.0; self.topic_model.vocabulary_size()]; k]);

        let gamma = itertools::multizip((chunk, gamma_init, exp_e_log_theta))
            .map(|(doc, mut gamma_d, mut exp_e_log_theta_d)| {
                let (ids, cts): (Vec<usize>, Vec<usize>) = doc.into_iter().unzip();
                let exp_e_log_beta_d = self
                    .topic_model
                    .topics()
                    .iter()
                    .map(|topic| ids.iter().map(|id| topic[*id]).collect_vec())
                    .collect_vec();
                let mut phinorm = if ids.is_empty() {
                    Vec::new()
                } else {
                    dot(&exp_e_log_theta_d, &exp_e_log_beta_d)
                        .into_iter()
                        .map(|value| value + f64::EPSILON)
                        .collect_vec()
                };
                if !ids.is_empty() {
                    for _ in 0..Self::ITERATIONS {
                        let last_gamma = gamma_d.clone();
                        let weighted = cts
                            .iter()
                            .zip_eq(phinorm.iter())
                            .map(|(ct, phi)| *ct as f64 / phi)
                            .collect_vec();
                        let transposed = transpose(&exp_e_log_beta_d);
                        gamma_d = dot(&weighted, &transposed)
                            .into_iter()
                            .zip_eq(exp_e_log_theta_d.iter())
                            .enumerate()
                            .map(|(topic_id, (dot, theta))| {
                                self.gamma_for(&self.alpha, dot, *theta, topic_id)
                            })
                            .collect_vec();
                        exp_e_log_theta_d = dirichlet_expectation_1d(&gamma_d)
                            .into_iter()
                            .map(f64::exp)
                            .collect_vec();
                        phinorm = dot(&exp_e_log_theta_d, &exp_e_log_beta_d)
                            .into_iter()
                            .map(|value| value + f64::EPSILON)
                            .collect_vec();
                        let meanchange = gamma_d
                            .iter()
                            .zip_eq(last_gamma.iter())
                            .map(|(a, b)| (a - b).abs())
                            .sum::<f64>()
                            / gamma_d.len() as f64;
                        if meanchange < self.gamma_threshold {
                            break;
                        }
                    }
                }
                if let Some(stats) = stats.as_mut() {
                    let weighted = cts
                        .iter()
                        .zip_eq(phinorm.iter())
                        .map(|(ct, phi)| *ct as f64 / phi)
                        .collect_vec();
                    for (topic_id, theta) in exp_e_log_theta_d.iter().enumerate() {
                        for (pos, id) in ids.iter().enumerate() {
                            stats[topic_id][*id] += theta * weighted[pos];
                        }
                    }
                }
                gamma_d
            })
            .collect_vec();

        (gamma, stats)
    }
}

#[cfg(test)]
mod test {
    use crate::model::test::create_test_model;
    use crate::model::TopicModelInferencer;

    #[test]
    fn inference_prefers_the_matching_topic() {
        let model = create_test_model().normalize();
        let inferencer = TopicModelInferencer::new(&model, 0.1, 0.001);
        let (topics, _, _) =
            inferencer.get_doc_probability_default::<&str, str>(["plane", "aircraft", "airplane"], false);
        assert!(!topics.is_empty());
        let best = topics
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(0, best.0);
    }

    #[test]
    fn unknown_words_are_ignored() {
        let model = create_test_model().normalize();
        let inferencer = TopicModelInferencer::new(&model, 0.1, 0.001);
        let (topics, words, phis) =
            inferencer.get_doc_probability_default::<&str, str>(["completely", "unknown"], true);
        assert!(words.unwrap().is_empty());
        assert!(phis.unwrap().is_empty());
        // with an empty bow the prior dominates, but the result stays a distribution
        let total: f64 = topics.iter().map(|(_, p)| *p).sum();
        assert!(total <= 1.0 + 1e-9);
    }
}
