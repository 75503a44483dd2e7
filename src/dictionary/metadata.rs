use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dictionary::direction::LanguageKind;
use crate::vocabulary::Vocabulary;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("the word id {id} does not exist on side {side}")]
    OutOfRange { side: LanguageKind, id: usize },
}

/// Anything that can be fed into a set-valued metadata field: a single value
/// or any collection of values.
pub trait IntoTagSet {
    fn into_tag_set(self) -> Vec<String>;
}

impl IntoTagSet for String {
    fn into_tag_set(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoTagSet for &str {
    fn into_tag_set(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl<S: Into<String>> IntoTagSet for Vec<S> {
    fn into_tag_set(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String> + Clone> IntoTagSet for &[S] {
    fn into_tag_set(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoTagSet for [S; N] {
    fn into_tag_set(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

/// A bilingual dictionary entry with optional per-side metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub word_a: String,
    pub word_b: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dictionary_a: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dictionary_b: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_a: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_b: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unstemmed_a: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unstemmed_b: BTreeMap<String, Vec<String>>,
}

impl DictionaryEntry {
    pub fn new(word_a: impl Into<String>, word_b: impl Into<String>) -> Self {
        Self {
            word_a: word_a.into(),
            word_b: word_b.into(),
            ..Default::default()
        }
    }

    pub fn dictionary_a(mut self, value: impl IntoTagSet) -> Self {
        self.dictionary_a.extend(value.into_tag_set());
        self
    }

    pub fn dictionary_b(mut self, value: impl IntoTagSet) -> Self {
        self.dictionary_b.extend(value.into_tag_set());
        self
    }

    pub fn meta_a(mut self, value: impl IntoTagSet) -> Self {
        self.meta_a.extend(value.into_tag_set());
        self
    }

    pub fn meta_b(mut self, value: impl IntoTagSet) -> Self {
        self.meta_b.extend(value.into_tag_set());
        self
    }

    pub fn unstemmed_a(mut self, surface: impl Into<String>, tags: impl IntoTagSet) -> Self {
        self.unstemmed_a
            .entry(surface.into())
            .or_default()
            .extend(tags.into_tag_set());
        self
    }

    pub fn unstemmed_b(mut self, surface: impl Into<String>, tags: impl IntoTagSet) -> Self {
        self.unstemmed_b
            .entry(surface.into())
            .or_default()
            .extend(tags.into_tag_set());
        self
    }

    pub fn has_metadata_a(&self) -> bool {
        !self.dictionary_a.is_empty() || !self.meta_a.is_empty() || !self.unstemmed_a.is_empty()
    }

    pub fn has_metadata_b(&self) -> bool {
        !self.dictionary_b.is_empty() || !self.meta_b.is_empty() || !self.unstemmed_b.is_empty()
    }
}

/// The interned per-word metadata. All fields merge by set-union, never remove.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    associated_dictionaries: BTreeSet<usize>,
    meta_tags: BTreeSet<usize>,
    unstemmed: BTreeMap<usize, BTreeSet<usize>>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.associated_dictionaries.is_empty()
            && self.meta_tags.is_empty()
            && self.unstemmed.is_empty()
    }

    fn merge(&mut self, other: &Metadata) {
        self.associated_dictionaries
            .extend(other.associated_dictionaries.iter().copied());
        self.meta_tags.extend(other.meta_tags.iter().copied());
        for (surface, tags) in other.unstemmed.iter() {
            self.unstemmed
                .entry(*surface)
                .or_default()
                .extend(tags.iter().copied());
        }
    }
}

/// The resolved per-word metadata view with all interned ids turned back into
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedMetadata {
    pub associated_dictionaries: Vec<String>,
    pub meta_tags: Vec<String>,
    pub unstemmed: Vec<(String, Vec<String>)>,
}

impl Display for SolvedMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Meta{{dictionaries=[{}], tags=[{}], unstemmed=[{}]}}",
            self.associated_dictionaries.iter().join(", "),
            self.meta_tags.iter().join(", "),
            self.unstemmed
                .iter()
                .map(|(surface, tags)| format!("{surface}({})", tags.iter().join(", ")))
                .join(", ")
        )
    }
}

/// Holds the metadata of both sides of a dictionary. Provenance tags, meta
/// tags and unstemmed surface forms are interned in shared vocabularies, the
/// per-word records only carry ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataContainer {
    dictionary_names: Vocabulary<String>,
    tags: Vocabulary<String>,
    unstemmed_words: Vocabulary<String>,
    meta_a: Vec<Option<Metadata>>,
    meta_b: Vec<Option<Metadata>>,
}

impl MetadataContainer {
    fn side_mut(&mut self, side: LanguageKind) -> &mut Vec<Option<Metadata>> {
        match side {
            LanguageKind::A => &mut self.meta_a,
            LanguageKind::B => &mut self.meta_b,
        }
    }

    fn side(&self, side: LanguageKind) -> &Vec<Option<Metadata>> {
        match side {
            LanguageKind::A => &self.meta_a,
            LanguageKind::B => &self.meta_b,
        }
    }

    pub fn get_or_init(&mut self, side: LanguageKind, word_id: usize) -> &mut Metadata {
        let slot = self.side_mut(side);
        if slot.len() <= word_id {
            slot.resize_with(word_id + 1, || None);
        }
        slot[word_id].get_or_insert_with(Metadata::default)
    }

    pub fn get(&self, side: LanguageKind, word_id: usize) -> Option<&Metadata> {
        self.side(side).get(word_id)?.as_ref()
    }

    pub fn add_dictionaries<I: IntoTagSet>(&mut self, side: LanguageKind, word_id: usize, dicts: I) {
        let ids = dicts
            .into_tag_set()
            .into_iter()
            .map(|d| self.dictionary_names.add(d))
            .collect_vec();
        self.get_or_init(side, word_id)
            .associated_dictionaries
            .extend(ids);
    }

    pub fn add_meta_tags<I: IntoTagSet>(&mut self, side: LanguageKind, word_id: usize, tags: I) {
        let ids = tags
            .into_tag_set()
            .into_iter()
            .map(|t| self.tags.add(t))
            .collect_vec();
        self.get_or_init(side, word_id).meta_tags.extend(ids);
    }

    pub fn add_unstemmed<I: IntoTagSet>(
        &mut self,
        side: LanguageKind,
        word_id: usize,
        surface: impl Into<String>,
        tags: I,
    ) {
        let surface_id = self.unstemmed_words.add(surface.into());
        let tag_ids = tags
            .into_tag_set()
            .into_iter()
            .map(|t| self.tags.add(t))
            .collect_vec();
        self.get_or_init(side, word_id)
            .unstemmed
            .entry(surface_id)
            .or_default()
            .extend(tag_ids);
    }

    /// Merges a foreign metadata record (resolved through `other`'s interners)
    /// into this container.
    pub fn merge_solved(&mut self, side: LanguageKind, word_id: usize, solved: &SolvedMetadata) {
        self.add_dictionaries(side, word_id, solved.associated_dictionaries.clone());
        self.add_meta_tags(side, word_id, solved.meta_tags.clone());
        for (surface, tags) in solved.unstemmed.iter() {
            self.add_unstemmed(side, word_id, surface.clone(), tags.clone());
        }
    }

    /// Merges a raw metadata record that shares this container's interners.
    pub fn merge_raw(&mut self, side: LanguageKind, word_id: usize, raw: &Metadata) {
        self.get_or_init(side, word_id).merge(raw)
    }

    pub fn solve(&self, side: LanguageKind, word_id: usize) -> Option<SolvedMetadata> {
        let meta = self.get(side, word_id)?;
        if meta.is_empty() {
            return None;
        }
        Some(SolvedMetadata {
            associated_dictionaries: meta
                .associated_dictionaries
                .iter()
                .map(|id| self.dictionary_names.id_to_word(*id).unwrap().clone())
                .collect(),
            meta_tags: meta
                .meta_tags
                .iter()
                .map(|id| self.tags.id_to_word(*id).unwrap().clone())
                .collect(),
            unstemmed: meta
                .unstemmed
                .iter()
                .map(|(surface, tags)| {
                    (
                        self.unstemmed_words.id_to_word(*surface).unwrap().clone(),
                        tags.iter()
                            .map(|id| self.tags.id_to_word(*id).unwrap().clone())
                            .collect(),
                    )
                })
                .collect(),
        })
    }

    /// All provenance dictionary names encountered so far.
    pub fn known_dictionaries(&self) -> Vec<&String> {
        self.dictionary_names.iter().collect()
    }

    /// The union of all provenance and meta labels encountered so far.
    pub fn all_tags(&self) -> Vec<&String> {
        self.dictionary_names.iter().chain(self.tags.iter()).collect()
    }

    /// The implicit vocabulary of every unstemmed surface form encountered.
    pub fn unstemmed_vocabulary(&self) -> &Vocabulary<String> {
        &self.unstemmed_words
    }

    /// A copy with the per-word records cleared but all interners kept.
    pub fn copy_keep_interners(&self) -> Self {
        Self {
            dictionary_names: self.dictionary_names.clone(),
            tags: self.tags.clone(),
            unstemmed_words: self.unstemmed_words.clone(),
            meta_a: Vec::new(),
            meta_b: Vec::new(),
        }
    }

    /// Swaps the two sides in place.
    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.meta_a, &mut self.meta_b);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn metadata_merges_by_union() {
        let mut container = MetadataContainer::default();
        container.add_dictionaries(LanguageKind::A, 0, "dictcc");
        container.add_dictionaries(LanguageKind::A, 0, vec!["dictcc", "wiktionary"]);
        container.add_meta_tags(LanguageKind::A, 0, "noun");
        container.add_unstemmed(LanguageKind::A, 0, "planes", "plural");
        container.add_unstemmed(LanguageKind::A, 0, "planes", ["plural", "en"]);

        let solved = container.solve(LanguageKind::A, 0).unwrap();
        assert_eq!(vec!["dictcc", "wiktionary"], solved.associated_dictionaries);
        assert_eq!(vec!["noun"], solved.meta_tags);
        assert_eq!(1, solved.unstemmed.len());
        assert_eq!("planes", solved.unstemmed[0].0);
        assert_eq!(vec!["plural", "en"], solved.unstemmed[0].1);
    }

    #[test]
    fn sides_are_independent() {
        let mut container = MetadataContainer::default();
        container.add_meta_tags(LanguageKind::A, 1, "only-a");
        assert!(container.solve(LanguageKind::B, 1).is_none());
        assert!(container.solve(LanguageKind::A, 1).is_some());
    }

    #[test]
    fn tags_reports_the_union_of_labels() {
        let mut container = MetadataContainer::default();
        container.add_dictionaries(LanguageKind::A, 0, "dictcc");
        container.add_meta_tags(LanguageKind::B, 0, "verb");
        let tags = container.all_tags();
        assert!(tags.contains(&&"dictcc".to_string()));
        assert!(tags.contains(&&"verb".to_string()));
    }
}
