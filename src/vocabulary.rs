use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::Path;
use std::slice::Iter;
use std::str::FromStr;

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language_hint::LanguageHint;
use crate::persist;

pub(crate) const VOCABULARY_MAGIC: [u8; 4] = *b"XTVC";

pub type StringVocabulary = Vocabulary<String>;

#[macro_export]
macro_rules! voc {
    () => {
        $crate::vocabulary::Vocabulary::default()
    };
    ($($value: expr),+ $(,)?) => {
        {
            let mut __voc = $crate::vocabulary::Vocabulary::default();
            $(
                __voc.add($value);
            )+
            __voc
        }
    };
}

/// A vocabulary mapping between a usize id and a word. Ids equal the insertion
/// rank and are never reused.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "VocabularySerde<T>", into = "VocabularySerde<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de> + Eq + Hash + Clone"
))]
pub struct Vocabulary<T> {
    language: Option<LanguageHint>,
    id2entry: Vec<T>,
    entry2id: HashMap<T, usize>,
}

#[derive(Serialize, Deserialize)]
struct VocabularySerde<T> {
    language: Option<LanguageHint>,
    id2entry: Vec<T>,
}

impl<T: Eq + Hash + Clone> From<VocabularySerde<T>> for Vocabulary<T> {
    fn from(value: VocabularySerde<T>) -> Self {
        Self::create_from(value.language, value.id2entry)
    }
}

impl<T: Clone> From<Vocabulary<T>> for VocabularySerde<T> {
    fn from(value: Vocabulary<T>) -> Self {
        Self {
            language: value.language,
            id2entry: value.id2entry,
        }
    }
}

impl<T> Vocabulary<T> {
    /// Create a new empty vocabulary.
    pub fn empty(language: Option<LanguageHint>) -> Self {
        Self {
            language,
            id2entry: Vec::new(),
            entry2id: HashMap::new(),
        }
    }

    pub fn empty_for(language: impl Into<LanguageHint>) -> Self {
        Self::empty(Some(language.into()))
    }

    pub fn with_capacity(language: Option<LanguageHint>, capacity: usize) -> Self {
        Self {
            language,
            id2entry: Vec::with_capacity(capacity),
            entry2id: HashMap::with_capacity(capacity),
        }
    }

    pub fn language(&self) -> Option<&LanguageHint> {
        self.language.as_ref()
    }

    pub fn set_language(&mut self, new: Option<LanguageHint>) -> Option<LanguageHint> {
        std::mem::replace(&mut self.language, new)
    }

    /// The number of entries in the vocabulary.
    pub fn len(&self) -> usize {
        self.id2entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2entry.is_empty()
    }

    pub fn clear(&mut self) {
        self.id2entry.clear();
        self.entry2id.clear();
    }

    /// All valid ids, in order.
    pub fn ids(&self) -> Range<usize> {
        0..self.id2entry.len()
    }

    /// Iterate over the words in id order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.id2entry.iter()
    }

    pub fn iter_entries(&self) -> impl Iterator<Item = (usize, &T)> {
        self.id2entry.iter().enumerate()
    }

    pub fn id_to_word(&self, id: usize) -> Option<&T> {
        self.id2entry.get(id)
    }

    pub fn contains_id(&self, id: usize) -> bool {
        id < self.id2entry.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.id2entry
    }
}

impl<T: Eq + Hash + Clone> Vocabulary<T> {
    pub fn create_from(language: Option<LanguageHint>, words: Vec<T>) -> Self {
        let entry2id = words
            .iter()
            .cloned()
            .enumerate()
            .map(|(id, word)| (word, id))
            .collect();
        Self {
            language,
            id2entry: words,
            entry2id,
        }
    }

    /// Adds the word and returns the associated id. Re-adding an existing word
    /// is idempotent.
    pub fn add(&mut self, word: impl Into<T>) -> usize {
        let word = word.into();
        if let Some(found) = self.entry2id.get(&word) {
            return *found;
        }
        let id = self.id2entry.len();
        self.id2entry.push(word.clone());
        self.entry2id.insert(word, id);
        id
    }

    pub fn word_to_id<Q: ?Sized>(&self, word: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.entry2id.get(word).copied()
    }

    pub fn contains<Q: ?Sized>(&self, word: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.entry2id.contains_key(word)
    }

    /// Returns a new vocabulary retaining the words whose id passes the filter.
    pub fn filter_by_id<F: Fn(usize) -> bool>(&self, filter: F) -> Self {
        Self::create_from(
            self.language.clone(),
            self.iter_entries()
                .filter(|(id, _)| filter(*id))
                .map(|(_, word)| word.clone())
                .collect(),
        )
    }

    /// Returns a new vocabulary retaining the words that pass the filter.
    pub fn filter_by_value<F: Fn(&T) -> bool>(&self, filter: F) -> Self {
        Self::create_from(
            self.language.clone(),
            self.id2entry.iter().filter(|w| filter(w)).cloned().collect(),
        )
    }

    /// Maps every word, keeping ids and the language hint.
    pub fn map<Q: Eq + Hash + Clone, F: Fn(&T) -> Q>(&self, mapping: F) -> Vocabulary<Q> {
        Vocabulary::create_from(
            self.language.clone(),
            self.id2entry.iter().map(mapping).collect(),
        )
    }
}

impl<T> Default for Vocabulary<T> {
    fn default() -> Self {
        Self::empty(None)
    }
}

impl<T: Eq> PartialEq for Vocabulary<T> {
    fn eq(&self, other: &Self) -> bool {
        self.language == other.language
            && self.id2entry.len() == other.id2entry.len()
            && self
                .id2entry
                .iter()
                .zip(other.id2entry.iter())
                .all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for Vocabulary<T> {}

impl<T: Eq + Hash + Clone, Q: Into<T>> Extend<Q> for Vocabulary<T> {
    fn extend<I: IntoIterator<Item = Q>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for Vocabulary<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut new = Self::default();
        new.extend(iter);
        new
    }
}

impl<T: Eq + Hash + Clone> From<Vec<T>> for Vocabulary<T> {
    fn from(value: Vec<T>) -> Self {
        Self::create_from(None, value)
    }
}

impl<T: Display> Display for Vocabulary<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let words = self.id2entry.iter().map(|w| w.to_string()).join(", ");
        match &self.language {
            Some(lang) => write!(f, "Vocabulary<{lang}>[{words}]"),
            None => write!(f, "Vocabulary[{words}]"),
        }
    }
}

impl<T> Vocabulary<T>
where
    T: Serialize + DeserializeOwned + Eq + Hash + Clone,
{
    pub fn save_json(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        persist::save_json(path, self)
    }

    pub fn save_binary(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        persist::save_binary(path, &VOCABULARY_MAGIC, self)
    }

    /// Saves picking the format by the file extension (`.json` vs binary).
    pub fn save(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        persist::save_by_extension(path, &VOCABULARY_MAGIC, self)
    }

    /// Loads either format, sniffing the magic.
    pub fn load(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        persist::load(path, &VOCABULARY_MAGIC)
    }
}

#[derive(Debug, Error)]
pub enum LoadVocabularyError<E: Debug> {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to parse a vocabulary line: {0:?}")]
    Parse(E),
}

impl<T: ToString> Vocabulary<T> {
    /// Writes the vocabulary in the list format, one word per line.
    pub fn save_to_output(&self, writer: &mut impl Write) -> std::io::Result<usize> {
        let mut written = 0;
        let mut writer = BufWriter::new(writer);
        for value in self.id2entry.iter() {
            written += writer.write(value.to_string().as_bytes())?;
            written += writer.write(b"\n")?;
        }
        writer.flush()?;
        Ok(written)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<usize> {
        let mut writer = File::options()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)?;
        self.save_to_output(&mut writer)
    }
}

impl<T, E> Vocabulary<T>
where
    T: Eq + Hash + Clone + FromStr<Err = E>,
    E: Debug,
{
    /// Loads a vocabulary from the list format.
    pub fn load_from_input(reader: &mut impl BufRead) -> Result<Self, LoadVocabularyError<E>> {
        let mut words = Vec::new();
        for line in reader.lines() {
            words.push(line?.parse().map_err(LoadVocabularyError::Parse)?);
        }
        Ok(Self::create_from(None, words))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LoadVocabularyError<E>> {
        Self::load_from_input(&mut BufReader::new(File::open(path)?))
    }
}

#[cfg(test)]
mod test {
    use super::{StringVocabulary, Vocabulary};

    #[test]
    fn can_insert_and_retrieve() {
        let mut voc = StringVocabulary::default();
        assert_eq!(0, voc.add("Hello World"));
        assert_eq!(1, voc.add("Wasimodo"));
        assert_eq!(0, voc.add("Hello World"));

        assert_eq!(2, voc.len());
        assert_eq!(Some(0), voc.word_to_id("Hello World"));
        assert_eq!(Some("Wasimodo"), voc.id_to_word(1).map(|x| x.as_str()));
        assert!(voc.contains("Wasimodo"));
        assert!(!voc.contains("kitten"));
    }

    #[test]
    fn ids_are_bijective() {
        let voc: Vocabulary<String> = voc!["a".to_string(), "b".to_string(), "c".to_string()];
        for id in voc.ids() {
            assert_eq!(Some(id), voc.word_to_id(voc.id_to_word(id).unwrap()));
        }
    }

    #[test]
    fn serde_round_trip() {
        let mut voc = StringVocabulary::empty_for("en");
        voc.add("plane");
        voc.add("wing");
        let json = serde_json::to_string(&voc).unwrap();
        let back: StringVocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(voc, back);
    }

    #[test]
    fn list_format_round_trip() {
        let voc: Vocabulary<String> = voc!["alpha".to_string(), "beta".to_string()];
        let mut buffer = Vec::new();
        voc.save_to_output(&mut buffer).unwrap();
        let back: Vocabulary<String> =
            Vocabulary::load_from_input(&mut std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(voc.as_slice(), back.as_slice());
    }

    #[test]
    fn binary_and_json_round_trip() {
        let mut voc = StringVocabulary::empty_for("en");
        voc.add("plane");
        voc.add("wing");
        let dir = std::env::temp_dir();

        let json_path = dir.join("crosstopic_voc_test.json");
        voc.save(&json_path).unwrap();
        assert_eq!(voc, StringVocabulary::load(&json_path).unwrap());

        let bin_path = dir.join("crosstopic_voc_test.voc");
        voc.save(&bin_path).unwrap();
        assert_eq!(voc, StringVocabulary::load(&bin_path).unwrap());

        std::fs::remove_file(json_path).unwrap();
        std::fs::remove_file(bin_path).unwrap();
    }

    #[test]
    fn filtering_reassigns_contiguous_ids() {
        let voc: Vocabulary<String> = voc!["a".to_string(), "b".to_string(), "c".to_string()];
        let filtered = voc.filter_by_value(|w: &String| w != "b");
        assert_eq!(2, filtered.len());
        assert_eq!(Some(1), filtered.word_to_id("c"));
    }
}
