pub mod direction;
pub mod metadata;

use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dictionary::direction::{
    Direction, DirectionKind, DirectionTuple, Language, LanguageKind, Translation, A, B,
};
use crate::dictionary::metadata::{DictionaryEntry, MetadataContainer, SolvedMetadata};
use crate::error::Result;
use crate::language_hint::LanguageHint;
use crate::persist;
use crate::vocabulary::Vocabulary;

pub(crate) const DICTIONARY_MAGIC: [u8; 4] = *b"XTDC";

#[macro_export]
macro_rules! dict {
    () => {
        $crate::dictionary::Dictionary::default()
    };
    ($($a: literal : $b: literal),+ $(,)?) => {
        {
            let mut __dict = $crate::dictionary::Dictionary::default();
            $(
                __dict.add_word_pair($a, $b);
            )+
            __dict
        }
    };
}

/// Read access shared by [`Dictionary`] and its switched view.
pub trait BilingualDictionary<T>: Send + Sync {
    fn voc_a(&self) -> &Vocabulary<T>;

    fn voc_b(&self) -> &Vocabulary<T>;

    fn map_a_to_b(&self) -> &[Vec<usize>];

    fn map_b_to_a(&self) -> &[Vec<usize>];

    fn metadata_for(&self, side: LanguageKind, word_id: usize) -> Option<SolvedMetadata>;

    fn translate_id_to_ids<D: Translation>(&self, word_id: usize) -> Option<&Vec<usize>> {
        if D::A2B {
            self.map_a_to_b().get(word_id)
        } else {
            self.map_b_to_a().get(word_id)
        }
    }

    fn id_to_word<L: Language>(&self, id: usize) -> Option<&T> {
        match L::KIND {
            LanguageKind::A => self.voc_a().id_to_word(id),
            LanguageKind::B => self.voc_b().id_to_word(id),
        }
    }

    fn can_translate_id<D: Translation>(&self, id: usize) -> bool {
        self.translate_id_to_ids::<D>(id)
            .is_some_and(|found| !found.is_empty())
    }

    /// The number of distinct edges in this dictionary.
    fn edge_count(&self) -> usize {
        DictionaryEdgeIter::new(self.map_a_to_b(), self.map_b_to_a()).count()
    }

    fn language_direction<'a>(&'a self) -> (Option<&'a LanguageHint>, Option<&'a LanguageHint>)
    where
        T: 'a,
    {
        (self.voc_a().language(), self.voc_b().language())
    }
}

impl<T> BilingualDictionary<T> for Dictionary<T>
where
    T: Send + Sync,
{
    fn voc_a(&self) -> &Vocabulary<T> {
        &self.voc_a
    }

    fn voc_b(&self) -> &Vocabulary<T> {
        &self.voc_b
    }

    fn map_a_to_b(&self) -> &[Vec<usize>] {
        &self.map_a_to_b
    }

    fn map_b_to_a(&self) -> &[Vec<usize>] {
        &self.map_b_to_a
    }

    fn metadata_for(&self, side: LanguageKind, word_id: usize) -> Option<SolvedMetadata> {
        self.metadata.solve(side, word_id)
    }
}

/// A bilingual dictionary over two vocabularies with per-word metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de> + Eq + Hash + Clone"
))]
pub struct Dictionary<T> {
    voc_a: Vocabulary<T>,
    voc_b: Vocabulary<T>,
    map_a_to_b: Vec<Vec<usize>>,
    map_b_to_a: Vec<Vec<usize>>,
    metadata: MetadataContainer,
}

impl<T> Dictionary<T> {
    pub fn new(language_a: Option<LanguageHint>, language_b: Option<LanguageHint>) -> Self {
        Self {
            voc_a: Vocabulary::empty(language_a),
            voc_b: Vocabulary::empty(language_b),
            map_a_to_b: Vec::new(),
            map_b_to_a: Vec::new(),
            metadata: MetadataContainer::default(),
        }
    }

    pub fn from_voc(voc_a: Vocabulary<T>, voc_b: Vocabulary<T>) -> Self {
        let mut map_a_to_b = Vec::new();
        map_a_to_b.resize_with(voc_a.len(), || Vec::with_capacity(1));
        let mut map_b_to_a = Vec::new();
        map_b_to_a.resize_with(voc_b.len(), || Vec::with_capacity(1));
        Self {
            voc_a,
            voc_b,
            map_a_to_b,
            map_b_to_a,
            metadata: MetadataContainer::default(),
        }
    }

    pub fn from_voc_a(voc_a: Vocabulary<T>, language_b: Option<LanguageHint>) -> Self {
        let mut map_a_to_b = Vec::new();
        map_a_to_b.resize_with(voc_a.len(), || Vec::with_capacity(1));
        Self {
            voc_a,
            voc_b: Vocabulary::empty(language_b),
            map_a_to_b,
            map_b_to_a: Vec::new(),
            metadata: MetadataContainer::default(),
        }
    }

    pub fn metadata(&self) -> &MetadataContainer {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataContainer {
        &mut self.metadata
    }

    pub fn known_dictionaries(&self) -> Vec<&String> {
        self.metadata.known_dictionaries()
    }

    pub fn tags(&self) -> Vec<&String> {
        self.metadata.all_tags()
    }

    /// A view of this dictionary with the roles of A and B swapped. The word
    /// storage is shared, nothing is copied.
    pub fn switch_a_to_b(&self) -> SwitchedDictionary<'_, T> {
        SwitchedDictionary { inner: self }
    }
}

impl<T> Default for Dictionary<T> {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl<T: Eq + Hash + Clone> Dictionary<T> {
    fn push_edge(map: &mut Vec<Vec<usize>>, from: usize, to: usize) -> bool {
        while map.len() <= from {
            map.push(Vec::with_capacity(1));
        }
        let edges = &mut map[from];
        if edges.contains(&to) {
            false
        } else {
            edges.push(to);
            true
        }
    }

    /// Inserts a word pair along the direction `D` and returns the ids with
    /// the direction that was actually touched.
    pub fn insert<D: Direction>(
        &mut self,
        word_a: impl Into<T>,
        word_b: impl Into<T>,
    ) -> DirectionTuple<usize, usize> {
        let id_a = self.voc_a.add(word_a.into());
        let id_b = self.voc_b.add(word_b.into());
        if D::A2B {
            Self::push_edge(&mut self.map_a_to_b, id_a, id_b);
            if !D::B2A {
                return DirectionTuple::a_to_b(id_a, id_b);
            }
        }
        if D::B2A {
            Self::push_edge(&mut self.map_b_to_a, id_b, id_a);
            if !D::A2B {
                return DirectionTuple::b_to_a(id_a, id_b);
            }
        }
        DirectionTuple::invariant(id_a, id_b)
    }

    /// Inserts both edges for the pair and classifies the insertion relative
    /// to the pre-existing state: a pair with a fresh B endpoint (or two fresh
    /// endpoints) reports `AToB`, a fresh A endpoint reports `BToA`, anything
    /// else reports `Invariant`.
    pub fn add_word_pair(
        &mut self,
        word_a: impl Into<T>,
        word_b: impl Into<T>,
    ) -> DirectionTuple<usize, usize> {
        let word_a = word_a.into();
        let word_b = word_b.into();
        let a_existed = self.voc_a.contains(&word_a);
        let b_existed = self.voc_b.contains(&word_b);
        let id_a = self.voc_a.add(word_a);
        let id_b = self.voc_b.add(word_b);
        Self::push_edge(&mut self.map_a_to_b, id_a, id_b);
        Self::push_edge(&mut self.map_b_to_a, id_b, id_a);
        let direction = if !b_existed {
            DirectionKind::AToB
        } else if !a_existed {
            DirectionKind::BToA
        } else {
            DirectionKind::Invariant
        };
        DirectionTuple::new(id_a, id_b, direction)
    }

    /// Inserts an entry with metadata; metadata merges by set-union.
    pub fn add(&mut self, entry: DictionaryEntry) -> DirectionTuple<usize, usize>
    where
        T: From<String>,
    {
        let result = self.add_word_pair(T::from(entry.word_a.clone()), T::from(entry.word_b.clone()));
        if entry.has_metadata_a() {
            self.metadata
                .add_dictionaries(LanguageKind::A, result.a, entry.dictionary_a.clone());
            self.metadata
                .add_meta_tags(LanguageKind::A, result.a, entry.meta_a.clone());
            for (surface, tags) in entry.unstemmed_a.iter() {
                self.metadata
                    .add_unstemmed(LanguageKind::A, result.a, surface.clone(), tags.clone());
            }
        }
        if entry.has_metadata_b() {
            self.metadata
                .add_dictionaries(LanguageKind::B, result.b, entry.dictionary_b.clone());
            self.metadata
                .add_meta_tags(LanguageKind::B, result.b, entry.meta_b.clone());
            for (surface, tags) in entry.unstemmed_b.iter() {
                self.metadata
                    .add_unstemmed(LanguageKind::B, result.b, surface.clone(), tags.clone());
            }
        }
        result
    }

    pub fn word_to_id<D: Translation, Q: ?Sized>(&self, word: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        if D::A2B {
            self.voc_a.word_to_id(word)
        } else {
            self.voc_b.word_to_id(word)
        }
    }

    pub fn translate_value_to_ids<D: Translation, Q: ?Sized>(&self, word: &Q) -> Option<&Vec<usize>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
        T: Send + Sync,
    {
        let id = self.word_to_id::<D, _>(word)?;
        self.translate_id_to_ids::<D>(id)
    }

    /// The translations of `word` from A to B, or `None` when the word is
    /// unknown or has no outgoing edge.
    pub fn get_translation_a_to_b<Q: ?Sized>(&self, word: &Q) -> Option<Vec<&T>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
        T: Send + Sync,
    {
        let ids = self.translate_value_to_ids::<A, _>(word)?;
        if ids.is_empty() {
            return None;
        }
        Some(ids.iter().map(|id| self.voc_b.id_to_word(*id).unwrap()).collect())
    }

    /// The translations of `word` from B to A.
    pub fn get_translation_b_to_a<Q: ?Sized>(&self, word: &Q) -> Option<Vec<&T>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
        T: Send + Sync,
    {
        let ids = self.translate_value_to_ids::<B, _>(word)?;
        if ids.is_empty() {
            return None;
        }
        Some(ids.iter().map(|id| self.voc_a.id_to_word(*id).unwrap()).collect())
    }

    pub fn voc_a_contains<Q: ?Sized>(&self, word: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.voc_a.contains(word)
    }

    pub fn voc_b_contains<Q: ?Sized>(&self, word: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.voc_b.contains(word)
    }

    pub fn contains<Q: ?Sized>(&self, word: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.voc_a_contains(word) || self.voc_b_contains(word)
    }

    pub fn get_meta_a_of<Q: ?Sized>(&self, word: &Q) -> Option<SolvedMetadata>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.metadata
            .solve(LanguageKind::A, self.voc_a.word_to_id(word)?)
    }

    pub fn get_meta_b_of<Q: ?Sized>(&self, word: &Q) -> Option<SolvedMetadata>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.metadata
            .solve(LanguageKind::B, self.voc_b.word_to_id(word)?)
    }

    /// Iterates every edge exactly once: `((id_a, word_a, meta_a), (id_b,
    /// word_b, meta_b), direction)`.
    pub fn iter(&self) -> impl Iterator<Item = DictionaryEdge<'_, T>>
    where
        T: Send + Sync,
    {
        DictionaryEdgeIter::new(&self.map_a_to_b, &self.map_b_to_a).map(move |tuple| {
            DictionaryEdge {
                a: (
                    tuple.a,
                    self.voc_a.id_to_word(tuple.a).unwrap(),
                    self.metadata.solve(LanguageKind::A, tuple.a),
                ),
                b: (
                    tuple.b,
                    self.voc_b.id_to_word(tuple.b).unwrap(),
                    self.metadata.solve(LanguageKind::B, tuple.b),
                ),
                direction: tuple.direction,
            }
        })
    }

    /// Retains the edges whose endpoints both satisfy the respective
    /// predicate, given the word and its resolved metadata.
    pub fn filter<Fa, Fb>(&self, filter_a: Fa, filter_b: Fb) -> Self
    where
        Fa: Fn(&T, Option<&SolvedMetadata>) -> bool,
        Fb: Fn(&T, Option<&SolvedMetadata>) -> bool,
        T: Send + Sync,
    {
        let mut new = Self {
            voc_a: Vocabulary::empty(self.voc_a.language().cloned()),
            voc_b: Vocabulary::empty(self.voc_b.language().cloned()),
            map_a_to_b: Vec::new(),
            map_b_to_a: Vec::new(),
            metadata: self.metadata.copy_keep_interners(),
        };
        for edge in self.iter() {
            let (id_a, word_a, meta_a) = edge.a;
            let (id_b, word_b, meta_b) = edge.b;
            if !filter_a(word_a, meta_a.as_ref()) || !filter_b(word_b, meta_b.as_ref()) {
                continue;
            }
            let inserted = match edge.direction {
                DirectionKind::AToB => new.insert::<direction::AToB>(word_a.clone(), word_b.clone()),
                DirectionKind::BToA => new.insert::<direction::BToA>(word_a.clone(), word_b.clone()),
                DirectionKind::Invariant => {
                    new.insert::<direction::Invariant>(word_a.clone(), word_b.clone())
                }
            };
            if let Some(meta) = self.metadata.get(LanguageKind::A, id_a) {
                new.metadata.merge_raw(LanguageKind::A, inserted.a, meta);
            }
            if let Some(meta) = self.metadata.get(LanguageKind::B, id_b) {
                new.metadata.merge_raw(LanguageKind::B, inserted.b, meta);
            }
        }
        new
    }

    /// Retains the edges whose endpoint ids pass the side filters.
    pub fn filter_by_ids<Fa, Fb>(&self, filter_a: Fa, filter_b: Fb) -> Self
    where
        Fa: Fn(usize) -> bool,
        Fb: Fn(usize) -> bool,
        T: Send + Sync,
    {
        let ids_a: Vec<bool> = self.voc_a.ids().map(&filter_a).collect();
        let ids_b: Vec<bool> = self.voc_b.ids().map(&filter_b).collect();
        let voc_a = &self.voc_a;
        let voc_b = &self.voc_b;
        self.filter(
            |word, _| ids_a[voc_a.word_to_id(word).unwrap()],
            |word, _| ids_b[voc_b.word_to_id(word).unwrap()],
        )
    }

    pub fn filter_by_values<Fa, Fb>(&self, filter_a: Fa, filter_b: Fb) -> Self
    where
        Fa: Fn(&T) -> bool,
        Fb: Fn(&T) -> bool,
        T: Send + Sync,
    {
        self.filter(|word, _| filter_a(word), |word, _| filter_b(word))
    }
}

impl<T> Dictionary<T>
where
    T: Serialize + DeserializeOwned + Eq + Hash + Clone + Send + Sync,
{
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save_json(path, self)
    }

    pub fn save_binary(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save_binary(path, &DICTIONARY_MAGIC, self)
    }

    /// Saves picking the format by the file extension (`.json` vs binary).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save_by_extension(path, &DICTIONARY_MAGIC, self)
    }

    /// Loads either format, sniffing the magic.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        persist::load(path, &DICTIONARY_MAGIC)
    }
}

/// One resolved dictionary edge.
#[derive(Debug)]
pub struct DictionaryEdge<'a, T> {
    pub a: (usize, &'a T, Option<SolvedMetadata>),
    pub b: (usize, &'a T, Option<SolvedMetadata>),
    pub direction: DirectionKind,
}

/// Iterates all id edges exactly once; invariant edges are yielded while
/// walking the a-to-b map, pure b-to-a edges afterwards.
struct DictionaryEdgeIter<'a> {
    map_a_to_b: &'a [Vec<usize>],
    map_b_to_a: &'a [Vec<usize>],
    phase_a: bool,
    outer: usize,
    inner: usize,
}

impl<'a> DictionaryEdgeIter<'a> {
    fn new(map_a_to_b: &'a [Vec<usize>], map_b_to_a: &'a [Vec<usize>]) -> Self {
        Self {
            map_a_to_b,
            map_b_to_a,
            phase_a: true,
            outer: 0,
            inner: 0,
        }
    }
}

impl<'a> Iterator for DictionaryEdgeIter<'a> {
    type Item = DirectionTuple<usize, usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.phase_a {
            match self.map_a_to_b.get(self.outer) {
                None => {
                    self.phase_a = false;
                    self.outer = 0;
                    self.inner = 0;
                }
                Some(edges) => match edges.get(self.inner) {
                    None => {
                        self.outer += 1;
                        self.inner = 0;
                    }
                    Some(&b) => {
                        let a = self.outer;
                        self.inner += 1;
                        let invariant = self
                            .map_b_to_a
                            .get(b)
                            .is_some_and(|back| back.contains(&a));
                        return Some(if invariant {
                            DirectionTuple::invariant(a, b)
                        } else {
                            DirectionTuple::a_to_b(a, b)
                        });
                    }
                },
            }
        }
        loop {
            let edges = self.map_b_to_a.get(self.outer)?;
            match edges.get(self.inner) {
                None => {
                    self.outer += 1;
                    self.inner = 0;
                }
                Some(&a) => {
                    let b = self.outer;
                    self.inner += 1;
                    let already_seen = self
                        .map_a_to_b
                        .get(a)
                        .is_some_and(|forward| forward.contains(&b));
                    if !already_seen {
                        return Some(DirectionTuple::b_to_a(a, b));
                    }
                }
            }
        }
    }
}

/// A swapped view over a dictionary: A plays B and vice versa. Lookups and
/// metadata resolve against the shared storage of the wrapped dictionary.
#[derive(Debug, Copy, Clone)]
pub struct SwitchedDictionary<'a, T> {
    inner: &'a Dictionary<T>,
}

impl<'a, T: Send + Sync> BilingualDictionary<T> for SwitchedDictionary<'a, T> {
    fn voc_a(&self) -> &Vocabulary<T> {
        &self.inner.voc_b
    }

    fn voc_b(&self) -> &Vocabulary<T> {
        &self.inner.voc_a
    }

    fn map_a_to_b(&self) -> &[Vec<usize>] {
        &self.inner.map_b_to_a
    }

    fn map_b_to_a(&self) -> &[Vec<usize>] {
        &self.inner.map_a_to_b
    }

    fn metadata_for(&self, side: LanguageKind, word_id: usize) -> Option<SolvedMetadata> {
        let swapped = match side {
            LanguageKind::A => LanguageKind::B,
            LanguageKind::B => LanguageKind::A,
        };
        self.inner.metadata.solve(swapped, word_id)
    }
}

impl<T: Eq> PartialEq for Dictionary<T> {
    fn eq(&self, other: &Self) -> bool {
        self.voc_a == other.voc_a
            && self.voc_b == other.voc_b
            && self.map_a_to_b == other.map_a_to_b
            && self.map_b_to_a == other.map_b_to_a
            && self.metadata == other.metadata
    }
}

impl<T: Eq> Eq for Dictionary<T> {}

impl<T: Display + Send + Sync + Eq + Hash + Clone> Display for Dictionary<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dictionary(A={:?}, B={:?}):", self.voc_a.language(), self.voc_b.language())?;
        for (id_a, word_a) in self.voc_a.iter_entries() {
            write!(f, "  {word_a}({id_a}):")?;
            match self.map_a_to_b.get(id_a) {
                Some(targets) if !targets.is_empty() => {
                    for id_b in targets {
                        write!(f, " {}({id_b})", self.voc_b.id_to_word(*id_b).unwrap())?;
                    }
                }
                _ => write!(f, " -")?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::direction::{DirectionKind, Invariant};
    use super::metadata::DictionaryEntry;
    use super::{BilingualDictionary, Dictionary};

    #[test]
    fn symmetric_insertion() {
        let mut dict: Dictionary<String> = Dictionary::default();
        dict.add_word_pair("cat", "chat");
        assert_eq!(
            Some(vec![&"chat".to_string()]),
            dict.get_translation_a_to_b("cat")
        );
        assert_eq!(
            Some(vec![&"cat".to_string()]),
            dict.get_translation_b_to_a("chat")
        );
    }

    #[test]
    fn direction_classification() {
        let mut dict: Dictionary<String> = Dictionary::default();
        // both new
        assert_eq!(DirectionKind::AToB, dict.add_word_pair("cat", "chat").direction);
        // only b new
        assert_eq!(DirectionKind::AToB, dict.add_word_pair("cat", "matou").direction);
        // only a new
        assert_eq!(DirectionKind::BToA, dict.add_word_pair("kitty", "chat").direction);
        // both known, edge new
        assert_eq!(
            DirectionKind::Invariant,
            dict.add_word_pair("kitty", "matou").direction
        );
        // both edges known
        assert_eq!(DirectionKind::Invariant, dict.add_word_pair("cat", "chat").direction);
    }

    #[test]
    fn metadata_accumulates_over_repeated_adds() {
        let mut dict: Dictionary<String> = Dictionary::default();
        dict.add(DictionaryEntry::new("cat", "chat").dictionary_a("dictcc"));
        dict.add(DictionaryEntry::new("cat", "chat").dictionary_a("wiki").meta_b("noun"));

        let meta_a = dict.get_meta_a_of("cat").unwrap();
        assert_eq!(vec!["dictcc", "wiki"], meta_a.associated_dictionaries);
        let meta_b = dict.get_meta_b_of("chat").unwrap();
        assert_eq!(vec!["noun"], meta_b.meta_tags);
    }

    #[test]
    fn iter_yields_each_edge_once() {
        let mut dict: Dictionary<String> = Dictionary::default();
        dict.add_word_pair("cat", "chat");
        dict.add_word_pair("cat", "matou");
        dict.insert::<Invariant>("dog", "chien");
        let edges: Vec<_> = dict.iter().collect();
        assert_eq!(3, edges.len());
        assert!(edges.iter().all(|e| e.direction == DirectionKind::Invariant));
    }

    #[test]
    fn filter_keeps_matching_edges_and_metadata() {
        let mut dict: Dictionary<String> = Dictionary::default();
        dict.add(DictionaryEntry::new("cat", "chat").meta_a("keep"));
        dict.add_word_pair("dog", "chien");

        let filtered = dict.filter(|w, _| w == "cat", |_, _| true);
        assert!(filtered.voc_a_contains("cat"));
        assert!(!filtered.voc_a_contains("dog"));
        assert_eq!(vec!["keep"], filtered.get_meta_a_of("cat").unwrap().meta_tags);
    }

    #[test]
    fn switched_view_swaps_roles_without_copying() {
        let mut dict: Dictionary<String> = Dictionary::default();
        dict.add_word_pair("cat", "chat");
        let switched = dict.switch_a_to_b();
        assert_eq!(
            Some(&"chat".to_string()),
            switched.voc_a().id_to_word(0)
        );
        assert_eq!(
            Some(&vec![0usize]),
            switched.translate_id_to_ids::<super::direction::AToB>(0)
        );
    }

    #[test]
    fn dict_macro_builds_pairs() {
        let dict: Dictionary<String> = dict! {
            "big": "grand",
            "big": "gros",
        };
        assert_eq!(2, dict.get_translation_a_to_b("big").unwrap().len());
    }
}
