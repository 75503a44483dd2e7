mod phrases;
mod stemming;
mod unicode;

use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

use charabia::normalizer::{ClassifierOption, NormalizerOption};
use charabia::{Language as CLanguage, Script as CScript, SeparatorKind, TokenKind as CTokenKind, TokenizerBuilder as CTokenizerBuilder};
use fst::Set;
use serde::{Deserialize, Serialize};
use trie_rs::map::{Trie, TrieBuilder};

use crate::tokenize::phrases::PhraseJoiner;
use crate::tokenize::stemming::{SmartStemmer, StemmedIter};
use crate::tokenize::unicode::UnicodeSegmenterIter;
use crate::vocabulary::Vocabulary;

macro_rules! mirror_enum {
    ($(#[$meta:meta])* $name:ident for $target:ty { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, Eq, PartialEq, Hash,
            strum::EnumString, strum::IntoStaticStr, strum::Display,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $($variant,)+
        }

        impl From<$target> for $name {
            fn from(value: $target) -> Self {
                match value {
                    $(<$target>::$variant => Self::$variant,)+
                    #[allow(unreachable_patterns)]
                    _ => Self::Other,
                }
            }
        }

        impl From<$name> for $target {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(
    /// The unicode script class of a token, driving language detection.
    Script for CScript {
        Arabic, Armenian, Bengali, Cyrillic, Devanagari, Ethiopic, Georgian,
        Greek, Gujarati, Gurmukhi, Hangul, Hebrew, Kannada, Khmer, Latin,
        Malayalam, Myanmar, Oriya, Sinhala, Tamil, Telugu, Thai, Cj, Other
    }
);

mirror_enum!(
    /// The language detected for a token.
    Language for CLanguage {
        Epo, Eng, Rus, Cmn, Spa, Por, Ita, Ben, Fra, Deu, Ukr, Kat, Ara, Hin,
        Jpn, Heb, Yid, Pol, Amh, Jav, Kor, Nob, Dan, Swe, Fin, Tur, Nld, Hun,
        Ces, Ell, Bul, Bel, Mar, Kan, Ron, Slv, Hrv, Srp, Mkd, Lit, Lav, Est,
        Tam, Vie, Urd, Tha, Guj, Uzb, Pan, Aze, Ind, Tel, Pes, Mal, Ori, Mya,
        Nep, Sin, Khm, Tuk, Aka, Zul, Sna, Afr, Lat, Slk, Cat, Tgl, Hye, Other
    }
);

/// The snowball stemming algorithms.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash,
    strum::EnumString, strum::IntoStaticStr, strum::Display,
    Serialize, Deserialize,
)]
pub enum StemmingAlgorithm {
    Arabic,
    Danish,
    Dutch,
    English,
    Finnish,
    French,
    German,
    Greek,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tamil,
    Turkish,
}

impl From<StemmingAlgorithm> for rust_stemmers::Algorithm {
    fn from(value: StemmingAlgorithm) -> Self {
        use rust_stemmers::Algorithm::*;
        match value {
            StemmingAlgorithm::Arabic => Arabic,
            StemmingAlgorithm::Danish => Danish,
            StemmingAlgorithm::Dutch => Dutch,
            StemmingAlgorithm::English => English,
            StemmingAlgorithm::Finnish => Finnish,
            StemmingAlgorithm::French => French,
            StemmingAlgorithm::German => German,
            StemmingAlgorithm::Greek => Greek,
            StemmingAlgorithm::Hungarian => Hungarian,
            StemmingAlgorithm::Italian => Italian,
            StemmingAlgorithm::Norwegian => Norwegian,
            StemmingAlgorithm::Portuguese => Portuguese,
            StemmingAlgorithm::Romanian => Romanian,
            StemmingAlgorithm::Russian => Russian,
            StemmingAlgorithm::Spanish => Spanish,
            StemmingAlgorithm::Swedish => Swedish,
            StemmingAlgorithm::Tamil => Tamil,
            StemmingAlgorithm::Turkish => Turkish,
        }
    }
}

/// What a token is, after classification.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash,
    strum::EnumString, strum::IntoStaticStr, strum::Display,
    Serialize, Deserialize,
)]
pub enum TokenKind {
    Word,
    StopWord,
    SeparatorHard,
    SeparatorSoft,
    Unknown,
}

impl From<CTokenKind> for TokenKind {
    fn from(value: CTokenKind) -> Self {
        match value {
            CTokenKind::Word => TokenKind::Word,
            CTokenKind::StopWord => TokenKind::StopWord,
            CTokenKind::Separator(SeparatorKind::Hard) => TokenKind::SeparatorHard,
            CTokenKind::Separator(SeparatorKind::Soft) => TokenKind::SeparatorSoft,
            CTokenKind::Unknown => TokenKind::Unknown,
        }
    }
}

impl From<TokenKind> for CTokenKind {
    fn from(value: TokenKind) -> Self {
        match value {
            TokenKind::Word => CTokenKind::Word,
            TokenKind::StopWord => CTokenKind::StopWord,
            TokenKind::SeparatorHard => CTokenKind::Separator(SeparatorKind::Hard),
            TokenKind::SeparatorSoft => CTokenKind::Separator(SeparatorKind::Soft),
            TokenKind::Unknown => CTokenKind::Unknown,
        }
    }
}

/// One produced token with its spans into the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lemma: String,
    pub char_start: usize,
    pub char_end: usize,
    pub byte_start: usize,
    pub byte_end: usize,
    pub char_map: Option<Vec<(u8, u8)>>,
    pub script: Script,
    pub language: Option<Language>,
}

impl Token {
    pub fn byte_len(&self) -> usize {
        self.lemma.len()
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

impl<'a> From<charabia::Token<'a>> for Token {
    fn from(value: charabia::Token<'a>) -> Self {
        Self {
            kind: value.kind.into(),
            lemma: value.lemma.to_string(),
            char_start: value.char_start,
            char_end: value.char_end,
            byte_start: value.byte_start,
            byte_end: value.byte_end,
            char_map: value.char_map,
            script: value.script.into(),
            language: value.language.map(Into::into),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"({})", self.lemma, self.kind)
    }
}

/// An owned stop-word set that serializes as the raw fst bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "StopWordsSerde")]
#[serde(into = "StopWordsSerde")]
pub struct StopWords(Set<Vec<u8>>);

#[derive(Serialize, Deserialize)]
struct StopWordsSerde {
    inner: Vec<u8>,
}

impl StopWords {
    pub fn new(mut words: Vec<String>) -> Result<Self, fst::Error> {
        words.sort();
        words.dedup();
        Ok(Self(Set::from_iter(words)?))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    fn as_classifier_stopwords(&self) -> Set<&[u8]> {
        Set::new(self.0.as_fst().as_bytes()).expect("a valid fst stays valid when borrowed")
    }
}

impl AsRef<Set<Vec<u8>>> for StopWords {
    fn as_ref(&self) -> &Set<Vec<u8>> {
        &self.0
    }
}

impl TryFrom<StopWordsSerde> for StopWords {
    type Error = fst::Error;

    fn try_from(value: StopWordsSerde) -> Result<Self, Self::Error> {
        Ok(Self(Set::from(fst::raw::Fst::new(value.inner)?)))
    }
}

impl From<StopWords> for StopWordsSerde {
    fn from(value: StopWords) -> Self {
        Self {
            inner: value.0.into_fst().into_inner(),
        }
    }
}

/// Fluent, serializable tokenizer configuration. `build` borrows the
/// configuration; the produced [`Tokenizer`] stays valid as long as the
/// builder does.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TokenizerBuilder {
    unicode_segmentation: bool,
    stemmer: Option<(StemmingAlgorithm, bool)>,
    stop_words: Option<StopWords>,
    separators: Option<Vec<String>>,
    words_dict: Option<Vec<String>>,
    create_char_map: bool,
    #[serde(default = "default_lossy")]
    lossy_normalization: bool,
    allow_list: Option<HashMap<Script, Vec<Language>>>,
    phrase_vocabulary: Option<Vocabulary<String>>,
}

fn default_lossy() -> bool {
    true
}

impl Debug for TokenizerBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerBuilder")
            .field("unicode_segmentation", &self.unicode_segmentation)
            .field("stemmer", &self.stemmer)
            .field("separators", &self.separators)
            .field("words_dict", &self.words_dict)
            .field("create_char_map", &self.create_char_map)
            .field("lossy_normalization", &self.lossy_normalization)
            .field("allow_list", &self.allow_list)
            .field(
                "phrase_vocabulary",
                &self.phrase_vocabulary.as_ref().map(|voc| voc.len()),
            )
            .finish()
    }
}

impl TokenizerBuilder {
    pub fn new() -> Self {
        Self {
            lossy_normalization: true,
            ..Default::default()
        }
    }

    /// Disables language-based segmentation in favor of plain unicode
    /// word boundaries.
    pub fn unicode_segmentation(&mut self, unicode: bool) -> &mut Self {
        self.unicode_segmentation = unicode;
        self
    }

    /// Selects a snowball stemmer; with `smart` the detected per-token
    /// language picks the algorithm and this one is the fallback.
    pub fn stemmer(&mut self, algorithm: StemmingAlgorithm, smart: bool) -> &mut Self {
        self.stemmer = Some((algorithm, smart));
        self
    }

    pub fn stop_words(&mut self, stop_words: Vec<String>) -> Result<&mut Self, fst::Error> {
        self.stop_words = Some(StopWords::new(stop_words)?);
        Ok(self)
    }

    pub fn separators(&mut self, separators: Vec<String>) -> &mut Self {
        self.separators = Some(separators);
        self
    }

    /// Words consulted first during tokenization; matches override the
    /// default segmentation.
    pub fn words_dict(&mut self, words: Vec<String>) -> &mut Self {
        self.words_dict = Some(words);
        self
    }

    pub fn create_char_map(&mut self, create_char_map: bool) -> &mut Self {
        self.create_char_map = create_char_map;
        self
    }

    pub fn lossy_normalization(&mut self, lossy: bool) -> &mut Self {
        self.lossy_normalization = lossy;
        self
    }

    /// Constrains language detection per script.
    pub fn allow_list(&mut self, allow_list: HashMap<Script, Vec<Language>>) -> &mut Self {
        self.allow_list = Some(allow_list);
        self
    }

    /// Runs of tokens forming a phrase of `vocabulary` collapse into a single
    /// word token. Phrases are matched against the normalized (and stemmed)
    /// lemmas, so provide them in that form.
    pub fn phrase_vocabulary(&mut self, vocabulary: Vocabulary<String>) -> &mut Self {
        self.phrase_vocabulary = Some(vocabulary);
        self
    }

    /// The configured stop-word set, if any.
    pub fn create_stopword_filter(&self) -> Option<&StopWords> {
        self.stop_words.as_ref()
    }

    pub fn build(&self) -> Tokenizer<'_> {
        let trie = self.phrase_vocabulary.as_ref().map(|voc| {
            let mut builder = TrieBuilder::new();
            for (id, phrase) in voc.iter_entries() {
                builder.push(phrase.as_str(), id);
            }
            builder.build()
        });
        Tokenizer {
            config: self,
            trie,
            stemmer: self
                .stemmer
                .map(|(algorithm, smart)| SmartStemmer::new(algorithm.into(), smart)),
        }
    }
}

/// A built tokenizer. Produces `(surface, Token)` pairs covering the input;
/// spans point into the original text, lemmas are normalized and stemmed.
pub struct Tokenizer<'t> {
    config: &'t TokenizerBuilder,
    trie: Option<Trie<u8, usize>>,
    stemmer: Option<SmartStemmer>,
}

impl<'t> Tokenizer<'t> {
    pub fn process<'o>(&self, text: &'o str) -> Vec<(&'o str, Token)> {
        let separator_refs: Option<Vec<&str>> = self
            .config
            .separators
            .as_ref()
            .map(|seps| seps.iter().map(String::as_str).collect());
        let words_refs: Option<Vec<&str>> = self
            .config
            .words_dict
            .as_ref()
            .map(|words| words.iter().map(String::as_str).collect());
        let allow_list: Option<HashMap<CScript, Vec<CLanguage>>> =
            self.config.allow_list.as_ref().map(|allow| {
                allow
                    .iter()
                    .map(|(script, languages)| {
                        (
                            (*script).into(),
                            languages.iter().map(|lang| (*lang).into()).collect(),
                        )
                    })
                    .collect()
            });

        let trie = self.trie.as_ref();

        if self.config.unicode_segmentation {
            let normalizer_option = NormalizerOption {
                create_char_map: self.config.create_char_map,
                lossy: self.config.lossy_normalization,
                classifier: ClassifierOption {
                    stop_words: self.config.stop_words.as_ref().map(|sw| sw.as_classifier_stopwords()),
                    separators: separator_refs.as_deref(),
                },
            };
            let segmented = UnicodeSegmenterIter::new(text, &normalizer_option);
            let stemmed = StemmedIter::new(segmented, self.stemmer.as_ref());
            PhraseJoiner::new(trie, stemmed, text)
                .map(|(surface, token)| (surface, Token::from(token)))
                .collect()
        } else {
            let mut builder = CTokenizerBuilder::new();
            if let Some(stop_words) = self.config.stop_words.as_ref() {
                builder.stop_words(stop_words.as_ref());
            }
            if let Some(separators) = separator_refs.as_deref() {
                builder.separators(separators);
            }
            if let Some(words) = words_refs.as_deref() {
                builder.words_dict(words);
            }
            builder.create_char_map(self.config.create_char_map);
            builder.lossy_normalization(self.config.lossy_normalization);
            if let Some(allow_list) = allow_list.as_ref() {
                builder.allow_list(allow_list);
            }
            let tokenizer = builder.into_tokenizer();
            let stemmed = StemmedIter::new(tokenizer.reconstruct(text), self.stemmer.as_ref());
            PhraseJoiner::new(trie, stemmed, text)
                .map(|(surface, token)| (surface, Token::from(token)))
                .collect()
        }
    }

    /// The number of word tokens `text` produces.
    pub fn count_words(&self, text: &str) -> usize {
        self.process(text)
            .iter()
            .filter(|(_, token)| token.is_word())
            .count()
    }
}

#[cfg(test)]
mod test {
    use super::{StemmingAlgorithm, TokenKind, TokenizerBuilder};
    use crate::voc;

    #[test]
    fn can_stem_words() {
        let mut builder = TokenizerBuilder::new();
        builder.stemmer(StemmingAlgorithm::German, false);
        let tokenizer = builder.build();
        let tokens = tokenizer.process("Hallo Welt was tue ich hier? Skiing Umgebung");
        let lemmas: Vec<&str> = tokens
            .iter()
            .filter(|(_, t)| t.is_word())
            .map(|(_, t)| t.lemma.as_str())
            .collect();
        assert!(lemmas.contains(&"umgebung"));
        assert!(!lemmas.is_empty());
    }

    #[test]
    fn stop_words_are_reclassified() {
        let mut builder = TokenizerBuilder::new();
        builder.stop_words(vec!["the".to_string()]).unwrap();
        let tokenizer = builder.build();
        let tokens = tokenizer.process("the cat");
        let the = tokens.iter().find(|(surface, _)| *surface == "the").unwrap();
        assert_eq!(TokenKind::StopWord, the.1.kind);
        assert_eq!(2, tokenizer.count_words("the cat sat"));
    }

    #[test]
    fn phrases_collapse_into_one_token() {
        let phrases = voc!["a b".to_string(), "a c".to_string(), "c e".to_string(), "d e".to_string()];
        let mut builder = TokenizerBuilder::new();
        builder.phrase_vocabulary(phrases);
        let tokenizer = builder.build();

        let tokens = tokenizer.process("a b c d e");
        let words: Vec<&str> = tokens
            .iter()
            .filter(|(_, t)| t.is_word())
            .map(|(_, t)| t.lemma.as_str())
            .collect();
        assert!(words.contains(&"a b"));
        assert!(words.contains(&"d e"));
        assert!(words.contains(&"c"));
    }

    #[test]
    fn spans_point_into_the_original_text() {
        let tokenizer_builder = TokenizerBuilder::new();
        let tokenizer = tokenizer_builder.build();
        let text = "plane wing";
        for (surface, token) in tokenizer.process(text) {
            assert_eq!(surface, &text[token.byte_start..token.byte_end]);
        }
    }

    #[test]
    fn unicode_segmentation_mode_still_tokenizes() {
        let mut builder = TokenizerBuilder::new();
        builder.unicode_segmentation(true);
        let tokenizer = builder.build();
        assert!(tokenizer.count_words("alpha beta gamma") >= 3);
    }

    #[test]
    fn builder_round_trips_through_json() {
        let mut builder = TokenizerBuilder::new();
        builder
            .stemmer(StemmingAlgorithm::English, true)
            .separators(vec![" ".to_string()])
            .create_char_map(true);
        builder.stop_words(vec!["the".to_string()]).unwrap();
        let json = serde_json::to_string(&builder).unwrap();
        let back: TokenizerBuilder = serde_json::from_str(&json).unwrap();
        assert_eq!(
            format!("{builder:?}"),
            format!("{back:?}")
        );
    }
}
