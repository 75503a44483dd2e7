use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use charabia::{Language, Token};
use rust_stemmers::{Algorithm, Stemmer};

/// A snowball stemmer that can follow the detected token language, falling
/// back to a default algorithm.
#[derive(Clone)]
pub(crate) enum SmartStemmer {
    Simple(Arc<Stemmer>),
    Smart {
        default: Arc<Stemmer>,
        recognized: Arc<RwLock<HashMap<Language, Arc<Stemmer>>>>,
    },
}

impl SmartStemmer {
    pub(crate) fn new(default: Algorithm, smart: bool) -> Self {
        if smart {
            Self::Smart {
                default: Arc::new(Stemmer::create(default)),
                recognized: Default::default(),
            }
        } else {
            Self::Simple(Arc::new(Stemmer::create(default)))
        }
    }

    pub(crate) fn stem<'o>(&self, input: &'o str, language: Option<Language>) -> Cow<'o, str> {
        match self {
            Self::Simple(stemmer) => stemmer.stem(input),
            Self::Smart {
                default,
                recognized,
            } => {
                let Some(language) = language else {
                    return default.stem(input);
                };
                if let Some(stemmer) = recognized.read().unwrap().get(&language) {
                    return stemmer.stem(input);
                }
                let stemmer = match recognized.write().unwrap().entry(language) {
                    Entry::Occupied(entry) => entry.get().clone(),
                    Entry::Vacant(entry) => entry
                        .insert(match language_to_algorithm(language) {
                            Some(algorithm) => Arc::new(Stemmer::create(algorithm)),
                            None => default.clone(),
                        })
                        .clone(),
                };
                stemmer.stem(input)
            }
        }
    }
}

fn language_to_algorithm(language: Language) -> Option<Algorithm> {
    match language {
        Language::Ara => Some(Algorithm::Arabic),
        Language::Dan => Some(Algorithm::Danish),
        Language::Nld => Some(Algorithm::Dutch),
        Language::Eng => Some(Algorithm::English),
        Language::Fin => Some(Algorithm::Finnish),
        Language::Fra => Some(Algorithm::French),
        Language::Deu => Some(Algorithm::German),
        Language::Ell => Some(Algorithm::Greek),
        Language::Hun => Some(Algorithm::Hungarian),
        Language::Ita => Some(Algorithm::Italian),
        Language::Nob => Some(Algorithm::Norwegian),
        Language::Por => Some(Algorithm::Portuguese),
        Language::Ron => Some(Algorithm::Romanian),
        Language::Rus => Some(Algorithm::Russian),
        Language::Spa => Some(Algorithm::Spanish),
        Language::Swe => Some(Algorithm::Swedish),
        Language::Tam => Some(Algorithm::Tamil),
        Language::Tur => Some(Algorithm::Turkish),
        _ => None,
    }
}

/// Applies a stemmer to the lemma of every passing token.
pub(crate) struct StemmedIter<'o, 's, I> {
    tokens: I,
    stemmer: Option<&'s SmartStemmer>,
    _phantom: std::marker::PhantomData<&'o ()>,
}

impl<'o, 's, I> StemmedIter<'o, 's, I>
where
    I: Iterator<Item = (&'o str, Token<'o>)>,
{
    pub(crate) fn new(tokens: I, stemmer: Option<&'s SmartStemmer>) -> Self {
        Self {
            tokens,
            stemmer,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<'o, 's, I> Iterator for StemmedIter<'o, 's, I>
where
    I: Iterator<Item = (&'o str, Token<'o>)>,
{
    type Item = (&'o str, Token<'o>);

    fn next(&mut self) -> Option<Self::Item> {
        let (surface, mut token) = self.tokens.next()?;
        if let Some(stemmer) = self.stemmer {
            if token.is_word() {
                token.lemma = Cow::Owned(stemmer.stem(token.lemma.as_ref(), token.language).into_owned());
            }
        }
        Some((surface, token))
    }
}
