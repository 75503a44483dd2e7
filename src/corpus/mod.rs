mod pipeline;

pub use pipeline::{
    read_aligned_articles, read_aligned_parsed_articles, read_and_parse_aligned_articles,
    read_and_parse_aligned_articles_into, read_packaged_articles, AlignedReader, StoreOptions,
    TokenCountFilter,
};

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::language_hint::LanguageHint;
use crate::tokenize::{Token, TokenizerBuilder};

/// One article in one language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    #[serde(alias = "ln")]
    lang: LanguageHint,
    #[serde(alias = "cat")]
    categories: Option<Vec<usize>>,
    #[serde(alias = "con")]
    content: String,
    #[serde(default, alias = "ilst")]
    is_list: bool,
}

impl Article {
    pub fn new(
        lang: impl Into<LanguageHint>,
        content: impl Into<String>,
        categories: Option<Vec<usize>>,
        is_list: bool,
    ) -> Self {
        Self {
            lang: lang.into(),
            categories,
            content: content.into(),
            is_list,
        }
    }

    pub fn lang(&self) -> &LanguageHint {
        &self.lang
    }

    pub fn categories(&self) -> Option<&Vec<usize>> {
        self.categories.as_ref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Display for Article {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let cat = match &self.categories {
            None => "#".to_string(),
            Some(value) => format!("[{}]", value.iter().join(", ")),
        };
        write!(f, "Article({}, {}, '{}', {})", self.lang, cat, self.content, self.is_list)
    }
}

/// The translations of one article into multiple languages, sharing an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlignedArticle<A> {
    #[serde(alias = "id")]
    article_id: u64,
    #[serde(alias = "art")]
    #[serde(bound(serialize = "A: Serialize", deserialize = "A: Deserialize<'de>"))]
    articles: HashMap<LanguageHint, A>,
}

impl<A> AlignedArticle<A> {
    pub fn new(article_id: u64, articles: HashMap<LanguageHint, A>) -> Self {
        Self {
            article_id,
            articles,
        }
    }

    pub fn article_id(&self) -> u64 {
        self.article_id
    }

    pub fn articles(&self) -> &HashMap<LanguageHint, A> {
        &self.articles
    }

    pub fn into_inner(self) -> (u64, HashMap<LanguageHint, A>) {
        (self.article_id, self.articles)
    }

    /// Lookup by hint or by anything a hint is built from; both are
    /// equivalent under hint normalization.
    pub fn get(&self, language: impl Into<LanguageHint>) -> Option<&A> {
        self.articles.get(&language.into())
    }

    pub fn language_hints(&self) -> Vec<&LanguageHint> {
        self.articles.keys().collect_vec()
    }
}

impl<A: Serialize + for<'de> Deserialize<'de>> AlignedArticle<A> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl<A: std::borrow::Borrow<Article>> AlignedArticle<A> {
    /// Builds an aligned article from a list; articles whose language is
    /// already taken are reported back as doublets.
    pub fn from_articles<I: IntoIterator<Item = A>>(
        article_id: u64,
        articles: I,
    ) -> std::result::Result<Self, (Self, Vec<A>)> {
        let iter = articles.into_iter();
        let (lower, upper) = iter.size_hint();
        let mut collected = HashMap::with_capacity(upper.unwrap_or(lower));
        let mut doublets = Vec::new();
        for article in iter {
            match collected.entry(article.borrow().lang.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(article);
                }
                Entry::Occupied(_) => doublets.push(article),
            }
        }
        let aligned = AlignedArticle::new(article_id, collected);
        if doublets.is_empty() {
            Ok(aligned)
        } else {
            Err((aligned, doublets))
        }
    }
}

impl<A: Display> Display for AlignedArticle<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let articles = self
            .articles
            .iter()
            .map(|(k, v)| format!("{k}: ({v})"))
            .join(", ");
        write!(f, "AlignedArticle{{{}, {}}}", self.article_id, articles)
    }
}

/// An article that went through the processor; languages without a
/// configured tokenizer pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TokenizedArticle {
    Tokenized(Article, Vec<(String, Token)>),
    #[serde(untagged)]
    NotTokenized(Article),
}

impl TokenizedArticle {
    pub fn article(&self) -> &Article {
        match self {
            TokenizedArticle::Tokenized(article, _) => article,
            TokenizedArticle::NotTokenized(article) => article,
        }
    }

    pub fn tokens(&self) -> Option<&Vec<(String, Token)>> {
        match self {
            TokenizedArticle::Tokenized(_, tokens) => Some(tokens),
            TokenizedArticle::NotTokenized(_) => None,
        }
    }

    /// The number of word tokens, or `None` when not tokenized.
    pub fn word_count(&self) -> Option<usize> {
        self.tokens()
            .map(|tokens| tokens.iter().filter(|(_, token)| token.is_word()).count())
    }
}

impl Display for TokenizedArticle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenizedArticle::NotTokenized(article) => Display::fmt(article, f),
            TokenizedArticle::Tokenized(article, tokens) => {
                write!(
                    f,
                    "Tokenized({article}, [{}])",
                    tokens
                        .iter()
                        .map(|(origin, token)| format!("(\"{origin}\" => {token})"))
                        .join(", ")
                )
            }
        }
    }
}

pub type TokenizedAlignedArticle = AlignedArticle<TokenizedArticle>;

/// Applies one tokenizer per language to aligned articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedArticleProcessor {
    builders: Arc<HashMap<LanguageHint, TokenizerBuilder>>,
}

impl AlignedArticleProcessor {
    pub fn new(builders: HashMap<LanguageHint, TokenizerBuilder>) -> Self {
        Self {
            builders: Arc::new(builders),
        }
    }

    pub fn contains_language(&self, language: impl Into<LanguageHint>) -> bool {
        self.builders.contains_key(&language.into())
    }

    pub(crate) fn builders(&self) -> &HashMap<LanguageHint, TokenizerBuilder> {
        &self.builders
    }

    /// Tokenizes every language of the article that has a configured builder.
    pub fn process(&self, value: AlignedArticle<Article>) -> TokenizedAlignedArticle {
        let (id, articles) = value.into_inner();
        let articles = articles
            .into_iter()
            .map(|(lang, article)| {
                let tokenized = match self.builders.get(&lang) {
                    Some(builder) => {
                        let tokenizer = builder.build();
                        let tokens = tokenizer
                            .process(article.content())
                            .into_iter()
                            .map(|(surface, token)| (surface.to_string(), token))
                            .collect_vec();
                        TokenizedArticle::Tokenized(article, tokens)
                    }
                    None => TokenizedArticle::NotTokenized(article),
                };
                (lang, tokenized)
            })
            .collect();
        AlignedArticle::new(id, articles)
    }

    /// Tokenizes a single string with the tokenizer of `language`.
    pub fn process_string(
        &self,
        language: impl Into<LanguageHint>,
        value: &str,
    ) -> Option<Vec<(String, Token)>> {
        let builder = self.builders.get(&language.into())?;
        let tokenizer = builder.build();
        Some(
            tokenizer
                .process(value)
                .into_iter()
                .map(|(surface, token)| (surface.to_string(), token))
                .collect(),
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::HashMap;

    use super::{AlignedArticle, AlignedArticleProcessor, Article, TokenizedArticle};
    use crate::language_hint::LanguageHint;
    use crate::tokenize::TokenizerBuilder;

    pub(crate) fn aligned(id: u64, en: &str, de: &str) -> AlignedArticle<Article> {
        AlignedArticle::from_articles(
            id,
            vec![
                Article::new("en", en, None, false),
                Article::new("de", de, None, false),
            ],
        )
        .unwrap()
    }

    pub(crate) fn en_de_processor() -> AlignedArticleProcessor {
        let mut builders = HashMap::new();
        builders.insert(LanguageHint::new("en"), TokenizerBuilder::new());
        builders.insert(LanguageHint::new("de"), TokenizerBuilder::new());
        AlignedArticleProcessor::new(builders)
    }

    #[test]
    fn lookup_is_normalization_equivalent() {
        let article = aligned(7, "hello world", "hallo welt");
        assert!(article.get("EN ").is_some());
        assert!(article.get(LanguageHint::new("de")).is_some());
        assert!(article.get("fr").is_none());
    }

    #[test]
    fn doublets_are_reported() {
        let result = AlignedArticle::from_articles(
            1,
            vec![
                Article::new("en", "one", None, false),
                Article::new("en", "two", None, false),
            ],
        );
        let (aligned, doublets) = result.unwrap_err();
        assert_eq!(1, aligned.articles().len());
        assert_eq!(1, doublets.len());
    }

    #[test]
    fn processor_tokenizes_known_languages_only() {
        let processor = en_de_processor();
        let article = AlignedArticle::from_articles(
            1,
            vec![
                Article::new("en", "hello world", None, false),
                Article::new("fr", "bonjour", None, false),
            ],
        )
        .unwrap();
        let processed = processor.process(article);
        assert!(matches!(
            processed.get("en").unwrap(),
            TokenizedArticle::Tokenized(_, _)
        ));
        assert!(matches!(
            processed.get("fr").unwrap(),
            TokenizedArticle::NotTokenized(_)
        ));
        assert_eq!(Some(2), processed.get("en").unwrap().word_count());
    }

    #[test]
    fn article_json_round_trip() {
        let article = Article::new("en", "hello", Some(vec![1, 2]), true);
        let back = Article::from_json(&article.to_json().unwrap()).unwrap();
        assert_eq!(article, back);
    }

    #[test]
    fn tokenized_aligned_article_json_round_trip() {
        let processor = en_de_processor();
        let processed = processor.process(aligned(3, "hello world", "hallo welt"));
        let json = processed.to_json().unwrap();
        let back: super::TokenizedAlignedArticle = serde_json::from_str(&json).unwrap();
        assert_eq!(processed, back);
    }

    #[test]
    fn process_string_requires_a_known_language() {
        let processor = en_de_processor();
        assert!(processor.process_string("en", "hello world").is_some());
        assert!(processor.process_string("ru", "привет").is_none());
    }
}
