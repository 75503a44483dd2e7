use std::borrow::Cow;

use charabia::normalizer::NormalizerOption;
use charabia::{Normalize, Script, Token};
use unicode_segmentation::{UWordBoundIndices, UnicodeSegmentation};

/// Segments on plain unicode word boundaries instead of charabia's
/// language-aware segmenters. Scripts are still detected so stemming and
/// downstream routing keep working.
pub(crate) struct UnicodeSegmenterIter<'o, 'tb> {
    inner: UWordBoundIndices<'o>,
    normalizer_option: &'tb NormalizerOption<'tb>,
    char_index: usize,
    byte_index: usize,
}

impl<'o, 'tb> UnicodeSegmenterIter<'o, 'tb> {
    pub(crate) fn new(original: &'o str, normalizer_option: &'tb NormalizerOption<'tb>) -> Self {
        Self {
            inner: original.split_word_bound_indices(),
            normalizer_option,
            char_index: 0,
            byte_index: 0,
        }
    }
}

impl<'o, 'tb> Iterator for UnicodeSegmenterIter<'o, 'tb> {
    type Item = (&'o str, Token<'o>);

    fn next(&mut self) -> Option<Self::Item> {
        let (_, text) = self.inner.next()?;
        let script = whatlang::detect_script(text)
            .map(Script::from)
            .unwrap_or_default();
        let char_start = self.char_index;
        let byte_start = self.byte_index;
        self.char_index += text.chars().count();
        self.byte_index += text.len();
        let token = Token {
            lemma: Cow::Borrowed(text),
            char_start,
            byte_start,
            char_end: self.char_index,
            byte_end: self.byte_index,
            script,
            language: None,
            ..Default::default()
        };
        Some((text, token.normalize(self.normalizer_option)))
    }
}
