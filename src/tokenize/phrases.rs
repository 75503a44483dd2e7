use std::borrow::Cow;
use std::collections::VecDeque;

use charabia::{Token, TokenKind};
use trie_rs::inc_search::Answer;
use trie_rs::map::Trie;

/// Merges a phrase run into one word token spanning from the first to the
/// last member.
fn merge_tokens<'o>(lemma: String, first: &Token<'o>, last: &Token<'o>, members: &[Token<'o>]) -> Token<'o> {
    let mut char_map: Option<Vec<(u8, u8)>> = None;
    for member in members {
        if let Some(map) = member.char_map.as_ref() {
            char_map.get_or_insert_with(Vec::new).extend(map.iter().copied());
        }
    }
    Token {
        kind: TokenKind::Word,
        lemma: Cow::Owned(lemma),
        language: members.iter().find_map(|member| member.language),
        script: first.script,
        char_map,
        byte_start: first.byte_start,
        byte_end: last.byte_end,
        char_start: first.char_start,
        char_end: last.char_end,
    }
}

/// Collapses runs of word tokens whose space-joined lemmas form a phrase of
/// the trie into a single word token. The longest registered phrase wins;
/// separators between the words are absorbed into the merged span. Without a
/// trie the tokens pass through unchanged.
pub(crate) struct PhraseJoiner<'o, 't, I> {
    original: &'o str,
    queue: VecDeque<(&'o str, Token<'o>)>,
    tokens: I,
    trie: Option<&'t Trie<u8, usize>>,
}

impl<'o, 't, I> PhraseJoiner<'o, 't, I>
where
    I: Iterator<Item = (&'o str, Token<'o>)>,
{
    pub(crate) fn new(trie: Option<&'t Trie<u8, usize>>, tokens: I, original: &'o str) -> Self {
        Self {
            original,
            queue: VecDeque::new(),
            tokens,
            trie,
        }
    }
}

impl<'o, 't, I> Iterator for PhraseJoiner<'o, 't, I>
where
    I: Iterator<Item = (&'o str, Token<'o>)>,
{
    type Item = (&'o str, Token<'o>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(front) = self.queue.pop_front() {
            return Some(front);
        }
        let current = self.tokens.next()?;
        let Some(trie) = self.trie else {
            return Some(current);
        };
        if !current.1.is_word() {
            return Some(current);
        }

        let mut searcher = trie.inc_search();
        match searcher.query_until(current.1.lemma.as_bytes()) {
            Err(_) | Ok(Answer::Match) => return Some(current),
            Ok(_) => {}
        }

        // speculative scan: consumed tokens are replayed when no phrase ends
        let mut consumed: Vec<(&'o str, Token<'o>)> = Vec::new();
        let mut best: Option<usize> = None;
        'scan: while let Some(next) = self.tokens.next() {
            let is_word = next.1.is_word();
            consumed.push(next);
            if !is_word {
                continue;
            }
            if !matches!(searcher.query(&b' '), Some(Answer::Prefix | Answer::PrefixAndMatch)) {
                break;
            }
            match searcher.query_until(consumed.last().unwrap().1.lemma.as_bytes()) {
                Err(_) => break 'scan,
                Ok(Answer::Match) => {
                    best = Some(consumed.len());
                    break 'scan;
                }
                Ok(Answer::PrefixAndMatch) => best = Some(consumed.len()),
                Ok(Answer::Prefix) => {}
            }
        }

        match best {
            Some(phrase_end) => {
                let trailing = consumed.split_off(phrase_end);
                let members: Vec<Token<'o>> = std::iter::once(current.1.clone())
                    .chain(
                        consumed
                            .iter()
                            .filter(|(_, token)| token.is_word())
                            .map(|(_, token)| token.clone()),
                    )
                    .collect();
                let lemma = members
                    .iter()
                    .map(|token| token.lemma())
                    .collect::<Vec<_>>()
                    .join(" ");
                let token = merge_tokens(lemma, &current.1, &members[members.len() - 1], &members);
                let surface = &self.original[token.byte_start..token.byte_end];
                self.queue.extend(trailing);
                Some((surface, token))
            }
            None => {
                self.queue.extend(consumed);
                Some(current)
            }
        }
    }
}
