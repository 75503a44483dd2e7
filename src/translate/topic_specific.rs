use std::collections::BTreeSet;
use std::hash::Hash;

use itertools::Itertools;

use crate::dictionary::direction::{Invariant, LanguageKind, A};
use crate::dictionary::{BilingualDictionary, Dictionary};
use crate::vocabulary::Vocabulary;

/// Restricts `dictionary` to the edges whose A-side word is in `vocabulary`
/// (matched by surface form). The result's `voc_a` equals the input
/// vocabulary (same ids); `voc_b` keeps only the ids referenced by surviving
/// edges, re-compacted in their original relative order. Metadata is carried
/// across unchanged.
pub fn create_topic_model_specific_dictionary<T>(
    dictionary: &Dictionary<T>,
    vocabulary: &Vocabulary<T>,
) -> Dictionary<T>
where
    T: Eq + Hash + Clone + Send + Sync,
{
    let mut voc_a = vocabulary.clone();
    if voc_a.language().is_none() {
        voc_a.set_language(dictionary.voc_a().language().cloned());
    }

    // every (a_id of the new voc, original b_id) edge that survives
    let edges = voc_a
        .iter_entries()
        .filter_map(|(new_a_id, word)| {
            let old_a_id = dictionary.voc_a().word_to_id(word)?;
            let targets = dictionary.translate_id_to_ids::<A>(old_a_id)?;
            (!targets.is_empty()).then(|| (new_a_id, targets.iter().copied().collect_vec()))
        })
        .collect_vec();

    let referenced: BTreeSet<usize> = edges.iter().flat_map(|(_, bs)| bs.iter().copied()).collect();

    let mut voc_b: Vocabulary<T> = Vocabulary::empty(dictionary.voc_b().language().cloned());
    for old_b_id in referenced.iter() {
        voc_b.add(dictionary.voc_b().id_to_word(*old_b_id).unwrap().clone());
    }

    let mut new_dict = Dictionary::from_voc(voc_a, voc_b);
    for (new_a_id, old_b_ids) in edges.iter() {
        let word_a = vocabulary.id_to_word(*new_a_id).unwrap().clone();
        for old_b_id in old_b_ids {
            let word_b = dictionary.voc_b().id_to_word(*old_b_id).unwrap().clone();
            new_dict.insert::<Invariant>(word_a.clone(), word_b);
        }
    }

    // metadata follows the surviving words
    let a_words = new_dict.voc_a().iter_entries().map(|(id, w)| (id, w.clone())).collect_vec();
    for (new_a_id, word) in a_words {
        if let Some(old_a_id) = dictionary.voc_a().word_to_id(&word) {
            if let Some(solved) = dictionary.metadata_for(LanguageKind::A, old_a_id) {
                new_dict
                    .metadata_mut()
                    .merge_solved(LanguageKind::A, new_a_id, &solved);
            }
        }
    }
    let b_words = new_dict.voc_b().iter_entries().map(|(id, w)| (id, w.clone())).collect_vec();
    for (new_b_id, word) in b_words {
        if let Some(old_b_id) = dictionary.voc_b().word_to_id(&word) {
            if let Some(solved) = dictionary.metadata_for(LanguageKind::B, old_b_id) {
                new_dict
                    .metadata_mut()
                    .merge_solved(LanguageKind::B, new_b_id, &solved);
            }
        }
    }

    new_dict
}

#[cfg(test)]
mod test {
    use super::create_topic_model_specific_dictionary;
    use crate::dictionary::metadata::DictionaryEntry;
    use crate::dictionary::{BilingualDictionary, Dictionary};
    use crate::voc;

    #[test]
    fn restricts_to_the_model_vocabulary() {
        let mut dict: Dictionary<String> = Dictionary::default();
        dict.add_word_pair("plane", "Flugzeug");
        dict.add_word_pair("plane", "Ebene");
        dict.add_word_pair("wing", "Tragfläche");
        dict.add_word_pair("deck", "Deck");

        let voc = voc!["plane".to_string(), "wing".to_string(), "unknown".to_string()];
        let sub = create_topic_model_specific_dictionary(&dict, &voc);

        // voc_a equals the input vocabulary, same ids
        assert_eq!(voc.as_slice(), sub.voc_a().as_slice());
        // only referenced b words survive, in their original relative order
        assert_eq!(
            vec!["Flugzeug", "Ebene", "Tragfläche"],
            sub.voc_b().iter().map(|w| w.as_str()).collect::<Vec<_>>()
        );
        // edges survive in both directions
        assert_eq!(2, sub.get_translation_a_to_b("plane").unwrap().len());
        assert_eq!(
            vec![&"wing".to_string()],
            sub.get_translation_b_to_a("Tragfläche").unwrap()
        );
        // a word without dictionary support has no edges but keeps its id
        assert!(sub.get_translation_a_to_b("unknown").is_none());
    }

    #[test]
    fn metadata_is_carried_across() {
        let mut dict: Dictionary<String> = Dictionary::default();
        dict.add(DictionaryEntry::new("plane", "Flugzeug").dictionary_a("dictcc").meta_b("noun"));
        dict.add_word_pair("other", "Anderes");

        let voc = voc!["plane".to_string()];
        let sub = create_topic_model_specific_dictionary(&dict, &voc);

        assert_eq!(
            vec!["dictcc"],
            sub.get_meta_a_of("plane").unwrap().associated_dictionaries
        );
        assert_eq!(vec!["noun"], sub.get_meta_b_of("Flugzeug").unwrap().meta_tags);
    }
}
