//! Rule-based English tagger used when no POS model is configured

use once_cell::sync::Lazy;
use regex::Regex;

use super::{is_stop_word, singularize, PosTag, TaggedText, TaggedToken, Tagger};
use crate::VisualError;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)*%?|\w+(?:[-']\w+)*|[^\w\s]").expect("valid token regex")
});

const DETERMINERS: &[&str] = &[
    "a", "all", "an", "another", "any", "both", "each", "either", "every", "neither", "no",
    "some", "that", "the", "these", "this", "those",
];
const PRONOUNS: &[&str] = &[
    "he", "her", "him", "his", "i", "it", "its", "me", "my", "our", "ours", "she", "their",
    "them", "they", "us", "we", "which", "who", "you", "your",
];
const ADPOSITIONS: &[&str] = &[
    "above", "across", "after", "against", "along", "among", "around", "at", "before",
    "behind", "below", "beside", "between", "by", "during", "for", "from", "in", "inside",
    "into", "near", "of", "on", "onto", "over", "per", "through", "throughout", "toward",
    "under", "versus", "via", "vs", "with", "within", "without",
];
const CONJUNCTIONS: &[&str] = &["and", "but", "nor", "or", "yet"];
const SUBORDINATORS: &[&str] = &["although", "because", "if", "since", "though", "unless", "whereas", "whether", "while"];
const AUXILIARIES: &[&str] = &[
    "am", "are", "be", "been", "being", "can", "could", "did", "do", "does", "had", "has",
    "have", "is", "may", "might", "must", "shall", "should", "was", "were", "will", "would",
];
const PARTICLES: &[&str] = &["not", "to"];
const ADVERBS: &[&str] = &[
    "also", "here", "how", "more", "most", "much", "often", "only", "then", "there", "too",
    "very", "well", "when", "where",
];
const ADJECTIVES: &[&str] = &[
    "best", "better", "different", "early", "few", "good", "high", "higher", "large",
    "larger", "late", "left", "low", "lower", "main", "many", "new", "novel", "old", "other",
    "overall", "right", "same", "several", "similar", "small", "smaller", "various",
];
const VERBS: &[&str] = &[
    "achieve", "achieves", "compare", "compares", "denote", "denotes", "depict", "depicts",
    "illustrate", "illustrates", "indicate", "indicates", "outperform", "outperforms",
    "present", "presents", "represent", "represents", "show", "shown", "shows", "use",
    "uses",
];
const ADJECTIVE_SUFFIXES: &[&str] = &["able", "al", "ful", "ible", "ic", "ive", "less", "ous"];
const NOUN_SUFFIXES: &[&str] = &["ism", "ity", "ment", "ness", "sion", "tion"];

/// Closed-class word lists plus suffix rules.
///
/// Unknown open-class words default to nouns, capitalized words not at the
/// start of a sentence become proper nouns and plural nouns lemmatize to
/// their singular form.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn contains(list: &[&str], word: &str) -> bool {
    list.binary_search(&word).is_ok()
}

fn closed_class(lower: &str) -> Option<PosTag> {
    if contains(DETERMINERS, lower) {
        Some(PosTag::Det)
    } else if contains(PRONOUNS, lower) {
        Some(PosTag::Pron)
    } else if contains(ADPOSITIONS, lower) {
        Some(PosTag::Adp)
    } else if contains(CONJUNCTIONS, lower) {
        Some(PosTag::Cconj)
    } else if contains(SUBORDINATORS, lower) {
        Some(PosTag::Sconj)
    } else if contains(AUXILIARIES, lower) {
        Some(PosTag::Aux)
    } else if contains(PARTICLES, lower) {
        Some(PosTag::Part)
    } else if contains(ADVERBS, lower) {
        Some(PosTag::Adv)
    } else if contains(ADJECTIVES, lower) {
        Some(PosTag::Adj)
    } else if contains(VERBS, lower) {
        Some(PosTag::Verb)
    } else {
        None
    }
}

fn is_acronym(word: &str) -> bool {
    word.chars().filter(|c| c.is_alphabetic()).count() > 1
        && word.chars().all(|c| !c.is_lowercase())
}

fn open_class(word: &str, lower: &str, sentence_start: bool, previous: Option<PosTag>) -> PosTag {
    if is_acronym(word) {
        return PosTag::Propn;
    }
    let capitalized = word.chars().next().is_some_and(char::is_uppercase);
    if capitalized && !sentence_start {
        return PosTag::Propn;
    }
    let after_modifier_slot = matches!(previous, Some(PosTag::Det | PosTag::Adj | PosTag::Pron));
    if lower.ends_with("ly") && lower.len() > 4 {
        PosTag::Adv
    } else if lower.ends_with("ed") && lower.len() > 4 {
        if after_modifier_slot {
            PosTag::Adj
        } else {
            PosTag::Verb
        }
    } else if lower.ends_with("ing") && lower.len() > 5 {
        if after_modifier_slot || previous == Some(PosTag::Adp) {
            PosTag::Noun
        } else {
            PosTag::Verb
        }
    } else if NOUN_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        PosTag::Noun
    } else if ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) && lower.len() > 5 {
        PosTag::Adj
    } else {
        PosTag::Noun
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<TaggedText, VisualError> {
        let mut tokens: Vec<TaggedToken> = Vec::new();
        for m in TOKEN_PATTERN.find_iter(text) {
            let word = m.as_str();
            let lower = word.to_lowercase();
            let previous = tokens.last().map(|t| t.pos);
            let sentence_start = tokens
                .last()
                .map_or(true, |t| matches!(t.text.as_str(), "." | ":" | "!" | "?"));

            let first = word.chars().next().unwrap_or(' ');
            let pos = if first.is_ascii_digit() {
                PosTag::Num
            } else if !first.is_alphanumeric() && first != '_' {
                if first == '%' || first == '$' || first == '+' || first == '=' {
                    PosTag::Sym
                } else {
                    PosTag::Punct
                }
            } else if let Some(tag) = closed_class(&lower) {
                tag
            } else {
                open_class(word, &lower, sentence_start, previous)
            };

            let lemma = match pos {
                PosTag::Noun => singularize(word),
                PosTag::Propn => word.to_string(),
                _ => lower.clone(),
            };
            tokens.push(TaggedToken {
                text: word.to_string(),
                span: m.start()..m.end(),
                pos,
                lemma,
                is_stop: is_stop_word(&lower),
            });
        }
        Ok(TaggedText::from_tokens(tokens))
    }
}
