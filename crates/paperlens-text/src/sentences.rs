//! Sentence segmentation and word tokenization for English prose

use unicode_segmentation::UnicodeSegmentation;

/// Lowercased abbreviations (without the final period) that do not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "al", "approx", "cf", "dept", "dr", "e.g", "eq", "eqs", "etc", "fig", "figs", "i.e",
    "inc", "jr", "ltd", "mr", "mrs", "ms", "no", "prof", "ref", "refs", "sec", "sr", "st",
    "vol", "vs",
];

fn is_abbreviation(word: &str) -> bool {
    let lower = word.trim_start_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
    ABBREVIATIONS.binary_search(&lower.as_str()).is_ok()
        || (lower.chars().count() == 1 && lower.chars().all(char::is_alphabetic))
}

fn is_number(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit()) && word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// A word whose trailing period ends the sentence whatever follows
fn is_sentence_final(word: &str) -> bool {
    word.chars().any(char::is_alphanumeric) && !is_abbreviation(word) && !is_number(word)
}

fn ends_with_abbreviation(prefix: &str) -> bool {
    prefix
        .trim_end()
        .strip_suffix('.')
        .and_then(|rest| rest.split_whitespace().next_back())
        .is_some_and(is_abbreviation)
}

/// Offsets of lowercase words that follow a sentence-final period.
///
/// UAX #29 never breaks before a lowercase word.
fn lowercase_sentence_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut tokens = text.split_word_bound_indices().peekable();
    let mut previous: Option<&str> = None;

    while let Some((_, token)) = tokens.next() {
        if token == "." && previous.is_some_and(is_sentence_final) {
            let mut spaced = false;
            while let Some(&(_, gap)) = tokens.peek() {
                if !gap.trim().is_empty() {
                    break;
                }
                spaced = true;
                tokens.next();
            }
            if let Some(&(start, next)) = tokens.peek() {
                if spaced && next.starts_with(char::is_lowercase) {
                    starts.push(start);
                }
            }
        }
        previous = Some(token);
    }
    starts
}

/// Split `text` into sentences.
///
/// Starts from the Unicode sentence boundaries. A boundary right after a
/// known abbreviation or a single initial is dropped. A period after an
/// ordinary word also ends the sentence when a lowercase word follows.
/// Numbers and abbreviations followed by a lowercase word do not.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut boundaries: Vec<usize> = text
        .split_sentence_bound_indices()
        .map(|(start, _)| start)
        .filter(|&start| start > 0 && !ends_with_abbreviation(&text[..start]))
        .collect();
    boundaries.extend(lowercase_sentence_starts(text));
    boundaries.sort_unstable();
    boundaries.dedup();
    boundaries.push(text.len());

    let mut sentences = Vec::new();
    let mut start = 0;
    for end in boundaries {
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = end;
    }
    sentences
}

fn push_word(word: &str, tokens: &mut Vec<String>) {
    if word.len() > 3 && word.to_lowercase().ends_with("n't") {
        let split = word.len() - 3;
        tokens.push(word[..split].to_string());
        tokens.push(word[split..].to_string());
        return;
    }
    match word.find(['\'', '\u{2019}']) {
        Some(pos) if pos > 0 => {
            tokens.push(word[..pos].to_string());
            tokens.push(word[pos..].to_string());
        }
        _ => tokens.push(word.to_string()),
    }
}

/// Treebank-style word tokens on Unicode word boundaries: punctuation is
/// separate, runs of periods stay one token and clitics such as `'s` and
/// `n't` are split from their host word
#[must_use]
pub fn tokenize_words(sentence: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut last_end = 0;

    for (start, piece) in sentence.split_word_bound_indices() {
        if piece.trim().is_empty() {
            continue;
        }
        let adjacent = start == last_end;
        last_end = start + piece.len();
        if piece == "." && adjacent {
            if let Some(last) = tokens.last_mut().filter(|t| t.chars().all(|c| c == '.')) {
                last.push('.');
                continue;
            }
        }
        push_word(piece, &mut tokens);
    }
    tokens
}

/// First `max_words` whitespace-separated words, joined by single spaces
#[must_use]
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
