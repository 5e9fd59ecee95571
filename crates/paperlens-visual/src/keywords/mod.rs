//! Caption keyword extraction
//!
//! A [`Tagger`] assigns a coarse part of speech, a lemma and a stop-word flag
//! to each token. Keywords are the lowercased noun chunks plus the lowercased
//! lemmas of every noun and proper noun that is not a stop word.

mod lexicon;
mod onnx;

pub use lexicon::LexiconTagger;
pub use onnx::OnnxPosTagger;

use std::collections::BTreeSet;
use std::ops::Range;

use crate::VisualError;

/// Universal part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PosTag {
    /// Parse a UPOS label such as `NOUN` or `B-PROPN`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label
            .strip_prefix("B-")
            .or_else(|| label.strip_prefix("I-"))
            .unwrap_or(label);
        match label.to_ascii_uppercase().as_str() {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "AUX" => Self::Aux,
            "CCONJ" | "CONJ" => Self::Cconj,
            "DET" => Self::Det,
            "INTJ" => Self::Intj,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PART" => Self::Part,
            "PRON" => Self::Pron,
            "PROPN" => Self::Propn,
            "PUNCT" => Self::Punct,
            "SCONJ" => Self::Sconj,
            "SYM" => Self::Sym,
            "VERB" => Self::Verb,
            _ => Self::X,
        }
    }

    #[must_use]
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::Propn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    /// Byte span in the tagged text
    pub span: Range<usize>,
    pub pos: PosTag,
    pub lemma: String,
    pub is_stop: bool,
}

/// Tokens of a text plus its noun chunks as token index ranges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedText {
    pub tokens: Vec<TaggedToken>,
    pub noun_chunks: Vec<Range<usize>>,
}

impl TaggedText {
    /// Wrap tokens, deriving noun chunks from their tags
    #[must_use]
    pub fn from_tokens(tokens: Vec<TaggedToken>) -> Self {
        let noun_chunks = noun_chunks(&tokens);
        Self {
            tokens,
            noun_chunks,
        }
    }

    /// Source text covered by a chunk
    #[must_use]
    pub fn chunk_text<'a>(&self, source: &'a str, chunk: &Range<usize>) -> &'a str {
        let (Some(first), Some(last)) = (
            self.tokens.get(chunk.start),
            chunk.end.checked_sub(1).and_then(|i| self.tokens.get(i)),
        ) else {
            return "";
        };
        source.get(first.span.start..last.span.end).unwrap_or("")
    }
}

/// Part-of-speech tagging seam
pub trait Tagger {
    fn tag(&self, text: &str) -> Result<TaggedText, VisualError>;
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn tag(&self, text: &str) -> Result<TaggedText, VisualError> {
        (**self).tag(text)
    }
}

impl<T: Tagger + ?Sized> Tagger for Box<T> {
    fn tag(&self, text: &str) -> Result<TaggedText, VisualError> {
        (**self).tag(text)
    }
}

/// Sorted, deduplicated keywords of a caption
pub fn extract_keywords<T: Tagger + ?Sized>(tagger: &T, caption: &str) -> Result<Vec<String>, VisualError> {
    if caption.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tagged = tagger.tag(caption)?;

    let mut keywords = BTreeSet::new();
    for chunk in &tagged.noun_chunks {
        let text = tagged.chunk_text(caption, chunk).trim();
        if !text.is_empty() {
            keywords.insert(text.to_lowercase());
        }
    }
    for token in &tagged.tokens {
        if token.pos.is_nominal() && !token.is_stop && !token.lemma.is_empty() {
            keywords.insert(token.lemma.to_lowercase());
        }
    }
    Ok(keywords.into_iter().collect())
}

const POSSESSIVES: &[&str] = &["my", "our", "your", "his", "her", "its", "their"];

/// Noun phrases headed by a noun or proper noun.
///
/// A chunk is an optional determiner or possessive pronoun followed by
/// adjectives, numbers and nouns, ending at the last noun of the run.
#[must_use]
pub fn noun_chunks(tokens: &[TaggedToken]) -> Vec<Range<usize>> {
    let modifier = |t: &TaggedToken| matches!(t.pos, PosTag::Adj | PosTag::Num) || t.pos.is_nominal();
    let opener = |t: &TaggedToken| {
        t.pos == PosTag::Det
            || (t.pos == PosTag::Pron && POSSESSIVES.contains(&t.text.to_lowercase().as_str()))
    };

    let mut chunks = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let body_start = if opener(&tokens[i]) { i + 1 } else { i };
        let mut end = body_start;
        while end < tokens.len() && modifier(&tokens[end]) {
            end += 1;
        }
        match (body_start..end).rev().find(|&k| tokens[k].pos.is_nominal()) {
            Some(head) => {
                chunks.push(i..head + 1);
                i = head + 1;
            }
            None => i += 1,
        }
    }
    chunks
}

/// English stop words
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "although",
    "am", "among", "an", "and", "another", "any", "are", "around", "as", "at", "be", "because",
    "been", "before", "being", "below", "between", "both", "but", "by", "can", "could", "did",
    "do", "does", "doing", "done", "down", "due", "during", "each", "either", "else", "enough",
    "etc", "even", "ever", "every", "few", "first", "for", "from", "further", "had", "has",
    "have", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "however", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "last", "least",
    "less", "made", "many", "may", "me", "might", "more", "most", "much", "must", "my",
    "myself", "neither", "no", "none", "nor", "not", "nothing", "now", "of", "off", "often",
    "on", "once", "one", "only", "or", "other", "others", "otherwise", "our", "ours",
    "ourselves", "out", "over", "own", "part", "per", "perhaps", "rather", "same", "see",
    "several", "she", "should", "show", "side", "since", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "third",
    "this", "those", "though", "three", "through", "thus", "to", "together", "too", "top",
    "toward", "two", "under", "until", "up", "upon", "us", "used", "using", "various", "very",
    "via", "was", "we", "well", "were", "what", "when", "where", "whether", "which", "while",
    "who", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself",
];

#[must_use]
pub(crate) fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word.to_lowercase().as_str()).is_ok()
}

/// Singular form of a common English plural noun
#[must_use]
pub(crate) fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    let len = lower.len();
    if len > 4 && lower.ends_with("ies") {
        return format!("{}y", &lower[..len - 3]);
    }
    for suffix in ["sses", "ches", "shes", "xes", "zes"] {
        if lower.ends_with(suffix) {
            return lower[..len - 2].to_string();
        }
    }
    let keeps_s = ["ss", "us", "is", "os"].iter().any(|s| lower.ends_with(s));
    if len > 3 && lower.ends_with('s') && !keeps_s {
        return lower[..len - 1].to_string();
    }
    lower
}
