//! Burstiness: variation of sentence lengths

use crate::sentences::{split_sentences, tokenize_words};

/// Word-token count of every sentence
#[must_use]
pub fn sentence_lengths(text: &str) -> Vec<usize> {
    split_sentences(text)
        .iter()
        .map(|s| tokenize_words(s).len())
        .collect()
}

/// Population standard deviation of sentence lengths.
///
/// Empty text and texts with fewer than two sentences score 0.0.
#[must_use]
pub fn burstiness(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    population_std_dev(&sentence_lengths(text))
}

fn population_std_dev(values: &[usize]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single_sentence_are_zero() {
        assert_eq!(burstiness(""), 0.0);
        assert_eq!(burstiness("   \n"), 0.0);
        assert_eq!(burstiness("Only one sentence here."), 0.0);
    }

    #[test]
    fn test_population_std_dev_of_lengths() {
        // 4 and 6 tokens including the final period
        let text = "One two three. Four five six seven eight.";
        assert_eq!(sentence_lengths(text), vec![4, 6]);
        assert!((burstiness(text) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_lengths_have_zero_burstiness() {
        let text = "The cat sat. The dog ran. The cow ate.";
        assert_eq!(burstiness(text), 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        assert!((population_std_dev(&[2, 4, 4, 4, 5, 5, 7, 9]) - 2.0).abs() < 1e-12);
    }
}
