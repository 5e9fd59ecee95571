//! Plain-text report of the text pipeline

use colored::Colorize;
use paperlens_common::DocumentTextRecord;
use std::fmt::Write;
use std::path::Path;

/// Console report with the statistical, model and fact-checking sections
#[must_use]
pub fn render_console(source: &Path, record: &DocumentTextRecord) -> String {
    let name = source
        .file_name()
        .map_or_else(|| source.display().to_string(), |n| n.to_string_lossy().into_owned());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!("--- Starting Full Analysis of: {name} ---").bold()
    );

    let _ = writeln!(out, "\n{}", "[1] Statistical Analysis:".cyan().bold());
    match record.perplexity {
        Some(perplexity) => {
            let _ = writeln!(out, "-> Perplexity Score: {perplexity:.2}");
        }
        None => {
            let _ = writeln!(out, "-> Perplexity Score: {}", "unavailable".yellow());
        }
    }
    let _ = writeln!(out, "-> Burstiness Score: {:.2}", record.burstiness);

    let _ = writeln!(out, "\n{}", "[2] Pre-trained Model Detection:".cyan().bold());
    let _ = writeln!(
        out,
        "-> Predicted Class: '{}' (Confidence: {:.2})",
        record.classification.label, record.classification.score
    );

    let _ = writeln!(out, "\n{}", "[3] Fact-Checking Prototype:".cyan().bold());
    write_fact_check(&mut out, record);

    let _ = writeln!(out, "\n{}", "--- Analysis Complete ---".bold());
    out
}

fn write_fact_check(out: &mut String, record: &DocumentTextRecord) {
    let Some(claim) = &record.claim else {
        let _ = writeln!(out, "-> No claim extracted.");
        return;
    };
    let _ = writeln!(out, "-> Extracted Claim for Fact-Checking: '{claim}'");

    let Some(evidence) = &record.evidence else {
        let _ = writeln!(out, "-> {}", "Could not find evidence for the claim.".yellow());
        return;
    };
    match &record.verification {
        Some(verification) => {
            let _ = writeln!(out, "-> Similarity to Evidence: {:.2}", verification.score);
            let _ = writeln!(out, "-> Most Relevant Fact: '{}'", verification.sentence.trim());
        }
        None => {
            let _ = writeln!(
                out,
                "-> {}",
                "Could not compare the claim with the evidence.".yellow()
            );
        }
    }
    let _ = writeln!(out, "-> Source: {}", evidence.url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_common::{ClaimVerification, Evidence, TextClass, TextClassification};

    fn record() -> DocumentTextRecord {
        DocumentTextRecord {
            full_text: "The capital of France is Paris. More.".to_string(),
            analyzed_text: "The capital of France is Paris. More.".to_string(),
            perplexity: Some(41.237),
            burstiness: 2.5,
            classification: TextClassification {
                label: TextClass::Human,
                score: 0.913,
            },
            claim: Some("The capital of France is Paris.".to_string()),
            evidence: Some(Evidence {
                summary: "Paris is the capital of France.".to_string(),
                url: "https://en.wikipedia.org/wiki/Paris".to_string(),
            }),
            verification: Some(ClaimVerification {
                sentence: " Paris is the capital of France. ".to_string(),
                score: 0.874,
            }),
        }
    }

    fn render(record: &DocumentTextRecord) -> String {
        colored::control::set_override(false);
        render_console(Path::new("/tmp/papers/sample.pdf"), record)
    }

    #[test]
    fn test_all_sections() {
        let out = render(&record());
        assert!(out.contains("--- Starting Full Analysis of: sample.pdf ---"));
        assert!(out.contains("[1] Statistical Analysis:"));
        assert!(out.contains("-> Perplexity Score: 41.24"));
        assert!(out.contains("-> Burstiness Score: 2.50"));
        assert!(out.contains("[2] Pre-trained Model Detection:"));
        assert!(out.contains("-> Predicted Class: 'Human' (Confidence: 0.91)"));
        assert!(out.contains("[3] Fact-Checking Prototype:"));
        assert!(out.contains("-> Similarity to Evidence: 0.87"));
        assert!(out.contains("-> Most Relevant Fact: 'Paris is the capital of France.'"));
        assert!(out.contains("-> Source: https://en.wikipedia.org/wiki/Paris"));
        assert!(out.trim_end().ends_with("--- Analysis Complete ---"));
    }

    #[test]
    fn test_no_evidence() {
        let mut record = record();
        record.evidence = None;
        record.verification = None;
        let out = render(&record);
        assert!(out.contains("-> Could not find evidence for the claim."));
        assert!(!out.contains("Source:"));
    }

    #[test]
    fn test_no_claim() {
        let mut record = record();
        record.claim = None;
        let out = render(&record);
        assert!(out.contains("-> No claim extracted."));
        assert!(!out.contains("Extracted Claim"));
    }

    #[test]
    fn test_unavailable_perplexity_and_unknown_class() {
        let mut record = record();
        record.perplexity = None;
        record.classification = TextClassification::unknown();
        let out = render(&record);
        assert!(out.contains("-> Perplexity Score: unavailable"));
        assert!(out.contains("-> Predicted Class: 'Unknown' (Confidence: 0.00)"));
    }
}
