//! Self-contained HTML report of a figure analysis

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use paperlens_common::{AuthenticityLabel, AuthenticitySummary, FigureRecord, FigureReport, TableGrid};
use std::f64::consts::PI;
use std::fmt::Write;
use std::fs;
use tracing::warn;

const HUMAN_COLOR: &str = "#2e7d32";
const AI_COLOR: &str = "#c62828";

const STYLE: &str = r"
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 2rem auto; max-width: 1100px; color: #222; }
h1 { margin-bottom: 0.2rem; }
.source { color: #666; margin-top: 0; }
.notice { padding: 0.8rem 1rem; border-radius: 6px; }
.warning { background: #fff4e5; }
.info { background: #e8f1fb; }
.figure { border-top: 1px solid #ddd; padding: 1rem 0; }
.columns { display: flex; gap: 2rem; }
.columns .image { flex: 1; }
.columns .image img { max-width: 100%; border: 1px solid #eee; }
.columns .details { flex: 1.5; }
.authenticity { padding: 0.5rem 0.8rem; border-radius: 6px; }
.authenticity.human { background: #e8f5e9; }
.authenticity.ai { background: #ffebee; }
.authenticity.error { background: #f5f5f5; }
.caption { color: #555; font-style: italic; }
pre { white-space: pre-wrap; background: #fafafa; padding: 0.8rem; }
table.grid { border-collapse: collapse; }
table.grid td { border: 1px solid #ccc; padding: 0.2rem 0.5rem; }
";

/// Render `report` as a standalone HTML page with figures embedded as PNG
/// data URIs
#[must_use]
pub fn render_html(report: &FigureReport) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"en\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "<meta charset=\"utf-8\">");
    let _ = writeln!(html, "<title>Scientific PDF Visuals Report</title>");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");
    let _ = writeln!(html, "<h1>Scientific PDF Visuals Report</h1>");
    let _ = writeln!(
        html,
        "<p class=\"source\">{}</p>",
        escape_html(&report.source.display().to_string())
    );

    let _ = writeln!(html, "<h2>Overall Authenticity Summary</h2>");
    write_summary(&mut html, report);

    let _ = writeln!(html, "<h2>Detailed Figure-by-Figure Analysis</h2>");
    if !report.figures.is_empty() {
        let _ = writeln!(
            html,
            "<p class=\"notice info\">Found {} figures. See details below:</p>",
            report.figures.len()
        );
    }
    for (i, figure) in report.figures.iter().enumerate() {
        write_figure(&mut html, i + 1, figure);
    }

    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}

fn write_summary(html: &mut String, report: &FigureReport) {
    if report.figures.is_empty() {
        let _ = writeln!(
            html,
            "<p class=\"notice warning\">No figures were found in this PDF.</p>"
        );
    } else if report.summary.determined() == 0 {
        let _ = writeln!(
            html,
            "<p class=\"notice info\">Could not determine authenticity for any figures.</p>"
        );
    } else {
        html.push_str(&pie_chart_svg(&report.summary));
    }
}

/// Two-slice pie chart of human-created vs AI-generated figures with a legend
#[must_use]
pub fn pie_chart_svg(summary: &AuthenticitySummary) -> String {
    let (cx, cy, r) = (150.0_f64, 150.0_f64, 120.0_f64);
    let total = summary.determined().max(1) as f64;
    let human_share = summary.human as f64 / total;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg class=\"pie\" width=\"520\" height=\"320\" viewBox=\"0 0 520 320\" \
         xmlns=\"http://www.w3.org/2000/svg\" role=\"img\">"
    );
    let _ = writeln!(svg, "<title>Ratio of Human vs. AI-Generated Figures</title>");

    if summary.ai == 0 || summary.human == 0 {
        let color = if summary.ai == 0 { HUMAN_COLOR } else { AI_COLOR };
        let _ = writeln!(svg, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{color}\"/>");
    } else {
        // Slices start at 12 o'clock and run clockwise
        let angle = 2.0 * PI * human_share;
        let (x, y) = (cx + r * angle.sin(), cy - r * angle.cos());
        let human_large = u8::from(human_share > 0.5);
        let ai_large = u8::from(human_share < 0.5);
        let top = cy - r;
        let _ = writeln!(
            svg,
            "<path d=\"M {cx} {cy} L {cx} {top} A {r} {r} 0 {human_large} 1 {x:.2} {y:.2} Z\" fill=\"{HUMAN_COLOR}\"/>"
        );
        let _ = writeln!(
            svg,
            "<path d=\"M {cx} {cy} L {x:.2} {y:.2} A {r} {r} 0 {ai_large} 1 {cx} {top} Z\" fill=\"{AI_COLOR}\"/>"
        );
    }

    let legend = [
        ("Human-created", summary.human, HUMAN_COLOR, 130),
        ("AI-generated", summary.ai, AI_COLOR, 170),
    ];
    for (name, count, color, y) in legend {
        let percent = 100.0 * count as f64 / total;
        let _ = writeln!(
            svg,
            "<rect x=\"310\" y=\"{}\" width=\"16\" height=\"16\" fill=\"{color}\"/>",
            y - 13
        );
        let _ = writeln!(
            svg,
            "<text x=\"334\" y=\"{y}\" font-size=\"14\">{name}: {count} ({percent:.1}%)</text>"
        );
    }
    let _ = writeln!(svg, "</svg>");
    svg
}

fn authenticity_class(label: &AuthenticityLabel) -> &'static str {
    match label {
        AuthenticityLabel::HumanCreated => "human",
        AuthenticityLabel::AiGenerated => "ai",
        AuthenticityLabel::ModelUnavailable
        | AuthenticityLabel::FileNotFound
        | AuthenticityLabel::ProcessingFailed(_) => "error",
    }
}

fn write_figure(html: &mut String, number: usize, figure: &FigureRecord) {
    let _ = writeln!(html, "<section class=\"figure\">");
    let _ = writeln!(html, "<h3>Figure {number}</h3>");
    let _ = writeln!(html, "<div class=\"columns\">");

    let _ = writeln!(html, "<div class=\"image\">");
    match fs::read(&figure.image_path) {
        Ok(bytes) => {
            let _ = writeln!(
                html,
                "<img src=\"data:image/png;base64,{}\" alt=\"Figure {number}\">",
                STANDARD.encode(bytes)
            );
        }
        Err(e) => {
            warn!("Could not embed {}: {}", figure.image_path.display(), e);
            let _ = writeln!(
                html,
                "<p class=\"notice warning\">Image unavailable: {}</p>",
                escape_html(&figure.image_path.display().to_string())
            );
        }
    }
    let _ = writeln!(html, "</div>");

    let _ = writeln!(html, "<div class=\"details\">");
    let _ = writeln!(
        html,
        "<p class=\"metric\">Complexity Score: <strong>{}/10</strong></p>",
        figure.complexity_score
    );
    let label = &figure.authenticity.label;
    let _ = writeln!(
        html,
        "<p class=\"authenticity {}\">Authenticity: {} (Confidence: {:.2})</p>",
        authenticity_class(label),
        escape_html(&label.to_string()),
        figure.authenticity.confidence
    );
    let _ = writeln!(
        html,
        "<p>Detected Category: <strong>{}</strong></p>",
        escape_html(&figure.category.as_str().to_uppercase())
    );
    if figure.caption.is_empty() {
        let _ = writeln!(html, "<p class=\"caption\">No caption found for this figure.</p>");
    } else {
        let _ = writeln!(
            html,
            "<p class=\"caption\">Detected Caption: {}</p>",
            escape_html(&figure.caption)
        );
        if !figure.keywords.is_empty() {
            let _ = writeln!(
                html,
                "<p><strong>Keywords:</strong> {}</p>",
                escape_html(&figure.keywords.join(", "))
            );
        }
    }
    let _ = writeln!(html, "</div>");
    let _ = writeln!(html, "</div>");

    let ocr_text = if figure.ocr_text.is_empty() {
        "No text found in this figure."
    } else {
        figure.ocr_text.as_str()
    };
    let _ = writeln!(
        html,
        "<details><summary>Show Text Extracted from Figure (OCR)</summary><pre>{}</pre></details>",
        escape_html(ocr_text)
    );

    if let Some(table) = figure.table.as_ref().filter(|t| !t.is_empty()) {
        let _ = writeln!(html, "<details><summary>Show Parsed Table Data</summary>");
        write_table(html, table);
        let _ = writeln!(html, "</details>");
    }
    let _ = writeln!(html, "</section>");
}

fn write_table(html: &mut String, table: &TableGrid) {
    let _ = writeln!(html, "<table class=\"grid\">");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }
    let _ = writeln!(html, "</table>");
}

/// Escape the characters that are significant in HTML text and attributes
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_common::{AuthenticityOutcome, FigureCategory};
    use std::path::{Path, PathBuf};

    fn record(image_path: PathBuf, label: AuthenticityLabel) -> FigureRecord {
        FigureRecord {
            image_path,
            page: 1,
            ocr_text: String::new(),
            caption: String::new(),
            category: FigureCategory::DiagramPhoto,
            keywords: Vec::new(),
            complexity_score: 2.5,
            authenticity: AuthenticityOutcome::new(label, 0.8),
            table: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"R&D\" isn't</b>"),
            "&lt;b&gt;&quot;R&amp;D&quot; isn&#39;t&lt;/b&gt;"
        );
    }

    #[test]
    fn test_no_figures_notice() {
        let html = render_html(&FigureReport::new(PathBuf::from("empty.pdf"), Vec::new()));
        assert!(html.contains("No figures were found in this PDF."));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_undetermined_authenticity_notice() {
        let report = FigureReport::new(
            PathBuf::from("paper.pdf"),
            vec![record(PathBuf::from("missing.png"), AuthenticityLabel::ModelUnavailable)],
        );
        let html = render_html(&report);
        assert!(html.contains("Could not determine authenticity for any figures."));
        assert!(html.contains("Image unavailable"));
        assert!(html.contains("Error: Model not loaded"));
    }

    #[test]
    fn test_figure_card_contents() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("figure_1_p1.png");
        image::RgbImage::new(4, 4).save(&image_path).unwrap();

        let mut figure = record(image_path, AuthenticityLabel::HumanCreated);
        figure.caption = "Figure 1: Results <raw>".to_string();
        figure.keywords = vec!["result".to_string()];
        figure.category = FigureCategory::Table;
        figure.table = Some(TableGrid::new(vec![vec!["a".into(), "b".into()]]));
        let html = render_html(&FigureReport::new(PathBuf::from("paper.pdf"), vec![figure]));

        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("Complexity Score: <strong>2.5/10</strong>"));
        assert!(html.contains("Authenticity: Human-created (Confidence: 0.80)"));
        assert!(html.contains("<strong>TABLE</strong>"));
        assert!(html.contains("Figure 1: Results &lt;raw&gt;"));
        assert!(html.contains("<strong>Keywords:</strong> result"));
        assert!(html.contains("No text found in this figure."));
        assert!(html.contains("<td>a</td><td>b</td>"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_authenticity_class_follows_label_variant() {
        assert_eq!(authenticity_class(&AuthenticityLabel::HumanCreated), "human");
        assert_eq!(authenticity_class(&AuthenticityLabel::AiGenerated), "ai");
        assert_eq!(authenticity_class(&AuthenticityLabel::FileNotFound), "error");
        let failure = AuthenticityLabel::ProcessingFailed("AI-generated image is truncated".into());
        assert_eq!(authenticity_class(&failure), "error");

        let html = render_html(&FigureReport::new(
            PathBuf::from("paper.pdf"),
            vec![record(PathBuf::from("x.png"), failure)],
        ));
        assert!(html.contains("authenticity error"));
    }

    #[test]
    fn test_missing_caption_message() {
        let html = render_html(&FigureReport::new(
            PathBuf::from("paper.pdf"),
            vec![record(Path::new("x.png").to_path_buf(), AuthenticityLabel::AiGenerated)],
        ));
        assert!(html.contains("No caption found for this figure."));
        assert!(html.contains("authenticity ai"));
    }

    #[test]
    fn test_pie_chart_slices() {
        let mixed = pie_chart_svg(&AuthenticitySummary { human: 3, ai: 1 });
        assert_eq!(mixed.matches("<path").count(), 2);
        assert!(mixed.contains("Human-created: 3 (75.0%)"));
        assert!(mixed.contains("AI-generated: 1 (25.0%)"));

        let human_only = pie_chart_svg(&AuthenticitySummary { human: 2, ai: 0 });
        assert!(human_only.contains(&format!("<circle cx=\"150\" cy=\"150\" r=\"120\" fill=\"{HUMAN_COLOR}\"/>")));
    }
}
