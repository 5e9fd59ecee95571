//! paperlens - figure and text authenticity analysis for scholarly PDFs
//!
//! Usage:
//!   paperlens figures paper.pdf     Extract and analyze figures, write an HTML report
//!   paperlens text paper.pdf        Perplexity, burstiness, AI detection and fact check
//!   paperlens extract paper.pdf     Dump full text and images only

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use paperlens_common::Config;
use paperlens_orchestrator::{
    render_console, render_html, FigurePipeline, FigureServices, ResultCache, TextPipeline, TextServices,
};
use paperlens_pdf::{bind_pdfium, extract_document};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paperlens", version, about = "Figure and text authenticity analysis for scholarly PDFs")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract figures, categorize them, score complexity and check authenticity
    Figures {
        /// PDF to analyze
        pdf: PathBuf,
        /// Directory for extracted figure images
        #[arg(short, long, default_value = "figures_output")]
        output_dir: PathBuf,
        /// HTML report path
        #[arg(short, long, default_value = "paperlens_report.html")]
        report: PathBuf,
        /// Ignore and do not update the result cache
        #[arg(long)]
        no_cache: bool,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze the document text for signs of AI authorship and fact-check its first claim
    Text {
        /// PDF to analyze
        pdf: PathBuf,
        /// Directory for the text and image dump
        #[arg(short, long, default_value = "processed_output")]
        output_dir: PathBuf,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the document's full text and embedded images without analysis
    Extract {
        /// PDF to process
        pdf: PathBuf,
        #[arg(short, long, default_value = "processed_output")]
        output_dir: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Figures {
            pdf,
            output_dir,
            report,
            no_cache,
            json,
        } => cmd_figures(&config, &pdf, &output_dir, &report, no_cache, json),
        Commands::Text { pdf, output_dir, json } => cmd_text(&config, &pdf, &output_dir, json),
        Commands::Extract { pdf, output_dir } => cmd_extract(&pdf, &output_dir),
    }
}

fn ensure_input(pdf: &Path) -> Result<()> {
    if !pdf.exists() {
        bail!("Input file not found: {}", pdf.display());
    }
    Ok(())
}

fn cmd_figures(
    config: &Config,
    pdf: &Path,
    output_dir: &Path,
    report_path: &Path,
    no_cache: bool,
    json: bool,
) -> Result<()> {
    ensure_input(pdf)?;
    let pdfium = bind_pdfium().context("Failed to load the pdfium library")?;
    let services = FigureServices::load(config);
    let pipeline = FigurePipeline::from_services(&services, config);

    let cache = if no_cache {
        None
    } else {
        ResultCache::from_config(&config.cache)
    };
    let report = match &cache {
        Some(cache) => pipeline.run_cached(&pdfium, pdf, output_dir, cache)?,
        None => pipeline.run(&pdfium, pdf, output_dir)?,
    };

    std::fs::write(report_path, render_html(&report))
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    info!("Report written to {}", report_path.display());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.figures.is_empty() {
        println!("{}", "No figures were found in this PDF.".yellow());
    } else {
        println!(
            "{} {} figures from {}",
            "Analyzed".green().bold(),
            report.figures.len(),
            pdf.display()
        );
        for (i, figure) in report.figures.iter().enumerate() {
            println!(
                "  Figure {} (page {}): {} | complexity {}/10 | {} ({:.2})",
                i + 1,
                figure.page,
                figure.category.as_str().to_uppercase(),
                figure.complexity_score,
                figure.authenticity.label,
                figure.authenticity.confidence
            );
        }
        if report.summary.determined() == 0 {
            println!("{}", "Could not determine authenticity for any figures.".yellow());
        } else {
            println!(
                "Human-created: {}  AI-generated: {}",
                report.summary.human.to_string().green(),
                report.summary.ai.to_string().red()
            );
        }
    }
    println!("Report: {}", report_path.display().to_string().cyan());
    Ok(())
}

fn cmd_text(config: &Config, pdf: &Path, output_dir: &Path, json: bool) -> Result<()> {
    ensure_input(pdf)?;
    let pdfium = bind_pdfium().context("Failed to load the pdfium library")?;
    let services = TextServices::load(config);
    let pipeline = TextPipeline::from_services(&services, config);
    let record = pipeline.run(&pdfium, pdf, output_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render_console(pdf, &record));
    }
    Ok(())
}

fn cmd_extract(pdf: &Path, output_dir: &Path) -> Result<()> {
    ensure_input(pdf)?;
    let pdfium = bind_pdfium().context("Failed to load the pdfium library")?;
    let dump = extract_document(&pdfium, pdf, output_dir)
        .with_context(|| format!("Failed to process {}", pdf.display()))?;

    println!("Full text saved to: {}", dump.text_path.display());
    println!(
        "Saved {} images to: {}",
        dump.image_count,
        output_dir.join("images").display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_figures_defaults() {
        let cli = Cli::parse_from(["paperlens", "figures", "paper.pdf"]);
        match cli.command {
            Commands::Figures {
                pdf,
                output_dir,
                report,
                no_cache,
                json,
            } => {
                assert_eq!(pdf, PathBuf::from("paper.pdf"));
                assert_eq!(output_dir, PathBuf::from("figures_output"));
                assert_eq!(report, PathBuf::from("paperlens_report.html"));
                assert!(!no_cache && !json);
            }
            _ => panic!("expected figures command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["paperlens", "text", "paper.pdf", "-vv", "--config", "custom.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Text { .. }));
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let err = ensure_input(Path::new("/nonexistent/paper.pdf")).unwrap_err();
        assert!(err.to_string().contains("Input file not found"));
    }
}
