use anyhow::{Context, Result};
use clap::Parser;
use frozen_audit::{
    analysis,
    cli::{Cli, OutputFormat},
    config::AnalysisConfig,
    csv_output::AgreementCsv,
    html_output::HtmlReport,
    json_output::JsonReport,
    loader::{self, Discovery, LoadOutcome},
};
use std::fs;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print the configuration echo
fn print_config(config: &AnalysisConfig) {
    println!("--- System configuration ---");
    println!("Block length (N): {}", config.block_length);
    println!("Information bits (K): {}", config.info_bits());
    println!("Frozen bits (N-K): {}", config.n_frozen());
    println!("----------------------------");
}

/// Print where run tables were searched and what was found
fn print_discovery(discovery: &Discovery) {
    let search = discovery.search_dir.join(&discovery.pattern);
    if discovery.fell_back {
        println!(
            "Input directory not found, searching {}",
            discovery.search_dir.display()
        );
    }
    if discovery.files.is_empty() {
        println!("Error: no files matching {}", search.display());
    } else {
        println!("Found {} files.", discovery.files.len());
    }
}

/// Print one warning per skipped file
fn print_skipped(outcome: &LoadOutcome, expected: usize) {
    for skipped in &outcome.skipped {
        println!("Warning: {} {}. Skipping.", skipped.file, skipped.reason);
    }
    tracing::debug!(
        "{} of {} files loaded with N={}",
        outcome.runs.len(),
        outcome.discovery.files.len(),
        expected
    );
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = args.to_config()?;
    let text = args.format == OutputFormat::Text;

    if text {
        print_config(&config);
    }

    let outcome = loader::load_runs(&config)?;
    if text {
        print_discovery(&outcome.discovery);
        print_skipped(&outcome, config.block_length);
    } else {
        for skipped in &outcome.skipped {
            eprintln!("Warning: {} {}. Skipping.", skipped.file, skipped.reason);
        }
    }

    if outcome.runs.is_empty() {
        if text {
            println!("No valid runs to analyze.");
        } else {
            eprintln!("No valid runs to analyze.");
        }
        return Ok(());
    }

    let mut report = analysis::analyze(&outcome.runs, &config)?;
    let mut skipped = outcome.skipped.clone();
    skipped.append(&mut report.skipped);
    report.skipped = skipped;

    match args.format {
        OutputFormat::Text => print!("{}", report.to_report_string()),
        OutputFormat::Json => {
            println!(
                "{}",
                JsonReport::new(&report, Some(&outcome.discovery)).to_json()?
            );
        }
        OutputFormat::Csv => print!("{}", AgreementCsv::new(&report.agreement).to_csv()),
    }

    if let Some(path) = &args.html {
        fs::write(path, HtmlReport::new(&report).to_html())
            .with_context(|| format!("Failed to write HTML report to {}", path.display()))?;
        if text {
            println!("\nHTML report written to {}", path.display());
        }
    }

    Ok(())
}
