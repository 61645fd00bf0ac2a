mod cards;
mod catalog;
mod io;
mod matcher;
mod model;
mod normalize;
mod parser;
mod pipeline;
mod report;
mod resolver;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use catalog::HttpCatalog;
use pipeline::Pipeline;
use report::Summary;
use settings::Settings;

#[derive(Parser)]
#[command(name = "vetsearch", about = "Resolve medication names on vetisearch.dk and extract SPC fields")]
struct Cli {
    /// Catalog base URL (overrides VETSEARCH_CATALOG_BASE)
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a batch of medications and save the outcomes
    Scrape {
        #[arg(short, long, default_value = "data/medications_input.json")]
        input: PathBuf,
        #[arg(short, long, default_value = "data/medications_scraped.json")]
        output: PathBuf,
        /// Also write the plain-text summary here
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Seconds to wait between medications
        #[arg(short, long)]
        delay: Option<f64>,
        /// Only the first 3 medications
        #[arg(long)]
        test: bool,
    },
    /// Resolve a single medication and print the outcome
    Resolve { name: String },
    /// Show cleaned names and slug candidates (no network)
    Slugs {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Extract SPC fields from a saved HTML file (no network)
    Parse { file: PathBuf },
    /// Convert saved outcomes into front-end flash cards
    Export {
        #[arg(short, long, default_value = "data/medications_scraped.json")]
        input: PathBuf,
        #[arg(short, long, default_value = "public/data/medications.json")]
        output: PathBuf,
    },
    /// Print the summary report for saved outcomes
    Report {
        #[arg(short, long, default_value = "data/medications_scraped.json")]
        input: PathBuf,
    },
}

const TEST_MODE_LIMIT: usize = 3;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape {
            input,
            output,
            report,
            delay,
            test,
        } => {
            let mut settings = load_settings(cli.catalog)?;
            if let Some(d) = delay {
                settings.set_delay_secs(d).context("Invalid --delay")?;
            }
            let mut queries = io::load_queries(&input)?;
            if test {
                queries.truncate(TEST_MODE_LIMIT);
                println!("Test mode: first {} medications", queries.len());
            }
            println!("Resolving {} medications...", queries.len());

            let pipeline = Pipeline::new(http_catalog(&settings)?, settings);
            let pb = ProgressBar::new(queries.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                    .progress_chars("=> "),
            );
            let batch = pipeline
                .run_batch(queries, |outcome| {
                    pb.println(progress_line(outcome));
                    pb.inc(1);
                })
                .await;
            pb.finish_and_clear();

            io::write_json(&output, &batch.outcomes)?;
            println!("Saved {} outcomes to {}", batch.outcomes.len(), output.display());

            let summary = Summary::from_outcomes(&batch.outcomes);
            if let Some(path) = report {
                let stamped = format!(
                    "Generated {}\n{}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    summary
                );
                io::write_text(&path, &stamped)?;
                println!("Report saved to {}", path.display());
            }
            println!("\n{summary}");
            Ok(())
        }
        Commands::Resolve { name } => {
            println!("Slug candidates: {}", normalize::slug_variants(&name).join(", "));
            let settings = load_settings(cli.catalog)?;
            let pipeline = Pipeline::new(http_catalog(&settings)?, settings);
            let outcome = pipeline
                .resolve_one(model::MedicationQuery::new(name, ""))
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Commands::Slugs { names } => {
            for name in &names {
                println!("{name}");
                println!("  Cleaned:  {}", normalize::strip_dosage_and_form(name));
                println!("  Slug:     {}", normalize::to_slug(name));
                println!("  Variants: {}", normalize::slug_variants(name).join(", "));
            }
            Ok(())
        }
        Commands::Parse { file } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let extraction = parser::extract_spc(&html);
            println!("{}", serde_json::to_string_pretty(&extraction)?);
            Ok(())
        }
        Commands::Export { input, output } => {
            let outcomes = io::load_outcomes(&input)?;
            let cards = cards::to_cards(&outcomes);
            io::write_json(&output, &cards)?;
            let found = cards.iter().filter(|c| c.found).count();
            println!("Total medications: {}", cards.len());
            println!("Found:             {}", found);
            println!("Missing:           {}", cards.len() - found);
            println!("Cards saved to {}", output.display());
            Ok(())
        }
        Commands::Report { input } => {
            let outcomes = io::load_outcomes(&input)?;
            print!("{}", Summary::from_outcomes(&outcomes));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Only the commands that talk to the catalog read `VETSEARCH_*`.
fn load_settings(catalog: Option<String>) -> Result<Settings> {
    let mut settings = Settings::load()?;
    if let Some(base) = catalog {
        settings.catalog_base = base.trim_end_matches('/').to_string();
    }
    Ok(settings)
}

fn http_catalog(settings: &Settings) -> Result<HttpCatalog> {
    HttpCatalog::new(settings).context("Failed to create HTTP client")
}

fn progress_line(outcome: &model::ResolutionOutcome) -> String {
    let name = truncate(&outcome.query.name, 40);
    match (&outcome.chosen_variant, &outcome.failure_reason) {
        (Some(v), _) if outcome.found => {
            let mark = if v.is_exact_match { "✓" } else { "~" };
            format!("{mark} {name} -> {} (score {})", truncate(&v.link.display_name, 40), v.score)
        }
        (_, reason) => format!("✗ {name}: {}", reason.as_deref().unwrap_or("unknown")),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
