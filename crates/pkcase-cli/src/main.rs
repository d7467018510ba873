//! pkcase CLI - Command-line interface
//!
//! Usage:
//!   pkcase normalize <unit>...
//!   pkcase extract <file>
//!   pkcase records <file> [--stats]
//!   pkcase stats <file>

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pkcase_core::{AppConfig, LoggingConfig, SentenceRecord};
use pkcase_extractor::sentence::{
    count_central_relations, mean_central_relations_per_sentence, sentences_with_measurements,
};
use pkcase_extractor::{
    group_abstracts, AbstractsDb, AnnotatedSentence, EstimateReducer, RecordStats, Sentence,
    UnitNormalizer,
};

#[derive(Parser)]
#[command(name = "pkcase")]
#[command(about = "Pharmacokinetic estimate extraction from annotated sentences")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize unit mentions
    Normalize {
        /// Unit mentions
        #[arg(required = true)]
        units: Vec<String>,
        /// Print JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Extract estimate records from sentence records
    Extract {
        /// JSON array or JSON lines of sentence records
        file: PathBuf,
    },
    /// Build database records grouped by article
    Records {
        file: PathBuf,
        /// Print record statistics to stderr
        #[arg(long)]
        stats: bool,
    },
    /// Relation and parameter statistics
    Stats { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    init_tracing(&config.logging);

    let normalizer = UnitNormalizer::from_config(&config.units)?;
    let reducer = EstimateReducer::with_normalizer(normalizer);

    match cli.command {
        Commands::Normalize { units, json } => {
            for raw in units {
                let unit = reducer.normalizer().normalize(&raw);
                if json {
                    println!("{}", serde_json::to_string(&unit)?);
                } else {
                    println!(
                        "{}\t{}\t{}\t{}",
                        raw, unit.mention, unit.magnitude, unit.all_converted
                    );
                }
            }
        }
        Commands::Extract { file } => {
            for sentence in load_sentences(&file).await? {
                for estimate in reducer.reduce(&sentence) {
                    println!("{}", serde_json::to_string(&estimate.to_record())?);
                }
            }
        }
        Commands::Records { file, stats } => {
            let sentences = load_sentences(&file).await?;
            let db = AbstractsDb::with_config(
                group_abstracts(annotate(sentences, &reducer))?,
                config.records.clone(),
            );
            let records = db.to_records();
            println!("{}", serde_json::to_string_pretty(&records)?);

            if stats {
                let summary = RecordStats::from_records(
                    &records,
                    config.records.top_types,
                    config.records.top_units,
                );
                eprint!("{summary}");
            }
        }
        Commands::Stats { file } => {
            let sentences = load_sentences(&file).await?;

            println!("# Sentences: {}", sentences.len());
            println!(
                "# Sentences with measurements: {}",
                sentences_with_measurements(&sentences).len()
            );
            println!("# C_VAL relations: {}", count_central_relations(&sentences));
            if let Some(mean) = mean_central_relations_per_sentence(&sentences) {
                println!("Mean C_VAL per measured sentence: {mean:.2}");
            }

            let db = AbstractsDb::new(group_abstracts(annotate(sentences, &reducer))?);
            for frequency in db.parameter_frequencies() {
                println!("{frequency}");
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pkcase={0},pkcase_extractor={0}", config.level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Reduce sentences, dropping those without a pmid
fn annotate(sentences: Vec<Sentence>, reducer: &EstimateReducer) -> Vec<AnnotatedSentence> {
    sentences
        .into_iter()
        .filter(|s| {
            if s.pmid.is_none() {
                tracing::warn!("Skipping sentence without pmid: {}", s.text);
            }
            s.pmid.is_some()
        })
        .map(|s| AnnotatedSentence::new(s, reducer))
        .collect()
}

/// Read sentence records, skipping the ones that fail validation
async fn load_sentences(path: &Path) -> anyhow::Result<Vec<Sentence>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let values: Vec<serde_json::Value> = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else {
        let mut values = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(value) => values.push(value),
                Err(e) => tracing::warn!("Skipping line {}: {}", line_no + 1, e),
            }
        }
        values
    };

    let mut sentences = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let parsed = serde_json::from_value::<SentenceRecord>(value)
            .map_err(pkcase_core::PkError::from)
            .and_then(|record| Sentence::from_record(&record));
        match parsed {
            Ok(sentence) => sentences.push(sentence),
            Err(e) => tracing::warn!("Rejecting sentence record {}: {}", index, e),
        }
    }

    tracing::info!("Loaded {} sentences from {}", sentences.len(), path.display());
    Ok(sentences)
}
