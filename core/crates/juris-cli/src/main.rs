//! Juris CLI - Legal document debugging from the command line
//!
//! Wraps the three library entry points: build a theorem store from
//! caselaw directories, check a document against it like a debugger, and
//! query the corpus directly.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use juris_core::bulk::{BulkProcessingConfig, CaselawBulkProcessor};
use juris_core::checker::{DebugReport, DocumentConsistencyChecker};
use juris_core::deontic::DeonticOperator;
use juris_core::store::{ConflictSeverity, StoreConfig, StoreSnapshot, TemporalDeonticRagStore};

#[derive(Parser)]
#[command(name = "juris")]
#[command(version)]
#[command(about = "Temporal deontic logic engine: debug legal documents against caselaw")]
#[command(long_about = "
Treats legal documents as source code and legal precedents as a rule base.
Ingest caselaw corpora into a theorem store, then check new documents for
logical conflicts and temporal violations the way a compiler reports type
errors.
")]
struct Cli {
    /// Verbose output (sets RUST_LOG=debug when unset)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk-process caselaw directories into a unified theorem store
    Ingest {
        /// Directories containing caselaw documents
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// Output directory for the unified system
        #[arg(short = 'o', long = "output", default_value = "unified_deontic_logic_system")]
        output: PathBuf,

        /// Maximum concurrent documents
        #[arg(short = 'j', long = "jobs", default_value = "5")]
        jobs: usize,

        /// Minimum precedent strength to ingest
        #[arg(long = "min-strength", default_value = "0.5")]
        min_strength: f64,

        /// Skip content-hash duplicate detection
        #[arg(long = "no-dedup")]
        no_dedup: bool,

        /// Skip the validation phase
        #[arg(long = "no-validation")]
        no_validation: bool,
    },
    /// Check a document against an ingested theorem store
    Check {
        /// Document file, or '-' for stdin
        file: PathBuf,

        /// Path to unified_rag_store.json
        #[arg(short = 's', long = "store")]
        store: PathBuf,

        /// Temporal context (ISO date, defaults to now)
        #[arg(short = 't', long = "date")]
        date: Option<String>,

        /// Jurisdiction filter
        #[arg(long = "jurisdiction", default_value = "Federal")]
        jurisdiction: String,

        /// Legal domain filter
        #[arg(long = "domain", default_value = "general")]
        domain: String,

        /// Output format
        #[arg(short = 'f', long = "format", default_value = "human")]
        format: OutputFormat,
    },
    /// Query the theorem corpus with free text
    Query {
        /// Natural language query
        query: String,

        /// Path to unified_rag_store.json
        #[arg(short = 's', long = "store")]
        store: PathBuf,

        /// Maximum results
        #[arg(short = 'k', long = "top-k", default_value = "10")]
        top_k: usize,

        /// Minimum relevance score
        #[arg(long = "min-score", default_value = "0.1")]
        min_score: f64,

        /// Filter by deontic operator
        #[arg(long = "operator")]
        operator: Option<OperatorFilter>,

        /// Filter by jurisdiction
        #[arg(long = "jurisdiction")]
        jurisdiction: Option<String>,

        /// Filter by legal domain
        #[arg(long = "domain")]
        domain: Option<String>,
    },
    /// Show statistics for an ingested theorem store
    Stats {
        /// Path to unified_rag_store.json
        #[arg(short = 's', long = "store")]
        store: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum OperatorFilter {
    Obligation,
    Permission,
    Prohibition,
}

impl From<OperatorFilter> for DeonticOperator {
    fn from(filter: OperatorFilter) -> Self {
        match filter {
            OperatorFilter::Obligation => DeonticOperator::Obligation,
            OperatorFilter::Permission => DeonticOperator::Permission,
            OperatorFilter::Prohibition => DeonticOperator::Prohibition,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Ingest {
            directories,
            output,
            jobs,
            min_strength,
            no_dedup,
            no_validation,
        } => run_ingest(directories, output, jobs, min_strength, no_dedup, no_validation),
        Commands::Check {
            file,
            store,
            date,
            jurisdiction,
            domain,
            format,
        } => run_check(&file, &store, date.as_deref(), &jurisdiction, &domain, format),
        Commands::Query {
            query,
            store,
            top_k,
            min_score,
            operator,
            jurisdiction,
            domain,
        } => run_query(
            &query,
            &store,
            top_k,
            min_score,
            operator.map(Into::into),
            jurisdiction.as_deref(),
            domain.as_deref(),
        ),
        Commands::Stats { store } => run_stats(&store),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run_ingest(
    directories: Vec<PathBuf>,
    output: PathBuf,
    jobs: usize,
    min_strength: f64,
    no_dedup: bool,
    no_validation: bool,
) -> Result<()> {
    for directory in &directories {
        if !directory.exists() {
            bail!("caselaw directory not found: {}", directory.display());
        }
    }

    let mut config = BulkProcessingConfig::for_directories(directories);
    config.output_directory = Some(output.clone());
    config.max_concurrent_documents = jobs.max(1);
    config.min_precedent_strength = min_strength;
    config.enable_duplicate_detection = !no_dedup;
    config.enable_validation = !no_validation;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("progress template")?
            .progress_chars("=>-"),
    );
    progress.set_message("extracting theorems");
    let bar = progress.clone();

    let mut processor = CaselawBulkProcessor::new(config).with_progress(Box::new(
        move |completed, total| {
            bar.set_length(total as u64);
            bar.set_position(completed as u64);
        },
    ));

    let stats = processor.process().context("bulk processing failed")?;
    progress.finish_and_clear();

    println!("{}", "Ingestion complete".green().bold());
    println!("  documents discovered: {}", stats.total_documents);
    println!("  documents processed:  {}", stats.processed_documents);
    println!("  theorems extracted:   {}", stats.extracted_theorems);
    println!("  processing errors:    {}", stats.processing_errors);
    println!("  success rate:         {:.1}%", stats.success_rate * 100.0);
    println!(
        "  jurisdictions:        {}",
        stats
            .jurisdictions_processed
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    if stats.embedding_degraded {
        println!(
            "  {}",
            "embedding provider degraded during the run; lexical fallback used".yellow()
        );
    }
    println!("  output: {}", output.display());
    Ok(())
}

fn load_store(path: &Path) -> Result<TemporalDeonticRagStore> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read store file {}", path.display()))?;
    let snapshot = StoreSnapshot::from_json(&raw)
        .with_context(|| format!("malformed store file {}", path.display()))?;
    Ok(snapshot.into_store(StoreConfig::default())?)
}

fn parse_context_date(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                return Ok(dt.with_timezone(&Utc));
            }
            let naive = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("unparseable date '{raw}', expected ISO 8601"))?;
            Ok(Utc.from_utc_datetime(&naive.and_hms_opt(0, 0, 0).expect("midnight exists")))
        }
    }
}

fn run_check(
    file: &Path,
    store_path: &Path,
    date: Option<&str>,
    jurisdiction: &str,
    domain: &str,
    format: OutputFormat,
) -> Result<()> {
    let (text, document_id) = if file == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading stdin")?;
        (buffer, format!("doc_{}", Uuid::new_v4()))
    } else {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("cannot read document {}", file.display()))?;
        let id = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        (text, id)
    };

    let temporal_context = parse_context_date(date)?;
    let store = std::sync::Arc::new(std::sync::RwLock::new(load_store(store_path)?));
    let checker = DocumentConsistencyChecker::new(store);

    let analysis = checker.check_document(&text, &document_id, temporal_context, jurisdiction, domain);
    let report = checker.generate_debug_report(&analysis);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Human => {
            print_human_report(&report, analysis.confidence_score);
        }
    }

    if !analysis.consistency_result.is_consistent {
        std::process::exit(1);
    }
    Ok(())
}

fn print_human_report(report: &DebugReport, confidence: f64) {
    println!("{}", "Legal debug report".bold());
    println!("{}", report.summary);
    println!("confidence score: {confidence:.2}");
    println!();

    for issue in &report.issues {
        let severity = match issue.severity {
            ConflictSeverity::Critical => "critical".red().bold(),
            ConflictSeverity::High => "high".red(),
            ConflictSeverity::Medium => "medium".yellow(),
            ConflictSeverity::Low => "low".cyan(),
        };
        println!("[{severity}] {}: {}", issue.category.as_str(), issue.message);
        println!("    fix: {}", issue.suggestion.dimmed());
    }

    if report.issues.is_empty() {
        println!("{}", "no issues found".green());
    }
}

fn run_query(
    query: &str,
    store_path: &Path,
    top_k: usize,
    min_score: f64,
    operator: Option<DeonticOperator>,
    jurisdiction: Option<&str>,
    domain: Option<&str>,
) -> Result<()> {
    let store = load_store(store_path)?;
    let results = store.query_similar_theorems(query, top_k, min_score, operator, jurisdiction, domain)?;

    if results.is_empty() {
        println!("no theorems matched '{query}'");
        return Ok(());
    }

    println!("{} result(s) for '{query}'", results.len());
    for (score, theorem) in results {
        println!(
            "{} {} [{}] {} ({}, {})",
            format!("{score:.3}").cyan(),
            theorem.formula.operator.symbol().bold(),
            theorem.theorem_id,
            theorem.formula.proposition,
            theorem.jurisdiction,
            theorem.source_case
        );
    }
    Ok(())
}

fn run_stats(store_path: &Path) -> Result<()> {
    let store = load_store(store_path)?;
    let stats = store.get_statistics();

    println!("{}", "Theorem store statistics".bold());
    println!("  total theorems:         {}", stats.total_theorems);
    println!("  jurisdictions:          {}", stats.jurisdictions);
    println!("  legal domains:          {}", stats.legal_domains);
    println!(
        "  avg precedent strength: {:.3}",
        stats.avg_precedent_strength
    );
    println!("  embedding-backed:       {}", stats.embedding_backed);
    Ok(())
}
