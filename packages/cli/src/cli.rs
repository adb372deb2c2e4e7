//! Command-line interface for annexiv.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use annexiv_engine::{AssembledSections, Evaluation, ExpectedCounts};
use annexiv_store::{StoreError, DEFAULT_REGULATION_REF};

use crate::error::{CliError, Result};
use crate::scaffold::{save_scaffold, scaffold_version, DEFAULT_SCAFFOLD_PATH};
use crate::store::with_store;
use crate::validate::Document;

/// Annex IV - Validate and scaffold EU AI Act technical documentation.
#[derive(Parser)]
#[command(name = "annexiv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a filled Annex IV YAML document; exit 1 on violations.
    Validate {
        /// Your filled Annex IV YAML
        #[arg(short, long)]
        input: PathBuf,

        /// Write a SARIF report to this file when violations are found
        #[arg(long)]
        sarif: Option<PathBuf>,

        /// Check subpoint counts against the regulation in the database
        #[arg(long)]
        use_db: bool,

        /// Database URL (default: $DATABASE_URL); implies --use-db
        #[arg(long)]
        db_url: Option<String>,

        /// CELEX number of the regulation
        #[arg(long, default_value = DEFAULT_REGULATION_REF)]
        regulation: String,
    },

    /// Assemble the Annex IV text from the database into a YAML scaffold.
    Assemble {
        /// CELEX number of the regulation
        #[arg(long, default_value = DEFAULT_REGULATION_REF)]
        regulation: String,

        /// Database URL (default: $DATABASE_URL)
        #[arg(long)]
        db_url: Option<String>,

        /// Output file
        #[arg(short, long, default_value = DEFAULT_SCAFFOLD_PATH)]
        output: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            input,
            sarif,
            use_db,
            db_url,
            regulation,
        } => {
            let db = (use_db || db_url.is_some()).then(|| (db_url.as_deref(), regulation.as_str()));
            validate_command(&input, sarif.as_deref(), db)
        }
        Commands::Assemble {
            regulation,
            db_url,
            output,
        } => assemble_command(&regulation, db_url.as_deref(), &output),
    }
}

/// Execute the validate command.
fn validate_command(
    input: &Path,
    sarif: Option<&Path>,
    db: Option<(Option<&str>, &str)>,
) -> Result<()> {
    let document = Document::read(input)?;

    let expected = match db {
        Some((db_url, regulation)) => Some(fetch_expected_counts(db_url, regulation)?),
        None => None,
    };

    let evaluation = document.evaluate(expected.as_ref());

    if let Some(out) = sarif {
        if !evaluation.violations.is_empty() {
            document.write_sarif(&evaluation.violations, out)?;
        }
    }

    report(&evaluation);

    if !evaluation.passed() {
        return Err(CliError::ValidationFailed {
            violations: evaluation.violations.len(),
        });
    }

    println!("{}", style("Validation OK!").green());
    Ok(())
}

fn fetch_expected_counts(db_url: Option<&str>, regulation: &str) -> Result<ExpectedCounts> {
    with_store(db_url, |store| async move {
        let counts = store.expected_top_counts(regulation).await;
        (store, counts)
    })
}

/// Print warnings to stdout and violations to stderr.
fn report(evaluation: &Evaluation) {
    for w in &evaluation.warnings {
        println!("{} {}: {}", style("[WARNING]").yellow(), w.rule, w.msg);
    }
    for v in &evaluation.violations {
        eprintln!("{} {}: {}", style("[VALIDATION]").red(), v.rule, v.msg);
    }
}

/// Execute the assemble command.
fn assemble_command(regulation: &str, db_url: Option<&str>, output: &Path) -> Result<()> {
    println!(
        "{} Annex IV of {}",
        style("Assembling").bold(),
        style(regulation).cyan()
    );
    println!();

    // Create progress spinner
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Loading section rows...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let (sections, version) = match load_sections(db_url, regulation) {
        Ok(loaded) => loaded,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving YAML...");
    let version = scaffold_version(&version);
    if let Err(e) = save_scaffold(&sections, &version, output) {
        pb.finish_and_clear();
        return Err(e);
    }
    pb.finish_and_clear();

    println!(
        "  Sections: {}/{}",
        sections.filled_count(),
        sections.iter().count()
    );
    println!("  Schema version: {}", style(&version).green());
    println!();
    println!(
        "{} {}",
        style("Schema written to:").green().bold(),
        output.display()
    );

    Ok(())
}

fn load_sections(db_url: Option<&str>, regulation: &str) -> Result<(AssembledSections, String)> {
    with_store(db_url, |store| async move {
        let loaded = async {
            let sections = store.load_annex(regulation).await?;
            let version = store.schema_version(regulation).await?;
            Ok::<_, StoreError>((sections, version))
        }
        .await;
        (store, loaded)
    })
}
