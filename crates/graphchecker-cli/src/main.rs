//! CLI binary for grading graph submissions and inspecting check metadata.
//!
//! Standard output carries only the requested JSON (or the validation
//! listing); logs go to standard error.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use graphchecker_grading::{
    available_checks, builtin, load_ui_params, validate, Grader, GraderConfig, LayoutKind,
    Severity, BUILTIN_TYPES,
};
use graphchecker_types::parse_check_list;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphchecker", version, about = "Automated grading of graph-drawing answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the check metadata
    #[arg(long, global = true, env = "GRAPHCHECKER_CHECKS_DIR", default_value = "checks")]
    checks_dir: PathBuf,

    /// Metadata layout: `per_type` (one subdirectory per type) or `shared`
    #[arg(long, global = true, env = "GRAPHCHECKER_LAYOUT", default_value = "per_type")]
    layout: LayoutKind,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a submission and print the report as JSON
    Grade {
        /// Question type (e.g. undirected, directed)
        #[arg(long = "type")]
        question_type: String,

        /// Path to the JSON check list
        #[arg(long)]
        checks: PathBuf,

        /// Path to the submitted diagram; omit for an empty answer
        #[arg(long)]
        submission: Option<PathBuf>,
    },

    /// List the checks available for a question type
    Checks {
        #[arg(long = "type")]
        question_type: String,
    },

    /// Print the UI parameters of a question type
    Params {
        #[arg(long = "type")]
        question_type: String,
    },

    /// Lint a check list against the metadata of a question type
    Validate {
        #[arg(long = "type")]
        question_type: String,

        /// Path to the JSON check list
        #[arg(long)]
        checks: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = GraderConfig::new(cli.checks_dir, cli.layout);

    match cli.command {
        Commands::Grade {
            question_type,
            checks,
            submission,
        } => cmd_grade(&config, &question_type, &checks, submission.as_deref()),
        Commands::Checks { question_type } => cmd_checks(&config, &question_type),
        Commands::Params { question_type } => cmd_params(&config, &question_type),
        Commands::Validate {
            question_type,
            checks,
        } => cmd_validate(&config, &question_type, &checks),
    }
}

fn load_grader(
    config: &GraderConfig,
    question_type: &str,
) -> anyhow::Result<Grader<graphchecker_grading::Graph>> {
    let question = builtin(question_type).with_context(|| {
        format!(
            "Unknown question type '{question_type}' (available: {})",
            BUILTIN_TYPES.join(", ")
        )
    })?;
    let grader = Grader::from_config(question, config).with_context(|| {
        format!(
            "Failed to load check metadata from {}",
            config.check_layout().type_dir(question_type).display()
        )
    })?;
    Ok(grader)
}

fn read_to_string(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn cmd_grade(
    config: &GraderConfig,
    question_type: &str,
    checks: &Path,
    submission: Option<&Path>,
) -> anyhow::Result<()> {
    let grader = load_grader(config, question_type)?;
    let specs = parse_check_list(&read_to_string(checks)?)?;

    let submission = match submission {
        Some(path) if path.exists() => Some(read_to_string(path)?),
        Some(path) => {
            tracing::warn!(path = %path.display(), "submission file not found, grading an empty answer");
            None
        }
        None => None,
    };

    let report = grader.grade(submission.as_deref(), &specs);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_checks(config: &GraderConfig, question_type: &str) -> anyhow::Result<()> {
    let modules = available_checks(&config.check_layout(), question_type)
        .with_context(|| format!("Failed to list checks for '{question_type}'"))?;
    println!("{}", serde_json::to_string_pretty(&modules)?);
    Ok(())
}

fn cmd_params(config: &GraderConfig, question_type: &str) -> anyhow::Result<()> {
    let mut params = load_ui_params(&config.check_layout(), question_type)?;

    // Let the editor highlight and colour freely when trying questions out.
    params.insert("highlight_vertices".into(), true.into());
    params.insert("highlight_edges".into(), true.into());
    params.insert(
        "vertex_colors".into(),
        serde_json::json!(["black", "red", "blue", "green", "yellow", "orange", "purple", "white"]),
    );

    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

fn cmd_validate(config: &GraderConfig, question_type: &str, checks: &Path) -> anyhow::Result<()> {
    let grader = load_grader(config, question_type)?;
    let specs = parse_check_list(&read_to_string(checks)?)?;
    let diagnostics = validate(&specs, grader.catalog(), grader.question().checks());

    if diagnostics.is_empty() {
        println!("Check list is valid");
        return Ok(());
    }

    let mut has_error = false;
    for diag in &diagnostics {
        let severity = match diag.severity {
            Severity::Error => {
                has_error = true;
                "ERROR"
            }
            Severity::Warning => "WARN",
        };
        println!("[{}] {}: {}", severity, diag.rule, diag.message);
        if let Some(fix) = &diag.fix {
            println!("        fix: {fix}");
        }
    }

    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
