use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use maa_copilot::api::{OperationSource, PrtsClient};
use maa_copilot::config::Config;
use maa_copilot::maa::Operation;
use maa_copilot::reconcile::loader::{load_editor_json, load_editor_operation, load_operation};
use maa_copilot::reconcile::{to_editor_operation_with, to_maa_operation};
use maa_copilot::rounds::import::parse_round_import;
use maa_copilot::rounds::mapper::editor_actions_to_round_actions;
use maa_copilot::schema::validate;
use maa_copilot::siming::builder::build_siming_graph;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the compact export variant (no minimum_required / groups)
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a wire operation into editor JSON (camelCase, with ids)
    Hydrate {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Convert editor JSON back into a wire operation
    Dehydrate {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Load a wire operation loosely and write it back normalized
    Normalize {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Run strict validation; exits with status 1 when issues are found
    Validate {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Build the siming action graph for a wire operation
    Siming {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Convert round-action JSON into a wire operation
    Rounds {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Fetch an operation from the remote site and normalize it
    Fetch {
        /// Operation id
        id: String,
    },
}

fn print_operation(operation: &Operation, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string_pretty(&operation.to_compact_json()?)?
    } else {
        operation.to_json_string()?
    };
    println!("{}", text);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let level = config
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let options = config.reconcile_options();

    match cli.command {
        Commands::Hydrate { file } => {
            let editor = load_editor_operation(&file, &options)?;
            println!("{}", serde_json::to_string_pretty(&editor.to_json()?)?);
        }

        Commands::Dehydrate { file } => {
            let editor = load_editor_json(&file)?;
            print_operation(&to_maa_operation(&editor), cli.compact)?;
        }

        Commands::Normalize { file } => {
            let wire = load_operation(&file)?;
            let editor = to_editor_operation_with(&wire, &options);
            print_operation(&to_maa_operation(&editor), cli.compact)?;
        }

        Commands::Validate { file } => {
            let wire = load_operation(&file)?;
            let issues = validate(&wire);
            if issues.is_empty() {
                info!("{} passed validation", file.display());
                return Ok(());
            }
            for issue in &issues {
                println!("{}", issue);
            }
            warn!(count = issues.len(), "Validation failed");
            std::process::exit(1);
        }

        Commands::Siming { file } => {
            let wire = load_operation(&file)?;
            let editor = to_editor_operation_with(&wire, &options);
            let graph = match (&editor.siming_actions, editor.actions.is_empty()) {
                (Some(graph), true) => graph.clone(),
                _ => {
                    let model = editor_actions_to_round_actions(&editor.actions);
                    build_siming_graph(&model, &editor.action_delays)
                }
            };
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }

        Commands::Rounds { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read round actions from {}", file.display()))?;
            let import = parse_round_import(&raw)
                .with_context(|| format!("Failed to parse round actions from {}", file.display()))?;
            let editor = import.into_editor_operation(&options.mapper);
            print_operation(&to_maa_operation(&editor), cli.compact)?;
        }

        Commands::Fetch { id } => {
            let client = PrtsClient::new(&config.api)?;
            let wire = client
                .fetch_operation(&id)
                .await
                .with_context(|| format!("Failed to fetch operation {}", id))?;
            let editor = to_editor_operation_with(&wire, &options);
            print_operation(&to_maa_operation(&editor), cli.compact)?;
        }
    }

    Ok(())
}
