use std::path::PathBuf;

use annotator_core::models::{Dataset, Datasets, Records};
use annotator_core::repositories::RecordQuery;
use annotator_core::tracing_setup::init_tracing_with_default;
use annotator_core::{CoreConfig, SessionContext};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "annotator-cli")]
#[command(about = "Command-line client for the annotation backend")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file (apiUrl, apiKey, dataDir, ...)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Backend URL, overrides config and ANNOTATOR_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Directory holding preferences.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your datasets grouped by workspace
    Datasets,

    /// Your annotation metrics on a dataset
    Metrics { dataset_id: String },

    /// Team progress on a dataset
    Progress { dataset_id: String },

    /// Records waiting for your response
    Records {
        dataset_id: String,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Show or replace the annotation guidelines of a dataset
    Guidelines {
        dataset_id: String,
        /// New guidelines text
        #[arg(long)]
        set: Option<String>,
    },

    /// Delete a dataset
    Delete { dataset_id: String },

    /// Show or store a panel position preference
    Layout {
        panel: String,
        position: Option<f64>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing_with_default("warn");
    let cli = Cli::parse();

    let result = match load_config(&cli) {
        Ok(config) => run(&cli, config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Priority: flags > environment > config file > defaults
fn load_config(cli: &Cli) -> Result<CoreConfig> {
    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    let mut config = config.with_overrides(|name| std::env::var(name).ok());
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

async fn run(cli: &Cli, config: CoreConfig) -> Result<()> {
    let ctx = SessionContext::connect(config).context("Failed to create session")?;

    let output = match &cli.command {
        Commands::Datasets => {
            let vm = ctx.datasets_view_model();
            let loaded = vm.load().await;
            flush_notifications(&ctx);
            loaded?;
            datasets_json(&vm.datasets(), |id| {
                vm.workspaces().name_of(id).map(|n| n.to_string())
            })
        }
        Commands::Metrics { dataset_id } => {
            let metrics = ctx.get_user_metrics().execute(dataset_id).await?;
            json!({
                "datasetId": metrics.dataset_id,
                "records": metrics.records,
                "submitted": metrics.submitted,
                "discarded": metrics.discarded,
                "draft": metrics.draft,
                "pending": metrics.pending(),
                "progress": metrics.progress(),
            })
        }
        Commands::Progress { dataset_id } => {
            let progress = ctx.get_team_progress().execute(dataset_id).await?;
            json!({
                "datasetId": progress.dataset_id,
                "total": progress.total,
                "completed": progress.completed,
                "pending": progress.pending,
                "completedFraction": progress.completed_fraction(),
            })
        }
        Commands::Records {
            dataset_id,
            offset,
            limit,
        } => {
            let query = RecordQuery {
                offset: *offset,
                limit: *limit,
                ..RecordQuery::default()
            };
            let records = ctx.load_records().execute(dataset_id, query).await?;
            records_json(&records)
        }
        Commands::Guidelines { dataset_id, set } => {
            let vm = ctx.settings_view_model();
            let loaded = vm.load(dataset_id).await;
            if loaded.is_ok() {
                if let Some(text) = set {
                    vm.edit_guidelines(text.clone());
                    // Failure is reported through the notifications below
                    let _ = vm.save().await;
                }
            }
            flush_notifications(&ctx);
            loaded?;
            let setting = vm.setting();
            json!({
                "datasetId": setting.dataset_id(),
                "guidelines": setting.guidelines.saved(),
                "modified": setting.is_modified(),
            })
        }
        Commands::Delete { dataset_id } => {
            let vm = ctx.datasets_view_model();
            let deleted = vm.delete(dataset_id).await;
            flush_notifications(&ctx);
            deleted?;
            json!({ "deleted": dataset_id })
        }
        Commands::Layout { panel, position } => {
            let layout = ctx.layout_view_model();
            if let Some(position) = position {
                layout.set_position(panel, *position)?;
                layout.flush();
            }
            json!({ "panel": panel, "position": layout.position(panel) })
        }
    };

    print_json(&output, cli.pretty)
}

fn dataset_json(dataset: &Dataset) -> Value {
    json!({
        "id": dataset.id,
        "name": dataset.name,
        "status": if dataset.is_ready() { "ready" } else { "draft" },
        "hasGuidelines": dataset.has_guidelines(),
        "lastActivity": dataset.last_activity().map(|t| t.to_rfc3339()),
    })
}

fn datasets_json(datasets: &Datasets, workspace_name: impl Fn(&str) -> Option<String>) -> Value {
    let workspaces: Vec<Value> = datasets
        .by_workspace()
        .into_iter()
        .map(|(workspace_id, items)| {
            json!({
                "workspaceId": workspace_id,
                "workspace": workspace_name(workspace_id),
                "datasets": items.into_iter().map(dataset_json).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "total": datasets.len(), "workspaces": workspaces })
}

fn records_json(records: &Records) -> Value {
    let items: Vec<Value> = records
        .items
        .iter()
        .map(|record| {
            json!({
                "id": record.id,
                "status": record.status.as_str(),
                "fields": record
                    .fields
                    .iter()
                    .map(|f| (f.name.clone(), Value::String(f.content.clone())))
                    .collect::<serde_json::Map<_, _>>(),
                "questions": record.questions.iter().map(|q| json!({
                    "name": q.name,
                    "type": q.settings.kind(),
                    "required": q.required,
                    "answer": q.answer.as_ref().map(|a| a.to_json()),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "total": records.total, "items": items })
}

fn flush_notifications(ctx: &SessionContext) {
    for notification in ctx.notifications().lock().drain() {
        eprintln!("[{:?}] {}", notification.level, notification.message);
    }
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
