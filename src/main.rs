use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio_util::sync::CancellationToken;

use roundup_rs::config::RunnerConfig;
use roundup_rs::llm::gemini::GeminiModel;
use roundup_rs::llm::openai::OpenAiModel;
use roundup_rs::llm::{Model, OfflineModel};
use roundup_rs::store::TaskStore;
use roundup_rs::workflow::graph::Workflow;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The user query to route, e.g. "fetch all compliance tasks"
    #[arg(short, long)]
    query: String,

    /// Application id the reports are fetched for
    #[arg(short, long)]
    app_id: String,

    /// Path to a runner configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store file override
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Model name override, e.g. "gpt-4o" or "gemini-1.5-flash"
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };

    let model_name = args
        .model
        .clone()
        .or_else(|| config.model.name.clone())
        .unwrap_or_else(|| "gemini-1.5-flash".to_string());
    let model = build_model(&config, &model_name);

    let store_path = args
        .store
        .clone()
        .unwrap_or_else(|| config.store.path.clone());
    let store = Arc::new(TaskStore::new(&store_path));
    let sources = config.sources.build()?;

    let workflow = Workflow::new(model, sources, store);

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    // Graceful shutdown on Ctrl-C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        log::info!("Cancelling workflow...");
        cancel_clone.cancel();
    });

    let state = workflow
        .run_query(&args.query, &args.app_id, &cancel)
        .await?;

    let total = state
        .all_items
        .as_deref()
        .map(|items| items.len())
        .unwrap_or(0);
    println!("{}", state.final_summary.unwrap_or_default());
    println!();
    println!("{} task items in {}", total, store_path.display());

    Ok(())
}

/// Pick a model from the provider configuration. When the selected provider
/// has no API key, the run still works: the offline model makes every
/// model-backed step take its deterministic fallback.
fn build_model(config: &RunnerConfig, model_name: &str) -> Arc<dyn Model> {
    let provider = std::env::var("MODEL_PROVIDER")
        .ok()
        .or_else(|| config.model.provider.clone())
        .unwrap_or_else(|| {
            if model_name.starts_with("gpt") {
                "OpenAI".to_string()
            } else {
                "Gemini".to_string()
            }
        });

    log::info!("Using provider: {} with model: {}", provider, model_name);

    let built = match provider.as_str() {
        "OpenAI" | "openai" => OpenAiModel::new(model_name).map(|m| Arc::new(m) as Arc<dyn Model>),
        "Offline" | "offline" => Ok(Arc::new(OfflineModel) as Arc<dyn Model>),
        _ => GeminiModel::new(model_name).map(|m| Arc::new(m) as Arc<dyn Model>),
    };

    match built {
        Ok(model) => model,
        Err(e) => {
            log::warn!("{}; running with deterministic fallbacks only", e);
            Arc::new(OfflineModel)
        }
    }
}
