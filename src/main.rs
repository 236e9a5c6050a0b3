use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use larder_core::FoodGateway;
use larder_core::config::Config;
use larder_core::food::{ImageMime, InventoryLine, Location};
use larder_core::plan::MealPlanRecord;
use larder_core::vault::{EnvVault, redact_userinfo};
use larder_llm::LlmProvider;
use larder_llm::any::AnyProvider;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Parser)]
#[command(name = "larder", version, about = "Detect food in photos and plan meals with a local or hosted LLM")]
struct Cli {
    /// Config file (falls back to LARDER_CONFIG, then config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect food items in a photo of a pantry, fridge or freezer
    Detect {
        image: PathBuf,
        #[arg(long, default_value_t = Location::Fridge)]
        location: Location,
        /// Image type; guessed from the file extension when omitted
        #[arg(long)]
        mime: Option<ImageMime>,
        /// Print the raw model reply and extraction outcome as well
        #[arg(long)]
        raw: bool,
    },
    /// Generate a 7-day meal plan from a JSON inventory file
    Plan {
        inventory: PathBuf,
        #[arg(long)]
        raw: bool,
    },
    /// Show the resolved backend and check that it is usable
    Check,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    config.validate()?;
    config.resolve_secrets(&EnvVault).await?;

    match cli.command {
        Command::Detect {
            image,
            location,
            mime,
            raw,
        } => detect(&config, &image, location, mime, raw).await,
        Command::Plan { inventory, raw } => plan(&config, &inventory, raw).await,
        Command::Check => check(&config).await,
        Command::Config => print_config(&config),
    }
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("LARDER_CONFIG")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Run `fut` under the configured LLM deadline.
async fn with_deadline<T, F>(config: &Config, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = Result<T, larder_core::GatewayError>>,
{
    let secs = config.timeouts.llm_seconds;
    let result = tokio::time::timeout(Duration::from_secs(secs), fut)
        .await
        .map_err(|_| anyhow!("LLM request timed out after {secs}s"))?;
    Ok(result?)
}

async fn detect(
    config: &Config,
    image: &Path,
    location: Location,
    mime: Option<ImageMime>,
    raw: bool,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read image {}", image.display()))?;
    let mime = mime.unwrap_or_else(|| ImageMime::from_path(image));

    let gateway = FoodGateway::new(config)?;
    let detection = with_deadline(config, gateway.detect_items(&bytes, mime, location)).await?;

    let out = if raw {
        serde_json::to_string_pretty(&detection)?
    } else {
        serde_json::to_string_pretty(&detection.items)?
    };
    println!("{out}");
    eprintln!("{}", detection.summary());
    Ok(())
}

async fn read_inventory(path: &Path) -> anyhow::Result<Vec<InventoryLine>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read inventory {}", path.display()))?;
    serde_json::from_str(&content).context("inventory must be a JSON array of items")
}

async fn plan(config: &Config, inventory: &Path, raw: bool) -> anyhow::Result<()> {
    let lines = read_inventory(inventory).await?;

    let gateway = FoodGateway::new(config)?;
    let generation = with_deadline(config, gateway.generate_meal_plan(&lines)).await?;

    if generation.plan.is_empty() {
        tracing::warn!(
            outcome = ?generation.outcome,
            "model reply did not contain a usable meal plan"
        );
    }
    if raw {
        eprintln!("{}", generation.raw_response);
    }
    let record = MealPlanRecord::generated_now(generation.plan);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn check(config: &Config) -> anyhow::Result<()> {
    let gateway = FoodGateway::new(config)?;
    let settings = gateway.settings();
    println!("provider: {}", settings.kind);

    match gateway.backend().await? {
        AnyProvider::Ollama(ollama) => {
            println!("base url: {}", ollama.base_url());
            println!("text model: {}", ollama.text_model());
            println!("vision model: {}", ollama.vision_model());
            ollama.health_check().await?;
            println!("ollama is reachable");
            let missing = ollama.missing_models().await?;
            if missing.is_empty() {
                println!("all models are available");
            }
            for model in missing {
                println!("missing model: {model} (run `ollama pull {model}`)");
            }
        }
        AnyProvider::Claude(claude) => {
            println!("model: {}", claude.model());
            println!("api key: set");
        }
        #[allow(unreachable_patterns)]
        other => println!("backend: {}", other.name()),
    }
    Ok(())
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", render_config(config)?);
    let key_state = if config.secrets.claude_api_key.is_some() {
        "set"
    } else {
        "unset"
    };
    println!("# claude api key: {key_state}");
    Ok(())
}

fn render_config(config: &Config) -> anyhow::Result<String> {
    let mut value = toml::Value::try_from(config).context("failed to render config")?;
    if let Some(url) = value
        .get_mut("llm")
        .and_then(|llm| llm.get_mut("ollama"))
        .and_then(|ollama| ollama.get_mut("base_url"))
        && let Some(redacted) = url.as_str().map(|s| redact_userinfo(s).into_owned())
    {
        *url = toml::Value::String(redacted);
    }
    toml::to_string_pretty(&value).context("failed to render config")
}
