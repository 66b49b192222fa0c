use anyhow::Context;
use clap::{Parser, Subcommand};
use kw_core::{seo, EditorSession, KeywordCollection, KeywordStore};
use kw_inference::OptimizeClient;
use kw_web::cms::{CmsClient, CmsConfig};
use kw_web::optimize::{default_quotas, OptimizeService};
use kw_web::AppState;
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Keyword optimiser", long_about = None)]
pub struct Cli {
    /// Storage backend: memory, mongodb or sqlite
    #[arg(long, env = "KW_STORAGE", default_value = "memory")]
    storage: String,
    /// Connection string for the storage backend
    #[arg(long, env = "KW_BACKEND_URL")]
    backend_url: Option<String>,
    /// Timeout for outbound HTTP calls (e.g. 30s, 1m 30s)
    #[arg(long, env = "KW_TIMEOUT", default_value = "30s", value_parser = humantime::parse_duration)]
    timeout: Duration,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Print the keyword density score of a text
    Score(TextArgs),
    /// Print a text with every keyword wrapped in <mark>
    Highlight(TextArgs),
    /// Send a text to a running optimisation service
    Optimize(OptimizeArgs),
    /// Ask a running service never to optimise a text again
    Feedback {
        #[arg(long, env = "KW_API_BASE_URL", default_value = "http://localhost:3000")]
        api_url: String,
        /// Input file, or - for stdin
        input: Option<PathBuf>,
    },
    /// Publish optimised content through a running service's CMS relay
    Submit {
        #[arg(long, env = "KW_API_BASE_URL", default_value = "http://localhost:3000")]
        api_url: String,
        /// Input file, or - for stdin
        input: Option<PathBuf>,
    },
    /// Read or import keyword collections
    Keywords {
        #[command(subcommand)]
        command: KeywordCommands,
    },
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "KW_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
    /// Rewrite model: openai, deepseek or dummy
    #[arg(long, env = "KW_MODEL", default_value = "openai")]
    model: String,
    #[arg(long, env = "KW_MODEL_URL")]
    model_url: Option<String>,
    /// Model id passed to the chat endpoint (e.g. gpt-4o-mini)
    #[arg(long, env = "KW_CHAT_MODEL")]
    chat_model: Option<String>,
    #[arg(long, env = "KW_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "KW_CMS_URL", default_value = "https://your-contensis-cms-url/api/your-endpoint")]
    cms_url: String,
    #[arg(long, env = "KW_CMS_TOKEN", default_value = "", hide_env_values = true)]
    cms_token: String,
    /// Directory holding the built front-end
    #[arg(long, env = "KW_STATIC_DIR")]
    static_dir: Option<PathBuf>,
    /// Primary keywords must contain this term, secondary keywords must not
    #[arg(long, env = "KW_FOCUS_TERM")]
    focus_term: Option<String>,
    /// JSON file of keyword documents to import before serving
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct TextArgs {
    /// Comma separated keywords
    #[arg(long, short, value_delimiter = ',')]
    keywords: Vec<String>,
    /// Input file, or - for stdin
    input: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct OptimizeArgs {
    #[arg(long, env = "KW_API_BASE_URL", default_value = "http://localhost:3000")]
    api_url: String,
    /// Suggested keywords to insert into the optimised text afterwards
    #[arg(long = "add-keyword")]
    add_keywords: Vec<String>,
    /// Input file, or - for stdin
    input: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum KeywordCommands {
    /// Print every document of a collection
    List { collection: String },
    /// Import a seed file keyed by collection name
    Import { file: PathBuf },
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

async fn check_storage(storage: &Arc<dyn KeywordStore>, storage_type: &str) -> kw_core::Result<()> {
    storage.health_check().await?;
    info!("🏦 Storage backend initialized successfully (using {})", storage_type);
    Ok(())
}

async fn check_storage_with_retry(
    storage: &Arc<dyn KeywordStore>,
    storage_type: &str,
    max_retries: u32,
    timeout: Duration,
) -> kw_core::Result<()> {
    let mut retries = 0;
    let mut last_error = None;

    while retries < max_retries {
        match tokio::time::timeout(timeout, check_storage(storage, storage_type)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => last_error = Some(e),
            Err(elapsed) => {
                last_error = Some(kw_core::Error::Storage(format!(
                    "Storage health check timed out: {}",
                    elapsed
                )))
            }
        }
        retries += 1;
        if retries < max_retries {
            info!("Storage health check failed, retrying {}/{}...", retries, max_retries);
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        kw_core::Error::Storage("Storage health check failed after all retries".to_string())
    }))
}

async fn open_storage(cli: &Cli) -> anyhow::Result<Arc<dyn KeywordStore>> {
    let storage = kw_storage::create_storage(&cli.storage, cli.backend_url.as_deref()).await?;
    check_storage_with_retry(&storage, &cli.storage, 3, cli.timeout).await?;
    Ok(storage)
}

async fn serve(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    let storage = open_storage(cli).await?;

    if let Some(seed) = &args.seed {
        let imported = kw_storage::seed::import_seed_file(storage.as_ref(), seed).await?;
        info!("🌱 Imported {} keyword documents from {}", imported, seed.display());
    }

    let config = kw_inference::Config {
        api_key: args.api_key.clone(),
        model_name: Some(args.model.clone()),
        model_url: args.model_url.clone(),
        chat_model: args.chat_model.clone(),
        timeout: cli.timeout,
    };
    let model = kw_inference::create_model(Some(config)).await?;
    info!("🧠 Rewrite model initialized successfully (using {})", model.name());

    let cms = CmsClient::new(CmsConfig {
        url: args.cms_url.clone(),
        token: args.cms_token.clone(),
        timeout: cli.timeout,
    })?;

    let state = AppState {
        store: storage.clone(),
        optimizer: OptimizeService::new(
            storage,
            model,
            default_quotas(args.focus_term.as_deref()),
        ),
        cms,
        static_dir: args.static_dir.clone(),
    };
    kw_web::serve(args.bind, state).await
}

fn print_report(session: &EditorSession) {
    println!("{}", session.highlighted());
    println!();
    println!("Target SEO Score: {}%", session.target_seo_score());
    println!("Your Current SEO Score: {}%", session.seo_score());
    if !session.keywords().is_empty() {
        println!("Suggested Keywords: {}", session.keywords().join(", "));
    }
}

async fn optimize(cli: &Cli, args: &OptimizeArgs) -> anyhow::Result<()> {
    let text = read_input(args.input.as_ref())?;
    let mut session = EditorSession::new(text);
    let client = OptimizeClient::new(&args.api_url, cli.timeout)?;

    match client.optimize(session.content()).await {
        Ok(response) => session.apply_response(response),
        Err(e) => tracing::error!("Error fetching keywords: {}", e),
    }

    for keyword in &args.add_keywords {
        session.add_keyword(keyword);
    }

    print_report(&session);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match &cli.command {
        Commands::Serve(args) => serve(&cli, args).await?,
        Commands::Score(args) => {
            let text = read_input(args.input.as_ref())?;
            println!("{}", seo::seo_score(&text, &args.keywords));
        }
        Commands::Highlight(args) => {
            let text = read_input(args.input.as_ref())?;
            println!("{}", seo::highlight(&text, &args.keywords));
        }
        Commands::Optimize(args) => optimize(&cli, args).await?,
        Commands::Feedback { api_url, input } => {
            let text = read_input(input.as_ref())?;
            let client = OptimizeClient::new(api_url, cli.timeout)?;
            let response = client.feedback(&text).await?;
            println!("{}", response["message"].as_str().unwrap_or_default());
        }
        Commands::Submit { api_url, input } => {
            let content = read_input(input.as_ref())?;
            let client = OptimizeClient::new(api_url, cli.timeout)?;
            let response = client.submit(&content).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Keywords { command } => {
            let storage = open_storage(&cli).await?;
            match command {
                KeywordCommands::List { collection } => {
                    let collection: KeywordCollection = collection.parse()?;
                    let documents = storage.list_documents(collection).await?;
                    println!("{}", serde_json::to_string_pretty(&documents)?);
                }
                KeywordCommands::Import { file } => {
                    let imported = kw_storage::seed::import_seed_file(storage.as_ref(), file).await?;
                    info!("🌱 Imported {} keyword documents", imported);
                }
            }
        }
    }

    Ok(())
}
