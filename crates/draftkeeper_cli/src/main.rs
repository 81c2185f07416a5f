//! Command-line client for the Draftkeeper API.

mod client;
mod watch;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use client::{normalize_server, ApiClient};
use draftkeeper_core::{AutosaveOptions, Config, DEFAULT_CLI_SERVER_URL};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use watch::{run_watch, WatchArgs};

#[derive(Parser)]
#[command(name = "dkeep", about = "Draftkeeper CLI", version)]
struct Cli {
    /// Server URL (can also be set via DK_SERVER env var)
    #[arg(short, long, env = "DK_SERVER")]
    server: Option<String>,

    /// Edit-lock owner id sent with writes (defaults to a random id for `watch`)
    #[arg(long, env = "DK_OWNER", global = true)]
    owner: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print a document's content
    Get { id: String },
    /// Write a document from a file or stdin
    Put {
        id: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List documents, most recently updated first
    List {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Autosave a local file to a document until Ctrl-C
    Watch {
        id: String,
        #[arg(short, long)]
        file: PathBuf,
        /// How often to check the file for changes
        #[arg(long, default_value = "250")]
        poll_ms: u64,
        /// Quiet period before saving (defaults to AUTO_SAVE_INTERVAL)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn resolve_server(server: Option<String>) -> String {
    server
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn watch_options(config: &Config, debounce_ms: Option<u64>) -> AutosaveOptions {
    let options = AutosaveOptions::from_config(config);
    match debounce_ms {
        Some(ms) => options.with_debounce(Duration::from_millis(ms)),
        None => options,
    }
}

fn exit_with(action: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{} failed: {}", action, err);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        owner,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    let server = normalize_server(resolve_server(server));

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Get { id } => {
            let client = ApiClient::new(http, server, owner);
            let document = match client.get_document(&id).await {
                Ok(Some(document)) => document,
                Ok(None) => exit_with("Get", format!("document '{}' not found", id)),
                Err(err) => exit_with("Get", err),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                println!("{}", document.content);
            }
        }
        Commands::Put { id, file } => {
            let content = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let client = ApiClient::new(http, server, owner);
            let document = client
                .put_document(&id, content)
                .await
                .unwrap_or_else(|err| exit_with("Put", err));
            if json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                println!("Saved: {} (revision {})", document.id, document.revision);
            }
        }
        Commands::List { limit } => {
            let client = ApiClient::new(http, server, owner);
            let items = client
                .list_documents(limit)
                .await
                .unwrap_or_else(|err| exit_with("List", err));
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for item in items {
                    println!(
                        "{:<40} r{:<6} {:>8} B  {}",
                        item.id,
                        item.revision,
                        item.content_len,
                        item.updated_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
        }
        Commands::Watch {
            id,
            file,
            poll_ms,
            debounce_ms,
        } => {
            let owner = owner.unwrap_or_else(|| format!("dkeep-{}", uuid::Uuid::new_v4()));
            let client = ApiClient::new(http, server, Some(owner));
            let args = WatchArgs {
                id,
                file,
                poll: Duration::from_millis(poll_ms.max(10)),
                options: watch_options(&Config::from_env(), debounce_ms),
                json,
            };
            let shutdown = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::warn!("failed to listen for Ctrl-C: {}", err);
                    std::future::pending::<()>().await;
                }
            };
            if let Err(err) = run_watch(client, args, shutdown).await {
                exit_with("Watch", err);
            }
        }
    }

    Ok(())
}
