//! Holocron Command Line Interface
//!
//! Browses the catalog through a running holocron-web proxy.
//!
//! # Usage
//!
//! ```bash
//! # List the second page of people matching "sky"
//! holocron_cli --password DadSucks list people --page 2 --search sky
//!
//! # Show one record with every link resolved
//! holocron_cli --password DadSucks detail people 1
//!
//! # Same, in the alternate display language, as JSON
//! holocron_cli --password DadSucks -o json detail people 1 --wookiee
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use holocron::catalog::{page_count, page_window, table_headers, turn_page, Category};
use holocron::detail::{DetailRequest, DetailResolver, DetailViewer, ResolveOptions, ViewState};
use holocron::types::{display_label, CatalogPage, DetailView};
use holocron::{ClientConfig, ProxyClient};

#[derive(Parser)]
#[command(name = "holocron_cli")]
#[command(version = "0.1.0")]
#[command(about = "Browse the catalog through the holocron proxy")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Proxy base URL
    #[arg(long, global = true, env = "HOLOCRON_PROXY_URL", default_value = "http://localhost:1234/")]
    proxy_url: String,

    #[arg(long, global = true, env = "HOLOCRON_USERNAME", default_value = "Luke")]
    username: String,

    #[arg(long, global = true, env = "HOLOCRON_PASSWORD", hide_env_values = true)]
    password: String,

    /// Per-fetch timeout in seconds
    #[arg(long, global = true, env = "HOLOCRON_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    timeout: u64,

    /// Output format: json or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of a category
    List {
        /// people, planets, films, species, vehicles or starships
        category: Category,

        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Filter by name or title
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one record with its links resolved
    Detail {
        category: Category,

        id: String,

        /// Alternate display language (ignored for films)
        #[arg(long)]
        wookiee: bool,
    },
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("holocron=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match connect(&cli).await {
        Ok(client) => match cli.command {
            Commands::List {
                category,
                page,
                ref search,
            } => cmd_list(&client, category, page, search.as_deref(), cli.format).await,
            Commands::Detail {
                category,
                ref id,
                wookiee,
            } => cmd_detail(client, category, id, wookiee, cli.format, cli.timeout).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": e }));
            } else {
                eprintln!("{}: {}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn connect(cli: &Cli) -> Result<ProxyClient, String> {
    let config = ClientConfig::new(&cli.proxy_url)
        .map_err(|e| e.to_string())?
        .with_fetch_timeout(Duration::from_secs(cli.timeout.max(1)));
    let client = ProxyClient::new(&config).map_err(|e| e.to_string())?;

    let session = client
        .login(&cli.username, &cli.password)
        .await
        .map_err(|e| format!("Login failed: {e}"))?;
    Ok(client.with_session(session))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

async fn cmd_list(
    client: &ProxyClient,
    category: Category,
    page: u32,
    search: Option<&str>,
    format: OutputFormat,
) -> Result<(), String> {
    let listing = client
        .search(category, page, search)
        .await
        .map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Json => print_json(&listing),
        OutputFormat::Pretty => {
            print_listing(category, page, &listing);
            Ok(())
        }
    }
}

async fn cmd_detail(
    client: ProxyClient,
    category: Category,
    id: &str,
    wookiee: bool,
    format: OutputFormat,
    timeout: u64,
) -> Result<(), String> {
    let options = ResolveOptions {
        alternate_language: wookiee,
    };
    let resolver = DetailResolver::from_client(Arc::new(client), Duration::from_secs(timeout.max(1)));
    let viewer = DetailViewer::new(resolver);

    viewer.show(DetailRequest::new(category, id, options)).await;

    match viewer.state() {
        ViewState::Ready { view, .. } => match format {
            OutputFormat::Json => print_json(&view),
            OutputFormat::Pretty => {
                print_detail(&view);
                Ok(())
            }
        },
        ViewState::Failed { message, .. } => Err(message),
        ViewState::SessionExpired => Err("Session expired, log in again".to_string()),
        ViewState::Idle | ViewState::Loading(_) => Err("No result".to_string()),
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {}", e))?;
    println!("{output}");
    Ok(())
}

fn print_listing(category: Category, page: u32, listing: &CatalogPage) {
    let total = page_count(listing.count);
    if listing.results.is_empty() || turn_page(page, total).is_none() {
        println!("{} No {} found", "--".yellow(), category);
        return;
    }

    let headers = table_headers(&listing.results[0]);
    println!(
        "{}",
        headers
            .iter()
            .map(|h| format!("{:<24}", display_label(h)))
            .collect::<String>()
            .bold()
    );
    for record in &listing.results {
        let row: String = headers
            .iter()
            .map(|h| {
                let text = record.get(h).map(|v| v.display_text()).unwrap_or_default();
                format!("{:<24}", truncate(&text, 22))
            })
            .collect();
        println!("{row}");
    }

    let window: Vec<String> = page_window(page, total)
        .into_iter()
        .map(|p| {
            if p == page {
                format!("[{p}]").green().bold().to_string()
            } else {
                p.to_string()
            }
        })
        .collect();
    println!();
    println!("Page {page} of {total}   {}", window.join(" "));
}

fn print_detail(view: &DetailView) {
    for entry in &view.fields {
        let lines = entry.value.display_lines();
        println!("{:<20} {}", entry.label().bold(), lines[0]);
        for line in &lines[1..] {
            println!("{:<20} {}", "", line);
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
