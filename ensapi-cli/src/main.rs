//! ENS API CLI
//!
//! Runs the HTTP server, or resolves and lists names from the terminal.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ensapi_api::{ApiConfig, ApiServer, AppState};
use ensapi_core::types::{Network, Query, QueryKind, ResolutionResult};
use ensapi_ens::ResolveOptions;

/// ENS identity API
#[derive(Parser)]
#[command(name = "ensapi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Ethereum RPC URL
    #[arg(long, env = "ETH_RPC_URL", global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Bind address (overrides ENS_API_BIND)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Resolve an ENS name or address
    Resolve {
        /// ENS name or 0x address
        query: String,
        /// Also list names owned by the address
        #[arg(long)]
        domains: bool,
        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },

    /// List names owned by an address or name
    List {
        /// ENS name or 0x address
        query: String,
        /// Network to query
        #[arg(short, long, default_value = "mainnet")]
        network: Network,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let mut config = ApiConfig::from_env().context("Invalid configuration")?;
    if let Some(rpc_url) = cli.rpc_url {
        config.rpc_url = rpc_url;
    }

    match cli.command {
        Commands::Serve { bind } => cmd_serve(config, bind).await,
        Commands::Resolve {
            query,
            domains,
            json,
        } => cmd_resolve(config, &query, domains, json).await,
        Commands::List { query, network } => cmd_list(config, &query, network).await,
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "ensapi=debug,tower_http=debug,info"
    } else {
        "ensapi=info,tower_http=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Run the API server
async fn cmd_serve(mut config: ApiConfig, bind: Option<SocketAddr>) -> Result<()> {
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    let addr = config.bind_addr;

    println!("{}", "Starting ENS API server...".cyan().bold());
    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} http://{}/health", "Health check:".dimmed(), addr);
    println!("   {} {}", "RPC:".dimmed(), config.rpc_url);
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("Failed to build API server")?;
    server.run(addr).await.context("Server error")?;

    Ok(())
}

/// Resolve a name or address
async fn cmd_resolve(config: ApiConfig, raw: &str, domains: bool, json: bool) -> Result<()> {
    let query = Query::parse(raw);
    if query.kind() == QueryKind::Unknown {
        eprintln!(
            "{} '{}' is neither a .eth name nor a 0x address",
            "warning:".yellow().bold(),
            query
        );
    }

    let state = AppState::new(config).context("Failed to create resolver")?;
    let options = ResolveOptions {
        include_domains: domains,
    };
    let result = state.resolver.resolve_query(&query, options).await;

    if json {
        println!("{}", result.to_pretty_json()?);
        return Ok(());
    }

    print_result(&query, &result);
    Ok(())
}

fn print_result(query: &Query, result: &ResolutionResult) {
    if result.is_empty() {
        println!("{} {}", "Nothing resolved for".red().bold(), query);
        return;
    }

    println!("{} {}", "Resolved:".green().bold(), query);
    let rows = [
        ("Name:", &result.name),
        ("Address:", &result.address),
        ("Display name:", &result.display_name),
        ("Avatar:", &result.avatar),
        ("Content hash:", &result.content_hash),
        ("Project ID:", &result.custom_project_id),
    ];
    for (label, value) in rows {
        match value {
            Some(value) => println!("   {} {}", format!("{label:<14}").dimmed(), value),
            None => println!("   {} {}", format!("{label:<14}").dimmed(), "-".dimmed()),
        }
    }

    if !result.domain_list.is_empty() {
        println!("   {}", "Domains:".dimmed());
        for name in &result.domain_list {
            println!("     - {name}");
        }
    }
}

/// List owned names
async fn cmd_list(config: ApiConfig, raw: &str, network: Network) -> Result<()> {
    let state = AppState::new(config).context("Failed to create resolver")?;
    let names = state.resolver.list_owned_names(raw, network).await;

    if names.is_empty() {
        println!("{} {} on {}", "No names owned by".yellow(), raw, network);
        return Ok(());
    }

    println!(
        "{} {} {} on {}",
        names.len().to_string().green().bold(),
        "names owned by".green(),
        raw,
        network
    );
    for name in names {
        println!("   {name}");
    }

    Ok(())
}
