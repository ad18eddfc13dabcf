use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nanolink::codec;
use nanolink::config::{CacheConfig, Config};
use nanolink::storage;
use nanolink::LinkService;

#[derive(Parser)]
#[command(name = "nanolink-admin")]
#[command(about = "NanoLink management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Shorten {
        /// URL to shorten
        url: String,
        /// Custom alias instead of a generated code
        #[arg(long)]
        alias: Option<String>,
    },
    /// Show click statistics for a short code
    Stats {
        /// Short code
        code: String,
    },
    /// Resolve a short code (counts as a click)
    Resolve {
        /// Short code
        code: String,
    },
    /// Encode a number in base 62
    Encode {
        /// Non-negative integer
        number: u64,
    },
    /// Decode a base-62 code into a number
    Decode {
        /// Base-62 code
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Codec commands need no database
    match &cli.command {
        Commands::Encode { number } => {
            println!("{}", codec::encode(*number));
            return Ok(());
        }
        Commands::Decode { code } => {
            let number = codec::decode(code).with_context(|| format!("cannot decode '{code}'"))?;
            println!("{number}");
            return Ok(());
        }
        _ => {}
    }

    let config = Config::from_env()?;
    // The CLI is short-lived, a lookup cache would never be hit
    let no_cache = CacheConfig {
        enabled: false,
        ..Default::default()
    };
    let store = storage::connect(&config.database, &no_cache).await?;
    let service = LinkService::with_offset(store.clone(), config.code_offset);

    let result = run(&service, &config, cli.command).await;
    store.close().await;
    result
}

async fn run(service: &LinkService, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Shorten { url, alias } => {
            let link = service.shorten(&url, alias.as_deref()).await?;
            println!("✓ {}/{} -> {}", config.base_url, link.short_code, link.original_url);
        }
        Commands::Stats { code } => {
            let stats = service.get_stats(&code).await?;
            println!("{:<14} {}", "Short code:", stats.short_code);
            println!("{:<14} {}", "Original URL:", stats.original_url);
            println!("{:<14} {}", "Clicks:", stats.total_clicks);
            println!("{:<14} {}", "Created at:", stats.created_at.to_rfc3339());
        }
        Commands::Resolve { code } => {
            let resolution = service.resolve(&code).await?;
            println!("{}", resolution.original_url);
        }
        Commands::Encode { .. } | Commands::Decode { .. } => {}
    }

    Ok(())
}
