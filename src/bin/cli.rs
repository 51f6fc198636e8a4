//! bloomlink CLI
//!
//! Command-line client for the Bloom filter service.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use bloomlink::{BloomClient, Config};

/// bloomlink CLI
#[derive(Parser, Debug)]
#[command(name = "bloomlink-cli")]
#[command(about = "CLI for a remote Bloom filter service")]
#[command(version)]
struct Args {
    /// Service host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Service port
    #[arg(long, default_value = "1337")]
    port: u16,

    /// Response timeout in milliseconds (0 waits forever)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add items to the filter
    Add {
        /// Items to add
        items: Vec<String>,
    },

    /// Remove items from the filter
    Rmv {
        /// Items to remove
        items: Vec<String>,
    },

    /// Check whether an item is present
    Has {
        /// Item to test
        item: String,
    },

    /// Show the counter for an item
    Cnt {
        /// Item to count
        item: String,
    },

    /// Dump the raw filter state as hex
    Bin,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bloomlink=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let mut builder = Config::builder().host(args.host.as_str()).port(args.port);
    if args.timeout_ms > 0 {
        builder = builder.response_timeout_ms(args.timeout_ms);
    }

    let client = BloomClient::with_config(builder.build());

    if let Err(e) = client.connect() {
        tracing::error!("failed to connect: {}", e);
        std::process::exit(1);
    }

    let outcome = run(&client, args.command);
    client.end();

    if let Err(e) = outcome {
        tracing::error!("command failed: {}", e);
        std::process::exit(1);
    }
}

/// Execute one subcommand and print its result
fn run(client: &BloomClient, command: Commands) -> bloomlink::Result<()> {
    match command {
        Commands::Add { items } => {
            client.add(items)?;
            println!("OK");
        }
        Commands::Rmv { items } => {
            client.remove(items)?;
            println!("OK");
        }
        Commands::Has { item } => {
            let present = client.has(item)?;
            println!("{}", if present { "yes" } else { "no" });
        }
        Commands::Cnt { item } => {
            println!("{}", client.count(item)?);
        }
        Commands::Bin => {
            let state = client.binary()?;
            for chunk in state.chunks(16) {
                let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
                println!("{}", hex.join(" "));
            }
        }
    }
    Ok(())
}
