// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maklerd - performance assistant for insurance-broker account managers.
//!
//! Binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;

/// Maklerd - performance assistant for insurance-broker account managers.
#[derive(Parser, Debug)]
#[command(name = "maklerd", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Maklerd HTTP gateway.
    Serve,
    /// Load, validate, and print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match maklerd_config::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("maklerd: configuration error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("maklerd: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            let mut printable = config;
            printable.provider.api_key = printable.provider.api_key.map(|_| "<redacted>".into());
            match toml::to_string_pretty(&printable) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    eprintln!("maklerd: failed to render configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("maklerd: use --help for available commands");
        }
    }
}
