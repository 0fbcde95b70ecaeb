// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crescent - a local chat history store.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::Parser;

use crescent::backend::Backend;
use crescent::cli::{Cli, Commands};
use crescent::{commands, init_tracing, serve};
use crescent_config::CrescentConfig;
use crescent_core::CrescentError;

fn load_config(cli: &Cli) -> CrescentConfig {
    let loaded = match &cli.config {
        Some(path) => crescent_config::load_and_validate_path(path),
        None => crescent_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            crescent_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, mut config: CrescentConfig) -> Result<(), CrescentError> {
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Some(Commands::Serve(args)) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            serve::run_serve(config).await
        }
        Some(Commands::Conversations(command)) => {
            let backend = Backend::open(&config.storage).await?;
            let result = commands::run_conversations(&backend, command, &mut stdout).await;
            backend.shutdown().await?;
            result
        }
        Some(Commands::Messages(command)) => {
            let backend = Backend::open(&config.storage).await?;
            let result = commands::run_messages(&backend, command, &mut stdout).await;
            backend.shutdown().await?;
            result
        }
        Some(Commands::Settings(command)) => {
            let backend = Backend::open(&config.storage).await?;
            let result = commands::run_settings(&backend, command, &mut stdout).await;
            backend.shutdown().await?;
            result
        }
        Some(Commands::Config) => commands::run_config(&config, &mut stdout),
        None => {
            println!("crescent: use --help for available commands");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli);
    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
