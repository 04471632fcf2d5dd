// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ClawRouter - a local proxy that routes chat completions to the
//! cheapest capable model.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clawrouter_core::RouterError;

mod env;
mod serve;
mod shutdown;

/// ClawRouter - route chat completions to the cheapest capable model.
#[derive(Parser, Debug)]
#[command(name = "clawrouter", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the proxy server.
    Serve {
        /// Path to a specific config file (skips the XDG hierarchy).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            if let Err(e) = serve::run_serve(config.as_deref()).await {
                eprintln!("error: {e}");
                std::process::exit(exit_code(&e));
            }
        }
    }
}

/// Process exit code per error kind: 1 for bind failures (and anything
/// unexpected), 2 when no upstream credentials are available at startup.
fn exit_code(err: &RouterError) -> i32 {
    match err {
        RouterError::AuthMissing { .. } => 2,
        _ => 1,
    }
}
