//! # reppl
//!
//! The main binary: memoized formula evaluation in front of a
//! content-addressed execution engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    apps/reppl (THE BINARY)                 │
//! │                                                            │
//! │  ┌─────────────┐   ┌──────────────┐   ┌────────────────┐  │
//! │  │   CLI       │   │ Orchestrator │   │ Engine adapter │  │
//! │  │  (clap)     │──▶│   (eval)     │──▶│ (tokio process)│  │
//! │  └─────────────┘   └──────┬───────┘   └────────────────┘  │
//! │                           ▼                                │
//! │                   ┌───────────────┐                        │
//! │                   │  reppl-core   │                        │
//! │                   │  (THE MEMO)   │                        │
//! │                   └───────────────┘                        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! reppl init
//! reppl put hash base aLJ6... --kind tar --warehouse http://example.org/wh
//! reppl eval build.frm --env VERSION=1.2
//! reppl show
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: no-op or successful evaluation
//! - `1`: the evaluated action exited non-zero
//! - `2`: usage, I/O, decode, integrity or engine error

use clap::Parser;
use reppl::cli;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing. REPPL_LOG_FORMAT=json switches to JSON lines.
    let log_format = std::env::var("REPPL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "reppl=debug"
    } else {
        "reppl=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries the status lines.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    match cli::execute(cli).await {
        Ok(completion) => ExitCode::from(completion.exit_code()),
        Err(e) => {
            tracing::error!("Error: {}", e);
            ExitCode::from(cli::ERROR_EXIT_CODE)
        }
    }
}
