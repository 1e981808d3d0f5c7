//! dtc-assist: service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Load the code catalog (missing file → empty catalog, bad schema → abort)
//!   6. Build the LLM provider and the diagnostic recorder
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Serve the web front-end until shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use dtc_assist::catalog::CodeCatalog;
use dtc_assist::diagnosis::{DiagnosticHistory, DiagnosticRecorder};
use dtc_assist::error::AppError;
use dtc_assist::web::{WebServer, WebState};
use dtc_assist::{config, llm, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        service = %config.service_name,
        catalog = %config.catalog.path.display(),
        bind = %config.http.bind,
        llm_provider = %config.llm.provider,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let catalog = Arc::new(CodeCatalog::load_or_empty(&config.catalog.path)?);

    let provider = llm::providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;

    let recorder = Arc::new(DiagnosticRecorder::new(
        catalog.clone(),
        Arc::new(DiagnosticHistory::new()),
        provider,
        config.assistant.instructions.clone(),
    ));

    info!(codes = catalog.len(), provider = recorder.provider_name(), "recorder ready");

    // Ctrl-C handler cancels the token so the server drains and exits.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    let state = WebState::new(
        &config.service_name,
        recorder,
        Duration::from_secs(config.http.request_timeout_seconds),
    );
    WebServer::new(config.http.bind.clone(), state).run(shutdown).await
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: dtc-assist [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs {
        log_level: logger::level_for_verbosity(verbosity),
        config_path,
    }
}
