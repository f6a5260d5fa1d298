//! card-replay: replay scripted swipe gestures against a list of link cards.
//!
//! Mounts one swipe-to-delete controller per card (in-memory list, frame-stepped
//! animation driver, fixed layout), plays the script's steps in order, and
//! prints a JSON report of what is left in the list.
//!
//! Run:
//! ```bash
//! # pretty logs (default) on stderr, report on stdout
//! cargo run -p card-replay -- script.json
//!
//! # JSON logs and a faster fling threshold
//! LOG_FORMAT=json MIN_FLING_VELOCITY=300 cargo run -p card-replay -- script.json
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;
mod replay;

use std::env;
use std::fs;
use std::process;
use std::time::SystemTime;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  card-replay <script.json>\n\nScript:\n  {{\"cards\": [{{\"key\": \"github\", \"url\": \"https://github.com\"}}],\n   \"steps\": [{{\"key\": \"github\", \"action\": {{\"type\": \"drag\", \"offset\": 80, \"velocity\": 900}}}},\n             {{\"key\": \"github\", \"action\": {{\"type\": \"release\"}}}},\n             {{\"key\": \"github\", \"action\": {{\"type\": \"frames\", \"count\": 12}}}}]}}",
        card_domain::about()
    );
}

fn run() -> Result<(), String> {
    // Load and validate configuration (fail fast on misconfiguration)
    let cfg = config::Config::from_env().map_err(|e| e.to_string())?;
    init_tracing(&cfg);

    let Some(path) = env::args().nth(1) else {
        print_usage();
        return Ok(());
    };

    let raw = fs::read_to_string(&path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    let script = replay::Script::from_json(&raw).map_err(|e| e.to_string())?;
    let report = replay::run(&cfg, script, SystemTime::now())
        .map_err(|e| format!("replay failed: {}", e))?;
    let out = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("cannot encode report: {}", e))?;
    println!("{}", out);
    Ok(())
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    // Logs go to stderr so stdout carries only the report.
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

fn main() {
    if let Err(msg) = run() {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}
