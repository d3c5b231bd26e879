//! `kinematic-cli` – interactive front end for the kinematic model.
//!
//! 1. Loads `~/.kinematic/config.toml`, writing the defaults on first run.
//! 2. Builds the demo arm and camera rig and initialises the model.
//! 3. Drops the user into a REPL for stepping the estimator and querying
//!    transforms (`/step`, `/tf`, `/frames`, `/stats`, `/state`, `/help`).
//! 4. Intercepts **Ctrl-C** to stop the REPL and any `/step` run in progress.

mod config;
mod demo;
mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use kinematic_model::{KinematicModel, ModelDimensions};
use kinematic_types::KinematicsError;

use crate::demo::{DEMO_STATE_VARIABLES, DemoArm, ScriptedEstimator};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG filters (default "info"); KINEMATIC_LOG_FORMAT=json switches
    // to JSON lines.  User-facing output below still uses println!.
    let _telemetry = kinematic_model::init_tracing("kinematic-cli");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will terminate immediately");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => write_default_config(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    let dimensions = ModelDimensions {
        n_state_variables: cfg.n_state_variables,
        n_sensors: cfg.n_sensors,
    };

    // ── Model ─────────────────────────────────────────────────────────────
    let mut model =
        KinematicModel::new(dimensions, ScriptedEstimator::new(cfg.step_size_rad), DemoArm);
    print!("\n  Building demo geometry … ");
    match model.initialize() {
        Ok(()) => {
            let frames = model.graph().map(|g| g.len()).unwrap_or(0);
            println!("{} ({} frames)", "OK".green(), frames);
            info!(frames, step_size_rad = cfg.step_size_rad, "demo model ready");
        }
        Err(e) => {
            println!("{}: {}", "FAILED".red(), e);
            if matches!(e, KinematicsError::DimensionMismatch { .. }) {
                println!(
                    "  The demo arm needs n_state_variables = {} in {}.",
                    DEMO_STATE_VARIABLES,
                    config::config_path().display().to_string().bold()
                );
            }
            std::process::exit(1);
        }
    }

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(&mut model, &cfg, shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// First run
// ─────────────────────────────────────────────────────────────────────────────

fn write_default_config() -> config::Config {
    let cfg = config::Config::default();
    println!("  No configuration found.  Writing defaults.");
    match config::save(&cfg) {
        Ok(()) => println!(
            "  {} Config saved to {}",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "kinematic".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Frame graph and transform solver");
    println!();
}
