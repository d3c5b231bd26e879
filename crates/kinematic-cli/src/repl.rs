//! REPL – Read-Eval-Print Loop driving the demo kinematic model.
//!
//! Supported slash-commands:
//!   /step [n]                     – run `n` estimation cycles (default 1)
//!   /tf [source target] [--json]  – transform between two frames
//!   /frames                       – list frames with their parents
//!   /stats                        – transform and path cache counters
//!   /state                        – print the current state vector
//!   /help                         – show this list
//!   /quit | /exit                 – exit the CLI

use colored::Colorize;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kinematic_geometry::{FrameKind, Transform};
use kinematic_model::KinematicModel;
use tracing::warn;

use crate::config::Config;
use crate::demo::{DemoArm, ScriptedEstimator};

pub type DemoModel = KinematicModel<ScriptedEstimator, DemoArm>;

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Step(usize),
    Tf {
        frames: Option<(String, String)>,
        json: bool,
    },
    Frames,
    Stats,
    State,
    Help,
    Quit,
}

/// Parse one input line.  `Err` carries a message for the user.
pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = words.collect();

    match head {
        "/step" => match args.as_slice() {
            [] => Ok(Command::Step(1)),
            [n] => n
                .parse::<usize>()
                .map(Command::Step)
                .map_err(|_| format!("'{n}' is not a cycle count")),
            _ => Err("usage: /step [n]".to_string()),
        },
        "/tf" => {
            let json = args.contains(&"--json");
            let names: Vec<&str> = args.into_iter().filter(|a| *a != "--json").collect();
            match names.as_slice() {
                [] => Ok(Command::Tf { frames: None, json }),
                [source, target] => Ok(Command::Tf {
                    frames: Some((source.to_string(), target.to_string())),
                    json,
                }),
                _ => Err("usage: /tf [source target] [--json]".to_string()),
            }
        }
        "/frames" => Ok(Command::Frames),
        "/stats" => Ok(Command::Stats),
        "/state" => Ok(Command::State),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(model: &mut DemoModel, cfg: &Config, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "kinematic>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        if line.trim().is_empty() {
            continue;
        }

        match parse(&line) {
            Ok(Command::Step(n)) => cmd_step(model, n, &shutdown),
            Ok(Command::Tf { frames, json }) => {
                let (source, target) = frames.unwrap_or_else(|| {
                    (
                        cfg.default_source_frame.clone(),
                        cfg.default_target_frame.clone(),
                    )
                });
                cmd_tf(model, &source, &target, json);
            }
            Ok(Command::Frames) => cmd_frames(model),
            Ok(Command::Stats) => cmd_stats(model),
            Ok(Command::State) => cmd_state(model),
            Ok(Command::Help) => cmd_help(),
            Ok(Command::Quit) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Err(msg) => {
                println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    msg.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Kinematic Commands".bold().underline());
    println!("  {}                    – run n estimation cycles", "/step [n]".bold().cyan());
    println!("  {}  – transform between frames", "/tf [src dst] [--json]".bold().cyan());
    println!("  {}                      – list frames and parents", "/frames".bold().cyan());
    println!("  {}                       – cache counters", "/stats".bold().cyan());
    println!("  {}                       – current state vector", "/state".bold().cyan());
    println!("  {}                 – exit the CLI", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_step(model: &mut DemoModel, cycles: usize, shutdown: &AtomicBool) {
    let mut completed = 0;
    for _ in 0..cycles {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        if let Err(e) = model.iterate() {
            warn!(error = %e, completed, "stepping aborted");
            println!("{}: {}", "Estimation failed".red(), e);
            break;
        }
        completed += 1;
    }
    println!(
        "  {} {} cycle(s), {} in total",
        "✓".green(),
        completed,
        model.estimator().cycles()
    );
}

fn cmd_tf(model: &mut DemoModel, source: &str, target: &str, json: bool) {
    let Some(transform) = model.get_transform(source, target) else {
        println!(
            "  {} no transform from {} to {}",
            "✗".red(),
            source.yellow(),
            target.yellow()
        );
        return;
    };

    let report = TransformReport::new(source, target, &transform);
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => println!("{}: {}", "Serialization error".red(), e),
        }
        return;
    }

    println!("  {} → {}", source.bold(), target.bold());
    println!(
        "    translation  [{:+.4}, {:+.4}, {:+.4}]",
        report.translation[0], report.translation[1], report.translation[2]
    );
    println!(
        "    rotation     w={:+.4} x={:+.4} y={:+.4} z={:+.4}",
        report.rotation.w, report.rotation.x, report.rotation.y, report.rotation.z
    );
    println!(
        "    rpy (rad)    [{:+.4}, {:+.4}, {:+.4}]",
        report.rpy[0], report.rpy[1], report.rpy[2]
    );
}

fn cmd_frames(model: &DemoModel) {
    let Some(graph) = model.graph() else {
        println!("  {}", "model is not initialised".yellow());
        return;
    };
    let mut names: Vec<&str> = graph.frame_names().collect();
    names.sort_unstable();

    println!("{}", "Frames".bold().underline());
    for name in names {
        let kind = match graph.frame(name).map(|f| f.kind()) {
            Some(FrameKind::Joint) => "joint".magenta(),
            _ => "link".normal(),
        };
        let parent = graph.parent_of(name).unwrap_or("(root)");
        println!("  {:<14} {:<6} parent: {}", name.bold(), kind, parent.dimmed());
    }
}

fn cmd_stats(model: &DemoModel) {
    let stats = model.cache_stats();
    let lookups = stats.hits + stats.misses;
    let ratio = if lookups == 0 {
        0.0
    } else {
        stats.hits as f64 / lookups as f64 * 100.0
    };
    println!("{}", "Cache".bold().underline());
    println!("  transform hits     : {}", stats.hits.to_string().green());
    println!("  transform misses   : {}", stats.misses.to_string().yellow());
    println!("  hit ratio          : {ratio:.1}%");
    println!("  cached transforms  : {}", model.cached_transforms());
    println!(
        "  cached paths       : {}",
        model.graph().map(|g| g.cached_paths()).unwrap_or(0)
    );
}

fn cmd_state(model: &DemoModel) {
    println!("{}", "State vector".bold().underline());
    for (i, value) in model.state_vector().iter().enumerate() {
        println!("  x[{i}] = {value:+.6}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output formats
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Quaternion {
    w: f64,
    x: f64,
    y: f64,
    z: f64,
}

/// `/tf` result as printed by `--json`.
#[derive(Debug, Serialize)]
struct TransformReport<'a> {
    source: &'a str,
    target: &'a str,
    translation: [f64; 3],
    rotation: Quaternion,
    rpy: [f64; 3],
}

impl<'a> TransformReport<'a> {
    fn new(source: &'a str, target: &'a str, transform: &Transform) -> Self {
        let t = &transform.translation;
        let q = transform.rotation.quaternion();
        let (roll, pitch, yaw) = transform.rotation.euler_angles();
        Self {
            source,
            target,
            translation: [t.x, t.y, t.z],
            rotation: Quaternion {
                w: q.w,
                x: q.i,
                y: q.j,
                z: q.k,
            },
            rpy: [roll, pitch, yaw],
        }
    }
}
