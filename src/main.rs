//! clinsim CLI
//!
//! Usage:
//!   clinsim                                   # Full run: pre-brief, simulation, de-brief
//!   clinsim --phase simulation                # One phase only
//!   clinsim --text "We have the budget" --phase simulation   # Single turn
//!   clinsim --serve                           # HTTP API server
//!   clinsim --seed 7 --json                   # Reproducible run, JSON replies

use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing::{error, warn};
use tracing_subscriber::prelude::*;

use clinsim::core::{
    load_config, load_script_set, render_report, run_server, Phase, SimulationSession,
};
use clinsim::types::{EngineConfig, Reply, ScriptSet, Speaker};
use clinsim::{DEFAULT_TRANSCRIPT_DIR, VERSION};

const REFLECTION_QUESTIONS: &[&str] = &[
    "What went well in your conversation with Sam?",
    "Which of Sam's concerns was hardest to address, and why?",
    "What would you do differently next time?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PhaseArg {
    Prebrief,
    Simulation,
    Debrief,
    All,
}

impl PhaseArg {
    fn phases(self) -> Vec<Phase> {
        match self {
            PhaseArg::Prebrief => vec![Phase::Prebrief],
            PhaseArg::Simulation => vec![Phase::Simulation],
            PhaseArg::Debrief => vec![Phase::Debrief],
            PhaseArg::All => Phase::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "clinsim",
    version = VERSION,
    about = "Scripted persuasion-dialogue simulation for nursing education",
    long_about = "clinsim runs a vaccination-programme persuasion exercise.\n\n\
                  Phases:\n  \
                  prebrief    - Noa Martinez explains the scenario\n  \
                  simulation  - Convince Sam Richards, the facility manager\n  \
                  debrief     - Reflect on the conversation with Noa\n\n\
                  In a phase, type 'next' to move on or 'quit' to stop."
)]
struct Args {
    /// Directory holding simulation_script.json, prebrief_script.json, debrief_script.json
    #[arg(long, default_value = "assets/scripts")]
    scripts: PathBuf,

    /// Engine configuration file (JSON); defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Phase(s) to run
    #[arg(long, value_enum, default_value_t = PhaseArg::All)]
    phase: PhaseArg,

    /// Single turn: send this text and print the reply
    #[arg(short, long)]
    text: Option<String>,

    /// Directory for saved transcripts
    #[arg(long, default_value = DEFAULT_TRANSCRIPT_DIR)]
    transcripts: PathBuf,

    /// User identifier for transcript names
    #[arg(long)]
    user_id: Option<String>,

    /// Output replies as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    if args.no_color {
        colored::control::set_override(false);
    }

    let (scripts, config) = match load_inputs(&args) {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if args.serve {
        run_serve(&args, scripts, config).await;
    } else if let Some(ref text) = args.text {
        run_single(text, &args, &scripts, config);
    } else {
        run_interactive(&args, &scripts, config);
    }
}

/// Logs go to stderr so the dialogue on stdout stays clean
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_inputs(args: &Args) -> Result<(ScriptSet, EngineConfig), Box<dyn std::error::Error>> {
    let scripts = load_script_set(&args.scripts)?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    Ok((scripts, config))
}

/// Run a single turn
fn run_single(text: &str, args: &Args, scripts: &ScriptSet, config: EngineConfig) {
    let phase = match args.phase {
        PhaseArg::All => Phase::Simulation,
        other => other.phases()[0],
    };
    let mut session = SimulationSession::new(scripts, config, args.seed);
    session.start(phase);

    match session.submit(phase, text) {
        Ok(reply) => print_reply(&reply, args),
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    }
}

/// Run the selected phases interactively
fn run_interactive(args: &Args, scripts: &ScriptSet, config: EngineConfig) {
    let mut session = SimulationSession::new(scripts, config, args.seed);
    print_header(args);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut ran_simulation = false;

    'phases: for phase in args.phase.phases() {
        print_phase_banner(phase, args);
        if let Some(opening) = session.start(phase) {
            print_reply(&opening, args);
        }

        loop {
            print!("{} ", "You >".bold());
            let _ = stdout.flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break 'phases,
                Ok(_) => {}
                Err(_) => break 'phases,
            }

            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                break 'phases;
            }
            if line.eq_ignore_ascii_case("next") {
                if session.is_completed(phase) {
                    break;
                }
                println!(
                    "{}",
                    format!(
                        "  Keep going a little longer ({} of {} turns).",
                        session.history(phase).len(),
                        phase.min_turns()
                    )
                    .yellow()
                );
                continue;
            }
            if line.is_empty() {
                continue;
            }

            match session.submit(phase, line) {
                Ok(reply) => print_reply(&reply, args),
                Err(e) => warn!("{}", e),
            }
            if session.is_completed(phase) && !args.json {
                println!("{}", "  (type 'next' to continue)".dimmed());
            }
        }

        if phase == Phase::Simulation {
            ran_simulation = true;
            save_transcript(&session, args);
        }
    }

    if ran_simulation && !session.history(Phase::Simulation).is_empty() {
        print_summary(&session, args);
    } else {
        println!("\nSession ended.");
    }
}

fn save_transcript(session: &SimulationSession, args: &Args) {
    if session.history(Phase::Simulation).is_empty() {
        return;
    }
    match session.save_transcript(&args.transcripts, args.user_id.as_deref()) {
        Ok(path) => println!("{}", format!("  Transcript saved: {}", path.display()).cyan()),
        Err(e) => warn!("transcript not saved: {}", e),
    }
}

fn print_summary(session: &SimulationSession, args: &Args) {
    let feedback = session.feedback();
    if args.json {
        println!("{}", serde_json::to_string(&feedback).unwrap_or_default());
        return;
    }

    let reflection = ask_reflection();
    println!();
    println!("{}", render_report(&feedback, Some(&reflection)));
}

fn ask_reflection() -> BTreeMap<String, String> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut answers = BTreeMap::new();

    println!();
    println!("{}", "Self-reflection (press Enter to skip a question)".bold());
    for question in REFLECTION_QUESTIONS {
        print!("  {} ", question);
        let _ = stdout.flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let answer = line.trim();
        if !answer.is_empty() {
            answers.insert(question.to_string(), answer.to_string());
        }
    }
    answers
}

/// Print header
fn print_header(args: &Args) {
    if args.json {
        return;
    }
    println!("========================================");
    println!("  {}", format!("clinsim v{}", VERSION).bold());
    println!("  Flu Vaccination in Corrections");
    println!("========================================");
    println!("Type 'next' to move on, 'quit' to stop.");
}

fn print_phase_banner(phase: Phase, args: &Args) {
    if args.json {
        return;
    }
    let title = match phase {
        Phase::Prebrief => "Pre-Brief with Noa Martinez",
        Phase::Simulation => "Simulation with Sam Richards",
        Phase::Debrief => "De-Brief with Noa Martinez",
    };
    println!();
    println!("{}", format!("--- {} ---", title).bold().blue());
}

fn print_reply(reply: &Reply, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(reply).unwrap_or_default());
    } else if args.no_color {
        println!("{}", reply.to_parseable_string());
    } else {
        let name = match reply.speaker {
            Speaker::Sam => reply.speaker.display_name().red().bold(),
            Speaker::Instructor => reply.speaker.display_name().green().bold(),
            Speaker::User => reply.speaker.display_name().bold(),
        };
        println!("{}: {}", name, reply.text);
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args, scripts: ScriptSet, config: EngineConfig) {
    println!();
    println!("========================================");
    println!("  clinsim API Server v{}", VERSION);
    println!("========================================");
    println!();

    if let Err(e) = run_server(&args.addr, scripts, config, args.transcripts.clone()).await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
