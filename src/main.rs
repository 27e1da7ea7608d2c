//! palm-aura CLI
//!
//! Usage:
//!   palm-aura --script frames.txt            # Replay a frame script
//!   palm-aura --simulate 6000                # Steady hand for 6 seconds
//!   palm-aura --interactive                  # One stdin line per frame
//!   palm-aura --serve                        # HTTP API server
//!   palm-aura --script frames.txt --json     # JSON output

use clap::Parser;
use colored::Colorize;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::time::Instant;

use palm_aura::config::{ReadingConfig, ZoneBand};
use palm_aura::core::{
    parse_script, run_server, simulate_hold, LogPlayer, ReadingEngine, ReadingSession,
    ScriptAction, ScriptEvent,
};
use palm_aura::types::{AuraProfile, FrameOutput, ReadingPhase};
use palm_aura::{AuraError, SIMULATED_FRAME_MS, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "palm-aura",
    version = VERSION,
    about = "Palm aura reading - hold your hand steady to reveal your aura",
    long_about = "palm-aura drives the palm-presence state machine of the aura reading\n\
                  sketch from recorded, simulated or typed detector signals.\n\n\
                  Modes:\n  \
                  --script       Replay a frame script\n  \
                  --simulate     Steady hand for N milliseconds\n  \
                  --interactive  One stdin line per frame (h, h 0.4, ., reset, quit)\n  \
                  --serve        HTTP API server mode\n\n\
                  Phases:\n  \
                  IDLE       - No hand in view\n  \
                  DETECTING  - Hand outside the reading zone\n  \
                  CHARGING   - Hand held, reading in progress\n  \
                  REVEALED   - Aura chosen, shown until reset"
)]
struct Args {
    /// Frame script to replay
    #[arg(long)]
    script: Option<String>,

    /// Simulate a steady hand held for this many milliseconds
    #[arg(long)]
    simulate: Option<u64>,

    /// Interactive mode - one stdin line per frame
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Reveal threshold in milliseconds (overrides config)
    #[arg(long)]
    threshold: Option<u64>,

    /// Reachable zone as <min>,<max> fractions of frame width
    #[arg(long)]
    zone: Option<String>,

    /// Seed phrase for a reproducible aura
    #[arg(long)]
    seed: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Print every frame, not just transitions
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.serve {
        run_serve(config, &args).await;
        return;
    }

    let result = if let Some(ref path) = args.script {
        std::fs::read_to_string(path)
            .map_err(AuraError::from)
            .and_then(|text| parse_script(&text))
            .map(|events| run_events(&events, config, &args))
    } else if let Some(hold_ms) = args.simulate {
        let events = simulate_hold(hold_ms, SIMULATED_FRAME_MS);
        run_events(&events, config, &args);
        Ok(())
    } else {
        // Default to interactive if no mode specified
        run_interactive(config, &args);
        Ok(())
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Config file, then flag overrides
fn build_config(args: &Args) -> Result<ReadingConfig, AuraError> {
    let mut config = match &args.config {
        Some(path) => ReadingConfig::load(path)?,
        None => ReadingConfig::default(),
    };
    if let Some(ms) = args.threshold {
        config = config.with_threshold(ms);
    }
    if let Some(zone) = &args.zone {
        config = config.with_zone(ZoneBand::parse(zone)?);
    }
    config.validate()?;
    Ok(config)
}

fn new_session(config: ReadingConfig, args: &Args) -> ReadingSession<LogPlayer> {
    let engine = match args.seed.as_deref() {
        Some(phrase) => ReadingEngine::with_seed_phrase(config, phrase),
        None => ReadingEngine::new(config),
    };
    ReadingSession::new(engine, LogPlayer::new())
}

/// Replay scripted events
fn run_events(events: &[ScriptEvent], config: ReadingConfig, args: &Args) {
    let mut session = new_session(config, args);
    print_header("Replay", args);

    for event in events {
        match event.frame() {
            Some(frame) => {
                let output = session.frame(&frame, event.at_ms);
                print_output(&output, args);
            }
            None => {
                let output = session.reset();
                print_output(&output, args);
            }
        }
    }

    if args.json {
        return;
    }
    let engine = session.engine();
    println!();
    let last = engine.current_output();
    match last.revealed_at_ms {
        Some(at) => println!(
            "Replay finished. Frames: {} | Final phase: {} | Revealed at {}ms",
            engine.tick_count(),
            last.phase,
            at
        ),
        None => println!(
            "Replay finished. Frames: {} | Final phase: {}",
            engine.tick_count(),
            last.phase
        ),
    }
}

/// Run interactive mode: each line is one frame
fn run_interactive(config: ReadingConfig, args: &Args) {
    let threshold = config.reveal_threshold_ms;
    let mut session = new_session(config, args);
    let started = Instant::now();

    print_header("Interactive", args);
    println!("Each line is one frame:  h = hand   h 0.4 = hand at 40% width");
    println!("                         . = no hand   reset   quit");
    println!("Goal: keep sending 'h' for more than {:.1} seconds", threshold as f64 / 1000.0);
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("[{}] > ", session.engine().phase());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
            println!("\nSession ended. Frames: {}", session.engine().tick_count());
            break;
        }

        let now_ms = started.elapsed().as_millis() as u64;
        let action = match parse_interactive(line) {
            Some(action) => action,
            None => {
                println!("  ⚠ Unknown input '{}' (use h, h <x>, ., reset, quit)", line);
                continue;
            }
        };

        let event = ScriptEvent::new(now_ms, action);
        match event.frame() {
            Some(frame) => {
                let output = session.frame(&frame, now_ms);
                if args.json {
                    print_output(&output, args);
                } else {
                    print_frame(&output, args.no_color);
                    print_reveal(&output, args.no_color);
                }
            }
            None => {
                info!("reset at {}ms", now_ms);
                let output = session.reset();
                if args.json {
                    print_output(&output, args);
                } else {
                    print_frame(&output, args.no_color);
                }
            }
        }
    }
}

fn parse_interactive(line: &str) -> Option<ScriptAction> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None | Some(".") => Some(ScriptAction::NoHand),
        Some(cmd) if cmd.eq_ignore_ascii_case("reset") || cmd.eq_ignore_ascii_case("r") => {
            Some(ScriptAction::Reset)
        }
        Some(cmd) if cmd.eq_ignore_ascii_case("h") || cmd.eq_ignore_ascii_case("hand") => {
            match parts.next() {
                None => Some(ScriptAction::Hand { x: None }),
                Some(x) => x
                    .parse::<f64>()
                    .ok()
                    .filter(|x| (0.0..=1.0).contains(x))
                    .map(|x| ScriptAction::Hand { x: Some(x) }),
            }
        }
        _ => None,
    }
}

/// Print header
fn print_header(mode: &str, args: &Args) {
    if args.json {
        return;
    }
    if args.no_color {
        println!("========================================");
        println!("  palm-aura v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("{}", "╔══════════════════════════════════════╗".bold());
        println!("{}", format!("║   ✋ palm-aura v{} - {:<12}     ║", VERSION, mode).bold());
        println!("{}", "╚══════════════════════════════════════╝".bold());
    }
    println!();
}

/// Print one output; transitions only unless verbose
fn print_output(output: &FrameOutput, args: &Args) {
    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("failed to serialize output: {}", e),
        }
        return;
    }
    if args.verbose || output.reason.is_transition() || output.clock_clamped {
        print_frame(output, args.no_color);
    }
    print_reveal(output, args.no_color);
}

fn print_frame(output: &FrameOutput, no_color: bool) {
    if no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }
}

/// Dialog box with the aura text, on the tick it is revealed
fn print_reveal(output: &FrameOutput, no_color: bool) {
    let Some(aura) = output.aura.as_ref().filter(|_| output.audio.is_some()) else {
        return;
    };
    println!();
    if no_color {
        println!("  YOUR AURA: {}", aura.color_name.to_uppercase());
    } else {
        let (r, g, b) = AuraProfile::by_name(&aura.color_name)
            .map(|a| a.rgb())
            .unwrap_or((255, 255, 255));
        println!(
            "  {} {}",
            "YOUR AURA:".bold(),
            aura.color_name.to_uppercase().truecolor(r, g, b).bold()
        );
    }
    println!("  {}", aura.description);
    println!("  ({})", ReadingPhase::Revealed.prompt());
    println!();
}

/// Run HTTP API server
async fn run_serve(config: ReadingConfig, args: &Args) {
    println!();
    println!("╔══════════════════════════════════════╗");
    println!("║  ✋ Palm Aura API Server             ║");
    println!("║  Version: {}                      ║", VERSION);
    println!("╚══════════════════════════════════════╝");
    println!();

    info!("serving on {}", args.addr);
    if let Err(e) = run_server(&args.addr, config, args.seed.clone()).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
