//! Visemer CLI: lip-sync timelines and blendshape curves from aligner output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use visemer_core::config::{LipSyncConfig, Modulation};
use visemer_core::pipeline::{self, PipelineInputs, Session};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "visemer",
    about = "Coarticulated lip-sync animation from phoneme alignments",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the viseme timeline and prosody statistics
    Analyze(AnalyzeArgs),
    /// Simulate playback and dump per-tick blendshape weights
    Render(RenderArgs),
    /// Load and validate a configuration file
    CheckConfig(CheckConfigArgs),
}

// ─── Shared arguments (embedded in each subcommand) ──────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Alignment file (CereVoice log or MAUS TextGrid)
    alignment: PathBuf,

    /// Alignment format
    #[arg(long, default_value = "auto", value_parser = ["auto", "cerevoice", "textgrid"])]
    format: String,

    /// JSON configuration file (default: built-in settings)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prosody input: OpenSmile CSV, pitch table, or WAV audio
    #[arg(long)]
    prosody: Option<PathBuf>,

    /// Reference word timings (`word start end` per line) to retarget onto
    #[arg(long)]
    reference_words: Option<PathBuf>,

    /// Animate alveolars on a separate track
    #[arg(long, default_value_t = false)]
    alveolar_layer: bool,

    /// Prosody modulation of viseme weights
    #[arg(long, value_parser = ["none", "range", "ratio"])]
    modulation: Option<String>,

    /// Choose the emotion from the pitch median
    #[arg(long, default_value_t = false)]
    emotion_from_pitch: bool,

    /// Output JSON file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Analyze ─────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Run the coarticulation pipeline and write the session as JSON")]
struct AnalyzeArgs {
    #[command(flatten)]
    shared: SharedArgs,
}

// ─── Render ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Play the session at a fixed tick rate and write weight frames")]
struct RenderArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Ticks per second (default: playback.tick_rate_hz from the config)
    #[arg(long)]
    tick_rate: Option<f64>,
}

// ─── Check config ────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct CheckConfigArgs {
    /// Configuration file to validate
    config: PathBuf,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = match &cli.command {
        Command::Analyze(a) if a.shared.verbose => "debug",
        Command::Render(a) if a.shared.verbose => "debug",
        Command::CheckConfig(a) if a.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Render(args) => run_render(args),
        Command::CheckConfig(args) => run_check_config(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Validate input files exist.
fn validate_inputs(paths: &[Option<&Path>]) -> Result<()> {
    for p in paths.iter().flatten() {
        if !p.exists() {
            bail!("File not found: {}", p.display());
        }
    }
    Ok(())
}

/// Load the configuration and apply command-line overrides.
fn load_config(shared: &SharedArgs) -> Result<LipSyncConfig> {
    let mut config = match &shared.config {
        Some(path) => LipSyncConfig::load(path)?,
        None => LipSyncConfig::default(),
    };

    if shared.alveolar_layer {
        config.coarticulation.alveolar_layer = true;
    }
    if shared.emotion_from_pitch {
        config.emotion.from_pitch = true;
    }
    if let Some(m) = &shared.modulation {
        config.prosody.modulation = match m.as_str() {
            "range" => Modulation::Range,
            "ratio" => Modulation::Ratio,
            _ => Modulation::None,
        };
    }
    if config.prosody.modulation != Modulation::None && shared.prosody.is_none() {
        log::warn!("Prosody modulation is on but no --prosody input was given");
    }
    Ok(config)
}

fn build(shared: &SharedArgs, config: &LipSyncConfig) -> Result<Session> {
    validate_inputs(&[
        Some(shared.alignment.as_path()),
        shared.prosody.as_deref(),
        shared.reference_words.as_deref(),
    ])?;

    let inputs = PipelineInputs {
        alignment: Some(shared.alignment.as_path()),
        format: &shared.format,
        prosody: shared.prosody.as_deref(),
        reference_words: shared.reference_words.as_deref(),
    };
    pipeline::run(&inputs, config)
}

/// Write JSON to a file, or stdout when no path is given.
fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            println!("Output: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ─── Subcommands ─────────────────────────────────────────────────

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(&args.shared)?;
    let session = build(&args.shared, &config)?;
    write_json(&session, args.shared.output.as_deref())
}

fn run_render(args: RenderArgs) -> Result<()> {
    let config = load_config(&args.shared)?;
    let tick_rate = args.tick_rate.unwrap_or(config.playback.tick_rate_hz);
    if !(tick_rate > 0.0) {
        bail!("Tick rate must be > 0, got {}", tick_rate);
    }

    let session = build(&args.shared, &config)?;
    let mut animator = session
        .animator(&config)
        .context("Failed to set up playback")?;
    let frames = animator.render(tick_rate);

    let out = serde_json::json!({
        "tick_rate_hz": tick_rate,
        "emotion": session.emotion,
        "frames": frames,
    });
    write_json(&out, args.shared.output.as_deref())
}

fn run_check_config(args: CheckConfigArgs) -> Result<()> {
    validate_inputs(&[Some(args.config.as_path())])?;
    let config = LipSyncConfig::load(&args.config)?;
    println!(
        "OK: {} visemes, {} diphones, {} emotions",
        config.visemes.len(),
        config.diphones.len(),
        config.emotions.len()
    );
    Ok(())
}
