use anyhow::{bail, Context};
use clap::Parser;
use runmix_core::{
    generate_run, seed_from_str, GeneratorConfig, Preset, Run, RunSummary, TrackPlan,
    TrackSettings, DEFAULT_FADE_MS,
};
use runmix_data::{builtin_preset, load_preset, load_track_config, TrackConfig};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RUNMIX_LOG";

#[derive(Debug, Parser)]
#[command(name = "runmix", about = "Simulate a run and plan its soundtrack")]
struct Args {
    /// Seed for the run. Integers are used as-is, other text is hashed.
    #[arg(long)]
    seed: Option<String>,
    /// Generator preset: classic or flat.
    #[arg(long, default_value = "classic")]
    preset: String,
    /// Assets directory holding presets/ and tracks.json. Built-in tables
    /// are used when omitted.
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Loop length of the theme tracks in milliseconds.
    #[arg(long)]
    base_length: Option<u64>,
    /// Crossfade length in milliseconds.
    #[arg(long, default_value_t = DEFAULT_FADE_MS)]
    fade: u32,
    /// Write the generated run as JSON.
    #[arg(long)]
    run_json: Option<PathBuf>,
    /// Summarize and plan a run exported earlier with --run-json instead of
    /// generating a new one.
    #[arg(long, conflicts_with = "seed")]
    replay: Option<PathBuf>,
    /// Write the track plan as JSON.
    #[arg(long)]
    plan_json: Option<PathBuf>,
    /// Only print the summary block.
    #[arg(long, short)]
    quiet: bool,
    /// Debug logging on stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct PlanExport<'a> {
    tracks: Option<&'a TrackConfig>,
    plan: &'a TrackPlan,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let preset: Preset = args.preset.parse()?;
    let config = load_config(args.assets.as_deref(), preset)?;
    let tracks = match args.assets.as_deref() {
        Some(dir) => Some(load_track_config(dir)?),
        None => None,
    };
    let base_length_ms = args
        .base_length
        .or_else(|| tracks.as_ref().map(|t| t.base_length_ms));
    if args.plan_json.is_some() && base_length_ms.is_none() {
        bail!("--plan-json needs --base-length or an assets dir with tracks.json");
    }

    let run = match &args.replay {
        Some(path) => {
            let raw =
                fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            run_from_json(&raw).with_context(|| format!("replay {}", path.display()))?
        }
        None => {
            let seed = args.seed.as_deref().map(seed_from_str);
            if !args.quiet {
                println!("Creating run...");
            }
            generate_run(seed, &config)?
        }
    };
    let summary = RunSummary::from_run(&run, config.max_ante);
    println!("{summary}");
    if !args.quiet {
        if let Some(seed) = run.seed() {
            println!("  > Seed: {seed}");
        }
        if run.truncated() {
            println!("  > Stopped at the step cap ({} steps)", config.max_steps);
        }
    }

    // Build everything before touching the filesystem so a bad setting
    // never leaves a half-written export behind.
    let plan = match base_length_ms {
        Some(base) => {
            let settings = TrackSettings {
                base_length_ms: base,
                fade_ms: args.fade,
            };
            Some(TrackPlan::from_run(&run, &settings)?)
        }
        None => None,
    };
    let run_json = args
        .run_json
        .as_ref()
        .map(|path| to_json(&run).map(|raw| (path, raw)))
        .transpose()?;
    let plan_json = match (&args.plan_json, &plan) {
        (Some(path), Some(plan)) => Some((
            path,
            to_json(&PlanExport {
                tracks: tracks.as_ref(),
                plan,
            })?,
        )),
        _ => None,
    };

    if let Some(plan) = &plan {
        if !args.quiet {
            println!("Planning track...");
            println!(
                "  > Segments: {} ({} crossfades, {} pack effects)",
                plan.segments.len(),
                plan.crossfade_count(),
                plan.sfx_count()
            );
        }
        debug!(total_ms = plan.total_ms(), "track plan built");
    }
    if let Some((path, raw)) = run_json {
        write_file(path, &raw)?;
    }
    if let Some((path, raw)) = plan_json {
        write_file(path, &raw)?;
    }

    if !args.quiet {
        println!("Completed!");
    }
    Ok(())
}

fn load_config(assets: Option<&Path>, preset: Preset) -> anyhow::Result<GeneratorConfig> {
    match assets {
        Some(dir) => load_preset(dir, preset.name()),
        None => {
            let config = builtin_preset(preset);
            config.validate()?;
            Ok(config)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("serialize json")
}

fn write_file(path: &Path, raw: &str) -> anyhow::Result<()> {
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = raw.len(), "wrote export");
    Ok(())
}

fn run_from_json(raw: &str) -> anyhow::Result<Run> {
    let run: Run = serde_json::from_str(raw).context("parse run json")?;
    if run.is_empty() {
        bail!("run has no steps");
    }
    Ok(run)
}
