use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tank_autopilot::benchmark::{self, BenchmarkConfig};
use tank_autopilot::bot::Bot;
use tank_autopilot::config::{parse_seed, read_env_seed, BotConfig, DEFAULT_SEED};
use tank_autopilot::runner;
use tank_autopilot::transport;

#[derive(Parser)]
#[command(
    name = "tank-autopilot",
    about = "Turn-based tank client: aims at the enemy and roams the safe zone"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a live game over stdin/stdout
    Play {
        /// Rng seed (hex, e.g. 0xDEADBEEF); falls back to TANK_BOT_SEED
        #[arg(long)]
        seed: Option<String>,

        /// Config file path (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use a named preset instead of config file
        #[arg(long)]
        preset: Option<String>,
    },

    /// Play a recorded transcript offline and write the responses
    Replay {
        /// Transcript with one incoming message per line
        #[arg(long)]
        input: PathBuf,

        /// Where to write the responses
        #[arg(long, default_value = "replay-output/responses.jsonl")]
        output: PathBuf,

        #[arg(long)]
        seed: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        preset: Option<String>,
    },

    /// Replay a transcript under many seeds and summarize the decisions
    Bench {
        #[arg(long)]
        input: PathBuf,

        /// Number of seeds
        #[arg(long, default_value = "16")]
        seed_count: usize,

        /// Starting seed (incremented for each run)
        #[arg(long, default_value = "0xDEADBEEF")]
        base_seed: String,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        preset: Option<String>,

        /// Output directory
        #[arg(long, default_value = "bench-output")]
        out_dir: PathBuf,

        /// Parallel jobs (default: all cores)
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Print a config as JSON
    ShowConfig {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        preset: Option<String>,
    },
}

fn main() -> Result<()> {
    // stdout carries the game protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            seed,
            config,
            preset,
        } => {
            let cfg = load_config(config, preset)?;
            let seed = resolve_seed(seed)?;
            let mut bot = Bot::new(cfg, seed);
            let mut transport = transport::stdio();
            let metrics = runner::run(&mut bot, &mut transport, seed)?;
            tracing::info!("{}", serde_json::to_string(&metrics)?);
        }

        Command::Replay {
            input,
            output,
            seed,
            config,
            preset,
        } => {
            let cfg = load_config(config, preset)?;
            let seed = resolve_seed(seed)?;
            let mut bot = Bot::new(cfg, seed);
            let metrics = runner::replay_file(&mut bot, &input, &output, seed)?;

            eprintln!(
                "seed={:#010x} turns={} shots={} retreats={} roams={} ended_cleanly={}",
                metrics.seed,
                metrics.turns,
                metrics.shots,
                metrics.retreat_turns,
                metrics.roam_turns,
                metrics.ended_cleanly,
            );
            eprintln!("responses written to {}", output.display());
        }

        Command::Bench {
            input,
            seed_count,
            base_seed,
            config,
            preset,
            out_dir,
            jobs,
        } => {
            let cfg = load_config(config, preset)?;
            let base = parse_seed(&base_seed).map_err(|e| anyhow!(e))?;
            let seeds = generate_seeds(base, seed_count);

            eprintln!(
                "Benchmarking {} on {} with {} seeds",
                cfg.id,
                input.display(),
                seed_count
            );

            let report = benchmark::run_benchmark(BenchmarkConfig {
                bot_config: cfg,
                transcript: input,
                seeds,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            eprintln!(
                "turns={} avg_shots={:.1} jitter={:.1}% retreat={:.1}% avg_path_step={:.1}",
                report.turns_per_run,
                report.avg_shots,
                report.jitter_rate * 100.0,
                report.retreat_rate * 100.0,
                report.avg_path_step,
            );
            eprintln!("report saved to {}/summary.json", out_dir.display());
        }

        Command::ShowConfig { config, preset } => {
            let cfg = load_config(config, preset)?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>, preset: Option<String>) -> Result<BotConfig> {
    let cfg = if let Some(path) = path {
        let data = std::fs::read(&path)?;
        serde_json::from_slice::<BotConfig>(&data)?
    } else if let Some(name) = preset {
        BotConfig::preset(&name).ok_or_else(|| {
            anyhow!(
                "unknown preset '{}' (try: {})",
                name,
                BotConfig::preset_names().join(", ")
            )
        })?
    } else {
        BotConfig::default()
    };
    cfg.validate().map_err(|e| anyhow!("invalid config '{}': {}", cfg.id, e))?;
    Ok(cfg)
}

fn resolve_seed(seed: Option<String>) -> Result<u32> {
    match seed {
        Some(raw) => parse_seed(&raw).map_err(|e| anyhow!(e)),
        None => Ok(read_env_seed(DEFAULT_SEED)),
    }
}

fn generate_seeds(base: u32, count: usize) -> Vec<u32> {
    (0..count as u32)
        .map(|i| base.wrapping_add(i.wrapping_mul(0x9E3779B9)))
        .collect()
}
