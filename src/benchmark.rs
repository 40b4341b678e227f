use crate::bot::Bot;
use crate::config::BotConfig;
use crate::protocol::Incoming;
use crate::runner::{self, RunMetrics};
use crate::transport::ScriptedTransport;
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub seed: u32,
    pub seed_hex: String,
    pub turns: u32,
    pub shots: u32,
    pub jittered_shots: u32,
    pub retreat_turns: u32,
    pub roam_turns: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub bot_id: String,
    pub transcript: String,
    pub seed_count: usize,
    pub turns_per_run: u32,
    pub avg_shots: f64,
    pub jitter_rate: f64,
    pub retreat_rate: f64,
    /// Mean distance between consecutive posted `path` targets (roams and
    /// retreats alike), in map units.
    pub avg_path_step: f64,
    pub runs: Vec<RunRecord>,
}

pub struct BenchmarkConfig {
    pub bot_config: BotConfig,
    pub transcript: PathBuf,
    pub seeds: Vec<u32>,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

struct InternalRun {
    metrics: RunMetrics,
    path_step: f64,
}

/// Replays one transcript under every seed and summarizes how the decisions
/// spread. The world deltas are identical across runs; only the rng differs.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }

    let messages = runner::load_transcript(&config.transcript)?;
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_one = |seed: &u32| -> Result<InternalRun> { replay_seed(&config, &messages, *seed) };

    let run_results: Vec<Result<InternalRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let total_runs = runs.len() as f64;
    let total_turns: u64 = runs.iter().map(|r| r.metrics.turns as u64).sum();
    let total_shots: u64 = runs.iter().map(|r| r.metrics.shots as u64).sum();
    let jittered: u64 = runs.iter().map(|r| r.metrics.jittered_shots as u64).sum();
    let retreats: u64 = runs.iter().map(|r| r.metrics.retreat_turns as u64).sum();
    let path_step_sum: f64 = runs.iter().map(|r| r.path_step).sum();

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|r| RunRecord {
            seed: r.metrics.seed,
            seed_hex: format!("{:#010x}", r.metrics.seed),
            turns: r.metrics.turns,
            shots: r.metrics.shots,
            jittered_shots: r.metrics.jittered_shots,
            retreat_turns: r.metrics.retreat_turns,
            roam_turns: r.metrics.roam_turns,
        })
        .collect();
    run_records.sort_by_key(|r| r.seed);

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        bot_id: config.bot_config.id.clone(),
        transcript: config.transcript.to_string_lossy().into_owned(),
        seed_count: runs.len(),
        turns_per_run: runs.first().map(|r| r.metrics.turns).unwrap_or(0),
        avg_shots: total_shots as f64 / total_runs,
        jitter_rate: ratio(jittered, total_shots),
        retreat_rate: ratio(retreats, total_turns),
        avg_path_step: path_step_sum / total_runs,
        runs: run_records,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary")?,
    )?;

    Ok(report)
}

fn replay_seed(config: &BenchmarkConfig, messages: &[Incoming], seed: u32) -> Result<InternalRun> {
    let mut bot = Bot::new(config.bot_config.clone(), seed);
    let mut transport = ScriptedTransport::new(messages.iter().cloned());
    let metrics = runner::run(&mut bot, &mut transport, seed)
        .with_context(|| format!("benchmark run failed for seed={seed:#x}"))?;

    let steps: Vec<f64> = transport
        .posted
        .windows(2)
        .map(|pair| crate::geometry::distance(pair[0].path, pair[1].path))
        .collect();
    let path_step = if steps.is_empty() {
        0.0
    } else {
        steps.iter().sum::<f64>() / steps.len() as f64
    };

    Ok(InternalRun { metrics, path_step })
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
