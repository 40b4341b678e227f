use crate::bot::Bot;
use crate::game::{Game, TurnStatus};
use crate::pathing::MoveKind;
use crate::protocol::{parse_line, Incoming};
use crate::transport::{LineTransport, Transport};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub map_width: f64,
    pub map_height: f64,
    pub turns: u32,
    pub shots: u32,
    pub jittered_shots: u32,
    pub retreat_turns: u32,
    pub roam_turns: u32,
    pub final_objects: usize,
    /// False when the channel closed before the end signal.
    pub ended_cleanly: bool,
}

/// Plays one full game over `transport`: handshake, then one decision per
/// turn until the end signal or disconnect.
pub fn run(bot: &mut Bot, transport: &mut dyn Transport, seed: u32) -> Result<RunMetrics> {
    let mut game =
        Game::connect(transport, &bot.cfg.closing_boundary_id).context("init handshake failed")?;
    bot.reset(seed, game.ids.clone());

    let mut metrics = RunMetrics {
        bot_id: bot.cfg.id.clone(),
        seed,
        map_width: game.world.width(),
        map_height: game.world.height(),
        ..RunMetrics::default()
    };

    loop {
        let status = game
            .read_next_turn(transport)
            .with_context(|| format!("failed to read turn {}", metrics.turns + 1))?;
        match status {
            TurnStatus::Continue => {}
            TurnStatus::Ended => {
                metrics.ended_cleanly = true;
                break;
            }
            TurnStatus::Disconnected => {
                tracing::warn!(turns = metrics.turns, "channel closed without end signal");
                break;
            }
        }

        let decision = bot.decide(&game.world);
        transport
            .post_message(&decision.response())
            .with_context(|| format!("failed to post turn {}", metrics.turns + 1))?;

        metrics.turns += 1;
        if let Some(shot) = decision.shot {
            metrics.shots += 1;
            if shot.offset_deg != 0 {
                metrics.jittered_shots += 1;
            }
        }
        match decision.movement.kind {
            MoveKind::Retreat => metrics.retreat_turns += 1,
            MoveKind::Roam => metrics.roam_turns += 1,
        }
        tracing::debug!(
            turn = metrics.turns,
            shoot = ?decision.shot.map(|shot| shot.angle),
            path = ?decision.movement.target,
            kind = ?decision.movement.kind,
            "posted decision"
        );
    }

    metrics.final_objects = game.world.len();
    tracing::info!(
        turns = metrics.turns,
        shots = metrics.shots,
        retreats = metrics.retreat_turns,
        ended_cleanly = metrics.ended_cleanly,
        "game over"
    );
    Ok(metrics)
}

/// Replays a recorded transcript (one incoming message per line) and writes the
/// responses to `output`, one per line.
pub fn replay_file(bot: &mut Bot, input: &Path, output: &Path, seed: u32) -> Result<RunMetrics> {
    let reader = BufReader::new(
        fs::File::open(input).with_context(|| format!("failed to open {}", input.display()))?,
    );
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(
        fs::File::create(output)
            .with_context(|| format!("failed to create {}", output.display()))?,
    );
    let mut transport = LineTransport::new(reader, writer);
    run(bot, &mut transport, seed)
}

/// Loads a transcript into memory so it can be replayed many times.
pub fn load_transcript(path: &Path) -> Result<Vec<Incoming>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut messages = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let message =
            parse_line(line).with_context(|| format!("{}:{}", path.display(), index + 1))?;
        messages.push(message);
    }
    Ok(messages)
}
