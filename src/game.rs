use crate::error::ProtocolError;
use crate::protocol::{
    parse_tank_ids, parse_turn_update, Incoming, TankIds, END_INIT_SIGNAL, END_SIGNAL,
};
use crate::transport::Transport;
use crate::world::World;
use serde_json::Value;

/// Outcome of waiting for the next turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStatus {
    Continue,
    /// The server sent the end signal.
    Ended,
    /// The channel closed without an end signal.
    Disconnected,
}

/// Game session state: tank ids, the synchronized world, and the last raw
/// turn message.
pub struct Game {
    pub ids: TankIds,
    pub world: World,
    pub current_turn_message: Option<Value>,
}

impl Game {
    /// Runs the init handshake: tank ids, object snapshots until `END_INIT`,
    /// then map dimensions from the boundaries.
    pub fn connect(
        transport: &mut dyn Transport,
        closing_boundary_id: &str,
    ) -> Result<Self, ProtocolError> {
        let ids = match read_required(transport, "tank id handshake")? {
            Incoming::Payload { message } => parse_tank_ids(&message)?,
            Incoming::Signal(found) => {
                return Err(ProtocolError::UnexpectedSignal {
                    expected: "tank id message",
                    found,
                })
            }
        };
        tracing::info!(own = %ids.own, enemy = %ids.enemy, "received tank ids");

        let mut world = World::with_closing_boundary_id(closing_boundary_id);
        let mut snapshots = 0usize;
        loop {
            match read_required(transport, "init snapshot")? {
                Incoming::Signal(signal) if signal == END_INIT_SIGNAL => break,
                Incoming::Signal(found) => {
                    return Err(ProtocolError::UnexpectedSignal {
                        expected: "init snapshot or END_INIT",
                        found,
                    })
                }
                Incoming::Payload { message } => {
                    world.apply_delta(parse_turn_update(&message)?);
                    snapshots += 1;
                }
            }
        }

        let (width, height) = world.compute_dimensions()?;
        tracing::info!(
            snapshots,
            objects = world.len(),
            width,
            height,
            "init complete"
        );

        Ok(Self {
            ids,
            world,
            current_turn_message: None,
        })
    }

    /// Reads one turn and applies its deltas to the world.
    pub fn read_next_turn(
        &mut self,
        transport: &mut dyn Transport,
    ) -> Result<TurnStatus, ProtocolError> {
        loop {
            let Some(incoming) = transport.read_message()? else {
                return Ok(TurnStatus::Disconnected);
            };
            match incoming {
                Incoming::Signal(signal) if signal == END_SIGNAL => return Ok(TurnStatus::Ended),
                Incoming::Signal(other) => {
                    tracing::warn!(signal = %other, "ignoring unexpected signal mid-game");
                }
                Incoming::Payload { message } => {
                    self.world.apply_delta(parse_turn_update(&message)?);
                    self.current_turn_message = Some(message);
                    return Ok(TurnStatus::Continue);
                }
            }
        }
    }
}

fn read_required(
    transport: &mut dyn Transport,
    phase: &'static str,
) -> Result<Incoming, ProtocolError> {
    transport
        .read_message()?
        .ok_or(ProtocolError::UnexpectedEof { phase })
}
