use crate::config::BotConfig;
use crate::pathing::{plan_move, MovePlan};
use crate::protocol::{TankIds, TurnResponse};
use crate::rng::SeededRng;
use crate::targeting::{plan_shot, ShotPlan};
use crate::world::World;

#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub shot: Option<ShotPlan>,
    pub movement: MovePlan,
}

impl Decision {
    pub fn response(&self) -> TurnResponse {
        TurnResponse {
            shoot: self.shot.map(|shot| shot.angle),
            path: self.movement.target,
        }
    }
}

pub struct Bot {
    pub cfg: BotConfig,
    rng: SeededRng,
    ids: Option<TankIds>,
}

impl Bot {
    pub fn new(cfg: BotConfig, seed: u32) -> Self {
        Self {
            cfg,
            rng: SeededRng::new(seed),
            ids: None,
        }
    }

    pub fn reset(&mut self, seed: u32, ids: TankIds) {
        self.rng = SeededRng::new(seed);
        self.ids = Some(ids);
    }

    /// Read-only over the world; only the rng advances.
    pub fn decide(&mut self, world: &World) -> Decision {
        let (own_id, enemy_id) = match &self.ids {
            Some(ids) => (ids.own.as_str(), ids.enemy.as_str()),
            None => ("", ""),
        };

        let shot = if self.cfg.shoot {
            plan_shot(world, own_id, enemy_id, &self.cfg, &mut self.rng)
        } else {
            None
        };
        let movement = plan_move(world, own_id, &self.cfg, &mut self.rng);

        Decision { shot, movement }
    }
}
