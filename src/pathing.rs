use crate::config::BotConfig;
use crate::geometry::{Point, Rect};
use crate::rng::SeededRng;
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveKind {
    /// Outside the safe zone, safe zone too thin, or own tank unknown.
    Retreat,
    Roam,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovePlan {
    pub target: Point,
    pub kind: MoveKind,
}

/// The closing boundary's bounding box with each edge pulled in by `margin`.
/// Falls back to the whole map before the boundary has been seen.
pub fn safe_zone(world: &World, margin: f64) -> Rect {
    world
        .closing_boundary()
        .unwrap_or_else(|| world.bounds())
        .shrink(margin)
}

pub fn plan_move(world: &World, own_id: &str, cfg: &BotConfig, rng: &mut SeededRng) -> MovePlan {
    let retreat = MovePlan {
        target: world.center(),
        kind: MoveKind::Retreat,
    };

    let Some(own) = world.position_of(own_id) else {
        return retreat;
    };

    let zone = safe_zone(world, cfg.safe_zone_margin);
    if !zone.contains(own) || zone.height() < world.height() * cfg.min_safe_height_fraction {
        return retreat;
    }

    MovePlan {
        target: [
            rng.next_f64_range(zone.min_x, zone.max_x),
            rng.next_f64_range(zone.min_y, zone.max_y),
        ],
        kind: MoveKind::Roam,
    }
}
