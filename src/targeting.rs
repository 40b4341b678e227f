use crate::config::BotConfig;
use crate::geometry::{distance, normalize_degrees, Point};
use crate::rng::SeededRng;
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotPlan {
    /// Final angle sent to the server, in `[0, 360)`.
    pub angle: f64,
    /// Exact bearing before jitter.
    pub bearing: f64,
    pub offset_deg: i32,
    pub distance: f64,
}

/// Bearing from `from` to `to` in degrees, counter-clockwise from +x.
pub fn angle_between(from: Point, to: Point) -> f64 {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    normalize_degrees(dy.atan2(dx).to_degrees())
}

/// Whole degrees of jitter allowed at `dist`; grows toward `max_deg` with range.
pub fn inaccuracy_limit(dist: f64, max_deg: f64, falloff: f64) -> i32 {
    if dist <= 0.0 || max_deg <= 0.0 {
        return 0;
    }
    (max_deg * dist / (dist + falloff)).trunc() as i32
}

/// Jitter only applies to a target moving along both axes.
pub fn is_moving(velocity: Option<[f64; 2]>) -> bool {
    matches!(velocity, Some([vx, vy]) if vx != 0.0 && vy != 0.0)
}

pub fn plan_shot(
    world: &World,
    own_id: &str,
    enemy_id: &str,
    cfg: &BotConfig,
    rng: &mut SeededRng,
) -> Option<ShotPlan> {
    let own = world.position_of(own_id)?;
    let enemy = world.position_of(enemy_id)?;

    let bearing = angle_between(own, enemy);
    let dist = distance(own, enemy);
    let offset_deg = if is_moving(world.velocity_of(enemy_id)) {
        let limit = inaccuracy_limit(dist, cfg.inaccuracy_max_deg, cfg.inaccuracy_falloff);
        rng.next_symmetric(limit)
    } else {
        0
    };

    Some(ShotPlan {
        angle: normalize_degrees(bearing + offset_deg as f64),
        bearing,
        offset_deg,
        distance: dist,
    })
}
