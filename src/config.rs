use crate::protocol::DEFAULT_CLOSING_BOUNDARY_ID;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_SEED: u32 = 0xC0DE_7A4C;
pub const SEED_ENV: &str = "TANK_BOT_SEED";
/// Jitter beyond a half turn only wraps around.
pub const MAX_INACCURACY_DEG: f64 = 180.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub id: String,
    pub description: String,

    // Targeting
    pub shoot: bool,
    pub inaccuracy_max_deg: f64,
    pub inaccuracy_falloff: f64,

    // Safe zone
    pub safe_zone_margin: f64,
    pub min_safe_height_fraction: f64,

    #[serde(default = "default_closing_boundary_id")]
    pub closing_boundary_id: String,
}

fn default_closing_boundary_id() -> String {
    DEFAULT_CLOSING_BOUNDARY_ID.to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            id: "roamer".to_string(),
            description: "Shoots with distance-scaled jitter, roams inside the safe zone."
                .to_string(),
            shoot: true,
            inaccuracy_max_deg: 45.0,
            inaccuracy_falloff: 100.0,
            safe_zone_margin: 0.1,
            min_safe_height_fraction: 0.1,
            closing_boundary_id: default_closing_boundary_id(),
        }
    }
}

impl BotConfig {
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "roamer" | "default" => Some(Self::default()),
            "sniper" => Some(Self {
                id: "sniper".to_string(),
                description: "No aim jitter; same safe-zone roaming.".to_string(),
                inaccuracy_max_deg: 0.0,
                ..Self::default()
            }),
            "cautious" => Some(Self {
                id: "cautious".to_string(),
                description: "Wider safe-zone margin, retreats to center earlier.".to_string(),
                safe_zone_margin: 0.2,
                min_safe_height_fraction: 0.25,
                ..Self::default()
            }),
            "pacifist" => Some(Self {
                id: "pacifist".to_string(),
                description: "Never shoots; only moves.".to_string(),
                shoot: false,
                ..Self::default()
            }),
            _ => None,
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["roamer", "sniper", "cautious", "pacifist"]
    }

    /// Rejects values that would invert the safe zone or the jitter curve.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..0.5).contains(&self.safe_zone_margin) {
            return Err(format!(
                "safe_zone_margin must be in [0, 0.5), got {}",
                self.safe_zone_margin
            ));
        }
        if !(0.0..=1.0).contains(&self.min_safe_height_fraction) {
            return Err(format!(
                "min_safe_height_fraction must be in [0, 1], got {}",
                self.min_safe_height_fraction
            ));
        }
        if !(0.0..=MAX_INACCURACY_DEG).contains(&self.inaccuracy_max_deg) {
            return Err(format!(
                "inaccuracy_max_deg must be in [0, {MAX_INACCURACY_DEG}], got {}",
                self.inaccuracy_max_deg
            ));
        }
        if !self.inaccuracy_falloff.is_finite() || self.inaccuracy_falloff <= 0.0 {
            return Err(format!(
                "inaccuracy_falloff must be finite and > 0, got {}",
                self.inaccuracy_falloff
            ));
        }
        Ok(())
    }
}

pub fn parse_seed(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex seed '{s}': {e}"))
    } else {
        s.parse::<u32>()
            .map_err(|e| format!("invalid seed '{s}': {e}"))
    }
}

pub fn read_env_seed(default: u32) -> u32 {
    match env::var(SEED_ENV) {
        Ok(value) => match parse_seed(&value) {
            Ok(seed) => seed,
            Err(err) => {
                tracing::warn!("{SEED_ENV} ignored: {err}");
                default
            }
        },
        Err(_) => default,
    }
}
