use crate::error::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const END_INIT_SIGNAL: &str = "END_INIT";
pub const END_SIGNAL: &str = "END";
pub const DEFAULT_CLOSING_BOUNDARY_ID: &str = "closing_boundary-1";

// ── Object model ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ObjectType {
    Tank,
    Bullet,
    Wall,
    DestructibleWall,
    Boundary,
    ClosingBoundary,
    Powerup,
    Other(u8),
}

impl From<u8> for ObjectType {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Tank,
            2 => Self::Bullet,
            3 => Self::Wall,
            4 => Self::DestructibleWall,
            5 => Self::Boundary,
            6 => Self::ClosingBoundary,
            7 => Self::Powerup,
            other => Self::Other(other),
        }
    }
}

impl Default for ObjectType {
    fn default() -> Self {
        Self::Other(0)
    }
}

impl From<ObjectType> for u8 {
    fn from(kind: ObjectType) -> Self {
        match kind {
            ObjectType::Tank => 1,
            ObjectType::Bullet => 2,
            ObjectType::Wall => 3,
            ObjectType::DestructibleWall => 4,
            ObjectType::Boundary => 5,
            ObjectType::ClosingBoundary => 6,
            ObjectType::Powerup => 7,
            ObjectType::Other(code) => code,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Point([f64; 2]),
    Polygon(Vec<[f64; 2]>),
}

impl Position {
    pub fn as_point(&self) -> Option<[f64; 2]> {
        match self {
            Self::Point(point) => Some(*point),
            Self::Polygon(_) => None,
        }
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        match self {
            Self::Point(point) => std::slice::from_ref(point),
            Self::Polygon(vertices) => vertices,
        }
    }
}

/// Interpreted fields decode leniently: a missing or oddly shaped `type` or
/// `position` never rejects the whole message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: ObjectType,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Position>,
    /// Kept raw; only a `[vx, vy]` pair is read back by [`GameObject::velocity`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Value>,
    /// Attributes the bot does not interpret (hp, power-up kind, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameObject {
    pub fn velocity(&self) -> Option<[f64; 2]> {
        self.velocity
            .as_ref()
            .and_then(|raw| <[f64; 2]>::deserialize(raw).ok())
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(T::deserialize(raw).ok())
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<ObjectType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, ObjectType>(deserializer)?.unwrap_or_default())
}

// ── Incoming messages ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Incoming {
    Signal(String),
    Payload { message: Value },
}

impl Incoming {
    pub fn is_signal(&self, signal: &str) -> bool {
        matches!(self, Self::Signal(found) if found == signal)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TankIds {
    #[serde(rename = "your-tank-id")]
    pub own: String,
    #[serde(rename = "enemy-tank-id")]
    pub enemy: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TurnUpdate {
    #[serde(default)]
    pub updated_objects: HashMap<String, GameObject>,
    #[serde(default)]
    pub deleted_objects: Vec<String>,
}

pub fn parse_line(line: &str) -> Result<Incoming, ProtocolError> {
    serde_json::from_str(line.trim()).map_err(|err| ProtocolError::InvalidJson {
        line: line.trim().to_string(),
        reason: err.to_string(),
    })
}

pub fn parse_tank_ids(message: &Value) -> Result<TankIds, ProtocolError> {
    for field in ["your-tank-id", "enemy-tank-id"] {
        if message.get(field).is_none() {
            return Err(ProtocolError::MissingField { field });
        }
    }
    TankIds::deserialize(message).map_err(|err| ProtocolError::InvalidJson {
        line: message.to_string(),
        reason: err.to_string(),
    })
}

pub fn parse_turn_update(message: &Value) -> Result<TurnUpdate, ProtocolError> {
    TurnUpdate::deserialize(message).map_err(|err| ProtocolError::InvalidJson {
        line: message.to_string(),
        reason: err.to_string(),
    })
}

// ── Outgoing messages ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoot: Option<f64>,
    pub path: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signals_and_payloads_are_distinguished() {
        assert!(parse_line("\"END_INIT\"\n").unwrap().is_signal(END_INIT_SIGNAL));
        assert!(parse_line("\"END\"").unwrap().is_signal(END_SIGNAL));
        let payload = parse_line(r#"{"message": {"deleted_objects": []}}"#).unwrap();
        assert!(!payload.is_signal(END_SIGNAL));
        assert!(matches!(payload, Incoming::Payload { .. }));
    }

    #[test]
    fn garbage_line_is_reported() {
        let err = parse_line("{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidJson { .. }));
    }

    #[test]
    fn tank_ids_require_both_fields() {
        let ids = parse_tank_ids(&json!({"your-tank-id": "tank-1", "enemy-tank-id": "tank-2"}))
            .unwrap();
        assert_eq!(ids.own, "tank-1");
        assert_eq!(ids.enemy, "tank-2");

        let err = parse_tank_ids(&json!({"your-tank-id": "tank-1"})).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField {
                field: "enemy-tank-id"
            }
        ));
    }

    #[test]
    fn objects_keep_points_polygons_and_unknown_attributes() {
        let update = parse_turn_update(&json!({
            "updated_objects": {
                "tank-1": {"type": 1, "position": [10.0, 20.0], "velocity": [1.0, 0.0], "hp": 3},
                "boundary-1": {"type": 5, "position": [[0, 100], [0, 0], [200, 0], [200, 100]]},
                "mystery": {"type": 42}
            }
        }))
        .unwrap();

        assert!(update.deleted_objects.is_empty());
        let tank = &update.updated_objects["tank-1"];
        assert_eq!(tank.kind, ObjectType::Tank);
        assert_eq!(tank.position.as_ref().and_then(Position::as_point), Some([10.0, 20.0]));
        assert_eq!(tank.extra.get("hp"), Some(&json!(3)));

        let boundary = &update.updated_objects["boundary-1"];
        assert_eq!(boundary.kind, ObjectType::Boundary);
        assert_eq!(boundary.position.as_ref().unwrap().vertices().len(), 4);

        let mystery = &update.updated_objects["mystery"];
        assert_eq!(mystery.kind, ObjectType::Other(42));
        assert!(mystery.position.is_none());
    }

    #[test]
    fn odd_attribute_shapes_do_not_reject_the_message() {
        let update = parse_turn_update(&json!({
            "updated_objects": {
                "closing_boundary-1": {
                    "type": 6,
                    "position": [[0, 100], [0, 0], [200, 0], [200, 100]],
                    "velocity": [[1, -1], [1, 1], [-1, 1], [-1, -1]]
                },
                "untyped": {"position": [1, 1]},
                "weird": {"type": "tank", "position": "somewhere", "velocity": 7}
            }
        }))
        .unwrap();

        let zone = &update.updated_objects["closing_boundary-1"];
        assert_eq!(zone.kind, ObjectType::ClosingBoundary);
        assert_eq!(zone.position.as_ref().unwrap().vertices().len(), 4);
        assert!(zone.velocity().is_none());
        assert_eq!(zone.velocity.as_ref().and_then(Value::as_array).map(Vec::len), Some(4));

        let untyped = &update.updated_objects["untyped"];
        assert_eq!(untyped.kind, ObjectType::Other(0));
        assert_eq!(untyped.position, Some(Position::Point([1.0, 1.0])));

        let weird = &update.updated_objects["weird"];
        assert_eq!(weird.kind, ObjectType::Other(0));
        assert!(weird.position.is_none());
        assert!(weird.velocity().is_none());
    }

    #[test]
    fn velocity_pair_is_read_back() {
        let update = parse_turn_update(&json!({
            "updated_objects": {"tank-1": {"type": 1, "position": [0, 0], "velocity": [2, -3]}}
        }))
        .unwrap();
        assert_eq!(update.updated_objects["tank-1"].velocity(), Some([2.0, -3.0]));
    }

    #[test]
    fn response_omits_shoot_when_absent() {
        let response = TurnResponse {
            shoot: None,
            path: [1.0, 2.0],
        };
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"path": [1.0, 2.0]}));

        let response = TurnResponse {
            shoot: Some(90.0),
            path: [1.0, 2.0],
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"shoot": 90.0, "path": [1.0, 2.0]})
        );
    }
}
