use crate::error::ProtocolError;
use crate::geometry::{Point, Rect};
use crate::protocol::{GameObject, ObjectType, TurnUpdate, DEFAULT_CLOSING_BOUNDARY_ID};
use std::collections::HashMap;

/// Local mirror of every object the server has told us about.
#[derive(Clone, Debug, Default)]
pub struct World {
    objects: HashMap<String, GameObject>,
    width: f64,
    height: f64,
    closing_boundary_id: String,
}

impl World {
    pub fn new() -> Self {
        Self::with_closing_boundary_id(DEFAULT_CLOSING_BOUNDARY_ID)
    }

    pub fn with_closing_boundary_id(id: &str) -> Self {
        Self {
            closing_boundary_id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn apply_updates(&mut self, updated: HashMap<String, GameObject>) {
        self.objects.extend(updated);
    }

    /// Returns how many ids were actually present.
    pub fn apply_deletions(&mut self, deleted: &[String]) -> usize {
        deleted
            .iter()
            .filter(|id| self.objects.remove(id.as_str()).is_some())
            .count()
    }

    pub fn apply_delta(&mut self, update: TurnUpdate) {
        let removed = self.apply_deletions(&update.deleted_objects);
        let updated = update.updated_objects.len();
        self.apply_updates(update.updated_objects);
        tracing::trace!(removed, updated, tracked = self.objects.len(), "applied delta");
    }

    pub fn position_of(&self, id: &str) -> Option<Point> {
        self.objects
            .get(id)
            .and_then(|object| object.position.as_ref())
            .and_then(|position| position.as_point())
    }

    pub fn velocity_of(&self, id: &str) -> Option<[f64; 2]> {
        self.objects.get(id).and_then(GameObject::velocity)
    }

    /// Bounding box of the closing boundary. Looked up by the configured id
    /// first, then by type.
    pub fn closing_boundary(&self) -> Option<Rect> {
        let object = self.objects.get(&self.closing_boundary_id).or_else(|| {
            self.objects
                .values()
                .find(|object| object.kind == ObjectType::ClosingBoundary)
        })?;
        Rect::bounding(object.position.as_ref()?.vertices())
    }

    /// Caches the map size as the largest x and y over all boundary vertices.
    pub fn compute_dimensions(&mut self) -> Result<(f64, f64), ProtocolError> {
        let mut found = false;
        let mut width = f64::NEG_INFINITY;
        let mut height = f64::NEG_INFINITY;
        for object in self.objects.values() {
            if object.kind != ObjectType::Boundary {
                continue;
            }
            let Some(position) = &object.position else {
                continue;
            };
            for vertex in position.vertices() {
                found = true;
                width = width.max(vertex[0]);
                height = height.max(vertex[1]);
            }
        }
        if !found {
            return Err(ProtocolError::NoBoundaries);
        }
        self.width = width;
        self.height = height;
        Ok((width, height))
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        [self.width / 2.0, self.height / 2.0]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::Position;
    use serde_json::{json, Map};

    pub(crate) fn object(kind: ObjectType, position: Position) -> GameObject {
        GameObject {
            kind,
            position: Some(position),
            velocity: None,
            extra: Map::new(),
        }
    }

    pub(crate) fn tank(x: f64, y: f64, velocity: Option<[f64; 2]>) -> GameObject {
        GameObject {
            velocity: velocity.map(|pair| json!(pair)),
            ..object(ObjectType::Tank, Position::Point([x, y]))
        }
    }

    pub(crate) fn rectangle(kind: ObjectType, min: Point, max: Point) -> GameObject {
        object(
            kind,
            Position::Polygon(vec![
                [min[0], max[1]],
                [min[0], min[1]],
                [max[0], min[1]],
                [max[0], max[1]],
            ]),
        )
    }

    fn update(objects: Vec<(&str, GameObject)>, deleted: Vec<&str>) -> TurnUpdate {
        TurnUpdate {
            updated_objects: objects
                .into_iter()
                .map(|(id, object)| (id.to_string(), object))
                .collect(),
            deleted_objects: deleted.into_iter().map(str::to_string).collect(),
        }
    }

    #[test]
    fn updates_insert_or_replace() {
        let mut world = World::new();
        world.apply_delta(update(vec![("tank-1", tank(1.0, 2.0, None))], vec![]));
        assert_eq!(world.position_of("tank-1"), Some([1.0, 2.0]));

        world.apply_delta(update(vec![("tank-1", tank(5.0, 6.0, Some([1.0, 1.0])))], vec![]));
        assert_eq!(world.len(), 1);
        assert_eq!(world.position_of("tank-1"), Some([5.0, 6.0]));
        assert_eq!(world.velocity_of("tank-1"), Some([1.0, 1.0]));
    }

    #[test]
    fn deleting_unknown_id_is_a_no_op() {
        let mut world = World::new();
        world.apply_delta(update(vec![("bullet-1", tank(0.0, 0.0, None))], vec![]));
        assert_eq!(world.apply_deletions(&["ghost".to_string()]), 0);
        assert_eq!(world.len(), 1);

        let delta = update(vec![], vec!["bullet-1", "bullet-1"]);
        world.apply_delta(delta.clone());
        world.apply_delta(delta);
        assert!(world.is_empty());
    }

    #[test]
    fn deletions_apply_before_updates() {
        let mut world = World::new();
        world.apply_delta(update(vec![("tank-1", tank(1.0, 1.0, None))], vec![]));
        world.apply_delta(update(vec![("tank-1", tank(9.0, 9.0, None))], vec!["tank-1"]));
        assert_eq!(world.position_of("tank-1"), Some([9.0, 9.0]));
    }

    #[test]
    fn dimensions_come_from_boundary_extremes() {
        let mut world = World::new();
        world.apply_updates(
            [
                (
                    "boundary-1".to_string(),
                    rectangle(ObjectType::Boundary, [0.0, 0.0], [1800.0, 20.0]),
                ),
                (
                    "boundary-2".to_string(),
                    rectangle(ObjectType::Boundary, [0.0, 980.0], [1800.0, 1000.0]),
                ),
                ("tank-1".to_string(), tank(5000.0, 5000.0, None)),
            ]
            .into_iter()
            .collect(),
        );

        assert_eq!(world.compute_dimensions().unwrap(), (1800.0, 1000.0));
        assert_eq!(world.center(), [900.0, 500.0]);
    }

    #[test]
    fn dimensions_without_boundaries_fail() {
        let mut world = World::new();
        world.apply_updates([("tank-1".to_string(), tank(1.0, 1.0, None))].into_iter().collect());
        assert!(matches!(
            world.compute_dimensions(),
            Err(ProtocolError::NoBoundaries)
        ));
    }

    #[test]
    fn closing_boundary_found_by_type_or_id() {
        let mut world = World::new();
        assert!(world.closing_boundary().is_none());

        world.apply_updates(
            [(
                "zone".to_string(),
                rectangle(ObjectType::ClosingBoundary, [10.0, 10.0], [90.0, 40.0]),
            )]
            .into_iter()
            .collect(),
        );
        let rect = world.closing_boundary().unwrap();
        assert_eq!((rect.min_x, rect.max_y), (10.0, 40.0));

        let mut world = World::with_closing_boundary_id("custom");
        world.apply_updates(
            [(
                "custom".to_string(),
                rectangle(ObjectType::Other(99), [0.0, 0.0], [5.0, 5.0]),
            )]
            .into_iter()
            .collect(),
        );
        assert_eq!(world.closing_boundary().unwrap().max_x, 5.0);
    }

    #[test]
    fn configured_closing_boundary_id_wins_over_type() {
        let mut world = World::with_closing_boundary_id("zone-a");
        world.apply_updates(
            [
                (
                    "zone-a".to_string(),
                    rectangle(ObjectType::ClosingBoundary, [0.0, 0.0], [50.0, 50.0]),
                ),
                (
                    "zone-b".to_string(),
                    rectangle(ObjectType::ClosingBoundary, [0.0, 0.0], [900.0, 900.0]),
                ),
            ]
            .into_iter()
            .collect(),
        );
        for _ in 0..8 {
            assert_eq!(world.closing_boundary().unwrap().max_x, 50.0);
        }
    }

    #[test]
    fn per_vertex_velocity_and_untyped_objects_sync_cleanly() {
        let update = crate::protocol::parse_turn_update(&json!({
            "updated_objects": {
                "closing_boundary-1": {
                    "type": 6,
                    "position": [[0, 100], [0, 0], [200, 0], [200, 100]],
                    "velocity": [[1, -1], [1, 1], [-1, 1], [-1, -1]]
                },
                "loose": {"position": [1, 1]}
            }
        }))
        .unwrap();

        let mut world = World::new();
        world.apply_delta(update);
        assert_eq!(world.len(), 2);
        assert!(world.velocity_of("closing_boundary-1").is_none());
        assert_eq!(world.closing_boundary().unwrap().max_x, 200.0);
        assert_eq!(world.position_of("loose"), Some([1.0, 1.0]));
    }
}
