// ── Points ──────────────────────────────────────────────────────────

pub type Point = [f64; 2];

pub fn distance(a: Point, b: Point) -> f64 {
    ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

// ── Axis-aligned rectangles ─────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn from_size(width: f64, height: f64) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
        }
    }

    /// Bounding box of a vertex list; `None` when empty.
    pub fn bounding(vertices: &[Point]) -> Option<Self> {
        let first = vertices.first()?;
        let mut rect = Self {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };
        for vertex in &vertices[1..] {
            rect.min_x = rect.min_x.min(vertex[0]);
            rect.min_y = rect.min_y.min(vertex[1]);
            rect.max_x = rect.max_x.max(vertex[0]);
            rect.max_y = rect.max_y.max(vertex[1]);
        }
        Some(rect)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        [
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        ]
    }

    /// Moves every edge inward by `fraction` of the span along its axis.
    pub fn shrink(&self, fraction: f64) -> Self {
        let dx = self.width() * fraction;
        let dy = self.height() * fraction;
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x - dx,
            max_y: self.max_y - dy,
        }
    }

    /// Edges count as inside.
    pub fn contains(&self, point: Point) -> bool {
        point[0] >= self.min_x
            && point[0] <= self.max_x
            && point[1] >= self.min_y
            && point[1] <= self.max_y
    }
}
