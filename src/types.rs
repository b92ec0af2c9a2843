use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn from_angle(radians: f64) -> Self {
        Vector2D::new(radians.cos(), radians.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: Vector2D) -> f64 {
        self.sub(other).length()
    }

    /// Unit vector in the same direction, or the zero vector when there is
    /// no direction to speak of.
    pub fn normalize_or_zero(&self) -> Self {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            self.scale(1.0 / length)
        } else {
            Vector2D::default()
        }
    }
}

pub trait GameObject {
    fn position(&self) -> Vector2D;
    fn radius(&self) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }

    /// Strictly inside, matching the culling rule: a coordinate on the edge is out.
    pub fn contains(&self, point: Vector2D) -> bool {
        point.x > 0.0 && point.x < self.width && point.y > 0.0 && point.y < self.height
    }
}
