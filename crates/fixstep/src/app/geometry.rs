use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalize(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self::ZERO;
        }
        Self {
            x: self.x / length,
            y: self.y / length,
        }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        self.scale(rhs)
    }
}

/// Axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict overlap on both axes. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Edge-inclusive point containment.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Degrees, clockwise on screen (0 = right, 90 = down).
    pub rotation_degrees: f32,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation_degrees: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.rotation_degrees += degrees;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_vector_stays_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn normalize_produces_unit_length() {
        let unit = Vec2::new(3.0, 4.0).normalize();
        assert!((unit.length() - 1.0).abs() < 0.0001);
        assert!((unit.x - 0.6).abs() < 0.0001);
        assert!((unit.y - 0.8).abs() < 0.0001);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(4.0, 5.0);
        assert!((a.distance(b) - 5.0).abs() < 0.0001);
        assert!((b.distance(a) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn operators_match_named_methods() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(0.5, -1.0);
        assert_eq!(a + b, Vec2::new(1.5, 1.0));
        assert_eq!(a - b, Vec2::new(0.5, 3.0));
        assert_eq!(a * 2.0, a.scale(2.0));
    }

    #[test]
    fn rect_sharing_an_edge_does_not_intersect() {
        let left = Rect::new(0.0, 0.0, 100.0, 50.0);
        let right = Rect::new(100.0, 0.0, 100.0, 50.0);
        assert!(!left.intersects(&right));
        assert!(!right.intersects(&left));
    }

    #[test]
    fn rect_overlap_requires_both_axes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(5.0, 5.0, 10.0, 10.0);
        let same_column = Rect::new(2.0, 20.0, 4.0, 4.0);
        assert!(a.intersects(&overlapping));
        assert!(!a.intersects(&same_column));
    }

    #[test]
    fn rect_contains_includes_edges() {
        let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
        assert!(rect.contains(Vec2::new(-5.0, -5.0)));
        assert!(rect.contains(Vec2::new(5.0, 5.0)));
        assert!(rect.contains(Vec2::ZERO));
        assert!(!rect.contains(Vec2::new(5.01, 0.0)));
    }

    #[test]
    fn rect_center_is_midpoint() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn transform_translate_and_rotate_accumulate() {
        let mut transform = Transform::at(Vec2::new(1.0, 1.0));
        transform.translate(2.0, -3.0);
        transform.rotate(45.0);
        transform.rotate(45.0);
        assert_eq!(transform.position, Vec2::new(3.0, -2.0));
        assert_eq!(transform.rotation_degrees, 90.0);
        assert_eq!(transform.scale, Vec2::ONE);
    }
}
