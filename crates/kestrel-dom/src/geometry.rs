//! Box Geometry
//!
//! Vectors, rectangles, layout boxes and 2D transforms shared by the
//! style and render crates. Layout itself happens elsewhere; the tree only
//! stores its results.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// 2D vector (floating point)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

impl Vector2f {
    pub const ZERO: Vector2f = Vector2f { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same value in both components
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Component-wise maximum
    pub fn max(self, other: Vector2f) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise minimum
    pub fn min(self, other: Vector2f) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn dot(self, other: Vector2f) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    pub fn ceil(self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil())
    }
}

impl Add for Vector2f {
    type Output = Vector2f;
    fn add(self, rhs: Vector2f) -> Vector2f {
        Vector2f::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2f {
    type Output = Vector2f;
    fn sub(self, rhs: Vector2f) -> Vector2f {
        Vector2f::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2f {
    type Output = Vector2f;
    fn mul(self, rhs: f32) -> Vector2f {
        Vector2f::new(self.x * rhs, self.y * rhs)
    }
}

/// 2D vector (integer, window space)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2i {
    pub x: i32,
    pub y: i32,
}

impl Vector2i {
    pub const ZERO: Vector2i = Vector2i { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Vector2f> for Vector2i {
    /// Truncates towards zero
    fn from(v: Vector2f) -> Self {
        Self::new(v.x as i32, v.y as i32)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rectanglef {
    pub min: Vector2f,
    pub max: Vector2f,
}

impl Rectanglef {
    pub fn from_position_size(position: Vector2f, size: Vector2f) -> Self {
        Self { min: position, max: position + size }
    }

    pub fn from_corners(min: Vector2f, max: Vector2f) -> Self {
        Self { min, max }
    }

    pub fn position(&self) -> Vector2f {
        self.min
    }

    pub fn size(&self) -> Vector2f {
        self.max - self.min
    }

    /// Grow the rectangle by different amounts on each side
    pub fn extend(&self, top_left: Vector2f, bottom_right: Vector2f) -> Self {
        Self { min: self.min - top_left, max: self.max + bottom_right }
    }

    /// Snap outwards to whole pixels
    pub fn expand_to_pixel_grid(&self) -> Self {
        Self { min: self.min.floor(), max: self.max.ceil() }
    }

    /// Intersection, collapsing to an empty rectangle when disjoint
    pub fn intersect(&self, other: &Rectanglef) -> Self {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max).max(min);
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}

/// Integer rectangle in window space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rectanglei {
    pub position: Vector2i,
    pub size: Vector2i,
}

impl Rectanglei {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { position: Vector2i::new(x, y), size: Vector2i::new(width, height) }
    }

    /// Intersection, with a zero size when disjoint
    pub fn intersect(&self, other: &Rectanglei) -> Self {
        let x0 = self.position.x.max(other.position.x);
        let y0 = self.position.y.max(other.position.y);
        let x1 = (self.position.x + self.size.x).min(other.position.x + other.size.x);
        let y1 = (self.position.y + self.size.y).min(other.position.y + other.size.y);
        Self::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }
}

/// Edge sizes (top, right, bottom, left)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const fn uniform(v: f32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    fn top_left(&self) -> Vector2f {
        Vector2f::new(self.left, self.top)
    }

    fn total(&self) -> Vector2f {
        Vector2f::new(self.left + self.right, self.top + self.bottom)
    }
}

/// Box area selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxArea {
    Border,
    Padding,
    Content,
}

/// Result of layout for one element
///
/// `offset` is the absolute window-space position of the border box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutBox {
    pub offset: Vector2f,
    pub content_size: Vector2f,
    pub padding: Edges,
    pub border: Edges,
}

impl LayoutBox {
    /// Box with no padding or border
    pub fn new(offset: Vector2f, size: Vector2f) -> Self {
        Self { offset, content_size: size, ..Default::default() }
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_border(mut self, border: Edges) -> Self {
        self.border = border;
        self
    }

    /// Position of an area relative to the border box origin
    pub fn position(&self, area: BoxArea) -> Vector2f {
        match area {
            BoxArea::Border => Vector2f::ZERO,
            BoxArea::Padding => self.border.top_left(),
            BoxArea::Content => self.border.top_left() + self.padding.top_left(),
        }
    }

    pub fn size(&self, area: BoxArea) -> Vector2f {
        match area {
            BoxArea::Content => self.content_size,
            BoxArea::Padding => self.content_size + self.padding.total(),
            BoxArea::Border => self.content_size + self.padding.total() + self.border.total(),
        }
    }

    /// Absolute window-space position of an area
    pub fn absolute_offset(&self, area: BoxArea) -> Vector2f {
        self.offset + self.position(area)
    }

    pub fn rectangle(&self, area: BoxArea) -> Rectanglef {
        Rectanglef::from_position_size(self.absolute_offset(area), self.size(area))
    }
}

/// 2D affine transform
///
/// Maps (x, y) to (a*x + c*y + e, b*x + d*y + f).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn translate(x: f32, y: f32) -> Self {
        Self { e: x, f: y, ..Self::IDENTITY }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    pub fn rotate(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    /// `self` applied after `other`
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            a: other.a * self.a + other.b * self.c,
            b: other.a * self.b + other.b * self.d,
            c: other.c * self.a + other.d * self.c,
            d: other.c * self.b + other.d * self.d,
            e: other.e * self.a + other.f * self.c + self.e,
            f: other.e * self.b + other.f * self.d + self.f,
        }
    }

    pub fn transform_point(&self, p: Vector2f) -> Vector2f {
        Vector2f::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Bounding box of a transformed rectangle
    pub fn bounding_box(&self, rect: &Rectanglef) -> Rectanglef {
        let corners = [
            rect.min,
            Vector2f::new(rect.max.x, rect.min.y),
            rect.max,
            Vector2f::new(rect.min.x, rect.max.y),
        ];
        let first = self.transform_point(corners[0]);
        let (min, max) = corners[1..].iter().fold((first, first), |(min, max), &corner| {
            let p = self.transform_point(corner);
            (min.min(p), max.max(p))
        });
        Rectanglef::from_corners(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_box_areas() {
        let b = LayoutBox::new(Vector2f::new(10.0, 20.0), Vector2f::new(100.0, 50.0))
            .with_padding(Edges::uniform(5.0))
            .with_border(Edges::uniform(2.0));

        assert_eq!(b.size(BoxArea::Border), Vector2f::new(114.0, 64.0));
        assert_eq!(b.size(BoxArea::Padding), Vector2f::new(110.0, 60.0));
        assert_eq!(b.absolute_offset(BoxArea::Padding), Vector2f::new(12.0, 22.0));
        assert_eq!(b.absolute_offset(BoxArea::Content), Vector2f::new(17.0, 27.0));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rectanglei::new(0, 0, 100, 100);
        let b = Rectanglei::new(50, 50, 100, 100);
        assert_eq!(a.intersect(&b), Rectanglei::new(50, 50, 50, 50));

        let c = Rectanglei::new(200, 200, 10, 10);
        assert_eq!(a.intersect(&c).size, Vector2i::ZERO);
    }

    #[test]
    fn test_pixel_grid() {
        let r = Rectanglef::from_corners(Vector2f::new(0.5, 1.2), Vector2f::new(10.1, 10.9));
        let snapped = r.expand_to_pixel_grid();
        assert_eq!(snapped.min, Vector2f::new(0.0, 1.0));
        assert_eq!(snapped.max, Vector2f::new(11.0, 11.0));
    }

    #[test]
    fn test_transform_bounding_box() {
        let t = Transform2D::translate(10.0, 0.0).then(&Transform2D::scale(2.0, 2.0));
        let r = Rectanglef::from_position_size(Vector2f::ZERO, Vector2f::new(10.0, 5.0));
        let bb = t.bounding_box(&r);
        assert_eq!(bb.min, Vector2f::new(10.0, 0.0));
        assert_eq!(bb.max, Vector2f::new(30.0, 10.0));
    }
}
