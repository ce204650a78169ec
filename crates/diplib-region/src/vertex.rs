//! 2-D vertices and bounding boxes
//!
//! `x` grows to the right and `y` grows down, as in image coordinates.
//! Integer vertices address pixels; floating-point vertices are polygon
//! corners.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A point or displacement in 2-D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vertex<T> {
    pub x: T,
    pub y: T,
}

/// Polygon vertex.
pub type VertexFloat = Vertex<f64>;

/// Pixel coordinates or chain code step.
pub type VertexInteger = Vertex<isize>;

impl<T> Vertex<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Vertex { x, y }
    }
}

impl VertexInteger {
    /// The same point as a polygon vertex.
    #[inline]
    pub fn to_float(self) -> VertexFloat {
        Vertex::new(self.x as f64, self.y as f64)
    }
}

impl From<VertexInteger> for VertexFloat {
    fn from(v: VertexInteger) -> Self {
        v.to_float()
    }
}

impl VertexFloat {
    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn norm_square(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Both coordinates rounded to the nearest integer.
    pub fn round(self) -> VertexFloat {
        Vertex::new(self.x.round(), self.y.round())
    }

    /// `x` and `y` swapped.
    pub fn permute(self) -> VertexFloat {
        Vertex::new(self.y, self.x)
    }
}

impl<T: Add<Output = T>> Add for Vertex<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vertex::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Sub<Output = T>> Sub for Vertex<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vertex::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: AddAssign> AddAssign for Vertex<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl<T: SubAssign> SubAssign for Vertex<T> {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl<T: Neg<Output = T>> Neg for Vertex<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Vertex::new(-self.x, -self.y)
    }
}

impl Mul<f64> for VertexFloat {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Vertex::new(self.x * s, self.y * s)
    }
}

/// Element-wise product.
impl Mul for VertexFloat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Vertex::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl MulAssign<f64> for VertexFloat {
    fn mul_assign(&mut self, s: f64) {
        self.x *= s;
        self.y *= s;
    }
}

impl Div<f64> for VertexFloat {
    type Output = Self;

    fn div(self, s: f64) -> Self {
        Vertex::new(self.x / s, self.y / s)
    }
}

impl DivAssign<f64> for VertexFloat {
    fn div_assign(&mut self, s: f64) {
        self.x /= s;
        self.y /= s;
    }
}

/// Distance between two vertices.
#[inline]
pub fn distance(v1: VertexFloat, v2: VertexFloat) -> f64 {
    (v2 - v1).norm()
}

#[inline]
pub fn distance_square(v1: VertexFloat, v2: VertexFloat) -> f64 {
    (v2 - v1).norm_square()
}

/// Angle of the vector from `v1` to `v2`, in `(-pi, pi]`.
#[inline]
pub fn angle(v1: VertexFloat, v2: VertexFloat) -> f64 {
    let v = v2 - v1;
    v.y.atan2(v.x)
}

/// z component of the cross product of two vectors.
#[inline]
pub fn cross_product(v1: VertexFloat, v2: VertexFloat) -> f64 {
    v1.x * v2.y - v1.y * v2.x
}

/// Signed area of the parallelogram spanned by `v2 - v1` and `v3 - v1`.
/// Positive when `v1, v2, v3` turn clockwise on screen (y down).
#[inline]
pub fn parallelogram_signed_area(v1: VertexFloat, v2: VertexFloat, v3: VertexFloat) -> f64 {
    cross_product(v2 - v1, v3 - v1)
}

#[inline]
pub fn triangle_area(v1: VertexFloat, v2: VertexFloat, v3: VertexFloat) -> f64 {
    (parallelogram_signed_area(v1, v2, v3) / 2.0).abs()
}

/// Distance from `v3` to the line through `v1` and `v2`.
#[inline]
pub fn triangle_height(v1: VertexFloat, v2: VertexFloat, v3: VertexFloat) -> f64 {
    (parallelogram_signed_area(v1, v2, v3) / distance(v1, v2)).abs()
}

/// Axis-aligned bounding box given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox<T> {
    pub top_left: Vertex<T>,
    pub bottom_right: Vertex<T>,
}

pub type BoundingBoxFloat = BoundingBox<f64>;
pub type BoundingBoxInteger = BoundingBox<isize>;

impl<T: Copy + PartialOrd> BoundingBox<T> {
    /// A box containing only `pt`.
    pub fn new(pt: Vertex<T>) -> Self {
        BoundingBox {
            top_left: pt,
            bottom_right: pt,
        }
    }

    /// Grow the box to contain `pt`.
    pub fn expand(&mut self, pt: Vertex<T>) {
        if pt.x < self.top_left.x {
            self.top_left.x = pt.x;
        } else if pt.x > self.bottom_right.x {
            self.bottom_right.x = pt.x;
        }
        if pt.y < self.top_left.y {
            self.top_left.y = pt.y;
        } else if pt.y > self.bottom_right.y {
            self.bottom_right.y = pt.y;
        }
    }

    pub fn contains(&self, pt: Vertex<T>) -> bool {
        pt.x >= self.top_left.x
            && pt.x <= self.bottom_right.x
            && pt.y >= self.top_left.y
            && pt.y <= self.bottom_right.y
    }
}

impl BoundingBoxInteger {
    /// Width and height in pixels, both ends included.
    pub fn size(&self) -> Vertex<usize> {
        Vertex::new(
            (self.bottom_right.x - self.top_left.x + 1) as usize,
            (self.bottom_right.y - self.top_left.y + 1) as usize,
        )
    }
}

impl BoundingBoxFloat {
    pub fn size(&self) -> VertexFloat {
        self.bottom_right - self.top_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_helpers() {
        let a = VertexFloat::new(0.0, 0.0);
        let b = VertexFloat::new(4.0, 0.0);
        let c = VertexFloat::new(1.0, 3.0);
        assert_eq!(parallelogram_signed_area(a, b, c), 12.0);
        assert_eq!(parallelogram_signed_area(a, c, b), -12.0);
        assert_eq!(triangle_area(a, b, c), 6.0);
        assert_eq!(triangle_height(a, b, c), 3.0);
        assert_eq!(distance(b, c), 18f64.sqrt());
        assert!((angle(a, VertexFloat::new(0.0, 1.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let mut bb = BoundingBoxInteger::new(VertexInteger::new(3, 4));
        bb.expand(VertexInteger::new(1, 6));
        bb.expand(VertexInteger::new(5, 5));
        assert_eq!(bb.top_left, VertexInteger::new(1, 4));
        assert_eq!(bb.bottom_right, VertexInteger::new(5, 6));
        assert_eq!(bb.size(), Vertex::new(5, 3));
        assert!(bb.contains(VertexInteger::new(2, 5)));
        assert!(!bb.contains(VertexInteger::new(0, 5)));
    }
}
