//! Polygons and the shape descriptors computed from them
//!
//! A [`Polygon`] is a closed sequence of vertices; the last vertex connects
//! back to the first. Polygons made from chain codes run clockwise on screen
//! (y down), which gives them a positive signed area.

use std::f64::consts::PI;
use std::ops::{AddAssign, DivAssign, MulAssign};

use log::warn;

use crate::convex_hull::ConvexHull;
use crate::error::RegionResult;
use crate::vertex::{
    BoundingBoxFloat, VertexFloat, angle, cross_product, distance, distance_square,
    parallelogram_signed_area,
};

/// Feret diameters: the extent of a shape along a direction, at the angles
/// where it is largest and smallest.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeretValues {
    /// The maximum Feret diameter
    pub max_diameter: f64,
    /// The minimum Feret diameter
    pub min_diameter: f64,
    /// The Feret diameter perpendicular to `min_diameter`
    pub max_perpendicular: f64,
    /// The angle at which `max_diameter` was measured
    pub max_angle: f64,
    /// The angle at which `min_diameter` was measured
    pub min_angle: f64,
}

/// Running mean and sample variance (Welford).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct VarianceAccumulator {
    n: usize,
    mean: f64,
    m2: f64,
}

impl VarianceAccumulator {
    pub(crate) fn push(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub(crate) fn mean(&self) -> f64 {
        self.mean
    }

    pub(crate) fn variance(&self) -> f64 {
        if self.n > 1 {
            self.m2 / (self.n - 1) as f64
        } else {
            0.0
        }
    }

    pub(crate) fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl AddAssign for VarianceAccumulator {
    fn add_assign(&mut self, other: Self) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = other;
            return;
        }
        let n = self.n + other.n;
        let delta = other.mean - self.mean;
        self.m2 += other.m2 + delta * delta * (self.n * other.n) as f64 / n as f64;
        self.mean += delta * other.n as f64 / n as f64;
        self.n = n;
    }
}

/// Statistics of the distances from a shape's boundary to a centre.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadiusValues {
    acc: VarianceAccumulator,
    min: f64,
    max: f64,
}

impl RadiusValues {
    pub fn push(&mut self, r: f64) {
        if self.acc.n == 0 {
            self.min = r;
            self.max = r;
        } else {
            self.min = self.min.min(r);
            self.max = self.max.max(r);
        }
        self.acc.push(r);
    }

    pub fn mean(&self) -> f64 {
        self.acc.mean()
    }

    pub fn standard_deviation(&self) -> f64 {
        self.acc.standard_deviation()
    }

    pub fn variance(&self) -> f64 {
        self.acc.variance()
    }

    /// 0 if nothing was pushed
    pub fn maximum(&self) -> f64 {
        self.max
    }

    /// 0 if nothing was pushed
    pub fn minimum(&self) -> f64 {
        self.min
    }

    /// Coefficient of variation of the radius; 0 for a perfect circle.
    pub fn circularity(&self) -> f64 {
        let mean = self.mean();
        if mean == 0.0 {
            0.0
        } else {
            self.standard_deviation() / mean
        }
    }
}

impl AddAssign for RadiusValues {
    fn add_assign(&mut self, other: Self) {
        if other.acc.n == 0 {
            return;
        }
        if self.acc.n == 0 {
            *self = other;
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.acc += other.acc;
    }
}

/// Result of [`Polygon::fit_circle`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CircleParameters {
    pub center: VertexFloat,
    pub diameter: f64,
}

/// Result of [`Polygon::fit_ellipse`] and [`CovarianceMatrix::ellipse`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EllipseParameters {
    pub center: VertexFloat,
    /// Length of the major axis (longest diameter)
    pub major_axis: f64,
    /// Length of the minor axis (shortest diameter)
    pub minor_axis: f64,
    /// Orientation of the major axis, in radian
    pub orientation: f64,
    /// `sqrt(1 - b^2 / a^2)` with `a` the major and `b` the minor axis
    pub eccentricity: f64,
}

/// Eigenvalues of a [`CovarianceMatrix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigenvalues {
    pub largest: f64,
    pub smallest: f64,
}

impl Eigenvalues {
    pub fn eccentricity(&self) -> f64 {
        if self.largest <= 0.0 {
            0.0
        } else {
            (1.0 - self.smallest / self.largest).sqrt()
        }
    }
}

/// Symmetric 2x2 matrix `[[xx, xy], [xy, yy]]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CovarianceMatrix {
    xx: f64,
    xy: f64,
    yy: f64,
}

impl CovarianceMatrix {
    pub fn new(xx: f64, xy: f64, yy: f64) -> Self {
        CovarianceMatrix { xx, xy, yy }
    }

    /// Outer product of `v` with itself.
    pub fn from_vector(v: VertexFloat) -> Self {
        CovarianceMatrix::new(v.x * v.x, v.x * v.y, v.y * v.y)
    }

    pub fn xx(&self) -> f64 {
        self.xx
    }

    pub fn xy(&self) -> f64 {
        self.xy
    }

    pub fn yy(&self) -> f64 {
        self.yy
    }

    pub fn det(&self) -> f64 {
        self.xx * self.yy - self.xy * self.xy
    }

    /// Inverse; the zero matrix if singular.
    pub fn inv(&self) -> CovarianceMatrix {
        let d = self.det();
        if d == 0.0 {
            return CovarianceMatrix::default();
        }
        CovarianceMatrix::new(self.yy / d, -self.xy / d, self.xx / d)
    }

    /// `v' * C * v`
    pub fn project(&self, v: VertexFloat) -> f64 {
        v.x * v.x * self.xx + 2.0 * v.x * v.y * self.xy + v.y * v.y * self.yy
    }

    pub fn eig(&self) -> Eigenvalues {
        let mmu2 = (self.xx + self.yy) / 2.0;
        let dmu2 = (self.xx - self.yy) / 2.0;
        let root = (self.xy * self.xy + dmu2 * dmu2).sqrt();
        Eigenvalues {
            largest: mmu2 + root,
            smallest: mmu2 - root,
        }
    }

    /// Ellipse with the same second moments. With `solid` the matrix is
    /// taken to describe a filled ellipse (as from
    /// [`Polygon::covariance_matrix_solid`]), otherwise an ellipse outline.
    /// The centre is left at the origin.
    pub fn ellipse(&self, solid: bool) -> EllipseParameters {
        let lambda = self.eig();
        let scale = if solid { 16.0 } else { 8.0 };
        EllipseParameters {
            center: VertexFloat::default(),
            major_axis: (scale * lambda.largest).sqrt(),
            minor_axis: (scale * lambda.smallest).sqrt(),
            // eigenvector (xy, largest - xx), angle in [0, pi)
            orientation: (lambda.largest - self.xx).atan2(self.xy),
            eccentricity: lambda.eccentricity(),
        }
    }
}

impl AddAssign for CovarianceMatrix {
    fn add_assign(&mut self, other: Self) {
        self.xx += other.xx;
        self.xy += other.xy;
        self.yy += other.yy;
    }
}

impl MulAssign<f64> for CovarianceMatrix {
    fn mul_assign(&mut self, d: f64) {
        self.xx *= d;
        self.xy *= d;
        self.yy *= d;
    }
}

impl DivAssign<f64> for CovarianceMatrix {
    fn div_assign(&mut self, d: f64) {
        *self *= 1.0 / d;
    }
}

/// A closed polygon.
///
/// # Examples
///
/// ```
/// use diplib_region::{Polygon, VertexFloat};
///
/// let square = Polygon::new(vec![
///     VertexFloat::new(0.0, 0.0),
///     VertexFloat::new(2.0, 0.0),
///     VertexFloat::new(2.0, 2.0),
///     VertexFloat::new(0.0, 2.0),
/// ]);
/// assert_eq!(square.area(), 4.0);
/// assert_eq!(square.length(), 8.0);
/// assert!(square.is_clockwise());
/// assert_eq!(square.centroid(), VertexFloat::new(1.0, 1.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub vertices: Vec<VertexFloat>,
}

impl Polygon {
    pub fn new(vertices: Vec<VertexFloat>) -> Self {
        Polygon { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `None` for a polygon without vertices.
    pub fn bounding_box(&self) -> Option<BoundingBoxFloat> {
        let (first, rest) = self.vertices.split_first()?;
        let mut bb = BoundingBoxFloat::new(*first);
        for &v in rest {
            bb.expand(v);
        }
        Some(bb)
    }

    /// Whether the vertices run clockwise on screen. Decided at the topmost
    /// vertex, so the polygon must be simple.
    pub fn is_clockwise(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return true;
        }
        let mut top = 0;
        for (i, v) in self.vertices.iter().enumerate().skip(1) {
            let t = self.vertices[top];
            if v.y < t.y || (v.y == t.y && v.x > t.x) {
                top = i;
            }
        }
        let prev = (top + n - 1) % n;
        let next = (top + 1) % n;
        parallelogram_signed_area(self.vertices[top], self.vertices[next], self.vertices[prev]) >= 0.0
    }

    /// Signed area; positive for clockwise polygons.
    pub fn area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        self.edges().map(|(a, b)| cross_product(a, b)).sum::<f64>() / 2.0
    }

    /// Centre of mass of the enclosed area; the origin for degenerate
    /// polygons.
    pub fn centroid(&self) -> VertexFloat {
        if self.vertices.len() < 3 {
            return VertexFloat::default();
        }
        let mut sum = 0.0;
        let mut xsum = 0.0;
        let mut ysum = 0.0;
        for (a, b) in self.edges() {
            let v = cross_product(a, b);
            sum += v;
            xsum += (a.x + b.x) * v;
            ysum += (a.y + b.y) * v;
        }
        if sum == 0.0 {
            VertexFloat::default()
        } else {
            VertexFloat::new(xsum, ysum) / (3.0 * sum)
        }
    }

    /// Covariance of the vertices around `g`.
    pub fn covariance_matrix_vertices(&self, g: VertexFloat) -> CovarianceMatrix {
        let mut c = CovarianceMatrix::default();
        if self.vertices.len() >= 3 {
            for &v in &self.vertices {
                c += CovarianceMatrix::from_vector(v - g);
            }
            c /= self.vertices.len() as f64;
        }
        c
    }

    /// Covariance of the enclosed area around `g`, by Green's theorem.
    pub fn covariance_matrix_solid(&self, g: VertexFloat) -> CovarianceMatrix {
        if self.vertices.len() < 3 {
            return CovarianceMatrix::default();
        }
        let mut c = CovarianceMatrix::default();
        for (a, b) in self.edges() {
            let (v0, v1) = (a - g, b - g);
            let v = cross_product(v0, v1);
            c += CovarianceMatrix::new(
                v / 12.0 * (v0.x * (v0.x + v1.x) + v1.x * v1.x),
                v / 24.0 * (v0.x * (2.0 * v0.y + v1.y) + v1.x * (v0.y + 2.0 * v1.y)),
                v / 12.0 * (v0.y * (v0.y + v1.y) + v1.y * v1.y),
            );
        }
        c /= self.area();
        c
    }

    /// Length of the boundary.
    pub fn length(&self) -> f64 {
        if self.vertices.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(a, b)| distance(a, b)).sum()
    }

    /// Same as [`Polygon::length`].
    pub fn perimeter(&self) -> f64 {
        self.length()
    }

    /// Statistics of the vertex distances to `g`.
    pub fn radius_statistics(&self, g: VertexFloat) -> RadiusValues {
        let mut radius = RadiusValues::default();
        if self.vertices.len() >= 3 {
            for &v in &self.vertices {
                radius.push(distance(g, v));
            }
        }
        radius
    }

    /// Coefficient of variation of the Mahalanobis distance of the vertices
    /// to `g` under `c`; 0 for a perfect ellipse.
    pub fn ellipse_variance(&self, g: VertexFloat, c: &CovarianceMatrix) -> f64 {
        let u = c.inv();
        let mut acc = VarianceAccumulator::default();
        for &v in &self.vertices {
            acc.push(u.project(v - g).sqrt());
        }
        let m = acc.mean();
        if m == 0.0 {
            0.0
        } else {
            acc.standard_deviation() / m
        }
    }

    /// Fractal dimension of the boundary, from the slope of log perimeter
    /// against log smoothing scale. `length` is the boundary length to
    /// derive the scales from; 0 uses [`Polygon::length`]. Result in
    /// `[1, 2]`.
    pub fn fractal_dimension(&self, length: f64) -> f64 {
        let length = if length <= 0.0 { self.length() } else { length };
        let sigma_max = length / 16.0;
        if sigma_max <= 2.0 {
            return 1.0;
        }
        let n_scales = sigma_max.log2().ceil() as usize + 1;

        let mut smoothed = self.clone();
        let mut points = Vec::with_capacity(n_scales);
        let mut sigma: f64 = 1.0;
        let mut prev_sigma: f64 = 0.0;
        for _ in 0..n_scales {
            smoothed.smooth((sigma * sigma - prev_sigma * prev_sigma).sqrt());
            points.push((sigma.ln(), smoothed.length().ln()));
            prev_sigma = sigma;
            sigma *= 2.0;
        }

        let n = points.len() as f64;
        let sx: f64 = points.iter().map(|p| p.0).sum();
        let sy: f64 = points.iter().map(|p| p.1).sum();
        let sxx: f64 = points.iter().map(|p| p.0 * p.0).sum();
        let sxy: f64 = points.iter().map(|p| p.0 * p.1).sum();
        let d = n * sxx - sx * sx;
        if d == 0.0 {
            return 1.0;
        }
        let slope = (n * sxy - sx * sy) / d;
        (1.0 - slope).clamp(1.0, 2.0)
    }

    /// Sum of squared turning angles, each divided by half the length of
    /// the two edges it joins.
    pub fn bending_energy(&self) -> f64 {
        let n = self.vertices.len();
        if n <= 2 {
            return 0.0;
        }
        let v = &self.vertices;
        let mut be = 0.0;
        let mut prev = angle(v[0], v[1]);
        for i in 1..n {
            let next = (i + 1) % n;
            let a = angle(v[i], v[next]);
            let diff = angle_difference(a, prev);
            be += diff * diff * 2.0 / distance(v[i - 1], v[next]);
            prev = a;
        }
        // the corner at vertex 0
        let a = angle(v[0], v[1]);
        let diff = angle_difference(a, prev);
        be += diff * diff * 2.0 / distance(v[n - 1], v[1]);
        be
    }

    /// Least-squares circle through the vertices. `None` with fewer than
    /// three vertices or when they are collinear.
    ///
    /// ```
    /// use diplib_region::{Polygon, VertexFloat};
    ///
    /// let p = Polygon::new((0..20).map(|i| {
    ///     let t = i as f64 * std::f64::consts::PI / 10.0;
    ///     VertexFloat::new(3.0 + 5.0 * t.cos(), -1.0 + 5.0 * t.sin())
    /// }).collect());
    /// let c = p.fit_circle().unwrap();
    /// assert!((c.diameter - 10.0).abs() < 1e-9);
    /// assert!((c.center.x - 3.0).abs() < 1e-9);
    /// ```
    pub fn fit_circle(&self) -> Option<CircleParameters> {
        let rows: Vec<[f64; 3]> = self.vertices.iter().map(|v| [v.x, v.y, 1.0]).collect();
        let rhs: Vec<f64> = self.vertices.iter().map(|v| v.norm_square()).collect();
        let sol = least_squares(&rows, &rhs)?;
        let cx = sol[0] / 2.0;
        let cy = sol[1] / 2.0;
        let r = (sol[2] + cx * cx + cy * cy).sqrt();
        Some(CircleParameters {
            center: VertexFloat::new(cx, cy),
            diameter: 2.0 * r,
        })
    }

    /// Least-squares ellipse through the vertices, fitting the conic
    /// `a x^2 + b xy + c y^2 + d x + e y = 1`. `None` when the fit is not an
    /// ellipse.
    pub fn fit_ellipse(&self) -> Option<EllipseParameters> {
        let rows: Vec<[f64; 5]> = self
            .vertices
            .iter()
            .map(|v| [v.x * v.x, v.x * v.y, v.y * v.y, v.x, v.y])
            .collect();
        let rhs = vec![1.0; rows.len()];
        let [a, b, c, d, e] = least_squares(&rows, &rhs)?;
        let denom = b * b - 4.0 * a * c;
        if denom >= 0.0 {
            warn!("fit_ellipse: conic discriminant {} is not negative", denom);
            return None;
        }
        let pt1 = 2.0 * (a * e * e + c * d * d - b * d * e - denom);
        let pt2 = a + c;
        let pt3 = ((a - c) * (a - c) + b * b).sqrt();
        let major = -(pt1 * (pt2 + pt3)).sqrt() / denom;
        let minor = -(pt1 * (pt2 - pt3)).sqrt() / denom;
        Some(EllipseParameters {
            center: VertexFloat::new((2.0 * c * d - b * e) / denom, (2.0 * a * e - b * d) / denom),
            major_axis: 2.0 * major,
            minor_axis: 2.0 * minor,
            orientation: (-b).atan2(c - a) / 2.0,
            eccentricity: (1.0 - minor * minor / (major * major)).sqrt(),
        })
    }

    /// Remove vertices that lie within `tolerance` of the line joining their
    /// kept neighbours (Douglas-Peucker).
    pub fn simplify(&mut self, tolerance: f64) -> &mut Self {
        if tolerance <= 0.0 || self.vertices.len() <= 4 {
            return self;
        }
        // two extreme points split the polygon into halves that are
        // simplified independently
        let pt1 = most_distant(&self.vertices, 0);
        let pt2 = most_distant(&self.vertices, pt1);
        let tolerance_square = tolerance * tolerance;
        let mut out = vec![self.vertices[pt1]];
        simplify_section(&self.vertices, &mut out, pt1, pt2, tolerance_square);
        out.push(self.vertices[pt2]);
        simplify_section(&self.vertices, &mut out, pt2, pt1, tolerance_square);
        self.vertices = out;
        self
    }

    /// Add vertices along the edges so no two consecutive vertices are more
    /// than `distance` apart.
    pub fn augment(&mut self, distance: f64) -> &mut Self {
        if self.vertices.is_empty() || distance <= 0.0 {
            return self;
        }
        let mut out = Vec::with_capacity(self.vertices.len());
        for (a, b) in self.edges() {
            insert_points(&mut out, a, b, distance);
        }
        self.vertices = out;
        self
    }

    /// Gaussian smoothing of the vertex coordinates along the closed
    /// boundary.
    pub fn smooth(&mut self, sigma: f64) -> &mut Self {
        let n = self.vertices.len();
        if n == 0 || sigma.is_nan() || sigma <= 0.0 {
            return self;
        }
        let radius = (3.0 * sigma).ceil() as isize;
        let mut kernel: Vec<f64> = (-radius..=radius)
            .map(|k| (-((k * k) as f64) / (2.0 * sigma * sigma)).exp())
            .collect();
        let total: f64 = kernel.iter().sum();
        kernel.iter_mut().for_each(|w| *w /= total);
        let smoothed = (0..n as isize)
            .map(|i| {
                kernel
                    .iter()
                    .zip(-radius..=radius)
                    .fold(VertexFloat::default(), |acc, (&w, k)| {
                        acc + self.vertices[(i + k).rem_euclid(n as isize) as usize] * w
                    })
            })
            .collect();
        self.vertices = smoothed;
        self
    }

    pub fn reverse(&mut self) -> &mut Self {
        self.vertices.reverse();
        self
    }

    /// Rotate around the origin by `angle` radian.
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        let (sin, cos) = angle.sin_cos();
        for v in &mut self.vertices {
            *v = VertexFloat::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);
        }
        self
    }

    pub fn scale(&mut self, scale: f64) -> &mut Self {
        for v in &mut self.vertices {
            *v *= scale;
        }
        self
    }

    pub fn scale_xy(&mut self, scale_x: f64, scale_y: f64) -> &mut Self {
        let s = VertexFloat::new(scale_x, scale_y);
        for v in &mut self.vertices {
            *v = *v * s;
        }
        self
    }

    pub fn translate(&mut self, shift: VertexFloat) -> &mut Self {
        for v in &mut self.vertices {
            *v += shift;
        }
        self
    }

    /// Whether `point` lies inside the polygon or on its boundary.
    pub fn contains(&self, point: VertexFloat) -> bool {
        let Some(&last) = self.vertices.last() else {
            return false;
        };
        // count crossings of the horizontal ray from -infinity to `point`
        let mut count = 0usize;
        let mut prev = last;
        for &cur in &self.vertices {
            if cur == point {
                return true;
            }
            if (prev.y <= point.y && cur.y > point.y) || (cur.y <= point.y && prev.y > point.y) {
                if cur.x <= point.x && prev.x <= point.x {
                    count += 1;
                } else if !(cur.x > point.x && prev.x > point.x) {
                    let x = prev.x + (point.y - prev.y) * (cur.x - prev.x) / (cur.y - prev.y);
                    if x == point.x {
                        return true;
                    }
                    if x < point.x {
                        count += 1;
                    }
                }
            }
            prev = cur;
        }
        count % 2 == 1
    }

    /// Convex hull by Melkman's algorithm. The polygon must be simple.
    pub fn convex_hull(&self) -> RegionResult<ConvexHull> {
        ConvexHull::new(self)
    }

    /// Consecutive vertex pairs, including the closing edge.
    pub(crate) fn edges(&self) -> impl Iterator<Item = (VertexFloat, VertexFloat)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| {
            let prev = if i == 0 { n - 1 } else { i - 1 };
            (self.vertices[prev], self.vertices[i])
        })
    }
}

/// Absolute difference of two angles in `[-pi, pi]`, wrapped into `[0, pi]`.
fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > PI { 2.0 * PI - diff } else { diff }
}

fn most_distant(vertices: &[VertexFloat], index: usize) -> usize {
    let mut max_dist = 0.0;
    let mut max_index = index;
    for (i, &v) in vertices.iter().enumerate() {
        let d = distance_square(vertices[index], v);
        if d > max_dist {
            max_dist = d;
            max_index = i;
        }
    }
    max_index
}

fn simplify_section(
    vertices: &[VertexFloat],
    out: &mut Vec<VertexFloat>,
    start: usize,
    end: usize,
    tolerance_square: f64,
) {
    let n = vertices.len();
    if start == end {
        return;
    }
    let base = vertices[end] - vertices[start];
    let mut max_cross = 0.0;
    let mut max_index = start;
    let mut i = (start + 1) % n;
    while i != end {
        let d = cross_product(base, vertices[i] - vertices[start]).abs();
        if d > max_cross {
            max_cross = d;
            max_index = i;
        }
        i = (i + 1) % n;
    }
    // squared distance of the furthest vertex to the base line
    if max_cross * max_cross / base.norm_square() > tolerance_square {
        simplify_section(vertices, out, start, max_index, tolerance_square);
        out.push(vertices[max_index]);
        simplify_section(vertices, out, max_index, end, tolerance_square);
    }
}

fn insert_points(out: &mut Vec<VertexFloat>, start: VertexFloat, end: VertexFloat, distance: f64) {
    let line = end - start;
    let length = line.norm();
    let n = (length / distance).ceil().max(1.0);
    let inc = line / n;
    let mut pos = start;
    for _ in 0..n as usize {
        out.push(pos);
        pos += inc;
    }
}

/// Least-squares solution of `A x = b` by Householder QR. `None` if `A` has
/// fewer rows than columns or is (numerically) rank deficient.
fn least_squares<const N: usize>(rows: &[[f64; N]], rhs: &[f64]) -> Option<[f64; N]> {
    let m = rows.len();
    if m < N || rhs.len() != m {
        return None;
    }
    let mut a = rows.to_vec();
    let mut b = rhs.to_vec();
    for k in 0..N {
        let norm = (k..m).map(|i| a[i][k] * a[i][k]).sum::<f64>().sqrt();
        if norm == 0.0 {
            return None;
        }
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };
        let mut v: Vec<f64> = (k..m).map(|i| a[i][k]).collect();
        v[0] -= alpha;
        let v_norm = v.iter().map(|x| x * x).sum::<f64>();
        if v_norm == 0.0 {
            continue;
        }
        for j in k..N {
            let f = 2.0 * (k..m).map(|i| v[i - k] * a[i][j]).sum::<f64>() / v_norm;
            for i in k..m {
                a[i][j] -= f * v[i - k];
            }
        }
        let f = 2.0 * (k..m).map(|i| v[i - k] * b[i]).sum::<f64>() / v_norm;
        for i in k..m {
            b[i] -= f * v[i - k];
        }
    }
    let largest = (0..N).map(|k| a[k][k].abs()).fold(0.0, f64::max);
    let mut x = [0.0; N];
    for k in (0..N).rev() {
        if a[k][k].abs() <= largest * 1e-12 {
            return None;
        }
        let s = b[k] - (k + 1..N).map(|j| a[k][j] * x[j]).sum::<f64>();
        x[k] = s / a[k][k];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_square() -> Polygon {
        Polygon::new(
            [
                (0.2, 2.0),
                (0.0, 0.0),
                (5.0, 0.2),
                (10.0, 0.0),
                (10.2, 6.0),
                (10.0, 10.0),
                (5.0, 9.8),
                (0.0, 10.0),
                (-0.2, 6.0),
            ]
            .iter()
            .map(|&(x, y)| VertexFloat::new(x, y))
            .collect(),
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_simplify_augment_smooth() {
        let p = noisy_square();
        let mut p2 = p.clone();
        p2.simplify(0.5);
        assert_eq!(p2.len(), 4);
        assert!(close(p2.area(), 100.0));
        assert!(close(p2.length(), 40.0));

        let mut p5 = p2.clone();
        p5.augment(1.0);
        assert_eq!(p5.len(), 40);
        assert!(close(p5.area(), 100.0));
        assert!(close(p5.length(), 40.0));
        p5.smooth(2.0);
        assert_eq!(p5.len(), 40);
        assert!(p5.area() < 100.0 && p5.area() > 85.0);
        assert!(p5.length() < 40.0);

        p2.reverse();
        assert_ne!(p.is_clockwise(), p2.is_clockwise());
    }

    #[test]
    fn test_contains() {
        let p = noisy_square();
        assert!(!p.contains(VertexFloat::new(-1.0, 5.0)));
        assert!(!p.contains(VertexFloat::new(5.0, -1.0)));
        assert!(!p.contains(VertexFloat::new(5.0, 11.0)));
        assert!(p.contains(VertexFloat::new(0.0, 0.0)));
        assert!(p.contains(VertexFloat::new(10.0, 10.0)));
        assert!(p.contains(VertexFloat::new(5.0, 5.0)));
        assert!(p.contains(VertexFloat::new(1.0, 0.2)));
    }

    #[test]
    fn test_moments_of_rectangle() {
        let p = Polygon::new(vec![
            VertexFloat::new(0.0, 0.0),
            VertexFloat::new(4.0, 0.0),
            VertexFloat::new(4.0, 2.0),
            VertexFloat::new(0.0, 2.0),
        ]);
        let g = p.centroid();
        assert_eq!(g, VertexFloat::new(2.0, 1.0));
        // a w x h rectangle has variances w^2/12 and h^2/12
        let c = p.covariance_matrix_solid(g);
        assert!(close(c.xx(), 16.0 / 12.0));
        assert!(close(c.yy(), 4.0 / 12.0));
        assert!(c.xy().abs() < 1e-12);
        let e = c.ellipse(true);
        assert!(close(e.major_axis, (16.0f64 * 16.0 / 12.0).sqrt()));
        assert!(close(e.minor_axis, (16.0f64 * 4.0 / 12.0).sqrt()));
        let r = p.radius_statistics(g);
        assert!(close(r.mean(), 5f64.sqrt()));
        assert!(r.circularity() < 1e-12);
        assert!(close(c.inv().xx(), 12.0 / 16.0));
    }

    #[test]
    fn test_fit_ellipse() {
        let p = Polygon::new(
            (0..36)
                .map(|i| {
                    let t = i as f64 * PI / 18.0;
                    VertexFloat::new(1.0 + 4.0 * t.cos(), 2.0 + 2.0 * t.sin())
                })
                .collect(),
        );
        let e = p.fit_ellipse().unwrap();
        assert!((e.major_axis - 8.0).abs() < 1e-6);
        assert!((e.minor_axis - 4.0).abs() < 1e-6);
        assert!((e.center.x - 1.0).abs() < 1e-6);
        assert!((e.center.y - 2.0).abs() < 1e-6);
        assert!((e.eccentricity - 0.75f64.sqrt()).abs() < 1e-6);
        // collinear points describe no conic
        let line = Polygon::new((0..5).map(|i| VertexFloat::new(i as f64, 1.0)).collect());
        assert!(line.fit_ellipse().is_none());
        assert!(line.fit_circle().is_none());
    }

    #[test]
    fn test_bending_energy_and_fractal_dimension() {
        let circle = Polygon::new(
            (0..64)
                .map(|i| {
                    let t = i as f64 * PI / 32.0;
                    VertexFloat::new(20.0 * t.cos(), 20.0 * t.sin())
                })
                .collect(),
        );
        // the bending energy of a circle of radius r is 2 pi / r
        assert!((circle.bending_energy() - 2.0 * PI / 20.0).abs() < 1e-2);
        // smoothing shrinks the circle a little at every scale
        let fd = circle.fractal_dimension(0.0);
        assert!(fd > 1.0 && fd < 1.3);
        let tiny = Polygon::new(vec![VertexFloat::new(0.0, 0.0); 2]);
        assert_eq!(tiny.bending_energy(), 0.0);
        assert_eq!(tiny.fractal_dimension(0.0), 1.0);
    }

    #[test]
    fn test_radius_values_merge() {
        let mut a = RadiusValues::default();
        let mut b = RadiusValues::default();
        let mut all = RadiusValues::default();
        for r in [1.0, 2.0, 3.0] {
            a.push(r);
            all.push(r);
        }
        for r in [7.0, 0.5] {
            b.push(r);
            all.push(r);
        }
        a += b;
        assert!(close(a.mean(), all.mean()));
        assert!(close(a.variance(), all.variance()));
        assert_eq!(a.maximum(), 7.0);
        assert_eq!(a.minimum(), 0.5);
    }
}
