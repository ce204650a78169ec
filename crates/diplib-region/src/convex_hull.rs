//! Convex hull of a simple polygon

use std::collections::VecDeque;
use std::f64::consts::FRAC_PI_2;

use log::trace;

use crate::error::{RegionError, RegionResult};
use crate::polygon::{FeretValues, Polygon};
use crate::vertex::{VertexFloat, angle, distance, parallelogram_signed_area, triangle_height};

/// A convex polygon with clockwise vertices.
///
/// # Examples
///
/// ```
/// use diplib_region::{Polygon, VertexFloat};
///
/// let p = Polygon::new(vec![
///     VertexFloat::new(0.0, 0.0),
///     VertexFloat::new(0.0, 1.0),
///     VertexFloat::new(1.0, 1.0),
///     VertexFloat::new(1.0, 0.0),
///     VertexFloat::new(0.5, 0.5),
/// ]);
/// let hull = p.convex_hull().unwrap();
/// assert_eq!(hull.polygon().len(), 4);
/// assert_eq!(hull.area(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvexHull {
    polygon: Polygon,
}

impl ConvexHull {
    /// Hull of `polygon` by Melkman's algorithm. Polygons with up to three
    /// vertices are taken as they are.
    ///
    /// # Errors
    ///
    /// [`RegionError::CollinearVertices`] if all vertices lie on one line,
    /// [`RegionError::SelfIntersecting`] if the polygon is not simple.
    pub fn new(polygon: &Polygon) -> RegionResult<Self> {
        let input = &polygon.vertices;
        if input.len() <= 3 {
            return Ok(ConvexHull {
                polygon: polygon.clone(),
            });
        }

        // areas this much smaller than the shortest edge are rounding noise
        let min_length = polygon
            .edges()
            .map(|(a, b)| distance(a, b))
            .fold(f64::INFINITY, f64::min);
        let eps = min_length * 1e-9;

        let v1 = input[0];
        let mut i2 = 1;
        let mut i3 = 2;
        while parallelogram_signed_area(v1, input[i2], input[i3]).abs() < eps {
            i2 = i3;
            i3 += 1;
            if i3 == input.len() {
                return Err(RegionError::CollinearVertices);
            }
        }
        let (v2, v3) = (input[i2], input[i3]);

        let mut deque = VecDeque::with_capacity(input.len() + 1);
        if parallelogram_signed_area(v1, v2, v3) > 0.0 {
            deque.push_back(v1);
            deque.push_back(v2);
        } else {
            deque.push_back(v2);
            deque.push_back(v1);
        }
        deque.push_back(v3);
        deque.push_front(v3);

        for &v in &input[i3 + 1..] {
            if left_of_front(&deque, v) > -eps && left_of_back(&deque, v) > -eps {
                // inside the current hull
                continue;
            }
            while left_of_back(&deque, v) < eps {
                deque.pop_back();
                if deque.len() < 2 {
                    return Err(RegionError::SelfIntersecting);
                }
            }
            deque.push_back(v);
            while left_of_front(&deque, v) < eps {
                deque.pop_front();
                if deque.len() < 2 {
                    return Err(RegionError::SelfIntersecting);
                }
            }
            deque.push_front(v);
        }
        // the deque starts and ends with the same vertex
        deque.pop_front();

        trace!("convex_hull: {} of {} vertices", deque.len(), input.len());
        Ok(ConvexHull {
            polygon: Polygon::new(deque.into()),
        })
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn into_polygon(self) -> Polygon {
        self.polygon
    }

    pub fn vertices(&self) -> &[VertexFloat] {
        &self.polygon.vertices
    }

    pub fn area(&self) -> f64 {
        self.polygon.area()
    }

    pub fn perimeter(&self) -> f64 {
        self.polygon.length()
    }

    pub fn centroid(&self) -> VertexFloat {
        self.polygon.centroid()
    }

    /// Feret diameters by rotating calipers over the antipodal vertex pairs.
    ///
    /// Hulls with fewer than three vertices get nominal values: two vertices
    /// give their distance as the maximum and 1 as the minimum, a single
    /// vertex gives 1 for both, and an empty hull gives zeros.
    pub fn feret(&self) -> FeretValues {
        let v = &self.polygon.vertices;
        let n = v.len();
        let mut feret = FeretValues::default();
        if n < 3 {
            if n == 2 {
                feret.max_diameter = distance(v[0], v[1]);
                feret.min_diameter = 1.0;
                feret.max_perpendicular = feret.max_diameter;
            } else if n == 1 {
                feret.max_diameter = 1.0;
                feret.min_diameter = 1.0;
                feret.max_perpendicular = 1.0;
            }
            return feret;
        }

        let next = |i: usize| (i + 1) % n;
        // whether moving q forward takes it further from the edge (p, p+1)
        let advances = |p: usize, q: usize| {
            parallelogram_signed_area(v[p], v[next(p)], v[next(q)])
                > parallelogram_signed_area(v[p], v[next(p)], v[q])
        };

        let mut p = 0;
        let mut q = 1;
        while advances(p, q) {
            q = next(q);
        }

        feret.min_diameter = f64::MAX;
        let record_max = |feret: &mut FeretValues, a: VertexFloat, b: VertexFloat| {
            let d = distance(a, b);
            if d > feret.max_diameter {
                feret.max_diameter = d;
                feret.max_angle = angle(a, b);
            }
        };
        let record_min = |feret: &mut FeretValues, q: usize, p: usize| {
            let d = triangle_height(v[q], v[next(q)], v[p]);
            if d < feret.min_diameter {
                feret.min_diameter = d;
                feret.min_angle = angle(v[q], v[next(q)]);
            }
        };
        while p != n - 1 {
            p += 1;
            record_max(&mut feret, v[p], v[q]);
            while advances(p, q) {
                record_min(&mut feret, q, p);
                q = next(q);
                record_max(&mut feret, v[p], v[q]);
            }
            if parallelogram_signed_area(v[p], v[next(p)], v[next(q)])
                == parallelogram_signed_area(v[p], v[next(p)], v[q])
            {
                // (p, q + 1) is antipodal too, q stays
                record_min(&mut feret, q, p);
                record_max(&mut feret, v[p], v[next(q)]);
            }
        }

        // extent perpendicular to the minimum diameter
        let (sin, cos) = feret.min_angle.sin_cos();
        let (pmin, pmax) = v.iter().fold((f64::MAX, f64::MIN), |(lo, hi), v| {
            let d = v.x * cos + v.y * sin;
            (lo.min(d), hi.max(d))
        });
        feret.max_perpendicular = pmax - pmin;
        feret.min_angle += FRAC_PI_2;
        feret
    }
}

/// Signed area of `v` and the first edge of the deque.
fn left_of_front(deque: &VecDeque<VertexFloat>, v: VertexFloat) -> f64 {
    parallelogram_signed_area(v, deque[0], deque[1])
}

/// Signed area of the last edge of the deque and `v`.
fn left_of_back(deque: &VecDeque<VertexFloat>, v: VertexFloat) -> f64 {
    let n = deque.len();
    parallelogram_signed_area(deque[n - 2], deque[n - 1], v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(points: &[(f64, f64)]) -> Polygon {
        Polygon::new(points.iter().map(|&(x, y)| VertexFloat::new(x, y)).collect())
    }

    #[test]
    fn test_hull_of_concave_square() {
        let p = polygon(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.5, 0.5)]);
        assert_eq!(p.area(), -0.75);
        assert!(!p.is_clockwise());
        let h = p.convex_hull().unwrap();
        assert_eq!(h.vertices().len(), 4);
        assert_eq!(h.area(), 1.0);
        assert_eq!(h.perimeter(), 4.0);
        assert!(h.polygon().is_clockwise());
        let f = h.feret();
        assert!((f.max_diameter - 2f64.sqrt()).abs() < 1e-12);
        assert!((f.min_diameter - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_vertices() {
        let p = polygon(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert!(matches!(p.convex_hull(), Err(RegionError::CollinearVertices)));
    }

    #[test]
    fn test_rectangle_feret() {
        let p = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]);
        let f = p.convex_hull().unwrap().feret();
        assert!((f.max_diameter - 5.0).abs() < 1e-12);
        assert!((f.min_diameter - 3.0).abs() < 1e-12);
        assert!((f.max_perpendicular - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_hulls() {
        assert_eq!(ConvexHull::default().feret(), FeretValues::default());
        let two = polygon(&[(0.0, 0.0), (3.0, 4.0)]).convex_hull().unwrap().feret();
        assert_eq!(two.max_diameter, 5.0);
        assert_eq!(two.min_diameter, 1.0);
        assert_eq!(two.max_perpendicular, 5.0);
    }
}
