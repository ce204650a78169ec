//! Polygon regression test
//!
//! Convex hulls of random star-shaped polygons, plus moments and fits of
//! shapes with known answers.

use std::f64::consts::PI;

use diplib_region::vertex::parallelogram_signed_area;
use diplib_region::{Polygon, VertexFloat};
use diplib_test::RegParams;
use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

/// Vertices at increasing angles around `center`, so the polygon is simple.
fn star_polygon(rng: &mut StdRng, center: VertexFloat, n: usize) -> Polygon {
    let radius = Uniform::new(4.0, 10.0).unwrap();
    let jitter = Uniform::new(0.0, 0.9).unwrap();
    let step = 2.0 * PI / n as f64;
    let vertices = (0..n)
        .map(|i| {
            let phi = (i as f64 + jitter.sample(rng)) * step;
            let r = radius.sample(rng);
            center + VertexFloat::new(r * phi.cos(), r * phi.sin())
        })
        .collect();
    Polygon::new(vertices)
}

#[test]
fn polygon_reg() {
    let mut rp = RegParams::new("polygon");

    // --- Test 1: hulls of random polygons ---
    eprintln!("=== Random hulls ===");
    let mut rng = StdRng::seed_from_u64(1234);
    for n in [5, 12, 40, 200] {
        let polygon = star_polygon(&mut rng, VertexFloat::new(20.0, 30.0), n);
        let hull = polygon.convex_hull().unwrap();
        let hv = hull.vertices();
        rp.compare_values(1.0, (hv.len() <= n) as u8 as f64, 0.0);
        rp.compare_values(1.0, (hull.area() >= polygon.area().abs() - 1e-9) as u8 as f64, 0.0);
        rp.compare_values(1.0, hull.polygon().is_clockwise() as u8 as f64, 0.0);

        // every input vertex lies on the inner side of every hull edge
        let mut outside = 0;
        for i in 0..hv.len() {
            let (a, b) = (hv[i], hv[(i + 1) % hv.len()]);
            outside += polygon
                .vertices
                .iter()
                .filter(|&&v| parallelogram_signed_area(a, b, v) < -1e-9)
                .count();
        }
        rp.compare_values(0.0, outside as f64, 0.0);

        let feret = hull.feret();
        rp.compare_values(
            1.0,
            (feret.min_diameter <= feret.max_perpendicular + 1e-9
                && feret.max_perpendicular <= feret.max_diameter + 1e-9) as u8 as f64,
            0.0,
        );
    }

    // --- Test 2: moments of a rectangle ---
    eprintln!("=== Rectangle ===");
    let rectangle = Polygon::new(vec![
        VertexFloat::new(0.0, 0.0),
        VertexFloat::new(6.0, 0.0),
        VertexFloat::new(6.0, 2.0),
        VertexFloat::new(0.0, 2.0),
    ]);
    let centroid = rectangle.centroid();
    rp.compare_values(3.0, centroid.x, 1e-12);
    rp.compare_values(1.0, centroid.y, 1e-12);
    let c = rectangle.covariance_matrix_solid(centroid);
    // second central moments of a w x h box are w^2/12 and h^2/12
    rp.compare_values(3.0, c.xx(), 1e-9);
    rp.compare_values(1.0 / 3.0, c.yy(), 1e-9);
    rp.compare_values(0.0, c.xy(), 1e-9);
    let ellipse = c.ellipse(true);
    rp.compare_values(1.0, (ellipse.major_axis > ellipse.minor_axis) as u8 as f64, 0.0);

    // --- Test 3: circle fit of a regular polygon ---
    let mut circle = Polygon::new(
        (0..36)
            .map(|i| {
                let phi = i as f64 * PI / 18.0;
                VertexFloat::new(5.0 + 7.0 * phi.cos(), -2.0 + 7.0 * phi.sin())
            })
            .collect(),
    );
    let fit = circle.fit_circle().unwrap();
    rp.compare_values(5.0, fit.center.x, 1e-6);
    rp.compare_values(-2.0, fit.center.y, 1e-6);
    rp.compare_values(14.0, fit.diameter, 1e-6);
    let radius = circle.radius_statistics(circle.centroid());
    rp.compare_values(7.0, radius.mean(), 1e-9);
    rp.compare_values(0.0, radius.circularity(), 1e-9);

    // moving the polygon moves the fit
    circle.translate(VertexFloat::new(-5.0, 2.0)).scale(0.5);
    let fit = circle.fit_circle().unwrap();
    rp.compare_values(0.0, fit.center.x, 1e-6);
    rp.compare_values(0.0, fit.center.y, 1e-6);
    rp.compare_values(7.0, fit.diameter, 1e-6);

    assert!(rp.cleanup(), "polygon regression test failed");
}
