//! Threshold selection regression test
//!
//! Runs the five histogram estimators on synthetic histograms with known
//! structure, then thresholds random two-phase images.

use diplib_core::{Histogram, Image};
use diplib_segment::histogram as hist_threshold;
use diplib_segment::{BackgroundOptions, TriangleOptions, otsu_threshold};
use diplib_test::RegParams;
use rand::SeedableRng;
use rand::distr::{Bernoulli, Distribution, Uniform};
use rand::rngs::StdRng;

fn histogram_of(f: impl Fn(f64) -> f64) -> Histogram {
    let counts = (0..256).map(|i| f(i as f64).round() as u32).collect();
    Histogram::from_counts(counts, 0.0, 1.0).unwrap()
}

fn gaussian(x: f64, mean: f64, sigma: f64) -> f64 {
    (-(x - mean) * (x - mean) / (2.0 * sigma * sigma)).exp()
}

#[test]
fn threshold_reg() {
    let mut rp = RegParams::new("threshold");

    // --- Test 1: two spikes ---
    eprintln!("=== Two spikes ===");
    let spikes = histogram_of(|x| if x == 50.0 || x == 200.0 { 500.0 } else { 0.0 });
    let t = hist_threshold::otsu_threshold(&spikes).unwrap();
    rp.compare_values(125.5, t, 0.5);
    let t = hist_threshold::isodata_threshold(&spikes, 1).unwrap();
    rp.compare_values(125.5, t[0], 1e-12);

    // --- Test 2: mixture of two Gaussians ---
    eprintln!("=== Gaussian mixture ===");
    let mixture =
        histogram_of(|x| 1000.0 * gaussian(x, 60.0, 10.0) + 500.0 * gaussian(x, 180.0, 20.0));
    let otsu = hist_threshold::otsu_threshold(&mixture).unwrap();
    rp.compare_values(121.0, otsu, 1.0);
    let isodata = hist_threshold::isodata_threshold(&mixture, 1).unwrap();
    rp.compare_values(120.59, isodata[0], 0.5);
    let min_error = hist_threshold::minimum_error_threshold(&mixture).unwrap();
    rp.compare_values(103.5, min_error, 1.5);
    let triangle = hist_threshold::triangle_threshold(&mixture, &TriangleOptions::default()).unwrap();
    rp.compare_values(90.5, triangle, 1.5);
    eprintln!(
        "  otsu {otsu}, isodata {}, minimum error {min_error}, triangle {triangle}",
        isodata[0]
    );

    // --- Test 3: triangle on a decaying histogram finds the knee ---
    eprintln!("=== Decay ===");
    let decay = histogram_of(|x| 1000.0 * (-x / 20.0).exp());
    let t = hist_threshold::triangle_threshold(&decay, &TriangleOptions::default()).unwrap();
    rp.compare_values(59.5, t, 2.0);

    // --- Test 4: background peak on either side ---
    eprintln!("=== Background ===");
    let dark = |x: f64| 1000.0 * gaussian(x, 40.0, 6.0) + 30.0 * gaussian(x, 150.0, 30.0);
    let options = BackgroundOptions::default();
    let t_dark = hist_threshold::background_threshold(&histogram_of(dark), &options).unwrap();
    // two HWHM of a sigma 6 peak above its centre at 40.5
    rp.compare_values(40.5 + 2.0 * 6.0 * 2.355 / 2.0, t_dark, 1.0);
    let t_bright =
        hist_threshold::background_threshold(&histogram_of(|x| dark(255.0 - x)), &options)
            .unwrap();
    rp.compare_values(256.0, t_dark + t_bright, 1e-6);
    let wider = options.with_distance(3.0);
    let t_wider = hist_threshold::background_threshold(&histogram_of(dark), &wider).unwrap();
    rp.compare_values(1.0, (t_wider > t_dark) as u8 as f64, 0.0);

    // --- Test 5: random two-phase images ---
    eprintln!("=== Random images ===");
    let mut rng = StdRng::seed_from_u64(42);
    let phase = Bernoulli::new(0.3).unwrap();
    let dark = Uniform::new(20.0f32, 60.0).unwrap();
    let bright = Uniform::new(150.0f32, 230.0).unwrap();
    for size in [[64, 48], [17, 200]] {
        let n = size[0] * size[1];
        let truth: Vec<bool> = (0..n).map(|_| phase.sample(&mut rng)).collect();
        let data: Vec<f32> = truth
            .iter()
            .map(|&fg| {
                if fg {
                    bright.sample(&mut rng)
                } else {
                    dark.sample(&mut rng)
                }
            })
            .collect();
        let img = Image::from_vec(&size, data).unwrap();
        let (t, bin) = otsu_threshold(&img, None).unwrap();
        rp.compare_values(1.0, (t > 60.0 && t < 150.0) as u8 as f64, 0.0);
        let expected = Image::from_vec(&size, truth).unwrap();
        rp.compare_images(&expected, &bin);
    }

    assert!(rp.cleanup(), "threshold regression test failed");
}
