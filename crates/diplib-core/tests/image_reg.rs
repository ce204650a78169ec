//! Image container regression test
//!
//! Views sharing storage, singleton expansion, aliasing-safe arithmetic,
//! reforging and histograms.

use diplib_core::{
    ArithOp, CropLocation, DataType, Histogram, HistogramConfiguration, Image, Range, Tensor,
};
use diplib_test::RegParams;
use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

#[test]
fn image_reg() {
    let mut rp = RegParams::new("image");

    // --- Test 1: regular views write through to the parent ---
    eprintln!("=== Regular views ===");
    let img = Image::new(&[6, 4], 1, DataType::UInt16).unwrap();
    let view = img
        .at_ranges(&[Range::new(1, 5, 2), Range::new(-1, 0, 1)])
        .unwrap();
    rp.compare_values(3.0, view.size(0) as f64, 0.0);
    rp.compare_values(4.0, view.size(1) as f64, 0.0);
    view.fill(9u16).unwrap();
    rp.compare_values(9.0, img.get_f64(&[3, 2]).unwrap(), 0.0);
    rp.compare_values(0.0, img.get_f64(&[2, 2]).unwrap(), 0.0);
    // the second range runs backwards: view row 0 is image row 3
    view.set_f64(&[0, 0], 100.0).unwrap();
    rp.compare_values(100.0, img.get_f64(&[1, 3]).unwrap(), 0.0);
    rp.compare_values(1.0, view.shares_data(&img) as u8 as f64, 0.0);

    // --- Test 2: crop keeps the centre ---
    let ramp = Image::from_vec(&[5], vec![0u8, 1, 2, 3, 4]).unwrap();
    let centre = ramp.crop(&[2], CropLocation::Center).unwrap();
    rp.compare_values(1.0, centre.get_f64(&[0]).unwrap(), 0.0);
    let mirror = ramp.crop(&[2], CropLocation::MirrorCenter).unwrap();
    rp.compare_values(2.0, mirror.get_f64(&[0]).unwrap(), 0.0);

    // --- Test 3: singleton expansion and saturation ---
    eprintln!("=== Singleton expansion ===");
    let column = Image::from_vec(&[1, 3], vec![10u8, 20, 30]).unwrap();
    let row = Image::from_vec(&[4], vec![250u8, 0, 1, 2]).unwrap();
    let sum = column.arith(&row, ArithOp::Add, Some(DataType::UInt8)).unwrap();
    rp.compare_values(4.0, sum.size(0) as f64, 0.0);
    rp.compare_values(3.0, sum.size(1) as f64, 0.0);
    rp.compare_values(255.0, sum.get_f64(&[0, 2]).unwrap(), 0.0);
    rp.compare_values(22.0, sum.get_f64(&[3, 1]).unwrap(), 0.0);

    // X + Y - Y == X for a value that stays in range
    let x = Image::from_vec(&[3], vec![1.5f32, -2.0, 8.25]).unwrap();
    let y = Image::from_sample(4.0f32).unwrap();
    let back = x.add(&y).unwrap().subtract(&y).unwrap();
    rp.compare_images(&x, &back);

    // --- Test 4: aliased in-place arithmetic reads before writing ---
    let mut a = Image::from_vec(&[4], vec![1.0f64, 2.0, 3.0, 4.0]).unwrap();
    let mut mirrored = a.clone();
    mirrored.mirror(&[true]).unwrap();
    a.arith_in_place(&mirrored, ArithOp::Subtract).unwrap();
    let expected = Image::from_vec(&[4], vec![-3.0f64, -1.0, 1.0, 3.0]).unwrap();
    rp.compare_images(&expected, &a);

    // --- Test 5: reforge reuses unshared storage, strips on failure ---
    let mut r = Image::new(&[8, 8], 1, DataType::SFloat).unwrap();
    r.reforge(&[4, 16], 1, DataType::SFloat).unwrap();
    rp.compare_values(64.0, r.number_of_pixels() as f64, 0.0);
    rp.compare_values(1.0, r.is_forged() as u8 as f64, 0.0);
    let bad = r.reforge(&[usize::MAX, 4], 1, DataType::SFloat);
    rp.compare_values(1.0, bad.is_err() as u8 as f64, 0.0);
    rp.compare_values(0.0, r.is_forged() as u8 as f64, 0.0);
    // zero tensor elements is no valid tensor shape
    let mut t = Image::new(&[4, 4], 1, DataType::UInt8).unwrap();
    let bad = t.reforge(&[2, 2], 0, DataType::UInt8);
    rp.compare_values(1.0, bad.is_err() as u8 as f64, 0.0);
    rp.compare_values(0.0, t.is_forged() as u8 as f64, 0.0);

    // --- Test 6: tensor images and tensor-to-spatial ---
    let mut rgb = Image::with_tensor(&[2, 2], Tensor::vector(3).unwrap(), DataType::UInt8).unwrap();
    rgb.set_color_space("RGB");
    rgb.tensor_element(1).unwrap().fill(50u8).unwrap();
    let mut spatial = rgb.clone();
    spatial.tensor_to_spatial(0).unwrap();
    rp.compare_values(3.0, spatial.size(0) as f64, 0.0);
    rp.compare_values(50.0, spatial.get_f64(&[1, 1, 0]).unwrap(), 0.0);
    rp.compare_values(0.0, spatial.get_f64(&[2, 1, 0]).unwrap(), 0.0);

    // --- Test 7: histogram of a bimodal image ---
    eprintln!("=== Histogram ===");
    let mut values = vec![10u8; 30];
    values.extend(vec![200u8; 70]);
    let bimodal = Image::from_vec(&[10, 10], values).unwrap();
    let hist = Histogram::from_image(&bimodal, None, &HistogramConfiguration::default()).unwrap();
    rp.compare_values(100.0, hist.count() as f64, 0.0);
    rp.compare_values(30.0, hist.at(&[10]).unwrap() as f64, 0.0);
    rp.compare_values(70.0, hist.at(&[200]).unwrap() as f64, 0.0);
    let mut cumulative = hist.clone();
    cumulative.cumulative().unwrap();
    rp.compare_values(30.0, cumulative.at(&[199]).unwrap() as f64, 0.0);
    rp.compare_values(100.0, cumulative.at(&[255]).unwrap() as f64, 0.0);

    // --- Test 8: saturated round trip on random data ---
    eprintln!("=== Saturation ===");
    let mut rng = StdRng::seed_from_u64(271828);
    let samples = Uniform::new_inclusive(0u8, 255).unwrap();
    let data: Vec<u8> = (0..64).map(|_| samples.sample(&mut rng)).collect();
    let x = Image::from_vec(&[8, 8], data.clone()).unwrap();
    let y = Image::from_sample(100u8).unwrap();
    let up = x.arith(&y, ArithOp::Add, Some(DataType::UInt8)).unwrap();
    let back = up.arith(&y, ArithOp::Subtract, Some(DataType::UInt8)).unwrap();
    let got = back.to_vec::<u8>().unwrap();
    for (orig, result) in data.iter().zip(&got) {
        let expected = (*orig as u16 + 100).min(255) as u8 - 100;
        rp.compare_values(expected as f64, *result as f64, 0.0);
    }

    assert!(rp.cleanup(), "image regression test failed");
}
