//! Measurement regression test
//!
//! Measures all features on a digitized disk, with and without a pixel
//! size, then exercises merging, column statistics and painting values
//! back into an image.

use std::f64::consts::PI;

use diplib_core::{DataType, Image, PhysicalQuantity, PixelSize};
use diplib_measure::{
    MeasureOptions, Measurement, MeasurementTool, object_to_measurement, statistics,
};
use diplib_test::{RegParams, label_image_from_ascii};

const RADIUS: f64 = 22.0;

const ALL_FEATURES: [&str; 26] = [
    "Size",
    "Minimum",
    "Maximum",
    "CartesianBox",
    "Center",
    "Mu",
    "Mass",
    "Mean",
    "MaxVal",
    "MinVal",
    "MaxPos",
    "MinPos",
    "Perimeter",
    "SolidArea",
    "BendingEnergy",
    "Feret",
    "ConvexArea",
    "ConvexPerimeter",
    "Radius",
    "EllipseVariance",
    "AspectRatioFeret",
    "P2A",
    "Roundness",
    "Circularity",
    "Solidity",
    "Convexity",
];

/// 50 x 50 image with `value` on the pixels closer than `RADIUS` to (25, 25).
fn disk(value: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(50 * 50);
    for y in 0..50 {
        for x in 0..50 {
            let d = ((x as f64 - 25.0).powi(2) + (y as f64 - 25.0).powi(2)).sqrt();
            data.push(if d < RADIUS { value } else { 0 });
        }
    }
    data
}

fn check_all(
    rp: &mut RegParams,
    msr: &Measurement,
    id: usize,
    expected: &[(&str, &[f64])],
    delta: f64,
) {
    for (name, values) in expected {
        let actual = &msr[(*name, id)];
        for (e, a) in values.iter().zip(actual) {
            rp.compare_values(*e, *a, delta);
        }
    }
}

#[test]
fn measure_reg() {
    let mut rp = RegParams::new("measure");
    let mut tool = MeasurementTool::new();
    let options = MeasureOptions::default();

    // --- Test 1: a disk in pixel units ---
    eprintln!("=== Disk ===");
    let label = Image::from_vec(&[50, 50], disk(1)).unwrap();
    let grey = label.convert(DataType::SFloat).unwrap();
    let msr = tool.measure(&label, Some(&grey), &ALL_FEATURES, &[], &options).unwrap();
    rp.show("disk", &msr);
    rp.compare_values(1.0, msr.number_of_objects() as f64, 0.0);
    rp.compare_values(ALL_FEATURES.len() as f64, msr.number_of_features() as f64, 0.0);
    check_all(
        &mut rp,
        &msr,
        1,
        &[
            ("Size", &[1513.0]),
            ("Minimum", &[4.0, 4.0]),
            ("Maximum", &[46.0, 46.0]),
            ("CartesianBox", &[43.0, 43.0]),
            ("Center", &[25.0, 25.0]),
            ("Mu", &[120.41903502974223, 120.41903502974223, 0.0]),
            ("Mass", &[1513.0]),
            ("Mean", &[1.0]),
            ("MaxVal", &[1.0]),
            ("MinVal", &[1.0]),
            ("MaxPos", &[19.0, 4.0]),
            ("MinPos", &[19.0, 4.0]),
            ("Perimeter", &[138.3095926535898]),
            ("SolidArea", &[1513.0]),
            ("Feret", &[44.77722635447622, 43.0, 43.0]),
            ("ConvexArea", &[1536.5]),
            ("ConvexPerimeter", &[139.67204647558393]),
            ("Radius", &[22.38861317723811, 21.963770669767502, 21.5, 0.2752756208160413]),
            ("EllipseVariance", &[0.01253316768577222]),
            ("AspectRatioFeret", &[1.0]),
            ("P2A", &[1.0061339703847818]),
            ("Roundness", &[0.9939034258206828]),
            ("Circularity", &[0.0125331676857722]),
            ("Solidity", &[0.9847054995118777]),
            ("Convexity", &[1.0]),
        ],
        1e-6,
    );
    rp.compare_values(0.3062873295633374, msr[("BendingEnergy", 1)][0], 1e-6);

    // close to the values of the continuous disk
    rp.compare_values(PI * RADIUS * RADIUS, msr[("Size", 1)][0], 8.0);
    rp.compare_values(2.0 * PI * RADIUS, msr[("Perimeter", 1)][0], 0.08);
    rp.compare_values(PI * RADIUS * RADIUS, msr[("ConvexArea", 1)][0], 17.0);
    rp.compare_values(2.0 * PI * RADIUS, msr[("ConvexPerimeter", 1)][0], 1.5);
    rp.compare_values(2.0 * PI / RADIUS, msr[("BendingEnergy", 1)][0], 0.03);
    rp.compare_values(RADIUS * RADIUS / 4.0, msr[("Mu", 1)][0], 0.6);

    // --- Test 2: the same disk with a pixel size ---
    eprintln!("=== Calibrated disk ===");
    let ps = 0.21e-6;
    let mut label_um = Image::from_vec(&[50, 50], disk(2)).unwrap();
    label_um.set_pixel_size(PixelSize::isotropic(PhysicalQuantity::micrometer(0.21)));
    let grey_um = Image::from_vec(&[50, 50], vec![2.0f32; 2500]).unwrap();
    let msr_um = tool.measure(&label_um, Some(&grey_um), &ALL_FEATURES, &[], &options).unwrap();
    rp.show("calibrated disk", &msr_um);
    rp.compare_values(2.0, msr_um.objects()[0] as f64, 0.0);

    let length = ps;
    let area = ps * ps;
    let scaled = [
        ("Size", area),
        ("Minimum", length),
        ("Maximum", length),
        ("CartesianBox", length),
        ("Center", length),
        ("Mu", area),
        ("MaxPos", length),
        ("MinPos", length),
        ("Perimeter", length),
        ("SolidArea", area),
        ("BendingEnergy", 1.0 / length),
        ("ConvexArea", area),
        ("ConvexPerimeter", length),
        ("Radius", length),
        ("EllipseVariance", 1.0),
        ("AspectRatioFeret", 1.0),
        ("P2A", 1.0),
        ("Roundness", 1.0),
        ("Circularity", 1.0),
        ("Solidity", 1.0),
        ("Convexity", 1.0),
    ];
    for (name, scale) in scaled {
        for (px, um) in msr[(name, 1)].iter().zip(&msr_um[(name, 2)]) {
            let expected = px * scale;
            rp.compare_values(expected, *um, expected.abs() * 1e-9);
        }
    }
    let feret_px = &msr[("Feret", 1)];
    let feret_um = &msr_um[("Feret", 2)];
    rp.compare_values(feret_px[0] * length, feret_um[0], 1e-15);
    rp.compare_values(feret_px[3], feret_um[3], 1e-12);
    rp.compare_values(2.0 * 1513.0, msr_um[("Mass", 2)][0], 1e-9);
    rp.compare_values(2.0, msr_um[("Mean", 2)][0], 1e-12);

    let units_of = |name: &str| msr_um.feature_values(name).unwrap()[0].units.to_string();
    rp.compare_strings(b"m^2", units_of("Size").as_bytes());
    rp.compare_strings(b"m", units_of("Perimeter").as_bytes());
    rp.compare_strings(b"m^-1", units_of("BendingEnergy").as_bytes());
    rp.compare_strings(b"", units_of("P2A").as_bytes());
    let feret_units = msr_um.feature_values("Feret").unwrap()[4].units.to_string();
    rp.compare_strings(b"rad", feret_units.as_bytes());

    // --- Test 3: merging measurements of different objects and features ---
    eprintln!("=== Merge ===");
    let label = label_image_from_ascii(&[
        "11..2",
        "11..2",
        "....2",
        "3....",
    ])
    .unwrap();
    let sizes = tool.measure(&label, None, &["Size"], &[1, 2], &options).unwrap();
    let perimeters = tool.measure(&label, None, &["Perimeter"], &[2, 3], &options).unwrap();
    let merged = (&sizes + &perimeters).unwrap();
    rp.show("merged", &merged);
    rp.compare_values(3.0, merged.number_of_objects() as f64, 0.0);
    rp.compare_values(4.0, merged[("Size", 1)][0], 0.0);
    rp.compare_values(f64::NAN, merged[("Size", 3)][0], 0.0);
    rp.compare_values(f64::NAN, merged[("Perimeter", 1)][0], 0.0);
    rp.compare_values(PI, merged[("Perimeter", 3)][0], 1e-12);
    let table = merged.to_string();
    rp.compare_values(1.0, (table.contains("Size") && table.contains("Perimeter")) as u8 as f64, 0.0);

    // --- Test 4: column statistics ---
    eprintln!("=== Statistics ===");
    let msr = tool.measure(&label, None, &["Size", "Center"], &[], &options).unwrap();
    let size = msr.feature("Size").unwrap();
    rp.compare_values(1.0, statistics::minimum(&size), 0.0);
    rp.compare_values(4.0, statistics::maximum(&size), 0.0);
    rp.compare_values(3.0, statistics::median(&size), 0.0);
    rp.compare_values(8.0 / 3.0, statistics::mean(&size), 1e-12);
    rp.compare_values(3.0, statistics::object_minimum(&size).unwrap() as f64, 0.0);
    rp.compare_values(1.0, statistics::object_maximum(&size).unwrap() as f64, 0.0);
    let stats = statistics::sample_statistics(&size);
    rp.compare_values(7.0 / 3.0, stats.variance, 1e-12);
    // second value of Center: the y coordinate
    let center_y = msr.feature("Center").unwrap().subset(1, 1).unwrap();
    rp.compare_values(3.0, statistics::maximum(&center_y), 0.0);

    // --- Test 5: painting a feature back into the label image ---
    eprintln!("=== Object to measurement ===");
    let painted = object_to_measurement(&label, &size).unwrap();
    let expected = Image::from_vec(
        &[5, 4],
        vec![
            4.0f32, 4.0, 0.0, 0.0, 3.0, //
            4.0, 4.0, 0.0, 0.0, 3.0, //
            0.0, 0.0, 0.0, 0.0, 3.0, //
            1.0, 0.0, 0.0, 0.0, 0.0, //
        ],
    )
    .unwrap();
    rp.compare_images(&expected, &painted);

    // --- Test 6: 4-connected boundaries ---
    eprintln!("=== Connectivity ===");
    let label = label_image_from_ascii(&[".....", ".111.", ".111.", ".111.", "....."]).unwrap();
    let four = options.clone().with_connectivity(1);
    let msr8 = tool.measure(&label, None, &["SolidArea", "Size"], &[], &options).unwrap();
    let msr4 = tool.measure(&label, None, &["SolidArea", "Size"], &[], &four).unwrap();
    rp.compare_values(9.0, msr8[("SolidArea", 1)][0], 1e-12);
    rp.compare_values(1.0, (msr4[("SolidArea", 1)][0] > 0.0) as u8 as f64, 0.0);
    rp.compare_values(msr8[("Size", 1)][0], msr4[("Size", 1)][0], 0.0);

    assert!(rp.cleanup(), "measure regression test failed");
}
