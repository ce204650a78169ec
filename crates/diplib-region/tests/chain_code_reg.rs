//! Chain code regression test
//!
//! Traces object boundaries from label images and checks the derived
//! polygons, lengths, Feret diameters and offsets.

use std::f64::consts::PI;

use diplib_region::{
    ChainCode, LabelOptions, VertexInteger, get_image_chain_codes, get_single_chain_code, label,
};
use diplib_test::{RegParams, binary_image_from_ascii};

fn directions(cc: &ChainCode) -> Vec<u8> {
    cc.codes.iter().map(|c| c.direction()).collect()
}

#[test]
fn chain_code_reg() {
    let mut rp = RegParams::new("chain_code");

    // --- Test 1: isolated pixels ---
    eprintln!("=== Isolated pixels ===");
    let dots = binary_image_from_ascii(&[
        "#....", //
        ".....", //
        ".....", //
        ".....", //
        "....#", //
    ])
    .unwrap();
    let (labels, n) = label(&dots, &LabelOptions::default()).unwrap();
    rp.compare_values(2.0, n as f64, 0.0);
    let ccs = get_image_chain_codes(&labels, &[], 2).unwrap();
    rp.compare_values(2.0, ccs.len() as f64, 0.0);
    for cc in &ccs {
        rp.compare_values(0.0, cc.codes.len() as f64, 0.0);
        rp.compare_values(PI, cc.length(true).unwrap(), 1e-12);
        rp.compare_values(1.0, cc.area().unwrap(), 1e-12);
        let size = cc.bounding_box().size();
        rp.compare_values(1.0, size.x as f64, 0.0);
        rp.compare_values(1.0, size.y as f64, 0.0);
    }
    rp.compare_values(4.0, ccs[1].start.x as f64, 0.0);
    rp.compare_values(4.0, ccs[1].start.y as f64, 0.0);

    // --- Test 2: 2x2 square ---
    eprintln!("=== Square ===");
    let square = binary_image_from_ascii(&["....", ".##.", ".##.", "...."]).unwrap();
    let (labels, _) = label(&square, &LabelOptions::default()).unwrap();
    let cc = get_image_chain_codes(&labels, &[1], 2).unwrap().remove(0);
    rp.compare_strings(b"[0, 6, 4, 2]", format!("{:?}", directions(&cc)).as_bytes());
    let polygon = cc.polygon().unwrap();
    rp.compare_values(8.0, polygon.len() as f64, 0.0);
    rp.compare_values(3.5, polygon.area(), 1e-12);
    rp.compare_values(4.0, cc.area().unwrap(), 1e-12);
    let feret = cc.convex_hull().unwrap().feret();
    rp.compare_values(5f64.sqrt(), feret.max_diameter, 1e-9);
    rp.compare_values(2.0, feret.min_diameter, 1e-9);

    // --- Test 3: small disk in both connectivities ---
    eprintln!("=== Disk ===");
    let disk = binary_image_from_ascii(&[
        ".........", //
        ".........", //
        "...###...", //
        "..#####..", //
        "..#####..", //
        "..#####..", //
        "...###...", //
        ".........", //
        ".........", //
    ])
    .unwrap();
    let (labels, _) = label(&disk, &LabelOptions::default()).unwrap();
    let cc8 = get_image_chain_codes(&labels, &[1], 2).unwrap().remove(0);
    let cc4 = get_image_chain_codes(&labels, &[1], 1).unwrap().remove(0);
    rp.compare_values(3.0, cc8.start.x as f64, 0.0);
    rp.compare_values(2.0, cc8.start.y as f64, 0.0);
    rp.compare_strings(
        b"[0, 0, 7, 6, 6, 5, 4, 4, 3, 2, 2, 1]",
        format!("{:?}", directions(&cc8)).as_bytes(),
    );
    rp.compare_strings(
        b"[0, 0, 3, 0, 3, 3, 2, 3, 2, 2, 1, 2, 1, 1, 0, 1]",
        format!("{:?}", directions(&cc4)).as_bytes(),
    );
    let converted = cc4.convert_to_8_connected();
    rp.compare_strings(
        format!("{:?}", directions(&cc8)).as_bytes(),
        format!("{:?}", directions(&converted)).as_bytes(),
    );
    rp.compare_values(1.0, (cc8.polygon().unwrap() == cc4.polygon().unwrap()) as u8 as f64, 0.0);

    let polygon = cc8.polygon().unwrap();
    rp.compare_values(20.0, polygon.len() as f64, 0.0);
    rp.compare_values(20.5, polygon.area(), 1e-12);
    rp.compare_values(21.0, cc8.area().unwrap(), 1e-12);
    rp.compare_values(12.736, cc8.length(true).unwrap(), 1e-9);
    rp.compare_values(8.0 + 6.0 * 2f64.sqrt(), polygon.length(), 1e-9);
    let hull = cc8.convex_hull().unwrap();
    rp.compare_values(1.0, (hull.area() >= polygon.area() - 1e-9) as u8 as f64, 0.0);
    let centroid = cc8.centroid().unwrap();
    rp.compare_values(4.0, centroid.x, 1e-9);
    rp.compare_values(4.0, centroid.y, 1e-9);
    rp.show("disk chain code", &format!("{:?}", directions(&cc8)));

    // --- Test 4: offset equals the boundary of the dilated object ---
    eprintln!("=== Offset ===");
    let dilated = binary_image_from_ascii(&[
        ".........", //
        "...###...", //
        "..#####..", //
        ".#######.", //
        ".#######.", //
        ".#######.", //
        "..#####..", //
        "...###...", //
        ".........", //
    ])
    .unwrap();
    let offset = cc8.offset().unwrap();
    rp.compare_values(2.0, offset.start.x as f64, 0.0);
    rp.compare_values(2.0, offset.start.y as f64, 0.0);
    let traced = get_single_chain_code(&dilated, &[2, 2], 2).unwrap();
    rp.compare_strings(
        format!("{:?}", directions(&traced)).as_bytes(),
        format!("{:?}", directions(&offset)).as_bytes(),
    );
    rp.compare_values(1.0, offset.is_closed() as u8 as f64, 0.0);

    // --- Test 5: image of a chain code ---
    let outline = cc8.image().unwrap();
    rp.compare_strings(b"[5, 5]", format!("{:?}", outline.sizes().as_slice()).as_bytes());
    let n_set = outline.to_vec::<u8>().unwrap().iter().filter(|&&v| v != 0).count();
    rp.compare_values(12.0, n_set as f64, 0.0);

    // --- Test 6: chain codes built by hand ---
    let line = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 0, 4, 4], true);
    rp.compare_values(1.0, line.is_closed() as u8 as f64, 0.0);
    rp.compare_values(1.0, line.longest_run() as f64, 0.0);
    rp.compare_values(3.0, line.area().unwrap(), 1e-12);
    let open = ChainCode::from_directions(VertexInteger::new(0, 0), &[0, 0, 6], true);
    rp.compare_values(0.0, open.is_closed() as u8 as f64, 0.0);

    // --- Test 7: radius around the mean boundary pixel ---
    eprintln!("=== Radius ===");
    let square = binary_image_from_ascii(&[
        ".....", //
        ".###.", //
        ".###.", //
        ".###.", //
        ".....", //
    ])
    .unwrap();
    let (labels, _) = label(&square, &LabelOptions::default()).unwrap();
    for connectivity in [1, 2] {
        let cc = get_image_chain_codes(&labels, &[1], connectivity).unwrap().remove(0);
        let radius = cc.radius().unwrap();
        rp.compare_values((4.0 + 4.0 * 2f64.sqrt()) / 8.0, radius.mean(), 1e-12);
        rp.compare_values(2f64.sqrt(), radius.maximum(), 1e-12);
        rp.compare_values(1.0, radius.minimum(), 1e-12);
    }
    let (labels, _) = label(&dots, &LabelOptions::default()).unwrap();
    for cc in get_image_chain_codes(&labels, &[], 2).unwrap() {
        let radius = cc.radius().unwrap();
        rp.compare_values(0.0, radius.mean(), 0.0);
        rp.compare_values(0.0, radius.maximum(), 0.0);
        rp.compare_values(0.0, radius.minimum(), 0.0);
        rp.compare_values(0.0, radius.standard_deviation(), 0.0);
    }

    assert!(rp.cleanup(), "chain code regression test failed");
}
