//! diplib-test - Regression test framework for DIPlib
//!
//! This crate provides the regression test harness shared by the
//! `tests/*_reg.rs` files of the workspace crates, supporting three modes:
//!
//! - **Generate**: Print every checked value (to refresh expected literals)
//! - **Compare**: Compare results with the expected values
//! - **Display**: Compare, and print intermediate results (tables, chain codes)
//!
//! # Usage
//!
//! ```ignore
//! use diplib_test::RegParams;
//!
//! let mut rp = RegParams::new("label");
//! rp.compare_values(3.0, n_objects as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use diplib_core::Image;

/// Build a 2-D binary image from rows of text: `#` (or `1`) is foreground,
/// `.` (or `0`) is background. Row `y` of the input is image row `y`.
///
/// ```
/// let img = diplib_test::binary_image_from_ascii(&["#.", ".#"]).unwrap();
/// assert_eq!(img.sizes().as_slice(), &[2, 2]);
/// ```
pub fn binary_image_from_ascii(rows: &[&str]) -> TestResult<Image> {
    let width = fixture_width(rows)?;
    let mut data = Vec::with_capacity(width * rows.len());
    for (y, row) in rows.iter().enumerate() {
        for c in row.chars() {
            data.push(match c {
                '#' | '1' => true,
                '.' | '0' => false,
                other => {
                    return Err(TestError::Fixture {
                        row: y,
                        message: format!("unexpected character '{other}'"),
                    });
                }
            });
        }
    }
    Ok(Image::from_vec(&[width, rows.len()], data)?)
}

/// Build a 2-D `UInt32` label image from rows of text: digits are labels,
/// `.` is background (0).
pub fn label_image_from_ascii(rows: &[&str]) -> TestResult<Image> {
    let width = fixture_width(rows)?;
    let mut data = Vec::with_capacity(width * rows.len());
    for (y, row) in rows.iter().enumerate() {
        for c in row.chars() {
            data.push(match c {
                '.' => 0u32,
                d => d.to_digit(10).ok_or_else(|| TestError::Fixture {
                    row: y,
                    message: format!("unexpected character '{d}'"),
                })?,
            });
        }
    }
    Ok(Image::from_vec(&[width, rows.len()], data)?)
}

fn fixture_width(rows: &[&str]) -> TestResult<usize> {
    let width = rows.first().map_or(0, |r| r.chars().count());
    if width == 0 {
        return Err(TestError::Fixture {
            row: 0,
            message: "empty fixture".into(),
        });
    }
    match rows.iter().position(|r| r.chars().count() != width) {
        Some(row) => Err(TestError::Fixture {
            row,
            message: format!("expected {width} columns"),
        }),
        None => Ok(width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_fixture() {
        let img = label_image_from_ascii(&["1.2", "1.2"]).unwrap();
        assert_eq!(img.to_vec::<u32>().unwrap(), vec![1, 0, 2, 1, 0, 2]);
        assert!(label_image_from_ascii(&["1.", "1"]).is_err());
        assert!(binary_image_from_ascii(&["#x"]).is_err());
    }
}
