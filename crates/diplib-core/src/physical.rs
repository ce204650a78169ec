//! Physical units and pixel sizes
//!
//! A [`PixelSize`] gives, per spatial dimension, the physical extent of one
//! pixel as a [`PhysicalQuantity`]. Measurement features use it to scale
//! their results and to annotate them with [`Units`].
//!
//! An image without calibration has a pixel size of "1 px" along every
//! dimension. Lookups beyond the stored dimensions repeat the last stored
//! value, so an isotropic pixel size is stored as a single element.
//!
//! # Examples
//!
//! ```
//! use diplib_core::{PhysicalQuantity, PixelSize, Units};
//!
//! let mut ps = PixelSize::default();
//! assert!(!ps.is_defined());
//! ps.set_isotropic(PhysicalQuantity::new(0.5, Units::meter()));
//! assert!(ps.is_isotropic());
//! assert_eq!(ps.get(3).magnitude, 0.5);
//! assert_eq!(ps.unit_size(2).units.to_string(), "m^2");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Div, Mul};

/// Product of base units raised to integer powers.
///
/// The empty product is dimensionless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Units {
    powers: BTreeMap<String, i32>,
}

impl Units {
    /// Dimensionless units.
    pub fn dimensionless() -> Self {
        Units::default()
    }

    /// A single base unit with power 1.
    pub fn new(symbol: &str) -> Self {
        let mut powers = BTreeMap::new();
        if !symbol.is_empty() {
            powers.insert(symbol.to_string(), 1);
        }
        Units { powers }
    }

    /// The pixel, the unit of uncalibrated images.
    pub fn pixel() -> Self {
        Units::new("px")
    }

    /// The meter.
    pub fn meter() -> Self {
        Units::new("m")
    }

    /// The radian.
    pub fn radian() -> Self {
        Units::new("rad")
    }

    /// Whether there are no base units.
    pub fn is_dimensionless(&self) -> bool {
        self.powers.is_empty()
    }

    /// Whether these are pixel units (any power).
    pub fn is_pixel(&self) -> bool {
        self.powers.len() == 1 && self.powers.contains_key("px")
    }

    /// Units raised to an integer power.
    pub fn power(&self, p: i32) -> Units {
        if p == 0 {
            return Units::dimensionless();
        }
        Units {
            powers: self.powers.iter().map(|(k, v)| (k.clone(), v * p)).collect(),
        }
    }

    fn combine(&self, other: &Units, sign: i32) -> Units {
        let mut powers = self.powers.clone();
        for (k, v) in &other.powers {
            let e = powers.entry(k.clone()).or_insert(0);
            *e += sign * v;
        }
        powers.retain(|_, v| *v != 0);
        Units { powers }
    }
}

impl Mul for &Units {
    type Output = Units;

    fn mul(self, rhs: &Units) -> Units {
        self.combine(rhs, 1)
    }
}

impl Div for &Units {
    type Output = Units;

    fn div(self, rhs: &Units) -> Units {
        self.combine(rhs, -1)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (unit, &power) in &self.powers {
            if !first {
                f.write_str("·")?;
            }
            first = false;
            if power == 1 {
                write!(f, "{unit}")?;
            } else {
                write!(f, "{unit}^{power}")?;
            }
        }
        Ok(())
    }
}

/// A magnitude with units.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalQuantity {
    pub magnitude: f64,
    pub units: Units,
}

impl Default for PhysicalQuantity {
    /// One pixel.
    fn default() -> Self {
        PhysicalQuantity::pixel()
    }
}

impl PhysicalQuantity {
    pub fn new(magnitude: f64, units: Units) -> Self {
        PhysicalQuantity { magnitude, units }
    }

    /// A dimensionless value.
    pub fn dimensionless(magnitude: f64) -> Self {
        PhysicalQuantity::new(magnitude, Units::dimensionless())
    }

    /// One pixel.
    pub fn pixel() -> Self {
        PhysicalQuantity::new(1.0, Units::pixel())
    }

    /// A length in micrometers, stored in meters.
    pub fn micrometer(magnitude: f64) -> Self {
        PhysicalQuantity::new(magnitude * 1e-6, Units::meter())
    }

    /// Whether the quantity carries physical units (not pixels, not
    /// dimensionless).
    pub fn is_physical(&self) -> bool {
        !self.units.is_dimensionless() && !self.units.is_pixel()
    }

    /// Quantity raised to an integer power.
    pub fn power(&self, p: i32) -> PhysicalQuantity {
        PhysicalQuantity::new(self.magnitude.powi(p), self.units.power(p))
    }
}

impl Mul for &PhysicalQuantity {
    type Output = PhysicalQuantity;

    fn mul(self, rhs: &PhysicalQuantity) -> PhysicalQuantity {
        PhysicalQuantity::new(self.magnitude * rhs.magnitude, &self.units * &rhs.units)
    }
}

impl Mul<f64> for PhysicalQuantity {
    type Output = PhysicalQuantity;

    fn mul(self, rhs: f64) -> PhysicalQuantity {
        PhysicalQuantity::new(self.magnitude * rhs, self.units)
    }
}

impl fmt::Display for PhysicalQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units.is_dimensionless() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.units)
        }
    }
}

/// Physical size of a pixel along each dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelSize {
    size: Vec<PhysicalQuantity>,
}

impl PixelSize {
    /// Same size along all dimensions.
    pub fn isotropic(q: PhysicalQuantity) -> Self {
        PixelSize { size: vec![q] }
    }

    /// One size per dimension.
    pub fn from_quantities(sizes: Vec<PhysicalQuantity>) -> Self {
        PixelSize { size: sizes }
    }

    /// Size along dimension `d`; dimensions past the stored ones repeat the
    /// last stored value.
    pub fn get(&self, d: usize) -> PhysicalQuantity {
        match self.size.len() {
            0 => PhysicalQuantity::pixel(),
            n => self.size[d.min(n - 1)].clone(),
        }
    }

    /// Set the size along dimension `d`, keeping the other dimensions.
    pub fn set(&mut self, d: usize, q: PhysicalQuantity) {
        if d >= self.size.len() {
            let fill = self.get(d);
            self.size.resize(d + 1, fill);
        }
        self.size[d] = q;
    }

    /// Set the same size along all dimensions.
    pub fn set_isotropic(&mut self, q: PhysicalQuantity) {
        self.size = vec![q];
    }

    /// Forget all calibration.
    pub fn clear(&mut self) {
        self.size.clear();
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.size.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Whether all dimensions have the same size.
    pub fn is_isotropic(&self) -> bool {
        self.size.windows(2).all(|w| w[0] == w[1])
    }

    /// Whether any dimension has a physical size.
    pub fn is_defined(&self) -> bool {
        self.size.iter().any(|q| q.is_physical())
    }

    /// Whether the first `n_dims` dimensions share the same units.
    pub fn same_units(&self, n_dims: usize) -> bool {
        let first = self.get(0).units;
        (1..n_dims).all(|d| self.get(d).units == first)
    }

    /// Physical size of a pixel in `n_dims` dimensions: the product of the
    /// per-dimension sizes.
    pub fn unit_size(&self, n_dims: usize) -> PhysicalQuantity {
        let mut out = PhysicalQuantity::dimensionless(1.0);
        for d in 0..n_dims {
            out = &out * &self.get(d);
        }
        out
    }

    /// Scale factor and units for dimension `d`, as used to annotate
    /// measurement values.
    pub fn scale_and_units(&self, d: usize) -> (f64, Units) {
        let q = self.get(d);
        (q.magnitude, q.units)
    }

    /// Keep only the first `n_dims` dimensions.
    pub fn resize(&mut self, n_dims: usize) {
        if self.size.len() > n_dims {
            self.size.truncate(n_dims.max(1));
        }
    }

    /// Reorder dimensions like [`crate::Image::permute_dimensions`].
    pub fn permute(&mut self, order: &[usize]) {
        if self.size.is_empty() {
            return;
        }
        self.size = order.iter().map(|&o| self.get(o)).collect();
    }

    /// Insert a dimension at `d` with a size of one pixel.
    pub fn insert(&mut self, d: usize) {
        if self.size.is_empty() {
            return;
        }
        if d >= self.size.len() {
            self.size.resize(d, self.get(d));
        }
        let q = self.get(d);
        self.size.insert(d, q);
    }

    /// Remove dimension `d`.
    pub fn erase(&mut self, d: usize) {
        if d < self.size.len() && self.size.len() > 1 {
            self.size.remove(d);
        }
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, q) in self.size.iter().enumerate() {
            if i > 0 {
                f.write_str(" x ")?;
            }
            write!(f, "{q}")?;
        }
        f.write_str("}")
    }
}
