//! Boundary conditions
//!
//! How an operation treats the pixels just outside the image. Parsed from
//! the library's flag strings.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Boundary condition along one image dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// The image is mirrored at the edge, the edge pixel repeated
    #[default]
    SymmetricMirror,
    /// The image is mirrored and negated
    AsymmetricMirror,
    /// The image repeats
    Periodic,
    /// The image repeats, negated every other period
    AsymmetricPeriodic,
    /// Zeros outside the image
    AddZeros,
    /// The maximum value of the data type outside the image
    AddMaxValue,
    /// The minimum value of the data type outside the image
    AddMinValue,
    /// The edge pixel repeats
    ZeroOrderExtrapolate,
    FirstOrderExtrapolate,
    SecondOrderExtrapolate,
    ThirdOrderExtrapolate,
    /// Objects touching the edge are discarded (labeling only)
    Remove,
}

impl BoundaryCondition {
    /// Flag string for this condition.
    pub fn name(self) -> &'static str {
        match self {
            BoundaryCondition::SymmetricMirror => "mirror",
            BoundaryCondition::AsymmetricMirror => "asym mirror",
            BoundaryCondition::Periodic => "periodic",
            BoundaryCondition::AsymmetricPeriodic => "asym periodic",
            BoundaryCondition::AddZeros => "add zeros",
            BoundaryCondition::AddMaxValue => "add max",
            BoundaryCondition::AddMinValue => "add min",
            BoundaryCondition::ZeroOrderExtrapolate => "zero order",
            BoundaryCondition::FirstOrderExtrapolate => "first order",
            BoundaryCondition::SecondOrderExtrapolate => "second order",
            BoundaryCondition::ThirdOrderExtrapolate => "third order",
            BoundaryCondition::Remove => "remove",
        }
    }

    /// Parse a list of flag strings.
    ///
    /// ```
    /// use diplib_core::BoundaryCondition;
    ///
    /// let bc = BoundaryCondition::parse_array(&["periodic", ""]).unwrap();
    /// assert_eq!(bc, vec![BoundaryCondition::Periodic, BoundaryCondition::SymmetricMirror]);
    /// ```
    pub fn parse_array(flags: &[&str]) -> Result<Vec<BoundaryCondition>> {
        flags.iter().map(|s| s.parse()).collect()
    }

    /// Expand a list of conditions to one per dimension. An empty list gives
    /// the default everywhere, a single condition is used for every
    /// dimension.
    ///
    /// # Errors
    ///
    /// [`Error::ArrayParameterWrongLength`] for any other length mismatch.
    pub fn per_dimension(list: &[BoundaryCondition], n_dims: usize) -> Result<Vec<BoundaryCondition>> {
        match list.len() {
            0 => Ok(vec![BoundaryCondition::default(); n_dims]),
            1 => Ok(vec![list[0]; n_dims]),
            n if n == n_dims => Ok(list.to_vec()),
            n => Err(Error::ArrayParameterWrongLength {
                expected: n_dims,
                actual: n,
            }),
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "" | "default" | "mirror" | "symmetric mirror" => BoundaryCondition::SymmetricMirror,
            "asym mirror" | "asymmetric mirror" => BoundaryCondition::AsymmetricMirror,
            "periodic" => BoundaryCondition::Periodic,
            "asym periodic" | "asymmetric periodic" => BoundaryCondition::AsymmetricPeriodic,
            "add zeros" => BoundaryCondition::AddZeros,
            "add max" => BoundaryCondition::AddMaxValue,
            "add min" => BoundaryCondition::AddMinValue,
            "zero order" => BoundaryCondition::ZeroOrderExtrapolate,
            "first order" => BoundaryCondition::FirstOrderExtrapolate,
            "second order" => BoundaryCondition::SecondOrderExtrapolate,
            "third order" => BoundaryCondition::ThirdOrderExtrapolate,
            "remove" => BoundaryCondition::Remove,
            other => return Err(Error::InvalidFlag(other.to_string())),
        })
    }
}
