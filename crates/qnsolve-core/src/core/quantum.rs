use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Mul, Neg};
use thiserror::Error;

/// Shorthand for a quantum number given in units of 1/2 (e.g. `halves(3)` is 3/2).
pub fn halves(numerator: i32) -> Ratio<i32> {
    Ratio::new(numerator, 2)
}

/// Shorthand for an integer-valued quantum number as an exact rational.
pub fn whole(value: i32) -> Ratio<i32> {
    Ratio::from_integer(value)
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SpinError {
    #[error("spin magnitude {0} has to be non-negative")]
    NegativeMagnitude(Ratio<i32>),

    #[error("spin magnitude {0} has to be a multiple of 1/2")]
    MagnitudeNotHalfInteger(Ratio<i32>),

    #[error("(projection - magnitude) has to be an integer, got projection {projection} for magnitude {magnitude}")]
    NonIntegerDifference {
        magnitude: Ratio<i32>,
        projection: Ratio<i32>,
    },

    #[error("absolute value of spin projection {projection} cannot be larger than the magnitude {magnitude}")]
    ProjectionExceedsMagnitude {
        magnitude: Ratio<i32>,
        projection: Ratio<i32>,
    },

    #[error("parity can only be +1 or -1, got {0}")]
    InvalidParity(i32),
}

/// Eigenvalue of a parity-like operation (spatial parity, C-parity, G-parity).
///
/// Parity is multiplicative: the parity of a multi-particle state is the
/// product of the constituents' parities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Parity {
    Negative,
    Positive,
}

impl Parity {
    /// Converts an integer `+1`/`-1` into a `Parity`.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::InvalidParity`] for any other value.
    pub fn new(value: i32) -> Result<Self, SpinError> {
        match value {
            1 => Ok(Parity::Positive),
            -1 => Ok(Parity::Negative),
            other => Err(SpinError::InvalidParity(other)),
        }
    }

    /// The eigenvalue as a signed integer (`+1` or `-1`).
    pub fn sign(self) -> i32 {
        match self {
            Parity::Positive => 1,
            Parity::Negative => -1,
        }
    }
}

impl Neg for Parity {
    type Output = Parity;

    fn neg(self) -> Parity {
        match self {
            Parity::Positive => Parity::Negative,
            Parity::Negative => Parity::Positive,
        }
    }
}

impl Mul for Parity {
    type Output = Parity;

    fn mul(self, rhs: Parity) -> Parity {
        if self == rhs {
            Parity::Positive
        } else {
            Parity::Negative
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Positive => write!(f, "+1"),
            Parity::Negative => write!(f, "-1"),
        }
    }
}

/// A spin-like quantum number: a magnitude together with one of its projections.
///
/// Used both for angular momentum and for isospin. All arithmetic is exact:
/// magnitudes and projections are rationals with denominator 1 or 2.
///
/// Construction enforces the four invariants of an SU(2) multiplet member:
/// the magnitude is a non-negative multiple of 1/2, the projection differs
/// from the magnitude by an integer, and its absolute value does not exceed
/// the magnitude.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Spin {
    magnitude: Ratio<i32>,
    projection: Ratio<i32>,
}

impl Spin {
    /// Creates a validated `Spin`.
    ///
    /// # Errors
    ///
    /// Returns a [`SpinError`] describing the first violated invariant.
    pub fn new(magnitude: Ratio<i32>, projection: Ratio<i32>) -> Result<Self, SpinError> {
        if magnitude < whole(0) {
            return Err(SpinError::NegativeMagnitude(magnitude));
        }
        if !(magnitude * 2).is_integer() {
            return Err(SpinError::MagnitudeNotHalfInteger(magnitude));
        }
        if !(projection - magnitude).is_integer() {
            return Err(SpinError::NonIntegerDifference {
                magnitude,
                projection,
            });
        }
        let abs_projection = if projection < whole(0) {
            -projection
        } else {
            projection
        };
        if abs_projection > magnitude {
            return Err(SpinError::ProjectionExceedsMagnitude {
                magnitude,
                projection,
            });
        }
        Ok(Self {
            magnitude,
            projection,
        })
    }

    pub fn magnitude(&self) -> Ratio<i32> {
        self.magnitude
    }

    pub fn projection(&self) -> Ratio<i32> {
        self.projection
    }
}

impl Neg for Spin {
    type Output = Spin;

    /// Flips the projection, keeping the magnitude (charge conjugation of isospin).
    fn neg(self) -> Spin {
        Spin {
            magnitude: self.magnitude,
            projection: -self.projection,
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spin({}, {})", self.magnitude, self.projection)
    }
}

/// The interaction regime assumed at a single interaction vertex.
///
/// The interaction type determines which conservation rules are enforced at
/// that vertex; see [`crate::engine::rules::rule_set`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum InteractionType {
    Strong,
    EM,
    Weak,
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionType::Strong => write!(f, "strong"),
            InteractionType::EM => write!(f, "EM"),
            InteractionType::Weak => write!(f, "weak"),
        }
    }
}
