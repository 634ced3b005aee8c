//! Numeric leaf values for symbolic expressions
//!
//! Numbers are real (`f64`) with a complex fallback for expressions
//! whose evaluation leaves a non-zero imaginary part.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete numeric value in a symbolic expression
///
/// `Real(x)` and `Complex(x + 0i)` compare equal and hash identically;
/// the variant records how the value was produced, not a distinct
/// mathematical object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Number {
    /// Real value
    Real(f64),
    /// Complex value with a (usually) non-zero imaginary part
    Complex(Complex64),
}

impl Number {
    /// Real part
    pub fn re(&self) -> f64 {
        match self {
            Number::Real(x) => *x,
            Number::Complex(z) => z.re,
        }
    }

    /// Imaginary part (zero for reals)
    pub fn im(&self) -> f64 {
        match self {
            Number::Real(_) => 0.0,
            Number::Complex(z) => z.im,
        }
    }

    /// True when the imaginary part is exactly zero
    pub fn is_real(&self) -> bool {
        self.im() == 0.0
    }

    pub fn is_zero(&self) -> bool {
        self.re() == 0.0 && self.im() == 0.0
    }

    /// Widen to `Complex64`
    pub fn to_complex(&self) -> Complex64 {
        match self {
            Number::Real(x) => Complex64::new(*x, 0.0),
            Number::Complex(z) => *z,
        }
    }

    /// Classify a raw complex result: zero imaginary part collapses to
    /// `Real`, anything else stays `Complex`.
    pub fn classify(z: Complex64) -> Self {
        if z.im == 0.0 {
            Number::Real(z.re)
        } else {
            Number::Complex(z)
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.re() == other.re() && self.im() == other.im()
    }
}

impl Eq for Number {}

// 0.0 and -0.0 compare equal, so they must hash identically.
fn canonical_bits(x: f64) -> u64 {
    if x == 0.0 {
        0.0f64.to_bits()
    } else {
        x.to_bits()
    }
}

impl std::hash::Hash for Number {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        canonical_bits(self.re()).hash(state);
        canonical_bits(self.im()).hash(state);
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Number::Real(x)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Real(n as f64)
    }
}

impl From<Complex64> for Number {
    fn from(z: Complex64) -> Self {
        Number::Complex(z)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Real(x) => write!(f, "{x:?}"),
            Number::Complex(z) => {
                if z.im < 0.0 {
                    write!(f, "({:?}-{:?}i)", z.re, -z.im)
                } else {
                    write!(f, "({:?}+{:?}i)", z.re, z.im)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(n: &Number) -> u64 {
        let mut h = DefaultHasher::new();
        n.hash(&mut h);
        h.finish()
    }

    #[test]
    fn real_and_zero_im_complex_are_equal() {
        let a = Number::Real(2.0);
        let b = Number::Complex(Complex64::new(2.0, 0.0));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn signed_zero_hashes_consistently() {
        let a = Number::Real(0.0);
        let b = Number::Real(-0.0);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn classify_collapses_reals() {
        assert_eq!(
            Number::classify(Complex64::new(1.5, 0.0)),
            Number::Real(1.5)
        );
        assert!(!Number::classify(Complex64::new(0.0, 1.0)).is_real());
    }

    #[test]
    fn zero_detection() {
        assert!(Number::Real(0.0).is_zero());
        assert!(Number::Complex(Complex64::new(0.0, 0.0)).is_zero());
        assert!(!Number::Complex(Complex64::new(0.0, 1.0)).is_zero());
        assert!(!Number::Real(2.0).is_zero());
    }

    #[test]
    fn display_round_trip_forms() {
        assert_eq!(Number::Real(2.0).to_string(), "2.0");
        assert_eq!(
            Number::Complex(Complex64::new(1.0, -0.5)).to_string(),
            "(1.0-0.5i)"
        );
    }
}
