//! Exact numeric backend.
//!
//! A single value type with four internal tags: arbitrary-precision integer,
//! rational, complex (Gaussian components), and machine float. All bignum
//! arithmetic is delegated to the `num` crates; this module only enforces the
//! kernel's invariants on top:
//!
//! - a `Rat` is never integral (a rational with denominator 1 collapses to
//!   `Int`),
//! - a `Cplx` never has a zero imaginary part (it collapses to its real
//!   component), and its components are themselves real,
//! - mixed exact/float operations promote to float; floats never demote back
//!   to rationals automatically.
//!
//! The backend is the only layer that raises arithmetic errors (division by
//! zero, zero to a non-positive power). The predicates are total booleans.

mod arith;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::hash::{Hash, Hasher};

use crate::core::error::KernelError;

/// An exact number: integer, rational, Gaussian complex, or machine float.
#[derive(Debug, Clone)]
pub enum Numeric {
    /// Arbitrary-precision integer.
    Int(BigInt),
    /// Reduced non-integral rational (denominator > 1).
    Rat(BigRational),
    /// Complex number with exact real components and non-zero imaginary part.
    Cplx {
        /// Real part (never itself complex).
        re: Box<Numeric>,
        /// Imaginary part (never itself complex, never zero).
        im: Box<Numeric>,
    },
    /// Machine double; the delegated "arbitrary precision" float backend.
    Float(f64),
}

impl Numeric {
    // -------------------------------------------------------------------------
    // Constructors (normalizing)
    // -------------------------------------------------------------------------

    /// Build from a `BigRational`, collapsing integral values to `Int`.
    pub fn from_ratio(r: BigRational) -> Self {
        if r.denom().is_one() {
            Numeric::Int(r.numer().clone())
        } else {
            Numeric::Rat(r)
        }
    }

    /// Build the reduced rational `num/den`.
    ///
    /// # Panics
    /// Panics if `den` is zero, matching the contract of `BigRational::new`.
    pub fn ratio(num: i64, den: i64) -> Self {
        Numeric::from_ratio(BigRational::new(BigInt::from(num), BigInt::from(den)))
    }

    /// Build a complex number, collapsing a zero imaginary part.
    pub fn complex(re: Numeric, im: Numeric) -> Self {
        debug_assert!(!matches!(re, Numeric::Cplx { .. }));
        debug_assert!(!matches!(im, Numeric::Cplx { .. }));
        if im.is_zero() {
            re
        } else {
            Numeric::Cplx {
                re: Box::new(re),
                im: Box::new(im),
            }
        }
    }

    /// The imaginary unit.
    pub fn i() -> Self {
        Numeric::Cplx {
            re: Box::new(Numeric::Int(BigInt::zero())),
            im: Box::new(Numeric::Int(BigInt::one())),
        }
    }

    // -------------------------------------------------------------------------
    // Predicates
    // -------------------------------------------------------------------------

    /// Exact or float zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Numeric::Int(n) => n.is_zero(),
            Numeric::Rat(_) => false,
            Numeric::Cplx { .. } => false,
            Numeric::Float(f) => *f == 0.0,
        }
    }

    /// Exact or float one.
    pub fn is_one(&self) -> bool {
        match self {
            Numeric::Int(n) => n.is_one(),
            Numeric::Rat(_) => false,
            Numeric::Cplx { .. } => false,
            Numeric::Float(f) => *f == 1.0,
        }
    }

    /// Exact or float minus one.
    pub fn is_minus_one(&self) -> bool {
        match self {
            Numeric::Int(n) => (-n).is_one(),
            Numeric::Float(f) => *f == -1.0,
            _ => false,
        }
    }

    /// True for the exact integer tag.
    pub fn is_integer(&self) -> bool {
        matches!(self, Numeric::Int(_))
    }

    /// True for exact integers and rationals.
    pub fn is_rational(&self) -> bool {
        matches!(self, Numeric::Int(_) | Numeric::Rat(_))
    }

    /// True for everything except complex.
    pub fn is_real(&self) -> bool {
        !matches!(self, Numeric::Cplx { .. })
    }

    /// Strictly positive real.
    pub fn is_positive(&self) -> bool {
        match self {
            Numeric::Int(n) => n.is_positive(),
            Numeric::Rat(r) => r.is_positive(),
            Numeric::Cplx { .. } => false,
            Numeric::Float(f) => *f > 0.0,
        }
    }

    /// Strictly negative real.
    pub fn is_negative(&self) -> bool {
        match self {
            Numeric::Int(n) => n.is_negative(),
            Numeric::Rat(r) => r.is_negative(),
            Numeric::Cplx { .. } => false,
            Numeric::Float(f) => *f < 0.0,
        }
    }

    /// Positive exact integer.
    pub fn is_pos_integer(&self) -> bool {
        matches!(self, Numeric::Int(n) if n.is_positive())
    }

    /// Non-negative exact integer.
    pub fn is_nonneg_integer(&self) -> bool {
        matches!(self, Numeric::Int(n) if !n.is_negative())
    }

    /// Even exact integer.
    pub fn is_even(&self) -> bool {
        matches!(self, Numeric::Int(n) if num_integer::Integer::is_even(n))
    }

    /// Odd exact integer.
    pub fn is_odd(&self) -> bool {
        matches!(self, Numeric::Int(n) if num_integer::Integer::is_odd(n))
    }

    /// True for the float tag (on either component for complex).
    pub fn is_float(&self) -> bool {
        match self {
            Numeric::Float(_) => true,
            Numeric::Cplx { re, im } => re.is_float() || im.is_float(),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Conversions
    // -------------------------------------------------------------------------

    /// Approximate as a double (real part only for complex).
    pub fn to_f64(&self) -> f64 {
        match self {
            Numeric::Int(n) => n.to_f64().unwrap_or(f64::INFINITY),
            Numeric::Rat(r) => r.to_f64().unwrap_or(f64::INFINITY),
            Numeric::Cplx { re, .. } => re.to_f64(),
            Numeric::Float(f) => *f,
        }
    }

    /// Exact conversion to `i64` for small integers.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => n.to_i64(),
            _ => None,
        }
    }

    /// Exact conversion to `BigInt`.
    ///
    /// # Errors
    /// `Domain` if the value is not an exact integer.
    pub fn to_big_int(&self) -> Result<BigInt, KernelError> {
        match self {
            Numeric::Int(n) => Ok(n.clone()),
            _ => Err(KernelError::domain("conversion to integer of a non-integer")),
        }
    }

    /// Exact conversion of a real exact value to `BigRational`.
    pub(crate) fn to_ratio(&self) -> Option<BigRational> {
        match self {
            Numeric::Int(n) => Some(BigRational::from_integer(n.clone())),
            Numeric::Rat(r) => Some(r.clone()),
            Numeric::Float(f) => BigRational::from_float(*f),
            Numeric::Cplx { .. } => None,
        }
    }

    /// Numerator of a rational (the value itself for integers).
    pub fn numer(&self) -> Numeric {
        match self {
            Numeric::Int(_) => self.clone(),
            Numeric::Rat(r) => Numeric::Int(r.numer().clone()),
            other => other.clone(),
        }
    }

    /// Denominator of a rational (one for integers).
    pub fn denom(&self) -> Numeric {
        match self {
            Numeric::Rat(r) => Numeric::Int(r.denom().clone()),
            _ => Numeric::Int(BigInt::one()),
        }
    }

    /// Real part.
    pub fn real(&self) -> Numeric {
        match self {
            Numeric::Cplx { re, .. } => (**re).clone(),
            other => other.clone(),
        }
    }

    /// Imaginary part (zero for reals).
    pub fn imag(&self) -> Numeric {
        match self {
            Numeric::Cplx { im, .. } => (**im).clone(),
            _ => Numeric::Int(BigInt::zero()),
        }
    }

    /// Promote to the float tag (componentwise for complex).
    pub fn to_float(&self) -> Numeric {
        match self {
            Numeric::Cplx { re, im } => Numeric::complex(re.to_float(), im.to_float()),
            other => Numeric::Float(other.to_f64()),
        }
    }

    // -------------------------------------------------------------------------
    // Parsing (archive support)
    // -------------------------------------------------------------------------

    /// Parse a real numeric from its canonical text form.
    ///
    /// Accepts `123`, `-4`, `3/2`, and float literals (`1.5`, `2e10`).
    ///
    /// # Errors
    /// `Runtime` on malformed input.
    pub fn parse_real(s: &str) -> Result<Numeric, KernelError> {
        if let Some((n, d)) = s.split_once('/') {
            let n: BigInt = n
                .parse()
                .map_err(|_| KernelError::runtime(format!("bad rational literal '{s}'")))?;
            let d: BigInt = d
                .parse()
                .map_err(|_| KernelError::runtime(format!("bad rational literal '{s}'")))?;
            if d.is_zero() {
                return Err(KernelError::runtime(format!("bad rational literal '{s}'")));
            }
            return Ok(Numeric::from_ratio(BigRational::new(n, d)));
        }
        if let Ok(n) = s.parse::<BigInt>() {
            return Ok(Numeric::Int(n));
        }
        s.parse::<f64>()
            .map(Numeric::Float)
            .map_err(|_| KernelError::runtime(format!("bad numeric literal '{s}'")))
    }
}

impl From<i64> for Numeric {
    fn from(n: i64) -> Self {
        Numeric::Int(BigInt::from(n))
    }
}

impl From<i32> for Numeric {
    fn from(n: i32) -> Self {
        Numeric::Int(BigInt::from(n))
    }
}

impl From<u64> for Numeric {
    fn from(n: u64) -> Self {
        Numeric::Int(BigInt::from(n))
    }
}

impl From<f64> for Numeric {
    fn from(f: f64) -> Self {
        Numeric::Float(f)
    }
}

impl From<BigInt> for Numeric {
    fn from(n: BigInt) -> Self {
        Numeric::Int(n)
    }
}

impl From<BigRational> for Numeric {
    fn from(r: BigRational) -> Self {
        Numeric::from_ratio(r)
    }
}

// Structural equality: tags are part of identity, so `2` and `2.0` are
// distinct values (they compare adjacent in the canonical order).
impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a == b,
            (Numeric::Rat(a), Numeric::Rat(b)) => a == b,
            (Numeric::Float(a), Numeric::Float(b)) => a.to_bits() == b.to_bits(),
            (Numeric::Cplx { re: ar, im: ai }, Numeric::Cplx { re: br, im: bi }) => {
                ar == br && ai == bi
            }
            _ => false,
        }
    }
}

impl Eq for Numeric {}

impl Hash for Numeric {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Numeric::Int(n) => n.hash(state),
            Numeric::Rat(r) => r.hash(state),
            Numeric::Float(f) => f.to_bits().hash(state),
            Numeric::Cplx { re, im } => {
                re.hash(state);
                im.hash(state);
            }
        }
    }
}
