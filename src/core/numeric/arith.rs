//! Arithmetic on the numeric backend.
//!
//! Closed ring operations `+ - *` are total; division and powers go through
//! checked entry points that raise `KernelError::Arithmetic` on division by
//! exact zero and on `0^0` / `0^negative`. The operator impls assert on a
//! zero divisor, matching the contract `num-rational` itself ships.

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::Numeric;
use crate::core::error::KernelError;

// =============================================================================
// HELPERS
// =============================================================================

fn big_pow(base: &BigInt, mut e: u64) -> BigInt {
    let mut result = BigInt::one();
    let mut b = base.clone();
    while e > 0 {
        if e & 1 == 1 {
            result = &result * &b;
        }
        b = &b * &b;
        e >>= 1;
    }
    result
}

fn ratio_pow(r: &BigRational, e: i64) -> Numeric {
    let mag = e.unsigned_abs();
    let n = big_pow(r.numer(), mag);
    let d = big_pow(r.denom(), mag);
    if e >= 0 {
        Numeric::from_ratio(BigRational::new(n, d))
    } else {
        Numeric::from_ratio(BigRational::new(d, n))
    }
}

// Tag rank used only as a tie-break when two differently-tagged values are
// numerically equal (2 sorts before 2.0).
fn tag_rank(n: &Numeric) -> u8 {
    match n {
        Numeric::Int(_) => 0,
        Numeric::Rat(_) => 1,
        Numeric::Float(_) => 2,
        Numeric::Cplx { .. } => 3,
    }
}

fn cmp_real(a: &Numeric, b: &Numeric) -> Ordering {
    let value_cmp = match (a.to_ratio(), b.to_ratio()) {
        (Some(ra), Some(rb)) => ra.cmp(&rb),
        // A NaN or infinity is involved; order by the f64 partial order with
        // non-finite values last.
        _ => a
            .to_f64()
            .partial_cmp(&b.to_f64())
            .unwrap_or(Ordering::Equal),
    };
    value_cmp.then_with(|| tag_rank(a).cmp(&tag_rank(b)))
}

impl Numeric {
    /// Total order on numeric values: reals by value (tag as a tie-break),
    /// complex values lexicographically by real then imaginary part.
    pub fn cmp_values(&self, other: &Numeric) -> Ordering {
        if self.is_real() && other.is_real() {
            return cmp_real(self, other);
        }
        cmp_real(&self.real(), &other.real())
            .then_with(|| cmp_real(&self.imag(), &other.imag()))
    }

    // -------------------------------------------------------------------------
    // Checked operations
    // -------------------------------------------------------------------------

    /// Division raising `Arithmetic` on an exact-zero divisor.
    pub fn checked_div(&self, rhs: &Numeric) -> Result<Numeric, KernelError> {
        if rhs.is_zero() {
            return Err(KernelError::arithmetic("division by zero"));
        }
        Ok(div_unchecked(self, rhs))
    }

    /// Multiplicative inverse, raising `Arithmetic` on zero.
    pub fn checked_inv(&self) -> Result<Numeric, KernelError> {
        Numeric::from(1i64).checked_div(self)
    }

    /// Raise to a numeric power, exactly where possible.
    ///
    /// Returns `Ok(Some(_))` when the power evaluates (exact integer powers,
    /// perfect roots, float powers), `Ok(None)` when the power should stay
    /// symbolic (e.g. `2^(1/2)`), and an `Arithmetic` error for `0^0` and
    /// zero to a negative power.
    pub fn checked_pow(&self, expo: &Numeric) -> Result<Option<Numeric>, KernelError> {
        if self.is_zero() {
            return if expo.is_zero() {
                Err(KernelError::arithmetic("0^0 is undefined"))
            } else if expo.is_negative() {
                Err(KernelError::arithmetic("zero raised to a negative power"))
            } else if expo.is_positive() {
                if self.is_float() || expo.is_float() {
                    Ok(Some(Numeric::Float(0.0)))
                } else {
                    Ok(Some(Numeric::Int(BigInt::zero())))
                }
            } else {
                // Complex exponent of zero stays symbolic.
                Ok(None)
            };
        }
        match expo {
            Numeric::Int(k) => {
                let Some(k) = k.to_i64() else {
                    return Err(KernelError::arithmetic("exponent magnitude overflow"));
                };
                Ok(Some(self.pow_i64(k)?))
            }
            Numeric::Rat(r) => Ok(self.pow_rational(r)),
            Numeric::Float(f) => {
                if !self.is_real() {
                    return Ok(None);
                }
                let b = self.to_f64();
                if b < 0.0 && f.fract() != 0.0 {
                    // Would leave the real line.
                    return Ok(None);
                }
                Ok(Some(Numeric::Float(b.powf(*f))))
            }
            Numeric::Cplx { .. } => Ok(None),
        }
    }

    /// Exact integer power of a non-zero value.
    fn pow_i64(&self, k: i64) -> Result<Numeric, KernelError> {
        if k == 0 {
            return Ok(Numeric::Int(BigInt::one()));
        }
        match self {
            Numeric::Int(a) => {
                if k > 0 {
                    Ok(Numeric::Int(big_pow(a, k as u64)))
                } else {
                    Ok(Numeric::from_ratio(BigRational::new(
                        BigInt::one(),
                        big_pow(a, k.unsigned_abs()),
                    )))
                }
            }
            Numeric::Rat(r) => Ok(ratio_pow(r, k)),
            Numeric::Float(f) => {
                if let Ok(e) = i32::try_from(k) {
                    Ok(Numeric::Float(f.powi(e)))
                } else {
                    Ok(Numeric::Float(f.powf(k as f64)))
                }
            }
            Numeric::Cplx { .. } => {
                let base = if k < 0 {
                    self.checked_inv()?
                } else {
                    self.clone()
                };
                let mut e = k.unsigned_abs();
                let mut result = Numeric::Int(BigInt::one());
                let mut b = base;
                while e > 0 {
                    if e & 1 == 1 {
                        result = &result * &b;
                    }
                    b = &b * &b;
                    e >>= 1;
                }
                Ok(result)
            }
        }
    }

    /// Rational power: evaluates only perfect roots of exact non-negative
    /// reals (and any float base), otherwise stays symbolic.
    fn pow_rational(&self, r: &BigRational) -> Option<Numeric> {
        match self {
            Numeric::Float(f) => {
                let e = r.to_f64()?;
                if *f < 0.0 {
                    return None;
                }
                Some(Numeric::Float(f.powf(e)))
            }
            Numeric::Int(_) | Numeric::Rat(_) => {
                if self.is_negative() {
                    return None;
                }
                let base = self.to_ratio()?;
                let q = r.denom().to_u32()?;
                let p = r.numer().to_i64()?;
                let root_n = base.numer().nth_root(q);
                let root_d = base.denom().nth_root(q);
                if &big_pow(&root_n, u64::from(q)) != base.numer()
                    || &big_pow(&root_d, u64::from(q)) != base.denom()
                {
                    return None;
                }
                Some(ratio_pow(&BigRational::new(root_n, root_d), p))
            }
            Numeric::Cplx { .. } => None,
        }
    }

    // -------------------------------------------------------------------------
    // GCD / LCM (content computation support)
    // -------------------------------------------------------------------------

    /// Greatest common divisor. For integers the usual integer gcd; for
    /// rationals `gcd(n1,n2)/lcm(d1,d2)`; one for everything else.
    pub fn gcd(&self, other: &Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Numeric::Int(a.gcd(b)),
            (a, b) if a.is_rational() && b.is_rational() => {
                let (ra, rb) = match (a.to_ratio(), b.to_ratio()) {
                    (Some(ra), Some(rb)) => (ra, rb),
                    _ => return Numeric::Int(BigInt::one()),
                };
                Numeric::from_ratio(BigRational::new(
                    ra.numer().gcd(rb.numer()),
                    ra.denom().lcm(rb.denom()),
                ))
            }
            _ => Numeric::Int(BigInt::one()),
        }
    }

    /// Least common multiple for exact integers, one otherwise.
    pub fn lcm(&self, other: &Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Numeric::Int(a.lcm(b)),
            _ => Numeric::Int(BigInt::one()),
        }
    }

    /// Absolute value (identity for complex values).
    pub fn abs(&self) -> Numeric {
        if self.is_negative() { -self } else { self.clone() }
    }

    /// Exact factorial.
    pub fn factorial(n: u64) -> Numeric {
        let mut r = BigInt::one();
        for k in 2..=n {
            r = r * BigInt::from(k);
        }
        Numeric::Int(r)
    }
}

// =============================================================================
// OPERATORS
// =============================================================================

impl Add for &Numeric {
    type Output = Numeric;
    fn add(self, rhs: &Numeric) -> Numeric {
        use Numeric::{Cplx, Float, Int, Rat};
        match (self, rhs) {
            (Cplx { .. }, _) | (_, Cplx { .. }) => {
                Numeric::complex(&self.real() + &rhs.real(), &self.imag() + &rhs.imag())
            }
            (Float(a), b) => Float(a + b.to_f64()),
            (a, Float(b)) => Float(a.to_f64() + b),
            (Int(a), Int(b)) => Int(a + b),
            (Int(a), Rat(b)) => Numeric::from_ratio(BigRational::from_integer(a.clone()) + b),
            (Rat(a), Int(b)) => Numeric::from_ratio(a + BigRational::from_integer(b.clone())),
            (Rat(a), Rat(b)) => Numeric::from_ratio(a + b),
        }
    }
}

impl Sub for &Numeric {
    type Output = Numeric;
    fn sub(self, rhs: &Numeric) -> Numeric {
        self + &(-rhs)
    }
}

impl Mul for &Numeric {
    type Output = Numeric;
    fn mul(self, rhs: &Numeric) -> Numeric {
        use Numeric::{Cplx, Float, Int, Rat};
        match (self, rhs) {
            (Cplx { .. }, _) | (_, Cplx { .. }) => {
                let (ar, ai) = (self.real(), self.imag());
                let (br, bi) = (rhs.real(), rhs.imag());
                Numeric::complex(&(&ar * &br) - &(&ai * &bi), &(&ar * &bi) + &(&ai * &br))
            }
            (Float(a), b) => Float(a * b.to_f64()),
            (a, Float(b)) => Float(a.to_f64() * b),
            (Int(a), Int(b)) => Int(a * b),
            (Int(a), Rat(b)) => Numeric::from_ratio(BigRational::from_integer(a.clone()) * b),
            (Rat(a), Int(b)) => Numeric::from_ratio(a * BigRational::from_integer(b.clone())),
            (Rat(a), Rat(b)) => Numeric::from_ratio(a * b),
        }
    }
}

fn div_unchecked(lhs: &Numeric, rhs: &Numeric) -> Numeric {
    use Numeric::{Cplx, Float, Int, Rat};
    match (lhs, rhs) {
        (_, Cplx { .. }) => {
            // (a+bi)/(c+di) = (a+bi)(c-di) / (c^2+d^2)
            let (cr, ci) = (rhs.real(), rhs.imag());
            let den = &(&cr * &cr) + &(&ci * &ci);
            let conj = Numeric::complex(cr, -&ci);
            let num = lhs * &conj;
            Numeric::complex(
                div_unchecked(&num.real(), &den),
                div_unchecked(&num.imag(), &den),
            )
        }
        (Cplx { .. }, _) => Numeric::complex(
            div_unchecked(&lhs.real(), rhs),
            div_unchecked(&lhs.imag(), rhs),
        ),
        (Float(a), b) => Float(a / b.to_f64()),
        (a, Float(b)) => Float(a.to_f64() / b),
        (Int(a), Int(b)) => Numeric::from_ratio(BigRational::new(a.clone(), b.clone())),
        (Int(a), Rat(b)) => Numeric::from_ratio(BigRational::from_integer(a.clone()) / b),
        (Rat(a), Int(b)) => Numeric::from_ratio(a / BigRational::from_integer(b.clone())),
        (Rat(a), Rat(b)) => Numeric::from_ratio(a / b),
    }
}

impl Div for &Numeric {
    type Output = Numeric;
    /// Exact division.
    ///
    /// # Panics
    /// Panics if `rhs` is zero; use [`Numeric::checked_div`] for a fallible
    /// variant.
    fn div(self, rhs: &Numeric) -> Numeric {
        assert!(!rhs.is_zero(), "Numeric division by zero");
        div_unchecked(self, rhs)
    }
}

impl Neg for &Numeric {
    type Output = Numeric;
    fn neg(self) -> Numeric {
        match self {
            Numeric::Int(a) => Numeric::Int(-a),
            Numeric::Rat(r) => Numeric::Rat(-r),
            Numeric::Float(f) => Numeric::Float(-f),
            Numeric::Cplx { re, im } => Numeric::complex(-&**re, -&**im),
        }
    }
}

macro_rules! forward_owned_binop {
    ($($trait:ident, $method:ident);*) => {$(
        impl $trait for Numeric {
            type Output = Numeric;
            fn $method(self, rhs: Numeric) -> Numeric {
                $trait::$method(&self, &rhs)
            }
        }
    )*};
}
forward_owned_binop!(Add, add; Sub, sub; Mul, mul; Div, div);

impl Neg for Numeric {
    type Output = Numeric;
    fn neg(self) -> Numeric {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_sum_and_product() {
        let half = Numeric::ratio(1, 2);
        let third = Numeric::ratio(1, 3);
        assert_eq!(&half + &third, Numeric::ratio(5, 6));
        assert_eq!(&half * &third, Numeric::ratio(1, 6));
        assert_eq!(&half - &half, Numeric::from(0i64));
    }

    #[test]
    fn float_contaminates() {
        let r = &Numeric::ratio(1, 2) + &Numeric::Float(0.25);
        assert_eq!(r, Numeric::Float(0.75));
    }

    #[test]
    fn complex_field_ops() {
        let i = Numeric::i();
        assert_eq!(&i * &i, Numeric::from(-1i64));
        let z = Numeric::complex(Numeric::from(1i64), Numeric::from(1i64));
        let q = z.checked_div(&Numeric::i()).unwrap();
        assert_eq!(q, Numeric::complex(Numeric::from(1i64), Numeric::from(-1i64)));
    }

    #[test]
    fn division_by_zero_is_checked() {
        let e = Numeric::from(1i64).checked_div(&Numeric::from(0i64));
        assert!(matches!(e, Err(KernelError::Arithmetic { .. })));
    }

    #[test]
    fn integer_powers() {
        let two = Numeric::from(2i64);
        assert_eq!(
            two.checked_pow(&Numeric::from(10i64)).unwrap(),
            Some(Numeric::from(1024i64))
        );
        assert_eq!(
            two.checked_pow(&Numeric::from(-2i64)).unwrap(),
            Some(Numeric::ratio(1, 4))
        );
    }

    #[test]
    fn perfect_roots_evaluate_exactly() {
        let eight = Numeric::from(8i64);
        let third = Numeric::ratio(1, 3);
        assert_eq!(eight.checked_pow(&third).unwrap(), Some(Numeric::from(2i64)));
        // 2^(1/2) has no exact value and stays symbolic
        let two = Numeric::from(2i64);
        assert_eq!(two.checked_pow(&Numeric::ratio(1, 2)).unwrap(), None);
    }

    #[test]
    fn zero_power_errors() {
        let zero = Numeric::from(0i64);
        assert!(zero.checked_pow(&Numeric::from(0i64)).is_err());
        assert!(zero.checked_pow(&Numeric::from(-1i64)).is_err());
        assert_eq!(
            zero.checked_pow(&Numeric::from(3i64)).unwrap(),
            Some(Numeric::from(0i64))
        );
    }

    #[test]
    fn rational_gcd() {
        let a = Numeric::ratio(4, 3);
        let b = Numeric::ratio(2, 9);
        assert_eq!(a.gcd(&b), Numeric::ratio(2, 9));
        assert_eq!(
            Numeric::from(12i64).gcd(&Numeric::from(18i64)),
            Numeric::from(6i64)
        );
    }

    #[test]
    fn value_order_is_total() {
        let two = Numeric::from(2i64);
        let two_f = Numeric::Float(2.0);
        assert_eq!(two.cmp_values(&two_f), Ordering::Less);
        assert_eq!(two.cmp_values(&two), Ordering::Equal);
        assert_eq!(
            Numeric::ratio(1, 2).cmp_values(&Numeric::from(1i64)),
            Ordering::Less
        );
    }
}
