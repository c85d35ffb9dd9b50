//! The canonicalizing power constructor.
//!
//! Construction-time rules (everything else stays a `Pow` node):
//! - `x^0 -> 1`, `x^1 -> x`, `1^x -> 1`
//! - numeric^numeric evaluates exactly where an exact value exists
//! - `(b^r)^n -> b^(r*n)` for numeric `r` and integer `n`
//! - `(a*b)^n` distributes over a canonical product for integer `n`
//! - `0^0` and zero to a negative power raise `Arithmetic`

use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;

use super::pairseq::{self, mul_many};

/// Fallible power constructor.
///
/// # Errors
/// `Arithmetic` for `0^0` and zero raised to a negative power.
pub fn try_power(base: Ex, expo: Ex) -> Result<Ex, KernelError> {
    if let NodeKind::Num(e) = &*expo {
        if e.is_zero() {
            if base.is_zero() {
                return Err(KernelError::arithmetic("0^0 is undefined"));
            }
            return Ok(Ex::one());
        }
        if e.is_one() {
            return Ok(base);
        }
        if let NodeKind::Num(b) = &*base {
            if let Some(value) = b.checked_pow(e)? {
                return Ok(Ex::numeric(value));
            }
        }
        if e.is_integer() {
            // (b^r)^n -> b^(r*n) is only sound for integer n.
            if let NodeKind::Pow {
                base: inner_base,
                expo: inner_expo,
            } = &*base
            {
                if let NodeKind::Num(r) = &**inner_expo {
                    return try_power(inner_base.clone(), Ex::numeric(r * e));
                }
            }
            // (a*b)^n distributes over the pairs of a canonical product.
            if let NodeKind::Mul(seq) = &*base {
                let mut factors = Vec::with_capacity(seq.pairs.len() + 1);
                for p in &seq.pairs {
                    factors.push(try_power(p.rest.clone(), Ex::numeric(&p.coeff * e))?);
                }
                if let Some(value) = seq.overall.checked_pow(e)? {
                    factors.push(Ex::numeric(value));
                } else {
                    factors.push(Ex::new(NodeKind::Pow {
                        base: Ex::numeric(seq.overall.clone()),
                        expo: expo.clone(),
                    }));
                }
                return Ok(mul_many(factors));
            }
        }
    }
    if base.is_one() {
        return Ok(Ex::one());
    }
    Ok(Ex::new(NodeKind::Pow { base, expo }))
}

/// Power constructor.
///
/// # Panics
/// Panics on `0^0` and zero raised to a negative power; use [`try_power`]
/// for a fallible variant.
pub fn power(base: impl Into<Ex>, expo: impl Into<Ex>) -> Ex {
    match try_power(base.into(), expo.into()) {
        Ok(e) => e,
        Err(err) => panic!("power: {err}"),
    }
}

impl Ex {
    /// `self ^ expo`.
    ///
    /// # Panics
    /// Panics on `0^0` and zero raised to a negative power; use
    /// [`Ex::try_pow`] for a fallible variant.
    pub fn pow(&self, expo: impl Into<Ex>) -> Ex {
        power(self.clone(), expo)
    }

    /// Fallible `self ^ expo`.
    ///
    /// # Errors
    /// `Arithmetic` for `0^0` and zero raised to a negative power.
    pub fn try_pow(&self, expo: impl Into<Ex>) -> Result<Ex, KernelError> {
        try_power(self.clone(), expo.into())
    }

    /// Square root as the canonical power `self^(1/2)`.
    pub fn sqrt(&self) -> Ex {
        power(self.clone(), Ex::half())
    }

    /// Multiplicative inverse `self^(-1)`.
    ///
    /// # Errors
    /// `Arithmetic` if `self` is exactly zero.
    pub fn try_inverse(&self) -> Result<Ex, KernelError> {
        try_power(self.clone(), Ex::minus_one())
    }

    /// Fallible division.
    ///
    /// # Errors
    /// `Arithmetic` if `rhs` is exactly zero.
    pub fn try_div(&self, rhs: &Ex) -> Result<Ex, KernelError> {
        Ok(pairseq::mul_many([self.clone(), rhs.try_inverse()?]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities() {
        let x = Ex::symbol("x");
        assert!(x.pow(0).is_one());
        assert_eq!(x.pow(1), x);
        assert!(Ex::one().pow(&x).is_one());
    }

    #[test]
    fn numeric_powers_evaluate() {
        assert_eq!(Ex::two().pow(10), Ex::numeric(1024i64));
        assert_eq!(Ex::two().pow(-2), Ex::numeric(Numeric::ratio(1, 4)));
        // 2^(1/2) stays symbolic
        let r = Ex::two().pow(Ex::half());
        assert!(matches!(&*r, NodeKind::Pow { .. }));
    }

    #[test]
    fn zero_powers() {
        assert!(Ex::zero().try_pow(Ex::zero()).is_err());
        assert!(Ex::zero().try_pow(-1).is_err());
        assert!(Ex::zero().pow(3).is_zero());
    }

    #[test]
    fn nested_numeric_exponents_merge() {
        let x = Ex::symbol("x");
        let p = x.pow(Ex::half()).pow(2);
        assert_eq!(p, x);
        let q = x.pow(2).pow(3);
        assert_eq!(q, x.pow(6));
    }

    #[test]
    fn product_powers_distribute() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let p = mul_many([x.clone(), y.clone()]).pow(2);
        assert_eq!(p, mul_many([x.pow(2), y.pow(2)]));
    }
}
