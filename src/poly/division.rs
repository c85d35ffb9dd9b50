//! Polynomial division: Euclidean quotient/remainder over the expression
//! field, fraction-free pseudo-remainder, exact multivariate division, and
//! Yun's square-free decomposition.

use crate::MAX_RECURSION_DEPTH;
use crate::algebra::{add_many, mul_many, power, try_power};
use crate::core::error::KernelError;
use crate::core::expr::Ex;
use crate::core::numeric::Numeric;

use super::{content, gcd::gcd, symbols_of, unit};

fn x_to_the(x: &Ex, n: i64) -> Ex {
    power(x.clone(), Ex::numeric(Numeric::from(n)))
}

/// Euclidean quotient of `a` by `b` in the variable `x`, coefficients in the
/// expression field.
///
/// # Errors
/// `Domain` if `b` vanishes identically.
pub fn quo(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex, KernelError> {
    Ok(quo_rem(a, b, x)?.0)
}

/// Euclidean remainder of `a` by `b` in the variable `x`.
///
/// # Errors
/// `Domain` if `b` vanishes identically.
pub fn rem(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex, KernelError> {
    Ok(quo_rem(a, b, x)?.1)
}

fn quo_rem(a: &Ex, b: &Ex, x: &Ex) -> Result<(Ex, Ex), KernelError> {
    let b = b.expand();
    if b.is_zero() {
        return Err(KernelError::domain("polynomial division by zero"));
    }
    let mut r = a.expand();
    let db = b.degree(x);
    let lb = b.lcoeff(x);
    let mut q_parts = Vec::new();
    while !r.is_zero() {
        let dr = r.degree(x);
        if dr < db {
            break;
        }
        let c = r.lcoeff(x).try_div(&lb)?.normal()?;
        let term = mul_many([c, x_to_the(x, dr - db)]);
        q_parts.push(term.clone());
        r = (&r - &mul_many([term, b.clone()])).expand();
        // Field division is exact in the leading term, so the degree must
        // strictly drop.
        if !r.is_zero() && r.degree(x) >= dr {
            return Err(KernelError::domain(
                "non-polynomial arguments in polynomial division",
            ));
        }
    }
    Ok((add_many(q_parts), r))
}

/// Pseudo-remainder: the remainder of `lc(b)^(deg a - deg b + 1) * a` by `b`
/// in the variable `x`, computed without coefficient division.
///
/// # Errors
/// `Domain` if `b` vanishes identically.
pub fn prem(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex, KernelError> {
    let b = b.expand();
    if b.is_zero() {
        return Err(KernelError::domain("pseudo-remainder by zero"));
    }
    let mut r = a.expand();
    let da = r.degree(x);
    let db = b.degree(x);
    if da < db {
        return Ok(r);
    }
    let lb = b.lcoeff(x);
    let n = da - db + 1;
    let mut steps = 0i64;
    while !r.is_zero() && r.degree(x) >= db {
        let dr = r.degree(x);
        let t = mul_many([r.lcoeff(x), x_to_the(x, dr - db), b.clone()]);
        r = (&mul_many([lb.clone(), r.clone()]) - &t).expand();
        steps += 1;
        if !r.is_zero() && r.degree(x) >= dr {
            return Err(KernelError::domain(
                "non-polynomial arguments in pseudo-remainder",
            ));
        }
    }
    // Bring the result up to the standard lc(b)^(da-db+1) scaling.
    if steps < n {
        r = mul_many([try_power(lb, Ex::numeric(Numeric::from(n - steps)))?, r]).expand();
    }
    Ok(r)
}

/// Exact multivariate division: `Some(q)` with `a == q*b` exactly, or `None`
/// when `b` does not divide `a`.
///
/// # Errors
/// `Arithmetic` if `b` is identically zero.
pub fn divide(a: &Ex, b: &Ex) -> Result<Option<Ex>, KernelError> {
    let b = b.expand();
    if b.is_zero() {
        return Err(KernelError::arithmetic("exact division by zero polynomial"));
    }
    let a = a.expand();
    divide_rec(&a, &b, 0)
}

fn divide_rec(a: &Ex, b: &Ex, depth: usize) -> Result<Option<Ex>, KernelError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(KernelError::recursion_limit("divide"));
    }
    if a.is_zero() {
        return Ok(Some(Ex::zero()));
    }
    if let Some(n) = b.as_numeric() {
        if n.is_zero() {
            return Err(KernelError::arithmetic("exact division by zero polynomial"));
        }
        let inv = Ex::numeric(n.checked_inv()?);
        return Ok(Some(mul_many([a.clone(), inv]).expand()));
    }
    if a == b {
        return Ok(Some(Ex::one()));
    }
    // Divide along a variable the divisor actually carries.
    let Some(x) = symbols_of(b).into_iter().find(|s| b.degree(s) > 0) else {
        return Ok(None);
    };
    let db = b.degree(&x);
    let lb = b.lcoeff(&x);
    let mut r = a.clone();
    let mut q_parts = Vec::new();
    while !r.is_zero() {
        let dr = r.degree(&x);
        if dr < db {
            return Ok(None);
        }
        let Some(c) = divide_rec(&r.lcoeff(&x), &lb, depth + 1)? else {
            return Ok(None);
        };
        let term = mul_many([c, x_to_the(&x, dr - db)]);
        q_parts.push(term.clone());
        r = (&r - &mul_many([term, b.clone()]).expand()).expand();
        if !r.is_zero() && r.degree(&x) >= dr {
            return Ok(None);
        }
    }
    Ok(Some(add_many(q_parts)))
}

/// Square-free decomposition of a polynomial in `x` (Yun's algorithm): the
/// result is a product of powers of pairwise coprime square-free factors,
/// equal to `e` after expansion.
///
/// # Errors
/// `Domain` for non-polynomial input or a zero polynomial; propagates GCD
/// failures.
pub fn sqrfree(e: &Ex, x: &Ex) -> Result<Ex, KernelError> {
    let a = e.expand();
    if a.is_zero() {
        return Err(KernelError::domain("square-free decomposition of zero"));
    }
    if !a.has(x) {
        return Ok(a);
    }
    // Split off the numeric-ish content so the factors come out primitive.
    let u = unit(&a)?;
    let c = content(&a, x)?;
    let scale = mul_many([u, c]).expand();
    let Some(p) = divide(&a, &scale)? else {
        return Err(KernelError::domain(
            "square-free decomposition of a non-polynomial",
        ));
    };

    let dp = p.diff(x)?;
    let g = gcd(&p, &dp)?;
    if g.is_one() {
        // Already square-free.
        return Ok(mul_many([scale, p]));
    }

    let Some(mut c_i) = divide(&p, &g)? else {
        return Err(KernelError::runtime("square-free decomposition failed"));
    };
    let Some(dq) = divide(&dp, &g)? else {
        return Err(KernelError::runtime("square-free decomposition failed"));
    };
    let mut d_i = (&dq - &c_i.diff(x)?).expand();

    let mut factors: Vec<Ex> = Vec::new();
    let mut i: i64 = 1;
    while !c_i.is_one() {
        if i > MAX_RECURSION_DEPTH as i64 {
            return Err(KernelError::recursion_limit("sqrfree"));
        }
        let a_i = gcd(&c_i, &d_i)?;
        if !a_i.is_one() {
            factors.push(try_power(a_i.clone(), Ex::numeric(Numeric::from(i)))?);
        }
        let Some(next_c) = divide(&c_i, &a_i)? else {
            return Err(KernelError::runtime("square-free decomposition failed"));
        };
        let Some(d_over) = divide(&d_i, &a_i)? else {
            return Err(KernelError::runtime("square-free decomposition failed"));
        };
        c_i = next_c;
        d_i = (&d_over - &c_i.diff(x)?).expand();
        i += 1;
    }
    factors.push(scale);
    Ok(mul_many(factors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotient_and_remainder() {
        let x = Ex::symbol("x");
        let a = (x.pow(3) - 1i32).expand();
        let b = (&x - 1i32).expand();
        let q = quo(&a, &b, &x).unwrap();
        let r = rem(&a, &b, &x).unwrap();
        assert_eq!(q, (x.pow(2) + &x + 1i32).expand());
        assert!(r.is_zero());
        assert!(quo(&a, &Ex::zero(), &x).is_err());
    }

    #[test]
    fn remainder_matches_euclid() {
        let x = Ex::symbol("x");
        let a = (x.pow(2) + 1i32).expand();
        let b = (2i32 * &x + 1i32).expand();
        let q = quo(&a, &b, &x).unwrap();
        let r = rem(&a, &b, &x).unwrap();
        assert_eq!((&(&q * &b) + &r).expand(), a);
    }

    #[test]
    fn pseudo_remainder_scaling() {
        let x = Ex::symbol("x");
        let a = (x.pow(2) + 1i32).expand();
        let b = (2i32 * &x + 1i32).expand();
        // prem = lc(b)^2 * a mod b = 4*(x^2+1) mod (2x+1) = 5
        assert_eq!(prem(&a, &b, &x).unwrap(), Ex::numeric(5i64));
    }

    #[test]
    fn exact_division() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let p = ((&x + &y) * (&x - &y)).expand();
        let q = divide(&p, &(&x + &y).expand()).unwrap();
        assert_eq!(q, Some((&x - &y).expand()));
        assert_eq!(divide(&p, &(&x + 1i32).expand()).unwrap(), None);
    }

    #[test]
    fn sqrfree_preserves_factored_form() {
        let x = Ex::symbol("x");
        let e = (1i32 + &x) * (2i32 + &x).pow(2) * (3i32 + &x).pow(3);
        let s = sqrfree(&e.expand(), &x).unwrap();
        assert_eq!(s, e);
    }

    #[test]
    fn sqrfree_of_square_free_input() {
        let x = Ex::symbol("x");
        let e = (x.pow(2) + 1i32).expand();
        assert_eq!(sqrfree(&e, &x).unwrap().expand(), e);
    }
}
