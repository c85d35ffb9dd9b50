//! Multivariate polynomial GCD.
//!
//! Content/primitive-part recursion on a chosen main variable with the
//! subresultant polynomial remainder sequence in the inner loop (Knuth,
//! TAOCP 4.6.1, Algorithm C); when one of the exact subresultant divisions
//! is unavailable the step falls back to the primitive PRS, which computes
//! the same GCD with different intermediate growth. Results are primitive
//! with a positive leading coefficient.

use crate::MAX_RECURSION_DEPTH;
use crate::algebra::{mul_many, try_power};
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;

use super::division::{divide, prem};
use super::{content, leading_sign, primpart, symbols_of};

// Positive-leading normalization of an expanded polynomial.
fn unitize(e: &Ex) -> Ex {
    if !e.is_zero() && leading_sign(e) < 0 {
        mul_many([Ex::minus_one(), e.clone()]).expand()
    } else {
        e.clone()
    }
}

// The rational content of all numeric coefficients.
fn integer_content(e: &Ex) -> Numeric {
    match &**e {
        NodeKind::Num(n) => n.abs(),
        NodeKind::Add(seq) => {
            let mut g = seq.overall.abs();
            for p in &seq.pairs {
                g = g.gcd(&p.coeff);
                if g.is_one() {
                    break;
                }
            }
            g
        }
        NodeKind::Mul(seq) => seq.overall.abs(),
        _ => Numeric::from(1i64),
    }
}

/// Polynomial greatest common divisor over the rationals.
///
/// # Errors
/// `Runtime` on recursion limit.
pub fn gcd(a: &Ex, b: &Ex) -> Result<Ex, KernelError> {
    let a = a.expand();
    let b = b.expand();
    gcd_rec(&a, &b, 0)
}

/// Polynomial least common multiple: `a*b / gcd(a,b)`.
///
/// # Errors
/// As for [`gcd`].
pub fn lcm(a: &Ex, b: &Ex) -> Result<Ex, KernelError> {
    let g = gcd(a, b)?;
    if g.is_zero() {
        return Ok(Ex::zero());
    }
    let prod = mul_many([a.clone(), b.clone()]).expand();
    match divide(&prod, &g)? {
        Some(l) => Ok(unitize(&l)),
        None => Err(KernelError::runtime("gcd does not divide the product")),
    }
}

fn gcd_rec(a: &Ex, b: &Ex, depth: usize) -> Result<Ex, KernelError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(KernelError::recursion_limit("gcd"));
    }
    if a.is_zero() {
        return Ok(unitize(b));
    }
    if b.is_zero() {
        return Ok(unitize(a));
    }
    if a == b {
        return Ok(unitize(a));
    }
    match (a.as_numeric(), b.as_numeric()) {
        (Some(na), Some(nb)) => return Ok(Ex::numeric(na.gcd(nb))),
        (Some(na), None) => return Ok(Ex::numeric(na.gcd(&integer_content(b)))),
        (None, Some(nb)) => return Ok(Ex::numeric(nb.gcd(&integer_content(a)))),
        (None, None) => {}
    }

    // Choose the main variable: the first symbol both sides carry.
    let serials_b: rustc_hash::FxHashSet<u64> = symbols_of(b)
        .iter()
        .filter_map(|s| s.as_symbol().map(crate::core::symbol::Symbol::serial))
        .collect();
    let x = symbols_of(a).into_iter().find(|s| {
        s.as_symbol()
            .is_some_and(|sym| serials_b.contains(&sym.serial()))
            && a.degree(s) > 0
            && b.degree(s) > 0
    });
    let Some(x) = x else {
        // Disjoint variable sets: only numeric content is shared.
        return Ok(Ex::numeric(integer_content(a).gcd(&integer_content(b))));
    };

    let ca = content(a, &x)?;
    let cb = content(b, &x)?;
    let pa = primpart(a, &x)?;
    let pb = primpart(b, &x)?;
    let g = sr_gcd(&pa, &pb, &x)?;
    let cg = gcd_rec(&ca, &cb, depth + 1)?;
    Ok(mul_many([cg, g]).expand())
}

// Subresultant PRS on primitive inputs; the result is the primitive,
// positively-led gcd in x (one when the inputs are coprime in x).
fn sr_gcd(a: &Ex, b: &Ex, x: &Ex) -> Result<Ex, KernelError> {
    let (mut a, mut b) = if a.degree(x) >= b.degree(x) {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    };
    if b.degree(x) == 0 {
        return Ok(Ex::one());
    }
    let mut g = Ex::one();
    let mut h = Ex::one();
    for _ in 0..MAX_RECURSION_DEPTH {
        let delta = a.degree(x) - b.degree(x);
        let r = prem(&a, &b, x)?;
        if r.is_zero() {
            return primpart(&b, x);
        }
        if r.degree(x) == 0 {
            return Ok(Ex::one());
        }
        a = b;
        let divisor = mul_many([
            g.clone(),
            try_power(h.clone(), Ex::numeric(Numeric::from(delta)))?,
        ])
        .expand();
        b = match divide(&r, &divisor)? {
            Some(q) => q,
            // Primitive-PRS fallback step.
            None => primpart(&r, x)?,
        };
        g = a.lcoeff(x);
        h = match delta {
            0 => h,
            1 => g.clone(),
            _ => {
                let num = try_power(g.clone(), Ex::numeric(Numeric::from(delta)))?.expand();
                let den = try_power(h, Ex::numeric(Numeric::from(delta - 1)))?.expand();
                divide(&num, &den)?.unwrap_or_else(|| g.clone())
            }
        };
    }
    Err(KernelError::recursion_limit("gcd remainder sequence"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_gcd() {
        let g = gcd(&Ex::numeric(12i64), &Ex::numeric(18i64)).unwrap();
        assert_eq!(g, Ex::numeric(6i64));
    }

    #[test]
    fn univariate_common_factor() {
        let x = Ex::symbol("x");
        // gcd(x^2-1, x^2+2x+1) = x+1
        let a = (x.pow(2) - 1i32).expand();
        let b = (x.pow(2) + 2i32 * &x + 1i32).expand();
        let g = gcd(&a, &b).unwrap();
        assert_eq!(g, (&x + 1i32).expand());
    }

    #[test]
    fn coprime_gives_one() {
        let x = Ex::symbol("x");
        let a = (x.pow(2) + 1i32).expand();
        let b = (&x + 3i32).expand();
        assert!(gcd(&a, &b).unwrap().is_one());
    }

    #[test]
    fn multivariate_factor() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let f = (&x + &y).expand();
        let a = ((&x + &y) * (&x - &y)).expand();
        let b = ((&x + &y) * (&x + 1i32)).expand();
        let g = gcd(&a, &b).unwrap();
        assert_eq!(g, f);
    }

    #[test]
    fn cofactors_are_coprime() {
        let x = Ex::symbol("x");
        let a = ((&x + 1i32).pow(2) * (&x + 2i32)).expand();
        let b = ((&x + 1i32) * (&x + 3i32)).expand();
        let g = gcd(&a, &b).unwrap();
        assert_eq!(g, (&x + 1i32).expand());
        let qa = divide(&a, &g).unwrap().expect("g divides a");
        let qb = divide(&b, &g).unwrap().expect("g divides b");
        assert!(gcd(&qa, &qb).unwrap().is_one());
    }

    #[test]
    fn gcd_divides_both() {
        let x = Ex::symbol("x");
        let a = ((x.pow(2) + 2i32 * &x + 1i32) * (&x - 5i32)).expand();
        let b = ((&x + 1i32) * (&x + 7i32)).expand();
        let g = gcd(&a, &b).unwrap();
        assert!(divide(&a, &g).unwrap().is_some());
        assert!(divide(&b, &g).unwrap().is_some());
    }

    #[test]
    fn lcm_product_relation() {
        let x = Ex::symbol("x");
        let a = ((&x + 1i32) * (&x + 2i32)).expand();
        let b = ((&x + 2i32) * (&x + 3i32)).expand();
        let l = lcm(&a, &b).unwrap();
        assert_eq!(l, ((&x + 1i32) * (&x + 2i32) * (&x + 3i32)).expand());
    }
}
