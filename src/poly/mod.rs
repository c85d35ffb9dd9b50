//! Polynomial layer: structure queries, content/primitive part, GCD, exact
//! division, square-free decomposition and rational canonicalization.
//!
//! The queries in this module (`degree`, `coeff`, `collect`, ...) read
//! expanded polynomial structure; on non-polynomial subexpressions they
//! treat anything free of the variable as a constant and anything else as
//! opaque, which is what the normalization layer's generator substitution
//! relies on.

pub(crate) mod division;
pub(crate) mod gcd;
pub(crate) mod normal;

pub use division::{divide, prem, quo, rem, sqrfree};
pub use gcd::{gcd, lcm};

use rustc_hash::FxHashMap;

use crate::algebra::pairseq::recombine_mul_pair;
use crate::algebra::{add_many, mul_many, power};
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;

impl Ex {
    /// Highest power of `x` (an expanded polynomial view).
    pub fn degree(&self, x: &Ex) -> i64 {
        if self == x {
            return 1;
        }
        match &**self {
            NodeKind::Add(seq) => {
                let mut deg = if seq.overall.is_zero() { i64::MIN } else { 0 };
                for p in &seq.pairs {
                    deg = deg.max(p.rest.degree(x));
                }
                if deg == i64::MIN { 0 } else { deg }
            }
            NodeKind::Mul(seq) => seq
                .pairs
                .iter()
                .map(|p| {
                    if !p.rest.has(x) {
                        0
                    } else {
                        p.coeff.to_i64().unwrap_or(0) * p.rest.degree(x)
                    }
                })
                .sum(),
            NodeKind::Pow { base, expo } => {
                if !self.has(x) {
                    return 0;
                }
                match expo.as_numeric().and_then(Numeric::to_i64) {
                    Some(k) => k * base.degree(x),
                    None => 0,
                }
            }
            _ => 0,
        }
    }

    /// Lowest power of `x`.
    pub fn ldegree(&self, x: &Ex) -> i64 {
        if self == x {
            return 1;
        }
        match &**self {
            NodeKind::Add(seq) => {
                let mut deg = if seq.overall.is_zero() { i64::MAX } else { 0 };
                for p in &seq.pairs {
                    deg = deg.min(p.rest.ldegree(x));
                }
                if deg == i64::MAX { 0 } else { deg }
            }
            NodeKind::Mul(seq) => seq
                .pairs
                .iter()
                .map(|p| {
                    if !p.rest.has(x) {
                        0
                    } else {
                        p.coeff.to_i64().unwrap_or(0) * p.rest.ldegree(x)
                    }
                })
                .sum(),
            NodeKind::Pow { base, expo } => {
                if !self.has(x) {
                    return 0;
                }
                match expo.as_numeric().and_then(Numeric::to_i64) {
                    Some(k) => k * base.ldegree(x),
                    None => 0,
                }
            }
            _ => 0,
        }
    }

    /// Coefficient of `x^n`.
    pub fn coeff(&self, x: &Ex, n: i64) -> Ex {
        if self == x {
            return if n == 1 { Ex::one() } else { Ex::zero() };
        }
        match &**self {
            NodeKind::Add(seq) => {
                let mut parts = Vec::new();
                for p in &seq.pairs {
                    let c = p.rest.coeff(x, n);
                    if !c.is_zero() {
                        parts.push(mul_many([Ex::numeric(p.coeff.clone()), c]));
                    }
                }
                if n == 0 && !seq.overall.is_zero() {
                    parts.push(Ex::numeric(seq.overall.clone()));
                }
                add_many(parts)
            }
            NodeKind::Mul(seq) => {
                // In an expanded canonical product the variable sits in
                // exactly one pair; everything else is the cofactor.
                let mut x_part: Option<Ex> = None;
                let mut free = vec![Ex::numeric(seq.overall.clone())];
                for p in &seq.pairs {
                    let f = recombine_mul_pair(p);
                    if f.has(x) {
                        if x_part.is_some() {
                            // Unexpanded in x; no single power carries it.
                            return Ex::zero();
                        }
                        x_part = Some(f);
                    } else {
                        free.push(f);
                    }
                }
                match x_part {
                    Some(f) => {
                        let c = f.coeff(x, n);
                        if c.is_zero() {
                            Ex::zero()
                        } else {
                            free.push(c);
                            mul_many(free)
                        }
                    }
                    None => {
                        if n == 0 {
                            self.clone()
                        } else {
                            Ex::zero()
                        }
                    }
                }
            }
            NodeKind::Pow { base, expo } => {
                if base == x {
                    let k = expo.as_numeric().and_then(Numeric::to_i64);
                    return if k == Some(n) { Ex::one() } else { Ex::zero() };
                }
                if !self.has(x) {
                    return if n == 0 { self.clone() } else { Ex::zero() };
                }
                Ex::zero()
            }
            _ => {
                if n == 0 {
                    self.clone()
                } else {
                    Ex::zero()
                }
            }
        }
    }

    /// Leading coefficient in `x`.
    pub fn lcoeff(&self, x: &Ex) -> Ex {
        self.coeff(x, self.degree(x))
    }

    /// Trailing coefficient in `x`.
    pub fn tcoeff(&self, x: &Ex) -> Ex {
        self.coeff(x, self.ldegree(x))
    }

    /// Regroup a (rational) polynomial by powers of `x`.
    pub fn collect(&self, x: &Ex) -> Ex {
        let lo = self.ldegree(x);
        let hi = self.degree(x);
        if lo > hi {
            return self.clone();
        }
        let mut parts = Vec::with_capacity((hi - lo + 1) as usize);
        for n in lo..=hi {
            let c = self.coeff(x, n);
            if !c.is_zero() {
                parts.push(mul_many([c, power(x.clone(), Ex::numeric(Numeric::from(n)))]));
            }
        }
        add_many(parts)
    }
}

// =============================================================================
// SYMBOLS, UNITS, CONTENT
// =============================================================================

/// The distinct symbols of an expression, in serial order.
pub(crate) fn symbols_of(e: &Ex) -> Vec<Ex> {
    let mut found: FxHashMap<u64, Ex> = FxHashMap::default();
    collect_symbols(e, &mut found);
    let mut list: Vec<(u64, Ex)> = found.into_iter().collect();
    list.sort_by_key(|(serial, _)| *serial);
    list.into_iter().map(|(_, e)| e).collect()
}

fn collect_symbols(e: &Ex, found: &mut FxHashMap<u64, Ex>) {
    if let NodeKind::Sym(s) = &**e {
        found
            .entry(s.serial())
            .or_insert_with(|| e.clone());
        return;
    }
    e.for_each_child(|c| collect_symbols(c, found));
}

// Deterministic sign of the canonical leading coefficient; +1 or -1 and
// consistent between e and -e, which is all unit normalization needs.
pub(crate) fn leading_sign(e: &Ex) -> i32 {
    match &**e {
        NodeKind::Num(n) => {
            if n.is_negative() {
                -1
            } else {
                1
            }
        }
        NodeKind::Add(seq) => match seq.pairs.first() {
            Some(p) => {
                if p.coeff.is_negative() {
                    -1
                } else {
                    1
                }
            }
            None => {
                if seq.overall.is_negative() {
                    -1
                } else {
                    1
                }
            }
        },
        NodeKind::Mul(seq) => {
            if seq.overall.is_negative() {
                -1
            } else {
                1
            }
        }
        NodeKind::Pow { base, .. } => leading_sign(base),
        _ => 1,
    }
}

/// The unit (`1` or `-1`) making `e / unit(e)` positively led.
///
/// # Errors
/// `Domain` if `e` is identically zero.
pub(crate) fn unit(e: &Ex) -> Result<Ex, KernelError> {
    if e.is_zero() {
        return Err(KernelError::domain("unit of a zero polynomial"));
    }
    Ok(if leading_sign(e) < 0 {
        Ex::minus_one()
    } else {
        Ex::one()
    })
}

/// Content of `e` as a polynomial in `x`: the GCD of its coefficients,
/// positively normalized.
///
/// # Errors
/// Propagates GCD failures (recursion limit).
pub fn content(e: &Ex, x: &Ex) -> Result<Ex, KernelError> {
    let e = e.expand();
    if e.is_zero() {
        return Ok(Ex::zero());
    }
    if let Some(n) = e.as_numeric() {
        return Ok(Ex::numeric(n.abs()));
    }
    let lo = e.ldegree(x);
    let hi = e.degree(x);
    let mut g = Ex::zero();
    for n in lo..=hi {
        let c = e.coeff(x, n);
        if !c.is_zero() {
            g = gcd(&g, &c)?;
        }
        if g.is_one() {
            break;
        }
    }
    Ok(g)
}

/// Primitive part of `e` in `x`: `e` divided by its unit and content.
///
/// # Errors
/// `Domain` if `e` is identically zero; propagates GCD failures.
pub fn primpart(e: &Ex, x: &Ex) -> Result<Ex, KernelError> {
    let e = e.expand();
    if e.is_zero() {
        return Err(KernelError::domain("primitive part of a zero polynomial"));
    }
    let u = unit(&e)?;
    let c = content(&e, x)?;
    let divisor = mul_many([u, c]).expand();
    match divide(&e, &divisor)? {
        Some(p) => Ok(p),
        None => Err(KernelError::domain(
            "content does not divide its polynomial (non-polynomial input)",
        )),
    }
}
