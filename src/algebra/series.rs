//! Truncated power series.
//!
//! A series node stores the expansion variable, the expansion point, an
//! ascending list of `(coefficient, degree)` pairs with integer degrees
//! (Laurent terms allowed), and the truncation order: the series stands for
//! the listed terms plus `O((var-point)^order)`.
//!
//! Expansion is structural where the tree shape permits (termwise sums,
//! Cauchy products, integer powers with series inversion for negative
//! exponents) and falls back to whole-node Taylor expansion through repeated
//! differentiation everywhere else.

use std::collections::BTreeMap;

use crate::MAX_RECURSION_DEPTH;
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;
use crate::core::symbol::Symbol;
use crate::functions::registry;

use super::pairseq::{add_many, mul_many, operands};
use super::power::try_power;

/// A truncated power series around an expansion point.
#[derive(Debug, Clone)]
pub struct Series {
    /// The expansion variable (a symbol).
    pub var: Ex,
    /// The expansion point.
    pub point: Ex,
    /// Ascending `(coefficient, degree)` pairs; coefficients are non-zero
    /// and free of the expansion variable.
    pub terms: Vec<(Ex, i64)>,
    /// Truncation order: the error term is `O((var-point)^order)`.
    pub order: i64,
}

impl Series {
    fn zero(var: Ex, point: Ex, order: i64) -> Self {
        Series {
            var,
            point,
            terms: Vec::new(),
            order,
        }
    }

    fn constant(c: Ex, var: Ex, point: Ex, order: i64) -> Self {
        let terms = if c.is_zero() || order <= 0 {
            Vec::new()
        } else {
            vec![(c, 0)]
        };
        Series {
            var,
            point,
            terms,
            order,
        }
    }

    // Lowest known degree; for an all-unknown (zero) series this is the
    // truncation order itself.
    fn ldeg(&self) -> i64 {
        self.terms.first().map_or(self.order, |t| t.1)
    }

    fn from_buckets(
        var: Ex,
        point: Ex,
        buckets: BTreeMap<i64, Vec<Ex>>,
        order: i64,
    ) -> Series {
        let mut terms = Vec::with_capacity(buckets.len());
        for (deg, parts) in buckets {
            if deg >= order {
                continue;
            }
            let c = add_many(parts);
            if !c.is_zero() {
                terms.push((c, deg));
            }
        }
        Series {
            var,
            point,
            terms,
            order,
        }
    }

    fn add(&self, other: &Series) -> Series {
        let order = self.order.min(other.order);
        let mut buckets: BTreeMap<i64, Vec<Ex>> = BTreeMap::new();
        for (c, d) in self.terms.iter().chain(other.terms.iter()) {
            buckets.entry(*d).or_default().push(c.clone());
        }
        Series::from_buckets(self.var.clone(), self.point.clone(), buckets, order)
    }

    fn mul(&self, other: &Series) -> Series {
        let order = (self.order + other.ldeg()).min(other.order + self.ldeg());
        let mut buckets: BTreeMap<i64, Vec<Ex>> = BTreeMap::new();
        for (c1, d1) in &self.terms {
            for (c2, d2) in &other.terms {
                let d = d1 + d2;
                if d < order {
                    buckets
                        .entry(d)
                        .or_default()
                        .push(mul_many([c1.clone(), c2.clone()]));
                }
            }
        }
        Series::from_buckets(self.var.clone(), self.point.clone(), buckets, order)
    }

    // Inversion about the leading term; the relative precision carries over.
    fn invert(&self) -> Result<Series, KernelError> {
        let Some((lead, m)) = self.terms.first().cloned() else {
            return Err(KernelError::runtime(
                "series inversion of an identically vanishing series",
            ));
        };
        let rel_prec = self.order - m;
        let mut by_offset: BTreeMap<i64, Ex> = BTreeMap::new();
        for (c, d) in &self.terms {
            by_offset.insert(d - m, c.clone());
        }
        let mut inv: Vec<Ex> = Vec::with_capacity(rel_prec.max(0) as usize);
        inv.push(Ex::one().try_div(&lead)?);
        for n in 1..rel_prec {
            let mut parts = Vec::new();
            for k in 1..=n {
                if let Some(a_k) = by_offset.get(&k) {
                    parts.push(mul_many([a_k.clone(), inv[(n - k) as usize].clone()]));
                }
            }
            let s = add_many(parts);
            inv.push((-s).try_div(&lead)?);
        }
        let mut terms = Vec::new();
        for (n, c) in inv.into_iter().enumerate() {
            if !c.is_zero() {
                terms.push((c, -m + n as i64));
            }
        }
        Ok(Series {
            var: self.var.clone(),
            point: self.point.clone(),
            terms,
            order: self.order - 2 * m,
        })
    }

    fn pow_int(&self, k: i64) -> Result<Series, KernelError> {
        if k == 0 {
            return Ok(Series::constant(
                Ex::one(),
                self.var.clone(),
                self.point.clone(),
                self.order - self.ldeg(),
            ));
        }
        let base = if k < 0 { self.invert()? } else { self.clone() };
        let mut acc = base.clone();
        for _ in 1..k.abs() {
            acc = acc.mul(&base);
        }
        Ok(acc)
    }

    /// Convert the known terms back into an ordinary expression (the
    /// truncation term is dropped).
    ///
    /// # Errors
    /// `Arithmetic` if a Laurent term needs an inverse of a vanishing
    /// `var - point`.
    pub fn to_ex(&self) -> Result<Ex, KernelError> {
        let x = add_many([
            self.var.clone(),
            mul_many([Ex::minus_one(), self.point.clone()]),
        ]);
        let mut parts = Vec::with_capacity(self.terms.len());
        for (c, d) in &self.terms {
            parts.push(mul_many([
                c.clone(),
                try_power(x.clone(), Ex::numeric(Numeric::from(*d)))?,
            ]));
        }
        Ok(add_many(parts))
    }

    pub(crate) fn diff(&self, sym: &Symbol, depth: usize) -> Result<Series, KernelError> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(KernelError::recursion_limit("series diff"));
        }
        let same_var = self.var.as_symbol() == Some(sym);
        let mut terms = Vec::with_capacity(self.terms.len());
        if same_var {
            for (c, d) in &self.terms {
                if *d == 0 {
                    continue;
                }
                let c2 = mul_many([Ex::numeric(Numeric::from(*d)), c.clone()]);
                terms.push((c2, d - 1));
            }
            Ok(Series {
                var: self.var.clone(),
                point: self.point.clone(),
                terms,
                order: self.order - 1,
            })
        } else {
            for (c, d) in &self.terms {
                let dc = c.diff(&Ex::from_symbol(sym.clone()))?;
                if !dc.is_zero() {
                    terms.push((dc, *d));
                }
            }
            Ok(Series {
                var: self.var.clone(),
                point: self.point.clone(),
                terms,
                order: self.order,
            })
        }
    }
}

// =============================================================================
// THE EXPANSION ENGINE
// =============================================================================

// Whole-node Taylor fallback through repeated differentiation.
fn taylor(
    e: &Ex,
    var: &Ex,
    point: &Ex,
    order: i64,
) -> Result<Series, KernelError> {
    let mut terms = Vec::new();
    let mut d = e.clone();
    for k in 0..order.max(0) {
        let at_point = d.subs(var, point)?;
        let c = mul_many([
            at_point,
            Ex::numeric(Numeric::from(1i64)).try_div(&Ex::numeric(Numeric::factorial(k as u64)))?,
        ]);
        if !c.is_zero() {
            terms.push((c, k));
        }
        d = d.diff(var)?;
        if d.is_zero() {
            break;
        }
    }
    Ok(Series {
        var: var.clone(),
        point: point.clone(),
        terms,
        order,
    })
}

fn series_rec(
    e: &Ex,
    var: &Ex,
    point: &Ex,
    order: i64,
    depth: usize,
) -> Result<Series, KernelError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(KernelError::recursion_limit("series"));
    }
    if !e.has(var) {
        return Ok(Series::constant(
            e.clone(),
            var.clone(),
            point.clone(),
            order,
        ));
    }
    match &**e {
        NodeKind::Sym(_) => {
            // x = point + (x - point)
            let mut terms = Vec::new();
            if !point.is_zero() && order > 0 {
                terms.push((point.clone(), 0));
            }
            if order > 1 {
                terms.push((Ex::one(), 1));
            }
            Ok(Series {
                var: var.clone(),
                point: point.clone(),
                terms,
                order,
            })
        }
        NodeKind::Add(_) => {
            let mut acc = Series::zero(var.clone(), point.clone(), order);
            for opnd in operands(e) {
                acc = acc.add(&series_rec(&opnd, var, point, order, depth + 1)?);
            }
            Ok(acc)
        }
        NodeKind::Mul(_) => {
            let mut acc: Option<Series> = None;
            for opnd in operands(e) {
                let s = series_rec(&opnd, var, point, order, depth + 1)?;
                acc = Some(match acc {
                    None => s,
                    Some(a) => a.mul(&s),
                });
            }
            Ok(acc.unwrap_or_else(|| Series::zero(var.clone(), point.clone(), order)))
        }
        NodeKind::Pow { base, expo } => {
            let k = expo.as_numeric().and_then(Numeric::to_i64);
            match k {
                Some(k) => {
                    // Deepen the base expansion so negative powers do not
                    // lose relative precision through inversion.
                    let b = series_rec(base, var, point, order + k.abs(), depth + 1)?;
                    let mut s = b.pow_int(k)?;
                    s.order = s.order.min(order);
                    s.terms.retain(|(_, d)| *d < s.order);
                    Ok(s)
                }
                None => taylor(e, var, point, order),
            }
        }
        NodeKind::Func { serial, args } => {
            let def = registry::lookup(*serial)
                .ok_or_else(|| KernelError::runtime("function serial not registered"))?;
            match def.series {
                Some(hook) => hook(args, var, point, order),
                None => taylor(e, var, point, order),
            }
        }
        _ => taylor(e, var, point, order),
    }
}

impl Ex {
    /// Power-series expansion of `self` in the symbol `s` around `point`,
    /// with truncation order `order`. The result is a series node; use
    /// [`Series::to_ex`] on it to obtain the truncated polynomial.
    ///
    /// # Errors
    /// `InvalidArgument` if `s` is not a symbol; `Runtime` on the recursion
    /// limit or a non-expandable pole; `Arithmetic` if evaluation at the
    /// expansion point divides by zero.
    pub fn series(&self, s: &Ex, point: impl Into<Ex>, order: i64) -> Result<Ex, KernelError> {
        if s.as_symbol().is_none() {
            return Err(KernelError::invalid_argument(
                "series variable must be a symbol",
            ));
        }
        let point = point.into();
        let ser = series_rec(self, s, &point, order, 0)?;
        Ok(Ex::new(NodeKind::Series(ser)))
    }
}
