//! Rational canonicalization: `normal` and `numer_denom`.
//!
//! The tree is walked into a `(numerator, denominator)` pair of expanded
//! polynomials. Non-polynomial subexpressions (function applications,
//! symbolic or transcendental powers, series) are replaced by fresh opaque
//! generator symbols for the duration of the walk and substituted back on
//! return, which reduces any expression to a rational function over a
//! finite symbol set. The fraction is reduced through the polynomial GCD
//! and the denominator is unit-normalized, so equivalent rational
//! expressions come back as the same pair up to a unit.

use crate::MAX_RECURSION_DEPTH;
use crate::algebra::pairseq::operands;
use crate::algebra::{mul_many, try_power};
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;
use crate::core::symbol::Symbol;
use crate::functions::registry;
use crate::matrix::Matrix;

use super::division::divide;
use super::gcd::gcd;
use super::leading_sign;

// Opaque-generator bookkeeping; per call, the symbols die with the map.
#[derive(Default)]
struct GenMap {
    gens: Vec<(Ex, Ex)>,
}

impl GenMap {
    fn generator_for(&mut self, original: Ex) -> Ex {
        for (sym, orig) in &self.gens {
            if *orig == original {
                return sym.clone();
            }
        }
        let sym = Ex::from_symbol(Symbol::new(format!("~gen{}", self.gens.len())));
        self.gens.push((sym.clone(), original));
        sym
    }

    // Substitute the originals back, last-created first so nested
    // generators resolve completely.
    fn restore(&self, e: &Ex) -> Result<Ex, KernelError> {
        let mut out = e.clone();
        for (sym, orig) in self.gens.iter().rev() {
            out = out.subs(sym, orig)?;
        }
        Ok(out)
    }
}

fn frac_cancel(num: Ex, den: Ex) -> Result<(Ex, Ex), KernelError> {
    if den.is_zero() {
        return Err(KernelError::arithmetic("division by zero during normalization"));
    }
    if num.is_zero() {
        return Ok((Ex::zero(), Ex::one()));
    }
    let mut num = num;
    let mut den = den;
    let g = gcd(&num, &den)?;
    if !g.is_one() {
        num = divide(&num, &g)?
            .ok_or_else(|| KernelError::runtime("gcd does not divide the numerator"))?;
        den = divide(&den, &g)?
            .ok_or_else(|| KernelError::runtime("gcd does not divide the denominator"))?;
    }
    // Unit-normal denominator: leading coefficient positive.
    if leading_sign(&den) < 0 {
        num = mul_many([Ex::minus_one(), num]).expand();
        den = mul_many([Ex::minus_one(), den]).expand();
    }
    Ok((num, den))
}

fn normal_rec(e: &Ex, map: &mut GenMap, depth: usize) -> Result<(Ex, Ex), KernelError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(KernelError::recursion_limit("normal"));
    }
    match &**e {
        NodeKind::Num(n) => match n {
            Numeric::Rat(r) => Ok((
                Ex::numeric(Numeric::Int(r.numer().clone())),
                Ex::numeric(Numeric::Int(r.denom().clone())),
            )),
            Numeric::Cplx { .. } => {
                let den = n.real().denom().lcm(&n.imag().denom());
                let num = n * &den;
                Ok((Ex::numeric(num), Ex::numeric(den)))
            }
            _ => Ok((e.clone(), Ex::one())),
        },
        NodeKind::Sym(_) | NodeKind::Const(_) | NodeKind::Fail => Ok((e.clone(), Ex::one())),
        NodeKind::Add(_) => {
            let mut num = Ex::zero();
            let mut den = Ex::one();
            for opnd in operands(e) {
                let (n2, d2) = normal_rec(&opnd, map, depth + 1)?;
                num = (&mul_many([num, d2.clone()]) + &mul_many([n2, den.clone()])).expand();
                den = mul_many([den, d2]).expand();
            }
            frac_cancel(num, den)
        }
        NodeKind::Mul(_) => {
            let mut nums = Vec::new();
            let mut dens = Vec::new();
            for opnd in operands(e) {
                let (n2, d2) = normal_rec(&opnd, map, depth + 1)?;
                nums.push(n2);
                dens.push(d2);
            }
            frac_cancel(mul_many(nums).expand(), mul_many(dens).expand())
        }
        NodeKind::Pow { base, expo } => {
            if let Some(k) = expo.as_numeric().and_then(Numeric::to_i64) {
                let (nb, db) = normal_rec(base, map, depth + 1)?;
                let kk = Ex::numeric(Numeric::from(k.abs()));
                if k >= 0 {
                    return frac_cancel(
                        try_power(nb, kk.clone())?.expand(),
                        try_power(db, kk)?.expand(),
                    );
                }
                if nb.is_zero() {
                    return Err(KernelError::arithmetic(
                        "division by zero during normalization",
                    ));
                }
                return frac_cancel(
                    try_power(db, kk.clone())?.expand(),
                    try_power(nb, kk)?.expand(),
                );
            }
            // Transcendental or symbolic power: opaque generator.
            Ok((map.generator_for(e.clone()), Ex::one()))
        }
        NodeKind::Func { serial, args } => {
            // Normalize the arguments, then hide the application.
            let mut normalized = Vec::with_capacity(args.len());
            for a in args {
                let (n, d) = normal_rec(a, map, depth + 1)?;
                let restored_n = map.restore(&n)?;
                let restored_d = map.restore(&d)?;
                normalized.push(restored_n.try_div(&restored_d)?);
            }
            let rebuilt = registry::fcall_serial(*serial, normalized)?;
            Ok((map.generator_for(rebuilt), Ex::one()))
        }
        NodeKind::NcMul(_) | NodeKind::Series(_) => {
            Ok((map.generator_for(e.clone()), Ex::one()))
        }
        NodeKind::List(items) => {
            let items = items.iter().map(Ex::normal).collect::<Result<Vec<_>, _>>()?;
            Ok((Ex::list(items), Ex::one()))
        }
        NodeKind::Tuple(items) => {
            let items = items.iter().map(Ex::normal).collect::<Result<Vec<_>, _>>()?;
            Ok((Ex::tuple(items), Ex::one()))
        }
        NodeKind::Matrix(m) => {
            let elems = m
                .elems()
                .iter()
                .map(Ex::normal)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((
                Ex::new(NodeKind::Matrix(Matrix::from_parts(m.rows(), m.cols(), elems))),
                Ex::one(),
            ))
        }
        NodeKind::Rel { lhs, rhs, op } => Ok((
            Ex::relational(lhs.normal()?, rhs.normal()?, *op),
            Ex::one(),
        )),
    }
}

impl Ex {
    /// Canonical rational form: numerator and denominator expanded, reduced
    /// to lowest terms, denominator unit-normal, multiplied back into a
    /// single expression.
    ///
    /// # Errors
    /// `Arithmetic` on an identically vanishing denominator; `Runtime` on
    /// the recursion limit.
    pub fn normal(&self) -> Result<Ex, KernelError> {
        let (num, den) = self.numer_denom()?;
        if den.is_one() {
            return Ok(num);
        }
        Ok(mul_many([num, try_power(den, Ex::minus_one())?]))
    }

    /// The canonical `(numerator, denominator)` pair of [`Ex::normal`].
    ///
    /// # Errors
    /// As for [`Ex::normal`].
    pub fn numer_denom(&self) -> Result<(Ex, Ex), KernelError> {
        let mut map = GenMap::default();
        let (num, den) = normal_rec(self, &mut map, 0)?;
        Ok((map.restore(&num)?, map.restore(&den)?))
    }
}
