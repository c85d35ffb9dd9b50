//! Symbolic differentiation.
//!
//! Sums differentiate termwise; products through the product rule as a sum
//! of one-factor-differentiated products; powers through the general rule
//! `d(b^e) = b^e * (e' * log(b) + e * b' / b)` with the numeric-exponent
//! fast path; function applications through the registry's derivative hooks
//! with the chain rule. A function without a registered derivative yields
//! the placeholder application `Derivative(f(..), v)` so the expression
//! stays well-formed.

use crate::MAX_RECURSION_DEPTH;
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;
use crate::core::symbol::Symbol;
use crate::functions::{builtin, registry};
use crate::matrix::Matrix;

use super::pairseq::{add_many, mul_many, ncmul_many, recombine_mul_pair};
use super::power::try_power;

fn diff_rec(e: &Ex, sym: &Symbol, depth: usize) -> Result<Ex, KernelError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(KernelError::recursion_limit("diff"));
    }
    match &**e {
        NodeKind::Num(_) | NodeKind::Const(_) => Ok(Ex::zero()),
        NodeKind::Sym(s) => Ok(if s == sym { Ex::one() } else { Ex::zero() }),
        NodeKind::Add(seq) => {
            let mut terms = Vec::with_capacity(seq.pairs.len());
            for p in &seq.pairs {
                terms.push(mul_many([
                    Ex::numeric(p.coeff.clone()),
                    diff_rec(&p.rest, sym, depth + 1)?,
                ]));
            }
            Ok(add_many(terms))
        }
        NodeKind::Mul(seq) => {
            // Product rule: one summand per pair, with that pair's factor
            // differentiated and every other factor kept as-is.
            let mut summands = Vec::with_capacity(seq.pairs.len());
            for (i, p) in seq.pairs.iter().enumerate() {
                let mut factors = Vec::with_capacity(seq.pairs.len() + 3);
                factors.push(Ex::numeric(seq.overall.clone()));
                for (j, q) in seq.pairs.iter().enumerate() {
                    if i != j {
                        factors.push(recombine_mul_pair(q));
                    }
                }
                // d(rest^c) = c * rest^(c-1) * rest'
                factors.push(Ex::numeric(p.coeff.clone()));
                factors.push(try_power(
                    p.rest.clone(),
                    Ex::numeric(&p.coeff - &Numeric::from(1i64)),
                )?);
                factors.push(diff_rec(&p.rest, sym, depth + 1)?);
                summands.push(mul_many(factors));
            }
            Ok(add_many(summands))
        }
        NodeKind::Pow { base, expo } => {
            if let NodeKind::Num(n) = &**expo {
                // d(b^n) = n * b^(n-1) * b'
                return Ok(mul_many([
                    Ex::numeric(n.clone()),
                    try_power(base.clone(), Ex::numeric(n - &Numeric::from(1i64)))?,
                    diff_rec(base, sym, depth + 1)?,
                ]));
            }
            // General rule: b^e * (e' * log(b) + e * b' / b)
            let de = diff_rec(expo, sym, depth + 1)?;
            let db = diff_rec(base, sym, depth + 1)?;
            let log_term = mul_many([de, builtin::log(base.clone())]);
            let base_term = mul_many([
                expo.clone(),
                db,
                try_power(base.clone(), Ex::minus_one())?,
            ]);
            Ok(mul_many([e.clone(), add_many([log_term, base_term])]))
        }
        NodeKind::Func { serial, args } => {
            let def = registry::lookup(*serial)
                .ok_or_else(|| KernelError::runtime("function serial not registered"))?;
            let Some(derivative) = def.derivative else {
                // No registered derivative: return the symbolic placeholder
                // Derivative(f(..), v) instead of failing.
                return builtin::derivative_placeholder(e.clone(), Ex::from_symbol(sym.clone()));
            };
            let mut terms = Vec::with_capacity(args.len());
            for (i, arg) in args.iter().enumerate() {
                let darg = diff_rec(arg, sym, depth + 1)?;
                if darg.is_zero() {
                    continue;
                }
                terms.push(mul_many([derivative(args, i), darg]));
            }
            Ok(add_many(terms))
        }
        NodeKind::NcMul(items) => {
            let mut summands = Vec::with_capacity(items.len());
            for i in 0..items.len() {
                let mut factors = items.clone();
                factors[i] = diff_rec(&items[i], sym, depth + 1)?;
                summands.push(ncmul_many(factors));
            }
            Ok(add_many(summands))
        }
        NodeKind::List(items) => {
            let items = items
                .iter()
                .map(|c| diff_rec(c, sym, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Ex::list(items))
        }
        NodeKind::Tuple(items) => {
            let items = items
                .iter()
                .map(|c| diff_rec(c, sym, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Ex::tuple(items))
        }
        NodeKind::Matrix(m) => {
            let elems = m
                .elems()
                .iter()
                .map(|c| diff_rec(c, sym, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Ex::new(NodeKind::Matrix(Matrix::from_parts(
                m.rows(),
                m.cols(),
                elems,
            ))))
        }
        NodeKind::Rel { lhs, rhs, op } => Ok(Ex::relational(
            diff_rec(lhs, sym, depth + 1)?,
            diff_rec(rhs, sym, depth + 1)?,
            *op,
        )),
        NodeKind::Series(s) => Ok(Ex::new(NodeKind::Series(s.diff(sym, depth)?))),
        NodeKind::Fail => Ok(Ex::fail()),
    }
}

impl Ex {
    /// Derivative with respect to the symbol `s`.
    ///
    /// # Errors
    /// `InvalidArgument` if `s` is not a symbol; `Runtime` on recursion
    /// limit.
    pub fn diff(&self, s: &Ex) -> Result<Ex, KernelError> {
        self.diff_n(s, 1)
    }

    /// `n`-th derivative with respect to the symbol `s`.
    ///
    /// # Errors
    /// As for [`Ex::diff`].
    pub fn diff_n(&self, s: &Ex, n: u32) -> Result<Ex, KernelError> {
        let Some(sym) = s.as_symbol() else {
            return Err(KernelError::invalid_argument(
                "differentiation variable must be a symbol",
            ));
        };
        let mut out = self.clone();
        for _ in 0..n {
            out = diff_rec(&out, sym, 0)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::expr::Ex;

    #[test]
    fn polynomial_rule() {
        let x = Ex::symbol("x");
        let e: Ex = x.pow(3) + 2 * x.pow(2) + 5;
        assert_eq!(e.diff(&x).unwrap(), 3 * x.pow(2) + 4 * &x);
    }

    #[test]
    fn product_rule() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = &x * &y;
        assert_eq!(e.diff(&x).unwrap(), y);
        let sq = &x * &x;
        assert_eq!(sq.diff(&x).unwrap(), 2 * &x);
    }

    #[test]
    fn chain_rule_through_functions() {
        let x = Ex::symbol("x");
        let e = x.pow(2).sin();
        // d sin(x^2) = 2*x*cos(x^2)
        assert_eq!(e.diff(&x).unwrap(), 2 * &x * x.pow(2).cos());
    }

    #[test]
    fn general_power_rule() {
        let x = Ex::symbol("x");
        // d(2^x) = 2^x * log(2)
        let e = Ex::two().pow(&x);
        let d = e.diff(&x).unwrap();
        assert_eq!(d, &e * Ex::two().log());
    }

    #[test]
    fn non_symbol_variable_rejected() {
        let x = Ex::symbol("x");
        assert!(x.diff(&Ex::one()).is_err());
    }
}
