//! The associative sequence behind sums and products.
//!
//! A single pair representation carries both variants. For a sum the pair
//! `(rest, coeff)` means `coeff * rest`; for a product it means
//! `rest ^ coeff`. The overall coefficient is the additive identity for sums
//! and the multiplicative identity for products.
//!
//! Canonical form invariants (established here, once, at construction):
//! - pairs are sorted by the canonical order on their `rest` components,
//! - no pair has a zero coefficient,
//! - no `rest` is itself of the same kind (nested sums/products are
//!   flattened),
//! - no two pairs share a `rest` (like terms are combined),
//! - every numeric operand is folded into the overall coefficient.

use crate::core::expr::{Ex, NodeKind, cmp_ex};
use crate::core::numeric::Numeric;

/// One `(rest, coeff)` pair of a sum or product.
#[derive(Debug, Clone)]
pub struct Pair {
    /// The non-numeric part.
    pub rest: Ex,
    /// Numeric multiplier (sums) or exponent (products).
    pub coeff: Numeric,
}

/// A flat pair sequence plus its overall numeric coefficient.
#[derive(Debug, Clone)]
pub struct PairSeq {
    /// Canonically ordered pairs.
    pub pairs: Vec<Pair>,
    /// Folded numeric part.
    pub overall: Numeric,
}

// =============================================================================
// PAIR RECOMBINATION
// =============================================================================

/// Turn a sum pair back into the expression it stands for (`coeff * rest`).
///
/// Builds the product node directly instead of going through `mul_many`, so
/// recombination cannot recurse back into canonicalization; the rest is
/// split exactly the way `mul_many` would split it (a numeric-exponent
/// power becomes a `(base, exponent)` pair, a product splices its pairs) so
/// the result is in canonical form.
pub(crate) fn recombine_add_pair(p: &Pair) -> Ex {
    if p.coeff.is_one() {
        return p.rest.clone();
    }
    // The rest of an add pair is never numeric and never a sum.
    let pairs = match &*p.rest {
        NodeKind::Pow { base, expo } => match &**expo {
            NodeKind::Num(k) => vec![Pair {
                rest: base.clone(),
                coeff: k.clone(),
            }],
            _ => vec![Pair {
                rest: p.rest.clone(),
                coeff: Numeric::from(1i64),
            }],
        },
        NodeKind::Mul(seq) => seq.pairs.clone(),
        _ => vec![Pair {
            rest: p.rest.clone(),
            coeff: Numeric::from(1i64),
        }],
    };
    Ex::new(NodeKind::Mul(PairSeq {
        pairs,
        overall: p.coeff.clone(),
    }))
}

/// Turn a product pair back into the expression it stands for
/// (`rest ^ coeff`).
pub(crate) fn recombine_mul_pair(p: &Pair) -> Ex {
    if p.coeff.is_one() {
        return p.rest.clone();
    }
    Ex::new(NodeKind::Pow {
        base: p.rest.clone(),
        expo: Ex::numeric(p.coeff.clone()),
    })
}

/// The operand list of a sum or product node, recombined (used by the
/// rewrites that rebuild through the canonicalizing constructors).
pub(crate) fn operands(e: &Ex) -> Vec<Ex> {
    match &**e {
        NodeKind::Add(seq) => {
            let mut ops: Vec<Ex> = seq.pairs.iter().map(recombine_add_pair).collect();
            if !seq.overall.is_zero() {
                ops.push(Ex::numeric(seq.overall.clone()));
            }
            ops
        }
        NodeKind::Mul(seq) => {
            let mut ops: Vec<Ex> = seq.pairs.iter().map(recombine_mul_pair).collect();
            if !seq.overall.is_one() {
                ops.push(Ex::numeric(seq.overall.clone()));
            }
            ops
        }
        _ => vec![e.clone()],
    }
}

// =============================================================================
// SUM CONSTRUCTION
// =============================================================================

// Split an operand of a sum into (rest, coeff) with rest * coeff == operand.
fn split_add(e: Ex) -> Pair {
    if let NodeKind::Mul(seq) = &*e {
        if !seq.overall.is_one() {
            let coeff = seq.overall.clone();
            let rest = if seq.pairs.len() == 1 {
                recombine_mul_pair(&seq.pairs[0])
            } else {
                Ex::new(NodeKind::Mul(PairSeq {
                    pairs: seq.pairs.clone(),
                    overall: Numeric::from(1i64),
                }))
            };
            return Pair { rest, coeff };
        }
    }
    Pair {
        rest: e,
        coeff: Numeric::from(1i64),
    }
}

/// The canonicalizing sum constructor.
///
/// Flattens nested sums, folds numerics into the overall coefficient, sorts
/// the pairs, combines like terms, drops zero coefficients and collapses
/// trivial results (`1*x + 0` comes back as `x`).
pub fn add_many(operands: impl IntoIterator<Item = Ex>) -> Ex {
    let mut overall = Numeric::from(0i64);
    let mut pairs: Vec<Pair> = Vec::new();

    for op in operands {
        match &*op {
            NodeKind::Num(n) => overall = &overall + n,
            NodeKind::Add(seq) => {
                overall = &overall + &seq.overall;
                pairs.extend(seq.pairs.iter().cloned());
            }
            _ => pairs.push(split_add(op.clone())),
        }
    }

    finish_add(pairs, overall)
}

/// Rebuild a sum from a raw pair sequence (archive and internal use); the
/// full pipeline still runs so untrusted input comes back canonical.
pub(crate) fn add_from_pairs(pairs: Vec<Pair>, overall: Numeric) -> Ex {
    let mut ops: Vec<Ex> = pairs.iter().map(recombine_add_pair).collect();
    ops.push(Ex::numeric(overall));
    add_many(ops)
}

fn finish_add(mut pairs: Vec<Pair>, mut overall: Numeric) -> Ex {
    pairs.sort_by(|a, b| cmp_ex(&a.rest, &b.rest));

    // Combine adjacent like terms, dropping coefficients that cancel to zero
    // and absorbing rests equal to one.
    let mut merged: Vec<Pair> = Vec::with_capacity(pairs.len());
    for p in pairs {
        if p.coeff.is_zero() {
            continue;
        }
        if p.rest.is_one() {
            overall = &overall + &p.coeff;
            continue;
        }
        if let Some(last) = merged.last_mut() {
            if cmp_ex(&last.rest, &p.rest) == std::cmp::Ordering::Equal {
                last.coeff = &last.coeff + &p.coeff;
                if last.coeff.is_zero() {
                    merged.pop();
                }
                continue;
            }
        }
        merged.push(p);
    }

    if merged.is_empty() {
        return Ex::numeric(overall);
    }
    if merged.len() == 1 && overall.is_zero() {
        return recombine_add_pair(&merged[0]);
    }
    Ex::new(NodeKind::Add(PairSeq {
        pairs: merged,
        overall,
    }))
}

// =============================================================================
// PRODUCT CONSTRUCTION
// =============================================================================

/// The canonicalizing product constructor.
///
/// Flattens nested products, folds numerics into the overall coefficient
/// (an exact zero annihilates), splits numeric-exponent powers into pairs,
/// sorts, adds exponents of equal bases, and collapses trivial results
/// (`x^1 * 1` comes back as `x`).
pub fn mul_many(operands: impl IntoIterator<Item = Ex>) -> Ex {
    let mut overall = Numeric::from(1i64);
    let mut pairs: Vec<Pair> = Vec::new();

    for op in operands {
        match &*op {
            NodeKind::Num(n) => overall = &overall * n,
            NodeKind::Mul(seq) => {
                overall = &overall * &seq.overall;
                pairs.extend(seq.pairs.iter().cloned());
            }
            NodeKind::Pow { base, expo } => match &**expo {
                NodeKind::Num(k) => pairs.push(Pair {
                    rest: base.clone(),
                    coeff: k.clone(),
                }),
                _ => pairs.push(Pair {
                    rest: op.clone(),
                    coeff: Numeric::from(1i64),
                }),
            },
            _ => pairs.push(Pair {
                rest: op.clone(),
                coeff: Numeric::from(1i64),
            }),
        }
    }

    if overall.is_zero() {
        return Ex::numeric(overall);
    }
    finish_mul(pairs, overall)
}

/// Rebuild a product from a raw pair sequence (archive and internal use).
pub(crate) fn mul_from_pairs(pairs: Vec<Pair>, overall: Numeric) -> Ex {
    let mut ops: Vec<Ex> = pairs.iter().map(recombine_mul_pair).collect();
    ops.push(Ex::numeric(overall));
    mul_many(ops)
}

fn finish_mul(mut pairs: Vec<Pair>, mut overall: Numeric) -> Ex {
    pairs.sort_by(|a, b| cmp_ex(&a.rest, &b.rest));

    let mut merged: Vec<Pair> = Vec::with_capacity(pairs.len());
    for p in pairs {
        if p.coeff.is_zero() || p.rest.is_one() {
            continue;
        }
        if let Some(last) = merged.last_mut() {
            if cmp_ex(&last.rest, &p.rest) == std::cmp::Ordering::Equal {
                last.coeff = &last.coeff + &p.coeff;
                if last.coeff.is_zero() {
                    merged.pop();
                }
                continue;
            }
        }
        merged.push(p);
    }

    // A pair whose base and combined exponent are both numeric evaluates
    // exactly into the overall coefficient (2^1 * 2^1 folds to 4).
    let mut kept: Vec<Pair> = Vec::with_capacity(merged.len());
    for p in merged {
        if let NodeKind::Num(base) = &*p.rest {
            if !base.is_zero() {
                if let Ok(Some(value)) = base.checked_pow(&p.coeff) {
                    overall = &overall * &value;
                    continue;
                }
            }
        }
        kept.push(p);
    }

    if overall.is_zero() {
        return Ex::numeric(overall);
    }
    if kept.is_empty() {
        return Ex::numeric(overall);
    }
    if kept.len() == 1 && overall.is_one() {
        return recombine_mul_pair(&kept[0]);
    }
    // A numeric coefficient distributes over a lone sum factor, so a sum
    // never hides behind a product wrapper (2*(a+b) -> 2*a+2*b).
    if kept.len() == 1 && kept[0].coeff.is_one() {
        if let NodeKind::Add(inner) = &*kept[0].rest {
            let scaled = inner
                .pairs
                .iter()
                .map(|p| Pair {
                    rest: p.rest.clone(),
                    coeff: &p.coeff * &overall,
                })
                .collect();
            let scaled_overall = &inner.overall * &overall;
            return finish_add(scaled, scaled_overall);
        }
    }
    Ex::new(NodeKind::Mul(PairSeq {
        pairs: kept,
        overall,
    }))
}

// =============================================================================
// NON-COMMUTATIVE PRODUCT
// =============================================================================

/// Non-commutative product constructor: flattens nested non-commutative
/// products and folds numeric factors out front, but never reorders the
/// remaining factors.
pub fn ncmul_many(operands: impl IntoIterator<Item = Ex>) -> Ex {
    let mut coeff = Numeric::from(1i64);
    let mut factors: Vec<Ex> = Vec::new();

    for op in operands {
        match &*op {
            NodeKind::Num(n) => coeff = &coeff * n,
            NodeKind::NcMul(items) => factors.extend(items.iter().cloned()),
            _ => factors.push(op.clone()),
        }
    }

    if coeff.is_zero() {
        return Ex::numeric(coeff);
    }
    let core = match factors.len() {
        0 => return Ex::numeric(coeff),
        1 => factors.pop().unwrap_or_else(Ex::one),
        _ => Ex::new(NodeKind::NcMul(factors)),
    };
    if coeff.is_one() {
        core
    } else {
        mul_many([Ex::numeric(coeff), core])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_flatten() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let z = Ex::symbol("z");
        let inner = add_many([x.clone(), y.clone()]);
        let outer = add_many([inner, z.clone()]);
        match &*outer {
            NodeKind::Add(seq) => assert_eq!(seq.pairs.len(), 3),
            _ => panic!("expected a sum"),
        }
    }

    #[test]
    fn like_terms_combine() {
        let x = Ex::symbol("x");
        let two_x = mul_many([Ex::two(), x.clone()]);
        let three_x = mul_many([Ex::three(), x.clone()]);
        let sum = add_many([two_x, three_x]);
        // 2x + 3x = 5x
        match &*sum {
            NodeKind::Mul(seq) => {
                assert_eq!(seq.overall, Numeric::from(5i64));
                assert_eq!(seq.pairs.len(), 1);
            }
            other => panic!("expected 5*x, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_collapses() {
        let x = Ex::symbol("x");
        let neg_x = mul_many([Ex::minus_one(), x.clone()]);
        assert!(add_many([x.clone(), neg_x]).is_zero());
        assert_eq!(add_many([x.clone(), Ex::zero()]), x);
    }

    #[test]
    fn products_fold_numerics() {
        let x = Ex::symbol("x");
        assert!(mul_many([x.clone(), Ex::zero()]).is_zero());
        assert_eq!(mul_many([x.clone(), Ex::one()]), x);
        let p = mul_many([Ex::two(), x.clone(), Ex::three()]);
        match &*p {
            NodeKind::Mul(seq) => assert_eq!(seq.overall, Numeric::from(6i64)),
            _ => panic!("expected a product"),
        }
    }

    #[test]
    fn exponents_of_equal_bases_add() {
        let x = Ex::symbol("x");
        let p = mul_many([x.clone(), x.clone()]);
        match &*p {
            NodeKind::Pow { base, expo } => {
                assert_eq!(*base, x);
                assert_eq!(*expo, Ex::two());
            }
            other => panic!("expected x^2, got {other:?}"),
        }
        // x * x^-1 = 1
        let inv = Ex::new(NodeKind::Pow {
            base: x.clone(),
            expo: Ex::minus_one(),
        });
        assert!(mul_many([x, inv]).is_one());
    }

    #[test]
    fn ncmul_keeps_order() {
        let a = Ex::symbol("a");
        let b = Ex::symbol("b");
        let ab = ncmul_many([a.clone(), b.clone()]);
        let ba = ncmul_many([b, a]);
        assert_ne!(ab, ba);
    }
}
