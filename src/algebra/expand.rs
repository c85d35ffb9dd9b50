//! Expansion: distribute products over sums and multinomial-expand powers
//! of sums with literal non-negative integer exponents.
//!
//! `expand` is idempotent; expanded nodes carry a status flag so a second
//! pass returns immediately. Expansion of negative or symbolic exponents is
//! a no-op except for their subexpressions.

use crate::core::expr::{Ex, NodeFlags, NodeKind};
use crate::functions::registry;
use crate::matrix::Matrix;

use super::pairseq::{add_many, mul_many, ncmul_many, operands, recombine_mul_pair};
use super::power::try_power;

// The additive operand list of an already-expanded expression.
fn terms_of(e: &Ex) -> Vec<Ex> {
    match &**e {
        NodeKind::Add(_) => operands(e),
        _ => vec![e.clone()],
    }
}

// Product of two expanded expressions, distributing over sums.
fn expand_mul2(a: &Ex, b: &Ex) -> Ex {
    let left = terms_of(a);
    let right = terms_of(b);
    if left.len() == 1 && right.len() == 1 {
        return mul_many([a.clone(), b.clone()]);
    }
    let mut products = Vec::with_capacity(left.len() * right.len());
    for la in &left {
        for rb in &right {
            products.push(mul_many([la.clone(), rb.clone()]));
        }
    }
    add_many(products)
}

// s^n for an expanded sum s and literal n >= 0, by iterated distribution.
fn expand_pow_sum(s: &Ex, n: u64) -> Ex {
    let mut acc = Ex::one();
    for _ in 0..n {
        acc = expand_mul2(&acc, s);
    }
    acc
}

impl Ex {
    /// Distribute all products over sums and expand powers of sums with
    /// literal non-negative integer exponents. Idempotent.
    pub fn expand(&self) -> Ex {
        if self.has_flag(NodeFlags::EXPANDED) {
            return self.clone();
        }
        let result = match &**self {
            NodeKind::Num(_)
            | NodeKind::Sym(_)
            | NodeKind::Const(_)
            | NodeKind::Fail
            | NodeKind::Series(_) => self.clone(),
            NodeKind::Add(_) => add_many(operands(self).iter().map(Ex::expand)),
            NodeKind::Mul(seq) => {
                let mut acc = Ex::numeric(seq.overall.clone());
                for p in &seq.pairs {
                    let factor = recombine_mul_pair(p).expand();
                    acc = expand_mul2(&acc, &factor);
                }
                acc
            }
            NodeKind::Pow { base, expo } => {
                let base_x = base.expand();
                let expo_x = expo.expand();
                let literal = expo_x.as_numeric().and_then(|n| {
                    if n.is_nonneg_integer() {
                        n.to_i64()
                    } else {
                        None
                    }
                });
                let sum_power = match (&*base_x, literal) {
                    (NodeKind::Add(_), Some(n)) => Some(n as u64),
                    _ => None,
                };
                match sum_power {
                    Some(n) => expand_pow_sum(&base_x, n),
                    None => {
                        // A division by zero first uncovered here surfaces at
                        // the next canonical construction instead.
                        try_power(base_x.clone(), expo_x.clone()).unwrap_or_else(|_| {
                            Ex::new(NodeKind::Pow {
                                base: base_x,
                                expo: expo_x,
                            })
                        })
                    }
                }
            }
            NodeKind::NcMul(items) => ncmul_many(items.iter().map(Ex::expand)),
            NodeKind::Func { serial, args } => {
                let args: Vec<Ex> = args.iter().map(Ex::expand).collect();
                registry::fcall_serial(*serial, args).unwrap_or_else(|_| self.clone())
            }
            NodeKind::List(items) => Ex::list(items.iter().map(Ex::expand).collect()),
            NodeKind::Tuple(items) => Ex::tuple(items.iter().map(Ex::expand).collect()),
            NodeKind::Matrix(m) => Ex::new(NodeKind::Matrix(Matrix::from_parts(
                m.rows(),
                m.cols(),
                m.elems().iter().map(Ex::expand).collect(),
            ))),
            NodeKind::Rel { lhs, rhs, op } => Ex::relational(lhs.expand(), rhs.expand(), *op),
        };
        result.set_flag(NodeFlags::EXPANDED);
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::core::expr::Ex;

    #[test]
    fn binomial_square() {
        let a = Ex::symbol("a");
        let b = Ex::symbol("b");
        let e = (&a + &b).pow(2).expand();
        let expected = a.pow(2) + 2 * &a * &b + b.pow(2);
        assert_eq!(e, expected);
    }

    #[test]
    fn product_distributes() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = ((&x + &y) * (&x - &y)).expand();
        assert_eq!(e, x.pow(2) - y.pow(2));
    }

    #[test]
    fn expand_is_idempotent() {
        let a = Ex::symbol("a");
        let b = Ex::symbol("b");
        let e = (&a + &b).pow(5).expand();
        assert_eq!(e.expand(), e);
    }

    #[test]
    fn symbolic_exponents_untouched() {
        let x = Ex::symbol("x");
        let n = Ex::symbol("n");
        let e: Ex = (&x + 1i32).pow(&n);
        assert_eq!(e.expand(), e);
    }

    #[test]
    fn binomial_order_independent() {
        let a = Ex::symbol("a");
        let b = Ex::symbol("b");
        let lhs = (&a + &b).pow(7).expand();
        let rhs = (&b + &a).pow(7).expand();
        assert!((lhs - rhs).is_zero());
    }
}
