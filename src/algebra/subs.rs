//! Substitution: simultaneous, bottom-up, whole-node structural matching.
//!
//! A node equal to one of the `from` patterns is replaced before its
//! children are visited; otherwise the children are substituted and the node
//! rebuilt through the canonicalizing constructors, so the result is again
//! canonical.

use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::functions::registry;
use crate::matrix::Matrix;

use super::pairseq::{add_many, mul_many, ncmul_many, operands};
use super::power::try_power;

fn subs_rec(e: &Ex, from: &[Ex], to: &[Ex]) -> Result<Ex, KernelError> {
    for (f, t) in from.iter().zip(to.iter()) {
        if e == f {
            return Ok(t.clone());
        }
    }
    let subs_all_children = |items: &[Ex]| -> Result<Vec<Ex>, KernelError> {
        items.iter().map(|c| subs_rec(c, from, to)).collect()
    };
    match &**e {
        NodeKind::Num(_) | NodeKind::Sym(_) | NodeKind::Const(_) | NodeKind::Fail => Ok(e.clone()),
        NodeKind::Add(_) => Ok(add_many(subs_all_children(&operands(e))?)),
        NodeKind::Mul(_) => Ok(mul_many(subs_all_children(&operands(e))?)),
        NodeKind::NcMul(items) => Ok(ncmul_many(subs_all_children(items)?)),
        NodeKind::Pow { base, expo } => {
            try_power(subs_rec(base, from, to)?, subs_rec(expo, from, to)?)
        }
        NodeKind::Func { serial, args } => {
            registry::fcall_serial(*serial, subs_all_children(args)?)
        }
        NodeKind::List(items) => Ok(Ex::list(subs_all_children(items)?)),
        NodeKind::Tuple(items) => Ok(Ex::tuple(subs_all_children(items)?)),
        NodeKind::Matrix(m) => Ok(Ex::new(NodeKind::Matrix(Matrix::from_parts(
            m.rows(),
            m.cols(),
            subs_all_children(m.elems())?,
        )))),
        NodeKind::Rel { lhs, rhs, op } => Ok(Ex::relational(
            subs_rec(lhs, from, to)?,
            subs_rec(rhs, from, to)?,
            *op,
        )),
        NodeKind::Series(s) => {
            let terms = s
                .terms
                .iter()
                .map(|(c, d)| Ok((subs_rec(c, from, to)?, *d)))
                .collect::<Result<Vec<_>, KernelError>>()?;
            Ok(Ex::new(NodeKind::Series(super::Series {
                var: s.var.clone(),
                point: subs_rec(&s.point, from, to)?,
                terms,
                order: s.order,
            })))
        }
    }
}

impl Ex {
    /// Substitute every structural occurrence of `from` by `to`.
    ///
    /// # Errors
    /// `Arithmetic` if the substitution uncovers a division by exact zero
    /// during canonical reconstruction.
    pub fn subs(&self, from: &Ex, to: &Ex) -> Result<Ex, KernelError> {
        subs_rec(self, std::slice::from_ref(from), std::slice::from_ref(to))
    }

    /// Simultaneous substitution: all patterns are matched against the
    /// original tree, never against each other's replacements.
    ///
    /// # Errors
    /// `InvalidArgument` if the lists have different lengths; `Arithmetic`
    /// as for [`Ex::subs`].
    pub fn subs_all(&self, from: &[Ex], to: &[Ex]) -> Result<Ex, KernelError> {
        if from.len() != to.len() {
            return Err(KernelError::invalid_argument(format!(
                "substitution lists of mismatched lengths ({} vs {})",
                from.len(),
                to.len()
            )));
        }
        subs_rec(self, from, to)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::expr::Ex;

    #[test]
    fn leaf_substitution_recanonicalizes() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e = &x + &y;
        // x+y with y -> -x collapses to 0
        let r = e.subs(&y, &(-&x)).unwrap();
        assert!(r.is_zero());
    }

    #[test]
    fn simultaneous_is_not_sequential() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let e: Ex = &x + 2 * &y;
        // {x -> y, y -> x} swaps, it does not cascade
        let r = e
            .subs_all(&[x.clone(), y.clone()], &[y.clone(), x.clone()])
            .unwrap();
        assert_eq!(r, &y + 2 * &x);
    }

    #[test]
    fn mismatched_lists_error() {
        let x = Ex::symbol("x");
        assert!(x.subs_all(&[x.clone()], &[]).is_err());
    }

    #[test]
    fn division_by_zero_detected() {
        let x = Ex::symbol("x");
        let e = Ex::one().try_div(&x).unwrap();
        assert!(e.subs(&x, &Ex::zero()).is_err());
    }
}
