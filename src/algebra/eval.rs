//! Evaluation: `eval` (depth-bounded re-evaluation) and `evalf` (numeric
//! substitution to floats).
//!
//! Every node built by the canonicalizing constructors already carries the
//! evaluated flag, so `eval(1)` is a no-op on kernel-built trees; deeper
//! levels splice re-evaluated children back through the constructors.

use crate::MAX_RECURSION_DEPTH;
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeFlags, NodeKind};
use crate::functions::registry;
use crate::matrix::Matrix;

use super::pairseq::{add_many, mul_many, ncmul_many, operands};
use super::power::try_power;

impl Ex {
    /// Re-evaluate to the given depth. Level 1 on an already-evaluated node
    /// is a no-op; level 0 means "all levels". The level decrements on each
    /// recursion step and the walk aborts once it has descended
    /// [`MAX_RECURSION_DEPTH`] levels.
    ///
    /// # Errors
    /// `Runtime` when the recursion limit is exceeded.
    pub fn eval(&self, level: i32) -> Result<Ex, KernelError> {
        if level == 1 && self.has_flag(NodeFlags::EVALUATED) {
            return Ok(self.clone());
        }
        if level <= -(MAX_RECURSION_DEPTH as i32) {
            return Err(KernelError::recursion_limit("eval"));
        }
        let next = level - 1;
        let eval_children = |items: &[Ex]| -> Result<Vec<Ex>, KernelError> {
            items.iter().map(|e| e.eval(next)).collect()
        };
        match &**self {
            NodeKind::Num(_)
            | NodeKind::Sym(_)
            | NodeKind::Const(_)
            | NodeKind::Fail => Ok(self.clone()),
            NodeKind::Add(_) => {
                let ops = operands(self)
                    .iter()
                    .map(|e| e.eval(next))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(add_many(ops))
            }
            NodeKind::Mul(_) => {
                let ops = operands(self)
                    .iter()
                    .map(|e| e.eval(next))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(mul_many(ops))
            }
            NodeKind::NcMul(items) => Ok(ncmul_many(eval_children(items)?)),
            NodeKind::Pow { base, expo } => try_power(base.eval(next)?, expo.eval(next)?),
            NodeKind::Func { serial, args } => registry::fcall_serial(*serial, eval_children(args)?),
            NodeKind::List(items) => Ok(Ex::list(eval_children(items)?)),
            NodeKind::Tuple(items) => Ok(Ex::tuple(eval_children(items)?)),
            NodeKind::Matrix(m) => Ok(Ex::new(NodeKind::Matrix(Matrix::from_parts(
                m.rows(),
                m.cols(),
                eval_children(m.elems())?,
            )))),
            NodeKind::Rel { lhs, rhs, op } => Ok(Ex::relational(
                lhs.eval(next)?,
                rhs.eval(next)?,
                *op,
            )),
            NodeKind::Series(_) => Ok(self.clone()),
        }
    }

    /// Numeric evaluation: exact numerics become floats, constants evaluate
    /// through their registered bodies, function applications with fully
    /// numeric arguments fold through the registry's numeric hooks.
    ///
    /// # Errors
    /// `Arithmetic` if the numeric substitution uncovers a division by an
    /// exact zero.
    pub fn evalf(&self) -> Result<Ex, KernelError> {
        match &**self {
            NodeKind::Num(n) => Ok(Ex::numeric(n.to_float())),
            NodeKind::Const(c) => Ok(Ex::numeric(c.evalf())),
            NodeKind::Sym(_) | NodeKind::Fail => Ok(self.clone()),
            NodeKind::Add(_) => {
                let ops = operands(self)
                    .iter()
                    .map(Ex::evalf)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(add_many(ops))
            }
            NodeKind::Mul(_) => {
                let ops = operands(self)
                    .iter()
                    .map(Ex::evalf)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(mul_many(ops))
            }
            NodeKind::NcMul(items) => {
                let items = items.iter().map(Ex::evalf).collect::<Result<Vec<_>, _>>()?;
                Ok(ncmul_many(items))
            }
            NodeKind::Pow { base, expo } => try_power(base.evalf()?, expo.evalf()?),
            NodeKind::Func { serial, args } => {
                let args = args.iter().map(Ex::evalf).collect::<Result<Vec<_>, _>>()?;
                registry::fcall_serial(*serial, args)
            }
            NodeKind::List(items) => {
                let items = items.iter().map(Ex::evalf).collect::<Result<Vec<_>, _>>()?;
                Ok(Ex::list(items))
            }
            NodeKind::Tuple(items) => {
                let items = items.iter().map(Ex::evalf).collect::<Result<Vec<_>, _>>()?;
                Ok(Ex::tuple(items))
            }
            NodeKind::Matrix(m) => {
                let elems = m
                    .elems()
                    .iter()
                    .map(Ex::evalf)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Ex::new(NodeKind::Matrix(Matrix::from_parts(
                    m.rows(),
                    m.cols(),
                    elems,
                ))))
            }
            NodeKind::Rel { lhs, rhs, op } => {
                Ok(Ex::relational(lhs.evalf()?, rhs.evalf()?, *op))
            }
            NodeKind::Series(s) => {
                // Evaluate the truncated polynomial part.
                s.to_ex()?.evalf()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::expr::Ex;
    use crate::core::numeric::Numeric;

    #[test]
    fn eval_level_one_is_noop() {
        let x = Ex::symbol("x");
        let e: Ex = (&x + 1) * 2;
        let same = e.eval(1).unwrap();
        assert_eq!(same, e);
    }

    #[test]
    fn evalf_folds_exact_to_float() {
        let e = Ex::half() + Ex::numeric(Numeric::ratio(1, 4));
        let f = e.evalf().unwrap();
        assert_eq!(f, Ex::numeric(0.75));
    }

    #[test]
    fn evalf_evaluates_constants() {
        let e = Ex::pi().evalf().unwrap();
        let v = e.as_numeric().unwrap().to_f64();
        assert!((v - std::f64::consts::PI).abs() < 1e-15);
    }
}
