//! The process-wide function registry.
//!
//! A function node carries only a serial into this table plus its argument
//! list. Each record holds the optional callbacks a function may provide:
//! a symbolic simplifier (run at construction), a numeric evaluator (run
//! when all arguments are floats, and by `evalf`), a partial-derivative
//! builder, and a series hook.
//!
//! The builtins are registered on first use; clients may add their own
//! functions before constructing applications of them.

use std::ops::RangeInclusive;
use std::sync::{LazyLock, RwLock};

use rustc_hash::FxHashMap;

use crate::algebra::Series;
use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;

/// Definition of a named function: its callbacks and arity.
#[derive(Clone)]
pub struct FunctionDef {
    /// Canonical name (e.g. "sin").
    pub name: String,
    /// Acceptable argument count.
    pub arity: RangeInclusive<usize>,
    /// Numeric evaluation on float arguments.
    pub eval_num: Option<fn(&[Numeric]) -> Option<Numeric>>,
    /// Symbolic simplification applied at construction
    /// (e.g. `sin(0) -> 0`); returning `None` keeps the application.
    pub eval_sym: Option<fn(&[Ex]) -> Option<Ex>>,
    /// Partial derivative with respect to the `i`-th argument.
    pub derivative: Option<fn(&[Ex], usize) -> Ex>,
    /// Series expansion hook; functions without one fall back to the
    /// generic Taylor expansion.
    pub series: Option<fn(&[Ex], &Ex, &Ex, i64) -> Result<Series, KernelError>>,
}

impl FunctionDef {
    #[inline]
    fn validate_arity(&self, args: usize) -> bool {
        self.arity.contains(&args)
    }
}

struct RegistryInner {
    defs: Vec<FunctionDef>,
    by_name: FxHashMap<String, usize>,
}

static REGISTRY: LazyLock<RwLock<RegistryInner>> = LazyLock::new(|| {
    let mut inner = RegistryInner {
        defs: Vec::with_capacity(16),
        by_name: FxHashMap::default(),
    };
    for def in super::builtin::definitions() {
        let serial = inner.defs.len();
        inner.by_name.insert(def.name.clone(), serial);
        inner.defs.push(def);
    }
    RwLock::new(inner)
});

/// Look up a definition by serial.
///
/// # Panics
/// Panics if the global registry lock is poisoned.
pub(crate) fn lookup(serial: usize) -> Option<FunctionDef> {
    let guard = REGISTRY.read().expect("function registry poisoned");
    guard.defs.get(serial).cloned()
}

/// Look up a serial by name.
///
/// # Panics
/// Panics if the global registry lock is poisoned.
pub(crate) fn serial_of(name: &str) -> Option<usize> {
    let guard = REGISTRY.read().expect("function registry poisoned");
    guard.by_name.get(name).copied()
}

/// The registered name of a serial.
///
/// # Panics
/// Panics if the global registry lock is poisoned.
pub(crate) fn name_of(serial: usize) -> Option<String> {
    lookup(serial).map(|d| d.name)
}

/// Register a client-defined function, returning its serial.
///
/// # Errors
/// `InvalidArgument` if the name is already registered.
///
/// # Panics
/// Panics if the global registry lock is poisoned.
pub fn register_function(def: FunctionDef) -> Result<usize, KernelError> {
    let mut guard = REGISTRY.write().expect("function registry poisoned");
    if guard.by_name.contains_key(&def.name) {
        return Err(KernelError::invalid_argument(format!(
            "function '{}' is already registered",
            def.name
        )));
    }
    let serial = guard.defs.len();
    guard.by_name.insert(def.name.clone(), serial);
    guard.defs.push(def);
    Ok(serial)
}

/// Build a function application by name.
///
/// # Errors
/// `InvalidArgument` for an unknown name or a wrong argument count.
pub fn fcall(name: &str, args: Vec<Ex>) -> Result<Ex, KernelError> {
    let serial = serial_of(name)
        .ok_or_else(|| KernelError::invalid_argument(format!("unknown function '{name}'")))?;
    fcall_serial(serial, args)
}

/// Build a function application by serial, running the construction-time
/// hooks (symbolic simplifier, float folding).
pub(crate) fn fcall_serial(serial: usize, args: Vec<Ex>) -> Result<Ex, KernelError> {
    let def = lookup(serial)
        .ok_or_else(|| KernelError::invalid_argument("unknown function serial"))?;
    if !def.validate_arity(args.len()) {
        return Err(KernelError::invalid_argument(format!(
            "function '{}' expects {}..={} argument(s), got {}",
            def.name,
            def.arity.start(),
            def.arity.end(),
            args.len()
        )));
    }
    if let Some(simplify) = def.eval_sym {
        if let Some(result) = simplify(&args) {
            return Ok(result);
        }
    }
    // Fold float arguments through the numeric evaluator; exact arguments
    // stay symbolic until `evalf`.
    if let Some(eval) = def.eval_num {
        let numerics: Option<Vec<Numeric>> =
            args.iter().map(|a| a.as_numeric().cloned()).collect();
        if let Some(ns) = numerics {
            if ns.iter().any(Numeric::is_float) {
                if let Some(value) = eval(&ns) {
                    return Ok(Ex::numeric(value));
                }
            }
        }
    }
    Ok(Ex::new(NodeKind::Func { serial, args }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_is_checked() {
        let x = Ex::symbol("x");
        assert!(fcall("sin", vec![x.clone()]).is_ok());
        assert!(matches!(
            fcall("sin", vec![x.clone(), x.clone()]),
            Err(KernelError::InvalidArgument { .. })
        ));
        assert!(fcall("no_such_function", vec![x]).is_err());
    }

    #[test]
    fn float_arguments_fold() {
        let e = fcall("sin", vec![Ex::numeric(0.5f64)]).unwrap();
        let v = e.as_numeric().expect("folded").to_f64();
        assert!((v - 0.5f64.sin()).abs() < 1e-15);
        // exact arguments stay symbolic
        let s = fcall("sin", vec![Ex::two()]).unwrap();
        assert!(s.as_numeric().is_none());
    }

    #[test]
    fn client_registration() {
        let serial = register_function(FunctionDef {
            name: "client_fn_registry_test".into(),
            arity: 1..=1,
            eval_num: None,
            eval_sym: None,
            derivative: None,
            series: None,
        })
        .unwrap();
        assert_eq!(serial_of("client_fn_registry_test"), Some(serial));
        assert!(
            register_function(FunctionDef {
                name: "client_fn_registry_test".into(),
                arity: 1..=1,
                eval_num: None,
                eval_sym: None,
                derivative: None,
                series: None,
            })
            .is_err()
        );
    }
}
