//! Builtin transcendental functions.
//!
//! Each definition bundles the construction-time symbolic simplifications
//! (`sin(0) -> 0`, `exp(log(x)) -> x`, ...), the float evaluator, and the
//! partial derivative used by the chain rule.

use crate::core::error::KernelError;
use crate::core::expr::{Ex, NodeKind};
use crate::core::numeric::Numeric;

use super::registry::{self, FunctionDef};

// =============================================================================
// CONSTRUCTION HELPERS
// =============================================================================

fn apply(name: &str, arg: Ex) -> Ex {
    match registry::fcall(name, vec![arg]) {
        Ok(e) => e,
        // Builtins are registered before any application can be built.
        Err(err) => panic!("builtin function '{name}': {err}"),
    }
}

/// The placeholder `Derivative(f, v)` returned when a function has no
/// registered derivative.
pub(crate) fn derivative_placeholder(f: Ex, v: Ex) -> Result<Ex, KernelError> {
    registry::fcall("Derivative", vec![f, v])
}

/// `log(e)` as a kernel application (used by the general power rule).
pub(crate) fn log(e: Ex) -> Ex {
    apply("log", e)
}

impl Ex {
    /// Sine.
    pub fn sin(&self) -> Ex {
        apply("sin", self.clone())
    }

    /// Cosine.
    pub fn cos(&self) -> Ex {
        apply("cos", self.clone())
    }

    /// Tangent.
    pub fn tan(&self) -> Ex {
        apply("tan", self.clone())
    }

    /// Inverse sine.
    pub fn asin(&self) -> Ex {
        apply("asin", self.clone())
    }

    /// Inverse cosine.
    pub fn acos(&self) -> Ex {
        apply("acos", self.clone())
    }

    /// Inverse tangent.
    pub fn atan(&self) -> Ex {
        apply("atan", self.clone())
    }

    /// Hyperbolic sine.
    pub fn sinh(&self) -> Ex {
        apply("sinh", self.clone())
    }

    /// Hyperbolic cosine.
    pub fn cosh(&self) -> Ex {
        apply("cosh", self.clone())
    }

    /// Hyperbolic tangent.
    pub fn tanh(&self) -> Ex {
        apply("tanh", self.clone())
    }

    /// Exponential.
    pub fn exp(&self) -> Ex {
        apply("exp", self.clone())
    }

    /// Natural logarithm.
    pub fn log(&self) -> Ex {
        apply("log", self.clone())
    }

    /// Absolute value.
    pub fn abs(&self) -> Ex {
        apply("abs", self.clone())
    }
}

// =============================================================================
// HOOKS
// =============================================================================

fn num1(args: &[Numeric], f: impl Fn(f64) -> f64) -> Option<Numeric> {
    let a = args.first()?;
    if !a.is_real() {
        return None;
    }
    Some(Numeric::Float(f(a.to_f64())))
}

fn is_application_of(e: &Ex, name: &str) -> Option<Ex> {
    if let NodeKind::Func { serial, args } = &**e {
        if registry::name_of(*serial).as_deref() == Some(name) && args.len() == 1 {
            return Some(args[0].clone());
        }
    }
    None
}

// The negated argument for canonically negative input (a negative numeric
// or a product with a negative overall coefficient), driving the odd/even
// symmetry rules.
fn negated_argument(e: &Ex) -> Option<Ex> {
    let negative = match &**e {
        NodeKind::Num(n) => n.is_negative(),
        NodeKind::Mul(seq) => seq.overall.is_negative(),
        _ => false,
    };
    if negative { Some(-e) } else { None }
}

fn odd_symmetry(name: &str, a: &Ex) -> Option<Ex> {
    let flipped = negated_argument(a)?;
    Some(-apply(name, flipped))
}

fn sym_sin(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() || *a == Ex::pi() {
        return Some(Ex::zero());
    }
    odd_symmetry("sin", a)
}

fn sym_cos(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::one());
    }
    if *a == Ex::pi() {
        return Some(Ex::minus_one());
    }
    // cos is even
    negated_argument(a).map(|p| apply("cos", p))
}

fn sym_tan(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::zero());
    }
    odd_symmetry("tan", a)
}

fn sym_asin(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::zero());
    }
    odd_symmetry("asin", a)
}

fn sym_atan(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::zero());
    }
    odd_symmetry("atan", a)
}

fn sym_sinh(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::zero());
    }
    odd_symmetry("sinh", a)
}

fn sym_tanh(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::zero());
    }
    odd_symmetry("tanh", a)
}

fn sym_exp(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::one());
    }
    is_application_of(a, "log")
}

fn sym_log(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_one() {
        return Some(Ex::zero());
    }
    is_application_of(a, "exp")
}

fn sym_acos(args: &[Ex]) -> Option<Ex> {
    if args.first()?.is_one() {
        return Some(Ex::zero());
    }
    None
}

fn sym_cosh(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if a.is_zero() {
        return Some(Ex::one());
    }
    // cosh is even
    negated_argument(a).map(|p| apply("cosh", p))
}

fn sym_abs(args: &[Ex]) -> Option<Ex> {
    let a = args.first()?;
    if let Some(n) = a.as_numeric() {
        if n.is_real() {
            return Some(Ex::numeric(n.abs()));
        }
        return None;
    }
    negated_argument(a).map(|p| apply("abs", p))
}

fn d_sin(args: &[Ex], _i: usize) -> Ex {
    args[0].cos()
}

fn d_cos(args: &[Ex], _i: usize) -> Ex {
    -args[0].sin()
}

fn d_tan(args: &[Ex], _i: usize) -> Ex {
    1 + args[0].tan().pow(2)
}

fn d_asin(args: &[Ex], _i: usize) -> Ex {
    (1i32 - args[0].pow(2)).pow(Ex::minus_half())
}

fn d_acos(args: &[Ex], _i: usize) -> Ex {
    -(1i32 - args[0].pow(2)).pow(Ex::minus_half())
}

fn d_atan(args: &[Ex], _i: usize) -> Ex {
    (1i32 + args[0].pow(2)).pow(-1i32)
}

fn d_sinh(args: &[Ex], _i: usize) -> Ex {
    args[0].cosh()
}

fn d_cosh(args: &[Ex], _i: usize) -> Ex {
    args[0].sinh()
}

fn d_tanh(args: &[Ex], _i: usize) -> Ex {
    1 - args[0].tanh().pow(2)
}

fn d_exp(args: &[Ex], _i: usize) -> Ex {
    args[0].exp()
}

fn d_log(args: &[Ex], _i: usize) -> Ex {
    args[0].pow(-1)
}

// =============================================================================
// DEFINITIONS TABLE
// =============================================================================

fn def(
    name: &str,
    eval_num: fn(&[Numeric]) -> Option<Numeric>,
    eval_sym: fn(&[Ex]) -> Option<Ex>,
    derivative: Option<fn(&[Ex], usize) -> Ex>,
) -> FunctionDef {
    FunctionDef {
        name: name.to_string(),
        arity: 1..=1,
        eval_num: Some(eval_num),
        eval_sym: Some(eval_sym),
        derivative,
        series: None,
    }
}

pub(crate) fn definitions() -> Vec<FunctionDef> {
    vec![
        def("sin", |a| num1(a, f64::sin), sym_sin, Some(d_sin)),
        def("cos", |a| num1(a, f64::cos), sym_cos, Some(d_cos)),
        def("tan", |a| num1(a, f64::tan), sym_tan, Some(d_tan)),
        def("asin", |a| num1(a, f64::asin), sym_asin, Some(d_asin)),
        def("acos", |a| num1(a, f64::acos), sym_acos, Some(d_acos)),
        def("atan", |a| num1(a, f64::atan), sym_atan, Some(d_atan)),
        def("sinh", |a| num1(a, f64::sinh), sym_sinh, Some(d_sinh)),
        def("cosh", |a| num1(a, f64::cosh), sym_cosh, Some(d_cosh)),
        def("tanh", |a| num1(a, f64::tanh), sym_tanh, Some(d_tanh)),
        def("exp", |a| num1(a, f64::exp), sym_exp, Some(d_exp)),
        def("log", |a| num1(a, f64::ln), sym_log, Some(d_log)),
        def("abs", |a| num1(a, f64::abs), sym_abs, None),
        // Placeholder for underivable functions; no hooks of its own.
        FunctionDef {
            name: "Derivative".to_string(),
            arity: 2..=2,
            eval_num: None,
            eval_sym: None,
            derivative: None,
            series: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_values() {
        let x = Ex::symbol("x");
        assert!(Ex::zero().sin().is_zero());
        assert!(Ex::zero().cos().is_one());
        assert!(Ex::pi().sin().is_zero());
        assert!(Ex::one().log().is_zero());
        assert_eq!(x.log().exp(), x);
        assert_eq!(x.exp().log(), x);
    }

    #[test]
    fn odd_and_even_symmetry() {
        let x = Ex::symbol("x");
        let neg = -&x;
        assert_eq!(neg.sin(), -x.sin());
        assert_eq!(neg.cos(), x.cos());
        assert_eq!(neg.tan(), -x.tan());
        assert_eq!(neg.sinh(), -x.sinh());
        assert_eq!(neg.cosh(), x.cosh());
        assert_eq!(neg.abs(), x.abs());
        // sin(-2) folds to -sin(2) while staying exact
        assert_eq!(Ex::numeric(-2i64).sin(), -Ex::two().sin());
    }

    #[test]
    fn abs_of_exact_numbers() {
        assert_eq!(Ex::numeric(-3i64).abs(), Ex::three());
        assert_eq!(Ex::minus_half().abs(), Ex::half());
    }

    #[test]
    fn underivable_becomes_placeholder() {
        let x = Ex::symbol("x");
        let d = x.abs().diff(&x).unwrap();
        match &*d {
            NodeKind::Func { serial, args } => {
                assert_eq!(registry::name_of(*serial).as_deref(), Some("Derivative"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected Derivative placeholder, got {other:?}"),
        }
    }
}
