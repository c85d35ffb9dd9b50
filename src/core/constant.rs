//! Named constants: exact-bodied constants and transcendentals.
//!
//! A constant carries a name, a serial for ordering, and either an exact
//! numeric body or a float evaluator used by `evalf`. The well-known
//! transcendentals (π, Euler's γ, Catalan's G) are process-wide singletons.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::numeric::Numeric;

static NEXT_CONSTANT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// The body a constant evaluates to under `evalf`.
#[derive(Debug, Clone)]
pub enum ConstantValue {
    /// An exact numeric body.
    Exact(Numeric),
    /// A float approximation for transcendentals.
    Approx(f64),
}

/// A named mathematical constant.
#[derive(Debug, Clone)]
pub struct Constant {
    name: Arc<str>,
    serial: u64,
    value: ConstantValue,
}

impl Constant {
    /// Create a fresh named constant with the given body.
    pub fn new(name: impl AsRef<str>, value: ConstantValue) -> Self {
        Constant {
            name: Arc::from(name.as_ref()),
            serial: NEXT_CONSTANT_SERIAL.fetch_add(1, Ordering::Relaxed),
            value,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique serial.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The numeric value under `evalf`.
    pub fn evalf(&self) -> Numeric {
        match &self.value {
            ConstantValue::Exact(n) => n.to_float(),
            ConstantValue::Approx(f) => Numeric::Float(*f),
        }
    }

    /// The exact body if the constant has one.
    pub fn exact_value(&self) -> Option<&Numeric> {
        match &self.value {
            ConstantValue::Exact(n) => Some(n),
            ConstantValue::Approx(_) => None,
        }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
    }
}

impl Eq for Constant {}

impl std::hash::Hash for Constant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
    }
}

// =============================================================================
// WELL-KNOWN CONSTANT SINGLETONS
// =============================================================================

use std::sync::LazyLock;

pub(crate) static PI: LazyLock<Constant> =
    LazyLock::new(|| Constant::new("Pi", ConstantValue::Approx(std::f64::consts::PI)));

pub(crate) static EULER: LazyLock<Constant> =
    LazyLock::new(|| Constant::new("Euler", ConstantValue::Approx(0.577_215_664_901_532_9)));

pub(crate) static CATALAN: LazyLock<Constant> =
    LazyLock::new(|| Constant::new("Catalan", ConstantValue::Approx(0.915_965_594_177_219)));

/// Look up a well-known constant by name (archive support).
pub(crate) fn builtin_constant(name: &str) -> Option<Constant> {
    match name {
        "Pi" => Some(PI.clone()),
        "Euler" => Some(EULER.clone()),
        "Catalan" => Some(CATALAN.clone()),
        _ => None,
    }
}
