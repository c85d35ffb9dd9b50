//! The expression DAG.
//!
//! This module defines:
//! - `Ex` - the value-semantic handle; every user operation goes through it
//! - `Node` - the shared, immutable node envelope (hash, flags, kind)
//! - `NodeKind` - the tagged variants of algebraic nodes
//!
//! # Architecture
//!
//! ## N-ary Add/Mul
//! Instead of binary `Add(left, right)` the kernel stores flat pair
//! sequences `(rest, coeff)` with an overall numeric coefficient, so
//! canonicalization is a sort + merge instead of tree rebalancing and
//! structural equality does not depend on bracketing.
//!
//! ## Structural hashing
//! Each `Node` carries a pre-computed hash over its canonical contents for
//! O(1) equality rejection. Structural equality implies hash equality.
//!
//! ## Sharing
//! Nodes live behind `Arc`; cloning a handle bumps the refcount. A node is
//! never mutated after construction (the status flags are monotone bits set
//! through an atomic). The graph is acyclic by construction: a composite
//! only ever holds children that existed before it.

mod hash;
mod ordering;

use std::ops::Deref;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};

use bitflags::bitflags;

use crate::algebra::{PairSeq, Series};
use crate::core::constant::{self, Constant};
use crate::core::error::KernelError;
use crate::core::numeric::Numeric;
use crate::core::symbol::Symbol;
use crate::matrix::Matrix;

pub use ordering::cmp_ex;

bitflags! {
    /// Monotone status bits on a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct NodeFlags: u8 {
        /// Produced by a canonicalizing constructor; `eval(1)` is a no-op.
        const EVALUATED = 0b0000_0001;
        /// `expand` has already run over this subtree.
        const EXPANDED = 0b0000_0010;
    }
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
}

/// The public kind tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Exact number (integer, rational, complex or float tag inside).
    Numeric,
    /// Named indeterminate.
    Symbol,
    /// Named constant.
    Constant,
    /// Canonical sum.
    Add,
    /// Canonical product.
    Mul,
    /// Non-commutative product.
    NcMul,
    /// Power `base^expo`.
    Pow,
    /// Named-function application.
    Function,
    /// Ordered list (structurally extensible).
    List,
    /// Fixed tuple.
    Tuple,
    /// Matrix over the expression field.
    Matrix,
    /// Relational `lhs op rhs`.
    Relational,
    /// Truncated power series.
    Series,
    /// Failed computation marker.
    Fail,
}

/// Boolean attribute queries answered by [`Ex::info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfoFlag {
    /// The node is a numeric leaf.
    Numeric,
    /// Exact integer.
    Integer,
    /// Positive exact integer.
    PosInt,
    /// Non-negative exact integer.
    NonNegInt,
    /// Exact integer or rational.
    Rational,
    /// Real-valued numeric.
    Real,
    /// Strictly positive numeric.
    Positive,
    /// Strictly negative numeric.
    Negative,
    /// Polynomial in its symbols (non-negative integer powers only).
    Polynomial,
    /// Quotient of polynomials (integer powers of any sign).
    RationalFunction,
    /// Relational node.
    Relation,
    /// List node.
    List,
    /// Symbol leaf.
    Symbol,
}

/// The tagged variants of algebraic nodes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Exact number.
    Num(Numeric),
    /// Indeterminate.
    Sym(Symbol),
    /// Named constant.
    Const(Constant),
    /// Canonical sum: pairs mean `coeff * rest`, overall is additive.
    Add(PairSeq),
    /// Canonical product: pairs mean `rest ^ coeff`, overall is multiplicative.
    Mul(PairSeq),
    /// Non-commutative product; factor order is meaningful.
    NcMul(Vec<Ex>),
    /// Power.
    Pow {
        /// Base.
        base: Ex,
        /// Exponent.
        expo: Ex,
    },
    /// Function application: a serial into the registry plus arguments.
    Func {
        /// Registry serial.
        serial: usize,
        /// Ordered arguments.
        args: Vec<Ex>,
    },
    /// Ordered list.
    List(Vec<Ex>),
    /// Fixed tuple.
    Tuple(Vec<Ex>),
    /// Matrix.
    Matrix(Matrix),
    /// Relational.
    Rel {
        /// Left-hand side.
        lhs: Ex,
        /// Right-hand side.
        rhs: Ex,
        /// Operator.
        op: RelOp,
    },
    /// Truncated power series.
    Series(Series),
    /// Failed computation marker.
    Fail,
}

/// The shared node envelope: cached hash, status flags, kind.
#[derive(Debug)]
pub struct Node {
    hash: u64,
    flags: AtomicU8,
    kind: NodeKind,
}

// =============================================================================
// EX - the handle
// =============================================================================

/// A value-semantic handle owning one reference on a node.
///
/// Cloning bumps the refcount; dropping decrements and frees at zero. All
/// algebraic operations are total functions from handles to handles except
/// where documented (`try_div`, `op`, the rewrite entry points).
#[derive(Debug, Clone)]
pub struct Ex(Arc<Node>);

impl Deref for Ex {
    type Target = NodeKind;
    fn deref(&self) -> &Self::Target {
        &self.0.kind
    }
}

impl Ex {
    /// Wrap a kind into a fresh evaluated node.
    pub(crate) fn new(kind: NodeKind) -> Self {
        let hash = hash::compute_hash(&kind);
        Ex(Arc::new(Node {
            hash,
            flags: AtomicU8::new(NodeFlags::EVALUATED.bits()),
            kind,
        }))
    }

    pub(crate) fn node_arc(&self) -> &Arc<Node> {
        &self.0
    }

    /// The cached structural hash.
    pub fn hash_value(&self) -> u64 {
        self.0.hash
    }

    pub(crate) fn has_flag(&self, flag: NodeFlags) -> bool {
        NodeFlags::from_bits_truncate(self.0.flags.load(AtomicOrdering::Relaxed)).contains(flag)
    }

    pub(crate) fn set_flag(&self, flag: NodeFlags) {
        self.0.flags.fetch_or(flag.bits(), AtomicOrdering::Relaxed);
    }

    // -------------------------------------------------------------------------
    // Leaf constructors
    // -------------------------------------------------------------------------

    /// A numeric leaf.
    pub fn numeric(n: impl Into<Numeric>) -> Self {
        Ex::new(NodeKind::Num(n.into()))
    }

    /// A fresh symbol. Calling this twice with the same name yields two
    /// distinct symbols (distinct serials).
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Ex::new(NodeKind::Sym(Symbol::new(name)))
    }

    /// Wrap an existing symbol.
    pub fn from_symbol(sym: Symbol) -> Self {
        Ex::new(NodeKind::Sym(sym))
    }

    /// The circle constant π.
    pub fn pi() -> Self {
        Ex::new(NodeKind::Const(constant::PI.clone()))
    }

    /// The Euler-Mascheroni constant γ.
    pub fn euler_gamma() -> Self {
        Ex::new(NodeKind::Const(constant::EULER.clone()))
    }

    /// Catalan's constant.
    pub fn catalan() -> Self {
        Ex::new(NodeKind::Const(constant::CATALAN.clone()))
    }

    /// The imaginary unit.
    pub fn i() -> Self {
        Ex::numeric(Numeric::i())
    }

    /// The failed-computation marker.
    pub fn fail() -> Self {
        Ex::new(NodeKind::Fail)
    }

    /// An ordered list.
    pub fn list(items: Vec<Ex>) -> Self {
        Ex::new(NodeKind::List(items))
    }

    /// A fixed tuple.
    pub fn tuple(items: Vec<Ex>) -> Self {
        Ex::new(NodeKind::Tuple(items))
    }

    /// Append an element to a list, returning the extended list.
    ///
    /// # Errors
    /// `Domain` if `self` is not a list.
    pub fn append(&self, item: Ex) -> Result<Ex, KernelError> {
        match &**self {
            NodeKind::List(items) => {
                let mut items = items.clone();
                items.push(item);
                Ok(Ex::list(items))
            }
            _ => Err(KernelError::domain("append on a non-list")),
        }
    }

    /// Prepend an element to a list, returning the extended list.
    ///
    /// # Errors
    /// `Domain` if `self` is not a list.
    pub fn prepend(&self, item: Ex) -> Result<Ex, KernelError> {
        match &**self {
            NodeKind::List(items) => {
                let mut out = Vec::with_capacity(items.len() + 1);
                out.push(item);
                out.extend(items.iter().cloned());
                Ok(Ex::list(out))
            }
            _ => Err(KernelError::domain("prepend on a non-list")),
        }
    }

    // -------------------------------------------------------------------------
    // Structural queries
    // -------------------------------------------------------------------------

    /// The kind tag.
    pub fn kind(&self) -> Kind {
        match &**self {
            NodeKind::Num(_) => Kind::Numeric,
            NodeKind::Sym(_) => Kind::Symbol,
            NodeKind::Const(_) => Kind::Constant,
            NodeKind::Add(_) => Kind::Add,
            NodeKind::Mul(_) => Kind::Mul,
            NodeKind::NcMul(_) => Kind::NcMul,
            NodeKind::Pow { .. } => Kind::Pow,
            NodeKind::Func { .. } => Kind::Function,
            NodeKind::List(_) => Kind::List,
            NodeKind::Tuple(_) => Kind::Tuple,
            NodeKind::Matrix(_) => Kind::Matrix,
            NodeKind::Rel { .. } => Kind::Relational,
            NodeKind::Series(_) => Kind::Series,
            NodeKind::Fail => Kind::Fail,
        }
    }

    /// Number of direct children. For sums and products a non-identity
    /// overall coefficient counts as one extra operand.
    pub fn nops(&self) -> usize {
        match &**self {
            NodeKind::Num(_) | NodeKind::Sym(_) | NodeKind::Const(_) | NodeKind::Fail => 0,
            NodeKind::Add(seq) => seq.pairs.len() + usize::from(!seq.overall.is_zero()),
            NodeKind::Mul(seq) => seq.pairs.len() + usize::from(!seq.overall.is_one()),
            NodeKind::NcMul(items) | NodeKind::List(items) | NodeKind::Tuple(items) => items.len(),
            NodeKind::Pow { .. } | NodeKind::Rel { .. } => 2,
            NodeKind::Func { args, .. } => args.len(),
            NodeKind::Matrix(m) => m.rows() * m.cols(),
            NodeKind::Series(s) => s.terms.len(),
        }
    }

    /// The `i`-th direct child. Sum/product children are returned in
    /// recombined form (`coeff*rest` / `rest^coeff`), with the overall
    /// coefficient last.
    ///
    /// # Errors
    /// `Range` if `i >= nops()`.
    pub fn op(&self, i: usize) -> Result<Ex, KernelError> {
        let out_of_range =
            || KernelError::range(format!("op({i}) out of range (nops = {})", self.nops()));
        match &**self {
            NodeKind::Add(seq) => {
                if i < seq.pairs.len() {
                    Ok(crate::algebra::pairseq::recombine_add_pair(&seq.pairs[i]))
                } else if i == seq.pairs.len() && !seq.overall.is_zero() {
                    Ok(Ex::numeric(seq.overall.clone()))
                } else {
                    Err(out_of_range())
                }
            }
            NodeKind::Mul(seq) => {
                if i < seq.pairs.len() {
                    Ok(crate::algebra::pairseq::recombine_mul_pair(&seq.pairs[i]))
                } else if i == seq.pairs.len() && !seq.overall.is_one() {
                    Ok(Ex::numeric(seq.overall.clone()))
                } else {
                    Err(out_of_range())
                }
            }
            NodeKind::NcMul(items) | NodeKind::List(items) | NodeKind::Tuple(items) => {
                items.get(i).cloned().ok_or_else(out_of_range)
            }
            NodeKind::Pow { base, expo } => match i {
                0 => Ok(base.clone()),
                1 => Ok(expo.clone()),
                _ => Err(out_of_range()),
            },
            NodeKind::Rel { lhs, rhs, .. } => match i {
                0 => Ok(lhs.clone()),
                1 => Ok(rhs.clone()),
                _ => Err(out_of_range()),
            },
            NodeKind::Func { args, .. } => args.get(i).cloned().ok_or_else(out_of_range),
            NodeKind::Matrix(m) => m.elems().get(i).cloned().ok_or_else(out_of_range),
            NodeKind::Series(s) => s
                .terms
                .get(i)
                .map(|(c, _)| c.clone())
                .ok_or_else(out_of_range),
            _ => Err(out_of_range()),
        }
    }

    /// Visit every direct child.
    pub(crate) fn for_each_child(&self, mut f: impl FnMut(&Ex)) {
        match &**self {
            NodeKind::Num(_) | NodeKind::Sym(_) | NodeKind::Const(_) | NodeKind::Fail => {}
            NodeKind::Add(seq) | NodeKind::Mul(seq) => {
                for p in &seq.pairs {
                    f(&p.rest);
                }
            }
            NodeKind::NcMul(items) | NodeKind::List(items) | NodeKind::Tuple(items) => {
                for it in items {
                    f(it);
                }
            }
            NodeKind::Pow { base, expo } => {
                f(base);
                f(expo);
            }
            NodeKind::Func { args, .. } => {
                for a in args {
                    f(a);
                }
            }
            NodeKind::Matrix(m) => {
                for e in m.elems() {
                    f(e);
                }
            }
            NodeKind::Rel { lhs, rhs, .. } => {
                f(lhs);
                f(rhs);
            }
            NodeKind::Series(s) => {
                f(&s.var);
                f(&s.point);
                for (c, _) in &s.terms {
                    f(c);
                }
            }
        }
    }

    /// Does `sub` occur in this tree by structural equality?
    ///
    /// Note: matches whole nodes, so `has(a+b)` is true inside `a+b+c` only
    /// if the exact sum `a+b` appears as a node, which after flattening it
    /// does not.
    pub fn has(&self, sub: &Ex) -> bool {
        if self == sub {
            return true;
        }
        // Sum/product pairs are searched through their recombined children so
        // that `(2*x).has(x)` holds.
        let mut found = false;
        self.for_each_child(|c| {
            if !found && c.has(sub) {
                found = true;
            }
        });
        if found {
            return true;
        }
        match &**self {
            NodeKind::Add(seq) | NodeKind::Mul(seq) => {
                if let NodeKind::Num(n) = &**sub {
                    // The folded overall coefficient still counts as present.
                    *n == seq.overall
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Boolean attribute check.
    pub fn info(&self, flag: InfoFlag) -> bool {
        match flag {
            InfoFlag::Numeric => matches!(&**self, NodeKind::Num(_)),
            InfoFlag::Integer => matches!(&**self, NodeKind::Num(n) if n.is_integer()),
            InfoFlag::PosInt => matches!(&**self, NodeKind::Num(n) if n.is_pos_integer()),
            InfoFlag::NonNegInt => matches!(&**self, NodeKind::Num(n) if n.is_nonneg_integer()),
            InfoFlag::Rational => matches!(&**self, NodeKind::Num(n) if n.is_rational()),
            InfoFlag::Real => matches!(&**self, NodeKind::Num(n) if n.is_real()),
            InfoFlag::Positive => matches!(&**self, NodeKind::Num(n) if n.is_positive()),
            InfoFlag::Negative => matches!(&**self, NodeKind::Num(n) if n.is_negative()),
            InfoFlag::Polynomial => self.is_polynomial_like(false),
            InfoFlag::RationalFunction => self.is_polynomial_like(true),
            InfoFlag::Relation => matches!(&**self, NodeKind::Rel { .. }),
            InfoFlag::List => matches!(&**self, NodeKind::List(_)),
            InfoFlag::Symbol => matches!(&**self, NodeKind::Sym(_)),
        }
    }

    fn is_polynomial_like(&self, allow_negative: bool) -> bool {
        match &**self {
            NodeKind::Num(n) => n.is_rational() || !n.is_float(),
            NodeKind::Sym(_) | NodeKind::Const(_) => true,
            NodeKind::Add(seq) => seq
                .pairs
                .iter()
                .all(|p| p.rest.is_polynomial_like(allow_negative)),
            NodeKind::Mul(seq) => seq.pairs.iter().all(|p| {
                let expo_ok = if allow_negative {
                    p.coeff.is_integer()
                } else {
                    p.coeff.is_nonneg_integer()
                };
                expo_ok && p.rest.is_polynomial_like(allow_negative)
            }),
            NodeKind::Pow { base, expo } => {
                let expo_ok = match &**expo {
                    NodeKind::Num(n) if allow_negative => n.is_integer(),
                    NodeKind::Num(n) => n.is_nonneg_integer(),
                    _ => false,
                };
                expo_ok && base.is_polynomial_like(allow_negative)
            }
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Kind accessors
    // -------------------------------------------------------------------------

    /// The numeric value if this is a numeric leaf.
    pub fn as_numeric(&self) -> Option<&Numeric> {
        match &**self {
            NodeKind::Num(n) => Some(n),
            _ => None,
        }
    }

    /// The symbol if this is a symbol leaf.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match &**self {
            NodeKind::Sym(s) => Some(s),
            _ => None,
        }
    }

    /// The matrix if this is a matrix node.
    pub fn as_matrix(&self) -> Option<&Matrix> {
        match &**self {
            NodeKind::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// The series if this is a series node.
    pub fn as_series(&self) -> Option<&Series> {
        match &**self {
            NodeKind::Series(s) => Some(s),
            _ => None,
        }
    }

    /// Exact or float numeric zero.
    pub fn is_zero(&self) -> bool {
        matches!(&**self, NodeKind::Num(n) if n.is_zero())
    }

    /// Exact or float numeric one.
    pub fn is_one(&self) -> bool {
        matches!(&**self, NodeKind::Num(n) if n.is_one())
    }

    /// Exact or float numeric minus one.
    pub fn is_minus_one(&self) -> bool {
        matches!(&**self, NodeKind::Num(n) if n.is_minus_one())
    }

    // -------------------------------------------------------------------------
    // Singletons
    // -------------------------------------------------------------------------

    /// The additive identity.
    pub fn zero() -> Ex {
        EX_ZERO.clone()
    }

    /// The multiplicative identity.
    pub fn one() -> Ex {
        EX_ONE.clone()
    }

    /// Minus one.
    pub fn minus_one() -> Ex {
        EX_MINUS_ONE.clone()
    }

    /// Two.
    pub fn two() -> Ex {
        EX_TWO.clone()
    }

    /// Three.
    pub fn three() -> Ex {
        EX_THREE.clone()
    }

    /// One half.
    pub fn half() -> Ex {
        EX_HALF.clone()
    }

    /// Minus one half.
    pub fn minus_half() -> Ex {
        EX_MINUS_HALF.clone()
    }
}

// Singleton leaves kept alive for the whole process; cloning them is a
// refcount bump, not an allocation.
static EX_ZERO: LazyLock<Ex> = LazyLock::new(|| Ex::numeric(0i64));
static EX_ONE: LazyLock<Ex> = LazyLock::new(|| Ex::numeric(1i64));
static EX_MINUS_ONE: LazyLock<Ex> = LazyLock::new(|| Ex::numeric(-1i64));
static EX_TWO: LazyLock<Ex> = LazyLock::new(|| Ex::numeric(2i64));
static EX_THREE: LazyLock<Ex> = LazyLock::new(|| Ex::numeric(3i64));
static EX_HALF: LazyLock<Ex> = LazyLock::new(|| Ex::numeric(Numeric::ratio(1, 2)));
static EX_MINUS_HALF: LazyLock<Ex> = LazyLock::new(|| Ex::numeric(Numeric::ratio(-1, 2)));

// =============================================================================
// EQUALITY AND HASHING
// =============================================================================

impl PartialEq for Ex {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        if self.0.hash != other.0.hash {
            return false;
        }
        cmp_ex(self, other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Ex {}

impl std::hash::Hash for Ex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl From<i64> for Ex {
    fn from(n: i64) -> Self {
        Ex::numeric(n)
    }
}

impl From<i32> for Ex {
    fn from(n: i32) -> Self {
        Ex::numeric(Numeric::from(n))
    }
}

impl From<f64> for Ex {
    fn from(f: f64) -> Self {
        Ex::numeric(f)
    }
}

impl From<Numeric> for Ex {
    fn from(n: Numeric) -> Self {
        Ex::numeric(n)
    }
}

impl From<Symbol> for Ex {
    fn from(s: Symbol) -> Self {
        Ex::from_symbol(s)
    }
}

impl From<&Ex> for Ex {
    fn from(e: &Ex) -> Self {
        e.clone()
    }
}
