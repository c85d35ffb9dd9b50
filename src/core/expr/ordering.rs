//! Canonical total order on expressions.
//!
//! This is the order that canonicalizes sums and products and backs
//! structural equality: `cmp_ex(a, b) == Equal` iff `a` and `b` are
//! structurally equal. It is arbitrary but total, cheap, and stable across
//! runs for a fixed construction order (symbol serials are handed out by the
//! process-wide counter).
//!
//! Tie-breaking: kind ranks first, then kind-specific comparison - numerics
//! by value, symbols and constants by serial, composites lexicographically
//! over their canonicalized children and then by arity.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{Ex, NodeKind, RelOp};
use crate::algebra::PairSeq;

// Numerics rank first so they lead among product bases; within a sum the
// numeric part is the overall coefficient and prints last regardless.
fn kind_rank(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Num(_) => 0,
        NodeKind::Const(_) => 1,
        NodeKind::Sym(_) => 2,
        NodeKind::Pow { .. } => 3,
        NodeKind::Mul(_) => 4,
        NodeKind::Add(_) => 5,
        NodeKind::NcMul(_) => 6,
        NodeKind::Func { .. } => 7,
        NodeKind::Series(_) => 8,
        NodeKind::Matrix(_) => 9,
        NodeKind::Rel { .. } => 10,
        NodeKind::List(_) => 11,
        NodeKind::Tuple(_) => 12,
        NodeKind::Fail => 13,
    }
}

fn rel_rank(op: RelOp) -> u8 {
    match op {
        RelOp::Equal => 0,
        RelOp::NotEqual => 1,
        RelOp::Less => 2,
        RelOp::LessEq => 3,
        RelOp::Greater => 4,
        RelOp::GreaterEq => 5,
    }
}

fn cmp_slices(a: &[Ex], b: &[Ex]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match cmp_ex(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn cmp_pairseq(a: &PairSeq, b: &PairSeq) -> Ordering {
    for (pa, pb) in a.pairs.iter().zip(b.pairs.iter()) {
        match cmp_ex(&pa.rest, &pb.rest) {
            Ordering::Equal => {}
            other => return other,
        }
        match pa.coeff.cmp_values(&pb.coeff) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.pairs
        .len()
        .cmp(&b.pairs.len())
        .then_with(|| a.overall.cmp_values(&b.overall))
}

/// Compare two expressions in the canonical total order.
pub fn cmp_ex(a: &Ex, b: &Ex) -> Ordering {
    if Arc::ptr_eq(a.node_arc(), b.node_arc()) {
        return Ordering::Equal;
    }
    let rank_cmp = kind_rank(a).cmp(&kind_rank(b));
    if rank_cmp != Ordering::Equal {
        return rank_cmp;
    }
    match (&**a, &**b) {
        (NodeKind::Num(x), NodeKind::Num(y)) => x.cmp_values(y),
        (NodeKind::Sym(x), NodeKind::Sym(y)) => x.serial().cmp(&y.serial()),
        (NodeKind::Const(x), NodeKind::Const(y)) => x.serial().cmp(&y.serial()),
        (
            NodeKind::Pow { base: b1, expo: e1 },
            NodeKind::Pow { base: b2, expo: e2 },
        ) => cmp_ex(b1, b2).then_with(|| cmp_ex(e1, e2)),
        (NodeKind::Add(s1), NodeKind::Add(s2)) | (NodeKind::Mul(s1), NodeKind::Mul(s2)) => {
            cmp_pairseq(s1, s2)
        }
        (NodeKind::NcMul(x), NodeKind::NcMul(y))
        | (NodeKind::List(x), NodeKind::List(y))
        | (NodeKind::Tuple(x), NodeKind::Tuple(y)) => cmp_slices(x, y),
        (
            NodeKind::Func { serial: f1, args: a1 },
            NodeKind::Func { serial: f2, args: a2 },
        ) => f1.cmp(f2).then_with(|| cmp_slices(a1, a2)),
        (NodeKind::Matrix(m1), NodeKind::Matrix(m2)) => m1
            .rows()
            .cmp(&m2.rows())
            .then_with(|| m1.cols().cmp(&m2.cols()))
            .then_with(|| cmp_slices(m1.elems(), m2.elems())),
        (
            NodeKind::Rel { lhs: l1, rhs: r1, op: o1 },
            NodeKind::Rel { lhs: l2, rhs: r2, op: o2 },
        ) => rel_rank(*o1)
            .cmp(&rel_rank(*o2))
            .then_with(|| cmp_ex(l1, l2))
            .then_with(|| cmp_ex(r1, r2)),
        (NodeKind::Series(s1), NodeKind::Series(s2)) => cmp_ex(&s1.var, &s2.var)
            .then_with(|| cmp_ex(&s1.point, &s2.point))
            .then_with(|| s1.order.cmp(&s2.order))
            .then_with(|| {
                for ((c1, d1), (c2, d2)) in s1.terms.iter().zip(s2.terms.iter()) {
                    match d1.cmp(d2).then_with(|| cmp_ex(c1, c2)) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                s1.terms.len().cmp(&s2.terms.len())
            }),
        (NodeKind::Fail, NodeKind::Fail) => Ordering::Equal,
        // Unreachable: ranks matched, so the kinds match.
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_order_by_creation() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        assert_eq!(cmp_ex(&x, &y), Ordering::Less);
        assert_eq!(cmp_ex(&y, &x), Ordering::Greater);
        assert_eq!(cmp_ex(&x, &x), Ordering::Equal);
    }

    #[test]
    fn numerics_rank_first() {
        let x = Ex::symbol("x");
        assert_eq!(cmp_ex(&Ex::two(), &x), Ordering::Less);
        assert_eq!(cmp_ex(&Ex::half(), &Ex::one()), Ordering::Less);
    }
}
