//! Structural hashing.
//!
//! Every node's hash is a function only of its kind tag and canonical
//! contents, so structural equality implies hash equality. Children hashes
//! are already cached, which makes the envelope hash O(children).
//!
//! Sum/product children are folded order-independently (wrapping add), as
//! the pair order itself is canonical but the hash must not depend on how a
//! particular merge interleaved equal-rank pairs.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use super::NodeKind;
use crate::algebra::PairSeq;

// Fixed kind tags; the discriminant order is part of the persistent hash
// definition, so spell it out instead of relying on `mem::discriminant`.
const TAG_NUM: u64 = 0x01;
const TAG_SYM: u64 = 0x02;
const TAG_CONST: u64 = 0x03;
const TAG_ADD: u64 = 0x04;
const TAG_MUL: u64 = 0x05;
const TAG_NCMUL: u64 = 0x06;
const TAG_POW: u64 = 0x07;
const TAG_FUNC: u64 = 0x08;
const TAG_LIST: u64 = 0x09;
const TAG_TUPLE: u64 = 0x0a;
const TAG_MATRIX: u64 = 0x0b;
const TAG_REL: u64 = 0x0c;
const TAG_SERIES: u64 = 0x0d;
const TAG_FAIL: u64 = 0x0e;

fn mix(parts: &[u64]) -> u64 {
    let mut h = FxHasher::default();
    for p in parts {
        h.write_u64(*p);
    }
    h.finish()
}

fn fx_of(value: &impl Hash) -> u64 {
    let mut h = FxHasher::default();
    value.hash(&mut h);
    h.finish()
}

fn ordered_fold(tag: u64, children: impl Iterator<Item = u64>) -> u64 {
    let mut h = FxHasher::default();
    h.write_u64(tag);
    for c in children {
        h.write_u64(c);
    }
    h.finish()
}

fn pairseq_hash(tag: u64, seq: &PairSeq) -> u64 {
    // Commutative fold over the pairs, then mixed with the overall coefficient.
    let mut folded: u64 = 0;
    for p in &seq.pairs {
        folded = folded.wrapping_add(mix(&[p.rest.hash_value(), fx_of(&p.coeff)]));
    }
    mix(&[tag, folded, fx_of(&seq.overall)])
}

pub(crate) fn compute_hash(kind: &NodeKind) -> u64 {
    match kind {
        NodeKind::Num(n) => mix(&[TAG_NUM, fx_of(n)]),
        NodeKind::Sym(s) => mix(&[TAG_SYM, s.serial()]),
        NodeKind::Const(c) => mix(&[TAG_CONST, c.serial()]),
        NodeKind::Add(seq) => pairseq_hash(TAG_ADD, seq),
        NodeKind::Mul(seq) => pairseq_hash(TAG_MUL, seq),
        NodeKind::NcMul(items) => ordered_fold(TAG_NCMUL, items.iter().map(|e| e.hash_value())),
        NodeKind::Pow { base, expo } => mix(&[TAG_POW, base.hash_value(), expo.hash_value()]),
        NodeKind::Func { serial, args } => ordered_fold(
            mix(&[TAG_FUNC, *serial as u64]),
            args.iter().map(|e| e.hash_value()),
        ),
        NodeKind::List(items) => ordered_fold(TAG_LIST, items.iter().map(|e| e.hash_value())),
        NodeKind::Tuple(items) => ordered_fold(TAG_TUPLE, items.iter().map(|e| e.hash_value())),
        NodeKind::Matrix(m) => ordered_fold(
            mix(&[TAG_MATRIX, m.rows() as u64, m.cols() as u64]),
            m.elems().iter().map(|e| e.hash_value()),
        ),
        NodeKind::Rel { lhs, rhs, op } => mix(&[
            TAG_REL,
            *op as u64,
            lhs.hash_value(),
            rhs.hash_value(),
        ]),
        NodeKind::Series(s) => ordered_fold(
            mix(&[TAG_SERIES, s.var.hash_value(), s.point.hash_value(), s.order as u64]),
            s.terms
                .iter()
                .map(|(c, d)| mix(&[c.hash_value(), *d as u64])),
        ),
        NodeKind::Fail => TAG_FAIL,
    }
}
