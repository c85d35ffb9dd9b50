//! The structural laws the canonicalizing constructors guarantee.

use crate::{Ex, Kind};

#[test]
fn associativity_is_structural() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let z = Ex::symbol("z");
    assert_eq!((&x + &y) + &z, &x + (&y + &z));
    assert_eq!((&x * &y) * &z, &x * (&y * &z));
}

#[test]
fn commutativity_is_structural() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    assert_eq!(&x + &y, &y + &x);
    assert_eq!(&x * &y, &y * &x);
    assert_eq!((&x + &y).hash_value(), (&y + &x).hash_value());
}

#[test]
fn identity_collapse() {
    let x = Ex::symbol("x");
    assert_eq!(&x + 0, x);
    assert_eq!(&x * 1, x);
    assert!((&x * 0).is_zero());
    assert_eq!(1 * &x + 0 * &x, x);
}

#[test]
fn no_nested_sums_or_products() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let z = Ex::symbol("z");
    let s = (&x + &y) + (&z + 1) + (&x + 2);
    assert_eq!(s.kind(), Kind::Add);
    // 2x + y + z + 3: three pairs plus the overall coefficient
    assert_eq!(s.nops(), 4);
    for i in 0..s.nops() {
        let child = s.op(i).unwrap();
        assert_ne!(child.kind(), Kind::Add);
    }
}

#[test]
fn like_terms_merge_across_flattening() {
    let x = Ex::symbol("x");
    let e = 2 * &x + 3 * &x - 5 * &x;
    assert!(e.is_zero());
    let p = x.pow(2) * x.pow(3);
    assert_eq!(p, x.pow(5));
}

#[test]
fn hash_equality_follows_structure() {
    let a = Ex::symbol("a");
    let b = Ex::symbol("b");
    let lhs = (&a + &b).pow(3).expand();
    let rhs = (&b + &a).pow(3).expand();
    assert_eq!(lhs, rhs);
    assert_eq!(lhs.hash_value(), rhs.hash_value());
}

#[test]
fn numeric_folding_into_overall() {
    let x = Ex::symbol("x");
    let e = 2 + &x + 3;
    assert_eq!(e.op(e.nops() - 1).unwrap(), Ex::numeric(5i64));
    let p = 2 * &x * 3;
    assert_eq!(p.op(p.nops() - 1).unwrap(), Ex::numeric(6i64));
}

#[test]
fn distinct_symbols_same_name() {
    let x1 = Ex::symbol("x");
    let x2 = Ex::symbol("x");
    assert_ne!(x1, x2);
    // They do not combine as like terms
    let s = &x1 + &x2;
    assert_eq!(s.nops(), 2);
}

#[test]
fn relational_and_containers_keep_shape() {
    let x = Ex::symbol("x");
    let l = Ex::list(vec![x.clone(), Ex::one()]);
    assert_eq!(l.kind(), Kind::List);
    let l2 = l.append(Ex::two()).unwrap();
    assert_eq!(l2.nops(), 3);
    let l3 = l2.prepend(Ex::zero()).unwrap();
    assert_eq!(l3.op(0).unwrap(), Ex::zero());
    assert!(l.append(Ex::one()).is_ok());
    assert!(x.append(Ex::one()).is_err());
}
