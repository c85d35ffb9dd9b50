//! The structural query surface of the handle: kind/nops/op/has/info.

use crate::{Ex, InfoFlag, Kind, KernelError, RelOp};

#[test]
fn kinds_across_the_node_zoo() {
    let x = Ex::symbol("x");
    assert_eq!(Ex::two().kind(), Kind::Numeric);
    assert_eq!(x.kind(), Kind::Symbol);
    assert_eq!(Ex::pi().kind(), Kind::Constant);
    assert_eq!((&x + 1).kind(), Kind::Add);
    assert_eq!((2 * &x).kind(), Kind::Mul);
    assert_eq!(x.pow(&x).kind(), Kind::Pow);
    assert_eq!(x.sin().kind(), Kind::Function);
    assert_eq!(Ex::list(vec![x.clone()]).kind(), Kind::List);
    assert_eq!(Ex::tuple(vec![x.clone()]).kind(), Kind::Tuple);
    assert_eq!(Ex::equal(x.clone(), Ex::one()).kind(), Kind::Relational);
    assert_eq!(Ex::fail().kind(), Kind::Fail);
    assert_eq!(x.ncmul(Ex::symbol("y")).kind(), Kind::NcMul);
    assert_eq!(x.series(&x, 0, 3).unwrap().kind(), Kind::Series);
}

#[test]
fn op_recombines_sum_pairs() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let e = 3 * x.pow(2) + &y + 7;
    assert_eq!(e.nops(), 3);
    // Children come back recombined: 3*x^2, y, then the overall 7
    let mut seen = Vec::new();
    for i in 0..e.nops() {
        seen.push(e.op(i).unwrap());
    }
    assert!(seen.contains(&(3 * x.pow(2))));
    assert!(seen.contains(&y));
    assert!(seen.contains(&Ex::numeric(7i64)));
}

#[test]
fn has_looks_through_structure() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let e = (&x + &y).sin() * 2;
    assert!(e.has(&x));
    assert!(e.has(&(&x + &y)));
    assert!(e.has(&(&x + &y).sin()));
    assert!(!e.has(&(&x * &y)));
    // Flattening means the sub-sum x+y is not a node of x+y+1
    let s = &x + &y + 1;
    assert!(!s.has(&(&x + &y)));
}

#[test]
fn info_flag_matrix() {
    let x = Ex::symbol("x");
    let cases: &[(Ex, InfoFlag, bool)] = &[
        (Ex::two(), InfoFlag::Integer, true),
        (Ex::two(), InfoFlag::PosInt, true),
        (Ex::numeric(-2i64), InfoFlag::PosInt, false),
        (Ex::numeric(-2i64), InfoFlag::NonNegInt, false),
        (Ex::zero(), InfoFlag::NonNegInt, true),
        (Ex::half(), InfoFlag::Rational, true),
        (Ex::numeric(0.5f64), InfoFlag::Rational, false),
        (Ex::half(), InfoFlag::Real, true),
        (Ex::i(), InfoFlag::Real, false),
        (Ex::numeric(-3i64), InfoFlag::Negative, true),
        (x.clone(), InfoFlag::Symbol, true),
        (x.clone(), InfoFlag::Numeric, false),
        (Ex::list(vec![x.clone()]), InfoFlag::List, true),
        (Ex::less(x.clone(), Ex::one()), InfoFlag::Relation, true),
    ];
    for (e, flag, expect) in cases {
        assert_eq!(e.info(*flag), *expect, "info({flag:?}) on {e}");
    }
}

#[test]
fn polynomial_info_through_composition() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let poly = (x.pow(3) * &y + y.pow(2) - 2).expand();
    assert!(poly.info(InfoFlag::Polynomial));
    assert!(poly.info(InfoFlag::RationalFunction));

    let ratfn = poly.try_div(&(&x + 1)).unwrap();
    assert!(!ratfn.info(InfoFlag::Polynomial));
    assert!(ratfn.info(InfoFlag::RationalFunction));

    assert!(!x.sin().info(InfoFlag::Polynomial));
    assert!(!x.pow(&y).info(InfoFlag::RationalFunction));
}

#[test]
fn relational_construction_does_not_decide() {
    let lhs = Ex::two() + Ex::one();
    let r = Ex::relational(lhs, Ex::three(), RelOp::Equal);
    // Both sides folded, relation preserved
    assert_eq!(r.op(0).unwrap(), Ex::three());
    assert_eq!(r.op(1).unwrap(), Ex::three());
    assert_eq!(r.kind(), Kind::Relational);
}

#[test]
fn errors_carry_their_taxonomy() {
    let x = Ex::symbol("x");
    assert!(matches!(
        x.op(5),
        Err(KernelError::Range { .. })
    ));
    assert!(matches!(
        x.subs_all(&[x.clone()], &[]),
        Err(KernelError::InvalidArgument { .. })
    ));
    assert!(matches!(
        Ex::zero().try_pow(Ex::zero()),
        Err(KernelError::Arithmetic { .. })
    ));
    assert!(matches!(
        crate::quo(&x, &Ex::zero(), &x),
        Err(KernelError::Domain { .. })
    ));
    let msg = KernelError::recursion_limit("eval").to_string();
    assert!(msg.contains("recursion"));
}

#[test]
fn evalf_maps_through_containers() {
    let l = Ex::list(vec![Ex::half(), Ex::pi()]);
    let f = l.evalf().unwrap();
    let first = f.op(0).unwrap();
    assert_eq!(first, Ex::numeric(0.5f64));
    let second = f.op(1).unwrap();
    assert!(second.as_numeric().unwrap().is_float());
}
