//! Rational canonicalization and the polynomial layer, end to end.

use crate::{Ex, divide, gcd, lcm, prem, quo, rem, sqrfree};

#[test]
fn normal_cancels_common_factors() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    // (x^2 - y^2) / (x - y) -> x + y
    let e = (x.pow(2) - y.pow(2)).try_div(&(&x - &y)).unwrap();
    assert_eq!(e.normal().unwrap(), &x + &y);
}

#[test]
fn normal_idempotence() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let cases = [
        (x.pow(3) - 1).try_div(&(&x - 1)).unwrap(),
        (2 * &x + 2 * &y).try_div(&(4 * &x)).unwrap(),
        Ex::one().try_div(&(&x + 1)).unwrap() + Ex::one().try_div(&(&x - 1)).unwrap(),
    ];
    for e in cases {
        let n1 = e.normal().unwrap();
        assert_eq!(n1.normal().unwrap(), n1);
    }
}

#[test]
fn normal_combines_fractions() {
    let x = Ex::symbol("x");
    // 1/(x+1) + 1/(x-1) = 2x/(x^2-1)
    let e = Ex::one().try_div(&(&x + 1)).unwrap() + Ex::one().try_div(&(&x - 1)).unwrap();
    let (num, den) = e.numer_denom().unwrap();
    assert_eq!(num, (2 * &x).expand());
    assert_eq!(den, (x.pow(2) - 1).expand());
}

#[test]
fn normal_with_rational_coefficients() {
    let x = Ex::symbol("x");
    let e = &x / 2 + Ex::half();
    let (num, den) = e.numer_denom().unwrap();
    assert_eq!(num, (&x + 1).expand());
    assert_eq!(den, Ex::two());
}

#[test]
fn gcd_cofactor_property() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let a = ((&x + &y).pow(2) * (&x - &y) * (2 * &x + 1)).expand();
    let b = ((&x + &y) * (&x - &y).pow(2) * 3).expand();
    let g = gcd(&a, &b).unwrap();
    let qa = divide(&a, &g).unwrap().expect("gcd divides a");
    let qb = divide(&b, &g).unwrap().expect("gcd divides b");
    assert!(gcd(&qa, &qb).unwrap().is_one());
    assert_eq!(g, ((&x + &y) * (&x - &y)).expand());
}

#[test]
fn lcm_times_gcd_is_product() {
    let x = Ex::symbol("x");
    let a = ((&x + 1) * (&x + 2)).expand();
    let b = ((&x + 2).pow(2)).expand();
    let g = gcd(&a, &b).unwrap();
    let l = lcm(&a, &b).unwrap();
    let lhs = (&g * &l).expand();
    let rhs = (&a * &b).expand();
    // Equal up to a unit; both sides positively led here.
    assert_eq!(lhs, rhs);
}

#[test]
fn euclidean_division_invariant() {
    let x = Ex::symbol("x");
    let a = (x.pow(4) - 3 * x.pow(2) + &x - 5).expand();
    let b = (x.pow(2) + &x + 1).expand();
    let q = quo(&a, &b, &x).unwrap();
    let r = rem(&a, &b, &x).unwrap();
    assert!((&a - &(&(&q * &b).expand() + &r)).expand().is_zero());
    assert!(r.degree(&x) < b.degree(&x));
}

#[test]
fn pseudo_remainder_divisor_errors() {
    let x = Ex::symbol("x");
    let a = x.pow(2);
    assert!(prem(&a, &Ex::zero(), &x).is_err());
    assert!(quo(&a, &Ex::zero(), &x).is_err());
    assert!(rem(&a, &Ex::zero(), &x).is_err());
}

#[test]
fn exact_division_detects_non_divisors() {
    let x = Ex::symbol("x");
    let a = (x.pow(2) - 1).expand();
    assert!(divide(&a, &(&x - 1).expand()).unwrap().is_some());
    assert!(divide(&a, &(&x - 2).expand()).unwrap().is_none());
    assert!(divide(&a, &Ex::zero()).is_err());
}

#[test]
fn sqrfree_multiplicity_ladder() {
    let x = Ex::symbol("x");
    let e = (1 + &x) * (2 + &x).pow(2) * (3 + &x).pow(3) * (4 + &x).pow(4);
    let s = sqrfree(&e.expand(), &x).unwrap();
    assert_eq!(s, e);
    // And the decomposition is idempotent through expansion
    assert_eq!(s.expand(), e.expand());
}

#[test]
fn content_primpart_multivariate() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    // content of 2y*x^2 + 4y^2*x in x is 2y
    let p = (2 * &y * x.pow(2) + 4 * y.pow(2) * &x).expand();
    let c = crate::content(&p, &x).unwrap();
    assert_eq!(c, (2 * &y).expand());
    let pp = crate::primpart(&p, &x).unwrap();
    assert_eq!(pp, (x.pow(2) + 2 * &y * &x).expand());
}
