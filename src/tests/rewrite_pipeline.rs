//! Expansion, substitution, differentiation, evaluation, series.

use crate::{Ex, InfoFlag};

#[test]
fn expand_distributes_deeply() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let z = Ex::symbol("z");
    let e = ((&x + &y) * (&y + &z) * (&z + &x)).expand();
    // 8 monomials, two of which merge: x^2 y, x^2 z, x y^2, y^2 z, x z^2,
    // y z^2 and 2xyz
    assert_eq!(e.nops(), 7);
    assert!(e.info(InfoFlag::Polynomial));
}

#[test]
fn expand_idempotence() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let e = ((&x + &y).pow(4) * (&x - &y)).expand();
    assert_eq!(e.expand(), e);
}

#[test]
fn subs_whole_node_matching() {
    let x = Ex::symbol("x");
    let y = Ex::symbol("y");
    let p = x.pow(2) + &y;
    // x^2 matches as a node
    let r = p.subs(&x.pow(2), &Ex::one()).unwrap();
    assert_eq!(r, 1 + &y);
    // x matches inside x^2
    let r2 = p.subs(&x, &Ex::two()).unwrap();
    assert_eq!(r2, 4 + &y);
}

#[test]
fn subs_rebuilds_canonically() {
    let a = Ex::symbol("a");
    let b = Ex::symbol("b");
    let e = &a * &b + &b;
    let r = e.subs(&a, &Ex::minus_one()).unwrap();
    assert!(r.is_zero());
}

#[test]
fn diff_linearity_and_leibniz() {
    let x = Ex::symbol("x");
    let f = x.pow(3).sin();
    let g = x.pow(2);
    let sum = &f + &g;
    let dsum = sum.diff(&x).unwrap();
    assert_eq!(dsum, f.diff(&x).unwrap() + g.diff(&x).unwrap());

    let prod = &f * &g;
    let dprod = prod.diff(&x).unwrap();
    let leibniz = f.diff(&x).unwrap() * &g + &f * g.diff(&x).unwrap();
    assert!((dprod - leibniz).expand().is_zero());
}

#[test]
fn diff_of_square_is_twice() {
    let s = Ex::symbol("s");
    let x = (1 + &s).sin() * (2 - &s);
    let lhs = (&x * &x).diff(&s).unwrap().expand();
    let rhs = (2 * &x * x.diff(&s).unwrap()).expand();
    assert!((lhs - rhs).expand().is_zero());
}

#[test]
fn higher_derivatives() {
    let x = Ex::symbol("x");
    let e = x.pow(5);
    assert_eq!(e.diff_n(&x, 5).unwrap(), Ex::numeric(120i64));
    assert!(e.diff_n(&x, 6).unwrap().is_zero());
}

#[test]
fn eval_levels() {
    let x = Ex::symbol("x");
    let e = (&x + 1) * (&x + 2);
    assert_eq!(e.eval(1).unwrap(), e);
    assert_eq!(e.eval(0).unwrap(), e);
    assert!(e.eval(-(crate::MAX_RECURSION_DEPTH as i32)).is_err());
}

#[test]
fn evalf_trig_identity() {
    let x = Ex::symbol("x");
    let e = x.sin().pow(2) + x.cos().pow(2);
    let v = e
        .subs(&x, &Ex::numeric(0.7f64))
        .unwrap()
        .evalf()
        .unwrap();
    let n = v.as_numeric().expect("numeric result").to_f64();
    assert!((n - 1.0).abs() < 1e-12);
}

#[test]
fn float_precision_digits_global() {
    crate::set_digits(30);
    assert_eq!(crate::digits(), crate::DEFAULT_DIGITS);
    crate::set_digits(10);
    assert_eq!(crate::digits(), 10);
    crate::set_digits(crate::DEFAULT_DIGITS);
}

#[test]
fn series_of_quotient() {
    let x = Ex::symbol("x");
    // x/(1-x) = x + x^2 + x^3 + ...
    let e = (&x).try_div(&(1 - &x)).unwrap();
    let s = e.series(&x, 0, 4).unwrap();
    let poly = s.as_series().unwrap().to_ex().unwrap();
    assert_eq!(poly, &x + x.pow(2) + x.pow(3));
}

#[test]
fn series_around_nonzero_point() {
    let x = Ex::symbol("x");
    let e = x.pow(2);
    let s = e.series(&x, 1, 3).unwrap();
    let poly = s.as_series().unwrap().to_ex().unwrap();
    // 1 + 2(x-1) + (x-1)^2
    assert_eq!(poly.expand(), e.expand());
}

#[test]
fn series_diff_consistency() {
    let x = Ex::symbol("x");
    let s = x.exp().series(&x, 0, 5).unwrap();
    let ds = s.diff(&x).unwrap();
    let ser = ds.as_series().expect("series derivative stays a series");
    // d/dx (1 + x + x^2/2 + x^3/6 + x^4/24 + O(x^5))
    //     = 1 + x + x^2/2 + x^3/6 + O(x^4)
    assert_eq!(ser.order, 4);
    let poly = ser.to_ex().unwrap();
    let expect = 1 + &x + x.pow(2) / 2 + x.pow(3) / 6;
    assert_eq!(poly, expect);
}
