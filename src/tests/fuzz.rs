//! Randomized structural checks, seeded so failures are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Ex, Numeric};

fn seeded_rng() -> (StdRng, u64) {
    let seed: u64 = rand::random();
    (StdRng::seed_from_u64(seed), seed)
}

// A random polynomial over the given symbols with small integer
// coefficients and exponents.
fn random_poly(rng: &mut StdRng, vars: &[Ex], num_terms: usize) -> Ex {
    let mut terms = Vec::with_capacity(num_terms);
    for _ in 0..num_terms {
        let coeff: i64 = rng.gen_range(-9..=9);
        if coeff == 0 {
            continue;
        }
        let mut factors = vec![Ex::numeric(coeff)];
        let num_factors = rng.gen_range(1..=3);
        for _ in 0..num_factors {
            let var = &vars[rng.gen_range(0..vars.len())];
            let exp = rng.gen_range(1..=4);
            factors.push(var.pow(exp));
        }
        terms.push(crate::algebra::mul_many(factors));
    }
    crate::algebra::add_many(terms)
}

#[test]
fn construction_order_never_matters() {
    let (mut rng, seed) = seeded_rng();
    let vars: Vec<Ex> = (0..4).map(|i| Ex::symbol(format!("v{i}"))).collect();
    for _ in 0..50 {
        let mut terms = Vec::new();
        for _ in 0..rng.gen_range(2..8) {
            terms.push(random_poly(&mut rng, &vars, 3));
        }
        let forward = crate::algebra::add_many(terms.clone());
        terms.reverse();
        let backward = crate::algebra::add_many(terms);
        assert_eq!(forward, backward, "seed {seed}");
        assert_eq!(forward.hash_value(), backward.hash_value(), "seed {seed}");
    }
}

#[test]
fn expand_preserves_exact_values() {
    let (mut rng, seed) = seeded_rng();
    let vars: Vec<Ex> = (0..3).map(|i| Ex::symbol(format!("w{i}"))).collect();
    for _ in 0..25 {
        let p = random_poly(&mut rng, &vars, 4);
        let q = random_poly(&mut rng, &vars, 3);
        let e = (&p * &q) + p.pow(2);
        let expanded = e.expand();

        // Evaluate both forms at random small rationals; an expansion bug
        // would show up as a value mismatch.
        let points: Vec<Ex> = vars
            .iter()
            .map(|_| Ex::numeric(Numeric::ratio(rng.gen_range(-5..=5), rng.gen_range(1..=4))))
            .collect();
        let v1 = e.subs_all(&vars, &points).unwrap();
        let v2 = expanded.subs_all(&vars, &points).unwrap();
        assert_eq!(v1, v2, "seed {seed}");
    }
}

#[test]
fn archive_round_trips_random_trees() {
    let (mut rng, seed) = seeded_rng();
    let vars: Vec<Ex> = (0..3).map(|i| Ex::symbol(format!("u{i}"))).collect();
    for _ in 0..25 {
        let p = random_poly(&mut rng, &vars, 5);
        let e = if rng.gen_bool(0.5) { p.sin() } else { p };
        let mut a = crate::Archive::new();
        a.archive_ex("f", &e);
        let b = crate::Archive::from_bytes(&a.to_bytes()).unwrap();
        let back = b.unarchive_ex("f", &vars).unwrap();
        assert_eq!(back, e, "seed {seed}");
    }
}

#[test]
fn gcd_always_divides_random_inputs() {
    let (mut rng, seed) = seeded_rng();
    let x = Ex::symbol("x");
    for _ in 0..15 {
        let a = random_poly(&mut rng, std::slice::from_ref(&x), 3);
        let b = random_poly(&mut rng, std::slice::from_ref(&x), 3);
        if a.is_zero() || b.is_zero() {
            continue;
        }
        let g = crate::gcd(&a, &b).unwrap();
        assert!(
            crate::divide(&a.expand(), &g).unwrap().is_some(),
            "seed {seed}: gcd does not divide a"
        );
        assert!(
            crate::divide(&b.expand(), &g).unwrap().is_some(),
            "seed {seed}: gcd does not divide b"
        );
    }
}
