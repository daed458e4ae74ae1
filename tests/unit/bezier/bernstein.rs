use super::*;

fn exact_factorial(n: u32) -> u128 {
    (1..=u128::from(n)).product()
}

#[test]
fn factorial_matches_exact_integers() {
    let basis = BernsteinBasis::new();
    for n in 0..=32u32 {
        let got = basis.factorial(n as i32).unwrap();
        assert_eq!(got, exact_factorial(n) as f64, "n = {n}");
    }
}

#[test]
fn factorial_known_values() {
    let basis = BernsteinBasis::new();
    assert_eq!(basis.factorial(0).unwrap(), 1.0);
    assert_eq!(basis.factorial(1).unwrap(), 1.0);
    assert_eq!(basis.factorial(5).unwrap(), 120.0);
    assert_eq!(basis.factorial(20).unwrap(), 2_432_902_008_176_640_000.0);
}

#[test]
fn factorial_rejects_out_of_range() {
    let basis = BernsteinBasis::new();
    for n in [-1, -32, 33, 100] {
        let err = basis.factorial(n).unwrap_err();
        assert!(matches!(err, FlightError::Domain(_)), "n = {n}: {err}");
    }
}

#[test]
fn binomial_small_values() {
    let basis = BernsteinBasis::new();
    assert_eq!(basis.binomial(4, 2).unwrap(), 6.0);
    assert_eq!(basis.binomial(5, 0).unwrap(), 1.0);
    assert_eq!(basis.binomial(5, 5).unwrap(), 1.0);
    let c = basis.binomial(32, 16).unwrap();
    assert!((c - 601_080_390.0).abs() < 1e-3, "{c}");
}

#[test]
fn binomial_with_i_greater_than_n_is_domain_error() {
    let basis = BernsteinBasis::new();
    assert!(matches!(
        basis.binomial(3, 4),
        Err(FlightError::Domain(_))
    ));
}

#[test]
fn bernstein_endpoints() {
    let basis = BernsteinBasis::new();
    for n in 0..=32 {
        for i in 0..=n {
            let at0 = basis.bernstein(n, i, 0.0).unwrap();
            let at1 = basis.bernstein(n, i, 1.0).unwrap();
            assert_eq!(at0, if i == 0 { 1.0 } else { 0.0 }, "n={n} i={i}");
            assert_eq!(at1, if i == n { 1.0 } else { 0.0 }, "n={n} i={i}");
        }
    }
}

#[test]
fn bernstein_partition_of_unity() {
    let basis = BernsteinBasis::new();
    for n in 0..=32 {
        for step in 0..=20 {
            let t = f64::from(step) / 20.0;
            let sum: f64 = (0..=n).map(|i| basis.bernstein(n, i, t).unwrap()).sum();
            assert!((sum - 1.0).abs() < 1e-9, "n={n} t={t} sum={sum}");
        }
    }
}

#[test]
fn bernstein_is_never_nan() {
    let basis = BernsteinBasis::new();
    for n in 0..=32 {
        for i in 0..=n {
            for t in [0.0, 1e-12, 0.5, 1.0 - 1e-12, 1.0] {
                assert!(basis.bernstein(n, i, t).unwrap().is_finite());
            }
        }
    }
}

#[test]
fn factorial_max_is_table_size() {
    assert_eq!(BernsteinBasis::default().factorial_max(), 33);
}
