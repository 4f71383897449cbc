//! The weight-two newform of level eleven, end to end.
//!
//! The symbol with generator values (-1/5, 1, 0) on the Manin generators of
//! Γ₀(11) is the classical modular symbol attached to the isogeny class of
//! the elliptic curve of conductor 11, so its values, evaluations and Hecke
//! eigenvalues a₂ = -2, a₃ = -1, a₅ = 1 are all known in closed form.

use std::sync::Arc;

use modsym::{
    rational, CoefficientModule, HeckeAlgorithm, ManinMap, ManinRelations, Matrix2x2, Rational,
    SymPower,
};
use rstest::rstest;

fn q(n: i64, d: i64) -> Vec<Rational> {
    vec![rational(n, d)]
}

fn eigensymbol() -> ManinMap<SymPower> {
    let relations = Arc::new(ManinRelations::new(11).unwrap());
    assert_eq!(relations.ngens(), 3);
    ManinMap::from_generator_values(
        Arc::new(SymPower::new(0)),
        relations,
        vec![q(-1, 5), q(1, 1), q(0, 1)],
    )
    .unwrap()
}

#[test]
fn full_data_matches_the_known_table() {
    let phi = eigensymbol();
    phi.compute_full_data().unwrap();
    let expected = [
        (-1, 5),
        (1, 5),
        (0, 1),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 1),
        (-1, 1),
        (0, 1),
        (1, 1),
        (1, 1),
        (0, 1),
    ];
    for (b, &(n, d)) in phi.relations().coset_reps().iter().zip(&expected) {
        assert_eq!(phi.value_at(b).unwrap(), q(n, d), "at {b}");
    }
}

#[test]
fn evaluation_at_arbitrary_matrices() {
    let phi = eigensymbol();
    assert_eq!(phi.evaluate(&Matrix2x2::new(1, 2, 3, 7)).unwrap(), q(-1, 1));
    assert_eq!(
        phi.evaluate(&Matrix2x2::new(2, 1, 11, 6)).unwrap(),
        q(-1, 5)
    );
    assert_eq!(phi.evaluate(&Matrix2x2::sigma()).unwrap(), q(1, 5));
    // the identity path is the degenerate path from 0 to ∞
    assert_eq!(
        phi.evaluate(&Matrix2x2::identity()).unwrap(),
        phi.value_at(&Matrix2x2::identity()).unwrap()
    );
}

#[test]
fn evaluate_agrees_with_value_at_on_representatives() {
    let phi = eigensymbol();
    for b in phi.relations().coset_reps() {
        assert_eq!(phi.evaluate(b).unwrap(), phi.value_at(b).unwrap(), "at {b}");
    }
}

#[rstest]
#[case(2, -2)]
#[case(3, -1)]
#[case(5, 1)]
fn hecke_eigenvalues(#[case] ell: i64, #[case] eigenvalue: i64) {
    let phi = eigensymbol();
    let lambda = rational(eigenvalue, 1);
    for algorithm in [HeckeAlgorithm::Naive, HeckeAlgorithm::Prep] {
        let image = phi.hecke(ell, algorithm).unwrap();
        for (got, original) in image.generator_values().zip(phi.generator_values()) {
            let original = original.unwrap();
            let scaled = phi.codomain().scale(&original, &lambda);
            assert_eq!(got.unwrap(), scaled, "ell={ell} {algorithm:?}");
        }
    }
}

#[test]
fn eigenvalue_extraction_via_find_scalar() {
    let phi = eigensymbol();
    let image = phi.hecke(2, HeckeAlgorithm::Prep).unwrap();
    let reference = phi.value_at(phi.relations().gen_rep(0)).unwrap();
    let got = image.value_at(phi.relations().gen_rep(0)).unwrap();
    assert_eq!(
        phi.codomain().find_scalar(&reference, &got),
        Ok(rational(-2, 1))
    );
}

#[test]
fn hecke_two_pinned_generator_values() {
    let phi = eigensymbol();
    let image = phi.hecke(2, HeckeAlgorithm::Prep).unwrap();
    let got: Vec<_> = image
        .generator_values()
        .collect::<anyhow::Result<_>>()
        .unwrap();
    assert_eq!(got, vec![q(2, 5), q(-2, 1), q(0, 1)]);
}
