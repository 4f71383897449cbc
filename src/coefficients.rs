//! Coefficient modules: the codomains of Manin maps.
//!
//! A coefficient module is a ℚ-vector space with a right action of 2×2
//! integer matrices. The engine only ever manipulates values through the
//! [`CoefficientModule`] trait, so p-adic distribution modules can plug in
//! behind the same seam; the concrete module provided here is Sym^k of the
//! standard representation over ℚ, the classical weight-(k+2) codomain.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use sl2z::Matrix2x2;

use crate::error::NotScalarMultiple;

pub type Rational = BigRational;

/// Convenience constructor for test data and defining values.
pub fn rational(numer: i64, denom: i64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

/// The codomain contract: a zero element, linear structure, a right matrix
/// action, an in-place normalization, and eigenvalue extraction.
pub trait CoefficientModule {
    type Element: Clone + PartialEq + std::fmt::Debug;

    fn zero(&self) -> Self::Element;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    fn scale(&self, a: &Self::Element, c: &Rational) -> Self::Element;

    /// The right action `a * g` of an integer matrix on a value.
    fn act_right(&self, a: &Self::Element, g: &Matrix2x2) -> Self::Element;

    /// Reduce a value to its normal form in place. The classical modules
    /// have nothing to do here; p-adic codomains truncate moments.
    fn normalize(&self, _a: &mut Self::Element) {}

    /// Find the scalar c with `b = c · a`, used by eigenvalue extraction.
    fn find_scalar(&self, a: &Self::Element, b: &Self::Element)
        -> Result<Rational, NotScalarMultiple>;
}

/// Sym^k of the standard representation of SL₂ over ℚ.
///
/// Elements are polynomials of degree ≤ k in one variable, stored as
/// coefficient vectors of length k + 1 in increasing degree. The right
/// action is the weight-k slash action
/// (P|γ)(z) = (cz + d)^k · P((az + b)/(cz + d)). For k = 0 the action is
/// trivial and the module is ℚ itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymPower {
    weight: usize,
}

impl SymPower {
    pub fn new(weight: usize) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> usize {
        self.weight
    }

    pub fn element(&self, coeffs: Vec<Rational>) -> Vec<Rational> {
        assert_eq!(
            coeffs.len(),
            self.weight + 1,
            "Sym^{} element needs {} coefficients",
            self.weight,
            self.weight + 1
        );
        coeffs
    }
}

fn poly_mul(p: &[Rational], q: &[Rational]) -> Vec<Rational> {
    let mut out = vec![Rational::zero(); p.len() + q.len() - 1];
    for (i, a) in p.iter().enumerate() {
        if a.is_zero() {
            continue;
        }
        for (j, b) in q.iter().enumerate() {
            out[i + j] += a * b;
        }
    }
    out
}

impl CoefficientModule for SymPower {
    type Element = Vec<Rational>;

    fn zero(&self) -> Self::Element {
        vec![Rational::zero(); self.weight + 1]
    }

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.iter().zip(b).map(|(x, y)| x + y).collect()
    }

    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.iter().zip(b).map(|(x, y)| x - y).collect()
    }

    fn scale(&self, a: &Self::Element, c: &Rational) -> Self::Element {
        a.iter().map(|x| x * c).collect()
    }

    fn act_right(&self, a: &Self::Element, g: &Matrix2x2) -> Self::Element {
        let k = self.weight;
        let num = [
            Rational::from_integer(BigInt::from(g.b())),
            Rational::from_integer(BigInt::from(g.a())),
        ];
        let den = [
            Rational::from_integer(BigInt::from(g.d())),
            Rational::from_integer(BigInt::from(g.c())),
        ];
        let mut out = vec![Rational::zero(); k + 1];
        for (i, coeff) in a.iter().enumerate() {
            if coeff.is_zero() {
                continue;
            }
            // (az + b)^i (cz + d)^(k−i)
            let mut poly = vec![Rational::one()];
            for _ in 0..i {
                poly = poly_mul(&poly, &num);
            }
            for _ in 0..k - i {
                poly = poly_mul(&poly, &den);
            }
            for (j, pc) in poly.into_iter().enumerate() {
                out[j] += coeff * pc;
            }
        }
        out
    }

    fn find_scalar(
        &self,
        a: &Self::Element,
        b: &Self::Element,
    ) -> Result<Rational, NotScalarMultiple> {
        let Some(pivot) = a.iter().position(|x| !x.is_zero()) else {
            // cannot determine a scalar against the zero element
            return Err(NotScalarMultiple);
        };
        let c = &b[pivot] / &a[pivot];
        for (x, y) in a.iter().zip(b) {
            if x * &c != *y {
                return Err(NotScalarMultiple);
            }
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elt(v: &[(i64, i64)]) -> Vec<Rational> {
        v.iter().map(|&(n, d)| rational(n, d)).collect()
    }

    #[test]
    fn weight_zero_action_is_trivial() {
        let d = SymPower::new(0);
        let x = elt(&[(-1, 5)]);
        for g in [
            Matrix2x2::new(1, 2, 3, 7),
            Matrix2x2::new(2, 0, 0, 1),
            Matrix2x2::sigma(),
        ] {
            assert_eq!(d.act_right(&x, &g), x);
        }
    }

    #[test]
    fn slash_action_composes() {
        let d = SymPower::new(3);
        let x = elt(&[(1, 2), (0, 1), (-3, 1), (2, 5)]);
        let g1 = Matrix2x2::new(1, 2, 0, 1);
        let g2 = Matrix2x2::new(1, 0, 3, 1);
        assert_eq!(
            d.act_right(&d.act_right(&x, &g1), &g2),
            d.act_right(&x, &(g1 * g2))
        );
    }

    #[test]
    fn identity_acts_trivially() {
        let d = SymPower::new(4);
        let x = elt(&[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1)]);
        assert_eq!(d.act_right(&x, &Matrix2x2::identity()), x);
    }

    #[test]
    fn diagonal_action_on_monomials() {
        // z^i | diag(a, d) = (a z)^i d^(k-i)
        let d = SymPower::new(2);
        let x = elt(&[(0, 1), (1, 1), (0, 1)]);
        let g = Matrix2x2::new(2, 0, 0, 3);
        assert_eq!(d.act_right(&x, &g), elt(&[(0, 1), (6, 1), (0, 1)]));
    }

    #[test]
    fn find_scalar_round_trip() {
        let d = SymPower::new(1);
        let x = elt(&[(3, 2), (-1, 7)]);
        let y = d.scale(&x, &rational(-2, 1));
        assert_eq!(d.find_scalar(&x, &y), Ok(rational(-2, 1)));
    }

    #[test]
    fn find_scalar_rejects_inconsistent_values() {
        let d = SymPower::new(1);
        let x = elt(&[(1, 1), (1, 1)]);
        let y = elt(&[(2, 1), (3, 1)]);
        assert_eq!(d.find_scalar(&x, &y), Err(NotScalarMultiple));
        assert_eq!(d.find_scalar(&d.zero(), &x), Err(NotScalarMultiple));
    }
}
