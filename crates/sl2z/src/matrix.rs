use std::fmt;
use std::ops::{Mul, Neg};

/// An immutable 2×2 integer matrix, stored row-major as `[a, b, c, d]` for
/// `[[a, b], [c, d]]`.
///
/// Equality and hashing are keyed on the four entries, so values can serve
/// as dictionary keys for maps defined on coset representatives.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Matrix2x2 {
    entries: [i64; 4],
}

impl Matrix2x2 {
    pub const fn new(a: i64, b: i64, c: i64, d: i64) -> Self {
        Self {
            entries: [a, b, c, d],
        }
    }

    pub const fn identity() -> Self {
        Self::new(1, 0, 0, 1)
    }

    /// The order-four elliptic element σ = [[0, −1], [1, 0]], acting on the
    /// upper half plane by z ↦ −1/z.
    pub const fn sigma() -> Self {
        Self::new(0, -1, 1, 0)
    }

    /// The order-three elliptic element τ = [[0, −1], [1, −1]], rotating the
    /// ideal triangle with vertices 0, 1, ∞.
    pub const fn tau() -> Self {
        Self::new(0, -1, 1, -1)
    }

    pub const fn a(&self) -> i64 {
        self.entries[0]
    }

    pub const fn b(&self) -> i64 {
        self.entries[1]
    }

    pub const fn c(&self) -> i64 {
        self.entries[2]
    }

    pub const fn d(&self) -> i64 {
        self.entries[3]
    }

    pub const fn entries(&self) -> [i64; 4] {
        self.entries
    }

    pub const fn det(&self) -> i64 {
        self.a() * self.d() - self.b() * self.c()
    }

    pub const fn is_unimodular(&self) -> bool {
        matches!(self.det(), 1 | -1)
    }

    /// Inverse of a determinant-±1 matrix, computed without division.
    ///
    /// # Panics
    ///
    /// Panics if the determinant is not ±1.
    pub fn inverse_unit(&self) -> Self {
        match self.det() {
            1 => Self::new(self.d(), -self.b(), -self.c(), self.a()),
            -1 => Self::new(-self.d(), self.b(), self.c(), -self.a()),
            det => panic!("inverse_unit of a matrix with determinant {det}"),
        }
    }
}

impl Mul for Matrix2x2 {
    type Output = Matrix2x2;

    fn mul(self, rhs: Matrix2x2) -> Matrix2x2 {
        Matrix2x2::new(
            self.a() * rhs.a() + self.b() * rhs.c(),
            self.a() * rhs.b() + self.b() * rhs.d(),
            self.c() * rhs.a() + self.d() * rhs.c(),
            self.c() * rhs.b() + self.d() * rhs.d(),
        )
    }
}

impl Mul for &Matrix2x2 {
    type Output = Matrix2x2;

    fn mul(self, rhs: &Matrix2x2) -> Matrix2x2 {
        *self * *rhs
    }
}

impl Neg for Matrix2x2 {
    type Output = Matrix2x2;

    fn neg(self) -> Matrix2x2 {
        Matrix2x2::new(-self.a(), -self.b(), -self.c(), -self.d())
    }
}

impl fmt::Display for Matrix2x2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[[{}, {}], [{}, {}]]",
            self.a(),
            self.b(),
            self.c(),
            self.d()
        )
    }
}

impl fmt::Debug for Matrix2x2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_and_determinant() {
        let s = Matrix2x2::sigma();
        let t = Matrix2x2::tau();
        assert_eq!(s.det(), 1);
        assert_eq!(t.det(), 1);
        assert_eq!(s * s, -Matrix2x2::identity());
        assert_eq!(t * t * t, Matrix2x2::identity());
        let u = Matrix2x2::new(1, 2, 3, 7);
        assert_eq!(u * Matrix2x2::identity(), u);
        assert_eq!((s * u).det(), u.det());
    }

    #[test]
    fn inverse_of_unimodular() {
        for m in [
            Matrix2x2::sigma(),
            Matrix2x2::tau(),
            Matrix2x2::new(1, 2, 3, 7),
            Matrix2x2::new(2, 1, 7, 3),
            Matrix2x2::new(-5, -1, 11, 2),
        ] {
            assert!(m.is_unimodular());
            assert_eq!(m * m.inverse_unit(), Matrix2x2::identity());
            assert_eq!(m.inverse_unit() * m, Matrix2x2::identity());
        }
    }

    #[test]
    #[should_panic(expected = "determinant 2")]
    fn inverse_of_non_unit_panics() {
        Matrix2x2::new(1, 0, 0, 2).inverse_unit();
    }

    #[test]
    fn display() {
        assert_eq!(
            Matrix2x2::new(1, -2, 0, 11).to_string(),
            "[[1, -2], [0, 11]]"
        );
    }
}
