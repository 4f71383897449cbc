//! Manin's continued-fraction trick.
//!
//! The divisor {r/s} − {∞} on the boundary of the upper half plane is a sum
//! of "unimodular paths", i.e. paths between consecutive continued-fraction
//! convergents of r/s. Each such path is recorded as a determinant-one
//! matrix whose columns are the endpoints; the signed boundary divisors of
//! the returned matrices telescope to {r/s} − {∞}.

use itertools::Itertools;

use crate::matrix::Matrix2x2;

/// Continued-fraction convergents p₀/q₀, …, pₖ/qₖ of r/s, the last being
/// r/s in lowest terms with a positive denominator.
///
/// # Panics
///
/// Panics if `s` is zero.
pub fn convergents(r: i64, s: i64) -> Vec<(i64, i64)> {
    assert!(s != 0, "convergents of a rational with denominator zero");
    let (mut r, mut s) = if s < 0 { (-r, -s) } else { (r, s) };
    let mut digits = Vec::new();
    while s != 0 {
        let a = r.div_euclid(s);
        digits.push(a);
        let t = r - a * s;
        r = s;
        s = t;
    }
    let mut out = Vec::with_capacity(digits.len());
    let (mut pm1, mut qm1) = (1, 0);
    let (mut p, mut q) = (digits[0], 1);
    out.push((p, q));
    for &a in &digits[1..] {
        let (p2, q2) = (a * p + pm1, a * q + qm1);
        pm1 = p;
        qm1 = q;
        p = p2;
        q = q2;
        out.push((p, q));
    }
    out
}

/// Matrices whose boundary divisors telescope to {r/s} − {∞}.
///
/// Returns the empty sequence when s = 0, since the point is already ∞. All
/// returned matrices have determinant one by the convergent recurrence.
pub fn unimodular_path_to_infinity(r: i64, s: i64) -> Vec<Matrix2x2> {
    if s == 0 {
        return Vec::new();
    }
    let conv = convergents(r, s);
    let mut v = vec![Matrix2x2::new(1, conv[0].0, 0, conv[0].1)];
    let mut sign = -1;
    for ((a, c), (b, d)) in conv.iter().copied().tuple_windows() {
        v.push(Matrix2x2::new(sign * a, b, sign * c, d));
        sign = -sign;
    }
    v
}

/// The mirrored decomposition: matrices whose boundary divisors telescope to
/// {∞} − {r/s}.
pub fn unimodular_path_from_infinity(r: i64, s: i64) -> Vec<Matrix2x2> {
    if s == 0 {
        return Vec::new();
    }
    let conv = convergents(r, s);
    let mut v = vec![Matrix2x2::new(-conv[0].0, 1, -conv[0].1, 0)];
    let mut sign = -1;
    for ((a, c), (b, d)) in conv.iter().copied().tuple_windows() {
        v.push(Matrix2x2::new(-b, sign * a, -d, sign * c));
        sign = -sign;
    }
    v
}
