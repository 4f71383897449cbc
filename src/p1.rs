//! The projective line P¹(ℤ/Nℤ).
//!
//! Right cosets of Γ₀(N) in SL₂(ℤ) are in bijection with P¹(ℤ/Nℤ) via the
//! bottom row of a matrix, so a canonical enumeration of P¹ classes with
//! O(1) index lookup is the backbone of the coset-representative table.

use anyhow::{ensure, Result};
use rustc_hash::FxHashMap;
use sl2z::Matrix2x2;

pub(crate) fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a.rem_euclid(b.abs());
        a = b.abs();
        b = t;
    }
    a.abs()
}

/// Extended Euclid: returns (g, x, y) with a·x + b·y = g.
pub(crate) fn xgcd(mut a: i64, mut b: i64) -> (i64, i64, i64) {
    let (mut x0, mut x1, mut y0, mut y1) = (1, 0, 0, 1);
    while b != 0 {
        let q = a.div_euclid(b);
        let r = a - q * b;
        a = b;
        b = r;
        let (nx, ny) = (x0 - q * x1, y0 - q * y1);
        x0 = x1;
        x1 = nx;
        y0 = y1;
        y1 = ny;
    }
    (a, x0, y0)
}

/// Canonical representative of the class of (u : v) in P¹(ℤ/Nℤ), or
/// `None` if gcd(u, v, N) > 1 so the pair defines no class.
pub fn p1_normalize(n: i64, u: i64, v: i64) -> Option<(i64, i64)> {
    if n == 1 {
        return Some((0, 0));
    }
    let u = u.rem_euclid(n);
    let v = v.rem_euclid(n);
    if u == 0 {
        return if gcd(v, n) == 1 { Some((0, 1)) } else { None };
    }
    let (g, s, _) = xgcd(u, n);
    let mut s = s.rem_euclid(n);
    if gcd(g, v) != 1 {
        return None;
    }
    // s·u ≡ g (mod N), but s need not be a unit mod N; shift it by N/g until
    // it is, so that scaling by s stays within the class
    if g != 1 {
        let d = n / g;
        while gcd(s, n) != 1 {
            s = (s + d).rem_euclid(n);
        }
    }
    let mut v = (s * v).rem_euclid(n);
    // the stabilizer of the first coordinate still acts; take the minimal
    // second coordinate over units t ≡ 1 mod N/g
    if g != 1 {
        let ng = n / g;
        let vng = (v * ng).rem_euclid(n);
        let mut t = 1;
        let mut min_v = v;
        for _ in 2..=g {
            v = (v + vng).rem_euclid(n);
            t = (t + ng).rem_euclid(n);
            if v < min_v && gcd(t, n) == 1 {
                min_v = v;
            }
        }
        v = min_v;
    }
    Some((g, v))
}

/// Lift a pair (c, d) with gcd(c, d, N) = 1 to an SL₂(ℤ) matrix whose bottom
/// row is congruent to (c, d) mod N.
pub fn lift_to_sl2z(c: i64, d: i64, n: i64) -> Matrix2x2 {
    if n == 1 {
        return Matrix2x2::identity();
    }
    let (g, z1, z2) = xgcd(c, d);
    if g == 1 {
        return Matrix2x2::new(z2, -z1, c, d);
    }
    let mut c = c;
    let mut d = d;
    if c == 0 {
        c += n;
    }
    if d == 0 {
        d += n;
    }
    // strip from c the primes it shares with d and with N; adding N times
    // the rest to d makes the pair coprime
    let mut m = c;
    loop {
        let g2 = gcd(m, d);
        if g2 == 1 {
            break;
        }
        m /= g2;
    }
    loop {
        let g2 = gcd(m, n);
        if g2 == 1 {
            break;
        }
        m /= g2;
    }
    d += n * m;
    let (g, z1, z2) = xgcd(c, d);
    debug_assert_eq!(g, 1);
    Matrix2x2::new(z2, -z1, c, d)
}

/// An enumeration of P¹(ℤ/Nℤ) in a stable order with O(1) index lookup.
pub struct P1List {
    n: i64,
    classes: Vec<(i64, i64)>,
    index: FxHashMap<(i64, i64), usize>,
}

impl P1List {
    pub fn new(n: i64) -> Result<Self> {
        ensure!(n >= 1, "level must be a positive integer, got {n}");
        let mut classes = Vec::new();
        let mut index = FxHashMap::default();
        if n == 1 {
            classes.push((0, 0));
            index.insert((0, 0), 0);
        } else {
            for u in 0..n {
                for v in 0..n {
                    if let Some(x) = p1_normalize(n, u, v) {
                        if !index.contains_key(&x) {
                            index.insert(x, classes.len());
                            classes.push(x);
                        }
                    }
                }
            }
        }
        Ok(Self { n, classes, index })
    }

    pub fn n(&self) -> i64 {
        self.n
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[(i64, i64)] {
        &self.classes
    }

    /// Index of the class of (u : v), or `None` if the pair defines no class.
    pub fn index(&self, u: i64, v: i64) -> Option<usize> {
        let x = p1_normalize(self.n, u, v)?;
        self.index.get(&x).copied()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, 1)]
    #[case(2, 3)]
    #[case(3, 4)]
    #[case(5, 6)]
    #[case(6, 12)]
    #[case(11, 12)]
    #[case(12, 24)]
    #[case(13, 14)]
    #[case(14, 24)]
    #[case(15, 24)]
    fn cardinality(#[case] n: i64, #[case] expected: usize) {
        // |P¹(ℤ/Nℤ)| = N · ∏_{p | N} (1 + 1/p)
        assert_eq!(P1List::new(n).unwrap().len(), expected);
    }

    #[test]
    fn index_is_constant_on_classes() {
        for n in [2i64, 4, 11, 12, 14] {
            let p1 = P1List::new(n).unwrap();
            for u in 0..n {
                for v in 0..n {
                    let Some(i) = p1.index(u, v) else { continue };
                    for t in 1..n {
                        if gcd(t, n) != 1 {
                            continue;
                        }
                        assert_eq!(p1.index(t * u, t * v), Some(i), "n={n} u={u} v={v} t={t}");
                    }
                }
            }
        }
    }

    #[test]
    fn invalid_pairs_have_no_index() {
        let p1 = P1List::new(12).unwrap();
        assert_eq!(p1.index(2, 4), None);
        assert_eq!(p1.index(0, 6), None);
        assert_eq!(p1.index(6, 8), None);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(n in 1i64..200, u in 0i64..200, v in 0i64..200) {
            if let Some((a, b)) = p1_normalize(n, u, v) {
                prop_assert_eq!(p1_normalize(n, a, b), Some((a, b)));
            }
        }
    }

    #[test]
    fn lifts_are_unimodular_and_congruent() {
        for n in [2i64, 5, 11, 12, 14, 15] {
            let p1 = P1List::new(n).unwrap();
            for &(u, v) in p1.classes() {
                let m = lift_to_sl2z(u, v, n);
                assert_eq!(m.det(), 1, "n={n} ({u},{v})");
                assert_eq!(m.c().rem_euclid(n), u.rem_euclid(n));
                assert_eq!(m.d().rem_euclid(n), v.rem_euclid(n));
            }
        }
    }
}
