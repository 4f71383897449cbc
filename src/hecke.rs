//! Hecke operator support.
//!
//! The operator T_ℓ acts on a symbol φ by φ|T_ℓ = Σ_a φ|γ_a over the
//! standard degeneracy matrices γ_a of determinant ℓ. Computing this
//! naively evaluates the map ℓ + 1 times per coset representative, and
//! every one of those evaluations decomposes a path and reduces each piece
//! to a canonical representative. None of that reduction depends on the
//! values of the symbol, only on the level, so it can be done once per
//! (level, ℓ) and replayed against any symbol: that replay table is
//! [`HeckePrepTable`].

use sl2z::{unimodular_path_from_infinity, unimodular_path_to_infinity, Matrix2x2};

use crate::manin_relations::ManinRelations;

pub(crate) fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// The determinant-ℓ matrices defining T_ℓ at the given level: [[1, a], [0, ℓ]]
/// for 0 ≤ a < ℓ, plus [[ℓ, 0], [0, 1]] when ℓ does not divide the level.
pub fn hecke_matrices(ell: i64, level: i64) -> Vec<Matrix2x2> {
    let mut out: Vec<Matrix2x2> = (0..ell).map(|a| Matrix2x2::new(1, a, 0, ell)).collect();
    if level % ell != 0 {
        out.push(Matrix2x2::new(ell, 0, 0, 1));
    }
    out
}

/// Precomputed data for applying T_ℓ on generator values.
///
/// `bucket(g, h)` holds matrices A such that
///
///   (φ|T_ℓ)(gen_g) = Σ_h Σ_{A ∈ bucket(g, h)} φ(rep_h) · A.
///
/// Each A is of the form B·M⁻¹·γ_a where M is a unimodular path matrix of
/// γ_a · gen_g and B is the canonical representative equivalent to M.
pub struct HeckePrepTable {
    ell: i64,
    buckets: Vec<Vec<Vec<Matrix2x2>>>,
}

impl HeckePrepTable {
    pub(crate) fn build(relations: &ManinRelations, ell: i64) -> Self {
        let nreps = relations.coset_reps().len();
        let mut buckets = vec![vec![Vec::new(); nreps]; relations.ngens()];
        for (gpos, gen_buckets) in buckets.iter_mut().enumerate() {
            let gen = *relations.gen_rep(gpos);
            for gamma in hecke_matrices(ell, relations.level()) {
                let t = gamma * gen;
                // the paths {∞} − {a/c} and {b/d} − {∞} concatenate to the
                // image under t of the path from 0 to ∞
                let mut path = unimodular_path_from_infinity(t.a(), t.c());
                path.extend(unimodular_path_to_infinity(t.b(), t.d()));
                for m in path {
                    let h = relations
                        .equivalent_index(&m)
                        .expect("path matrices lie in SL2(Z)");
                    let b = *relations.rep_at(h);
                    gen_buckets[h].push(b * m.inverse_unit() * gamma);
                }
            }
        }
        Self { ell, buckets }
    }

    pub fn ell(&self) -> i64 {
        self.ell
    }

    pub fn ngens(&self) -> usize {
        self.buckets.len()
    }

    /// The matrices contributing φ(rep_h)-terms to the image at generator g.
    pub fn bucket(&self, gen: usize, rep: usize) -> &[Matrix2x2] {
        &self.buckets[gen][rep]
    }

    pub fn gen_buckets(&self, gen: usize) -> &[Vec<Matrix2x2>] {
        &self.buckets[gen]
    }
}
