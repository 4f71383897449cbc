//! The Manin relations for Γ₀(N).
//!
//! Right cosets of Γ₀(N) in SL₂(ℤ) are enumerated by P¹(ℤ/Nℤ); each class
//! gets a canonical determinant-one representative. A modular symbol, viewed
//! as a function m on those representatives, satisfies the two Manin
//! relations induced by the elliptic elements σ and τ:
//!
//!   M(B) + M(Bσ) = 0,   M(B) + M(Bτ) + M(Bτ²) = 0,
//!
//! where M extends m to all of SL₂(ℤ) by M(A) = m(B)·(B·A⁻¹) for B the
//! representative equivalent to A. Solving these relations expresses every
//! representative's value as a ℤ-combination of right-translated values on a
//! small generator subset; the solved table is what [`relations`] serves.
//!
//! Classes fixed by σ or τ (elliptic two- and three-torsion) cannot be
//! eliminated and stay generators, and one global boundary relation may
//! survive as well; both are exposed as [`Constraint`]s on the generator
//! values rather than entries of the relations table.
//!
//! Values are assumed to be fixed by the action of −I, as they are for every
//! even-weight coefficient module.
//!
//! [`relations`]: ManinRelations::relations

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use itertools::Itertools;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use sl2z::Matrix2x2;

use crate::error::{CompositeHeckeIndex, NotCosetRep};
use crate::hecke::{self, HeckePrepTable};
use crate::p1::{lift_to_sl2z, P1List};

/// One term of a solved relation: the contribution `coeff · (value(gen) · matrix)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTerm {
    pub coeff: i64,
    pub matrix: Matrix2x2,
    /// Position of the generator in the fixed generator order.
    pub gen: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    TwoTorsion,
    ThreeTorsion,
    /// The surviving global relation among the generators (the analogue of
    /// the Pollack-Stevens difference equation). It vanishes identically on
    /// trivial-action codomains.
    Boundary,
}

/// A linear condition `Σ coeff · (value(gen) · matrix) = 0` that admissible
/// defining data must satisfy. The engine exposes these; enforcing them is
/// the business of the layers that construct symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub terms: Vec<RelationTerm>,
}

/// A linear expression in the unknown values, indexed by P¹ class.
type Row = BTreeMap<usize, Vec<(i64, Matrix2x2)>>;

pub struct ManinRelations {
    level: i64,
    p1: P1List,
    coset_reps: Vec<Matrix2x2>,
    rep_index: FxHashMap<Matrix2x2, usize>,
    /// Indices (into `coset_reps`) of the generator subset, in order.
    gens: Vec<usize>,
    /// Relation list per coset representative, in `coset_reps` order.
    relations: Vec<Vec<RelationTerm>>,
    two_torsion: Vec<(usize, Matrix2x2)>,
    three_torsion: Vec<(usize, [Matrix2x2; 2])>,
    constraints: Vec<Constraint>,
    hecke_cache: Mutex<FxHashMap<i64, Arc<HeckePrepTable>>>,
}

impl std::fmt::Display for ManinRelations {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Manin relations for Gamma_0({}) with {} coset representatives and {} generators",
            self.level,
            self.coset_reps.len(),
            self.gens.len()
        )
    }
}

impl ManinRelations {
    pub fn new(level: i64) -> Result<Self> {
        let p1 = P1List::new(level)?;
        let coset_reps: Vec<Matrix2x2> = p1
            .classes()
            .iter()
            .map(|&(u, v)| lift_to_sl2z(u, v, level))
            .collect();
        let rep_index = coset_reps
            .iter()
            .enumerate()
            .map(|(i, &m)| (m, i))
            .collect();
        let mut solver = RelationSolver::new(&p1, &coset_reps);
        solver.build();
        solver.eliminate();
        let (gens, relations, two_torsion, three_torsion, constraints) = solver.finish();
        Ok(Self {
            level,
            p1,
            coset_reps,
            rep_index,
            gens,
            relations,
            two_torsion,
            three_torsion,
            constraints,
            hecke_cache: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    /// The canonical coset representatives, in a stable order.
    pub fn coset_reps(&self) -> &[Matrix2x2] {
        &self.coset_reps
    }

    pub fn ngens(&self) -> usize {
        self.gens.len()
    }

    /// Indices (into `coset_reps`) of the generators, in the fixed order.
    pub fn gen_indices(&self) -> &[usize] {
        &self.gens
    }

    pub fn gen_rep(&self, i: usize) -> &Matrix2x2 {
        &self.coset_reps[self.gens[i]]
    }

    pub fn gens(&self) -> impl Iterator<Item = &Matrix2x2> {
        self.gens.iter().map(|&i| &self.coset_reps[i])
    }

    /// The solved relation for a canonical coset representative.
    ///
    /// An empty slice means the value is zero. A matrix that is not one of
    /// the canonical representatives is rejected.
    pub fn relations(&self, b: &Matrix2x2) -> Result<&[RelationTerm], NotCosetRep> {
        let idx = self
            .rep_index
            .get(b)
            .copied()
            .ok_or(NotCosetRep { matrix: *b })?;
        Ok(&self.relations[idx])
    }

    /// Index of the P¹ class of the bottom row of `a`.
    pub fn p1_index(&self, c: i64, d: i64) -> Option<usize> {
        self.p1.index(c, d)
    }

    pub fn rep_at(&self, index: usize) -> &Matrix2x2 {
        &self.coset_reps[index]
    }

    /// Index of the canonical representative equivalent to `a` under Γ₀(N).
    pub fn equivalent_index(&self, a: &Matrix2x2) -> Result<usize, NotCosetRep> {
        self.p1
            .index(a.c(), a.d())
            .ok_or(NotCosetRep { matrix: *a })
    }

    /// The canonical representative equivalent to `a` under Γ₀(N).
    pub fn equivalent_rep(&self, a: &Matrix2x2) -> Result<&Matrix2x2, NotCosetRep> {
        Ok(&self.coset_reps[self.equivalent_index(a)?])
    }

    /// P¹ classes fixed by σ, with the torsion element γ satisfying
    /// `value · γ = −value` for admissible symbols.
    pub fn two_torsion(&self) -> &[(usize, Matrix2x2)] {
        &self.two_torsion
    }

    /// P¹ classes fixed by τ, with the elements γ, γ² appearing in
    /// `value · (1 + γ + γ²) = 0`.
    pub fn three_torsion(&self) -> &[(usize, [Matrix2x2; 2])] {
        &self.three_torsion
    }

    /// The conditions admissible generator values must satisfy.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The Hecke precomputation table for the prime ℓ, built once per
    /// (self, ℓ) and shared thereafter.
    pub fn prep_hecke(&self, ell: i64) -> Result<Arc<HeckePrepTable>, CompositeHeckeIndex> {
        if !hecke::is_prime(ell) {
            return Err(CompositeHeckeIndex { ell });
        }
        let mut cache = self.hecke_cache.lock();
        if let Some(table) = cache.get(&ell) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(HeckePrepTable::build(self, ell));
        cache.insert(ell, Arc::clone(&table));
        Ok(table)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RelKind {
    Sigma,
    Tau,
}

struct RelationSolver<'a> {
    p1: &'a P1List,
    reps: &'a [Matrix2x2],
    pending: Vec<(RelKind, Row)>,
    solved: BTreeMap<usize, Row>,
    protected: FxHashSet<usize>,
    two_torsion: Vec<(usize, Matrix2x2)>,
    three_torsion: Vec<(usize, [Matrix2x2; 2])>,
    constraints: Vec<(ConstraintKind, Row)>,
}

impl<'a> RelationSolver<'a> {
    fn new(p1: &'a P1List, reps: &'a [Matrix2x2]) -> Self {
        Self {
            p1,
            reps,
            pending: Vec::new(),
            solved: BTreeMap::new(),
            protected: FxHashSet::default(),
            two_torsion: Vec::new(),
            three_torsion: Vec::new(),
            constraints: Vec::new(),
        }
    }

    fn class_of(&self, a: &Matrix2x2) -> usize {
        // bottom rows of SL2(Z) matrices always define a class
        self.p1
            .index(a.c(), a.d())
            .expect("bottom row of an SL2(Z) matrix")
    }

    /// Collect the σ and τ relations, one per orbit, splitting off the
    /// torsion (self-paired) orbits as constraints.
    fn build(&mut self) {
        let sigma = Matrix2x2::sigma();
        let tau = Matrix2x2::tau();
        let mut sigma_rows = Vec::new();
        let mut tau_rows = Vec::new();
        let mut seen_sigma = FxHashSet::default();
        let mut seen_tau = FxHashSet::default();
        for (r, &b) in self.reps.iter().enumerate() {
            let bs = b * sigma;
            let r2 = self.class_of(&bs);
            if seen_sigma.insert((r.min(r2), r.max(r2))) {
                let g2 = self.reps[r2] * bs.inverse_unit();
                if r2 == r {
                    self.two_torsion.push((r, g2));
                    self.protected.insert(r);
                } else {
                    let mut row = Row::new();
                    row.entry(r).or_default().push((1, Matrix2x2::identity()));
                    row.entry(r2).or_default().push((1, g2));
                    sigma_rows.push((RelKind::Sigma, cleanup(row)));
                }
            }
            let bt = b * tau;
            let bt2 = bt * tau;
            let r3 = self.class_of(&bt);
            let r4 = self.class_of(&bt2);
            let orbit: Vec<usize> = [r, r3, r4].into_iter().sorted_unstable().dedup().collect();
            if seen_tau.insert(orbit) {
                let g3 = self.reps[r3] * bt.inverse_unit();
                let g4 = self.reps[r4] * bt2.inverse_unit();
                if r3 == r && r4 == r {
                    self.three_torsion.push((r, [g3, g4]));
                    self.protected.insert(r);
                } else {
                    let mut row = Row::new();
                    row.entry(r).or_default().push((1, Matrix2x2::identity()));
                    row.entry(r3).or_default().push((1, g3));
                    row.entry(r4).or_default().push((1, g4));
                    tau_rows.push((RelKind::Tau, cleanup(row)));
                }
            }
        }
        self.pending = sigma_rows;
        self.pending.append(&mut tau_rows);
    }

    /// Fold terms on two-torsion unknowns with the identity
    /// `value · (γ·X) = −value · X`, picking the lexicographically smallest
    /// matrix among the equivalent forms.
    fn reduce_torsion(&self, row: Row) -> Row {
        let twotor: FxHashMap<usize, Matrix2x2> = self.two_torsion.iter().copied().collect();
        let mut out = Row::new();
        for (idx, ts) in row {
            if let Some(g) = twotor.get(&idx) {
                let gi = g.inverse_unit();
                let folded = ts
                    .into_iter()
                    .map(|(c, a)| {
                        let b2 = gi * a;
                        [(c, a), (-c, b2), (c, -a), (-c, -b2)]
                            .into_iter()
                            .min_by_key(|t| t.1)
                            .unwrap()
                    })
                    .collect();
                out.insert(idx, folded);
            } else {
                out.insert(idx, ts);
            }
        }
        out
    }

    /// Repeatedly solve relations for an unknown carrying a single unit
    /// coefficient, substituting as we go. Unknowns that cannot be solved
    /// remain generators; relations that cannot be used become constraints.
    fn eliminate(&mut self) {
        loop {
            let mut progress = false;
            let mut next = Vec::new();
            for (kind, row) in std::mem::take(&mut self.pending) {
                let row = cleanup(self.reduce_torsion(substitute(row, &self.solved)));
                if row.is_empty() {
                    continue;
                }
                let Some(target) = self.pick_target(&row) else {
                    next.push((kind, row));
                    continue;
                };
                let (c, a) = row[&target][0];
                let ai = a.inverse_unit();
                let mut expr = Row::new();
                for (&idx, ts) in &row {
                    if idx == target {
                        continue;
                    }
                    expr.insert(idx, ts.iter().map(|&(tc, ta)| (-c * tc, ta * ai)).collect());
                }
                let expr = cleanup(expr);
                for other in self.solved.values_mut() {
                    let mut single = BTreeMap::new();
                    single.insert(target, expr.clone());
                    *other = cleanup(substitute(std::mem::take(other), &single));
                }
                self.solved.insert(target, expr);
                progress = true;
            }
            self.pending = next;
            if self.pending.is_empty() || !progress {
                break;
            }
        }
        // leftovers are the surviving boundary relations
        let torsion_rows: Vec<(ConstraintKind, Row)> = self
            .two_torsion
            .iter()
            .map(|&(idx, g)| {
                let mut row = Row::new();
                row.insert(idx, vec![(1, Matrix2x2::identity()), (1, g)]);
                (ConstraintKind::TwoTorsion, row)
            })
            .chain(self.three_torsion.iter().map(|&(idx, [g3, g4])| {
                let mut row = Row::new();
                row.insert(idx, vec![(1, Matrix2x2::identity()), (1, g3), (1, g4)]);
                (ConstraintKind::ThreeTorsion, row)
            }))
            .collect();
        self.constraints = torsion_rows;
        for (_, row) in std::mem::take(&mut self.pending) {
            self.constraints.push((ConstraintKind::Boundary, row));
        }
    }

    /// Scan for a solvable unknown in descending index order, touching
    /// torsion classes only when nothing else is eliminable.
    fn pick_target(&self, row: &Row) -> Option<usize> {
        for allow_protected in [false, true] {
            for (&idx, ts) in row.iter().rev() {
                if self.protected.contains(&idx) && !allow_protected {
                    continue;
                }
                if ts.len() == 1 && matches!(ts[0].0, 1 | -1) {
                    return Some(idx);
                }
            }
        }
        None
    }

    #[allow(clippy::type_complexity)]
    fn finish(
        self,
    ) -> (
        Vec<usize>,
        Vec<Vec<RelationTerm>>,
        Vec<(usize, Matrix2x2)>,
        Vec<(usize, [Matrix2x2; 2])>,
        Vec<Constraint>,
    ) {
        let n = self.reps.len();
        let gens: Vec<usize> = (0..n).filter(|i| !self.solved.contains_key(i)).collect();
        let genpos: FxHashMap<usize, usize> =
            gens.iter().enumerate().map(|(p, &i)| (i, p)).collect();
        let mut relations = Vec::with_capacity(n);
        for r in 0..n {
            if let Some(&pos) = genpos.get(&r) {
                relations.push(vec![RelationTerm {
                    coeff: 1,
                    matrix: Matrix2x2::identity(),
                    gen: pos,
                }]);
            } else {
                let terms = self.solved[&r]
                    .iter()
                    .flat_map(|(idx, ts)| {
                        ts.iter().map(|&(coeff, matrix)| RelationTerm {
                            coeff,
                            matrix,
                            gen: genpos[idx],
                        })
                    })
                    .collect();
                relations.push(terms);
            }
        }
        let constraints = self
            .constraints
            .into_iter()
            .filter_map(|(kind, row)| {
                let row = cleanup(substitute(row, &self.solved));
                if row.is_empty() {
                    return None;
                }
                let terms = row
                    .iter()
                    .flat_map(|(idx, ts)| {
                        ts.iter().map(|&(coeff, matrix)| RelationTerm {
                            coeff,
                            matrix,
                            gen: genpos[idx],
                        })
                    })
                    .collect();
                Some(Constraint { kind, terms })
            })
            .collect();
        (
            gens,
            relations,
            self.two_torsion,
            self.three_torsion,
            constraints,
        )
    }
}

/// Combine duplicate matrices, drop vanishing terms and empty unknowns, and
/// sort deterministically.
fn cleanup(row: Row) -> Row {
    let mut out = Row::new();
    for (idx, ts) in row {
        let mut combined: BTreeMap<Matrix2x2, i64> = BTreeMap::new();
        for (c, a) in ts {
            *combined.entry(a).or_default() += c;
        }
        let ts: Vec<(i64, Matrix2x2)> = combined
            .into_iter()
            .filter(|&(_, c)| c != 0)
            .map(|(a, c)| (c, a))
            .collect();
        if !ts.is_empty() {
            out.insert(idx, ts);
        }
    }
    out
}

/// Replace solved unknowns by their expressions; `m(idx)·A` becomes
/// `Σ c·m(g)·(A_g·A)` for each term of the solved expression.
fn substitute(row: Row, solved: &BTreeMap<usize, Row>) -> Row {
    let mut out = Row::new();
    for (idx, ts) in row {
        if let Some(expr) = solved.get(&idx) {
            for &(c, a) in &ts {
                for (&idx2, ts2) in expr {
                    out.entry(idx2)
                        .or_default()
                        .extend(ts2.iter().map(|&(c2, a2)| (c * c2, a2 * a)));
                }
            }
        } else {
            out.entry(idx).or_default().extend(ts);
        }
    }
    out
}
