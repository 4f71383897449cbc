//! Maps from Γ₀(N)-cosets to a coefficient module.
//!
//! A [`ManinMap`] is determined by its values on the Manin generators;
//! values on the remaining coset representatives are recovered on demand
//! through the solved relation table and memoized. Evaluation at an
//! arbitrary SL₂(ℤ) matrix reduces to generator values through the
//! continued-fraction path decomposition, and the Hecke action is available
//! both by definition and through the precomputed replay table.

use std::cell::RefCell;
use std::sync::Arc;

use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};
use sl2z::{unimodular_path_to_infinity, Matrix2x2};

use crate::coefficients::{rational, CoefficientModule, Rational};
use crate::error::{CompositeHeckeIndex, MismatchedGenerators, RecursiveRelation};
use crate::hecke;
use crate::manin_relations::ManinRelations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeckeAlgorithm {
    /// Apply the degeneracy matrices one by one, re-deriving every path
    /// decomposition. Slow, and kept as the reference implementation.
    Naive,
    /// Replay the cached [`HeckePrepTable`](crate::hecke::HeckePrepTable)
    /// for the level and prime.
    #[default]
    Prep,
}

pub struct ManinMap<C: CoefficientModule> {
    codomain: Arc<C>,
    relations: Arc<ManinRelations>,
    values: RefCell<FxHashMap<Matrix2x2, C::Element>>,
    /// Representatives currently being computed, for cycle detection.
    in_progress: RefCell<FxHashSet<Matrix2x2>>,
}

impl<C: CoefficientModule> std::fmt::Debug for ManinMap<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ManinMap at level {} with {} memoized values",
            self.relations.level(),
            self.values.borrow().len()
        )
    }
}

impl<C: CoefficientModule> ManinMap<C> {
    /// Build a map from one value per Manin generator, in generator order.
    pub fn from_generator_values(
        codomain: Arc<C>,
        relations: Arc<ManinRelations>,
        gen_values: Vec<C::Element>,
    ) -> Result<Self, MismatchedGenerators> {
        if gen_values.len() != relations.ngens() {
            return Err(MismatchedGenerators {
                expected: relations.ngens(),
                actual: gen_values.len(),
            });
        }
        let values = relations
            .gens()
            .copied()
            .zip(gen_values)
            .collect::<FxHashMap<_, _>>();
        Ok(Self {
            codomain,
            relations,
            values: RefCell::new(values),
            in_progress: RefCell::new(FxHashSet::default()),
        })
    }

    /// Build a map from explicit (representative, value) defining data.
    ///
    /// No completeness check is performed; reads that reach a generator with
    /// no entry fail with a relation cycle.
    pub fn from_entries(
        codomain: Arc<C>,
        relations: Arc<ManinRelations>,
        entries: Vec<(Matrix2x2, C::Element)>,
    ) -> Self {
        Self {
            codomain,
            relations,
            values: RefCell::new(entries.into_iter().collect()),
            in_progress: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn codomain(&self) -> &Arc<C> {
        &self.codomain
    }

    pub fn relations(&self) -> &Arc<ManinRelations> {
        &self.relations
    }

    /// The value at a canonical coset representative, computing and
    /// memoizing through the relation table on a miss.
    pub fn value_at(&self, b: &Matrix2x2) -> Result<C::Element> {
        if let Some(v) = self.values.borrow().get(b) {
            return Ok(v.clone());
        }
        if !self.in_progress.borrow_mut().insert(*b) {
            return Err(RecursiveRelation { matrix: *b }.into());
        }
        let computed = self.compute_from_relations(b);
        self.in_progress.borrow_mut().remove(b);
        let v = computed?;
        self.values.borrow_mut().insert(*b, v.clone());
        Ok(v)
    }

    fn compute_from_relations(&self, b: &Matrix2x2) -> Result<C::Element> {
        let mut acc = self.codomain.zero();
        for term in self.relations.relations(b)? {
            let v = self.value_at(self.relations.gen_rep(term.gen))?;
            let acted = self.codomain.act_right(&v, &term.matrix);
            let contrib = match term.coeff {
                1 => acted,
                -1 => self.codomain.sub(&self.codomain.zero(), &acted),
                c => self.codomain.scale(&acted, &rational(c, 1)),
            };
            acc = self.codomain.add(&acc, &contrib);
        }
        Ok(acc)
    }

    /// Force computation of the value at every coset representative.
    pub fn compute_full_data(&self) -> Result<()> {
        for b in self.relations.coset_reps() {
            self.value_at(b)?;
        }
        Ok(())
    }

    /// Evaluate the extension to SL₂(ℤ): value(B) · (B · A⁻¹) for B the
    /// canonical representative equivalent to A.
    ///
    /// # Panics
    ///
    /// Panics if `a` does not have determinant ±1.
    pub fn eval_sl2(&self, a: &Matrix2x2) -> Result<C::Element> {
        let b = *self.relations.equivalent_rep(a)?;
        let v = self.value_at(&b)?;
        Ok(self.codomain.act_right(&v, &(b * a.inverse_unit())))
    }

    /// Evaluate the underlying modular symbol on the path
    /// {A·0} − {A·∞} = {b/d} − {a/c}, via the unimodular decompositions of
    /// both cusps.
    pub fn evaluate(&self, a: &Matrix2x2) -> Result<C::Element> {
        let mut acc = self.codomain.zero();
        for m in unimodular_path_to_infinity(a.b(), a.d()) {
            let v = self.eval_sl2(&m)?;
            acc = self.codomain.add(&acc, &v);
        }
        for m in unimodular_path_to_infinity(a.a(), a.c()) {
            let v = self.eval_sl2(&m)?;
            acc = self.codomain.sub(&acc, &v);
        }
        Ok(acc)
    }

    fn combine(&self, other: &Self, f: impl Fn(&C::Element, &C::Element) -> C::Element) -> Self {
        assert!(
            Arc::ptr_eq(&self.relations, &other.relations),
            "maps must share their Manin relations"
        );
        assert!(
            Arc::ptr_eq(&self.codomain, &other.codomain),
            "maps must share their codomain"
        );
        let mine = self.values.borrow();
        let theirs = other.values.borrow();
        let values = mine
            .iter()
            .filter_map(|(k, v)| theirs.get(k).map(|w| (*k, f(v, w))))
            .collect();
        Self {
            codomain: Arc::clone(&self.codomain),
            relations: Arc::clone(&self.relations),
            values: RefCell::new(values),
            in_progress: RefCell::new(FxHashSet::default()),
        }
    }

    /// Pointwise sum over the representatives memoized in BOTH maps.
    ///
    /// Entries present on one side only are dropped, not recomputed; call
    /// [`compute_full_data`](Self::compute_full_data) on both operands first
    /// when a total result is needed.
    pub fn add(&self, other: &Self) -> Self {
        self.combine(other, |a, b| self.codomain.add(a, b))
    }

    /// Pointwise difference, with the same intersection semantics as
    /// [`add`](Self::add).
    pub fn sub(&self, other: &Self) -> Self {
        self.combine(other, |a, b| self.codomain.sub(a, b))
    }

    /// Scalar multiple over the memoized entries.
    pub fn scale(&self, c: &Rational) -> Self {
        self.apply(|v| self.codomain.scale(v, c))
    }

    /// Apply a function to every memoized value.
    pub fn apply(&self, f: impl Fn(&C::Element) -> C::Element) -> Self {
        let values = self
            .values
            .borrow()
            .iter()
            .map(|(k, v)| (*k, f(v)))
            .collect();
        Self {
            codomain: Arc::clone(&self.codomain),
            relations: Arc::clone(&self.relations),
            values: RefCell::new(values),
            in_progress: RefCell::new(FxHashSet::default()),
        }
    }

    /// The right translate of the map by γ: B ↦ evaluate(γ·B) · γ, over the
    /// memoized representatives.
    pub fn right_action(&self, gamma: &Matrix2x2) -> Result<Self> {
        let keys: Vec<Matrix2x2> = self.values.borrow().keys().copied().collect();
        let mut values = FxHashMap::default();
        for b in keys {
            let v = self.evaluate(&(*gamma * b))?;
            values.insert(b, self.codomain.act_right(&v, gamma));
        }
        Ok(Self {
            codomain: Arc::clone(&self.codomain),
            relations: Arc::clone(&self.relations),
            values: RefCell::new(values),
            in_progress: RefCell::new(FxHashSet::default()),
        })
    }

    /// Reduce every memoized value to normal form.
    pub fn normalize(&mut self) -> &mut Self {
        self.normalize_values();
        self
    }

    fn normalize_values(&self) {
        for v in self.values.borrow_mut().values_mut() {
            self.codomain.normalize(v);
        }
    }

    /// Values at the Manin generators, in generator order. Each item is
    /// computed through [`value_at`](Self::value_at) and may fail.
    pub fn generator_values(&self) -> impl Iterator<Item = Result<C::Element>> + '_ {
        self.relations.gens().map(move |g| self.value_at(g))
    }

    /// The image of the map under T_ℓ for a prime ℓ.
    pub fn hecke(&self, ell: i64, algorithm: HeckeAlgorithm) -> Result<Self> {
        if !hecke::is_prime(ell) {
            return Err(CompositeHeckeIndex { ell }.into());
        }
        self.compute_full_data()?;
        self.normalize_values();
        match algorithm {
            HeckeAlgorithm::Naive => {
                let gammas = hecke::hecke_matrices(ell, self.relations.level());
                let mut ans = self.right_action(&gammas[0])?;
                for gamma in &gammas[1..] {
                    ans = ans.add(&self.right_action(gamma)?);
                }
                ans.normalize_values();
                Ok(ans)
            }
            HeckeAlgorithm::Prep => {
                let table = self.relations.prep_hecke(ell)?;
                let mut gen_values = Vec::with_capacity(self.relations.ngens());
                for g in 0..self.relations.ngens() {
                    let mut acc = self.codomain.zero();
                    for (h, bucket) in table.gen_buckets(g).iter().enumerate() {
                        if bucket.is_empty() {
                            continue;
                        }
                        let v = self.value_at(self.relations.rep_at(h))?;
                        for m in bucket {
                            let w = self.codomain.act_right(&v, m);
                            acc = self.codomain.add(&acc, &w);
                        }
                    }
                    gen_values.push(acc);
                }
                let image = Self::from_generator_values(
                    Arc::clone(&self.codomain),
                    Arc::clone(&self.relations),
                    gen_values,
                )?;
                image.normalize_values();
                Ok(image)
            }
        }
    }
}
