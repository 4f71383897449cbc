//! An evaluation engine for modular symbols in the style of Pollack and
//! Stevens.
//!
//! A modular symbol of level N with values in a right module V is determined
//! by its values on a finite set of Manin generators; this crate provides
//! the machinery around that fact:
//!
//! - [`P1List`](p1::P1List): the projective line over ℤ/Nℤ, indexing the
//!   right cosets of Γ₀(N) in SL₂(ℤ);
//! - [`ManinRelations`](manin_relations::ManinRelations): canonical coset
//!   representatives, a generator subset, and the solved relation table
//!   expressing every representative value in terms of generator values;
//! - [`ManinMap`](manin_map::ManinMap): a lazily-completed map from coset
//!   representatives to a [`CoefficientModule`](coefficients::CoefficientModule),
//!   with evaluation at arbitrary SL₂(ℤ) matrices through Manin's
//!   continued-fraction trick and Hecke operators in both naive and
//!   precomputed form.
//!
//! The integer matrix layer lives in the companion `sl2z` crate.

pub mod coefficients;
pub mod error;
pub mod hecke;
pub mod manin_map;
pub mod manin_relations;
pub mod p1;

pub use coefficients::{rational, CoefficientModule, Rational, SymPower};
pub use hecke::HeckePrepTable;
pub use manin_map::{HeckeAlgorithm, ManinMap};
pub use manin_relations::{Constraint, ConstraintKind, ManinRelations, RelationTerm};
pub use p1::P1List;
pub use sl2z::Matrix2x2;
