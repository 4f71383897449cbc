//! Exact 2×2 integer matrices and the continued-fraction decomposition of
//! paths between cusps into unimodular pieces.
//!
//! This crate is the arithmetic leaf of the workspace. [`Matrix2x2`] is an
//! immutable value type suitable for use as a dictionary key, and the
//! functions in [`paths`] implement Manin's continued-fraction trick: the
//! geodesic from a rational r/s to ∞ is triangulated by ideal triangles
//! whose edges are indexed by determinant-one integer matrices.

pub mod matrix;
pub mod paths;

pub use matrix::Matrix2x2;
pub use paths::{convergents, unimodular_path_from_infinity, unimodular_path_to_infinity};
