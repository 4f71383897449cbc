//! Failure conditions surfaced by the Manin-map engine.
//!
//! All of these are local precondition violations, detected at the point of
//! the violating call and never retried internally. They implement
//! [`std::error::Error`] so callers can match on them through `anyhow`.

use sl2z::Matrix2x2;

/// The defining data for a map had the wrong number of generator values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchedGenerators {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for MismatchedGenerators {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "length of defining data must equal the number of Manin generators: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for MismatchedGenerators {}

/// A lookup was keyed by a matrix that is not one of the canonical coset
/// representatives.
///
/// This is distinct from a representative whose relation list is empty: the
/// latter legitimately has value zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotCosetRep {
    pub matrix: Matrix2x2,
}

impl std::fmt::Display for NotCosetRep {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} is not a coset representative", self.matrix)
    }
}

impl std::error::Error for NotCosetRep {}

/// Relation data referenced a representative transitively dependent on
/// itself.
///
/// A well-formed relation table expresses every representative in terms of
/// generator values only, so the memoizing read fails fast on re-entrant
/// lookups instead of recursing unboundedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveRelation {
    pub matrix: Matrix2x2,
}

impl std::fmt::Display for RecursiveRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "relation data for {} depends on its own value",
            self.matrix
        )
    }
}

impl std::error::Error for RecursiveRelation {}

/// `find_scalar` could not express one value as a scalar multiple of
/// another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotScalarMultiple;

impl std::fmt::Display for NotScalarMultiple {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "value is not a consistent scalar multiple")
    }
}

impl std::error::Error for NotScalarMultiple {}

/// The Hecke operator index must be prime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeHeckeIndex {
    pub ell: i64,
}

impl std::fmt::Display for CompositeHeckeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Hecke index {} is not prime", self.ell)
    }
}

impl std::error::Error for CompositeHeckeIndex {}
