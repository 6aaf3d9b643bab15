use big_m_fraction::FractionError;
use thiserror::Error;

use crate::table::Relation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableauError {
    #[error(transparent)]
    Fraction(#[from] FractionError),

    #[error("{what} index {index} is out of range (length {len})")]
    IndexOutOfRange { what: &'static str, index: usize, len: usize },

    #[error("variable {0} does not exist")]
    VariableNotFound(String),

    #[error("variable name `{0}` is already in use")]
    DuplicateName(String),

    #[error("`{0}` is not a valid variable name")]
    InvalidName(String),

    #[error("invalid relation `{0}`")]
    InvalidRelation(String),

    #[error("{context}: expected {expected} values, found {found}")]
    DimensionMismatch { context: &'static str, expected: usize, found: usize },

    #[error("row {row} is `{relation}`, this transform needs `{expected}`")]
    UnsupportedRelation { row: usize, relation: Relation, expected: Relation },

    #[error("substitution has {0} terms, at most 2 are allowed")]
    TooManyTerms(usize),

    #[error("substitution must introduce at least one variable")]
    NoFreeVariable,

    #[error("the substituted terms must have opposite signs because {0} is not free")]
    SignMismatch(String),

    #[error("{variable} is the basis variable of row {row}")]
    VariableInUse { variable: String, row: usize },

    #[error("tableau is not in canonical form: {0}")]
    NotCanonical(&'static str),

    #[error("column {variable} has no positive entry in row {row}")]
    Unbounded { row: usize, variable: String },

    #[error("row {other} has a smaller ratio than pivot row {row}")]
    RatioTestViolation { row: usize, other: usize },

    #[error("{variable} is already the basis variable of row {row}")]
    AlreadyBasis { row: usize, variable: String },
}

pub type Result<T> = std::result::Result<T, TableauError>;
