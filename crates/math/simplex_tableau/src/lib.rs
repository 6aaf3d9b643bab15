//! Exact-arithmetic simplex tableau engine.
//!
//! A [`Tableau`] is an immutable snapshot of a linear program in (partially)
//! standardized form. The [`Transform`] catalog maps one snapshot to the next
//! (multiply a row, add slack or artificial variables, substitute a variable,
//! pivot, switch views), and [`replay`] rebuilds a whole derivation from the
//! initial tableau plus the ordered list of transforms.
//!
//! # Example
//!
//! ```
//! use simplex_tableau::{Derivation, Fraction, LinearProgram, RelaxRow, SubstituteVariable, Term};
//!
//! let mut derivation = Derivation::new(LinearProgram::example());
//! derivation.push(RelaxRow { name: "s1".into(), row: 1 });
//! derivation.push(SubstituteVariable {
//!     variable: 1,
//!     terms: vec![Term::new(Fraction::from(1), "x4")],
//!     constant: Fraction::from(1),
//! });
//!
//! let steps = derivation.replay()?;
//! assert!(steps.iter().all(|step| step.succeeded()));
//! assert_eq!(steps[0].label.to_string(), "Relax (2) with s1");
//! assert_eq!(steps[1].label.to_string(), "x2 = x4 + 1");
//! # Ok::<(), simplex_tableau::TableauError>(())
//! ```

mod error;
mod input;
mod label;
mod replay;
mod table;
mod transform;

pub use big_m_fraction::{Fraction, FractionError};

pub use error::{Result, TableauError};
pub use input::{BoundSpec, Constraint, LinearProgram, Scalar};
pub use label::Label;
pub use replay::{replay, Derivation, Step, TransformConfig};
pub use table::{is_valid_variable_name, Bound, NonStandardBound, Relation, Row, Tableau, VariableId, PLACEHOLDER};
pub use transform::{
    big_m_cost, ArtificialVariable, MultiplyRow, Pivot, RelaxRow, SubstituteVariable, TableauTransform, Term,
    Transform,
};
