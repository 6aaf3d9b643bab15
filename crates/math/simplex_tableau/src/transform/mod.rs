//! The catalog of LP-preserving transforms.
//!
//! Each transform is a plain serialisable value. [`Transform`] is the tagged
//! union stored in a derivation history; its `action` tag picks the variant.

mod artificial_variable;
mod multiply_row;
mod objective;
mod pivot;
mod relax_row;
mod substitute_variable;

pub use artificial_variable::{big_m_cost, ArtificialVariable};
pub use multiply_row::MultiplyRow;
pub use pivot::Pivot;
pub use relax_row::RelaxRow;
pub use substitute_variable::{SubstituteVariable, Term};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::label::Label;
use crate::table::Tableau;

pub trait TableauTransform {
    /// Produces the next tableau. `tableau` is never modified, and nothing
    /// is produced on failure.
    fn run(&self, tableau: &Tableau) -> Result<Tableau>;

    /// Describes the transform against the tableau it is (or would be)
    /// applied to. Never fails, even when `run` would.
    fn render(&self, tableau: &Tableau) -> Label;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Transform {
    MultiplyRow(MultiplyRow),
    RelaxRow(RelaxRow),
    #[serde(alias = "ArtificialVar")]
    ArtificialVariable(ArtificialVariable),
    Pivot(Pivot),
    SubstituteVariable(SubstituteVariable),
    ToggleObjectiveSense,
    EnterDisplayMode,
    LeaveDisplayMode,
}

impl TableauTransform for Transform {
    fn run(&self, tableau: &Tableau) -> Result<Tableau> {
        let next = match self {
            Transform::MultiplyRow(t) => t.run(tableau)?,
            Transform::RelaxRow(t) => t.run(tableau)?,
            Transform::ArtificialVariable(t) => t.run(tableau)?,
            Transform::Pivot(t) => t.run(tableau)?,
            Transform::SubstituteVariable(t) => t.run(tableau)?,
            Transform::ToggleObjectiveSense => objective::toggle_sense(tableau),
            Transform::EnterDisplayMode => objective::enter_display_mode(tableau)?,
            Transform::LeaveDisplayMode => objective::leave_display_mode(tableau),
        };
        Ok(objective::settle_display_mode(next))
    }

    fn render(&self, tableau: &Tableau) -> Label {
        match self {
            Transform::MultiplyRow(t) => t.render(tableau),
            Transform::RelaxRow(t) => t.render(tableau),
            Transform::ArtificialVariable(t) => t.render(tableau),
            Transform::Pivot(t) => t.render(tableau),
            Transform::SubstituteVariable(t) => t.render(tableau),
            Transform::ToggleObjectiveSense => Label::ToggleObjectiveSense {
                maximize: !tableau.maximize(),
            },
            Transform::EnterDisplayMode => Label::EnterDisplayMode,
            Transform::LeaveDisplayMode => Label::LeaveDisplayMode,
        }
    }
}

macro_rules! impl_from_transform {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Transform {
                fn from(t: $variant) -> Self {
                    Transform::$variant(t)
                }
            }
        )*
    };
}

impl_from_transform!(MultiplyRow, RelaxRow, ArtificialVariable, Pivot, SubstituteVariable);

#[cfg(test)]
mod tests {
    use super::{MultiplyRow, Pivot, RelaxRow, TableauTransform, Transform};
    use crate::table::{Relation, Row, Tableau};
    use big_m_fraction::Fraction;

    fn int(n: i64) -> Fraction {
        Fraction::from(n)
    }

    #[test]
    fn test_config_json() {
        let json = r#"{"action": "MultiplyRow", "factor": "-1", "row": 1}"#;
        let transform: Transform = serde_json::from_str(json).unwrap();
        assert_eq!(
            transform,
            Transform::MultiplyRow(MultiplyRow {
                factor: int(-1),
                row: 1
            })
        );

        let legacy = r#"{"action": "ArtificialVar", "var_name": "a1", "row_idx": 0}"#;
        let transform: Transform = serde_json::from_str(legacy).unwrap();
        assert!(matches!(transform, Transform::ArtificialVariable(ref t) if t.name == "a1" && t.row == 0));

        let toggle: Transform = serde_json::from_str(r#"{"action": "ToggleObjectiveSense"}"#).unwrap();
        assert_eq!(toggle, Transform::ToggleObjectiveSense);
        assert_eq!(serde_json::to_string(&toggle).unwrap(), r#"{"action":"ToggleObjectiveSense"}"#);

        assert!(serde_json::from_str::<Transform>(r#"{"action": "Solve"}"#).is_err());
    }

    #[test]
    fn test_display_mode_is_left_when_no_longer_canonical() {
        // x1 + x2 + s = 4, s basis; multiplying the row clears its basis
        let row = Row {
            coefficients: vec![int(1), int(1), int(1)],
            relation: Relation::Eq,
            constant: int(4),
            basis: Some(2),
        };
        let table = Tableau::new(vec!["x1".into(), "x2".into(), "s".into()], vec![row], vec![int(1), int(1), int(0)], true)
            .unwrap();
        let shown = Transform::EnterDisplayMode.run(&table).unwrap();
        assert!(shown.display_as_tableau());

        let scaled = Transform::from(MultiplyRow { factor: int(2), row: 0 }).run(&shown).unwrap();
        assert!(!scaled.display_as_tableau());
        assert!(scaled.original_objective().is_none());
    }

    #[test]
    fn test_display_mode_survives_pivot() {
        let row = Row {
            coefficients: vec![int(1), int(2), int(1)],
            relation: Relation::Eq,
            constant: int(4),
            basis: Some(2),
        };
        let table = Tableau::new(vec!["x1".into(), "x2".into(), "s".into()], vec![row], vec![int(3), int(1), int(0)], true)
            .unwrap();
        let shown = Transform::EnterDisplayMode.run(&table).unwrap();
        let pivoted = Transform::from(Pivot { row: 0, variable: 0 }).run(&shown).unwrap();
        assert!(pivoted.display_as_tableau());
        assert!(pivoted.objective()[0].is_zero());
        assert_eq!(pivoted.original_objective().unwrap(), &[int(3), int(1), int(0)]);
    }

    #[test]
    fn test_render_does_not_need_a_valid_step() {
        let table = Tableau::new(vec!["x1".into()], vec![], vec![int(1)], true).unwrap();
        let relax = Transform::from(RelaxRow { name: "s1".into(), row: 3 });
        assert!(relax.run(&table).is_err());
        assert_eq!(relax.render(&table).to_string(), "Relax (4) with s1");

        let pivot = Transform::from(Pivot { row: 0, variable: 9 });
        assert_eq!(pivot.render(&table).to_string(), "Pivot (1) → ?");
    }
}
