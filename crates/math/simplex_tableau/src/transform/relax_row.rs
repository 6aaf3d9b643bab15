use big_m_fraction::Fraction;
use serde::{Deserialize, Serialize};

use super::TableauTransform;
use crate::error::{Result, TableauError};
use crate::label::Label;
use crate::table::{Relation, Tableau};

/// Turns a `<=` row into an equality with a new slack variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxRow {
    #[serde(alias = "var_name")]
    pub name: String,
    #[serde(alias = "row_idx")]
    pub row: usize,
}

impl TableauTransform for RelaxRow {
    fn run(&self, tableau: &Tableau) -> Result<Tableau> {
        let row = tableau.row_checked(self.row)?;
        tableau.check_new_name(&self.name)?;
        if row.relation != Relation::Le {
            return Err(TableauError::UnsupportedRelation {
                row: self.row,
                relation: row.relation,
                expected: Relation::Le,
            });
        }
        // the slack can only be basic if its value, the constant, is >= 0
        let feasible = !row.constant.is_negative();

        let mut table = tableau.deep_clone();
        let id = table.push_variable(&self.name);
        let row = &mut table.rows_mut()[self.row];
        row.coefficients[id] = Fraction::one();
        row.relation = Relation::Eq;
        row.basis = feasible.then_some(id);
        Ok(table)
    }

    fn render(&self, _tableau: &Tableau) -> Label {
        Label::RelaxRow {
            row: self.row,
            variable: self.name.clone(),
        }
    }
}
