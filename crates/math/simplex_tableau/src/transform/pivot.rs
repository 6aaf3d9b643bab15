use big_m_fraction::Fraction;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::TableauTransform;
use crate::error::{Result, TableauError};
use crate::label::Label;
use crate::table::{Relation, Row, Tableau, VariableId};

/// One simplex pivot: `variable` enters the basis of equality row `row`.
///
/// The pivot element must be positive and the row must pass the
/// minimum-ratio test against every other row with a positive entry in the
/// column, including rows whose constant is negative. Ties are accepted, so
/// degenerate pivots are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pivot {
    #[serde(alias = "row_idx")]
    pub row: usize,
    #[serde(alias = "var_id")]
    pub variable: VariableId,
}

/// `row -= k * pivot` over coefficients and constant.
fn eliminate(row: &mut Row, pivot: &Row, k: &Fraction) {
    for (c, p) in row.coefficients.iter_mut().zip(&pivot.coefficients) {
        *c = &*c - &(k * p);
    }
    row.constant = &row.constant - &(k * &pivot.constant);
}

impl Pivot {
    fn ratio_test(&self, tableau: &Tableau, ratio: &Fraction) -> Result<()> {
        for (idx, other) in tableau.rows().iter().enumerate() {
            if idx == self.row {
                continue;
            }
            let entry = &other.coefficients[self.variable];
            if !entry.is_positive() {
                continue;
            }
            let other_ratio = other.constant.checked_div(entry)?;
            trace!(row = idx, ratio = %other_ratio, pivot_ratio = %ratio, "ratio test");
            if other_ratio < *ratio {
                return Err(TableauError::RatioTestViolation {
                    row: self.row,
                    other: idx,
                });
            }
        }
        Ok(())
    }
}

impl TableauTransform for Pivot {
    fn run(&self, tableau: &Tableau) -> Result<Tableau> {
        let pivot_row = tableau.row_checked(self.row)?;
        let name = tableau.require_alive(self.variable)?;
        if pivot_row.basis == Some(self.variable) {
            return Err(TableauError::AlreadyBasis {
                row: self.row,
                variable: name.to_string(),
            });
        }
        let element = &pivot_row.coefficients[self.variable];
        if !element.is_positive() {
            return Err(TableauError::Unbounded {
                row: self.row,
                variable: name.to_string(),
            });
        }
        if pivot_row.relation != Relation::Eq {
            return Err(TableauError::UnsupportedRelation {
                row: self.row,
                relation: pivot_row.relation,
                expected: Relation::Eq,
            });
        }
        let ratio = pivot_row.constant.checked_div(element)?;
        self.ratio_test(tableau, &ratio)?;

        let normalized = Row {
            coefficients: pivot_row
                .coefficients
                .iter()
                .map(|c| c.checked_div(element))
                .collect::<std::result::Result<Vec<_>, _>>()?,
            relation: Relation::Eq,
            constant: ratio,
            basis: Some(self.variable),
        };

        let mut table = tableau.shallow_clone();
        for (idx, row) in table.rows_mut().iter_mut().enumerate() {
            if idx == self.row {
                continue;
            }
            let k = row.coefficients[self.variable].clone();
            if !k.is_zero() {
                eliminate(row, &normalized, &k);
            }
            if row.basis == Some(self.variable) {
                row.basis = None;
            }
        }

        // objective: c -= c_v * pivot, and the constant picks up c_v * b
        let k = table.objective()[self.variable].clone();
        if !k.is_zero() {
            let objective = table.objective_mut();
            for (c, p) in objective.iter_mut().zip(&normalized.coefficients) {
                *c = &*c - &(&k * p);
            }
            table.objective_constant = &table.objective_constant + &(&k * &normalized.constant);
        }

        table.rows_mut()[self.row] = normalized;
        Ok(table)
    }

    fn render(&self, tableau: &Tableau) -> Label {
        let leaving = tableau
            .rows()
            .get(self.row)
            .and_then(|row| row.basis)
            .map(|basis| tableau.display_name(basis).to_string());
        Label::Pivot {
            row: self.row,
            leaving,
            entering: tableau.display_name(self.variable).to_string(),
        }
    }
}
