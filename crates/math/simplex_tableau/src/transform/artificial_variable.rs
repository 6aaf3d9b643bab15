use big_m_fraction::Fraction;
use serde::{Deserialize, Serialize};

use super::TableauTransform;
use crate::error::{Result, TableauError};
use crate::label::Label;
use crate::table::{Relation, Tableau};

/// Objective coefficient of an artificial variable: `-M` when maximizing,
/// `+M` when minimizing, so optimization drives it out of the basis.
pub fn big_m_cost(maximize: bool) -> Fraction {
    if maximize {
        -Fraction::big_m()
    } else {
        Fraction::big_m()
    }
}

/// Gives an equality row a basis variable of its own.
///
/// If the row's constant is negative the row is negated first, which is the
/// same as giving the artificial variable coefficient -1 and keeps the
/// constant (the artificial variable's value) non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtificialVariable {
    #[serde(alias = "var_name")]
    pub name: String,
    #[serde(alias = "row_idx")]
    pub row: usize,
}

impl TableauTransform for ArtificialVariable {
    fn run(&self, tableau: &Tableau) -> Result<Tableau> {
        let row = tableau.row_checked(self.row)?;
        tableau.check_new_name(&self.name)?;
        if row.relation != Relation::Eq {
            return Err(TableauError::UnsupportedRelation {
                row: self.row,
                relation: row.relation,
                expected: Relation::Eq,
            });
        }
        let negate = row.constant.is_negative();
        let cost = big_m_cost(tableau.maximize());

        let mut table = tableau.deep_clone();
        let id = table.push_variable(&self.name);
        let row = &mut table.rows_mut()[self.row];
        if negate {
            for c in row.coefficients.iter_mut() {
                *c = -&*c;
            }
            row.constant = -&row.constant;
        }
        row.coefficients[id] = Fraction::one();
        row.basis = Some(id);

        if let Some(original) = &mut table.original_objective {
            std::sync::Arc::make_mut(original)[id] = cost.clone();
        }
        table.objective_mut()[id] = cost;
        Ok(table)
    }

    fn render(&self, tableau: &Tableau) -> Label {
        Label::ArtificialVariable {
            row: self.row,
            variable: self.name.clone(),
            cost: big_m_cost(tableau.maximize()),
        }
    }
}
