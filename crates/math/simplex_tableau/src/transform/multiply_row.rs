use big_m_fraction::{Fraction, FractionError};
use serde::{Deserialize, Serialize};

use super::TableauTransform;
use crate::error::Result;
use crate::label::Label;
use crate::table::{Row, Tableau};

/// Scales both sides of a row; a negative factor flips `<=` and `>=`.
///
/// Any factor other than 1 destroys the identity column of the row's basis
/// variable, so the basis is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplyRow {
    pub factor: Fraction,
    #[serde(alias = "row_idx")]
    pub row: usize,
}

impl TableauTransform for MultiplyRow {
    fn run(&self, tableau: &Tableau) -> Result<Tableau> {
        let row = tableau.row_checked(self.row)?;
        if self.factor.is_zero() {
            return Err(FractionError::InvalidOperand("row factor must be non-zero").into());
        }
        if !self.factor.is_finite() {
            return Err(FractionError::InvalidOperand("row factor cannot contain M").into());
        }

        let relation = if self.factor.is_negative() {
            row.relation.flipped()
        } else {
            row.relation
        };
        let scaled = Row {
            coefficients: row.coefficients.iter().map(|c| c * &self.factor).collect(),
            relation,
            constant: &row.constant * &self.factor,
            basis: row.basis.filter(|_| self.factor == Fraction::one()),
        };

        let mut table = tableau.shallow_clone();
        table.rows_mut()[self.row] = scaled;
        Ok(table)
    }

    fn render(&self, _tableau: &Tableau) -> Label {
        Label::MultiplyRow {
            row: self.row,
            factor: self.factor.clone(),
        }
    }
}
