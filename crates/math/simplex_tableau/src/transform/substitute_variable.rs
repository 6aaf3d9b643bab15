use std::sync::Arc;

use big_m_fraction::{Fraction, FractionError};
use serde::{Deserialize, Serialize};

use super::TableauTransform;
use crate::error::{Result, TableauError};
use crate::label::Label;
use crate::table::{Bound, Relation, Row, Tableau, VariableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub coefficient: Fraction,
    pub name: String,
}

impl Term {
    pub fn new(coefficient: Fraction, name: impl Into<String>) -> Self {
        Self {
            coefficient,
            name: name.into(),
        }
    }
}

/// Replaces `variable` everywhere by `terms + constant`, where each term
/// introduces a fresh variable with the implicit `>= 0` bound.
///
/// With one term the old bound is carried over to the new variable
/// (`x >= l`, `x = c y + d` gives `y >= (l - d) / c`, flipped when `c < 0`).
/// With two terms, as in splitting a free variable `x = x' - x''`, a bound
/// that is not `Free` becomes an extra constraint row on the new variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstituteVariable {
    #[serde(alias = "var_id")]
    pub variable: VariableId,
    pub terms: Vec<Term>,
    #[serde(default)]
    pub constant: Fraction,
}

fn transfer_bound(bound: &Bound, term: &Term, constant: &Fraction) -> Result<Bound> {
    let (lower, value) = match bound {
        Bound::Free => return Ok(Bound::Free),
        Bound::AtLeast(value) => (true, value),
        Bound::AtMost(value) => (false, value),
    };
    let shifted = (value - constant).checked_div(&term.coefficient)?;
    if lower != term.coefficient.is_negative() {
        Ok(Bound::AtLeast(shifted))
    } else {
        Ok(Bound::AtMost(shifted))
    }
}

impl SubstituteVariable {
    fn validate(&self, tableau: &Tableau) -> Result<()> {
        let target = tableau.require_alive(self.variable)?;
        if self.terms.len() > 2 {
            return Err(TableauError::TooManyTerms(self.terms.len()));
        }
        if self.terms.is_empty() {
            return Err(TableauError::NoFreeVariable);
        }
        if let Some(row) = tableau.rows().iter().position(|r| r.basis == Some(self.variable)) {
            return Err(TableauError::VariableInUse {
                variable: target.to_string(),
                row,
            });
        }
        for term in &self.terms {
            tableau.check_new_name(&term.name)?;
            if term.coefficient.is_zero() {
                return Err(FractionError::InvalidOperand("substitution coefficient must be non-zero").into());
            }
            if !term.coefficient.is_finite() {
                return Err(FractionError::InvalidOperand("substitution coefficient cannot contain M").into());
            }
        }
        if !self.constant.is_finite() {
            return Err(FractionError::InvalidOperand("substitution constant cannot contain M").into());
        }
        if let [first, second] = self.terms.as_slice() {
            if first.name == second.name {
                return Err(TableauError::DuplicateName(second.name.clone()));
            }
            let free = tableau.bound_of(self.variable) == Bound::Free;
            if !free && first.coefficient.signum() == second.coefficient.signum() {
                return Err(TableauError::SignMismatch(target.to_string()));
            }
        }
        Ok(())
    }
}

impl TableauTransform for SubstituteVariable {
    fn run(&self, tableau: &Tableau) -> Result<Tableau> {
        self.validate(tableau)?;
        let v = self.variable;
        let bound = tableau.bound_of(v);

        let mut table = tableau.deep_clone();
        let ids: Vec<VariableId> = self.terms.iter().map(|t| table.push_variable(&t.name)).collect();

        for row in table.rows_mut() {
            let a = std::mem::take(&mut row.coefficients[v]);
            if a.is_zero() {
                continue;
            }
            for (term, &id) in self.terms.iter().zip(&ids) {
                row.coefficients[id] = &a * &term.coefficient;
            }
            row.constant = &row.constant - &(&a * &self.constant);
        }

        let c = std::mem::take(&mut table.objective_mut()[v]);
        if !c.is_zero() {
            for (term, &id) in self.terms.iter().zip(&ids) {
                table.objective_mut()[id] = &c * &term.coefficient;
            }
            table.objective_constant = &table.objective_constant + &(&c * &self.constant);
        }
        if let Some(original) = &mut table.original_objective {
            let original = Arc::make_mut(original);
            let c = std::mem::take(&mut original[v]);
            for (term, &id) in self.terms.iter().zip(&ids) {
                original[id] = &c * &term.coefficient;
            }
        }

        table.retire_variable(v);
        match (self.terms.as_slice(), ids.as_slice()) {
            ([term], [id]) => {
                let derived = transfer_bound(&bound, term, &self.constant)?;
                table.set_bound(*id, derived);
            }
            (terms, ids) => {
                let (relation, value) = match &bound {
                    Bound::Free => return Ok(table),
                    Bound::AtLeast(value) => (Relation::Ge, value),
                    Bound::AtMost(value) => (Relation::Le, value),
                };
                let mut coefficients = vec![Fraction::zero(); table.variable_count()];
                for (term, &id) in terms.iter().zip(ids) {
                    coefficients[id] = term.coefficient.clone();
                }
                table
                    .rows_mut()
                    .push(Row::new(coefficients, relation, value - &self.constant));
            }
        }
        Ok(table)
    }

    fn render(&self, tableau: &Tableau) -> Label {
        Label::SubstituteVariable {
            variable: tableau.display_name(self.variable).to_string(),
            terms: self
                .terms
                .iter()
                .map(|t| (t.coefficient.clone(), t.name.clone()))
                .collect(),
            constant: self.constant.clone(),
        }
    }
}
