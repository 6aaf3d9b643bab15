//! Immutable snapshot of one step of a derivation.
//!
//! Every array lives behind an [`Arc`]: [`Tableau::shallow_clone`] shares all of
//! them and a transform only detaches the ones it writes to (through
//! `Arc::make_mut`), while [`Tableau::deep_clone`] detaches everything up
//! front. Once handed out, a `Tableau` is never mutated again.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use big_m_fraction::Fraction;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TableauError};

/// Variable ids are allocated append-only and never reused.
pub type VariableId = usize;

/// Rendered in place of a variable that no longer exists.
pub const PLACEHOLDER: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "=")]
    Eq,
}

impl Relation {
    /// The relation obtained after multiplying both sides by a negative number.
    pub fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
            Relation::Eq => Relation::Eq,
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "<=" | "≤" | "le" | "\\le" => Ok(Relation::Le),
            ">=" | "≥" | "ge" | "\\ge" => Ok(Relation::Ge),
            "=" | "==" | "eq" => Ok(Relation::Eq),
            other => Err(TableauError::InvalidRelation(other.to_string())),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Bound on a single variable. `AtLeast(0)` is the implicit default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    AtMost(Fraction),
    AtLeast(Fraction),
    Free,
}

impl Bound {
    pub fn is_default(&self) -> bool {
        matches!(self, Bound::AtLeast(value) if value.is_zero())
    }
}

impl Default for Bound {
    fn default() -> Self {
        Bound::AtLeast(Fraction::zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonStandardBound {
    pub variable: VariableId,
    pub bound: Bound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Indexed by variable id, including dead ids.
    pub coefficients: Vec<Fraction>,
    pub relation: Relation,
    pub constant: Fraction,
    pub basis: Option<VariableId>,
}

impl Row {
    pub fn new(coefficients: Vec<Fraction>, relation: Relation, constant: Fraction) -> Self {
        Self {
            coefficients,
            relation,
            constant,
            basis: None,
        }
    }
}

/// Letters, then digits, then primes: `x1`, `y`, `s12`, `x2''`.
pub fn is_valid_variable_name(name: &str) -> bool {
    let letters = name.chars().take_while(char::is_ascii_alphabetic).count();
    if letters == 0 {
        return false;
    }
    let rest = &name[letters..];
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    rest[digits..].chars().all(|c| c == '\'')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tableau {
    pub(crate) name_to_id: Arc<BTreeMap<String, VariableId>>,
    pub(crate) id_to_name: Arc<Vec<String>>,
    pub(crate) rows: Arc<Vec<Row>>,
    pub(crate) objective: Arc<Vec<Fraction>>,
    pub(crate) objective_constant: Fraction,
    pub(crate) maximize: bool,
    pub(crate) original_objective: Option<Arc<Vec<Fraction>>>,
    pub(crate) bounds: Arc<Vec<NonStandardBound>>,
    pub(crate) display_as_tableau: bool,
}

impl Tableau {
    /// Builds the first tableau of a derivation. Every variable starts with
    /// the implicit `>= 0` bound; see [`Tableau::with_bound`].
    pub fn new(variables: Vec<String>, rows: Vec<Row>, objective: Vec<Fraction>, maximize: bool) -> Result<Self> {
        let mut name_to_id = BTreeMap::new();
        for (id, name) in variables.iter().enumerate() {
            if name_to_id.insert(name.clone(), id).is_some() {
                return Err(TableauError::DuplicateName(name.clone()));
            }
        }
        for row in &rows {
            if row.coefficients.len() != variables.len() {
                return Err(TableauError::DimensionMismatch {
                    context: "constraint coefficients",
                    expected: variables.len(),
                    found: row.coefficients.len(),
                });
            }
            if let Some(basis) = row.basis {
                if basis >= variables.len() {
                    return Err(TableauError::VariableNotFound(format!("#{}", basis)));
                }
            }
        }
        if objective.len() != variables.len() {
            return Err(TableauError::DimensionMismatch {
                context: "objective coefficients",
                expected: variables.len(),
                found: objective.len(),
            });
        }

        Ok(Self {
            name_to_id: Arc::new(name_to_id),
            id_to_name: Arc::new(variables),
            rows: Arc::new(rows),
            objective: Arc::new(objective),
            objective_constant: Fraction::zero(),
            maximize,
            original_objective: None,
            bounds: Arc::new(Vec::new()),
            display_as_tableau: false,
        })
    }

    pub fn with_bound(mut self, variable: VariableId, bound: Bound) -> Result<Self> {
        self.require_alive(variable)?;
        self.set_bound(variable, bound);
        Ok(self)
    }

    pub fn with_objective_constant(mut self, constant: Fraction) -> Self {
        self.objective_constant = constant;
        self
    }

    /// A copy sharing every array with `self`.
    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }

    /// A copy owning fresh arrays.
    pub fn deep_clone(&self) -> Self {
        Self {
            name_to_id: Arc::new((*self.name_to_id).clone()),
            id_to_name: Arc::new((*self.id_to_name).clone()),
            rows: Arc::new((*self.rows).clone()),
            objective: Arc::new((*self.objective).clone()),
            objective_constant: self.objective_constant.clone(),
            maximize: self.maximize,
            original_objective: self.original_objective.as_ref().map(|o| Arc::new((**o).clone())),
            bounds: Arc::new((*self.bounds).clone()),
            display_as_tableau: self.display_as_tableau,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn objective(&self) -> &[Fraction] {
        &self.objective
    }

    pub fn objective_constant(&self) -> &Fraction {
        &self.objective_constant
    }

    pub fn maximize(&self) -> bool {
        self.maximize
    }

    /// The `c_j` header row, frozen when the tableau entered display mode.
    pub fn original_objective(&self) -> Option<&[Fraction]> {
        self.original_objective.as_deref().map(Vec::as_slice)
    }

    pub fn non_standard_bounds(&self) -> &[NonStandardBound] {
        &self.bounds
    }

    pub fn display_as_tableau(&self) -> bool {
        self.display_as_tableau
    }

    /// Number of ids ever allocated, dead ones included.
    pub fn variable_count(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_variable_alive(&self, id: VariableId) -> bool {
        self.id_to_name
            .get(id)
            .and_then(|name| self.name_to_id.get(name))
            .is_some_and(|&live| live == id)
    }

    pub fn is_name_in_use(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    pub fn variable_id(&self, name: &str) -> Option<VariableId> {
        self.name_to_id.get(name).copied()
    }

    /// Name of a live variable.
    pub fn variable_name(&self, id: VariableId) -> Option<&str> {
        if self.is_variable_alive(id) {
            Some(&self.id_to_name[id])
        } else {
            None
        }
    }

    /// Name of a variable, or [`PLACEHOLDER`] if it is dead or unknown.
    pub fn display_name(&self, id: VariableId) -> &str {
        self.variable_name(id).unwrap_or(PLACEHOLDER)
    }

    /// Live variables in id order.
    pub fn live_variables(&self) -> impl Iterator<Item = (VariableId, &str)> + '_ {
        self.id_to_name
            .iter()
            .enumerate()
            .filter(|&(id, _)| self.is_variable_alive(id))
            .map(|(id, name)| (id, name.as_str()))
    }

    pub fn bound_of(&self, id: VariableId) -> Bound {
        self.bounds
            .iter()
            .find(|b| b.variable == id)
            .map(|b| b.bound.clone())
            .unwrap_or_default()
    }

    pub fn can_display_as_tableau(&self) -> bool {
        self.bounds.is_empty()
            && self.rows.iter().all(|row| {
                row.relation == Relation::Eq && row.basis.is_some_and(|basis| self.is_variable_alive(basis))
            })
    }

    /// First name of the form `x1`, `x2`, ... that is not taken.
    pub fn suggest_variable_name(&self) -> String {
        let mut index = 1;
        loop {
            let candidate = format!("x{}", index);
            if !self.is_name_in_use(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    pub(crate) fn row_checked(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(TableauError::IndexOutOfRange {
            what: "row",
            index,
            len: self.rows.len(),
        })
    }

    pub(crate) fn require_alive(&self, id: VariableId) -> Result<&str> {
        self.variable_name(id)
            .ok_or_else(|| TableauError::VariableNotFound(format!("#{}", id)))
    }

    pub(crate) fn check_new_name(&self, name: &str) -> Result<()> {
        if !is_valid_variable_name(name) {
            return Err(TableauError::InvalidName(name.to_string()));
        }
        if self.is_name_in_use(name) {
            return Err(TableauError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        Arc::make_mut(&mut self.rows)
    }

    pub(crate) fn objective_mut(&mut self) -> &mut Vec<Fraction> {
        Arc::make_mut(&mut self.objective)
    }

    /// Appends a zero column for `name` and returns its id.
    pub(crate) fn push_variable(&mut self, name: &str) -> VariableId {
        let id = self.id_to_name.len();
        Arc::make_mut(&mut self.id_to_name).push(name.to_string());
        Arc::make_mut(&mut self.name_to_id).insert(name.to_string(), id);
        for row in self.rows_mut() {
            row.coefficients.push(Fraction::zero());
        }
        self.objective_mut().push(Fraction::zero());
        if let Some(original) = &mut self.original_objective {
            Arc::make_mut(original).push(Fraction::zero());
        }
        id
    }

    /// Kills `id`: its name is released, its slot in `id_to_name` stays.
    pub(crate) fn retire_variable(&mut self, id: VariableId) {
        let name = &self.id_to_name[id];
        Arc::make_mut(&mut self.name_to_id).remove(name);
        if self.bounds.iter().any(|b| b.variable == id) {
            Arc::make_mut(&mut self.bounds).retain(|b| b.variable != id);
        }
    }

    pub(crate) fn set_bound(&mut self, id: VariableId, bound: Bound) {
        let bounds = Arc::make_mut(&mut self.bounds);
        bounds.retain(|b| b.variable != id);
        if !bound.is_default() {
            bounds.push(NonStandardBound { variable: id, bound });
        }
    }

    /// Subtracts multiples of the basis rows from the objective until every
    /// basis column has a zero objective coefficient.
    pub(crate) fn reduce_objective(&mut self) -> Result<()> {
        let rows = Arc::clone(&self.rows);
        for row in rows.iter() {
            let Some(basis) = row.basis else { continue };
            let k = self.objective[basis].clone();
            if k.is_zero() {
                continue;
            }
            let objective = self.objective_mut();
            for (c, a) in objective.iter_mut().zip(&row.coefficients) {
                *c = &*c - &(&k * a);
            }
            self.objective_constant = &self.objective_constant + &(&k * &row.constant);
        }

        let reduced = rows
            .iter()
            .filter_map(|row| row.basis)
            .all(|basis| self.objective[basis].is_zero());
        if !reduced {
            return Err(TableauError::NotCanonical("a basis column is not an identity column"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_variable_name, Bound, Relation, Row, Tableau, PLACEHOLDER};
    use crate::error::TableauError;
    use big_m_fraction::Fraction;
    use std::sync::Arc;

    fn int(n: i64) -> Fraction {
        Fraction::from(n)
    }

    fn sample() -> Tableau {
        let rows = vec![
            Row::new(vec![int(1), int(1)], Relation::Le, int(4)),
            Row::new(vec![int(1), int(3)], Relation::Le, int(6)),
        ];
        Tableau::new(vec!["x1".into(), "x2".into()], rows, vec![int(3), int(2)], true).unwrap()
    }

    #[test]
    fn test_new_validates_shape() {
        let rows = vec![Row::new(vec![int(1)], Relation::Le, int(4))];
        let err = Tableau::new(vec!["x1".into(), "x2".into()], rows, vec![int(1), int(1)], true).unwrap_err();
        assert_eq!(
            err,
            TableauError::DimensionMismatch { context: "constraint coefficients", expected: 2, found: 1 }
        );

        let err = Tableau::new(vec!["x1".into(), "x1".into()], vec![], vec![int(1), int(1)], true).unwrap_err();
        assert_eq!(err, TableauError::DuplicateName("x1".into()));
    }

    #[test]
    fn test_liveness() {
        let mut table = sample();
        assert!(table.is_variable_alive(0));
        assert!(!table.is_variable_alive(7));
        table.retire_variable(0);
        assert!(!table.is_variable_alive(0));
        assert!(!table.is_name_in_use("x1"));
        assert_eq!(table.variable_count(), 2);
        assert_eq!(table.display_name(0), PLACEHOLDER);
        assert_eq!(table.live_variables().collect::<Vec<_>>(), vec![(1, "x2")]);
    }

    #[test]
    fn test_push_variable_extends_columns() {
        let mut table = sample();
        let id = table.push_variable("s1");
        assert_eq!(id, 2);
        assert!(table.rows().iter().all(|r| r.coefficients.len() == 3));
        assert_eq!(table.objective().len(), 3);
        assert_eq!(table.variable_id("s1"), Some(2));
    }

    #[test]
    fn test_shallow_clone_shares_until_written() {
        let table = sample();
        let mut copy = table.shallow_clone();
        assert!(Arc::ptr_eq(&table.rows, &copy.rows));
        copy.rows_mut()[0].constant = int(9);
        assert!(!Arc::ptr_eq(&table.rows, &copy.rows));
        assert!(Arc::ptr_eq(&table.objective, &copy.objective));
        assert_eq!(table.rows()[0].constant, int(4));

        let deep = table.deep_clone();
        assert!(!Arc::ptr_eq(&table.objective, &deep.objective));
        assert_eq!(deep, table);
    }

    #[test]
    fn test_bounds() {
        let table = sample().with_bound(1, Bound::AtLeast(int(-3))).unwrap();
        assert_eq!(table.bound_of(1), Bound::AtLeast(int(-3)));
        assert_eq!(table.bound_of(0), Bound::default());
        let table = table.with_bound(1, Bound::AtLeast(int(0))).unwrap();
        assert!(table.non_standard_bounds().is_empty());
        assert!(sample().with_bound(5, Bound::Free).is_err());
    }

    #[test]
    fn test_can_display_as_tableau() {
        let table = sample();
        assert!(!table.can_display_as_tableau());

        let mut rows = table.rows().to_vec();
        for (idx, row) in rows.iter_mut().enumerate() {
            row.relation = Relation::Eq;
            row.basis = Some(idx);
        }
        let mut table = table.shallow_clone();
        *table.rows_mut() = rows;
        assert!(table.can_display_as_tableau());
        let table = table.with_bound(0, Bound::Free).unwrap();
        assert!(!table.can_display_as_tableau());
    }

    #[test]
    fn test_variable_names() {
        assert!(is_valid_variable_name("x1"));
        assert!(is_valid_variable_name("y"));
        assert!(is_valid_variable_name("x2''"));
        assert!(!is_valid_variable_name("1x"));
        assert!(!is_valid_variable_name("x_1"));
        assert!(!is_valid_variable_name("x'1"));
        assert!(!is_valid_variable_name(""));
        assert_eq!(sample().suggest_variable_name(), "x3");
    }

    #[test]
    fn test_relation_parse() {
        assert_eq!(Relation::parse("<=").unwrap(), Relation::Le);
        assert_eq!(Relation::parse("\\ge").unwrap(), Relation::Ge);
        assert_eq!(Relation::parse("=").unwrap(), Relation::Eq);
        assert_eq!(Relation::parse("<").unwrap_err(), TableauError::InvalidRelation("<".into()));
        assert_eq!(Relation::Le.flipped(), Relation::Ge);
        assert_eq!(Relation::Eq.flipped(), Relation::Eq);
    }
}
