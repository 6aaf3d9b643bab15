//! Structured LP description consumed by [`Tableau::from_problem`].
//!
//! Numbers may be written as integers, decimals, decimal strings or `"p/q"`
//! strings. A constraint is either an object or the compact tuple
//! `[c1, c2, ..., relation, constant]`. The legacy field names (`var_list`,
//! `coef`, `rel`, `p0`, ...) are accepted as aliases.

use std::collections::BTreeMap;

use big_m_fraction::Fraction;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TableauError};
use crate::table::{Bound, Relation, Row, Tableau};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Unsigned(u64),
    Decimal(f64),
    Text(String),
}

impl Scalar {
    pub fn to_fraction(&self) -> Result<Fraction> {
        let value = match self {
            Scalar::Integer(n) => Fraction::from(*n),
            Scalar::Unsigned(n) => Fraction::integer(*n),
            Scalar::Decimal(x) => Fraction::from_f64(*x)?,
            Scalar::Text(text) => text.parse()?,
        };
        Ok(value)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Integer(n)
    }
}

impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Scalar::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint {
    Full {
        #[serde(alias = "coef")]
        coefficients: Vec<Scalar>,
        #[serde(alias = "rel")]
        relation: String,
        #[serde(alias = "p0")]
        constant: Scalar,
    },
    Compact(Vec<Scalar>),
}

impl Constraint {
    fn parts(&self) -> Result<(&[Scalar], Relation, &Scalar)> {
        match self {
            Constraint::Full {
                coefficients,
                relation,
                constant,
            } => Ok((coefficients, Relation::parse(relation)?, constant)),
            Constraint::Compact(items) => {
                let [coefficients @ .., relation, constant] = items.as_slice() else {
                    return Err(TableauError::DimensionMismatch {
                        context: "compact constraint",
                        expected: 2,
                        found: items.len(),
                    });
                };
                let Scalar::Text(relation) = relation else {
                    return Err(TableauError::InvalidRelation(format!("{:?}", relation)));
                };
                Ok((coefficients, Relation::parse(relation)?, constant))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundSpec {
    #[serde(alias = "rel")]
    pub relation: String,
    #[serde(default, alias = "val", skip_serializing_if = "Option::is_none")]
    pub bound: Option<Scalar>,
}

impl BoundSpec {
    fn to_bound(&self) -> Result<Bound> {
        if self.relation.trim() == "any" {
            return Ok(Bound::Free);
        }
        let value = match &self.bound {
            Some(value) => value.to_fraction()?,
            None => Fraction::zero(),
        };
        match Relation::parse(&self.relation)? {
            Relation::Le => Ok(Bound::AtMost(value)),
            Relation::Ge => Ok(Bound::AtLeast(value)),
            Relation::Eq => Err(TableauError::InvalidRelation(self.relation.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    #[serde(alias = "var_list")]
    pub variables: Vec<String>,
    pub constraints: Vec<Constraint>,
    #[serde(alias = "target_coef")]
    pub objective: Vec<Scalar>,
    /// Variables missing here keep the implicit `>= 0` bound.
    #[serde(default, alias = "var_constraints")]
    pub bounds: BTreeMap<String, BoundSpec>,
    #[serde(default, alias = "target_is_max")]
    pub maximize: bool,
}

impl LinearProgram {
    /// Sample problem with a shifted lower bound and a free variable.
    pub fn example() -> Self {
        let mut bounds = BTreeMap::new();
        bounds.insert(
            "x2".to_string(),
            BoundSpec {
                relation: ">=".into(),
                bound: Some(1.into()),
            },
        );
        bounds.insert(
            "x3".to_string(),
            BoundSpec {
                relation: "any".into(),
                bound: None,
            },
        );
        LinearProgram {
            variables: vec!["x1".into(), "x2".into(), "x3".into()],
            constraints: vec![
                Constraint::Full {
                    coefficients: vec![1.into(), (-1).into(), "3/3".into()],
                    relation: ">=".into(),
                    constant: (-3).into(),
                },
                Constraint::Full {
                    coefficients: vec![2.into(), 1.into(), 1.into()],
                    relation: "<=".into(),
                    constant: 9.into(),
                },
                Constraint::Full {
                    coefficients: vec![1.into(), 3.into(), 1.into()],
                    relation: ">=".into(),
                    constant: 4.into(),
                },
            ],
            objective: vec![(-1).into(), (-3).into(), 5.into()],
            bounds,
            maximize: false,
        }
    }

    pub fn to_tableau(&self) -> Result<Tableau> {
        Tableau::from_problem(self)
    }
}

fn fractions(values: &[Scalar]) -> Result<Vec<Fraction>> {
    values.iter().map(Scalar::to_fraction).collect()
}

impl Tableau {
    pub fn from_problem(problem: &LinearProgram) -> Result<Self> {
        let rows = problem
            .constraints
            .iter()
            .map(|constraint| {
                let (coefficients, relation, constant) = constraint.parts()?;
                Ok(Row::new(fractions(coefficients)?, relation, constant.to_fraction()?))
            })
            .collect::<Result<Vec<_>>>()?;
        let objective = fractions(&problem.objective)?;

        let mut table = Tableau::new(problem.variables.clone(), rows, objective, problem.maximize)?;
        for (name, spec) in &problem.bounds {
            let id = table
                .variable_id(name)
                .ok_or_else(|| TableauError::VariableNotFound(name.clone()))?;
            table = table.with_bound(id, spec.to_bound()?)?;
        }

        debug!(
            variables = table.variable_count(),
            rows = table.rows().len(),
            bounds = table.non_standard_bounds().len(),
            "built initial tableau"
        );
        Ok(table)
    }
}

impl TryFrom<&LinearProgram> for Tableau {
    type Error = TableauError;

    fn try_from(problem: &LinearProgram) -> Result<Self> {
        Tableau::from_problem(problem)
    }
}

#[cfg(test)]
mod tests {
    use super::LinearProgram;
    use crate::error::TableauError;
    use crate::table::{Bound, Relation, Tableau};
    use big_m_fraction::{Fraction, FractionError};

    fn parse(json: &str) -> LinearProgram {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_object_and_compact_constraints() {
        let problem = parse(
            r#"{
                "variables": ["x1", "x2"],
                "constraints": [
                    {"coefficients": [3, "2/3"], "relation": "<=", "constant": 4},
                    [0, 4, "<=", "3"]
                ],
                "objective": [1.5, 3],
                "maximize": true
            }"#,
        );
        let table = Tableau::from_problem(&problem).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].coefficients[1], Fraction::new(2, 3).unwrap());
        assert_eq!(table.rows()[1].relation, Relation::Le);
        assert_eq!(table.rows()[1].constant, Fraction::from(3));
        assert_eq!(table.objective()[0], Fraction::new(3, 2).unwrap());
        assert!(table.maximize());
        assert!(table.non_standard_bounds().is_empty());
    }

    #[test]
    fn test_example_problem() {
        let table = LinearProgram::example().to_tableau().unwrap();
        assert_eq!(table.rows()[0].coefficients[2], Fraction::one());
        assert_eq!(table.bound_of(1), Bound::AtLeast(Fraction::one()));
        assert_eq!(table.bound_of(2), Bound::Free);
        assert_eq!(table.bound_of(0), Bound::default());
        assert!(!table.maximize());
    }

    #[test]
    fn test_integers_beyond_i64_stay_exact() {
        let problem = parse(
            r#"{
                "variables": ["x"],
                "constraints": [[18446744073709551615, "<=", 9223372036854775808]],
                "objective": [1]
            }"#,
        );
        let table = Tableau::from_problem(&problem).unwrap();
        assert_eq!(table.rows()[0].coefficients[0], Fraction::integer(u64::MAX));
        assert_eq!(table.rows()[0].constant, Fraction::integer(1u64 << 63));
        assert_eq!(table.rows()[0].constant.to_string(), "9223372036854775808");
    }

    #[test]
    fn test_legacy_field_names() {
        let problem = parse(
            r#"{
                "var_list": ["x1", "x2"],
                "constraints": [{"coef": [1, -1], "rel": ">=", "p0": -3}],
                "target_coef": [-1, -3],
                "var_constraints": {"x2": {"rel": "<=", "val": "5/2"}},
                "target_is_max": false
            }"#,
        );
        let table = Tableau::from_problem(&problem).unwrap();
        assert_eq!(table.rows()[0].relation, Relation::Ge);
        assert_eq!(table.bound_of(1), Bound::AtMost(Fraction::new(5, 2).unwrap()));
    }

    #[test]
    fn test_malformed_input() {
        let bad_relation = parse(r#"{"variables": ["x"], "constraints": [[1, "<", 2]], "objective": [1]}"#);
        assert_eq!(
            Tableau::from_problem(&bad_relation).unwrap_err(),
            TableauError::InvalidRelation("<".into())
        );

        let bad_number = parse(r#"{"variables": ["x"], "constraints": [[1, "<=", "two"]], "objective": [1]}"#);
        assert_eq!(
            Tableau::from_problem(&bad_number).unwrap_err(),
            TableauError::Fraction(FractionError::ParseError("two".into()))
        );

        let short_row = parse(r#"{"variables": ["x", "y"], "constraints": [[1, "<=", 2]], "objective": [1, 1]}"#);
        assert!(matches!(
            Tableau::from_problem(&short_row).unwrap_err(),
            TableauError::DimensionMismatch { expected: 2, found: 1, .. }
        ));

        let unknown_bound =
            parse(r#"{"variables": ["x"], "constraints": [], "objective": [1], "bounds": {"y": {"relation": "any"}}}"#);
        assert_eq!(
            Tableau::from_problem(&unknown_bound).unwrap_err(),
            TableauError::VariableNotFound("y".into())
        );
    }
}
