use simplex_tableau::{
    ArtificialVariable, Bound, Derivation, Fraction, LinearProgram, MultiplyRow, Pivot, RelaxRow, Relation,
    SubstituteVariable, TableauError, TableauTransform, Term, Transform,
};

fn int(n: i64) -> Fraction {
    Fraction::from(n)
}

fn problem(json: &str) -> LinearProgram {
    serde_json::from_str(json).unwrap()
}

// Two `<=` rows and a negative lower bound on x2.
fn mock() -> LinearProgram {
    problem(
        r#"{
            "variables": ["x1", "x2"],
            "constraints": [[3, "4/6", "<=", 4], [0, 4, "<=", 3]],
            "objective": [1.5, 3],
            "bounds": {"x2": {"relation": ">=", "bound": -3}},
            "maximize": true
        }"#,
    )
}

#[test]
fn relax_first_row_of_mock_problem() {
    let before = mock().to_tableau().unwrap();
    let after = Transform::from(RelaxRow { name: "x3".into(), row: 0 }).run(&before).unwrap();

    let row = &after.rows()[0];
    assert_eq!(row.coefficients, vec![int(3), Fraction::new(2, 3).unwrap(), int(1)]);
    assert_eq!(row.relation, Relation::Eq);
    assert_eq!(row.constant, int(4));
    assert_eq!(row.basis, after.variable_id("x3"));
    assert_eq!(after.non_standard_bounds(), before.non_standard_bounds());
    assert!(!after.can_display_as_tableau());
    assert!(matches!(
        Transform::EnterDisplayMode.run(&after),
        Err(TableauError::NotCanonical(_))
    ));
}

// min 2x1 + 3x2  s.t.  x1 + x2 >= 4,  x1 <= 3
// optimum x1 = 3, x2 = 1, z = 9
fn big_m_derivation() -> Derivation {
    let mut derivation = Derivation::new(problem(
        r#"{
            "variables": ["x1", "x2"],
            "constraints": [[1, 1, ">=", 4], [1, 0, "<=", 3]],
            "objective": [2, 3],
            "maximize": false
        }"#,
    ));
    derivation.push(MultiplyRow { factor: int(-1), row: 0 });
    derivation.push(RelaxRow { name: "s1".into(), row: 0 });
    derivation.push(RelaxRow { name: "s2".into(), row: 1 });
    derivation.push(ArtificialVariable { name: "a1".into(), row: 0 });
    derivation.push(Transform::EnterDisplayMode);
    derivation.push(Pivot { row: 1, variable: 0 });
    derivation.push(Pivot { row: 0, variable: 1 });
    derivation
}

#[test]
fn big_m_method_reaches_optimum() {
    let steps = big_m_derivation().replay().unwrap();
    assert!(steps.iter().all(|step| step.succeeded()));

    // surplus row has a negative constant, so s1 is not basic until a1 is added
    assert_eq!(steps[1].tableau.rows()[0].basis, None);
    let with_artificial = &steps[3].tableau;
    assert_eq!(with_artificial.rows()[0].constant, int(4));
    assert_eq!(with_artificial.objective()[4], Fraction::big_m());

    let shown = &steps[4].tableau;
    assert!(shown.display_as_tableau());
    assert_eq!(shown.objective()[0], Fraction::with_big_m(int(2), int(-1)));
    assert_eq!(shown.objective_constant(), &Fraction::with_big_m(int(0), int(4)));

    let last = &steps[6].tableau;
    assert!(last.display_as_tableau());
    assert_eq!(last.rows()[0].basis, Some(1));
    assert_eq!(last.rows()[0].constant, int(1));
    assert_eq!(last.rows()[1].basis, Some(0));
    assert_eq!(last.rows()[1].constant, int(3));
    assert_eq!(last.objective_constant(), &int(9));
    assert_eq!(
        last.objective(),
        &[int(0), int(0), int(3), int(1), Fraction::with_big_m(int(-3), int(1))]
    );
    // minimizing: optimal once no reduced cost is negative
    assert!(last.objective().iter().all(|c| !c.is_negative()));
    assert_eq!(last.original_objective().unwrap(), &[int(2), int(3), int(0), int(0), Fraction::big_m()]);

    let labels: Vec<String> = steps.iter().map(|s| s.label.to_string()).collect();
    assert_eq!(labels[5], "Pivot s2 → x1");
    assert_eq!(labels[6], "Pivot a1 → x2");
}

#[test]
fn pivot_outside_minimum_ratio_is_rejected_and_skipped() {
    let mut derivation = big_m_derivation();
    derivation.insert(5, Pivot { row: 0, variable: 0 }).unwrap();
    let steps = derivation.replay().unwrap();

    assert_eq!(steps[5].error, Some(TableauError::RatioTestViolation { row: 0, other: 1 }));
    assert_eq!(steps[5].tableau, steps[4].tableau);
    // the rest of the chain still applies on top of the carried tableau
    assert!(steps[6..].iter().all(|step| step.succeeded()));
    assert_eq!(steps[7].tableau.objective_constant(), &int(9));
}

#[test]
fn relax_then_substitute_slack_keeps_feasible_region() {
    let before = problem(
        r#"{
            "variables": ["x1", "x2"],
            "constraints": [[1, -1, "<=", -1]],
            "objective": [1, 1],
            "maximize": false
        }"#,
    )
    .to_tableau()
    .unwrap();
    let relaxed = Transform::from(RelaxRow { name: "s".into(), row: 0 }).run(&before).unwrap();
    let s = relaxed.variable_id("s").unwrap();
    let after = Transform::from(SubstituteVariable {
        variable: s,
        terms: vec![Term::new(int(2), "t")],
        constant: int(0),
    })
    .run(&relaxed)
    .unwrap();
    let t = after.variable_id("t").unwrap();
    assert!(!after.is_variable_alive(s));
    assert_eq!(after.bound_of(t), Bound::default());

    let row_before = &before.rows()[0];
    let row_after = &after.rows()[0];
    for x1 in -3..=3 {
        for x2 in -3..=3 {
            let (x1, x2) = (int(x1), int(x2));
            let lhs = &(&row_before.coefficients[0] * &x1) + &(&row_before.coefficients[1] * &x2);
            let feasible_before = lhs <= row_before.constant;

            // solve the equality for t and check t >= 0
            let rest = &(&row_after.coefficients[0] * &x1) + &(&row_after.coefficients[1] * &x2);
            let t_value = (&row_after.constant - &rest).checked_div(&row_after.coefficients[t]).unwrap();
            let feasible_after = !t_value.is_negative();

            assert_eq!(feasible_before, feasible_after, "x1 = {}, x2 = {}", x1, x2);
        }
    }
}

#[test]
fn standardize_example_problem() {
    // min -x1 - 3x2 + 5x3 with x2 >= 1 and x3 free
    let mut derivation = Derivation::new(LinearProgram::example());
    derivation.push(SubstituteVariable {
        variable: 1,
        terms: vec![Term::new(int(1), "x4")],
        constant: int(1),
    });
    derivation.push(SubstituteVariable {
        variable: 2,
        terms: vec![Term::new(int(1), "x5"), Term::new(int(-1), "x6")],
        constant: int(0),
    });
    derivation.push(Transform::ToggleObjectiveSense);

    let steps = derivation.replay().unwrap();
    assert!(steps.iter().all(|step| step.succeeded()));
    assert_eq!(steps[0].label.to_string(), "x2 = x4 + 1");
    assert_eq!(steps[1].label.to_string(), "x3 = x5 - x6");

    let last = &steps[2].tableau;
    assert!(last.non_standard_bounds().is_empty());
    assert!(last.maximize());
    let names: Vec<&str> = last.live_variables().map(|(_, name)| name).collect();
    assert_eq!(names, vec!["x1", "x4", "x5", "x6"]);
    // x1 - (x4 + 1) + x5 - x6 >= -3
    assert_eq!(last.rows()[0].constant, int(-2));
    assert_eq!(last.objective()[0], int(1));
    assert_eq!(last.objective()[3], int(3));
    assert_eq!(last.objective()[4], int(-5));
    assert_eq!(last.objective()[5], int(5));
    assert_eq!(last.objective_constant(), &int(3));
}

#[test]
fn render_survives_dead_variables() {
    let table = LinearProgram::example().to_tableau().unwrap();
    let substitute = Transform::from(SubstituteVariable {
        variable: 1,
        terms: vec![Term::new(int(1), "x4")],
        constant: int(1),
    });
    let after = substitute.run(&table).unwrap();
    // x2 is dead now: the label falls back to the placeholder
    assert_eq!(substitute.render(&after).to_string(), "? = x4 + 1");
    assert!(matches!(substitute.run(&after), Err(TableauError::VariableNotFound(_))));
}

#[test]
fn display_mode_twice_is_idempotent() {
    let derivation = big_m_derivation();
    let steps = derivation.replay().unwrap();
    let shown = &steps[6].tableau;
    let again = Transform::EnterDisplayMode.run(shown).unwrap();
    assert_eq!(&again, shown);
}
