//! Conversion of a built model into a problem for the HiGHS solver.
use crate::model::UnitCommitmentModel;
use crate::model::expression::Constraint;
use anyhow::{Context, Result};
use highs::RowProblem as Problem;
use log::debug;
use std::collections::HashSet;
use std::ops::Bound;

/// Convert the model into a HiGHS problem.
///
/// Every model variable becomes a column, in declaration order, and every reserve constraint
/// becomes a row. Reserve shortfall columns are penalised in the objective; all other columns have
/// a cost of zero.
pub fn to_highs_problem(model: &UnitCommitmentModel) -> Result<Problem> {
    model
        .validate()
        .context("Cannot export an invalid model")?;

    let penalty = model.data.parameters.reserve_shortfall_penalty;
    let shortfall: HashSet<_> = model
        .reserve_shortfall
        .iter()
        .flat_map(|vars| vars.values().copied())
        .collect();

    let mut problem = Problem::default();
    let columns: Vec<_> = model
        .variables
        .iter()
        .map(|(var, variable)| {
            let cost = if shortfall.contains(&var) { penalty } else { 0.0 };
            problem.add_column(cost, variable.bounds.clone())
        })
        .collect();

    for constraint in model.enforce_reserve_requirements.iter().flat_map(|c| c.values()) {
        let terms = constraint
            .body
            .iter_terms()
            .map(|(var, coefficient)| (columns[var.index()], coefficient));
        problem.add_row(row_bounds(constraint), terms);
    }

    debug!(
        "Exported model with {} columns and {} rows",
        problem.num_cols(),
        problem.num_rows()
    );

    Ok(problem)
}

/// Bounds for a constraint's row, with the constant part of the body moved to the bounds
fn row_bounds(constraint: &Constraint) -> (Bound<f64>, Bound<f64>) {
    let constant = constraint.body.constant();
    let shift = |bound: Option<f64>| match bound {
        Some(value) => Bound::Included(value - constant),
        None => Bound::Unbounded,
    };

    (shift(constraint.lower), shift(constraint.upper))
}
