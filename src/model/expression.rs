//! Linear expressions and constraints.
//!
//! Each constraint is a linear expression with optional bounds of the form:
//!
//! lower <= constant + a1*x1 + a2*x2 + ... <= upper
//!
//! Expressions come in two representations, produced by the two [`LinearExprBuilder`]s. They
//! always evaluate to the same value; the choice only affects how terms are stored.
use super::variable::{Term, VarIndex};
use itertools::Either;

/// The body of a constraint
#[derive(Clone, Debug, PartialEq)]
pub enum LinearExpr {
    /// Variables and coefficients are kept in separate, parallel lists
    Structured {
        /// Sum of fixed terms
        constant: f64,
        /// Variables of the expression
        vars: Vec<VarIndex>,
        /// Coefficient of each variable in `vars`
        coefs: Vec<f64>,
    },
    /// A direct weighted sum, with fixed terms folded into the constant
    WeightedSum {
        /// Sum of fixed terms
        constant: f64,
        /// Variables of the expression with their coefficients
        terms: Vec<(VarIndex, f64)>,
    },
}

impl LinearExpr {
    /// The constant part of the expression
    pub fn constant(&self) -> f64 {
        match self {
            LinearExpr::Structured { constant, .. } | LinearExpr::WeightedSum { constant, .. } => {
                *constant
            }
        }
    }

    /// Iterate over the variable terms of the expression
    pub fn iter_terms(&self) -> impl Iterator<Item = (VarIndex, f64)> + '_ {
        match self {
            LinearExpr::Structured { vars, coefs, .. } => {
                Either::Left(vars.iter().copied().zip(coefs.iter().copied()))
            }
            LinearExpr::WeightedSum { terms, .. } => Either::Right(terms.iter().copied()),
        }
    }

    /// Total coefficient of the given variable (zero if it doesn't appear)
    pub fn coefficient(&self, var: VarIndex) -> f64 {
        self.iter_terms()
            .filter(|(v, _)| *v == var)
            .map(|(_, coef)| coef)
            .sum()
    }

    /// Evaluate the expression for an assignment of values to variables.
    ///
    /// # Arguments
    ///
    /// * `values` - Value of each variable, indexed by column
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant()
            + self
                .iter_terms()
                .map(|(var, coef)| coef * values[var.index()])
                .sum::<f64>()
    }
}

/// A constraint on a linear expression. At least one bound is normally present.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    /// Lower bound, if any
    pub lower: Option<f64>,
    /// The expression being constrained
    pub body: LinearExpr,
    /// Upper bound, if any
    pub upper: Option<f64>,
}

impl Constraint {
    /// Create a constraint of the form `body >= lower`
    pub fn at_least(body: LinearExpr, lower: f64) -> Self {
        Self {
            lower: Some(lower),
            body,
            upper: None,
        }
    }

    /// Whether the constraint holds for the given values, within `tolerance`
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let value = self.body.evaluate(values);
        self.lower.is_none_or(|lower| value >= lower - tolerance)
            && self.upper.is_none_or(|upper| value <= upper + tolerance)
    }
}

/// Builds a [`LinearExpr`] from weighted terms
pub trait LinearExprBuilder {
    /// A short name for the representation, used in log messages
    fn name(&self) -> &'static str;

    /// Build an expression from `(term, coefficient)` pairs
    fn build(&self, terms: &[(Term, f64)]) -> LinearExpr;
}

/// Keeps variables and coefficients in separate lists.
///
/// Intended for when every term is a decision variable.
pub struct StructuredLinearBuilder;

impl LinearExprBuilder for StructuredLinearBuilder {
    fn name(&self) -> &'static str {
        "structured linear expression"
    }

    fn build(&self, terms: &[(Term, f64)]) -> LinearExpr {
        let mut constant = 0.0;
        let mut vars = Vec::with_capacity(terms.len());
        let mut coefs = Vec::with_capacity(terms.len());
        for (term, coef) in terms {
            match term {
                Term::Var(var) => {
                    vars.push(*var);
                    coefs.push(*coef);
                }
                Term::Constant(value) => constant += coef * value,
            }
        }

        LinearExpr::Structured {
            constant,
            vars,
            coefs,
        }
    }
}

/// Sums weighted terms directly, folding fixed values into the constant
pub struct WeightedSumBuilder;

impl LinearExprBuilder for WeightedSumBuilder {
    fn name(&self) -> &'static str {
        "weighted summation"
    }

    fn build(&self, terms: &[(Term, f64)]) -> LinearExpr {
        let constant = terms
            .iter()
            .filter_map(|(term, coef)| match term {
                Term::Constant(value) => Some(coef * value),
                Term::Var(_) => None,
            })
            .sum();
        let terms = terms
            .iter()
            .filter_map(|(term, coef)| match term {
                Term::Var(var) => Some((*var, *coef)),
                Term::Constant(_) => None,
            })
            .collect();

        LinearExpr::WeightedSum { constant, terms }
    }
}

/// Choose the representation for a constraint family.
///
/// # Arguments
///
/// * `all_variables` - Whether every quantity participating in the constraint family is a
///   decision variable
pub fn select_builder(all_variables: bool) -> &'static dyn LinearExprBuilder {
    if all_variables {
        &StructuredLinearBuilder
    } else {
        &WeightedSumBuilder
    }
}
