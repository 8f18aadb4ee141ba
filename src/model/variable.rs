//! Decision variables and indexed families of model quantities.
use indexmap::IndexMap;
use std::hash::Hash;
use std::ops::RangeInclusive;

/// Refers to a single column of the model.
///
/// Note that this type does **not** include the value of the variable; it is only an index into
/// the model's [`VariableSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarIndex(usize);

impl VarIndex {
    /// The position of the variable's column in the model
    pub fn index(self) -> usize {
        self.0
    }
}

/// A decision variable with a name and bounds
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Name of the variable, e.g. `ReserveShortfall[1]`
    pub name: String,
    /// Lower and upper bounds of the variable
    pub bounds: RangeInclusive<f64>,
}

/// All the decision variables of a model, in column order
#[derive(Default, Debug)]
pub struct VariableSet(Vec<Variable>);

impl VariableSet {
    /// Add a new variable, returning its index
    pub fn add(&mut self, name: String, bounds: RangeInclusive<f64>) -> VarIndex {
        self.0.push(Variable { name, bounds });
        VarIndex(self.0.len() - 1)
    }

    /// Get the variable for the given index
    pub fn get(&self, var: VarIndex) -> &Variable {
        &self.0[var.0]
    }

    /// Iterate over variables in column order
    pub fn iter(&self) -> impl Iterator<Item = (VarIndex, &Variable)> {
        self.0.iter().enumerate().map(|(i, var)| (VarIndex(i), var))
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no variables
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single term contributed by a [`Family`] for one index
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Term {
    /// A decision variable
    Var(VarIndex),
    /// A value which has been fixed before model construction
    Constant(f64),
}

/// An indexed model quantity which is either a family of decision variables or of fixed values.
///
/// Which of the two it is depends on how the upstream component declared it, but it is always
/// the same for every index.
#[derive(Debug, PartialEq)]
pub enum Family<K: Hash + Eq> {
    /// Each index has its own decision variable
    Variables(IndexMap<K, VarIndex>),
    /// Each index has a fixed numeric value
    Fixed(IndexMap<K, f64>),
}

impl<K: Hash + Eq> Family<K> {
    /// Whether the family is made up of genuine decision variables
    pub fn is_var(&self) -> bool {
        matches!(self, Family::Variables(_))
    }

    /// Get the term for the given index, if any
    pub fn get(&self, key: &K) -> Option<Term> {
        match self {
            Family::Variables(vars) => vars.get(key).copied().map(Term::Var),
            Family::Fixed(values) => values.get(key).copied().map(Term::Constant),
        }
    }

    /// The number of indices covered by this family
    pub fn len(&self) -> usize {
        match self {
            Family::Variables(vars) => vars.len(),
            Family::Fixed(values) => values.len(),
        }
    }

    /// Whether the family covers no indices
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
