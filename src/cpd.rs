//! Conditional Probability Distributions
//!
//! A `Cpd` is a `Factor` over ```X U Pa(X)``` that is normalized over ```X``` for every
//! assignment to ```Pa(X)```. Its table is indexed ```[Pa(X)..., X]```, so the last axis always
//! belongs to the child.

use crate::factor::{Factor, Table};
use crate::util::{BayesError, Result};
use crate::variable::Variable;

use ndarray::{Array, ArrayD, Axis, IxDyn};

/// Default tolerance used when checking that a CPD sums to one
pub const DEFAULT_TOLERANCE: f64 = 1e-6;


/// A Conditional Probability Distribution ```P(X | Pa(X))```
#[derive(Clone, Debug, PartialEq)]
pub struct Cpd {
    /// The child `Variable` ```X```
    var: Variable,

    /// The parents ```Pa(X)```, in table axis order
    parents: Vec<Variable>,

    /// The table, with scope ```Pa(X)``` followed by ```X```
    factor: Factor
}

impl Cpd {

    /// Construct a `Cpd` from a table indexed ```[parents..., var]```.
    ///
    /// Normalization is not checked here; `DirectedModelBuilder` checks it when the model is
    /// built (see `Cpd::check_normalized`).
    ///
    /// # Errors
    /// * `BayesError::DuplicateVariable` if `var` is among its own parents, or a parent repeats
    /// * `BayesError::InvalidTable` if the table does not fit the scope
    pub fn new(var: Variable, parents: Vec<Variable>, table: Table) -> Result<Self> {
        let mut scope = parents.clone();
        scope.push(var.clone());

        let factor = Factor::new(scope, table)?;
        Ok(Cpd { var, parents, factor })
    }

    /// Construct a `Cpd` from a column table: one row per state of `var`, one column per
    /// assignment to `parents` with the last parent varying fastest.
    ///
    /// ```text
    ///            B=pos,A=good  B=pos,A=fair  ...  B=neg,A=poor
    /// C=treated      0.9           0.7       ...      0.1
    /// C=not          0.1           0.3       ...      0.9
    /// ```
    ///
    /// # Errors
    /// * `BayesError::InvalidTable` if there is not one row per state, or a row does not have one
    ///   entry per parent assignment
    pub fn tabular(var: Variable, parents: Vec<Variable>, values: &[Vec<f64>]) -> Result<Self> {
        let columns: usize = parents.iter().map(|p| p.cardinality()).product();

        if values.len() != var.cardinality() {
            return Err(BayesError::InvalidTable(format!(
                "expected {} rows for `{}`, found {}", var.cardinality(), var, values.len()
            )));
        }

        if let Some(row) = values.iter().find(|row| row.len() != columns) {
            return Err(BayesError::InvalidTable(format!(
                "expected {} columns for `{}`, found {}", columns, var, row.len()
            )));
        }

        let mut shape = vec![var.cardinality()];
        shape.extend(parents.iter().map(|p| p.cardinality()));

        let flat: Vec<f64> = values.iter().flat_map(|row| row.iter().cloned()).collect();
        let table = ArrayD::from_shape_vec(IxDyn(&shape), flat)
            .map_err(|e| BayesError::InvalidTable(e.to_string()))?;

        // move the child axis from first to last
        let mut axes: Vec<usize> = (1..shape.len()).collect();
        axes.push(0);
        let table = table.permuted_axes(axes).as_standard_layout().into_owned();

        Cpd::new(var, parents, table)
    }

    /// A `Cpd` that is uniform over `var` for every parent assignment
    pub fn uniform(var: Variable, parents: Vec<Variable>) -> Result<Self> {
        let mut shape: Vec<usize> = parents.iter().map(|p| p.cardinality()).collect();
        shape.push(var.cardinality());

        // normalizing constant is just the number of states
        let val = 1. / (var.cardinality() as f64);
        Cpd::new(var, parents, Array::from_elem(shape, val))
    }

    /// A parentless `Cpd` with the given probability for each state of `var`
    pub fn multinomial(var: Variable, ps: &[f64]) -> Result<Self> {
        let table = Array::from_iter(ps.iter().cloned()).into_dyn();
        Cpd::new(var, vec![], table)
    }

    /// The child `Variable`
    pub fn var(&self) -> &Variable {
        &self.var
    }

    /// The parent `Variable`s, in table axis order
    pub fn parents(&self) -> &[Variable] {
        &self.parents
    }

    /// The `Factor` backing this `Cpd`
    pub fn factor(&self) -> &Factor {
        &self.factor
    }

    /// Look up ```P(var = state | parents = parent_states)``` by state labels.
    ///
    /// `parent_states` follows the order of `parents()`.
    pub fn probability(&self, state: &str, parent_states: &[&str]) -> Result<f64> {
        if parent_states.len() != self.parents.len() {
            return Err(BayesError::IncompleteAssignment(
                self.parents.iter().skip(parent_states.len()).map(|p| p.name().to_string()).collect()
            ));
        }

        let mut idx = parent_states.iter()
                                   .zip(self.parents.iter())
                                   .map(|(s, p)| p.index_of(s))
                                   .collect::<Result<Vec<usize>>>()?;
        idx.push(self.var.index_of(state)?);

        Ok(self.factor.table()[&idx[..]])
    }

    /// Check that the distribution over `var()` sums to one (within `tolerance`) for every
    /// assignment to `parents()`.
    ///
    /// # Errors
    /// * `BayesError::CptNotNormalized` naming the first offending parent assignment
    pub fn check_normalized(&self, tolerance: f64) -> Result<()> {
        let child_axis = Axis(self.parents.len());
        let sums = self.factor.table().sum_axis(child_axis);

        for (idx, &sum) in sums.indexed_iter() {
            if (sum - 1.0).abs() > tolerance {
                let parents = self.parents
                                  .iter()
                                  .enumerate()
                                  .map(|(i, p)| format!("{}={}", p, p.states()[idx[i]]))
                                  .collect();

                return Err(BayesError::CptNotNormalized {
                    variable: self.var.name().to_string(),
                    parents,
                    sum
                });
            }
        }

        Ok(())
    }
}
