//! Definition of the factor module
//!
//! A `Factor` represents a relationship between some set of `Variable`s: a dense table of
//! non-negative weights over every joint assignment of its scope.

use crate::util::{BayesError, Result};
use crate::variable::{Assignment, Variable};

use itertools::Itertools;
use ndarray::{arr0, ArrayD, ArrayView1, Axis, IxDyn};

/// Alias f64 ndarray::Array as Table
pub type Table = ArrayD<f64>;


/// A table over an ordered scope of `Variable`s.
///
/// Axis `i` of the table is indexed by the states of `scope[i]`, in domain order. A `Factor` with
/// an empty scope holds a single (0-dimensional) weight; the unit factor is the multiplicative
/// identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// The scope of the `Factor`
    scope: Vec<Variable>,

    /// The values of the `Factor` table.
    table: Table
}


impl Factor {

    /// Get the unit `Factor`: empty scope, weight 1
    pub fn unit() -> Self {
        Factor::scalar(1.0)
    }

    /// A `Factor` with an empty scope holding `value`
    pub fn scalar(value: f64) -> Self {
        Factor { scope: Vec::new(), table: arr0(value).into_dyn() }
    }

    /// Create a new `Factor`
    ///
    /// # Errors
    /// * `BayesError::DuplicateVariable` if a `Variable` appears in the scope twice
    /// * `BayesError::InvalidTable` if the table does not have one axis per scope `Variable` with
    ///   matching cardinality, or holds a negative or non-finite value
    pub fn new(scope: Vec<Variable>, table: Table) -> Result<Self> {
        if let Some(dup) = scope.iter().duplicates().next() {
            return Err(BayesError::DuplicateVariable(dup.name().to_string()));
        }

        if scope.len() != table.ndim() {
            return Err(BayesError::InvalidTable(format!(
                "scope has {} variables but the table has {} dimensions",
                scope.len(),
                table.ndim()
            )));
        }

        for (v, &t) in scope.iter().zip(table.shape().iter()) {
            if v.cardinality() != t {
                return Err(BayesError::InvalidTable(format!(
                    "variable `{}` has {} states but its axis has length {}",
                    v,
                    v.cardinality(),
                    t
                )));
            }
        }

        // factors may not have negative values
        if let Some(bad) = table.iter().find(|&&w| !(w >= 0.0) || !w.is_finite()) {
            return Err(BayesError::InvalidTable(format!("invalid weight {}", bad)));
        }

        Ok(Factor { scope, table })
    }

    /// Retrieve the scope of the `Factor`.
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }

    /// Retrieve the table of the `Factor`.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// `true` if `var` is in the scope of the `Factor`
    pub fn contains(&self, var: &Variable) -> bool {
        self.scope.contains(var)
    }

    /// `true` if the scope is empty
    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }

    /// The sum of every weight in the table
    pub fn total(&self) -> f64 {
        self.table.sum()
    }

    fn axis_of(&self, var: &Variable) -> Result<usize> {
        self.scope
            .iter()
            .position(|v| v == var)
            .ok_or_else(|| BayesError::VariableNotInScope(var.name().to_string()))
    }

    /// Retrieve the value for a complete assignment over the scope of this `Factor`
    ///
    /// # Args
    /// * `assignment`: a full assignment to the scope of a `Factor`. The assignment's scope may be
    ///   a superset of the `Factor`s scope.
    ///
    /// # Errors
    /// * `BayesError::IncompleteAssignment`, if `assignment` is not a complete assignment to the
    ///   scope of the `Factor`
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let missing: Vec<String> = self.scope
                                       .iter()
                                       .filter(|v| !assignment.contains(v))
                                       .map(|v| v.name().to_string())
                                       .collect();
        if !missing.is_empty() {
            return Err(BayesError::IncompleteAssignment(missing));
        }

        let idxs: Vec<usize> = self.scope.iter().filter_map(|v| assignment.get(v).cloned()).collect();
        Ok(self.table[&idxs[..]])
    }

    /// Product of this `Factor` and another `Factor`.
    ///
    /// Defined in Koller & Friedman Section 4.2.1. The scope of the result is `self.scope()`
    /// followed by the `Variable`s of `other.scope()` not already present. Factors with disjoint
    /// scopes multiply to their outer product.
    pub fn product(&self, other: &Self) -> Self {
        // We are computing a new factor Psi(X, Y, Z) = phi1(X, Y) * phi2(Y, Z).
        let mut new_scope = self.scope.clone();
        for v in other.scope.iter() {
            if !new_scope.contains(v) {
                new_scope.push(v.clone());
            }
        }

        // self's variables lead the new scope: append a unit axis for each variable it lacks
        let mut left = self.table.view();
        while left.ndim() < new_scope.len() {
            let end = left.ndim();
            left = left.insert_axis(Axis(end));
        }

        // position of each of other's variables in the new scope
        let positions: Vec<usize> = other.scope
                                         .iter()
                                         .filter_map(|v| new_scope.iter().position(|n| n == v))
                                         .collect();

        // order other's axes by their position in the new scope, then fill the gaps with unit axes
        let mut axes: Vec<usize> = (0..other.scope.len()).collect();
        axes.sort_by_key(|&a| positions[a]);
        let mut right = other.table.view().permuted_axes(axes);
        for pos in 0..new_scope.len() {
            if !positions.contains(&pos) {
                right = right.insert_axis(Axis(pos));
            }
        }

        // both views now broadcast over the new scope
        let table = &left * &right;

        Factor { scope: new_scope, table }
    }

    /// Marginalize (sum out) the given `Variable` from the `Factor`
    ///
    /// Defined in Koller & Friedman 9.3.1
    ///
    /// # Errors
    /// * `BayesError::VariableNotInScope` if `var` is not in the scope
    pub fn sum_out(&self, var: &Variable) -> Result<Self> {
        let axis = self.axis_of(var)?;
        let table = self.table.sum_axis(Axis(axis));
        Ok(Factor { scope: self.scope_without(axis), table })
    }

    /// Maximize out the given `Variable` from the `Factor`.
    ///
    /// Returns the reduced `Factor` and a `Traceback` recording, for every assignment to the
    /// remaining scope, the state of `var` that achieved the maximum. Ties go to the lowest state
    /// index.
    ///
    /// # Errors
    /// * `BayesError::VariableNotInScope` if `var` is not in the scope
    pub fn max_out(&self, var: &Variable) -> Result<(Self, Traceback)> {
        let axis = self.axis_of(var)?;
        let table = self.table.map_axis(Axis(axis), |lane| lane[lane_argmax(&lane)]);
        let best = self.table.map_axis(Axis(axis), |lane| lane_argmax(&lane));

        let scope = self.scope_without(axis);
        let traceback = Traceback { var: var.clone(), scope: scope.clone(), best };

        Ok((Factor { scope, table }, traceback))
    }

    /// Reduce the `Factor` to the given partial assignment
    ///
    /// Defined in Koller & Friedman 4.2.3. Every `Variable` of the scope that is assigned is fixed
    /// to its state and removed from the scope; assigned `Variable`s outside the scope are
    /// ignored. Fixing the whole scope yields a scalar `Factor` holding the selected entry.
    pub fn reduce(&self, assignment: &Assignment) -> Self {
        let mut fixed: Vec<(usize, usize)> = self.scope
                                                 .iter()
                                                 .enumerate()
                                                 .filter_map(|(i, v)| assignment.get(v).map(|&s| (i, s)))
                                                 .collect();

        if fixed.is_empty() {
            return self.clone();
        }

        // slice from the last axis backwards so earlier axis numbers stay valid
        fixed.sort_by(|a, b| b.0.cmp(&a.0));
        let mut view = self.table.view();
        for &(axis, state) in fixed.iter() {
            view = view.index_axis_move(Axis(axis), state);
        }

        let scope = self.scope
                        .iter()
                        .filter(|v| !assignment.contains(v))
                        .cloned()
                        .collect();

        Factor { scope, table: view.to_owned() }
    }

    /// Scale the `Factor` so its weights sum to one
    ///
    /// # Errors
    /// * `BayesError::ZeroProbabilityEvidence` if the weights sum to zero
    pub fn normalize(&self) -> Result<Self> {
        let z = self.total();
        if !(z > 0.0) || !z.is_finite() {
            return Err(BayesError::ZeroProbabilityEvidence);
        }

        Ok(Factor { scope: self.scope.clone(), table: &self.table / z })
    }

    /// The complete assignment of highest weight, and that weight. Ties go to the assignment that
    /// comes first in row-major order.
    pub fn argmax(&self) -> (Assignment, f64) {
        let mut best: Option<(IxDyn, f64)> = None;
        for (idx, &w) in self.table.indexed_iter() {
            if best.as_ref().map_or(true, |&(_, b)| w > b) {
                best = Some((idx, w));
            }
        }

        let mut assn = Assignment::new();
        match best {
            Some((idx, w)) => {
                for (i, v) in self.scope.iter().enumerate() {
                    assn.set(v, idx[i]);
                }
                (assn, w)
            },
            None => (assn, 0.0)
        }
    }

    /// Permute the axes of the `Factor` so that its scope is `scope`.
    ///
    /// # Errors
    /// * `BayesError::VariableNotInScope` if `scope` is not a permutation of `self.scope()`
    pub fn aligned(&self, scope: &[Variable]) -> Result<Self> {
        if scope.len() != self.scope.len() {
            let extra = self.scope.iter().find(|v| !scope.contains(v)).or_else(|| scope.first());
            return Err(BayesError::VariableNotInScope(
                extra.map(|v| v.name().to_string()).unwrap_or_default()
            ));
        }

        let axes = scope.iter().map(|v| self.axis_of(v)).collect::<Result<Vec<usize>>>()?;
        let table = self.table.clone().permuted_axes(axes).as_standard_layout().into_owned();

        Ok(Factor { scope: scope.to_vec(), table })
    }

    fn scope_without(&self, axis: usize) -> Vec<Variable> {
        self.scope
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != axis)
            .map(|(_, v)| v.clone())
            .collect()
    }
}


/// Index of the first maximum of a lane
fn lane_argmax(lane: &ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &w) in lane.iter().enumerate() {
        if w > lane[best] {
            best = i;
        }
    }
    best
}


/// The argmax table produced by `Factor::max_out`: for each assignment to `scope()`, the state of
/// `var()` that maximized the eliminated factor.
#[derive(Clone, Debug)]
pub struct Traceback {
    var: Variable,
    scope: Vec<Variable>,
    best: ArrayD<usize>
}

impl Traceback {

    /// The maximized-out `Variable`
    pub fn var(&self) -> &Variable {
        &self.var
    }

    /// The scope the maximizing state depends on
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }

    /// Look up the maximizing state of `var()` given an assignment covering `scope()`
    ///
    /// # Errors
    /// * `BayesError::IncompleteAssignment` if some `Variable` of `scope()` is unassigned
    pub fn resolve(&self, assignment: &Assignment) -> Result<usize> {
        let missing: Vec<String> = self.scope
                                       .iter()
                                       .filter(|v| !assignment.contains(v))
                                       .map(|v| v.name().to_string())
                                       .collect();
        if !missing.is_empty() {
            return Err(BayesError::IncompleteAssignment(missing));
        }

        let idxs: Vec<usize> = self.scope.iter().filter_map(|v| assignment.get(v).cloned()).collect();
        Ok(self.best[&idxs[..]])
    }
}
