//! Definition of the variable module
//!
//! A `Variable` represents a discrete random variable in a Bayesian network: a name and a fixed,
//! ordered domain of state labels. The order of the domain defines the index convention used by
//! every `Factor` over the variable.

use crate::util::{BayesError, Result};

use indexmap::IndexMap;
use itertools::Itertools;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;


#[derive(Debug)]
struct Domain {
    /// The name of the `Variable`
    name: String,

    /// The state labels, in index order
    states: Vec<String>
}


/// A discrete random variable.
///
/// `Variable`s are immutable and cheap to clone; clones share the same domain. Two `Variable`s
/// are equal when they have the same name and the same ordered domain. Hashing and ordering use
/// the name only.
#[derive(Clone, Debug)]
pub struct Variable {
    domain: Arc<Domain>
}

impl Variable {

    /// Construct a new `Variable` with the given ordered state labels.
    ///
    /// # Errors
    /// * `BayesError::InvalidDomain` if there are fewer than two states, or a label repeats
    pub fn new<S: AsRef<str>>(name: &str, states: &[S]) -> Result<Self> {
        let states: Vec<String> = states.iter().map(|s| String::from(s.as_ref())).collect();

        if states.len() < 2 {
            return Err(BayesError::InvalidDomain {
                variable: String::from(name),
                reason: format!("expected at least 2 states, found {}", states.len())
            });
        }

        if let Some(dup) = states.iter().duplicates().next() {
            return Err(BayesError::InvalidDomain {
                variable: String::from(name),
                reason: format!("state `{}` is listed more than once", dup)
            });
        }

        Ok(Variable { domain: Arc::new(Domain { name: String::from(name), states }) })
    }

    /// Construct a binary `Variable` with the states `0` and `1`
    pub fn binary(name: &str) -> Self {
        Variable::discrete(name, 2)
    }

    /// Construct a `Variable` with `count` integer-labelled states `0..count`.
    ///
    /// # Panics
    /// if `count < 2`. Use `Variable::try_discrete` when `count` is not known to be valid.
    pub fn discrete(name: &str, count: usize) -> Self {
        assert!(count >= 2, "a discrete variable needs at least 2 states, got {}", count);
        let states: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        Variable { domain: Arc::new(Domain { name: String::from(name), states }) }
    }

    /// Construct a `Variable` with `count` integer-labelled states `0..count`.
    ///
    /// # Errors
    /// * `BayesError::InvalidDomain` if `count < 2`
    pub fn try_discrete(name: &str, count: usize) -> Result<Self> {
        let states: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        Variable::new(name, &states)
    }

    /// Get the name of the `Variable`
    pub fn name(&self) -> &str {
        &self.domain.name
    }

    /// Get the ordered state labels of the `Variable`
    pub fn states(&self) -> &[String] {
        &self.domain.states
    }

    /// Get the number of states of the `Variable`
    pub fn cardinality(&self) -> usize {
        self.domain.states.len()
    }

    /// Get the index of a state label.
    ///
    /// # Errors
    /// * `BayesError::UnknownState` if the label is not in the domain
    pub fn index_of(&self, state: &str) -> Result<usize> {
        self.domain.states.iter().position(|s| s == state).ok_or_else(|| {
            BayesError::UnknownState {
                variable: self.name().to_string(),
                state: String::from(state)
            }
        })
    }

    /// Get the label of the state at `idx`, if it exists
    pub fn state(&self, idx: usize) -> Option<&str> {
        self.domain.states.get(idx).map(|s| s.as_str())
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.domain, &other.domain)
            || (self.domain.name == other.domain.name && self.domain.states == other.domain.states)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.name.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name()).then_with(|| self.states().cmp(other.states()))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


/// An `Assignment` of state indices to some set of `Variable`s. An `Assignment` is complete with
/// respect to a scope when every `Variable` of the scope is assigned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: IndexMap<Variable, usize>
}

impl Assignment {

    /// Construct an empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Assign the state at index `val` to `var`, replacing any previous assignment.
    ///
    /// # Panics
    /// if `val` is not a valid state index of `var`. Use `Assignment::try_set` (or
    /// `Assignment::set_label`) for indices that come from user input.
    pub fn set(&mut self, var: &Variable, val: usize) {
        assert!(
            val < var.cardinality(),
            "invalid state index {} for variable {} with cardinality {}", val, var, var.cardinality()
        );
        self.values.insert(var.clone(), val);
    }

    /// Assign the state at index `val` to `var`, replacing any previous assignment.
    ///
    /// # Errors
    /// * `BayesError::UnknownState` if `val` is not a valid state index of `var`
    pub fn try_set(&mut self, var: &Variable, val: usize) -> Result<()> {
        if val >= var.cardinality() {
            return Err(BayesError::UnknownState {
                variable: var.name().to_string(),
                state: val.to_string()
            });
        }

        self.values.insert(var.clone(), val);
        Ok(())
    }

    /// Assign the state labelled `state` to `var`, replacing any previous assignment.
    ///
    /// # Errors
    /// * `BayesError::UnknownState` if `state` is not in the domain of `var`
    pub fn set_label(&mut self, var: &Variable, state: &str) -> Result<()> {
        let idx = var.index_of(state)?;
        self.values.insert(var.clone(), idx);
        Ok(())
    }

    /// Get the state index assigned to `var`
    pub fn get(&self, var: &Variable) -> Option<&usize> {
        self.values.get(var)
    }

    /// Get the state label assigned to `var`
    pub fn label<'a>(&self, var: &'a Variable) -> Option<&'a str> {
        self.get(var).and_then(|&i| var.state(i))
    }

    /// `true` if `var` is assigned
    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    /// The assigned `Variable`s, in insertion order
    pub fn vars(&self) -> impl Iterator<Item = &Variable> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &usize)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render the `Assignment` as `name -> label` pairs
    pub fn labels(&self) -> IndexMap<String, String> {
        self.values
            .iter()
            .map(|(v, &i)| (v.name().to_string(), v.states()[i].clone()))
            .collect()
    }
}


/// Enumerate every complete `Assignment` to `scope`, with the last `Variable` varying fastest.
/// An empty scope has exactly one (empty) assignment.
pub fn all_assignments(scope: &[Variable]) -> Box<dyn Iterator<Item = Assignment>> {
    if scope.is_empty() {
        return Box::new(std::iter::once(Assignment::new()));
    }

    let scope: Vec<Variable> = scope.to_vec();
    let ranges: Vec<std::ops::Range<usize>> = scope.iter().map(|v| 0..v.cardinality()).collect();

    Box::new(ranges.into_iter().multi_cartesian_product().map(move |idxs| {
        let mut assn = Assignment::new();
        for (v, i) in scope.iter().zip(idxs) {
            assn.set(v, i);
        }
        assn
    }))
}
