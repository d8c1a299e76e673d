//! Defines a `DirectedModel`, which is a Bayesian model that represents the factorization of
//! a probability distribution P

use crate::cpd::Cpd;
use crate::factor::Factor;
use crate::util::{BayesError, Result};
use crate::variable::{Assignment, Variable};
use super::{Model, ModelConfig};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// The network is represented as a Directed Acyclic Graph (DAG). The Conditional Probability
/// Distribution (CPD) of each `Variable` implicitly defines the edges of the graph: there is an
/// edge ```P -> X``` for every parent ```P``` of ```X```. The `Variable`s are held in their
/// topological order to faciliate efficient computations over the graph.
///
/// A `DirectedModel` can only be obtained from `DirectedModelBuilder::build`, which validates it,
/// and it cannot be modified afterwards. It is `Send + Sync` and may be queried from any number
/// of threads at once.
#[derive(Clone, Debug)]
pub struct DirectedModel {

    /// The `Variable`s of the model and their associated CPDs, keyed by name, in topological
    /// order.
    graph: IndexMap<String, (Variable, Cpd)>,

}

impl DirectedModel {

    /// Get the `Variable` with the given name.
    ///
    /// # Errors
    /// * `BayesError::UnknownVariable` if no such `Variable` is in the model
    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.lookup_variable(name).ok_or_else(|| BayesError::UnknownVariable(String::from(name)))
    }

    /// Get the `Cpd` for the given variable in this model.
    pub fn cpd(&self, name: &str) -> Option<&Cpd> {
        self.graph.get(name).map(|(_, cpd)| cpd)
    }

    /// Get the parents of a `Variable`, in the axis order of its `Cpd`
    pub fn parents(&self, name: &str) -> Result<&[Variable]> {
        self.graph
            .get(name)
            .map(|(_, cpd)| cpd.parents())
            .ok_or_else(|| BayesError::UnknownVariable(String::from(name)))
    }

    /// Get the children of a `Variable`, in topological order
    pub fn children(&self, name: &str) -> Result<Vec<&Variable>> {
        let var = self.variable(name)?;
        Ok(self.graph
               .values()
               .filter(|(_, cpd)| cpd.parents().contains(var))
               .map(|(v, _)| v)
               .collect())
    }

    /// Get every edge ```(parent, child)``` of the DAG
    pub fn edges(&self) -> Vec<(&Variable, &Variable)> {
        self.graph
            .values()
            .flat_map(|(v, cpd)| cpd.parents().iter().map(move |p| (p, v)))
            .collect()
    }

    /// Get a topological order of the `DirectedModel`
    pub fn topological_order(&self) -> Vec<&Variable> {
        self.graph.values().map(|(v, _)| v).collect()
    }
}

impl Model for DirectedModel {

    fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.graph.get(name).map(|(v, _)| v)
    }

    fn variables(&self) -> Vec<&Variable> {
        self.topological_order()
    }

    fn num_variables(&self) -> usize {
        self.graph.len()
    }

    fn factors(&self) -> Vec<&Factor> {
        self.graph.values().map(|(_, cpd)| cpd.factor()).collect()
    }

    /// Determine the probability of a full `Assignment` to the `Variable`s in the `DirectedModel`
    /// by the chain rule.
    fn probability(&self, assignment: &Assignment) -> Result<f64> {
        // for every variable in the graph
        self.graph.values()
                  // get the probability of the assignment
                  .map(|(_, cpd)| cpd.factor().value(assignment))
                  // and multiply those probability by the chain rule
                  // but if there are any errors, just return the error
                  .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
    }
}


/// An implementation of the [builder pattern] for creating a `DirectedModel`.
///
/// `Variable`s, edges and CPDs may be added in any order. Nothing is checked until `build` (or
/// `check_model`) runs, except that registering the same `Variable` name twice poisons the
/// builder.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
#[derive(Clone, Debug, Default)]
pub struct DirectedModelBuilder {

    /// The registered `Variable`s, by name, in registration order
    variables: IndexMap<String, Variable>,

    /// The edges ```(parent, child)```, by name
    edges: IndexSet<(String, String)>,

    /// The CPDs, in the order they were added
    cpds: Vec<Cpd>,

    config: ModelConfig,

    /// The error state of the builder
    err: Option<BayesError>

}


impl DirectedModelBuilder {

    /// Construct a new `DirectedModelBuilder` representing an empty `DirectedModel`
    pub fn new() -> Self {
        DirectedModelBuilder::default()
    }

    /// Use the given settings when validating the model
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a `Variable`.
    pub fn with_variable(mut self, var: &Variable) -> Self {
        if self.err.is_none() {
            if self.variables.contains_key(var.name()) {
                self.err = Some(BayesError::DuplicateVariable(var.name().to_string()));
            } else {
                self.variables.insert(var.name().to_string(), var.clone());
            }
        }

        self
    }

    /// Add the edge ```parent -> child```. Adding the same edge twice has no further effect.
    pub fn with_edge(mut self, parent: &str, child: &str) -> Self {
        self.edges.insert((String::from(parent), String::from(child)));
        self
    }

    /// Add the CPD of a `Variable`
    pub fn with_cpd(mut self, cpd: Cpd) -> Self {
        self.cpds.push(cpd);
        self
    }

    /// Register a `Variable` together with its parents and CPD.
    ///
    /// # Args
    /// * `cpd`: the CPD of the `Variable`; one edge is added per parent of the `Cpd`.
    pub fn with_node(self, cpd: Cpd) -> Self {
        let var = cpd.var().clone();
        let parents: Vec<String> = cpd.parents().iter().map(|p| p.name().to_string()).collect();

        let mut builder = self.with_variable(&var);
        for p in parents.iter() {
            builder = builder.with_edge(p, var.name());
        }
        builder.with_cpd(cpd)
    }

    /// Validate the model accumulated so far without consuming the builder.
    ///
    /// Checks, in order: that every referenced `Variable` is registered, that the edges form a
    /// DAG, that every `Variable` has exactly one CPD whose scope is ```X U Pa(X)```, and that
    /// every CPD is normalized.
    ///
    /// # Returns
    /// the `Variable` names in topological order
    pub fn check_model(&self) -> Result<Vec<String>> {
        if let Some(ref e) = self.err {
            return Err(e.clone());
        }

        ///////////////////////////////////////////////////////////////////////
        // 1) every referenced variable is registered
        for (parent, child) in self.edges.iter() {
            self.registered(parent)?;
            self.registered(child)?;
        }

        for cpd in self.cpds.iter() {
            for v in cpd.parents().iter().chain(Some(cpd.var())) {
                let known = self.registered(v.name())?;
                if known != v {
                    return Err(BayesError::InvalidDomain {
                        variable: v.name().to_string(),
                        reason: format!("CPD of `{}` uses states {:?}, registered states are {:?}",
                                        cpd.var(), v.states(), known.states())
                    });
                }
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) the edges form a DAG
        let order = self.topological_sort()?;

        ///////////////////////////////////////////////////////////////////////
        // 3) exactly one CPD per variable, with scope X U Pa(X)
        for name in self.variables.keys() {
            let mut cpds = self.cpds.iter().filter(|c| c.var().name() == name);

            let cpd = cpds.next().ok_or_else(|| BayesError::MissingCpt(name.clone()))?;
            if cpds.next().is_some() {
                return Err(BayesError::DuplicateCpt(name.clone()));
            }

            let expected: Vec<String> = self.edges
                                            .iter()
                                            .filter(|(_, c)| c == name)
                                            .map(|(p, _)| p.clone())
                                            .collect();
            let found: Vec<String> = cpd.parents().iter().map(|p| p.name().to_string()).collect();

            let same = expected.len() == found.len() && expected.iter().all(|p| found.contains(p));
            if !same {
                return Err(BayesError::CptScopeMismatch { variable: name.clone(), expected, found });
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 4) every CPD is normalized
        for cpd in self.cpds.iter() {
            cpd.check_normalized(self.config.cpd_tolerance)?;
        }

        Ok(order)
    }

    /// Complete building the model.
    ///
    /// # Returns
    /// the `DirectedModel`, or the first error found by `check_model`
    ///
    /// # Postcondition
    /// This call consumes the `DirectedModelBuilder`
    pub fn build(self) -> Result<DirectedModel> {
        let order = self.check_model()?;

        debug!(
            variables = self.variables.len(),
            edges = self.edges.len(),
            "validated directed model"
        );

        let DirectedModelBuilder { mut variables, cpds, .. } = self;
        let mut cpds: IndexMap<String, Cpd> = cpds.into_iter()
                                                  .map(|c| (c.var().name().to_string(), c))
                                                  .collect();

        let mut graph = IndexMap::new();
        for name in order {
            // both lookups were checked by check_model
            if let (Some(var), Some(cpd)) = (variables.swap_remove(&name), cpds.swap_remove(&name)) {
                graph.insert(name, (var, cpd));
            }
        }

        Ok(DirectedModel { graph })
    }

    fn registered(&self, name: &str) -> Result<&Variable> {
        self.variables.get(name).ok_or_else(|| BayesError::UnknownVariable(String::from(name)))
    }

    /// Kahn's algorithm. Among the variables ready to be placed, the earliest registered goes
    /// first.
    fn topological_sort(&self) -> Result<Vec<String>> {
        let mut remaining: IndexMap<&str, usize> = self.variables.keys().map(|k| (k.as_str(), 0)).collect();
        for (_, child) in self.edges.iter() {
            if let Some(count) = remaining.get_mut(child.as_str()) {
                *count += 1;
            }
        }

        let mut order = Vec::with_capacity(remaining.len());
        while let Some(next) = remaining.iter().find(|(_, &n)| n == 0).map(|(&k, _)| k) {
            remaining.shift_remove(next);
            for (_, child) in self.edges.iter().filter(|(p, _)| p == next) {
                if let Some(count) = remaining.get_mut(child.as_str()) {
                    *count -= 1;
                }
            }
            order.push(String::from(next));
        }

        if !remaining.is_empty() {
            return Err(BayesError::CyclicGraph(remaining.keys().map(|k| k.to_string()).collect()));
        }

        Ok(order)
    }
}
