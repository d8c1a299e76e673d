//! Name-keyed queries over a `DirectedModel`.
//!
//! `VariableElimination` is the entry point most callers want: it resolves variable names and
//! state labels against the model, rejects malformed queries, runs the engine and packages the
//! result as a `Distribution` or a `MapAssignment`.

use crate::factor::{Factor, Table};
use crate::inference::{
    ConditionalInferenceEngine,
    InferenceConfig,
    MapInferenceEngine,
    VariableEliminationEngine
};
use crate::model::DirectedModel;
use crate::util::{BayesError, Result};
use crate::variable::{Assignment, Variable};

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use std::iter::FromIterator;


/// Observed states, keyed by variable name. Labels are checked against the model only when a
/// query runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence {
    observations: IndexMap<String, String>
}

impl Evidence {

    pub fn new() -> Self {
        Evidence::default()
    }

    /// Observe `variable` in `state`, replacing any earlier observation of `variable`
    pub fn observe(mut self, variable: &str, state: &str) -> Self {
        self.insert(variable, state);
        self
    }

    pub fn insert(&mut self, variable: &str, state: &str) {
        self.observations.insert(String::from(variable), String::from(state));
    }

    /// The observed state of `variable`
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.observations.get(variable).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.observations.iter().map(|(v, s)| (v.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Evidence {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut evidence = Evidence::new();
        evidence.extend(iter);
        evidence
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Evidence {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.observations.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}


/// A normalized distribution over the queried variables.
///
/// The axes of `values()` follow `scope()`, and each axis is indexed by the states of its
/// `Variable` in domain order.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    factor: Factor
}

impl Distribution {

    /// The queried `Variable`s, in query order
    pub fn scope(&self) -> &[Variable] {
        self.factor.scope()
    }

    /// The names of the queried `Variable`s
    pub fn variables(&self) -> Vec<&str> {
        self.scope().iter().map(|v| v.name()).collect()
    }

    /// The state labels of each axis
    pub fn states(&self) -> Vec<&[String]> {
        self.scope().iter().map(|v| v.states()).collect()
    }

    pub fn values(&self) -> &Table {
        self.factor.table()
    }

    pub fn factor(&self) -> &Factor {
        &self.factor
    }

    pub fn into_factor(self) -> Factor {
        self.factor
    }

    /// The probability of one joint assignment, given as one state label per scope `Variable`
    ///
    /// # Errors
    /// * `BayesError::IncompleteAssignment` if the number of labels does not match the scope
    /// * `BayesError::UnknownState` if a label is not in the domain of its `Variable`
    pub fn get(&self, states: &[&str]) -> Result<f64> {
        if states.len() != self.scope().len() {
            let missing = self.scope()
                              .iter()
                              .skip(states.len())
                              .map(|v| v.name().to_string())
                              .collect();
            return Err(BayesError::IncompleteAssignment(missing));
        }

        let idx = self.scope()
                      .iter()
                      .zip(states.iter())
                      .map(|(v, s)| v.index_of(s))
                      .collect::<Result<Vec<usize>>>()?;

        Ok(self.values()[&idx[..]])
    }

    /// Every joint assignment of the scope, as state labels, with its probability. The last
    /// `Variable` varies fastest.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<&str>, f64)> + '_ {
        let scope = self.scope();
        self.values().indexed_iter().map(move |(idx, &p)| {
            let labels = scope.iter()
                              .enumerate()
                              .map(|(axis, v)| v.states()[idx[axis]].as_str())
                              .collect();
            (labels, p)
        })
    }

    /// The marginal distribution of a single queried `Variable`
    ///
    /// # Errors
    /// * `BayesError::VariableNotInScope` if `variable` was not queried
    pub fn marginal(&self, variable: &str) -> Result<Distribution> {
        if !self.scope().iter().any(|v| v.name() == variable) {
            return Err(BayesError::VariableNotInScope(String::from(variable)));
        }

        let others: Vec<Variable> = self.scope()
                                        .iter()
                                        .filter(|v| v.name() != variable)
                                        .cloned()
                                        .collect();

        let mut factor = self.factor.clone();
        for v in others.iter() {
            factor = factor.sum_out(v)?;
        }

        Ok(Distribution { factor })
    }

    /// The most probable joint assignment of the scope, as state labels. Ties go to the
    /// assignment listed first by `iter()`.
    pub fn argmax(&self) -> IndexMap<String, String> {
        self.factor.argmax().0.labels()
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            variables: Vec<&'a str>,
            states: Vec<&'a [String]>,
            values: Vec<f64>
        }

        Repr {
            variables: self.variables(),
            states: self.states(),
            values: self.iter().map(|(_, p)| p).collect()
        }.serialize(serializer)
    }
}


/// The answer to a MAP query
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapAssignment {

    /// The most probable state of each queried variable, in query order
    pub states: IndexMap<String, String>,

    /// ```max_Z P(states, Z, evidence)```: the max-product weight, maximized over the variables
    /// ```Z``` that were neither queried nor observed
    pub weight: f64,

    /// ```max_Z P(states, Z | evidence)```, the weight conditioned on the evidence
    pub probability: f64,

    /// ```P(states | evidence)```, summing rather than maximizing over ```Z```. Equal to
    /// `probability` when no variable was eliminated.
    pub posterior: f64

}

impl MapAssignment {

    /// The most probable state of `variable`
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.states.get(variable).map(|s| s.as_str())
    }
}


/// Exact inference by variable elimination over a `DirectedModel`, addressed by variable name.
///
/// The model is only borrowed; a `VariableElimination` (and the model) can be shared between
/// threads and queried concurrently.
pub struct VariableElimination<'a> {
    model: &'a DirectedModel,
    engine: VariableEliminationEngine<'a, DirectedModel>
}

impl<'a> VariableElimination<'a> {

    pub fn new(model: &'a DirectedModel) -> Self {
        VariableElimination::with_config(model, InferenceConfig::default())
    }

    pub fn with_config(model: &'a DirectedModel, config: InferenceConfig) -> Self {
        VariableElimination { model, engine: VariableEliminationEngine::with_config(model, config) }
    }

    pub fn model(&self) -> &'a DirectedModel {
        self.model
    }

    /// Compute ```P(variables | evidence)```.
    ///
    /// # Errors
    /// * `BayesError::EmptyQuery` if `variables` is empty
    /// * `BayesError::UnknownVariable` or `BayesError::UnknownState` if a name or label is not
    ///   in the model
    /// * `BayesError::DuplicateVariable` if a variable is queried twice
    /// * `BayesError::QueryEvidenceOverlap` if a queried variable is observed
    /// * `BayesError::ZeroProbabilityEvidence` if the evidence is impossible under the model
    pub fn query(&self, variables: &[&str], evidence: &Evidence) -> Result<Distribution> {
        let (variables, evidence) = self.resolve(variables, evidence)?;
        let factor = self.engine.infer(&variables, &evidence)?;

        Ok(Distribution { factor })
    }

    /// Compute the most probable joint state of `variables` given the evidence, maximizing over
    /// every other unobserved variable.
    ///
    /// # Errors
    /// The same as `query`.
    pub fn map_query(&self, variables: &[&str], evidence: &Evidence) -> Result<MapAssignment> {
        let (variables, evidence) = self.resolve(variables, evidence)?;
        let estimate = self.engine.map(&variables, &evidence)?;

        let z = self.engine.probability_of_evidence(&evidence)?;
        let marginal = self.engine.joint(&variables, &evidence)?.value(&estimate.assignment)?;

        Ok(package(estimate.assignment, estimate.weight, marginal, z))
    }

    /// The most probable state of every unobserved variable given the evidence
    ///
    /// # Errors
    /// * `BayesError::UnknownVariable` or `BayesError::UnknownState` for malformed evidence
    /// * `BayesError::ZeroProbabilityEvidence` if the evidence is impossible under the model
    pub fn most_probable_explanation(&self, evidence: &Evidence) -> Result<MapAssignment> {
        let evidence = self.resolve_evidence(evidence)?;
        let estimate = self.engine.map(&[], &evidence)?;
        let z = self.engine.probability_of_evidence(&evidence)?;

        // nothing is maximized out: the weight is the joint probability of the explanation
        Ok(package(estimate.explanation, estimate.weight, estimate.weight, z))
    }

    /// ```P(evidence)``` under the model
    pub fn probability_of_evidence(&self, evidence: &Evidence) -> Result<f64> {
        let evidence = self.resolve_evidence(evidence)?;
        self.engine.probability_of_evidence(&evidence)
    }

    fn resolve(&self, variables: &[&str], evidence: &Evidence) -> Result<(Vec<Variable>, Assignment)> {
        if variables.is_empty() {
            return Err(BayesError::EmptyQuery);
        }

        let vars = variables.iter()
                            .map(|name| self.model.variable(name).cloned())
                            .collect::<Result<Vec<Variable>>>()?;
        let evidence = self.resolve_evidence(evidence)?;

        if let Some(dup) = variables.iter().duplicates().next() {
            return Err(BayesError::DuplicateVariable(dup.to_string()));
        }

        if let Some(v) = vars.iter().find(|v| evidence.contains(v)) {
            return Err(BayesError::QueryEvidenceOverlap(v.name().to_string()));
        }

        Ok((vars, evidence))
    }

    fn resolve_evidence(&self, evidence: &Evidence) -> Result<Assignment> {
        let mut assignment = Assignment::new();
        for (name, state) in evidence.iter() {
            let var = self.model.variable(name)?;
            assignment.set_label(var, state)?;
        }

        Ok(assignment)
    }
}


/// Condition the max-product `weight` and the summed `marginal` of a MAP assignment on evidence
/// of probability `z`
fn package(assignment: Assignment, weight: f64, marginal: f64, z: f64) -> MapAssignment {
    let probability = weight / z;
    let posterior = marginal / z;
    debug!(weight, probability, posterior, "map assignment");

    MapAssignment { states: assignment.labels(), weight, probability, posterior }
}
