//! Defines a `VariableEliminationEngine` that uses exact inference by variable elimination to
//! answer conditional and MAP queries.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE, and its max-product
//! variant (Algorithm 13.1) with traceback.

use crate::factor::{Factor, Traceback};
use crate::model::Model;
use crate::util::{BayesError, Result};
use crate::variable::{Assignment, Variable};
use super::{ConditionalInferenceEngine, InferenceConfig, MapEstimate, MapInferenceEngine};

use itertools::Itertools;
use tracing::{debug, debug_span, trace};


/// How an eliminated variable is removed from the product of the factors that mention it
#[derive(Clone, Copy, Debug, PartialEq)]
enum Collapse {
    Sum,
    Max
}


/// Exact inference by variable elimination over any `Model`.
///
/// The engine only reads the model; every query builds its own working set of factors, so one
/// engine (or many) can answer queries concurrently.
pub struct VariableEliminationEngine<'a, M: Model> {

    /// the model whose factors are eliminated
    model: &'a M,

    config: InferenceConfig

}


impl<'a, M: Model> VariableEliminationEngine<'a, M> {

    pub fn new(model: &'a M) -> Self {
        VariableEliminationEngine::with_config(model, InferenceConfig::default())
    }

    pub fn with_config(model: &'a M, config: InferenceConfig) -> Self {
        VariableEliminationEngine { model, config }
    }

    pub fn model(&self) -> &'a M {
        self.model
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Compute the unnormalized ```P(variables, evidence)``` as a `Factor` whose scope is
    /// `variables`, in the given order. With no `variables` this is the scalar ```P(evidence)```.
    pub fn joint(&self, variables: &[Variable], evidence: &Assignment) -> Result<Factor> {
        self.eliminate(variables, evidence, Collapse::Sum).map(|(phi, _)| phi)
    }

    /// The probability of the evidence under the model
    pub fn probability_of_evidence(&self, evidence: &Assignment) -> Result<f64> {
        self.joint(&[], evidence).map(|phi| phi.total())
    }

    /// Check that a query only refers to `Variable`s of the model, does not repeat itself, and
    /// does not ask for observed `Variable`s.
    fn check(&self, variables: &[Variable], evidence: &Assignment) -> Result<()> {
        for v in variables.iter().chain(evidence.vars()) {
            match self.model.lookup_variable(v.name()) {
                Some(known) if known == v => (),
                _ => return Err(BayesError::UnknownVariable(v.name().to_string()))
            }
        }

        if let Some(dup) = variables.iter().duplicates().next() {
            return Err(BayesError::DuplicateVariable(dup.name().to_string()));
        }

        if let Some(v) = variables.iter().find(|v| evidence.contains(v)) {
            return Err(BayesError::QueryEvidenceOverlap(v.name().to_string()));
        }

        if let super::EliminationOrdering::Fixed(ref names) = self.config.ordering {
            if let Some(name) = names.iter().find(|n| self.model.lookup_variable(n).is_none()) {
                return Err(BayesError::UnknownVariable(name.clone()));
            }
        }

        Ok(())
    }

    /// Eliminate every `Variable` that is neither queried nor observed.
    ///
    /// # Returns
    /// the product of the remaining factors, aligned to `variables`, and the tracebacks of each
    /// elimination step (empty when summing)
    fn eliminate(
        &self,
        variables: &[Variable],
        evidence: &Assignment,
        collapse: Collapse
    ) -> Result<(Factor, Vec<Traceback>)> {
        self.check(variables, evidence)?;

        // reduce every factor of the model by the evidence - this is the working set we eliminate
        let mut phis: Vec<Factor> = self.model
                                        .factors()
                                        .into_iter()
                                        .map(|f| f.reduce(evidence))
                                        .collect();

        let eliminate: Vec<Variable> = self.model
                                           .variables()
                                           .into_iter()
                                           .filter(|v| !variables.contains(v) && !evidence.contains(v))
                                           .cloned()
                                           .collect();

        let order = self.config.ordering.order(&phis, &eliminate);
        debug!(order = ?order.iter().map(|v| v.name()).collect::<Vec<_>>(), "elimination order");

        let mut tracebacks = Vec::new();
        for var in order.iter() {
            let (phi_1prime, phi_2prime): (Vec<Factor>, Vec<Factor>) = phis
                                           .into_iter()
                                           .partition(|f| f.contains(var));

            // product step - multiply factors with var
            let psi = phi_1prime.iter().fold(Factor::unit(), |acc, phi| acc.product(phi));

            // sum (or max) step - remove var from psi
            let tau = match collapse {
                Collapse::Sum => psi.sum_out(var)?,
                Collapse::Max => {
                    let (tau, traceback) = psi.max_out(var)?;
                    tracebacks.push(traceback);
                    tau
                }
            };

            trace!(
                variable = var.name(),
                combined = phi_1prime.len(),
                scope = tau.scope().len(),
                "eliminated variable"
            );

            phis = phi_2prime;
            phis.push(tau);
        }

        // multiply together remaining phis
        let phi_star = phis.iter().fold(Factor::unit(), |acc, phi| acc.product(phi));

        Ok((phi_star.aligned(variables)?, tracebacks))
    }
}


impl<'a, M: Model> ConditionalInferenceEngine for VariableEliminationEngine<'a, M> {

    fn infer(&self, variables: &[Variable], evidence: &Assignment) -> Result<Factor> {
        let span = debug_span!(
            "infer",
            variables = ?variables.iter().map(|v| v.name()).collect::<Vec<_>>(),
            evidence = evidence.len()
        );
        let _guard = span.enter();

        // we have an unnormalized distribution. We need the partition function to return a
        // conditional probability.
        self.joint(variables, evidence)?.normalize()
    }

}


impl<'a, M: Model> MapInferenceEngine for VariableEliminationEngine<'a, M> {

    fn map(&self, variables: &[Variable], evidence: &Assignment) -> Result<MapEstimate> {
        let span = debug_span!(
            "map",
            variables = ?variables.iter().map(|v| v.name()).collect::<Vec<_>>(),
            evidence = evidence.len()
        );
        let _guard = span.enter();

        let (phi_star, tracebacks) = self.eliminate(variables, evidence, Collapse::Max)?;
        let (assignment, weight) = phi_star.argmax();

        if !(weight > 0.0) {
            return Err(BayesError::ZeroProbabilityEvidence);
        }

        // walk the tracebacks backwards: each one depends only on variables that are queried or
        // were eliminated after it
        let mut explanation = assignment.clone();
        for traceback in tracebacks.iter().rev() {
            let state = traceback.resolve(&explanation)?;
            explanation.set(traceback.var(), state);
        }

        Ok(MapEstimate { assignment, explanation, weight })
    }

}
