//! Exact inference over discrete Bayesian networks by variable elimination.
//!
//! Build a `DirectedModel` with a `DirectedModelBuilder`, then ask a `VariableElimination` for
//! posterior marginals (`query`) or most probable states (`map_query`).

pub mod cpd;
pub mod factor;
pub mod inference;
pub mod model;
pub mod query;
pub mod util;
pub mod variable;

#[cfg(test)]
mod fixtures;

pub use crate::cpd::Cpd;
pub use crate::factor::{Factor, Table, Traceback};
pub use crate::inference::{
    ConditionalInferenceEngine,
    EliminationOrdering,
    InferenceConfig,
    MapEstimate,
    MapInferenceEngine,
    VariableEliminationEngine
};
pub use crate::model::{DirectedModel, DirectedModelBuilder, Model, ModelConfig};
pub use crate::query::{Distribution, Evidence, MapAssignment, VariableElimination};
pub use crate::util::{BayesError, Result};
pub use crate::variable::{all_assignments, Assignment, Variable};
