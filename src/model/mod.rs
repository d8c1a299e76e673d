//! Defines a `Model`, a probabilistic graphical model representing the factorization of a
//! probability distribution P as a collection of `Factor`s.

use crate::factor::Factor;
use crate::util::Result;
use crate::variable::{Assignment, Variable};

/// The `Model` trait represents a Probabilistic Graphical Model.
pub trait Model {

    /// Lookup a `Variable` in the `Model` based on the name
    fn lookup_variable(&self, name: &str) -> Option<&Variable>;

    /// Get all `Variable`s in the model.
    fn variables(&self) -> Vec<&Variable>;

    /// Get the number of `Variable`s in the the `Model`
    fn num_variables(&self) -> usize;

    /// The `Factor`s whose product is the (possibly unnormalized) joint distribution.
    fn factors(&self) -> Vec<&Factor>;

    /// Determine the probability of a full `Assignment` to the `Variable`s in the `Model`.
    ///
    /// Specifically, this computes ```P(zeta)```, where ```zeta``` is a full assignment.
    fn probability(&self, assignment: &Assignment) -> Result<f64>;
}

pub mod config;
pub mod directed;

pub use self::config::ModelConfig;
pub use self::directed::{DirectedModel, DirectedModelBuilder};
