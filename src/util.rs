//! Defines the `Error` type for the bayes-elim library

use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, BayesError>;

/// Every failure the library can report.
///
/// Errors raised while building a `DirectedModel` abort the build entirely. Errors raised while
/// answering a query abort only that query; the model is never modified by a query.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BayesError {

    /// A referenced variable name is not registered in the model
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    /// A state label is not in the domain of the named variable
    #[error("unknown state `{state}` for variable `{variable}`")]
    UnknownState { variable: String, state: String },

    /// A variable was registered (or listed) twice where it may only appear once
    #[error("variable `{0}` was given more than once")]
    DuplicateVariable(String),

    /// A variable domain has fewer than two states or repeats a label
    #[error("invalid domain for variable `{variable}`: {reason}")]
    InvalidDomain { variable: String, reason: String },

    /// The table handed to a `Factor` does not fit its scope
    #[error("invalid factor table: {0}")]
    InvalidTable(String),

    /// The edge set contains a cycle. Carries the variables left unordered by the topological sort.
    #[error("the graph contains a cycle through {0:?}")]
    CyclicGraph(Vec<String>),

    /// A CPT scope does not equal `{v} U Pa(v)`
    #[error("CPT for `{variable}` has parents {found:?}, expected {expected:?}")]
    CptScopeMismatch { variable: String, expected: Vec<String>, found: Vec<String> },

    /// A CPT row does not sum to one for some parent assignment
    #[error("CPT for `{variable}` sums to {sum} for parent assignment {parents:?}")]
    CptNotNormalized { variable: String, parents: Vec<String>, sum: f64 },

    /// A registered variable has no CPT
    #[error("no CPT was provided for `{0}`")]
    MissingCpt(String),

    /// A registered variable has more than one CPT
    #[error("more than one CPT was provided for `{0}`")]
    DuplicateCpt(String),

    /// The evidence has probability zero under the model
    #[error("the evidence has zero probability under the model")]
    ZeroProbabilityEvidence,

    /// A query was issued without any query variables
    #[error("a query requires at least one variable")]
    EmptyQuery,

    /// A query variable is also fixed by the evidence
    #[error("variable `{0}` appears in both the query and the evidence")]
    QueryEvidenceOverlap(String),

    /// A factor operation named a variable outside the factor's scope
    #[error("variable `{0}` is not in the scope of the factor")]
    VariableNotInScope(String),

    /// Represents an incomplete assignment where a complete assignment was required.
    #[error("missing assignments to the required variables {0:?}")]
    IncompleteAssignment(Vec<String>),

}
