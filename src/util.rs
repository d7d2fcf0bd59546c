//! Defines the `Error` type for the marginal library

use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, MarginalError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum MarginalError {

    /// Represents an incomplete assignment where a complete assignment was required.
    /// The value in the tuple is the names of the variables that were missing from the assignment.
    #[error("missing assignments to the required variables: {0:?}")]
    MissingVariable(Vec<String>),

    /// A complete assignment has no entry in a sparse `Factor` table. The value is the
    /// assignment's labels, in scope order.
    #[error("no table entry for the assignment {0:?}")]
    Lookup(Vec<String>),

    /// An operation required variables to lie within a single scope (of a `Factor`, or of a
    /// junction tree cluster), but they did not
    #[error("scope error: {0}")]
    Scope(String),

    /// The evidence of a conditional query has zero probability
    #[error("the evidence {0} has zero probability")]
    InconsistentEvidence(String),

    /// A `Factor` table does not agree with its scope
    #[error("malformed factor: {0}")]
    MalformedFactor(String),

    /// Two `Variable`s share a name but were declared with different domains
    #[error("variable `{0}` is declared with conflicting domains")]
    DomainMismatch(String),

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    #[error("variable `{0}` appears more than once in a scope")]
    DuplicateVariable(String),

    /// Factor values must be non-negative
    #[error("negative value {0} in a factor table")]
    NegativeValue(String),

    /// Exactly what it sounds like
    #[error("encountered division by zero")]
    DivideByZero,

    /// A name that does not belong to any `Variable` of the network
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    /// A junction tree cluster index that is out of range
    #[error("no cluster with index {0}")]
    UnknownCluster(usize),

    /// Marginals were requested before any messages were passed
    #[error("belief propagation has not been run")]
    NotCalibrated

}
