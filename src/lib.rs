//! Exact inference over discrete Bayesian networks.
//!
//! A network is a bag of `Factor`s over named, finite-domain `Variable`s. Posterior queries are
//! answered either by variable elimination or by belief propagation over a junction tree.

pub mod util;
pub mod variable;
pub mod factor;
pub mod model;
pub mod inference;

pub use util::{MarginalError, Result};
pub use variable::{all_assignments, Assignment, Variable};
pub use factor::{multiply, Factor, Table};
pub use model::{BayesianNetwork, BayesianNetworkBuilder, UndirectedGraph};
pub use inference::{
    build_junction_tree,
    conditional_probability,
    elimination_order,
    variable_elimination,
    BeliefPropagation,
    ConditionalInferenceEngine,
    EliminationStrategy,
    JunctionTree,
    VariableEliminationEngine
};
