//! Exact inference over `BayesianNetwork`s.
//!
//! Two engines are provided: variable elimination, which answers one query at a time, and
//! belief propagation over a junction tree, which computes every single-variable posterior in one
//! calibration pass.

use crate::factor::Factor;
use crate::util::Result;

pub mod ordering;
mod belief_propagation;
mod junction_tree;
mod variable_elimination;

pub use self::belief_propagation::{BeliefPropagation, Messages};
pub use self::junction_tree::{
    build_junction_tree,
    build_junction_tree_from_order,
    build_junction_tree_with,
    JunctionTree
};
pub use self::ordering::{elimination_cliques, elimination_order, EliminationStrategy};
pub use self::variable_elimination::{
    conditional_probability,
    conditional_probability_with,
    variable_elimination,
    VariableEliminationEngine
};


/// A `ConditionalInferenceEngine` is capable of answering Conditional Probability Queries of the form:
///     ```P(Y | E = e)```
///
/// `ConditionalInferenceEngine`s are stateful and must take the evidence `e` as an argument to whatever
/// construction mechanism they employ.
pub trait ConditionalInferenceEngine {

    /// Infer the joint distribution ```P(variables | evidence)```
    fn infer(&mut self, variables: &[&str]) -> Result<Factor>;

}
