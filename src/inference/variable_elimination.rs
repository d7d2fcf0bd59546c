//! Exact inference by variable elimination.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE, together with a
//! `ConditionalInferenceEngine` that reduces a network once and answers any number of queries
//! against the same evidence.

use crate::factor::{multiply, Factor};
use crate::model::BayesianNetwork;
use crate::util::{MarginalError, Result};
use crate::variable::{Assignment, Variable};
use super::ordering::{elimination_order, EliminationStrategy};
use super::ConditionalInferenceEngine;

use log::{debug, trace};


/// Compute the probability mass consistent with `evidence`.
///
/// The network is reduced by the evidence, then every variable of `order` that is not observed
/// is summed out: the factors mentioning it are multiplied together and replaced by the product
/// with the variable marginalized out. The product of the remaining factors (whose scopes hold
/// only observed variables) is evaluated at the evidence. An absent row is zero mass.
///
/// # Errors
/// * `MarginalError::UnknownVariable` if `order` names a variable outside the network
pub fn variable_elimination(
    network: &BayesianNetwork,
    evidence: &Assignment,
    order: &[String]
) -> Result<f64> {
    let mut phis: Vec<Factor> = network.reduce(evidence).factors().to_vec();

    for name in order.iter() {
        if evidence.contains(name) {
            continue;
        }

        let var = network.variable(name)
                         .ok_or_else(|| MarginalError::UnknownVariable(name.clone()))?;
        phis = eliminate(phis, var)?;
    }

    match multiply(&phis).value(evidence) {
        Ok(v) => Ok(v),
        Err(MarginalError::Lookup(_)) => Ok(0.0),
        Err(e) => Err(e)
    }
}


/// Compute ```P(event | evidence)```, with the minimum degree elimination order.
///
/// # Errors
/// * `MarginalError::UnknownVariable` if the event or evidence names a variable outside the
///   network
/// * `MarginalError::InconsistentEvidence` if the evidence has zero probability
pub fn conditional_probability(
    network: &BayesianNetwork,
    event: &Assignment,
    evidence: &Assignment
) -> Result<f64> {
    conditional_probability_with(network, event, evidence, EliminationStrategy::default())
}


/// Compute ```P(event | evidence)``` as the ratio of two eliminations that share a single
/// elimination order, computed once from the moral graph of the unreduced network.
///
/// An event that contradicts the evidence has probability zero.
pub fn conditional_probability_with(
    network: &BayesianNetwork,
    event: &Assignment,
    evidence: &Assignment,
    strategy: EliminationStrategy
) -> Result<f64> {
    check_names(network, event)?;
    check_names(network, evidence)?;

    let order = elimination_order(&network.moral_graph(), strategy);

    let denominator = variable_elimination(network, evidence, &order)?;
    if denominator == 0.0 {
        return Err(MarginalError::InconsistentEvidence(evidence.to_string()));
    }

    if event.conflicts_with(evidence).is_some() {
        return Ok(0.0);
    }

    let numerator = variable_elimination(network, &event.merged(evidence), &order)?;
    debug!("P({} | {}) = {} / {}", event, evidence, numerator, denominator);

    Ok(numerator / denominator)
}


/// Sum `var` out of a bag of factors
fn eliminate(phis: Vec<Factor>, var: &Variable) -> Result<Vec<Factor>> {
    let (relevant, mut irrelevant): (Vec<Factor>, Vec<Factor>) = phis
        .into_iter()
        .partition(|f| f.scope().contains(var));

    if relevant.is_empty() {
        return Ok(irrelevant);
    }

    // product step - multiply factors with var
    let psi = multiply(&relevant);

    // sum step - marginalize psi over var
    let tau = psi.marginalize_out(var)?;
    trace!("eliminated {} from {} factors, new scope {:?}", var, relevant.len(), tau.scope());

    irrelevant.push(tau);
    Ok(irrelevant)
}


fn check_names(network: &BayesianNetwork, assignment: &Assignment) -> Result<()> {
    match assignment.names().find(|n| network.variable(n).is_none()) {
        Some(n) => Err(MarginalError::UnknownVariable(n.to_string())),
        None => Ok(())
    }
}


pub struct VariableEliminationEngine {

    /// the `BayesianNetwork` (a 'bag of factors'), reduced by the provided evidence, to use
    /// for the inference task
    network: BayesianNetwork,

    /// the evidence the network was reduced by
    evidence: Assignment,

    /// precomputed elimination order
    order: Vec<String>

}


impl VariableEliminationEngine {

    /// Build an engine for `P(. | evidence)` with the minimum degree heuristic
    pub fn new(network: &BayesianNetwork, evidence: &Assignment) -> Self {
        VariableEliminationEngine::with_strategy(network, evidence, EliminationStrategy::default())
    }

    pub fn with_strategy(
        network: &BayesianNetwork,
        evidence: &Assignment,
        strategy: EliminationStrategy
    ) -> Self {
        // reduce the provided network with the evidence - this is the network we will use for
        // variable elimination
        let reduced = network.reduce(evidence);
        // precompute the preferred elimination order
        let order = elimination_order(&reduced.moral_graph(), strategy);

        VariableEliminationEngine {
            network: reduced,
            evidence: evidence.clone(),
            order
        }
    }

    /// The elimination order the engine follows
    pub fn order(&self) -> &[String] {
        &self.order
    }
}


impl ConditionalInferenceEngine for VariableEliminationEngine {

    fn infer(&mut self, variables: &[&str]) -> Result<Factor> {
        // check input arguments
        if let Some(name) = variables.iter().find(|n| self.network.variable(n).is_none()) {
            return Err(MarginalError::UnknownVariable(name.to_string()));
        }

        let mut phis = self.network.factors().to_vec();
        for name in self.order.iter() {
            if variables.contains(&name.as_str()) || self.evidence.contains(name) {
                // queried variables are kept, and observed variables are fixed by the reduction
                continue;
            }

            if let Some(var) = self.network.variable(name) {
                phis = eliminate(phis, var)?;
            }
        }

        // multiply together remaining phis, and drop the observed variables
        let phi_star = multiply(&phis).marginalize_onto(|v| variables.contains(&v.name()));

        // now we have an unnormalized distribution
        phi_star.normalize()
                .map_err(|_| MarginalError::InconsistentEvidence(self.evidence.to_string()))
    }

}
