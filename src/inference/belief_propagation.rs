//! Sum-product belief propagation over a `JunctionTree`.
//!
//! One pass of the message schedule calibrates the tree for a given evidence set. Afterwards the
//! belief of any cluster is the (unnormalized) joint over the cluster's variables and the
//! evidence, and every single-variable marginal can be read off a cluster that contains it.

use crate::factor::{multiply, Factor};
use crate::util::{MarginalError, Result};
use crate::variable::Assignment;
use super::junction_tree::JunctionTree;
use super::ConditionalInferenceEngine;

use indexmap::IndexMap;
use log::{debug, trace};

use std::collections::HashMap;


pub type Messages = IndexMap<(usize, usize), Factor>;


pub struct BeliefPropagation<'a> {

    /// the tree messages are passed over
    tree: &'a JunctionTree,

    /// the factors of each cluster, restricted by the evidence
    factors: Vec<Vec<Factor>>,

    /// (src, dest) -> message, once calibrated
    messages: Option<Messages>,

    /// the evidence of the last run
    evidence: Assignment,

    /// the probability of the evidence, once calibrated
    mass: Option<f64>

}


impl<'a> BeliefPropagation<'a> {

    pub fn new(tree: &'a JunctionTree) -> Self {
        BeliefPropagation {
            tree,
            factors: Vec::new(),
            messages: None,
            evidence: Assignment::new(),
            mass: None
        }
    }

    /// Calibrate the tree for `evidence`, replacing the messages of any earlier run.
    ///
    /// # Errors
    /// * `MarginalError::UnknownVariable` if the evidence names a variable outside the tree
    pub fn run(&mut self, evidence: &Assignment) -> Result<()> {
        if let Some(name) = evidence.names().find(|n| self.tree.clusters_containing(n).is_none()) {
            return Err(MarginalError::UnknownVariable(name.to_string()));
        }

        let factors: Vec<Vec<Factor>> = (0..self.tree.num_clusters())
            .map(|i| self.tree.factors(i).unwrap_or_default().iter().map(|f| f.restrict(evidence)).collect())
            .collect();

        let mut messages = Messages::new();
        for (src, dest) in self.tree.message_schedule() {
            let message = {
                let mut incoming: Vec<&Factor> = factors[src].iter().collect();
                if let Some(ns) = self.tree.graph().neighbors(&src) {
                    // the schedule sends (n, src) before (src, dest)
                    incoming.extend(ns.iter().filter(|&&n| n != dest).map(|&n| &messages[&(n, src)]));
                }

                let target = &self.tree.clusters()[dest];
                multiply(incoming).marginalize_onto(|v| target.contains(v.name()))
            };

            trace!("message {} -> {}: {} rows", src, dest, message.len());
            messages.insert((src, dest), message);
        }

        debug!("calibrated {} clusters with {} messages, evidence {}",
               self.tree.num_clusters(), messages.len(), evidence);

        self.factors = factors;
        self.messages = Some(messages);
        self.evidence = evidence.clone();

        // each tree of the forest carries an independent share of the evidence
        let mut mass = 1.0;
        for component in self.tree.graph().connected_components() {
            let total = self.belief(component[0])?.total();
            trace!("clusters {:?} carry mass {}", component, total);
            mass *= total;
        }
        self.mass = Some(mass);

        Ok(())
    }

    /// The probability of the evidence of the last run
    ///
    /// # Errors
    /// * `MarginalError::NotCalibrated` if `run` has not been called
    pub fn evidence_mass(&self) -> Result<f64> {
        self.mass.ok_or(MarginalError::NotCalibrated)
    }

    /// The messages of the last run, if any
    pub fn messages(&self) -> Option<&Messages> {
        self.messages.as_ref()
    }

    /// The unnormalized belief of cluster `idx`: the product of its restricted factors and every
    /// incoming message.
    ///
    /// # Errors
    /// * `MarginalError::NotCalibrated` if `run` has not been called
    /// * `MarginalError::UnknownCluster` if `idx` is not a cluster of the tree
    pub fn belief(&self, idx: usize) -> Result<Factor> {
        let messages = self.messages.as_ref().ok_or(MarginalError::NotCalibrated)?;
        let cluster = self.tree.cluster(idx).ok_or(MarginalError::UnknownCluster(idx))?;

        let mut phis: Vec<&Factor> = self.factors[idx].iter().collect();
        if let Some(ns) = self.tree.graph().neighbors(&idx) {
            phis.extend(ns.iter().map(|&n| &messages[&(n, idx)]));
        }

        Ok(multiply(phis).marginalize_onto(|v| cluster.contains(v.name())))
    }

    /// The posterior marginal of every variable, sorted by name.
    ///
    /// Each marginal is read from the lowest index cluster containing the variable. Labels ruled
    /// out by the evidence are listed with probability zero.
    ///
    /// # Errors
    /// * `MarginalError::NotCalibrated` if `run` has not been called
    /// * `MarginalError::InconsistentEvidence` if the evidence has zero probability
    pub fn marginals(&self) -> Result<IndexMap<String, Factor>> {
        self.check_consistent()?;

        let mut beliefs: HashMap<usize, Factor> = HashMap::new();
        let mut marginals = IndexMap::new();

        for name in self.tree.variable_names() {
            let idx = self.home_cluster(name)?;
            if !beliefs.contains_key(&idx) {
                beliefs.insert(idx, self.belief(idx)?);
            }

            let marginal = self.project(&beliefs[&idx], &[name])?;
            marginals.insert(name.to_string(), marginal.densify());
        }

        Ok(marginals)
    }

    /// The posterior marginal of a single variable
    pub fn marginal(&self, name: &str) -> Result<Factor> {
        self.check_consistent()?;
        let idx = self.home_cluster(name)?;
        let belief = self.belief(idx)?;
        Ok(self.project(&belief, &[name])?.densify())
    }

    /// A belief normalizes within its own tree only, so zero mass anywhere in the forest must be
    /// caught here
    fn check_consistent(&self) -> Result<()> {
        match self.mass {
            None => Err(MarginalError::NotCalibrated),
            Some(m) if m <= 0.0 => Err(MarginalError::InconsistentEvidence(self.evidence.to_string())),
            Some(_) => Ok(())
        }
    }

    fn home_cluster(&self, name: &str) -> Result<usize> {
        self.tree
            .clusters_containing(name)
            .and_then(|c| c.iter().next().cloned())
            .ok_or_else(|| MarginalError::UnknownVariable(name.to_string()))
    }

    /// Marginalize a belief onto `names` and normalize
    fn project(&self, belief: &Factor, names: &[&str]) -> Result<Factor> {
        belief.marginalize_onto(|v| names.contains(&v.name()))
              .normalize()
              .map_err(|_| MarginalError::InconsistentEvidence(self.evidence.to_string()))
    }
}


impl<'a> ConditionalInferenceEngine for BeliefPropagation<'a> {

    /// The joint posterior of `variables`, which must all lie within a single cluster
    fn infer(&mut self, variables: &[&str]) -> Result<Factor> {
        self.check_consistent()?;

        let mut candidates: Option<Vec<usize>> = None;
        for name in variables.iter() {
            let containing = self.tree
                .clusters_containing(name)
                .ok_or_else(|| MarginalError::UnknownVariable(name.to_string()))?;

            candidates = Some(match candidates {
                None => containing.iter().cloned().collect(),
                Some(c) => c.into_iter().filter(|i| containing.contains(i)).collect()
            });
        }

        let idx = match candidates {
            // no variables: any cluster yields the total mass
            None if self.tree.num_clusters() == 0 => return Ok(multiply(Vec::<&Factor>::new())),
            None => 0,
            Some(c) => *c.first().ok_or_else(|| {
                MarginalError::Scope(format!("no cluster contains all of {:?}", variables))
            })?
        };

        let belief = self.belief(idx)?;
        self.project(&belief, variables)
    }

}
