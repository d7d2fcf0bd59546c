//! Defines a `BayesianNetwork`, a collection of `Factor`s (usually conditional probability
//! tables) that represents the factorization of a probability distribution P.

use crate::factor::{multiply, Factor};
use crate::util::{MarginalError, Result};
use crate::variable::{all_assignments, Assignment, Variable};
use super::graph::UndirectedGraph;

use indexmap::IndexMap;
use itertools::Itertools;

use std::collections::HashSet;


/// Represents a Bayesian Network as a 'bag of factors'.
///
/// # Representation
/// A traditional graph data structure is not kept; the scopes of the `Factor`s implicitly define
/// the structure. The set of `Variable`s is derived as the union of all scopes, and the moral
/// graph is derived on request.
#[derive(Clone, Debug)]
pub struct BayesianNetwork {

    /// The `Factor`s that comprise the `BayesianNetwork`
    factors: Vec<Factor>,

    /// The `Variable`s of the network by name, in order of first appearance
    variables: IndexMap<String, Variable>

}


impl BayesianNetwork {

    /// Construct a `BayesianNetwork` from its `Factor`s.
    ///
    /// # Errors
    /// * `MarginalError::DomainMismatch` if two `Factor`s mention `Variable`s with the same name
    ///   but different domains
    pub fn new(factors: Vec<Factor>) -> Result<Self> {
        let mut variables: IndexMap<String, Variable> = IndexMap::new();

        for v in factors.iter().flat_map(|f| f.scope().iter()) {
            match variables.get(v.name()) {
                Some(known) if !known.same_domain(v) => {
                    return Err(MarginalError::DomainMismatch(v.name().to_string()));
                },
                Some(_) => (),
                None => {
                    variables.insert(v.name().to_string(), v.clone());
                }
            }
        }

        Ok(BayesianNetwork { factors, variables })
    }

    /// Get the `Factor`s of the network
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Get all `Variable`s in the network, in order of first appearance
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(|k| k.as_str()).collect()
    }

    /// Get the number of `Variable`s in the network
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Lookup a `Variable` in the network based on the name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// The `Factor`s whose scope contains `var`
    pub fn factors_with_variable(&self, var: &Variable) -> Vec<&Factor> {
        self.factors.iter().filter(|f| f.scope().contains(var)).collect()
    }

    /// The moral graph of the network: one node per `Variable`, and an edge between every pair
    /// of `Variable`s that appear together in the scope of some `Factor`.
    pub fn moral_graph(&self) -> UndirectedGraph<String> {
        let edges: Vec<(String, String)> = self.factors
            .iter()
            .flat_map(|f| {
                f.scope()
                 .iter()
                 .tuple_combinations()
                 .map(|(a, b)| (a.name().to_string(), b.name().to_string()))
                 .collect::<Vec<_>>()
            })
            .collect();

        UndirectedGraph::new(self.variables.keys().cloned(), edges)
    }

    /// Condition the network on the evidence.
    ///
    /// Every `Factor` is restricted independently; the `Variable`s and scopes are unchanged.
    pub fn reduce(&self, evidence: &Assignment) -> Self {
        BayesianNetwork {
            factors: self.factors.iter().map(|f| f.restrict(evidence)).collect(),
            variables: self.variables.clone()
        }
    }

    /// The value of the product of every `Factor` at a complete instantiation of the network
    ///
    /// # Errors
    /// * `MarginalError::MissingVariable` if `instantiation` is incomplete
    /// * `MarginalError::Lookup` if the product has no row for it
    pub fn value(&self, instantiation: &Assignment) -> Result<f64> {
        multiply(&self.factors).value(instantiation)
    }
}


/// An implementation of the [builder pattern] for creating a `BayesianNetwork`.
///
/// The first error encountered is kept, and reported by `build`.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct BayesianNetworkBuilder {

    /// The `Factor`s added so far
    factors: Vec<Factor>,

    /// The `Variable`s that already have a conditional probability table
    children: HashSet<Variable>,

    /// The error state of the builder
    err: Option<MarginalError>

}


impl BayesianNetworkBuilder {

    /// Construct a new `BayesianNetworkBuilder` representing an empty network
    pub fn new() -> Self {
        BayesianNetworkBuilder {
            factors: Vec::new(),
            children: HashSet::new(),
            err: None
        }
    }


    /// Add an arbitrary `Factor` to the network.
    pub fn with_factor(mut self, factor: Factor) -> Self {
        if self.err.is_none() {
            self.factors.push(factor);
        }
        self
    }


    /// Add the conditional probability table of `var` given `parents`.
    ///
    /// # Args
    /// * `var`: the variable whose distribution is being defined
    /// * `parents`: the parent variables of `var`
    /// * `rows`: pairs of (labels, probability), with labels ordered as the parents followed by
    ///   `var`
    ///
    /// # Errors
    /// Reported by `build`:
    /// * any error of `Factor::new`
    /// * `MarginalError::DuplicateVariable` if `var` already has a table
    /// * `MarginalError::MalformedFactor` if the rows for some parent instantiation do not sum
    ///   to one
    pub fn with_cpd<I, K, S>(mut self, var: &Variable, parents: &[Variable], rows: I) -> Self
        where I: IntoIterator<Item = (K, f64)>,
              K: IntoIterator<Item = S>,
              S: AsRef<str>
    {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Check for error conditions
        if self.children.contains(var) {
            self.err = Some(MarginalError::DuplicateVariable(var.name().to_string()));
            return self;
        }

        let mut scope = parents.to_vec();
        scope.push(var.clone());

        let factor = match Factor::new(scope, rows) {
            Ok(f) => f,
            Err(e) => {
                self.err = Some(e);
                return self;
            }
        };

        ///////////////////////////////////////////////////////////////////////
        // 3) verify the table represents a cpd
        let n = var.cardinality();
        for parent_inst in all_assignments(parents) {
            let total: f64 = (0..n).filter_map(|i| {
                let mut key = parent_inst.clone();
                key.push(i);
                factor.table().get(&key).cloned()
            }).sum();

            if (total - 1.0).abs() > 0.001 {
                self.err = Some(MarginalError::MalformedFactor(
                    format!("the distribution of `{}` sums to {} for parent instantiation {:?}",
                            var, total, parent_inst)
                ));
                return self;
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 4) Add to current network
        self.children.insert(var.clone());
        self.factors.push(factor);

        self
    }


    /// Complete building the network.
    ///
    /// # Returns
    /// the `BayesianNetwork`, or an error if one was generated during the building process
    pub fn build(self) -> Result<BayesianNetwork> {
        if let Some(e) = self.err {
            Err(e)
        } else {
            BayesianNetwork::new(self.factors)
        }
    }
}


impl Default for BayesianNetworkBuilder {
    fn default() -> Self {
        BayesianNetworkBuilder::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> Variable {
        Variable::new("P", &["yes", "no"]).unwrap()
    }

    fn l() -> Variable {
        Variable::new("L", &["u", "d"]).unwrap()
    }

    fn two_factor_net() -> BayesianNetwork {
        BayesianNetworkBuilder::new()
            .with_cpd(&p(), &[], vec![(vec!["yes"], 0.87), (vec!["no"], 0.13)])
            .with_cpd(&l(), &[p()], vec![
                (vec!["yes", "u"], 0.1),
                (vec!["yes", "d"], 0.9),
                (vec!["no", "u"], 0.99),
                (vec!["no", "d"], 0.01)
            ])
            .build()
            .unwrap()
    }

    #[test]
    fn derived_variables() {
        let net = two_factor_net();

        assert_eq!(net.num_variables(), 2);
        assert_eq!(net.variable_names(), vec!["P", "L"]);
        assert_eq!(net.variable("L"), Some(&l()));
        assert_eq!(net.variable("S"), None);
        assert_eq!(net.factors_with_variable(&p()).len(), 2);
        assert_eq!(net.factors_with_variable(&l()).len(), 1);
    }

    #[test]
    fn moral_graph() {
        let net = two_factor_net();
        let g = net.moral_graph();

        assert_eq!(g.num_nodes(), 2);
        assert_eq!(g.edges(), vec![(String::from("L"), String::from("P"))]);
    }

    #[test]
    fn reduce() {
        let net = two_factor_net();
        let reduced = net.reduce(&Assignment::from_pairs(&[("P", "yes")]));

        // the original is untouched
        assert_eq!(net.factors()[1].len(), 4);

        let l_factor = &reduced.factors()[1];
        assert_eq!(l_factor.len(), 2);
        assert_eq!(l_factor.value(&Assignment::from_pairs(&[("P", "yes"), ("L", "u")])), Ok(0.1));
        match l_factor.value(&Assignment::from_pairs(&[("P", "no"), ("L", "u")])) {
            Err(MarginalError::Lookup(_)) => (),
            _ => panic!("reduced factor still has P = no")
        };
        assert_eq!(reduced.num_variables(), 2);
    }

    #[test]
    fn value() {
        let net = two_factor_net();
        let inst = Assignment::from_pairs(&[("P", "no"), ("L", "u")]);
        assert!((net.value(&inst).unwrap() - 0.1287).abs() < 1e-12);

        let partial = Assignment::from_pairs(&[("P", "no")]);
        assert_eq!(net.value(&partial), Err(MarginalError::MissingVariable(vec![String::from("L")])));
    }

    #[test]
    fn domain_mismatch() {
        let p2 = Variable::new("P", &["yes", "no", "maybe"]).unwrap();
        let f1 = Factor::new(vec![p()], vec![(vec!["yes"], 1.0)]).unwrap();
        let f2 = Factor::new(vec![p2, l()], vec![(vec!["maybe", "u"], 1.0)]).unwrap();

        let net = BayesianNetwork::new(vec![f1, f2]);
        assert_eq!(net.err(), Some(MarginalError::DomainMismatch(String::from("P"))));
    }

    #[test]
    fn builder_errs() {
        // not a distribution
        let net = BayesianNetworkBuilder::new()
            .with_cpd(&p(), &[], vec![(vec!["yes"], 0.5), (vec!["no"], 0.4)])
            .build();
        match net {
            Err(MarginalError::MalformedFactor(_)) => (),
            _ => panic!("accepted a table that does not sum to one")
        };

        // two tables for the same variable
        let net = BayesianNetworkBuilder::new()
            .with_cpd(&p(), &[], vec![(vec!["yes"], 0.5), (vec!["no"], 0.5)])
            .with_cpd(&p(), &[], vec![(vec!["yes"], 0.5), (vec!["no"], 0.5)])
            .build();
        assert_eq!(net.err(), Some(MarginalError::DuplicateVariable(String::from("P"))));

        // the first error wins
        let net = BayesianNetworkBuilder::new()
            .with_cpd(&p(), &[], vec![(vec!["maybe"], 1.0)])
            .with_cpd(&p(), &[], vec![(vec!["yes"], 0.5), (vec!["no"], 0.5)])
            .build();
        match net {
            Err(MarginalError::MalformedFactor(_)) => (),
            _ => panic!("wrong error")
        };
    }
}
