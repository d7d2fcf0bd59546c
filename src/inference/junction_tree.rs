//! Junction tree construction.
//!
//! The clusters of the tree are the elimination cliques of the moral graph. They are connected by
//! a maximum weight spanning forest, where the weight between two clusters is the number of
//! variables they share. Each `Factor` of the network is then placed in one cluster that covers
//! its scope.

use crate::factor::Factor;
use crate::model::{BayesianNetwork, UndirectedGraph};
use crate::util::{MarginalError, Result};
use super::ordering::{elimination_cliques, elimination_order, EliminationStrategy};

use itertools::Itertools;
use log::debug;
use ndarray::prelude::*;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;


/// A tree (or forest, for a disconnected network) of clusters of variables.
///
/// Clusters are identified by their index, which is the position of the eliminated variable in
/// the elimination order that produced them.
#[derive(Clone, Debug)]
pub struct JunctionTree {

    /// The tree structure over cluster indices
    graph: UndirectedGraph<usize>,

    /// The variable names of each cluster
    clusters: Vec<BTreeSet<String>>,

    /// The `Factor`s assigned to each cluster
    factors: Vec<Vec<Factor>>,

    /// variable name -> indices of the clusters that contain it
    node_map: BTreeMap<String, BTreeSet<usize>>

}


/// Build the junction tree of `network` with the minimum degree elimination order
pub fn build_junction_tree(network: &BayesianNetwork) -> Result<JunctionTree> {
    build_junction_tree_with(network, EliminationStrategy::default())
}


pub fn build_junction_tree_with(
    network: &BayesianNetwork,
    strategy: EliminationStrategy
) -> Result<JunctionTree> {
    let moral = network.moral_graph();
    let order = elimination_order(&moral, strategy);
    build_junction_tree_from_order(network, &order)
}


/// Build the junction tree of `network` from a caller supplied elimination order.
///
/// # Errors
/// * `MarginalError::UnknownVariable` if `order` names a variable outside the network
/// * `MarginalError::DuplicateVariable` if `order` names a variable twice
/// * `MarginalError::MissingVariable` if `order` leaves out variables of the network
pub fn build_junction_tree_from_order(
    network: &BayesianNetwork,
    order: &[String]
) -> Result<JunctionTree> {
    let mut tree = JunctionTree::from_elimination_order(&network.moral_graph(), order)?;

    for factor in network.factors() {
        tree.add_factor(factor.clone())?;
    }

    debug!("built junction tree with {} clusters, width {}: {}", tree.num_clusters(), tree.width(), tree);
    Ok(tree)
}


impl JunctionTree {

    /// Build the (factor free) tree whose clusters are the elimination cliques of `order`
    pub fn from_elimination_order(moral: &UndirectedGraph<String>, order: &[String]) -> Result<Self> {
        let mut seen: BTreeSet<&String> = BTreeSet::new();
        for name in order.iter() {
            if !moral.contains_node(name) {
                return Err(MarginalError::UnknownVariable(name.clone()));
            }
            if !seen.insert(name) {
                return Err(MarginalError::DuplicateVariable(name.clone()));
            }
        }

        if seen.len() != moral.num_nodes() {
            let missing = moral.nodes().filter(|n| !seen.contains(n)).cloned().collect();
            return Err(MarginalError::MissingVariable(missing));
        }

        let clusters = elimination_cliques(moral, order);

        let mut node_map: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        for (i, cluster) in clusters.iter().enumerate() {
            for name in cluster.iter() {
                node_map.entry(name.clone()).or_insert_with(BTreeSet::new).insert(i);
            }
        }

        let graph = UndirectedGraph::new(0..clusters.len(), spanning_forest(&clusters));
        let factors = vec![Vec::new(); clusters.len()];

        Ok(JunctionTree { graph, clusters, factors, node_map })
    }

    /// Place `factor` in the lowest index cluster that covers its scope.
    ///
    /// # Returns
    /// the index of that cluster
    ///
    /// # Errors
    /// * `MarginalError::UnknownVariable` if a scope variable is in no cluster
    /// * `MarginalError::Scope` if no single cluster covers the scope
    pub fn add_factor(&mut self, factor: Factor) -> Result<usize> {
        if let Some(v) = factor.scope().iter().find(|v| !self.node_map.contains_key(v.name())) {
            return Err(MarginalError::UnknownVariable(v.name().to_string()));
        }

        let target = self.clusters
            .iter()
            .position(|c| factor.scope().iter().all(|v| c.contains(v.name())));

        match target {
            Some(i) => {
                self.factors[i].push(factor);
                Ok(i)
            },
            None => Err(MarginalError::Scope(
                format!("no cluster covers {{{}}}", factor.scope().iter().join(", "))
            ))
        }
    }

    /// The tree structure over cluster indices
    pub fn graph(&self) -> &UndirectedGraph<usize> {
        &self.graph
    }

    pub fn clusters(&self) -> &[BTreeSet<String>] {
        &self.clusters
    }

    /// The variable names of cluster `idx`, or `None` if it is out of range
    pub fn cluster(&self, idx: usize) -> Option<&BTreeSet<String>> {
        self.clusters.get(idx)
    }

    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// The `Factor`s assigned to cluster `idx`, or `None` if it is out of range
    pub fn factors(&self, idx: usize) -> Option<&[Factor]> {
        self.factors.get(idx).map(|f| f.as_slice())
    }

    /// Every variable name that appears in some cluster, sorted
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.node_map.keys().map(|k| k.as_str())
    }

    /// The indices of the clusters that contain `name`
    pub fn clusters_containing(&self, name: &str) -> Option<&BTreeSet<usize>> {
        self.node_map.get(name)
    }

    /// Size of the largest cluster, less one
    pub fn width(&self) -> usize {
        self.clusters.iter().map(|c| c.len()).max().unwrap_or(0).saturating_sub(1)
    }

    /// The directed edges along which messages are passed, in the order they are sent.
    ///
    /// Each connected component is rooted at its lowest index cluster. Edges are discovered
    /// breadth first from the root; the schedule is the reverse of the discovery order with each
    /// edge flipped (collecting towards the root), followed by the discovery order (distributing
    /// away from it). Every message is sent after all the messages it depends on.
    pub fn message_schedule(&self) -> Vec<(usize, usize)> {
        let mut schedule = Vec::with_capacity(2 * self.graph.edges().len());

        for component in self.graph.connected_components() {
            let root = component[0];

            let mut discovered = Vec::new();
            let mut frontier: VecDeque<(usize, usize)> = self.neighbor_edges(root, None).collect();

            while let Some((src, dest)) = frontier.pop_front() {
                frontier.extend(self.neighbor_edges(dest, Some(src)));
                discovered.push((src, dest));
            }

            schedule.extend(discovered.iter().rev().map(|&(src, dest)| (dest, src)));
            schedule.extend(discovered);
        }

        schedule
    }

    /// Edges from `node` to each of its neighbors, except `parent`
    fn neighbor_edges(&self, node: usize, parent: Option<usize>) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .neighbors(&node)
            .into_iter()
            .flat_map(|ns| ns.iter())
            .filter(move |&&n| Some(n) != parent)
            .map(move |&n| (node, n))
    }

    /// For every variable, the clusters that contain it form a connected subtree
    pub fn satisfies_running_intersection(&self) -> bool {
        self.node_map.values().all(|containing| {
            let edges = self.graph
                .edges()
                .into_iter()
                .filter(|(a, b)| containing.contains(a) && containing.contains(b));
            let subtree = UndirectedGraph::new(containing.iter().cloned(), edges);
            subtree.connected_components().len() == 1
        })
    }
}


/// The edges of a maximum weight spanning forest over `clusters`, by Kruskal's algorithm.
///
/// Weights are kept negated, -|Ci ∩ Cj|, so the heaviest edges sort first. Ties are broken by
/// the cluster indices. Clusters that share no variable are never connected.
fn spanning_forest(clusters: &[BTreeSet<String>]) -> Vec<(usize, usize)> {
    let n = clusters.len();

    let mut weights = Array2::<i64>::zeros((n, n));
    for (i, j) in (0..n).tuple_combinations() {
        let shared = clusters[i].intersection(&clusters[j]).count() as i64;
        weights[[i, j]] = -shared;
        weights[[j, i]] = -shared;
    }

    let mut candidates: Vec<(i64, usize, usize)> = weights
        .indexed_iter()
        .filter(|&((i, j), &w)| i < j && w < 0)
        .map(|((i, j), &w)| (w, i, j))
        .collect();
    candidates.sort();

    // union-find over cluster indices
    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    for (_, i, j) in candidates {
        let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
        if ri != rj {
            parent[rj] = ri;
            edges.push((i, j));
        }
    }

    edges
}


impl fmt::Display for JunctionTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let edges = self.graph
            .edges()
            .iter()
            .map(|&(a, b)| {
                format!("{{{}}} -- {{{}}}",
                        self.clusters[a].iter().join(", "),
                        self.clusters[b].iter().join(", "))
            })
            .join(", ");
        write!(f, "[{}]", edges)
    }
}
