//! Elimination ordering heuristics.
//!
//! The order in which variables are summed out controls the size of the intermediate factors of
//! variable elimination, and the size of the clusters of a junction tree. Finding the best order
//! is NP-hard; these are greedy heuristics.

use crate::model::UndirectedGraph;

use log::{debug, trace};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

type Adjacency<N> = BTreeMap<N, BTreeSet<N>>;


/// Heuristic used to compute an elimination order.
///
/// Every heuristic breaks ties by taking the smallest node first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EliminationStrategy {
    /// Repeatedly remove the node with the fewest remaining neighbors. Removing a node does not
    /// connect its neighbors.
    MinDegree,

    /// Repeatedly eliminate the node whose neighbors need the fewest new edges to become a
    /// clique, then connect them.
    MinFill,

    /// Maximum cardinality search: repeatedly mark the node with the most marked neighbors, and
    /// eliminate in the reverse of the marking order.
    MaxCardinality
}

impl Default for EliminationStrategy {
    fn default() -> Self {
        EliminationStrategy::MinDegree
    }
}


/// Compute an order over every node of `graph`.
pub fn elimination_order<N>(graph: &UndirectedGraph<N>, strategy: EliminationStrategy) -> Vec<N>
    where N: Ord + Clone + fmt::Debug
{
    let order = match strategy {
        EliminationStrategy::MinDegree => min_degree_order(graph),
        EliminationStrategy::MinFill => min_fill_order(graph),
        EliminationStrategy::MaxCardinality => max_cardinality_order(graph)
    };

    debug!("{:?} elimination order over {} nodes: {:?}", strategy, order.len(), order);
    order
}


/// The elimination cliques of `order`.
///
/// Nodes are eliminated in order from a private copy of `graph`. The clique of each step is the
/// eliminated node together with its neighbors at that moment; the neighbors are then connected
/// pairwise before the node is removed.
pub fn elimination_cliques<N>(graph: &UndirectedGraph<N>, order: &[N]) -> Vec<BTreeSet<N>>
    where N: Ord + Clone + fmt::Debug
{
    let mut adjacency = graph.adjacency().clone();

    order.iter().map(|node| {
        let mut clique = eliminate(&mut adjacency, node);
        clique.insert(node.clone());
        trace!("eliminated {:?}, clique {:?}", node, clique);
        clique
    }).collect()
}


fn min_degree_order<N: Ord + Clone>(graph: &UndirectedGraph<N>) -> Vec<N> {
    let mut adjacency = graph.adjacency().clone();
    let mut order = Vec::with_capacity(adjacency.len());

    while let Some(node) = select(&adjacency, |ns| ns.len()) {
        adjacency.remove(&node);
        for ns in adjacency.values_mut() {
            ns.remove(&node);
        }
        order.push(node);
    }

    order
}


fn min_fill_order<N: Ord + Clone>(graph: &UndirectedGraph<N>) -> Vec<N> {
    let mut adjacency = graph.adjacency().clone();
    let mut order = Vec::with_capacity(adjacency.len());

    loop {
        let node = {
            let adj = &adjacency;
            let fill = |ns: &BTreeSet<N>| -> usize {
                let ns: Vec<&N> = ns.iter().collect();
                let mut count = 0;
                for (i, a) in ns.iter().enumerate() {
                    for b in ns[i + 1..].iter() {
                        if !adj.get(*a).map_or(false, |s| s.contains(*b)) {
                            count += 1;
                        }
                    }
                }
                count
            };
            select(adj, fill)
        };

        match node {
            Some(node) => {
                eliminate(&mut adjacency, &node);
                order.push(node);
            },
            None => break
        }
    }

    order
}


fn max_cardinality_order<N: Ord + Clone>(graph: &UndirectedGraph<N>) -> Vec<N> {
    let vars: Vec<&N> = graph.nodes().collect();
    // set of marked variables
    let mut marked: BTreeSet<&N> = BTreeSet::new();
    // the (reverse) elimination order
    let mut elimination = Vec::with_capacity(vars.len());

    for _ in 0..vars.len() {
        let mut best: Option<(&N, usize)> = None;

        for &v in vars.iter() {
            // already in the elimination order
            if marked.contains(v) {
                continue;
            }

            let ct = graph.neighbors(v)
                          .map_or(0, |ns| ns.iter().filter(|n| marked.contains(n)).count());

            match best {
                Some((_, max)) if ct <= max => (),
                _ => best = Some((v, ct))
            }
        }

        if let Some((v, _)) = best {
            elimination.push(v.clone());
            marked.insert(v);
        }
    }

    // we need to reverse the elimination order before returning
    elimination.reverse();
    elimination
}


/// The first node (in sorted order) of minimum cost, if any remain
fn select<N, F>(adjacency: &Adjacency<N>, cost: F) -> Option<N>
    where N: Ord + Clone,
          F: Fn(&BTreeSet<N>) -> usize
{
    adjacency.iter()
             .min_by_key(|&(_, ns)| cost(ns))
             .map(|(n, _)| n.clone())
}


/// Remove `node`, connecting its neighbors pairwise. Returns the neighbors.
fn eliminate<N: Ord + Clone>(adjacency: &mut Adjacency<N>, node: &N) -> BTreeSet<N> {
    let neighbors = adjacency.remove(node).unwrap_or_default();

    for n in neighbors.iter() {
        if let Some(ns) = adjacency.get_mut(n) {
            ns.remove(node);
            ns.extend(neighbors.iter().filter(|&m| m != n).cloned());
        }
    }

    neighbors
}
