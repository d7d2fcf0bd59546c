//! Defines an `UndirectedGraph`, an adjacency-set structure used for moral graphs and for the
//! structure of junction trees.

use itertools::Itertools;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

/// A simple undirected graph. Adjacency is symmetric; self-loops and repeated edges collapse.
///
/// Nodes are kept in sorted order, so every traversal of the graph is deterministic.
#[derive(Clone, Debug, PartialEq)]
pub struct UndirectedGraph<N: Ord> {
    adjacency: BTreeMap<N, BTreeSet<N>>
}

impl<N: Ord + Clone> UndirectedGraph<N> {

    /// Build a graph from its nodes and edges. Edge endpoints missing from `nodes` are added.
    pub fn new<I, E>(nodes: I, edges: E) -> Self
        where I: IntoIterator<Item = N>,
              E: IntoIterator<Item = (N, N)>
    {
        let mut adjacency: BTreeMap<N, BTreeSet<N>> = nodes.into_iter()
                                                           .map(|n| (n, BTreeSet::new()))
                                                           .collect();

        for (a, b) in edges {
            if a == b {
                adjacency.entry(a).or_insert_with(BTreeSet::new);
                continue;
            }
            adjacency.entry(a.clone()).or_insert_with(BTreeSet::new).insert(b.clone());
            adjacency.entry(b).or_insert_with(BTreeSet::new).insert(a);
        }

        UndirectedGraph { adjacency }
    }

    /// The nodes, in sorted order
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.adjacency.keys()
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// The neighbors of `node`, or `None` if it is not in the graph
    pub fn neighbors(&self, node: &N) -> Option<&BTreeSet<N>> {
        self.adjacency.get(node)
    }

    pub fn degree(&self, node: &N) -> usize {
        self.adjacency.get(node).map_or(0, |n| n.len())
    }

    pub fn contains_edge(&self, a: &N, b: &N) -> bool {
        self.adjacency.get(a).map_or(false, |n| n.contains(b))
    }

    /// Each edge once, as `(smaller, larger)`, in sorted order
    pub fn edges(&self) -> Vec<(N, N)> {
        self.adjacency
            .iter()
            .flat_map(|(a, ns)| ns.iter().filter(move |b| a < *b).map(move |b| (a.clone(), b.clone())))
            .collect()
    }

    /// The node -> neighbors map. Elimination algorithms take private copies of it.
    pub fn adjacency(&self) -> &BTreeMap<N, BTreeSet<N>> {
        &self.adjacency
    }

    /// The connected components, each sorted, ordered by their smallest node
    pub fn connected_components(&self) -> Vec<Vec<N>> {
        let mut seen: BTreeSet<&N> = BTreeSet::new();
        let mut components = Vec::new();

        for start in self.adjacency.keys() {
            if seen.contains(start) {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            seen.insert(start);
            queue.push_back(start);

            while let Some(node) = queue.pop_front() {
                component.push(node.clone());
                for n in self.adjacency[node].iter() {
                    if seen.insert(n) {
                        queue.push_back(n);
                    }
                }
            }

            component.sort();
            components.push(component);
        }

        components
    }
}

impl<N: Ord + Clone + fmt::Display> fmt::Display for UndirectedGraph<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let edges = self.edges().iter().map(|(a, b)| format!("({}, {})", a, b)).join(", ");
        write!(f, "[{}]", edges)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric() {
        let g = UndirectedGraph::new(vec![1, 2, 3], vec![(1, 2), (2, 1), (3, 2), (3, 3)]);

        assert_eq!(g.num_nodes(), 3);
        assert!(g.contains_edge(&1, &2));
        assert!(g.contains_edge(&2, &1));
        assert!(g.contains_edge(&2, &3));
        assert!(!g.contains_edge(&3, &3));
        assert_eq!(g.degree(&2), 2);
        assert_eq!(g.edges(), vec![(1, 2), (2, 3)]);
        assert_eq!(g.to_string(), "[(1, 2), (2, 3)]");
    }

    #[test]
    fn isolated_nodes() {
        let g = UndirectedGraph::new(vec!["a", "b", "c"], vec![("a", "b")]);

        assert!(g.contains_node(&"c"));
        assert_eq!(g.degree(&"c"), 0);
        assert!(g.neighbors(&"c").map_or(false, |n| n.is_empty()));
        assert_eq!(g.neighbors(&"d"), None);
    }

    #[test]
    fn edge_endpoints_are_nodes() {
        let g = UndirectedGraph::new(Vec::new(), vec![(4, 5)]);
        assert_eq!(g.nodes().cloned().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn components() {
        let g = UndirectedGraph::new(0..7, vec![(0, 3), (3, 5), (1, 2), (6, 2)]);
        assert_eq!(
            g.connected_components(),
            vec![vec![0, 3, 5], vec![1, 2, 6], vec![4]]
        );
    }
}
