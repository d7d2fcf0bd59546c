//! Defines the structures a Bayesian Network is represented by: the `BayesianNetwork` itself (a
//! bag of `Factor`s) and the `UndirectedGraph` derived from it.

pub mod graph;
pub mod network;

pub use self::graph::UndirectedGraph;
pub use self::network::{BayesianNetwork, BayesianNetworkBuilder};
