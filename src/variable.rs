//! Definition of the variable module
//!
//! A `Variable` represents a discrete random variable in a Bayesian Network. An `Assignment`
//! maps `Variable` names to values from their domains; it serves as evidence, as a query event,
//! and as a (partial or complete) instantiation of a `Factor`'s scope.

use crate::util::{MarginalError, Result};

use indexmap::IndexMap;
use itertools::Itertools;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::sync::Arc;


/// A named discrete random variable with an ordered, finite domain.
///
/// `Variable`s are cheap to clone: clones share the same name and domain. Identity (equality,
/// hashing and ordering) is by name only; two declarations that share a name but not a domain
/// are rejected when a `BayesianNetwork` is built.
#[derive(Clone)]
pub struct Variable {
    /// The name of the `Variable`
    name: Arc<str>,

    /// The ordered values the `Variable` can take
    domain: Arc<[String]>
}

impl Variable {

    /// Construct a new `Variable`
    ///
    /// # Errors
    /// * `MarginalError::MalformedFactor` if the domain is empty or contains a repeated label
    pub fn new<S: AsRef<str>>(name: &str, domain: &[S]) -> Result<Variable> {
        let domain: Vec<String> = domain.iter().map(|s| String::from(s.as_ref())).collect();

        if domain.is_empty() {
            return Err(MarginalError::MalformedFactor(
                format!("variable `{}` has an empty domain", name)
            ));
        }

        if let Some(dup) = domain.iter().duplicates().next() {
            return Err(MarginalError::MalformedFactor(
                format!("variable `{}` repeats the label `{}`", name, dup)
            ));
        }

        Ok(Variable { name: Arc::from(name), domain: Arc::from(domain) })
    }

    /// Get the name of the `Variable`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the domain of the `Variable`, in declaration order
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// The number of values in the domain
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// Position of `label` in the domain
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.domain.iter().position(|v| v == label)
    }

    /// The label at position `idx` of the domain
    pub fn label(&self, idx: usize) -> Option<&str> {
        self.domain.get(idx).map(|s| s.as_str())
    }

    /// Check whether two `Variable`s with the same name also agree on their domain.
    pub fn same_domain(&self, other: &Variable) -> bool {
        self.domain == other.domain
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Variable) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Variable) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Variable) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{:?}", self.name, self.domain)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}


/// An `Assignment` maps `Variable` names to labels in their domains.
///
/// Keys keep their insertion order, which makes error messages and iteration deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: IndexMap<String, String>
}

impl Assignment {

    /// Create an empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Create an `Assignment` from `(name, label)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        pairs.iter().cloned().collect()
    }

    /// Assign `label` to the variable called `name`, replacing any previous value
    pub fn set(&mut self, name: &str, label: &str) {
        self.values.insert(String::from(name), String::from(label));
    }

    /// Builder-style form of `set`
    pub fn with(mut self, name: &str, label: &str) -> Self {
        self.set(name, label);
        self
    }

    /// Get the label assigned to `name`, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the `(name, label)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The names of the assigned variables, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// Union of two `Assignment`s. On a shared name, the label from `other` wins.
    pub fn merged(&self, other: &Assignment) -> Assignment {
        let mut result = self.clone();
        for (k, v) in other.iter() {
            result.set(k, v);
        }
        result
    }

    /// Find a variable that the two `Assignment`s assign different labels
    pub fn conflicts_with(&self, other: &Assignment) -> Option<&str> {
        self.iter()
            .find(|&(k, v)| other.get(k).map_or(false, |o| o != v))
            .map(|(k, _)| k)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut assn = Assignment::new();
        for (k, v) in iter {
            assn.set(k.as_ref(), v.as_ref());
        }
        assn
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let body = self.iter().map(|(k, v)| format!("{}={}", k, v)).join(", ");
        write!(f, "{{{}}}", body)
    }
}


/// Every joint instantiation of `scope`, as indices into each `Variable`'s domain.
///
/// Rows are produced in row-major order over domain order: the last `Variable` varies fastest.
/// An empty scope has exactly one (empty) instantiation.
pub fn all_assignments(scope: &[Variable]) -> Vec<Vec<usize>> {
    if scope.is_empty() {
        return vec![vec![]];
    }

    scope.iter()
         .map(|v| 0..v.cardinality())
         .multi_cartesian_product()
         .collect()
}


// Unit Tests for the Variable struct.
#[cfg(test)]
mod tests {

    use super::*;
    use std::collections::HashSet;

    #[test]
    fn variable() {
        let var = Variable::new("P", &["yes", "no"]).unwrap();
        assert_eq!(var.name(), "P");
        assert_eq!(var.cardinality(), 2);
        assert_eq!(var.index_of("no"), Some(1));
        assert_eq!(var.index_of("maybe"), None);
        assert_eq!(var.label(0), Some("yes"));
        assert_eq!(var.to_string(), "P");
    }

    #[test]
    fn variable_errs() {
        let empty: [&str; 0] = [];
        assert!(Variable::new("P", &empty).is_err());

        match Variable::new("P", &["yes", "yes"]) {
            Err(MarginalError::MalformedFactor(_)) => (),
            _ => panic!("repeated label was accepted")
        };
    }

    #[test]
    fn identity_by_name() {
        let p1 = Variable::new("P", &["yes", "no"]).unwrap();
        let p2 = Variable::new("P", &["no", "yes"]).unwrap();
        let l = Variable::new("L", &["u", "d"]).unwrap();

        assert_eq!(p1, p2);
        assert!(!p1.same_domain(&p2));
        assert_ne!(p1, l);

        let set: HashSet<Variable> = vec![p1, p2, l].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn assignment() {
        let mut assn = Assignment::new();
        assert!(assn.is_empty());

        assn.set("P", "yes");
        assn.set("L", "u");
        assert_eq!(assn.get("P"), Some("yes"));
        assert_eq!(assn.get("S"), None);
        assert_eq!(assn.names().collect::<Vec<_>>(), vec!["P", "L"]);

        assn.set("P", "no");
        assert_eq!(assn.len(), 2);
        assert_eq!(assn.get("P"), Some("no"));
        assert_eq!(assn.to_string(), "{P=no, L=u}");
    }

    #[test]
    fn merge_and_conflict() {
        let event = Assignment::from_pairs(&[("P", "yes")]);
        let evidence = Assignment::from_pairs(&[("S", "-ve"), ("B", "-ve")]);

        let merged = event.merged(&evidence);
        assert_eq!(merged.len(), 3);
        assert_eq!(event.conflicts_with(&evidence), None);

        let other = Assignment::new().with("P", "no");
        assert_eq!(event.conflicts_with(&other), Some("P"));
        assert_eq!(event.merged(&other).get("P"), Some("no"));
    }

    #[test]
    fn instantiations() {
        let x = Variable::new("X", &["a", "b"]).unwrap();
        let y = Variable::new("Y", &["c", "d", "e"]).unwrap();

        let all = all_assignments(&[x, y]);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![0, 0]);
        assert_eq!(all[1], vec![0, 1]);
        assert_eq!(all[3], vec![1, 0]);
        assert_eq!(all[5], vec![1, 2]);

        assert_eq!(all_assignments(&[]), vec![Vec::<usize>::new()]);
    }
}
