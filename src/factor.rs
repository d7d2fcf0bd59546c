//! Definition of the factor module
//!
//! A `Factor` represents a relationship between some set of `Variable`s.

use crate::util::{MarginalError, Result};
use crate::variable::{all_assignments, Assignment, Variable};

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::prelude as nd;

use std::fmt;

/// A sparse factor table. Keys are instantiations of the scope, given as indices into the domain
/// of each scope `Variable` (in scope order). A missing key means no mass is recorded for that
/// instantiation.
pub type Table = IndexMap<Vec<usize>, f64>;


/// A `Factor` over an ordered scope of `Variable`s, represented as a sparse table.
///
/// `Factor`s are immutable: every operation returns a new `Factor`.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// The scope of the `Factor`. The order defines the positional meaning of table keys.
    scope: Vec<Variable>,

    /// The recorded values of the `Factor`
    table: Table
}


impl Factor {

    /// Create a new `Factor` from labelled rows.
    ///
    /// # Args
    /// * `scope`: the `Variable`s of the `Factor`
    /// * `rows`: pairs of (labels in scope order, value)
    ///
    /// # Errors
    /// * `MarginalError::MalformedFactor` if a key does not have one label per scope `Variable`,
    ///   a label is outside its `Variable`'s domain, or an empty scope is not given exactly one
    ///   (empty) key
    /// * `MarginalError::DuplicateVariable` if a `Variable` appears twice in the scope
    /// * `MarginalError::NegativeValue` if a value is negative (or NaN)
    pub fn new<I, K, S>(scope: Vec<Variable>, rows: I) -> Result<Self>
        where I: IntoIterator<Item = (K, f64)>,
              K: IntoIterator<Item = S>,
              S: AsRef<str>
    {
        check_scope(&scope)?;

        let mut table = Table::new();
        for (key, value) in rows {
            let labels: Vec<String> = key.into_iter().map(|s| String::from(s.as_ref())).collect();
            if labels.len() != scope.len() {
                return Err(MarginalError::MalformedFactor(
                    format!("key {:?} has {} labels but the scope has {} variables",
                            labels, labels.len(), scope.len())
                ));
            }

            let mut idx = Vec::with_capacity(scope.len());
            for (var, label) in scope.iter().zip(labels.iter()) {
                match var.index_of(label) {
                    Some(i) => idx.push(i),
                    None => {
                        return Err(MarginalError::MalformedFactor(
                            format!("`{}` is not in the domain of `{}`", label, var)
                        ));
                    }
                }
            }

            check_value(value, &idx)?;
            table.insert(idx, value);
        }

        // a scalar factor
        if scope.is_empty() && table.len() != 1 {
            return Err(MarginalError::MalformedFactor(
                String::from("a factor over no variables must have exactly one value")
            ));
        }

        Ok(Factor { scope, table })
    }


    /// Create a new `Factor` from a dense table. Every cell of the array is recorded.
    ///
    /// # Errors
    /// * `MarginalError::MalformedFactor` if the number or length of the array's axes does not
    ///   match the scope. An empty scope takes a zero-dimensional array.
    /// * `MarginalError::DuplicateVariable` if a `Variable` appears twice in the scope
    /// * `MarginalError::NegativeValue` if a value is negative (or NaN)
    pub fn from_array(scope: Vec<Variable>, array: nd::ArrayD<f64>) -> Result<Self> {
        check_scope(&scope)?;

        if scope.len() != array.ndim() {
            return Err(MarginalError::MalformedFactor(
                String::from("cardinality of scope must match number of table dimensions")
            ));
        }

        for (v, &t) in scope.iter().zip(array.shape().iter()) {
            if v.cardinality() != t {
                return Err(MarginalError::MalformedFactor(
                    format!("axis for `{}` has length {}, expected {}", v, t, v.cardinality())
                ));
            }
        }

        let mut table = Table::new();
        for idx in all_assignments(&scope) {
            let value = array[nd::IxDyn(&idx)];
            check_value(value, &idx)?;
            table.insert(idx, value);
        }

        Ok(Factor { scope, table })
    }


    /// Assemble a `Factor` whose table is already known to agree with its scope
    pub(crate) fn from_table(scope: Vec<Variable>, table: Table) -> Self {
        Factor { scope, table }
    }


    /// Retrieve the scope of the `Factor`.
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }


    /// Find a scope `Variable` by name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.scope.iter().find(|v| v.name() == name)
    }


    /// Check if the named `Variable` is in the scope
    pub fn contains(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }


    /// The sparse table of the `Factor`
    pub fn table(&self) -> &Table {
        &self.table
    }


    /// The number of recorded rows
    pub fn len(&self) -> usize {
        self.table.len()
    }


    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }


    /// The sum of every recorded value
    pub fn total(&self) -> f64 {
        self.table.values().sum()
    }


    /// Retrieve the value for a complete assignment over the scope of this `Factor`
    ///
    /// # Args
    /// * `assignment`: a full assignment to the scope of the `Factor`. The assignment's scope may
    ///   be a superset of the `Factor`s scope.
    ///
    /// # Returns
    /// the value of the assignment, or an error.
    ///
    /// # Errors
    /// * `MarginalError::MissingVariable`, if assignment is not a complete assignment to the
    ///   scope of the `Factor`
    /// * `MarginalError::Lookup`, if the table has no row for the assignment
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let labels: Vec<&str> = self.scope.iter()
                                          .filter_map(|v| assignment.get(v.name()))
                                          .collect();

        if labels.len() != self.scope.len() {
            let missing = self.scope.iter()
                                    .filter(|v| !assignment.contains(v.name()))
                                    .map(|v| v.name().to_string())
                                    .collect();
            return Err(MarginalError::MissingVariable(missing));
        }

        let key: Option<Vec<usize>> = self.scope.iter()
                                                .zip(labels.iter())
                                                .map(|(v, l)| v.index_of(l))
                                                .collect();

        key.and_then(|k| self.table.get(&k).cloned())
           .ok_or_else(|| MarginalError::Lookup(labels.iter().map(|l| l.to_string()).collect()))
    }


    /// Restrict the `Factor` to the rows that agree with the evidence.
    ///
    /// This is a row filter: the scope is unchanged, and evidence `Variable`s stay in scope with a
    /// single consistent label per row. Evidence for `Variable`s outside the scope is ignored.
    pub fn restrict(&self, evidence: &Assignment) -> Self {
        // None: unconstrained. Some(None): the evidence label is not in the domain.
        let constraints: Vec<Option<Option<usize>>> = self.scope
            .iter()
            .map(|v| evidence.get(v.name()).map(|label| v.index_of(label)))
            .collect();

        if constraints.iter().all(|c| c.is_none()) {
            return self.clone();
        }

        let table = self.table
            .iter()
            .filter(|&(key, _)| {
                key.iter().zip(constraints.iter()).all(|(k, c)| match *c {
                    None => true,
                    Some(Some(i)) => *k == i,
                    Some(None) => false
                })
            })
            .map(|(k, &v)| (k.clone(), v))
            .collect();

        Factor::from_table(self.scope.clone(), table)
    }


    /// Sum the given `Variable` out of the `Factor`
    ///
    /// Every instantiation of the remaining scope gets a row, holding the sum of the matching
    /// rows of this `Factor`. Absent rows contribute nothing; if all of them are absent the new
    /// row is an explicit zero.
    ///
    /// # Errors
    /// * `MarginalError::Scope` if `var` is not in the scope
    pub fn marginalize_out(&self, var: &Variable) -> Result<Self> {
        let idx = self.scope
                      .iter()
                      .position(|v| v == var)
                      .ok_or_else(|| MarginalError::Scope(var.name().to_string()))?;

        let mut new_scope = self.scope.clone();
        let removed = new_scope.remove(idx);

        let mut table = Table::new();
        for inst in all_assignments(&new_scope) {
            let mut key = inst.clone();
            key.insert(idx, 0);

            let mut total = 0.0;
            for value in 0..removed.cardinality() {
                key[idx] = value;
                if let Some(v) = self.table.get(&key) {
                    total += v;
                }
            }

            table.insert(inst, total);
        }

        Ok(Factor::from_table(new_scope, table))
    }


    /// Sum out every scope `Variable` for which `keep` returns `false`
    pub fn marginalize_onto<F>(&self, keep: F) -> Self
        where F: Fn(&Variable) -> bool
    {
        let mut result = self.clone();
        for v in self.scope.iter().filter(|v| !keep(*v)) {
            // v is in result's scope: only variables already summed out have been removed
            if let Ok(f) = result.marginalize_out(v) {
                result = f;
            }
        }
        result
    }


    /// Product of this `Factor` and another. See `multiply`.
    pub fn product(&self, other: &Self) -> Self {
        multiply(vec![self, other])
    }


    /// Divide every value by the sum of all values
    ///
    /// # Errors
    /// * `MarginalError::DivideByZero` if the values sum to zero
    pub fn normalize(&self) -> Result<Self> {
        let total = self.total();
        if total == 0.0 {
            return Err(MarginalError::DivideByZero);
        }

        let table = self.table.iter().map(|(k, &v)| (k.clone(), v / total)).collect();
        Ok(Factor::from_table(self.scope.clone(), table))
    }


    /// Export the `Factor` as a dense table, with absent rows as zero
    pub fn to_array(&self) -> nd::ArrayD<f64> {
        let shape: Vec<usize> = self.scope.iter().map(|v| v.cardinality()).collect();
        let mut array = nd::ArrayD::zeros(nd::IxDyn(&shape));
        for (key, &value) in self.table.iter() {
            array[nd::IxDyn(key)] = value;
        }
        array
    }


    /// Add an explicit zero row for every instantiation with no recorded value
    pub(crate) fn densify(&self) -> Self {
        let mut table = self.table.clone();
        for inst in all_assignments(&self.scope) {
            table.entry(inst).or_insert(0.0);
        }
        table.sort_keys();
        Factor::from_table(self.scope.clone(), table)
    }
}


/// Multiply a collection of `Factor`s.
///
/// The scope of the result is the union of the input scopes, in order of first appearance. For
/// every instantiation of that scope, the value is the product of each input's value at its own
/// sub-instantiation. If any input has no row for its sub-instantiation, the instantiation is
/// left out of the result (a natural join). The product of no `Factor`s is the scalar 1.
pub fn multiply<'a, I>(factors: I) -> Factor
    where I: IntoIterator<Item = &'a Factor>
{
    let factors: Vec<&Factor> = factors.into_iter().collect();

    let scope: Vec<Variable> = factors.iter()
                                      .flat_map(|f| f.scope.iter().cloned())
                                      .unique()
                                      .collect();

    let position: IndexMap<&Variable, usize> = scope.iter()
                                                    .enumerate()
                                                    .map(|(i, v)| (v, i))
                                                    .collect();

    // where each factor's scope variables sit in the union scope
    let projections: Vec<Vec<usize>> = factors.iter()
        .map(|f| f.scope.iter().map(|v| position[v]).collect())
        .collect();

    let mut table = Table::new();
    'rows: for inst in all_assignments(&scope) {
        let mut product = 1.0;
        for (f, proj) in factors.iter().zip(projections.iter()) {
            let key: Vec<usize> = proj.iter().map(|&p| inst[p]).collect();
            match f.table.get(&key) {
                Some(v) => product *= v,
                None => continue 'rows
            }
        }
        table.insert(inst, product);
    }

    Factor::from_table(scope, table)
}


/// A scope must mention each `Variable` once
fn check_scope(scope: &[Variable]) -> Result<()> {
    if let Some(dup) = scope.iter().duplicates().next() {
        return Err(MarginalError::DuplicateVariable(dup.name().to_string()));
    }

    Ok(())
}


fn check_value(value: f64, idx: &[usize]) -> Result<()> {
    if value < 0.0 || value.is_nan() {
        return Err(MarginalError::NegativeValue(format!("{} at {:?}", value, idx)));
    }
    Ok(())
}


impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]:", self.scope.iter().join(", "))?;
        for (key, value) in self.table.iter() {
            let labels = key.iter()
                            .zip(self.scope.iter())
                            .map(|(&i, v)| v.label(i).unwrap_or("?"))
                            .join(", ");
            write!(f, "\n  ({}): {}", labels, value)?;
        }
        Ok(())
    }
}
