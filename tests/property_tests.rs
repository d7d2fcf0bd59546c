//! Property-based tests for the factor algebra and the exact inference engines.

use approx::assert_abs_diff_eq;
use marginal::{
    all_assignments, build_junction_tree, conditional_probability, multiply, Assignment,
    BayesianNetwork, BayesianNetworkBuilder, BeliefPropagation, ConditionalInferenceEngine,
    Factor, Variable, VariableEliminationEngine,
};
use ndarray::Array;
use proptest::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn binary(name: &str) -> Variable {
    Variable::new(name, &["0", "1"]).unwrap()
}

fn pairwise(a: &Variable, b: &Variable, values: Vec<f64>) -> Factor {
    let array = Array::from_shape_vec(vec![2, 2], values).unwrap().into_dyn();
    Factor::from_array(vec![a.clone(), b.clone()], array).unwrap()
}

/// Label every index of an instantiation of `scope`
fn labelled(scope: &[Variable], inst: &[usize]) -> Assignment {
    scope.iter()
         .zip(inst.iter())
         .map(|(v, &i)| (v.name(), v.label(i).unwrap()))
         .collect()
}

/// A chain X_0 -> X_1 -> ... of binary variables.
///
/// `root` is P(X_0 = 1); `links[i]` holds P(X_{i+1} = 1 | X_i = 0) and P(X_{i+1} = 1 | X_i = 1).
fn chain(root: f64, links: &[(f64, f64)]) -> BayesianNetwork {
    let vars: Vec<Variable> = (0..=links.len()).map(|i| binary(&format!("X_{}", i))).collect();

    let mut builder = BayesianNetworkBuilder::new()
        .with_cpd(&vars[0], &[], vec![(vec!["0"], 1.0 - root), (vec!["1"], root)]);

    for (i, &(p0, p1)) in links.iter().enumerate() {
        builder = builder.with_cpd(&vars[i + 1], &[vars[i].clone()], vec![
            (vec!["0", "0"], 1.0 - p0), (vec!["0", "1"], p0),
            (vec!["1", "0"], 1.0 - p1), (vec!["1", "1"], p1)
        ]);
    }

    builder.build().unwrap()
}

/// Keep only the rows of `f` where `var` takes label `label`, if one is given
fn restricted(f: Factor, var: &Variable, label: Option<usize>) -> Factor {
    match label {
        Some(i) => f.restrict(&Assignment::new().with(var.name(), var.label(i).unwrap())),
        None => f
    }
}

fn chain_strategy() -> impl Strategy<Value = (f64, Vec<(f64, f64)>)> {
    (
        0.05f64..0.95,
        prop::collection::vec((0.05f64..0.95, 0.05f64..0.95), 1..5)
    )
}

// ============================================================================
// Factor Operation Properties
// ============================================================================

proptest! {
    /// Property: the product is commutative, up to the order of the scope
    #[test]
    fn product_commutative(
        v1 in prop::collection::vec(0.0f64..10.0, 4),
        v2 in prop::collection::vec(0.0f64..10.0, 4)
    ) {
        let (a, b, c) = (binary("A"), binary("B"), binary("C"));
        let f = pairwise(&a, &b, v1);
        let g = pairwise(&b, &c, v2);

        let fg = f.product(&g);
        let gf = g.product(&f);

        prop_assert_eq!(fg.len(), 8);
        prop_assert_eq!(gf.len(), 8);
        for inst in all_assignments(fg.scope()) {
            let assignment = labelled(fg.scope(), &inst);
            assert_abs_diff_eq!(
                fg.value(&assignment).unwrap(),
                gf.value(&assignment).unwrap(),
                epsilon = 1e-12
            );
        }
    }

    /// Property: the product is associative, also over tables with rows filtered out
    #[test]
    fn product_associative(
        v1 in prop::collection::vec(0.0f64..10.0, 4),
        v2 in prop::collection::vec(0.0f64..10.0, 4),
        v3 in prop::collection::vec(0.0f64..10.0, 4),
        on_x in prop::option::of(0usize..2),
        on_z in prop::option::of(0usize..2),
        on_w in prop::option::of(0usize..2)
    ) {
        let (x, y, z, w) = (binary("X"), binary("Y"), binary("Z"), binary("W"));
        let f = restricted(pairwise(&x, &y, v1), &x, on_x);
        let g = restricted(pairwise(&y, &z, v2), &z, on_z);
        let h = restricted(pairwise(&z, &w, v3), &w, on_w);

        let left = multiply(vec![&f, &g]).product(&h);
        let right = f.product(&multiply(vec![&g, &h]));

        let names = |factor: &Factor| {
            let mut names: Vec<String> = factor.scope().iter().map(|v| v.name().to_string()).collect();
            names.sort();
            names
        };
        prop_assert_eq!(names(&left), names(&right));
        prop_assert_eq!(left.len(), right.len());

        for inst in all_assignments(left.scope()) {
            let assignment = labelled(left.scope(), &inst);
            match (left.value(&assignment), right.value(&assignment)) {
                (Ok(l), Ok(r)) => assert_abs_diff_eq!(l, r, epsilon = 1e-9),
                (Err(_), Err(_)) => (),
                (l, r) => prop_assert!(false, "{} is {:?} on the left and {:?} on the right", assignment, l, r)
            }
        }
    }

    /// Property: summing out a variable preserves the total mass
    #[test]
    fn marginalize_conserves_mass(values in prop::collection::vec(0.0f64..10.0, 4)) {
        let (a, b) = (binary("A"), binary("B"));
        let f = pairwise(&a, &b, values);

        let summed = f.marginalize_out(&a).unwrap();
        prop_assert_eq!(summed.scope(), &[b]);
        assert_abs_diff_eq!(summed.total(), f.total(), epsilon = 1e-9);
    }

    /// Property: restricting then summing out the evidence variable never adds mass
    #[test]
    fn restrict_reduces_mass(values in prop::collection::vec(0.0f64..10.0, 4), label in 0usize..2) {
        let (a, b) = (binary("A"), binary("B"));
        let f = pairwise(&a, &b, values);

        let evidence = Assignment::new().with("A", a.label(label).unwrap());
        let reduced = f.restrict(&evidence);

        prop_assert_eq!(reduced.len(), 2);
        prop_assert!(reduced.total() <= f.total() + 1e-12);
    }

    /// Property: a normalized factor sums to one
    #[test]
    fn normalize_sums_to_one(values in prop::collection::vec(0.01f64..10.0, 4)) {
        let f = pairwise(&binary("A"), &binary("B"), values);
        assert_abs_diff_eq!(f.normalize().unwrap().total(), 1.0, epsilon = 1e-12);
    }

    /// Property: the product of a single normalized factor is itself
    #[test]
    fn single_product_is_identity(values in prop::collection::vec(0.01f64..10.0, 4)) {
        let f = pairwise(&binary("A"), &binary("B"), values).normalize().unwrap();
        let again = multiply(vec![&f]).normalize().unwrap();

        for (key, value) in f.table().iter() {
            assert_abs_diff_eq!(*value, again.table()[key], epsilon = 1e-12);
        }
    }
}

// ============================================================================
// Inference Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: belief propagation agrees with variable elimination on every marginal
    #[test]
    fn belief_propagation_matches_variable_elimination(
        (root, links) in chain_strategy(),
        observed in any::<prop::sample::Index>(),
        label in 0usize..2
    ) {
        let net = chain(root, &links);
        let names: Vec<String> = net.variable_names().iter().map(|s| s.to_string()).collect();
        let name = observed.get(&names);
        let evidence = Assignment::new().with(name, &label.to_string());

        let tree = build_junction_tree(&net).unwrap();
        prop_assert!(tree.satisfies_running_intersection());

        let mut bp = BeliefPropagation::new(&tree);
        bp.run(&evidence).unwrap();
        let marginals = bp.marginals().unwrap();

        for var in net.variables() {
            let marginal = &marginals[var.name()];
            assert_abs_diff_eq!(marginal.total(), 1.0, epsilon = 1e-9);

            for l in var.domain() {
                let event = Assignment::new().with(var.name(), l);
                let expected = conditional_probability(&net, &event, &evidence).unwrap();
                let actual = marginal.value(&event).unwrap();
                assert_abs_diff_eq!(actual, expected, epsilon = 1e-9);
            }
        }
    }

    /// Property: the elimination engine returns a distribution over the query
    #[test]
    fn engine_returns_distribution((root, links) in chain_strategy()) {
        let net = chain(root, &links);
        let last = format!("X_{}", links.len());
        let evidence = Assignment::new().with("X_0", "1");

        let mut engine = VariableEliminationEngine::new(&net, &evidence);
        let f = engine.infer(&[last.as_str()]).unwrap();

        prop_assert_eq!(f.scope().len(), 1);
        assert_abs_diff_eq!(f.total(), 1.0, epsilon = 1e-12);
    }
}
