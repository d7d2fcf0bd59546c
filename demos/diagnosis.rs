//! Provides an example of exact inference on a small diagnostic Bayesian Network.
//!
//! A pathology P causes a lesion L. Three tests are run: S depends on the pathology, B and U on
//! the lesion. Given that every test came back negative, how likely is the pathology?

use marginal as m;
use m::ConditionalInferenceEngine;

fn main() -> m::Result<()> {
    let p = m::Variable::new("P", &["yes", "no"])?;
    let l = m::Variable::new("L", &["u", "d"])?;
    let s = m::Variable::new("S", &["-ve", "+ve"])?;
    let b = m::Variable::new("B", &["-ve", "+ve"])?;
    let u = m::Variable::new("U", &["-ve", "+ve"])?;

    ////////////////////////////////////////////////////////////////////////////
    // Step 1:  Build the network from its conditional probability tables
    let network = m::BayesianNetworkBuilder::new()
        .with_cpd(&p, &[], vec![(vec!["yes"], 0.87), (vec!["no"], 0.13)])
        .with_cpd(&l, &[p.clone()], vec![
            (vec!["yes", "u"], 0.1), (vec!["yes", "d"], 0.9),
            (vec!["no", "u"], 0.99), (vec!["no", "d"], 0.01)
        ])
        .with_cpd(&s, &[p.clone()], vec![
            (vec!["yes", "-ve"], 0.1), (vec!["yes", "+ve"], 0.9),
            (vec!["no", "-ve"], 0.99), (vec!["no", "+ve"], 0.01)
        ])
        .with_cpd(&b, &[l.clone()], vec![
            (vec!["u", "-ve"], 0.9), (vec!["u", "+ve"], 0.1),
            (vec!["d", "-ve"], 0.3), (vec!["d", "+ve"], 0.7)
        ])
        .with_cpd(&u, &[l.clone()], vec![
            (vec!["u", "-ve"], 0.9), (vec!["u", "+ve"], 0.1),
            (vec!["d", "-ve"], 0.2), (vec!["d", "+ve"], 0.8)
        ])
        .build()?;

    let evidence = m::Assignment::from_pairs(&[("S", "-ve"), ("B", "-ve"), ("U", "-ve")]);

    println!("moral graph:       {}", network.moral_graph());
    println!("elimination order: {:?}", m::elimination_order(&network.moral_graph(), m::EliminationStrategy::default()));

    ////////////////////////////////////////////////////////////////////////////
    // Step 2:  Answer single queries with variable elimination
    for &(name, label) in &[("P", "yes"), ("L", "u")] {
        let event = m::Assignment::from_pairs(&[(name, label)]);
        let prob = m::conditional_probability(&network, &event, &evidence)?;
        println!("P({} | {}) = {:.4}", event, evidence, prob);
    }

    let mut engine = m::VariableEliminationEngine::new(&network, &evidence);
    println!("\njoint posterior of P and L:\n{}", engine.infer(&["P", "L"])?);

    ////////////////////////////////////////////////////////////////////////////
    // Step 3:  Calibrate a junction tree and read off every marginal
    //
    // Note:    the tree is built once and can be calibrated for any evidence
    let tree = m::build_junction_tree(&network)?;
    println!("\njunction tree: {}", tree);

    let mut bp = m::BeliefPropagation::new(&tree);
    bp.run(&evidence)?;

    println!("\nposterior marginals given {}:", evidence);
    for (name, marginal) in bp.marginals()? {
        let var = network.variable(&name).ok_or_else(|| m::MarginalError::UnknownVariable(name.clone()))?;
        let probs: Vec<String> = var.domain()
            .iter()
            .map(|label| {
                let assignment = m::Assignment::new().with(&name, label);
                marginal.value(&assignment).map(|v| format!("{} = {:.4}", label, v))
            })
            .collect::<m::Result<_>>()?;
        println!("  {}: {}", name, probs.join(", "));
    }

    Ok(())
}
