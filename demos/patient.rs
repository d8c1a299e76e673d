//! Builds the patient network (condition, test result, treatment decision, outcome) and runs a
//! handful of queries against it.
//!
//! Run with `RUST_LOG=bayes_elim=debug` to see the elimination orders.

use bayes_elim as b;
use tracing_subscriber::EnvFilter;

fn main() -> b::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    /////////////////////////////////////////////////////
    // Step 1: Build Model
    let model = build_model()?;
    let solver = b::VariableElimination::new(&model);

    /////////////////////////////////////////////////////
    // Step 2: Run some conditional queries
    report("P(A)", &solver.query(&["A"], &b::Evidence::new())?);
    report("P(B | A = poor)", &solver.query(&["B"], &b::Evidence::new().observe("A", "poor"))?);

    let evidence = b::Evidence::new().observe("A", "fair").observe("B", "negative");
    report("P(C | A = fair, B = negative)", &solver.query(&["C"], &evidence)?);

    let evidence = b::Evidence::new().observe("D", "negative");
    report("P(A | D = negative)", &solver.query(&["A"], &evidence)?);

    /////////////////////////////////////////////////////
    // Step 3: Feed the most likely condition back as evidence
    let condition = solver.query(&["A"], &b::Evidence::new())?.argmax();
    let evidence: b::Evidence = condition.into_iter().collect();
    report("P(C, D | A = argmax P(A))", &solver.query(&["C", "D"], &evidence)?);

    /////////////////////////////////////////////////////
    // Step 4: MAP queries
    let map = solver.map_query(&["D"], &b::Evidence::new().observe("C", "not treated"))?;
    println!(
        "MAP(D | C = not treated) = {:?} (posterior = {:.4}, max-product p = {:.4})",
        map.states, map.posterior, map.probability
    );

    let mpe = solver.most_probable_explanation(&b::Evidence::new())?;
    println!("MPE = {:?} (p = {:.4})", mpe.states, mpe.probability);

    Ok(())
}

fn report(title: &str, dist: &b::Distribution) {
    println!("{}", title);
    for (states, p) in dist.iter() {
        println!("    {:<30} {:.4}", states.join(", "), p);
    }
}

fn build_model() -> b::Result<b::DirectedModel> {
    let a = b::Variable::new("A", &["good", "fair", "poor"])?;
    let t = b::Variable::new("B", &["positive", "negative"])?;
    let c = b::Variable::new("C", &["treated", "not treated"])?;
    let d = b::Variable::new("D", &["positive", "negative"])?;

    ///////////////////////////////////////////////////
    // Build CPTs: one row per child state, one column per parent assignment
    let cpt_a = b::Cpd::tabular(a.clone(), vec![], &[vec![0.7], vec![0.2], vec![0.1]])?;
    let cpt_b = b::Cpd::tabular(t.clone(), vec![a.clone()], &[
        vec![0.8, 0.5, 0.3],
        vec![0.2, 0.5, 0.7]
    ])?;
    let cpt_c = b::Cpd::tabular(c.clone(), vec![t, a], &[
        vec![0.9, 0.7, 0.5, 0.3, 0.1, 0.1],
        vec![0.1, 0.3, 0.5, 0.7, 0.9, 0.9]
    ])?;
    let cpt_d = b::Cpd::tabular(d, vec![c], &[vec![0.8, 0.2], vec![0.2, 0.8]])?;

    ///////////////////////////////////////////////////
    // Build the Model
    b::DirectedModelBuilder::new()
        .with_node(cpt_a)
        .with_node(cpt_b)
        .with_node(cpt_c)
        .with_node(cpt_d)
        .build()
}
