//! Defines the interface to inference engines

use crate::factor::Factor;
use crate::util::Result;
use crate::variable::{Assignment, Variable};

mod config;
mod elimination_order;
mod variable_elimination;

pub use self::config::InferenceConfig;
pub use self::elimination_order::EliminationOrdering;
pub use self::variable_elimination::VariableEliminationEngine;


/// A `ConditionalInferenceEngine` is capable of answering Conditional Probability Queries of the form:
///     ```P(Y | E = e)```
pub trait ConditionalInferenceEngine {

    /// Infer the joint distribution ```P(variables | evidence)```. The scope of the result is
    /// `variables`, in the given order.
    fn infer(&self, variables: &[Variable], evidence: &Assignment) -> Result<Factor>;

}


/// A `MapInferenceEngine` is cable of answering Maximum a posteriori queries:
///     ```MAP(Y | E = e) = argmax_y max_z P(Y = y, Z = z | E = e)```
/// where ```Z``` are the variables that are neither queried nor observed.
pub trait MapInferenceEngine {

    /// Infer the most probable assignment `Y = y` given the evidence
    fn map(&self, variables: &[Variable], evidence: &Assignment) -> Result<MapEstimate>;

}


/// The answer to a MAP query
#[derive(Clone, Debug, PartialEq)]
pub struct MapEstimate {

    /// The maximizing states of the queried variables
    pub assignment: Assignment,

    /// The maximizing states of every unobserved variable (queried and eliminated) that
    /// `assignment` was chosen with
    pub explanation: Assignment,

    /// The unnormalized weight ```P(explanation, evidence)```
    pub weight: f64

}


#[cfg(test)]
/// Tests for the inference engines in this module. Tests are hoisted here to avoid duplication.
/// Any tests specific to the inference engine are held within that submodule's tests module.
///
/// Example derived from Koller & Friedman's student example. Koller & Friedman do not offer an
/// example of the results of the exact inference on the student (or extended-student) example.
///
/// However, example 6d of [1] provides the results of exact (via variable elimination) and
/// approximate (via particle methods) inference of P(I | D=0, L=1, S=0) on a modified version
/// of the K&F Student example. We use that result here to test our implementation.
///
/// [1] https://www.uni-oldenburg.de/en/lcs/probabilistic-programming/webchurch-and-openbugs/
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::{DirectedModel, Model};
    use crate::variable::all_assignments;

    use ndarray::IxDyn;
    use proptest::collection::vec;
    use proptest::prelude::*;

    const ORDERINGS: usize = 4;

    fn orderings(model: &DirectedModel) -> Vec<EliminationOrdering> {
        let mut reversed: Vec<String> = model.variables().iter().map(|v| v.name().to_string()).collect();
        reversed.reverse();
        let forward: Vec<String> = reversed.iter().rev().cloned().collect();

        vec![
            EliminationOrdering::Greedy,
            EliminationOrdering::MaxCardinality,
            EliminationOrdering::Fixed(forward),
            EliminationOrdering::Fixed(reversed),
        ]
    }

    /// Utility to pull variables out of a model by name
    fn vars(model: &DirectedModel, names: &[&str]) -> Vec<Variable> {
        names.iter().map(|n| model.variable(n).unwrap().clone()).collect()
    }

    /// ```P(variables | evidence)``` by enumerating the full joint
    fn brute_force(model: &DirectedModel, variables: &[Variable], evidence: &Assignment) -> Factor {
        let all: Vec<Variable> = model.variables().into_iter().cloned().collect();
        let shape: Vec<usize> = variables.iter().map(|v| v.cardinality()).collect();
        let mut table = crate::factor::Table::zeros(shape);

        for assn in all_assignments(&all) {
            if evidence.iter().any(|(v, s)| assn.get(v) != Some(s)) {
                continue;
            }
            let idx: Vec<usize> = variables.iter().map(|v| *assn.get(v).unwrap()).collect();
            table[&idx[..]] += model.probability(&assn).unwrap();
        }

        Factor::new(variables.to_vec(), table).unwrap().normalize().unwrap()
    }

    /// The largest ```P(zeta, evidence)``` over full assignments ```zeta``` consistent with the
    /// evidence
    fn brute_force_mpe(model: &DirectedModel, evidence: &Assignment) -> f64 {
        let all: Vec<Variable> = model.variables().into_iter().cloned().collect();
        all_assignments(&all)
            .filter(|assn| evidence.iter().all(|(v, s)| assn.get(v) == Some(s)))
            .map(|assn| model.probability(&assn).unwrap())
            .fold(0.0, f64::max)
    }

    fn assert_close(left: &Factor, right: &Factor, precision: f64) {
        assert_eq!(left.scope(), right.scope());
        for (l, r) in left.table().iter().zip(right.table().iter()) {
            assert!((l - r).abs() < precision, "{} != {}", l, r);
        }
    }

    /// Utility method to test the actual inference task
    fn test_inference(i: &Variable, engine: &dyn ConditionalInferenceEngine, evidence: &Assignment, precision: f64) {
        let f = engine.infer(&[i.clone()], evidence).unwrap();
        assert_eq!(&[i.clone()], f.scope());

        let mut assn = Assignment::new();
        assn.set(i, 1);

        let expected = 0.02919708;
        assert!((f.value(&assn).unwrap() - expected).abs() < precision);
    }

    #[test]
    /// Test variable elimination
    fn variable_elimination() {
        let (model, evidence) = fixtures::student();
        let i = model.variable("I").unwrap().clone();

        for ordering in orderings(&model) {
            let engine = VariableEliminationEngine::with_config(&model, InferenceConfig::default().with_ordering(ordering));

            // the result should be the same on subsequent iterations
            for _ in 0..3 {
                test_inference(&i, &engine, &evidence, 0.00000001);
            }
        }
    }

    #[test]
    fn student_map_matches_enumeration() {
        let (model, evidence) = fixtures::student();
        let engine = VariableEliminationEngine::new(&model);

        let estimate = engine.map(&[], &evidence).unwrap();
        assert!((estimate.weight - brute_force_mpe(&model, &evidence)).abs() < 1e-12);

        // the explanation is a full assignment with exactly that weight
        let mut full = estimate.explanation.clone();
        for (v, &s) in evidence.iter() {
            full.set(v, s);
        }
        assert!((model.probability(&full).unwrap() - estimate.weight).abs() < 1e-12);
    }

    #[test]
    fn patient_marginals() {
        let model = fixtures::patient();
        let engine = VariableEliminationEngine::new(&model);
        let none = Assignment::new();

        for name in ["A", "B", "C", "D"].iter() {
            let v = vars(&model, &[name]);
            let f = engine.infer(&v, &none).unwrap();
            assert_close(&f, &brute_force(&model, &v, &none), 1e-12);
        }

        let v = vars(&model, &["B"]);
        let f = engine.infer(&v, &none).unwrap();
        assert!((f.table()[IxDyn(&[0])] - 0.69).abs() < 1e-12);
    }

    #[test]
    fn wide_network() {
        // a hub with 70 children: any order that eliminates the hub early is intractable
        let model = fixtures::star(70);
        let engine = VariableEliminationEngine::new(&model);
        let query = vars(&model, &["F00"]);

        // 0.3 * 0.9 + 0.7 * 0.2
        let f = engine.infer(&query, &Assignment::new()).unwrap();
        assert!((f.table()[IxDyn(&[0])] - 0.41).abs() < 1e-12);

        let mut evidence = Assignment::new();
        evidence.set(model.variable("F01").unwrap(), 1);
        let estimate = engine.map(&query, &evidence).unwrap();
        assert_eq!(estimate.explanation.len(), 70);
    }

    #[test]
    fn patient_posteriors() {
        let model = fixtures::patient();
        let engine = VariableEliminationEngine::new(&model);
        let d = model.variable("D").unwrap();

        let mut evidence = Assignment::new();
        evidence.set(d, 1);

        let v = vars(&model, &["A", "C"]);
        let f = engine.infer(&v, &evidence).unwrap();
        assert_close(&f, &brute_force(&model, &v, &evidence), 1e-12);
    }

    #[test]
    fn patient_map_with_eliminated_variables() {
        let model = fixtures::patient();
        let engine = VariableEliminationEngine::new(&model);
        let (a, c, d) = (model.variable("A").unwrap(), model.variable("C").unwrap(), model.variable("D").unwrap());

        let mut evidence = Assignment::new();
        evidence.set(d, 1);

        // max over B and C of P(A, B, C, D=negative): good 0.1008, fair 0.072, poor 0.0504
        let estimate = engine.map(&[a.clone()], &evidence).unwrap();
        assert_eq!(estimate.assignment.label(a), Some("good"));
        assert!((estimate.weight - 0.1008).abs() < 1e-12);
        assert_eq!(estimate.assignment.len(), 1);
        assert_eq!(estimate.explanation.len(), 3);
        assert_eq!(estimate.explanation.label(c), Some("treated"));
    }

    #[test]
    fn order_independence_of_map() {
        let model = fixtures::patient();
        let d = model.variable("D").unwrap();
        let mut evidence = Assignment::new();
        evidence.set(d, 1);

        let estimates: Vec<MapEstimate> = orderings(&model)
            .into_iter()
            .map(|o| {
                VariableEliminationEngine::with_config(&model, InferenceConfig::default().with_ordering(o))
                    .map(&vars(&model, &["A", "B"]), &evidence)
                    .unwrap()
            })
            .collect();

        assert_eq!(estimates.len(), ORDERINGS);
        for e in estimates.iter() {
            assert_eq!(e.assignment, estimates[0].assignment);
            assert!((e.weight - estimates[0].weight).abs() < 1e-12);
        }
    }

    fn patient_weights() -> impl Strategy<Value = Vec<Vec<f64>>> {
        (vec(0.01f64..1.0, 3), vec(0.01f64..1.0, 6), vec(0.01f64..1.0, 12), vec(0.01f64..1.0, 4))
            .prop_map(|(a, b, c, d)| vec![a, b, c, d])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn marginals_sum_to_one(weights in patient_weights()) {
            let model = fixtures::patient_with(&weights);
            let engine = VariableEliminationEngine::new(&model);

            for names in [vec!["A"], vec!["B"], vec!["C", "D"], vec!["D", "A", "B"]].iter() {
                let f = engine.infer(&vars(&model, names), &Assignment::new()).unwrap();
                prop_assert!((f.total() - 1.0).abs() < 1e-9);
            }
        }

        #[test]
        fn results_do_not_depend_on_order(weights in patient_weights(), observed in 0usize..2) {
            let model = fixtures::patient_with(&weights);
            let mut evidence = Assignment::new();
            evidence.set(model.variable("D").unwrap(), observed);

            let query = vars(&model, &["B", "A"]);
            let results: Vec<Factor> = orderings(&model)
                .into_iter()
                .map(|o| {
                    VariableEliminationEngine::with_config(&model, InferenceConfig::default().with_ordering(o))
                        .infer(&query, &evidence)
                        .unwrap()
                })
                .collect();

            for f in results.iter() {
                assert_close(f, &results[0], 1e-9);
            }
            assert_close(&results[0], &brute_force(&model, &query, &evidence), 1e-9);
        }

        #[test]
        fn full_joint_marginalizes_to_subset(weights in patient_weights()) {
            let model = fixtures::patient_with(&weights);
            let engine = VariableEliminationEngine::new(&model);
            let none = Assignment::new();

            let all = vars(&model, &["A", "B", "C", "D"]);
            let joint = engine.infer(&all, &none).unwrap();

            let summed = joint.sum_out(&all[1]).unwrap().sum_out(&all[3]).unwrap();
            let direct = engine.infer(&vars(&model, &["A", "C"]), &none).unwrap();
            assert_close(&summed, &direct, 1e-9);
        }

        #[test]
        fn map_matches_enumeration(weights in patient_weights(), observed in 0usize..2) {
            let model = fixtures::patient_with(&weights);
            let engine = VariableEliminationEngine::new(&model);
            let mut evidence = Assignment::new();
            evidence.set(model.variable("B").unwrap(), observed);

            let estimate = engine.map(&vars(&model, &["D"]), &evidence).unwrap();
            prop_assert!((estimate.weight - brute_force_mpe(&model, &evidence)).abs() < 1e-12);
        }

        #[test]
        fn map_agrees_with_marginal_argmax(weights in patient_weights(), observed in 0usize..2) {
            let model = fixtures::patient_with(&weights);
            let engine = VariableEliminationEngine::new(&model);
            let (c, d) = (model.variable("C").unwrap(), model.variable("D").unwrap());

            // D depends on the rest of the network only through C
            let mut evidence = Assignment::new();
            evidence.set(c, observed);

            let estimate = engine.map(&[d.clone()], &evidence).unwrap();
            let (best, _) = engine.infer(&[d.clone()], &evidence).unwrap().argmax();
            prop_assert_eq!(estimate.assignment.get(d), best.get(d));
        }
    }
}
