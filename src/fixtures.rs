//! Networks shared by the test modules of the crate

use crate::cpd::Cpd;
use crate::factor::Table;
use crate::model::{DirectedModel, DirectedModelBuilder};
use crate::variable::{Assignment, Variable};

use ndarray::{array, Axis, IxDyn};


pub fn condition() -> Variable {
    Variable::new("A", &["good", "fair", "poor"]).unwrap()
}

pub fn test_result() -> Variable {
    Variable::new("B", &["positive", "negative"]).unwrap()
}

pub fn treatment() -> Variable {
    Variable::new("C", &["treated", "not treated"]).unwrap()
}

pub fn outcome() -> Variable {
    Variable::new("D", &["positive", "negative"]).unwrap()
}

/// The patient network: condition A, test result B, treatment decision C and outcome D, with
/// edges ```A -> B, A -> C, B -> C, C -> D```.
pub fn patient() -> DirectedModel {
    let (a, b, c, d) = (condition(), test_result(), treatment(), outcome());

    DirectedModelBuilder::new()
        .with_node(Cpd::tabular(a.clone(), vec![], &[vec![0.7], vec![0.2], vec![0.1]]).unwrap())
        .with_node(Cpd::tabular(b.clone(), vec![a.clone()], &[
            vec![0.8, 0.5, 0.3],
            vec![0.2, 0.5, 0.7],
        ]).unwrap())
        .with_node(Cpd::tabular(c.clone(), vec![b, a], &[
            vec![0.9, 0.7, 0.5, 0.3, 0.1, 0.1],
            vec![0.1, 0.3, 0.5, 0.7, 0.9, 0.9],
        ]).unwrap())
        .with_node(Cpd::tabular(d, vec![c], &[vec![0.8, 0.2], vec![0.2, 0.8]]).unwrap())
        .build()
        .unwrap()
}

/// The patient network with arbitrary parameters. `weights` holds one positive table per
/// variable (A, B, C, D) in ```[parents..., child]``` layout with C's parents ordered
/// ```[B, A]```; each table is normalized over the child axis.
pub fn patient_with(weights: &[Vec<f64>]) -> DirectedModel {
    let (a, b, c, d) = (condition(), test_result(), treatment(), outcome());

    let cpd = |var: &Variable, parents: Vec<Variable>, w: &[f64]| {
        let mut shape: Vec<usize> = parents.iter().map(|p| p.cardinality()).collect();
        shape.push(var.cardinality());

        let last = Axis(shape.len() - 1);
        let table = Table::from_shape_vec(IxDyn(&shape), w.to_vec()).unwrap();
        let z = table.sum_axis(last).insert_axis(last);
        Cpd::new(var.clone(), parents, &table / &z).unwrap()
    };

    DirectedModelBuilder::new()
        .with_node(cpd(&a, vec![], &weights[0]))
        .with_node(cpd(&b, vec![a.clone()], &weights[1]))
        .with_node(cpd(&c, vec![b.clone(), a.clone()], &weights[2]))
        .with_node(cpd(&d, vec![c.clone()], &weights[3]))
        .build()
        .unwrap()
}

/// Koller & Friedman's student network, with the evidence ```D=0, L=1, S=0```
pub fn student() -> (DirectedModel, Assignment) {
    let d = Variable::binary("D");
    let i = Variable::binary("I");
    let g = Variable::binary("G");
    let s = Variable::binary("S");
    let l = Variable::binary("L");

    let cpd_g = Cpd::new(
        g.clone(),
        vec![i.clone(), d.clone()],
        array![[[0.3, 0.7], [0.05, 0.95]],
               [[0.9, 0.1], [0.5, 0.5]]].into_dyn()
    ).unwrap();

    let cpd_s = Cpd::new(s.clone(), vec![i.clone()], array![[0.95, 0.05], [0.2, 0.8]].into_dyn()).unwrap();
    let cpd_l = Cpd::new(l.clone(), vec![g.clone()], array![[0.9, 0.1], [0.4, 0.6]].into_dyn()).unwrap();

    let model = DirectedModelBuilder::new()
                    .with_node(Cpd::multinomial(d.clone(), &[0.6, 0.4]).unwrap())
                    .with_node(Cpd::multinomial(i, &[0.7, 0.3]).unwrap())
                    .with_node(cpd_g)
                    .with_node(cpd_s)
                    .with_node(cpd_l)
                    .build()
                    .unwrap();

    let mut evidence = Assignment::new();
    evidence.set(&d, 0);
    evidence.set(&l, 1);
    evidence.set(&s, 0);

    (model, evidence)
}

/// ```X -> Y``` where X is always 0 and Y copies X
pub fn deterministic() -> DirectedModel {
    let x = Variable::binary("X");
    let y = Variable::binary("Y");

    DirectedModelBuilder::new()
        .with_node(Cpd::multinomial(x.clone(), &[1.0, 0.0]).unwrap())
        .with_node(Cpd::new(y, vec![x], array![[1.0, 0.0], [0.0, 1.0]].into_dyn()).unwrap())
        .build()
        .unwrap()
}

/// A hub ```H``` with `children` binary children ```F00, F01, ...```, each a noisy copy of ```H```
pub fn star(children: usize) -> DirectedModel {
    let h = Variable::binary("H");

    let mut builder = DirectedModelBuilder::new()
                          .with_node(Cpd::multinomial(h.clone(), &[0.3, 0.7]).unwrap());
    for i in 0..children {
        let f = Variable::binary(&format!("F{:02}", i));
        let cpd = Cpd::new(f, vec![h.clone()], array![[0.9, 0.1], [0.2, 0.8]].into_dyn()).unwrap();
        builder = builder.with_node(cpd);
    }

    builder.build().unwrap()
}
