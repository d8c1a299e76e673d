//! Elimination order heuristics for variable elimination.
//!
//! The order in which variables are eliminated determines the size of the intermediate factors
//! (and therefore the cost of inference), never the result. Every policy here is deterministic:
//! the same factors and elimination set always give the same order.

use crate::factor::Factor;
use crate::variable::Variable;

use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};


/// How the elimination order of a query is chosen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EliminationOrdering {

    /// Greedy min-weight: repeatedly eliminate the variable whose elimination creates the
    /// smallest factor table. Ties go to the smaller scope, then to the lower name.
    Greedy,

    /// Reverse maximum cardinality search (Koller & Friedman Algorithm 9.3 applied to the
    /// interaction graph of the reduced factors).
    MaxCardinality,

    /// Eliminate in the listed order. Names that are not eliminated by a query (query or evidence
    /// variables) are skipped; variables the list omits are eliminated afterwards, greedily.
    Fixed(Vec<String>),
}

impl Default for EliminationOrdering {
    fn default() -> Self {
        EliminationOrdering::Greedy
    }
}

impl EliminationOrdering {

    /// Compute the order in which to eliminate `eliminate`, given the working set `factors`.
    pub fn order(&self, factors: &[Factor], eliminate: &[Variable]) -> Vec<Variable> {
        let mut scopes: Vec<BTreeSet<Variable>> = factors
            .iter()
            .map(|f| f.scope().iter().cloned().collect())
            .collect();
        let mut remaining: BTreeSet<Variable> = eliminate.iter().cloned().collect();

        match self {
            EliminationOrdering::Greedy => greedy_min_weight(&mut scopes, &mut remaining),
            EliminationOrdering::MaxCardinality => max_cardinality(&scopes, &remaining),
            EliminationOrdering::Fixed(names) => {
                let mut order = Vec::with_capacity(remaining.len());
                for name in names.iter() {
                    if let Some(var) = remaining.iter().find(|v| v.name() == name).cloned() {
                        remaining.remove(&var);
                        eliminate_scope(&mut scopes, &var);
                        order.push(var);
                    }
                }

                order.extend(greedy_min_weight(&mut scopes, &mut remaining));
                order
            }
        }
    }
}


/// The scope of the factor produced by eliminating `var`: every variable that shares a factor
/// with it.
fn induced_scope(scopes: &[BTreeSet<Variable>], var: &Variable) -> BTreeSet<Variable> {
    let mut induced: BTreeSet<Variable> = scopes
        .iter()
        .filter(|s| s.contains(var))
        .flat_map(|s| s.iter().cloned())
        .collect();
    induced.remove(var);
    induced
}

/// Replace every scope mentioning `var` with the induced scope of eliminating it
fn eliminate_scope(scopes: &mut Vec<BTreeSet<Variable>>, var: &Variable) {
    let induced = induced_scope(scopes, var);
    scopes.retain(|s| !s.contains(var));
    scopes.push(induced);
}

fn greedy_min_weight(
    scopes: &mut Vec<BTreeSet<Variable>>,
    remaining: &mut BTreeSet<Variable>
) -> Vec<Variable> {
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        // BTreeSet iterates by name, so min_by_key keeps the lowest name on ties
        let best = remaining
            .iter()
            .min_by_key(|v| {
                let induced = induced_scope(scopes, v);
                // a wide neighbourhood saturates rather than overflowing
                let weight = induced.iter().fold(1usize, |w, u| w.saturating_mul(u.cardinality()));
                (weight, induced.len())
            })
            .cloned();

        if let Some(var) = best {
            remaining.remove(&var);
            eliminate_scope(scopes, &var);
            order.push(var);
        }
    }

    order
}

fn max_cardinality(scopes: &[BTreeSet<Variable>], eliminate: &BTreeSet<Variable>) -> Vec<Variable> {
    // since we do not explictly hold the graph structure, we need to determine the neighbors of
    // each variable.
    let mut neighbors: BTreeMap<Variable, BTreeSet<Variable>> = BTreeMap::new();
    for scope in scopes.iter() {
        for v in scope.iter() {
            let entry = neighbors.entry(v.clone()).or_insert_with(BTreeSet::new);
            entry.extend(scope.iter().filter(|&u| u != v).cloned());
        }
    }
    for v in eliminate.iter() {
        neighbors.entry(v.clone()).or_insert_with(BTreeSet::new);
    }

    // set of marked variables
    let mut marked: BTreeSet<Variable> = BTreeSet::new();
    // the (reverse) elimination order
    let mut elimination = Vec::with_capacity(neighbors.len());

    for _ in 0..neighbors.len() {
        // the unmarked variable with the most marked neighbors; the lowest name wins ties
        let mut best: Option<(&Variable, usize)> = None;
        for (v, adjacent) in neighbors.iter() {
            if marked.contains(v) {
                continue;
            }

            let ct = adjacent.iter().filter(|&n| marked.contains(n)).count();
            if best.map_or(true, |(_, max)| ct > max) {
                best = Some((v, ct));
            }
        }

        if let Some((v, _)) = best {
            marked.insert(v.clone());
            elimination.push(v.clone());
        }
    }

    // we need to reverse the elimination order before returning
    elimination.reverse();
    elimination.retain(|v| eliminate.contains(v));
    elimination
}
