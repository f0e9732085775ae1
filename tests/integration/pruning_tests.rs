//! Integration tests for relevance pruning through the public API.

use bayelim::{prune_for_query, Assignment, BayesNet, InferError, VarId};

/// Asia-style diagnosis network:
/// Smoking -> Cancer -> XRay, Smoking -> Bronchitis -> Dyspnea <- Cancer.
fn diagnosis_net() -> (BayesNet, [VarId; 5]) {
    let mut net = BayesNet::new();
    let s = net.add_variable("Smoking", &["yes", "no"]).unwrap();
    let c = net.add_variable("Cancer", &["yes", "no"]).unwrap();
    let b = net.add_variable("Bronchitis", &["yes", "no"]).unwrap();
    let x = net.add_variable("XRay", &["pos", "neg"]).unwrap();
    let d = net.add_variable("Dyspnea", &["yes", "no"]).unwrap();
    net.add_node(s, &[], &[0.3, 0.7]).unwrap();
    net.add_node(c, &[s], &[0.1, 0.9, 0.01, 0.99]).unwrap();
    net.add_node(b, &[s], &[0.6, 0.4, 0.3, 0.7]).unwrap();
    net.add_node(x, &[c], &[0.9, 0.1, 0.2, 0.8]).unwrap();
    net.add_node(d, &[c, b], &[0.9, 0.1, 0.7, 0.3, 0.8, 0.2, 0.1, 0.9])
        .unwrap();
    (net, [s, c, b, x, d])
}

#[test]
fn reduced_set_is_bracketed_by_query_and_network() {
    let (mut net, [s, c, _, x, _]) = diagnosis_net();
    let result = prune_for_query(&mut net, &[c], &[Assignment::new(x, 0)]).unwrap();
    let all = net.variables_in_topological_order();
    // subset of all network variables
    for v in &result.vars {
        assert!(all.contains(v));
    }
    // superset of query and evidence
    for v in [c, x] {
        assert!(result.vars.contains(&v));
    }
    // hidden never overlaps query or evidence
    assert!(!result.hidden.contains(&c));
    assert!(!result.hidden.contains(&x));
    assert!(result.hidden.contains(&s));
}

#[test]
fn query_side_branches_are_dropped() {
    // Query Cancer with XRay evidence: Bronchitis and Dyspnea hang off
    // the side and are not ancestors of anything relevant.
    let (mut net, [_, c, b, x, d]) = diagnosis_net();
    let result = prune_for_query(&mut net, &[c], &[Assignment::new(x, 0)]).unwrap();
    assert!(!result.vars.contains(&b));
    assert!(!result.vars.contains(&d));
}

#[test]
fn evidence_deep_in_the_graph_keeps_its_ancestry() {
    // Query XRay with Dyspnea evidence: every other variable is an
    // ancestor of query or evidence and must survive step 1.
    let (mut net, [s, c, b, x, d]) = diagnosis_net();
    let result = prune_for_query(&mut net, &[x], &[Assignment::new(d, 0)]).unwrap();
    for v in [s, c, b, x, d] {
        assert!(result.vars.contains(&v));
    }
    assert_eq!(result.hidden.len(), 3);
}

#[test]
fn hidden_set_and_vars_agree() {
    let (mut net, [_, c, _, x, _]) = diagnosis_net();
    let result = prune_for_query(&mut net, &[c], &[Assignment::new(x, 0)]).unwrap();
    for v in &result.hidden {
        assert!(result.vars.contains(v));
    }
}

#[test]
fn unknown_evidence_variable_is_an_invalid_query() {
    let (mut net, [_, c, _, _, _]) = diagnosis_net();
    let err = prune_for_query(&mut net, &[c], &[Assignment::new(VarId(99), 0)]).unwrap_err();
    assert!(matches!(err, InferError::InvalidQuery(_)));
}

#[test]
fn pruning_twice_converges_to_the_same_network() {
    // Replacement is idempotent: a second pass after an identical first
    // pass leaves every CPT unchanged.
    let mut net = BayesNet::new();
    let v = net.add_variable("V", &["t", "f"]).unwrap();
    let e = net.add_variable("E", &["t", "f"]).unwrap();
    let x = net.add_variable("X", &["t", "f"]).unwrap();
    net.add_node(v, &[], &[0.3, 0.7]).unwrap();
    net.add_node(e, &[v], &[0.8, 0.2, 0.1, 0.9]).unwrap();
    net.add_node(x, &[e], &[0.9, 0.1, 0.4, 0.6]).unwrap();

    prune_for_query(&mut net, &[x], &[Assignment::new(e, 0)]).unwrap();
    let first = net.node(e).unwrap().cpt().values().to_vec();
    prune_for_query(&mut net, &[x], &[Assignment::new(e, 0)]).unwrap();
    assert_eq!(net.node(e).unwrap().cpt().values(), first.as_slice());
}
