//! End-to-end inference tests against hand-computed posteriors.

use bayelim::{Assignment, BayesNet, Factor, Heuristic, VariableElimination, VarId};

fn approx(x: f64, y: f64, tol: f64) -> bool {
    (x - y).abs() < tol
}

/// The burglary/earthquake alarm network (all boolean).
fn alarm_net() -> (BayesNet, [VarId; 5]) {
    let mut net = BayesNet::new();
    let b = net.add_variable("Burglary", &["true", "false"]).unwrap();
    let e = net.add_variable("Earthquake", &["true", "false"]).unwrap();
    let a = net.add_variable("Alarm", &["true", "false"]).unwrap();
    let j = net.add_variable("JohnCalls", &["true", "false"]).unwrap();
    let m = net.add_variable("MaryCalls", &["true", "false"]).unwrap();
    net.add_node(b, &[], &[0.001, 0.999]).unwrap();
    net.add_node(e, &[], &[0.002, 0.998]).unwrap();
    net.add_node(
        a,
        &[b, e],
        &[0.95, 0.05, 0.94, 0.06, 0.29, 0.71, 0.001, 0.999],
    )
    .unwrap();
    net.add_node(j, &[a], &[0.90, 0.10, 0.05, 0.95]).unwrap();
    net.add_node(m, &[a], &[0.70, 0.30, 0.01, 0.99]).unwrap();
    (net, [b, e, a, j, m])
}

/// Brute-force reference: product of every CPT, evidence restricted,
/// everything but the query summed out.
fn joint_posterior(
    net: &BayesNet,
    query: &[VarId],
    evidence: &[Assignment],
) -> Vec<f64> {
    let mut joint = Factor::identity();
    for &v in net.variables_in_topological_order() {
        joint = joint.product(net.node(v).unwrap().cpt());
    }
    for a in evidence {
        joint = joint.restrict(a.var, a.value).unwrap();
    }
    let extra: Vec<VarId> = joint
        .vars()
        .iter()
        .copied()
        .filter(|v| !query.contains(v))
        .collect();
    for v in extra {
        joint = joint.sum_out(v).unwrap();
    }
    joint
        .align_to(query)
        .unwrap()
        .normalize()
        .unwrap()
        .values()
        .to_vec()
}

#[test]
fn burglary_given_both_calls_matches_the_textbook_value() {
    let (mut net, [b, _, _, j, m]) = alarm_net();
    let dist = VariableElimination::default()
        .ask(
            &mut net,
            &[b],
            &[Assignment::new(j, 0), Assignment::new(m, 0)],
        )
        .unwrap();
    assert!(approx(dist.prob(&[0]).unwrap(), 0.284_171_835_4, 1e-6));
    assert!(approx(dist.prob(&[1]).unwrap(), 0.715_828_164_6, 1e-6));
}

#[test]
fn alarm_posterior_agrees_with_brute_force_under_every_heuristic() {
    let (net, [b, e, _, j, m]) = alarm_net();
    let evidence = [Assignment::new(j, 0), Assignment::new(m, 1)];
    let expected = joint_posterior(&net, &[b, e], &evidence);
    for h in [
        Heuristic::ReverseTopological,
        Heuristic::MinDegree,
        Heuristic::MinFill,
        Heuristic::MinWeight,
    ] {
        let mut fresh = net.clone();
        let dist = VariableElimination::new(h)
            .ask(&mut fresh, &[b, e], &evidence)
            .unwrap();
        for (got, want) in dist.values().iter().zip(&expected) {
            assert!(approx(*got, *want, 1e-9), "heuristic {h:?}");
        }
    }
}

#[test]
fn pruning_does_not_change_the_posterior() {
    // Hang two extra descendants off the alarm network; they are pruned
    // as non-ancestors, and the answer must not move.
    let (net, [b, _, a, j, m]) = alarm_net();
    let mut extended = net.clone();
    let s = extended
        .add_variable("Siren", &["true", "false"])
        .unwrap();
    let n = extended
        .add_variable("NeighborWakes", &["true", "false"])
        .unwrap();
    extended.add_node(s, &[a], &[0.8, 0.2, 0.1, 0.9]).unwrap();
    extended.add_node(n, &[s], &[0.6, 0.4, 0.2, 0.8]).unwrap();

    let evidence = [Assignment::new(j, 0), Assignment::new(m, 0)];
    let mut base = net.clone();
    let lean = VariableElimination::default()
        .ask(&mut base, &[b], &evidence)
        .unwrap();
    let full = VariableElimination::default()
        .ask(&mut extended, &[b], &evidence)
        .unwrap();
    for (x, y) in lean.values().iter().zip(full.values()) {
        assert!(approx(*x, *y, 1e-12));
    }
}

#[test]
fn query_without_evidence_is_the_prior_marginal() {
    let (mut net, [_, _, _, j, _]) = alarm_net();
    let expected = joint_posterior(&net.clone(), &[j], &[]);
    let dist = VariableElimination::default().ask(&mut net, &[j], &[]).unwrap();
    for (got, want) in dist.values().iter().zip(&expected) {
        assert!(approx(*got, *want, 1e-12));
    }
    let total: f64 = dist.values().iter().sum();
    assert!(approx(total, 1.0, 1e-12));
}

#[test]
fn evidence_on_an_isolated_variable_is_harmless() {
    let mut net = BayesNet::new();
    let a = net.add_variable("A", &["t", "f"]).unwrap();
    let z = net.add_variable("Z", &["t", "f"]).unwrap();
    net.add_node(a, &[], &[0.3, 0.7]).unwrap();
    net.add_node(z, &[], &[0.9, 0.1]).unwrap();

    let dist = VariableElimination::default()
        .ask(&mut net, &[a], &[Assignment::new(z, 0)])
        .unwrap();
    assert!(approx(dist.prob(&[0]).unwrap(), 0.3, 1e-12));
}

#[test]
fn invalid_queries_fail_before_touching_the_network() {
    let (mut net, [b, _, _, j, _]) = alarm_net();
    let snapshot = net.clone();

    assert!(VariableElimination::default().ask(&mut net, &[], &[]).is_err());
    assert!(VariableElimination::default()
        .ask(&mut net, &[VarId(42)], &[])
        .is_err());
    assert!(VariableElimination::default()
        .ask(&mut net, &[b], &[Assignment::new(j, 7)])
        .is_err());

    for &v in snapshot.variables_in_topological_order() {
        assert_eq!(
            net.node(v).unwrap().cpt().values(),
            snapshot.node(v).unwrap().cpt().values()
        );
    }
}

#[test]
fn ternary_domains_are_supported_end_to_end() {
    let mut net = BayesNet::new();
    let w = net
        .add_variable("Weather", &["sunny", "cloudy", "rainy"])
        .unwrap();
    let u = net.add_variable("Umbrella", &["yes", "no"]).unwrap();
    net.add_node(w, &[], &[0.5, 0.3, 0.2]).unwrap();
    net.add_node(u, &[w], &[0.05, 0.95, 0.3, 0.7, 0.9, 0.1])
        .unwrap();

    let dist = VariableElimination::default()
        .ask(&mut net, &[w], &[Assignment::new(u, 0)])
        .unwrap();
    // P(w, umbrella) = [0.025, 0.09, 0.18], total 0.295
    assert!(approx(dist.prob(&[0]).unwrap(), 0.025 / 0.295, 1e-12));
    assert!(approx(dist.prob(&[1]).unwrap(), 0.09 / 0.295, 1e-12));
    assert!(approx(dist.prob(&[2]).unwrap(), 0.18 / 0.295, 1e-12));
}
