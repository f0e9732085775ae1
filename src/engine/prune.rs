//! Query-relevance pruning for variable elimination.
//!
//! Given query variables, observed evidence, and a network, the pruner
//! computes the smallest variable set the elimination driver must consider:
//!
//! 1. **Ancestor pruning** — a hidden variable that is not an ancestor of
//!    the query or the evidence cannot influence the answer and is dropped.
//! 2. **m-separation pruning** — for a query variable `x` and an evidence
//!    variable `e` with `e` an ancestor of `x`, every remaining hidden
//!    ancestor of `e` is screened off by the observation and is dropped.
//!    When this fires for a pair, the evidence node is replaced in the
//!    network by a degenerate node whose CPT is a point mass at the
//!    observed value, so the driver can treat it as a constant factor.
//!
//! Validation is completed before any node replacement, so an invalid
//! query never mutates the network. The replacement step itself is not
//! transactional: it is instead idempotent and order-independent, so a
//! retried pruning pass converges to the same network state.

use rustc_hash::FxHashSet;

use crate::engine::errors::InferError;
use crate::engine::factor::Factor;
use crate::engine::network::{Assignment, BayesNet, Node, VarId};

/// The outcome of relevance pruning for one query.
#[derive(Debug, Clone)]
pub struct PruneResult {
    /// The hidden variables that must still be summed out.
    pub hidden: FxHashSet<VarId>,
    /// The full reduced variable set (query, evidence, and surviving
    /// hidden variables), in topological order.
    pub vars: Vec<VarId>,
}

/// Computes the ancestor closure of `seeds`, inclusive of the seeds.
///
/// Iterative worklist over the parent relation with a visited set, so
/// diamond-shaped ancestries cost linear work and deep networks cannot
/// overflow the stack. The network is a DAG, so no cycle guard is needed
/// beyond the dedup.
pub fn ancestors_of(
    net: &BayesNet,
    seeds: impl IntoIterator<Item = VarId>,
) -> Result<FxHashSet<VarId>, InferError> {
    let mut seen: FxHashSet<VarId> = FxHashSet::default();
    let mut work: Vec<VarId> = seeds.into_iter().collect();
    while let Some(v) = work.pop() {
        if !seen.insert(v) {
            continue;
        }
        work.extend(net.node(v)?.parents().iter().copied());
    }
    Ok(seen)
}

/// Prunes the network's variable set down to what the query needs.
///
/// Mutates the network through node replacement only (never topology) and
/// returns the reduced hidden set plus the full reduced variable set in
/// topological order.
///
/// # Errors
///
/// * [`InferError::InvalidQuery`] — empty query, a query or evidence
///   variable absent from the network, duplicate query or evidence
///   variables, an evidence value outside its domain, or a variable used
///   as both query and evidence. Raised before any mutation.
pub fn prune_for_query(
    net: &mut BayesNet,
    query: &[VarId],
    evidence: &[Assignment],
) -> Result<PruneResult, InferError> {
    validate(net, query, evidence)?;

    let mut main: FxHashSet<VarId> = query.iter().copied().collect();
    main.extend(evidence.iter().map(|a| a.var));

    let mut hidden: FxHashSet<VarId> = net
        .variables_in_topological_order()
        .iter()
        .copied()
        .filter(|v| !main.contains(v))
        .collect();

    // Step 1: drop hidden variables that are not ancestors of query or
    // evidence.
    let relevant = ancestors_of(net, main.iter().copied())?;
    hidden.retain(|v| relevant.contains(v));

    // Step 2: m-separation. Hidden ancestors of an evidence variable that
    // itself feeds a query variable are screened off by the observation.
    for &x in query {
        let above_x = ancestors_of(net, [x])?;
        for a in evidence {
            if !above_x.contains(&a.var) {
                continue;
            }
            let above_e = ancestors_of(net, [a.var])?;
            let before = hidden.len();
            hidden.retain(|v| !above_e.contains(v));
            if hidden.len() < before {
                net.replace_node(point_mass_node(net, a.var, a.value)?)?;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        total = net.variables_in_topological_order().len(),
        kept = main.len() + hidden.len(),
        hidden = hidden.len(),
        "relevance pruning complete"
    );

    // Step 3: everything outside query, evidence, and the surviving hidden
    // set is excluded from this query entirely.
    let vars: Vec<VarId> = net
        .variables_in_topological_order()
        .iter()
        .copied()
        .filter(|v| main.contains(v) || hidden.contains(v))
        .collect();

    Ok(PruneResult { hidden, vars })
}

fn validate(
    net: &BayesNet,
    query: &[VarId],
    evidence: &[Assignment],
) -> Result<(), InferError> {
    if query.is_empty() {
        return Err(InferError::InvalidQuery(
            "query must name at least one variable".to_owned(),
        ));
    }
    for (i, &x) in query.iter().enumerate() {
        if net.node(x).is_err() {
            return Err(InferError::InvalidQuery(format!(
                "query variable {} is not in the network",
                x.0
            )));
        }
        if query[..i].contains(&x) {
            return Err(InferError::InvalidQuery(format!(
                "duplicate query variable `{}`",
                net.name(x)?
            )));
        }
    }
    for (i, a) in evidence.iter().enumerate() {
        if net.node(a.var).is_err() {
            return Err(InferError::InvalidQuery(format!(
                "evidence variable {} is not in the network",
                a.var.0
            )));
        }
        if a.value >= net.arity(a.var)? {
            return Err(InferError::InvalidQuery(format!(
                "evidence value {} out of range for `{}`",
                a.value,
                net.name(a.var)?
            )));
        }
        if query.contains(&a.var) {
            return Err(InferError::InvalidQuery(format!(
                "variable `{}` cannot be both query and evidence",
                net.name(a.var)?
            )));
        }
        if evidence[..i].iter().any(|b| b.var == a.var) {
            return Err(InferError::InvalidQuery(format!(
                "duplicate evidence for `{}`",
                net.name(a.var)?
            )));
        }
    }
    Ok(())
}

/// Builds the degenerate replacement for an observed evidence node: same
/// variable, same parents, CPT one-hot at the observed value for every
/// parent configuration.
fn point_mass_node(net: &BayesNet, var: VarId, value: usize) -> Result<Node, InferError> {
    let node = net.node(var)?;
    let arity = net.arity(var)?;
    let mut rows = 1usize;
    let mut vars: Vec<VarId> = Vec::with_capacity(node.parents().len() + 1);
    let mut arities: Vec<usize> = Vec::with_capacity(node.parents().len() + 1);
    for &p in node.parents() {
        let a = net.arity(p)?;
        rows *= a;
        vars.push(p);
        arities.push(a);
    }
    vars.push(var);
    arities.push(arity);
    let mut values = Vec::with_capacity(rows * arity);
    for _ in 0..rows {
        for i in 0..arity {
            values.push(if i == value { 1.0 } else { 0.0 });
        }
    }
    let cpt = Factor::new(vars, arities, values)?;
    Ok(Node::new(var, node.parents(), cpt))
}
