//! Elimination-order planning via the elimination game.
//!
//! The planner repeatedly picks the remaining interaction-graph node with
//! the lowest heuristic cost, appends it to the order, and removes it with
//! fill-in. Ties break lexicographically on variable name so orders are
//! reproducible. Costs are cached per node; for topology-dependent
//! heuristics the cache entry of every node whose neighbor set changed is
//! invalidated after each removal, so stale degrees or fill counts never
//! leak into a comparison.
//!
//! An [`OrderObserver`] can watch the game for diagnostics. Observers are
//! best-effort side channels and never affect the computed order.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::engine::errors::InferError;
use crate::engine::moral::InteractionGraph;
use crate::engine::network::{BayesNet, VarId};

/// The cost heuristic the planner minimizes at each elimination step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// Position in the network's topological order, reversed: deepest
    /// variables are eliminated first. Cheap, ignores fill-in.
    #[default]
    ReverseTopological,
    /// Current degree in the interaction graph: fewer neighbors first.
    MinDegree,
    /// Number of fill-in edges the candidate would introduce.
    MinFill,
    /// Product of the domain sizes of the candidate's current neighbors.
    MinWeight,
}

impl Heuristic {
    /// Whether the cost depends on the mutating graph topology (and so
    /// must be recomputed when a node's neighbor set changes).
    fn topology_dependent(self) -> bool {
        !matches!(self, Heuristic::ReverseTopological)
    }
}

/// A diagnostic hook into the elimination game.
///
/// Default methods are no-ops; implementations must not assume they can
/// influence the order (they cannot).
pub trait OrderObserver {
    /// Called once after the interaction graph is built.
    fn graph_built(&self, _graph: &InteractionGraph) {}

    /// Called after each variable is removed (with fill-in applied).
    fn variable_eliminated(&self, _var: VarId, _graph: &InteractionGraph) {}
}

/// The default observer: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl OrderObserver for NoopObserver {}

/// An observer that logs the game's progress and optionally pauses between
/// steps, for watching the graph shrink while debugging orderings.
#[derive(Debug, Clone, Copy)]
pub struct TraceObserver {
    delay: Duration,
}

impl TraceObserver {
    /// Creates a tracing observer pausing `delay_ms` milliseconds per step.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl OrderObserver for TraceObserver {
    fn graph_built(&self, _graph: &InteractionGraph) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            nodes = _graph.node_count(),
            edges = _graph.edge_count(),
            "interaction graph built"
        );
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    fn variable_eliminated(&self, _var: VarId, _graph: &InteractionGraph) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            var = _var.0,
            remaining = _graph.node_count(),
            "variable eliminated"
        );
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

/// Orders `vars` for elimination, minimizing the configured heuristic.
///
/// The result is always a permutation of `vars`. An empty input yields an
/// empty order; a single variable is returned as-is with no graph work.
pub fn order_variables(
    net: &BayesNet,
    vars: &[VarId],
    heuristic: Heuristic,
) -> Result<Vec<VarId>, InferError> {
    order_variables_with(net, vars, heuristic, &NoopObserver)
}

/// [`order_variables`] with a diagnostic observer attached.
pub fn order_variables_with(
    net: &BayesNet,
    vars: &[VarId],
    heuristic: Heuristic,
    observer: &dyn OrderObserver,
) -> Result<Vec<VarId>, InferError> {
    if vars.is_empty() {
        return Ok(Vec::new());
    }
    if let [only] = vars {
        return Ok(vec![*only]);
    }

    let mut graph = InteractionGraph::build(net, vars)?;
    observer.graph_built(&graph);

    let topo_pos: FxHashMap<VarId, usize> = net
        .variables_in_topological_order()
        .iter()
        .copied()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();
    let topo_len = topo_pos.len();

    let mut cache: FxHashMap<VarId, u64> = FxHashMap::default();
    let mut order = Vec::with_capacity(vars.len());

    while !graph.is_empty() {
        let mut best: Option<(u64, &str, VarId)> = None;
        for v in graph.nodes() {
            let cost = match cache.get(&v) {
                Some(c) => *c,
                None => {
                    let c = heuristic_cost(heuristic, v, &graph, net, &topo_pos, topo_len)?;
                    cache.insert(v, c);
                    c
                }
            };
            let name = net.name(v)?;
            let better = match &best {
                None => true,
                Some((bc, bn, _)) => (cost, name) < (*bc, *bn),
            };
            if better {
                best = Some((cost, name, v));
            }
        }
        let Some((_, _, chosen)) = best else {
            break;
        };
        order.push(chosen);
        let touched = graph.remove_with_fill(chosen);
        cache.remove(&chosen);
        if heuristic.topology_dependent() {
            for t in &touched {
                cache.remove(t);
            }
        }
        observer.variable_eliminated(chosen, &graph);
    }

    Ok(order)
}

fn heuristic_cost(
    heuristic: Heuristic,
    var: VarId,
    graph: &InteractionGraph,
    net: &BayesNet,
    topo_pos: &FxHashMap<VarId, usize>,
    topo_len: usize,
) -> Result<u64, InferError> {
    match heuristic {
        Heuristic::ReverseTopological => {
            let pos = topo_pos.get(&var).copied().ok_or_else(|| {
                InferError::Structural(format!(
                    "variable {} has no topological position",
                    var.0
                ))
            })?;
            Ok((topo_len - 1 - pos) as u64)
        }
        Heuristic::MinDegree => Ok(graph.degree(var) as u64),
        Heuristic::MinFill => Ok(graph.fill_in_count(var) as u64),
        Heuristic::MinWeight => {
            let mut weight: u64 = 1;
            for n in graph.neighbors(var) {
                weight = weight.saturating_mul(net.arity(n)? as u64);
            }
            Ok(weight)
        }
    }
}
