//! Moralized interaction graphs for elimination-order search.
//!
//! An [`InteractionGraph`] is the undirected graph the order planner runs
//! the elimination game over. Building one from a network and a variable
//! subset marries every pair of co-parents ("moralization") and connects
//! each selected variable to its selected parents. Structural only: no
//! evidence or CPT data is consulted.
//!
//! Invariants: the edge set is symmetric with no self-loops, duplicate
//! edges are suppressed, and a variable outside the input set never
//! appears as a node.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::engine::errors::InferError;
use crate::engine::network::{BayesNet, VarId};

/// An undirected interaction graph over a subset of network variables.
///
/// Built fresh per planning pass and discarded after producing an order.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    adj: FxHashMap<VarId, FxHashSet<VarId>>,
}

impl InteractionGraph {
    /// Builds the moral graph of `vars` against the network structure.
    ///
    /// Parents outside `vars` contribute no nodes and no edges.
    pub fn build(net: &BayesNet, vars: &[VarId]) -> Result<Self, InferError> {
        let mut graph = Self::default();
        for &v in vars {
            graph.adj.entry(v).or_default();
        }
        for &v in vars {
            let node = net.node(v)?;
            let present: Vec<VarId> = node
                .parents()
                .iter()
                .copied()
                .filter(|p| graph.adj.contains_key(p))
                .collect();
            for (i, &p) in present.iter().enumerate() {
                graph.add_edge(v, p);
                for &q in &present[i + 1..] {
                    graph.add_edge(p, q);
                }
            }
        }
        Ok(graph)
    }

    fn add_edge(&mut self, a: VarId, b: VarId) {
        if a == b {
            return;
        }
        self.adj.entry(a).or_default().insert(b);
        self.adj.entry(b).or_default().insert(a);
    }

    /// The number of nodes currently in the graph.
    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// The number of undirected edges currently in the graph.
    pub fn edge_count(&self) -> usize {
        self.adj.values().map(|s| s.len()).sum::<usize>() / 2
    }

    /// Whether the graph has no nodes left.
    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    /// Whether `var` is a node of the graph.
    pub fn contains(&self, var: VarId) -> bool {
        self.adj.contains_key(&var)
    }

    /// Whether `a` and `b` are adjacent.
    pub fn has_edge(&self, a: VarId, b: VarId) -> bool {
        self.adj.get(&a).is_some_and(|s| s.contains(&b))
    }

    /// The current degree of `var` (0 if absent).
    pub fn degree(&self, var: VarId) -> usize {
        self.adj.get(&var).map_or(0, |s| s.len())
    }

    /// The current nodes, in hash order.
    pub fn nodes(&self) -> impl Iterator<Item = VarId> + '_ {
        self.adj.keys().copied()
    }

    /// The current neighbors of `var`, in hash order.
    pub fn neighbors(&self, var: VarId) -> impl Iterator<Item = VarId> + '_ {
        self.adj.get(&var).into_iter().flatten().copied()
    }

    /// All undirected edges as canonical `(low, high)` pairs, sorted.
    pub fn edges(&self) -> Vec<(VarId, VarId)> {
        let mut out: Vec<(VarId, VarId)> = Vec::with_capacity(self.edge_count());
        for (&a, s) in &self.adj {
            for &b in s {
                if a < b {
                    out.push((a, b));
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// The number of fill-in edges eliminating `var` would introduce:
    /// pairs of its neighbors that are not yet adjacent.
    pub fn fill_in_count(&self, var: VarId) -> usize {
        let ns: Vec<VarId> = self.neighbors(var).collect();
        let mut missing = 0usize;
        for (i, &p) in ns.iter().enumerate() {
            for &q in &ns[i + 1..] {
                if !self.has_edge(p, q) {
                    missing += 1;
                }
            }
        }
        missing
    }

    /// Removes `var` and pairwise connects its former neighbors.
    ///
    /// Returns the former neighbors, sorted by id; these are exactly the
    /// nodes whose neighbor sets may have changed.
    pub fn remove_with_fill(&mut self, var: VarId) -> Vec<VarId> {
        let Some(neighbors) = self.adj.remove(&var) else {
            return Vec::new();
        };
        let mut ns: Vec<VarId> = neighbors.into_iter().collect();
        ns.sort_unstable();
        for &n in &ns {
            if let Some(s) = self.adj.get_mut(&n) {
                s.remove(&var);
            }
        }
        for (i, &p) in ns.iter().enumerate() {
            for &q in &ns[i + 1..] {
                self.add_edge(p, q);
            }
        }
        ns
    }
}
