//! # Bayesian Network Model
//!
//! This module implements the directed network that inference runs against.
//!
//! ## Key Components
//!
//! - **Variable**: a named random variable with a finite domain
//! - **Node**: a variable plus its parent set and conditional probability
//!   table (CPT), stored as a [`Factor`] over `[parents..., variable]`
//! - **BayesNet**: the DAG itself, with O(1) node lookup, a maintained
//!   topological order, controlled node replacement, and evidence-based
//!   edge pruning
//!
//! ## Design
//!
//! Nodes must be added parents-first, so insertion order doubles as a valid
//! topological order and no cycle check is ever needed. The only mutations
//! the network supports after construction are [`BayesNet::replace_node`]
//! (swap a node's CPT data, keeping variable identity and parents) and
//! [`BayesNet::prune_edges`] (absorb observed evidence into child CPTs).
//! Both are single-query operations: callers running multiple queries
//! against one network instance must serialize access or clone the network
//! per query.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::engine::errors::InferError;
use crate::engine::factor::Factor;

/// A unique identifier for a random variable in the network.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub u32);

/// A random variable: a name plus a finite domain of value labels.
///
/// Immutable once registered with a [`BayesNet`]. All other components
/// reference variables by [`VarId`], never by ownership.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    id: VarId,
    name: String,
    domain: Vec<String>,
}

impl Variable {
    /// The variable's identifier.
    pub fn id(&self) -> VarId {
        self.id
    }

    /// The variable's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered domain value labels.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// The number of domain values.
    pub fn arity(&self) -> usize {
        self.domain.len()
    }
}

/// An observed (variable, value-index) pair.
///
/// Created by the caller per query; immutable; lives for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    /// The observed variable.
    pub var: VarId,
    /// The index of the observed value in the variable's domain.
    pub value: usize,
}

impl Assignment {
    /// Creates an assignment of `value` (a domain index) to `var`.
    pub fn new(var: VarId, value: usize) -> Self {
        Self { var, value }
    }
}

/// A network node: a variable, its parents, and its CPT.
///
/// The CPT is a [`Factor`] over `[parents..., variable]`. Owned by the
/// [`BayesNet`]; the one permitted mutation is wholesale replacement via
/// [`BayesNet::replace_node`], which must keep variable identity and the
/// parent set intact.
#[derive(Debug, Clone)]
pub struct Node {
    var: VarId,
    parents: SmallVec<[VarId; 4]>,
    cpt: Factor,
}

impl Node {
    /// Creates a node for `var` with the given parents and CPT factor.
    pub fn new(var: VarId, parents: &[VarId], cpt: Factor) -> Self {
        Self {
            var,
            parents: SmallVec::from_slice(parents),
            cpt,
        }
    }

    /// The variable this node belongs to.
    pub fn var(&self) -> VarId {
        self.var
    }

    /// The node's parent variables.
    pub fn parents(&self) -> &[VarId] {
        &self.parents
    }

    /// The node's conditional probability table.
    pub fn cpt(&self) -> &Factor {
        &self.cpt
    }
}

/// A finite Bayesian network: a DAG of nodes with CPTs.
#[derive(Debug, Clone, Default)]
pub struct BayesNet {
    variables: Vec<Variable>,
    nodes: FxHashMap<VarId, Node>,
    by_name: FxHashMap<String, VarId>,
    topo: Vec<VarId>,
}

impl BayesNet {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variable with the given name and domain values.
    ///
    /// Names must be unique and domains must have at least two values.
    pub fn add_variable(&mut self, name: &str, domain: &[&str]) -> Result<VarId, InferError> {
        if self.by_name.contains_key(name) {
            return Err(InferError::Structural(format!(
                "duplicate variable name `{name}`"
            )));
        }
        if domain.len() < 2 {
            return Err(InferError::Structural(format!(
                "variable `{name}` needs at least two domain values"
            )));
        }
        let id = VarId(self.variables.len() as u32);
        self.variables.push(Variable {
            id,
            name: name.to_owned(),
            domain: domain.iter().map(|v| (*v).to_owned()).collect(),
        });
        self.by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Adds a node for `var` with the given parents and CPT values.
    ///
    /// `cpt` is laid out row-major over `[parents..., var]` with the last
    /// variable varying fastest, so its length must equal the product of
    /// the parent arities times the arity of `var`. Parents must already
    /// have nodes; insertion order therefore yields a valid topological
    /// order without a cycle check.
    pub fn add_node(
        &mut self,
        var: VarId,
        parents: &[VarId],
        cpt: &[f64],
    ) -> Result<(), InferError> {
        let name = self.variable(var)?.name().to_owned();
        if self.nodes.contains_key(&var) {
            return Err(InferError::Structural(format!(
                "node already defined for `{name}`"
            )));
        }
        let mut vars: Vec<VarId> = Vec::with_capacity(parents.len() + 1);
        let mut arities: Vec<usize> = Vec::with_capacity(parents.len() + 1);
        for &p in parents {
            if !self.nodes.contains_key(&p) {
                return Err(InferError::Structural(format!(
                    "parent `{}` of `{name}` has no node yet",
                    self.label(p)
                )));
            }
            vars.push(p);
            arities.push(self.arity(p)?);
        }
        vars.push(var);
        arities.push(self.arity(var)?);
        let factor = Factor::new(vars, arities, cpt.to_vec())?;
        self.nodes.insert(var, Node::new(var, parents, factor));
        self.topo.push(var);
        Ok(())
    }

    /// Looks up a variable's metadata.
    pub fn variable(&self, var: VarId) -> Result<&Variable, InferError> {
        self.variables
            .get(var.0 as usize)
            .ok_or_else(|| InferError::Structural(format!("unknown variable id {}", var.0)))
    }

    /// Looks up a variable id by name.
    pub fn var_by_name(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    /// The variable's name.
    pub fn name(&self, var: VarId) -> Result<&str, InferError> {
        Ok(self.variable(var)?.name())
    }

    /// The variable's domain size.
    pub fn arity(&self, var: VarId) -> Result<usize, InferError> {
        Ok(self.variable(var)?.arity())
    }

    /// All node variables in a valid topological order (parents first).
    pub fn variables_in_topological_order(&self) -> &[VarId] {
        &self.topo
    }

    /// Looks up the node for a variable.
    ///
    /// A variable without a node is a structural inconsistency.
    pub fn node(&self, var: VarId) -> Result<&Node, InferError> {
        self.nodes
            .get(&var)
            .ok_or_else(|| InferError::Structural(format!("no node for variable `{}`", self.label(var))))
    }

    /// The children of `var`, in topological order.
    pub fn children(&self, var: VarId) -> Vec<VarId> {
        self.topo
            .iter()
            .copied()
            .filter(|c| {
                self.nodes
                    .get(c)
                    .is_some_and(|n| n.parents().contains(&var))
            })
            .collect()
    }

    /// Replaces a node in place, keyed by variable identity.
    ///
    /// The replacement must keep the same parent list; only the CPT data
    /// may change. Replacement is idempotent and order-independent, so a
    /// retried pruning pass converges to the same network state.
    pub fn replace_node(&mut self, node: Node) -> Result<(), InferError> {
        let var = node.var();
        let existing = self.node(var)?;
        if existing.parents() != node.parents() {
            return Err(InferError::Structural(format!(
                "replacement node for `{}` must keep its parents",
                self.label(var)
            )));
        }
        let mut expected: Vec<VarId> = node.parents().to_vec();
        expected.push(var);
        if node.cpt().vars() != expected.as_slice() {
            return Err(InferError::Structural(format!(
                "replacement CPT for `{}` must range over its parents and itself",
                self.label(var)
            )));
        }
        self.nodes.insert(var, node);
        Ok(())
    }

    /// Absorbs observed evidence into the network structure.
    ///
    /// For each evidence assignment `e = v`, every child of `e` has its CPT
    /// restricted to `e = v` and the edge from `e` dropped from its parent
    /// list. The evidence node itself is untouched. This is the
    /// preprocessing the elimination driver applies once per query, after
    /// relevance pruning has inspected the original topology.
    pub fn prune_edges(&mut self, evidence: &[Assignment]) -> Result<(), InferError> {
        for a in evidence {
            self.node(a.var)?;
            if a.value >= self.arity(a.var)? {
                return Err(InferError::InvalidQuery(format!(
                    "evidence value {} out of range for `{}`",
                    a.value,
                    self.label(a.var)
                )));
            }
        }
        for a in evidence {
            for child in self.children(a.var) {
                if let Some(n) = self.nodes.get_mut(&child) {
                    n.cpt = n.cpt.restrict(a.var, a.value)?;
                    n.parents.retain(|p| *p != a.var);
                }
            }
        }
        Ok(())
    }

    fn label(&self, var: VarId) -> String {
        match self.variables.get(var.0 as usize) {
            Some(v) => v.name().to_owned(),
            None => format!("#{}", var.0),
        }
    }
}
