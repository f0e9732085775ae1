//! The exact-inference driver: variable elimination over a pruned network.
//!
//! [`VariableElimination::ask`] runs the full pipeline for one query:
//! relevance pruning, evidence edge absorption, heuristic ordering, factor
//! construction, hidden-variable sum-out, and final normalization over the
//! query variables.
//!
//! The driver assumes exclusive access to the network for the duration of
//! one query: pruning rewrites evidence nodes in place, so callers running
//! queries concurrently against a shared network must serialize them or
//! clone the network per query.

use rustc_hash::FxHashSet;

use crate::engine::errors::InferError;
use crate::engine::factor::Factor;
use crate::engine::network::{Assignment, BayesNet, VarId};
use crate::engine::order::{order_variables_with, Heuristic, NoopObserver, OrderObserver};
use crate::engine::prune::prune_for_query;

/// A normalized distribution over the query variables, in query order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoricalDistribution {
    factor: Factor,
}

impl CategoricalDistribution {
    /// The distribution's variables, matching the query order.
    pub fn vars(&self) -> &[VarId] {
        self.factor.vars()
    }

    /// The probabilities, row-major with the last variable fastest.
    pub fn values(&self) -> &[f64] {
        self.factor.values()
    }

    /// The probability of a full assignment (one domain index per query
    /// variable).
    pub fn prob(&self, assignment: &[usize]) -> Option<f64> {
        self.factor.prob(assignment)
    }
}

/// Exact inference by variable elimination with relevance pruning.
pub struct VariableElimination {
    heuristic: Heuristic,
    observer: Box<dyn OrderObserver>,
}

impl Default for VariableElimination {
    fn default() -> Self {
        Self::new(Heuristic::default())
    }
}

impl VariableElimination {
    /// Creates a driver using the given ordering heuristic and no observer.
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            observer: Box::new(NoopObserver),
        }
    }

    /// Creates a driver with a diagnostic observer attached to the order
    /// planner. The observer never affects results.
    pub fn with_observer(heuristic: Heuristic, observer: Box<dyn OrderObserver>) -> Self {
        Self {
            heuristic,
            observer,
        }
    }

    /// Computes the posterior distribution of `query` given `evidence`.
    ///
    /// Mutates the network (evidence node replacement and edge
    /// absorption); validation is completed before any mutation, so an
    /// invalid query leaves the network as it was.
    ///
    /// # Errors
    ///
    /// * [`InferError::InvalidQuery`] — malformed query or evidence.
    /// * [`InferError::Numerical`] — the evidence has zero probability
    ///   under the network, leaving nothing to normalize.
    pub fn ask(
        &self,
        net: &mut BayesNet,
        query: &[VarId],
        evidence: &[Assignment],
    ) -> Result<CategoricalDistribution, InferError> {
        // Relevance pruning inspects the original topology, so it runs
        // before the evidence edges are absorbed into child CPTs.
        let pruned = prune_for_query(net, query, evidence)?;
        net.prune_edges(evidence)?;

        let scope: FxHashSet<VarId> = pruned.vars.iter().copied().collect();
        let aligned =
            order_variables_with(net, &pruned.vars, self.heuristic, self.observer.as_ref())?;
        let mut factors: Vec<Factor> = Vec::with_capacity(aligned.len());
        for var in aligned {
            factors.insert(0, make_factor(net, var, evidence, &scope)?);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            factors = factors.len(),
            hidden = pruned.hidden.len(),
            "starting elimination"
        );

        let hidden_list: Vec<VarId> = pruned
            .vars
            .iter()
            .copied()
            .filter(|v| pruned.hidden.contains(v))
            .collect();
        for var in
            order_variables_with(net, &hidden_list, self.heuristic, self.observer.as_ref())?
        {
            factors = sum_out_factor(factors, var)?;
        }

        let mut product = Factor::identity();
        for f in &factors {
            product = product.product(f);
        }
        let factor = product.align_to(query)?.normalize()?;
        Ok(CategoricalDistribution { factor })
    }
}

/// Builds the factor for one variable: its CPT restricted to the evidence,
/// with any variable the pruner excluded summed away (a point-mass
/// replacement can still mention pruned parents).
fn make_factor(
    net: &BayesNet,
    var: VarId,
    evidence: &[Assignment],
    scope: &FxHashSet<VarId>,
) -> Result<Factor, InferError> {
    let mut factor = net.node(var)?.cpt().clone();
    for a in evidence {
        if factor.contains(a.var) {
            factor = factor.restrict(a.var, a.value)?;
        }
    }
    let extraneous: Vec<VarId> = factor
        .vars()
        .iter()
        .copied()
        .filter(|v| !scope.contains(v))
        .collect();
    for v in extraneous {
        factor = factor.sum_out(v)?;
    }
    Ok(factor)
}

/// Multiplies together the factors mentioning `var` and sums it out,
/// leaving the rest untouched.
fn sum_out_factor(factors: Vec<Factor>, var: VarId) -> Result<Vec<Factor>, InferError> {
    let (with, mut rest): (Vec<Factor>, Vec<Factor>) =
        factors.into_iter().partition(|f| f.contains(var));
    if with.is_empty() {
        return Ok(rest);
    }
    let mut product = Factor::identity();
    for f in &with {
        product = product.product(f);
    }
    rest.push(product.sum_out(var)?);
    Ok(rest)
}
