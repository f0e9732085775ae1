//! # Bayelim - Exact Bayesian Network Inference
//!
//! Bayelim answers exact probabilistic queries over finite Bayesian
//! networks by variable elimination, extended with a relevance-pruning
//! pass that removes query-irrelevant variables before elimination and a
//! pluggable heuristic that chooses the elimination order to keep
//! intermediate factors small.
//!
//! ## Architecture
//!
//! Everything lives under the `engine` module:
//!
//! - **network**: The directed network model (variables, nodes, CPTs)
//! - **factor**: Finite factor algebra used by the elimination driver
//! - **prune**: Ancestor and m-separation pruning, evidence rewriting
//! - **moral**: Moralized interaction graphs
//! - **order**: The elimination-order planner and heuristics
//! - **eliminate**: The query driver
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bayelim::{Assignment, BayesNet, VariableElimination};
//!
//! let mut net = BayesNet::new();
//! let rain = net.add_variable("Rain", &["yes", "no"])?;
//! let wet = net.add_variable("WetGrass", &["yes", "no"])?;
//! net.add_node(rain, &[], &[0.2, 0.8])?;
//! net.add_node(wet, &[rain], &[0.9, 0.1, 0.05, 0.95])?;
//!
//! let dist = VariableElimination::default()
//!     .ask(&mut net, &[rain], &[Assignment::new(wet, 0)])?;
//! println!("P(Rain | WetGrass) = {:?}", dist.values());
//! ```
//!
//! One query assumes exclusive access to its network: pruning rewrites
//! evidence nodes in place, so serialize queries or clone the network.

#![forbid(unsafe_code)]

pub mod engine;

// Re-export commonly used types
pub use engine::eliminate::{CategoricalDistribution, VariableElimination};
pub use engine::errors::InferError;
pub use engine::factor::Factor;
pub use engine::moral::InteractionGraph;
pub use engine::network::{Assignment, BayesNet, Node, VarId, Variable};
pub use engine::order::{
    order_variables, order_variables_with, Heuristic, NoopObserver, OrderObserver, TraceObserver,
};
pub use engine::prune::{ancestors_of, prune_for_query, PruneResult};
