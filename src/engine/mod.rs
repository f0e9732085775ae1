//! The exact-inference engine for Bayesian networks.
//!
//! This module provides:
//! - **errors**: Error types for validation and execution failures
//! - **network**: The directed network model (variables, nodes, CPTs)
//! - **factor**: Finite factor algebra (product, sum-out, restrict,
//!   normalize)
//! - **prune**: Query-relevance pruning and evidence node rewriting
//! - **moral**: Moralized interaction graphs for order search
//! - **order**: The elimination-order planner and its heuristics
//! - **eliminate**: The variable-elimination driver tying it all together

pub mod eliminate;
pub mod errors;
pub mod factor;
pub mod moral;
pub mod network;
pub mod order;
pub mod prune;
