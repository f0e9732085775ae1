//! Finite factors for variable elimination.
//!
//! A [`Factor`] is a finite function from assignments of a variable subset
//! to non-negative reals, stored row-major with the last variable varying
//! fastest. CPTs are factors over `[parents..., variable]`, and the
//! elimination driver manipulates plain factors throughout:
//!
//! - [`Factor::product`] — pointwise product over the union of scopes
//! - [`Factor::sum_out`] — marginalize one variable away
//! - [`Factor::restrict`] — fix a variable to an observed value
//! - [`Factor::normalize`] — scale to total mass 1
//!
//! Index arithmetic uses mixed-radix strides; no factor ever exceeds the
//! product of its variables' arities.

use crate::engine::errors::InferError;
use crate::engine::network::VarId;

/// A finite factor over a set of variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Factor {
    vars: Vec<VarId>,
    arities: Vec<usize>,
    values: Vec<f64>,
}

/// Row-major strides: `strides[i]` is the product of arities after `i`.
fn strides(arities: &[usize]) -> Vec<usize> {
    let mut s = vec![1usize; arities.len()];
    for i in (0..arities.len().saturating_sub(1)).rev() {
        s[i] = s[i + 1] * arities[i + 1];
    }
    s
}

impl Factor {
    /// Creates a factor, validating shape and entries.
    ///
    /// `values.len()` must equal the product of `arities` (1 for an empty
    /// scope), variables must be distinct, and entries must be finite and
    /// non-negative.
    pub fn new(
        vars: Vec<VarId>,
        arities: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self, InferError> {
        if vars.len() != arities.len() {
            return Err(InferError::Structural(
                "factor variable and arity lists differ in length".to_owned(),
            ));
        }
        for (i, v) in vars.iter().enumerate() {
            if vars[..i].contains(v) {
                return Err(InferError::Structural(format!(
                    "factor lists variable {} twice",
                    v.0
                )));
            }
        }
        let expected: usize = arities.iter().product();
        if values.len() != expected {
            return Err(InferError::Structural(format!(
                "factor has {} values but its scope requires {expected}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(InferError::Numerical(
                "factor entries must be finite and non-negative".to_owned(),
            ));
        }
        Ok(Self {
            vars,
            arities,
            values,
        })
    }

    /// The multiplicative identity: an empty-scope factor with value 1.
    pub fn identity() -> Self {
        Self {
            vars: Vec::new(),
            arities: Vec::new(),
            values: vec![1.0],
        }
    }

    /// The factor's variables, in storage order.
    pub fn vars(&self) -> &[VarId] {
        &self.vars
    }

    /// The arity of each variable, parallel to [`Factor::vars`].
    pub fn arities(&self) -> &[usize] {
        &self.arities
    }

    /// The raw table values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether the factor's scope contains `var`.
    pub fn contains(&self, var: VarId) -> bool {
        self.vars.contains(&var)
    }

    /// The value at a full assignment (one digit per scope variable).
    pub fn prob(&self, assignment: &[usize]) -> Option<f64> {
        if assignment.len() != self.vars.len() {
            return None;
        }
        let s = strides(&self.arities);
        let mut idx = 0usize;
        for (j, &d) in assignment.iter().enumerate() {
            if d >= self.arities[j] {
                return None;
            }
            idx += d * s[j];
        }
        Some(self.values[idx])
    }

    /// For each variable of `target`, this factor's stride (0 if absent).
    fn aligned_strides(&self, target: &[VarId]) -> Vec<usize> {
        let own = strides(&self.arities);
        target
            .iter()
            .map(|v| {
                self.vars
                    .iter()
                    .position(|w| w == v)
                    .map(|p| own[p])
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Pointwise product over the union of both scopes.
    ///
    /// Shared variables are matched; the result's scope lists this factor's
    /// variables first, then the other's new ones.
    pub fn product(&self, other: &Factor) -> Factor {
        let mut vars = self.vars.clone();
        let mut arities = self.arities.clone();
        for (i, v) in other.vars.iter().enumerate() {
            if !vars.contains(v) {
                vars.push(*v);
                arities.push(other.arities[i]);
            }
        }
        let size: usize = arities.iter().product();
        let lhs = self.aligned_strides(&vars);
        let rhs = other.aligned_strides(&vars);
        let mut values = vec![0.0; size];
        let mut digits = vec![0usize; vars.len()];
        for value in values.iter_mut() {
            let mut a = 0usize;
            let mut b = 0usize;
            for (j, &d) in digits.iter().enumerate() {
                a += d * lhs[j];
                b += d * rhs[j];
            }
            *value = self.values[a] * other.values[b];
            for j in (0..digits.len()).rev() {
                digits[j] += 1;
                if digits[j] < arities[j] {
                    break;
                }
                digits[j] = 0;
            }
        }
        Factor {
            vars,
            arities,
            values,
        }
    }

    /// Sums `var` out of the factor, dropping it from the scope.
    pub fn sum_out(&self, var: VarId) -> Result<Factor, InferError> {
        let pos = self.position(var)?;
        let s = strides(&self.arities);
        let stride = s[pos];
        let arity = self.arities[pos];
        let mut vars = self.vars.clone();
        vars.remove(pos);
        let mut arities = self.arities.clone();
        arities.remove(pos);
        let mut values = vec![0.0; self.values.len() / arity];
        for (idx, v) in self.values.iter().enumerate() {
            let high = idx / (stride * arity);
            let low = idx % stride;
            values[high * stride + low] += v;
        }
        Ok(Factor {
            vars,
            arities,
            values,
        })
    }

    /// Restricts `var` to `value`, dropping it from the scope.
    pub fn restrict(&self, var: VarId, value: usize) -> Result<Factor, InferError> {
        let pos = self.position(var)?;
        let arity = self.arities[pos];
        if value >= arity {
            return Err(InferError::Structural(format!(
                "value {value} out of range for variable {} (arity {arity})",
                var.0
            )));
        }
        let s = strides(&self.arities);
        let stride = s[pos];
        let mut vars = self.vars.clone();
        vars.remove(pos);
        let mut arities = self.arities.clone();
        arities.remove(pos);
        let mut values = vec![0.0; self.values.len() / arity];
        for (out, slot) in values.iter_mut().enumerate() {
            let high = out / stride;
            let low = out % stride;
            *slot = self.values[(high * arity + value) * stride + low];
        }
        Ok(Factor {
            vars,
            arities,
            values,
        })
    }

    /// Scales the factor so its values sum to 1.
    pub fn normalize(&self) -> Result<Factor, InferError> {
        let total: f64 = self.values.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(InferError::Numerical(format!(
                "cannot normalize factor with total mass {total}"
            )));
        }
        Ok(Factor {
            vars: self.vars.clone(),
            arities: self.arities.clone(),
            values: self.values.iter().map(|v| v / total).collect(),
        })
    }

    /// Reorders the scope to `order`, a permutation of this factor's
    /// variables, permuting the table to match.
    pub fn align_to(&self, order: &[VarId]) -> Result<Factor, InferError> {
        let permutation = order.len() == self.vars.len()
            && order.iter().all(|v| self.vars.contains(v))
            && order
                .iter()
                .enumerate()
                .all(|(i, v)| !order[..i].contains(v));
        if !permutation {
            return Err(InferError::Structural(
                "alignment target must be a permutation of the factor's variables".to_owned(),
            ));
        }
        let arities: Vec<usize> = order
            .iter()
            .map(|v| self.arities[self.vars.iter().position(|w| w == v).unwrap_or(0)])
            .collect();
        let map = self.aligned_strides(order);
        let mut values = vec![0.0; self.values.len()];
        let mut digits = vec![0usize; order.len()];
        for value in values.iter_mut() {
            let mut idx = 0usize;
            for (j, &d) in digits.iter().enumerate() {
                idx += d * map[j];
            }
            *value = self.values[idx];
            for j in (0..digits.len()).rev() {
                digits[j] += 1;
                if digits[j] < arities[j] {
                    break;
                }
                digits[j] = 0;
            }
        }
        Ok(Factor {
            vars: order.to_vec(),
            arities,
            values,
        })
    }

    fn position(&self, var: VarId) -> Result<usize, InferError> {
        self.vars.iter().position(|v| *v == var).ok_or_else(|| {
            InferError::Structural(format!("variable {} not in factor scope", var.0))
        })
    }
}
