use crate::{
  internal::*,
  error::{ Error, Result },
  scalar::Real,
};


/// Hyper-parameters of a [Trainer](crate::optimize::Trainer) run.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig<T: Real> {
  /// Step size of every gradient update.
  pub rate: T,

  /// Parameter nudge used by the finite difference estimator.
  pub eps: T,

  pub iterations: usize,

  /// Record the cost every this many iterations. Zero records only
  /// the initial and the final cost.
  pub sample_every: usize,
}

impl<T: Real> TrainConfig<T> {
  pub fn new(rate: T, eps: T, iterations: usize) -> Self {
    Self { rate, eps, iterations, ..Self::default() }
  }

  pub fn validate(&self) -> Result<()> {
    if self.rate == T::zero() || !self.rate.is_finite() {
      return Err(Error::config(format!("learning rate must be finite and non-zero, got {}", self.rate)))
    }
    if self.eps == T::zero() || !self.eps.is_finite() {
      return Err(Error::config(format!("finite difference step must be finite and non-zero, got {}", self.eps)))
    }
    Ok(())
  }
}

impl<T: Real> Default for TrainConfig<T> {
  fn default() -> Self {
    Self {
      rate: constant(0.1),
      eps: constant(0.1),
      iterations: 1000,
      sample_every: 100,
    }
  }
}
