use log::info;

use crate::{
  error::Result,
  mat::Mat,
  network::Net,
  scalar::Real,
  activation::Activation,
  config::TrainConfig,
  finite_diff,
};


/// A gradient estimation strategy to be used with [Trainer].

pub trait Strategy<T: Real> {
  fn estimate<F>(
    &mut self,
    g: &mut Net<T>,
    n: &mut Net<T>,
    inputs: &Mat<T>,
    targets: &Mat<T>,
    f: &F,
    eps: T,
  ) -> Result<()>
  where
    F: Activation<T> + Sync + ?Sized;
}


/// Sequential forward differences

#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardDifference;

impl<T: Real> Strategy<T> for ForwardDifference {
  fn estimate<F>(&mut self, g: &mut Net<T>, n: &mut Net<T>, inputs: &Mat<T>, targets: &Mat<T>, f: &F, eps: T) -> Result<()>
  where
    F: Activation<T> + Sync + ?Sized,
  {
    finite_diff::estimate_gradient(g, n, inputs, targets, f, eps)
  }
}


/// Forward differences measured on the rayon thread pool

#[cfg(feature = "rayon")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelForwardDifference;

#[cfg(feature = "rayon")]
impl<T: Real> Strategy<T> for ParallelForwardDifference {
  fn estimate<F>(&mut self, g: &mut Net<T>, n: &mut Net<T>, inputs: &Mat<T>, targets: &Mat<T>, f: &F, eps: T) -> Result<()>
  where
    F: Activation<T> + Sync + ?Sized,
  {
    finite_diff::estimate_gradient_par(g, n, inputs, targets, f, eps)
  }
}


/// Cost of the network after a given number of training iterations.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint<T> {
  pub iteration: usize,
  pub cost: T,
}


/// Sampled costs of a training run, in iteration order.

#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
  checkpoints: Vec<Checkpoint<T>>,
}

impl<T: Real> History<T> {
  fn new() -> Self {
    Self { checkpoints: vec![] }
  }

  fn record(&mut self, iteration: usize, cost: T) {
    info!("[{:8}]cost: {:20.10}", iteration, cost);
    self.checkpoints.push(Checkpoint { iteration, cost });
  }

  pub fn checkpoints(&self) -> &[Checkpoint<T>] {
    &self.checkpoints
  }

  pub fn initial(&self) -> Option<T> {
    self.checkpoints.first().map(|c| c.cost )
  }

  pub fn last(&self) -> Option<T> {
    self.checkpoints.last().map(|c| c.cost )
  }

  /// Share of consecutive checkpoints whose cost went down.
  ///
  /// A history with fewer than two checkpoints counts as decreasing.

  pub fn decreasing_ratio(&self) -> f64 {
    let steps = self.checkpoints.len().saturating_sub(1);
    if steps == 0 { return 1.0 }
    let decreasing = self.checkpoints.windows(2)
      .filter(|pair| pair[1].cost < pair[0].cost )
      .count();
    decreasing as f64 / steps as f64
  }
}


/// Gradient descent driver that works with several estimation [strategies](Strategy).

#[derive(Debug)]
pub struct Trainer<T: Real, S: Strategy<T>> {
  strategy: S,
  pub config: TrainConfig<T>,
  step: usize,
}

impl<T: Real, S: Strategy<T>> Trainer<T, S> {
  pub fn new(config: TrainConfig<T>, strategy: S) -> Result<Self> {
    config.validate()?;
    Ok(Self { strategy, config, step: 0 })
  }

  /// Number of updates applied so far.

  pub fn steps(&self) -> usize {
    self.step
  }

  /// Estimate the gradient of `n` into `g` and take one descent step.

  pub fn step<F>(&mut self, g: &mut Net<T>, n: &mut Net<T>, inputs: &Mat<T>, targets: &Mat<T>, f: &F) -> Result<()>
  where
    F: Activation<T> + Sync + ?Sized,
  {
    self.strategy.estimate(g, n, inputs, targets, f, self.config.eps)?;
    n.learn(g, self.config.rate)?;
    self.step += 1;
    Ok(())
  }

  /// Train `n` for the configured number of iterations.
  ///
  /// The cost is recorded before the first update, after every
  /// `sample_every` updates and after the last one.

  pub fn fit<F>(&mut self, n: &mut Net<T>, inputs: &Mat<T>, targets: &Mat<T>, f: &F) -> Result<History<T>>
  where
    F: Activation<T> + Sync + ?Sized,
  {
    let mut g = Net::alloc(n.layout())?;
    let mut history = History::new();
    history.record(0, n.cost(inputs, targets, f)?);

    let iterations = self.config.iterations;
    for i in 1..=iterations {
      self.step(&mut g, n, inputs, targets, f)?;
      let sampled = self.config.sample_every != 0 && i % self.config.sample_every == 0;
      if sampled || i == iterations {
        history.record(i, n.cost(inputs, targets, f)?);
      }
    }
    Ok(history)
  }
}
