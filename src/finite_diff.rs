//! Gradient estimation by forward differences.
//!
//! Every weight and bias is nudged by `eps` in turn and the change in cost
//! is recorded in the corresponding slot of a gradient network with the
//! same topology.

use log::debug;

use crate::{
  error::{ Error, Result },
  mat::Mat,
  network::Net,
  scalar::Real,
  activation::Activation,
};


fn check<T: Real>(g: &Net<T>, n: &Net<T>, eps: T) -> Result<()> {
  if eps == T::zero() || !eps.is_finite() {
    return Err(Error::config(format!("finite difference step must be finite and non-zero, got {eps}")))
  }
  n.check_topology(g)?;
  if g.overlaps(n) {
    return Err(Error::Aliasing { op: "estimate gradient" })
  }
  Ok(())
}


/// Write `(cost(p + eps) - cost(p)) / eps` for every parameter `p` of `n`
/// into the matching slot of `g`.
///
/// Parameters are visited layer by layer, weights before biases, and each
/// one is restored before the next is perturbed. `n`'s activations are
/// clobbered.

pub fn estimate_gradient<T, F>(
  g: &mut Net<T>,
  n: &mut Net<T>,
  inputs: &Mat<T>,
  targets: &Mat<T>,
  f: &F,
  eps: T,
) -> Result<()>
where
  T: Real,
  F: Activation<T> + ?Sized,
{
  check(g, n, eps)?;
  let base = n.cost(inputs, targets, f)?;

  // Handles into the same buffers, so the network stays free to run
  let params: Vec<Mat<T>> = n.param_views().cloned().collect();
  let grads: Vec<Mat<T>> = g.param_views().cloned().collect();

  for (param, grad) in params.iter().zip(&grads) {
    for i in 0..param.rows() {
      for j in 0..param.cols() {
        let saved = param.at(i, j);
        param.set(i, j, saved + eps);
        let cost = n.cost(inputs, targets, f);
        param.set(i, j, saved);
        grad.set(i, j, (cost? - base) / eps);
      }
    }
  }
  debug!("estimated {} partial derivatives around cost {}", n.layout().param_count(), base);
  Ok(())
}


#[cfg(feature = "rayon")]
pub use parallel::estimate_gradient_par;

#[cfg(feature = "rayon")]
mod parallel {
  use rayon::prelude::*;

  use crate::layout::Layout;
  use super::*;

  // Private copy of everything a cost evaluation touches
  struct Worker<T: Real> {
    net: Net<T>,
    params: Vec<T>,
    inputs: Mat<T>,
    targets: Mat<T>,
  }

  impl<T: Real> Worker<T> {
    fn new(layout: &Layout, params: &[T], inputs: &Snapshot<T>, targets: &Snapshot<T>) -> Result<Self> {
      let mut net = Net::alloc(layout)?;
      net.load_params(params)?;
      Ok(Self {
        net,
        params: params.to_vec(),
        inputs: inputs.restore()?,
        targets: targets.restore()?,
      })
    }

    fn partial<F: Activation<T> + ?Sized>(&mut self, k: usize, base: T, f: &F, eps: T) -> Result<T> {
      let saved = self.params[k];
      self.params[k] = saved + eps;
      let loaded = self.net.load_params(&self.params);
      self.params[k] = saved;
      loaded?;
      let cost = self.net.cost(&self.inputs, &self.targets, f)?;
      Ok((cost - base) / eps)
    }
  }

  // Matrix contents in a form that may cross threads
  struct Snapshot<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
  }

  impl<T: Real> Snapshot<T> {
    fn of(m: &Mat<T>) -> Self {
      Self { rows: m.rows(), cols: m.cols(), data: m.to_vec() }
    }

    fn restore(&self) -> Result<Mat<T>> {
      Mat::new(self.rows, self.cols, self.data.clone())
    }
  }

  /// Same result as [estimate_gradient](super::estimate_gradient), with the
  /// partial derivatives measured on the rayon thread pool.
  ///
  /// Each worker thread evaluates the cost on its own deep copy of the
  /// parameters and the dataset. The gradient is written back on the
  /// calling thread once all measurements are in.

  pub fn estimate_gradient_par<T, F>(
    g: &mut Net<T>,
    n: &mut Net<T>,
    inputs: &Mat<T>,
    targets: &Mat<T>,
    f: &F,
    eps: T,
  ) -> Result<()>
  where
    T: Real,
    F: Activation<T> + Sync + ?Sized,
  {
    check(g, n, eps)?;
    let base = n.cost(inputs, targets, f)?;

    let layout = n.layout().clone();
    let params = n.params();
    let inputs = Snapshot::of(inputs);
    let targets = Snapshot::of(targets);

    let partials = (0..params.len())
      .into_par_iter()
      .map_init(
        || Worker::new(&layout, &params, &inputs, &targets),
        |worker, k| match worker {
          Ok(worker) => worker.partial(k, base, f, eps),
          // Setup can only fail to allocate
          Err(_) => Err(Error::Allocation { elements: params.len() }),
        },
      )
      .collect::<Result<Vec<T>>>()?;

    g.load_params(&partials)?;
    debug!("estimated {} partial derivatives in parallel around cost {}", partials.len(), base);
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use rand::{ SeedableRng, rngs::StdRng };
  use crate::{
    layout::Layout,
    activation::{ Identity, Sigmoid },
  };

  fn pair(layout: &Layout, seed: u64) -> (Net<f64>, Net<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut n = Net::arena(layout).unwrap();
    n.randomize(&mut rng, -1.0, 1.0);
    (Net::alloc(layout).unwrap(), n)
  }

  #[test]
  fn single_weight_matches_analytic_derivative() {
    // cost(w) = (w * x - t)^2, d/dw = 2x(wx - t)
    let layout = Layout::new(1, &[1]).unwrap();
    let mut n = Net::alloc(&layout).unwrap();
    n.load_params(&[0.7, 0.0]).unwrap();
    let mut g = Net::alloc(&layout).unwrap();
    let inputs = Mat::vec(&[2.0]);
    let targets = Mat::vec(&[1.0]);
    estimate_gradient(&mut g, &mut n, &inputs, &targets, &Identity, 1e-4).unwrap();
    let weight = g.layers()[0].weights.at(0, 0);
    let bias = g.layers()[0].bias.at(0, 0);
    assert_relative_eq!(weight, 2.0 * 2.0 * (0.7 * 2.0 - 1.0), max_relative = 0.01);
    assert_relative_eq!(bias, 2.0 * (0.7 * 2.0 - 1.0), max_relative = 0.01);
  }

  #[test]
  fn converges_as_step_shrinks() {
    // cost(w) = (s(wx) - t)^2 with s(z) = 1 / (1 + e^z), s'(z) = -s(1 - s)
    let layout = Layout::new(1, &[1]).unwrap();
    let (x, t, w) = (2.0f64, 1.0, 0.7);
    let s = Sigmoid.apply(w * x);
    let exact = 2.0 * (s - t) * -s * (1.0 - s) * x;

    let mut n = Net::alloc(&layout).unwrap();
    n.load_params(&[w, 0.0]).unwrap();
    let mut g = Net::alloc(&layout).unwrap();
    let mut last = f64::INFINITY;
    for eps in [1e-1, 1e-2, 1e-3, 1e-4] {
      estimate_gradient(&mut g, &mut n, &Mat::vec(&[x]), &Mat::vec(&[t]), &Sigmoid, eps).unwrap();
      let error = (g.layers()[0].weights.at(0, 0) - exact).abs();
      assert!(error < last, "error {error} at eps {eps} did not shrink below {last}");
      last = error;
    }
    assert!(last < 1e-4);
  }

  #[test]
  fn visits_every_parameter() {
    // Linear net with zero targets: the cost depends on every parameter
    let layout = Layout::new(2, &[3, 2]).unwrap();
    let (mut g, mut n) = pair(&layout, 5);
    g.fill(f64::NAN);
    let inputs = Mat::new(2, 2, vec![0.5, -1.0, 1.5, 2.0]).unwrap();
    let targets = Mat::zeros(2, 2).unwrap();
    estimate_gradient(&mut g, &mut n, &inputs, &targets, &Identity, 1e-6).unwrap();
    assert!(g.params().iter().all(|p| p.is_finite() && *p != 0.0 ));
  }

  #[test]
  fn restores_parameters() {
    let layout = Layout::new(2, &[2, 1]).unwrap();
    let (mut g, mut n) = pair(&layout, 9);
    let before: Vec<u64> = n.params().iter().map(|p| p.to_bits() ).collect();
    let inputs = Mat::new(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
    let targets = Mat::new(2, 1, vec![1.0, 0.0]).unwrap();
    estimate_gradient(&mut g, &mut n, &inputs, &targets, &Sigmoid, 0.1).unwrap();
    let after: Vec<u64> = n.params().iter().map(|p| p.to_bits() ).collect();
    assert_eq!(before, after);
  }

  #[test]
  fn rejects_bad_step() {
    let layout = Layout::new(1, &[1]).unwrap();
    let (mut g, mut n) = pair(&layout, 1);
    let x = Mat::vec(&[1.0]);
    assert!(matches!(estimate_gradient(&mut g, &mut n, &x, &x, &Identity, 0.0), Err(Error::InvalidConfig(_))));
    assert!(matches!(estimate_gradient(&mut g, &mut n, &x, &x, &Identity, f64::INFINITY), Err(Error::InvalidConfig(_))));
  }

  #[test]
  fn rejects_topology_mismatch() {
    let (_, mut n) = pair(&Layout::new(2, &[2, 1]).unwrap(), 1);
    let mut g = Net::alloc(&Layout::new(2, &[1]).unwrap()).unwrap();
    let inputs = Mat::vec(&[1.0, 0.0]);
    let targets = Mat::vec(&[1.0]);
    assert!(matches!(
      estimate_gradient(&mut g, &mut n, &inputs, &targets, &Sigmoid, 0.1),
      Err(Error::ShapeMismatch { op: "topology", .. })
    ));
  }

  #[test]
  fn rejects_gradient_inside_network() {
    // Gradient carved from the very same arenas as the network
    let layout = Layout::new(1, &[1]).unwrap();
    let arena = crate::network::Arena::<f64>::new(&layout).unwrap();
    let mut n = Net::carve(&layout, &arena.params, &arena.acts).unwrap();
    let mut g = Net::carve(&layout, &arena.params, &arena.acts).unwrap();
    let x = Mat::vec(&[1.0]);
    assert!(matches!(estimate_gradient(&mut g, &mut n, &x, &x, &Identity, 0.1), Err(Error::Aliasing { .. })));
  }

  #[cfg(feature = "rayon")]
  #[test]
  fn parallel_matches_sequential() {
    let layout = Layout::new(2, &[3, 2]).unwrap();
    let (mut g, mut n) = pair(&layout, 21);
    let mut g_par = Net::alloc(&layout).unwrap();
    let inputs = Mat::new(3, 2, vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).unwrap();
    let targets = Mat::new(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
    estimate_gradient(&mut g, &mut n, &inputs, &targets, &Sigmoid, 0.01).unwrap();
    estimate_gradient_par(&mut g_par, &mut n, &inputs, &targets, &Sigmoid, 0.01).unwrap();
    for (a, b) in g.params().iter().zip(g_par.params()) {
      assert_relative_eq!(*a, b, epsilon = 1e-12);
    }
  }
}
