use itertools::{ Itertools, EitherOrBoth };
use log::{ debug, trace };
use rand::Rng;

use crate::{
  internal::*,
  error::{ Error, Result },
  layout::Layout,
  mat::{ Mat, Named },
  scalar::{ Inner, Numeric, Real },
  activation::Activation,
  ops,
};


/// Views making up one dense layer.
///
/// `weights` is `inputs x outputs`, `bias` and `out` are `1 x outputs`.
/// `out` is scratch space, overwritten by every forward pass.

#[derive(Debug, Clone)]
pub struct Layer<T: Inner> {
  pub weights: Mat<T>,
  pub bias: Mat<T>,
  pub out: Mat<T>,
}

impl<T: Inner> Layer<T> {
  fn views(&self) -> [&Mat<T>; 3] {
    [&self.weights, &self.bias, &self.out]
  }
}


/// The two buffers an arena-backed network is carved from.

#[derive(Debug, Clone)]
pub struct Arena<T: Inner> {
  pub params: Mat<T>,
  pub acts: Mat<T>,
}

impl<T: Numeric> Arena<T> {
  /// Allocate buffers sized exactly for `layout`.

  pub fn new(layout: &Layout) -> Result<Self> {
    Ok(Self {
      params: Mat::zeros(1, layout.param_count())?,
      acts: Mat::zeros(1, layout.activation_count())?,
    })
  }
}


/// Feed-forward network made of dense layers.
///
/// The layers either own separate buffers ([alloc](Net::alloc)) or are
/// windows into two shared arenas ([carve](Net::carve)). Either way, the
/// network keeps its buffers alive for as long as it exists.

#[derive(Debug)]
pub struct Net<T: Inner> {
  layout: Layout,
  layers: Vec<Layer<T>>,
}

impl<T: Inner> Net<T> {
  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  pub fn layers(&self) -> &[Layer<T>] {
    &self.layers
  }

  /// Output of the most recent forward pass.

  pub fn output(&self) -> &Mat<T> {
    &self.layers[self.layers.len() - 1].out
  }

  /// Every weight, bias and activation view.

  pub fn views(&self) -> impl Iterator<Item=&Mat<T>> + Clone {
    self.layers.iter().flat_map(|layer| layer.views() )
  }

  /// Weight and bias views in buffer order.

  pub fn param_views(&self) -> impl Iterator<Item=&Mat<T>> + Clone {
    self.layers.iter().flat_map(|layer| [&layer.weights, &layer.bias] )
  }

  /// Fail unless no two views of this network overlap.

  pub fn check_disjoint(&self) -> Result<()> {
    if self.views().tuple_combinations().any(|(a, b)| a.overlaps(b) ) {
      return Err(Error::Aliasing { op: "network layout" })
    }
    Ok(())
  }

  /// Whether any view of this network overlaps any view of `other`.

  pub fn overlaps(&self, other: &Self) -> bool {
    self.views().cartesian_product(other.views().collect_vec()).any(|(a, b)| a.overlaps(b) )
  }

  /// Fail unless both networks have the same layer shapes.

  pub fn check_topology(&self, other: &Self) -> Result<()> {
    for pair in self.layout.layer_dims().zip_longest(other.layout.layer_dims()) {
      match pair {
        EitherOrBoth::Both(a, b) if a == b => continue,
        EitherOrBoth::Both(a, b) => return Err(Error::shape("topology", a, b)),
        EitherOrBoth::Left(a) => return Err(Error::shape("topology", a, (0, 0))),
        EitherOrBoth::Right(b) => return Err(Error::shape("topology", (0, 0), b)),
      }
    }
    Ok(())
  }

  /// Copy of all weights and biases, laid out like a parameter arena.

  pub fn params(&self) -> Vec<T> {
    self.param_views().flat_map(|view| view.to_vec() ).collect()
  }

  /// Overwrite all weights and biases from a parameter arena snapshot.

  pub fn load_params(&mut self, params: &[T]) -> Result<()> {
    let expected = self.layout.param_count();
    if params.len() != expected {
      return Err(Error::BufferSize { what: "parameter", expected, got: params.len() })
    }
    let mut rest = params;
    for view in self.param_views() {
      let (head, tail) = rest.split_at(view.size());
      let mut values = head.iter();
      view.vectorize(|x| values.next().copied().unwrap_or(x) );
      rest = tail;
    }
    Ok(())
  }

  pub fn fill(&mut self, value: T) {
    for view in self.views() {
      ops::fill(view, value);
    }
  }
}

impl<T: Numeric> Net<T> {
  /// Network whose every view owns a separate buffer.

  pub fn alloc(layout: &Layout) -> Result<Self> {
    let layers = layout.layer_dims()
      .map(|(inputs, outputs)| -> Result<Layer<T>> {
        Ok(Layer {
          weights: Mat::zeros(inputs, outputs)?,
          bias: Mat::zeros(1, outputs)?,
          out: Mat::zeros(1, outputs)?,
        })
      })
      .collect::<Result<_>>()?;
    debug!("allocated {} network with {} parameters", layout, layout.param_count());
    Ok(Self { layout: layout.clone(), layers })
  }

  /// Network carved from freshly allocated arenas.

  pub fn arena(layout: &Layout) -> Result<Self> {
    let arena = Arena::new(layout)?;
    Self::carve(layout, &arena.params, &arena.acts)
  }

  /// Network made of windows into caller-provided buffers.
  ///
  /// `params` must hold exactly [Layout::param_count] elements and
  /// `acts` exactly [Layout::activation_count]. Every offset is computed
  /// from the layout's widths; the views themselves are never used to
  /// locate the next one.

  pub fn carve(layout: &Layout, params: &Mat<T>, acts: &Mat<T>) -> Result<Self> {
    let expected = layout.param_count();
    if params.size() != expected {
      return Err(Error::BufferSize { what: "parameter", expected, got: params.size() })
    }
    let expected = layout.activation_count();
    if acts.size() != expected {
      return Err(Error::BufferSize { what: "activation", expected, got: acts.size() })
    }
    let layers = layout.offsets().into_iter()
      .map(|o| -> Result<Layer<T>> {
        Ok(Layer {
          weights: params.carve(o.weights, o.inputs, o.outputs)?,
          bias: params.carve(o.bias, 1, o.outputs)?,
          out: acts.carve(o.out, 1, o.outputs)?,
        })
      })
      .collect::<Result<_>>()?;
    let net = Self { layout: layout.clone(), layers };
    net.check_disjoint()?;
    debug!("carved {} network with {} parameters", layout, expected);
    Ok(net)
  }

  /// Fill weights and biases with uniform samples between `low` and `high`.

  pub fn randomize(&mut self, rng: &mut impl Rng, low: T, high: T) {
    for view in self.param_views() {
      ops::randomize(view, rng, low, high);
    }
  }
}

impl<T: Real> Net<T> {
  /// Run one `1 x input` row through every layer and return the output view.
  ///
  /// The returned view aliases the last layer's activations and stays valid
  /// until the next forward pass.

  pub fn forward<F: Activation<T> + ?Sized>(&mut self, input: &Mat<T>, f: &F) -> Result<Mat<T>> {
    let expected = (1, self.layout.input());
    if input.dims() != expected {
      return Err(Error::shape("forward", expected, input.dims()))
    }
    for (i, layer) in self.layers.iter().enumerate() {
      let prev = if i == 0 { input } else { &self.layers[i - 1].out };
      ops::dot(&layer.out, prev, &layer.weights)?;
      ops::sum(&layer.out, &layer.bias)?;
      ops::apply(&layer.out, f);
      trace!("layer {i}: {:?}", layer.out.to_vec());
    }
    Ok(self.output().clone())
  }

  /// Mean squared error over a batch, averaged per output and per row.
  ///
  /// Overwrites every layer's activations.

  pub fn cost<F: Activation<T> + ?Sized>(&mut self, inputs: &Mat<T>, targets: &Mat<T>, f: &F) -> Result<T> {
    if inputs.cols() != self.layout.input() {
      return Err(Error::shape("cost inputs", (inputs.rows(), self.layout.input()), inputs.dims()))
    }
    if targets.dims() != (inputs.rows(), self.layout.output()) {
      return Err(Error::shape("cost targets", (inputs.rows(), self.layout.output()), targets.dims()))
    }
    if inputs.rows() == 0 {
      return Err(Error::config("cannot compute cost over an empty batch"))
    }
    let mut result = T::zero();
    for i in 0..inputs.rows() {
      let output = self.forward(&inputs.row(i)?, f)?;
      let target = targets.row(i)?;
      let total: T = output.iter()
        .zip(target.iter())
        .map(|(y, t)| (y - t) * (y - t) )
        .sum();
      result += total / count(target.cols());
    }
    Ok(result / count(inputs.rows()))
  }

  /// Gradient descent step: `param -= rate * gradient` for every weight and bias.

  pub fn learn(&mut self, g: &Self, rate: T) -> Result<()> {
    if rate == T::zero() || !rate.is_finite() {
      return Err(Error::config(format!("learning rate must be finite and non-zero, got {rate}")))
    }
    self.check_topology(g)?;
    if self.overlaps(g) {
      return Err(Error::Aliasing { op: "learn" })
    }
    for (param, grad) in self.param_views().zip(g.param_views()) {
      let mut grad = grad.to_vec().into_iter();
      param.vectorize(|p| p - rate * grad.next().unwrap_or(T::zero()) );
    }
    Ok(())
  }
}

impl<T: Inner + std::fmt::Display> Net<T> {
  /// Display under a `Network: name` heading.

  pub fn named<'a>(&'a self, name: &'a str) -> Named<'a, Self> {
    Named { kind: "Network", name, item: self }
  }
}

impl<T: Inner + std::fmt::Display> std::fmt::Display for Net<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    use std::fmt::Display;
    for (i, layer) in self.layers.iter().enumerate() {
      writeln!(f, "Layer {i}:")?;
      layer.weights.named("Weights").fmt(f)?;
      layer.bias.named("Biases").fmt(f)?;
      layer.out.named("Outputs").fmt(f)?;
    }
    Ok(())
  }
}
