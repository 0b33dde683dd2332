use itertools::Itertools;

use crate::error::{ Error, Result };


/// Input width plus the output width of every layer.
///
/// Layer `i` maps `inputs(i)` values to `widths[i]` values, where
/// `inputs(0)` is the network input and `inputs(i + 1) == widths[i]`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  input: usize,
  widths: Vec<usize>,
}

/// Where one layer's views start inside the shared parameter
/// and activation buffers.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerOffsets {
  pub inputs: usize,
  pub outputs: usize,
  pub weights: usize,
  pub bias: usize,
  pub out: usize,
}

impl Layout {
  pub fn new(input: usize, widths: &[usize]) -> Result<Self> {
    if widths.is_empty() {
      return Err(Error::config("a network needs at least one layer"))
    }
    if input == 0 {
      return Err(Error::config("input width must be positive"))
    }
    if let Some(layer) = widths.iter().position(|&w| w == 0 ) {
      return Err(Error::config(format!("layer {layer} has zero width")))
    }
    let layout = Self { input, widths: widths.to_vec() };
    if layout.checked_counts().is_none() {
      return Err(Error::config(format!("layout {layout} needs more elements than can be addressed")))
    }
    Ok(layout)
  }

  // Parameter and activation counts, unless either overflows
  fn checked_counts(&self) -> Option<(usize, usize)> {
    let params = self.layer_dims().try_fold(0usize, |total, (i, o)| {
      i.checked_mul(o)?.checked_add(o)?.checked_add(total)
    })?;
    let acts = self.widths.iter().try_fold(0usize, |total, &w| total.checked_add(w) )?;
    Some((params, acts))
  }

  pub fn input(&self) -> usize {
    self.input
  }

  pub fn output(&self) -> usize {
    self.widths[self.widths.len() - 1]
  }

  pub fn widths(&self) -> &[usize] {
    &self.widths
  }

  pub fn depth(&self) -> usize {
    self.widths.len()
  }

  /// `(inputs, outputs)` of every layer.

  pub fn layer_dims(&self) -> impl Iterator<Item=(usize, usize)> + '_ {
    std::iter::once(&self.input)
      .chain(self.widths.iter())
      .copied()
      .tuple_windows()
  }

  /// Number of weights and biases over all layers.

  pub fn param_count(&self) -> usize {
    self.layer_dims().map(|(i, o)| i * o + o ).sum()
  }

  /// Number of activation values over all layers.

  pub fn activation_count(&self) -> usize {
    self.widths.iter().sum()
  }

  /// Buffer offsets of every layer, derived from the widths alone.
  ///
  /// Weights of layer `i` are followed by its biases, which are followed
  /// by the weights of layer `i + 1`. Activations are packed back to back.

  pub fn offsets(&self) -> Vec<LayerOffsets> {
    let mut params = 0;
    let mut acts = 0;
    self.layer_dims().map(|(inputs, outputs)| {
      let offsets = LayerOffsets {
        inputs,
        outputs,
        weights: params,
        bias: params + inputs * outputs,
        out: acts,
      };
      params += inputs * outputs + outputs;
      acts += outputs;
      offsets
    }).collect()
  }
}

impl std::fmt::Display for Layout {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{} -> {}", self.input, self.widths.iter().join(" -> "))
  }
}
