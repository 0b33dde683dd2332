//! Matrix operations.
//!
//! Every operation takes explicit-shape views and writes through them into
//! the backing buffers. Shapes are never broadcast or resized: incompatible
//! operands are reported as [Error::ShapeMismatch].

use rand::Rng;

use crate::{
  internal::*,
  error::{ Error, Result },
  mat::Mat,
  scalar::{ Inner, Numeric, Real },
  activation::Activation,
};


/// One operand of a matrix multiplication: a buffer plus the placement
/// of a strided matrix inside it.

#[derive(Debug, Clone, Copy)]
pub struct Operand<'a, T> {
  pub data: &'a [T],
  pub offset: usize,
  pub stride: usize,
}


/// Low-level compute operations.

pub trait Cops: Numeric {
  /// Multiply the `m x k` operand `a` with the `k x n` operand `b`,
  /// returning the dense `m x n` product.
  fn gemm(m: usize, k: usize, n: usize, a: Operand<Self>, b: Operand<Self>) -> Vec<Self>;
}


pub fn fill<T: Inner>(m: &Mat<T>, value: T) {
  m.refill(value)
}

pub fn copy<T: Inner>(dst: &Mat<T>, src: &Mat<T>) -> Result<()> {
  dst.feed(src)
}

/// Fill with uniform samples between `low` and `high`.

pub fn randomize<T: Numeric>(m: &Mat<T>, rng: &mut impl Rng, low: T, high: T) {
  m.vectorize(|_| uniform(&mut *rng, low, high) )
}

pub fn apply<T: Inner, F: Activation<T> + ?Sized>(m: &Mat<T>, f: &F) {
  m.vectorize(|x| f.apply(x) )
}

/// `out += m`

pub fn sum<T: Numeric>(out: &Mat<T>, m: &Mat<T>) -> Result<()> {
  if out.dims() != m.dims() {
    return Err(Error::shape("sum", out.dims(), m.dims()))
  }
  // Avoid clashing borrow when views share storage
  let m = if out.shares(m) { m.detach() } else { m.clone() };
  let mut data = out.raw_mut();
  for (i, value) in out.shape().iter().zip(m.iter()) {
    data[i] += value;
  }
  Ok(())
}

/// `out = a · b`
///
/// `a` and `b` may live in the same buffer as `out`, but must not overlap it.

pub fn dot<T: Real>(out: &Mat<T>, a: &Mat<T>, b: &Mat<T>) -> Result<()> {
  if a.cols() != b.rows() {
    return Err(Error::shape("dot", (a.cols(), b.cols()), b.dims()))
  }
  let expected = (a.rows(), b.cols());
  if out.dims() != expected {
    return Err(Error::shape("dot", expected, out.dims()))
  }
  if out.overlaps(a) || out.overlaps(b) {
    return Err(Error::Aliasing { op: "dot" })
  }
  let (m, k, n) = (a.rows(), a.cols(), b.cols());
  let product = if m == 0 || n == 0 {
    vec![]
  } else if k == 0 {
    vec![T::zero(); m * n]
  } else {
    let data_a = a.raw();
    let data_b = b.raw();
    T::gemm(m, k, n,
      Operand { data: &data_a, offset: a.shape().offset(), stride: a.stride() },
      Operand { data: &data_b, offset: b.shape().offset(), stride: b.stride() },
    )
  };
  let mut data = out.raw_mut();
  for (i, value) in out.shape().iter().zip(product) {
    data[i] = value;
  }
  Ok(())
}
