use crate::scalar::Real;


/// Scalar transform applied element-wise to every layer's output.
///
/// Implemented for any `Fn(T) -> T`, so plain closures and functions
/// can be passed wherever an activation is expected.

pub trait Activation<T> {
  fn apply(&self, x: T) -> T;
}

impl<T, F: Fn(T) -> T> Activation<T> for F {
  fn apply(&self, x: T) -> T {
    self(x)
  }
}


/// Logistic function in the form `1 / (1 + e^x)`.
///
/// Note the positive exponent: this saturates towards 1 for large negative
/// inputs and towards 0 for large positive ones, the mirror image of the
/// textbook `1 / (1 + e^-x)`. Trained weights come out with the opposite sign
/// compared to the textbook form.

#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl<T: Real> Activation<T> for Sigmoid {
  fn apply(&self, x: T) -> T {
    T::one() / (T::one() + x.exp())
  }
}


/// Leaves values untouched, turning every layer into a pure affine map.

#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> Activation<T> for Identity {
  fn apply(&self, x: T) -> T {
    x
  }
}
