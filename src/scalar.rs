use rand::distributions::uniform::SampleUniform;
use num_traits::{ Float, NumAssignOps, Num, NumCast };

use crate::ops::Cops;


/// All types that may be stored in a [Mat](crate::Mat).
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Inner: PartialEq + Clone + Copy + Send + Sync + std::fmt::Debug {}
impl<T: PartialEq + Clone + Copy + Send + Sync + std::fmt::Debug> Inner for T {}


/// All numeric types.
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Numeric: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum {}
impl<T: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum> Numeric for T {}


/// Continuous numeric types that networks can be built from.
///
/// Implemented for `f32` and `f64`, the two types with a
/// matrix multiplication kernel.

pub trait Real: Numeric + Float + SampleUniform + std::fmt::Display + Cops {}
impl<T: Numeric + Float + SampleUniform + std::fmt::Display + Cops> Real for T {}
