//! Tiny feed-forward neural networks on strided matrix views.
//! Few dependencies. CPU only. Runs on stable Rust.
//!
//! # Features
//!
//! - **Zero-copy views.** A [Mat] is a window into a shared buffer. Rows,
//! sub-matrices and carved regions address the same storage without copying.
//!
//! - **Arena networks.** A [Net] can be carved out of two caller-provided buffers,
//! one for weights and biases and one for activations. Offsets follow from the
//! [Layout] alone and the resulting views are checked not to overlap.
//!
//! - **Gradient-free training.** Gradients are estimated by forward differences,
//! one parameter at a time, and applied by plain gradient descent.
//!
//! - **Checked operations.** Incompatible shapes, overlapping outputs and
//! undersized buffers are reported as [Error]s instead of silently corrupting memory.
//!
//! # Examples
//!
//! Learning a logical AND gate:
//! ```
//! use micronet::{ Dataset, Layout, Net, Sigmoid, TrainConfig, Trainer, ForwardDifference };
//! use rand::{ SeedableRng, rngs::StdRng };
//!
//! fn main() -> micronet::Result<()> {
//!   let data = Dataset::<f64>::from_rows(2, 1, &[
//!     [0.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [1.0, 1.0, 1.0],
//!   ])?;
//!   let (inputs, targets) = data.split();
//!
//!   // Weights, biases and activations carved from two flat buffers
//!   let mut net = Net::arena(&Layout::new(2, &[1])?)?;
//!   net.randomize(&mut StdRng::seed_from_u64(1), 0.0, 1.0);
//!
//!   let config = TrainConfig { iterations: 2000, ..Default::default() };
//!   let history = Trainer::new(config, ForwardDifference)?
//!     .fit(&mut net, &inputs, &targets, &Sigmoid)?;
//!   assert!(history.last() < history.initial());
//!   Ok(())
//! }
//! ```
//!
//! Any `Fn(T) -> T` can serve as the activation:
//! ```rust
//! use micronet::{ Layout, Mat, Net };
//!
//! let mut net = Net::<f32>::alloc(&Layout::new(3, &[2]).unwrap()).unwrap();
//! net.fill(0.5);
//! let out = net.forward(&Mat::vec(&[1.0, 2.0, 3.0]), &|x: f32| x.max(0.0)).unwrap();
//! assert_eq!(out.to_vec(), vec![3.5, 3.5]);
//! ```
//!
//! ## More examples
//! Check the `/demos` folder for more example code.
//!
//!
//! # Optional features
//!
//! Some features can be toggled in your `Cargo.toml`.
//!
//! - `unsafe` *(default)*: Accelerated matrix math using [matrixmultiply] crate.
//! - `rayon`: Gradient estimation spread over the [rayon] thread pool.

mod internal;
mod shape;
mod mat;
mod layout;
mod network;
mod config;
mod dataset;

pub mod error;
pub mod ops;
pub mod scalar;
pub mod activation;
pub mod finite_diff;
pub mod optimize;

pub use shape::Shape;
pub use mat::{ Mat, MatIterator, Named };
pub use layout::{ Layout, LayerOffsets };
pub use network::{ Net, Layer, Arena };
pub use config::TrainConfig;
pub use dataset::Dataset;
pub use error::{ Error, Result };
pub use activation::{ Activation, Sigmoid, Identity };
pub use finite_diff::estimate_gradient;
pub use optimize::{ Trainer, Strategy, ForwardDifference, History, Checkpoint };

#[cfg(feature = "rayon")]
pub use optimize::ParallelForwardDifference;
