use std::fmt;
use std::io;


/// Everything that can go wrong when building, running or training a network.

#[derive(Debug)]
pub enum Error {
  /// Operand dimensions are incompatible for an operation.
  ShapeMismatch {
    op: &'static str,
    expected: (usize, usize),
    got: (usize, usize),
  },

  /// A view would reach past the end of its backing buffer.
  OutOfBounds {
    what: &'static str,
    needed: usize,
    len: usize,
  },

  /// A caller-provided arena does not have the size the layout requires.
  BufferSize {
    what: &'static str,
    expected: usize,
    got: usize,
  },

  /// An output view overlaps one of the views it is computed from.
  Aliasing { op: &'static str },

  /// A backing buffer could not be allocated.
  Allocation { elements: usize },

  /// Rejected before any computation started.
  InvalidConfig(String),

  /// A dataset ended early or contained something other than numbers.
  NoData(String),

  Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub(crate) fn shape(op: &'static str, expected: (usize, usize), got: (usize, usize)) -> Self {
    Self::ShapeMismatch { op, expected, got }
  }

  pub(crate) fn config(msg: impl Into<String>) -> Self {
    Self::InvalidConfig(msg.into())
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::ShapeMismatch { op, expected, got } => write!(f,
        "shape mismatch in {op}: expected {}x{}, got {}x{}",
        expected.0, expected.1, got.0, got.1),
      Self::OutOfBounds { what, needed, len } =>
        write!(f, "{what} needs {needed} elements but the buffer holds {len}"),
      Self::BufferSize { what, expected, got } =>
        write!(f, "{what} buffer holds {got} elements, layout requires {expected}"),
      Self::Aliasing { op } => write!(f, "output of {op} overlaps one of its operands"),
      Self::Allocation { elements } => write!(f, "could not allocate {elements} elements"),
      Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
      Self::NoData(msg) => write!(f, "no data: {msg}"),
      Self::Io(e) => write!(f, "io error: {e}"),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for Error {
  fn from(e: io::Error) -> Self {
    Self::Io(e)
  }
}
