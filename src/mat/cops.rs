use crate::{
  scalar::Numeric,
  ops::{ Cops, Operand },
};


fn check_operand<T>(rows: usize, cols: usize, op: &Operand<T>) {
  assert!(op.offset + (rows - 1) * op.stride + cols <= op.data.len(),
    "{}x{} operand with stride {} overruns its buffer", rows, cols, op.stride);
}

// Reference kernel for any numeric type

#[allow(dead_code)]
pub(crate) fn matmul<T: Numeric>(m: usize, k: usize, n: usize, a: Operand<T>, b: Operand<T>) -> Vec<T> {
  check_operand(m, k, &a);
  check_operand(k, n, &b);
  let mut data = vec![T::zero(); m * n];
  for i in 0..m {
    for j in 0..n {
      for l in 0..k {
        data[i * n + j] +=
          a.data[a.offset + i * a.stride + l] *
          b.data[b.offset + l * b.stride + j];
      }
    }
  }
  data
}

macro_rules! impl_cops {
  ($t:ty, $gemm:ident) => {
    impl Cops for $t {
      #[cfg(feature = "unsafe")]
      fn gemm(m: usize, k: usize, n: usize, a: Operand<$t>, b: Operand<$t>) -> Vec<$t> {
        check_operand(m, k, &a);
        check_operand(k, n, &b);
        let mut data = vec![0.0; m * n];
        // Operands were bounds checked above
        unsafe {
          matrixmultiply::$gemm(
            m,
            k,
            n,
            1.0,
            a.data.as_ptr().add(a.offset),
            a.stride as isize,
            1,
            b.data.as_ptr().add(b.offset),
            b.stride as isize,
            1,
            0.0,
            data.as_mut_ptr(),
            n as isize,
            1,
          );
        }
        data
      }

      #[cfg(not(feature = "unsafe"))]
      fn gemm(m: usize, k: usize, n: usize, a: Operand<$t>, b: Operand<$t>) -> Vec<$t> {
        matmul(m, k, n, a, b)
      }
    }
  };
}

impl_cops!(f32, sgemm);
impl_cops!(f64, dgemm);
