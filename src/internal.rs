use rand::Rng;

use crate::{
  error::{ Error, Result },
  scalar::{ Inner, Numeric, Real },
};


/// Allocate a buffer of `len` copies of `filler`, reporting failure
/// instead of aborting.

pub fn alloc<T: Inner>(len: usize, filler: T) -> Result<Vec<T>> {
  let mut data = Vec::new();
  data.try_reserve_exact(len).map_err(|_| Error::Allocation { elements: len })?;
  data.resize(len, filler);
  Ok(data)
}


/// Element count of a `rows x cols` matrix, failing where it does not fit in memory.

pub fn area(rows: usize, cols: usize) -> Result<usize> {
  rows.checked_mul(cols).ok_or(Error::Allocation { elements: usize::MAX })
}


// Uniform sample, scaled into [low, high]

pub fn uniform<T: Numeric>(rng: &mut impl Rng, low: T, high: T) -> T {
  let unit: f64 = rng.gen();
  T::from(unit).map(|u| u * (high - low) + low ).unwrap_or(low)
}


pub fn count<T: Real>(n: usize) -> T {
  T::from(n).unwrap_or_else(T::nan)
}

pub fn constant<T: Real>(x: f64) -> T {
  T::from(x).unwrap_or_else(T::nan)
}


#[cfg(test)]
mod tests {
  use super::*;
  use rand::{ SeedableRng, rngs::StdRng };

  #[test]
  fn alloc_fills() {
    assert_eq!(alloc(3, 1.5).unwrap(), vec![1.5, 1.5, 1.5]);
    assert!(alloc(0, 0u8).unwrap().is_empty());
  }

  #[test]
  fn alloc_failure() {
    assert!(matches!(alloc(usize::MAX, 0.0f64), Err(Error::Allocation { .. })));
  }

  #[test]
  fn area_overflow() {
    assert_eq!(area(3, 4).unwrap(), 12);
    assert!(matches!(area(1 << 33, 1 << 32), Err(Error::Allocation { .. })));
  }

  #[test]
  fn uniform_range() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
      let x = uniform(&mut rng, -2.0, 3.0);
      assert!(x >= -2.0 && x <= 3.0);
    }
    assert_eq!(uniform(&mut rng, 4.0, 4.0), 4.0);
  }
}
