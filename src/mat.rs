use std::rc::Rc;
use std::cell::{ Ref, RefCell, RefMut };

mod cops;

use crate::{
  internal::*,
  error::{ Error, Result },
  shape::Shape,
  scalar::{ Inner, Numeric },
};


/// Rectangular view over a shared element buffer.
///
/// A root matrix owns its buffer. Views produced by [row](Mat::row),
/// [sub](Mat::sub) and [carve](Mat::carve) share it without copying,
/// so writes through one view are visible through every other view
/// of the same region. Cloning a `Mat` clones the view, not the data;
/// use [detach](Mat::detach) for a deep copy.

#[derive(Debug, Clone)]
pub struct Mat<T: Inner> {
  shape: Shape,
  data: Rc<RefCell<Vec<T>>>,
}

impl<T: Inner> PartialEq for Mat<T> {
  fn eq(&self, rhs: &Self) -> bool {
    if self.rows() != rhs.rows() || self.cols() != rhs.cols() { return false }
    let data_l = self.data.borrow();
    let data_r = rhs.data.borrow();
    self.shape.iter()
      .zip(rhs.shape.iter())
      .all(|(i, j)| data_l[i] == data_r[j] )
  }
}

impl<T: Inner> Mat<T> {
  pub fn from_shape(shape: Shape, data: Vec<T>) -> Result<Self> {
    if !shape.well_formed() {
      return Err(Error::OutOfBounds { what: "row stride", needed: shape.cols, len: shape.stride })
    }
    let needed = shape.checked_extent().unwrap_or(usize::MAX);
    if needed > data.len() {
      return Err(Error::OutOfBounds { what: "view", needed, len: data.len() })
    }
    Ok(Self { shape, data: Rc::new(RefCell::new(data)) })
  }

  pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
    let expected = area(rows, cols)?;
    if data.len() != expected {
      return Err(Error::BufferSize { what: "matrix", expected, got: data.len() })
    }
    Self::from_shape(Shape::new(rows, cols), data)
  }

  /// Single row matrix.

  pub fn vec(vec: &[T]) -> Self {
    Self {
      shape: Shape::new(1, vec.len()),
      data: Rc::new(RefCell::new(vec.to_vec())),
    }
  }

  pub fn filled(rows: usize, cols: usize, filler: T) -> Result<Self> {
    Self::new(rows, cols, alloc(area(rows, cols)?, filler)?)
  }

  pub fn shape(&self) -> &Shape {
    &self.shape
  }

  pub fn rows(&self) -> usize {
    self.shape.rows
  }

  pub fn cols(&self) -> usize {
    self.shape.cols
  }

  pub fn stride(&self) -> usize {
    self.shape.stride
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn dims(&self) -> (usize, usize) {
    (self.shape.rows, self.shape.cols)
  }

  pub fn raw(&self) -> Ref<Vec<T>> {
    self.data.borrow()
  }

  pub(crate) fn raw_mut(&self) -> RefMut<Vec<T>> {
    self.data.borrow_mut()
  }

  /// Whether both views are backed by the same buffer.

  pub fn shares(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.data, &other.data)
  }

  /// Whether writing through one view could change what the other reads.

  pub fn overlaps(&self, other: &Self) -> bool {
    self.shares(other) && self.shape.overlaps(&other.shape)
  }

  pub fn at(&self, i: usize, j: usize) -> T {
    self.check_index(i, j);
    self.data.borrow()[self.shape.index(i, j)]
  }

  pub fn set(&self, i: usize, j: usize, value: T) {
    self.check_index(i, j);
    self.data.borrow_mut()[self.shape.index(i, j)] = value;
  }

  fn check_index(&self, i: usize, j: usize) {
    assert!(i < self.rows() && j < self.cols(),
      "Index ({}, {}) out of bounds for {}", i, j, self.shape);
  }

  /// Zero-copy view of row `i`.

  pub fn row(&self, i: usize) -> Result<Self> {
    if i >= self.rows() {
      return Err(Error::OutOfBounds { what: "row", needed: i + 1, len: self.rows() })
    }
    Ok(self.view(self.shape.row(i)))
  }

  /// Zero-copy window of `rows x cols` elements starting at `(row, col)`.
  /// The window keeps this matrix' stride.

  pub fn sub(&self, row: usize, col: usize, rows: usize, cols: usize) -> Result<Self> {
    let needed = row.checked_add(rows).unwrap_or(usize::MAX);
    if needed > self.rows() {
      return Err(Error::OutOfBounds { what: "sub-view rows", needed, len: self.rows() })
    }
    let needed = col.checked_add(cols).unwrap_or(usize::MAX);
    if needed > self.cols() {
      return Err(Error::OutOfBounds { what: "sub-view columns", needed, len: self.cols() })
    }
    Ok(self.view(self.shape.sub(row, col, rows, cols)))
  }

  /// Zero-copy dense `rows x cols` matrix over the elements
  /// `start..start + rows * cols` of this contiguous view.

  pub fn carve(&self, start: usize, rows: usize, cols: usize) -> Result<Self> {
    if !self.shape.contiguous() {
      return Err(Error::config(format!("cannot carve from strided {}", self.shape)))
    }
    let needed = rows.checked_mul(cols)
      .and_then(|size| size.checked_add(start) )
      .unwrap_or(usize::MAX);
    if needed > self.size() {
      return Err(Error::OutOfBounds { what: "carved view", needed, len: self.size() })
    }
    Ok(self.view(self.shape.carve(start, rows, cols)))
  }

  fn view(&self, shape: Shape) -> Self {
    debug_assert!(shape.extent() <= self.data.borrow().len());
    Self { shape, data: self.data.clone() }
  }

  pub fn iter(&self) -> MatIterator<T> {
    MatIterator::new(self)
  }

  pub fn row_iter(&self) -> impl Iterator<Item=Self> + '_ {
    (0..self.rows()).map(move |i| self.view(self.shape.row(i)) )
  }

  /// Elements in row-major order, without stride gaps.

  pub fn to_vec(&self) -> Vec<T> {
    self.iter().collect()
  }

  /// Deep copy into a fresh, dense buffer.

  pub fn detach(&self) -> Self {
    Self {
      shape: Shape::new(self.rows(), self.cols()),
      data: Rc::new(RefCell::new(self.to_vec())),
    }
  }

  /// Overwrite every element of this view with the matching one from `other`.

  pub fn feed(&self, other: &Self) -> Result<()> {
    if self.dims() != other.dims() {
      return Err(Error::shape("copy", self.dims(), other.dims()))
    }
    // Avoid clashing borrow when views share storage
    let other = if self.shares(other) { other.detach() } else { other.clone() };
    let mut data = self.data.borrow_mut();
    let other_data = other.data.borrow();
    for (i, j) in self.shape.iter().zip(other.shape.iter()) {
      data[i] = other_data[j];
    }
    Ok(())
  }

  pub fn refill(&self, filler: T) {
    let mut data = self.data.borrow_mut();
    for i in self.shape.iter() {
      data[i] = filler;
    }
  }

  pub fn vectorize(&self, mut cb: impl FnMut(T) -> T) {
    let mut data = self.data.borrow_mut();
    for i in self.shape.iter() {
      let value = cb(data[i]);
      data[i] = value;
    }
  }
}

impl<T: Numeric> Mat<T> {
  pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
    Self::filled(rows, cols, T::zero())
  }
}

impl<T: Inner + std::fmt::Display> Mat<T> {
  /// Display under a `Matrix: name` heading.

  pub fn named<'a>(&'a self, name: &'a str) -> Named<'a, Self> {
    Named { kind: "Matrix", name, item: self }
  }
}

/// One `{ a b c }` line per row. A precision given to the formatter,
/// as in `{:.6}`, applies to every element.

impl<T: Inner + std::fmt::Display> std::fmt::Display for Mat<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    for row in self.row_iter() {
      write!(f, "{{ ")?;
      for x in row.iter() {
        match f.precision() {
          Some(p) => write!(f, "{x:.p$} ")?,
          None => write!(f, "{x} ")?,
        }
      }
      writeln!(f, "}}")?;
    }
    Ok(())
  }
}


/// A value printed below a `Kind: name` heading line.

pub struct Named<'a, D: ?Sized> {
  pub(crate) kind: &'static str,
  pub(crate) name: &'a str,
  pub(crate) item: &'a D,
}

impl<D: std::fmt::Display + ?Sized> std::fmt::Display for Named<'_, D> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    writeln!(f, "{}: {}", self.kind, self.name)?;
    std::fmt::Display::fmt(self.item, f)
  }
}


pub struct MatIterator<'a, T: Inner> {
  data: Ref<'a, Vec<T>>,
  shape_iter: Box<dyn Iterator<Item=usize> + 'a>,
}

impl<'a, T: Inner> MatIterator<'a, T> {
  fn new(mat: &'a Mat<T>) -> Self {
    Self {
      data: mat.data.borrow(),
      shape_iter: mat.shape.iter(),
    }
  }
}

impl<T: Inner> Iterator for MatIterator<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<Self::Item> {
    self.shape_iter.next().map(|i| self.data[i] )
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn grid() -> Mat<i32> {
    Mat::new(3, 4, (0..12).collect()).unwrap()
  }

  #[test]
  fn construct() {
    assert!(matches!(Mat::new(2, 2, vec![1, 2, 3]), Err(Error::BufferSize { expected: 4, got: 3, .. })));
    assert!(matches!(Mat::new(usize::MAX, 2, vec![1]), Err(Error::Allocation { .. })));
    assert!(matches!(Mat::from_shape(Shape::strided(2, 2, 3, 1), vec![0; 5]), Err(Error::OutOfBounds { .. })));
    assert!(Mat::from_shape(Shape::strided(2, 2, 3, 1), vec![0; 6]).is_ok());
  }

  #[test]
  fn index() {
    let m = grid();
    assert_eq!(m.at(0, 0), 0);
    assert_eq!(m.at(2, 1), 9);
    m.set(1, 3, 42);
    assert_eq!(m.raw()[7], 42);
  }

  #[test]
  #[should_panic]
  fn index_out_of_bounds() {
    grid().at(3, 0);
  }

  #[test]
  fn row_is_zero_copy() {
    let m = grid();
    let row = m.row(1).unwrap();
    assert_eq!(row.to_vec(), vec![4, 5, 6, 7]);
    row.set(0, 2, -1);
    assert_eq!(m.at(1, 2), -1);
    assert!(row.shares(&m));
    assert!(m.row(3).is_err());
  }

  #[test]
  fn sub_keeps_stride() {
    let m = grid();
    let s = m.sub(1, 1, 2, 2).unwrap();
    assert_eq!(s.stride(), 4);
    assert_eq!(s.to_vec(), vec![5, 6, 9, 10]);
    assert_eq!(s.row(1).unwrap().to_vec(), vec![9, 10]);
    s.refill(0);
    assert_eq!(m.to_vec(), vec![0, 1, 2, 3, 4, 0, 0, 7, 8, 0, 0, 11]);
    assert!(m.sub(2, 0, 2, 1).is_err());
    assert!(m.sub(0, 3, 1, 2).is_err());
  }

  #[test]
  fn carve() {
    let arena = Mat::new(1, 10, (0..10).collect()).unwrap();
    let a = arena.carve(0, 2, 3).unwrap();
    let b = arena.carve(6, 1, 4).unwrap();
    assert_eq!(a.to_vec(), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(b.to_vec(), vec![6, 7, 8, 9]);
    assert!(!a.overlaps(&b));
    assert!(matches!(arena.carve(7, 1, 4), Err(Error::OutOfBounds { needed: 11, len: 10, .. })));
    assert!(grid().sub(0, 0, 2, 2).unwrap().carve(0, 1, 1).is_err());
  }

  #[test]
  fn detach() {
    let m = grid();
    let copy = m.sub(0, 2, 3, 2).unwrap().detach();
    assert!(!copy.shares(&m));
    assert_eq!(copy, Mat::new(3, 2, vec![2, 3, 6, 7, 10, 11]).unwrap());
    copy.set(0, 0, 99);
    assert_eq!(m.at(0, 2), 2);
  }

  #[test]
  fn feed() {
    let m = grid();
    let top = m.sub(0, 0, 1, 4).unwrap();
    let bottom = m.sub(2, 0, 1, 4).unwrap();
    top.feed(&bottom).unwrap();
    assert_eq!(m.row(0).unwrap().to_vec(), vec![8, 9, 10, 11]);
    assert!(matches!(top.feed(&m), Err(Error::ShapeMismatch { .. })));
  }

  #[test]
  fn display() {
    let m = Mat::new(2, 2, vec![1, 2, 3, 4]).unwrap();
    assert_eq!(m.to_string(), "{ 1 2 }\n{ 3 4 }\n");
  }

  #[test]
  fn display_named() {
    let m = Mat::new(2, 2, vec![1.0, 2.5, -3.0, 0.5]).unwrap();
    assert_eq!(format!("{:.6}", m.named("m")), "Matrix: m\n{ 1.000000 2.500000 }\n{ -3.000000 0.500000 }\n");
    assert_eq!(format!("{:.1}", m.row(1).unwrap()), "{ -3.0 0.5 }\n");
  }

  #[test]
  fn unaddressable_sizes() {
    assert!(matches!(Mat::<f64>::filled(1 << 33, 1 << 32, 0.0), Err(Error::Allocation { .. })));
    assert!(matches!(Mat::<f64>::zeros(1 << 31, 1 << 31), Err(Error::Allocation { .. })));
    let m = Mat::new(2, 2, vec![1, 2, 3, 4]).unwrap();
    assert!(matches!(m.sub(1, 0, usize::MAX, 1), Err(Error::OutOfBounds { needed: usize::MAX, .. })));
    assert!(matches!(m.sub(0, 1, 1, usize::MAX), Err(Error::OutOfBounds { needed: usize::MAX, .. })));
    assert!(matches!(m.carve(1, usize::MAX, 2), Err(Error::OutOfBounds { needed: usize::MAX, .. })));
  }

  #[test]
  fn rejects_narrow_stride() {
    assert!(matches!(
      Mat::from_shape(Shape::strided(2, 3, 2, 0), vec![0; 10]),
      Err(Error::OutOfBounds { what: "row stride", needed: 3, len: 2 })
    ));
    assert!(matches!(
      Mat::from_shape(Shape::strided(usize::MAX, 2, 2, 0), vec![0; 10]),
      Err(Error::OutOfBounds { what: "view", needed: usize::MAX, .. })
    ));
    assert!(Mat::from_shape(Shape::strided(1, 3, 2, 0), vec![0; 3]).is_ok());
  }
}
