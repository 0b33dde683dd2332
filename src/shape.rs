use std::ops::Range;


/// The shape of a [Mat](crate::Mat) and its placement in the backing buffer.
///
/// Element `(i, j)` lives at `offset + i * stride + j`. The stride exceeds
/// `cols` whenever the view is a window into a wider matrix.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
  pub rows: usize,
  pub cols: usize,
  pub(crate) stride: usize,
  pub(crate) offset: usize,
}

impl Shape {
  pub fn new(rows: usize, cols: usize) -> Self {
    Self { rows, cols, stride: cols, offset: 0 }
  }

  /// Shapes whose rows run into each other can be described, but no
  /// [Mat](crate::Mat) will accept them. See [well_formed](Shape::well_formed).

  pub fn strided(rows: usize, cols: usize, stride: usize, offset: usize) -> Self {
    Self { rows, cols, stride, offset }
  }

  /// Whether every row ends before the next one starts.

  pub fn well_formed(&self) -> bool {
    self.rows <= 1 || self.cols <= self.stride
  }

  pub fn size(&self) -> usize {
    self.rows * self.cols
  }

  pub fn stride(&self) -> usize {
    self.stride
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  #[inline]
  pub fn index(&self, i: usize, j: usize) -> usize {
    self.offset + i * self.stride + j
  }

  /// One past the highest buffer address covered by this shape.

  pub fn extent(&self) -> usize {
    if self.size() == 0 { return self.offset }
    self.index(self.rows - 1, self.cols)
  }

  /// [extent](Shape::extent), or `None` if it does not fit in `usize`.

  pub fn checked_extent(&self) -> Option<usize> {
    if self.rows == 0 || self.cols == 0 { return Some(self.offset) }
    (self.rows - 1).checked_mul(self.stride)?
      .checked_add(self.offset)?
      .checked_add(self.cols)
  }

  pub fn contiguous(&self) -> bool {
    self.rows <= 1 || self.stride == self.cols
  }

  pub fn row(&self, i: usize) -> Self {
    Self { rows: 1, cols: self.cols, stride: self.cols, offset: self.index(i, 0) }
  }

  pub fn sub(&self, row: usize, col: usize, rows: usize, cols: usize) -> Self {
    Self { rows, cols, stride: self.stride, offset: self.index(row, col) }
  }

  /// Reinterpret `rows * cols` elements, starting `start` elements into
  /// this (contiguous) shape, as a dense matrix.

  pub fn carve(&self, start: usize, rows: usize, cols: usize) -> Self {
    debug_assert!(self.contiguous());
    Self::strided(rows, cols, cols, self.offset + start)
  }

  /// Address ranges of every row.

  pub fn row_ranges(&self) -> impl Iterator<Item=Range<usize>> + '_ {
    (0..self.rows)
      .filter(move |_| self.cols > 0 )
      .map(move |i| {
        let start = self.index(i, 0);
        start..start + self.cols
      })
  }

  /// Whether any address is covered by both shapes.

  pub fn overlaps(&self, other: &Self) -> bool {
    if self.size() == 0 || other.size() == 0 { return false }
    if self.extent() <= other.offset || other.extent() <= self.offset { return false }
    self.row_ranges().any(|a| {
      other.row_ranges().any(|b| a.start < b.end && b.start < a.end )
    })
  }

  pub fn iter(&self) -> Box<dyn Iterator<Item=usize> + '_> {
    if self.contiguous() {
      Box::new(self.offset..self.offset + self.size())
    } else {
      Box::new(ShapeIterator::new(self))
    }
  }
}

impl std::fmt::Display for Shape {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Shape[{}x{}]", self.rows, self.cols)
  }
}


/// Iterate through a [Shape]'s buffer addresses in row-major order.

pub struct ShapeIterator<'a> {
  shape: &'a Shape,
  row: usize,
  col: usize,
}

impl<'a> ShapeIterator<'a> {
  fn new(shape: &'a Shape) -> Self {
    Self { shape, row: 0, col: 0 }
  }
}

impl<'a> Iterator for ShapeIterator<'a> {
  type Item = usize;

  fn next(&mut self) -> Option<Self::Item> {
    if self.shape.cols == 0 || self.row == self.shape.rows { return None }
    let out = self.shape.index(self.row, self.col);
    // Wrap to the start of the next row
    self.col += 1;
    if self.col == self.shape.cols {
      self.col = 0;
      self.row += 1;
    }
    Some(out)
  }
}
