use std::path::Path;

use log::{ debug, warn };

use crate::{
  error::{ Error, Result },
  mat::Mat,
  scalar::Real,
};


/// Training samples stored row by row in a single buffer.
///
/// Each row holds the input values followed by the expected outputs.
/// [inputs](Dataset::inputs) and [targets](Dataset::targets) are strided
/// windows into that buffer.
///
/// The text format is a `rows;inputs;outputs;` header followed by
/// `rows * (inputs + outputs)` comma separated numbers. Whitespace
/// is ignored anywhere:
///
/// ```text
/// 4;2;1;
/// 0,0,0,
/// 0,1,0,
/// 1,0,0,
/// 1,1,1
/// ```

#[derive(Debug, Clone)]
pub struct Dataset<T: Real> {
  data: Mat<T>,
  inputs: Mat<T>,
  targets: Mat<T>,
}

impl<T: Real> Dataset<T> {
  fn from_mat(data: Mat<T>, inputs: usize, outputs: usize) -> Result<Self> {
    if data.rows() == 0 {
      return Err(Error::NoData("dataset has no rows".to_string()))
    }
    if inputs == 0 || outputs == 0 {
      return Err(Error::NoData(format!("samples need inputs and outputs, got {inputs} and {outputs}")))
    }
    let rows = data.rows();
    Ok(Self {
      inputs: data.sub(0, 0, rows, inputs)?,
      targets: data.sub(0, inputs, rows, outputs)?,
      data,
    })
  }

  /// Build a dataset from rows of `inputs + outputs` values each.

  pub fn from_rows<R: AsRef<[T]>>(inputs: usize, outputs: usize, rows: &[R]) -> Result<Self> {
    let width = inputs.checked_add(outputs)
      .ok_or_else(|| Error::config(format!("{inputs} inputs and {outputs} outputs overflow a row")) )?;
    let mut data = vec![];
    for (i, row) in rows.iter().enumerate() {
      let row = row.as_ref();
      if row.len() != width {
        return Err(Error::shape("dataset row", (i, width), (i, row.len())))
      }
      data.extend_from_slice(row);
    }
    Self::from_mat(Mat::new(rows.len(), width, data)?, inputs, outputs)
  }

  pub fn parse(text: &str) -> Result<Self> {
    let text: String = text.chars().filter(|c| !c.is_whitespace() ).collect();
    let mut fields = text.splitn(4, ';');
    let rows = header(fields.next(), "rows")?;
    let inputs = header(fields.next(), "inputs")?;
    let outputs = header(fields.next(), "outputs")?;
    let body = fields.next()
      .ok_or_else(|| Error::NoData("header must end with ';'".to_string()) )?;

    // Grow with the values actually present, never with the header's claim
    let width = inputs.checked_add(outputs);
    let expected = width.and_then(|width| width.checked_mul(rows) )
      .ok_or_else(|| Error::NoData(format!("header {rows};{inputs};{outputs} describes more values than can be stored")) )?;
    let mut values = vec![];
    let mut tokens = body.split(',').filter(|token| !token.is_empty() );
    for token in tokens.by_ref().take(expected) {
      let value = token.parse::<f64>().ok()
        .and_then(|value| T::from(value) )
        .ok_or_else(|| Error::NoData(format!("'{token}' is not a number")) )?;
      values.push(value);
    }
    if values.len() < expected {
      return Err(Error::NoData(format!("expected {} values, found {}", expected, values.len())))
    }
    let extra = tokens.count();
    if extra > 0 {
      warn!("ignoring {extra} values past the end of the dataset");
    }
    debug!("parsed {rows} samples with {inputs} inputs and {outputs} outputs");

    Self::from_mat(Mat::new(rows, inputs + outputs, values)?, inputs, outputs)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let text = std::fs::read_to_string(path)?;
    Self::parse(&text)
  }

  pub fn rows(&self) -> usize {
    self.data.rows()
  }

  /// Backing buffer with one sample per row.

  pub fn data(&self) -> &Mat<T> {
    &self.data
  }

  pub fn inputs(&self) -> &Mat<T> {
    &self.inputs
  }

  pub fn targets(&self) -> &Mat<T> {
    &self.targets
  }

  /// Input and target views, sharing the dataset's buffer.

  pub fn split(&self) -> (Mat<T>, Mat<T>) {
    (self.inputs.clone(), self.targets.clone())
  }
}

fn header(field: Option<&str>, name: &str) -> Result<usize> {
  let field = field.ok_or_else(|| Error::NoData(format!("header is missing the {name} count")) )?;
  field.parse().map_err(|_| Error::NoData(format!("'{field}' is not a valid {name} count")) )
}
