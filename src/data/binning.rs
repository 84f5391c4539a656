use super::model::{Column, Table, Value};
use crate::error::TableError;

/// Fixed-boundary bucketing of a numeric column into labelled intervals.
///
/// Intervals are `[b[i], b[i+1])`, except that the last one also includes
/// its upper boundary. Values outside `[b[0], b[n-1]]` are unmapped.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSpec {
    boundaries: Vec<f64>,
    labels: Vec<String>,
}

impl BinSpec {
    /// Validate and build a spec: at least two finite, strictly increasing
    /// boundaries and exactly one label per interval.
    pub fn new(boundaries: Vec<f64>, labels: Vec<String>) -> Result<Self, TableError> {
        if boundaries.len() < 2 {
            return Err(TableError::InvalidBins(format!(
                "need at least 2 boundaries, got {}",
                boundaries.len()
            )));
        }
        if labels.len() != boundaries.len() - 1 {
            return Err(TableError::InvalidBins(format!(
                "{} boundaries need {} labels, got {}",
                boundaries.len(),
                boundaries.len() - 1,
                labels.len()
            )));
        }
        if boundaries.iter().any(|b| !b.is_finite()) {
            return Err(TableError::InvalidBins("boundaries must be finite".to_string()));
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TableError::InvalidBins(
                "boundaries must be strictly increasing".to_string(),
            ));
        }
        Ok(BinSpec { boundaries, labels })
    }

    /// Index of the interval containing `v`, or `None` when out of range or NaN.
    pub fn interval_of(&self, v: f64) -> Option<usize> {
        let b = &self.boundaries;
        let first = b[0];
        let last = b[b.len() - 1];
        if v.is_nan() || v < first || v > last {
            return None;
        }
        // Number of boundaries <= v, minus one; the top edge folds into the
        // last interval.
        let idx = b.partition_point(|&edge| edge <= v) - 1;
        Some(idx.min(self.labels.len() - 1))
    }

    /// Label for `v`, or `None` when unmapped.
    pub fn label_for(&self, v: f64) -> Option<&str> {
        self.interval_of(v).map(|i| self.labels[i].as_str())
    }
}

/// Return a new table with `new_column` holding the bin label of each
/// value in `column`. Unmapped or missing values become `Null`.
pub fn bin(
    table: &Table,
    column: &str,
    spec: &BinSpec,
    new_column: &str,
) -> Result<Table, TableError> {
    let source = table.numeric_column(column)?;

    let values = source
        .values
        .iter()
        .map(|v| {
            v.as_f64()
                .and_then(|x| spec.label_for(x))
                .map(|label| Value::String(label.to_string()))
                .unwrap_or(Value::Null)
        })
        .collect();

    let derived = Column::categorical(new_column, spec.labels.clone(), values);
    table.with_derived_column(derived)
}
