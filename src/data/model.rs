use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::TableError;

// ---------------------------------------------------------------------------
// Value – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Grouping keys live in `BTreeMap`s downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl Value {
    /// Try to interpret the value as an `f64` for statistics and binning.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed field
// ---------------------------------------------------------------------------

/// Column dtype, inferred once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    /// Derived categorical column with an explicit label order.
    Category,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Pandas-style dtype name used by the reporter.
    pub fn dtype_name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "object",
            ColumnKind::Category => "category",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
    /// Label order for `Category` columns; empty for every other kind.
    pub categories: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            kind,
            values,
            categories: Vec::new(),
        }
    }

    pub fn categorical(
        name: impl Into<String>,
        categories: Vec<String>,
        values: Vec<Value>,
    ) -> Self {
        Column {
            name: name.into(),
            kind: ColumnKind::Category,
            values,
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }

    /// Distinct non-null values, sorted.
    pub fn unique_values(&self) -> BTreeSet<Value> {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// Display order of the column's distinct values: declared label order
    /// for categories, sorted unique values otherwise.
    pub fn levels(&self) -> Vec<Value> {
        if self.kind == ColumnKind::Category {
            return self
                .categories
                .iter()
                .map(|c| Value::String(c.clone()))
                .collect();
        }
        self.unique_values().into_iter().collect()
    }

    /// Non-null numeric values, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered set of equal-length named columns; one row per credit application.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != n_rows {
                return Err(TableError::Shape(format!(
                    "column '{}' has {} rows, expected {n_rows}",
                    col.name,
                    col.len()
                )));
            }
        }
        Ok(Table { columns, n_rows })
    }

    /// Build a table with a fixed row count, which may be non-zero even
    /// when there are no columns left (e.g. after dropping the index).
    fn with_rows(columns: Vec<Column>, n_rows: usize) -> Self {
        Table { columns, n_rows }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Numeric column accessor; `Shape` if the column is not numeric.
    pub fn numeric_column(&self, name: &str) -> Result<&Column, TableError> {
        let col = self.column(name)?;
        if !col.kind.is_numeric() {
            return Err(TableError::Shape(format!(
                "column '{name}' is {}, expected a numeric column",
                col.kind.dtype_name()
            )));
        }
        Ok(col)
    }

    /// Cells of row `i`, in column order.
    pub fn row(&self, i: usize) -> Option<Vec<&Value>> {
        if i >= self.n_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Return a new table with `column` appended. The receiver is left untouched.
    pub fn with_derived_column(&self, column: Column) -> Result<Table, TableError> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(TableError::DuplicateColumn(column.name));
        }
        if column.len() != self.n_rows {
            return Err(TableError::Shape(format!(
                "derived column '{}' has {} rows, table has {}",
                column.name,
                column.len(),
                self.n_rows
            )));
        }
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(Table::with_rows(columns, self.n_rows))
    }

    /// Drop the leading column (the auto-generated row index of the source file).
    pub fn drop_first_column(mut self) -> Table {
        if !self.columns.is_empty() {
            self.columns.remove(0);
        }
        Table::with_rows(self.columns, self.n_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "Age",
                ColumnKind::Integer,
                vec![Value::Integer(22), Value::Integer(45), Value::Null],
            ),
            Column::new("Risk", ColumnKind::Text, vec!["good".into(), "bad".into(), "good".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn value_ordering_is_total_across_variants() {
        let mut vals = vec![
            Value::from("b"),
            Value::Float(1.5),
            Value::Null,
            Value::Integer(3),
            Value::Bool(true),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Integer(3),
                Value::Float(1.5),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn new_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("a", ColumnKind::Integer, vec![Value::Integer(1)]),
            Column::new("b", ColumnKind::Integer, vec![Value::Integer(1), Value::Integer(2)]),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::Shape(_)));
    }

    #[test]
    fn column_lookup_reports_missing_name() {
        let t = sample();
        assert_eq!(
            t.column("Housing").unwrap_err(),
            TableError::ColumnNotFound("Housing".to_string())
        );
        assert!(matches!(t.numeric_column("Risk"), Err(TableError::Shape(_))));
        assert_eq!(t.numeric_column("Age").unwrap().numeric_values(), vec![22.0, 45.0]);
    }

    #[test]
    fn derived_column_leaves_source_untouched() {
        let t = sample();
        let derived = Column::categorical(
            "Band",
            vec!["x".to_string()],
            vec!["x".into(), "x".into(), Value::Null],
        );
        let t2 = t.with_derived_column(derived).unwrap();
        assert_eq!(t.n_columns(), 2);
        assert_eq!(t2.n_columns(), 3);
        assert_eq!(t2.n_rows(), t.n_rows());
        assert_eq!(t2.column_names(), vec!["Age", "Risk", "Band"]);
    }

    #[test]
    fn derived_column_must_match_row_count() {
        let t = sample();
        let short = Column::new("x", ColumnKind::Integer, vec![Value::Integer(1)]);
        assert!(matches!(t.with_derived_column(short), Err(TableError::Shape(_))));
    }

    #[test]
    fn drop_first_column_keeps_rows() {
        let t = sample().drop_first_column();
        assert_eq!(t.column_names(), vec!["Risk"]);
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.row(1).unwrap(), vec![&Value::from("bad")]);
    }

    #[test]
    fn category_levels_follow_declared_order() {
        let col = Column::categorical(
            "Age_Categorical",
            vec!["Student".into(), "Young".into(), "Adult".into()],
            vec!["Adult".into(), "Student".into()],
        );
        let levels: Vec<String> = col.levels().iter().map(|v| v.to_string()).collect();
        assert_eq!(levels, vec!["Student", "Young", "Adult"]);
    }
}
