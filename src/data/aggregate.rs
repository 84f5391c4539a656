use std::collections::BTreeMap;

use super::model::{Table, Value};
use crate::error::TableError;

// ---------------------------------------------------------------------------
// Grouped counts over two categorical columns
// ---------------------------------------------------------------------------

/// One observed `(a, b)` pair and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub a: Value,
    pub b: Value,
    pub count: usize,
}

/// Result of [`group_count`]: rows ordered by count descending,
/// ties broken by `(a, b)` ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub column_a: String,
    pub column_b: String,
    pub rows: Vec<GroupCount>,
}

impl AggregateTable {
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Count for a specific pair, 0 when never observed.
    #[cfg(test)]
    pub fn count_of(&self, a: &Value, b: &Value) -> usize {
        self.rows
            .iter()
            .find(|r| &r.a == a && &r.b == b)
            .map(|r| r.count)
            .unwrap_or(0)
    }
}

/// Count rows per distinct `(col_a, col_b)` pair. Rows with a missing
/// value in either column are skipped.
pub fn group_count(table: &Table, col_a: &str, col_b: &str) -> Result<AggregateTable, TableError> {
    let a = table.column(col_a)?;
    let b = table.column(col_b)?;

    let mut counts: BTreeMap<(&Value, &Value), usize> = BTreeMap::new();
    for (va, vb) in a.values.iter().zip(&b.values) {
        if va.is_null() || vb.is_null() {
            continue;
        }
        *counts.entry((va, vb)).or_default() += 1;
    }

    // BTreeMap iteration is already (a, b) ascending; a stable sort on count
    // keeps that as the tie-break.
    let mut rows: Vec<GroupCount> = counts
        .into_iter()
        .map(|((va, vb), count)| GroupCount {
            a: va.clone(),
            b: vb.clone(),
            count,
        })
        .collect();
    rows.sort_by(|x, y| y.count.cmp(&x.count));

    Ok(AggregateTable {
        column_a: col_a.to_string(),
        column_b: col_b.to_string(),
        rows,
    })
}

/// Single-column counts, same ordering rule as [`group_count`].
pub fn value_counts(table: &Table, column: &str) -> Result<Vec<(Value, usize)>, TableError> {
    let col = table.column(column)?;

    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for v in col.values.iter().filter(|v| !v.is_null()) {
        *counts.entry(v).or_default() += 1;
    }

    let mut out: Vec<(Value, usize)> = counts.into_iter().map(|(v, n)| (v.clone(), n)).collect();
    out.sort_by(|x, y| y.1.cmp(&x.1));
    Ok(out)
}

// ---------------------------------------------------------------------------
// Numeric values partitioned by (x, hue)
// ---------------------------------------------------------------------------

/// Numeric values of one `(x, hue)` cell, used by box and violin charts.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSeries {
    pub x: Value,
    pub hue: Value,
    pub values: Vec<f64>,
}

/// Partition the numeric column `numeric` by the `x` and `hue` columns.
///
/// Groups are ordered by the level order of `x` then `hue` (declared label
/// order for binned categories, sorted otherwise). Rows missing any of the
/// three values are skipped; empty groups are not returned.
pub fn grouped_values(
    table: &Table,
    x: &str,
    hue: &str,
    numeric: &str,
) -> Result<Vec<GroupedSeries>, TableError> {
    let x_col = table.column(x)?;
    let hue_col = table.column(hue)?;
    let num_col = table.numeric_column(numeric)?;

    let mut groups: BTreeMap<(usize, usize), Vec<f64>> = BTreeMap::new();
    let x_levels = x_col.levels();
    let hue_levels = hue_col.levels();

    for i in 0..table.n_rows() {
        let (Some(xi), Some(hi)) = (
            level_index(&x_levels, &x_col.values[i]),
            level_index(&hue_levels, &hue_col.values[i]),
        ) else {
            continue;
        };
        let Some(v) = num_col.values[i].as_f64() else {
            continue;
        };
        groups.entry((xi, hi)).or_default().push(v);
    }

    Ok(groups
        .into_iter()
        .map(|((xi, hi), values)| GroupedSeries {
            x: x_levels[xi].clone(),
            hue: hue_levels[hi].clone(),
            values,
        })
        .collect())
}

fn level_index(levels: &[Value], v: &Value) -> Option<usize> {
    if v.is_null() {
        return None;
    }
    levels.iter().position(|l| l == v)
}
