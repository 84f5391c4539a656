//! Console reports: head, info, nunique and describe.
//!
//! Every function returns a `String`; printing is left to the caller.

use std::collections::BTreeMap;

use crate::config::DisplayOptions;
use crate::data::model::Table;
use crate::data::stats::Summary;

const ELLIPSIS: &str = "...";

/// First `n` rows with a leading row-index column.
pub fn format_head(table: &Table, n: usize, opts: &DisplayOptions) -> String {
    let mut header = vec![String::new()];
    header.extend(table.column_names().iter().map(|s| s.to_string()));

    let rows = (0..n.min(table.n_rows()))
        .filter_map(|i| {
            let cells = table.row(i)?;
            let mut row = vec![i.to_string()];
            row.extend(cells.iter().map(|v| v.to_string()));
            Some(row)
        })
        .collect();

    render_grid(header, rows, opts)
}

/// Entry count plus per-column non-null count and dtype.
pub fn format_info(table: &Table) -> String {
    let n = table.n_rows();
    let mut out = String::from("<Table>\n");
    if n == 0 {
        out.push_str("RangeIndex: 0 entries\n");
    } else {
        out.push_str(&format!("RangeIndex: {n} entries, 0 to {}\n", n - 1));
    }
    out.push_str(&format!(
        "Data columns (total {} columns):\n",
        table.n_columns()
    ));

    let name_width = table
        .column_names()
        .iter()
        .map(|s| s.chars().count())
        .chain(std::iter::once("Column".len()))
        .max()
        .unwrap_or(6);

    out.push_str(&format!(
        " {:<3}  {:<name_width$}  {:<14}  {}\n",
        "#", "Column", "Non-Null Count", "Dtype"
    ));
    out.push_str(&format!(
        " {:<3}  {:<name_width$}  {:<14}  {}\n",
        "---", "------", "--------------", "-----"
    ));

    let mut dtypes: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, col) in table.columns().iter().enumerate() {
        let dtype = col.kind.dtype_name();
        *dtypes.entry(dtype).or_default() += 1;
        out.push_str(&format!(
            " {:<3}  {:<name_width$}  {:<14}  {}\n",
            i,
            col.name,
            format!("{} non-null", col.non_null_count()),
            dtype
        ));
    }

    let summary: Vec<String> = dtypes
        .iter()
        .map(|(dtype, count)| format!("{dtype}({count})"))
        .collect();
    out.push_str(&format!("dtypes: {}", summary.join(", ")));
    out
}

/// Number of distinct non-null values per column.
pub fn format_nunique(table: &Table) -> String {
    let name_width = table
        .column_names()
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = table
        .columns()
        .iter()
        .map(|col| {
            format!(
                "{:<name_width$}    {}",
                col.name,
                col.unique_values().len()
            )
        })
        .collect();
    lines.push("dtype: int64".to_string());
    lines.join("\n")
}

/// Count, mean, std, min, quartiles and max for every numeric column.
pub fn format_describe(table: &Table, opts: &DisplayOptions) -> String {
    let summaries: Vec<(&str, Option<Summary>)> = table
        .columns()
        .iter()
        .filter(|c| c.kind.is_numeric())
        .map(|c| (c.name.as_str(), Summary::of(&c.numeric_values())))
        .collect();

    if summaries.is_empty() {
        return "No numeric columns to describe.".to_string();
    }

    let mut header = vec![String::new()];
    header.extend(summaries.iter().map(|(name, _)| name.to_string()));

    let stats: [(&str, fn(&Summary) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q25),
        ("50%", |s| s.median),
        ("75%", |s| s.q75),
        ("max", |s| s.max),
    ];

    let rows = stats
        .iter()
        .map(|(label, get)| {
            let mut row = vec![label.to_string()];
            row.extend(summaries.iter().map(|(_, s)| match s {
                Some(s) => format_stat(get(s)),
                None => "NaN".to_string(),
            }));
            row
        })
        .collect();

    render_grid(header, rows, opts)
}

fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.6}")
    }
}

// ---------------------------------------------------------------------------
// Grid rendering
// ---------------------------------------------------------------------------

/// Right-aligned text grid. The first column is the row label and is always
/// kept; data columns beyond `max_columns` are elided in the middle, and
/// lines are cut at `width` characters.
fn render_grid(header: Vec<String>, rows: Vec<Vec<String>>, opts: &DisplayOptions) -> String {
    let keep = visible_columns(header.len().saturating_sub(1), opts.max_columns);

    let project = |row: &[String]| -> Vec<String> {
        let mut out = vec![row.first().cloned().unwrap_or_default()];
        for slot in &keep {
            match slot {
                Some(idx) => out.push(row.get(idx + 1).cloned().unwrap_or_default()),
                None => out.push(ELLIPSIS.to_string()),
            }
        }
        out
    };

    let header = project(header.as_slice());
    let rows: Vec<Vec<String>> = rows.iter().map(|r| project(r.as_slice())).collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|c| {
            std::iter::once(&header)
                .chain(rows.iter())
                .map(|r| r[c].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    std::iter::once(&header)
        .chain(rows.iter())
        .map(|r| {
            let line = r
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(c, (cell, w))| {
                    if c == 0 {
                        format!("{cell:<w$}")
                    } else {
                        format!("{cell:>w$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ");
            truncate(line.trim_end(), opts.width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indices of the data columns to show; `None` marks the elision column.
fn visible_columns(n: usize, max_columns: usize) -> Vec<Option<usize>> {
    if n <= max_columns {
        return (0..n).map(Some).collect();
    }
    let head = max_columns.div_ceil(2);
    let tail = max_columns / 2;
    (0..head)
        .map(Some)
        .chain(std::iter::once(None))
        .chain((n - tail..n).map(Some))
        .collect()
}

fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        line.to_string()
    } else {
        line.chars().take(width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind, Value};

    fn credit() -> Table {
        Table::new(vec![
            Column::new(
                "Age",
                ColumnKind::Integer,
                [67, 22, 49, 45].iter().map(|&a| Value::Integer(a)).collect(),
            ),
            Column::new(
                "Sex",
                ColumnKind::Text,
                vec!["male".into(), "female".into(), "male".into(), Value::Null],
            ),
            Column::new(
                "Credit amount",
                ColumnKind::Integer,
                [1169, 5951, 2096, 7882].iter().map(|&a| Value::Integer(a)).collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn head_limits_rows() {
        let out = format_head(&credit(), 2, &DisplayOptions::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Credit amount"));
        assert!(lines[2].starts_with('1'));
        assert!(lines[2].contains("female"));
    }

    #[test]
    fn info_lists_non_null_counts() {
        let out = format_info(&credit());
        assert!(out.contains("RangeIndex: 4 entries, 0 to 3"));
        assert!(out.contains("3 non-null"));
        assert!(out.ends_with("dtypes: int64(2), object(1)"));
    }

    #[test]
    fn nunique_skips_nulls() {
        let out = format_nunique(&credit());
        let sex = out.lines().find(|l| l.starts_with("Sex")).unwrap();
        assert!(sex.trim_end().ends_with('2'));
    }

    #[test]
    fn describe_covers_numeric_columns_only() {
        let out = format_describe(&credit(), &DisplayOptions::default());
        let header = out.lines().next().unwrap();
        assert!(header.contains("Age"));
        assert!(!header.contains("Sex"));
        let mean = out.lines().find(|l| l.starts_with("mean")).unwrap();
        assert!(mean.contains("45.750000"));
        assert_eq!(out.lines().count(), 9);
    }

    #[test]
    fn wide_tables_are_elided_and_truncated() {
        let opts = DisplayOptions {
            width: 30,
            max_columns: 2,
        };
        let out = format_head(&credit(), 1, &opts);
        let header = out.lines().next().unwrap();
        assert!(header.contains(ELLIPSIS));
        assert!(!header.contains("Sex"));
        assert!(out.lines().all(|l| l.chars().count() <= 30));
    }

    #[test]
    fn visible_columns_split_head_and_tail() {
        assert_eq!(visible_columns(3, 5), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(
            visible_columns(6, 3),
            vec![Some(0), Some(1), None, Some(5)]
        );
    }
}
