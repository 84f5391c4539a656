use std::collections::BTreeMap;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{category_label, dodge, headroom, DrawResult, CAPTION_FONT, LABEL_FONT};
use crate::color::{generate_palette, HueMap};
use crate::data::aggregate::AggregateTable;
use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Single-series bar chart
// ---------------------------------------------------------------------------

/// One bar per category, e.g. a `value_counts` result.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
}

impl BarChart {
    pub fn from_counts(title: &str, column: &str, counts: &[(Value, usize)]) -> Self {
        BarChart {
            title: title.to_string(),
            x_label: column.to_string(),
            y_label: "Count".to_string(),
            bars: counts
                .iter()
                .map(|(v, n)| (v.to_string(), *n as f64))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let names: Vec<String> = self.bars.iter().map(|(n, _)| n.clone()).collect();
        let n = names.len();
        let y_max = headroom(self.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max));

        let mut chart = ChartBuilder::on(area)
            .caption(&self.title, CAPTION_FONT)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(&names, *x))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .label_style(LABEL_FONT)
            .draw()?;

        let color = generate_palette(1)[0];
        chart.draw_series(self.bars.iter().enumerate().map(|(i, (_, v))| {
            let (x0, w) = dodge(i, 0, 1);
            Rectangle::new([(x0, 0.0), (x0 + w, *v)], color.filled())
        }))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Grouped (dodged) bar chart
// ---------------------------------------------------------------------------

/// Bars per x category, split by hue, e.g. a `group_count` result.
#[derive(Debug, Clone)]
pub struct GroupedBarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// x category names in display order.
    pub categories: Vec<String>,
    pub hues: HueMap,
    /// `(category index, hue index)` → bar height.
    pub values: BTreeMap<(usize, usize), f64>,
}

impl GroupedBarChart {
    /// Lay out an aggregate with x = column A and hue = column B.
    ///
    /// Categories and hues appear in order of first occurrence in the
    /// aggregate rows, so the count-descending sort drives the layout.
    pub fn from_aggregate(title: &str, agg: &AggregateTable) -> Self {
        let mut x_levels: Vec<&Value> = Vec::new();
        let mut hue_levels: Vec<Value> = Vec::new();
        for row in &agg.rows {
            if !x_levels.contains(&&row.a) {
                x_levels.push(&row.a);
            }
            if !hue_levels.contains(&row.b) {
                hue_levels.push(row.b.clone());
            }
        }

        let hues = HueMap::new(&hue_levels);
        let values = agg
            .rows
            .iter()
            .filter_map(|row| {
                let xi = x_levels.iter().position(|v| *v == &row.a)?;
                let hi = hues.index_of(&row.b)?;
                Some(((xi, hi), row.count as f64))
            })
            .collect();

        GroupedBarChart {
            title: title.to_string(),
            x_label: agg.column_a.clone(),
            y_label: "Count".to_string(),
            categories: x_levels.iter().map(|v| v.to_string()).collect(),
            hues,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.values.is_empty()
    }

    pub fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let n = self.categories.len();
        let k = self.hues.len();
        let y_max = headroom(self.values.values().copied().fold(0.0, f64::max));

        let mut chart = ChartBuilder::on(area)
            .caption(&self.title, CAPTION_FONT)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(&self.categories, *x))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .label_style(LABEL_FONT)
            .draw()?;

        for (j, (label, color)) in self.hues.legend_entries().into_iter().enumerate() {
            let bars = self
                .values
                .iter()
                .filter(|((_, hi), _)| *hi == j)
                .map(|(&(i, _), &v)| {
                    let (x0, w) = dodge(i, j, k);
                    Rectangle::new([(x0, 0.0), (x0 + w, v)], color.filled())
                });
            chart
                .draw_series(bars)?
                .label(label)
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        Ok(())
    }
}
