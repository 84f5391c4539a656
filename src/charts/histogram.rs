use plotters::coord::Shift;
use plotters::prelude::*;

use super::{headroom, DrawResult, CAPTION_FONT, LABEL_FONT};
use crate::color::HueMap;
use crate::data::model::{Table, Value};
use crate::error::TableError;

/// Side-by-side histograms of one numeric column, one panel per facet value.
/// All panels share the same bins and y scale.
#[derive(Debug, Clone)]
pub struct FacetedHistogram {
    pub x_label: String,
    pub facet_column: String,
    pub facets: Vec<(Value, Vec<f64>)>,
    pub hues: HueMap,
    pub bins: usize,
}

impl FacetedHistogram {
    /// Split `numeric` by the levels of `facet`, skipping missing values.
    pub fn from_table(
        table: &Table,
        numeric: &str,
        facet: &str,
        bins: usize,
    ) -> Result<Self, TableError> {
        let num_col = table.numeric_column(numeric)?;
        let facet_col = table.column(facet)?;
        let levels = facet_col.levels();

        let facets = levels
            .iter()
            .map(|level| {
                let values = facet_col
                    .values
                    .iter()
                    .zip(&num_col.values)
                    .filter(|(f, _)| *f == level)
                    .filter_map(|(_, v)| v.as_f64())
                    .collect();
                (level.clone(), values)
            })
            .collect();

        Ok(FacetedHistogram {
            x_label: numeric.to_string(),
            facet_column: facet.to_string(),
            facets,
            hues: HueMap::new(&levels),
            bins: bins.max(1),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.facets.iter().all(|(_, v)| v.is_empty())
    }

    /// Shared `(min, max)` over every facet.
    pub fn range(&self) -> Option<(f64, f64)> {
        let all = self.facets.iter().flat_map(|(_, v)| v.iter().copied());
        let (lo, hi) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if lo.is_finite() && hi.is_finite() {
            Some((lo, hi))
        } else {
            None
        }
    }

    /// Per-facet bin counts over the shared range.
    pub fn bin_counts(&self) -> Vec<Vec<usize>> {
        let Some((lo, hi)) = self.range() else {
            return vec![vec![0; self.bins]; self.facets.len()];
        };
        let width = if hi > lo { (hi - lo) / self.bins as f64 } else { 1.0 };
        self.facets
            .iter()
            .map(|(_, values)| {
                let mut counts = vec![0usize; self.bins];
                for v in values {
                    // The top edge belongs to the last bin.
                    let idx = (((v - lo) / width) as usize).min(self.bins - 1);
                    counts[idx] += 1;
                }
                counts
            })
            .collect()
    }

    pub fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let Some((lo, hi)) = self.range() else {
            return Ok(());
        };
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
        let width = (hi - lo) / self.bins as f64;
        let counts = self.bin_counts();
        let y_max = headroom(
            counts
                .iter()
                .flatten()
                .copied()
                .max()
                .unwrap_or(0) as f64,
        );

        let panels = area.split_evenly((1, self.facets.len().max(1)));
        for (((level, _), facet_counts), panel) in self.facets.iter().zip(&counts).zip(&panels) {
            let color = self.hues.color_for(level);
            let mut chart = ChartBuilder::on(panel)
                .caption(format!("{} = {level}", self.facet_column), CAPTION_FONT)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(lo..hi, 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(self.x_label.as_str())
                .y_desc("Count")
                .label_style(LABEL_FONT)
                .draw()?;

            chart.draw_series(facet_counts.iter().enumerate().map(|(b, &c)| {
                let x0 = lo + b as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, c as f64)], color.filled())
            }))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind};

    fn ages_by_risk() -> Table {
        Table::new(vec![
            Column::new(
                "Age",
                ColumnKind::Integer,
                [20, 30, 40, 50, 60, 70].iter().map(|&a| Value::Integer(a)).collect(),
            ),
            Column::new(
                "Risk",
                ColumnKind::Text,
                vec![
                    Value::from("good"),
                    Value::from("bad"),
                    Value::from("good"),
                    Value::from("good"),
                    Value::Null,
                    Value::from("bad"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn facets_split_by_level() {
        let h = FacetedHistogram::from_table(&ages_by_risk(), "Age", "Risk", 5).unwrap();
        assert_eq!(h.facets.len(), 2);
        assert_eq!(h.facets[0], (Value::from("bad"), vec![30.0, 70.0]));
        assert_eq!(h.facets[1], (Value::from("good"), vec![20.0, 40.0, 50.0]));
        assert_eq!(h.range(), Some((20.0, 70.0)));
    }

    #[test]
    fn bin_counts_cover_every_value() {
        let h = FacetedHistogram::from_table(&ages_by_risk(), "Age", "Risk", 5).unwrap();
        let counts = h.bin_counts();
        assert_eq!(counts[0], vec![0, 1, 0, 0, 1]);
        assert_eq!(counts[1].iter().sum::<usize>(), 3);
    }

    #[test]
    fn facet_requires_numeric_column() {
        let err = FacetedHistogram::from_table(&ages_by_risk(), "Risk", "Age", 10).unwrap_err();
        assert!(matches!(err, TableError::Shape(_)));
    }
}
