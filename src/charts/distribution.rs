use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use super::{category_label, dodge, DrawResult, CAPTION_FONT, LABEL_FONT};
use crate::color::HueMap;
use crate::data::aggregate::{grouped_values, GroupedSeries};
use crate::data::model::{Table, Value};
use crate::data::stats::{gaussian_kde, BoxStats};
use crate::error::TableError;

const KDE_POINTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionStyle {
    Box,
    Violin,
}

/// Distribution of a numeric column per x category, split by hue.
#[derive(Debug, Clone)]
pub struct DistributionChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub style: DistributionStyle,
    pub categories: Vec<Value>,
    pub hues: HueMap,
    pub groups: Vec<GroupedSeries>,
}

impl DistributionChart {
    pub fn from_table(
        table: &Table,
        x: &str,
        hue: &str,
        numeric: &str,
        style: DistributionStyle,
    ) -> Result<Self, TableError> {
        let groups = grouped_values(table, x, hue, numeric)?;
        let categories = table.column(x)?.levels();
        let hues = HueMap::new(&table.column(hue)?.levels());

        Ok(DistributionChart {
            title: format!("{x} vs {numeric}"),
            x_label: x.to_string(),
            y_label: numeric.to_string(),
            style,
            categories,
            hues,
            groups,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.values.is_empty())
    }

    /// Centre x position and slot width of a group.
    fn slot(&self, group: &GroupedSeries) -> Option<(f64, f64)> {
        let i = self.categories.iter().position(|c| c == &group.x)?;
        let j = self.hues.index_of(&group.hue)?;
        let (x0, w) = dodge(i, j, self.hues.len());
        Some((x0 + w / 2.0, w))
    }

    /// Value grid for a violin: the data range padded by one bandwidth-ish step.
    fn kde_grid(values: &[f64]) -> Vec<f64> {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let pad = if hi > lo { (hi - lo) * 0.1 } else { 1.0 };
        let (lo, hi) = (lo - pad, hi + pad);
        let step = (hi - lo) / (KDE_POINTS - 1) as f64;
        (0..KDE_POINTS).map(|i| lo + i as f64 * step).collect()
    }

    fn y_range(&self) -> (f64, f64) {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for g in &self.groups {
            for &v in &g.values {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if !lo.is_finite() {
            return (0.0, 1.0);
        }
        let pad = if hi > lo { (hi - lo) * 0.15 } else { 1.0 };
        (lo - pad, hi + pad)
    }

    pub fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        let names: Vec<String> = self.categories.iter().map(|c| c.to_string()).collect();
        let n = names.len();
        let (y_lo, y_hi) = self.y_range();

        let mut chart = ChartBuilder::on(area)
            .caption(&self.title, CAPTION_FONT)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..n as f64 - 0.5, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(&names, *x))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .label_style(LABEL_FONT)
            .draw()?;

        for (j, (label, color)) in self.hues.legend_entries().into_iter().enumerate() {
            let members: Vec<(&GroupedSeries, f64, f64)> = self
                .groups
                .iter()
                .filter(|g| self.hues.index_of(&g.hue) == Some(j))
                .filter_map(|g| self.slot(g).map(|(cx, w)| (g, cx, w)))
                .collect();

            let anno = match self.style {
                DistributionStyle::Box => draw_boxes(&mut chart, &members, color)?,
                DistributionStyle::Violin => draw_violins(&mut chart, &members, color)?,
            };
            if anno {
                chart
                    .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
                    .label(label)
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
            }
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

type Cartesian<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Box, median, whiskers and outliers for every member group.
/// Returns whether anything was drawn.
fn draw_boxes<DB: DrawingBackend>(
    chart: &mut Cartesian<'_, DB>,
    members: &[(&GroupedSeries, f64, f64)],
    color: RGBColor,
) -> Result<bool, DrawingAreaErrorKind<DB::ErrorType>> {
    let stats: Vec<(BoxStats, f64, f64)> = members
        .iter()
        .filter_map(|(g, cx, w)| BoxStats::of(&g.values).map(|s| (s, *cx, w * 0.8)))
        .collect();
    if stats.is_empty() {
        return Ok(false);
    }

    chart.draw_series(stats.iter().map(|(s, cx, w)| {
        Rectangle::new([(cx - w / 2.0, s.q1), (cx + w / 2.0, s.q3)], color.filled())
    }))?;
    chart.draw_series(stats.iter().map(|(s, cx, w)| {
        Rectangle::new([(cx - w / 2.0, s.q1), (cx + w / 2.0, s.q3)], BLACK.stroke_width(1))
    }))?;
    chart.draw_series(stats.iter().map(|(s, cx, w)| {
        PathElement::new(
            vec![(cx - w / 2.0, s.median), (cx + w / 2.0, s.median)],
            BLACK.stroke_width(2),
        )
    }))?;
    chart.draw_series(stats.iter().flat_map(|(s, cx, w)| {
        let cap = w / 4.0;
        [
            PathElement::new(vec![(*cx, s.q1), (*cx, s.whisker_low)], BLACK.stroke_width(1)),
            PathElement::new(vec![(*cx, s.q3), (*cx, s.whisker_high)], BLACK.stroke_width(1)),
            PathElement::new(
                vec![(cx - cap, s.whisker_low), (cx + cap, s.whisker_low)],
                BLACK.stroke_width(1),
            ),
            PathElement::new(
                vec![(cx - cap, s.whisker_high), (cx + cap, s.whisker_high)],
                BLACK.stroke_width(1),
            ),
        ]
    }))?;
    chart.draw_series(stats.iter().flat_map(|(s, cx, _)| {
        s.outliers
            .iter()
            .map(move |&v| Circle::new((*cx, v), 3, BLACK.stroke_width(1)))
    }))?;

    Ok(true)
}

/// Mirrored density outline with a median tick for every member group.
fn draw_violins<DB: DrawingBackend>(
    chart: &mut Cartesian<'_, DB>,
    members: &[(&GroupedSeries, f64, f64)],
    color: RGBColor,
) -> Result<bool, DrawingAreaErrorKind<DB::ErrorType>> {
    let shapes: Vec<(Vec<f64>, Vec<f64>, f64, f64, f64)> = members
        .iter()
        .filter(|(g, _, _)| !g.values.is_empty())
        .map(|(g, cx, w)| {
            let grid = DistributionChart::kde_grid(&g.values);
            let density = gaussian_kde(&g.values, &grid);
            let median = BoxStats::of(&g.values).map(|s| s.median).unwrap_or(f64::NAN);
            (grid, density, *cx, *w, median)
        })
        .collect();
    if shapes.is_empty() {
        return Ok(false);
    }

    chart.draw_series(shapes.iter().map(|(grid, density, cx, w, _)| {
        let peak = density.iter().copied().fold(0.0, f64::max);
        let scale = if peak > 0.0 { w * 0.45 / peak } else { 0.0 };
        let right = grid.iter().zip(density).map(|(y, d)| (cx + d * scale, *y));
        let left = grid.iter().zip(density).rev().map(|(y, d)| (cx - d * scale, *y));
        Polygon::new(right.chain(left).collect::<Vec<_>>(), color.mix(0.7).filled())
    }))?;
    chart.draw_series(
        shapes
            .iter()
            .filter(|(.., median)| median.is_finite())
            .map(|(_, _, cx, w, median)| {
                PathElement::new(
                    vec![(cx - w * 0.15, *median), (cx + w * 0.15, *median)],
                    BLACK.stroke_width(2),
                )
            }),
    )?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind};

    fn housing_credit() -> Table {
        let housing = ["own", "own", "rent", "free", "own", "rent"];
        let risk = ["good", "bad", "good", "good", "good", "bad"];
        let amount = [1169, 5951, 2096, 7882, 4870, 9055];
        Table::new(vec![
            Column::new("Housing", ColumnKind::Text, housing.iter().map(|&s| s.into()).collect()),
            Column::new("Risk", ColumnKind::Text, risk.iter().map(|&s| s.into()).collect()),
            Column::new(
                "Credit amount",
                ColumnKind::Integer,
                amount.iter().map(|&a| Value::Integer(a)).collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn groups_get_distinct_slots() {
        let chart = DistributionChart::from_table(
            &housing_credit(),
            "Housing",
            "Risk",
            "Credit amount",
            DistributionStyle::Box,
        )
        .unwrap();

        assert_eq!(
            chart.categories,
            vec![Value::from("free"), Value::from("own"), Value::from("rent")]
        );
        let mut slots: Vec<f64> = chart
            .groups
            .iter()
            .map(|g| chart.slot(g).unwrap().0)
            .collect();
        let before = slots.len();
        slots.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        assert_eq!(slots.len(), before);
        assert_eq!(chart.title, "Housing vs Credit amount");
    }

    #[test]
    fn kde_grid_spans_data() {
        let grid = DistributionChart::kde_grid(&[10.0, 20.0]);
        assert_eq!(grid.len(), KDE_POINTS);
        assert!(grid[0] < 10.0 && grid[KDE_POINTS - 1] > 20.0);
    }

    #[test]
    fn y_range_pads_values() {
        let chart = DistributionChart::from_table(
            &housing_credit(),
            "Housing",
            "Risk",
            "Credit amount",
            DistributionStyle::Violin,
        )
        .unwrap();
        let (lo, hi) = chart.y_range();
        assert!(lo < 1169.0 && hi > 9055.0);
    }
}
