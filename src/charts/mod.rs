//! Chart rendering: bars, histograms, box and violin plots written to image files.
//!
//! Each chart kind is a plain data description with a `draw` method that is
//! generic over the plotters backend. [`ChartRenderer`] draws into an
//! in-memory RGB buffer and encodes it as JPEG with the `image` crate. Text
//! is rasterized from a bundled DejaVu Sans registered as `sans-serif`.

use std::path::PathBuf;
use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::config::{ChartOptions, Config};
use crate::error::ChartError;

pub mod bar;
pub mod distribution;
pub mod histogram;

pub use bar::{BarChart, GroupedBarChart};
pub use distribution::{DistributionChart, DistributionStyle};
pub use histogram::FacetedHistogram;

pub(crate) type DrawResult<DB> =
    Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

pub(crate) const CAPTION_FONT: (&str, u32) = (FONT_FAMILY, 22);
pub(crate) const LABEL_FONT: (&str, u32) = (FONT_FAMILY, 14);

/// Register the bundled font with plotters once per process.
fn ensure_font() -> Result<(), ChartError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok()
    });
    if ok {
        Ok(())
    } else {
        Err(ChartError::Font(FONT_FAMILY.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Chart – every supported chart kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Chart {
    Bars(BarChart),
    GroupedBars(GroupedBarChart),
    Histogram(FacetedHistogram),
    Distribution(DistributionChart),
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        match self {
            Chart::Bars(c) => c.is_empty(),
            Chart::GroupedBars(c) => c.is_empty(),
            Chart::Histogram(c) => c.is_empty(),
            Chart::Distribution(c) => c.is_empty(),
        }
    }

    pub fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> DrawResult<DB> {
        match self {
            Chart::Bars(c) => c.draw(area),
            Chart::GroupedBars(c) => c.draw(area),
            Chart::Histogram(c) => c.draw(area),
            Chart::Distribution(c) => c.draw(area),
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer – buffer → image file
// ---------------------------------------------------------------------------

/// Writes charts as `<image_dir>/<name>.jpeg`.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    image_dir: PathBuf,
    options: ChartOptions,
}

impl ChartRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            image_dir: config.image_dir.clone(),
            options: config.chart,
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.image_dir.join(format!("{name}.jpeg"))
    }

    /// Draw `chart` and save it under `name`. Returns the written path.
    pub fn render(&self, name: &str, chart: &Chart) -> Result<PathBuf, ChartError> {
        if chart.is_empty() {
            return Err(ChartError::NoData(name.to_string()));
        }
        ensure_font()?;

        let (w, h) = (self.options.width, self.options.height);
        let mut buf = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            let draw_err = |message: String| ChartError::Draw {
                name: name.to_string(),
                message,
            };
            root.fill(&WHITE).map_err(|e| draw_err(e.to_string()))?;
            chart.draw(&root).map_err(|e| draw_err(e.to_string()))?;
            root.present().map_err(|e| draw_err(e.to_string()))?;
        }

        let img = image::RgbImage::from_raw(w, h, buf).ok_or_else(|| ChartError::Draw {
            name: name.to_string(),
            message: "pixel buffer does not match image size".to_string(),
        })?;

        std::fs::create_dir_all(&self.image_dir)?;
        let path = self.path_for(name);
        img.save_with_format(&path, image::ImageFormat::Jpeg)?;
        log::info!("Saved chart {}", path.display());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Shared layout helpers
// ---------------------------------------------------------------------------

/// Label for a tick on a categorical axis laid out at integer positions.
pub(crate) fn category_label(names: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// Left edge and width of the `j`-th of `k` side-by-side slots around
/// category position `i`, using 80 % of the unit cell.
pub(crate) fn dodge(i: usize, j: usize, k: usize) -> (f64, f64) {
    let w = 0.8 / k.max(1) as f64;
    (i as f64 - 0.4 + j as f64 * w, w)
}

/// Upper y bound with 10 % headroom; 1.0 when there is nothing to show.
pub(crate) fn headroom(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HueMap;
    use crate::data::aggregate::group_count;
    use crate::data::model::{Column, ColumnKind, Table, Value};
    use image::GenericImageView;
    use tempfile::TempDir;

    fn renderer(dir: &TempDir) -> ChartRenderer {
        let mut cfg = Config::rooted_at(dir.path());
        cfg.chart = ChartOptions {
            width: 320,
            height: 200,
        };
        ChartRenderer::new(&cfg)
    }

    fn bars() -> Chart {
        Chart::Bars(BarChart {
            title: "Risk".to_string(),
            x_label: "Risk".to_string(),
            y_label: "Count".to_string(),
            bars: vec![("good".to_string(), 700.0), ("bad".to_string(), 300.0)],
        })
    }

    #[test]
    fn render_writes_decodable_jpeg() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir);
        let path = r.render("target_distribution", &bars()).unwrap();
        assert_eq!(path, dir.path().join("images/target_distribution.jpeg"));

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (320, 200));
    }

    #[test]
    fn every_chart_kind_renders_text() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir);
        let t = Table::new(vec![
            Column::new(
                "Housing",
                ColumnKind::Text,
                ["own", "rent", "own", "free"].iter().map(|&s| s.into()).collect(),
            ),
            Column::new(
                "Risk",
                ColumnKind::Text,
                ["good", "bad", "bad", "good"].iter().map(|&s| s.into()).collect(),
            ),
            Column::new(
                "Credit amount",
                ColumnKind::Integer,
                [1169, 5951, 2096, 7882].iter().map(|&a| Value::Integer(a)).collect(),
            ),
        ])
        .unwrap();

        let agg = group_count(&t, "Housing", "Risk").unwrap();
        let charts = [
            Chart::GroupedBars(GroupedBarChart::from_aggregate("Housing vs Risk", &agg)),
            Chart::Histogram(
                FacetedHistogram::from_table(&t, "Credit amount", "Risk", 10).unwrap(),
            ),
            Chart::Distribution(
                DistributionChart::from_table(
                    &t,
                    "Housing",
                    "Risk",
                    "Credit amount",
                    DistributionStyle::Violin,
                )
                .unwrap(),
            ),
        ];
        for (i, chart) in charts.iter().enumerate() {
            let path = r.render(&format!("chart_{i}"), chart).unwrap();
            assert!(path.is_file());
        }
    }

    #[test]
    fn font_registration_is_repeatable() {
        ensure_font().unwrap();
        ensure_font().unwrap();
    }

    #[test]
    fn empty_chart_is_rejected() {
        let dir = TempDir::new().unwrap();
        let r = renderer(&dir);
        let chart = Chart::GroupedBars(GroupedBarChart {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            categories: Vec::new(),
            hues: HueMap::new(&[Value::from("good")]),
            values: Default::default(),
        });
        assert!(matches!(r.render("x", &chart), Err(ChartError::NoData(_))));
    }

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let names = vec!["own".to_string(), "rent".to_string()];
        assert_eq!(category_label(&names, 1.0), "rent");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, 5.0), "");
    }

    #[test]
    fn dodge_splits_cell() {
        let (x0, w) = dodge(2, 1, 2);
        assert!((w - 0.4).abs() < 1e-12);
        assert!((x0 - 2.0).abs() < 1e-12);
    }
}
