use std::path::PathBuf;

use crate::data::binning::BinSpec;
use crate::error::TableError;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Console table rendering limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Maximum characters per printed line.
    pub width: usize,
    /// Columns beyond this are elided with a `...` column.
    pub max_columns: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            width: 320,
            max_columns: 30,
        }
    }
}

/// Pixel size of every chart image. Charts are written as JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
        }
    }
}

/// Everything the pipeline needs, passed explicitly to the loader,
/// the reporter and the chart renderer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input zip archive.
    pub archive_path: PathBuf,
    /// Directory the archive is unpacked into.
    pub extract_dir: PathBuf,
    /// Directory chart images are written to.
    pub image_dir: PathBuf,
    /// Rows shown by the `head` report.
    pub head_rows: usize,
    pub display: DisplayOptions,
    pub chart: ChartOptions,
    /// Age → life-stage bucketing used by the age/credit chart: interval
    /// boundaries and one label per interval.
    pub age_boundaries: Vec<f64>,
    pub age_labels: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("german_credit.zip"),
            extract_dir: PathBuf::from("german_credit"),
            image_dir: PathBuf::from("images"),
            head_rows: 10,
            display: DisplayOptions::default(),
            chart: ChartOptions::default(),
            age_boundaries: vec![18.0, 25.0, 35.0, 60.0, 120.0],
            age_labels: ["Student", "Young", "Adult", "Senior"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Validated age bucketing; `InvalidBins` if boundaries and labels disagree.
    pub fn age_bins(&self) -> Result<BinSpec, TableError> {
        BinSpec::new(self.age_boundaries.clone(), self.age_labels.clone())
    }

    /// Default settings with all paths rooted at `base`.
    #[cfg(test)]
    pub fn rooted_at(base: &std::path::Path) -> Self {
        let defaults = Config::default();
        Self {
            archive_path: base.join(&defaults.archive_path),
            extract_dir: base.join(&defaults.extract_dir),
            image_dir: base.join(&defaults.image_dir),
            ..defaults
        }
    }
}
