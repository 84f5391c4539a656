use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::charts::{
    BarChart, Chart, ChartRenderer, DistributionChart, DistributionStyle, FacetedHistogram,
    GroupedBarChart,
};
use crate::config::Config;
use crate::data::aggregate::{group_count, value_counts};
use crate::data::binning::bin;
use crate::data::loader;
use crate::data::model::Table;
use crate::report;

pub const TARGET_COLUMN: &str = "Risk";
pub const AGE_COLUMN: &str = "Age";
pub const AGE_CATEGORY_COLUMN: &str = "Age_Categorical";
pub const CREDIT_AMOUNT_COLUMN: &str = "Credit amount";

const AGE_HISTOGRAM_BINS: usize = 10;

// ---------------------------------------------------------------------------
// Explorer – load → describe → visualize
// ---------------------------------------------------------------------------

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub columns: usize,
    pub charts: Vec<PathBuf>,
}

pub struct Explorer {
    pub config: Config,
    renderer: ChartRenderer,
}

impl Explorer {
    pub fn new(config: Config) -> Self {
        let renderer = ChartRenderer::new(&config);
        Self { config, renderer }
    }

    /// Run the whole pipeline, printing the reports to stdout.
    pub fn run(&self) -> Result<RunSummary> {
        let table = loader::load(&self.config)?;

        println!("{}", self.describe(&table));

        let charts = self.explore(&table)?;
        Ok(RunSummary {
            rows: table.n_rows(),
            columns: table.n_columns(),
            charts,
        })
    }

    /// First rows, column info, unique counts and numeric summary.
    pub fn describe(&self, table: &Table) -> String {
        let opts = &self.config.display;
        [
            report::format_head(table, self.config.head_rows, opts),
            report::format_info(table),
            report::format_nunique(table),
            report::format_describe(table, opts),
        ]
        .join("\n\n")
    }

    /// Render every exploratory chart. Returns the written file paths.
    pub fn explore(&self, table: &Table) -> Result<Vec<PathBuf>> {
        let age_bins = self.config.age_bins().context("age bin configuration")?;
        let with_age_groups =
            bin(table, AGE_COLUMN, &age_bins, AGE_CATEGORY_COLUMN).context("binning ages")?;

        let charts = build_charts(&with_age_groups)?;

        charts
            .iter()
            .map(|(name, chart)| {
                self.renderer
                    .render(name, chart)
                    .with_context(|| format!("rendering chart '{name}'"))
            })
            .collect()
    }
}

/// The fixed chart set, by output file name.
fn build_charts(table: &Table) -> Result<Vec<(&'static str, Chart)>> {
    let target_counts = value_counts(table, TARGET_COLUMN)?;
    let housing_risk = group_count(table, "Housing", TARGET_COLUMN)?;
    let job_risk = group_count(table, "Job", TARGET_COLUMN)?;
    for agg in [&housing_risk, &job_risk] {
        log::info!(
            "{} x {}: {} groups over {} rows",
            agg.column_a,
            agg.column_b,
            agg.len(),
            agg.total()
        );
    }

    let boxed = |x: &str| -> Result<Chart> {
        Ok(Chart::Distribution(DistributionChart::from_table(
            table,
            x,
            TARGET_COLUMN,
            CREDIT_AMOUNT_COLUMN,
            DistributionStyle::Box,
        )?))
    };

    Ok(vec![
        (
            "target_distribution",
            Chart::Bars(BarChart::from_counts(
                "Risk distribution",
                TARGET_COLUMN,
                &target_counts,
            )),
        ),
        (
            "AgevsRisk",
            Chart::Histogram(FacetedHistogram::from_table(
                table,
                AGE_COLUMN,
                TARGET_COLUMN,
                AGE_HISTOGRAM_BINS,
            )?),
        ),
        ("AgevsCreditAmt", boxed(AGE_CATEGORY_COLUMN)?),
        ("SexvsCreditAmt", boxed("Sex")?),
        (
            "HousingvsRisk",
            Chart::GroupedBars(GroupedBarChart::from_aggregate(
                "Housing vs Risk",
                &housing_risk,
            )),
        ),
        (
            "HousingvsCreditAmt",
            Chart::Distribution(DistributionChart::from_table(
                table,
                "Housing",
                TARGET_COLUMN,
                CREDIT_AMOUNT_COLUMN,
                DistributionStyle::Violin,
            )?),
        ),
        (
            "JobvsRisk",
            Chart::GroupedBars(GroupedBarChart::from_aggregate("Job vs Risk", &job_risk)),
        ),
        ("JobvsCreditAmt", boxed("Job")?),
    ])
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use super::*;
    use crate::config::ChartOptions;
    use crate::error::{LoadError, TableError};
    use tempfile::TempDir;

    /// A small credit table in the layout of the real dataset.
    fn credit_csv() -> String {
        let housing = ["own", "rent", "free"];
        let sex = ["male", "female"];
        let mut csv = String::from(concat!(
            ",Age,Sex,Job,Housing,Saving accounts,Checking account,",
            "Credit amount,Duration,Purpose,Risk\n",
        ));
        for i in 0..60usize {
            let age = 19 + (i * 7) % 56;
            let risk = if i % 3 == 0 { "bad" } else { "good" };
            let savings = if i % 5 == 0 { "NA" } else { "little" };
            csv.push_str(&format!(
                "{i},{age},{},{},{},{savings},moderate,{},{},car,{risk}\n",
                sex[i % 2],
                i % 4,
                housing[i % 3],
                500 + (i * 137) % 9000,
                6 + i % 40,
            ));
        }
        csv
    }

    fn setup(dir: &TempDir) -> Config {
        let mut cfg = Config::rooted_at(dir.path());
        cfg.chart = ChartOptions {
            width: 400,
            height: 250,
        };
        let file = File::create(&cfg.archive_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("german_credit_data.csv", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(credit_csv().as_bytes()).unwrap();
        zip.finish().unwrap();
        cfg
    }

    #[test]
    fn run_renders_every_chart() {
        let dir = TempDir::new().unwrap();
        let cfg = setup(&dir);

        let summary = Explorer::new(cfg.clone()).run().unwrap();

        assert_eq!(summary.rows, 60);
        assert_eq!(summary.columns, 10);
        let names: Vec<String> = summary
            .charts
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "target_distribution",
                "AgevsRisk",
                "AgevsCreditAmt",
                "SexvsCreditAmt",
                "HousingvsRisk",
                "HousingvsCreditAmt",
                "JobvsRisk",
                "JobvsCreditAmt",
            ]
        );
        for path in &summary.charts {
            assert!(path.is_file(), "{} missing", path.display());
            image::open(path).unwrap();
            assert!(path.starts_with(&cfg.image_dir));
        }
    }

    #[test]
    fn describe_contains_every_report() {
        let dir = TempDir::new().unwrap();
        let cfg = setup(&dir);
        let explorer = Explorer::new(cfg);
        let table = loader::load(&explorer.config).unwrap();

        let text = explorer.describe(&table);
        assert!(text.contains("RangeIndex: 60 entries, 0 to 59"));
        assert!(text.contains("dtype: int64"));
        assert!(text.lines().any(|l| l.starts_with("mean")));
        assert!(text.contains("Credit amount"));
    }

    #[test]
    fn missing_archive_stops_the_run() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::rooted_at(dir.path());

        let err = Explorer::new(cfg).run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingInput(_))
        ));
    }

    #[test]
    fn explore_requires_expected_columns() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::rooted_at(dir.path());
        let table = Table::default();

        let err = Explorer::new(cfg).explore(&table).unwrap_err();
        assert!(format!("{err:#}").contains("Column not found: 'Age'"));
    }

    #[test]
    fn invalid_age_bins_stop_before_charts() {
        let dir = TempDir::new().unwrap();
        let mut cfg = setup(&dir);
        cfg.age_boundaries = vec![18.0, 60.0, 35.0, 120.0, 130.0];
        let explorer = Explorer::new(cfg);
        let table = loader::load(&explorer.config).unwrap();

        let err = explorer.explore(&table).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TableError>(),
            Some(TableError::InvalidBins(_))
        ));
        assert!(!explorer.config.image_dir.join("AgevsRisk.jpeg").exists());
    }
}
