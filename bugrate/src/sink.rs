//! Chart output

use crate::accumulate::resolved_by_date;
use crate::charts::Chart;
use crate::error::Result;
use crate::types::AnnotatedPullRequest;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "sink";

/// ChartSink receives finished charts; it owns file naming and format
pub trait ChartSink {
    /// Returns where the chart was written
    fn render(&self, chart: &Chart) -> Result<PathBuf>;
}

/// Writes each chart as `<dir>/<file_name>.json`
#[derive(Debug, Clone)]
pub struct JsonChartWriter {
    dir: PathBuf,
}

impl JsonChartWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonChartWriter { dir: dir.into() }
    }
}

impl ChartSink for JsonChartWriter {
    fn render(&self, chart: &Chart) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", chart.file_name));
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, chart)?;
        writer.flush()?;
        log::debug!(target: LOG_TARGET, "Wrote '{}' to {:?}", chart.title, path);
        Ok(path)
    }
}

/// Writes `date,issues` rows: issues resolved by `pulls` on each date
pub fn export_resolved_csv<'a, I>(path: &Path, pulls: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a AnnotatedPullRequest>,
{
    let by_date = resolved_by_date(pulls);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "issues"])?;
    for (date, count) in by_date.sorted_entries() {
        writer.write_record([date.to_rfc3339(), count.to_string()])?;
    }
    writer.flush()?;
    Ok(by_date.len())
}
