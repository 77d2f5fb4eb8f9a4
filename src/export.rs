/*!
 * Export functionality for dashboard snapshots
 *
 * Writes the chart-ready tables for one control state either as a single JSON
 * document or as one flat CSV file per panel.
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use csv::WriterBuilder;
use serde::Serialize;

use crate::{Result, DashboardError, ExportFormat};
use crate::analytics::ChartOutput;
use crate::dashboard::DashboardSnapshot;

/// Trait for implementing snapshot exporters
pub trait SnapshotExporter {
    /// Export the snapshot
    fn export(&self, snapshot: &DashboardSnapshot, path: &Path) -> Result<()>;

    /// Get the export format
    fn format(&self) -> ExportFormat;
}

/// Exporter for a given format with default settings
pub fn exporter_for(format: ExportFormat) -> Box<dyn SnapshotExporter> {
    match format {
        ExportFormat::Json => Box::new(JsonExporter::new()),
        ExportFormat::Csv => Box::new(CsvExporter::new()),
    }
}

/// JSON exporter
pub struct JsonExporter {
    /// Whether to pretty-print the JSON
    pub pretty_print: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

impl JsonExporter {
    /// Create a new JSON exporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pretty printing
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Write the snapshot to any writer
    pub fn write_to<W: Write>(&self, snapshot: &DashboardSnapshot, mut writer: W) -> Result<()> {
        if self.pretty_print {
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
        } else {
            serde_json::to_writer(&mut writer, snapshot)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl SnapshotExporter for JsonExporter {
    fn export(&self, snapshot: &DashboardSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(snapshot, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }
}

/// CSV exporter
///
/// `path` is a directory; one file per panel is written into it. A panel with
/// no data produces a file with only the header row.
pub struct CsvExporter {
    /// Whether to include headers
    pub include_headers: bool,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
        }
    }
}

#[derive(Serialize)]
struct SummaryRow {
    record_count: usize,
    mean_billing: String,
}

#[derive(Serialize)]
struct AgeRow<'a> {
    bin_lower: f64,
    bin_upper: f64,
    gender: &'a str,
    count: usize,
}

#[derive(Serialize)]
struct BillingRow {
    bin_lower: f64,
    bin_upper: f64,
    count: usize,
}

impl CsvExporter {
    /// File names written into the output directory
    pub const FILES: [&'static str; 6] = [
        "summary.csv",
        "age_distribution.csv",
        "condition_distribution.csv",
        "insurance_comparison.csv",
        "billing_distribution.csv",
        "admission_trends.csv",
    ];

    /// Create a new CSV exporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to write header rows
    pub fn with_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }

    fn write_rows<S, I>(&self, path: &Path, headers: &[&str], rows: I) -> Result<()>
    where
        S: Serialize,
        I: IntoIterator<Item = S>,
    {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_path(path)?;

        if self.include_headers {
            writer.write_record(headers)?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn rows_of<'s, T, R, F>(output: &'s ChartOutput<T>, f: F) -> Vec<R>
where
    F: FnOnce(&'s T) -> Vec<R>,
{
    output.ready().map(f).unwrap_or_default()
}

impl SnapshotExporter for CsvExporter {
    fn export(&self, snapshot: &DashboardSnapshot, path: &Path) -> Result<()> {
        if path.exists() && !path.is_dir() {
            return Err(DashboardError::Export {
                message: format!("'{}' is not a directory", path.display()),
                format: ExportFormat::Csv,
                suggestion: Some("CSV export writes one file per panel; pass a directory".to_string()),
            });
        }
        std::fs::create_dir_all(path)?;

        self.write_rows(
            &path.join(Self::FILES[0]),
            &["record_count", "mean_billing"],
            [SummaryRow {
                record_count: snapshot.summary.record_count,
                mean_billing: snapshot.summary.mean_billing.to_string(),
            }],
        )?;

        let age_rows = rows_of(&snapshot.age_distribution, |age| {
            age.series
                .iter()
                .flat_map(|s| {
                    age.bins.iter().zip(&s.counts).map(move |(bin, count)| AgeRow {
                        bin_lower: bin.lower,
                        bin_upper: bin.upper,
                        gender: &s.gender,
                        count: *count,
                    })
                })
                .collect()
        });
        self.write_rows(
            &path.join(Self::FILES[1]),
            &["bin_lower", "bin_upper", "gender", "count"],
            age_rows,
        )?;

        self.write_rows(
            &path.join(Self::FILES[2]),
            &["condition", "count", "proportion"],
            rows_of(&snapshot.condition_distribution, |d| d.slices.iter().collect()),
        )?;

        self.write_rows(
            &path.join(Self::FILES[3]),
            &["provider", "condition", "total_billing"],
            rows_of(&snapshot.insurance_comparison, |c| c.rows.iter().collect()),
        )?;

        let billing_rows = rows_of(&snapshot.billing_distribution, |b| {
            b.bins
                .iter()
                .zip(&b.counts)
                .map(|(bin, count)| BillingRow {
                    bin_lower: bin.lower,
                    bin_upper: bin.upper,
                    count: *count,
                })
                .collect()
        });
        self.write_rows(
            &path.join(Self::FILES[4]),
            &["bin_lower", "bin_upper", "count"],
            billing_rows,
        )?;

        self.write_rows(
            &path.join(Self::FILES[5]),
            &["year_month", "count"],
            rows_of(&snapshot.admission_trends, |t| t.points.iter().collect()),
        )?;

        Ok(())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }
}
