/*!
 * CSV reader for patient billing/admission records
 *
 * Reads the source file once into typed [`Record`]s. Billing amounts and ages
 * that do not parse become missing values and blank categories load as empty
 * strings. Admission dates that do not parse fail the whole load.
 */

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use csv::ReaderBuilder;
use chrono::NaiveDate;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Result, DashboardError, ErrorContext,
    config::DashboardConfig,
    data_types::*,
    schema::*,
};

/// Counters collected while reading a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows kept in the table
    pub records: usize,
    /// Rows whose billing amount was coerced to missing
    pub missing_billing: usize,
    /// Rows whose age was blank or malformed
    pub missing_age: usize,
    /// Incomplete rows dropped because `skip_invalid_records` was set
    pub skipped: usize,
}

/// Patient records reader
pub struct DatasetReader {
    /// Whether to drop rows with a malformed age or empty category (true) or keep them (false)
    skip_invalid_records: bool,
    /// Accepted admission date formats, tried in order
    date_formats: Vec<String>,
    /// Whether to show progress bar
    #[cfg(feature = "progress")]
    show_progress_bar: bool,
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetReader {
    /// Create a new reader with default settings
    pub fn new() -> Self {
        Self::from_config(&DashboardConfig::default())
    }

    /// Create a reader that follows the loading settings of `config`
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            skip_invalid_records: config.skip_invalid_records,
            date_formats: config.date_formats.clone(),
            #[cfg(feature = "progress")]
            show_progress_bar: config.enable_progress_bar,
        }
    }

    /// Enable or disable skipping invalid records
    pub fn with_skip_invalid_records(mut self, skip: bool) -> Self {
        self.skip_invalid_records = skip;
        self
    }

    #[cfg(feature = "progress")]
    /// Enable or disable the progress bar
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress_bar = show;
        self
    }

    /// Load all records from a CSV file
    pub fn load_records<P: AsRef<Path>>(&self, path: P) -> Result<(Vec<Record>, LoadReport)> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DashboardError::file_not_found_with_suggestion(path.to_path_buf()));
        }

        let file = File::open(path)?;

        #[cfg(feature = "progress")]
        let progress_bar = if self.show_progress_bar {
            let pb = ProgressBar::new(file.metadata()?.len());
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        #[cfg(feature = "progress")]
        let result = self.read_inner(file, Some(path), progress_bar.as_ref());
        #[cfg(not(feature = "progress"))]
        let result = self.read_inner(file, Some(path));

        #[cfg(feature = "progress")]
        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        result
    }

    /// Load all records from any CSV source with a header row
    pub fn read_from<R: Read>(&self, source: R) -> Result<(Vec<Record>, LoadReport)> {
        #[cfg(feature = "progress")]
        return self.read_inner(source, None, None);
        #[cfg(not(feature = "progress"))]
        return self.read_inner(source, None);
    }

    fn read_inner<R: Read>(
        &self,
        source: R,
        path: Option<&Path>,
        #[cfg(feature = "progress")] progress_bar: Option<&ProgressBar>,
    ) -> Result<(Vec<Record>, LoadReport)> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        let columns = DashboardSchema::resolve_headers(&headers)?;

        let mut records = Vec::new();
        let mut report = LoadReport::default();
        let start_time = Instant::now();

        for (idx, result) in reader.records().enumerate() {
            // +2 for header and 0-based index
            let line_number = idx + 2;

            let csv_record = result.map_err(|e| DashboardError::CsvParse {
                message: e.to_string(),
                line: Some(line_number),
                context: ErrorContext {
                    file_path: path.map(Path::to_path_buf),
                    line_number: Some(line_number),
                    ..Default::default()
                },
            })?;

            #[cfg(feature = "progress")]
            if let Some(pb) = progress_bar {
                pb.set_position(csv_record.position().map(|p| p.byte()).unwrap_or(0));
            }

            let record = self.parse_record(&csv_record, &columns, line_number)?;

            if self.skip_invalid_records && !record.is_complete() {
                report.skipped += 1;
                if report.skipped <= 10 {
                    log::warn!("Skipping incomplete record on line {}", line_number);
                }
                continue;
            }

            if record.billing_amount.is_none() {
                report.missing_billing += 1;
                log::debug!("Line {}: billing amount coerced to missing", line_number);
            }
            if record.age.is_none() {
                report.missing_age += 1;
                log::debug!("Line {}: age coerced to missing", line_number);
            }
            records.push(record);
        }

        report.records = records.len();

        log::info!(
            "Loaded {} records in {:.2}s ({} missing billing amounts, {} skipped)",
            report.records,
            start_time.elapsed().as_secs_f64(),
            report.missing_billing,
            report.skipped
        );

        Ok((records, report))
    }

    /// Parse one CSV row into a record
    fn parse_record(
        &self,
        record: &csv::StringRecord,
        columns: &ColumnIndex,
        line_number: usize,
    ) -> Result<Record> {
        let get_field = |index: usize| {
            record.get(index)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let get_category = |index: usize| get_field(index).unwrap_or_default().to_string();

        let date_of_admission = match get_field(columns.date_of_admission) {
            Some(raw) => self.parse_date(raw, line_number)?,
            None => {
                return Err(DashboardError::date_parse_with_formats("", &self.date_formats, line_number))
            }
        };

        Ok(Record {
            gender: get_category(columns.gender),
            age: get_field(columns.age).and_then(parse_age),
            medical_condition: get_category(columns.medical_condition),
            insurance_provider: get_category(columns.insurance_provider),
            billing_amount: get_field(columns.billing_amount).and_then(coerce_billing),
            date_of_admission,
            year_month: YearMonth::from_date(date_of_admission),
        })
    }

    /// Parse an admission date using the first matching format
    fn parse_date(&self, date_str: &str, line_number: usize) -> Result<NaiveDate> {
        self.date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(date_str, format).ok())
            .ok_or_else(|| {
                DashboardError::date_parse_with_formats(date_str, &self.date_formats, line_number)
            })
    }
}

// Helper functions

/// Coerce a billing amount to a number, mapping failures to missing
fn coerce_billing(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an age given either as an integer or an integral decimal (`"42.0"`)
fn parse_age(raw: &str) -> Option<u32> {
    if let Ok(age) = raw.parse::<u32>() {
        return Some(age);
    }
    let value = raw.parse::<f64>().ok()?;
    (value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}
