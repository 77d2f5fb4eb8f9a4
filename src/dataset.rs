/*!
 * The base table
 *
 * A [`Dataset`] is loaded once, never mutated, and handed by reference to
 * every component that needs it. It also derives the control options the
 * dashboard offers (genders, conditions, billing slider bounds).
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::{Result, DashboardError};
use crate::config::DashboardConfig;
use crate::data_types::Record;
use crate::filter::{FilterCriteria, View};
use crate::reader::{DatasetReader, LoadReport};
use crate::summary::{self, BillingBounds, Summary};

/// Builder for loading the dataset
///
/// # Example
/// ```no_run
/// # use caredash::dataset::DatasetBuilder;
/// let dataset = DatasetBuilder::new()
///     .path("assets/healthcare.csv")
///     .skip_invalid_records(true)
///     .build()?;
/// # Ok::<(), caredash::DashboardError>(())
/// ```
pub struct DatasetBuilder {
    path: Option<PathBuf>,
    config: DashboardConfig,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetBuilder {
    /// Create a new dataset builder with default settings
    pub fn new() -> Self {
        Self {
            path: None,
            config: DashboardConfig::default(),
        }
    }

    /// Start from an existing configuration, including its data path
    pub fn from_config(config: DashboardConfig) -> Self {
        Self {
            path: Some(config.data_path.clone()),
            config,
        }
    }

    /// Set the path to the CSV file
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable skipping invalid records
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.config.skip_invalid_records = skip;
        self
    }

    /// Enable or disable the progress bar
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.enable_progress_bar = show;
        self
    }

    /// Build the dataset, reading the file once
    pub fn build(self) -> Result<Dataset> {
        let path = self.path.ok_or_else(|| DashboardError::Custom {
            message: "Data file path not specified".to_string(),
            suggestion: Some("Use .path() to specify the patient records CSV".to_string()),
        })?;
        self.config.validate()?;

        log::info!("Loading patient records from: {}", path.display());
        let reader = DatasetReader::from_config(&self.config);
        let (records, report) = reader.load_records(&path)?;

        let mut dataset = Dataset::from_records(records);
        dataset.report = report;
        dataset.source = Some(path);
        Ok(dataset)
    }
}

/// The immutable base table
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    genders: Vec<String>,
    conditions: Vec<String>,
    report: LoadReport,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Load a dataset from a CSV file with default settings
    ///
    /// # Example
    /// ```no_run
    /// # use caredash::dataset::Dataset;
    /// let dataset = Dataset::load("assets/healthcare.csv")?;
    /// # Ok::<(), caredash::DashboardError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        DatasetBuilder::new().path(path).build()
    }

    /// Build a dataset from records already in memory
    pub fn from_records(records: Vec<Record>) -> Self {
        let genders = distinct(records.iter().map(|r| r.gender.as_str()));
        let conditions = distinct(records.iter().map(|r| r.medical_condition.as_str()));
        let report = LoadReport {
            records: records.len(),
            missing_billing: records.iter().filter(|r| r.billing_amount.is_none()).count(),
            missing_age: records.iter().filter(|r| r.age.is_none()).count(),
            skipped: 0,
        };

        Self {
            records,
            genders,
            conditions,
            report,
            source: None,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counters from the load
    pub fn report(&self) -> LoadReport {
        self.report
    }

    /// File the dataset was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// A view over every record
    pub fn view(&self) -> View<'_> {
        View::from_records(&self.records)
    }

    /// Apply filter criteria to the whole table
    pub fn filter(&self, criteria: &FilterCriteria) -> View<'_> {
        self.view().filter(criteria)
    }

    /// Create a query builder for this dataset
    pub fn query(&self) -> FilterQuery<'_> {
        FilterQuery::new(self)
    }

    /// Record count and mean billing amount
    pub fn summary(&self) -> Summary {
        summary::summarize(&self.records)
    }

    /// Distinct non-blank genders in order of first appearance
    pub fn gender_options(&self) -> &[String] {
        &self.genders
    }

    /// Distinct non-blank medical conditions in order of first appearance
    pub fn condition_options(&self) -> &[String] {
        &self.conditions
    }

    pub fn has_gender(&self, gender: &str) -> bool {
        self.genders.iter().any(|g| g == gender)
    }

    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions.iter().any(|c| c == condition)
    }

    /// Billing slider range, default and marks; `None` without billing amounts
    pub fn billing_bounds(&self, step: f64) -> Option<BillingBounds> {
        BillingBounds::from_records(&self.records, step)
    }

    /// Median of the non-missing billing amounts
    pub fn median_billing(&self) -> Option<f64> {
        summary::median_billing(&self.records)
    }
}

/// Query builder for the dataset
pub struct FilterQuery<'a> {
    dataset: &'a Dataset,
    criteria: FilterCriteria,
}

impl<'a> FilterQuery<'a> {
    /// Create a new query builder
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            criteria: FilterCriteria::default(),
        }
    }

    /// Filter by gender
    pub fn gender(mut self, gender: &str) -> Self {
        self.criteria.gender = Some(gender.to_string());
        self
    }

    /// Filter by medical condition
    pub fn condition(mut self, condition: &str) -> Self {
        self.criteria.condition = Some(condition.to_string());
        self
    }

    /// Keep records billed at or below `ceiling`
    pub fn billing_ceiling(mut self, ceiling: f64) -> Self {
        self.criteria.billing_ceiling = Some(ceiling);
        self
    }

    /// Execute the query and return the matching view
    pub fn execute(self) -> View<'a> {
        self.dataset.filter(&self.criteria)
    }

    /// Execute the query and return count only
    pub fn count(self) -> usize {
        self.execute().len()
    }
}

fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::YearMonth;
    use chrono::NaiveDate;

    fn record(gender: &str, condition: &str, billing: Option<f64>) -> Record {
        let date = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        Record {
            gender: gender.to_string(),
            age: Some(33),
            medical_condition: condition.to_string(),
            insurance_provider: "Blue Cross".to_string(),
            billing_amount: billing,
            date_of_admission: date,
            year_month: YearMonth::from_date(date),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Male", "Cancer", Some(10.0)),
            record("Female", "Arthritis", None),
            record("Male", "Arthritis", Some(30.0)),
        ])
    }

    #[test]
    fn test_options_in_first_appearance_order() {
        let ds = dataset();
        assert_eq!(ds.gender_options(), ["Male", "Female"]);
        assert_eq!(ds.condition_options(), ["Cancer", "Arthritis"]);
        assert!(ds.has_condition("Cancer"));
        assert!(!ds.has_gender("male"));
    }

    #[test]
    fn test_report_counts_missing() {
        let ds = dataset();
        assert_eq!(ds.report().records, 3);
        assert_eq!(ds.report().missing_billing, 1);
        assert_eq!(ds.report().missing_age, 0);
        assert!(ds.source().is_none());
        assert_eq!(ds.median_billing(), Some(20.0));
    }

    #[test]
    fn test_blank_categories_not_offered() {
        let ds = Dataset::from_records(vec![
            record("", "Cancer", Some(10.0)),
            record("Female", "", Some(20.0)),
            record("Female", "Cancer", None),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.gender_options(), ["Female"]);
        assert_eq!(ds.condition_options(), ["Cancer"]);
        assert!(!ds.has_gender(""));
        assert_eq!(ds.query().gender("Female").count(), 2);
    }

    #[test]
    fn test_query_builder() {
        let ds = dataset();
        assert_eq!(ds.query().gender("Male").count(), 2);
        assert_eq!(ds.query().condition("Arthritis").billing_ceiling(100.0).count(), 1);
        assert_eq!(ds.query().count(), ds.len());
    }

    #[test]
    fn test_builder_requires_path() {
        assert!(matches!(
            DatasetBuilder::new().build(),
            Err(DashboardError::Custom { .. })
        ));
    }
}
