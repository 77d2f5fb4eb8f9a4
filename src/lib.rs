/*!
 * # Healthcare Dashboard Data Library
 *
 * Loads a patient billing/admission dataset once and turns the current
 * dashboard controls into the chart-ready tables each panel draws.
 *
 * ## Features
 *
 * - 📥 **One-shot Loading**: CSV read once into an immutable table, with billing
 *   amounts coerced to numbers and admission dates bucketed by month
 * - 🔍 **Filter Engine**: Conjunctive gender, condition and billing-ceiling predicates
 * - 📊 **Aggregators**: Age and billing histograms, condition shares, insurance
 *   totals and monthly admission trends
 * - 🧩 **Pure Recomputation**: Every panel is a function of the table and the controls
 * - 💾 **Export**: Snapshots as JSON or per-panel CSV
 *
 * ## Quick Start
 *
 * ```no_run
 * use caredash::prelude::*;
 *
 * # fn main() -> Result<()> {
 * let dataset = Dataset::load("assets/healthcare.csv")?;
 * let dashboard = Dashboard::new(&dataset);
 *
 * // Controls as first shown, then the viewer picks a gender
 * let controls = ControlState::initial(&dataset).with_gender(Some("Female"));
 *
 * let snapshot = dashboard.render(&controls);
 * println!("{}", snapshot.headline.total_records);
 *
 * if let ChartOutput::Ready(trend) = &snapshot.admission_trends {
 *     for point in &trend.points {
 *         println!("{}: {}", point.year_month, point.count);
 *     }
 * }
 * # Ok(())
 * # }
 * ```
 *
 * ## Using the Filter Engine Directly
 *
 * ```no_run
 * # use caredash::prelude::*;
 * # fn main() -> Result<()> {
 * # let dataset = Dataset::load("assets/healthcare.csv")?;
 * let view = dataset
 *     .query()
 *     .gender("Male")
 *     .billing_ceiling(20_000.0)
 *     .execute();
 *
 * let billing = aggregate_billing(&view, 20_000.0);
 * let conditions = aggregate_conditions(&view);
 * # Ok(())
 * # }
 * ```
 *
 * ## Configuration
 *
 * ```no_run
 * # use caredash::prelude::*;
 * # fn main() -> Result<()> {
 * let config = ConfigBuilder::new()
 *     .data_path("assets/healthcare.csv")
 *     .progress_bar(false)
 *     .skip_invalid_records(true)
 *     .build();
 *
 * let dataset = DatasetBuilder::from_config(config).build()?;
 * # Ok(())
 * # }
 * ```
 */

// Re-export error types from root
pub use error::{DashboardError, Result, ErrorContext, ExportFormat};

// Public modules
pub mod data_types;
pub mod reader;
pub mod schema;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod analytics;
pub mod summary;
pub mod dataset;
pub mod dashboard;
pub mod export;
pub mod config;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use caredash::prelude::*;
/// ```
pub mod prelude {
    pub use crate::data_types::*;
    pub use crate::reader::{DatasetReader, LoadReport};
    pub use crate::error::{DashboardError, Result};
    pub use crate::filter::{filter, FilterCriteria, View};
    pub use crate::analytics::*;
    pub use crate::summary::{summarize, BillingBounds, Summary};
    pub use crate::dataset::{Dataset, DatasetBuilder, FilterQuery};
    pub use crate::dashboard::{ControlState, Dashboard, DashboardSnapshot};
    pub use crate::export::{SnapshotExporter, JsonExporter, CsvExporter};
    pub use crate::config::{ConfigBuilder, DashboardConfig};
    pub use crate::ExportFormat;
}

/// Dashboard constants
pub mod constants {
    /// Number of equal-width bins in the age and billing histograms
    pub const HISTOGRAM_BINS: usize = 10;

    /// Default location of the patient records file
    pub const DEFAULT_DATA_PATH: &str = "assets/healthcare.csv";

    /// Admission date formats tried in order
    pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y"];

    /// Step of the billing ceiling slider
    pub const DEFAULT_SLIDER_STEP: f64 = 100.0;
}
