/*!
 * Control state and panel wiring
 *
 * The hosting UI owns the controls and calls into [`Dashboard`] whenever one
 * changes. Each panel reads only the controls it is wired to:
 *
 * | panel                  | controls                 |
 * |------------------------|--------------------------|
 * | age distribution       | gender                   |
 * | condition distribution | gender                   |
 * | insurance comparison   | gender                   |
 * | billing distribution   | gender, billing ceiling  |
 * | admission trends       | condition, chart type    |
 */

use serde::{Deserialize, Serialize};

use crate::analytics::{self, *};
use crate::data_types::ChartType;
use crate::dataset::Dataset;
use crate::filter::{FilterCriteria, View};
use crate::summary::Summary;

/// Current value of every dashboard control, as set by the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    #[serde(default)]
    pub selected_gender: Option<String>,
    #[serde(default)]
    pub selected_condition: Option<String>,
    pub billing_ceiling: f64,
    #[serde(default)]
    pub chart_type: ChartType,
}

impl ControlState {
    /// Controls as first shown: no filters, ceiling at the median billing
    /// amount (NaN when the table has none), line chart.
    pub fn initial(dataset: &Dataset) -> Self {
        Self {
            selected_gender: None,
            selected_condition: None,
            billing_ceiling: dataset.median_billing().unwrap_or(f64::NAN),
            chart_type: ChartType::default(),
        }
    }

    pub fn with_gender(mut self, gender: Option<&str>) -> Self {
        self.selected_gender = gender.map(str::to_string);
        self
    }

    pub fn with_condition(mut self, condition: Option<&str>) -> Self {
        self.selected_condition = condition.map(str::to_string);
        self
    }

    pub fn with_billing_ceiling(mut self, ceiling: f64) -> Self {
        self.billing_ceiling = ceiling;
        self
    }

    pub fn with_chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = chart_type;
        self
    }

    /// Normalize raw control values against the base table.
    ///
    /// Blank values and values the table does not contain mean "no filter";
    /// a non-finite ceiling means "no ceiling".
    pub fn resolve(&self, dataset: &Dataset) -> FilterCriteria {
        FilterCriteria {
            gender: recognized("gender", self.selected_gender.as_deref(), |g| dataset.has_gender(g)),
            condition: recognized("condition", self.selected_condition.as_deref(), |c| {
                dataset.has_condition(c)
            }),
            billing_ceiling: if self.billing_ceiling.is_finite() {
                Some(self.billing_ceiling)
            } else {
                log::warn!("Ignoring non-finite billing ceiling {}", self.billing_ceiling);
                None
            },
        }
    }
}

fn recognized(control: &str, value: Option<&str>, known: impl Fn(&str) -> bool) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if known(value) {
        Some(value.to_string())
    } else {
        log::warn!("Ignoring unrecognized {} filter value '{}'", control, value);
        None
    }
}

/// Headline text shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub total_records: String,
    pub average_billing: String,
}

/// Everything the rendering layer needs for one control state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub summary: Summary,
    pub headline: Headline,
    pub filters: FilterCriteria,
    pub age_distribution: ChartOutput<AgeDistribution>,
    pub condition_distribution: ChartOutput<ConditionDistribution>,
    pub insurance_comparison: ChartOutput<InsuranceComparison>,
    pub billing_distribution: ChartOutput<BillingDistribution>,
    pub admission_trends: ChartOutput<AdmissionTrend>,
}

/// Panel recomputation over a loaded dataset
pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    summary: Summary,
}

impl<'a> Dashboard<'a> {
    /// Wrap a dataset; the summary is computed once here
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            summary: dataset.summary(),
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Rows selected by the global gender control
    fn gender_view(&self, criteria: &FilterCriteria) -> View<'a> {
        self.dataset.filter(&FilterCriteria {
            gender: criteria.gender.clone(),
            ..FilterCriteria::default()
        })
    }

    pub fn age_distribution(&self, controls: &ControlState) -> ChartOutput<AgeDistribution> {
        self.age_distribution_for(&controls.resolve(self.dataset))
    }

    pub fn condition_distribution(&self, controls: &ControlState) -> ChartOutput<ConditionDistribution> {
        self.condition_distribution_for(&controls.resolve(self.dataset))
    }

    pub fn insurance_comparison(&self, controls: &ControlState) -> ChartOutput<InsuranceComparison> {
        self.insurance_comparison_for(&controls.resolve(self.dataset))
    }

    pub fn billing_distribution(&self, controls: &ControlState) -> ChartOutput<BillingDistribution> {
        self.billing_distribution_for(&controls.resolve(self.dataset))
    }

    pub fn admission_trends(&self, controls: &ControlState) -> ChartOutput<AdmissionTrend> {
        self.admission_trends_for(&controls.resolve(self.dataset), controls.chart_type)
    }

    fn age_distribution_for(&self, criteria: &FilterCriteria) -> ChartOutput<AgeDistribution> {
        analytics::aggregate_age(&self.gender_view(criteria))
    }

    fn condition_distribution_for(&self, criteria: &FilterCriteria) -> ChartOutput<ConditionDistribution> {
        analytics::aggregate_conditions(&self.gender_view(criteria))
    }

    fn insurance_comparison_for(&self, criteria: &FilterCriteria) -> ChartOutput<InsuranceComparison> {
        analytics::aggregate_insurance(&self.gender_view(criteria))
    }

    fn billing_distribution_for(&self, criteria: &FilterCriteria) -> ChartOutput<BillingDistribution> {
        let ceiling = criteria.billing_ceiling.unwrap_or(f64::INFINITY);
        analytics::aggregate_billing(&self.gender_view(criteria), ceiling)
    }

    fn admission_trends_for(&self, criteria: &FilterCriteria, chart_type: ChartType) -> ChartOutput<AdmissionTrend> {
        let view = self.dataset.filter(&FilterCriteria {
            condition: criteria.condition.clone(),
            ..FilterCriteria::default()
        });
        analytics::aggregate_trend(&view, chart_type)
    }

    /// Recompute every panel for `controls`, resolving them once
    pub fn render(&self, controls: &ControlState) -> DashboardSnapshot {
        let criteria = controls.resolve(self.dataset);

        DashboardSnapshot {
            summary: self.summary,
            headline: Headline {
                total_records: self.summary.record_count_label(),
                average_billing: self.summary.mean_billing_label(),
            },
            age_distribution: self.age_distribution_for(&criteria),
            condition_distribution: self.condition_distribution_for(&criteria),
            insurance_comparison: self.insurance_comparison_for(&criteria),
            billing_distribution: self.billing_distribution_for(&criteria),
            admission_trends: self.admission_trends_for(&criteria, controls.chart_type),
            filters: criteria,
        }
    }
}
