/*!
 * Chart aggregators
 *
 * Each aggregator is a pure function from a [`View`] to the table one chart
 * panel draws. An empty view yields [`ChartOutput::NoData`] rather than a
 * chart over an undefined range.
 */

use std::collections::{BTreeMap, HashMap};
use serde::Serialize;

use crate::{
    constants::HISTOGRAM_BINS,
    data_types::{ChartType, Record, YearMonth},
    filter::View,
    histogram::{Bin, BinEdges},
};

/// Result of an aggregation: either chart data or an explicit empty state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ChartOutput<T> {
    NoData,
    Ready(T),
}

impl<T> ChartOutput<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartOutput::NoData)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartOutput::Ready(data) => Some(data),
            ChartOutput::NoData => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            ChartOutput::Ready(data) => Some(data),
            ChartOutput::NoData => None,
        }
    }
}

/// Age histogram with one series per gender, sharing bin edges
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeDistribution {
    pub bins: Vec<Bin>,
    pub series: Vec<GenderSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderSeries {
    pub gender: String,
    /// Count per bin, aligned with `AgeDistribution::bins`
    pub counts: Vec<usize>,
}

/// Record count per medical condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionDistribution {
    pub total: usize,
    pub slices: Vec<ConditionSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSlice {
    pub condition: String,
    pub count: usize,
    /// Share of `total`, in `[0, 1]`
    pub proportion: f64,
}

/// Billing totals grouped by provider, then by condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsuranceComparison {
    /// Distinct providers, in order of first appearance
    pub providers: Vec<String>,
    /// Distinct conditions, in order of first appearance
    pub conditions: Vec<String>,
    pub rows: Vec<InsuranceRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsuranceRow {
    pub provider: String,
    pub condition: String,
    pub total_billing: f64,
}

/// Histogram of billing amounts at or below a ceiling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingDistribution {
    pub ceiling: f64,
    pub bins: Vec<Bin>,
    pub counts: Vec<usize>,
}

/// Admissions per month, ascending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionTrend {
    pub chart_type: ChartType,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub year_month: String,
    pub count: usize,
}

/// Ten equal-width age bins over the view's age range, counted per gender.
///
/// Records with a missing age are left out.
pub fn aggregate_age(view: &View<'_>) -> ChartOutput<AgeDistribution> {
    let aged: Vec<(&Record, f64)> = view
        .iter()
        .filter_map(|r| r.age.map(|age| (r, age as f64)))
        .collect();

    let Some(edges) = BinEdges::spanning(aged.iter().map(|(_, age)| *age), HISTOGRAM_BINS) else {
        return ChartOutput::NoData;
    };

    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut series: Vec<GenderSeries> = Vec::new();

    for &(record, age) in &aged {
        let slot = *order.entry(record.gender.as_str()).or_insert_with(|| {
            series.push(GenderSeries {
                gender: record.gender.clone(),
                counts: vec![0; edges.count()],
            });
            series.len() - 1
        });
        series[slot].counts[edges.index_of(age)] += 1;
    }

    ChartOutput::Ready(AgeDistribution {
        bins: edges.bins(),
        series,
    })
}

/// Count records per distinct condition present in the view
pub fn aggregate_conditions(view: &View<'_>) -> ChartOutput<ConditionDistribution> {
    if view.is_empty() {
        return ChartOutput::NoData;
    }

    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for record in view {
        let key = record.medical_condition.as_str();
        let slot = *order.entry(key).or_insert_with(|| {
            counts.push((key, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }

    let total = view.len();
    let slices = counts
        .into_iter()
        .map(|(condition, count)| ConditionSlice {
            condition: condition.to_string(),
            count,
            proportion: count as f64 / total as f64,
        })
        .collect();

    ChartOutput::Ready(ConditionDistribution { total, slices })
}

/// Sum billing per (provider, condition); missing amounts add nothing
pub fn aggregate_insurance(view: &View<'_>) -> ChartOutput<InsuranceComparison> {
    if view.is_empty() {
        return ChartOutput::NoData;
    }

    let mut providers: Vec<String> = Vec::new();
    let mut conditions: Vec<String> = Vec::new();
    let mut provider_order: HashMap<&str, usize> = HashMap::new();
    let mut condition_order: HashMap<&str, usize> = HashMap::new();
    let mut totals: BTreeMap<(usize, usize), f64> = BTreeMap::new();

    for record in view {
        let p = *provider_order
            .entry(record.insurance_provider.as_str())
            .or_insert_with(|| {
                providers.push(record.insurance_provider.clone());
                providers.len() - 1
            });
        let c = *condition_order
            .entry(record.medical_condition.as_str())
            .or_insert_with(|| {
                conditions.push(record.medical_condition.clone());
                conditions.len() - 1
            });
        *totals.entry((p, c)).or_insert(0.0) += record.billing_or_zero();
    }

    let rows = totals
        .into_iter()
        .map(|((p, c), total_billing)| InsuranceRow {
            provider: providers[p].clone(),
            condition: conditions[c].clone(),
            total_billing,
        })
        .collect();

    ChartOutput::Ready(InsuranceComparison { providers, conditions, rows })
}

/// Ten equal-width bins over the billing amounts at or below `ceiling`.
///
/// The range comes from the rows that pass the ceiling, so bins rescale as
/// the ceiling moves. Missing amounts are excluded.
pub fn aggregate_billing(view: &View<'_>, ceiling: f64) -> ChartOutput<BillingDistribution> {
    let amounts: Vec<f64> = view
        .iter()
        .filter_map(|r| r.billing_amount)
        .filter(|amount| *amount <= ceiling)
        .collect();

    let Some(edges) = BinEdges::spanning(amounts.iter().copied(), HISTOGRAM_BINS) else {
        return ChartOutput::NoData;
    };

    ChartOutput::Ready(BillingDistribution {
        ceiling,
        bins: edges.bins(),
        counts: edges.tally(amounts),
    })
}

/// Admissions per year-month, sorted ascending.
///
/// `chart_type` is carried through for rendering and does not affect counts.
pub fn aggregate_trend(view: &View<'_>, chart_type: ChartType) -> ChartOutput<AdmissionTrend> {
    if view.is_empty() {
        return ChartOutput::NoData;
    }

    let mut buckets: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for record in view {
        *buckets.entry(record.year_month).or_insert(0) += 1;
    }

    let points = buckets
        .into_iter()
        .map(|(year_month, count)| TrendPoint {
            year_month: year_month.to_string(),
            count,
        })
        .collect();

    ChartOutput::Ready(AdmissionTrend { chart_type, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriteria;
    use chrono::NaiveDate;

    fn record(gender: &str, age: u32, condition: &str, provider: &str, billing: Option<f64>, date: (i32, u32, u32)) -> Record {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        Record {
            gender: gender.to_string(),
            age: Some(age),
            medical_condition: condition.to_string(),
            insurance_provider: provider.to_string(),
            billing_amount: billing,
            date_of_admission: date,
            year_month: YearMonth::from_date(date),
        }
    }

    fn table() -> Vec<Record> {
        vec![
            record("Female", 20, "Diabetes", "Aetna", Some(1000.0), (2023, 3, 14)),
            record("Male", 80, "Asthma", "Cigna", Some(3000.0), (2022, 11, 2)),
            record("Male", 35, "Diabetes", "Aetna", None, (2023, 3, 1)),
            record("Female", 50, "Obesity", "Cigna", Some(2500.0), (2023, 1, 20)),
            record("Female", 65, "Diabetes", "Cigna", Some(500.0), (2022, 11, 30)),
        ]
    }

    #[test]
    fn test_age_bins_per_gender() {
        let table = table();
        let age = aggregate_age(&View::from_records(&table)).into_ready().unwrap();
        assert_eq!(age.bins.len(), 10);
        assert_eq!(age.bins[0].lower, 20.0);
        assert_eq!(age.bins[9].upper, 80.0);
        let genders: Vec<_> = age.series.iter().map(|s| s.gender.as_str()).collect();
        assert_eq!(genders, vec!["Female", "Male"]);
        assert_eq!(age.series[0].counts.iter().sum::<usize>(), 3);
        assert_eq!(age.series[1].counts.iter().sum::<usize>(), 2);
        assert_eq!(age.series[1].counts[9], 1);
    }

    #[test]
    fn test_age_range_follows_view() {
        let table = table();
        let women = View::from_records(&table).filter(&FilterCriteria::new().gender("Female"));
        let age = aggregate_age(&women).into_ready().unwrap();
        assert_eq!(age.bins[0].lower, 20.0);
        assert_eq!(age.bins[9].upper, 65.0);
        assert_eq!(age.series.len(), 1);
    }

    #[test]
    fn test_missing_age_left_out_of_bins() {
        let mut table = table();
        table[1].age = None;
        let age = aggregate_age(&View::from_records(&table)).into_ready().unwrap();
        assert_eq!(age.bins[9].upper, 65.0);
        let total: usize = age.series.iter().map(|s| s.counts.iter().sum::<usize>()).sum();
        assert_eq!(total, 4);

        let unknown: Vec<Record> = table.into_iter().map(|r| Record { age: None, ..r }).collect();
        assert!(aggregate_age(&View::from_records(&unknown)).is_no_data());
    }

    #[test]
    fn test_conditions_from_view() {
        let table = table();
        let men = View::from_records(&table).filter(&FilterCriteria::new().gender("Male"));
        let dist = aggregate_conditions(&men).into_ready().unwrap();
        assert_eq!(dist.total, 2);
        let names: Vec<_> = dist.slices.iter().map(|s| s.condition.as_str()).collect();
        assert_eq!(names, vec!["Asthma", "Diabetes"]);
        assert!(dist.slices.iter().all(|s| (s.proportion - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_insurance_sum_matches_view_total() {
        let table = table();
        let view = View::from_records(&table);
        let cmp = aggregate_insurance(&view).into_ready().unwrap();
        assert_eq!(cmp.providers, vec!["Aetna", "Cigna"]);
        assert_eq!(cmp.conditions, vec!["Diabetes", "Asthma", "Obesity"]);

        let total: f64 = cmp.rows.iter().map(|r| r.total_billing).sum();
        let expected: f64 = view.iter().map(|r| r.billing_or_zero()).sum();
        assert_eq!(total, expected);

        let aetna_diabetes = &cmp.rows[0];
        assert_eq!((aetna_diabetes.provider.as_str(), aetna_diabetes.condition.as_str()), ("Aetna", "Diabetes"));
        assert_eq!(aetna_diabetes.total_billing, 1000.0);
    }

    #[test]
    fn test_billing_rescales_with_ceiling() {
        let table = table();
        let view = View::from_records(&table);

        let wide = aggregate_billing(&view, 10_000.0).into_ready().unwrap();
        assert_eq!(wide.counts.len(), 10);
        assert_eq!(wide.counts.iter().sum::<usize>(), 4);
        assert_eq!(wide.bins[0].lower, 500.0);
        assert_eq!(wide.bins[9].upper, 3000.0);

        let narrow = aggregate_billing(&view, 2500.0).into_ready().unwrap();
        assert_eq!(narrow.counts.len(), 10);
        assert_eq!(narrow.counts.iter().sum::<usize>(), 3);
        assert_eq!(narrow.bins[9].upper, 2500.0);
    }

    #[test]
    fn test_billing_no_rows_under_ceiling() {
        let table = table();
        let view = View::from_records(&table);
        assert!(aggregate_billing(&view, 10.0).is_no_data());
        assert!(aggregate_billing(&view, f64::NAN).is_no_data());
    }

    #[test]
    fn test_trend_sorted_and_complete() {
        let table = table();
        let view = View::from_records(&table);
        let trend = aggregate_trend(&view, ChartType::Bar).into_ready().unwrap();
        assert_eq!(trend.chart_type, ChartType::Bar);
        let months: Vec<_> = trend.points.iter().map(|p| p.year_month.as_str()).collect();
        assert_eq!(months, vec!["2022-11", "2023-01", "2023-03"]);
        assert_eq!(trend.points.iter().map(|p| p.count).sum::<usize>(), view.len());

        let line = aggregate_trend(&view, ChartType::Line).into_ready().unwrap();
        assert_eq!(line.points, trend.points);
    }

    #[test]
    fn test_empty_view_is_no_data_everywhere() {
        let view = View::default();
        assert!(aggregate_age(&view).is_no_data());
        assert!(aggregate_conditions(&view).is_no_data());
        assert!(aggregate_insurance(&view).is_no_data());
        assert!(aggregate_billing(&view, 1e9).is_no_data());
        assert!(aggregate_trend(&view, ChartType::Line).is_no_data());
    }

    #[test]
    fn test_no_data_serialization() {
        let empty: ChartOutput<AdmissionTrend> = ChartOutput::NoData;
        assert_eq!(serde_json::to_string(&empty).unwrap(), r#"{"status":"no_data"}"#);
    }
}
