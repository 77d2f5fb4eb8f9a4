/*!
 * Process-lifetime statistics over the base table
 *
 * [`Summary`] feeds the headline figures. [`BillingBounds`] feeds the billing
 * ceiling slider (range, default position and quartile marks).
 */

use serde::Serialize;

use crate::data_types::Record;

/// Headline statistics of a table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    /// Mean of the non-missing billing amounts; `NaN` when there are none.
    /// JSON has no NaN, so serde_json writes it as `null`.
    pub mean_billing: f64,
}

impl Summary {
    /// `Total Patient Records: N`
    pub fn record_count_label(&self) -> String {
        format!("Total Patient Records: {}", self.record_count)
    }

    /// `Average Billing Amount: 12,345.68`, or `NaN` when undefined
    pub fn mean_billing_label(&self) -> String {
        format!("Average Billing Amount: {}", format_thousands(self.mean_billing, 2))
    }

    /// Print formatted statistics
    pub fn print_summary(&self) {
        println!("=== Healthcare Dashboard ===");
        println!("{}", self.record_count_label());
        println!("{}", self.mean_billing_label());
    }
}

/// Count the records and average their billing amounts
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut record_count = 0;
    let mut billed = 0usize;
    let mut total = 0.0;

    for record in records {
        record_count += 1;
        if let Some(amount) = record.billing_amount {
            billed += 1;
            total += amount;
        }
    }

    let mean_billing = if billed == 0 { f64::NAN } else { total / billed as f64 };

    Summary { record_count, mean_billing }
}

/// Range and landmarks of the billing ceiling slider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingBounds {
    pub min: f64,
    pub max: f64,
    /// Default slider position
    pub median: f64,
    pub step: f64,
    pub marks: Vec<SliderMark>,
}

/// A labelled tick on the billing slider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliderMark {
    pub value: i64,
    pub label: String,
}

impl BillingBounds {
    /// Quantiles at which slider marks are placed
    pub const MARK_QUANTILES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

    /// Compute slider bounds over non-missing billing amounts.
    ///
    /// Returns `None` when no record has a billing amount.
    pub fn from_records<'a, I>(records: I, step: f64) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let values = sorted_billing(records);
        if values.is_empty() {
            return None;
        }

        let mut marks: Vec<SliderMark> = Vec::with_capacity(Self::MARK_QUANTILES.len());
        for q in Self::MARK_QUANTILES {
            let value = quantile(&values, q).trunc() as i64;
            if marks.iter().all(|m| m.value != value) {
                marks.push(SliderMark {
                    value,
                    label: format!("${}", format_thousands(value as f64, 0)),
                });
            }
        }

        Some(Self {
            min: values[0],
            max: values[values.len() - 1],
            median: quantile(&values, 0.5),
            step,
            marks,
        })
    }
}

/// Median of the non-missing billing amounts; `None` when there are none
pub fn median_billing<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let values = sorted_billing(records);
    (!values.is_empty()).then(|| quantile(&values, 0.5))
}

fn sorted_billing<'a, I>(records: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut values: Vec<f64> = records.into_iter().filter_map(|r| r.billing_amount).collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Linear-interpolated quantile of sorted, non-empty `values`
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Format a number with `,` thousands separators and fixed decimals
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() { "NaN".to_string() } else { value.to_string() };
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
