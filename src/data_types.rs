/*!
 * Data type definitions for patient billing/admission records
 */

use std::fmt;
use serde::{Deserialize, Serialize, Serializer};
use chrono::{Datelike, NaiveDate};

/// One row of the base table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Empty when the source cell was blank
    pub gender: String,
    /// `None` when the source value was blank or not a whole number
    pub age: Option<u32>,
    pub medical_condition: String,
    pub insurance_provider: String,
    /// `None` when the source value could not be coerced to a number
    pub billing_amount: Option<f64>,
    pub date_of_admission: NaiveDate,
    /// Calendar month containing `date_of_admission`, derived at load
    pub year_month: YearMonth,
}

impl Record {
    /// Billing amount with missing values counted as zero
    pub fn billing_or_zero(&self) -> f64 {
        self.billing_amount.unwrap_or(0.0)
    }

    /// True when the age parsed and no categorical field is blank
    pub fn is_complete(&self) -> bool {
        self.age.is_some()
            && !self.gender.is_empty()
            && !self.medical_condition.is_empty()
            && !self.insurance_provider.is_empty()
    }
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a year-month, returning `None` for a month outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rendering shape of the admission trend panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
}

impl ChartType {
    /// Interpret a raw selector value.
    ///
    /// Only `"line"` selects the line chart; every other value renders bars.
    pub fn from_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("line") {
            ChartType::Line
        } else {
            ChartType::Bar
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartType::Line => write!(f, "Line Chart"),
            ChartType::Bar => write!(f, "Bar Chart"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_ordering_and_display() {
        let jan = YearMonth::from_date(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
        let dec = YearMonth::new(2022, 12).unwrap();
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2023-01");
        assert_eq!(YearMonth::new(987, 3).unwrap().to_string(), "0987-03");
        assert!(YearMonth::new(2023, 13).is_none());
    }

    #[test]
    fn test_year_month_serializes_as_string() {
        let ym = YearMonth::new(2024, 6).unwrap();
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2024-06\"");
    }

    #[test]
    fn test_chart_type_from_value() {
        assert_eq!(ChartType::from_value("line"), ChartType::Line);
        assert_eq!(ChartType::from_value(" Line "), ChartType::Line);
        assert_eq!(ChartType::from_value("bar"), ChartType::Bar);
        assert_eq!(ChartType::from_value("scatter"), ChartType::Bar);
        assert_eq!(ChartType::default(), ChartType::Line);
    }
}
