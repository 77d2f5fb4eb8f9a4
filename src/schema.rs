/*!
 * Schema definitions for the patient records file
 *
 * The source CSV carries more columns than the dashboard reads (name, blood
 * type, doctor, hospital, ...). Only the required columns below are located,
 * by header name, so column order and extra columns do not matter.
 */

use crate::{DashboardError, Result};

pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const MEDICAL_CONDITION: &str = "Medical Condition";
pub const INSURANCE_PROVIDER: &str = "Insurance Provider";
pub const BILLING_AMOUNT: &str = "Billing Amount";
pub const DATE_OF_ADMISSION: &str = "Date of Admission";

/// Patient records file schema
pub struct DashboardSchema;

impl DashboardSchema {
    /// Columns that must be present in the header row
    pub fn required_columns() -> Vec<&'static str> {
        vec![
            GENDER,
            AGE,
            MEDICAL_CONDITION,
            INSURANCE_PROVIDER,
            BILLING_AMOUNT,
            DATE_OF_ADMISSION,
        ]
    }

    /// Locate every required column in the header row.
    ///
    /// Header names are compared after trimming surrounding whitespace.
    pub fn resolve_headers(headers: &[String]) -> Result<ColumnIndex> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = Self::required_columns()
            .into_iter()
            .filter(|name| find(*name).is_none())
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(DashboardError::missing_columns(missing));
        }

        // Every lookup below succeeded in the pass above.
        let index = |name: &str| find(name).unwrap_or_default();

        Ok(ColumnIndex {
            gender: index(GENDER),
            age: index(AGE),
            medical_condition: index(MEDICAL_CONDITION),
            insurance_provider: index(INSURANCE_PROVIDER),
            billing_amount: index(BILLING_AMOUNT),
            date_of_admission: index(DATE_OF_ADMISSION),
        })
    }
}

/// Positions of the required columns within a CSV row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub gender: usize,
    pub age: usize,
    pub medical_condition: usize,
    pub insurance_provider: usize,
    pub billing_amount: usize,
    pub date_of_admission: usize,
}
