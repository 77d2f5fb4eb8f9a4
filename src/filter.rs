/*!
 * Filter engine
 *
 * A [`View`] is an order-preserving selection of borrowed records. Views are
 * always produced fresh from a table (or another view) and a set of
 * conjunctive predicates; nothing is filtered in place.
 */

use serde::Serialize;

use crate::data_types::Record;

/// Predicates applied to a table. `None` leaves a dimension unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub gender: Option<String>,
    pub condition: Option<String>,
    /// Keep rows with `billing_amount <= ceiling`. Rows with a missing
    /// billing amount never satisfy an active ceiling.
    pub billing_ceiling: Option<f64>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn billing_ceiling(mut self, ceiling: f64) -> Self {
        self.billing_ceiling = Some(ceiling);
        self
    }

    /// True when no predicate is active
    pub fn is_unfiltered(&self) -> bool {
        self.gender.is_none() && self.condition.is_none() && self.billing_ceiling.is_none()
    }

    /// Whether a single record satisfies every active predicate
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(gender) = &self.gender {
            if &record.gender != gender {
                return false;
            }
        }
        if let Some(condition) = &self.condition {
            if &record.medical_condition != condition {
                return false;
            }
        }
        if let Some(ceiling) = self.billing_ceiling {
            match record.billing_amount {
                Some(amount) if amount <= ceiling => {}
                _ => return false,
            }
        }
        true
    }

    /// Select the matching records, preserving input order
    pub fn apply<'a>(&self, rows: &[&'a Record]) -> View<'a> {
        if self.is_unfiltered() {
            return View { rows: rows.to_vec() };
        }

        #[cfg(feature = "parallel")]
        let selected = {
            use rayon::prelude::*;
            rows.par_iter().copied().filter(|r| self.matches(r)).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let selected = rows.iter().copied().filter(|r| self.matches(r)).collect();

        View { rows: selected }
    }
}

/// Filter a table on the given optional predicates.
///
/// Predicates conjoin; an absent predicate leaves that dimension unfiltered.
pub fn filter<'a, I>(
    records: I,
    gender: Option<&str>,
    condition: Option<&str>,
    billing_ceiling: Option<f64>,
) -> View<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let criteria = FilterCriteria {
        gender: gender.map(str::to_string),
        condition: condition.map(str::to_string),
        billing_ceiling,
    };
    View::from_records(records).filter(&criteria)
}

/// An ordered selection of records from the base table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> View<'a> {
    /// A view over every record, in order
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        Self { rows: records.into_iter().collect() }
    }

    /// Refine this view with further predicates
    pub fn filter(&self, criteria: &FilterCriteria) -> View<'a> {
        criteria.apply(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.rows.iter().copied()
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.rows
    }
}

impl<'a, 'v> IntoIterator for &'v View<'a> {
    type Item = &'a Record;
    type IntoIter = std::iter::Copied<std::slice::Iter<'v, &'a Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter().copied()
    }
}
