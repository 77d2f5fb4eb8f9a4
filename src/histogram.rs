/*!
 * Equal-width binning shared by the age and billing histograms
 */

use serde::Serialize;

/// Half-open bin `[lower, upper)`; the last bin also includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
}

/// `count` equal-width bins spanning `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinEdges {
    min: f64,
    max: f64,
    width: f64,
    count: usize,
}

impl BinEdges {
    /// Span the observed range of `values`.
    ///
    /// Returns `None` when there are no finite values or `count` is zero.
    /// A zero-width range is widened to one unit centred on the value.
    pub fn spanning<I>(values: I, count: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        if count == 0 {
            return None;
        }

        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let (min, max) = if max > min { (min, max) } else { (min - 0.5, min + 0.5) };

        Some(Self {
            min,
            max,
            width: (max - min) / count as f64,
            count,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Bin containing `value`, clamped into range
    pub fn index_of(&self, value: f64) -> usize {
        let idx = ((value - self.min) / self.width).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.count - 1)
        }
    }

    pub fn bins(&self) -> Vec<Bin> {
        (0..self.count)
            .map(|i| Bin {
                lower: self.min + self.width * i as f64,
                upper: if i + 1 == self.count {
                    self.max
                } else {
                    self.min + self.width * (i + 1) as f64
                },
            })
            .collect()
    }

    /// Count `values` per bin
    pub fn tally<I>(&self, values: I) -> Vec<usize>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut counts = vec![0usize; self.count];
        for value in values {
            counts[self.index_of(value)] += 1;
        }
        counts
    }
}
