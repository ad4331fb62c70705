use serde::{Deserialize, Serialize};

/// Tick positions of a range dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ticks {
    /// Explicit, ascending tick values
    Explicit {
        /// Tick value per index
        values: Vec<f64>,
    },
    /// Evenly sampled ticks: tick `i` is `start + i / rate`
    Uniform {
        /// Tick of index 0
        start: f64,
        /// Indices per unit
        rate: f64,
        /// Number of ticks
        count: usize,
    },
}

impl Ticks {
    /// Evenly sampled ticks starting at zero
    pub fn uniform(rate: f64, count: usize) -> Self {
        Ticks::Uniform {
            start: 0.0,
            rate,
            count,
        }
    }

    /// Number of ticks
    pub fn len(&self) -> usize {
        match self {
            Ticks::Explicit { values } => values.len(),
            Ticks::Uniform { count, .. } => *count,
        }
    }

    /// True when there are no ticks
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tick value at `index`
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Ticks::Explicit { values } => values.get(index).copied(),
            Ticks::Uniform { start, rate, count } => {
                (index < *count).then(|| start + index as f64 / rate)
            }
        }
    }

    /// First index whose tick is not below `value`
    pub fn lower_bound(&self, value: f64) -> usize {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.get(mid) {
                Some(tick) if tick < value => lo = mid + 1,
                _ => hi = mid,
            }
        }
        lo
    }

    /// Every tick value in order
    pub fn values(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }
}

/// Descriptor of one axis of a data array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Dimension {
    /// Label dimension: indices map to (optional) string labels
    Set {
        /// One label per index, if any
        labels: Option<Vec<String>>,
    },
    /// Range dimension: indices map to numeric ticks
    Range {
        /// Tick value per index
        ticks: Ticks,
        /// Axis label
        label: Option<String>,
        /// Unit of the tick values
        unit: Option<String>,
    },
}

impl Dimension {
    /// Number of indices described, `None` for an unlabeled set
    pub fn index_count(&self) -> Option<usize> {
        match self {
            Dimension::Set { labels } => labels.as_ref().map(Vec::len),
            Dimension::Range { ticks, .. } => Some(ticks.len()),
        }
    }

    /// Labels of a set dimension
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            Dimension::Set { labels } => labels.as_deref(),
            Dimension::Range { .. } => None,
        }
    }

    /// Ticks of a range dimension
    pub fn ticks(&self) -> Option<&Ticks> {
        match self {
            Dimension::Range { ticks, .. } => Some(ticks),
            Dimension::Set { .. } => None,
        }
    }

    /// True for a set (label) dimension
    pub fn is_set(&self) -> bool {
        matches!(self, Dimension::Set { .. })
    }
}
