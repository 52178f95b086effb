/// Annotation metrics of the current user on one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metrics {
    pub dataset_id: String,
    pub records: u64,
    pub responses: u64,
    pub submitted: u64,
    pub discarded: u64,
    pub draft: u64,
}

impl Metrics {
    pub fn total(&self) -> u64 {
        self.records
    }

    pub fn responded(&self) -> u64 {
        self.submitted
            .saturating_add(self.discarded)
            .saturating_add(self.draft)
    }

    pub fn pending(&self) -> u64 {
        self.records.saturating_sub(self.responded())
    }

    pub fn has_records(&self) -> bool {
        self.records > 0
    }

    /// Responded records over all records, 0.0 when there are none.
    pub fn progress(&self) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        self.responded() as f64 / self.records as f64
    }

    pub fn is_completed(&self) -> bool {
        self.has_records() && self.pending() == 0
    }

    pub fn as_progress(&self) -> Progress {
        Progress {
            total: self.records,
            submitted: self.submitted,
            discarded: self.discarded,
            draft: self.draft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub total: u64,
    pub submitted: u64,
    pub discarded: u64,
    pub draft: u64,
}

impl Progress {
    pub fn new(total: u64, submitted: u64) -> Self {
        Self {
            total,
            submitted,
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.submitted)
    }

    pub fn completed_fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.submitted.min(self.total) as f64 / self.total as f64
    }
}

/// Progress of the whole team on one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamProgress {
    pub dataset_id: String,
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

impl TeamProgress {
    pub fn completed_fraction(&self) -> f64 {
        self.as_progress().completed_fraction()
    }

    pub fn as_progress(&self) -> Progress {
        Progress::new(self.total, self.completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// Value distribution of one metadata property.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataMetrics {
    Terms { total: u64, values: Vec<TermCount> },
    Integer { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f64>, max: Option<f64> },
}

impl MetadataMetrics {
    pub fn is_terms(&self) -> bool {
        matches!(self, MetadataMetrics::Terms { .. })
    }

    /// (min, max) as floats for range filters; None for terms or empty ranges.
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            MetadataMetrics::Integer {
                min: Some(min),
                max: Some(max),
            } => Some((*min as f64, *max as f64)),
            MetadataMetrics::Float {
                min: Some(min),
                max: Some(max),
            } => Some((*min, *max)),
            _ => None,
        }
    }
}
