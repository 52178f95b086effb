use std::fmt;

/// Vectors are identified by name within one record of one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VectorKey {
    pub vector_name: String,
    pub dataset_id: String,
    pub record_id: String,
}

impl VectorKey {
    pub fn new(
        vector_name: impl Into<String>,
        dataset_id: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            vector_name: vector_name.into(),
            dataset_id: dataset_id.into(),
            record_id: record_id.into(),
        }
    }
}

impl fmt::Display for VectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vector/{}/{}/{}",
            self.dataset_id, self.record_id, self.vector_name
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    pub key: VectorKey,
    pub values: Vec<f32>,
}

impl Vector {
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }
}
