use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetStatus {
    #[default]
    Draft,
    Ready,
}

impl DatasetStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(DatasetStatus::Draft),
            "ready" => Some(DatasetStatus::Ready),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    pub guidelines: Option<String>,
    pub allow_extra_metadata: bool,
    pub status: DatasetStatus,
    pub inserted_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Dataset {
    /// The empty slot value has no id.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.status == DatasetStatus::Ready
    }

    pub fn has_guidelines(&self) -> bool {
        self.guidelines
            .as_deref()
            .map(|g| !g.trim().is_empty())
            .unwrap_or(false)
    }

    /// Most recent of updated_at / inserted_at
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.inserted_at)
    }
}

/// The user's datasets, newest activity first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Datasets {
    items: Vec<Dataset>,
}

impl Datasets {
    pub fn new(mut items: Vec<Dataset>) -> Self {
        items.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        Self { items }
    }

    pub fn items(&self) -> &[Dataset] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, dataset_id: &str) -> Option<&Dataset> {
        self.items.iter().find(|d| d.id == dataset_id)
    }

    /// A new collection without `dataset_id`.
    pub fn without(&self, dataset_id: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|d| d.id != dataset_id)
                .cloned()
                .collect(),
        }
    }

    pub fn by_workspace(&self) -> BTreeMap<&str, Vec<&Dataset>> {
        let mut grouped: BTreeMap<&str, Vec<&Dataset>> = BTreeMap::new();
        for dataset in &self.items {
            grouped
                .entry(dataset.workspace_id.as_str())
                .or_default()
                .push(dataset);
        }
        grouped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workspaces {
    items: Vec<Workspace>,
}

impl Workspaces {
    pub fn new(mut items: Vec<Workspace>) -> Self {
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Self { items }
    }

    pub fn items(&self) -> &[Workspace] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn name_of(&self, workspace_id: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|w| w.id == workspace_id)
            .map(|w| w.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_dataset(id: &str, workspace_id: &str, updated_day: u32) -> Dataset {
        Dataset {
            id: id.to_string(),
            name: format!("Dataset {}", id),
            workspace_id: workspace_id.to_string(),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 1, updated_day, 0, 0, 0).unwrap()),
            ..Dataset::default()
        }
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::default();
        assert!(dataset.is_empty());
        assert!(!dataset.is_ready());
        assert!(!dataset.has_guidelines());
    }

    #[test]
    fn test_guidelines_whitespace_is_not_guidelines() {
        let dataset = Dataset {
            guidelines: Some("   ".to_string()),
            ..Dataset::default()
        };
        assert!(!dataset.has_guidelines());
    }

    #[test]
    fn test_datasets_sorted_newest_first() {
        let datasets = Datasets::new(vec![
            make_dataset("old", "ws-1", 1),
            make_dataset("new", "ws-1", 20),
            make_dataset("mid", "ws-2", 10),
        ]);
        let ids: Vec<_> = datasets.items().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_without_returns_new_collection() {
        let datasets = Datasets::new(vec![make_dataset("a", "ws", 1), make_dataset("b", "ws", 2)]);
        let remaining = datasets.without("a");
        assert_eq!(remaining.len(), 1);
        assert!(remaining.find("a").is_none());
        // Original untouched
        assert_eq!(datasets.len(), 2);
    }

    #[test]
    fn test_by_workspace() {
        let datasets = Datasets::new(vec![
            make_dataset("a", "ws-1", 1),
            make_dataset("b", "ws-2", 2),
            make_dataset("c", "ws-1", 3),
        ]);
        let grouped = datasets.by_workspace();
        assert_eq!(grouped["ws-1"].len(), 2);
        assert_eq!(grouped["ws-2"].len(), 1);
    }

    #[test]
    fn test_workspace_name_lookup() {
        let workspaces = Workspaces::new(vec![
            Workspace { id: "2".into(), name: "zeta".into() },
            Workspace { id: "1".into(), name: "alpha".into() },
        ]);
        assert_eq!(workspaces.items()[0].name, "alpha");
        assert_eq!(workspaces.name_of("2"), Some("zeta"));
        assert_eq!(workspaces.name_of("3"), None);
    }
}
