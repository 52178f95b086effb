use super::dataset::Dataset;

/// A value edited locally that can be reverted to its last saved snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditableValue<T> {
    value: T,
    saved: T,
}

impl<T: Clone + PartialEq> EditableValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            saved: value.clone(),
            value,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn saved(&self) -> &T {
        &self.saved
    }

    pub fn update(&mut self, value: T) {
        self.value = value;
    }

    pub fn is_modified(&self) -> bool {
        self.value != self.saved
    }

    pub fn restore(&mut self) {
        self.value = self.saved.clone();
    }

    /// Current value becomes the snapshot.
    pub fn commit(&mut self) {
        self.saved = self.value.clone();
    }
}

/// Administrative settings of one dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetSetting {
    pub dataset: Dataset,
    pub guidelines: EditableValue<String>,
}

impl DatasetSetting {
    pub fn from_dataset(dataset: Dataset) -> Self {
        let guidelines = EditableValue::new(dataset.guidelines.clone().unwrap_or_default());
        Self {
            dataset,
            guidelines,
        }
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset.id
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn is_modified(&self) -> bool {
        self.guidelines.is_modified()
    }

    pub fn restore(&mut self) {
        self.guidelines.restore();
    }

    pub fn commit(&mut self) {
        self.guidelines.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editable_value_restore() {
        let mut value = EditableValue::new("v1".to_string());
        assert!(!value.is_modified());

        value.update("v2".to_string());
        assert!(value.is_modified());
        assert_eq!(value.value(), "v2");
        assert_eq!(value.saved(), "v1");

        value.restore();
        assert!(!value.is_modified());
        assert_eq!(value.value(), "v1");
    }

    #[test]
    fn test_editable_value_commit() {
        let mut value = EditableValue::new(1);
        value.update(2);
        value.commit();
        assert!(!value.is_modified());
        value.update(3);
        value.restore();
        assert_eq!(*value.value(), 2);
    }

    #[test]
    fn test_setting_from_dataset() {
        let dataset = Dataset {
            id: "ds-1".into(),
            guidelines: Some("Be kind".into()),
            ..Dataset::default()
        };
        let mut setting = DatasetSetting::from_dataset(dataset);
        assert_eq!(setting.dataset_id(), "ds-1");
        assert_eq!(setting.guidelines.value(), "Be kind");

        setting.guidelines.update("Be precise".into());
        assert!(setting.is_modified());
        setting.restore();
        assert!(!setting.is_modified());
    }

    #[test]
    fn test_setting_without_guidelines() {
        let setting = DatasetSetting::from_dataset(Dataset {
            id: "ds".into(),
            ..Dataset::default()
        });
        assert_eq!(setting.guidelines.value(), "");
        assert!(DatasetSetting::default().is_empty());
    }
}
