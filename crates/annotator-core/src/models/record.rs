use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

use super::question::{Field, Question, ResponseValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    #[default]
    Pending,
    Draft,
    Submitted,
    Discarded,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Draft => "draft",
            RecordStatus::Submitted => "submitted",
            RecordStatus::Discarded => "discarded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RecordStatus::Pending),
            "draft" => Some(RecordStatus::Draft),
            "submitted" => Some(RecordStatus::Submitted),
            "discarded" => Some(RecordStatus::Discarded),
            _ => None,
        }
    }
}

/// The current user's stored response to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordAnswer {
    pub id: String,
    pub status: RecordStatus,
    pub values: BTreeMap<String, ResponseValue>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub id: String,
    pub dataset_id: String,
    pub fields: Vec<Field>,
    pub questions: Vec<Question>,
    pub metadata: BTreeMap<String, Value>,
    pub answer: Option<RecordAnswer>,
    pub status: RecordStatus,
}

impl Record {
    pub fn question(&self, name: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.name == name)
    }

    pub fn question_mut(&mut self, name: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.name == name)
    }

    /// Set the local (unsaved) answer of a question. Returns false when the
    /// question does not exist or does not accept the value.
    pub fn answer_question(&mut self, name: &str, value: ResponseValue) -> bool {
        match self.question_mut(name) {
            Some(question) if question.accepts(&value) => {
                question.answer = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Apply a response stored by the backend.
    pub fn answer_with(&mut self, answer: RecordAnswer) {
        for question in &mut self.questions {
            question.answer = answer.values.get(&question.name).cloned();
        }
        self.status = answer.status;
        self.answer = Some(answer);
    }

    /// Drop the stored answer and every local answer.
    pub fn clear(&mut self) {
        for question in &mut self.questions {
            question.clear();
        }
        self.answer = None;
        self.status = RecordStatus::Pending;
    }

    pub fn has_answer(&self) -> bool {
        self.answer.is_some()
    }

    pub fn is_answered(&self) -> bool {
        self.questions.iter().any(|q| q.is_answered())
    }

    pub fn has_required_answers(&self) -> bool {
        self.questions
            .iter()
            .filter(|q| q.required)
            .all(|q| q.is_answered())
    }

    /// Local answers that differ from the stored response.
    pub fn is_modified(&self) -> bool {
        let stored = self.answer.as_ref().map(|a| &a.values);
        let local = self.response_values();
        match stored {
            Some(values) => *values != local,
            None => !local.is_empty(),
        }
    }

    /// Non-empty local answers keyed by question name.
    pub fn response_values(&self) -> BTreeMap<String, ResponseValue> {
        self.questions
            .iter()
            .filter(|q| q.is_answered())
            .filter_map(|q| q.answer.clone().map(|a| (q.name.clone(), a)))
            .collect()
    }
}

/// One page of records to annotate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Records {
    pub items: Vec<Record>,
    pub total: u64,
}

impl Records {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, record_id: &str) -> Option<&Record> {
        self.items.iter().find(|r| r.id == record_id)
    }

    pub fn first(&self) -> Option<&Record> {
        self.items.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionSettings;

    fn make_record() -> Record {
        Record {
            id: "rec-1".into(),
            dataset_id: "ds-1".into(),
            questions: vec![
                Question {
                    id: "q1".into(),
                    name: "sentiment".into(),
                    title: "Sentiment".into(),
                    required: true,
                    settings: QuestionSettings::LabelSelection {
                        options: vec!["positive".into(), "negative".into()],
                    },
                    answer: None,
                },
                Question {
                    id: "q2".into(),
                    name: "comment".into(),
                    title: "Comment".into(),
                    required: false,
                    settings: QuestionSettings::Text { use_markdown: false },
                    answer: None,
                },
            ],
            ..Record::default()
        }
    }

    fn make_answer(status: RecordStatus) -> RecordAnswer {
        let mut values = BTreeMap::new();
        values.insert("sentiment".to_string(), ResponseValue::Label("positive".into()));
        RecordAnswer {
            id: "resp-1".into(),
            status,
            values,
            updated_at: None,
        }
    }

    #[test]
    fn test_answer_question_validates() {
        let mut record = make_record();
        assert!(!record.answer_question("sentiment", ResponseValue::Label("meh".into())));
        assert!(!record.answer_question("missing", ResponseValue::Text("x".into())));
        assert!(record.answer_question("sentiment", ResponseValue::Label("negative".into())));
        assert!(record.has_required_answers());
        assert!(record.is_modified());
    }

    #[test]
    fn test_answer_with_applies_values() {
        let mut record = make_record();
        record.answer_with(make_answer(RecordStatus::Submitted));

        assert_eq!(record.status, RecordStatus::Submitted);
        assert!(record.has_answer());
        assert!(record.question("sentiment").unwrap().is_answered());
        assert!(!record.question("comment").unwrap().is_answered());
        assert!(!record.is_modified());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut record = make_record();
        record.answer_with(make_answer(RecordStatus::Draft));
        record.answer_question("comment", ResponseValue::Text("note".into()));

        record.clear();
        assert!(!record.has_answer());
        assert!(!record.is_answered());
        assert_eq!(record.status, RecordStatus::Pending);
        assert!(!record.is_modified());
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in [
            RecordStatus::Pending,
            RecordStatus::Draft,
            RecordStatus::Submitted,
            RecordStatus::Discarded,
        ] {
            assert_eq!(RecordStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RecordStatus::parse("unknown"), None);
    }
}
