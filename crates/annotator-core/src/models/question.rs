use serde_json::{json, Value};

/// A record field shown to the annotator (read-only content).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub title: String,
    pub required: bool,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingItem {
    pub value: String,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanValue {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Type-specific configuration of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionSettings {
    Text { use_markdown: bool },
    Rating { options: Vec<u32> },
    LabelSelection { options: Vec<String> },
    MultiLabelSelection { options: Vec<String> },
    Ranking { options: Vec<String> },
    Span { field: String, options: Vec<String> },
}

impl QuestionSettings {
    pub fn kind(&self) -> &'static str {
        match self {
            QuestionSettings::Text { .. } => "text",
            QuestionSettings::Rating { .. } => "rating",
            QuestionSettings::LabelSelection { .. } => "label_selection",
            QuestionSettings::MultiLabelSelection { .. } => "multi_label_selection",
            QuestionSettings::Ranking { .. } => "ranking",
            QuestionSettings::Span { .. } => "span",
        }
    }
}

/// An annotator's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseValue {
    Text(String),
    Rating(u32),
    Label(String),
    Labels(Vec<String>),
    Ranking(Vec<RankingItem>),
    Spans(Vec<SpanValue>),
}

impl ResponseValue {
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseValue::Text(text) => text.trim().is_empty(),
            ResponseValue::Rating(_) => false,
            ResponseValue::Label(label) => label.is_empty(),
            ResponseValue::Labels(labels) => labels.is_empty(),
            ResponseValue::Ranking(items) => items.is_empty(),
            ResponseValue::Spans(spans) => spans.is_empty(),
        }
    }

    /// Wire representation of the value (the `value` member of a response).
    pub fn to_json(&self) -> Value {
        match self {
            ResponseValue::Text(text) => json!(text),
            ResponseValue::Rating(rating) => json!(rating),
            ResponseValue::Label(label) => json!(label),
            ResponseValue::Labels(labels) => json!(labels),
            ResponseValue::Ranking(items) => Value::Array(
                items
                    .iter()
                    .map(|item| json!({ "value": item.value, "rank": item.rank }))
                    .collect(),
            ),
            ResponseValue::Spans(spans) => Value::Array(
                spans
                    .iter()
                    .map(|span| json!({ "label": span.label, "start": span.start, "end": span.end }))
                    .collect(),
            ),
        }
    }

    /// Interpret a wire value according to the question's settings.
    pub fn from_json(settings: &QuestionSettings, value: &Value) -> Result<Self, String> {
        match settings {
            QuestionSettings::Text { .. } => value
                .as_str()
                .map(|s| ResponseValue::Text(s.to_string()))
                .ok_or_else(|| format!("expected text, got {}", value)),
            QuestionSettings::Rating { .. } => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(ResponseValue::Rating)
                .ok_or_else(|| format!("expected rating, got {}", value)),
            QuestionSettings::LabelSelection { .. } => value
                .as_str()
                .map(|s| ResponseValue::Label(s.to_string()))
                .ok_or_else(|| format!("expected label, got {}", value)),
            QuestionSettings::MultiLabelSelection { .. } => string_list(value)
                .map(ResponseValue::Labels)
                .ok_or_else(|| format!("expected label list, got {}", value)),
            QuestionSettings::Ranking { .. } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("expected ranking, got {}", value))?;
                items
                    .iter()
                    .map(|item| {
                        let value = item["value"]
                            .as_str()
                            .ok_or_else(|| format!("ranking item without value: {}", item))?;
                        let rank = item["rank"].as_u64().and_then(|r| u32::try_from(r).ok());
                        Ok(RankingItem {
                            value: value.to_string(),
                            rank,
                        })
                    })
                    .collect::<Result<Vec<_>, String>>()
                    .map(ResponseValue::Ranking)
            }
            QuestionSettings::Span { .. } => {
                let spans = value
                    .as_array()
                    .ok_or_else(|| format!("expected spans, got {}", value))?;
                spans
                    .iter()
                    .map(|span| {
                        let label = span["label"].as_str();
                        let start = span["start"].as_u64();
                        let end = span["end"].as_u64();
                        match (label, start, end) {
                            (Some(label), Some(start), Some(end)) if start <= end => Ok(SpanValue {
                                label: label.to_string(),
                                start: start as usize,
                                end: end as usize,
                            }),
                            _ => Err(format!("malformed span: {}", span)),
                        }
                    })
                    .collect::<Result<Vec<_>, String>>()
                    .map(ResponseValue::Spans)
            }
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: String,
    pub name: String,
    pub title: String,
    pub required: bool,
    pub settings: QuestionSettings,
    pub answer: Option<ResponseValue>,
}

impl Question {
    pub fn is_answered(&self) -> bool {
        self.answer.as_ref().map(|a| !a.is_empty()).unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.answer = None;
    }

    /// Whether `value` fits this question's type and options.
    pub fn accepts(&self, value: &ResponseValue) -> bool {
        match (&self.settings, value) {
            (QuestionSettings::Text { .. }, ResponseValue::Text(_)) => true,
            (QuestionSettings::Rating { options }, ResponseValue::Rating(r)) => options.contains(r),
            (QuestionSettings::LabelSelection { options }, ResponseValue::Label(l)) => {
                options.contains(l)
            }
            (QuestionSettings::MultiLabelSelection { options }, ResponseValue::Labels(labels)) => {
                labels.iter().all(|l| options.contains(l))
            }
            (QuestionSettings::Ranking { options }, ResponseValue::Ranking(items)) => {
                items.iter().all(|i| options.contains(&i.value))
            }
            (QuestionSettings::Span { options, .. }, ResponseValue::Spans(spans)) => {
                spans.iter().all(|s| options.contains(&s.label))
            }
            _ => false,
        }
    }
}
