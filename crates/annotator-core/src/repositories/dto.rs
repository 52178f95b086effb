//! Wire shapes of the REST API and their mapping into entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::RepositoryError;
use crate::models::{
    Dataset, DatasetStatus, Field, MetadataMetrics, Metrics, Question, QuestionSettings, Record,
    RecordAnswer, RecordStatus, ResponseValue, TeamProgress, TermCount, Workspace,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsDto<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDto {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    #[serde(default)]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub allow_extra_metadata: bool,
    pub status: String,
    #[serde(default)]
    pub inserted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<DatasetDto> for Dataset {
    type Error = RepositoryError;

    fn try_from(dto: DatasetDto) -> Result<Self, Self::Error> {
        if dto.id.is_empty() {
            return Err(RepositoryError::invalid("dataset", "missing id"));
        }
        let status = DatasetStatus::parse(&dto.status).ok_or_else(|| {
            RepositoryError::invalid("dataset", format!("unknown status '{}'", dto.status))
        })?;
        Ok(Dataset {
            id: dto.id,
            name: dto.name,
            workspace_id: dto.workspace_id,
            guidelines: dto.guidelines,
            allow_extra_metadata: dto.allow_extra_metadata,
            status,
            inserted_at: dto.inserted_at,
            updated_at: dto.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetUpdateDto<'a> {
    pub guidelines: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDto {
    pub id: String,
    pub name: String,
}

impl From<WorkspaceDto> for Workspace {
    fn from(dto: WorkspaceDto) -> Self {
        Workspace {
            id: dto.id,
            name: dto.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountDto {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesCountDto {
    pub count: u64,
    #[serde(default)]
    pub submitted: u64,
    #[serde(default)]
    pub discarded: u64,
    #[serde(default)]
    pub draft: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMetricsDto {
    pub records: CountDto,
    pub responses: ResponsesCountDto,
}

impl UserMetricsDto {
    pub fn into_metrics(self, dataset_id: &str) -> Result<Metrics, RepositoryError> {
        let responses = self.responses;
        let responded = responses
            .submitted
            .checked_add(responses.discarded)
            .and_then(|n| n.checked_add(responses.draft))
            .ok_or_else(|| RepositoryError::invalid("metrics", "response counts overflow"))?;
        if responded > responses.count {
            return Err(RepositoryError::invalid(
                "metrics",
                format!(
                    "{} responses by status but only {} in total",
                    responded, responses.count
                ),
            ));
        }
        if responses.count > self.records.count {
            return Err(RepositoryError::invalid(
                "metrics",
                format!(
                    "{} responses for {} records",
                    responses.count, self.records.count
                ),
            ));
        }
        Ok(Metrics {
            dataset_id: dataset_id.to_string(),
            records: self.records.count,
            responses: responses.count,
            submitted: responses.submitted,
            discarded: responses.discarded,
            draft: responses.draft,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProgressDto {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

impl DatasetProgressDto {
    pub fn into_team_progress(self, dataset_id: &str) -> Result<TeamProgress, RepositoryError> {
        let counted = self
            .completed
            .checked_add(self.pending)
            .ok_or_else(|| RepositoryError::invalid("progress", "record counts overflow"))?;
        if counted > self.total {
            return Err(RepositoryError::invalid(
                "progress",
                format!(
                    "completed {} + pending {} exceeds total {}",
                    self.completed, self.pending, self.total
                ),
            ));
        }
        Ok(TeamProgress {
            dataset_id: dataset_id.to_string(),
            total: self.total,
            completed: self.completed,
            pending: self.pending,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermCountDto {
    pub term: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetadataMetricsDto {
    Terms {
        total: u64,
        #[serde(default)]
        values: Vec<TermCountDto>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Float {
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl TryFrom<MetadataMetricsDto> for MetadataMetrics {
    type Error = RepositoryError;

    fn try_from(dto: MetadataMetricsDto) -> Result<Self, Self::Error> {
        match dto {
            MetadataMetricsDto::Terms { total, values } => Ok(MetadataMetrics::Terms {
                total,
                values: values
                    .into_iter()
                    .map(|v| TermCount {
                        term: v.term,
                        count: v.count,
                    })
                    .collect(),
            }),
            MetadataMetricsDto::Integer { min, max } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(RepositoryError::invalid(
                            "metadata metrics",
                            format!("min {} above max {}", min, max),
                        ));
                    }
                }
                Ok(MetadataMetrics::Integer { min, max })
            }
            MetadataMetricsDto::Float { min, max } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(RepositoryError::invalid(
                            "metadata metrics",
                            format!("min {} above max {}", min, max),
                        ));
                    }
                }
                Ok(MetadataMetrics::Float { min, max })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDto {
    pub value: Value,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionSettingsDto {
    Text {
        #[serde(default)]
        use_markdown: bool,
    },
    Rating {
        options: Vec<OptionDto>,
    },
    LabelSelection {
        options: Vec<OptionDto>,
    },
    MultiLabelSelection {
        options: Vec<OptionDto>,
    },
    Ranking {
        options: Vec<OptionDto>,
    },
    Span {
        field: String,
        options: Vec<OptionDto>,
    },
}

fn label_options(options: Vec<OptionDto>) -> Result<Vec<String>, RepositoryError> {
    options
        .into_iter()
        .map(|option| match option.value {
            Value::String(value) => Ok(value),
            other => Err(RepositoryError::invalid(
                "question",
                format!("label option {} is not a string", other),
            )),
        })
        .collect()
}

impl TryFrom<QuestionSettingsDto> for QuestionSettings {
    type Error = RepositoryError;

    fn try_from(dto: QuestionSettingsDto) -> Result<Self, Self::Error> {
        Ok(match dto {
            QuestionSettingsDto::Text { use_markdown } => QuestionSettings::Text { use_markdown },
            QuestionSettingsDto::Rating { options } => QuestionSettings::Rating {
                options: options
                    .into_iter()
                    .map(|option| {
                        option
                            .value
                            .as_u64()
                            .and_then(|v| u32::try_from(v).ok())
                            .ok_or_else(|| {
                                RepositoryError::invalid(
                                    "question",
                                    format!("rating option {} is not a number", option.value),
                                )
                            })
                    })
                    .collect::<Result<_, _>>()?,
            },
            QuestionSettingsDto::LabelSelection { options } => QuestionSettings::LabelSelection {
                options: label_options(options)?,
            },
            QuestionSettingsDto::MultiLabelSelection { options } => {
                QuestionSettings::MultiLabelSelection {
                    options: label_options(options)?,
                }
            }
            QuestionSettingsDto::Ranking { options } => QuestionSettings::Ranking {
                options: label_options(options)?,
            },
            QuestionSettingsDto::Span { field, options } => QuestionSettings::Span {
                field,
                options: label_options(options)?,
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub required: bool,
    pub settings: QuestionSettingsDto,
}

impl TryFrom<QuestionDto> for Question {
    type Error = RepositoryError;

    fn try_from(dto: QuestionDto) -> Result<Self, Self::Error> {
        Ok(Question {
            id: dto.id,
            name: dto.name,
            title: dto.title,
            required: dto.required,
            settings: dto.settings.try_into()?,
            answer: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDto {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseValueDto {
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDto {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub values: BTreeMap<String, ResponseValueDto>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResponseDto {
    /// Values are typed by the question they answer; values of unknown
    /// questions are dropped.
    pub fn into_answer(self, questions: &[Question]) -> Result<RecordAnswer, RepositoryError> {
        let status = match RecordStatus::parse(&self.status) {
            Some(RecordStatus::Pending) | None => {
                return Err(RepositoryError::invalid(
                    "response",
                    format!("unexpected status '{}'", self.status),
                ))
            }
            Some(status) => status,
        };

        let mut values = BTreeMap::new();
        for (name, value) in self.values {
            let Some(question) = questions.iter().find(|q| q.name == name) else {
                continue;
            };
            let value = ResponseValue::from_json(&question.settings, &value.value)
                .map_err(|reason| RepositoryError::invalid("response", reason))?;
            values.insert(name, value);
        }

        Ok(RecordAnswer {
            id: self.id,
            status,
            values,
            updated_at: self.updated_at,
        })
    }
}

/// Body of a create/update response request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBody {
    pub values: BTreeMap<String, ResponseValueDto>,
    pub status: String,
}

impl ResponseBody {
    pub fn from_record(record: &Record, status: RecordStatus) -> Self {
        let values = record
            .response_values()
            .into_iter()
            .map(|(name, value)| {
                (
                    name,
                    ResponseValueDto {
                        value: value.to_json(),
                    },
                )
            })
            .collect();
        Self {
            values,
            status: status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDto {
    pub id: String,
    pub dataset_id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub responses: Vec<ResponseDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsDto {
    pub items: Vec<RecordDto>,
    pub total: u64,
}

impl RecordDto {
    /// Build a record from its content and the dataset's fields and
    /// questions. Only the first response (the current user's) is kept.
    pub fn into_record(
        self,
        fields: &[FieldDto],
        questions: &[Question],
    ) -> Result<Record, RepositoryError> {
        let record_fields = fields
            .iter()
            .filter_map(|field| {
                let content = self.fields.get(&field.name)?;
                let content = match content {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                Some(Field {
                    id: field.id.clone(),
                    name: field.name.clone(),
                    title: field.title.clone(),
                    required: field.required,
                    content,
                })
            })
            .collect();

        let mut record = Record {
            id: self.id,
            dataset_id: self.dataset_id,
            fields: record_fields,
            questions: questions.to_vec(),
            metadata: self.metadata.unwrap_or_default(),
            answer: None,
            status: RecordStatus::Pending,
        };

        if let Some(response) = self.responses.into_iter().next() {
            let answer = response.into_answer(questions)?;
            record.answer_with(answer);
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDto {
    pub values: Vec<f32>,
}
