use async_trait::async_trait;
use tracing::debug;

use super::api_client::ApiClient;
use super::dto::{FieldDto, ItemsDto, QuestionDto, RecordsDto, ResponseBody, ResponseDto};
use super::{RecordQuery, RecordRepository};
use crate::error::RepositoryError;
use crate::models::{Question, Record, RecordAnswer, RecordStatus, Records};

pub struct HttpRecordRepository {
    client: ApiClient,
}

impl HttpRecordRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn get_questions(&self, dataset_id: &str) -> Result<Vec<Question>, RepositoryError> {
        let dto: ItemsDto<QuestionDto> = self
            .client
            .get(&format!("/datasets/{}/questions", dataset_id), "questions")
            .await?;
        dto.items.into_iter().map(Question::try_from).collect()
    }

    async fn get_fields(&self, dataset_id: &str) -> Result<Vec<FieldDto>, RepositoryError> {
        let dto: ItemsDto<FieldDto> = self
            .client
            .get(&format!("/datasets/{}/fields", dataset_id), "fields")
            .await?;
        Ok(dto.items)
    }

    /// Create the record's response, or update it when one is stored.
    async fn store_response(
        &self,
        record: &Record,
        status: RecordStatus,
    ) -> Result<RecordAnswer, RepositoryError> {
        let body = ResponseBody::from_record(record, status);
        let dto: ResponseDto = match &record.answer {
            Some(answer) => {
                self.client
                    .put(&format!("/responses/{}", answer.id), &body, "response")
                    .await?
            }
            None => {
                self.client
                    .post(&format!("/records/{}/responses", record.id), &body, "response")
                    .await?
            }
        };
        debug!(record_id = %record.id, status = status.as_str(), "response stored");
        dto.into_answer(&record.questions)
    }
}

#[async_trait]
impl RecordRepository for HttpRecordRepository {
    async fn get_records(
        &self,
        dataset_id: &str,
        query: RecordQuery,
    ) -> Result<Records, RepositoryError> {
        let mut params = vec![
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
            ("include", "responses".to_string()),
        ];
        if let Some(status) = query.status {
            params.push(("response_status", status.as_str().to_string()));
        }

        let path = format!("/me/datasets/{}/records", dataset_id);
        let (questions, fields, dto) = futures::try_join!(
            self.get_questions(dataset_id),
            self.get_fields(dataset_id),
            self.client
                .get_with_query::<RecordsDto, _>(&path, &params, "records"),
        )?;

        let items = dto
            .items
            .into_iter()
            .map(|record| record.into_record(&fields, &questions))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Records {
            items,
            total: dto.total,
        })
    }

    async fn submit_response(&self, record: &Record) -> Result<RecordAnswer, RepositoryError> {
        self.store_response(record, RecordStatus::Submitted).await
    }

    async fn save_draft(&self, record: &Record) -> Result<RecordAnswer, RepositoryError> {
        self.store_response(record, RecordStatus::Draft).await
    }

    async fn discard_response(&self, record: &Record) -> Result<RecordAnswer, RepositoryError> {
        self.store_response(record, RecordStatus::Discarded).await
    }

    async fn delete_record_response(&self, answer: &RecordAnswer) -> Result<(), RepositoryError> {
        self.client
            .delete(&format!("/responses/{}", answer.id))
            .await
    }
}
