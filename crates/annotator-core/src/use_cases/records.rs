//! Record-level operations. These mutate the caller's record in place and
//! never write a store slot; other features learn about them from events.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::events::{DomainEvent, EventBus};
use crate::models::{Record, Records};
use crate::repositories::{RecordQuery, RecordRepository};
use crate::store::Store;

pub struct LoadRecordsUseCase {
    repository: Arc<dyn RecordRepository>,
    records: Arc<Store<Records>>,
}

impl LoadRecordsUseCase {
    pub fn new(repository: Arc<dyn RecordRepository>, records: Arc<Store<Records>>) -> Self {
        Self {
            repository,
            records,
        }
    }

    pub async fn execute(&self, dataset_id: &str, query: RecordQuery) -> Result<Records, CoreError> {
        let records = self.repository.get_records(dataset_id, query).await?;
        debug!(
            dataset_id,
            loaded = records.items.len(),
            total = records.total,
            "records loaded"
        );
        self.records.save(records.clone());
        Ok(records)
    }
}

fn response_updated(record: &Record) -> DomainEvent {
    DomainEvent::RecordResponseUpdated {
        dataset_id: record.dataset_id.clone(),
        record_id: record.id.clone(),
    }
}

pub struct SubmitRecordUseCase {
    repository: Arc<dyn RecordRepository>,
    bus: EventBus,
}

impl SubmitRecordUseCase {
    pub fn new(repository: Arc<dyn RecordRepository>, bus: EventBus) -> Self {
        Self { repository, bus }
    }

    pub async fn execute(&self, record: &mut Record) -> Result<(), CoreError> {
        if !record.has_required_answers() {
            return Err(CoreError::guard(format!(
                "record {} has unanswered required questions",
                record.id
            )));
        }
        let answer = self.repository.submit_response(record).await?;
        record.answer_with(answer);
        info!(record_id = %record.id, "record submitted");
        self.bus.publish(&response_updated(record));
        Ok(())
    }
}

pub struct SaveDraftRecordUseCase {
    repository: Arc<dyn RecordRepository>,
    bus: EventBus,
}

impl SaveDraftRecordUseCase {
    pub fn new(repository: Arc<dyn RecordRepository>, bus: EventBus) -> Self {
        Self { repository, bus }
    }

    pub async fn execute(&self, record: &mut Record) -> Result<(), CoreError> {
        let answer = self.repository.save_draft(record).await?;
        record.answer_with(answer);
        debug!(record_id = %record.id, "draft saved");
        self.bus.publish(&response_updated(record));
        Ok(())
    }
}

pub struct DiscardRecordUseCase {
    repository: Arc<dyn RecordRepository>,
    bus: EventBus,
}

impl DiscardRecordUseCase {
    pub fn new(repository: Arc<dyn RecordRepository>, bus: EventBus) -> Self {
        Self { repository, bus }
    }

    pub async fn execute(&self, record: &mut Record) -> Result<(), CoreError> {
        let answer = self.repository.discard_response(record).await?;
        record.answer_with(answer);
        info!(record_id = %record.id, "record discarded");
        self.bus.publish(&response_updated(record));
        Ok(())
    }
}

/// Deletes the stored response (if any) and resets the record's answers.
pub struct ClearRecordUseCase {
    repository: Arc<dyn RecordRepository>,
    bus: EventBus,
}

impl ClearRecordUseCase {
    pub fn new(repository: Arc<dyn RecordRepository>, bus: EventBus) -> Self {
        Self { repository, bus }
    }

    pub async fn execute(&self, record: &mut Record) -> Result<(), CoreError> {
        let deleted = match &record.answer {
            Some(answer) => {
                self.repository.delete_record_response(answer).await?;
                true
            }
            None => false,
        };
        record.clear();

        if deleted {
            info!(record_id = %record.id, "record response deleted");
            self.bus.publish(&DomainEvent::RecordCleared {
                dataset_id: record.dataset_id.clone(),
                record_id: record.id.clone(),
            });
        }
        Ok(())
    }
}
