use parking_lot::Mutex;
use tracing::debug;

use super::{notify_failure, LoadingFlag};
use crate::error::CoreError;
use crate::models::{Record, ResponseValue};
use crate::notifications::SharedNotifications;
use crate::use_cases::{
    ClearRecordUseCase, DiscardRecordUseCase, SaveDraftRecordUseCase, SubmitRecordUseCase,
};

#[derive(Debug, Clone, Copy)]
enum RecordAction {
    Submit,
    SaveDraft,
    Discard,
    Clear,
}

impl RecordAction {
    fn failure_message(&self) -> &'static str {
        match self {
            RecordAction::Submit => "Could not submit the record",
            RecordAction::SaveDraft => "Could not save the draft",
            RecordAction::Discard => "Could not discard the record",
            RecordAction::Clear => "Could not clear the record",
        }
    }
}

/// The record being annotated. Operations work on a copy that replaces the
/// record only once the backend call succeeded.
pub struct RecordViewModel {
    submit: SubmitRecordUseCase,
    save_draft: SaveDraftRecordUseCase,
    discard: DiscardRecordUseCase,
    clear: ClearRecordUseCase,
    record: Mutex<Record>,
    notifications: SharedNotifications,
    busy: LoadingFlag,
}

impl RecordViewModel {
    pub fn new(
        record: Record,
        submit: SubmitRecordUseCase,
        save_draft: SaveDraftRecordUseCase,
        discard: DiscardRecordUseCase,
        clear: ClearRecordUseCase,
        notifications: SharedNotifications,
    ) -> Self {
        Self {
            submit,
            save_draft,
            discard,
            clear,
            record: Mutex::new(record),
            notifications,
            busy: LoadingFlag::default(),
        }
    }

    pub fn record(&self) -> Record {
        self.record.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Set a local answer. Refused while an operation is in flight.
    pub fn answer(&self, question: &str, value: ResponseValue) -> bool {
        if self.is_busy() {
            return false;
        }
        self.record.lock().answer_question(question, value)
    }

    pub async fn submit(&self) -> Result<(), CoreError> {
        self.run(RecordAction::Submit).await
    }

    pub async fn save_draft(&self) -> Result<(), CoreError> {
        self.run(RecordAction::SaveDraft).await
    }

    pub async fn discard(&self) -> Result<(), CoreError> {
        self.run(RecordAction::Discard).await
    }

    pub async fn clear(&self) -> Result<(), CoreError> {
        self.run(RecordAction::Clear).await
    }

    async fn run(&self, action: RecordAction) -> Result<(), CoreError> {
        let Some(_busy) = self.busy.start() else {
            return Err(CoreError::guard(format!(
                "{:?} requested while another record operation is running",
                action
            )));
        };
        let mut working = self.record();
        let result = match action {
            RecordAction::Submit => self.submit.execute(&mut working).await,
            RecordAction::SaveDraft => self.save_draft.execute(&mut working).await,
            RecordAction::Discard => self.discard.execute(&mut working).await,
            RecordAction::Clear => self.clear.execute(&mut working).await,
        };
        match result {
            Ok(()) => {
                debug!(record_id = %working.id, ?action, "record updated");
                *self.record.lock() = working;
                Ok(())
            }
            Err(e) => {
                notify_failure(&self.notifications, action.failure_message(), &e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::models::{Question, QuestionSettings, RecordStatus};
    use crate::notifications::NotificationManager;
    use crate::use_cases::fakes::FakeBackend;
    use std::sync::Arc;

    fn view_model(backend: &Arc<FakeBackend>) -> RecordViewModel {
        let bus = EventBus::new();
        let record = Record {
            id: "rec-1".into(),
            dataset_id: "ds-1".into(),
            questions: vec![Question {
                id: "q1".into(),
                name: "rating".into(),
                title: "Rating".into(),
                required: true,
                settings: QuestionSettings::Rating {
                    options: vec![1, 2, 3],
                },
                answer: None,
            }],
            ..Record::default()
        };
        RecordViewModel::new(
            record,
            SubmitRecordUseCase::new(backend.clone(), bus.clone()),
            SaveDraftRecordUseCase::new(backend.clone(), bus.clone()),
            DiscardRecordUseCase::new(backend.clone(), bus.clone()),
            ClearRecordUseCase::new(backend.clone(), bus),
            NotificationManager::shared(),
        )
    }

    #[tokio::test]
    async fn test_submit_then_clear() {
        let backend = FakeBackend::new();
        let vm = view_model(&backend);
        assert!(vm.answer("rating", ResponseValue::Rating(2)));
        assert!(!vm.answer("rating", ResponseValue::Rating(7)));

        vm.submit().await.unwrap();
        assert_eq!(vm.record().status, RecordStatus::Submitted);
        assert!(!vm.is_busy());

        vm.clear().await.unwrap();
        let record = vm.record();
        assert!(!record.has_answer());
        assert!(!record.is_answered());
        assert_eq!(backend.calls_to("delete_record_response"), 1);
    }

    #[tokio::test]
    async fn test_failure_notifies_and_keeps_record() {
        let backend = FakeBackend::new();
        let vm = view_model(&backend);
        vm.answer("rating", ResponseValue::Rating(3));
        let before = vm.record();

        backend.fail(422);
        assert!(vm.save_draft().await.is_err());
        assert_eq!(vm.record(), before);
        assert_eq!(
            vm.notifications.lock().current().unwrap().message,
            "Could not save the draft (fake_failure)"
        );
    }

    #[tokio::test]
    async fn test_submit_guard_not_notified() {
        let backend = FakeBackend::new();
        let vm = view_model(&backend);
        assert!(vm.submit().await.unwrap_err().is_guard());
        assert!(vm.notifications.lock().is_empty());
    }

    #[tokio::test]
    async fn test_discard() {
        let backend = FakeBackend::new();
        let vm = view_model(&backend);
        vm.discard().await.unwrap();
        assert_eq!(vm.record().status, RecordStatus::Discarded);
    }
}
