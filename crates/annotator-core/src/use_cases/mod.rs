//! One struct per user operation.
//!
//! A use case calls its repository, writes the store slots it owns and
//! publishes domain events after the state change succeeded. Failures are
//! returned unchanged and leave every slot untouched.

pub mod datasets;
pub mod metrics;
pub mod records;
pub mod settings;
pub mod vectors;

#[cfg(test)]
pub(crate) mod fakes;

pub use datasets::{
    DeleteDatasetUseCase, GetDatasetByIdUseCase, GetDatasetsUseCase, GetWorkspacesUseCase,
};
pub use metrics::{GetMetadataMetricsUseCase, GetTeamProgressUseCase, GetUserMetricsUseCase};
pub use records::{
    ClearRecordUseCase, DiscardRecordUseCase, LoadRecordsUseCase, SaveDraftRecordUseCase,
    SubmitRecordUseCase,
};
pub use settings::{GetDatasetSettingUseCase, UpdateGuidelinesSettingUseCase};
pub use vectors::GetRecordVectorUseCase;
