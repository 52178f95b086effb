pub mod dataset;
pub mod metrics;
pub mod question;
pub mod record;
pub mod setting;
pub mod vector;

pub use dataset::{Dataset, DatasetStatus, Datasets, Workspace, Workspaces};
pub use metrics::{MetadataMetrics, Metrics, Progress, TeamProgress, TermCount};
pub use question::{Field, Question, QuestionSettings, RankingItem, ResponseValue, SpanValue};
pub use record::{Record, RecordAnswer, RecordStatus, Records};
pub use setting::{DatasetSetting, EditableValue};
pub use vector::{Vector, VectorKey};
