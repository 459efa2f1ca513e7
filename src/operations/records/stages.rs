use async_trait::async_trait;
use serde_json::Value;

use crate::database::record::Record;
use crate::operations::outcome::Outcome;

/// First stage of Create: turns attributes into an unsaved record.
#[async_trait]
pub trait BuildStage: Send + Sync {
    async fn build(&self, attributes: Option<&Value>) -> Outcome<Record>;
}

/// First stage of Update: applies attributes to an existing record.
#[async_trait]
pub trait AssignStage: Send + Sync {
    async fn assign(&self, record: Record, attributes: &Value) -> Outcome<Record>;
}

/// Final stage of Create and Update.
#[async_trait]
pub trait SaveStage: Send + Sync {
    async fn save(&self, record: Record) -> Outcome<Record>;
}
