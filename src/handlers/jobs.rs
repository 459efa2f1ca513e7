use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use super::resources::{Action, ResourcesController};
use crate::database::record::RecordVecExt;
use crate::database::store::Store;
use crate::filter::FilterOrderInfo;
use crate::models::{JobType, JOB, TIME_PERIOD};
use crate::operations::records::{Factory, MatchOptions};
use crate::operations::OperationError;
use crate::resource::Resource;

static RESOURCE: Lazy<Resource> =
    Lazy::new(|| Resource::for_class(&JOB).with_default_order(vec![FilterOrderInfo::asc("company_name")]));

const PERMITTED_ATTRIBUTES: &[&str] = &[
    "action_required",
    "application_active",
    "application_status",
    "company_name",
    "data",
    "job_type",
    "notes",
    "recruiter_agency",
    "recruiter_name",
    "source",
    "source_data",
    "time_period_id",
    "title",
];

/// CRUD actions for jobs.
pub struct JobsController;

#[async_trait]
impl ResourcesController for JobsController {
    fn resource() -> &'static Resource {
        &RESOURCE
    }

    fn permitted_attributes() -> &'static [&'static str] {
        PERMITTED_ATTRIBUTES
    }

    /// Form data: shown with new/edit, and with a failed create/update so the
    /// caller can redisplay the form.
    async fn resources(
        store: Arc<dyn Store>,
        action: Action,
        success: bool,
    ) -> Result<Map<String, Value>, OperationError> {
        let wanted = match action {
            Action::New | Action::Edit => success,
            Action::Create | Action::Update => !success,
            _ => false,
        };
        if !wanted {
            return Ok(Map::new());
        }

        let time_periods = Factory::for_class(&TIME_PERIOD, store)
            .find_matching()
            .call(MatchOptions::default())
            .await
            .into_result()?;

        let mut data = Map::new();
        data.insert("job_types".to_string(), json!(JobType::VALUES));
        data.insert("time_periods".to_string(), time_periods.to_api());
        Ok(data)
    }
}
