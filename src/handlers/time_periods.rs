use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use super::resources::{Action, ResourcesController};
use crate::database::store::Store;
use crate::models::{TimePeriod, TIME_PERIOD};
use crate::operations::OperationError;
use crate::resource::Resource;

static RESOURCE: Lazy<Resource> =
    Lazy::new(|| Resource::for_class(&TIME_PERIOD).with_default_order(TimePeriod::default_order()));

const PERMITTED_ATTRIBUTES: &[&str] = &["month", "year"];

/// CRUD actions for time periods.
pub struct TimePeriodsController;

#[async_trait]
impl ResourcesController for TimePeriodsController {
    fn resource() -> &'static Resource {
        &RESOURCE
    }

    fn permitted_attributes() -> &'static [&'static str] {
        PERMITTED_ATTRIBUTES
    }

    async fn resources(
        _store: Arc<dyn Store>,
        _action: Action,
        _success: bool,
    ) -> Result<Map<String, Value>, OperationError> {
        Ok(Map::new())
    }
}
