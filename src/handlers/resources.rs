//! Generic JSON controller over one record class.
//!
//! Each action resolves its operations through the resource's factory and
//! hands the outcome to [`respond`], so every resource shares the same
//! parameter handling, ordering rules and response envelope.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::filter::{FilterOrder, FilterOrderInfo};
use crate::middleware::{respond, ApiResult};
use crate::operations::records::{Factory, MatchOptions};
use crate::operations::{step, steps, OperationError};
use crate::resource::Resource;

/// Controller action, passed to [`ResourcesController::resources`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    New,
    Create,
    Show,
    Edit,
    Update,
    Destroy,
}

#[async_trait]
pub trait ResourcesController: Send + Sync + 'static {
    fn resource() -> &'static Resource;

    /// Attributes accepted from the request body.
    fn permitted_attributes() -> &'static [&'static str];

    /// Lookup data merged into the response of `action`.
    async fn resources(
        store: Arc<dyn Store>,
        action: Action,
        success: bool,
    ) -> Result<Map<String, Value>, OperationError>;
}

type ResourceResponse = ApiResult<Map<String, Value>>;

/// GET /:resources
pub async fn index<C: ResourcesController>(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ResourceResponse {
    let resource = C::resource();
    let find = operation_factory::<C>(&state)?.find_matching();

    let outcome = steps(async {
        let order = index_order(&query, resource)?;
        step(find.call(MatchOptions::ordered(order)).await)
    })
    .await;

    let extra = C::resources(state.store(), Action::Index, outcome.is_success()).await?;
    respond(resource, outcome, extra, StatusCode::OK)
}

/// GET /:resources/new
pub async fn new<C: ResourcesController>(State(state): State<AppState>) -> ResourceResponse {
    let resource = C::resource();
    let outcome = operation_factory::<C>(&state)?.build().call(None);

    let extra = C::resources(state.store(), Action::New, outcome.is_success()).await?;
    respond(resource, outcome, extra, StatusCode::OK)
}

/// POST /:resources
pub async fn create<C: ResourcesController>(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> ResourceResponse {
    let resource = C::resource();
    let create = operation_factory::<C>(&state)?.create();

    let outcome = steps(async {
        let attributes = require_resource_params::<C>(body.as_ref().map(|Json(body)| body))?;
        step(create.call(Some(&attributes)).await)
    })
    .await;

    let extra = C::resources(state.store(), Action::Create, outcome.is_success()).await?;
    respond(resource, outcome, extra, StatusCode::CREATED)
}

/// GET /:resources/:id
pub async fn show<C: ResourcesController>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ResourceResponse {
    let resource = C::resource();
    let outcome = operation_factory::<C>(&state)?.find_one().call(&resource_id(id)).await;

    let extra = C::resources(state.store(), Action::Show, outcome.is_success()).await?;
    respond(resource, outcome, extra, StatusCode::OK)
}

/// GET /:resources/:id/edit
pub async fn edit<C: ResourcesController>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ResourceResponse {
    let resource = C::resource();
    let outcome = operation_factory::<C>(&state)?.find_one().call(&resource_id(id)).await;

    let extra = C::resources(state.store(), Action::Edit, outcome.is_success()).await?;
    respond(resource, outcome, extra, StatusCode::OK)
}

/// PUT/PATCH /:resources/:id
pub async fn update<C: ResourcesController>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> ResourceResponse {
    let resource = C::resource();
    let factory = operation_factory::<C>(&state)?;
    let (find, update) = (factory.find_one(), factory.update());

    let outcome = steps(async {
        let record = step(find.call(&resource_id(id)).await)?;
        let attributes = require_resource_params::<C>(body.as_ref().map(|Json(body)| body))?;
        step(update.call(record, &attributes).await)
    })
    .await;

    let extra = C::resources(state.store(), Action::Update, outcome.is_success()).await?;
    respond(resource, outcome, extra, StatusCode::OK)
}

/// DELETE /:resources/:id
pub async fn destroy<C: ResourcesController>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ResourceResponse {
    let resource = C::resource();
    let factory = operation_factory::<C>(&state)?;
    let (find, destroy) = (factory.find_one(), factory.destroy());

    let outcome = steps(async {
        let record = step(find.call(&resource_id(id)).await)?;
        step(destroy.call(record).await)
    })
    .await;

    let extra = C::resources(state.store(), Action::Destroy, outcome.is_success()).await?;
    respond(resource, outcome, extra, StatusCode::OK)
}

fn operation_factory<C: ResourcesController>(state: &AppState) -> Result<Factory, ApiError> {
    Ok(C::resource().operation_factory(state.store())?)
}

/// Numeric path ids become integers; anything else is passed through so
/// that the id guard rejects it.
fn resource_id(id: String) -> Value {
    match id.parse::<i64>() {
        Ok(id) => Value::from(id),
        Err(_) => Value::String(id),
    }
}

/// Permitted attributes under the resource's singular key.
fn require_resource_params<C: ResourcesController>(body: Option<&Value>) -> Result<Value, OperationError> {
    let resource = C::resource();
    let permitted = C::permitted_attributes();

    let params: Map<String, Value> = body
        .and_then(|body| body.get(resource.singular_name()))
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .filter(|(key, _)| permitted.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    if !params.is_empty() {
        return Ok(Value::Object(params));
    }

    if permitted.is_empty() {
        return Err(OperationError::other("No attributes are permitted for the current action"));
    }
    Err(OperationError::invalid_parameter(resource.singular_name(), "can't be blank"))
}

/// Sort order from `order=field:dir::field:dir` or `order[field]=dir`.
/// Without either, the resource's default order applies.
fn index_order(query: &[(String, String)], resource: &Resource) -> Result<Vec<FilterOrderInfo>, OperationError> {
    let mut order: Option<Vec<FilterOrderInfo>> = None;

    for (key, value) in query {
        let parsed = if key == "order" {
            FilterOrder::validate_and_parse(&Value::String(value.clone()))
        } else if let Some(column) = key.strip_prefix("order[").and_then(|k| k.strip_suffix(']')) {
            let mut terms = Map::new();
            terms.insert(column.to_string(), Value::String(value.clone()));
            FilterOrder::validate_and_parse(&Value::Object(terms))
        } else {
            continue;
        };

        order.get_or_insert_with(Vec::new).extend(parsed.map_err(|_| invalid_order())?);
    }

    Ok(order.unwrap_or_else(|| resource.default_order().to_vec()))
}

fn invalid_order() -> OperationError {
    OperationError::invalid_parameter("order", "is invalid")
}
