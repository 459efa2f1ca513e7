//! Record commands shared by every resource.

use serde_json::{json, Value};

use crate::cli::utils::{output_record, output_records, output_success};
use crate::cli::OutputFormat;
use crate::database::record::Record;
use crate::operations::records::{Factory, MatchOptions};
use crate::operations::{step, steps};
use crate::resource::Resource;

/// Text-mode summary of a record.
pub type Summary = fn(&Record) -> String;

pub async fn list(
    factory: &Factory,
    resource: &Resource,
    options: MatchOptions,
    summary: Summary,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let records = factory.find_matching().call(options).await.into_result()?;
    output_records(&output_format, resource.plural_name(), &records, summary)
}

pub async fn show(factory: &Factory, resource: &Resource, id: i64, output_format: OutputFormat) -> anyhow::Result<()> {
    let record = factory.find_one().call(&json!(id)).await.into_result()?;
    output_record(&output_format, resource.singular_name(), &record)
}

pub async fn create(
    factory: &Factory,
    resource: &Resource,
    attributes: Value,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let record = factory.create().call(Some(&attributes)).await.into_result()?;
    report(resource, "created", &record, output_format)
}

pub async fn update(
    factory: &Factory,
    resource: &Resource,
    id: i64,
    attributes: Value,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let (find, update) = (factory.find_one(), factory.update());

    let record = steps(async {
        let record = step(find.call(&json!(id)).await)?;
        step(update.call(record, &attributes).await)
    })
    .await
    .into_result()?;

    report(resource, "updated", &record, output_format)
}

pub async fn delete(factory: &Factory, resource: &Resource, id: i64, output_format: OutputFormat) -> anyhow::Result<()> {
    let (find, destroy) = (factory.find_one(), factory.destroy());

    let record = steps(async {
        let record = step(find.call(&json!(id)).await)?;
        step(destroy.call(record).await)
    })
    .await
    .into_result()?;

    report(resource, "deleted", &record, output_format)
}

fn report(resource: &Resource, verb: &str, record: &Record, output_format: OutputFormat) -> anyhow::Result<()> {
    let id = record.id().map(Value::from).unwrap_or(Value::Null);

    output_success(
        &output_format,
        &format!("{} {} {}", resource.singular_name().replace('_', " "), id, verb),
        Some(json!({ (resource.singular_name()): record })),
    )
}
