mod common;

use anyhow::Result;
use serde_json::{json, Value};

use job_tracker::database::Record;
use job_tracker::filter::FilterOrderInfo;
use job_tracker::models::{Job, JOB, TIME_PERIOD};
use job_tracker::operations::{Factory, MatchOptions, OperationError};

fn ids(records: &[Record]) -> Vec<Option<i64>> {
    records.iter().map(Record::id).collect()
}

#[tokio::test]
async fn test_find_one_guards_the_id() -> Result<()> {
    let find = Factory::for_class(&JOB, common::memory_store()).find_one();

    let blank = find.call(&Value::Null).await;
    let message = blank.error().map(OperationError::message).unwrap_or_default();
    assert_eq!(blank.error().map(|e| e.type_tag()), Some("invalid_parameters"));
    assert!(message.ends_with("id can't be blank"), "{}", message);

    for id in [json!("abc"), json!(1.5), json!([1]), json!({ "id": 1 })] {
        let outcome = find.call(&id).await;
        let message = outcome.error().map(OperationError::message).unwrap_or_default();
        assert!(message.ends_with("id must be an Integer"), "{}: {}", id, message);
    }

    let missing = find.call(&json!(404)).await;
    assert_eq!(missing.error().map(|e| e.data()["attributes"].clone()), Some(json!({ "id": 404 })));
    assert_eq!(missing.error().map(OperationError::message), Some("Job not found with attributes id: 404".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_find_many_guards_the_ids() -> Result<()> {
    let find = Factory::for_class(&TIME_PERIOD, common::memory_store()).find_many();

    let empty = find.call(&json!([]), false).await;
    assert_eq!(empty.error(), Some(&OperationError::invalid_parameter("ids", "can't be blank")));

    let not_array = find.call(&json!(3), false).await;
    assert_eq!(not_array.error(), Some(&OperationError::invalid_parameter("ids", "must be an Array")));

    let bad_element = find.call(&json!([1, "two", null]), false).await;
    assert_eq!(
        bad_element.error().map(OperationError::message),
        Some("Invalid request parameters: ids 1 must be an Integer".to_string())
    );

    let null_element = find.call(&json!([null, 1]), false).await;
    assert_eq!(null_element.error(), Some(&OperationError::invalid_parameter("ids.0", "can't be blank")));
    Ok(())
}

#[tokio::test]
async fn test_find_many_partial_results() -> Result<()> {
    let store = common::memory_store();
    let first = common::create_time_period(&store, 1, 2024).await?;
    let second = common::create_time_period(&store, 2, 2024).await?;
    let find = Factory::for_class(&TIME_PERIOD, store).find_many();

    let requested = json!([second.id(), 99, first.id()]);

    let strict = find.call(&requested, false).await;
    assert_eq!(strict.error().map(|e| e.data()["attributes"].clone()), Some(json!({ "ids": [99] })));

    let partial = find.call(&requested, true).await.into_result()?;
    assert_eq!(ids(&partial.records), vec![second.id(), first.id()]);
    assert_eq!(partial.missing, vec![99]);
    Ok(())
}

#[tokio::test]
async fn test_find_matching_orders() -> Result<()> {
    let store = common::memory_store();
    let period = common::create_time_period(&store, 6, 2024).await?;
    let globex = common::create_job(&store, &period, json!({ "company_name": "Globex" })).await?;
    let acme = common::create_job(&store, &period, json!({ "company_name": "Acme" })).await?;
    let initech = common::create_job(&store, &period, json!({ "company_name": "Initech" })).await?;
    let find = Factory::for_class(&JOB, store).find_matching();

    let newest_first = find.call(MatchOptions::default()).await.into_result()?;
    assert_eq!(ids(&newest_first), vec![initech.id(), acme.id(), globex.id()]);

    let by_company = find
        .call(MatchOptions::ordered(vec![FilterOrderInfo::asc("company_name")]))
        .await
        .into_result()?;
    assert_eq!(ids(&by_company), vec![acme.id(), globex.id(), initech.id()]);

    let invalid = find.call(MatchOptions::ordered(vec![FilterOrderInfo::asc("salary")])).await;
    assert_eq!(invalid.error(), Some(&OperationError::invalid_parameter("order", "is invalid")));
    Ok(())
}

#[tokio::test]
async fn test_find_matching_scopes_and_class_default_order() -> Result<()> {
    let store = common::memory_store();
    let older = common::create_time_period(&store, 12, 2023).await?;
    let newer = common::create_time_period(&store, 2, 2024).await?;
    let middle = common::create_time_period(&store, 1, 2024).await?;

    let periods = Factory::for_class(&TIME_PERIOD, store.clone())
        .find_matching()
        .call(MatchOptions::default())
        .await
        .into_result()?;
    assert_eq!(ids(&periods), vec![newer.id(), middle.id(), older.id()]);

    common::create_job(&store, &newer, json!({ "application_status": "interviewing" })).await?;
    common::create_job(&store, &newer, json!({ "company_name": "Globex" })).await?;

    let find = Factory::for_class(&JOB, store).find_matching();
    let interviewing = find.call(Job::interviewing()).await.into_result()?;
    assert_eq!(interviewing.len(), 1);
    assert_eq!(interviewing[0].get_str("company_name"), Some("Acme"));

    let prospects = find.call(Job::prospects().limit(5)).await.into_result()?;
    assert_eq!(prospects.len(), 1);
    assert_eq!(prospects[0].get_str("company_name"), Some("Globex"));
    Ok(())
}
