mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

fn company_names(body: &Value) -> Vec<&str> {
    body["data"]["jobs"]
        .as_array()
        .map(|jobs| jobs.iter().filter_map(|job| job["company_name"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_root_and_health() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["name"], json!("Job Tracker"));

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("ok"));
    assert_eq!(body["data"]["store"], json!("memory"));
    Ok(())
}

#[tokio::test]
async fn test_index_orders_by_company_name() -> Result<()> {
    let app = TestApp::new();
    let period = common::create_time_period(&app.store, 3, 2024).await?;
    for company in ["Initech", "Acme", "Globex"] {
        common::create_job(&app.store, &period, json!({ "company_name": company })).await?;
    }

    let (status, body) = app.get("/jobs").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(company_names(&body), vec!["Acme", "Globex", "Initech"]);

    let (_, body) = app.get("/jobs?order=company_name:desc").await?;
    assert_eq!(company_names(&body), vec!["Initech", "Globex", "Acme"]);

    let (_, body) = app.get("/jobs?order%5Bcompany_name%5D=descending").await?;
    assert_eq!(company_names(&body), vec!["Initech", "Globex", "Acme"]);

    let (status, body) = app.get("/jobs?order=company_name").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["type"], json!("invalid_parameters"));
    assert_eq!(body["error"]["data"]["errors"], json!([["order", "is invalid"]]));
    Ok(())
}

#[tokio::test]
async fn test_new_and_edit_include_form_data() -> Result<()> {
    let app = TestApp::new();
    let period = common::create_time_period(&app.store, 4, 2024).await?;
    let job = common::create_job(&app.store, &period, json!({})).await?;

    let (status, body) = app.get("/jobs/new").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["id"], Value::Null);
    assert_eq!(body["data"]["job"]["application_status"], json!("prospect"));
    assert_eq!(body["data"]["job_types"], json!(["full_time", "part_time", "contract", "freelance"]));
    assert_eq!(body["data"]["time_periods"][0]["id"], json!(period.id()));

    let (status, body) = app.get(&format!("/jobs/{}/edit", job.id().unwrap_or_default())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["company_name"], json!("Acme"));
    assert!(body["data"]["time_periods"].is_array());

    let (_, body) = app.get(&format!("/jobs/{}", job.id().unwrap_or_default())).await?;
    assert!(body["data"].get("job_types").is_none());
    Ok(())
}

#[tokio::test]
async fn test_create_job() -> Result<()> {
    let app = TestApp::new();
    let period = common::create_time_period(&app.store, 5, 2024).await?;

    let (status, body) = app
        .post(
            "/jobs",
            json!({
                "job": {
                    "company_name": "Acme",
                    "source": "Web",
                    "time_period_id": period.id(),
                    "salary": 100000,
                }
            }),
        )
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert!(body["data"]["job"]["id"].as_i64().is_some_and(|id| id > 0));
    assert!(body["data"]["job"].get("salary").is_none());
    assert!(body["data"].get("job_types").is_none());
    Ok(())
}

#[tokio::test]
async fn test_failed_create_returns_record_and_form_data() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.post("/jobs", json!({ "job": { "company_name": "Acme", "source": "Web" } })).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], json!("failed_validation"));
    assert_eq!(body["error"]["message"], json!("Job has validation errors: time_period must exist"));
    assert_eq!(body["data"]["job"]["company_name"], json!("Acme"));
    assert_eq!(body["data"]["time_periods"], json!([]));
    assert!(body["data"]["job_types"].is_array());

    let (status, body) = app.post("/jobs", json!({ "job": { "salary": 1 } })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("Invalid request parameters: job can't be blank"));

    let (status, _) = app.request("POST", "/jobs", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_show_errors() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/jobs/404").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], json!("not_found"));
    assert_eq!(body["error"]["data"]["attributes"], json!({ "id": 404 }));

    let (status, body) = app.get("/jobs/abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("Invalid request parameters: id must be an Integer"));
    Ok(())
}

#[tokio::test]
async fn test_update_and_destroy_job() -> Result<()> {
    let app = TestApp::new();
    let period = common::create_time_period(&app.store, 6, 2024).await?;
    let job = common::create_job(&app.store, &period, json!({})).await?;
    let path = format!("/jobs/{}", job.id().unwrap_or_default());

    let (status, body) = app.patch(&path, json!({ "job": { "application_status": "applied" } })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["application_status"], json!("applied"));

    let (status, body) = app.patch(&path, json!({ "job": { "source": "" } })).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["data"]["errors"], json!([["source", "can't be blank"]]));
    assert!(body["data"]["job_types"].is_array());

    let (status, _) = app.delete(&path).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_time_periods_resource() -> Result<()> {
    let app = TestApp::new();

    for (month, year) in [(11, 2023), (1, 2024)] {
        let (status, _) = app.post("/time_periods", json!({ "time_period": { "month": month, "year": year } })).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get("/time_periods").await?;
    let labels: Vec<(Value, Value)> = body["data"]["time_periods"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|period| (period["year"].clone(), period["month"].clone()))
        .collect();
    assert_eq!(labels, vec![(json!(2024), json!(1)), (json!(2023), json!(11))]);

    let (status, body) = app.post("/time_periods", json!({ "time_period": { "month": 13, "year": 2024 } })).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["data"]["errors"], json!([["month", "must be less than or equal to 12"]]));
    assert!(body["data"].get("job_types").is_none());

    let (_, body) = app.get("/time_periods").await?;
    let newest = body["data"]["time_periods"][0]["id"].as_i64().unwrap_or_default();
    let (status, _) = app
        .post("/jobs", json!({ "job": { "company_name": "Acme", "source": "Web", "time_period_id": newest } }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.delete(&format!("/time_periods/{}", newest)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["data"]["errors"], json!([["base", "Cannot delete record because dependent jobs exist"]]));
    assert_eq!(body["data"]["time_period"]["id"], json!(newest));
    Ok(())
}
