use crate::e2e::helpers;

use helpers::{assertions::assert_generation_shape, TestContext};
use hyper::StatusCode;
use test_context::test_context;
use uuid::Uuid;
use voicegen_backend::domain::generation::{GenerationResponse, GenerationStatus};
use voicegen_backend::infrastructure::repositories::GenerationRepository;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_full_record_for_completed_generation(ctx: &TestContext) {
    let generation = ctx
        .fixtures
        .create_generation("Hello", GenerationStatus::Completed, 1);

    let response = ctx
        .client
        .get(&format!("/generations/{}", generation.id))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_generation_shape(body);

    let record: GenerationResponse = response.json().unwrap();
    assert_eq!(record.id, generation.id);
    assert_eq!(record.status, GenerationStatus::Completed);
    assert_eq!(record.audio_url, generation.audio_url);
    assert_eq!(record.file_size, Some(2048));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_nulls_for_unset_fields(ctx: &TestContext) {
    let generation = ctx
        .fixtures
        .create_generation("Hello", GenerationStatus::Processing, 1);

    let response = ctx
        .client
        .get(&format!("/generations/{}", generation.id))
        .await
        .unwrap();

    let body = response.body.as_ref().unwrap();
    assert_generation_shape(body);
    assert_eq!(body["status"], "processing");
    assert!(body["audio_url"].is_null());
    assert!(body["error_message"].is_null());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_generation(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/generations/{}", Uuid::new_v4()))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("Audio generation not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_malformed_id(ctx: &TestContext) {
    let response = ctx.client.get("/generations/not-a-uuid").await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error("Audio generation not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_newest_first_with_default_pagination(ctx: &TestContext) {
    let oldest = ctx
        .fixtures
        .create_generation("oldest", GenerationStatus::Completed, 30);
    let newest = ctx
        .fixtures
        .create_generation("newest", GenerationStatus::Failed, 1);
    let middle = ctx
        .fixtures
        .create_generation("middle", GenerationStatus::Completed, 10);

    let response = ctx.client.get("/generations").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 20);

    let ids: Vec<String> = body["generations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ids,
        vec![
            newest.id.to_string(),
            middle.id.to_string(),
            oldest.id.to_string()
        ]
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_by_status(ctx: &TestContext) {
    ctx.fixtures
        .create_generation("done", GenerationStatus::Completed, 5);
    let failed = ctx
        .fixtures
        .create_generation("broken", GenerationStatus::Failed, 3);

    let response = ctx.client.get("/generations?status=failed").await.unwrap();

    response.assert_status(StatusCode::OK);
    let generations = response.body.as_ref().unwrap()["generations"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(generations.len(), 1);
    assert_eq!(generations[0]["id"], failed.id.to_string());
    assert_eq!(
        generations[0]["error_message"],
        "ProviderError: Rate limit exceeded"
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_status_filter(ctx: &TestContext) {
    let response = ctx.client.get("/generations?status=done").await.unwrap();

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.as_ref().unwrap()["errors"].is_array());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clamp_per_page(ctx: &TestContext) {
    let response = ctx.client.get("/generations?per_page=200").await.unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap()["per_page"], 100);

    let response = ctx.client.get("/generations?per_page=0&page=0").await.unwrap();
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["per_page"], 1);
    assert_eq!(body["page"], 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_paginate(ctx: &TestContext) {
    for minutes_ago in 1..=5 {
        ctx.fixtures.create_generation(
            &format!("record {}", minutes_ago),
            GenerationStatus::Completed,
            minutes_ago,
        );
    }

    let response = ctx
        .client
        .get("/generations?page=2&per_page=2")
        .await
        .unwrap();

    let body = response.body.as_ref().unwrap();
    let texts: Vec<&str> = body["generations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["record 3", "record 4"]);
    assert_eq!(body["page"], 2);

    let response = ctx
        .client
        .get("/generations?page=9&per_page=2")
        .await
        .unwrap();
    assert!(response.body.as_ref().unwrap()["generations"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_unfinished_generations_oldest_first(ctx: &TestContext) {
    let newest = ctx
        .fixtures
        .create_generation("newest", GenerationStatus::Pending, 1);
    let oldest = ctx
        .fixtures
        .create_generation("oldest", GenerationStatus::Processing, 30);
    let middle = ctx
        .fixtures
        .create_generation("middle", GenerationStatus::Pending, 10);
    ctx.fixtures
        .create_generation("done", GenerationStatus::Completed, 60);

    let unfinished = ctx.store.find_unfinished_ids().await.unwrap();

    assert_eq!(unfinished, vec![oldest.id, middle.id, newest.id]);
}
