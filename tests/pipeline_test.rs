mod common;

use playlog::{
    error::TokenError,
    pipeline::{Pipeline, PipelineError},
};
use reqwest::StatusCode;
use serde_json::json;

use common::{
    CountingStore, ProviderConfig, credentials, history_item, history_page, http_client,
    memory_store, spawn_provider,
};

#[tokio::test]
async fn test_rejected_exchange_never_fetches_history() {
    let provider = spawn_provider(ProviderConfig {
        token_status: StatusCode::UNAUTHORIZED,
        token_body: json!({ "error": "invalid_grant" }),
        history_body: history_page(vec![history_item(
            "t1",
            "Song",
            "2024-01-01T12:00:00Z",
            &["A"],
        )]),
        ..Default::default()
    })
    .await;
    let store = CountingStore::new(memory_store().await);
    let pipeline = Pipeline::new(http_client(), provider.endpoints.clone(), credentials());

    let result = pipeline.run_with_code("the-code", &store).await;

    assert!(matches!(
        result,
        Err(PipelineError::Token(TokenError::ExchangeRejected(401)))
    ));
    assert_eq!(provider.token_hits(), 1);
    assert_eq!(provider.profile_hits(), 0);
    assert_eq!(provider.history_hits(), 0);
    assert_eq!(store.insert_calls(), 0);
}

#[tokio::test]
async fn test_code_to_stored_rows() {
    // played_at inside the default window, regardless of when the test runs
    let played_at = (chrono::Utc::now() - chrono::Duration::hours(1))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    let provider = spawn_provider(ProviderConfig {
        history_body: history_page(vec![history_item("t1", "Song", &played_at, &["A"])]),
        ..Default::default()
    })
    .await;
    let store = memory_store().await;
    let pipeline = Pipeline::new(http_client(), provider.endpoints.clone(), credentials());

    let (auth, inserted) = pipeline.run_with_code("the-code", &store).await.unwrap();

    assert_eq!(auth.access_token, "access-123");
    assert_eq!(inserted, 1);
    assert_eq!(store.count().await.unwrap(), 1);

    let seen = provider.last_history_request().unwrap();
    assert_eq!(seen.authorization.as_deref(), Some("Bearer access-123"));
    assert!(seen.params["after"].parse::<i64>().unwrap() > 0);
}

#[tokio::test]
async fn test_profile_failure_does_not_stop_sync() {
    let played_at = (chrono::Utc::now() - chrono::Duration::hours(1))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    let provider = spawn_provider(ProviderConfig {
        profile_status: StatusCode::FORBIDDEN,
        profile_body: json!({ "error": { "status": 403, "message": "Forbidden" } }),
        history_body: history_page(vec![history_item("t1", "Song", &played_at, &["A"])]),
        ..Default::default()
    })
    .await;
    let store = memory_store().await;
    let pipeline = Pipeline::new(http_client(), provider.endpoints.clone(), credentials());

    let (_, inserted) = pipeline.run_with_code("the-code", &store).await.unwrap();

    assert_eq!(provider.profile_hits(), 1);
    assert_eq!(inserted, 1);
}

#[test]
fn test_error_messages_name_the_stage() {
    let err = PipelineError::from(TokenError::ExchangeRejected(400));
    assert_eq!(
        err.to_string(),
        "unable to get access token: token endpoint rejected the exchange with status 400"
    );
}
