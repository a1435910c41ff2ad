//! `crashprobe run` end to end with the process-wide reporter
//!
//! Kept in its own test binary: telemetry can only be initialised once per
//! process.

use crashprobe::core::Config;
use crashprobe::{cli, ScenarioOutcome};

#[tokio::test]
async fn test_run_survives_failure_and_ends_session() {
    let mut appium = mockito::Server::new_async().await;

    let create = appium
        .mock("POST", "/session")
        .with_status(200)
        .with_body(r#"{"value":{"sessionId":"cli1","capabilities":{}}}"#)
        .create_async()
        .await;
    let _find = appium
        .mock("POST", "/session/cli1/element")
        .with_status(404)
        .with_body(r#"{"value":{"error":"no such element","message":"none"}}"#)
        .create_async()
        .await;
    let delete = appium
        .mock("DELETE", "/session/cli1")
        .with_status(200)
        .with_body(r#"{"value":null}"#)
        .create_async()
        .await;

    let mut config = Config::default();
    config.appium.url = appium.url();
    config.telemetry.dsn = None;
    config.scenario.flush_wait_secs = 1;

    let outcome = cli::run_native_crash(&config).await.unwrap();

    assert!(matches!(
        outcome,
        ScenarioOutcome::Captured { step: 0, event_id: None, .. }
    ));
    assert!(cli::summary(&outcome).ends_with("(run still passes)"));
    create.assert_async().await;
    delete.assert_async().await;
}
