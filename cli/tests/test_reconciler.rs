//! Progress reconciler tests

mod common;

use backend_im::deploy::{watch, DeploymentResult, ProgressEvent, Reconciler, StatusObservation};
use backend_im::errors::WatchError;
use backend_im_openapi::DeploymentStage;

use common::ScriptedSource;

fn observe(stage: DeploymentStage) -> StatusObservation {
    StatusObservation::new("dep", stage)
}

fn stage_changes(events: &[ProgressEvent]) -> Vec<DeploymentStage> {
    events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::StageChanged { stage, .. } => Some(*stage),
            ProgressEvent::Log(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_duplicate_stages_are_deduplicated() {
    let mut source = ScriptedSource::new(vec![
        Ok(observe(DeploymentStage::Queued)),
        Ok(observe(DeploymentStage::Queued)),
        Ok(observe(DeploymentStage::Committing)),
    ]);

    let mut events = Vec::new();
    let result = watch(&mut source, |event| events.push(event)).await;

    assert_eq!(
        stage_changes(&events),
        vec![DeploymentStage::Queued, DeploymentStage::Committing]
    );
    assert_eq!(
        result,
        DeploymentResult::Unknown {
            reason: WatchError::NoTerminalState
        }
    );
    assert!(source.closed);
}

#[tokio::test]
async fn test_failure_short_circuits() {
    let mut source = ScriptedSource::new(vec![
        Ok(observe(DeploymentStage::Committing)),
        Ok(observe(DeploymentStage::Building)),
        Ok(observe(DeploymentStage::Failed).with_log("image build failed")),
        Ok(observe(DeploymentStage::Deploying)),
        Ok(observe(DeploymentStage::Complete).with_url("https://late.backend.im")),
    ]);

    let mut events = Vec::new();
    let result = watch(&mut source, |event| events.push(event)).await;

    assert_eq!(
        result,
        DeploymentResult::Failure {
            reason: "image build failed".to_string()
        }
    );
    assert_eq!(source.consumed, 3);
    assert_eq!(source.remaining(), 2);
    assert!(source.closed);
    assert_eq!(
        stage_changes(&events).last(),
        Some(&DeploymentStage::Failed)
    );
}

#[tokio::test]
async fn test_complete_stops_watch_with_buffered_observations() {
    let mut source = ScriptedSource::new(vec![
        Ok(observe(DeploymentStage::Deploying)),
        Ok(observe(DeploymentStage::Complete).with_url("https://abc123def456.backend.im")),
        Ok(observe(DeploymentStage::Failed)),
    ]);

    let result = watch(&mut source, |_| {}).await;
    assert_eq!(
        result,
        DeploymentResult::Success {
            url: "https://abc123def456.backend.im".to_string()
        }
    );
    assert_eq!(source.remaining(), 1);
}

#[tokio::test]
async fn test_transport_error_becomes_unknown() {
    let mut source = ScriptedSource::new(vec![
        Ok(observe(DeploymentStage::Queued)),
        Err(WatchError::Decode("expected value at line 1 column 1".to_string())),
        Ok(observe(DeploymentStage::Complete)),
    ]);

    let result = watch(&mut source, |_| {}).await;
    assert_eq!(
        result,
        DeploymentResult::Unknown {
            reason: WatchError::Decode("expected value at line 1 column 1".to_string())
        }
    );
    assert_eq!(source.remaining(), 1);
}

#[tokio::test]
async fn test_logs_surface_in_order() {
    let mut source = ScriptedSource::new(vec![
        Ok(observe(DeploymentStage::Building).with_log("step 1/2")),
        Ok(observe(DeploymentStage::Building).with_log("step 2/2")),
        Ok(observe(DeploymentStage::Complete)
            .with_log("Deployment complete!")
            .with_url("https://x.backend.im")),
    ]);

    let mut events = Vec::new();
    watch(&mut source, |event| events.push(event)).await;

    let logs: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Log(line) => Some(line.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(logs, vec!["step 1/2", "step 2/2", "Deployment complete!"]);
}

#[test]
fn test_terminal_observation_is_idempotent() {
    let terminal = observe(DeploymentStage::Complete).with_url("https://abc.backend.im");

    let mut once = Reconciler::new();
    once.observe(&terminal);

    let mut twice = Reconciler::new();
    twice.observe(&terminal);
    assert!(twice.observe(&terminal).is_empty());

    assert_eq!(once.finish(None), twice.finish(None));

    let failed = observe(DeploymentStage::Failed).with_log("boom");
    let mut once = Reconciler::new();
    once.observe(&failed);
    let mut twice = Reconciler::new();
    twice.observe(&failed);
    twice.observe(&failed);
    assert_eq!(once.finish(None), twice.finish(None));
}

#[test]
fn test_success_always_carries_a_url() {
    // Every prefix of the canonical sequence, with the URL attached at
    // different points or not at all
    for url_at in 0..=DeploymentStage::ALL.len() {
        let mut reconciler = Reconciler::new();
        for (index, stage) in DeploymentStage::ALL.into_iter().enumerate() {
            let mut observation = observe(stage);
            if index == url_at {
                observation = observation.with_url("https://u.backend.im");
            }
            reconciler.observe(&observation);
        }

        match reconciler.finish(None) {
            DeploymentResult::Success { url } => {
                assert!(!url.is_empty());
                assert!(url_at < DeploymentStage::ALL.len());
            }
            DeploymentResult::MissingUrl => assert_eq!(url_at, DeploymentStage::ALL.len()),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn test_empty_url_is_not_a_url() {
    let update = backend_im_openapi::DeploymentUpdate {
        deployment_id: "dep".to_string(),
        project_id: "p".to_string(),
        commit_hash: "c".to_string(),
        status: DeploymentStage::Complete,
        namespace: None,
        pvc: None,
        url: Some(String::new()),
        logs: Vec::new(),
    };

    let observation: StatusObservation = update.into();
    let mut reconciler = Reconciler::new();
    reconciler.observe(&observation);
    assert_eq!(reconciler.finish(None), DeploymentResult::MissingUrl);
}
