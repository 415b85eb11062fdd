use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tessera_runtime::memory::TransportCall;
use tessera_runtime::{
    DataMessage, DiagnosticKind, EventSync, RuntimeSettings, ScreenContext, SubscribeOutcome,
    SubscriptionKey, SubscriptionManager, SubscriptionState, TimerPurpose,
};

fn fire_due(ctx: &mut ScreenContext, manager: &mut SubscriptionManager, until: Duration) -> u32 {
    let mut retried = 0;
    while let Some(expired) = ctx.timers.pop_due(until) {
        assert_eq!(expired.purpose, TimerPurpose::SubscribeRetry);
        if manager.on_retry(ctx, expired.handle) {
            retried += 1;
        }
    }
    ctx.timers.advance_to(until);
    retried
}

#[test]
fn retries_once_per_window_until_acknowledged() {
    let (mut ctx, handles) = ScreenContext::in_memory(RuntimeSettings::default());
    let mut manager = SubscriptionManager::new(SubscriptionKey::new("w1", "gauge"));

    assert_eq!(manager.subscribe(&mut ctx, true, None), SubscribeOutcome::Requested);
    assert_eq!(handles.transport.subscribe_count("w1"), 1);

    assert_eq!(fire_due(&mut ctx, &mut manager, Duration::from_millis(6_999)), 0);
    assert_eq!(fire_due(&mut ctx, &mut manager, Duration::from_secs(7)), 1);
    assert_eq!(fire_due(&mut ctx, &mut manager, Duration::from_secs(35)), 4);
    assert_eq!(handles.transport.subscribe_count("w1"), 6);
    assert_eq!(manager.state(), SubscriptionState::Pending);

    manager.accept(&mut ctx, &DataMessage::ack());
    assert!(manager.is_active());
    assert_eq!(fire_due(&mut ctx, &mut manager, Duration::from_secs(120)), 0);
    assert_eq!(handles.transport.subscribe_count("w1"), 6);
}

#[test]
fn cleanup_stops_pending_retries() {
    let (mut ctx, handles) = ScreenContext::in_memory(RuntimeSettings::default());
    let mut manager = SubscriptionManager::new(SubscriptionKey::new("w1", "gauge"));
    manager.subscribe(&mut ctx, true, None);
    let pending = manager.retry_timer().unwrap();

    manager.cleanup(&mut ctx);

    assert!(!ctx.timers.is_pending(pending));
    assert!(!manager.on_retry(&mut ctx, pending));
    assert_eq!(fire_due(&mut ctx, &mut manager, Duration::from_secs(60)), 0);
    assert_eq!(handles.transport.subscribe_count("w1"), 1);

    assert_eq!(manager.subscribe(&mut ctx, true, None), SubscribeOutcome::AfterCleanup);
    assert_eq!(handles.transport.subscribe_count("w1"), 1);
    assert_eq!(ctx.diagnostics()[0].kind, DiagnosticKind::LifecycleViolation);
}

#[test]
fn acknowledgment_is_not_forwarded() {
    let (mut ctx, _handles) = ScreenContext::in_memory(RuntimeSettings::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut manager = SubscriptionManager::new(SubscriptionKey::new("w1", "gauge"));
    manager.subscribe(&mut ctx, true, Some(Box::new(move |v: &Value| sink.borrow_mut().push(v.clone()))));

    assert_eq!(manager.accept(&mut ctx, &DataMessage::ack()), None);
    let payload = manager.accept(&mut ctx, &DataMessage::new(r#"{"speed": 42}"#)).unwrap();
    manager.forward(&payload);

    assert_eq!(*seen.borrow(), vec![json!({"speed": 42})]);
}

#[test]
fn bad_payloads_become_diagnostics() {
    let (mut ctx, _handles) = ScreenContext::in_memory(RuntimeSettings::default());
    let mut manager = SubscriptionManager::new(SubscriptionKey::new("w1", "gauge"));
    manager.subscribe(&mut ctx, true, None);

    assert_eq!(manager.accept(&mut ctx, &DataMessage::new("{not json")), None);
    let diagnostics = ctx.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::InvalidPayload);
}

#[test]
fn no_binding_or_scene_animation_skips_the_request() {
    let (mut ctx, handles) = ScreenContext::in_memory(RuntimeSettings::default());
    let mut manager = SubscriptionManager::new(SubscriptionKey::new("w1", "gauge"));

    assert_eq!(manager.subscribe(&mut ctx, false, None), SubscribeOutcome::NoBinding);
    ctx.scene_entering_animation = true;
    assert_eq!(manager.subscribe(&mut ctx, true, None), SubscribeOutcome::SceneAnimating);
    assert!(handles.transport.calls().is_empty());
}

#[test]
fn unsubscribe_is_idempotent() {
    let (mut ctx, handles) = ScreenContext::in_memory(RuntimeSettings::default());
    let key = SubscriptionKey::new("w1", "gauge");
    let mut manager = SubscriptionManager::new(key.clone());

    manager.unsubscribe(&mut ctx);
    manager.unsubscribe_by_client(&mut ctx);
    assert!(handles.transport.calls().is_empty());

    manager.subscribe(&mut ctx, true, None);
    manager.unsubscribe(&mut ctx);
    manager.unsubscribe(&mut ctx);
    manager.unsubscribe_by_client(&mut ctx);
    assert_eq!(
        handles.transport.calls(),
        vec![
            TransportCall::Subscribe(key.clone()),
            TransportCall::Unsubscribe(key.clone()),
            TransportCall::UnsubscribeByClient(key),
        ]
    );
    assert_eq!(manager.state(), SubscriptionState::Idle);
}

#[test]
fn sync_channel_opens_once_and_beats() {
    let (mut ctx, handles) = ScreenContext::in_memory(RuntimeSettings::default());
    let mut sync = EventSync::new();

    assert!(sync.open(&mut ctx, "w1"));
    assert!(!sync.open(&mut ctx, "w1"));
    assert_eq!(handles.sync.open_channels(), vec!["w1".to_string()]);

    let until = Duration::from_secs(61);
    while let Some(expired) = ctx.timers.pop_due(until) {
        assert_eq!(expired.purpose, TimerPurpose::SyncHeartbeat);
        sync.on_heartbeat(&mut ctx, &expired.owner, expired.handle);
    }
    assert_eq!(handles.sync.sent().len(), 2);
    assert_eq!(handles.sync.sent()[0].1, json!({"type": "heartbeat", "id": "w1"}));

    sync.close(&mut ctx);
    sync.close(&mut ctx);
    assert_eq!(handles.sync.closed(), vec!["w1".to_string()]);
    assert_eq!(ctx.timers.pending_for("w1"), 0);
}
