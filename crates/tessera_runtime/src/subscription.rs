use crate::context::ScreenContext;
use crate::diagnostics::DiagnosticKind;
use crate::timer::{TimerHandle, TimerPurpose};
use crate::transport::{DataMessage, SubscriptionKey};
use serde_json::Value;
use tracing::{debug, info};

/// Observer handed to `subscribe`; called with every decoded payload.
pub type DataHandler = Box<dyn FnMut(&Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Idle,
    /// Requested, no `OK` yet. A retry timer is armed.
    Pending,
    Active,
    Cleaned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Requested,
    NoBinding,
    SceneAnimating,
    AfterCleanup,
}

/// The request/ack/timeout/retry cycle binding one widget to its data source.
pub struct SubscriptionManager {
    key: SubscriptionKey,
    state: SubscriptionState,
    retry: Option<TimerHandle>,
    handler: Option<DataHandler>,
    server_bound: bool,
    client_bound: bool,
    attempts: u32,
}

impl SubscriptionManager {
    pub fn new(key: SubscriptionKey) -> Self {
        Self {
            key,
            state: SubscriptionState::Idle,
            retry: None,
            handler: None,
            server_bound: false,
            client_bound: false,
            attempts: 0,
        }
    }

    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SubscriptionState::Active
    }

    /// Number of subscribe requests issued, retries included.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retry_timer(&self) -> Option<TimerHandle> {
        self.retry
    }

    pub fn subscribe(
        &mut self,
        ctx: &mut ScreenContext,
        has_binding: bool,
        on_data: Option<DataHandler>,
    ) -> SubscribeOutcome {
        if self.state == SubscriptionState::Cleaned {
            ctx.report(
                &self.key.id,
                DiagnosticKind::LifecycleViolation,
                "subscribe called after cleanup",
            );
            return SubscribeOutcome::AfterCleanup;
        }
        if !has_binding {
            return SubscribeOutcome::NoBinding;
        }
        if ctx.scene_entering_animation {
            debug!(widget = %self.key.id, "scene is animating, subscription deferred");
            return SubscribeOutcome::SceneAnimating;
        }
        if on_data.is_some() {
            self.handler = on_data;
        }
        self.request(ctx);
        SubscribeOutcome::Requested
    }

    fn request(&mut self, ctx: &mut ScreenContext) {
        if let Some(old) = self.retry.take() {
            ctx.timers.cancel(old);
        }
        ctx.transport.subscribe(&self.key);
        self.server_bound = true;
        self.client_bound = true;
        self.attempts += 1;
        self.state = SubscriptionState::Pending;
        let retry = ctx.settings.subscribe_retry();
        self.retry = Some(ctx.timers.schedule(&self.key.id, TimerPurpose::SubscribeRetry, retry));
    }

    /// Handles an expired retry timer. Re-issues the request only if this
    /// manager is still waiting on that exact timer.
    pub fn on_retry(&mut self, ctx: &mut ScreenContext, handle: TimerHandle) -> bool {
        if self.state != SubscriptionState::Pending || self.retry != Some(handle) {
            return false;
        }
        self.retry = None;
        info!(widget = %self.key.id, attempt = self.attempts + 1, "no acknowledgment, re-subscribing");
        self.request(ctx);
        true
    }

    /// Classifies an inbound frame. The acknowledgment activates the
    /// subscription and is swallowed; anything else is decoded and returned.
    pub fn accept(&mut self, ctx: &mut ScreenContext, message: &DataMessage) -> Option<Value> {
        match self.state {
            SubscriptionState::Idle | SubscriptionState::Cleaned => {
                debug!(widget = %self.key.id, "dropping frame for an inactive subscription");
                return None;
            }
            SubscriptionState::Pending | SubscriptionState::Active => {}
        }
        if message.is_ack() {
            self.state = SubscriptionState::Active;
            if let Some(retry) = self.retry.take() {
                ctx.timers.cancel(retry);
            }
            return None;
        }
        debug!(widget = %self.key.id, "data received");
        match serde_json::from_str(&message.body) {
            Ok(payload) => Some(payload),
            Err(err) => {
                ctx.report(
                    &self.key.id,
                    DiagnosticKind::InvalidPayload,
                    format!("payload is not JSON: {err}"),
                );
                None
            }
        }
    }

    pub fn forward(&mut self, payload: &Value) {
        if let Some(handler) = self.handler.as_mut() {
            handler(payload);
        }
    }

    pub fn unsubscribe(&mut self, ctx: &mut ScreenContext) {
        if self.server_bound {
            ctx.transport.unsubscribe(&self.key);
            self.server_bound = false;
        }
        self.settle(ctx);
    }

    pub fn unsubscribe_by_client(&mut self, ctx: &mut ScreenContext) {
        if self.client_bound {
            ctx.transport.unsubscribe_by_client(&self.key);
            self.client_bound = false;
        }
        self.settle(ctx);
    }

    fn settle(&mut self, ctx: &mut ScreenContext) {
        if let Some(retry) = self.retry.take() {
            ctx.timers.cancel(retry);
        }
        if self.state != SubscriptionState::Cleaned {
            self.state = SubscriptionState::Idle;
        }
    }

    /// Releases everything; later retries and subscribes are refused.
    pub fn cleanup(&mut self, ctx: &mut ScreenContext) {
        self.unsubscribe(ctx);
        self.unsubscribe_by_client(ctx);
        self.handler = None;
        self.state = SubscriptionState::Cleaned;
    }
}
