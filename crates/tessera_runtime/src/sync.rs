use crate::context::ScreenContext;
use crate::timer::{TimerHandle, TimerPurpose};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelHandle(pub u64);

/// Cross-screen broadcast channels keyed by widget id. Inbound messages are
/// pushed back by the host through `Screen::deliver_sync`.
pub trait SyncChannelHub {
    fn open(&mut self, widget_id: &str) -> ChannelHandle;
    fn send(&mut self, channel: ChannelHandle, message: &Value);
    fn close(&mut self, channel: ChannelHandle);
}

/// A widget's event-sync channel and the heartbeat interval that keeps it
/// alive.
#[derive(Debug, Default)]
pub struct EventSync {
    channel: Option<ChannelHandle>,
    heartbeat: Option<TimerHandle>,
    last_message: Option<Value>,
}

impl EventSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    pub fn channel(&self) -> Option<ChannelHandle> {
        self.channel
    }

    pub fn last_message(&self) -> Option<&Value> {
        self.last_message.as_ref()
    }

    /// Opens the channel once; later calls are no-ops.
    pub fn open(&mut self, ctx: &mut ScreenContext, widget_id: &str) -> bool {
        if self.channel.is_some() {
            return false;
        }
        self.channel = Some(ctx.sync.open(widget_id));
        let every = ctx.settings.sync_heartbeat();
        self.heartbeat = Some(ctx.timers.schedule(widget_id, TimerPurpose::SyncHeartbeat, every));
        debug!(widget = widget_id, "event sync channel opened");
        true
    }

    pub fn send(&mut self, ctx: &mut ScreenContext, message: &Value) -> bool {
        match self.channel {
            Some(channel) => {
                ctx.sync.send(channel, message);
                true
            }
            None => false,
        }
    }

    pub fn receive(&mut self, message: Value) {
        self.last_message = Some(message);
    }

    pub fn on_heartbeat(&mut self, ctx: &mut ScreenContext, widget_id: &str, handle: TimerHandle) -> bool {
        let Some(channel) = self.channel else {
            return false;
        };
        if self.heartbeat != Some(handle) {
            return false;
        }
        ctx.sync.send(channel, &json!({ "type": "heartbeat", "id": widget_id }));
        let every = ctx.settings.sync_heartbeat();
        self.heartbeat = Some(ctx.timers.schedule(widget_id, TimerPurpose::SyncHeartbeat, every));
        true
    }

    /// Closes the channel and stops the heartbeat. Safe to call repeatedly.
    pub fn close(&mut self, ctx: &mut ScreenContext) {
        if let Some(heartbeat) = self.heartbeat.take() {
            ctx.timers.cancel(heartbeat);
        }
        if let Some(channel) = self.channel.take() {
            ctx.sync.close(channel);
        }
    }
}
