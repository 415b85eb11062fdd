use crate::options::{Frame, ScreenDefinition};
use crate::registry::Registry;
use crate::widget::{Env, Widget};
use serde_json::Value;
use std::time::Duration;
use tessera_runtime::{
    ActionMessage, DataMessage, Diagnostic, DiagnosticKind, RuntimeSideEffect, ScreenContext,
    SubscriptionState, WorkMode,
};
use tracing::{debug, info, warn};

/// One screen session: the context shared by its widgets, the class registry
/// and the root widgets. Hosts feed it transport frames, sync messages, time
/// and action messages.
pub struct Screen {
    ctx: ScreenContext,
    registry: Registry,
    work_mode: WorkMode,
    widgets: Vec<Widget>,
}

impl Screen {
    pub fn new(ctx: ScreenContext, registry: Registry) -> Self {
        Self {
            ctx,
            registry,
            work_mode: WorkMode::default(),
            widgets: Vec::new(),
        }
    }

    /// Tears down whatever is loaded, then builds every root widget inside
    /// its own positioned holder element.
    pub fn load(&mut self, definition: &ScreenDefinition) -> usize {
        self.teardown();
        self.work_mode = definition.work_mode;
        let root = self.ctx.surface.root();
        self.ctx.surface.clear(root);
        for options in &definition.components {
            let code = options.code().unwrap_or_default();
            let frame = options.frame().unwrap_or_default();
            let surface = &mut self.ctx.surface;
            let holder = surface.append(root, "div", &format!("widget_{code}"));
            surface.set_style(holder, "position", "absolute");
            surface.set_style(holder, "left", &Frame::px(frame.x));
            surface.set_style(holder, "top", &Frame::px(frame.y));
            surface.set_style(holder, "width", &Frame::px(frame.width));
            surface.set_style(holder, "height", &Frame::px(frame.height));
            if let Some(widget) = self.registry.build(&mut self.ctx, options, holder, definition.work_mode) {
                self.widgets.push(widget);
            }
        }
        info!(
            screen = %definition.name,
            mode = self.work_mode.as_str(),
            widgets = self.widgets.len(),
            "screen loaded"
        );
        self.widgets.len()
    }

    pub fn deliver_data(&mut self, widget_id: &str, message: &DataMessage) -> bool {
        let Some(widget) = self.widgets.iter_mut().find_map(|w| w.find_mut(widget_id)) else {
            warn!(widget = widget_id, "data for an unknown widget");
            return false;
        };
        let mut env = Env::new(&mut self.ctx, &self.registry);
        widget.deliver_data(&mut env, message);
        true
    }

    pub fn deliver_sync(&mut self, widget_id: &str, message: Value) -> bool {
        match self.widgets.iter_mut().find_map(|w| w.find_mut(widget_id)) {
            Some(widget) => {
                widget.on_event_sync(message);
                true
            }
            None => false,
        }
    }

    /// Moves the clock forward by `elapsed`, firing every timer that comes due
    /// on the way in order.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let until = self.ctx.timers.now() + elapsed;
        let mut fired = 0;
        while let Some(expired) = self.ctx.timers.pop_due(until) {
            let ctx = &mut self.ctx;
            match self.widgets.iter_mut().find_map(|w| w.find_mut(&expired.owner)) {
                Some(widget) => {
                    if widget.on_timer(ctx, &expired) {
                        fired += 1;
                    }
                }
                None => debug!(owner = %expired.owner, "timer for a widget that is gone"),
            }
        }
        self.ctx.timers.advance_to(until);
        fired
    }

    /// Applies each dispatch record to the widget whose code is its
    /// `performerId`.
    pub fn route_actions(&mut self, message: &ActionMessage) -> usize {
        let mut applied = 0;
        for record in &message.actions {
            let target = self
                .widgets
                .iter_mut()
                .find_map(|w| w.find_by_code_mut(&record.performer_id));
            let Some(widget) = target else {
                self.ctx.report(
                    &message.target_id,
                    DiagnosticKind::UnknownTarget,
                    format!("no widget with code '{}'", record.performer_id),
                );
                continue;
            };
            let mut env = Env::new(&mut self.ctx, &self.registry);
            widget.invoke(&mut env, &record.function_name, &record.param);
            applied += 1;
        }
        applied
    }

    pub fn fire_trigger(&mut self, widget_id: &str, trigger: &str) -> usize {
        let ctx = &mut self.ctx;
        self.widgets
            .iter_mut()
            .find_map(|w| w.find_mut(widget_id))
            .map_or(0, |widget| widget.fire_trigger(ctx, trigger))
    }

    /// Flags the scene transition. Clearing the flag subscribes every widget
    /// that was skipped while it was set.
    pub fn set_scene_animating(&mut self, animating: bool) {
        self.ctx.scene_entering_animation = animating;
        if animating || !self.work_mode.subscribes_data() {
            return;
        }
        let ctx = &mut self.ctx;
        for widget in &mut self.widgets {
            widget.visit_mut(&mut |w: &mut Widget| {
                if w.subscription().state() == SubscriptionState::Idle {
                    w.subscribe_data_source(ctx, None);
                }
            });
        }
    }

    /// Cleans up every widget. The screen can be loaded again afterwards.
    pub fn teardown(&mut self) {
        for mut widget in self.widgets.drain(..) {
            widget.cleanup(&mut self.ctx);
        }
    }

    pub fn with_widget<R>(&mut self, widget_id: &str, f: impl FnOnce(&mut Widget, &mut Env<'_>) -> R) -> Option<R> {
        let widget = self.widgets.iter_mut().find_map(|w| w.find_mut(widget_id))?;
        let mut env = Env::new(&mut self.ctx, &self.registry);
        Some(f(widget, &mut env))
    }

    pub fn find(&self, widget_id: &str) -> Option<&Widget> {
        self.widgets.iter().find_map(|w| w.find(widget_id))
    }

    pub fn find_by_code(&self, code: &str) -> Option<&Widget> {
        self.widgets.iter().find_map(|w| w.find_by_code(code))
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn work_mode(&self) -> WorkMode {
        self.work_mode
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ScreenContext {
        &mut self.ctx
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.ctx.take_diagnostics()
    }

    pub fn take_side_effects(&mut self) -> Vec<RuntimeSideEffect> {
        self.ctx.take_side_effects()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.teardown();
    }
}
