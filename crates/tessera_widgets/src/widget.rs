use crate::layers::{self, FunctionSpec};
use crate::options::{Frame, ScriptEntry, WidgetOptions};
use crate::registry::{ClassHooks, CompositionFactory, RootKind, WidgetClass};
use crate::render::RenderStrategy;
use serde_json::{Map, Value};
use std::fmt;
use tessera_props::{deep_merge, path_to_object, union_values, PropertyStore};
use tessera_runtime::{
    ActionDispatcher, ActionMessage, DataHandler, DataMessage, DiagnosticKind, EventSync, Expired,
    InteractSpec, NodeId, RuntimeSideEffect, ScreenContext, SubscribeOutcome, SubscriptionKey,
    SubscriptionManager, TimerPurpose, WorkMode,
};
use tracing::{debug, info};

/// What a widget operation may touch: the screen session and the factory
/// used to build child widgets.
pub struct Env<'a> {
    pub ctx: &'a mut ScreenContext,
    pub factory: &'a dyn CompositionFactory,
}

impl<'a> Env<'a> {
    pub fn new(ctx: &'a mut ScreenContext, factory: &'a dyn CompositionFactory) -> Self {
        Self { ctx, factory }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Constructed,
    Configured,
    Rendered,
    Cleaned,
}

/// Argument of `set_property`: a dotted path with its value, or a partial
/// property tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyUpdate {
    Path(String, Value),
    Partial(Value),
}

impl PropertyUpdate {
    pub fn path(path: impl Into<String>, value: impl Into<Value>) -> Self {
        PropertyUpdate::Path(path.into(), value.into())
    }

    pub fn partial(tree: Value) -> Self {
        PropertyUpdate::Partial(tree)
    }
}

/// A live widget: a property store plus the render strategy of its class.
pub struct Widget {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) class_name: String,
    pub(crate) container: NodeId,
    pub(crate) work_mode: WorkMode,
    pub(crate) store: PropertyStore,
    pub(crate) data_bind: Map<String, Value>,
    pub(crate) animation: Vec<Value>,
    pub(crate) script: Vec<ScriptEntry>,
    pub(crate) interact: InteractSpec,
    pub(crate) static_data: Value,
    pub(crate) strategy: RenderStrategy,
    pub(crate) hooks: ClassHooks,
    pub(crate) subscription: SubscriptionManager,
    pub(crate) sync: EventSync,
    pub(crate) clip_rect: Option<Frame>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) asset_folder: String,
    pub(crate) event_func: Vec<FunctionSpec>,
    pub(crate) invoke_func: Vec<FunctionSpec>,
}

impl Widget {
    /// Seeds the store from the class layers, applies `options`, renders into
    /// `container` and, in subscribing modes, requests its data source.
    pub fn build(
        class: &WidgetClass,
        id: String,
        container: NodeId,
        work_mode: WorkMode,
        options: &WidgetOptions,
        env: &mut Env<'_>,
    ) -> Widget {
        let code = options.code().unwrap_or_default().to_string();
        let mut store = PropertyStore::new();
        store.initialize(&class.layers(&code));
        let mut widget = Widget {
            subscription: SubscriptionManager::new(SubscriptionKey::new(&id, &code)),
            id,
            code,
            class_name: class.class_name.to_string(),
            container,
            work_mode,
            store,
            data_bind: Map::new(),
            animation: Vec::new(),
            script: Vec::new(),
            interact: InteractSpec::default(),
            static_data: Value::Null,
            strategy: RenderStrategy::for_root(class.root),
            hooks: class.hooks,
            sync: EventSync::new(),
            clip_rect: None,
            lifecycle: Lifecycle::Constructed,
            asset_folder: String::new(),
            event_func: layers::event_functions(),
            invoke_func: layers::invoke_functions(),
        };
        widget.configure(env.ctx, options);
        widget.render(env);
        if widget.is_container() {
            widget.reload(env);
        }
        if work_mode.subscribes_data() {
            widget.subscribe_data_source(env.ctx, None);
        }
        widget
    }

    fn configure(&mut self, ctx: &mut ScreenContext, options: &WidgetOptions) {
        if options.property.is_object() {
            self.store.merge(&options.property);
        } else {
            ctx.report(&self.id, DiagnosticKind::InvalidOptions, "property is not an object");
        }
        for (key, value) in &options.comp_data_bind {
            match self.data_bind.get_mut(key) {
                Some(slot) => deep_merge(slot, value),
                None => {
                    self.data_bind.insert(key.clone(), value.clone());
                }
            }
        }
        union_values(&mut self.animation, &options.comp_animation);
        for entry in &options.comp_script {
            if !self.script.contains(entry) {
                self.script.push(entry.clone());
            }
        }
        self.interact.extend(options.comp_interact.clone());
        self.static_data = options.comp_data.clone();

        if let Some(code) = self.store.get_str("basic.code") {
            self.code = code.to_string();
        }
        let class_name = self
            .store
            .get_str("basic.className")
            .filter(|name| !name.is_empty())
            .unwrap_or(self.class_name.as_str())
            .to_string();
        self.asset_folder = ctx.settings.asset_folder(&class_name);
        self.lifecycle = Lifecycle::Configured;

        for entry in &self.script {
            info!(widget = %self.id, script = %entry.display_name, trigger = %entry.trigger, "script bound");
        }
    }

    /// Rebuilds the widget's visual elements from the current property tree.
    pub fn render(&mut self, env: &mut Env<'_>) {
        if self.lifecycle == Lifecycle::Cleaned {
            env.ctx.report(&self.id, DiagnosticKind::LifecycleViolation, "render called after cleanup");
            return;
        }
        match self.strategy.root_kind() {
            RootKind::Svg => {
                self.render_base(env.ctx);
                self.render_svg(env.ctx);
            }
            RootKind::Div => {
                self.render_base(env.ctx);
                self.render_div(env.ctx);
            }
            RootKind::Container => {
                self.render_base(env.ctx);
                self.render_div(env.ctx);
                self.render_panels(env.ctx);
            }
            RootKind::Composite => self.render_composite(env),
        }
        if let Some(render) = self.hooks.render {
            render(self, env.ctx);
        }
        self.lifecycle = Lifecycle::Rendered;
    }

    /// Merges a path/value pair or a partial tree, then re-renders.
    pub fn set_property(&mut self, env: &mut Env<'_>, update: PropertyUpdate) {
        let partial = match update {
            PropertyUpdate::Path(path, value) => match path_to_object(&path, value) {
                Ok(partial) => partial,
                Err(err) => {
                    env.ctx.report(&self.id, DiagnosticKind::MalformedPath, err.to_string());
                    return;
                }
            },
            PropertyUpdate::Partial(partial) if partial.is_object() => partial,
            PropertyUpdate::Partial(_) => {
                env.ctx.report(&self.id, DiagnosticKind::InvalidOptions, "partial property is not an object");
                return;
            }
        };
        if self.strategy.root_kind() == RootKind::Composite {
            self.rescale_children(&partial);
        }
        self.store.merge(&partial);
        self.render(env);
    }

    /// Plain assignment into the data-bind map, then re-render.
    pub fn set_data_bind(&mut self, env: &mut Env<'_>, key: impl Into<String>, value: Value) {
        self.data_bind.insert(key.into(), value);
        self.render(env);
    }

    pub fn subscribe_data_source(&mut self, ctx: &mut ScreenContext, on_data: Option<DataHandler>) -> SubscribeOutcome {
        let has_binding = !self.data_bind.is_empty();
        self.subscription.subscribe(ctx, has_binding, on_data)
    }

    pub fn unsubscribe_data_source(&mut self, ctx: &mut ScreenContext) {
        self.subscription.unsubscribe(ctx);
    }

    pub fn unsubscribe_data_by_client(&mut self, ctx: &mut ScreenContext) {
        self.subscription.unsubscribe_by_client(ctx);
    }

    /// Handles one frame from the data transport.
    pub fn deliver_data(&mut self, env: &mut Env<'_>, message: &DataMessage) {
        let Some(payload) = self.subscription.accept(env.ctx, message) else {
            return;
        };
        if self.store.get_bool("basic.isSendData") == Some(true) {
            self.post_data(env.ctx, &payload, "sendData");
        }
        if let Some(on_data) = self.hooks.on_data {
            on_data(self, env, &payload);
        }
        self.subscription.forward(&payload);
        if self.work_mode.is_one_shot() {
            debug!(widget = %self.id, "one-shot observer, releasing subscription");
            self.unsubscribe_data_source(env.ctx);
            self.unsubscribe_data_by_client(env.ctx);
        }
    }

    /// Fans `data` out to the actions configured for `event_name`. Returns
    /// the message handed to the action sink, if any.
    pub fn post_data(&mut self, ctx: &mut ScreenContext, data: &Value, event_name: &str) -> Option<ActionMessage> {
        let Some(actions) = self.interact.actions_for(event_name) else {
            ctx.report(
                &self.id,
                DiagnosticKind::MissingHandler,
                format!("can not find handler for {event_name}"),
            );
            return None;
        };
        let dispatch = ActionDispatcher::dispatch(&actions, data);
        for err in dispatch.errors {
            ctx.report(&self.id, DiagnosticKind::TemplateError, err.to_string());
        }
        let message = ActionMessage {
            target_id: self.id.clone(),
            actions: dispatch.records,
        };
        ctx.actions.send(message.clone());
        Some(message)
    }

    /// Records the visible region. Widgets flagged `needSync` also clip to it
    /// and join the cross-screen event channel.
    pub fn set_clip_rect(&mut self, ctx: &mut ScreenContext, rect: Frame) {
        self.clip_rect = Some(rect);
        if !self.needs_sync() {
            return;
        }
        self.apply_clip(ctx);
        if self.work_mode.syncs_events() {
            self.sync.open(ctx, &self.id);
        }
    }

    pub fn on_event_sync(&mut self, message: Value) {
        debug!(widget = %self.id, "event sync message");
        self.sync.receive(message);
    }

    /// Sends a message on the open sync channel. False when none is open.
    pub fn send_sync(&mut self, ctx: &mut ScreenContext, message: &Value) -> bool {
        self.sync.send(ctx, message)
    }

    /// Routes an expired timer owned by this widget.
    pub fn on_timer(&mut self, ctx: &mut ScreenContext, expired: &Expired) -> bool {
        match expired.purpose {
            TimerPurpose::SubscribeRetry => self.subscription.on_retry(ctx, expired.handle),
            TimerPurpose::SyncHeartbeat => self.sync.on_heartbeat(ctx, &self.id, expired.handle),
        }
    }

    /// Inbound half of the action protocol.
    pub fn invoke(&mut self, env: &mut Env<'_>, function_name: &str, params: &[String]) {
        match function_name {
            "setProperty" => {
                let Some(name) = params.first() else {
                    env.ctx.report(&self.id, DiagnosticKind::MalformedPath, "setProperty without a property name");
                    return;
                };
                match params.get(1) {
                    Some(raw) => {
                        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
                        self.set_property(env, PropertyUpdate::Path(name.clone(), value));
                    }
                    None => match serde_json::from_str::<Value>(name) {
                        Ok(partial) => self.set_property(env, PropertyUpdate::Partial(partial)),
                        Err(_) => env.ctx.report(
                            &self.id,
                            DiagnosticKind::MalformedPath,
                            format!("setProperty('{name}') without a value"),
                        ),
                    },
                }
            }
            "addPanel" if self.is_container() => {
                self.add_panel(env);
            }
            "deletePanel" if self.is_container() => match params.first().and_then(|p| p.trim().parse::<usize>().ok()) {
                Some(index) => {
                    self.delete_panel(env, index);
                }
                None => env.ctx.report(
                    &self.id,
                    DiagnosticKind::PanelIndexOutOfRange,
                    format!("deletePanel needs a numeric index, got {params:?}"),
                ),
            },
            other => env.ctx.report(
                &self.id,
                DiagnosticKind::UnknownFunction,
                format!("'{other}' is not callable on {}", self.class_name),
            ),
        }
    }

    /// Hands every script bound to `trigger` to the host. Returns how many
    /// were emitted.
    pub fn fire_trigger(&mut self, ctx: &mut ScreenContext, trigger: &str) -> usize {
        if !self.work_mode.runs_scripts() {
            debug!(widget = %self.id, trigger, "scripts disabled in {} mode", self.work_mode.as_str());
            return 0;
        }
        let mut fired = 0;
        for entry in self.script.iter().filter(|s| s.trigger == trigger) {
            ctx.emit(RuntimeSideEffect::RunScript {
                widget_id: self.id.clone(),
                name: entry.display_name.clone(),
                content: entry.content.clone(),
            });
            fired += 1;
        }
        fired
    }

    /// Releases children, the data subscription, the sync channel and its
    /// heartbeat. Repeated calls are no-ops.
    pub fn cleanup(&mut self, ctx: &mut ScreenContext) {
        if self.lifecycle == Lifecycle::Cleaned {
            return;
        }
        for mut child in self.strategy.take_children() {
            child.cleanup(ctx);
        }
        self.subscription.cleanup(ctx);
        self.sync.close(ctx);
        self.lifecycle = Lifecycle::Cleaned;
        debug!(widget = %self.id, "cleaned up");
    }

    pub fn find(&self, id: &str) -> Option<&Widget> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Widget> {
        if self.id == id {
            return Some(self);
        }
        self.strategy.children_mut().iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn find_by_code(&self, code: &str) -> Option<&Widget> {
        if self.code == code {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_by_code(code))
    }

    pub fn find_by_code_mut(&mut self, code: &str) -> Option<&mut Widget> {
        if self.code == code {
            return Some(self);
        }
        self.strategy.children_mut().iter_mut().find_map(|c| c.find_by_code_mut(code))
    }

    /// Visits this widget and every descendant, parents first.
    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Widget)) {
        f(self);
        for child in self.strategy.children_mut() {
            child.visit_mut(f);
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn work_mode(&self) -> WorkMode {
        self.work_mode
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn property(&self) -> &Value {
        self.store.tree()
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn data_bind(&self) -> &Map<String, Value> {
        &self.data_bind
    }

    pub fn animation(&self) -> &[Value] {
        &self.animation
    }

    pub fn scripts(&self) -> &[ScriptEntry] {
        &self.script
    }

    pub fn interact(&self) -> &InteractSpec {
        &self.interact
    }

    pub fn static_data(&self) -> &Value {
        &self.static_data
    }

    pub fn subscription(&self) -> &SubscriptionManager {
        &self.subscription
    }

    pub fn event_sync(&self) -> &EventSync {
        &self.sync
    }

    pub fn clip_rect(&self) -> Option<Frame> {
        self.clip_rect
    }

    pub fn asset_folder(&self) -> &str {
        &self.asset_folder
    }

    pub fn event_functions(&self) -> &[FunctionSpec] {
        &self.event_func
    }

    pub fn invoke_functions(&self) -> &[FunctionSpec] {
        &self.invoke_func
    }

    pub fn children(&self) -> &[Widget] {
        self.strategy.children()
    }

    pub fn strategy(&self) -> &RenderStrategy {
        &self.strategy
    }

    pub fn is_container(&self) -> bool {
        self.strategy.root_kind() == RootKind::Container
    }

    pub fn frame(&self) -> Frame {
        self.store
            .get("basic.frame")
            .and_then(Frame::from_value)
            .unwrap_or_default()
    }

    pub(crate) fn needs_sync(&self) -> bool {
        self.store.get_bool("basic.needSync") == Some(true)
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("code", &self.code)
            .field("class_name", &self.class_name)
            .field("work_mode", &self.work_mode)
            .field("lifecycle", &self.lifecycle)
            .field("children", &self.children().len())
            .finish()
    }
}
