use serde_json::{json, Value};
use tessera_runtime::memory::TransportCall;
use tessera_runtime::{
    DataMessage, DiagnosticKind, MemoryHandles, RuntimeSettings, RuntimeSideEffect, ScreenContext,
    SubscriptionKey, SubscriptionState, WorkMode,
};
use tessera_widgets::{Env, Frame, Lifecycle, PropertyUpdate, Registry, ScriptEntry, Widget, WidgetOptions};

struct Rig {
    ctx: ScreenContext,
    handles: MemoryHandles,
    registry: Registry,
}

impl Rig {
    fn new() -> Self {
        let (ctx, handles) = ScreenContext::in_memory(RuntimeSettings::default());
        Self {
            ctx,
            handles,
            registry: Registry::with_builtins(),
        }
    }

    fn build(&mut self, options: &WidgetOptions, mode: WorkMode) -> Widget {
        let root = self.ctx.surface.root();
        self.registry.build(&mut self.ctx, options, root, mode).unwrap()
    }

    fn env(&mut self) -> Env<'_> {
        Env::new(&mut self.ctx, &self.registry)
    }
}

fn indicator(need_sync: bool) -> WidgetOptions {
    let mut options = WidgetOptions::new("indicator", "lamp").with_id("lamp");
    options.property["basic"]["needSync"] = json!(need_sync);
    options.property["basic"]["frame"] = json!([0, 0, 400, 200]);
    options
}

fn bound_label(id: &str) -> WidgetOptions {
    let mut options = WidgetOptions::new("text", id).with_id(id);
    options.comp_data_bind.insert("source".into(), json!("traffic"));
    options.comp_data_bind.insert("field".into(), json!("speed"));
    options
}

fn send_data_interact(target: &str) -> tessera_runtime::InteractSpec {
    serde_json::from_value(json!({
        "custom": {
            "sendData": [{
                "actions": [{
                    "compParams": ["text.content", "@data.speed@"],
                    "compList": [{"compCode": target}],
                    "eventName": "setProperty"
                }]
            }]
        }
    }))
    .unwrap()
}

#[test]
fn clip_rect_without_sync_only_records_the_region() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&indicator(false), WorkMode::Display);

    widget.set_clip_rect(&mut rig.ctx, Frame::new(0.0, 0.0, 200.0, 200.0));

    assert_eq!(widget.clip_rect(), Some(Frame::new(0.0, 0.0, 200.0, 200.0)));
    let main = widget.strategy().main_node().unwrap();
    assert_eq!(rig.handles.scene.attr(main, "clip-path"), None);
    assert!(rig.handles.sync.open_channels().is_empty());
}

#[test]
fn clip_rect_with_sync_clips_and_opens_the_channel() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&indicator(true), WorkMode::Display);

    widget.set_clip_rect(&mut rig.ctx, Frame::new(0.0, 0.0, 200.0, 200.0));
    widget.set_clip_rect(&mut rig.ctx, Frame::new(200.0, 0.0, 200.0, 200.0));

    let main = widget.strategy().main_node().unwrap();
    assert_eq!(rig.handles.scene.attr(main, "clip-path").as_deref(), Some("url(#lamp_clip)"));
    assert_eq!(rig.handles.sync.open_channels(), ["lamp"]);
    assert_eq!(rig.handles.scene.count_role("clip-rect"), 1);

    assert!(widget.send_sync(&mut rig.ctx, &json!({"click": [10, 10]})));
    assert_eq!(rig.handles.sync.sent(), vec![("lamp".to_string(), json!({"click": [10, 10]}))]);

    widget.cleanup(&mut rig.ctx);
    assert_eq!(rig.handles.sync.closed(), ["lamp"]);
    assert!(!widget.send_sync(&mut rig.ctx, &json!({})));
}

#[test]
fn the_editor_clips_without_joining_the_channel() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&indicator(true), WorkMode::Editor);
    widget.set_clip_rect(&mut rig.ctx, Frame::new(0.0, 0.0, 100.0, 100.0));

    let main = widget.strategy().main_node().unwrap();
    assert!(rig.handles.scene.attr(main, "clip-path").is_some());
    assert!(rig.handles.sync.open_channels().is_empty());
}

#[test]
fn re_rendering_keeps_the_clip() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&indicator(true), WorkMode::Test);
    widget.set_clip_rect(&mut rig.ctx, Frame::new(0.0, 0.0, 100.0, 100.0));

    let mut env = rig.env();
    widget.set_property(&mut env, PropertyUpdate::path("indicator.color", "#ff0000"));

    let main = widget.strategy().main_node().unwrap();
    assert_eq!(rig.handles.scene.attr(main, "clip-path").as_deref(), Some("url(#lamp_clip)"));
    assert_eq!(rig.handles.scene.count_role("mainSVG"), 1);
}

#[test]
fn locked_view_box_follows_the_frame_and_is_read_only() {
    let mut rig = Rig::new();
    let mut options = indicator(false);
    options.property["svgBasic"] = json!({"lockViewBox": true, "viewBox": [5, 5, 10, 10]});
    let widget = rig.build(&options, WorkMode::Editor);

    assert_eq!(widget.store().get("svgBasic.viewBox"), Some(&json!([0.0, 0.0, 400.0, 200.0])));
    assert!(!widget.store().dictionary_node_at("svgBasic.viewBox").unwrap().editable);
    let main = widget.strategy().main_node().unwrap();
    assert_eq!(rig.handles.scene.attr(main, "viewBox").as_deref(), Some("0 0 400 200"));
}

#[test]
fn unlocked_view_box_stays_editable() {
    let mut rig = Rig::new();
    let widget = rig.build(&indicator(false), WorkMode::Editor);
    assert!(widget.store().dictionary_node_at("svgBasic.viewBox").unwrap().editable);
}

#[test]
fn scripts_run_outside_the_editor() {
    let mut options = WidgetOptions::new("text", "banner").with_id("banner");
    options.comp_script = vec![
        serde_json::from_value::<ScriptEntry>(json!({"trigger": "click", "displayName": "Alert", "content": "alert(1)"}))
            .unwrap(),
        serde_json::from_value::<ScriptEntry>(json!({"trigger": "load", "displayName": "Init", "content": "init()"}))
            .unwrap(),
    ];

    let mut rig = Rig::new();
    let mut editing = rig.build(&options, WorkMode::Editor);
    assert_eq!(editing.fire_trigger(&mut rig.ctx, "click"), 0);
    assert!(rig.ctx.side_effects().is_empty());

    let mut live = rig.build(&options, WorkMode::Display);
    assert_eq!(live.fire_trigger(&mut rig.ctx, "click"), 1);
    assert_eq!(
        rig.ctx.take_side_effects(),
        vec![RuntimeSideEffect::RunScript {
            widget_id: "banner".to_string(),
            name: "Alert".to_string(),
            content: "alert(1)".to_string(),
        }]
    );
}

#[test]
fn cleanup_twice_is_harmless() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&bound_label("speed"), WorkMode::Display);
    assert_eq!(rig.handles.transport.subscribe_count("speed"), 1);

    widget.cleanup(&mut rig.ctx);
    let calls = rig.handles.transport.calls();
    widget.cleanup(&mut rig.ctx);

    assert_eq!(widget.lifecycle(), Lifecycle::Cleaned);
    assert_eq!(rig.handles.transport.calls(), calls);
    assert_eq!(rig.ctx.timers.pending_for("speed"), 0);
    assert!(rig.ctx.diagnostics().is_empty());

    let mut env = rig.env();
    widget.render(&mut env);
    assert_eq!(rig.ctx.take_diagnostics()[0].kind, DiagnosticKind::LifecycleViolation);
}

#[test]
fn control_mode_releases_the_subscription_after_one_payload() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&bound_label("speed"), WorkMode::Control);
    let mut env = rig.env();

    widget.deliver_data(&mut env, &DataMessage::ack());
    widget.deliver_data(&mut env, &DataMessage::new(r#"{"speed": 42}"#));

    assert_eq!(widget.store().get_str("text.content"), Some("42"));
    assert_eq!(widget.subscription().state(), SubscriptionState::Idle);
    let key = SubscriptionKey::new("speed", "speed");
    assert_eq!(
        rig.handles.transport.calls(),
        vec![
            TransportCall::Subscribe(key.clone()),
            TransportCall::Unsubscribe(key.clone()),
            TransportCall::UnsubscribeByClient(key),
        ]
    );
}

#[test]
fn display_mode_keeps_receiving() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&bound_label("speed"), WorkMode::Display);
    let mut env = rig.env();

    widget.deliver_data(&mut env, &DataMessage::ack());
    widget.deliver_data(&mut env, &DataMessage::new(r#"{"speed": 41}"#));
    widget.deliver_data(&mut env, &DataMessage::new(r#"{"speed": "fast"}"#));

    assert_eq!(widget.store().get_str("text.content"), Some("fast"));
    assert!(widget.subscription().is_active());
}

#[test]
fn widgets_without_a_binding_never_subscribe() {
    let mut rig = Rig::new();
    rig.build(&WidgetOptions::new("text", "plain").with_id("plain"), WorkMode::Display);
    rig.build(&bound_label("bound"), WorkMode::Editor);
    assert!(rig.handles.transport.calls().is_empty());
}

#[test]
fn post_data_without_a_handler_is_reported() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&WidgetOptions::new("text", "quiet").with_id("quiet"), WorkMode::Display);

    assert_eq!(widget.post_data(&mut rig.ctx, &json!({"speed": 1}), "sendData"), None);

    assert!(rig.handles.actions.messages().is_empty());
    let diagnostics = rig.ctx.take_diagnostics();
    assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingHandler);
    assert_eq!(diagnostics[0].message, "can not find handler for sendData");
}

#[test]
fn forwarded_data_becomes_an_action_message() {
    let mut rig = Rig::new();
    let mut options = bound_label("source");
    options.property["basic"]["isSendData"] = json!(true);
    options.comp_interact = send_data_interact("target");
    let mut widget = rig.build(&options, WorkMode::Display);
    let mut env = rig.env();

    widget.deliver_data(&mut env, &DataMessage::ack());
    widget.deliver_data(&mut env, &DataMessage::new(r#"{"speed": 88}"#));

    let messages = rig.handles.actions.take();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].target_id, "source");
    assert_eq!(messages[0].actions[0].performer_id, "target");
    assert_eq!(messages[0].actions[0].param, ["text.content", "88"]);
}

#[test]
fn missing_template_paths_render_empty_and_are_reported() {
    let mut rig = Rig::new();
    let mut options = WidgetOptions::new("text", "source").with_id("source");
    options.comp_interact = send_data_interact("target");
    let mut widget = rig.build(&options, WorkMode::Display);

    let message = widget.post_data(&mut rig.ctx, &json!({"rpm": 3}), "sendData").unwrap();

    assert_eq!(message.actions[0].param, ["text.content", ""]);
    assert_eq!(rig.ctx.take_diagnostics()[0].kind, DiagnosticKind::TemplateError);
}

#[test]
fn set_property_accepts_paths_and_partials() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&WidgetOptions::new("text", "title").with_id("title"), WorkMode::Editor);
    let mut env = rig.env();

    widget.set_property(&mut env, PropertyUpdate::path("text.content", "Hello"));
    widget.set_property(&mut env, PropertyUpdate::partial(json!({"text": {"fontSize": 24}})));

    assert_eq!(widget.store().get_str("text.content"), Some("Hello"));
    assert_eq!(widget.store().get_f64("text.fontSize"), Some(24.0));
    let span = rig
        .handles
        .scene
        .children(widget.strategy().main_node().unwrap())
        .into_iter()
        .find(|n| rig.handles.scene.element(*n).is_some_and(|e| e.role == "text"))
        .unwrap();
    assert_eq!(rig.handles.scene.element(span).unwrap().text, "Hello");
    assert_eq!(rig.handles.scene.style(span, "font-size").as_deref(), Some("24px"));
}

#[test]
fn malformed_paths_leave_the_tree_alone() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&WidgetOptions::new("text", "title").with_id("title"), WorkMode::Editor);
    let before = widget.property().clone();
    let mut env = rig.env();

    widget.set_property(&mut env, PropertyUpdate::path("text..content", "x"));
    widget.set_property(&mut env, PropertyUpdate::partial(json!([1, 2])));

    assert_eq!(widget.property(), &before);
    let kinds: Vec<_> = rig.ctx.take_diagnostics().into_iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::MalformedPath, DiagnosticKind::InvalidOptions]);
}

#[test]
fn invoke_decodes_json_values_and_falls_back_to_text() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&WidgetOptions::new("text", "title").with_id("title"), WorkMode::Display);
    let mut env = rig.env();

    widget.invoke(&mut env, "setProperty", &["text.fontSize".into(), "30".into()]);
    widget.invoke(&mut env, "setProperty", &["text.content".into(), "plain words".into()]);
    widget.invoke(&mut env, "setProperty", &[r#"{"text": {"align": "center"}}"#.into()]);
    widget.invoke(&mut env, "explode", &[]);
    widget.invoke(&mut env, "addPanel", &[]);

    assert_eq!(widget.store().get_f64("text.fontSize"), Some(30.0));
    assert_eq!(widget.store().get_str("text.content"), Some("plain words"));
    assert_eq!(widget.store().get_str("text.align"), Some("center"));
    let kinds: Vec<_> = rig.ctx.take_diagnostics().into_iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::UnknownFunction, DiagnosticKind::UnknownFunction]);
}

#[test]
fn options_merge_over_class_defaults() {
    let mut rig = Rig::new();
    let mut options = WidgetOptions::new("text", "title").with_id("title");
    options.property["text"] = json!({"color": "#000000"});
    options.comp_animation = vec![json!({"type": "fade"}), json!({"type": "fade"})];
    options.comp_data = json!([{"speed": 1}]);
    let widget = rig.build(&options, WorkMode::Editor);

    assert_eq!(widget.store().get_str("text.color"), Some("#000000"));
    assert_eq!(widget.store().get_f64("text.fontSize"), Some(16.0));
    assert_eq!(widget.store().get_str("basic.type"), Some("DIVComponent"));
    assert_eq!(widget.animation().len(), 1);
    assert_eq!(widget.static_data(), &json!([{"speed": 1}]));
    assert_eq!(widget.asset_folder(), "components/text/");
    assert_eq!(widget.event_functions()[0].name, "sendData");
    assert_eq!(widget.invoke_functions()[0].name, "setProperty");
    assert_eq!(widget.lifecycle(), Lifecycle::Rendered);
}

#[test]
fn the_observer_sees_every_payload() {
    let mut rig = Rig::new();
    let mut widget = rig.build(&bound_label("speed"), WorkMode::Editor);
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::<Value>::new()));
    let sink = seen.clone();
    widget.subscribe_data_source(&mut rig.ctx, Some(Box::new(move |v: &Value| sink.borrow_mut().push(v.clone()))));
    let mut env = rig.env();

    widget.deliver_data(&mut env, &DataMessage::ack());
    widget.deliver_data(&mut env, &DataMessage::new("[1, 2]"));

    assert_eq!(*seen.borrow(), vec![json!([1, 2])]);
}
