//! Widget classes shipped with the runtime.

use crate::options::fmt_number;
use crate::registry::{ClassHooks, RootKind, WidgetClass};
use crate::render::{MAIN_DIV, MAIN_SVG};
use crate::widget::{Env, PropertyUpdate, Widget};
use serde_json::{json, Value};
use tessera_props::{PropertySchema, SchemaLayer, ValueKind};
use tessera_runtime::ScreenContext;

pub static TEXT: WidgetClass = WidgetClass {
    class_name: "text",
    root: RootKind::Div,
    layer: Some(text_layer),
    hooks: ClassHooks {
        render: Some(render_text),
        on_data: Some(text_on_data),
    },
};

pub static INDICATOR: WidgetClass = WidgetClass {
    class_name: "indicator",
    root: RootKind::Svg,
    layer: Some(indicator_layer),
    hooks: ClassHooks {
        render: Some(render_indicator),
        on_data: Some(indicator_on_data),
    },
};

pub static CONTAINER: WidgetClass = WidgetClass {
    class_name: "container",
    root: RootKind::Container,
    layer: None,
    hooks: ClassHooks {
        render: None,
        on_data: None,
    },
};

pub static CUSTOM: WidgetClass = WidgetClass {
    class_name: "custom",
    root: RootKind::Composite,
    layer: None,
    hooks: ClassHooks {
        render: None,
        on_data: None,
    },
};

pub static ALL: [&WidgetClass; 4] = [&TEXT, &INDICATOR, &CONTAINER, &CUSTOM];

fn text_layer() -> SchemaLayer {
    let property = json!({
        "text": {
            "content": "",
            "fontSize": 16,
            "color": "#ffffff",
            "align": "left"
        }
    });
    let text = PropertySchema::group(
        "text",
        "Text",
        vec![
            PropertySchema::field("content", "Content", ValueKind::String),
            PropertySchema::field("fontSize", "Font size", ValueKind::Double),
            PropertySchema::field("color", "Color", ValueKind::Color),
            PropertySchema::field("align", "Alignment", ValueKind::String),
        ],
    );
    SchemaLayer::new(property, vec![text])
}

fn render_text(widget: &mut Widget, ctx: &mut ScreenContext) {
    let Some(main) = ctx.surface.find_role(widget.container(), MAIN_DIV) else {
        return;
    };
    let store = widget.store();
    let size = store.get_f64("text.fontSize").unwrap_or(16.0) * store.get_f64("basic.fontScale").unwrap_or(1.0);
    let span = ctx.surface.append(main, "span", "text");
    ctx.surface.set_text(span, store.get_str("text.content").unwrap_or_default());
    ctx.surface.set_style(span, "font-size", &format!("{}px", fmt_number(size)));
    ctx.surface.set_style(span, "color", store.get_str("text.color").unwrap_or("#ffffff"));
    ctx.surface.set_style(span, "text-align", store.get_str("text.align").unwrap_or("left"));
}

/// The bound `field` of the payload, or the whole payload.
fn bound_value<'a>(widget: &Widget, payload: &'a Value) -> Option<&'a Value> {
    match widget.data_bind().get("field").and_then(Value::as_str) {
        Some(field) => payload.get(field),
        None => Some(payload),
    }
}

fn text_on_data(widget: &mut Widget, env: &mut Env<'_>, payload: &Value) {
    let Some(value) = bound_value(widget, payload) else {
        return;
    };
    let content = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    widget.set_property(env, PropertyUpdate::path("text.content", content));
}

fn indicator_layer() -> SchemaLayer {
    let property = json!({
        "indicator": {
            "color": "#2ecc71",
            "stroke": "#ffffff"
        }
    });
    let indicator = PropertySchema::group(
        "indicator",
        "Indicator",
        vec![
            PropertySchema::field("color", "Fill", ValueKind::Color),
            PropertySchema::field("stroke", "Outline", ValueKind::Color),
        ],
    );
    SchemaLayer::new(property, vec![indicator])
}

fn render_indicator(widget: &mut Widget, ctx: &mut ScreenContext) {
    let Some(main) = ctx.surface.find_role(widget.container(), MAIN_SVG) else {
        return;
    };
    let store = widget.store();
    let view_box = store.get_f64_array("svgBasic.viewBox").unwrap_or_default();
    let frame = widget.frame();
    let (width, height) = match view_box.as_slice() {
        [_, _, w, h] => (*w, *h),
        _ => (frame.width, frame.height),
    };
    let circle = ctx.surface.append(main, "circle", "indicator");
    ctx.surface.set_attr(circle, "cx", &fmt_number(width / 2.0));
    ctx.surface.set_attr(circle, "cy", &fmt_number(height / 2.0));
    ctx.surface.set_attr(circle, "r", &fmt_number(width.min(height) / 2.0));
    ctx.surface.set_attr(circle, "fill", store.get_str("indicator.color").unwrap_or("#2ecc71"));
    ctx.surface.set_attr(circle, "stroke", store.get_str("indicator.stroke").unwrap_or("#ffffff"));
}

fn indicator_on_data(widget: &mut Widget, env: &mut Env<'_>, payload: &Value) {
    let color = bound_value(widget, payload)
        .and_then(|v| v.get("color").or(Some(v)))
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(color) = color {
        widget.set_property(env, PropertyUpdate::path("indicator.color", color));
    }
}
