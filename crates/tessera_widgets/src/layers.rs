//! Default property layers. A widget's store is seeded base-first from
//! `base_layer`, then its root layer, then its class layer.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tessera_props::{PropertyAction, PropertySchema, SchemaLayer, ValueKind};

pub const PANEL_GROUP: &str = "panel";
pub const CONTAINER_JSON: &str = "containerJson";
pub const CHILD_COMP: &str = "childComp";

pub fn base_layer(code: &str, class_name: &str) -> SchemaLayer {
    let property = json!({
        "basic": {
            "code": code,
            "displayName": "",
            "type": "",
            "className": class_name,
            "frame": [0, 0, 1920, 1080],
            "isVisible": true,
            "translateZ": true,
            "needSync": false,
            "zIndex": 0,
            "fontScale": 1,
            "isSendData": false,
            "isAnimate": false
        }
    });
    let basic = PropertySchema::group(
        "basic",
        "Basic",
        vec![
            PropertySchema::field("code", "Code", ValueKind::String).readonly(),
            PropertySchema::field("displayName", "Name", ValueKind::String),
            PropertySchema::field("type", "Type", ValueKind::String).readonly(),
            PropertySchema::field("className", "Class", ValueKind::String).readonly(),
            PropertySchema::field("frame", "Frame", ValueKind::DoubleArray)
                .describe("Position and size")
                .placeholders(["x", "y", "width", "height"]),
            PropertySchema::field("isVisible", "Visible", ValueKind::Boolean),
            PropertySchema::field("translateZ", "GPU layer", ValueKind::Boolean)
                .describe("Promote the widget to its own compositing layer"),
            PropertySchema::field("needSync", "Cross-screen sync", ValueKind::Boolean)
                .describe("Synchronize events when the widget spans several displays"),
            PropertySchema::field("zIndex", "Layer", ValueKind::Int),
            PropertySchema::field("fontScale", "Font scale", ValueKind::Double),
            PropertySchema::field("isSendData", "Forward data", ValueKind::Boolean)
                .describe("Re-broadcast received data through the sendData event"),
            PropertySchema::field("isAnimate", "Animated", ValueKind::Boolean),
        ],
    );
    SchemaLayer::new(property, vec![basic])
}

pub fn svg_layer() -> SchemaLayer {
    let property = json!({
        "basic": { "type": "SVGComponent" },
        "svgBasic": {
            "isViewBox": true,
            "lockViewBox": false,
            "viewBox": [0, 0, 1920, 1080]
        }
    });
    let svg = PropertySchema::group(
        "svgBasic",
        "SVG",
        vec![
            PropertySchema::field("isViewBox", "Use viewBox", ValueKind::Boolean),
            PropertySchema::field("lockViewBox", "Lock viewBox", ValueKind::Boolean)
                .describe("Keep the viewBox equal to the frame size"),
            PropertySchema::field("viewBox", "viewBox", ValueKind::DoubleArray)
                .placeholders(["x", "y", "width", "height"]),
        ],
    );
    SchemaLayer::new(property, vec![svg])
}

pub fn div_layer() -> SchemaLayer {
    SchemaLayer::new(json!({ "basic": { "type": "DIVComponent" } }), Vec::new())
}

pub fn container_layer() -> SchemaLayer {
    let property = json!({
        "basic": { "type": "container" },
        PANEL_GROUP: {},
        CONTAINER_JSON: []
    });
    let panels = PropertySchema::group(PANEL_GROUP, "Panels", Vec::new())
        .with_action(PropertyAction::new("Add", "success", "addPanel"));
    SchemaLayer::new(property, vec![panels])
}

pub fn custom_layer() -> SchemaLayer {
    SchemaLayer::new(
        json!({ "basic": { "type": "custom" }, CHILD_COMP: [] }),
        Vec::new(),
    )
}

/// Property record inserted for every new panel.
pub fn panel_record() -> Value {
    json!({
        "panelName": "",
        "panelFrame": [0, 0, 100, 100],
        "panelBgImage": ""
    })
}

/// Dictionary node for the panel `name`, with the editor's delete action.
pub fn panel_node(name: &str) -> PropertySchema {
    PropertySchema::group(
        name,
        name,
        vec![
            PropertySchema::field("panelName", "Panel name", ValueKind::String),
            PropertySchema::field("panelFrame", "Panel frame", ValueKind::DoubleArray)
                .describe("Panel position and size")
                .placeholders(["x", "y", "width", "height"])
                .readonly(),
            PropertySchema::field("panelBgImage", "Background", ValueKind::Image)
                .describe("Panel background image"),
        ],
    )
    .with_action(PropertyAction::new("Delete", "warning", "deletePanel").with_params(["parentIndex"]))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionParam {
    pub name: String,
    pub display_name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// An event a widget emits or a function it accepts, as listed for the
/// editor's interaction designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub params: Vec<FunctionParam>,
}

fn param(name: &str, display_name: &str, kind: Option<&str>) -> FunctionParam {
    FunctionParam {
        name: name.to_string(),
        display_name: display_name.to_string(),
        kind: kind.map(str::to_string),
    }
}

pub fn event_functions() -> Vec<FunctionSpec> {
    vec![FunctionSpec {
        name: "sendData".to_string(),
        display_name: "Send data".to_string(),
        params: vec![param("data", "Data", None)],
    }]
}

pub fn invoke_functions() -> Vec<FunctionSpec> {
    vec![FunctionSpec {
        name: "setProperty".to_string(),
        display_name: "Set property".to_string(),
        params: vec![
            param("name", "Property", Some("option")),
            param("value", "Value", Some("optionType")),
        ],
    }]
}
