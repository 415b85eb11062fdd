use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_runtime::{InteractSpec, WorkMode};

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// A script attached to a trigger (`click`, `load`, ...). The core never
/// evaluates `content`; it hands it to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEntry {
    pub trigger: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Serialized widget options as stored in screen files and `containerJson`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "empty_object")]
    pub property: Value,
    #[serde(default)]
    pub comp_data_bind: Map<String, Value>,
    #[serde(default)]
    pub comp_animation: Vec<Value>,
    #[serde(default)]
    pub comp_script: Vec<ScriptEntry>,
    #[serde(default)]
    pub comp_interact: InteractSpec,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub comp_data: Value,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            id: None,
            property: empty_object(),
            comp_data_bind: Map::new(),
            comp_animation: Vec::new(),
            comp_script: Vec::new(),
            comp_interact: InteractSpec::default(),
            comp_data: Value::Null,
        }
    }
}

impl WidgetOptions {
    pub fn new(class_name: &str, code: &str) -> Self {
        Self {
            property: serde_json::json!({
                "basic": { "className": class_name, "code": code }
            }),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class_name(&self) -> Option<&str> {
        self.property.get("basic")?.get("className")?.as_str()
    }

    pub fn code(&self) -> Option<&str> {
        self.property.get("basic")?.get("code")?.as_str()
    }

    pub fn frame(&self) -> Option<Frame> {
        Frame::from_value(self.property.get("basic")?.get("frame")?)
    }
}

/// One `containerJson` entry: the children hosted by a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelContent {
    pub pane_id: String,
    #[serde(default)]
    pub children: Vec<WidgetOptions>,
}

impl PanelContent {
    pub fn new(pane_id: impl Into<String>, children: Vec<WidgetOptions>) -> Self {
        Self {
            pane_id: pane_id.into(),
            children,
        }
    }
}

/// A whole screen: the root widgets and the mode they run in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub work_mode: WorkMode,
    #[serde(default)]
    pub components: Vec<WidgetOptions>,
}

impl ScreenDefinition {
    pub fn new(name: impl Into<String>, work_mode: WorkMode) -> Self {
        Self {
            name: name.into(),
            work_mode,
            components: Vec::new(),
        }
    }
}

/// `[x, y, width, height]` as stored in `basic.frame` and `panelFrame`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_value(value: &Value) -> Option<Frame> {
        let items = value.as_array()?;
        let n = |i: usize| items.get(i).and_then(Value::as_f64);
        Some(Frame::new(n(0)?, n(1)?, n(2)?, n(3)?))
    }

    pub fn to_value(self) -> Value {
        serde_json::json!([self.x, self.y, self.width, self.height])
    }

    pub fn px(value: f64) -> String {
        format!("{}px", fmt_number(value))
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new(0.0, 0.0, 1920.0, 1080.0)
    }
}

/// Formats `1920.0` as `1920` and `12.5` as `12.5`.
pub fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_read_wire_names() {
        let options: WidgetOptions = serde_json::from_value(json!({
            "property": {"basic": {"className": "text", "code": "t1", "frame": [1, 2, 30, 40]}},
            "compDataBind": {"source": "traffic"},
            "compScript": [{"trigger": "click", "displayName": "Alert", "content": "go()"}],
            "compInteract": {"custom": {}}
        }))
        .unwrap();
        assert_eq!(options.class_name(), Some("text"));
        assert_eq!(options.code(), Some("t1"));
        assert_eq!(options.frame(), Some(Frame::new(1.0, 2.0, 30.0, 40.0)));
        assert_eq!(options.comp_script[0].trigger, "click");
        assert!(options.comp_data.is_null());
    }

    #[test]
    fn missing_property_defaults_to_an_object() {
        let options: WidgetOptions = serde_json::from_value(json!({})).unwrap();
        assert!(options.property.is_object());
    }

    #[test]
    fn panel_content_uses_pane_id() {
        let entry: PanelContent = serde_json::from_value(json!({"paneId": "panel_0"})).unwrap();
        assert_eq!(entry.pane_id, "panel_0");
        assert!(entry.children.is_empty());
    }

    #[test]
    fn numbers_print_without_trailing_zero() {
        assert_eq!(Frame::px(1920.0), "1920px");
        assert_eq!(fmt_number(12.5), "12.5");
    }
}
