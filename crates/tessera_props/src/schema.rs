use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Editor control kind for a property field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    String,
    Boolean,
    Int,
    Double,
    DoubleArray,
    StringArray,
    Color,
    Image,
    Json,
    JsonArray,
}

impl ValueKind {
    pub fn as_str(&self) -> &str {
        match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::DoubleArray => "doubleArray",
            ValueKind::StringArray => "stringArray",
            ValueKind::Color => "color",
            ValueKind::Image => "image",
            ValueKind::Json => "json",
            ValueKind::JsonArray => "jsonArray",
        }
    }

    /// Whether `value` has the JSON shape this kind edits.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::String | ValueKind::Color | ValueKind::Image => value.is_string(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Int => value.is_i64() || value.is_u64(),
            ValueKind::Double => value.is_number(),
            ValueKind::DoubleArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_number)),
            ValueKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            ValueKind::Json => true,
            ValueKind::JsonArray => value.is_array(),
        }
    }
}

/// A button the external editor renders next to a dictionary node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAction {
    pub text: String,
    pub style: String,
    /// Name of the widget operation the editor invokes, e.g. `addPanel`.
    pub action: String,
    #[serde(default)]
    pub param: Vec<String>,
}

impl PropertyAction {
    pub fn new(text: impl Into<String>, style: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: style.into(),
            action: action.into(),
            param: Vec::new(),
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param = params.into_iter().map(Into::into).collect();
        self
    }
}

/// Declarative description of one property field or group.
///
/// Groups carry `children` and no `kind`; leaves carry a `kind`. The tree of
/// schemas is the property dictionary that an external editor renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholder: Vec<String>,
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action: Vec<PropertyAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PropertySchema>,
}

fn default_true() -> bool {
    true
}

impl PropertySchema {
    pub fn field(name: impl Into<String>, display_name: impl Into<String>, kind: ValueKind) -> Self {
        let display_name = display_name.into();
        Self {
            name: name.into(),
            description: display_name.clone(),
            display_name,
            kind: Some(kind),
            placeholder: Vec::new(),
            show: true,
            editable: true,
            action: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>, display_name: impl Into<String>, children: Vec<PropertySchema>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            kind: None,
            placeholder: Vec::new(),
            show: true,
            editable: true,
            action: Vec::new(),
            children,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn readonly(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    pub fn placeholders<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placeholder = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_action(mut self, action: PropertyAction) -> Self {
        self.action.push(action);
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_none()
    }

    pub fn child(&self, name: &str) -> Option<&PropertySchema> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut PropertySchema> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Folds `other` into this node: same-named children are replaced in
    /// place (groups recurse), new ones are appended.
    pub fn extend_with(&mut self, other: PropertySchema) {
        if !other.display_name.is_empty() {
            self.display_name = other.display_name;
        }
        if !other.description.is_empty() {
            self.description = other.description;
        }
        if other.kind.is_some() {
            self.kind = other.kind;
        }
        self.show = other.show;
        self.editable = other.editable;
        for action in other.action {
            if !self.action.iter().any(|a| a.action == action.action) {
                self.action.push(action);
            }
        }
        for child in other.children {
            match self.child_mut(&child.name) {
                Some(existing) if existing.is_group() && child.is_group() => existing.extend_with(child),
                Some(existing) => *existing = child,
                None => self.children.push(child),
            }
        }
    }
}

/// One level of widget defaults: a partial property tree plus the dictionary
/// nodes describing it. Layers are applied base-first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaLayer {
    pub property: Value,
    pub dictionary: Vec<PropertySchema>,
}

impl SchemaLayer {
    pub fn new(property: Value, dictionary: Vec<PropertySchema>) -> Self {
        Self { property, dictionary }
    }
}
