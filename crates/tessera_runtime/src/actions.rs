use crate::template::{Template, TemplateError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompRef {
    pub comp_code: String,
}

/// One configured reaction: call `event_name` on every widget in `comp_list`
/// with the rendered `comp_params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredAction {
    #[serde(default)]
    pub comp_params: Vec<String>,
    #[serde(default)]
    pub comp_list: Vec<CompRef>,
    pub event_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionGroup {
    #[serde(default)]
    pub actions: Vec<ConfiguredAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A widget's interaction spec: inbound event name to its action groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InteractSpec {
    #[serde(default)]
    pub custom: BTreeMap<String, Vec<ActionGroup>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InteractSpec {
    /// Later options win per event name.
    pub fn extend(&mut self, other: InteractSpec) {
        self.custom.extend(other.custom);
        self.extra.extend(other.extra);
    }

    /// All actions configured for `event_name`, groups flattened in order.
    pub fn actions_for(&self, event_name: &str) -> Option<Vec<ConfiguredAction>> {
        let groups = self.custom.get(event_name)?;
        Some(groups.iter().flat_map(|g| g.actions.iter().cloned()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRecord {
    pub performer_id: String,
    pub param: Vec<String>,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    pub target_id: String,
    pub actions: Vec<DispatchRecord>,
}

/// Where outbound action messages go.
pub trait ActionSink {
    fn send(&mut self, message: ActionMessage);
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispatch {
    pub records: Vec<DispatchRecord>,
    pub errors: Vec<TemplateError>,
}

pub struct ActionDispatcher;

impl ActionDispatcher {
    /// Renders every parameter template against `data` and emits one record
    /// per (action, target) pair, action order first, then target order.
    pub fn dispatch(actions: &[ConfiguredAction], data: &Value) -> Dispatch {
        let mut dispatch = Dispatch::default();
        for action in actions {
            let params: Vec<String> = action
                .comp_params
                .iter()
                .map(|source| match Template::parse(source) {
                    Ok(template) => {
                        let (text, err) = template.render_lossy(data);
                        if let Some(err) = err {
                            dispatch.errors.push(err);
                        }
                        text
                    }
                    Err(err) => {
                        dispatch.errors.push(err);
                        String::new()
                    }
                })
                .collect();
            for target in &action.comp_list {
                dispatch.records.push(DispatchRecord {
                    performer_id: target.comp_code.clone(),
                    param: params.clone(),
                    function_name: action.event_name.clone(),
                });
            }
        }
        dispatch
    }
}
