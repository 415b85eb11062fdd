//! In-memory collaborators. Each type is a cheap handle over shared state so
//! a caller can keep a clone for inspection after boxing one into a
//! `ScreenContext`.

use crate::actions::{ActionMessage, ActionSink};
use crate::surface::{NodeId, Surface};
use crate::sync::{ChannelHandle, SyncChannelHub};
use crate::transport::{DataTransport, SubscriptionKey};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub role: String,
    pub attrs: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<NodeId>,
    parent: Option<NodeId>,
}

#[derive(Debug)]
struct SceneState {
    next: u64,
    nodes: HashMap<NodeId, Element>,
}

/// A retained element tree standing in for the DOM.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    state: Rc<RefCell<SceneState>>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            Self::ROOT,
            Element {
                tag: "screen".to_string(),
                role: "root".to_string(),
                ..Element::default()
            },
        );
        Self {
            state: Rc::new(RefCell::new(SceneState { next: 1, nodes })),
        }
    }

    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.state.borrow().nodes.get(&node).cloned()
    }

    pub fn style(&self, node: NodeId, name: &str) -> Option<String> {
        self.state.borrow().nodes.get(&node)?.styles.get(name).cloned()
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.state.borrow().nodes.get(&node)?.attrs.get(name).cloned()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.borrow().nodes.get(&node)?.parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    /// Number of live elements carrying `role`, anywhere in the scene.
    pub fn count_role(&self, role: &str) -> usize {
        self.state.borrow().nodes.values().filter(|e| e.role == role).count()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Indented outline of the subtree under `node`.
    pub fn outline(&self, node: NodeId) -> String {
        let state = self.state.borrow();
        let mut out = String::new();
        outline_into(&state, node, 0, &mut out);
        out
    }

    fn remove_subtree(state: &mut SceneState, node: NodeId) {
        if let Some(element) = state.nodes.remove(&node) {
            for child in element.children {
                Self::remove_subtree(state, child);
            }
        }
    }
}

fn outline_into(state: &SceneState, node: NodeId, depth: usize, out: &mut String) {
    let Some(element) = state.nodes.get(&node) else {
        return;
    };
    let _ = write!(out, "{}<{} role={}", "  ".repeat(depth), element.tag, element.role);
    for (name, value) in &element.attrs {
        let _ = write!(out, " {name}=\"{value}\"");
    }
    if !element.styles.is_empty() {
        let styles: Vec<String> = element.styles.iter().map(|(k, v)| format!("{k}:{v}")).collect();
        let _ = write!(out, " style=\"{}\"", styles.join(";"));
    }
    out.push('>');
    if !element.text.is_empty() {
        out.push_str(&element.text);
    }
    out.push('\n');
    for child in &element.children {
        outline_into(state, *child, depth + 1, out);
    }
}

impl Surface for SceneGraph {
    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn exists(&self, node: NodeId) -> bool {
        self.state.borrow().nodes.contains_key(&node)
    }

    fn append(&mut self, parent: NodeId, tag: &str, role: &str) -> NodeId {
        let mut state = self.state.borrow_mut();
        let id = NodeId(state.next);
        state.next += 1;
        state.nodes.insert(
            id,
            Element {
                tag: tag.to_string(),
                role: role.to_string(),
                parent: Some(parent),
                ..Element::default()
            },
        );
        if let Some(parent) = state.nodes.get_mut(&parent) {
            parent.children.push(id);
        }
        id
    }

    fn remove_role(&mut self, parent: NodeId, role: &str) {
        let mut state = self.state.borrow_mut();
        let doomed: Vec<NodeId> = match state.nodes.get(&parent) {
            Some(element) => element
                .children
                .iter()
                .copied()
                .filter(|c| state.nodes.get(c).is_some_and(|e| e.role == role))
                .collect(),
            None => return,
        };
        if let Some(element) = state.nodes.get_mut(&parent) {
            element.children.retain(|c| !doomed.contains(c));
        }
        for node in doomed {
            Self::remove_subtree(&mut state, node);
        }
    }

    fn find_role(&self, parent: NodeId, role: &str) -> Option<NodeId> {
        let state = self.state.borrow();
        state
            .nodes
            .get(&parent)?
            .children
            .iter()
            .copied()
            .find(|c| state.nodes.get(c).is_some_and(|e| e.role == role))
    }

    fn clear(&mut self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        let children = match state.nodes.get_mut(&node) {
            Some(element) => std::mem::take(&mut element.children),
            None => return,
        };
        for child in children {
            Self::remove_subtree(&mut state, child);
        }
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.state.borrow_mut().nodes.get_mut(&node) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn set_style(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.state.borrow_mut().nodes.get_mut(&node) {
            element.styles.insert(name.to_string(), value.to_string());
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.state.borrow_mut().nodes.get_mut(&node) {
            element.text = text.to_string();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Subscribe(SubscriptionKey),
    Unsubscribe(SubscriptionKey),
    UnsubscribeByClient(SubscriptionKey),
}

/// Records every request instead of talking to a server.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    calls: Rc<RefCell<Vec<TransportCall>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.borrow().clone()
    }

    pub fn subscribe_count(&self, id: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, TransportCall::Subscribe(k) if k.id == id))
            .count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl DataTransport for MemoryTransport {
    fn subscribe(&mut self, key: &SubscriptionKey) {
        self.calls.borrow_mut().push(TransportCall::Subscribe(key.clone()));
    }

    fn unsubscribe(&mut self, key: &SubscriptionKey) {
        self.calls.borrow_mut().push(TransportCall::Unsubscribe(key.clone()));
    }

    fn unsubscribe_by_client(&mut self, key: &SubscriptionKey) {
        self.calls.borrow_mut().push(TransportCall::UnsubscribeByClient(key.clone()));
    }
}

#[derive(Debug, Default)]
struct HubState {
    next: u64,
    open: BTreeMap<ChannelHandle, String>,
    sent: Vec<(String, Value)>,
    closed: Vec<String>,
}

/// Keeps open channels and the frames sent on them.
#[derive(Debug, Clone, Default)]
pub struct MemorySyncHub {
    state: Rc<RefCell<HubState>>,
}

impl MemorySyncHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_channels(&self) -> Vec<String> {
        self.state.borrow().open.values().cloned().collect()
    }

    pub fn is_open_for(&self, widget_id: &str) -> bool {
        self.state.borrow().open.values().any(|id| id == widget_id)
    }

    pub fn sent(&self) -> Vec<(String, Value)> {
        self.state.borrow().sent.clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.state.borrow().closed.clone()
    }
}

impl SyncChannelHub for MemorySyncHub {
    fn open(&mut self, widget_id: &str) -> ChannelHandle {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let handle = ChannelHandle(state.next);
        state.open.insert(handle, widget_id.to_string());
        handle
    }

    fn send(&mut self, channel: ChannelHandle, message: &Value) {
        let mut state = self.state.borrow_mut();
        if let Some(widget_id) = state.open.get(&channel).cloned() {
            state.sent.push((widget_id, message.clone()));
        }
    }

    fn close(&mut self, channel: ChannelHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(widget_id) = state.open.remove(&channel) {
            state.closed.push(widget_id);
        }
    }
}

/// Collects outbound action messages.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    messages: Rc<RefCell<Vec<ActionMessage>>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ActionMessage> {
        self.messages.borrow().clone()
    }

    pub fn take(&self) -> Vec<ActionMessage> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }
}

impl ActionSink for ActionLog {
    fn send(&mut self, message: ActionMessage) {
        self.messages.borrow_mut().push(message);
    }
}
