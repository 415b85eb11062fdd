//! Panel management for container widgets.
//!
//! A panel lives in three places that must stay in step: its record under
//! `property.panel`, its node under the `panel` dictionary group, and any
//! `property.containerJson` entries naming it.

use crate::layers::{panel_node, panel_record, CONTAINER_JSON, PANEL_GROUP};
use crate::options::{Frame, PanelContent};
use crate::render::RenderStrategy;
use crate::widget::{Env, Widget};
use serde_json::Value;
use tessera_runtime::{DiagnosticKind, RuntimeSideEffect, ScreenContext};
use tracing::{debug, info};

const PANEL_PREFIX: &str = "panel_";

fn panel_suffix(name: &str) -> Option<usize> {
    name.strip_prefix(PANEL_PREFIX)?.parse().ok()
}

impl Widget {
    /// Panel names in dictionary order.
    pub fn panel_names(&self) -> Vec<String> {
        self.store
            .dictionary_node_at(PANEL_GROUP)
            .map(|group| group.children.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    /// The well-formed entries of `property.containerJson`. Malformed ones
    /// are skipped here; `reload` reports them.
    pub fn container_json(&self) -> Vec<PanelContent> {
        self.store
            .get(CONTAINER_JSON)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn next_panel_index(&self) -> usize {
        let from_names = self
            .panel_names()
            .iter()
            .filter_map(|name| panel_suffix(name))
            .max()
            .map_or(0, |max| max + 1);
        let high_water = match &self.strategy {
            RenderStrategy::Container { high_water, .. } => *high_water,
            _ => 0,
        };
        from_names.max(high_water)
    }

    /// Adds `panel_<n>` to the property tree and the dictionary together.
    pub fn add_panel(&mut self, env: &mut Env<'_>) -> Option<String> {
        if !self.is_container() {
            env.ctx.report(&self.id, DiagnosticKind::UnknownFunction, "addPanel on a widget without panels");
            return None;
        }
        let index = self.next_panel_index();
        let name = format!("{PANEL_PREFIX}{index}");
        match self.store.group_mut(PANEL_GROUP) {
            Ok(panels) => {
                panels.insert(name.clone(), panel_record());
            }
            Err(err) => {
                env.ctx.report(&self.id, DiagnosticKind::MalformedPath, err.to_string());
                return None;
            }
        }
        self.ensure_panel_group();
        if let Some(group) = self.store.dictionary_node_at_mut(PANEL_GROUP) {
            group.children.push(panel_node(&name));
        }
        if let RenderStrategy::Container { high_water, .. } = &mut self.strategy {
            *high_water = index + 1;
        }
        info!(widget = %self.id, panel = %name, "panel added");
        env.ctx.emit(RuntimeSideEffect::PanelsChanged {
            widget_id: self.id.clone(),
        });
        self.render(env);
        Some(name)
    }

    /// Removes the panel at dictionary position `index` from all three
    /// structures. Returns the removed name.
    pub fn delete_panel(&mut self, env: &mut Env<'_>, index: usize) -> Option<String> {
        let removed = self
            .store
            .dictionary_node_at_mut(PANEL_GROUP)
            .filter(|group| index < group.children.len())
            .map(|group| group.children.remove(index).name);
        let Some(name) = removed else {
            env.ctx.report(
                &self.id,
                DiagnosticKind::PanelIndexOutOfRange,
                format!("no panel at index {index}"),
            );
            return None;
        };
        if let Ok(panels) = self.store.group_mut(PANEL_GROUP) {
            panels.remove(&name);
        }
        let mut children_changed = false;
        if let Some(Value::Array(entries)) = self.store.get_mut(CONTAINER_JSON) {
            let before = entries.len();
            entries.retain(|entry| entry.get("paneId").and_then(Value::as_str) != Some(name.as_str()));
            children_changed = entries.len() != before;
        }
        if let Some(main) = self.strategy.main_node() {
            env.ctx.surface.remove_role(main, &name);
        }
        info!(widget = %self.id, panel = %name, "panel deleted");
        env.ctx.emit(RuntimeSideEffect::PanelsChanged {
            widget_id: self.id.clone(),
        });
        self.render(env);
        if children_changed {
            self.reload(env);
        }
        Some(name)
    }

    /// Replaces `property.containerJson` and rebuilds every child.
    pub fn set_children_components(&mut self, env: &mut Env<'_>, container_json: Vec<PanelContent>, index: Option<usize>) {
        if !self.is_container() {
            env.ctx.report(&self.id, DiagnosticKind::UnknownFunction, "setChildrenComponents on a widget without panels");
            return;
        }
        debug!(widget = %self.id, ?index, entries = container_json.len(), "children replaced");
        let entries = container_json
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>();
        match entries {
            Ok(entries) => {
                if let Err(err) = self.store.set_by_path(CONTAINER_JSON, Value::Array(entries)) {
                    env.ctx.report(&self.id, DiagnosticKind::MalformedPath, err.to_string());
                    return;
                }
            }
            Err(err) => {
                env.ctx.report(&self.id, DiagnosticKind::InvalidOptions, err.to_string());
                return;
            }
        }
        self.render(env);
        self.reload(env);
    }

    fn ensure_panel_group(&mut self) {
        if self.store.dictionary_node_at(PANEL_GROUP).is_none() {
            let defaults = crate::layers::container_layer();
            self.store.dictionary_mut().extend(defaults.dictionary);
        }
    }

    /// Creates dictionary nodes for panels that only exist in the property
    /// tree, e.g. panels loaded from a saved screen.
    pub(crate) fn sync_panel_dictionary(&mut self) {
        self.ensure_panel_group();
        let names: Vec<String> = self
            .store
            .get(PANEL_GROUP)
            .and_then(Value::as_object)
            .map(|panels| panels.keys().cloned().collect())
            .unwrap_or_default();
        for name in names {
            if self.store.dictionary_node_at(&format!("{PANEL_GROUP}.{name}")).is_some() {
                continue;
            }
            if let Some(group) = self.store.dictionary_node_at_mut(PANEL_GROUP) {
                group.children.push(panel_node(&name));
            }
        }
    }

    /// One element per panel inside `mainDIV`, positioned by `panelFrame`.
    pub(crate) fn render_panels(&mut self, ctx: &mut ScreenContext) {
        self.sync_panel_dictionary();
        let Some(main) = self.strategy.main_node() else {
            return;
        };
        let panels: Vec<(String, Value)> = self
            .store
            .get(PANEL_GROUP)
            .and_then(Value::as_object)
            .map(|panels| panels.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        for (name, record) in panels {
            let frame = record
                .get("panelFrame")
                .and_then(Frame::from_value)
                .unwrap_or(Frame::new(0.0, 0.0, 100.0, 100.0));
            let node = match ctx.surface.find_role(main, &name) {
                Some(node) => node,
                None => {
                    let node = ctx.surface.append(main, "div", &name);
                    ctx.surface.set_attr(node, "class", &name);
                    node
                }
            };
            ctx.surface.set_style(node, "position", "absolute");
            ctx.surface.set_style(node, "left", &Frame::px(frame.x));
            ctx.surface.set_style(node, "top", &Frame::px(frame.y));
            ctx.surface.set_style(node, "width", &Frame::px(frame.width));
            ctx.surface.set_style(node, "height", &Frame::px(frame.height));
            if let Some(image) = record.get("panelBgImage").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                ctx.surface.set_style(node, "background-image", &format!("url({image})"));
            }
        }
    }

    /// Tears down every child and rebuilds the list from `containerJson`.
    ///
    /// Entry `i` is loaded only when its `paneId` is `panel_<i>`; other
    /// entries are skipped with a `PaneIdMismatch` diagnostic. Positions
    /// count every raw entry, malformed ones included.
    pub(crate) fn reload(&mut self, env: &mut Env<'_>) {
        for mut child in self.strategy.take_children() {
            child.cleanup(env.ctx);
        }
        let Some(main) = self.strategy.main_node() else {
            return;
        };
        let raw: Vec<Value> = self
            .store
            .get(CONTAINER_JSON)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut loaded = Vec::new();
        for (i, raw_entry) in raw.into_iter().enumerate() {
            let entry: PanelContent = match serde_json::from_value(raw_entry) {
                Ok(entry) => entry,
                Err(err) => {
                    env.ctx.report(
                        &self.id,
                        DiagnosticKind::InvalidOptions,
                        format!("containerJson entry {i} is malformed: {err}"),
                    );
                    continue;
                }
            };
            let expected = format!("{PANEL_PREFIX}{i}");
            if entry.pane_id != expected {
                env.ctx.report(
                    &self.id,
                    DiagnosticKind::PaneIdMismatch,
                    format!("entry {i} names '{}', expected '{expected}'", entry.pane_id),
                );
                continue;
            }
            if entry.children.is_empty() {
                continue;
            }
            let Some(surface) = env.ctx.surface.find_role(main, &expected) else {
                env.ctx.report(
                    &self.id,
                    DiagnosticKind::MissingPanelSurface,
                    format!("no element for {expected}"),
                );
                continue;
            };
            env.ctx.surface.clear(surface);
            let composition = env.factory.instantiate(env.ctx, &entry.children, surface, self.work_mode);
            loaded.extend(composition.components);
        }
        debug!(widget = %self.id, children = loaded.len(), "container reloaded");
        self.strategy.set_children(loaded);
    }
}
