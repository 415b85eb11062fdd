use crate::layers::CHILD_COMP;
use crate::options::{fmt_number, Frame, WidgetOptions};
use crate::widget::{Env, Widget};
use serde_json::Value;
use std::slice;
use tessera_runtime::DiagnosticKind;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn scale_factor(new: f64, old: f64) -> f64 {
    if old == 0.0 { 1.0 } else { round2(new / old) }
}

fn scale_entry(entry: &mut Value, index: usize, factor: f64) {
    if let Some(slot) = entry.pointer_mut(&format!("/property/basic/frame/{index}")) {
        if let Some(current) = slot.as_f64() {
            *slot = Value::from(current * factor);
        }
    }
}

impl Widget {
    /// Scales every embedded child's width and height by the ratio between
    /// the incoming and current frame. Child positions stay as they are.
    pub(crate) fn rescale_children(&mut self, partial: &Value) {
        let Some(new_frame) = partial.pointer("/basic/frame").and_then(Frame::from_value) else {
            return;
        };
        let old_frame = self.frame();
        let width_scale = scale_factor(new_frame.width, old_frame.width);
        let height_scale = scale_factor(new_frame.height, old_frame.height);
        if let Some(Value::Array(children)) = self.store.get_mut(CHILD_COMP) {
            for child in children.iter_mut() {
                scale_entry(child, 2, width_scale);
                scale_entry(child, 3, height_scale);
            }
        }
    }

    /// Recreates `comp{id}` and one positioned sub-container per embedded
    /// child, then instantiates the children into them.
    pub(crate) fn render_composite(&mut self, env: &mut Env<'_>) {
        for mut child in self.strategy.take_children() {
            child.cleanup(env.ctx);
        }
        let frame = self.frame();
        let role = format!("comp{}", self.id);
        let visible = self.store.get_bool("basic.isVisible").unwrap_or(true);
        let z_index = self.store.get_f64("basic.zIndex").unwrap_or(0.0);

        env.ctx.surface.remove_role(self.container, &role);
        let root = env.ctx.surface.append(self.container, "div", &role);
        env.ctx.surface.set_attr(root, "id", &role);
        env.ctx.surface.set_style(root, "width", &Frame::px(frame.width));
        env.ctx.surface.set_style(root, "height", &Frame::px(frame.height));
        env.ctx.surface.set_style(root, "display", if visible { "block" } else { "none" });
        env.ctx.surface.set_style(root, "z-index", &fmt_number(z_index));
        if self.store.get_bool("basic.translateZ") == Some(true) {
            env.ctx.surface.set_style(self.container, "transform", "translateZ(0)");
        }
        self.strategy.set_main_node(root);

        let entries = self
            .store
            .get(CHILD_COMP)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut loaded = Vec::new();
        for (i, entry) in entries.into_iter().enumerate() {
            let options: WidgetOptions = match serde_json::from_value(entry) {
                Ok(options) => options,
                Err(err) => {
                    env.ctx.report(&self.id, DiagnosticKind::InvalidOptions, format!("childComp[{i}]: {err}"));
                    continue;
                }
            };
            let code = options.code().unwrap_or_default();
            let child_frame = options.frame().unwrap_or_default();
            let holder_role = format!("comp_{}_{}", self.id, code);
            let holder = env.ctx.surface.append(root, "div", &holder_role);
            env.ctx.surface.set_attr(holder, "id", &holder_role);
            env.ctx.surface.set_style(holder, "position", "absolute");
            env.ctx.surface.set_style(holder, "left", &Frame::px(child_frame.x));
            env.ctx.surface.set_style(holder, "top", &Frame::px(child_frame.y));
            env.ctx.surface.set_style(holder, "width", &Frame::px(child_frame.width));
            env.ctx.surface.set_style(holder, "height", &Frame::px(child_frame.height));
            let composition = env
                .factory
                .instantiate(env.ctx, slice::from_ref(&options), holder, self.work_mode);
            loaded.extend(composition.components);
        }
        self.strategy.set_children(loaded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn factors_round_to_two_decimals() {
        assert_eq!(scale_factor(300.0, 200.0), 1.5);
        assert_eq!(scale_factor(100.0, 300.0), 0.33);
        assert_eq!(scale_factor(50.0, 0.0), 1.0);
    }

    #[test]
    fn only_the_indexed_frame_slot_changes() {
        let mut entry = json!({"property": {"basic": {"frame": [10, 20, 100, 40]}}});
        scale_entry(&mut entry, 2, 1.5);
        assert_eq!(entry["property"]["basic"]["frame"], json!([10, 20, 150.0, 40]));
    }
}
