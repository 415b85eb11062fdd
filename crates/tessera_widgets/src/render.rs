use crate::options::{fmt_number, Frame};
use crate::registry::RootKind;
use crate::widget::Widget;
use tessera_runtime::{DiagnosticKind, NodeId, ScreenContext};
use tracing::debug;

pub const MAIN_SVG: &str = "mainSVG";
pub const MAIN_DIV: &str = "mainDIV";

/// How a widget builds its root element, plus whatever that root owns.
#[derive(Debug)]
pub enum RenderStrategy {
    Svg {
        main: Option<NodeId>,
    },
    Div {
        main: Option<NodeId>,
    },
    Container {
        main: Option<NodeId>,
        children: Vec<Widget>,
        /// Next panel index never handed out yet.
        high_water: usize,
    },
    Composite {
        root: Option<NodeId>,
        children: Vec<Widget>,
    },
}

impl RenderStrategy {
    pub fn for_root(root: RootKind) -> Self {
        match root {
            RootKind::Svg => RenderStrategy::Svg { main: None },
            RootKind::Div => RenderStrategy::Div { main: None },
            RootKind::Container => RenderStrategy::Container {
                main: None,
                children: Vec::new(),
                high_water: 0,
            },
            RootKind::Composite => RenderStrategy::Composite {
                root: None,
                children: Vec::new(),
            },
        }
    }

    pub fn root_kind(&self) -> RootKind {
        match self {
            RenderStrategy::Svg { .. } => RootKind::Svg,
            RenderStrategy::Div { .. } => RootKind::Div,
            RenderStrategy::Container { .. } => RootKind::Container,
            RenderStrategy::Composite { .. } => RootKind::Composite,
        }
    }

    /// The element the widget draws into (`mainSVG`, `mainDIV` or the
    /// composite root).
    pub fn main_node(&self) -> Option<NodeId> {
        match self {
            RenderStrategy::Svg { main }
            | RenderStrategy::Div { main }
            | RenderStrategy::Container { main, .. } => *main,
            RenderStrategy::Composite { root, .. } => *root,
        }
    }

    pub(crate) fn set_main_node(&mut self, node: NodeId) {
        match self {
            RenderStrategy::Svg { main }
            | RenderStrategy::Div { main }
            | RenderStrategy::Container { main, .. } => *main = Some(node),
            RenderStrategy::Composite { root, .. } => *root = Some(node),
        }
    }

    pub fn children(&self) -> &[Widget] {
        match self {
            RenderStrategy::Container { children, .. } | RenderStrategy::Composite { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut [Widget] {
        match self {
            RenderStrategy::Container { children, .. } | RenderStrategy::Composite { children, .. } => children,
            _ => &mut [],
        }
    }

    pub(crate) fn take_children(&mut self) -> Vec<Widget> {
        match self {
            RenderStrategy::Container { children, .. } | RenderStrategy::Composite { children, .. } => {
                std::mem::take(children)
            }
            _ => Vec::new(),
        }
    }

    /// Replaces the child list in one assignment.
    pub(crate) fn set_children(&mut self, loaded: Vec<Widget>) {
        if let RenderStrategy::Container { children, .. } | RenderStrategy::Composite { children, .. } = self {
            *children = loaded;
        }
    }
}

impl Widget {
    /// Visibility, stacking and compositing styles on the container element.
    pub(crate) fn render_base(&mut self, ctx: &mut ScreenContext) {
        let visible = self.store.get_bool("basic.isVisible").unwrap_or(true);
        let z_index = self.store.get_f64("basic.zIndex").unwrap_or(0.0);
        ctx.surface.set_style(self.container, "display", if visible { "block" } else { "none" });
        ctx.surface.set_style(self.container, "z-index", &fmt_number(z_index));
        if self.store.get_bool("basic.translateZ") == Some(true) {
            ctx.surface.set_style(self.container, "transform", "translateZ(0)");
        }
    }

    pub(crate) fn render_svg(&mut self, ctx: &mut ScreenContext) {
        let frame = self.frame();
        if self.store.get_bool("svgBasic.lockViewBox") == Some(true) {
            let locked = Frame::new(0.0, 0.0, frame.width, frame.height).to_value();
            let pinned = self
                .store
                .set_by_path("svgBasic.viewBox", locked)
                .and_then(|()| self.store.set_editable("svgBasic.viewBox", false));
            if let Err(err) = pinned {
                ctx.report(&self.id, DiagnosticKind::MalformedPath, err.to_string());
            }
        }
        let view_box = if self.store.get_bool("svgBasic.isViewBox") == Some(true) {
            self.store
                .get_f64_array("svgBasic.viewBox")
                .map(|v| v.iter().map(|n| fmt_number(*n)).collect::<Vec<_>>().join(" "))
                .unwrap_or_default()
        } else {
            String::new()
        };

        ctx.surface.remove_role(self.container, MAIN_SVG);
        let main = ctx.surface.append(self.container, "svg", MAIN_SVG);
        ctx.surface.set_attr(main, "class", MAIN_SVG);
        ctx.surface.set_attr(main, "x", "0");
        ctx.surface.set_attr(main, "y", "0");
        ctx.surface.set_attr(main, "width", &fmt_number(frame.width));
        ctx.surface.set_attr(main, "height", &fmt_number(frame.height));
        ctx.surface.set_attr(main, "viewBox", &view_box);
        self.strategy.set_main_node(main);

        if self.clip_rect.is_some() && self.needs_sync() {
            self.apply_clip(ctx);
        }
    }

    /// Containers keep their `mainDIV` across renders so the panels and the
    /// children mounted in them survive a property change.
    pub(crate) fn render_div(&mut self, ctx: &mut ScreenContext) {
        let frame = self.frame();
        let main = match self.strategy.main_node() {
            Some(node) if self.is_container() && ctx.surface.exists(node) => node,
            _ => {
                ctx.surface.remove_role(self.container, MAIN_DIV);
                let node = ctx.surface.append(self.container, "div", MAIN_DIV);
                ctx.surface.set_attr(node, "class", MAIN_DIV);
                node
            }
        };
        ctx.surface.set_style(main, "position", "absolute");
        ctx.surface.set_style(main, "left", "0");
        ctx.surface.set_style(main, "top", "0");
        ctx.surface.set_style(main, "width", &Frame::px(frame.width));
        ctx.surface.set_style(main, "height", &Frame::px(frame.height));
        ctx.surface.set_style(main, "overflow", "hidden");
        self.strategy.set_main_node(main);
    }

    /// Clip primitive for the recorded clip rectangle. Only SVG roots have one.
    pub(crate) fn apply_clip(&mut self, ctx: &mut ScreenContext) {
        let (Some(rect), RenderStrategy::Svg { main: Some(main) }) = (self.clip_rect, &self.strategy) else {
            debug!(widget = %self.id, "no clip primitive for this root");
            return;
        };
        let main = *main;
        let clip_id = format!("{}_clip", self.id);
        ctx.surface.remove_role(main, "defs");
        let defs = ctx.surface.append(main, "defs", "defs");
        let clip_path = ctx.surface.append(defs, "clipPath", "clipPath");
        ctx.surface.set_attr(clip_path, "id", &clip_id);
        let shape = ctx.surface.append(clip_path, "rect", "clip-rect");
        ctx.surface.set_attr(shape, "x", &fmt_number(rect.x));
        ctx.surface.set_attr(shape, "y", &fmt_number(rect.y));
        ctx.surface.set_attr(shape, "width", &fmt_number(rect.width));
        ctx.surface.set_attr(shape, "height", &fmt_number(rect.height));
        ctx.surface.set_attr(main, "clip-path", &format!("url(#{clip_id})"));
    }
}
