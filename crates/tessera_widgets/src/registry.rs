use crate::builtins;
use crate::layers;
use crate::options::WidgetOptions;
use crate::widget::{Env, Widget};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tessera_props::SchemaLayer;
use tessera_runtime::{DiagnosticKind, NodeId, ScreenContext, WorkMode};
use tracing::debug;
use uuid::Uuid;

/// Draws class-specific content after the root element has been rebuilt.
pub type RenderHook = fn(&mut Widget, &mut ScreenContext);

/// Reacts to a decoded data payload before it is forwarded to the observer.
pub type DataHook = fn(&mut Widget, &mut Env<'_>, &Value);

#[derive(Clone, Copy, Default)]
pub struct ClassHooks {
    pub render: Option<RenderHook>,
    pub on_data: Option<DataHook>,
}

/// How a class builds its root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Svg,
    Div,
    Container,
    Composite,
}

/// Static description of a widget class: its defaults and behavior hooks.
pub struct WidgetClass {
    pub class_name: &'static str,
    pub root: RootKind,
    pub layer: Option<fn() -> SchemaLayer>,
    pub hooks: ClassHooks,
}

impl WidgetClass {
    /// Defaults in application order: base, root kind, class.
    pub fn layers(&self, code: &str) -> Vec<SchemaLayer> {
        let mut stack = vec![layers::base_layer(code, self.class_name)];
        match self.root {
            RootKind::Svg => stack.push(layers::svg_layer()),
            RootKind::Div => stack.push(layers::div_layer()),
            RootKind::Container => {
                stack.push(layers::div_layer());
                stack.push(layers::container_layer());
            }
            RootKind::Composite => stack.push(layers::custom_layer()),
        }
        if let Some(layer) = self.layer {
            stack.push(layer());
        }
        stack
    }
}

impl fmt::Debug for WidgetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetClass")
            .field("class_name", &self.class_name)
            .field("root", &self.root)
            .finish()
    }
}

/// Result of instantiating a list of child specs.
#[derive(Debug, Default)]
pub struct Composition {
    pub components: Vec<Widget>,
}

/// Turns serialized child specs into live widgets rendered into `container`.
pub trait CompositionFactory {
    fn instantiate(
        &self,
        ctx: &mut ScreenContext,
        specs: &[WidgetOptions],
        container: NodeId,
        work_mode: WorkMode,
    ) -> Composition;
}

/// Class name to class descriptor, resolved at composition time.
#[derive(Debug, Default)]
pub struct Registry {
    classes: BTreeMap<String, &'static WidgetClass>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for class in builtins::ALL {
            registry.register(class);
        }
        registry
    }

    pub fn register(&mut self, class: &'static WidgetClass) {
        self.classes.insert(class.class_name.to_string(), class);
    }

    pub fn get(&self, class_name: &str) -> Option<&'static WidgetClass> {
        self.classes.get(class_name).copied()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Builds one widget. Unknown classes are reported and skipped.
    pub fn build(
        &self,
        ctx: &mut ScreenContext,
        options: &WidgetOptions,
        container: NodeId,
        work_mode: WorkMode,
    ) -> Option<Widget> {
        let id = options
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let Some(class_name) = options.class_name() else {
            ctx.report(&id, DiagnosticKind::InvalidOptions, "options carry no basic.className");
            return None;
        };
        let Some(class) = self.get(class_name) else {
            ctx.report(&id, DiagnosticKind::UnknownClass, format!("no widget class named '{class_name}'"));
            return None;
        };
        debug!(widget = %id, class = class_name, "instantiating");
        let mut env = Env::new(ctx, self);
        Some(Widget::build(class, id, container, work_mode, options, &mut env))
    }
}

impl CompositionFactory for Registry {
    fn instantiate(
        &self,
        ctx: &mut ScreenContext,
        specs: &[WidgetOptions],
        container: NodeId,
        work_mode: WorkMode,
    ) -> Composition {
        let components = specs
            .iter()
            .filter_map(|spec| self.build(ctx, spec, container, work_mode))
            .collect();
        Composition { components }
    }
}
