use crate::actions::ActionSink;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::memory::{ActionLog, MemorySyncHub, MemoryTransport, SceneGraph};
use crate::settings::RuntimeSettings;
use crate::surface::Surface;
use crate::sync::SyncChannelHub;
use crate::timer::TimerQueue;
use crate::transport::DataTransport;
use crate::RuntimeSideEffect;
use tracing::warn;

/// Everything a screen session shares with its widgets: the external
/// collaborators, the timer queue and the scene-wide flags.
///
/// Created once per screen session and dropped with the screen.
pub struct ScreenContext {
    pub settings: RuntimeSettings,
    pub surface: Box<dyn Surface>,
    pub transport: Box<dyn DataTransport>,
    pub sync: Box<dyn SyncChannelHub>,
    pub actions: Box<dyn ActionSink>,
    pub timers: TimerQueue,
    /// Set while the scene plays its entering animation; widgets do not
    /// subscribe during the transition.
    pub scene_entering_animation: bool,
    diagnostics: Vec<Diagnostic>,
    side_effects: Vec<RuntimeSideEffect>,
}

/// Shared views into the collaborators built by `ScreenContext::in_memory`.
#[derive(Clone)]
pub struct MemoryHandles {
    pub scene: SceneGraph,
    pub transport: MemoryTransport,
    pub sync: MemorySyncHub,
    pub actions: ActionLog,
}

impl ScreenContext {
    pub fn new(
        settings: RuntimeSettings,
        surface: Box<dyn Surface>,
        transport: Box<dyn DataTransport>,
        sync: Box<dyn SyncChannelHub>,
        actions: Box<dyn ActionSink>,
    ) -> Self {
        Self {
            settings,
            surface,
            transport,
            sync,
            actions,
            timers: TimerQueue::new(),
            scene_entering_animation: false,
            diagnostics: Vec::new(),
            side_effects: Vec::new(),
        }
    }

    /// A context wired to in-memory collaborators, for tests and dry runs.
    pub fn in_memory(settings: RuntimeSettings) -> (Self, MemoryHandles) {
        let handles = MemoryHandles {
            scene: SceneGraph::new(),
            transport: MemoryTransport::new(),
            sync: MemorySyncHub::new(),
            actions: ActionLog::new(),
        };
        let ctx = Self::new(
            settings,
            Box::new(handles.scene.clone()),
            Box::new(handles.transport.clone()),
            Box::new(handles.sync.clone()),
            Box::new(handles.actions.clone()),
        );
        (ctx, handles)
    }

    pub fn report(&mut self, widget_id: &str, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            widget_id: widget_id.to_string(),
            kind,
            message: message.into(),
        };
        warn!(widget = widget_id, kind = kind.as_str(), "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn emit(&mut self, effect: RuntimeSideEffect) {
        self.side_effects.push(effect);
    }

    pub fn side_effects(&self) -> &[RuntimeSideEffect] {
        &self.side_effects
    }

    pub fn take_side_effects(&mut self) -> Vec<RuntimeSideEffect> {
        std::mem::take(&mut self.side_effects)
    }
}
